//! Handle types for mesh elements.
//!
//! This module provides type-safe handle wrappers for points and directed
//! edges. Handles are plain `u32` indices into the mesh arenas and stay
//! stable for the lifetime of the element they name; navigation fields in
//! the mesh store handles, never references.
//!
//! The two directed half-edges of one undirected edge live in the same
//! arena cell and differ only in their lowest bit, so [`EdgeId::sym`] is
//! handle arithmetic rather than a stored pointer.

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

/// A type-safe point (vertex) handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe directed half-edge handle.
///
/// Directed edges `2c` and `2c + 1` are the two halves of undirected edge
/// cell `c` and are each other's [`sym`](EdgeId::sym).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

macro_rules! impl_handle_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new handle from a raw index.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} overflows handle", index);
                Self(index as u32)
            }

            /// Create an invalid/null handle.
            #[inline]
            pub const fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) handle.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.0)
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_handle_type!(VertexId, "V");
impl_handle_type!(EdgeId, "E");

impl VertexId {
    /// The sentinel identifier for "no point" (a detached edge end).
    pub const NO_POINT: VertexId = VertexId(INVALID);
}

impl EdgeId {
    /// The symmetric (opposite-direction) half of the same undirected edge.
    #[inline]
    pub fn sym(self) -> EdgeId {
        debug_assert!(self.is_valid());
        EdgeId(self.0 ^ 1)
    }

    /// The undirected edge cell this directed edge belongs to.
    #[inline]
    pub fn cell(self) -> usize {
        debug_assert!(self.is_valid());
        (self.0 >> 1) as usize
    }

    /// Which half of the cell this is (0 or 1).
    #[inline]
    pub fn side(self) -> usize {
        (self.0 & 1) as usize
    }

    /// The directed edge for the given cell and side.
    #[inline]
    pub fn from_cell(cell: usize, side: usize) -> EdgeId {
        debug_assert!(side < 2);
        EdgeId::new(cell * 2 + side)
    }
}
