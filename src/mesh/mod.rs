//! Core mesh data structures.
//!
//! This module provides the quad-edge mesh representation and related
//! types for representing and mutating triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`QuadEdgeMesh`], which represents a 2-manifold
//! triangle mesh (possibly with boundary) as an arena of undirected edge
//! cells. Each cell holds the two directed half-edges of one edge; rings
//! around origins are doubly linked, and face-ring navigation is derived,
//! giving O(1) adjacency queries in every direction.
//!
//! # Handle Types
//!
//! Mesh elements are identified by type-safe handles:
//! - [`VertexId`] - Identifies a point
//! - [`EdgeId`] - Identifies a directed half-edge
//!
//! Handles stay stable across in-place deletions, which is what allows a
//! priority queue to key on them while the mesh shrinks underneath it.
//!
//! # Construction
//!
//! Meshes are typically constructed from face-vertex lists:
//!
//! ```
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_triangles(&points, &faces).unwrap();
//! ```

mod builder;
mod index;
mod quadedge;

pub use builder::{build_from_triangles, to_face_vertex};
pub use index::{EdgeId, VertexId};
pub use quadedge::{OnextRingIter, OutgoingEdgeIter, Point, QuadEdgeMesh};
