//! Error types for whittle.
//!
//! This module defines all error types used throughout the library.
//!
//! Errors are only produced while constructing a mesh or a decimator: once
//! the decimation loop is running it converges to "queue empty" or
//! "criterion satisfied" and never fails as a whole. Topologically refused
//! collapses are classified and repaired internally, not surfaced here.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building a mesh or starting a decimation.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge has more than two incident faces.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A required point identifier resolved to no live point.
    #[error("point {point} does not exist in the mesh")]
    MissingPoint {
        /// The offending point identifier.
        point: usize,
    },
}
