//! # Whittle
//!
//! Priority-driven edge-collapse decimation for 2-manifold triangle
//! meshes.
//!
//! Whittle represents meshes with a quad-edge topology and shrinks them
//! by repeatedly collapsing the cheapest edge according to a pluggable
//! cost criterion, until a termination predicate is met. The engine keeps
//! every candidate edge in an indexed priority queue, classifies the
//! configurations a collapse must refuse (isolated edges, samosas, eyes,
//! tetrahedra, border welds), and repairs the queue after each refusal so
//! the loop always terminates.
//!
//! ## Features
//!
//! - **Quad-edge mesh**: O(1) navigation around origins and faces, with
//!   stable handles that survive in-place deletion
//! - **Indexed candidate queue**: in-place reprioritization, targeted
//!   removal, and tombstones for permanently refused edges
//! - **Classified collapses**: every topological refusal is a typed
//!   status with its own recovery
//! - **Pluggable policies**: cost criterion, termination predicate, and
//!   survivor placement are all seams of the caller's choosing
//!
//! ## Quick Start
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::Point3;
//!
//! // Build a small fan of triangles
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//! let mut mesh = build_from_triangles(&points, &faces).unwrap();
//!
//! // Collapse edges until at most one face remains
//! let report = decimate(
//!     &mut mesh,
//!     &FaceCountCriterion::new(1),
//!     &DecimateOptions::default(),
//! )
//! .unwrap();
//!
//! assert!(mesh.num_faces() <= 1);
//! println!("{}", report);
//! ```
//!
//! ## Custom criteria
//!
//! The engine treats the cost function and the stop predicate as opaque:
//!
//! ```
//! use whittle::decimate::DecimationCriterion;
//! use whittle::mesh::{EdgeId, QuadEdgeMesh};
//!
//! /// Collapse short edges first, stop below a point budget.
//! struct PointBudget(usize);
//!
//! impl DecimationCriterion for PointBudget {
//!     fn measure(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> f64 {
//!         mesh.edge_length_squared(edge)
//!     }
//!
//!     fn is_satisfied(&self, mesh: &QuadEdgeMesh, _count: usize, _measure: f64) -> bool {
//!         mesh.num_points() <= self.0
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decimate;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::decimate::{
        decimate, DecimateOptions, DecimationCriterion, DecimationReport, Decimator,
        FaceCountCriterion, MeasureBoundCriterion, PointCountCriterion,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{build_from_triangles, to_face_vertex, EdgeId, QuadEdgeMesh, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
