//! Priority-driven edge-collapse decimation.
//!
//! This module reduces the number of triangles in a mesh by repeatedly
//! collapsing the cheapest edge according to a pluggable criterion. Three
//! pieces cooperate:
//!
//! - a [`CandidateQueue`] keeping every edge ranked by cost, with in-place
//!   reprioritization, targeted removal, and tombstones for permanently
//!   refused edges;
//! - the [`join_vertex`] operator, which performs the mesh mutation and
//!   classifies every configuration it must refuse;
//! - the [`Decimator`] driver, which extracts candidates, applies the
//!   operator, repairs after refusals, and reprices the neighborhood of
//!   every collapse.
//!
//! # Example
//!
//! ```
//! use whittle::decimate::{decimate, DecimateOptions, FaceCountCriterion};
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let mut points = Vec::new();
//! let mut faces = Vec::new();
//! for j in 0..=3usize {
//!     for i in 0..=3usize {
//!         points.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! for j in 0..3 {
//!     for i in 0..3 {
//!         let v00 = j * 4 + i;
//!         faces.push([v00, v00 + 1, v00 + 5]);
//!         faces.push([v00, v00 + 5, v00 + 4]);
//!     }
//! }
//! let mut mesh = build_from_triangles(&points, &faces).unwrap();
//!
//! // Reduce to at most 8 faces
//! let report = decimate(&mut mesh, &FaceCountCriterion::new(8), &DecimateOptions::default()).unwrap();
//! assert!(mesh.num_faces() <= 8);
//! println!("{}", report);
//! ```

mod criterion;
mod driver;
mod join;
mod queue;
mod relocate;

pub use criterion::{
    DecimationCriterion, FaceCountCriterion, MeasureBoundCriterion, PointCountCriterion,
};
pub use driver::{decimate, DecimationReport, Decimator, StepOutcome, StopReason};
pub use join::{join_vertex, EdgeStatus, JoinVertex};
pub use queue::{CandidateQueue, EdgeKey, Priority};
pub use relocate::{MidpointRelocator, Relocator};

/// Options for edge-collapse decimation.
#[derive(Debug, Clone)]
pub struct DecimateOptions {
    /// Move the surviving point to a position chosen by the relocator.
    /// When off, the survivor takes the position of the endpoint with the
    /// smaller handle.
    pub relocate: bool,

    /// Reserved: reject collapses that would flip a triangle. Currently
    /// never consulted; a future implementation must first define what
    /// the orientation check means.
    pub check_orientation: bool,
}

impl Default for DecimateOptions {
    fn default() -> Self {
        Self {
            relocate: true,
            check_orientation: false,
        }
    }
}

impl DecimateOptions {
    /// Set whether the survivor is relocated.
    pub fn with_relocate(mut self, relocate: bool) -> Self {
        self.relocate = relocate;
        self
    }

    /// Set the reserved orientation-check flag.
    pub fn with_check_orientation(mut self, check: bool) -> Self {
        self.check_orientation = check;
        self
    }
}
