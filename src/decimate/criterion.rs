//! Cost criteria and termination predicates.
//!
//! The engine treats the criterion as an opaque adapter with two duties:
//! price a candidate edge, and decide when decimation is done. Measures
//! are not assumed monotone across iterations; a criterion may reprice an
//! edge arbitrarily as its neighborhood changes.
//!
//! # Stock criteria
//!
//! - [`FaceCountCriterion`]: decimate until the face count reaches a
//!   target
//! - [`PointCountCriterion`]: decimate until the point count reaches a
//!   target
//! - [`MeasureBoundCriterion`]: decimate while the cheapest collapse
//!   stays below a cost bound
//!
//! All three price edges by squared length, preferring to collapse the
//! shortest edge first. Custom criteria implement
//! [`DecimationCriterion`].

use crate::mesh::{EdgeId, QuadEdgeMesh};

/// Cost function and termination oracle for the decimation loop.
pub trait DecimationCriterion {
    /// Cost of collapsing this edge; lower collapses first.
    fn measure(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> f64;

    /// Whether decimation should stop.
    ///
    /// `measure` is the priority measure of the most recently extracted
    /// edge (0.0 before the first extraction). `count` is reserved and
    /// currently always 0; criteria that track element budgets read the
    /// mesh directly.
    fn is_satisfied(&self, mesh: &QuadEdgeMesh, count: usize, measure: f64) -> bool;
}

/// Stop when the mesh has at most `target` faces.
#[derive(Debug, Clone)]
pub struct FaceCountCriterion {
    target: usize,
}

impl FaceCountCriterion {
    /// Create a criterion targeting the given face count.
    pub fn new(target: usize) -> Self {
        Self { target }
    }
}

impl DecimationCriterion for FaceCountCriterion {
    fn measure(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> f64 {
        mesh.edge_length_squared(edge)
    }

    fn is_satisfied(&self, mesh: &QuadEdgeMesh, _count: usize, _measure: f64) -> bool {
        mesh.num_faces() <= self.target
    }
}

/// Stop when the mesh has at most `target` points.
#[derive(Debug, Clone)]
pub struct PointCountCriterion {
    target: usize,
}

impl PointCountCriterion {
    /// Create a criterion targeting the given point count.
    pub fn new(target: usize) -> Self {
        Self { target }
    }
}

impl DecimationCriterion for PointCountCriterion {
    fn measure(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> f64 {
        mesh.edge_length_squared(edge)
    }

    fn is_satisfied(&self, mesh: &QuadEdgeMesh, _count: usize, _measure: f64) -> bool {
        mesh.num_points() <= self.target
    }
}

/// Stop once the cheapest remaining collapse costs more than `bound`.
#[derive(Debug, Clone)]
pub struct MeasureBoundCriterion {
    bound: f64,
}

impl MeasureBoundCriterion {
    /// Create a criterion with the given cost bound.
    pub fn new(bound: f64) -> Self {
        Self { bound }
    }
}

impl DecimationCriterion for MeasureBoundCriterion {
    fn measure(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> f64 {
        mesh.edge_length_squared(edge)
    }

    fn is_satisfied(&self, _mesh: &QuadEdgeMesh, _count: usize, measure: f64) -> bool {
        measure > self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn strip() -> QuadEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(1.5, 1.0, 0.0),
        ];
        build_from_triangles(&points, &[[0, 1, 2], [1, 3, 2]]).unwrap()
    }

    #[test]
    fn test_measure_is_squared_length() {
        let mesh = strip();
        let crit = FaceCountCriterion::new(1);
        for e in mesh.edge_cells() {
            let expected = mesh.edge_length(e) * mesh.edge_length(e);
            assert!((crit.measure(&mesh, e) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_face_count_satisfaction() {
        let mesh = strip();
        assert!(!FaceCountCriterion::new(1).is_satisfied(&mesh, 0, 0.0));
        assert!(FaceCountCriterion::new(2).is_satisfied(&mesh, 0, 0.0));
    }

    #[test]
    fn test_point_count_satisfaction() {
        let mesh = strip();
        assert!(!PointCountCriterion::new(3).is_satisfied(&mesh, 0, 0.0));
        assert!(PointCountCriterion::new(4).is_satisfied(&mesh, 0, 0.0));
    }

    #[test]
    fn test_measure_bound_satisfaction() {
        let mesh = strip();
        let crit = MeasureBoundCriterion::new(2.0);
        assert!(!crit.is_satisfied(&mesh, 0, 1.5));
        assert!(crit.is_satisfied(&mesh, 0, 2.5));
    }
}
