//! Survivor placement policies.
//!
//! When a collapse succeeds, the two endpoints merge into one surviving
//! point. With relocation enabled the driver asks a [`Relocator`] where
//! that survivor should sit; the query happens while the candidate edge
//! still exists, before the mutation.

use nalgebra::Point3;

use crate::mesh::{EdgeId, QuadEdgeMesh};

/// Chooses the position of the point surviving a collapse.
pub trait Relocator {
    /// The position for the merged endpoint of `edge`.
    fn relocate(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> Point3<f64>;
}

/// Places the survivor at the midpoint of the collapsed edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MidpointRelocator;

impl Relocator for MidpointRelocator {
    fn relocate(&self, mesh: &QuadEdgeMesh, edge: EdgeId) -> Point3<f64> {
        mesh.edge_midpoint(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use approx::assert_relative_eq;

    #[test]
    fn test_midpoint_relocation() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let mesh = build_from_triangles(&points, &[[0, 1, 2]]).unwrap();
        let e = mesh.edge_cells().next().unwrap();

        let expected = mesh.edge_midpoint(e);
        let got = MidpointRelocator.relocate(&mesh, e);
        assert_relative_eq!(got.x, expected.x);
        assert_relative_eq!(got.y, expected.y);
        assert_relative_eq!(got.z, expected.z);
    }
}
