//! Mesh construction utilities.
//!
//! This module provides functions for building quad-edge meshes from
//! face-vertex lists as commonly found in mesh file formats, and for
//! converting back.
//!
//! Faces must be consistently wound (counterclockwise seen from the same
//! side). The builder pairs the two directed halves of every undirected
//! edge, derives the `onext` rings from left-face incidence, and closes
//! the single border gap each boundary point is allowed to have. Input
//! that cannot form a 2-manifold (an edge with more than two incident
//! faces, a point whose faces form more than one fan) is rejected.

use std::collections::HashMap;

use nalgebra::Point3;

use super::index::{EdgeId, VertexId};
use super::quadedge::QuadEdgeMesh;
use crate::error::{MeshError, Result};

/// Build a quad-edge mesh from points and triangle faces.
///
/// # Arguments
/// * `points` - List of point positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices in
///   counterclockwise order
///
/// # Returns
/// A quad-edge mesh, or an error if the input is invalid or non-manifold.
///
/// # Example
/// ```
/// use whittle::mesh::{build_from_triangles, QuadEdgeMesh};
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&points, &faces).unwrap();
/// assert_eq!(mesh.num_points(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    points: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<QuadEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate indices and reject degenerate faces up front
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= points.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = QuadEdgeMesh::with_capacity(points.len(), faces.len());

    let point_ids: Vec<VertexId> = points.iter().map(|&pos| mesh.add_point(pos)).collect();

    // Map from undirected endpoint pair to one half of its cell
    let mut cell_map: HashMap<(usize, usize), EdgeId> = HashMap::new();

    let mut directed = |mesh: &mut QuadEdgeMesh, u: usize, w: usize| -> EdgeId {
        let key = if u < w { (u, w) } else { (w, u) };
        let half = *cell_map
            .entry(key)
            .or_insert_with(|| mesh.push_cell(point_ids[u], point_ids[w]));
        if mesh.origin(half) == point_ids[u] {
            half
        } else {
            half.sym()
        }
    };

    // First pass: one cell per undirected edge, left faces marked, and
    // the onext links the faces induce. The face on the left of u -> w
    // makes u -> x its onext, with x the third vertex of that face.
    for face in faces {
        let [v0, v1, v2] = *face;
        let e01 = directed(&mut mesh, v0, v1);
        let e12 = directed(&mut mesh, v1, v2);
        let e20 = directed(&mut mesh, v2, v0);
        let e02 = e20.sym();
        let e10 = e01.sym();
        let e21 = e12.sym();

        for (e, (a, b)) in [(e01, (v0, v1)), (e12, (v1, v2)), (e20, (v2, v0))] {
            if mesh.has_left(e) {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            mesh.half_mut(e).has_left = true;
        }
        mesh.live_faces += 1;

        mesh.link_ring(e01, e02);
        mesh.link_ring(e12, e10);
        mesh.link_ring(e20, e21);

        mesh.set_point_edge(point_ids[v0], e01);
        mesh.set_point_edge(point_ids[v1], e12);
        mesh.set_point_edge(point_ids[v2], e20);
    }

    close_border_gaps(&mut mesh)?;

    Ok(mesh)
}

/// Link the border-outgoing edge of every boundary point to the edge on
/// the far side of its gap, closing the origin ring.
///
/// A point whose incident faces leave more than one gap does not have a
/// single fan and the mesh is not a manifold.
fn close_border_gaps(mesh: &mut QuadEdgeMesh) -> Result<()> {
    let mut missing_onext: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();
    let mut missing_oprev: HashMap<VertexId, Vec<EdgeId>> = HashMap::new();

    let cell_count = mesh.cells.len();
    for c in 0..cell_count {
        for side in 0..2 {
            let e = EdgeId::from_cell(c, side);
            if !mesh.is_live_edge(e) {
                continue;
            }
            let v = mesh.origin(e);
            if !mesh.onext(e).is_valid() {
                missing_onext.entry(v).or_default().push(e);
            }
            if !mesh.oprev(e).is_valid() {
                missing_oprev.entry(v).or_default().push(e);
            }
        }
    }

    for (v, opens) in missing_onext {
        let closes = missing_oprev.remove(&v).unwrap_or_default();
        if opens.len() != 1 || closes.len() != 1 {
            return Err(MeshError::NonManifold {
                details: format!("point {} is incident to more than one fan", v.index()),
            });
        }
        mesh.link_ring(opens[0], closes[0]);
    }
    if let Some((v, _)) = missing_oprev.into_iter().next() {
        return Err(MeshError::NonManifold {
            details: format!("point {} has an open edge ring", v.index()),
        });
    }

    Ok(())
}

/// Convert a quad-edge mesh back to a face-vertex representation,
/// compacting away deleted points.
///
/// Returns a (points, faces) tuple.
pub fn to_face_vertex(mesh: &QuadEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap: HashMap<VertexId, usize> = HashMap::new();
    let mut points = Vec::with_capacity(mesh.num_points());
    for v in mesh.point_ids() {
        remap.insert(v, points.len());
        points.push(*mesh.position(v));
    }

    let mut faces = Vec::with_capacity(mesh.num_faces());
    for e in mesh.edge_cells() {
        for e in [e, e.sym()] {
            if !mesh.has_left(e) {
                continue;
            }
            let a = mesh.lnext(e);
            let b = mesh.lnext(a);
            // Emit each triangle once, from its smallest directed edge
            if e < a && e < b {
                faces.push([
                    remap[&mesh.origin(e)],
                    remap[&mesh.origin(a)],
                    remap[&mesh.origin(b)],
                ]);
            }
        }
    }

    (points, faces)
}
