//! The join-vertex operator.
//!
//! Collapsing a directed edge `e = (o -> d)` merges `d` into `o`: the two
//! wing triangles of `e` disappear, the duplicated wing edges weld into
//! one, and the remaining edges of `d` are re-origined onto `o` in ring
//! order. Not every edge admits this mutation on a 2-manifold; the
//! operator first classifies the local configuration and refuses, with a
//! precise [`EdgeStatus`], whenever the collapse would pinch, fold or
//! orphan the surface. On refusal the mesh is left untouched.
//!
//! The caller owns the aftermath of success: deleting the retired point,
//! repositioning the survivor, and repricing the surviving neighborhood.

use std::collections::HashSet;

use crate::mesh::{EdgeId, QuadEdgeMesh, VertexId};

/// Why a join-vertex was refused.
///
/// Each status corresponds to a distinct local configuration and carries
/// its own recovery in the decimation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    /// The handle is stale, the cell is dead, or an endpoint is detached.
    NullEdge,

    /// The edge's origin rings are malformed (degenerate input).
    FaceIsolated,

    /// A wire edge, attached to no face on either side.
    IsolatedEdge,

    /// The endpoints share more ring neighbors than the incident faces
    /// account for; collapsing would create a non-manifold edge.
    TooManyCommonVertices,

    /// The local subcomplex is a closed tetrahedron.
    Tetrahedron,

    /// Two triangles over the same three vertices with opposite
    /// orientation; every vertex has order 2.
    Samosa,

    /// Two triangles sharing three vertices and two edges, the third
    /// edge doubled; exactly one endpoint has order 2.
    Eye,

    /// The endpoints lie on two distinct border loops; collapsing would
    /// weld the borders together.
    JoinsDifferentBorders,
}

/// Report of a successful join-vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinVertex {
    /// The endpoint that absorbed the edge.
    pub survivor: VertexId,

    /// The retired endpoint. It is still present in the mesh, detached
    /// from every edge; the caller deletes it.
    pub removed: VertexId,
}

/// Collapse the directed edge `e`, merging its destination into its
/// origin.
///
/// On success the mesh has lost the edge cell of `e`, one wing cell and
/// one face per incident triangle, and the removed endpoint's remaining
/// edges now radiate from the survivor. On failure the mesh is unchanged
/// and the status tells the caller which repair applies.
pub fn join_vertex(mesh: &mut QuadEdgeMesh, e: EdgeId) -> Result<JoinVertex, EdgeStatus> {
    if let Some(status) = classify(mesh, e) {
        return Err(status);
    }

    let sym_e = e.sym();
    let o = mesh.origin(e);
    let d = mesh.origin(sym_e);
    let left = mesh.has_left(e);
    let right = mesh.has_left(sym_e);

    // Wing handles. The left triangle of e is (o, d, lv) with
    // b = o -> lv kept and a = d -> lv welded away; mirrored on the
    // right with c = o -> rv and z = d -> rv.
    let b = mesh.onext(e);
    let c = mesh.oprev(e);
    let a = mesh.oprev(sym_e);
    let z = mesh.onext(sym_e);

    // The edges of d that survive, in ring order after sym(e). Collected
    // before any surgery: deleting the wing cells breaks d's ring.
    let mut seq = Vec::new();
    let mut x = mesh.onext(sym_e);
    while x != sym_e {
        if !(left && x == a) && !(right && x == z) {
            seq.push(x);
        }
        x = mesh.onext(x);
    }

    if left {
        // Weld (d, lv) onto (o, lv): lv -> o takes over the face beyond
        // the dying cell, and lv's ring drops lv -> d.
        let lv = mesh.origin(a.sym());
        mesh.unlink_from_ring(a.sym());
        let beyond = mesh.has_left(a.sym());
        mesh.half_mut(b.sym()).has_left = beyond;
        mesh.set_point_edge(lv, b.sym());
        mesh.delete_cell(a);
        mesh.live_faces -= 1;
    }
    if right {
        // Mirror weld of (d, rv) onto (o, rv).
        let rv = mesh.origin(z.sym());
        mesh.unlink_from_ring(z.sym());
        let beyond = mesh.has_left(z);
        mesh.half_mut(c).has_left = beyond;
        mesh.set_point_edge(rv, c.sym());
        mesh.delete_cell(z);
        mesh.live_faces -= 1;
    }

    // Cut e out of o's ring and splice d's surviving edges in its place,
    // preserving the counterclockwise order of both fans.
    for &x in &seq {
        mesh.half_mut(x).origin = o;
    }
    if seq.is_empty() {
        mesh.link_ring(c, b);
    } else {
        mesh.link_ring(c, seq[0]);
        for w in seq.windows(2) {
            mesh.link_ring(w[0], w[1]);
        }
        mesh.link_ring(*seq.last().expect("non-empty seq"), b);
    }

    mesh.set_point_edge(o, b);
    mesh.set_point_edge(d, EdgeId::invalid());
    mesh.delete_cell(e);

    Ok(JoinVertex {
        survivor: o,
        removed: d,
    })
}

/// Classify the configuration around `e`; `None` means the collapse may
/// proceed.
pub fn classify(mesh: &QuadEdgeMesh, e: EdgeId) -> Option<EdgeStatus> {
    if !e.is_valid() || !mesh.is_live_edge(e) {
        return Some(EdgeStatus::NullEdge);
    }
    let (o, d) = mesh.endpoints(e);
    if mesh.point(o).is_none() || mesh.point(d).is_none() {
        return Some(EdgeStatus::NullEdge);
    }

    for half in [e, e.sym()] {
        let next = mesh.onext(half);
        let prev = mesh.oprev(half);
        if !next.is_valid()
            || !prev.is_valid()
            || !mesh.is_live_edge(next)
            || !mesh.is_live_edge(prev)
        {
            return Some(EdgeStatus::FaceIsolated);
        }
    }

    let left = mesh.has_left(e);
    let right = mesh.has_left(e.sym());
    if !left && !right {
        return Some(EdgeStatus::IsolatedEdge);
    }

    // Link condition: the endpoints may share exactly one ring neighbor
    // per incident face (the wing vertices); any extra shared neighbor
    // would become a duplicate edge after the collapse.
    let faces_on_e = usize::from(left) + usize::from(right);
    let common = common_neighbors(mesh, e);
    if common > faces_on_e {
        return Some(EdgeStatus::TooManyCommonVertices);
    }

    if common == 2 && left && right && is_tetrahedron(mesh, e) {
        return Some(EdgeStatus::Tetrahedron);
    }

    if left && right {
        let order_o = ring_order(mesh, e);
        let order_d = ring_order(mesh, e.sym());
        if order_o == 2 && order_d == 2 {
            return Some(EdgeStatus::Samosa);
        }
        if (order_o == 2) != (order_d == 2) {
            return Some(EdgeStatus::Eye);
        }
        if links_two_borders(mesh, o, d) {
            return Some(EdgeStatus::JoinsDifferentBorders);
        }
    }

    None
}

/// Valence of the origin of `e`, counted along its ring.
fn ring_order(mesh: &QuadEdgeMesh, e: EdgeId) -> usize {
    1 + mesh.onext_ring(e).count()
}

/// Number of points adjacent to both endpoints of `e`.
fn common_neighbors(mesh: &QuadEdgeMesh, e: EdgeId) -> usize {
    let around = |start: EdgeId| -> HashSet<VertexId> {
        std::iter::once(start)
            .chain(mesh.onext_ring(start))
            .map(|x| mesh.destination(x))
            .collect()
    };
    let n_o = around(e);
    let n_d = around(e.sym());
    n_o.intersection(&n_d).count()
}

/// Whether the subcomplex around `e` is a closed tetrahedron: all four
/// vertices of order 3 and the cap edge carrying both its faces.
fn is_tetrahedron(mesh: &QuadEdgeMesh, e: EdgeId) -> bool {
    let to_lv = mesh.onext(e);
    let to_rv = mesh.oprev(e);
    if ring_order(mesh, e) != 3 || ring_order(mesh, e.sym()) != 3 {
        return false;
    }
    if ring_order(mesh, to_lv.sym()) != 3 || ring_order(mesh, to_rv.sym()) != 3 {
        return false;
    }
    let lv = mesh.destination(to_lv);
    let rv = mesh.destination(to_rv);
    match mesh.find_edge_between(lv, rv) {
        Some(cap) => !mesh.is_border_edge(cap) && !mesh.is_border_edge(e),
        None => false,
    }
}

/// Whether `o` and `d` sit on two distinct border loops.
fn links_two_borders(mesh: &QuadEdgeMesh, o: VertexId, d: VertexId) -> bool {
    let Some(start) = mesh.border_edge_at(o) else {
        return false;
    };
    if mesh.border_edge_at(d).is_none() {
        return false;
    }
    // Walk o's border loop; if it never passes through d the two points
    // border different holes.
    let mut x = start;
    loop {
        if mesh.origin(x) == d {
            return false;
        }
        x = mesh.lnext(x);
        if x == start {
            return true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn tetrahedron() -> QuadEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&points, &faces).unwrap()
    }

    fn grid(n: usize) -> QuadEdgeMesh {
        let mut points = Vec::new();
        let mut faces = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                points.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        build_from_triangles(&points, &faces).unwrap()
    }

    fn samosa() -> QuadEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        build_from_triangles(&points, &[[0, 1, 2], [1, 0, 2]]).unwrap()
    }

    fn prism_tube() -> QuadEdgeMesh {
        // Open tube: two triangle border loops, six side faces
        let points = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.5, 1.0, 1.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![
            [0, 1, 4],
            [0, 4, 3],
            [1, 2, 5],
            [1, 5, 4],
            [2, 0, 3],
            [2, 3, 5],
        ];
        build_from_triangles(&points, &faces).unwrap()
    }

    /// Two triangles over three points whose shared third edge is
    /// doubled: the eye. The builder pairs edges by endpoints, so the
    /// doubled cell is spliced in by hand from a samosa.
    fn eye() -> (QuadEdgeMesh, EdgeId) {
        let mut mesh = samosa();
        let v0 = VertexId::new(0);
        let v1 = VertexId::new(1);
        let v2 = VertexId::new(2);

        let e01 = mesh.find_edge_between(v0, v1).unwrap();
        let e02 = mesh.find_edge_between(v0, v2).unwrap();
        let e20 = e02.sym();

        // Second (0, 2) cell takes over the face on the left of 0 -> 2;
        // the old cell keeps the other face and goes border on that side.
        let d0 = mesh.push_cell(v0, v2);
        let d1 = d0.sym();
        let moved = mesh.has_left(e02);
        mesh.half_mut(d0).has_left = moved;
        mesh.half_mut(e02).has_left = false;

        // Ring at 0: [0->1, old 0->2, new 0->2]
        mesh.link_ring(e01, e02);
        mesh.link_ring(e02, d0);
        mesh.link_ring(d0, e01);
        // Ring at 2: [old 2->0, 2->1, new 2->0]
        let e21 = mesh.find_edge_between(v2, v1).unwrap();
        mesh.link_ring(e20, e21);
        mesh.link_ring(e21, d1);
        mesh.link_ring(d1, e20);

        (mesh, e01)
    }

    #[test]
    fn test_interior_collapse_succeeds() {
        let mut mesh = grid(2);
        let center = VertexId::new(4);
        let neighbor = VertexId::new(5);
        let e = mesh.find_edge_between(center, neighbor).unwrap();
        assert!(!mesh.is_border_edge(e));

        let points_before = mesh.num_points();
        let faces_before = mesh.num_faces();
        let edges_before = mesh.num_edges();

        let join = join_vertex(&mut mesh, e).unwrap();
        assert_eq!(join.survivor, center);
        assert_eq!(join.removed, neighbor);

        mesh.delete_point(join.removed);
        assert_eq!(mesh.num_points(), points_before - 1);
        assert_eq!(mesh.num_faces(), faces_before - 2);
        assert_eq!(mesh.num_edges(), edges_before - 3);
        assert!(mesh.is_valid());

        // Every former neighbor of the removed point now reaches the
        // survivor
        assert!(mesh.find_edge_between(center, VertexId::new(2)).is_some());
        assert!(mesh.find_edge(join.removed).is_none());
    }

    #[test]
    fn test_border_collapse_succeeds() {
        let mut mesh = grid(2);
        // Border edge away from the corners
        let e = mesh
            .find_edge_between(VertexId::new(1), VertexId::new(2))
            .unwrap();
        assert!(mesh.is_border_edge(e));

        let faces_before = mesh.num_faces();
        let join = join_vertex(&mut mesh, e).unwrap();
        mesh.delete_point(join.removed);

        assert_eq!(mesh.num_faces(), faces_before - 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_lone_triangle_collapse_leaves_wire() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mut mesh = build_from_triangles(&points, &[[0, 1, 2]]).unwrap();
        let e = mesh
            .find_edge_between(VertexId::new(0), VertexId::new(1))
            .unwrap();

        let join = join_vertex(&mut mesh, e).unwrap();
        mesh.delete_point(join.removed);

        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_edges(), 1);
        assert_eq!(mesh.num_points(), 2);
        assert!(mesh.is_valid());

        // What is left is a wire edge, which classifies as isolated
        let wire = mesh.edge_cells().next().unwrap();
        assert_eq!(classify(&mesh, wire), Some(EdgeStatus::IsolatedEdge));
    }

    #[test]
    fn test_tetrahedron_refused() {
        let mut mesh = tetrahedron();
        let before = mesh.clone();
        for e in before.edge_cells().collect::<Vec<_>>() {
            assert_eq!(join_vertex(&mut mesh, e), Err(EdgeStatus::Tetrahedron));
        }
        // Mesh untouched by refusals
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_samosa_refused() {
        let mut mesh = samosa();
        for e in mesh.edge_cells().collect::<Vec<_>>() {
            assert_eq!(join_vertex(&mut mesh, e), Err(EdgeStatus::Samosa));
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_eye_refused() {
        let (mut mesh, e01) = eye();
        assert!(mesh.is_valid());
        assert_eq!(ring_order(&mesh, e01.sym()), 2);
        assert_eq!(join_vertex(&mut mesh, e01), Err(EdgeStatus::Eye));
        assert_eq!(join_vertex(&mut mesh, e01.sym()), Err(EdgeStatus::Eye));
    }

    #[test]
    fn test_too_many_common_vertices_refused() {
        // A folded fan where points 0 and 1 share three neighbors
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 4], [0, 2, 3], [3, 2, 1]];
        let mut mesh = build_from_triangles(&points, &faces).unwrap();
        let e = mesh
            .find_edge_between(VertexId::new(0), VertexId::new(1))
            .unwrap();
        assert_eq!(
            join_vertex(&mut mesh, e),
            Err(EdgeStatus::TooManyCommonVertices)
        );
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_different_borders_refused() {
        let mut mesh = prism_tube();
        let e = mesh
            .find_edge_between(VertexId::new(0), VertexId::new(3))
            .unwrap();
        assert!(!mesh.is_border_edge(e));
        assert_eq!(
            join_vertex(&mut mesh, e),
            Err(EdgeStatus::JoinsDifferentBorders)
        );
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_same_border_not_refused() {
        // Both endpoints of an interior grid edge next to the boundary
        // touch the single border loop; that is not a border weld
        let mut mesh = grid(2);
        let e = mesh
            .find_edge_between(VertexId::new(1), VertexId::new(4))
            .unwrap();
        assert!(!mesh.is_border_edge(e));
        assert!(join_vertex(&mut mesh, e).is_ok());
    }

    #[test]
    fn test_null_edge() {
        let mut mesh = grid(1);
        assert_eq!(
            join_vertex(&mut mesh, EdgeId::invalid()),
            Err(EdgeStatus::NullEdge)
        );

        let e = mesh.edge_cells().next().unwrap();
        mesh.delete_cell(e);
        assert_eq!(join_vertex(&mut mesh, e), Err(EdgeStatus::NullEdge));
    }

    #[test]
    fn test_collapse_preserves_ring_orders() {
        let mut mesh = grid(3);
        let e = mesh
            .find_edge_between(VertexId::new(5), VertexId::new(6))
            .unwrap();
        let o = mesh.origin(e);

        let order_o = mesh.order(o);
        let order_d = mesh.order(mesh.destination(e));
        let join = join_vertex(&mut mesh, e).unwrap();
        mesh.delete_point(join.removed);

        // Survivor absorbed the destination's fan minus the two welded
        // wings and the collapsed edge itself
        assert_eq!(mesh.order(o), order_o + order_d - 4);
        assert!(mesh.is_valid());
    }
}
