//! Quad-edge mesh data structure.
//!
//! This module provides a quad-edge representation for 2-manifold triangle
//! meshes (possibly with boundary). Every undirected edge is stored as one
//! arena cell holding its two directed half-edges; the two halves are each
//! other's *symmetric* and are addressed by handle arithmetic, see
//! [`EdgeId::sym`].
//!
//! # Structure
//!
//! - Each directed edge knows its **origin** point and its neighbours in
//!   the ring of edges around that origin (**onext** / **oprev**, stored
//!   as a doubly linked circular list).
//! - Face-ring navigation (`lnext`, `lprev`, `rnext`, `rprev`) is derived
//!   from the origin rings through the Guibas–Stolfi identities, so faces
//!   need no storage of their own: the `lnext` orbits of directed edges
//!   that carry a left triangle *are* the faces.
//! - Each point stores one outgoing directed edge as an incident-edge
//!   hint.
//!
//! # Boundary handling
//!
//! A directed edge whose left side is not a triangle has `has_left ==
//! false`; its `lnext` orbit walks the border loop of the adjacent hole
//! (or the outer region). Origin rings are always complete, border or not.
//!
//! # Deletion
//!
//! Points and edge cells are deleted in place by clearing their arena
//! slot. Handles are never reused, so a retained handle either still names
//! its element or names a dead slot, never a different element.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, VertexId};

/// A point in the quad-edge mesh.
#[derive(Debug, Clone)]
pub struct Point {
    /// The 3D position of this point.
    pub position: Point3<f64>,

    /// One outgoing directed edge from this point (incident-edge hint).
    pub edge: EdgeId,
}

impl Point {
    /// Create a new point at the given position, with no incident edge.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            edge: EdgeId::invalid(),
        }
    }
}

/// One directed half of an undirected edge cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HalfEdge {
    /// The point this directed edge originates from.
    pub(crate) origin: VertexId,

    /// The next directed edge counterclockwise around the origin.
    pub(crate) onext: EdgeId,

    /// The previous directed edge counterclockwise around the origin.
    pub(crate) oprev: EdgeId,

    /// Whether a triangle lies on the left of this directed edge.
    pub(crate) has_left: bool,
}

impl HalfEdge {
    fn detached(origin: VertexId) -> Self {
        Self {
            origin,
            onext: EdgeId::invalid(),
            oprev: EdgeId::invalid(),
            has_left: false,
        }
    }
}

/// A quad-edge mesh for 2-manifold triangle meshes.
///
/// Stores points and undirected edge cells in arenas indexed by stable
/// handles, with O(1) ring navigation and in-place deletion.
#[derive(Debug, Clone, Default)]
pub struct QuadEdgeMesh {
    /// All points; deleted points leave `None` slots.
    pub(crate) points: Vec<Option<Point>>,

    /// All undirected edge cells; each holds the two directed halves.
    pub(crate) cells: Vec<Option<[HalfEdge; 2]>>,

    /// Number of live points.
    pub(crate) live_points: usize,

    /// Number of live edge cells.
    pub(crate) live_cells: usize,

    /// Number of live triangles.
    pub(crate) live_faces: usize,
}

impl QuadEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_points: usize, num_faces: usize) -> Self {
        // Closed mesh: E = 3F/2; a bit more with boundary
        let num_cells = num_faces * 3 / 2 + num_faces / 4 + 3;
        Self {
            points: Vec::with_capacity(num_points),
            cells: Vec::with_capacity(num_cells),
            live_points: 0,
            live_cells: 0,
            live_faces: 0,
        }
    }

    // ==================== Accessors ====================

    /// Get the number of live points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.live_points
    }

    /// Get the number of live undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.live_cells
    }

    /// Get the number of live triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.live_faces
    }

    /// Get a point by handle, or `None` if it was deleted or out of range.
    #[inline]
    pub fn point(&self, v: VertexId) -> Option<&Point> {
        if !v.is_valid() {
            return None;
        }
        self.points.get(v.index()).and_then(|p| p.as_ref())
    }

    /// Get the position of a live point.
    ///
    /// # Panics
    /// Panics if the point has been deleted.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.points[v.index()].as_ref().expect("deleted point").position
    }

    /// Set the position of a live point.
    ///
    /// # Panics
    /// Panics if the point has been deleted.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.points[v.index()].as_mut().expect("deleted point").position = pos;
    }

    /// Rebind the incident-edge hint of a live point.
    ///
    /// # Panics
    /// Panics if the point has been deleted.
    #[inline]
    pub fn set_point_edge(&mut self, v: VertexId, e: EdgeId) {
        self.points[v.index()].as_mut().expect("deleted point").edge = e;
    }

    /// Check whether a directed edge handle names a live edge.
    #[inline]
    pub fn is_live_edge(&self, e: EdgeId) -> bool {
        e.is_valid()
            && self
                .cells
                .get(e.cell())
                .map(|c| c.is_some())
                .unwrap_or(false)
    }

    #[inline]
    pub(crate) fn half(&self, e: EdgeId) -> &HalfEdge {
        &self.cells[e.cell()].as_ref().expect("deleted edge cell")[e.side()]
    }

    #[inline]
    pub(crate) fn half_mut(&mut self, e: EdgeId) -> &mut HalfEdge {
        &mut self.cells[e.cell()].as_mut().expect("deleted edge cell")[e.side()]
    }

    // ==================== Topology Queries ====================

    /// Get the origin point of a directed edge.
    #[inline]
    pub fn origin(&self, e: EdgeId) -> VertexId {
        self.half(e).origin
    }

    /// Get the destination point of a directed edge.
    #[inline]
    pub fn destination(&self, e: EdgeId) -> VertexId {
        self.half(e.sym()).origin
    }

    /// Get both endpoints of a directed edge, origin first.
    #[inline]
    pub fn endpoints(&self, e: EdgeId) -> (VertexId, VertexId) {
        (self.origin(e), self.destination(e))
    }

    /// Next directed edge counterclockwise around the origin.
    #[inline]
    pub fn onext(&self, e: EdgeId) -> EdgeId {
        self.half(e).onext
    }

    /// Previous directed edge counterclockwise around the origin.
    #[inline]
    pub fn oprev(&self, e: EdgeId) -> EdgeId {
        self.half(e).oprev
    }

    /// Next directed edge around the left face.
    #[inline]
    pub fn lnext(&self, e: EdgeId) -> EdgeId {
        self.oprev(e.sym())
    }

    /// Previous directed edge around the left face.
    #[inline]
    pub fn lprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e).sym()
    }

    /// Next directed edge around the right face.
    #[inline]
    pub fn rnext(&self, e: EdgeId) -> EdgeId {
        self.oprev(e).sym()
    }

    /// Previous directed edge around the right face.
    #[inline]
    pub fn rprev(&self, e: EdgeId) -> EdgeId {
        self.onext(e.sym())
    }

    /// Whether a triangle lies on the left of this directed edge.
    #[inline]
    pub fn has_left(&self, e: EdgeId) -> bool {
        self.half(e).has_left
    }

    /// Whether the left orbit of this directed edge is a triangle.
    pub fn left_is_triangle(&self, e: EdgeId) -> bool {
        self.has_left(e) && self.lnext(self.lnext(self.lnext(e))) == e
    }

    /// Whether the undirected edge lies on a border (misses a face on
    /// either side).
    #[inline]
    pub fn is_border_edge(&self, e: EdgeId) -> bool {
        !self.has_left(e) || !self.has_left(e.sym())
    }

    /// The valence (number of incident edges) of a point.
    pub fn order(&self, v: VertexId) -> usize {
        self.outgoing_edges(v).count()
    }

    /// An outgoing border directed edge at `v`, if the point lies on a
    /// border.
    ///
    /// The returned edge has no left face; following [`lnext`] from it
    /// walks the border loop.
    ///
    /// [`lnext`]: QuadEdgeMesh::lnext
    pub fn border_edge_at(&self, v: VertexId) -> Option<EdgeId> {
        self.outgoing_edges(v).find(|&e| !self.has_left(e))
    }

    // ==================== Search ====================

    /// Find an edge whose origin is `v`, through the incident-edge hint.
    ///
    /// Returns `None` if the point was deleted or its hint no longer
    /// names a live edge rooted at `v`.
    pub fn find_edge(&self, v: VertexId) -> Option<EdgeId> {
        let hint = self.point(v)?.edge;
        if self.is_live_edge(hint) && self.origin(hint) == v {
            Some(hint)
        } else {
            None
        }
    }

    /// Find the directed edge from `a` to `b`, if it exists.
    pub fn find_edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.outgoing_edges(a).find(|&e| self.destination(e) == b)
    }

    // ==================== Iteration ====================

    /// Iterate over one canonical directed edge per live edge cell.
    ///
    /// The yielded edge of each cell is the half whose origin handle is
    /// the smaller of the two endpoints.
    pub fn edge_cells(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.cells.iter().enumerate().filter_map(|(c, slot)| {
            let halves = slot.as_ref()?;
            let side = usize::from(halves[0].origin > halves[1].origin);
            Some(EdgeId::from_cell(c, side))
        })
    }

    /// Iterate over all live point handles.
    pub fn point_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|_| VertexId::new(i)))
    }

    /// Iterate over all outgoing directed edges of a point, starting at
    /// its incident-edge hint.
    pub fn outgoing_edges(&self, v: VertexId) -> OutgoingEdgeIter<'_> {
        let start = self.find_edge(v).unwrap_or_else(EdgeId::invalid);
        OutgoingEdgeIter {
            mesh: self,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }

    /// Iterate over the `onext` orbit of `origin(e)`, excluding `e`
    /// itself.
    ///
    /// These are exactly the edges whose cost may change when `e` is
    /// collapsed at its origin end.
    pub fn onext_ring(&self, e: EdgeId) -> OnextRingIter<'_> {
        OnextRingIter {
            mesh: self,
            start: e,
            current: self.onext(e),
        }
    }

    // ==================== Geometry ====================

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        self.edge_vector(e).norm()
    }

    /// Compute the squared length of an edge.
    pub fn edge_length_squared(&self, e: EdgeId) -> f64 {
        self.edge_vector(e).norm_squared()
    }

    /// Compute the edge vector (from origin to destination).
    pub fn edge_vector(&self, e: EdgeId) -> Vector3<f64> {
        self.position(self.destination(e)) - self.position(self.origin(e))
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId) -> Point3<f64> {
        let p0 = self.position(self.origin(e));
        let p1 = self.position(self.destination(e));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    // ==================== Construction & Deletion ====================

    /// Add a new point and return its handle.
    pub fn add_point(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.points.len());
        self.points.push(Some(Point::new(position)));
        self.live_points += 1;
        id
    }

    /// Delete a point, leaving a dead slot.
    ///
    /// The caller is responsible for first detaching every edge rooted at
    /// the point; a collapse does this as part of its mutation.
    pub fn delete_point(&mut self, v: VertexId) {
        if let Some(slot) = self.points.get_mut(v.index()) {
            if slot.take().is_some() {
                self.live_points -= 1;
            }
        }
    }

    /// Create a new detached edge cell from `a` to `b`; side 0 is the
    /// `a -> b` half. Ring links start invalid.
    pub(crate) fn push_cell(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let cell = self.cells.len();
        self.cells
            .push(Some([HalfEdge::detached(a), HalfEdge::detached(b)]));
        self.live_cells += 1;
        EdgeId::from_cell(cell, 0)
    }

    /// Delete the undirected cell of `e`, leaving a dead slot.
    pub(crate) fn delete_cell(&mut self, e: EdgeId) {
        if self.cells[e.cell()].take().is_some() {
            self.live_cells -= 1;
        }
    }

    /// Make `b` follow `a` in their shared origin ring.
    #[inline]
    pub(crate) fn link_ring(&mut self, a: EdgeId, b: EdgeId) {
        self.half_mut(a).onext = b;
        self.half_mut(b).oprev = a;
    }

    /// Remove `e` from its origin ring by splicing its neighbours
    /// together. The ring must not be a singleton.
    pub(crate) fn unlink_from_ring(&mut self, e: EdgeId) {
        let prev = self.oprev(e);
        let next = self.onext(e);
        debug_assert!(prev != e && next != e, "cannot unlink a singleton ring");
        self.link_ring(prev, next);
    }

    // ==================== Validation ====================

    /// Check that the mesh is a valid 2-manifold quad-edge structure
    /// (possibly with boundary).
    ///
    /// Verifies ring closure and mutual `onext`/`oprev` consistency,
    /// origin consistency along rings, incident-edge hints, triangle
    /// closure of every face orbit, and that no point has more than one
    /// border gap.
    pub fn is_valid(&self) -> bool {
        let edge_bound = self.cells.len() * 2 + 1;

        // Points: hint validity and ring closure
        for v in self.point_ids() {
            let hint = self.point(v).map(|p| p.edge).unwrap_or_default();
            if !hint.is_valid() {
                // Isolated point
                continue;
            }
            let Some(start) = self.find_edge(v) else {
                return false;
            };
            let mut e = start;
            let mut steps = 0;
            let mut border_outgoing = 0;
            loop {
                if !self.is_live_edge(e) || self.origin(e) != v {
                    return false;
                }
                if !self.has_left(e) {
                    border_outgoing += 1;
                }
                let next = self.onext(e);
                if !next.is_valid() || !self.is_live_edge(next) || self.oprev(next) != e {
                    return false;
                }
                e = next;
                steps += 1;
                if e == start {
                    break;
                }
                if steps > edge_bound {
                    return false;
                }
            }
            if border_outgoing > 1 {
                return false;
            }
        }

        // Edges: live endpoints, no loops, triangular left orbits
        for e in self.edge_cells() {
            for e in [e, e.sym()] {
                let (o, d) = self.endpoints(e);
                if self.point(o).is_none() || self.point(d).is_none() || o == d {
                    return false;
                }
                if self.has_left(e) && !self.left_is_triangle(e) {
                    return false;
                }
            }
        }

        true
    }
}

/// Iterator over the outgoing directed edges of a point.
pub struct OutgoingEdgeIter<'a> {
    mesh: &'a QuadEdgeMesh,
    start: EdgeId,
    current: EdgeId,
    done: bool,
}

impl<'a> Iterator for OutgoingEdgeIter<'a> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current;
        self.current = self.mesh.onext(self.current);
        if self.current == self.start {
            self.done = true;
        }
        Some(result)
    }
}

/// Iterator over the `onext` orbit of an edge's origin, excluding the
/// edge itself.
pub struct OnextRingIter<'a> {
    mesh: &'a QuadEdgeMesh,
    start: EdgeId,
    current: EdgeId,
}

impl<'a> Iterator for OnextRingIter<'a> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == self.start {
            return None;
        }
        let result = self.current;
        self.current = self.mesh.onext(self.current);
        Some(result)
    }
}
