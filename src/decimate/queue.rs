//! Candidate queue for edge collapses.
//!
//! Every undirected edge of the mesh is ranked by a `(dead, measure)`
//! priority. The queue is a binary min-heap indexed by a mapper from
//! canonical edge keys to heap slots, which makes three operations cheap
//! that a plain heap cannot do: reprioritize an entry in place, delete an
//! interior entry, and answer "is this edge queued?".
//!
//! Dead entries are tombstones: they rank after every live entry and mark
//! edges the engine has permanently refused to process. Tagging an edge
//! dead wins over any later attempt to re-insert it.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::mesh::{EdgeId, QuadEdgeMesh};

/// The canonical key of an undirected edge.
///
/// Both directed halves of an edge canonicalize to the half whose origin
/// handle is smaller, so they share one queue slot.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EdgeKey(EdgeId);

impl EdgeKey {
    /// Canonicalize a directed edge: `e` if `origin(e) < destination(e)`,
    /// otherwise `sym(e)`.
    pub fn canonical(mesh: &QuadEdgeMesh, e: EdgeId) -> EdgeKey {
        if mesh.origin(e) < mesh.destination(e) {
            EdgeKey(e)
        } else {
            EdgeKey(e.sym())
        }
    }

    /// The canonical directed edge this key names.
    #[inline]
    pub fn edge(self) -> EdgeId {
        self.0
    }
}

/// Queue priority of a candidate edge: live entries order before dead
/// ones, then by increasing measure.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Priority {
    /// Tombstone flag; a dead entry is never processed again.
    pub dead: bool,
    /// Collapse cost, smaller is cheaper.
    pub measure: f64,
}

impl Priority {
    /// A live priority with the given measure.
    pub fn live(measure: f64) -> Self {
        Self {
            dead: false,
            measure,
        }
    }

    /// The tombstone priority.
    pub fn tombstone() -> Self {
        Self {
            dead: true,
            measure: 0.0,
        }
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dead.cmp(&other.dead).then_with(|| {
            self.measure
                .partial_cmp(&other.measure)
                .unwrap_or(Ordering::Equal)
        })
    }
}

/// Indexed min-heap of collapse candidates.
///
/// The mapper is updated on every heap move, so at any time exactly one
/// slot exists per queued canonical edge and the two views never disagree.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    heap: Vec<(EdgeKey, Priority)>,
    slots: HashMap<EdgeKey, usize>,
}

impl CandidateQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Number of queued entries, tombstones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue holds no entries at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The priority currently recorded for an edge, if it is queued.
    pub fn priority_of(&self, key: EdgeKey) -> Option<Priority> {
        self.slots.get(&key).map(|&i| self.heap[i].1)
    }

    /// The cheapest entry without removing it.
    pub fn peek(&self) -> Option<(EdgeKey, Priority)> {
        self.heap.first().copied()
    }

    /// Insert a new entry. The key must not already be queued.
    pub fn push(&mut self, key: EdgeKey, priority: Priority) {
        debug_assert!(!self.slots.contains_key(&key), "duplicate queue entry");
        let i = self.heap.len();
        self.heap.push((key, priority));
        self.slots.insert(key, i);
        self.sift_up(i);
    }

    /// Remove and return the cheapest entry.
    pub fn pop(&mut self) -> Option<(EdgeKey, Priority)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let entry = self.heap.pop().expect("non-empty heap");
        self.slots.remove(&entry.0);
        if !self.heap.is_empty() {
            self.slots.insert(self.heap[0].0, 0);
            self.sift_down(0);
        }
        Some(entry)
    }

    /// Reprioritize a queued entry in place.
    ///
    /// Other entries keep their identity; only heap positions move.
    pub fn update(&mut self, key: EdgeKey, priority: Priority) {
        let i = *self.slots.get(&key).expect("update of unqueued edge");
        self.heap[i].1 = priority;
        self.repair(i);
    }

    /// Remove a queued entry, wherever it sits in the heap.
    pub fn remove(&mut self, key: EdgeKey) -> Option<Priority> {
        let i = self.slots.remove(&key)?;
        let last = self.heap.len() - 1;
        self.heap.swap(i, last);
        let entry = self.heap.pop().expect("non-empty heap");
        if i <= last && i < self.heap.len() {
            self.slots.insert(self.heap[i].0, i);
            self.repair(i);
        }
        Some(entry.1)
    }

    /// Targeted removal during candidate pre-processing: a tombstone is
    /// left in place, anything else is removed entirely.
    pub fn delete_element(&mut self, key: EdgeKey) {
        match self.priority_of(key) {
            Some(p) if p.dead => {}
            Some(_) => {
                self.remove(key);
            }
            None => {}
        }
    }

    /// Insert a live entry, or refresh the measure of an existing live
    /// entry. A tombstone is left untouched: dead wins.
    pub fn push_or_update(&mut self, key: EdgeKey, measure: f64) {
        match self.priority_of(key) {
            Some(p) if p.dead => {}
            Some(_) => self.update(key, Priority::live(measure)),
            None => self.push(key, Priority::live(measure)),
        }
    }

    /// Mark an edge permanently refused: its entry becomes a tombstone,
    /// inserted fresh if the edge is not queued.
    pub fn tag_dead(&mut self, key: EdgeKey) {
        if self.slots.contains_key(&key) {
            self.update(key, Priority::tombstone());
        } else {
            self.push(key, Priority::tombstone());
        }
    }

    fn repair(&mut self, i: usize) {
        if i > 0 && self.heap[i].1 < self.heap[(i - 1) / 2].1 {
            self.sift_up(i);
        } else {
            self.sift_down(i);
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i].1 >= self.heap[parent].1 {
                break;
            }
            self.swap_slots(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.heap[left].1 < self.heap[smallest].1 {
                smallest = left;
            }
            if right < len && self.heap[right].1 < self.heap[smallest].1 {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.swap_slots(i, smallest);
            i = smallest;
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].0, a);
        self.slots.insert(self.heap[b].0, b);
    }

    /// All queued entries, in heap order.
    #[cfg(test)]
    pub(crate) fn entries(&self) -> impl Iterator<Item = (EdgeKey, Priority)> + '_ {
        self.heap.iter().copied()
    }

    /// Verify mapper/heap coherence and the heap ordering invariant.
    #[cfg(test)]
    pub(crate) fn check_consistency(&self) {
        assert_eq!(self.heap.len(), self.slots.len());
        for (key, &i) in &self.slots {
            assert_eq!(self.heap[i].0, *key, "mapper slot points at wrong entry");
        }
        for i in 1..self.heap.len() {
            let parent = (i - 1) / 2;
            assert!(
                self.heap[parent].1 <= self.heap[i].1,
                "heap order violated at slot {}",
                i
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use nalgebra::Point3;

    fn key(cell: usize) -> EdgeKey {
        EdgeKey(EdgeId::from_cell(cell, 0))
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::live(5.0) < Priority::live(6.0));
        // Any live entry ranks before any dead one
        assert!(Priority::live(f64::INFINITY) < Priority::tombstone());
        assert!(Priority::tombstone() == Priority::tombstone());
    }

    #[test]
    fn test_pop_order() {
        let mut q = CandidateQueue::new();
        q.push(key(0), Priority::live(3.0));
        q.push(key(1), Priority::live(1.0));
        q.push(key(2), Priority::tombstone());
        q.push(key(3), Priority::live(2.0));
        q.check_consistency();

        let order: Vec<_> = std::iter::from_fn(|| q.pop()).map(|(k, _)| k).collect();
        assert_eq!(order, vec![key(1), key(3), key(0), key(2)]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_update_reorders() {
        let mut q = CandidateQueue::new();
        for i in 0..6 {
            q.push(key(i), Priority::live(i as f64));
        }
        q.update(key(5), Priority::live(-1.0));
        q.update(key(0), Priority::live(10.0));
        q.check_consistency();

        assert_eq!(q.pop().unwrap().0, key(5));
        assert_eq!(q.pop().unwrap().0, key(1));
        q.check_consistency();
    }

    #[test]
    fn test_remove_interior_slot() {
        let mut q = CandidateQueue::new();
        for i in 0..8 {
            q.push(key(i), Priority::live((i * 7 % 5) as f64));
        }
        let removed = q.remove(key(3)).unwrap();
        assert!(!removed.dead);
        assert!(q.priority_of(key(3)).is_none());
        assert_eq!(q.len(), 7);
        q.check_consistency();

        // Remaining handles still resolve
        for i in (0..8).filter(|&i| i != 3) {
            assert!(q.priority_of(key(i)).is_some());
        }
    }

    #[test]
    fn test_delete_element_spares_tombstones() {
        let mut q = CandidateQueue::new();
        q.push(key(0), Priority::live(1.0));
        q.push(key(1), Priority::tombstone());

        q.delete_element(key(0));
        q.delete_element(key(1));
        q.delete_element(key(2)); // absent: no-op

        assert!(q.priority_of(key(0)).is_none());
        assert!(q.priority_of(key(1)).unwrap().dead);
        q.check_consistency();
    }

    #[test]
    fn test_tombstone_wins_over_push_or_update() {
        let mut q = CandidateQueue::new();
        q.tag_dead(key(0));
        q.push_or_update(key(0), 0.25);

        let p = q.priority_of(key(0)).unwrap();
        assert!(p.dead);
        assert_eq!(p.measure, 0.0);
    }

    #[test]
    fn test_push_or_update_refreshes_live_measure() {
        let mut q = CandidateQueue::new();
        q.push_or_update(key(0), 4.0);
        q.push_or_update(key(1), 1.0);
        q.push_or_update(key(0), 0.5);
        q.check_consistency();

        let (k, p) = q.pop().unwrap();
        assert_eq!(k, key(0));
        assert_eq!(p.measure, 0.5);
    }

    #[test]
    fn test_tag_dead_inserts_when_absent() {
        let mut q = CandidateQueue::new();
        q.push(key(0), Priority::live(1.0));
        q.tag_dead(key(0));
        q.tag_dead(key(9));
        assert_eq!(q.len(), 2);
        assert!(q.priority_of(key(9)).unwrap().dead);
        q.check_consistency();
    }

    #[test]
    fn test_canonical_is_idempotent() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&points, &[[0, 1, 2]]).unwrap();

        for e in mesh.edge_cells() {
            for e in [e, e.sym()] {
                let k = EdgeKey::canonical(&mesh, e);
                assert_eq!(EdgeKey::canonical(&mesh, k.edge()), k);
                assert!(mesh.origin(k.edge()) < mesh.destination(k.edge()));
            }
        }
    }
}
