//! The decimation driver.
//!
//! Ties the candidate queue, the join-vertex operator, and the criterion
//! together: extract the cheapest edge, re-validate it lazily, collapse
//! or repair, reprice the touched neighborhood, and stop when the
//! criterion is satisfied or the queue drains.
//!
//! The loop itself never fails. Edges that turned stale between queueing
//! and extraction are discarded silently; refused collapses are repaired
//! by tagging the offending edges as permanent tombstones. Errors are
//! only possible while constructing the [`Decimator`], when the input
//! mesh is checked for manifoldness.

use tracing::{debug, trace};

use super::criterion::DecimationCriterion;
use super::join::{join_vertex, EdgeStatus};
use super::queue::{CandidateQueue, EdgeKey, Priority};
use super::relocate::{MidpointRelocator, Relocator};
use super::DecimateOptions;
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, QuadEdgeMesh};

/// Why the decimation loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every candidate was consumed, tagged out, or turned stale.
    QueueExhausted,

    /// The criterion reported satisfaction.
    CriterionSatisfied,
}

/// What a single driver step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An edge was collapsed and its neighborhood repriced.
    Collapsed,

    /// The operator refused the collapse; the repair for the status was
    /// applied.
    Refused(EdgeStatus),

    /// A tombstone reached the top of the queue; nothing happened.
    SkippedDead,

    /// The loop is finished; further steps keep returning this.
    Done(StopReason),
}

/// Statistics of a decimation run.
#[derive(Debug, Clone)]
pub struct DecimationReport {
    /// Number of processed iterations, tombstone hits included.
    pub iterations: usize,

    /// Number of successful collapses.
    pub collapses: usize,

    /// Number of refused collapses.
    pub refusals: usize,

    /// Number of tombstones extracted.
    pub dead_skips: usize,

    /// Why the loop stopped.
    pub stop: StopReason,
}

impl std::fmt::Display for DecimationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decimation: {} collapses, {} refusals in {} iterations ({})",
            self.collapses,
            self.refusals,
            self.iterations,
            match self.stop {
                StopReason::QueueExhausted => "queue exhausted",
                StopReason::CriterionSatisfied => "criterion satisfied",
            }
        )
    }
}

/// Decimate a mesh until the criterion is satisfied or no collapsible
/// edge remains.
///
/// The survivor of each collapse is placed at the edge midpoint when
/// `options.relocate` is on. For a custom placement policy, build a
/// [`Decimator`] with [`Decimator::with_relocator`].
///
/// # Errors
///
/// Fails if the mesh is not a 2-manifold (with or without boundary) at
/// the start; the engine does not attempt repair of broken input.
pub fn decimate<C: DecimationCriterion>(
    mesh: &mut QuadEdgeMesh,
    criterion: &C,
    options: &DecimateOptions,
) -> Result<DecimationReport> {
    let mut decimator = Decimator::new(mesh, criterion, options.clone())?;
    Ok(decimator.run())
}

/// The iteration driver for edge-collapse decimation.
///
/// Owns the mesh borrow, the candidate queue, and its mapper for the
/// duration of a run. The criterion and relocator are consulted but never
/// given mutable access.
pub struct Decimator<'a, C: DecimationCriterion, R: Relocator = MidpointRelocator> {
    mesh: &'a mut QuadEdgeMesh,
    criterion: &'a C,
    relocator: R,
    options: DecimateOptions,
    queue: CandidateQueue,
    iteration: usize,
    collapses: usize,
    refusals: usize,
    dead_skips: usize,
    last_measure: f64,
}

impl<'a, C: DecimationCriterion> Decimator<'a, C> {
    /// Create a driver with the default midpoint relocator.
    ///
    /// Validates the mesh and fills the queue with every edge cell at its
    /// initial measure.
    ///
    /// # Errors
    ///
    /// Fails with [`MeshError::NonManifold`] if the mesh is not a valid
    /// 2-manifold quad-edge structure.
    pub fn new(
        mesh: &'a mut QuadEdgeMesh,
        criterion: &'a C,
        options: DecimateOptions,
    ) -> Result<Self> {
        Self::with_relocator(mesh, criterion, MidpointRelocator, options)
    }
}

impl<'a, C: DecimationCriterion, R: Relocator> Decimator<'a, C, R> {
    /// Create a driver with a custom relocator.
    ///
    /// # Errors
    ///
    /// Fails with [`MeshError::NonManifold`] if the mesh is not a valid
    /// 2-manifold quad-edge structure.
    pub fn with_relocator(
        mesh: &'a mut QuadEdgeMesh,
        criterion: &'a C,
        relocator: R,
        options: DecimateOptions,
    ) -> Result<Self> {
        if !mesh.is_valid() {
            return Err(MeshError::NonManifold {
                details: "decimation input failed validation".into(),
            });
        }

        let mut queue = CandidateQueue::with_capacity(mesh.num_edges());
        for e in mesh.edge_cells() {
            let key = EdgeKey::canonical(mesh, e);
            queue.push(key, Priority::live(criterion.measure(mesh, key.edge())));
        }

        Ok(Self {
            mesh,
            criterion,
            relocator,
            options,
            queue,
            iteration: 0,
            collapses: 0,
            refusals: 0,
            dead_skips: 0,
            last_measure: 0.0,
        })
    }

    /// The mesh being decimated.
    pub fn mesh(&self) -> &QuadEdgeMesh {
        self.mesh
    }

    /// Number of iterations processed so far.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Run one iteration: stop check, extraction, and processing.
    pub fn step(&mut self) -> StepOutcome {
        if self.queue.is_empty() {
            return StepOutcome::Done(StopReason::QueueExhausted);
        }
        if self
            .criterion
            .is_satisfied(self.mesh, 0, self.last_measure)
        {
            return StepOutcome::Done(StopReason::CriterionSatisfied);
        }

        // Lazy re-validation: entries can go stale between queueing and
        // extraction; discard until a live edge surfaces.
        let (key, priority) = loop {
            match self.queue.pop() {
                None => return StepOutcome::Done(StopReason::QueueExhausted),
                Some((key, priority)) => {
                    if self.is_edge_ok(key.edge()) {
                        break (key, priority);
                    }
                    trace!(edge = ?key.edge(), "discarding stale candidate");
                }
            }
        };

        self.iteration += 1;
        self.last_measure = priority.measure;

        if priority.dead {
            trace!(
                iteration = self.iteration,
                edge = ?key.edge(),
                "extracted tombstone"
            );
            self.dead_skips += 1;
            return StepOutcome::SkippedDead;
        }

        self.process(key.edge())
    }

    /// Run the loop to completion.
    pub fn run(&mut self) -> DecimationReport {
        loop {
            if let StepOutcome::Done(stop) = self.step() {
                debug!(
                    iterations = self.iteration,
                    collapses = self.collapses,
                    refusals = self.refusals,
                    "decimation finished"
                );
                return DecimationReport {
                    iterations: self.iteration,
                    collapses: self.collapses,
                    refusals: self.refusals,
                    dead_skips: self.dead_skips,
                    stop,
                };
            }
        }
    }

    /// Attempt one collapse of `e` and keep queue and mesh coherent
    /// whichever way it goes.
    fn process(&mut self, e: EdgeId) -> StepOutcome {
        let (o, d) = self.mesh.endpoints(e);

        // The survivor's position must be captured while the edge still
        // exists: the relocator result, or the lower endpoint's position
        // when relocation is off.
        let new_pos = if self.options.relocate {
            self.relocator.relocate(self.mesh, e)
        } else {
            *self.mesh.position(if o < d { o } else { d })
        };

        // Both origin rings leave the queue now and come back after the
        // attempt, live or dead, at their then-current cost.
        let ring: Vec<EdgeId> = self
            .mesh
            .onext_ring(e)
            .chain(self.mesh.onext_ring(e.sym()))
            .collect();
        for &r in &ring {
            let key = EdgeKey::canonical(self.mesh, r);
            self.queue.delete_element(key);
        }

        match join_vertex(self.mesh, e) {
            Ok(join) => {
                self.mesh.delete_point(join.removed);
                if self.options.relocate {
                    if let Some(hint) = self.mesh.find_edge(join.survivor) {
                        self.mesh.set_point_edge(join.survivor, hint);
                    }
                }
                self.mesh.set_position(join.survivor, new_pos);

                let survivor_ring: Vec<EdgeId> =
                    self.mesh.outgoing_edges(join.survivor).collect();
                for r in survivor_ring {
                    self.push_or_update(r);
                }

                self.collapses += 1;
                debug!(
                    iteration = self.iteration,
                    survivor = ?join.survivor,
                    removed = ?join.removed,
                    "collapsed edge"
                );
                StepOutcome::Collapsed
            }
            Err(status) => {
                for &r in &ring {
                    self.push_or_update(r);
                }
                self.repair(e, status);

                self.refusals += 1;
                debug!(iteration = self.iteration, ?status, "collapse refused");
                StepOutcome::Refused(status)
            }
        }
    }

    /// Recovery dispatch for a refused collapse.
    fn repair(&mut self, e: EdgeId, status: EdgeStatus) {
        let m = &*self.mesh;
        match status {
            EdgeStatus::NullEdge | EdgeStatus::FaceIsolated => {}
            EdgeStatus::IsolatedEdge
            | EdgeStatus::TooManyCommonVertices
            | EdgeStatus::JoinsDifferentBorders => {
                self.tag_out(e);
            }
            EdgeStatus::Tetrahedron => {
                // The seven half-edges bounding the tetrahedral cap
                let targets = [
                    e,
                    m.onext(e),
                    m.oprev(e),
                    e.sym(),
                    m.onext(e.sym()),
                    m.oprev(e.sym()),
                    m.lnext(m.onext(e)),
                ];
                for t in targets {
                    self.tag_out(t);
                }
            }
            EdgeStatus::Samosa => {
                let targets = [m.lnext(e), m.lprev(e), m.rnext(e), m.rprev(e)];
                for t in targets {
                    self.tag_out(t);
                }
            }
            EdgeStatus::Eye => {
                // Work from the half-edge whose sym has order 2
                let qe = if m.order(m.destination(e)) == 2 {
                    e
                } else {
                    e.sym()
                };
                let targets = [qe, m.onext(qe), m.onext(qe.sym()), m.oprev(qe.sym())];
                for t in targets {
                    self.tag_out(t);
                }
            }
        }
    }

    /// Mark an edge as permanently refused.
    fn tag_out(&mut self, e: EdgeId) {
        let key = EdgeKey::canonical(self.mesh, e);
        self.queue.tag_dead(key);
    }

    /// Insert or reprice a live entry for `e`; tombstones win.
    fn push_or_update(&mut self, e: EdgeId) {
        let key = EdgeKey::canonical(self.mesh, e);
        let measure = self.criterion.measure(self.mesh, key.edge());
        self.queue.push_or_update(key, measure);
    }

    /// The extraction-time validity check: the edge and both endpoints
    /// must still exist and be connected.
    fn is_edge_ok(&self, e: EdgeId) -> bool {
        if !e.is_valid() || !self.mesh.is_live_edge(e) {
            return false;
        }
        let (o, d) = self.mesh.endpoints(e);
        o.is_valid()
            && d.is_valid()
            && self.mesh.find_edge(o).is_some()
            && self.mesh.find_edge(d).is_some()
            && self.mesh.find_edge_between(o, d).is_some()
    }

    /// Check queue/mapper/mesh coherence for every live entry.
    #[cfg(test)]
    fn assert_invariants(&self) {
        self.queue.check_consistency();
        for (key, priority) in self.queue.entries() {
            if priority.dead {
                continue;
            }
            let e = key.edge();
            assert!(self.mesh.is_live_edge(e), "live entry for dead edge");
            let (o, d) = self.mesh.endpoints(e);
            assert!(o < d, "non-canonical live key {:?}", key);
            assert!(
                self.mesh.find_edge_between(o, d).is_some(),
                "live entry for dangling edge"
            );
        }
    }
}
