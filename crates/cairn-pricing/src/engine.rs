// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The labeling core and the DSSR driver.
//!
//! One pricing call runs a sequence of labeling iterations. Each
//! iteration grows labels forward from the source and backward from the
//! destination, interleaved, popping from two min-heaps ordered by cost
//! per unit length. A popped label first attempts joins against the
//! opposite direction's non-dominated labels one arc away, then extends
//! if it is still short of the halfway point.
//!
//! Across iterations, the decremental state-space relaxation promotes to
//! "critical" every vertex the iteration's best pricing path visited more
//! than once, and reruns. The loop ends when the best path is elementary,
//! when enough columns have been collected, or when a retry under the
//! stricter dominance form still finds nothing.

use crate::arena::LabelArena;
use crate::duals::PricingDuals;
use crate::graph::ReducedGraph;
use crate::label::{dominates, Direction, Label, LabelId};
use crate::params::{PricingParams, SearchDirection};
use cairn_core::num::strictly_gt;
use cairn_model::error::SolverError;
use cairn_model::index::VertexIndex;
use cairn_model::instance::Neighbor;
use cairn_model::route::Route;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::debug;

/// A heap entry ordering labels by their bang-for-buck ratio, smallest
/// first. Ties break on the arena id so the pop order is deterministic.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    ratio: f64,
    id: LabelId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.ratio.total_cmp(&other.ratio).is_eq() && self.id == other.id
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; invert for a min-heap on the ratio.
        other
            .ratio
            .total_cmp(&self.ratio)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// The best (lowest reduced cost) source-to-destination path seen in the
/// current iteration, elementary or not.
#[derive(Debug, Clone)]
struct BestCandidate {
    path: Vec<VertexIndex>,
    reduced_cost: f64,
    score: f64,
    length: f64,
}

/// The result of one pricing call.
#[derive(Debug, Clone)]
pub struct PricingOutcome {
    /// Elementary routes with reduced cost below `-epsilon`, ordered by
    /// ascending reduced cost, at most `max_columns_added` of them.
    pub routes: Vec<Route>,
    /// The best pricing path of the final iteration. Elementary whenever
    /// the DSSR loop closed regularly.
    pub optimal: Option<Route>,
    /// Number of labeling iterations run.
    pub iterations: usize,
    /// Whether the stricter dominance form was switched on.
    pub used_visit_condition: bool,
}

/// Solves the pricing problem on the given reduced graph under the given
/// duals.
///
/// # Errors
///
/// Returns `SolverError::CyclesWithCriticalVertex` when the relaxation
/// closes on a path that revisits an already-critical vertex, which the
/// extension rules should have made impossible.
pub fn solve(
    graph: &ReducedGraph,
    duals: &PricingDuals,
    params: &PricingParams,
) -> Result<PricingOutcome, SolverError> {
    PricingEngine::new(graph, duals, params).run()
}

/// The labeling engine of a single pricing call.
struct PricingEngine<'a> {
    graph: &'a ReducedGraph,
    duals: &'a PricingDuals,
    params: &'a PricingParams,
    is_critical: Vec<bool>,
    use_visit_condition: bool,
    arena: LabelArena,
    forward_lists: Vec<Vec<LabelId>>,
    backward_lists: Vec<Vec<LabelId>>,
    forward_heap: BinaryHeap<HeapEntry>,
    backward_heap: BinaryHeap<HeapEntry>,
    routes: Vec<Route>,
    seen_paths: HashSet<Vec<VertexIndex>>,
    best: Option<BestCandidate>,
}

impl<'a> PricingEngine<'a> {
    fn new(graph: &'a ReducedGraph, duals: &'a PricingDuals, params: &'a PricingParams) -> Self {
        debug_assert_eq!(
            duals.vertex.len(),
            graph.num_vertices(),
            "called `PricingEngine::new` with a vertex dual vector of mismatched length"
        );
        let n = graph.num_vertices();
        Self {
            graph,
            duals,
            params,
            is_critical: vec![false; n],
            use_visit_condition: false,
            arena: LabelArena::new(),
            forward_lists: vec![Vec::new(); n],
            backward_lists: vec![Vec::new(); n],
            forward_heap: BinaryHeap::new(),
            backward_heap: BinaryHeap::new(),
            routes: Vec::new(),
            seen_paths: HashSet::new(),
            best: None,
        }
    }

    fn run(mut self) -> Result<PricingOutcome, SolverError> {
        if self.params.max_columns_added == 0 {
            return Ok(PricingOutcome {
                routes: Vec::new(),
                optimal: None,
                iterations: 0,
                used_visit_condition: false,
            });
        }

        let mut iterations = 0;
        loop {
            iterations += 1;
            self.run_iteration();

            if self.routes.len() >= self.params.max_columns_added
                || self.routes.len() >= self.params.max_paths_after_search
            {
                break;
            }

            match &self.best {
                Some(best) => {
                    let repeats = repeated_vertices(&best.path);
                    if repeats.is_empty() {
                        break;
                    }
                    for &vertex in &repeats {
                        if self.is_critical[vertex.get()] {
                            return Err(SolverError::CyclesWithCriticalVertex(vertex));
                        }
                    }
                    debug!(
                        iteration = iterations,
                        promoted = repeats.len(),
                        "promoting repeatedly visited vertices to critical"
                    );
                    for &vertex in &repeats {
                        self.is_critical[vertex.get()] = true;
                    }
                }
                None => {
                    if self.use_visit_condition {
                        break;
                    }
                    debug!(
                        iteration = iterations,
                        "no pricing path found, retrying with the strict visit condition"
                    );
                    self.use_visit_condition = true;
                }
            }
        }

        let optimal = self.best.take().map(|best| {
            let elementary = repeated_vertices(&best.path).is_empty();
            Route::new(
                best.path,
                best.score,
                best.length,
                best.reduced_cost,
                elementary,
            )
        });

        let mut routes = std::mem::take(&mut self.routes);
        routes.sort_by(|a, b| a.reduced_cost().total_cmp(&b.reduced_cost()));
        routes.truncate(self.params.max_columns_added);

        debug!(
            iterations,
            columns = routes.len(),
            "pricing call finished"
        );

        Ok(PricingOutcome {
            routes,
            optimal,
            iterations,
            used_visit_condition: self.use_visit_condition,
        })
    }

    /// Runs one interleaved bidirectional labeling iteration under the
    /// current critical set.
    fn run_iteration(&mut self) {
        self.arena.clear();
        for list in &mut self.forward_lists {
            list.clear();
        }
        for list in &mut self.backward_lists {
            list.clear();
        }
        self.forward_heap.clear();
        self.backward_heap.clear();
        self.best = None;

        let n = self.graph.num_vertices();
        let source = self.graph.source();
        let destination = self.graph.destination();

        let forward_terminal = self
            .arena
            .push(Label::terminal(Direction::Forward, source, n));
        self.forward_lists[source.get()].push(forward_terminal);
        self.forward_heap.push(HeapEntry {
            ratio: 0.0,
            id: forward_terminal,
        });

        let backward_terminal = self
            .arena
            .push(Label::terminal(Direction::Backward, destination, n));
        self.backward_lists[destination.get()].push(backward_terminal);
        if self.params.direction == SearchDirection::Bidirectional {
            self.backward_heap.push(HeapEntry {
                ratio: 0.0,
                id: backward_terminal,
            });
        }

        let mut forward_turn = true;
        loop {
            if self.routes.len() >= self.params.max_columns_added {
                break;
            }

            let next = if forward_turn {
                self.forward_heap.pop().or_else(|| self.backward_heap.pop())
            } else {
                self.backward_heap.pop().or_else(|| self.forward_heap.pop())
            };
            forward_turn = !forward_turn;

            let Some(entry) = next else {
                break;
            };
            if self.arena.get(entry.id).dead {
                continue;
            }

            self.perform_all_joins(entry.id);
            if self.routes.len() >= self.params.max_columns_added {
                break;
            }
            self.process_state(entry.id);
        }
    }

    /// Attempts all joins of the given label with non-dominated labels of
    /// the opposite direction one arc away.
    fn perform_all_joins(&mut self, id: LabelId) {
        let (direction, vertex) = {
            let label = self.arena.get(id);
            (label.direction, label.vertex)
        };

        match direction {
            Direction::Forward => {
                let arcs: Vec<Neighbor> = self.graph.outgoing(vertex).to_vec();
                for arc in arcs {
                    let partners = self.backward_lists[arc.vertex.get()].clone();
                    for partner in partners {
                        if self.routes.len() >= self.params.max_columns_added {
                            return;
                        }
                        self.try_join(id, partner, vertex, arc.vertex, arc.weight);
                    }
                }
            }
            Direction::Backward => {
                let arcs: Vec<Neighbor> = self.graph.incoming(vertex).to_vec();
                for arc in arcs {
                    let partners = self.forward_lists[arc.vertex.get()].clone();
                    for partner in partners {
                        if self.routes.len() >= self.params.max_columns_added {
                            return;
                        }
                        self.try_join(partner, id, arc.vertex, vertex, arc.weight);
                    }
                }
            }
        }
    }

    /// Attempts to join forward label `f_id` at `u` with backward label
    /// `b_id` at `v` over the arc `(u, v)`.
    fn try_join(
        &mut self,
        f_id: LabelId,
        b_id: LabelId,
        u: VertexIndex,
        v: VertexIndex,
        weight: f64,
    ) {
        let eps = self.params.epsilon;
        let (forward, backward) = (self.arena.get(f_id), self.arena.get(b_id));
        if forward.dead || backward.dead {
            return;
        }
        if forward.has_common_critical_visits(backward) {
            return;
        }

        let total_length = forward.length + weight + backward.length;
        if strictly_gt(total_length, self.graph.budget(), eps) {
            return;
        }

        if self.params.direction == SearchDirection::Bidirectional
            && !self.halfway_accepts(forward, backward, weight)
        {
            return;
        }

        let reduced_cost =
            self.duals.vehicle + forward.cost + backward.cost + self.duals.arc_term(u, v);
        if reduced_cost >= -eps {
            return;
        }

        let elementary = !forward.has_cycle
            && !backward.has_cycle
            && !forward.has_common_general_visits(backward);
        let score = forward.score + backward.score;

        let mut path = self.arena.path_of(f_id);
        path.extend(self.arena.path_of(b_id));

        if elementary
            && self.routes.len() < self.params.max_columns_added
            && self.seen_paths.insert(path.clone())
        {
            self.routes.push(Route::new(
                path.clone(),
                score,
                total_length,
                reduced_cost,
                true,
            ));
        }

        let improves = self
            .best
            .as_ref()
            .is_none_or(|best| reduced_cost < best.reduced_cost);
        if improves {
            self.best = Some(BestCandidate {
                path,
                reduced_cost,
                score,
                length: total_length,
            });
        }
    }

    /// The halfway symmetry breaker: a join is accepted only at the most
    /// balanced split of the complete path. The competing split is
    /// obtained by handing the join arc to the shorter side, i.e. moving
    /// the split one arc towards the longer side. Ties go to the split
    /// whose forward half is the shorter one, so each path is enumerated
    /// from exactly one side of its midpoint.
    fn halfway_accepts(&self, forward: &Label, backward: &Label, weight: f64) -> bool {
        let eps = self.params.epsilon;
        let diff = (forward.length - backward.length).abs();

        if forward.length <= backward.length {
            match backward.parent {
                Some(parent) => {
                    let shifted =
                        ((forward.length + weight) - self.arena.get(parent).length).abs();
                    diff <= shifted + eps
                }
                // The backward side is the bare terminal; there is no
                // later split to compete with.
                None => true,
            }
        } else {
            match forward.parent {
                Some(parent) => {
                    let shifted =
                        (self.arena.get(parent).length - (backward.length + weight)).abs();
                    // Strict: on a tie the mirrored split wins.
                    diff < shifted - eps
                }
                None => true,
            }
        }
    }

    /// Extends a popped label if it is still short of the extension
    /// horizon (half the budget for bidirectional search).
    fn process_state(&mut self, id: LabelId) {
        let (direction, length) = {
            let label = self.arena.get(id);
            (label.direction, label.length)
        };

        let horizon = match self.params.direction {
            SearchDirection::Bidirectional => self.graph.budget() / 2.0,
            SearchDirection::ForwardOnly => {
                if direction == Direction::Backward {
                    return;
                }
                self.graph.budget()
            }
        };
        if length >= horizon - self.params.epsilon {
            return;
        }

        self.extend_label(id);
    }

    /// Creates all feasible one-arc extensions of the given label and
    /// offers them to the dominance filter.
    fn extend_label(&mut self, id: LabelId) {
        let label = self.arena.get(id).clone();
        let eps = self.params.epsilon;
        let budget = self.graph.budget();

        let arcs: Vec<Neighbor> = match label.direction {
            Direction::Forward => self.graph.outgoing(label.vertex).to_vec(),
            Direction::Backward => self.graph.incoming(label.vertex).to_vec(),
        };

        for arc in arcs {
            let target = arc.vertex;
            if label.uses_critical(target) {
                continue;
            }
            if label.predecessor == Some(target) {
                continue;
            }
            let new_length = label.length + arc.weight;
            if strictly_gt(new_length, budget, eps) {
                continue;
            }

            let arc_term = match label.direction {
                Direction::Forward => self.duals.arc_term(label.vertex, target),
                Direction::Backward => self.duals.arc_term(target, label.vertex),
            };
            let new_cost = label.cost + self.duals.vertex_term(target) + arc_term;

            let mut visited_general = label.visited_general.clone();
            let has_cycle = label.has_cycle || visited_general.contains(target.get());
            visited_general.insert(target.get());

            let mut visited_critical = label.visited_critical.clone();
            if self.is_critical[target.get()] {
                visited_critical.insert(target.get());
            }

            let mut unreachable_critical = label.unreachable_critical.clone();
            let continuations: Vec<Neighbor> = match label.direction {
                Direction::Forward => self.graph.outgoing(target).to_vec(),
                Direction::Backward => self.graph.incoming(target).to_vec(),
            };
            for next in continuations {
                if self.is_critical[next.vertex.get()]
                    && strictly_gt(new_length + next.weight, budget, eps)
                {
                    unreachable_critical.insert(next.vertex.get());
                }
            }

            let child = Label {
                direction: label.direction,
                vertex: target,
                cost: new_cost,
                score: label.score + self.graph.prize(target),
                length: new_length,
                parent: Some(id),
                predecessor: Some(label.vertex),
                visited_critical,
                visited_general,
                unreachable_critical,
                has_cycle,
                dead: false,
            };
            self.add_if_non_dominated(child);
        }
    }

    /// Offers a freshly extended label to the per-vertex non-dominated
    /// list of its direction.
    ///
    /// With domination enabled, the list is scanned in reverse. A
    /// candidate dominated by a stored label with the same predecessor is
    /// discarded outright; otherwise the first dominator's predecessor is
    /// remembered and the candidate only dies to a second dominator with
    /// a different predecessor (the two-cycle removal rule). With
    /// symmetric domination, stored labels dominated by the candidate are
    /// tombstoned and pruned.
    fn add_if_non_dominated(&mut self, child: Label) {
        let eps = self.params.epsilon;
        let vertex = child.vertex.get();
        let list_of = |lists: &Vec<Vec<LabelId>>| lists[vertex].clone();

        if self.params.use_domination {
            let ids = match child.direction {
                Direction::Forward => list_of(&self.forward_lists),
                Direction::Backward => list_of(&self.backward_lists),
            };

            let mut first_dominator_pred: Option<Option<VertexIndex>> = None;
            for &eid in ids.iter().rev() {
                let existing = self.arena.get(eid);
                if existing.dead {
                    continue;
                }
                if dominates(existing, &child, self.use_visit_condition, eps) {
                    if existing.predecessor == child.predecessor {
                        return;
                    }
                    match first_dominator_pred {
                        None => first_dominator_pred = Some(existing.predecessor),
                        Some(pred) if pred != existing.predecessor => return,
                        _ => {}
                    }
                }
            }

            if self.params.two_way_domination {
                for &eid in &ids {
                    let existing = self.arena.get(eid);
                    if !existing.dead
                        && dominates(&child, existing, self.use_visit_condition, eps)
                    {
                        self.arena.get_mut(eid).dead = true;
                    }
                }
                let arena = &self.arena;
                match child.direction {
                    Direction::Forward => {
                        self.forward_lists[vertex].retain(|&eid| !arena.get(eid).dead)
                    }
                    Direction::Backward => {
                        self.backward_lists[vertex].retain(|&eid| !arena.get(eid).dead)
                    }
                }
            }
        }

        let ratio = child.ratio();
        let direction = child.direction;
        let id = self.arena.push(child);
        match direction {
            Direction::Forward => {
                self.forward_lists[vertex].push(id);
                self.forward_heap.push(HeapEntry { ratio, id });
            }
            Direction::Backward => {
                self.backward_lists[vertex].push(id);
                self.backward_heap.push(HeapEntry { ratio, id });
            }
        }
    }
}

/// Returns the vertices a path visits more than once.
fn repeated_vertices(path: &[VertexIndex]) -> Vec<VertexIndex> {
    let mut counts: HashMap<VertexIndex, usize> = HashMap::new();
    for &vertex in path {
        *counts.entry(vertex).or_insert(0) += 1;
    }
    let mut repeats: Vec<VertexIndex> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(vertex, _)| vertex)
        .collect();
    repeats.sort();
    repeats
}
