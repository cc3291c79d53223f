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

//! The parallel branch-and-bound machinery.
//!
//! The engine runs `num_solvers` worker threads and one processor. The
//! processor lives on the calling thread and is the only place the open
//! queue, the incumbent, and the counters are touched; workers only ever
//! receive an unsolved node, solve it, and send it back.
//!
//! Protocol, per solved node received:
//! 1. Decrement the in-flight count.
//! 2. Prune when the relaxation was infeasible or the incumbent already
//!    matches the node's bound up to tolerance.
//! 3. Otherwise count it feasible; an integral node challenges the
//!    incumbent, a fractional one is branched and its children queued.
//! 4. Dispatch queued nodes while workers are idle.
//! 5. When the queue is empty and nothing is in flight, the run is done.
//!
//! Closing the unsolved channel shuts the workers down; the surrounding
//! thread scope joins them. On time-limit expiry the processor stops
//! dispatching and reports the current incumbent — an in-flight solve
//! finishes on its worker and is discarded with the channels.

use crate::node::{Brancher, IdGenerator, NodeSolver, SearchNode};
use crate::queue::OpenQueue;
use crate::result::{BnbOutcome, TerminationReason};
use crate::stats::BnbStatistics;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A parallel best-bound branch-and-bound engine.
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    num_solvers: usize,
    time_limit: Option<Duration>,
    epsilon: f64,
}

impl BranchAndBound {
    /// Creates an engine with the given worker count.
    ///
    /// # Panics
    ///
    /// Panics if `num_solvers` is zero.
    pub fn new(num_solvers: usize) -> Self {
        assert!(
            num_solvers >= 1,
            "called `BranchAndBound::new` with zero solvers"
        );
        Self {
            num_solvers,
            time_limit: None,
            epsilon: cairn_core::num::DEFAULT_EPSILON,
        }
    }

    /// Sets a wall-clock limit for the run.
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the pruning tolerance.
    #[inline]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Returns the configured worker count.
    #[inline]
    pub fn num_solvers(&self) -> usize {
        self.num_solvers
    }

    /// Runs the search from the given root node.
    ///
    /// `solver_factory` is invoked once per worker so each worker owns
    /// its solver (and whatever resources it wraps) for the whole run.
    /// The root is dispatched before the protocol loop starts and counts
    /// as created and in flight.
    ///
    /// # Errors
    ///
    /// The first error returned by a node solver or by the brancher
    /// aborts the run and is passed through.
    pub fn run<N, S, B, E, F>(
        &self,
        root: N,
        solver_factory: F,
        brancher: &B,
    ) -> Result<BnbOutcome<N>, E>
    where
        N: SearchNode,
        S: NodeSolver<N, Error = E> + Send,
        B: Brancher<N, Error = E>,
        E: Send,
        F: FnMut(usize) -> S,
    {
        let mut factory = solver_factory;
        let solvers: Vec<S> = (0..self.num_solvers).map(&mut factory).collect();

        let (unsolved_tx, unsolved_rx) = mpsc::channel::<N>();
        let unsolved_rx = Arc::new(Mutex::new(unsolved_rx));
        let (solved_tx, solved_rx) = mpsc::channel::<Result<N, E>>();

        std::thread::scope(|scope| {
            for solver in solvers {
                let rx = Arc::clone(&unsolved_rx);
                let tx = solved_tx.clone();
                scope.spawn(move || worker_loop(solver, rx, tx));
            }
            // The processor keeps only the workers' clones alive, so the
            // solved channel disconnects exactly when all workers exit.
            drop(solved_tx);

            let result = self.process(root, &unsolved_tx, &solved_rx, brancher);

            // Closing the unsolved channel stops the workers.
            drop(unsolved_tx);
            result
        })
    }

    /// The processor: the single task serializing queue, incumbent, and
    /// counter updates.
    fn process<N, B, E>(
        &self,
        root: N,
        unsolved_tx: &Sender<N>,
        solved_rx: &Receiver<Result<N, E>>,
        brancher: &B,
    ) -> Result<BnbOutcome<N>, E>
    where
        N: SearchNode,
        B: Brancher<N, Error = E>,
    {
        let start = Instant::now();
        let deadline = self.time_limit.map(|limit| start + limit);

        let mut queue: OpenQueue<N> = OpenQueue::new();
        let mut stats = BnbStatistics::new();
        let mut ids = IdGenerator::new(root.id() + 1);
        let mut incumbent: Option<N> = None;
        let mut num_solving = 1usize;
        stats.max_parallel_solves = 1;

        // The root is dispatched outside the protocol loop.
        if unsolved_tx.send(root).is_err() {
            unreachable!("workers exited before the root was dispatched");
        }

        let reason = loop {
            let message = match deadline {
                None => match solved_rx.recv() {
                    Ok(message) => message,
                    Err(_) => unreachable!("all workers exited while nodes were in flight"),
                },
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break TerminationReason::TimeLimit;
                    }
                    match solved_rx.recv_timeout(deadline - now) {
                        Ok(message) => message,
                        Err(RecvTimeoutError::Timeout) => break TerminationReason::TimeLimit,
                        Err(RecvTimeoutError::Disconnected) => {
                            unreachable!("all workers exited while nodes were in flight")
                        }
                    }
                }
            };

            let node = message?;
            num_solving -= 1;

            let pruned = !node.lp_feasible()
                || incumbent
                    .as_ref()
                    .is_some_and(|best| best.lp_objective() >= node.lp_objective() - self.epsilon);

            if pruned {
                debug!(node = node.id(), "pruned");
            } else {
                stats.num_feasible += 1;
                if node.lp_integral() {
                    let improves = incumbent
                        .as_ref()
                        .is_none_or(|best| node.lp_objective() > best.lp_objective());
                    if improves {
                        info!(
                            node = node.id(),
                            objective = node.lp_objective(),
                            "new incumbent"
                        );
                        incumbent = Some(node);
                    }
                } else {
                    let children = brancher.branch(&node, &mut ids)?;
                    debug!(
                        node = node.id(),
                        children = children.len(),
                        objective = node.lp_objective(),
                        "branched"
                    );
                    stats.num_created += children.len() as u64;
                    for child in children {
                        queue.push(child);
                    }
                }
            }

            while !queue.is_empty() && num_solving < self.num_solvers {
                let next = queue.pop().expect("queue checked non-empty");
                if unsolved_tx.send(next).is_err() {
                    unreachable!("workers exited while the processor was dispatching");
                }
                num_solving += 1;
                stats.max_parallel_solves = stats.max_parallel_solves.max(num_solving);
            }

            if queue.is_empty() && num_solving == 0 {
                break TerminationReason::Exhausted;
            }
        };

        stats.solve_duration = start.elapsed();
        let objective = incumbent.as_ref().map_or(0.0, |node| node.lp_objective());
        info!(
            objective,
            created = stats.num_created,
            feasible = stats.num_feasible,
            %reason,
            "branch and bound finished"
        );

        Ok(BnbOutcome {
            incumbent,
            objective,
            reason,
            statistics: stats,
        })
    }
}

/// The worker loop: receive, solve, send back, until the unsolved
/// channel closes or a solve fails.
fn worker_loop<N, S, E>(
    mut solver: S,
    unsolved_rx: Arc<Mutex<Receiver<N>>>,
    solved_tx: Sender<Result<N, E>>,
) where
    N: SearchNode,
    S: NodeSolver<N, Error = E>,
{
    loop {
        // Hold the lock only for the receive itself.
        let received = {
            let guard = unsolved_rx
                .lock()
                .expect("unsolved receiver mutex poisoned");
            guard.recv()
        };
        let Ok(node) = received else {
            break;
        };

        let solved = solver.solve(node);
        let failed = solved.is_err();
        if solved_tx.send(solved).is_err() || failed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// A knapsack node: per-item forced decisions plus relaxation
    /// outputs from the continuous-knapsack solver.
    #[derive(Debug, Clone)]
    struct KnapsackNode {
        id: u64,
        parent_objective: f64,
        forced: Vec<Option<bool>>,
        feasible: bool,
        integral: bool,
        objective: f64,
        fractional_item: Option<usize>,
    }

    impl KnapsackNode {
        fn root(num_items: usize) -> Self {
            Self {
                id: 0,
                parent_objective: f64::INFINITY,
                forced: vec![None; num_items],
                feasible: false,
                integral: false,
                objective: 0.0,
                fractional_item: None,
            }
        }
    }

    impl SearchNode for KnapsackNode {
        fn id(&self) -> u64 {
            self.id
        }
        fn parent_objective(&self) -> f64 {
            self.parent_objective
        }
        fn lp_feasible(&self) -> bool {
            self.feasible
        }
        fn lp_integral(&self) -> bool {
            self.integral
        }
        fn lp_objective(&self) -> f64 {
            self.objective
        }
    }

    /// Continuous-knapsack relaxation over the free items; at most one
    /// item ends up fractional.
    #[derive(Clone)]
    struct KnapsackSolver {
        profits: Vec<f64>,
        weights: Vec<f64>,
        capacity: f64,
    }

    impl NodeSolver<KnapsackNode> for KnapsackSolver {
        type Error = Infallible;

        fn solve(&mut self, mut node: KnapsackNode) -> Result<KnapsackNode, Infallible> {
            let mut capacity = self.capacity;
            let mut objective = 0.0;
            for (i, forced) in node.forced.iter().enumerate() {
                if *forced == Some(true) {
                    capacity -= self.weights[i];
                    objective += self.profits[i];
                }
            }

            if capacity < 0.0 {
                node.feasible = false;
                node.integral = false;
                node.objective = f64::NEG_INFINITY;
                return Ok(node);
            }

            let mut free: Vec<usize> = (0..self.profits.len())
                .filter(|&i| node.forced[i].is_none())
                .collect();
            free.sort_by(|&a, &b| {
                (self.profits[b] / self.weights[b]).total_cmp(&(self.profits[a] / self.weights[a]))
            });

            node.fractional_item = None;
            for &i in &free {
                if self.weights[i] <= capacity {
                    capacity -= self.weights[i];
                    objective += self.profits[i];
                } else {
                    if capacity > 0.0 {
                        objective += self.profits[i] * capacity / self.weights[i];
                        node.fractional_item = Some(i);
                    }
                    break;
                }
            }

            node.feasible = true;
            node.integral = node.fractional_item.is_none();
            node.objective = objective;
            Ok(node)
        }
    }

    /// Branches on the unique fractional item: exclude it / include it.
    struct KnapsackBrancher;

    impl Brancher<KnapsackNode> for KnapsackBrancher {
        type Error = Infallible;

        fn branch(
            &self,
            node: &KnapsackNode,
            ids: &mut IdGenerator,
        ) -> Result<Vec<KnapsackNode>, Infallible> {
            let item = node
                .fractional_item
                .expect("branch called on an integral knapsack node");
            let children = [false, true]
                .into_iter()
                .map(|include| {
                    let mut forced = node.forced.clone();
                    forced[item] = Some(include);
                    KnapsackNode {
                        id: ids.next_id(),
                        parent_objective: node.objective,
                        forced,
                        feasible: false,
                        integral: false,
                        objective: 0.0,
                        fractional_item: None,
                    }
                })
                .collect();
            Ok(children)
        }
    }

    fn solve_knapsack(
        profits: &[f64],
        weights: &[f64],
        capacity: f64,
        num_solvers: usize,
    ) -> BnbOutcome<KnapsackNode> {
        let solver = KnapsackSolver {
            profits: profits.to_vec(),
            weights: weights.to_vec(),
            capacity,
        };
        BranchAndBound::new(num_solvers)
            .run(
                KnapsackNode::root(profits.len()),
                |_| solver.clone(),
                &KnapsackBrancher,
            )
            .unwrap()
    }

    #[test]
    fn test_knapsack_single_worker() {
        let outcome = solve_knapsack(&[24.0, 2.0, 20.0, 4.0], &[8.0, 1.0, 5.0, 4.0], 9.0, 1);
        assert!(outcome.is_optimal());
        assert!((outcome.objective - 26.0).abs() < 1e-9);
        assert!(outcome.statistics.num_created > 1);
        assert_eq!(outcome.statistics.max_parallel_solves, 1);
        assert!(outcome.statistics.num_feasible <= outcome.statistics.num_created);
    }

    #[test]
    fn test_knapsack_five_workers() {
        let outcome = solve_knapsack(&[24.0, 2.0, 20.0, 4.0], &[8.0, 1.0, 5.0, 4.0], 9.0, 5);
        assert!(outcome.is_optimal());
        assert!((outcome.objective - 26.0).abs() < 1e-9);
        assert!(outcome.statistics.num_created > 1);
        assert!(outcome.statistics.max_parallel_solves > 1);
        assert!(outcome.statistics.max_parallel_solves <= 5);
    }

    #[test]
    fn test_knapsack_second_instance() {
        let profits = [16.0, 22.0, 12.0, 8.0, 11.0, 19.0];
        let weights = [5.0, 7.0, 4.0, 3.0, 4.0, 6.0];
        for num_solvers in [1, 5] {
            let outcome = solve_knapsack(&profits, &weights, 14.0, num_solvers);
            assert!(outcome.is_optimal());
            assert!(
                (outcome.objective - 43.0).abs() < 1e-9,
                "expected 43, got {}",
                outcome.objective
            );
        }
    }

    #[test]
    fn test_infeasible_root_yields_empty_outcome() {
        // Capacity so tight that forcing any item in is infeasible and
        // the relaxation takes nothing: the root itself is integral with
        // objective zero.
        let outcome = solve_knapsack(&[5.0], &[10.0], 0.0, 1);
        assert_eq!(outcome.reason, TerminationReason::Exhausted);
        assert!((outcome.objective - 0.0).abs() < 1e-9);
        assert_eq!(outcome.statistics.num_created, 1);
    }

    /// A solver that stalls long enough for the deadline to pass.
    struct SlowSolver {
        inner: KnapsackSolver,
    }

    impl NodeSolver<KnapsackNode> for SlowSolver {
        type Error = Infallible;

        fn solve(&mut self, node: KnapsackNode) -> Result<KnapsackNode, Infallible> {
            std::thread::sleep(Duration::from_millis(50));
            self.inner.solve(node)
        }
    }

    #[test]
    fn test_time_limit_reports_current_incumbent() {
        let inner = KnapsackSolver {
            profits: vec![24.0, 2.0, 20.0, 4.0],
            weights: vec![8.0, 1.0, 5.0, 4.0],
            capacity: 9.0,
        };
        let outcome = BranchAndBound::new(1)
            .with_time_limit(Duration::from_millis(1))
            .run(
                KnapsackNode::root(4),
                |_| SlowSolver {
                    inner: inner.clone(),
                },
                &KnapsackBrancher,
            )
            .unwrap();
        assert_eq!(outcome.reason, TerminationReason::TimeLimit);
        assert!(!outcome.is_optimal());
    }

    /// A solver failing on every node; the error must surface.
    struct FailingSolver;

    impl NodeSolver<KnapsackNode> for FailingSolver {
        type Error = String;

        fn solve(&mut self, _node: KnapsackNode) -> Result<KnapsackNode, String> {
            Err("relaxation backend exploded".to_string())
        }
    }

    struct NeverBrancher;

    impl Brancher<KnapsackNode> for NeverBrancher {
        type Error = String;

        fn branch(
            &self,
            _node: &KnapsackNode,
            _ids: &mut IdGenerator,
        ) -> Result<Vec<KnapsackNode>, String> {
            unreachable!("no node is ever solved")
        }
    }

    #[test]
    fn test_solver_errors_abort_the_run() {
        let result = BranchAndBound::new(2).run(
            KnapsackNode::root(3),
            |_| FailingSolver,
            &NeverBrancher,
        );
        assert_eq!(result.unwrap_err(), "relaxation backend exploded");
    }
}
