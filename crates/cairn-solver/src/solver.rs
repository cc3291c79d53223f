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

//! The branch-and-price facade.
//!
//! `BranchAndPrice` wires the pieces together: a generic best-bound
//! engine, one column-generation node solver per worker (each owning a
//! private LP oracle), and the vertex/arc branching rule. The instance
//! and the parameters are shared immutably across workers.

use crate::branching::TopBrancher;
use crate::colgen::{TopNode, TopNodeSolver};
use crate::params::SolverParams;
use cairn_bnb::engine::BranchAndBound;
use cairn_bnb::result::TerminationReason;
use cairn_master::lp::MinilpOracle;
use cairn_model::error::SolverError;
use cairn_model::instance::Instance;
use cairn_model::node::BbNode;
use cairn_model::route::Route;
use tracing::info;

/// The final result of a branch-and-price run.
#[derive(Debug, Clone)]
pub struct TopSolution {
    /// Total prize collected by the best integral solution; zero when no
    /// feasible solution was found.
    pub objective: f64,
    /// The selected routes of the best integral solution.
    pub routes: Vec<Route>,
    /// Nodes created over the run, root included.
    pub num_created_nodes: u64,
    /// Solved nodes that survived pruning.
    pub num_feasible_nodes: u64,
    /// Highest number of simultaneously in-flight node solves.
    pub max_parallel_solves: usize,
    /// Wall-clock time of the run in seconds.
    pub time_seconds: f64,
    /// The dual-derived bound of the incumbent's node, when available.
    pub dual_upper_bound: Option<f64>,
    /// Whether the run proved optimality (no early termination).
    pub optimal: bool,
}

impl std::fmt::Display for TopSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TopSolution(objective: {}, routes: {}, nodes: {}, optimal: {})",
            self.objective,
            self.routes.len(),
            self.num_created_nodes,
            self.optimal
        )
    }
}

/// The branch-and-price solver for one instance.
#[derive(Debug)]
pub struct BranchAndPrice<'a> {
    instance: &'a Instance,
    params: SolverParams,
}

impl<'a> BranchAndPrice<'a> {
    /// Creates a solver for the given instance.
    #[inline]
    pub fn new(instance: &'a Instance, params: SolverParams) -> Self {
        Self { instance, params }
    }

    /// Runs the search to optimality or until the time limit expires.
    ///
    /// # Errors
    ///
    /// Propagates fatal solver errors; per-node infeasibility is handled
    /// by pruning and never surfaces here.
    pub fn solve(&self) -> Result<TopSolution, SolverError> {
        info!(
            instance = %self.instance,
            params = %self.params,
            "starting branch and price"
        );

        let mut engine =
            BranchAndBound::new(self.params.num_solvers).with_epsilon(self.params.epsilon);
        if let Some(limit) = self.params.time_limit {
            engine = engine.with_time_limit(limit);
        }

        let brancher = TopBrancher::new(self.params.epsilon);
        let outcome = engine.run(
            TopNode(BbNode::root()),
            |_| TopNodeSolver::new(self.instance, &self.params, MinilpOracle::new()),
            &brancher,
        )?;

        let optimal = outcome.reason == TerminationReason::Exhausted;
        let (objective, routes, dual_upper_bound) = match &outcome.incumbent {
            Some(node) => {
                let solution = node
                    .0
                    .solution()
                    .expect("the incumbent is always a solved node");
                (
                    node.0.lp_objective(),
                    solution.mip_solution.clone(),
                    solution.dual_lp_upper_bound,
                )
            }
            None => (0.0, Vec::new(), None),
        };

        Ok(TopSolution {
            objective,
            routes,
            num_created_nodes: outcome.statistics.num_created,
            num_feasible_nodes: outcome.statistics.num_feasible,
            max_parallel_solves: outcome.statistics.max_parallel_solves,
            time_seconds: outcome.statistics.solve_duration.as_secs_f64(),
            dual_upper_bound,
            optimal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerate::solve_by_enumeration;
    use cairn_master::lp::MinilpOracle;
    use cairn_model::index::VertexIndex;
    use cairn_model::loading::InstanceLoader;
    use std::time::Duration;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_trivial_line_instance() {
        let instance = InstanceLoader::new()
            .from_str("n 3 m 1 b 10  0 0 0  1 0 7  2 0 0")
            .unwrap();
        let solution = BranchAndPrice::new(&instance, SolverParams::default())
            .solve()
            .unwrap();

        assert!(solution.optimal);
        assert!((solution.objective - 7.0).abs() < 1e-6);
        assert_eq!(solution.routes.len(), 1);
        assert_eq!(solution.routes[0].path(), &[v(0), v(1), v(2)]);
        assert_eq!(solution.num_created_nodes, 1);
        assert_eq!(solution.num_feasible_nodes, 1);
    }

    #[test]
    fn test_infeasible_budget_yields_zero() {
        let instance = InstanceLoader::new()
            .from_str("n 3 m 1 b 1  0 0 0  1 0 7  2 0 0")
            .unwrap();
        let solution = BranchAndPrice::new(&instance, SolverParams::default())
            .solve()
            .unwrap();

        assert!(solution.optimal);
        assert_eq!(solution.objective, 0.0);
        assert!(solution.routes.is_empty());
    }

    #[test]
    fn test_matches_enumeration_on_small_instances() {
        let texts = [
            "n 6 m 2 b 6  0 0 0  1 0 3  2 0 4  1 1 5  2 1 2  3 0 0",
            "n 5 m 2 b 5  0 0 0  1 1 4  2 0 6  1 -1 3  3 0 0",
        ];
        for text in texts {
            let instance = InstanceLoader::new().from_str(text).unwrap();

            let (reference, _) =
                solve_by_enumeration(&instance, &mut MinilpOracle::new()).unwrap();

            let params = SolverParams::default().with_num_solvers(2);
            let solution = BranchAndPrice::new(&instance, params).solve().unwrap();

            assert!(solution.optimal);
            assert!(
                (solution.objective - reference).abs() < 1e-6,
                "branch-and-price found {} but enumeration found {} on {:?}",
                solution.objective,
                reference,
                text
            );

            // Run-level counter invariants.
            assert!(solution.num_feasible_nodes <= solution.num_created_nodes);
            assert!(solution.max_parallel_solves <= 2);

            // The selected routes must be consistent: pairwise disjoint
            // on intermediate vertices, within budget, scores adding up.
            let mut covered = std::collections::HashSet::new();
            let mut total = 0.0;
            for route in &solution.routes {
                assert!(route.length() <= instance.budget() + 1e-9);
                total += route.score();
                for vertex in route.intermediate() {
                    assert!(covered.insert(*vertex), "vertex covered twice");
                }
            }
            assert!(solution.routes.len() <= instance.fleet_size());
            assert!((total - solution.objective).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fleet_sensitivity_monotonicity() {
        let text = "n 6 m 1 b 6  0 0 0  1 0 3  2 0 4  1 1 5  2 1 2  3 0 0";
        let instance = InstanceLoader::new().from_str(text).unwrap();

        let single = BranchAndPrice::new(&instance, SolverParams::default())
            .solve()
            .unwrap();
        let doubled_instance = instance.with_fleet_size(2);
        let doubled = BranchAndPrice::new(&doubled_instance, SolverParams::default())
            .solve()
            .unwrap();

        assert!(doubled.objective >= single.objective - 1e-9);
    }

    #[test]
    fn test_immediate_time_limit_reports_gracefully() {
        let instance = InstanceLoader::new()
            .from_str("n 3 m 1 b 10  0 0 0  1 0 7  2 0 0")
            .unwrap();
        let params = SolverParams::default().with_time_limit(Duration::ZERO);
        let solution = BranchAndPrice::new(&instance, params).solve().unwrap();
        assert!(!solution.optimal);
    }
}
