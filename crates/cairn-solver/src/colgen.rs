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

//! The column-generation driver: one branch-and-bound node in, the same
//! node decorated with LP/MIP outputs out.
//!
//! Per node:
//! 1. Build the reduced graph (forbidden vertices/edges removed;
//!    restrictions naming entities the instance never had are fatal).
//! 2. Alternate between solving the restricted master LP and pricing
//!    until no column with negative reduced cost remains. Returned
//!    columns are de-duplicated against the node's pool, which also
//!    guards against cycling on degenerate duals.
//! 3. If the LP closed without leaning on the auxiliary slack, resolve
//!    the integer master for the node's MIP bound and solution.
//! 4. Derive the dual bound from the final duals.

use crate::params::SolverParams;
use cairn_bnb::node::{NodeSolver, SearchNode};
use cairn_core::num::is_integral;
use cairn_master::model::SetCoverModel;
use cairn_master::oracle::{MasterOracle, MasterSolution};
use cairn_model::error::SolverError;
use cairn_model::instance::Instance;
use cairn_model::node::{BbNode, NodeSolution, Restrictions};
use cairn_model::route::Route;
use cairn_pricing::duals::PricingDuals;
use cairn_pricing::engine as pricing;
use cairn_pricing::graph::ReducedGraph;
use std::collections::HashSet;
use tracing::debug;

/// `BbNode` as seen by the generic engine.
///
/// A thin newtype: the engine's node trait lives in `cairn-bnb` and the
/// node data in `cairn-model`, so the glue crate provides the adapter.
#[derive(Debug, Clone)]
pub struct TopNode(pub BbNode);

impl SearchNode for TopNode {
    #[inline]
    fn id(&self) -> u64 {
        self.0.id().get()
    }

    #[inline]
    fn parent_objective(&self) -> f64 {
        self.0.parent_lp_objective()
    }

    #[inline]
    fn lp_feasible(&self) -> bool {
        self.0.lp_feasible()
    }

    #[inline]
    fn lp_integral(&self) -> bool {
        self.0.lp_integral()
    }

    #[inline]
    fn lp_objective(&self) -> f64 {
        self.0.lp_objective()
    }
}

/// The per-worker node solver: column generation against a privately
/// owned LP oracle.
#[derive(Debug)]
pub struct TopNodeSolver<'a, O> {
    instance: &'a Instance,
    params: &'a SolverParams,
    oracle: O,
}

impl<'a, O: MasterOracle> TopNodeSolver<'a, O> {
    /// Creates a node solver around its own oracle handle.
    #[inline]
    pub fn new(instance: &'a Instance, params: &'a SolverParams, oracle: O) -> Self {
        Self {
            instance,
            params,
            oracle,
        }
    }
}

impl<'a, O: MasterOracle> NodeSolver<TopNode> for TopNodeSolver<'a, O> {
    type Error = SolverError;

    fn solve(&mut self, node: TopNode) -> Result<TopNode, SolverError> {
        solve_node(self.instance, self.params, &mut self.oracle, node.0).map(TopNode)
    }
}

/// Runs column generation on one node and attaches the results.
///
/// # Errors
///
/// Propagates restriction-validation errors (`MissingVertex`,
/// `MissingEdge`), pricing failures, and oracle failures.
pub fn solve_node<O: MasterOracle>(
    instance: &Instance,
    params: &SolverParams,
    oracle: &mut O,
    mut node: BbNode,
) -> Result<BbNode, SolverError> {
    let restrictions = node.restrictions().clone();
    let graph = ReducedGraph::new(
        instance,
        &restrictions.forbidden_vertices,
        &restrictions.forbidden_edges,
    )?;

    let mut pool: Vec<Route> = Vec::new();
    let mut known: HashSet<Route> = HashSet::new();
    let mut iterations = 0usize;

    let (master, duals) = loop {
        iterations += 1;
        let model = SetCoverModel::new(&pool, &restrictions, instance);
        let master = oracle.solve(&model, false)?;
        let duals = build_pricing_duals(instance, &restrictions, &master);

        let outcome = pricing::solve(&graph, &duals, &params.pricing)?;
        debug!(
            node = node.id().get(),
            iteration = iterations,
            objective = master.objective,
            columns = outcome.routes.len(),
            "column generation iteration"
        );
        if outcome.routes.is_empty() {
            break (master, duals);
        }

        let mut added = false;
        for route in outcome.routes {
            if known.insert(route.clone()) {
                pool.push(route);
                added = true;
            }
        }
        if !added {
            // Degenerate duals reproduced known columns; the LP cannot
            // improve further.
            break (master, duals);
        }
    };

    let eps = params.epsilon;
    let lp_feasible = master.is_feasible(eps);
    let lp_solution: Vec<(Route, f64)> = pool
        .iter()
        .zip(&master.primal)
        .filter(|&(_, &weight)| weight > eps)
        .map(|(route, &weight)| (route.clone(), weight))
        .collect();
    let lp_integral =
        lp_feasible && master.primal.iter().all(|&weight| is_integral(weight, eps));

    let (mip_solution, mip_objective) = if lp_feasible {
        let model = SetCoverModel::new(&pool, &restrictions, instance);
        let mip = oracle.solve(&model, true)?;
        let chosen = pool
            .iter()
            .zip(&mip.primal)
            .filter(|&(_, &weight)| weight > 0.5)
            .map(|(route, _)| route.clone())
            .collect();
        (chosen, Some(mip.objective))
    } else {
        (Vec::new(), None)
    };

    let dual_lp_upper_bound = lp_feasible.then(|| dual_upper_bound(instance, &master));

    debug!(
        node = node.id().get(),
        iterations,
        columns = pool.len(),
        objective = master.objective,
        feasible = lp_feasible,
        integral = lp_integral,
        "column generation finished"
    );

    node.set_solution(NodeSolution {
        lp_feasible,
        lp_integral,
        lp_objective: master.objective,
        lp_solution,
        mip_solution,
        mip_objective,
        vertex_reduced_costs: duals.vertex,
        dual_lp_upper_bound,
    });
    Ok(node)
}

/// Shifts the master duals into the form the pricing engine consumes:
/// `vertex[v] = cover_dual[v] - prize(v) - must_visit_dual[v]` (zero on
/// the terminals), `arc[(u,v)] = -must_visit_edge_dual[(u,v)]`, and the
/// fleet dual as the vehicle term.
fn build_pricing_duals(
    instance: &Instance,
    restrictions: &Restrictions,
    master: &MasterSolution,
) -> PricingDuals {
    let source = instance.source();
    let destination = instance.destination();

    let vertex = (0..instance.num_vertices())
        .map(|index| {
            let v = cairn_model::index::VertexIndex::new(index);
            if v == source || v == destination {
                0.0
            } else {
                let must_visit = master
                    .must_visit_vertex_duals
                    .get(&v)
                    .copied()
                    .unwrap_or(0.0);
                master.vertex_duals[index] - instance.prize(v) - must_visit
            }
        })
        .collect();

    let mut duals = PricingDuals::new(master.route_dual, vertex);
    for &arc in &restrictions.must_visit_edges {
        let dual = master.must_visit_edge_duals.get(&arc).copied().unwrap_or(0.0);
        if dual != 0.0 {
            duals.arc.insert(arc, -dual);
        }
    }
    duals
}

/// The dual-derived bound on the node's LP:
/// `sum(cover duals) - sum(must-visit duals) + fleet_dual * (m + 1)
///  + sum(max(column reduced cost, 0))`.
fn dual_upper_bound(instance: &Instance, master: &MasterSolution) -> f64 {
    let cover: f64 = master.vertex_duals.iter().sum();
    let must_visit: f64 = master.must_visit_vertex_duals.values().sum::<f64>()
        + master.must_visit_edge_duals.values().sum::<f64>();
    let columns: f64 = master
        .route_variable_duals
        .iter()
        .map(|&rc| rc.max(0.0))
        .sum();
    cover - must_visit + master.route_dual * (instance.fleet_size() as f64 + 1.0) + columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_master::lp::MinilpOracle;
    use cairn_model::index::VertexIndex;
    use cairn_model::loading::InstanceLoader;
    use cairn_pricing::params::PricingParams;

    const EPS: f64 = 1e-6;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    /// Three collinear vertices, one vehicle, generous budget: the only
    /// prize-collecting route is 0-1-2.
    fn line_instance() -> Instance {
        InstanceLoader::new()
            .from_str("n 3 m 1 b 10  0 0 0  1 0 7  2 0 0")
            .unwrap()
    }

    #[test]
    fn test_root_solve_collects_the_line_prize() {
        let instance = line_instance();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let node = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let solution = node.solution().unwrap();

        assert!(solution.lp_feasible);
        assert!(solution.lp_integral);
        assert!((solution.lp_objective - 7.0).abs() < 1e-6);
        assert_eq!(solution.mip_objective.map(|o| o.round()), Some(7.0));
        assert_eq!(solution.mip_solution.len(), 1);
        assert_eq!(
            solution.mip_solution[0].path(),
            &[v(0), v(1), v(2)]
        );
    }

    #[test]
    fn test_tight_budget_leaves_nothing_to_collect() {
        // Budget 1 admits no source-to-destination path: pricing returns
        // nothing, the empty master is trivially feasible at zero.
        let instance = InstanceLoader::new()
            .from_str("n 3 m 1 b 1  0 0 0  1 0 7  2 0 0")
            .unwrap();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let node = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let solution = node.solution().unwrap();

        assert!(solution.lp_feasible);
        assert!(solution.lp_integral);
        assert!(solution.lp_objective.abs() < 1e-9);
        assert!(solution.mip_solution.is_empty());
        assert_eq!(solution.mip_objective.map(|o| o.round()), Some(0.0));
    }

    #[test]
    fn test_resolving_the_same_node_is_stable() {
        let instance = line_instance();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let first = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let second = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let a = first.solution().unwrap().lp_objective;
        let b = second.solution().unwrap().lp_objective;
        assert!((a - b).abs() < EPS);
    }

    #[test]
    fn test_dual_bound_covers_the_lp_objective() {
        let instance = line_instance();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let node = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let solution = node.solution().unwrap();
        let bound = solution
            .dual_lp_upper_bound
            .expect("feasible node must carry a dual bound");
        assert!(bound >= solution.lp_objective - EPS);
    }

    #[test]
    fn test_zero_column_cap_stops_after_first_lp() {
        let instance = line_instance();
        let params = SolverParams::default()
            .with_pricing(PricingParams::new().with_max_columns_added(0));
        let mut oracle = MinilpOracle::new();

        let node = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let solution = node.solution().unwrap();
        assert!(solution.lp_solution.is_empty());
        assert!(solution.lp_objective.abs() < 1e-9);
    }

    #[test]
    fn test_forbidden_vertex_restriction_excludes_prize() {
        let instance = line_instance();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let root = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let restrictions = root.restrictions().forbid_vertex(v(1));
        let child = BbNode::child(cairn_model::node::NodeId::new(1), &root, restrictions);
        let child = solve_node(&instance, &params, &mut oracle, child).unwrap();
        let solution = child.solution().unwrap();
        assert!(solution.lp_feasible);
        assert!(
            solution.lp_objective.abs() < 1e-9,
            "without vertex 1 there is no prize to collect"
        );
    }

    #[test]
    fn test_unknown_restriction_is_fatal() {
        let instance = line_instance();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let root = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        let restrictions = root.restrictions().forbid_vertex(v(9));
        let child = BbNode::child(cairn_model::node::NodeId::new(1), &root, restrictions);
        let err = solve_node(&instance, &params, &mut oracle, child).unwrap_err();
        assert_eq!(err, SolverError::MissingVertex(v(9)));
    }

    #[test]
    fn test_must_visit_vertex_forces_coverage() {
        // Vertex 2 carries no prize and sits far off the line, so no
        // optimal route covers it voluntarily; requiring it must change
        // the picked routes.
        let instance = InstanceLoader::new()
            .from_str("n 4 m 1 b 12  0 0 0  1 0 9  0 5 0  2 0 0")
            .unwrap();
        let params = SolverParams::default();
        let mut oracle = MinilpOracle::new();

        let root = solve_node(&instance, &params, &mut oracle, BbNode::root()).unwrap();
        assert!(root.solution().unwrap().lp_objective >= 9.0 - EPS);

        let restrictions = root.restrictions().require_vertex(v(2));
        let child = BbNode::child(cairn_model::node::NodeId::new(1), &root, restrictions);
        let child = solve_node(&instance, &params, &mut oracle, child).unwrap();
        let solution = child.solution().unwrap();
        assert!(solution.lp_feasible);
        for (route, weight) in &solution.lp_solution {
            if *weight > 0.5 {
                assert!(route.visits(v(2)), "selected route must cover vertex 2");
            }
        }
    }
}
