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

//! The vertex/arc branching rule.
//!
//! Flows are accumulated from the node's fractional LP solution. Vertex
//! branching comes first: among vertices with fractional flow, the one
//! with the smallest reduced cost is either forbidden or required (two
//! children). Without a fractional vertex, the rule branches on the
//! fractional arc whose tail has the smallest reduced cost: when an
//! endpoint is already must-visit, the arc itself is enforced or
//! forbidden (two children); otherwise the tail is forbidden, or
//! required together with enforcing or forbidding the arc (three
//! children).

use crate::colgen::TopNode;
use cairn_bnb::node::{Brancher, IdGenerator};
use cairn_core::num::is_fractional;
use cairn_model::error::SolverError;
use cairn_model::index::{ArcKey, VertexIndex};
use cairn_model::node::{BbNode, NodeId, NodeSolution};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::debug;

/// The branching strategy of the branch-and-price tree.
#[derive(Debug, Clone)]
pub struct TopBrancher {
    epsilon: f64,
}

impl TopBrancher {
    /// Creates the rule with the given fractionality tolerance.
    #[inline]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Brancher<TopNode> for TopBrancher {
    type Error = SolverError;

    fn branch(&self, node: &TopNode, ids: &mut IdGenerator) -> Result<Vec<TopNode>, SolverError> {
        let children = branch(&node.0, self.epsilon, ids)?;
        Ok(children.into_iter().map(TopNode).collect())
    }
}

/// Produces the children of a solved fractional node.
///
/// # Errors
///
/// `SolverError::NullVertexReducedCosts` when the node carries no
/// solution, `SolverError::BranchOnNullArc` when the node is fractional
/// yet neither a vertex nor an arc has fractional flow.
pub fn branch(
    node: &BbNode,
    epsilon: f64,
    ids: &mut IdGenerator,
) -> Result<Vec<BbNode>, SolverError> {
    let solution = node.solution().ok_or(SolverError::NullVertexReducedCosts)?;
    let reduced_costs = &solution.vertex_reduced_costs;
    if reduced_costs.is_empty() {
        return Err(SolverError::NullVertexReducedCosts);
    }

    let (vertex_flow, arc_flow) = accumulate_flows(solution);

    if let Some(vertex) = pick_fractional_vertex(&vertex_flow, reduced_costs, epsilon) {
        debug!(node = node.id().get(), vertex = vertex.get(), "vertex branching");
        let restrictions = node.restrictions();
        let children: SmallVec<[BbNode; 3]> = SmallVec::from_iter([
            BbNode::child(next(ids), node, restrictions.forbid_vertex(vertex)),
            BbNode::child(next(ids), node, restrictions.require_vertex(vertex)),
        ]);
        return Ok(children.into_vec());
    }

    if let Some(arc) = pick_fractional_arc(&arc_flow, reduced_costs, epsilon) {
        debug!(
            node = node.id().get(),
            from = arc.0.get(),
            to = arc.1.get(),
            "arc branching"
        );
        let restrictions = node.restrictions();
        let (tail, head) = arc;
        let endpoint_required = restrictions.must_visit_vertices.contains(&tail)
            || restrictions.must_visit_vertices.contains(&head);

        let children: SmallVec<[BbNode; 3]> = if endpoint_required {
            SmallVec::from_iter([
                BbNode::child(next(ids), node, restrictions.require_edge(arc)),
                BbNode::child(next(ids), node, restrictions.forbid_edge(arc)),
            ])
        } else {
            SmallVec::from_iter([
                BbNode::child(next(ids), node, restrictions.forbid_vertex(tail)),
                BbNode::child(
                    next(ids),
                    node,
                    restrictions.require_vertex(tail).require_edge(arc),
                ),
                BbNode::child(
                    next(ids),
                    node,
                    restrictions.require_vertex(tail).forbid_edge(arc),
                ),
            ])
        };
        return Ok(children.into_vec());
    }

    if node.lp_integral() {
        return Ok(Vec::new());
    }
    Err(SolverError::BranchOnNullArc)
}

fn next(ids: &mut IdGenerator) -> NodeId {
    NodeId::new(ids.next_id())
}

/// Accumulates vertex and arc flows over the fractional LP solution.
/// Occurrence is binary per route: a route either covers an entity or it
/// does not.
fn accumulate_flows(
    solution: &NodeSolution,
) -> (BTreeMap<VertexIndex, f64>, BTreeMap<ArcKey, f64>) {
    let mut vertex_flow: BTreeMap<VertexIndex, f64> = BTreeMap::new();
    let mut arc_flow: BTreeMap<ArcKey, f64> = BTreeMap::new();

    for (route, weight) in &solution.lp_solution {
        let mut seen: SmallVec<[VertexIndex; 16]> = SmallVec::new();
        for &vertex in route.intermediate() {
            if !seen.contains(&vertex) {
                seen.push(vertex);
                *vertex_flow.entry(vertex).or_insert(0.0) += weight;
            }
        }
        let mut seen_arcs: SmallVec<[ArcKey; 16]> = SmallVec::new();
        for arc in route.arcs() {
            if !seen_arcs.contains(&arc) {
                seen_arcs.push(arc);
                *arc_flow.entry(arc).or_insert(0.0) += weight;
            }
        }
    }

    (vertex_flow, arc_flow)
}

/// The fractional vertex with the smallest reduced cost, if any.
fn pick_fractional_vertex(
    vertex_flow: &BTreeMap<VertexIndex, f64>,
    reduced_costs: &[f64],
    epsilon: f64,
) -> Option<VertexIndex> {
    vertex_flow
        .iter()
        .filter(|&(_, &flow)| is_fractional(flow, epsilon))
        .min_by(|a, b| reduced_costs[a.0.get()].total_cmp(&reduced_costs[b.0.get()]))
        .map(|(&vertex, _)| vertex)
}

/// The fractional arc whose tail has the smallest reduced cost, if any.
fn pick_fractional_arc(
    arc_flow: &BTreeMap<ArcKey, f64>,
    reduced_costs: &[f64],
    epsilon: f64,
) -> Option<ArcKey> {
    arc_flow
        .iter()
        .filter(|&(_, &flow)| is_fractional(flow, epsilon))
        .min_by(|a, b| reduced_costs[a.0 .0.get()].total_cmp(&reduced_costs[b.0 .0.get()]))
        .map(|(&arc, _)| arc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_model::node::Restrictions;
    use cairn_model::route::Route;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn route(path: &[usize]) -> Route {
        Route::new(path.iter().map(|&i| v(i)).collect(), 1.0, 1.0, 0.0, true)
    }

    fn solved_node(lp_solution: Vec<(Route, f64)>, reduced_costs: Vec<f64>) -> BbNode {
        let mut node = BbNode::root();
        node.set_solution(NodeSolution {
            lp_feasible: true,
            lp_integral: false,
            lp_objective: 10.0,
            lp_solution,
            mip_solution: Vec::new(),
            mip_objective: None,
            vertex_reduced_costs: reduced_costs,
            dual_lp_upper_bound: None,
        });
        node
    }

    #[test]
    fn test_vertex_branching_on_smallest_reduced_cost() {
        // Vertices 1 and 2 both carry flow 0.5; vertex 2 has the smaller
        // reduced cost and must be chosen.
        let node = solved_node(
            vec![(route(&[0, 1, 4]), 0.5), (route(&[0, 2, 4]), 0.5)],
            vec![0.0, -1.0, -3.0, 0.0, 0.0],
        );
        let mut ids = IdGenerator::new(1);
        let children = branch(&node, 1e-6, &mut ids).unwrap();

        assert_eq!(children.len(), 2);
        assert!(children[0].restrictions().forbidden_vertices.contains(&v(2)));
        assert!(children[1].restrictions().must_visit_vertices.contains(&v(2)));
        assert_eq!(children[0].id(), NodeId::new(1));
        assert_eq!(children[1].id(), NodeId::new(2));
        assert_eq!(children[0].parent_lp_objective(), 10.0);
    }

    #[test]
    fn test_arc_branching_produces_three_children() {
        // Both routes cover vertices 1 and 2 fully (flow 1), but split
        // on the order, so only arcs are fractional.
        let node = solved_node(
            vec![
                (route(&[0, 1, 2, 4]), 0.5),
                (route(&[0, 2, 1, 4]), 0.5),
            ],
            vec![0.0, -5.0, -1.0, 0.0, 0.0],
        );
        let mut ids = IdGenerator::new(1);
        let children = branch(&node, 1e-6, &mut ids).unwrap();

        assert_eq!(children.len(), 3);
        // The fractional arc with the cheapest tail is one leaving
        // vertex 1 (reduced cost -5).
        let tail = v(1);
        assert!(children[0].restrictions().forbidden_vertices.contains(&tail));
        assert!(children[1].restrictions().must_visit_vertices.contains(&tail));
        assert_eq!(children[1].restrictions().must_visit_edges.len(), 1);
        assert!(children[2].restrictions().must_visit_vertices.contains(&tail));
        assert_eq!(children[2].restrictions().forbidden_edges.len(), 1);
    }

    #[test]
    fn test_arc_branching_with_required_endpoint_produces_two_children() {
        let mut node = BbNode::root();
        node.set_solution(NodeSolution {
            lp_feasible: true,
            lp_integral: false,
            lp_objective: 10.0,
            lp_solution: vec![
                (route(&[0, 1, 2, 4]), 0.5),
                (route(&[0, 2, 1, 4]), 0.5),
            ],
            mip_solution: Vec::new(),
            mip_objective: None,
            vertex_reduced_costs: vec![0.0, -5.0, -1.0, 0.0, 0.0],
            dual_lp_upper_bound: None,
        });
        // Requiring vertex 1 beforehand flips arc branching to the
        // two-child form.
        let restricted = Restrictions::default().require_vertex(v(1));
        let parent = node.clone();
        let mut child = BbNode::child(NodeId::new(9), &parent, restricted);
        child.set_solution(parent.solution().unwrap().clone());

        let mut ids = IdGenerator::new(10);
        let children = branch(&child, 1e-6, &mut ids).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].restrictions().must_visit_edges.len(), 1);
        assert_eq!(children[1].restrictions().forbidden_edges.len(), 1);
    }

    #[test]
    fn test_integral_node_produces_no_children() {
        let mut node = BbNode::root();
        node.set_solution(NodeSolution {
            lp_feasible: true,
            lp_integral: true,
            lp_objective: 10.0,
            lp_solution: vec![(route(&[0, 1, 4]), 1.0)],
            mip_solution: Vec::new(),
            mip_objective: None,
            vertex_reduced_costs: vec![0.0; 5],
            dual_lp_upper_bound: None,
        });
        let mut ids = IdGenerator::new(1);
        assert!(branch(&node, 1e-6, &mut ids).unwrap().is_empty());
    }

    #[test]
    fn test_unsolved_node_is_an_error() {
        let node = BbNode::root();
        let mut ids = IdGenerator::new(1);
        assert_eq!(
            branch(&node, 1e-6, &mut ids).unwrap_err(),
            SolverError::NullVertexReducedCosts
        );
    }

    #[test]
    fn test_fractional_node_without_fractional_flow_is_a_bug() {
        // Integral flows but a non-integral marker: the arc-branching
        // step finds nothing and must signal it.
        let node = solved_node(vec![(route(&[0, 1, 4]), 1.0)], vec![0.0; 5]);
        let mut ids = IdGenerator::new(1);
        assert_eq!(
            branch(&node, 1e-6, &mut ids).unwrap_err(),
            SolverError::BranchOnNullArc
        );
    }
}
