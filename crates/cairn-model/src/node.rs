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

//! Branch-and-bound nodes of the branch-and-price tree.
//!
//! A `BbNode` is born with an identifier, a link to its parent, the
//! parent's LP objective (its subtree bound), and four restriction sets.
//! A worker then runs column generation on it and attaches a
//! `NodeSolution`; the processor finally either prunes it, accepts it as
//! incumbent, or branches it into children.
//!
//! Nodes are ordered best-bound-first: descending parent LP objective
//! (this is a maximization problem), ties broken by ascending id so the
//! exploration order is deterministic.

use crate::index::{ArcKey, VertexIndex};
use crate::route::Route;
use std::collections::BTreeSet;

/// A monotonically assigned branch-and-bound node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// The identifier of the root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Creates a node identifier from a raw counter value.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The four node-local restriction sets produced by branching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restrictions {
    pub must_visit_vertices: BTreeSet<VertexIndex>,
    pub must_visit_edges: BTreeSet<ArcKey>,
    pub forbidden_vertices: BTreeSet<VertexIndex>,
    pub forbidden_edges: BTreeSet<ArcKey>,
}

impl Restrictions {
    /// Returns `true` if no restriction is active, i.e. the node describes
    /// the original problem.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.must_visit_vertices.is_empty()
            && self.must_visit_edges.is_empty()
            && self.forbidden_vertices.is_empty()
            && self.forbidden_edges.is_empty()
    }

    /// Returns a copy with the given vertex added to the forbidden set.
    pub fn forbid_vertex(&self, vertex: VertexIndex) -> Self {
        let mut next = self.clone();
        next.forbidden_vertices.insert(vertex);
        next
    }

    /// Returns a copy with the given vertex added to the must-visit set.
    pub fn require_vertex(&self, vertex: VertexIndex) -> Self {
        let mut next = self.clone();
        next.must_visit_vertices.insert(vertex);
        next
    }

    /// Returns a copy with the given arc added to the forbidden set.
    pub fn forbid_edge(&self, arc: ArcKey) -> Self {
        let mut next = self.clone();
        next.forbidden_edges.insert(arc);
        next
    }

    /// Returns a copy with the given arc added to the must-visit set.
    pub fn require_edge(&self, arc: ArcKey) -> Self {
        let mut next = self.clone();
        next.must_visit_edges.insert(arc);
        next
    }
}

impl std::fmt::Display for Restrictions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Restrictions(must-visit: {}v/{}e, forbidden: {}v/{}e)",
            self.must_visit_vertices.len(),
            self.must_visit_edges.len(),
            self.forbidden_vertices.len(),
            self.forbidden_edges.len()
        )
    }
}

/// The outputs attached to a node by its column-generation solve.
#[derive(Debug, Clone)]
pub struct NodeSolution {
    /// `false` when the LP needed the auxiliary slack, i.e. the node's
    /// restrictions cannot all be satisfied. Such a node is pruned, not
    /// treated as an error.
    pub lp_feasible: bool,
    /// `true` when every primal route weight is 0 or 1 within tolerance.
    pub lp_integral: bool,
    pub lp_objective: f64,
    /// Routes with primal weight above tolerance, with their weights.
    pub lp_solution: Vec<(Route, f64)>,
    /// The integer master's route selection, when the LP was feasible.
    pub mip_solution: Vec<Route>,
    pub mip_objective: Option<f64>,
    /// Per-vertex reduced costs from the final LP, used by the branching
    /// rule to pick branching candidates.
    pub vertex_reduced_costs: Vec<f64>,
    /// A bound derived from the duals; valid whenever the LP was feasible.
    pub dual_lp_upper_bound: Option<f64>,
}

/// A branch-and-bound node of the branch-and-price tree.
#[derive(Debug, Clone)]
pub struct BbNode {
    id: NodeId,
    parent: Option<NodeId>,
    parent_lp_objective: f64,
    restrictions: Restrictions,
    solution: Option<NodeSolution>,
    children: Vec<NodeId>,
}

impl BbNode {
    /// Creates the root node: no restrictions, an unbounded parent
    /// objective so it always sorts first.
    #[inline]
    pub fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            parent: None,
            parent_lp_objective: f64::INFINITY,
            restrictions: Restrictions::default(),
            solution: None,
            children: Vec::new(),
        }
    }

    /// Creates a child of `parent` with the given restrictions. The
    /// parent's LP objective becomes the child's subtree bound.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the parent has not been solved.
    #[inline]
    pub fn child(id: NodeId, parent: &BbNode, restrictions: Restrictions) -> Self {
        debug_assert!(
            parent.is_solved(),
            "called `BbNode::child` on an unsolved parent node"
        );
        Self {
            id,
            parent: Some(parent.id),
            parent_lp_objective: parent.lp_objective(),
            restrictions,
            solution: None,
            children: Vec::new(),
        }
    }

    /// Returns this node's identifier.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the parent's identifier, if any.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the parent's LP objective (the subtree bound).
    #[inline]
    pub fn parent_lp_objective(&self) -> f64 {
        self.parent_lp_objective
    }

    /// Returns the restriction sets of this node.
    #[inline]
    pub fn restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    /// Returns `true` once a solution has been attached.
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    /// Attaches the column-generation outputs to this node.
    #[inline]
    pub fn set_solution(&mut self, solution: NodeSolution) {
        self.solution = Some(solution);
    }

    /// Returns the attached solution, if any.
    #[inline]
    pub fn solution(&self) -> Option<&NodeSolution> {
        self.solution.as_ref()
    }

    /// Returns `true` if the node's LP was feasible.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the node has not been solved.
    #[inline]
    pub fn lp_feasible(&self) -> bool {
        debug_assert!(
            self.is_solved(),
            "called `BbNode::lp_feasible` on an unsolved node"
        );
        self.solution.as_ref().is_some_and(|s| s.lp_feasible)
    }

    /// Returns `true` if the node's LP solution is integral.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the node has not been solved.
    #[inline]
    pub fn lp_integral(&self) -> bool {
        debug_assert!(
            self.is_solved(),
            "called `BbNode::lp_integral` on an unsolved node"
        );
        self.solution.as_ref().is_some_and(|s| s.lp_integral)
    }

    /// Returns the node's LP objective.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the node has not been solved. In release
    /// builds an unsolved node reports negative infinity, which prunes it.
    #[inline]
    pub fn lp_objective(&self) -> f64 {
        debug_assert!(
            self.is_solved(),
            "called `BbNode::lp_objective` on an unsolved node"
        );
        self.solution
            .as_ref()
            .map_or(f64::NEG_INFINITY, |s| s.lp_objective)
    }

    /// Returns the children recorded by branching.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Records the children produced by branching this node.
    #[inline]
    pub fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }
}

impl std::fmt::Display for BbNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbNode(id: {}, bound: {}, {}, solved: {})",
            self.id.get(),
            self.parent_lp_objective,
            self.restrictions,
            self.is_solved()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn solved(mut node: BbNode, objective: f64) -> BbNode {
        node.set_solution(NodeSolution {
            lp_feasible: true,
            lp_integral: false,
            lp_objective: objective,
            lp_solution: Vec::new(),
            mip_solution: Vec::new(),
            mip_objective: None,
            vertex_reduced_costs: Vec::new(),
            dual_lp_upper_bound: None,
        });
        node
    }

    #[test]
    fn test_root_has_unbounded_parent_objective() {
        let root = BbNode::root();
        assert_eq!(root.id(), NodeId::ROOT);
        assert_eq!(root.parent(), None);
        assert!(root.parent_lp_objective().is_infinite());
        assert!(root.restrictions().is_empty());
        assert!(!root.is_solved());
    }

    #[test]
    fn test_child_inherits_parent_objective() {
        let root = solved(BbNode::root(), 42.5);
        let restrictions = root.restrictions().forbid_vertex(v(2));
        let child = BbNode::child(NodeId::new(1), &root, restrictions);
        assert_eq!(child.parent(), Some(NodeId::ROOT));
        assert_eq!(child.parent_lp_objective(), 42.5);
        assert!(child.restrictions().forbidden_vertices.contains(&v(2)));
    }

    #[test]
    fn test_restriction_builders_do_not_alias() {
        let base = Restrictions::default();
        let forbidden = base.forbid_vertex(v(1));
        let required = base.require_vertex(v(1));
        assert!(base.is_empty());
        assert!(forbidden.forbidden_vertices.contains(&v(1)));
        assert!(!forbidden.must_visit_vertices.contains(&v(1)));
        assert!(required.must_visit_vertices.contains(&v(1)));

        let edged = base.require_edge((v(1), v(2))).forbid_edge((v(2), v(3)));
        assert!(edged.must_visit_edges.contains(&(v(1), v(2))));
        assert!(edged.forbidden_edges.contains(&(v(2), v(3))));
    }

    #[test]
    fn test_solution_attachment() {
        let node = solved(BbNode::root(), 10.0);
        assert!(node.is_solved());
        assert!(node.lp_feasible());
        assert!(!node.lp_integral());
        assert_eq!(node.lp_objective(), 10.0);
    }

    #[test]
    fn test_children_recording() {
        let mut node = solved(BbNode::root(), 10.0);
        node.set_children(vec![NodeId::new(1), NodeId::new(2)]);
        assert_eq!(node.children(), &[NodeId::new(1), NodeId::new(2)]);
    }

    #[test]
    fn test_node_id_ordering() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert_eq!(NodeId::ROOT.get(), 0);
    }
}
