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

//! The immutable team-orienteering instance.
//!
//! An `Instance` is a directed weighted graph together with per-vertex
//! prizes, a source, a destination, a fleet size, and a length budget. It
//! is created once through `InstanceBuilder` and never mutated afterwards;
//! all solver layers share it by reference.
//!
//! Structural rules, enforced at build time:
//! - arc weights are non-negative,
//! - arcs longer than the budget are dropped (no path may use them),
//! - self-loops are never stored,
//! - the source has no incoming arcs and the destination no outgoing arcs.
//!
//! The adjacency is stored twice, as outgoing and incoming lists, because
//! the pricing engine walks the graph in both directions.

use crate::error::SolverError;
use crate::index::VertexIndex;

/// One endpoint of a directed arc as seen from the adjacency list that
/// stores it: the opposite vertex plus the arc weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub vertex: VertexIndex,
    pub weight: f64,
}

/// An immutable team-orienteering instance.
#[derive(Debug, Clone)]
pub struct Instance {
    outgoing: Vec<Vec<Neighbor>>,
    incoming: Vec<Vec<Neighbor>>,
    prizes: Vec<f64>,
    source: VertexIndex,
    destination: VertexIndex,
    fleet_size: usize,
    budget: f64,
    num_arcs: usize,
}

impl Instance {
    /// Returns the number of vertices in the graph.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.prizes.len()
    }

    /// Returns the number of stored (budget-feasible) arcs.
    #[inline]
    pub fn num_arcs(&self) -> usize {
        self.num_arcs
    }

    /// Returns the source vertex.
    #[inline]
    pub fn source(&self) -> VertexIndex {
        self.source
    }

    /// Returns the destination vertex.
    #[inline]
    pub fn destination(&self) -> VertexIndex {
        self.destination
    }

    /// Returns the number of vehicles in the fleet.
    #[inline]
    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    /// Returns the per-vehicle length budget.
    #[inline]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Returns the prize of the given vertex.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if `vertex` is out of bounds.
    #[inline]
    pub fn prize(&self, vertex: VertexIndex) -> f64 {
        let index = vertex.get();
        debug_assert!(
            index < self.num_vertices(),
            "called `Instance::prize` with vertex index out of bounds: the len is {} but the index is {}",
            self.num_vertices(),
            index
        );
        self.prizes[index]
    }

    /// Returns the full prize vector, indexed by vertex.
    #[inline]
    pub fn prizes(&self) -> &[f64] {
        &self.prizes
    }

    /// Returns the outgoing arcs of the given vertex.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if `vertex` is out of bounds.
    #[inline]
    pub fn outgoing(&self, vertex: VertexIndex) -> &[Neighbor] {
        let index = vertex.get();
        debug_assert!(
            index < self.num_vertices(),
            "called `Instance::outgoing` with vertex index out of bounds: the len is {} but the index is {}",
            self.num_vertices(),
            index
        );
        &self.outgoing[index]
    }

    /// Returns the incoming arcs of the given vertex.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if `vertex` is out of bounds.
    #[inline]
    pub fn incoming(&self, vertex: VertexIndex) -> &[Neighbor] {
        let index = vertex.get();
        debug_assert!(
            index < self.num_vertices(),
            "called `Instance::incoming` with vertex index out of bounds: the len is {} but the index is {}",
            self.num_vertices(),
            index
        );
        &self.incoming[index]
    }

    /// Checks whether the given vertex index is part of the graph.
    #[inline]
    pub fn has_vertex(&self, vertex: VertexIndex) -> bool {
        vertex.get() < self.num_vertices()
    }

    /// Checks whether the directed arc `from -> to` is part of the graph.
    #[inline]
    pub fn has_arc(&self, from: VertexIndex, to: VertexIndex) -> bool {
        self.arc_weight(from, to).is_some()
    }

    /// Returns the weight of the directed arc `from -> to`, or `None` if
    /// the arc does not exist.
    #[inline]
    pub fn arc_weight(&self, from: VertexIndex, to: VertexIndex) -> Option<f64> {
        if !self.has_vertex(from) || !self.has_vertex(to) {
            return None;
        }
        self.outgoing[from.get()]
            .iter()
            .find(|n| n.vertex == to)
            .map(|n| n.weight)
    }

    /// Returns a copy of this instance with an adjusted fleet size, for
    /// sensitivity analysis.
    ///
    /// # Panics
    ///
    /// Panics if `fleet_size` is zero.
    pub fn with_fleet_size(&self, fleet_size: usize) -> Instance {
        assert!(
            fleet_size >= 1,
            "called `Instance::with_fleet_size` with a fleet size of zero"
        );
        let mut instance = self.clone();
        instance.fleet_size = fleet_size;
        instance
    }

    /// Returns a copy of this instance with all arcs touching the given
    /// vertices removed, for sensitivity analysis. Vertex indices stay
    /// stable; removed vertices simply become unreachable. Attempts to
    /// remove the source or destination are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::MissingVertex` if any index is not part of
    /// the graph.
    pub fn without_vertices(&self, vertices: &[VertexIndex]) -> Result<Instance, SolverError> {
        for &v in vertices {
            if !self.has_vertex(v) {
                return Err(SolverError::MissingVertex(v));
            }
        }

        let mut removed = vec![false; self.num_vertices()];
        for &v in vertices {
            if v != self.source && v != self.destination {
                removed[v.get()] = true;
            }
        }

        let mut instance = self.clone();
        let mut num_arcs = 0;
        for (index, arcs) in instance.outgoing.iter_mut().enumerate() {
            if removed[index] {
                arcs.clear();
            } else {
                arcs.retain(|n| !removed[n.vertex.get()]);
            }
            num_arcs += arcs.len();
        }
        for (index, arcs) in instance.incoming.iter_mut().enumerate() {
            if removed[index] {
                arcs.clear();
            } else {
                arcs.retain(|n| !removed[n.vertex.get()]);
            }
        }
        instance.num_arcs = num_arcs;
        Ok(instance)
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance(vertices: {}, arcs: {}, fleet: {}, budget: {})",
            self.num_vertices(),
            self.num_arcs,
            self.fleet_size,
            self.budget
        )
    }
}

/// A builder for `Instance` that enforces the structural graph rules while
/// arcs are added.
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    outgoing: Vec<Vec<Neighbor>>,
    incoming: Vec<Vec<Neighbor>>,
    prizes: Vec<f64>,
    source: VertexIndex,
    destination: VertexIndex,
    fleet_size: usize,
    budget: f64,
    num_arcs: usize,
}

impl InstanceBuilder {
    /// Creates a new builder for a graph with `num_vertices` vertices.
    ///
    /// # Panics
    ///
    /// Panics if `num_vertices < 2`, if the source equals the destination,
    /// if either endpoint is out of bounds, if `fleet_size` is zero, or if
    /// the budget is not strictly positive.
    pub fn new(
        num_vertices: usize,
        source: VertexIndex,
        destination: VertexIndex,
        fleet_size: usize,
        budget: f64,
    ) -> Self {
        assert!(
            num_vertices >= 2,
            "called `InstanceBuilder::new` with fewer than two vertices"
        );
        assert!(
            source.get() < num_vertices && destination.get() < num_vertices,
            "called `InstanceBuilder::new` with source or destination out of bounds"
        );
        assert!(
            source != destination,
            "called `InstanceBuilder::new` with source equal to destination"
        );
        assert!(
            fleet_size >= 1,
            "called `InstanceBuilder::new` with a fleet size of zero"
        );
        assert!(
            budget > 0.0,
            "called `InstanceBuilder::new` with a non-positive budget"
        );

        Self {
            outgoing: vec![Vec::new(); num_vertices],
            incoming: vec![Vec::new(); num_vertices],
            prizes: vec![0.0; num_vertices],
            source,
            destination,
            fleet_size,
            budget,
            num_arcs: 0,
        }
    }

    /// Sets the prize of the given vertex.
    ///
    /// # Panics
    ///
    /// Panics if `vertex` is out of bounds or the prize is negative.
    pub fn set_prize(&mut self, vertex: VertexIndex, prize: f64) -> &mut Self {
        assert!(
            vertex.get() < self.prizes.len(),
            "called `InstanceBuilder::set_prize` with vertex index out of bounds: the len is {} but the index is {}",
            self.prizes.len(),
            vertex.get()
        );
        assert!(
            prize >= 0.0,
            "called `InstanceBuilder::set_prize` with a negative prize"
        );
        self.prizes[vertex.get()] = prize;
        self
    }

    /// Adds the directed arc `from -> to` with the given weight. Returns
    /// `true` if the arc was stored.
    ///
    /// Arcs that violate the structural rules are skipped silently:
    /// self-loops, arcs into the source, arcs out of the destination, and
    /// arcs whose weight exceeds the budget (no feasible path can use
    /// them). Duplicate arcs are skipped as well.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint is out of bounds or the weight is negative.
    pub fn add_arc(&mut self, from: VertexIndex, to: VertexIndex, weight: f64) -> bool {
        let n = self.prizes.len();
        assert!(
            from.get() < n && to.get() < n,
            "called `InstanceBuilder::add_arc` with an endpoint out of bounds: the len is {} but the arc is {} -> {}",
            n,
            from.get(),
            to.get()
        );
        assert!(
            weight >= 0.0,
            "called `InstanceBuilder::add_arc` with a negative weight"
        );

        if from == to
            || to == self.source
            || from == self.destination
            || weight > self.budget
            || self.outgoing[from.get()].iter().any(|a| a.vertex == to)
        {
            return false;
        }

        self.outgoing[from.get()].push(Neighbor { vertex: to, weight });
        self.incoming[to.get()].push(Neighbor { vertex: from, weight });
        self.num_arcs += 1;
        true
    }

    /// Finalizes the builder into an immutable `Instance`.
    pub fn build(self) -> Instance {
        Instance {
            outgoing: self.outgoing,
            incoming: self.incoming,
            prizes: self.prizes,
            source: self.source,
            destination: self.destination,
            fleet_size: self.fleet_size,
            budget: self.budget,
            num_arcs: self.num_arcs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    /// A small diamond: 0 -> {1, 2} -> 3 with prizes on 1 and 2.
    fn diamond() -> Instance {
        let mut builder = InstanceBuilder::new(4, v(0), v(3), 2, 10.0);
        builder.set_prize(v(1), 5.0);
        builder.set_prize(v(2), 3.0);
        builder.add_arc(v(0), v(1), 1.0);
        builder.add_arc(v(0), v(2), 2.0);
        builder.add_arc(v(1), v(3), 1.0);
        builder.add_arc(v(2), v(3), 2.0);
        builder.add_arc(v(1), v(2), 1.0);
        builder.build()
    }

    #[test]
    fn test_build_stores_arcs_both_directions() {
        let instance = diamond();
        assert_eq!(instance.num_vertices(), 4);
        assert_eq!(instance.num_arcs(), 5);
        assert_eq!(instance.outgoing(v(0)).len(), 2);
        assert_eq!(instance.incoming(v(3)).len(), 2);
        assert_eq!(instance.arc_weight(v(0), v(2)), Some(2.0));
        assert_eq!(instance.arc_weight(v(2), v(0)), None);
        assert!(instance.has_arc(v(1), v(2)));
        assert!(!instance.has_arc(v(2), v(1)));
    }

    #[test]
    fn test_builder_skips_structurally_forbidden_arcs() {
        let mut builder = InstanceBuilder::new(4, v(0), v(3), 1, 10.0);
        assert!(!builder.add_arc(v(1), v(1), 1.0), "self-loop");
        assert!(!builder.add_arc(v(1), v(0), 1.0), "arc into the source");
        assert!(!builder.add_arc(v(3), v(1), 1.0), "arc out of the destination");
        assert!(!builder.add_arc(v(0), v(1), 11.0), "weight above budget");
        assert!(builder.add_arc(v(0), v(1), 1.0));
        assert!(!builder.add_arc(v(0), v(1), 2.0), "duplicate arc");
        let instance = builder.build();
        assert_eq!(instance.num_arcs(), 1);
    }

    #[test]
    fn test_prizes_default_to_zero() {
        let instance = diamond();
        assert_eq!(instance.prize(v(0)), 0.0);
        assert_eq!(instance.prize(v(1)), 5.0);
        assert_eq!(instance.prize(v(2)), 3.0);
        assert_eq!(instance.prize(v(3)), 0.0);
    }

    #[test]
    fn test_with_fleet_size() {
        let instance = diamond().with_fleet_size(7);
        assert_eq!(instance.fleet_size(), 7);
        assert_eq!(instance.num_arcs(), 5);
    }

    #[test]
    fn test_without_vertices_drops_arcs_keeps_indices() {
        let instance = diamond().without_vertices(&[v(1)]).unwrap();
        assert_eq!(instance.num_vertices(), 4, "indices stay stable");
        assert!(!instance.has_arc(v(0), v(1)));
        assert!(!instance.has_arc(v(1), v(3)));
        assert!(!instance.has_arc(v(1), v(2)));
        assert!(instance.has_arc(v(0), v(2)));
        assert!(instance.has_arc(v(2), v(3)));
        assert_eq!(instance.num_arcs(), 2);
    }

    #[test]
    fn test_without_vertices_ignores_terminals() {
        let instance = diamond().without_vertices(&[v(0), v(3)]).unwrap();
        assert_eq!(instance.num_arcs(), 5);
    }

    #[test]
    fn test_without_vertices_rejects_unknown_vertex() {
        let err = diamond().without_vertices(&[v(9)]).unwrap_err();
        assert_eq!(err, SolverError::MissingVertex(v(9)));
    }

    #[test]
    fn test_display_summarizes_dimensions() {
        let text = format!("{}", diamond());
        assert!(text.contains("vertices: 4"));
        assert!(text.contains("fleet: 2"));
    }
}
