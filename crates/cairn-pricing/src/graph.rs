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

//! The reduced graph a branch-and-bound node prices against.
//!
//! Branching forbids vertices and arcs node-locally. The pricing engine
//! never sees those restrictions directly; instead it receives a
//! `ReducedGraph`, the instance graph with the forbidden entities removed.
//!
//! Restrictions are validated against the ORIGINAL graph: a restriction
//! naming a vertex or arc the instance never had is a fatal error, while
//! one naming an entity that an earlier restriction already removed is
//! simply ignored.

use cairn_model::error::SolverError;
use cairn_model::index::{ArcKey, VertexIndex};
use cairn_model::instance::{Instance, Neighbor};
use std::collections::BTreeSet;

/// The instance graph with node-local forbidden vertices and arcs removed.
#[derive(Debug, Clone)]
pub struct ReducedGraph {
    outgoing: Vec<Vec<Neighbor>>,
    incoming: Vec<Vec<Neighbor>>,
    prizes: Vec<f64>,
    source: VertexIndex,
    destination: VertexIndex,
    budget: f64,
}

impl ReducedGraph {
    /// Builds the reduced graph of `instance` under the given forbidden
    /// sets.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::MissingVertex` or `SolverError::MissingEdge`
    /// when a forbidden entity is not part of the original graph.
    pub fn new(
        instance: &Instance,
        forbidden_vertices: &BTreeSet<VertexIndex>,
        forbidden_edges: &BTreeSet<ArcKey>,
    ) -> Result<Self, SolverError> {
        for &vertex in forbidden_vertices {
            if !instance.has_vertex(vertex) {
                return Err(SolverError::MissingVertex(vertex));
            }
        }
        for &(from, to) in forbidden_edges {
            if !instance.has_arc(from, to) {
                return Err(SolverError::MissingEdge(from, to));
            }
        }

        let n = instance.num_vertices();
        let mut removed = vec![false; n];
        for &vertex in forbidden_vertices {
            removed[vertex.get()] = true;
        }

        let keep = |from: VertexIndex, to: VertexIndex| {
            !removed[from.get()] && !removed[to.get()] && !forbidden_edges.contains(&(from, to))
        };

        let mut outgoing = vec![Vec::new(); n];
        let mut incoming = vec![Vec::new(); n];
        for index in 0..n {
            let from = VertexIndex::new(index);
            for neighbor in instance.outgoing(from) {
                if keep(from, neighbor.vertex) {
                    outgoing[index].push(*neighbor);
                    incoming[neighbor.vertex.get()].push(Neighbor {
                        vertex: from,
                        weight: neighbor.weight,
                    });
                }
            }
        }

        Ok(Self {
            outgoing,
            incoming,
            prizes: instance.prizes().to_vec(),
            source: instance.source(),
            destination: instance.destination(),
            budget: instance.budget(),
        })
    }

    /// Returns the number of vertices (identical to the original graph;
    /// forbidden vertices merely lose their arcs).
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.prizes.len()
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

    /// Returns the per-vehicle length budget.
    #[inline]
    pub fn budget(&self) -> f64 {
        self.budget
    }

    /// Returns the prize of the given vertex.
    #[inline]
    pub fn prize(&self, vertex: VertexIndex) -> f64 {
        debug_assert!(
            vertex.get() < self.prizes.len(),
            "called `ReducedGraph::prize` with vertex index out of bounds: the len is {} but the index is {}",
            self.prizes.len(),
            vertex.get()
        );
        self.prizes[vertex.get()]
    }

    /// Returns the surviving outgoing arcs of the given vertex.
    #[inline]
    pub fn outgoing(&self, vertex: VertexIndex) -> &[Neighbor] {
        debug_assert!(
            vertex.get() < self.outgoing.len(),
            "called `ReducedGraph::outgoing` with vertex index out of bounds: the len is {} but the index is {}",
            self.outgoing.len(),
            vertex.get()
        );
        &self.outgoing[vertex.get()]
    }

    /// Returns the surviving incoming arcs of the given vertex.
    #[inline]
    pub fn incoming(&self, vertex: VertexIndex) -> &[Neighbor] {
        debug_assert!(
            vertex.get() < self.incoming.len(),
            "called `ReducedGraph::incoming` with vertex index out of bounds: the len is {} but the index is {}",
            self.incoming.len(),
            vertex.get()
        );
        &self.incoming[vertex.get()]
    }
}

impl std::fmt::Display for ReducedGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arcs: usize = self.outgoing.iter().map(Vec::len).sum();
        write!(
            f,
            "ReducedGraph(vertices: {}, arcs: {}, budget: {})",
            self.num_vertices(),
            arcs,
            self.budget
        )
    }
}
