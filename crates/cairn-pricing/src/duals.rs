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

//! Dual values handed to the pricing engine.
//!
//! The reduced cost of a route `s = v0 -> v1 -> ... -> vk = t` is
//!
//! ```raw
//! rc = vehicle + sum_{i=1..k} (vertex[v_i] + arc[(v_{i-1}, v_i)])
//! ```
//!
//! The vehicle term comes from the fleet-size constraint, the per-vertex
//! terms are the cover duals shifted by the prizes (and must-visit duals),
//! and the sparse arc terms come from must-visit-edge duals. The pricing
//! engine searches for routes with `rc < -epsilon`.

use cairn_model::index::{ArcKey, VertexIndex};
use std::collections::BTreeMap;

/// The dual values of one restricted-master solve, in the shifted form the
/// pricing engine consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingDuals {
    /// Dual of the fleet-size constraint.
    pub vehicle: f64,
    /// Per-vertex reduced cost, indexed by vertex. Zero for the source
    /// and destination.
    pub vertex: Vec<f64>,
    /// Sparse per-arc terms from must-visit-edge duals. Absent arcs read
    /// as zero.
    pub arc: BTreeMap<ArcKey, f64>,
}

impl PricingDuals {
    /// Creates dual values with the given per-vertex terms and no arc
    /// terms.
    #[inline]
    pub fn new(vehicle: f64, vertex: Vec<f64>) -> Self {
        Self {
            vehicle,
            vertex,
            arc: BTreeMap::new(),
        }
    }

    /// Returns the vertex term of the given vertex.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if `vertex` is out of bounds.
    #[inline]
    pub fn vertex_term(&self, vertex: VertexIndex) -> f64 {
        let index = vertex.get();
        debug_assert!(
            index < self.vertex.len(),
            "called `PricingDuals::vertex_term` with vertex index out of bounds: the len is {} but the index is {}",
            self.vertex.len(),
            index
        );
        self.vertex[index]
    }

    /// Returns the arc term of the directed arc `from -> to`; zero when no
    /// must-visit-edge dual touches it.
    #[inline]
    pub fn arc_term(&self, from: VertexIndex, to: VertexIndex) -> f64 {
        self.arc.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// Evaluates the reduced cost of a full vertex sequence under these
    /// duals. This is the reference implementation the engine's
    /// incremental bookkeeping must agree with.
    pub fn route_reduced_cost(&self, path: &[VertexIndex]) -> f64 {
        debug_assert!(
            path.len() >= 2,
            "called `PricingDuals::route_reduced_cost` with a path of fewer than two vertices"
        );
        let mut rc = self.vehicle;
        for pair in path.windows(2) {
            rc += self.vertex_term(pair[1]) + self.arc_term(pair[0], pair[1]);
        }
        rc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    #[test]
    fn test_vertex_and_arc_terms() {
        let mut duals = PricingDuals::new(0.5, vec![0.0, -2.0, -3.0, 0.0]);
        duals.arc.insert((v(1), v(2)), -1.5);

        assert_eq!(duals.vertex_term(v(1)), -2.0);
        assert_eq!(duals.arc_term(v(1), v(2)), -1.5);
        assert_eq!(duals.arc_term(v(2), v(1)), 0.0);
    }

    #[test]
    fn test_route_reduced_cost_reference() {
        let mut duals = PricingDuals::new(1.0, vec![0.0, -2.0, -3.0, 0.0]);
        duals.arc.insert((v(1), v(2)), -1.5);

        // rc = vehicle + (v1) + (v2 + arc(1,2)) + (v3)
        let rc = duals.route_reduced_cost(&[v(0), v(1), v(2), v(3)]);
        assert!((rc - (1.0 - 2.0 - 3.0 - 1.5)).abs() < 1e-12);
    }
}
