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

//! A route through the instance graph.
//!
//! Routes are the columns of the restricted master: a vertex sequence from
//! the source to the destination with its cached score (prizes of the
//! intermediate vertices), length (sum of arc weights), the reduced cost
//! under the duals it was priced with, and whether it is elementary.
//!
//! Routes are value objects. Equality and hashing depend only on the
//! vertex sequence: two routes with the same path are the same column no
//! matter which duals produced them.

use crate::error::SolverError;
use crate::index::VertexIndex;
use crate::instance::Instance;
use std::hash::{Hash, Hasher};

/// A source-to-destination path with cached evaluation data.
#[derive(Debug, Clone)]
pub struct Route {
    path: Vec<VertexIndex>,
    score: f64,
    length: f64,
    reduced_cost: f64,
    is_elementary: bool,
}

impl Route {
    /// Creates a route from precomputed fields.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the path has fewer than two vertices.
    #[inline]
    pub fn new(
        path: Vec<VertexIndex>,
        score: f64,
        length: f64,
        reduced_cost: f64,
        is_elementary: bool,
    ) -> Self {
        debug_assert!(
            path.len() >= 2,
            "called `Route::new` with a path of fewer than two vertices"
        );
        Self {
            path,
            score,
            length,
            reduced_cost,
            is_elementary,
        }
    }

    /// Creates a route from a bare vertex sequence, evaluating score,
    /// length, and elementarity against the given instance.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::MissingEdge` if a consecutive pair of the
    /// path is not an arc of the instance, or `SolverError::MissingVertex`
    /// if a vertex is out of bounds.
    pub fn from_path(
        path: Vec<VertexIndex>,
        instance: &Instance,
        reduced_cost: f64,
    ) -> Result<Self, SolverError> {
        debug_assert!(
            path.len() >= 2,
            "called `Route::from_path` with a path of fewer than two vertices"
        );

        for &vertex in &path {
            if !instance.has_vertex(vertex) {
                return Err(SolverError::MissingVertex(vertex));
            }
        }

        let mut length = 0.0;
        for pair in path.windows(2) {
            match instance.arc_weight(pair[0], pair[1]) {
                Some(weight) => length += weight,
                None => return Err(SolverError::MissingEdge(pair[0], pair[1])),
            }
        }

        let score = path[1..path.len() - 1]
            .iter()
            .map(|&v| instance.prize(v))
            .sum();

        let mut seen = vec![false; instance.num_vertices()];
        let mut is_elementary = true;
        for &vertex in &path[1..path.len() - 1] {
            if seen[vertex.get()] {
                is_elementary = false;
                break;
            }
            seen[vertex.get()] = true;
        }

        Ok(Self {
            path,
            score,
            length,
            reduced_cost,
            is_elementary,
        })
    }

    /// Returns the full vertex sequence, source first.
    #[inline]
    pub fn path(&self) -> &[VertexIndex] {
        &self.path
    }

    /// Returns the intermediate vertices (everything between source and
    /// destination).
    #[inline]
    pub fn intermediate(&self) -> &[VertexIndex] {
        &self.path[1..self.path.len() - 1]
    }

    /// Returns the total prize collected on this route.
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the total length of this route.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns the reduced cost this route was priced at.
    #[inline]
    pub fn reduced_cost(&self) -> f64 {
        self.reduced_cost
    }

    /// Returns `true` if no intermediate vertex repeats.
    #[inline]
    pub fn is_elementary(&self) -> bool {
        self.is_elementary
    }

    /// Returns `true` if the route visits the given vertex (terminals
    /// included).
    #[inline]
    pub fn visits(&self, vertex: VertexIndex) -> bool {
        self.path.contains(&vertex)
    }

    /// Returns an iterator over the consecutive arcs of the route.
    #[inline]
    pub fn arcs(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex)> + '_ {
        self.path.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Returns `true` if the route traverses the directed arc `from -> to`.
    #[inline]
    pub fn contains_arc(&self, from: VertexIndex, to: VertexIndex) -> bool {
        self.arcs().any(|(u, v)| u == from && v == to)
    }
}

impl PartialEq for Route {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Route {}

impl Hash for Route {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Route(")?;
        for (i, vertex) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", vertex.get())?;
        }
        write!(
            f,
            ", score: {}, length: {}, rc: {})",
            self.score, self.length, self.reduced_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceBuilder;
    use std::collections::HashSet;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn chain() -> Instance {
        let mut builder = InstanceBuilder::new(4, v(0), v(3), 1, 10.0);
        builder.set_prize(v(1), 4.0);
        builder.set_prize(v(2), 6.0);
        builder.add_arc(v(0), v(1), 1.0);
        builder.add_arc(v(1), v(2), 2.0);
        builder.add_arc(v(2), v(1), 2.0);
        builder.add_arc(v(2), v(3), 1.0);
        builder.build()
    }

    #[test]
    fn test_from_path_evaluates_fields() {
        let instance = chain();
        let route =
            Route::from_path(vec![v(0), v(1), v(2), v(3)], &instance, -1.5).unwrap();
        assert_eq!(route.score(), 10.0);
        assert_eq!(route.length(), 4.0);
        assert_eq!(route.reduced_cost(), -1.5);
        assert!(route.is_elementary());
        assert_eq!(route.intermediate(), &[v(1), v(2)]);
    }

    #[test]
    fn test_from_path_detects_repeats() {
        let instance = chain();
        let route = Route::from_path(
            vec![v(0), v(1), v(2), v(1), v(2), v(3)],
            &instance,
            0.0,
        )
        .unwrap();
        assert!(!route.is_elementary());
        assert_eq!(route.score(), 20.0, "score counts every visit");
    }

    #[test]
    fn test_from_path_rejects_missing_arc() {
        let instance = chain();
        let err = Route::from_path(vec![v(0), v(2), v(3)], &instance, 0.0).unwrap_err();
        assert_eq!(err, SolverError::MissingEdge(v(0), v(2)));
    }

    #[test]
    fn test_equality_and_hash_depend_on_path_only() {
        let a = Route::new(vec![v(0), v(1), v(3)], 4.0, 2.0, -1.0, true);
        let b = Route::new(vec![v(0), v(1), v(3)], 9.0, 7.0, 3.0, false);
        let c = Route::new(vec![v(0), v(2), v(3)], 4.0, 2.0, -1.0, true);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_arc_queries() {
        let route = Route::new(vec![v(0), v(1), v(2), v(3)], 0.0, 0.0, 0.0, true);
        assert!(route.contains_arc(v(1), v(2)));
        assert!(!route.contains_arc(v(2), v(1)));
        assert_eq!(route.arcs().count(), 3);
        assert!(route.visits(v(0)));
        assert!(!route.visits(v(9)));
    }
}
