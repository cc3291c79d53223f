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

//! The LP-package-independent description of one restricted master.
//!
//! A `SetCoverModel` is built from the current column pool, a node's
//! restriction sets, and the instance. It lists, for each row of the
//! formulation, exactly which columns participate, so an oracle backend
//! only has to translate rows into its own constraint API:
//!
//! ```raw
//! max   sum_k score_k x_k  -  M * a
//! s.t.  sum_{k: v in r_k}      x_k      <= 1   (cover, v intermediate)
//!       sum_k                  x_k      <= m   (fleet size)
//!       sum_{k: v in r_k}      x_k + a  >= 1   (must-visit vertex)
//!       sum_{k: (u,v) in r_k}  x_k + a  >= 1   (must-visit edge)
//!       0 <= x_k <= 1,  a >= 0
//! ```
//!
//! The auxiliary slack `a` keeps every restricted master feasible; a
//! positive value in the optimum means the node's restrictions cannot be
//! satisfied with the known columns.

use cairn_model::index::{ArcKey, VertexIndex};
use cairn_model::instance::Instance;
use cairn_model::node::Restrictions;
use cairn_model::route::Route;

/// The penalty on the auxiliary slack. A tuning constant, not part of
/// the oracle contract; it only has to dwarf any attainable prize sum.
pub const AUX_PENALTY: f64 = 1e5;

/// One row of the master: the vertex or arc it covers plus the columns
/// participating in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<K> {
    pub key: K,
    pub columns: Vec<usize>,
}

/// The restricted master of one branch-and-bound node.
#[derive(Debug, Clone)]
pub struct SetCoverModel {
    num_vertices: usize,
    fleet_size: usize,
    scores: Vec<f64>,
    cover_rows: Vec<Row<VertexIndex>>,
    must_visit_vertex_rows: Vec<Row<VertexIndex>>,
    must_visit_edge_rows: Vec<Row<ArcKey>>,
}

impl SetCoverModel {
    /// Builds the restricted master for the given column pool and
    /// restrictions.
    pub fn new(routes: &[Route], restrictions: &Restrictions, instance: &Instance) -> Self {
        let num_vertices = instance.num_vertices();
        let scores = routes.iter().map(Route::score).collect();

        // Cover rows: every intermediate vertex that occurs in at least
        // one column. Vertices no column touches need no row; their dual
        // reads as zero.
        let mut cover_columns: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
        for (k, route) in routes.iter().enumerate() {
            let mut touched = vec![false; num_vertices];
            for &vertex in route.intermediate() {
                if !touched[vertex.get()] {
                    touched[vertex.get()] = true;
                    cover_columns[vertex.get()].push(k);
                }
            }
        }
        let cover_rows = cover_columns
            .into_iter()
            .enumerate()
            .filter(|(_, columns)| !columns.is_empty())
            .map(|(index, columns)| Row {
                key: VertexIndex::new(index),
                columns,
            })
            .collect();

        let must_visit_vertex_rows = restrictions
            .must_visit_vertices
            .iter()
            .map(|&vertex| Row {
                key: vertex,
                columns: routes
                    .iter()
                    .enumerate()
                    .filter(|(_, route)| route.visits(vertex))
                    .map(|(k, _)| k)
                    .collect(),
            })
            .collect();

        let must_visit_edge_rows = restrictions
            .must_visit_edges
            .iter()
            .map(|&arc| Row {
                key: arc,
                columns: routes
                    .iter()
                    .enumerate()
                    .filter(|(_, route)| route.contains_arc(arc.0, arc.1))
                    .map(|(k, _)| k)
                    .collect(),
            })
            .collect();

        Self {
            num_vertices,
            fleet_size: instance.fleet_size(),
            scores,
            cover_rows,
            must_visit_vertex_rows,
            must_visit_edge_rows,
        }
    }

    /// Returns the number of columns (routes).
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.scores.len()
    }

    /// Returns the number of vertices of the underlying instance.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Returns the fleet size bound of the fleet row.
    #[inline]
    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    /// Returns the objective coefficient (score) of each column.
    #[inline]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Returns the vertex-cover rows.
    #[inline]
    pub fn cover_rows(&self) -> &[Row<VertexIndex>] {
        &self.cover_rows
    }

    /// Returns the must-visit vertex rows.
    #[inline]
    pub fn must_visit_vertex_rows(&self) -> &[Row<VertexIndex>] {
        &self.must_visit_vertex_rows
    }

    /// Returns the must-visit edge rows.
    #[inline]
    pub fn must_visit_edge_rows(&self) -> &[Row<ArcKey>] {
        &self.must_visit_edge_rows
    }

    /// Returns `true` if the model has no rows and no columns at all, in
    /// which case an oracle can short-circuit to the trivial solution.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.num_columns() == 0
            && self.must_visit_vertex_rows.is_empty()
            && self.must_visit_edge_rows.is_empty()
    }
}

impl std::fmt::Display for SetCoverModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SetCoverModel(columns: {}, cover rows: {}, must-visit rows: {}v/{}e, fleet: {})",
            self.num_columns(),
            self.cover_rows.len(),
            self.must_visit_vertex_rows.len(),
            self.must_visit_edge_rows.len(),
            self.fleet_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_model::instance::InstanceBuilder;

    fn v(i: usize) -> VertexIndex {
        VertexIndex::new(i)
    }

    fn diamond() -> Instance {
        let mut builder = InstanceBuilder::new(4, v(0), v(3), 2, 10.0);
        builder.set_prize(v(1), 5.0);
        builder.set_prize(v(2), 3.0);
        builder.add_arc(v(0), v(1), 1.0);
        builder.add_arc(v(0), v(2), 1.0);
        builder.add_arc(v(1), v(3), 1.0);
        builder.add_arc(v(2), v(3), 1.0);
        builder.add_arc(v(1), v(2), 1.0);
        builder.build()
    }

    fn routes(instance: &Instance) -> Vec<Route> {
        vec![
            Route::from_path(vec![v(0), v(1), v(3)], instance, 0.0).unwrap(),
            Route::from_path(vec![v(0), v(2), v(3)], instance, 0.0).unwrap(),
            Route::from_path(vec![v(0), v(1), v(2), v(3)], instance, 0.0).unwrap(),
        ]
    }

    #[test]
    fn test_cover_rows_list_participating_columns() {
        let instance = diamond();
        let model = SetCoverModel::new(&routes(&instance), &Restrictions::default(), &instance);

        assert_eq!(model.num_columns(), 3);
        assert_eq!(model.scores(), &[5.0, 3.0, 8.0]);
        assert_eq!(model.cover_rows().len(), 2);

        let row1 = model
            .cover_rows()
            .iter()
            .find(|row| row.key == v(1))
            .unwrap();
        assert_eq!(row1.columns, vec![0, 2]);
        let row2 = model
            .cover_rows()
            .iter()
            .find(|row| row.key == v(2))
            .unwrap();
        assert_eq!(row2.columns, vec![1, 2]);
    }

    #[test]
    fn test_must_visit_rows_follow_restrictions() {
        let instance = diamond();
        let restrictions = Restrictions::default()
            .require_vertex(v(2))
            .require_edge((v(1), v(2)));
        let model = SetCoverModel::new(&routes(&instance), &restrictions, &instance);

        assert_eq!(model.must_visit_vertex_rows().len(), 1);
        assert_eq!(model.must_visit_vertex_rows()[0].key, v(2));
        assert_eq!(model.must_visit_vertex_rows()[0].columns, vec![1, 2]);

        assert_eq!(model.must_visit_edge_rows().len(), 1);
        assert_eq!(model.must_visit_edge_rows()[0].key, (v(1), v(2)));
        assert_eq!(model.must_visit_edge_rows()[0].columns, vec![2]);
    }

    #[test]
    fn test_empty_pool_with_restriction_keeps_row() {
        let instance = diamond();
        let restrictions = Restrictions::default().require_vertex(v(1));
        let model = SetCoverModel::new(&[], &restrictions, &instance);
        assert_eq!(model.num_columns(), 0);
        assert_eq!(model.must_visit_vertex_rows().len(), 1);
        assert!(model.must_visit_vertex_rows()[0].columns.is_empty());
        assert!(!model.is_trivial());
    }

    #[test]
    fn test_trivial_model() {
        let instance = diamond();
        let model = SetCoverModel::new(&[], &Restrictions::default(), &instance);
        assert!(model.is_trivial());
    }
}
