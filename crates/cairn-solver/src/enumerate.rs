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

//! The exhaustive baseline algorithm.
//!
//! Enumerate every elementary source-to-destination route within the
//! budget by depth-first search, then solve the set-cover integer master
//! once over the full column set. Exact, and exponential in the number
//! of reachable vertices; meant for small instances and as an
//! independent reference for the branch-and-price path.

use cairn_master::model::SetCoverModel;
use cairn_master::oracle::MasterOracle;
use cairn_model::error::SolverError;
use cairn_model::index::VertexIndex;
use cairn_model::instance::Instance;
use cairn_model::node::Restrictions;
use cairn_model::route::Route;
use tracing::debug;

/// Enumerates every elementary route from source to destination whose
/// length stays within the budget.
pub fn enumerate_routes(instance: &Instance) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut visited = vec![false; instance.num_vertices()];
    let mut path = vec![instance.source()];
    visited[instance.source().get()] = true;

    descend(instance, &mut path, &mut visited, 0.0, 0.0, &mut routes);
    debug!(routes = routes.len(), "route enumeration finished");
    routes
}

fn descend(
    instance: &Instance,
    path: &mut Vec<VertexIndex>,
    visited: &mut [bool],
    length: f64,
    score: f64,
    routes: &mut Vec<Route>,
) {
    let current = *path.last().expect("path always starts at the source");
    for neighbor in instance.outgoing(current) {
        let next_length = length + neighbor.weight;
        if next_length > instance.budget() {
            continue;
        }
        if neighbor.vertex == instance.destination() {
            let mut complete = path.clone();
            complete.push(neighbor.vertex);
            routes.push(Route::new(complete, score, next_length, 0.0, true));
            continue;
        }
        if visited[neighbor.vertex.get()] {
            continue;
        }

        visited[neighbor.vertex.get()] = true;
        path.push(neighbor.vertex);
        descend(
            instance,
            path,
            visited,
            next_length,
            score + instance.prize(neighbor.vertex),
            routes,
        );
        path.pop();
        visited[neighbor.vertex.get()] = false;
    }
}

/// Solves the instance exactly by full enumeration plus one integer
/// master solve. Returns the objective and the selected routes.
///
/// # Errors
///
/// Propagates oracle failures.
pub fn solve_by_enumeration<O: MasterOracle>(
    instance: &Instance,
    oracle: &mut O,
) -> Result<(f64, Vec<Route>), SolverError> {
    let routes = enumerate_routes(instance);
    if routes.is_empty() {
        return Ok((0.0, Vec::new()));
    }

    let model = SetCoverModel::new(&routes, &Restrictions::default(), instance);
    let mip = oracle.solve(&model, true)?;
    let chosen = routes
        .iter()
        .zip(&mip.primal)
        .filter(|&(_, &weight)| weight > 0.5)
        .map(|(route, _)| route.clone())
        .collect();
    Ok((mip.objective, chosen))
}
