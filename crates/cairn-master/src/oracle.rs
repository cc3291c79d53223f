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

//! The oracle boundary of the master problem.
//!
//! `MasterOracle` is the single interface the column-generation driver
//! talks to. Any LP/MIP package can sit behind it; the bundled backend
//! lives in `lp`. Each branch-and-bound worker owns one oracle instance
//! for the lifetime of the solve; oracle handles are never shared across
//! workers.

use crate::model::SetCoverModel;
use cairn_model::error::SolverError;
use cairn_model::index::{ArcKey, VertexIndex};
use std::collections::BTreeMap;

/// The outputs of one master solve.
///
/// For an LP solve all fields are populated. For a MIP solve the dual
/// fields are zeroed; only `objective`, `primal`, and `aux_value` are
/// meaningful.
#[derive(Debug, Clone, Default)]
pub struct MasterSolution {
    pub objective: f64,
    /// Value of each column variable, aligned with the model's columns.
    pub primal: Vec<f64>,
    /// Value of the auxiliary slack. At or above tolerance the node's
    /// restrictions are unsatisfiable with the known columns.
    pub aux_value: f64,
    /// Dual of the fleet-size row.
    pub route_dual: f64,
    /// Dual of each vertex-cover row, indexed by vertex; zero for
    /// vertices without a row.
    pub vertex_duals: Vec<f64>,
    /// Duals of the must-visit vertex rows.
    pub must_visit_vertex_duals: BTreeMap<VertexIndex, f64>,
    /// Duals of the must-visit edge rows.
    pub must_visit_edge_duals: BTreeMap<ArcKey, f64>,
    /// Reduced cost of each column variable under the row duals,
    /// excluding the fleet dual. Used by the dual-bound computation.
    pub route_variable_duals: Vec<f64>,
}

impl MasterSolution {
    /// Returns `true` if the solve satisfied all must-visit rows without
    /// leaning on the auxiliary slack.
    #[inline]
    pub fn is_feasible(&self, eps: f64) -> bool {
        self.aux_value < eps
    }
}

impl std::fmt::Display for MasterSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MasterSolution(objective: {}, aux: {}, columns: {})",
            self.objective,
            self.aux_value,
            self.primal.len()
        )
    }
}

/// The LP/MIP oracle interface of the restricted master.
pub trait MasterOracle {
    /// Solves the given restricted master, as a linear relaxation or,
    /// when `as_mip` is set, with binary column variables.
    ///
    /// # Errors
    ///
    /// `SolverError::SetCoverInfeasible` when the backend reports an
    /// infeasible model (impossible with the auxiliary slack in place),
    /// `SolverError::Oracle` for backend failures.
    fn solve(&mut self, model: &SetCoverModel, as_mip: bool) -> Result<MasterSolution, SolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feasibility_threshold() {
        let solution = MasterSolution {
            aux_value: 1e-9,
            ..Default::default()
        };
        assert!(solution.is_feasible(1e-6));

        let infeasible = MasterSolution {
            aux_value: 0.5,
            ..Default::default()
        };
        assert!(!infeasible.is_feasible(1e-6));
    }
}
