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

//! Fatal error taxonomy of the solver.
//!
//! Per-node LP infeasibility is deliberately NOT represented here: an
//! infeasible node is a prune signal carried on the node itself, not an
//! error. The variants below are conditions the solver cannot recover
//! from at the scope where they occur.

use crate::index::VertexIndex;
use thiserror::Error;

/// Errors that abort a solve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The LP oracle reported infeasibility on a master model that carries
    /// the auxiliary slack variable. With the slack in place every
    /// restricted master admits a feasible point, so this indicates a
    /// broken model or oracle.
    #[error("set-cover master reported infeasible despite the auxiliary slack")]
    SetCoverInfeasible,

    /// The decremental state-space relaxation closed with an optimal route
    /// that still revisits a critical vertex.
    #[error("optimal pricing route revisits critical vertex {0}")]
    CyclesWithCriticalVertex(VertexIndex),

    /// Arc branching was requested on a node where no arc has fractional
    /// flow.
    #[error("arc branching requested but no arc flow is fractional")]
    BranchOnNullArc,

    /// A restriction references a vertex that is not part of the original
    /// instance graph.
    #[error("restriction references {0}, which is not in the instance graph")]
    MissingVertex(VertexIndex),

    /// A restriction references an arc that is not part of the original
    /// instance graph.
    #[error("restriction references arc {0} -> {1}, which is not in the instance graph")]
    MissingEdge(VertexIndex, VertexIndex),

    /// Branching was invoked on a node that was never solved and thus has
    /// no vertex reduced costs.
    #[error("branching invoked on an unsolved node without vertex reduced costs")]
    NullVertexReducedCosts,

    /// The LP oracle failed for a reason outside the solver's control.
    #[error("LP oracle failure: {0}")]
    Oracle(String),
}
