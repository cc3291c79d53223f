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

use cairn_core::num::DEFAULT_EPSILON;
use cairn_pricing::params::PricingParams;
use std::time::Duration;

/// Immutable solver-wide configuration: shared by reference between the
/// facade, the workers, and the branching rule. Never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    /// Number of parallel node solvers (worker threads).
    pub num_solvers: usize,
    /// Wall-clock limit; on expiry the current incumbent is reported.
    pub time_limit: Option<Duration>,
    /// Optimality and integrality tolerance.
    pub epsilon: f64,
    /// Configuration of the pricing subproblem.
    pub pricing: PricingParams,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            num_solvers: 4,
            time_limit: None,
            epsilon: DEFAULT_EPSILON,
            pricing: PricingParams::default(),
        }
    }
}

impl SolverParams {
    /// Creates the default parameter set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count.
    #[inline]
    pub fn with_num_solvers(mut self, num_solvers: usize) -> Self {
        self.num_solvers = num_solvers;
        self
    }

    /// Sets the wall-clock limit.
    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the tolerance (also propagated to pricing).
    #[inline]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self.pricing.epsilon = epsilon;
        self
    }

    /// Replaces the pricing configuration.
    #[inline]
    pub fn with_pricing(mut self, pricing: PricingParams) -> Self {
        self.pricing = pricing;
        self
    }
}

impl std::fmt::Display for SolverParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolverParams(solvers: {}, time limit: {:?}, eps: {}, {})",
            self.num_solvers, self.time_limit, self.epsilon, self.pricing
        )
    }
}
