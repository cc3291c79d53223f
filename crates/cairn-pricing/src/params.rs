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

/// The labeling direction strategy of the pricing engine.
///
/// Bidirectional labeling with the halfway join rule is the default.
/// `ForwardOnly` is a valid reduction: labels then grow from the source up
/// to the full budget and complete routes are harvested at the
/// destination, without the halfway symmetry breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Bidirectional,
    ForwardOnly,
}

impl std::fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchDirection::Bidirectional => write!(f, "Bidirectional"),
            SearchDirection::ForwardOnly => write!(f, "ForwardOnly"),
        }
    }
}

/// Immutable configuration of a pricing call.
///
/// A `PricingParams` value is created once and shared by reference; the
/// engine never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingParams {
    /// Optimality/feasibility tolerance. Only routes with reduced cost
    /// below `-epsilon` are returned.
    pub epsilon: f64,
    /// Hard cap on the number of routes returned per call. Zero disables
    /// pricing entirely.
    pub max_columns_added: usize,
    /// Once this many elementary routes have been collected, the DSSR
    /// loop stops even if the best pricing path is still cyclic.
    pub max_paths_after_search: usize,
    /// Enables dominance checks between labels at the same vertex.
    pub use_domination: bool,
    /// Additionally removes stored labels dominated by a newly inserted
    /// one.
    pub two_way_domination: bool,
    /// Labeling direction strategy.
    pub direction: SearchDirection,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_columns_added: 10,
            max_paths_after_search: 100,
            use_domination: true,
            two_way_domination: true,
            direction: SearchDirection::Bidirectional,
        }
    }
}

impl PricingParams {
    /// Creates the default parameter set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the optimality tolerance.
    #[inline]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the cap on returned columns.
    #[inline]
    pub fn with_max_columns_added(mut self, max_columns_added: usize) -> Self {
        self.max_columns_added = max_columns_added;
        self
    }

    /// Sets the search cutoff on collected elementary routes.
    #[inline]
    pub fn with_max_paths_after_search(mut self, max_paths_after_search: usize) -> Self {
        self.max_paths_after_search = max_paths_after_search;
        self
    }

    /// Enables or disables dominance.
    #[inline]
    pub fn with_domination(mut self, use_domination: bool) -> Self {
        self.use_domination = use_domination;
        self
    }

    /// Enables or disables symmetric dominance removal.
    #[inline]
    pub fn with_two_way_domination(mut self, two_way_domination: bool) -> Self {
        self.two_way_domination = two_way_domination;
        self
    }

    /// Selects the labeling direction strategy.
    #[inline]
    pub fn with_direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }
}

impl std::fmt::Display for PricingParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PricingParams(eps: {}, max_columns: {}, max_paths: {}, domination: {}/{}, direction: {})",
            self.epsilon,
            self.max_columns_added,
            self.max_paths_after_search,
            self.use_domination,
            self.two_way_domination,
            self.direction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bidirectional_with_domination() {
        let params = PricingParams::default();
        assert_eq!(params.direction, SearchDirection::Bidirectional);
        assert!(params.use_domination);
        assert!(params.two_way_domination);
        assert!(params.epsilon > 0.0);
    }

    #[test]
    fn test_builder_style_setters() {
        let params = PricingParams::new()
            .with_epsilon(1e-9)
            .with_max_columns_added(3)
            .with_max_paths_after_search(7)
            .with_domination(false)
            .with_two_way_domination(false)
            .with_direction(SearchDirection::ForwardOnly);
        assert_eq!(params.epsilon, 1e-9);
        assert_eq!(params.max_columns_added, 3);
        assert_eq!(params.max_paths_after_search, 7);
        assert!(!params.use_domination);
        assert!(!params.two_way_domination);
        assert_eq!(params.direction, SearchDirection::ForwardOnly);
    }
}
