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

use crate::stats::BnbStatistics;

/// Why the engine stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The open queue drained with no solve in flight: the incumbent is
    /// optimal (or the problem has no feasible integral node).
    Exhausted,
    /// The wall-clock limit expired; the incumbent may be suboptimal.
    TimeLimit,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::Exhausted => write!(f, "Exhausted"),
            TerminationReason::TimeLimit => write!(f, "Time Limit"),
        }
    }
}

/// The final outcome of a branch-and-bound run.
#[derive(Debug, Clone)]
pub struct BnbOutcome<N> {
    /// Best integral feasible node found, if any.
    pub incumbent: Option<N>,
    /// The incumbent's objective, or zero when none was found.
    pub objective: f64,
    pub reason: TerminationReason,
    pub statistics: BnbStatistics,
}

impl<N> BnbOutcome<N> {
    /// Returns `true` if the run proved its incumbent optimal.
    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.reason == TerminationReason::Exhausted && self.incumbent.is_some()
    }
}

impl<N> std::fmt::Display for BnbOutcome<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbOutcome(objective: {}, reason: {}, {})",
            self.objective, self.reason, self.statistics
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimality_requires_exhaustion_and_incumbent() {
        let exhausted: BnbOutcome<u32> = BnbOutcome {
            incumbent: Some(1),
            objective: 5.0,
            reason: TerminationReason::Exhausted,
            statistics: BnbStatistics::new(),
        };
        assert!(exhausted.is_optimal());

        let timed_out: BnbOutcome<u32> = BnbOutcome {
            incumbent: Some(1),
            objective: 5.0,
            reason: TerminationReason::TimeLimit,
            statistics: BnbStatistics::new(),
        };
        assert!(!timed_out.is_optimal());

        let empty: BnbOutcome<u32> = BnbOutcome {
            incumbent: None,
            objective: 0.0,
            reason: TerminationReason::Exhausted,
            statistics: BnbStatistics::new(),
        };
        assert!(!empty.is_optimal());
    }
}
