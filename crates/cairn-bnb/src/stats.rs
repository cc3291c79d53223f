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

/// Counters of one branch-and-bound run, maintained exclusively by the
/// processor.
#[derive(Debug, Clone, PartialEq)]
pub struct BnbStatistics {
    /// Nodes created, root included.
    pub num_created: u64,
    /// Solved nodes whose relaxation was feasible and not pruned by
    /// bound.
    pub num_feasible: u64,
    /// Highest number of simultaneously in-flight node solves.
    pub max_parallel_solves: usize,
    /// Wall-clock time of the run.
    pub solve_duration: std::time::Duration,
}

impl Default for BnbStatistics {
    fn default() -> Self {
        Self {
            num_created: 1,
            num_feasible: 0,
            max_parallel_solves: 0,
            solve_duration: std::time::Duration::ZERO,
        }
    }
}

impl BnbStatistics {
    /// Creates statistics for a fresh run: the root counts as created.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for BnbStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbStatistics(created: {}, feasible: {}, max_parallel: {}, time: {:.3}s)",
            self.num_created,
            self.num_feasible,
            self.max_parallel_solves,
            self.solve_duration.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::BnbStatistics;

    #[test]
    fn test_fresh_statistics_count_the_root() {
        let stats = BnbStatistics::new();
        assert_eq!(stats.num_created, 1);
        assert_eq!(stats.num_feasible, 0);
        assert_eq!(stats.max_parallel_solves, 0);
    }

    #[test]
    fn test_display() {
        let stats = BnbStatistics::new();
        let text = format!("{}", stats);
        assert!(text.contains("created: 1"));
    }
}
