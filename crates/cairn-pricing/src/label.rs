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

//! Pricing labels: partial path states of the ESPPRC search.
//!
//! A `Label` represents a partial path grown forward from the source or
//! backward from the destination. It carries the accumulated reduced
//! cost, score, and length, a parent link into the label arena, the
//! predecessor vertex, and three bit-sets over the vertex set:
//!
//! - `visited_critical`: critical vertices on the path. Extending onto
//!   one of these is forbidden, which is how DSSR enforces elementarity
//!   selectively.
//! - `visited_general`: every vertex on the path. Used to detect cycles
//!   and to certify elementarity at join time.
//! - `unreachable_critical`: critical vertices whose direct continuation
//!   arc no longer fits in the budget. Folding these into the dominance
//!   comparison keeps dominance exact under DSSR.
//!
//! Invariants:
//! 1. `length >= 0`.
//! 2. `visited_critical` is a subset of `visited_general`.
//! 3. If `has_cycle` is false, `visited_general` has exactly as many set
//!    bits as the represented path has vertices.
//! 4. Terminal labels carry only the terminal vertex bit in all three
//!    bit-sets.
//!
//! Labels are ordered by `cost / length` ("bang for buck"), with zero
//! length mapped to a ratio of zero.

use cairn_core::index::{TypedIndex, TypedIndexTag};
use cairn_core::num::strictly_lt;
use cairn_model::index::VertexIndex;
use fixedbitset::FixedBitSet;

/// A tag type for label arena indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct LabelIndexTag;

impl TypedIndexTag for LabelIndexTag {
    const NAME: &'static str = "LabelId";
}

/// A typed index into the label arena.
pub type LabelId = TypedIndex<LabelIndexTag>;

/// The growth direction of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "Forward"),
            Direction::Backward => write!(f, "Backward"),
        }
    }
}

/// A partial path state of the pricing search.
#[derive(Debug, Clone)]
pub struct Label {
    pub direction: Direction,
    pub vertex: VertexIndex,
    /// Accumulated reduced-cost contribution of the partial path.
    pub cost: f64,
    /// Accumulated prize of the partial path.
    pub score: f64,
    /// Accumulated length of the partial path.
    pub length: f64,
    /// Arena index of the label this one was extended from.
    pub parent: Option<LabelId>,
    /// The vertex this label was extended from; used to forbid immediate
    /// two-cycles.
    pub predecessor: Option<VertexIndex>,
    pub visited_critical: FixedBitSet,
    pub visited_general: FixedBitSet,
    pub unreachable_critical: FixedBitSet,
    /// Set when the path revisits a non-critical vertex.
    pub has_cycle: bool,
    /// Tombstone set by symmetric dominance removal; dead labels stay in
    /// the arena but are skipped everywhere.
    pub dead: bool,
}

impl Label {
    /// Creates the terminal label of a direction: an empty path sitting on
    /// the source (forward) or destination (backward).
    pub fn terminal(direction: Direction, vertex: VertexIndex, num_vertices: usize) -> Self {
        debug_assert!(
            vertex.get() < num_vertices,
            "called `Label::terminal` with vertex index out of bounds: the len is {} but the index is {}",
            num_vertices,
            vertex.get()
        );

        let mut bits = FixedBitSet::with_capacity(num_vertices);
        bits.insert(vertex.get());

        Self {
            direction,
            vertex,
            cost: 0.0,
            score: 0.0,
            length: 0.0,
            parent: None,
            predecessor: None,
            visited_critical: bits.clone(),
            visited_general: bits.clone(),
            unreachable_critical: bits,
            has_cycle: false,
            dead: false,
        }
    }

    /// Returns the heap ordering criterion: cost per unit length, with
    /// zero length mapped to zero.
    #[inline]
    pub fn ratio(&self) -> f64 {
        if self.length == 0.0 {
            0.0
        } else {
            self.cost / self.length
        }
    }

    /// Returns `true` if the given vertex is blocked for this label:
    /// either already visited as critical or marked unreachable-critical.
    #[inline]
    pub fn uses_critical(&self, vertex: VertexIndex) -> bool {
        self.visited_critical.contains(vertex.get())
            || self.unreachable_critical.contains(vertex.get())
    }

    /// Returns `true` if both labels visited a common critical vertex.
    #[inline]
    pub fn has_common_critical_visits(&self, other: &Label) -> bool {
        !self.visited_critical.is_disjoint(&other.visited_critical)
    }

    /// Returns `true` if both labels visited a common vertex at all.
    #[inline]
    pub fn has_common_general_visits(&self, other: &Label) -> bool {
        !self.visited_general.is_disjoint(&other.visited_general)
    }

    /// Returns the number of visited critical vertices.
    #[inline]
    pub fn num_visited_critical(&self) -> usize {
        self.visited_critical.count_ones(..)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Label({} at {}, cost: {}, length: {}, cycle: {})",
            self.direction,
            self.vertex.get(),
            self.cost,
            self.length,
            self.has_cycle
        )
    }
}

/// Decides whether `a` dominates `b`.
///
/// Both labels must sit on the same vertex with the same direction; the
/// caller guarantees this. `a` dominates `b` when
///
/// - `a.cost <= b.cost` and `a.length <= b.length` (each up to epsilon),
/// - at least one of the two is strictly better (beyond epsilon),
/// - the union of `a`'s visited-critical and unreachable-critical sets is
///   a subset of `b`'s union — `a` must not be more constrained than `b`,
/// - and, when `use_visit_condition` is set, `a.visited_critical` alone
///   is a subset of `b.visited_critical` (the stricter form the DSSR
///   retry switches to).
///
/// On the subset of labels at one vertex and direction this relation is
/// irreflexive, antisymmetric, and transitive for comparisons separated
/// by more than epsilon.
pub fn dominates(a: &Label, b: &Label, use_visit_condition: bool, eps: f64) -> bool {
    debug_assert_eq!(
        a.vertex, b.vertex,
        "called `dominates` with labels on different vertices"
    );
    debug_assert_eq!(
        a.direction, b.direction,
        "called `dominates` with labels of different directions"
    );

    if a.cost > b.cost + eps || a.length > b.length + eps {
        return false;
    }
    if !strictly_lt(a.cost, b.cost, eps) && !strictly_lt(a.length, b.length, eps) {
        return false;
    }

    // Union subset test without allocating: every constrained bit of `a`
    // must be constrained in `b` too.
    let blocked_in_b =
        |i: usize| b.visited_critical.contains(i) || b.unreachable_critical.contains(i);
    if !a.visited_critical.ones().all(&blocked_in_b) {
        return false;
    }
    if !a.unreachable_critical.ones().all(&blocked_in_b) {
        return false;
    }

    if use_visit_condition && !a.visited_critical.is_subset(&b.visited_critical) {
        return false;
    }

    true
}
