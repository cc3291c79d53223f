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

//! # Tolerance-Aware Floating-Point Comparisons
//!
//! Objectives, duals, reduced costs, and path lengths in an LP-driven
//! solver are all `f64`, and every decision taken on them (prune or keep,
//! dominated or not, integral or fractional) must be taken up to a
//! tolerance. This module centralizes those comparisons so the same
//! epsilon semantics hold across the pricing engine, the master problem,
//! and the branch-and-bound protocol.
//!
//! Conventions:
//! - `approx_le(a, b, eps)` holds when `a` is smaller than or "equal
//!   within eps" to `b`.
//! - `strictly_lt(a, b, eps)` holds only when `a` undercuts `b` by more
//!   than eps. It is the strict companion used wherever a tie must not
//!   count (dominance, incumbent updates).
//! - `is_integral(x, eps)` holds when `x` is within eps of its nearest
//!   integer.

/// The default optimality and feasibility tolerance used across the
/// solver when no explicit epsilon is configured.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Returns `true` if `a <= b` up to the given tolerance.
#[inline(always)]
pub fn approx_le(a: f64, b: f64, eps: f64) -> bool {
    a <= b + eps
}

/// Returns `true` if `a >= b` up to the given tolerance.
#[inline(always)]
pub fn approx_ge(a: f64, b: f64, eps: f64) -> bool {
    a >= b - eps
}

/// Returns `true` if `a` and `b` are equal up to the given tolerance.
#[inline(always)]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Returns `true` if `a < b` by strictly more than the given tolerance.
#[inline(always)]
pub fn strictly_lt(a: f64, b: f64, eps: f64) -> bool {
    a < b - eps
}

/// Returns `true` if `a > b` by strictly more than the given tolerance.
#[inline(always)]
pub fn strictly_gt(a: f64, b: f64, eps: f64) -> bool {
    a > b + eps
}

/// Returns `true` if `x` lies within the given tolerance of its nearest
/// integer.
#[inline(always)]
pub fn is_integral(x: f64, eps: f64) -> bool {
    (x - x.round()).abs() <= eps
}

/// Returns `true` if `x` is fractional, i.e. further than the given
/// tolerance from every integer.
#[inline(always)]
pub fn is_fractional(x: f64, eps: f64) -> bool {
    !is_integral(x, eps)
}
