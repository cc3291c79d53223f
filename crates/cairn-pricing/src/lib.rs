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

//! Cairn-Pricing: the elementary shortest path pricing engine
//!
//! This crate solves the pricing subproblem of the branch-and-price
//! decomposition: an Elementary Shortest Path Problem with Resource
//! Constraints (ESPPRC), where the single resource is the route length
//! budget and arc/vertex costs come from the duals of the restricted
//! master.
//!
//! The solver is a bidirectional labeling algorithm wrapped in a
//! decremental state-space relaxation (DSSR) loop:
//!
//! - Labels grow forward from the source and backward from the
//!   destination, interleaved, ordered by cost per unit length.
//! - A halfway rule makes each complete path join exactly once, at a
//!   canonical split near its midpoint.
//! - Elementarity is enforced only on "critical" vertices. DSSR starts
//!   with none and promotes every vertex the current best pricing path
//!   visits more than once, iterating until that path is elementary.
//!
//! Module map
//! - `params`: immutable pricing configuration.
//! - `duals`: the dual values handed over by the master.
//! - `graph`: the reduced graph a node prices against (forbidden
//!   vertices/edges removed).
//! - `label`: the pricing label (partial path state) and dominance.
//! - `arena`: flat label storage; parent links are arena indices.
//! - `engine`: the labeling core and the DSSR driver.

pub mod arena;
pub mod duals;
pub mod engine;
pub mod graph;
pub mod label;
pub mod params;
