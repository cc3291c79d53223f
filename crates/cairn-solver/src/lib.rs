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

//! Cairn-Solver: branch-and-price for the team orienteering problem
//!
//! This crate ties the generic branch-and-bound engine, the set-cover
//! master, and the pricing engine together into a complete solver:
//!
//! - `colgen`: the column-generation driver that turns an unsolved
//!   branch-and-bound node into a solved one (the per-worker node
//!   solver).
//! - `branching`: the vertex/arc branching rule.
//! - `enumerate`: the exhaustive baseline — enumerate every elementary
//!   route within budget and solve the set-cover integer master once.
//! - `params`: solver-wide configuration.
//! - `solver`: the `BranchAndPrice` facade.

pub mod branching;
pub mod colgen;
pub mod enumerate;
pub mod params;
pub mod solver;
