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

//! Cairn-Model: problem data for the team-orienteering solver
//!
//! The model crate owns everything the solver layers agree on:
//!
//! - `instance`: the immutable problem instance — a directed weighted
//!   graph with per-vertex prizes, a source, a destination, a fleet size,
//!   and a length budget. Built through `InstanceBuilder`, which enforces
//!   the structural rules of the graph at construction time.
//! - `route`: a source-to-destination path with its cached score, length,
//!   reduced cost, and elementarity flag. Routes are value objects; their
//!   identity is the vertex sequence.
//! - `node`: a branch-and-bound node carrying restriction sets and, once
//!   solved, the LP/MIP outputs of its column-generation run.
//! - `loading`: the text instance loader, including Euclidean graph
//!   construction.
//! - `error`: the fatal error taxonomy shared by all solver layers.

pub mod error;
pub mod index;
pub mod instance;
pub mod loading;
pub mod node;
pub mod route;
