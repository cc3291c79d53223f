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

//! Cairn-BnB: a generic parallel best-bound branch-and-bound engine
//!
//! The engine knows nothing about routes, LPs, or orienteering. It works
//! on anything implementing the `SearchNode` trait, with node solving and
//! branching supplied as plugin traits, and maximizes the node objective.
//!
//! Architecture
//! - A pool of worker threads consumes unsolved nodes from a shared
//!   channel, runs the `NodeSolver` on each (one solver instance per
//!   worker, created by a factory), and sends solved nodes back.
//! - A single-threaded processor — running on the calling thread — owns
//!   the open-node priority queue, the incumbent, and all counters.
//!   Every decision (prune, accept, branch, dispatch) is serialized
//!   through it, so no shared mutable state exists anywhere.
//! - Closing the unsolved channel is the shutdown signal: workers drain
//!   and exit, the thread scope joins them.
//!
//! Module map
//! - `node`: the `SearchNode`, `NodeSolver`, and `Brancher` traits.
//! - `queue`: the best-bound open queue.
//! - `engine`: the processor/worker machinery.
//! - `stats`: run counters.
//! - `result`: the final outcome with termination reason.

pub mod engine;
pub mod node;
pub mod queue;
pub mod result;
pub mod stats;
