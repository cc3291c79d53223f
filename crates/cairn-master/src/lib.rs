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

//! Cairn-Master: the set-cover restricted master problem
//!
//! The master side of the column-generation decomposition. Given the
//! routes known so far and a node's restriction sets, the restricted
//! master maximizes collected prize subject to
//!
//! - each intermediate vertex being covered at most once,
//! - at most `m` routes being selected,
//! - every must-visit vertex and must-visit edge being covered, softened
//!   by an auxiliary slack priced at a large penalty.
//!
//! Module map
//! - `model`: the LP-package-independent row/column description.
//! - `oracle`: the `MasterOracle` trait and the solution/dual bundle the
//!   rest of the solver consumes.
//! - `lp`: the bundled `minilp`-backed oracle.

pub mod lp;
pub mod model;
pub mod oracle;
