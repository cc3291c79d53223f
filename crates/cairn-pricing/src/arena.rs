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

//! Flat storage for pricing labels.
//!
//! Every label created during one labeling iteration lives in this arena
//! and is addressed by `LabelId`. Parent links are arena indices, so the
//! parent chains form a tree inside a single allocation instead of a web
//! of owned pointers, and dropping an iteration's labels is one `clear`.

use crate::label::{Direction, Label, LabelId};
use cairn_model::index::VertexIndex;

/// An append-only arena of labels for one labeling iteration.
#[derive(Debug, Default)]
pub struct LabelArena {
    labels: Vec<Label>,
}

impl LabelArena {
    /// Creates an empty arena.
    #[inline]
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Returns the number of labels stored (dead labels included).
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the arena holds no labels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Removes all labels. Capacity is retained across iterations.
    #[inline]
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Stores a label and returns its id.
    #[inline]
    pub fn push(&mut self, label: Label) -> LabelId {
        let id = LabelId::new(self.labels.len());
        self.labels.push(label);
        id
    }

    /// Returns the label with the given id.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the id is out of bounds.
    #[inline]
    pub fn get(&self, id: LabelId) -> &Label {
        debug_assert!(
            id.get() < self.labels.len(),
            "called `LabelArena::get` with label id out of bounds: the len is {} but the index is {}",
            self.labels.len(),
            id.get()
        );
        &self.labels[id.get()]
    }

    /// Returns the label with the given id mutably.
    ///
    /// # Panics
    ///
    /// In debug mode, panics if the id is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, id: LabelId) -> &mut Label {
        debug_assert!(
            id.get() < self.labels.len(),
            "called `LabelArena::get_mut` with label id out of bounds: the len is {} but the index is {}",
            self.labels.len(),
            id.get()
        );
        &mut self.labels[id.get()]
    }

    /// Reconstructs the vertex sequence represented by a label, in path
    /// order.
    ///
    /// For a forward label the parent chain runs from the label back to
    /// the source, so the collected vertices are reversed. For a backward
    /// label the chain runs from the label's vertex towards the
    /// destination, which already is path order.
    pub fn path_of(&self, id: LabelId) -> Vec<VertexIndex> {
        let mut vertices = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let label = self.get(current);
            vertices.push(label.vertex);
            cursor = label.parent;
        }
        if self.get(id).direction == Direction::Forward {
            vertices.reverse();
        }
        vertices
    }
}
