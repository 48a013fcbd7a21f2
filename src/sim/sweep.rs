//! Two-phase removal for entity collections
//!
//! Collision and lifecycle passes only mark indices while they iterate; the
//! marked entities are removed in one sweep once iteration is over.

/// Indices marked for removal from a single collection
#[derive(Debug, Clone, Default)]
pub struct Doomed {
    indices: Vec<usize>,
}

impl Doomed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an index; marking twice is harmless
    pub fn mark(&mut self, index: usize) {
        if !self.indices.contains(&index) {
            self.indices.push(index);
        }
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Remove every marked element, preserving the order of survivors.
    ///
    /// Out-of-range marks are ignored. Returns the number removed and leaves
    /// the mark list empty.
    pub fn sweep<T>(&mut self, items: &mut Vec<T>) -> usize {
        if self.indices.is_empty() {
            return 0;
        }
        self.indices.sort_unstable();
        let mut removed = 0;
        for &idx in self.indices.iter().rev() {
            if idx < items.len() {
                items.remove(idx);
                removed += 1;
            }
        }
        self.indices.clear();
        removed
    }
}
