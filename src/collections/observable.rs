//! # Change-logging ordered container.
//!
//! ## Rules
//! - Every mutating operation appends one [`Change`] to a pending log.
//! - The owner drains the log with [`ObservableVec::drain_changes`] and
//!   reacts; reactions happen strictly in mutation order.
//! - `clear` and `replace_all` record a single [`Change::Reset`]: the
//!   reaction treats whatever the container holds *now* as freshly added
//!   (it does not enumerate what was evicted).

/// A recorded container mutation, carrying the affected items.
#[derive(Debug, Clone)]
pub enum Change<T> {
    /// Items were appended or inserted.
    Add { items: Vec<T> },
    /// Items were removed individually.
    Remove { items: Vec<T> },
    /// An item was replaced in place; `new` before `old` is the reaction
    /// order.
    Replace { new: Vec<T>, old: Vec<T> },
    /// Bulk change; consumers should re-scan the current contents.
    Reset,
}

/// Ordered, mutation-logging container.
#[derive(Debug)]
pub struct ObservableVec<T> {
    items: Vec<T>,
    pending: Vec<Change<T>>,
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObservableVec<T> {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Index of the first item matching `pred`.
    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(pred)
    }

    /// Takes the pending change log, leaving it empty.
    pub fn drain_changes(&mut self) -> Vec<Change<T>> {
        std::mem::take(&mut self.pending)
    }

    /// True if mutations have been recorded since the last drain.
    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl<T: Clone> ObservableVec<T> {
    /// Appends an item, recording [`Change::Add`].
    pub fn push(&mut self, item: T) {
        self.items.push(item.clone());
        self.pending.push(Change::Add { items: vec![item] });
    }

    /// Inserts an item at `index`, recording [`Change::Add`].
    ///
    /// # Panics
    /// Panics if `index > len`, as `Vec::insert` does.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item.clone());
        self.pending.push(Change::Add { items: vec![item] });
    }

    /// Removes and returns the item at `index`, recording
    /// [`Change::Remove`].
    ///
    /// # Panics
    /// Panics if `index >= len`, as `Vec::remove` does.
    pub fn remove(&mut self, index: usize) -> T {
        let removed = self.items.remove(index);
        self.pending.push(Change::Remove {
            items: vec![removed.clone()],
        });
        removed
    }

    /// Removes the first item matching `pred`, recording
    /// [`Change::Remove`]. Returns `None` (and records nothing) when no
    /// item matches.
    pub fn remove_item(&mut self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.position(pred)?;
        Some(self.remove(index))
    }

    /// Replaces the item at `index`, returning the old one and recording
    /// [`Change::Replace`].
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, item: T) -> T {
        let old = std::mem::replace(&mut self.items[index], item.clone());
        self.pending.push(Change::Replace {
            new: vec![item],
            old: vec![old.clone()],
        });
        old
    }

    /// Empties the container, recording a single [`Change::Reset`].
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending.push(Change::Reset);
    }

    /// Replaces the entire contents, recording a single [`Change::Reset`].
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.pending.push(Change::Reset);
    }
}
