//! # All-active conductor: every owned item is active with its parent.
//!
//! [`AllActive`] wraps an [`ObservableVec`] of [`ScreenRef`]s and reacts
//! to its change log. Every mutation path — conductor methods and direct
//! manipulation through [`AllActive::items_mut`] — funnels through the
//! same reaction, so bulk replaces, sorts and clears performed by a
//! consumer keep every item's parent pointer and activation state in
//! sync with no second bookkeeping path.
//!
//! ## Rules
//! - Adding an already-present item never duplicates it (pointer
//!   identity).
//! - Within a `Replace` reaction, new items are parented and activated
//!   **before** old items are torn down, so there is no window where
//!   neither side is properly owned.
//! - `close_item` is the only negotiated path: a veto leaves the item
//!   owned, parented and in its prior state. Removal and conductor close
//!   are unconditional teardown.
//! - The container lock is released before any item hook runs.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;

use crate::collections::{Change, ObservableVec};
use crate::error::LifecycleError;
use crate::screen::{
    can_close_screen, close_and_clean_up, try_activate, try_deactivate, Activate, Close,
    ConductorId, Deactivate, GuardClose, Lifecycle, ParentAware, Screen, ScreenRef,
};

/// Conductor owning an ordered collection of simultaneously-active items.
pub struct AllActive {
    id: ConductorId,
    life: Lifecycle,
    items: Mutex<ObservableVec<ScreenRef>>,
}

impl Default for AllActive {
    fn default() -> Self {
        Self::new()
    }
}

impl AllActive {
    /// Creates an inactive conductor with no items.
    pub fn new() -> Self {
        Self {
            id: ConductorId::next(),
            life: Lifecycle::new(),
            items: Mutex::new(ObservableVec::new()),
        }
    }

    /// This conductor's identity, as recorded on owned items.
    pub fn id(&self) -> ConductorId {
        self.id
    }

    /// The conductor's own lifecycle (state queries, conduct links).
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    /// Activates the conductor and, with it, every item that supports
    /// activation.
    pub fn activate(&self) -> Result<(), LifecycleError> {
        if self.life.activate()? {
            for item in self.children() {
                try_activate(&*item);
            }
        }
        Ok(())
    }

    /// Deactivates the conductor and every item that supports
    /// deactivation. Items stay owned.
    pub fn deactivate(&self) -> Result<(), LifecycleError> {
        if self.life.deactivate()? {
            for item in self.children() {
                try_deactivate(&*item);
            }
        }
        Ok(())
    }

    /// Closes the conductor: deactivates everything first, then
    /// unconditionally closes and cleans up every owned item (no consent
    /// is asked — by this point closing is not optional) and empties the
    /// collection. Idempotent.
    pub fn close(&self) {
        let Some(transition) = self.life.close() else {
            return;
        };
        if transition.was_active {
            for item in self.children() {
                try_deactivate(&*item);
            }
        }
        let drained: Vec<ScreenRef> = {
            let mut items = self.lock_items();
            let snapshot = items.as_slice().to_vec();
            items.clear();
            // teardown below is deliberate, not a change reaction
            let _ = items.drain_changes();
            snapshot
        };
        tracing::debug!(items = drained.len(), "conductor closed; tearing down items");
        self.tear_down(&drained);
    }

    /// Ensures `item` is owned (adding it if absent, which records this
    /// conductor as its parent) and activates it if the conductor itself
    /// is currently active.
    ///
    /// A closed conductor adopts nothing: the call is a no-op and the
    /// item is neither added nor parented.
    pub fn activate_item(&self, item: ScreenRef) {
        if self.life.is_closed() {
            return;
        }
        self.ensure_item(&item);
        if self.life.is_active() {
            try_activate(&*item);
        }
    }

    /// Deactivates `item` if it supports deactivation; it stays owned.
    pub fn deactivate_item(&self, item: &ScreenRef) {
        try_deactivate(&**item);
    }

    /// Runs the two-phase close protocol on `item` alone.
    ///
    /// Consent → the item is closed, cleaned up, unparented and removed;
    /// returns `true`. A veto leaves the item owned and untouched;
    /// returns `false`. Closing an item this conductor does not own is a
    /// no-op returning `false` (no consent query is made).
    pub async fn close_item(&self, item: &ScreenRef) -> bool {
        let owned = {
            let items = self.lock_items();
            items.position(|x| Arc::ptr_eq(x, item)).is_some()
        };
        if !owned {
            return false;
        }
        if !can_close_screen(&**item).await {
            tracing::debug!(item = item.name(), "close vetoed");
            return false;
        }
        let changes = {
            let mut items = self.lock_items();
            items.remove_item(|x| Arc::ptr_eq(x, item));
            items.drain_changes()
        };
        self.apply_changes(changes);
        true
    }

    /// Snapshot of the owned collection, in order.
    pub fn children(&self) -> Vec<ScreenRef> {
        self.lock_items().as_slice().to_vec()
    }

    /// Asks every owned item for consent to close and ANDs the answers.
    ///
    /// Every item is queried to completion even after a refusal, and the
    /// result only resolves once all outstanding queries have. An empty
    /// collection resolves to `true` immediately.
    pub async fn can_close(&self) -> bool {
        let items = self.children();
        let answers = join_all(items.iter().map(|item| can_close_screen(&**item))).await;
        answers.into_iter().all(|consented| consented)
    }

    /// Direct access to the owned collection.
    ///
    /// Mutations made through the guard are applied when it drops, via
    /// the same change reaction as the conductor's own methods.
    pub fn items_mut(&self) -> ItemsGuard<'_> {
        ItemsGuard {
            conductor: self,
            inner: Some(self.lock_items()),
        }
    }

    fn lock_items(&self) -> MutexGuard<'_, ObservableVec<ScreenRef>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_item(&self, item: &ScreenRef) {
        let changes = {
            let mut items = self.lock_items();
            if items.position(|x| Arc::ptr_eq(x, item)).is_none() {
                items.push(item.clone());
            }
            items.drain_changes()
        };
        // parent is re-asserted even for already-present items
        if let Some(aware) = item.as_parent_aware() {
            aware.set_parent(Some(self.id));
        }
        self.apply_changes(changes);
    }

    /// Reacts to a drained change log. Runs with the container lock
    /// released.
    fn apply_changes(&self, changes: Vec<Change<ScreenRef>>) {
        for change in changes {
            match change {
                Change::Add { items } => self.activate_and_set_parent(&items),
                Change::Remove { items } => self.tear_down(&items),
                Change::Replace { new, old } => {
                    // new side first: no window where neither is owned
                    self.activate_and_set_parent(&new);
                    self.tear_down(&old);
                }
                Change::Reset => {
                    let current = self.children();
                    self.activate_and_set_parent(&current);
                }
            }
        }
    }

    fn activate_and_set_parent(&self, items: &[ScreenRef]) {
        let active = self.life.is_active();
        for item in items {
            if let Some(aware) = item.as_parent_aware() {
                aware.set_parent(Some(self.id));
            }
            if active {
                try_activate(&**item);
            }
        }
    }

    fn tear_down(&self, items: &[ScreenRef]) {
        for item in items {
            close_and_clean_up(&**item);
            if let Some(aware) = item.as_parent_aware() {
                aware.set_parent(None);
            }
        }
    }
}

impl Screen for AllActive {
    fn as_activate(&self) -> Option<&dyn Activate> {
        Some(self)
    }
    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        Some(self)
    }
    fn as_close(&self) -> Option<&dyn Close> {
        Some(self)
    }
    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        Some(self)
    }
    fn as_parent_aware(&self) -> Option<&dyn ParentAware> {
        Some(self)
    }
}

impl ParentAware for AllActive {
    fn set_parent(&self, parent: Option<ConductorId>) {
        self.life.set_parent(parent);
    }
    fn parent(&self) -> Option<ConductorId> {
        self.life.parent()
    }
}

impl Activate for AllActive {
    fn activate(&self) {
        let _ = AllActive::activate(self);
    }
}

impl Deactivate for AllActive {
    fn deactivate(&self) {
        let _ = AllActive::deactivate(self);
    }
}

impl Close for AllActive {
    fn close(&self) {
        AllActive::close(self);
    }
}

#[async_trait::async_trait]
impl GuardClose for AllActive {
    async fn can_close(&self) -> bool {
        AllActive::can_close(self).await
    }
}

/// RAII view over the conductor's collection; pending changes are applied
/// through the conductor's reaction when the guard drops.
pub struct ItemsGuard<'a> {
    conductor: &'a AllActive,
    inner: Option<MutexGuard<'a, ObservableVec<ScreenRef>>>,
}

impl Deref for ItemsGuard<'_> {
    type Target = ObservableVec<ScreenRef>;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref().expect("items guard already released")
    }
}

impl DerefMut for ItemsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.as_mut().expect("items guard already released")
    }
}

impl Drop for ItemsGuard<'_> {
    fn drop(&mut self) {
        let Some(mut guard) = self.inner.take() else {
            return;
        };
        let changes = guard.drain_changes();
        // release the lock before reacting: reactions run item hooks
        drop(guard);
        self.conductor.apply_changes(changes);
    }
}
