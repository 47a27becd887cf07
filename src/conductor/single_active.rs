//! # Single-active conductor: at most one item at a time.
//!
//! [`SingleActive`] holds one incumbent item. Installing a different item
//! (or `None`) first negotiates the incumbent's close; a veto keeps
//! everything exactly as it was. On consent the incumbent is deactivated,
//! closed, cleaned up and unparented **before** the newcomer is adopted —
//! the one-active invariant means there is never a moment with two owned
//! items.

use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LifecycleError;
use crate::screen::{
    can_close_screen, close_and_clean_up, try_activate, try_deactivate, Activate, Close,
    ConductorId, Deactivate, GuardClose, Lifecycle, ParentAware, Screen, ScreenRef,
};

/// Conductor owning at most one current item.
pub struct SingleActive {
    id: ConductorId,
    life: Lifecycle,
    active: Mutex<Option<ScreenRef>>,
}

impl Default for SingleActive {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleActive {
    /// Creates an inactive conductor with no item.
    pub fn new() -> Self {
        Self {
            id: ConductorId::next(),
            life: Lifecycle::new(),
            active: Mutex::new(None),
        }
    }

    pub fn id(&self) -> ConductorId {
        self.id
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.life
    }

    /// The incumbent item, if any.
    pub fn active_item(&self) -> Option<ScreenRef> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Activates the conductor; the incumbent follows.
    pub fn activate(&self) -> Result<(), LifecycleError> {
        if self.life.activate()? {
            if let Some(item) = self.active_item() {
                try_activate(&*item);
            }
        }
        Ok(())
    }

    /// Deactivates the conductor; the incumbent follows but stays owned.
    pub fn deactivate(&self) -> Result<(), LifecycleError> {
        if self.life.deactivate()? {
            if let Some(item) = self.active_item() {
                try_deactivate(&*item);
            }
        }
        Ok(())
    }

    /// Closes the conductor and unconditionally tears down the incumbent.
    /// Idempotent.
    pub fn close(&self) {
        let Some(transition) = self.life.close() else {
            return;
        };
        let incumbent = {
            let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        if let Some(item) = incumbent {
            if transition.was_active {
                try_deactivate(&*item);
            }
            close_and_clean_up(&*item);
            if let Some(aware) = item.as_parent_aware() {
                aware.set_parent(None);
            }
        }
    }

    /// Makes `item` the current item, negotiating the incumbent's close.
    ///
    /// - Same item again: re-activated if the conductor is active.
    /// - Different item (or `None`): the incumbent is asked for consent;
    ///   a veto returns `false` with nothing changed. On consent the
    ///   incumbent is torn down, then the newcomer (if any) is parented
    ///   and, if the conductor is active, activated.
    /// - Closed conductor: adopts nothing, returns `false`.
    pub async fn activate_item(&self, item: Option<ScreenRef>) -> bool {
        if self.life.is_closed() {
            return false;
        }
        let current = self.active_item();
        if let (Some(new), Some(cur)) = (&item, &current) {
            if Arc::ptr_eq(new, cur) {
                if let Some(aware) = new.as_parent_aware() {
                    aware.set_parent(Some(self.id));
                }
                if self.life.is_active() {
                    try_activate(&**new);
                }
                return true;
            }
        }
        if item.is_none() && current.is_none() {
            return true;
        }
        let consent = match &current {
            Some(cur) => can_close_screen(&**cur).await,
            None => true,
        };
        if !consent {
            tracing::debug!("incumbent vetoed the swap");
            return false;
        }
        self.change_active_item(item);
        true
    }

    /// Deactivates the incumbent (only the incumbent; anything else is a
    /// no-op).
    pub fn deactivate_item(&self, item: &ScreenRef) {
        if let Some(current) = self.active_item() {
            if Arc::ptr_eq(&current, item) {
                try_deactivate(&**item);
            }
        }
    }

    /// Two-phase close of the incumbent. Items this conductor does not
    /// own are a no-op returning `false` (no consent query is made).
    pub async fn close_item(&self, item: &ScreenRef) -> bool {
        let owned = self
            .active_item()
            .is_some_and(|current| Arc::ptr_eq(&current, item));
        if !owned {
            return false;
        }
        if !can_close_screen(&**item).await {
            return false;
        }
        self.change_active_item(None);
        true
    }

    /// Consent delegates to the incumbent; `true` when there is none.
    pub async fn can_close(&self) -> bool {
        match self.active_item() {
            Some(item) => can_close_screen(&*item).await,
            None => true,
        }
    }

    /// Unconditional swap: tears down the old incumbent, adopts the new.
    fn change_active_item(&self, new: Option<ScreenRef>) {
        let old = {
            let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, new.clone())
        };
        if let Some(old) = old {
            try_deactivate(&*old);
            close_and_clean_up(&*old);
            if let Some(aware) = old.as_parent_aware() {
                aware.set_parent(None);
            }
        }
        if let Some(new) = new {
            if let Some(aware) = new.as_parent_aware() {
                aware.set_parent(Some(self.id));
            }
            if self.life.is_active() {
                try_activate(&*new);
            }
        }
    }
}

impl Screen for SingleActive {
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

impl ParentAware for SingleActive {
    fn set_parent(&self, parent: Option<ConductorId>) {
        self.life.set_parent(parent);
    }
    fn parent(&self) -> Option<ConductorId> {
        self.life.parent()
    }
}

impl Activate for SingleActive {
    fn activate(&self) {
        let _ = SingleActive::activate(self);
    }
}

impl Deactivate for SingleActive {
    fn deactivate(&self) {
        let _ = SingleActive::deactivate(self);
    }
}

impl Close for SingleActive {
    fn close(&self) {
        SingleActive::close(self);
    }
}

#[async_trait::async_trait]
impl GuardClose for SingleActive {
    async fn can_close(&self) -> bool {
        SingleActive::can_close(self).await
    }
}
