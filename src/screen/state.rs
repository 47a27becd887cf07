//! # Per-screen lifecycle state machine.
//!
//! [`Lifecycle`] is the cell every screen embeds to track its own state.
//! It owns three things:
//!
//! - the state itself (`Inactive ⇄ Active → Closed`, `Closed` terminal);
//! - the parent pointer ([`ConductorId`]) maintained by conductors;
//! - the *conduct links*: non-owning (`Weak`) references to dependent
//!   screens that should follow this lifecycle's transitions.
//!
//! ## State machine
//! ```text
//!             activate()                 close()
//!  Inactive ──────────────► Active ──────────────► Closed (terminal)
//!     ▲                       │                       ▲
//!     └───────────────────────┘                       │
//!            deactivate()           close() from Inactive also lands here
//! ```
//!
//! ## Rules
//! - `activate` / `deactivate` on a closed lifecycle is
//!   [`LifecycleError::AlreadyClosed`]; `close` on a closed lifecycle is
//!   an idempotent no-op (`None`).
//! - Closing an active lifecycle deactivates first; the returned
//!   [`CloseTransition::was_active`] tells the embedding component to run
//!   its deactivation hook before its close hook.
//! - Conduct links are invalidated automatically: a dropped child is
//!   pruned on the next notification, never resurrected.
//! - The state lock is released before any link is notified, so a child
//!   reacting to a transition may inspect this lifecycle freely.
//!
//! ## Example
//! ```
//! use screenvisor::screen::{Lifecycle, ScreenState};
//!
//! let life = Lifecycle::new();
//! assert_eq!(life.state(), ScreenState::Inactive);
//!
//! assert!(life.activate().unwrap());          // Inactive → Active
//! assert!(!life.activate().unwrap());         // Active → Active: no-op
//!
//! let close = life.close().expect("first close");
//! assert!(close.was_active);                  // implicit deactivation
//! assert!(life.close().is_none());            // idempotent
//! assert!(life.activate().is_err());          // terminal
//! ```

use std::sync::{Mutex, PoisonError, Weak};

use crate::error::LifecycleError;
use crate::screen::traits::{
    close_and_clean_up, try_activate, try_deactivate, ConductorId, Screen, ScreenRef,
};

/// Lifecycle states of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Initial state; also the state after a deactivation.
    Inactive,
    /// The screen is in use.
    Active,
    /// Terminal state; no transitions lead out of it.
    Closed,
}

/// What happened during a successful [`Lifecycle::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTransition {
    /// True if the lifecycle was `Active` and was implicitly deactivated
    /// as the first half of the close.
    pub was_active: bool,
}

/// A non-owning link from this lifecycle to a dependent screen.
struct ConductLink {
    target: Weak<dyn Screen>,
    on_activate: bool,
    on_deactivate: bool,
    on_close: bool,
}

/// Thread-safe lifecycle cell for a single screen.
///
/// The conductors in this crate drive it through the capability traits;
/// components embed it and delegate. Mutation is expected from one
/// logical caller at a time (the interior lock only makes sharing via
/// `Arc` sound, it is not a serialization point for callers).
pub struct Lifecycle {
    state: Mutex<ScreenState>,
    parent: Mutex<Option<ConductorId>>,
    links: Mutex<Vec<ConductLink>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Creates a lifecycle in the `Inactive` state with no parent.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScreenState::Inactive),
            parent: Mutex::new(None),
            links: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> ScreenState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True while the lifecycle is `Active`.
    pub fn is_active(&self) -> bool {
        self.state() == ScreenState::Active
    }

    /// True once the lifecycle has closed.
    pub fn is_closed(&self) -> bool {
        self.state() == ScreenState::Closed
    }

    /// Transitions `Inactive → Active`.
    ///
    /// Returns `Ok(true)` when the transition happened (activation hooks
    /// and conduct links should fire), `Ok(false)` when already active,
    /// and [`LifecycleError::AlreadyClosed`] on a closed lifecycle.
    pub fn activate(&self) -> Result<bool, LifecycleError> {
        let transitioned = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                ScreenState::Closed => return Err(LifecycleError::AlreadyClosed),
                ScreenState::Active => false,
                ScreenState::Inactive => {
                    *state = ScreenState::Active;
                    true
                }
            }
        };
        if transitioned {
            tracing::trace!("lifecycle activated");
            self.notify_links(|link| link.on_activate, try_activate);
        }
        Ok(transitioned)
    }

    /// Transitions `Active → Inactive`.
    ///
    /// Returns `Ok(true)` when the transition happened, `Ok(false)` when
    /// already inactive, and [`LifecycleError::AlreadyClosed`] on a closed
    /// lifecycle.
    pub fn deactivate(&self) -> Result<bool, LifecycleError> {
        let transitioned = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                ScreenState::Closed => return Err(LifecycleError::AlreadyClosed),
                ScreenState::Inactive => false,
                ScreenState::Active => {
                    *state = ScreenState::Inactive;
                    true
                }
            }
        };
        if transitioned {
            tracing::trace!("lifecycle deactivated");
            self.notify_links(|link| link.on_deactivate, try_deactivate);
        }
        Ok(transitioned)
    }

    /// Terminal transition to `Closed` (phase 2 of the close protocol).
    ///
    /// Deactivates first when currently active, then closes. Returns
    /// `None` when already closed (idempotent), otherwise the
    /// [`CloseTransition`] describing what happened. Callers must only
    /// invoke this after an affirmative consent or on an unconditional
    /// teardown path.
    pub fn close(&self) -> Option<CloseTransition> {
        let transition = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                ScreenState::Closed => None,
                current => {
                    *state = ScreenState::Closed;
                    Some(CloseTransition {
                        was_active: current == ScreenState::Active,
                    })
                }
            }
        };
        if let Some(transition) = transition {
            tracing::trace!(was_active = transition.was_active, "lifecycle closed");
            if transition.was_active {
                self.notify_links(|link| link.on_deactivate, try_deactivate);
            }
            self.notify_links(|link| link.on_close, close_and_clean_up);
        }
        transition
    }

    /// Returns the recorded owning conductor, if any.
    pub fn parent(&self) -> Option<ConductorId> {
        *self.parent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records (or clears) the owning conductor.
    pub fn set_parent(&self, parent: Option<ConductorId>) {
        *self.parent.lock().unwrap_or_else(PoisonError::into_inner) = parent;
    }

    /// Activates `child` whenever this lifecycle activates.
    pub fn activate_with(&self, child: &ScreenRef) {
        self.push_link(child, true, false, false);
    }

    /// Deactivates `child` whenever this lifecycle deactivates.
    pub fn deactivate_with(&self, child: &ScreenRef) {
        self.push_link(child, false, true, false);
    }

    /// Closes and cleans up `child` whenever this lifecycle closes.
    pub fn close_with(&self, child: &ScreenRef) {
        self.push_link(child, false, false, true);
    }

    /// Conducts `child` fully: activate, deactivate and close with this
    /// lifecycle.
    pub fn conduct_with(&self, child: &ScreenRef) {
        self.push_link(child, true, true, true);
    }

    fn push_link(&self, child: &ScreenRef, on_activate: bool, on_deactivate: bool, on_close: bool) {
        let mut links = self.links.lock().unwrap_or_else(PoisonError::into_inner);
        links.push(ConductLink {
            target: std::sync::Arc::downgrade(child),
            on_activate,
            on_deactivate,
            on_close,
        });
    }

    /// Snapshots the matching live links (pruning dead ones), then invokes
    /// `apply` on each target outside the lock.
    fn notify_links(&self, wants: impl Fn(&ConductLink) -> bool, apply: impl Fn(&dyn Screen)) {
        let targets: Vec<ScreenRef> = {
            let mut links = self.links.lock().unwrap_or_else(PoisonError::into_inner);
            links.retain(|link| link.target.strong_count() > 0);
            links
                .iter()
                .filter(|link| wants(link))
                .filter_map(|link| link.target.upgrade())
                .collect()
        };
        for target in targets {
            apply(&*target);
        }
    }
}
