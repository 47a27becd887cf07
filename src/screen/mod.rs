//! # Screens: lifecycle-bearing components and their capabilities.
//!
//! A *screen* is any long-lived component with an activation lifecycle.
//! This module provides the two halves every screen is built from:
//!
//! - [`Lifecycle`] — the per-component state machine
//!   (`Inactive ⇄ Active → Closed`) with parent tracking and non-owning
//!   conduct links to dependent screens;
//! - the capability traits — [`Activate`], [`Deactivate`], [`Close`],
//!   [`GuardClose`], [`Dispose`], [`ParentAware`] — each independently
//!   optional, discovered at runtime through the [`Screen`] query surface.
//!
//! ## Architecture
//! ```text
//!                 ┌───────────────────────────────┐
//!                 │  Component (user type)        │
//!                 │  ├─ embeds Lifecycle          │
//!                 │  └─ implements Screen +       │
//!                 │     any subset of:            │
//!                 │     Activate / Deactivate /   │
//!                 │     Close / GuardClose /      │
//!                 │     Dispose / ParentAware     │
//!                 └───────────────┬───────────────┘
//!                                 │ Arc<dyn Screen> (ScreenRef)
//!                                 ▼
//!       Conductor ── as_activate()? ── try_activate() ── Activate::activate()
//!                 ── as_guard_close()? ─ can_close().await (consent, may suspend)
//!                 ── as_close()? ─────── Close::close() (terminal teardown)
//! ```
//!
//! ## Rules
//! - A missing capability is never an error: the `try_*` helpers are
//!   no-ops when the screen does not expose the capability.
//! - `Closed` is terminal. Activating or deactivating a closed screen is
//!   an explicit [`LifecycleError`](crate::error::LifecycleError); closing
//!   an already-closed screen is an idempotent no-op.
//! - Consent ([`GuardClose::can_close`]) never mutates state; only an
//!   affirmative answer is followed by the actual close.

mod state;
mod traits;

pub use state::{CloseTransition, Lifecycle, ScreenState};
pub use traits::{
    can_close_screen, close_and_clean_up, try_activate, try_deactivate, try_close, try_dispose,
    Activate, Close, ConductorId, Deactivate, Dispose, GuardClose, ParentAware, Screen, ScreenRef,
};
