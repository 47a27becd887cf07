//! # Conductors: parents that own and drive child screens.
//!
//! A conductor is itself a screen (it embeds a [`Lifecycle`] and exposes
//! the capability traits), whose activation, deactivation and close
//! propagate to the items it owns. Two shapes are provided:
//!
//! - [`AllActive`] — owns an ordered collection of items, all of which
//!   are active together with the conductor;
//! - [`SingleActive`] — owns at most one item at a time; installing a new
//!   one negotiates the incumbent's close.
//!
//! ## Architecture (AllActive)
//! ```text
//! caller ──► activate_item / close_item / items_mut()
//!                     │
//!                     ▼
//!          ObservableVec<ScreenRef>  (single source of truth)
//!                     │ drain_changes()
//!                     ▼
//!          ┌─────────────────────────────────────────────┐
//!          │ change reaction                             │
//!          │  Add     → set parent, activate if Active   │
//!          │  Remove  → close + dispose, clear parent    │
//!          │  Replace → new first, then tear down old    │
//!          │  Reset   → re-parent/activate current items │
//!          └─────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - An item in the collection always has the conductor recorded as its
//!   parent; an item that has left it never does. Both are updated within
//!   the reaction to a single container change.
//! - The close *negotiation* (`close_item`, `can_close`) asks via
//!   [`GuardClose`](crate::screen::GuardClose) and honours a veto. The
//!   teardown paths (conductor close, item removal) do not negotiate:
//!   by then closing is not optional.
//! - `can_close` queries **every** item even after a refusal — asking is
//!   observable (a guard may prompt a user) — and ANDs the answers.

mod all_active;
mod single_active;

#[cfg(test)]
pub(crate) mod support;

pub use all_active::{AllActive, ItemsGuard};
pub use single_active::SingleActive;

#[cfg(doc)]
use crate::screen::Lifecycle;
