//! # Event bus: weakly-binding, channel-partitioned publish/subscribe.
//!
//! [`EventBus`] lets components exchange typed messages without holding
//! strong references to each other or knowing each other's concrete
//! types. Subscribers are held through `Weak` references only — the bus
//! is never the reason a subscriber stays alive — and registrations whose
//! subscriber has been dropped are purged opportunistically on the next
//! publish.
//!
//! ## Architecture
//! ```text
//! publisher ──► publish_with_dispatcher(message, dispatch, channels)
//!                      │
//!                      ▼ (registry lock held for the scan only)
//!        ┌──────────────────────────────────────────────┐
//!        │ registrations, in subscribe order            │
//!        │  ├─ Weak target dead?      → purge           │
//!        │  ├─ channels ⊉ requested?  → skip            │
//!        │  └─ per HandlerInvoker:                      │
//!        │       declared TypeId == message TypeId?     │
//!        │         → build zero-arg callback            │
//!        └──────────────────────────────────────────────┘
//!                      │ (lock released)
//!                      ▼
//!          dispatch(callback) for each match
//!          (inline, or deferred onto another executor)
//! ```
//!
//! ## Rules
//! - Handler resolution happens **once**, at subscribe time: a
//!   [`Subscriber`] enumerates its [`HandlerInvoker`]s, each binding one
//!   message type to a weakly-captured entry point.
//! - Matching is exact `TypeId` equality; a non-matching invoker is
//!   silently skipped, never an error.
//! - The registry lock is never held across a dispatch call: the
//!   dispatch function may defer arbitrarily, and a handler may itself
//!   publish or subscribe without deadlocking.
//! - Handler panics are not caught; they propagate to whoever runs the
//!   dispatched callback, so subscriber bugs stay visible.

mod aggregator;
mod dispatch;
mod handler;

pub use aggregator::{EventBus, DEFAULT_CHANNEL};
pub use dispatch::{inline, spawn_on};
pub use handler::{DispatchCallback, Handler, HandlerInvoker, Message, Subscriber};
