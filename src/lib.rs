//! # screenvisor
//!
//! **Screenvisor** is a screen lifecycle conduction library for Rust.
//!
//! It provides primitives to model components ("screens") with an
//! activation lifecycle, conductors that own collections of such
//! components and propagate lifecycle transitions to them, and a
//! weakly-binding event bus for decoupled messaging between them. The
//! crate is designed as a building block for higher-level application
//! shells and view hierarchies.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                      ┌─────────────────────────────┐
//!                      │  AllActive / SingleActive   │
//!                      │  (conductor, itself a       │
//!                      │   Screen: nests freely)     │
//!                      └──┬───────────┬───────────┬──┘
//!        owns + parents   │           │           │
//!                         ▼           ▼           ▼
//!                   ┌─────────┐ ┌─────────┐ ┌─────────┐
//!                   │ Screen  │ │ Screen  │ │ Screen  │
//!                   │ (item)  │ │ (item)  │ │ (item)  │
//!                   └────┬────┘ └────┬────┘ └────┬────┘
//!                        │           │           │
//!       capability probes│ as_activate / as_guard_close / ...
//!                        ▼           ▼           ▼
//!              ┌─────────────────────────────────────┐
//!              │ Lifecycle (Inactive ⇄ Active → ✕)   │
//!              │  + parent ConductorId               │
//!              │  + conduct links (follow another    │
//!              │    screen's transitions, weakly)    │
//!              └─────────────────────────────────────┘
//!
//!   anyone ──publish──► EventBus ──weak, typed, channeled──► handlers
//! ```
//!
//! ### Conduction
//! ```text
//! conductor.activate_item(item)
//!   ├─► adopt: set parent = conductor id (always re-asserted)
//!   └─► if conductor active ─► item.activate()
//!
//! conductor.close_item(item).await       (two-phase)
//!   ├─► not owned            ─► false, nothing queried
//!   ├─► item.can_close().await == false ─► false, item untouched
//!   └─► consent ─► deactivate, close, dispose, parent = None ─► true
//!
//! conductor.close()                      (unconditional, idempotent)
//!   └─► every owned item: deactivate (if conductor was active),
//!       close, dispose, parent = None — no consent queries
//! ```
//!
//! ## Features
//! | Area           | Description                                                      | Key types / traits                        |
//! |----------------|------------------------------------------------------------------|-------------------------------------------|
//! | **Screens**    | Capability traits probed at runtime; state machine with links.   | [`Screen`], [`Lifecycle`], [`GuardClose`] |
//! | **Conductors** | Own items, propagate lifecycle, negotiate closes.                | [`AllActive`], [`SingleActive`]           |
//! | **Collections**| Observable container with a drainable change log.                | [`ObservableVec`], [`Change`]             |
//! | **Event bus**  | Weak, typed, channel-partitioned publish/subscribe.              | [`EventBus`], [`Handler`], [`Subscriber`] |
//! | **Errors**     | Typed error for invalid lifecycle transitions.                   | [`LifecycleError`]                        |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use screenvisor::{AllActive, Lifecycle, Screen, ScreenRef};
//! use screenvisor::{Activate, ConductorId, ParentAware};
//!
//! struct Editor {
//!     life: Lifecycle,
//! }
//!
//! impl Screen for Editor {
//!     fn as_activate(&self) -> Option<&dyn Activate> {
//!         Some(self)
//!     }
//!     fn as_parent_aware(&self) -> Option<&dyn ParentAware> {
//!         Some(self)
//!     }
//! }
//!
//! impl Activate for Editor {
//!     fn activate(&self) {
//!         let _ = self.life.activate();
//!     }
//! }
//!
//! impl ParentAware for Editor {
//!     fn set_parent(&self, parent: Option<ConductorId>) {
//!         self.life.set_parent(parent);
//!     }
//!     fn parent(&self) -> Option<ConductorId> {
//!         self.life.parent()
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let shell = AllActive::new();
//! shell.activate().unwrap();
//!
//! let editor: ScreenRef = Arc::new(Editor { life: Lifecycle::new() });
//! shell.activate_item(editor.clone());
//!
//! assert_eq!(editor.as_parent_aware().unwrap().parent(), Some(shell.id()));
//! assert!(shell.close_item(&editor).await);
//! # }
//! ```

pub mod bus;
pub mod collections;
pub mod conductor;
pub mod error;
pub mod screen;

// ---- Public re-exports ----

pub use bus::{DispatchCallback, EventBus, Handler, HandlerInvoker, Message, Subscriber};
pub use collections::{Change, ObservableVec};
pub use conductor::{AllActive, ItemsGuard, SingleActive};
pub use error::LifecycleError;
pub use screen::{
    Activate, Close, CloseTransition, ConductorId, Deactivate, Dispose, GuardClose, Lifecycle,
    ParentAware, Screen, ScreenRef, ScreenState,
};
