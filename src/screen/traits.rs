//! # Screen capability contracts.
//!
//! Capabilities are modelled as an open set of small traits, queried at
//! runtime through [`Screen`]'s `as_*` methods. A component implements the
//! subset it cares about and overrides the matching queries to return
//! `Some(self)`; everything else stays `None` and the conductors simply
//! skip that aspect of the item.
//!
//! ## Example
//! ```
//! use screenvisor::screen::{Activate, Lifecycle, Screen};
//!
//! struct Banner {
//!     life: Lifecycle,
//! }
//!
//! impl Screen for Banner {
//!     fn as_activate(&self) -> Option<&dyn Activate> {
//!         Some(self)
//!     }
//! }
//!
//! impl Activate for Banner {
//!     fn activate(&self) {
//!         let _ = self.life.activate();
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;

/// Process-wide counter backing [`ConductorId::next`].
static CONDUCTOR_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a conductor, recorded as the parent pointer on
/// conducted items.
///
/// Ids are process-unique and never reused, so a stale parent pointer can
/// never be mistaken for a newer conductor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConductorId(u64);

impl ConductorId {
    /// Allocates the next unique id.
    pub fn next() -> Self {
        ConductorId(CONDUCTOR_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

/// Shared handle to a screen. Identity is pointer identity (`Arc::ptr_eq`).
pub type ScreenRef = Arc<dyn Screen>;

/// Base trait for conducted components.
///
/// Every `as_*` query defaults to `None`; implementors override the ones
/// matching the capabilities they actually provide. Conductors and the
/// `try_*` helpers treat an absent capability as "nothing to do".
pub trait Screen: Send + Sync + 'static {
    /// Human-readable name (for logs). Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The screen can be activated.
    fn as_activate(&self) -> Option<&dyn Activate> {
        None
    }

    /// The screen can be deactivated.
    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        None
    }

    /// The screen has terminal teardown logic.
    fn as_close(&self) -> Option<&dyn Close> {
        None
    }

    /// The screen wants a say in whether it may close.
    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        None
    }

    /// The screen holds resources to release after closing.
    fn as_dispose(&self) -> Option<&dyn Dispose> {
        None
    }

    /// The screen records which conductor owns it.
    fn as_parent_aware(&self) -> Option<&dyn ParentAware> {
        None
    }
}

/// Reversible transition into the in-use state.
pub trait Activate: Send + Sync {
    fn activate(&self);
}

/// Reversible transition out of the in-use state.
pub trait Deactivate: Send + Sync {
    fn deactivate(&self);
}

/// Terminal teardown. Never invoked by a conductor without either a
/// preceding affirmative [`GuardClose::can_close`] for the same request,
/// or an unconditional teardown path (conductor close, item removal).
pub trait Close: Send + Sync {
    fn close(&self);
}

/// Consent half of the two-phase close protocol.
///
/// May suspend for an unbounded time (e.g. waiting on a user decision).
/// Must not mutate the screen's lifecycle state: a negative answer leaves
/// the screen exactly as it was.
#[async_trait]
pub trait GuardClose: Send + Sync {
    async fn can_close(&self) -> bool;
}

/// Release of held resources, run after [`Close::close`] during cleanup.
pub trait Dispose: Send + Sync {
    fn dispose(&self);
}

/// Records the owning conductor.
///
/// The invariant maintained by conductors: an item present in a
/// conductor's collection has `parent() == Some(conductor_id)`, an item
/// that has left it does not.
pub trait ParentAware: Send + Sync {
    fn set_parent(&self, parent: Option<ConductorId>);
    fn parent(&self) -> Option<ConductorId>;
}

/// Activates the screen if it exposes [`Activate`].
pub fn try_activate(screen: &dyn Screen) {
    if let Some(a) = screen.as_activate() {
        a.activate();
    }
}

/// Deactivates the screen if it exposes [`Deactivate`].
pub fn try_deactivate(screen: &dyn Screen) {
    if let Some(d) = screen.as_deactivate() {
        d.deactivate();
    }
}

/// Closes the screen if it exposes [`Close`].
pub fn try_close(screen: &dyn Screen) {
    if let Some(c) = screen.as_close() {
        c.close();
    }
}

/// Disposes the screen if it exposes [`Dispose`].
pub fn try_dispose(screen: &dyn Screen) {
    if let Some(d) = screen.as_dispose() {
        d.dispose();
    }
}

/// Queries the screen's close consent; screens without a guard consent
/// implicitly.
pub async fn can_close_screen(screen: &dyn Screen) -> bool {
    match screen.as_guard_close() {
        Some(guard) => guard.can_close().await,
        None => true,
    }
}

/// Unconditional teardown: close, then release resources.
pub fn close_and_clean_up(screen: &dyn Screen) {
    try_close(screen);
    try_dispose(screen);
}
