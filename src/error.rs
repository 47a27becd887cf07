//! Error types used by the screenvisor lifecycle machinery.
//!
//! There is deliberately only one error enum here: [`LifecycleError`].
//! The other "failure-shaped" outcomes in this crate are not errors at all
//! and are surfaced as ordinary values:
//!
//! - a **refused close negotiation** is a normal outcome; the item simply
//!   stays in whatever state it was in (`close_item` returns `false`);
//! - a **dead bus registration** (subscriber dropped without
//!   unsubscribing) is silently pruned on the next publish;
//! - a **missing capability** (a screen that does not implement
//!   [`Activate`](crate::screen::Activate), say) makes the corresponding
//!   `try_*` helper a no-op.

use thiserror::Error;

/// Errors raised by the per-screen lifecycle state machine.
///
/// `Closed` is terminal: once a screen has closed, asking it to activate
/// or deactivate again is a programming error and is reported explicitly
/// rather than ignored.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The screen has already closed; no further transitions are allowed.
    #[error("screen is closed; no further lifecycle transitions are allowed")]
    AlreadyClosed,
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use screenvisor::LifecycleError;
    ///
    /// assert_eq!(LifecycleError::AlreadyClosed.as_label(), "lifecycle_already_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::AlreadyClosed => "lifecycle_already_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LifecycleError::AlreadyClosed => "screen already closed".to_string(),
        }
    }
}
