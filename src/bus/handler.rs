//! # Handler capabilities and their once-resolved entry points.
//!
//! Rust has no runtime reflection, so a subscriber *declares* its handler
//! capabilities explicitly: [`Subscriber::handlers`] returns one
//! [`HandlerInvoker`] per message type the subscriber handles, each built
//! with [`HandlerInvoker::bind`]. The bus calls `handlers` exactly once,
//! at subscribe time — never per publish.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use screenvisor::bus::{Handler, HandlerInvoker, Subscriber};
//!
//! struct SettingsChanged {
//!     pub theme: String,
//! }
//!
//! struct StatusBar;
//!
//! impl Handler<SettingsChanged> for StatusBar {
//!     fn handle(&self, message: &SettingsChanged) {
//!         let _ = &message.theme; // repaint...
//!     }
//! }
//!
//! impl Subscriber for StatusBar {
//!     fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker> {
//!         vec![HandlerInvoker::bind::<Self, SettingsChanged>(self)]
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::sync::{Arc, Weak};

/// Anything publishable on the bus. Blanket-implemented; the message's
/// concrete runtime type is what handlers match on.
pub trait Message: Any + Send + Sync {}

impl<T: Any + Send + Sync> Message for T {}

/// Implement once per message type the subscriber wants to receive.
pub trait Handler<M: Message>: Send + Sync + 'static {
    /// Called for every matching published message (through the
    /// publisher's dispatch function).
    fn handle(&self, message: &M);
}

/// A zero-argument, ready-to-run handler invocation, handed to the
/// dispatch function chosen by the publisher.
pub type DispatchCallback = Box<dyn FnOnce() + Send + 'static>;

/// Registration-time capability enumeration.
///
/// List one [`HandlerInvoker::bind`] per [`Handler`] implementation; the
/// bus resolves nothing beyond this list.
pub trait Subscriber: Send + Sync + 'static {
    fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker>;
}

/// One resolved (subscriber, message type) entry point.
///
/// Holds the declared `TypeId` and a bound callable capturing a `Weak`
/// reference to the subscriber — the invoker never keeps its subscriber
/// alive, and a dead subscriber simply produces no callback.
pub struct HandlerInvoker {
    message_type: TypeId,
    invoke: Box<dyn Fn(&Arc<dyn Any + Send + Sync>) -> Option<DispatchCallback> + Send + Sync>,
}

impl HandlerInvoker {
    /// Binds `S`'s [`Handler<M>`] implementation into an invoker.
    pub fn bind<S, M>(subscriber: &Arc<S>) -> Self
    where
        S: Handler<M>,
        M: Message,
    {
        let target: Weak<S> = Arc::downgrade(subscriber);
        Self {
            message_type: TypeId::of::<M>(),
            invoke: Box::new(move |message| {
                let strong = target.upgrade()?;
                let typed = Arc::clone(message).downcast::<M>().ok()?;
                Some(Box::new(move || strong.handle(&typed)))
            }),
        }
    }

    /// Produces the dispatchable callback if the message's runtime type
    /// matches the declared one and the subscriber is still alive.
    /// A type mismatch is a silent skip.
    pub(crate) fn prepare(&self, message: &Arc<dyn Any + Send + Sync>) -> Option<DispatchCallback> {
        if (**message).type_id() != self.message_type {
            return None;
        }
        (self.invoke)(message)
    }
}
