//! # The event aggregator itself.
//!
//! ## Rules
//! - One registration per live subscriber instance: repeat subscribes
//!   union channels into the existing registration.
//! - A registration matches a publish when its channel set is a superset
//!   of the requested channels (the default channel stands in for an
//!   empty list on both sides).
//! - Publish dispatches matching handlers in registration order; dead
//!   registrations are excluded from the pass and then purged.
//!
//! ## Example
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use screenvisor::bus::{EventBus, Handler, HandlerInvoker, Subscriber};
//!
//! struct Tick;
//!
//! struct Counter(AtomicUsize);
//!
//! impl Handler<Tick> for Counter {
//!     fn handle(&self, _message: &Tick) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! impl Subscriber for Counter {
//!     fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker> {
//!         vec![HandlerInvoker::bind::<Self, Tick>(self)]
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let counter = Arc::new(Counter(AtomicUsize::new(0)));
//! bus.subscribe(&counter, &[]);
//! bus.publish(Tick, &[]);
//! assert_eq!(counter.0.load(Ordering::SeqCst), 1);
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::bus::handler::{DispatchCallback, HandlerInvoker, Message, Subscriber};

/// Channel used when a subscribe or publish names none.
pub const DEFAULT_CHANNEL: &str = "default";

/// Per-subscriber bookkeeping: identity, channel set, resolved invokers.
struct Registration {
    /// Data-pointer identity of the subscriber (ids are only compared
    /// while the target is still alive, so reuse after free is moot).
    key: usize,
    target: Weak<dyn Any + Send + Sync>,
    channels: HashSet<String>,
    invokers: Vec<HandlerInvoker>,
}

impl Registration {
    fn new<S: Subscriber>(subscriber: &Arc<S>, channels: &[&str]) -> Self {
        let target: Weak<S> = Arc::downgrade(subscriber);
        let target: Weak<dyn Any + Send + Sync> = target;
        let mut registration = Self {
            key: subscriber_key(subscriber),
            target,
            channels: HashSet::new(),
            invokers: subscriber.handlers(),
        };
        registration.subscribe_to(channels);
        registration
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn subscribe_to(&mut self, channels: &[&str]) {
        if channels.is_empty() {
            self.channels.insert(DEFAULT_CHANNEL.to_string());
        } else {
            self.channels.extend(channels.iter().map(|c| c.to_string()));
        }
    }

    /// Returns true when the registration should be removed entirely.
    fn unsubscribe_from(&mut self, channels: &[&str]) -> bool {
        if channels.is_empty() {
            return true;
        }
        for channel in channels {
            self.channels.remove(*channel);
        }
        self.channels.is_empty()
    }

    fn matches(&self, requested: &[&str]) -> bool {
        if requested.is_empty() {
            self.channels.contains(DEFAULT_CHANNEL)
        } else {
            requested.iter().all(|c| self.channels.contains(*c))
        }
    }
}

fn subscriber_key<S>(subscriber: &Arc<S>) -> usize {
    Arc::as_ptr(subscriber) as *const () as usize
}

/// Weakly-binding publish/subscribe aggregator.
///
/// Safe for concurrent `subscribe` / `unsubscribe` / `publish` from
/// multiple threads; a single lock guards the registry and is released
/// before any handler callback is handed to a dispatch function.
pub struct EventBus {
    registrations: Mutex<Vec<Registration>>,
    main_dispatcher: Option<Arc<dyn Fn(DispatchCallback) + Send + Sync>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus with no main-context dispatcher;
    /// [`publish_on_main`](Self::publish_on_main) falls back to inline
    /// dispatch.
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            main_dispatcher: None,
        }
    }

    /// Creates a bus with a designated main-context dispatcher (e.g. a
    /// UI-thread marshaller, or [`spawn_on`](crate::bus::spawn_on)).
    pub fn with_main_dispatcher(
        dispatcher: impl Fn(DispatchCallback) + Send + Sync + 'static,
    ) -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            main_dispatcher: Some(Arc::new(dispatcher)),
        }
    }

    /// Registers `subscriber` on the given channels (the default channel
    /// when none are named). Idempotent per instance: a repeat call
    /// unions channels into the existing registration; handler
    /// resolution is not repeated.
    pub fn subscribe<S: Subscriber>(&self, subscriber: &Arc<S>, channels: &[&str]) {
        let key = subscriber_key(subscriber);
        let mut registrations = self.lock();
        match registrations
            .iter_mut()
            .find(|r| r.key == key && r.is_alive())
        {
            Some(existing) => existing.subscribe_to(channels),
            None => {
                registrations.push(Registration::new(subscriber, channels));
                tracing::debug!(total = registrations.len(), "subscriber registered");
            }
        }
    }

    /// Removes the given channels from the subscriber's registration; an
    /// empty list removes every channel. A registration with no channels
    /// left is deleted.
    pub fn unsubscribe<S: Subscriber>(&self, subscriber: &Arc<S>, channels: &[&str]) {
        let key = subscriber_key(subscriber);
        let mut registrations = self.lock();
        if let Some(index) = registrations
            .iter()
            .position(|r| r.key == key && r.is_alive())
        {
            if registrations[index].unsubscribe_from(channels) {
                registrations.remove(index);
                tracing::debug!(total = registrations.len(), "subscriber removed");
            }
        }
    }

    /// Publishes `message` to every live, channel-matching registration,
    /// invoking each matching handler through `dispatcher`.
    ///
    /// The registry lock is released before the first `dispatcher` call.
    /// Registrations whose subscriber has been dropped are purged.
    pub fn publish_with_dispatcher<M: Message>(
        &self,
        message: M,
        dispatcher: impl Fn(DispatchCallback),
        channels: &[&str],
    ) {
        let message: Arc<dyn Any + Send + Sync> = Arc::new(message);
        let callbacks: Vec<DispatchCallback> = {
            let mut registrations = self.lock();
            let mut matched = Vec::new();
            registrations.retain(|registration| {
                if !registration.is_alive() {
                    tracing::debug!("purging dead registration");
                    return false;
                }
                if registration.matches(channels) {
                    for invoker in &registration.invokers {
                        if let Some(callback) = invoker.prepare(&message) {
                            matched.push(callback);
                        }
                    }
                }
                true
            });
            matched
        };
        for callback in callbacks {
            dispatcher(callback);
        }
    }

    /// Publishes with inline dispatch: handlers run synchronously on the
    /// calling thread, before this returns.
    pub fn publish<M: Message>(&self, message: M, channels: &[&str]) {
        self.publish_with_dispatcher(message, |callback| callback(), channels);
    }

    /// Publishes through the main-context dispatcher configured at
    /// construction, or inline when none was configured.
    pub fn publish_on_main<M: Message>(&self, message: M, channels: &[&str]) {
        match &self.main_dispatcher {
            Some(dispatcher) => {
                let dispatcher = Arc::clone(dispatcher);
                self.publish_with_dispatcher(message, move |callback| dispatcher(callback), channels);
            }
            None => self.publish(message, channels),
        }
    }

    /// Number of registrations currently held. Dead registrations linger
    /// until the next publish purges them.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::handler::Handler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ping(u32);
    struct Pong;

    #[derive(Default)]
    struct Recorder {
        pings: Mutex<Vec<u32>>,
        pongs: AtomicUsize,
    }

    impl Recorder {
        fn ping_values(&self) -> Vec<u32> {
            self.pings.lock().unwrap().clone()
        }
    }

    impl Handler<Ping> for Recorder {
        fn handle(&self, message: &Ping) {
            self.pings.lock().unwrap().push(message.0);
        }
    }

    impl Handler<Pong> for Recorder {
        fn handle(&self, _message: &Pong) {
            self.pongs.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Subscriber for Recorder {
        fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker> {
            vec![
                HandlerInvoker::bind::<Self, Ping>(self),
                HandlerInvoker::bind::<Self, Pong>(self),
            ]
        }
    }

    #[test]
    fn test_default_channel_roundtrip() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &[]);

        bus.publish(Ping(7), &[]);
        assert_eq!(recorder.ping_values(), vec![7]);
    }

    #[test]
    fn test_channel_mismatch_is_not_delivered() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &["a"]);

        bus.publish(Ping(1), &["b"]);
        bus.publish(Ping(2), &[]); // default channel, not subscribed either
        assert!(recorder.ping_values().is_empty());

        bus.publish(Ping(3), &["a"]);
        assert_eq!(recorder.ping_values(), vec![3]);
    }

    #[test]
    fn test_repeat_subscribe_unions_channels() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &["a"]);
        bus.subscribe(&recorder, &["b"]);

        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(Ping(1), &["a"]);
        bus.publish(Ping(2), &["b"]);
        assert_eq!(recorder.ping_values(), vec![1, 2]);
    }

    #[test]
    fn test_publish_to_multiple_channels_requires_all() {
        let bus = EventBus::new();
        let partial = Arc::new(Recorder::default());
        let full = Arc::new(Recorder::default());
        bus.subscribe(&partial, &["a"]);
        bus.subscribe(&full, &["a", "b"]);

        bus.publish(Ping(5), &["a", "b"]);
        assert!(partial.ping_values().is_empty());
        assert_eq!(full.ping_values(), vec![5]);
    }

    #[test]
    fn test_unsubscribe_all_channels() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &["a", "b"]);

        bus.unsubscribe(&recorder, &[]);
        assert_eq!(bus.subscriber_count(), 0);

        bus.publish(Ping(1), &["a"]);
        assert!(recorder.ping_values().is_empty());
    }

    #[test]
    fn test_partial_unsubscribe_keeps_remaining_channels() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &["a", "b"]);

        bus.unsubscribe(&recorder, &["a"]);
        assert_eq!(bus.subscriber_count(), 1);
        bus.publish(Ping(1), &["a"]);
        bus.publish(Ping(2), &["b"]);
        assert_eq!(recorder.ping_values(), vec![2]);

        bus.unsubscribe(&recorder, &["b"]);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_message_types_are_matched_exactly() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &[]);

        bus.publish(Pong, &[]);
        assert!(recorder.ping_values().is_empty());
        assert_eq!(recorder.pongs.load(Ordering::SeqCst), 1);

        // a type nobody handles is silently skipped
        bus.publish("nobody handles strings".to_string(), &[]);
    }

    #[test]
    fn test_dead_subscriber_is_skipped_and_purged() {
        // route the purge debug line into the captured test output
        let _ = tracing_subscriber::fmt()
            .with_env_filter("screenvisor=debug")
            .with_test_writer()
            .try_init();

        let bus = EventBus::new();
        let survivor = Arc::new(Recorder::default());
        bus.subscribe(&survivor, &[]);
        {
            let doomed = Arc::new(Recorder::default());
            bus.subscribe(&doomed, &[]);
            assert_eq!(bus.subscriber_count(), 2);
        }

        bus.publish(Ping(9), &[]);
        assert_eq!(survivor.ping_values(), vec![9]);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_dispatch_is_deferred_through_the_dispatch_fn() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &[]);

        let queue: Mutex<Vec<DispatchCallback>> = Mutex::new(Vec::new());
        bus.publish_with_dispatcher(
            Ping(3),
            |callback| queue.lock().unwrap().push(callback),
            &[],
        );

        // nothing ran yet: the dispatcher only queued
        assert!(recorder.ping_values().is_empty());

        for callback in queue.into_inner().unwrap() {
            callback();
        }
        assert_eq!(recorder.ping_values(), vec![3]);
    }

    #[test]
    fn test_publish_on_main_uses_injected_dispatcher() {
        let deferred = Arc::new(Mutex::new(Vec::<DispatchCallback>::new()));
        let sink = Arc::clone(&deferred);
        let bus = EventBus::with_main_dispatcher(move |callback| {
            sink.lock().unwrap().push(callback);
        });

        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &[]);
        bus.publish_on_main(Ping(4), &[]);

        assert!(recorder.ping_values().is_empty());
        for callback in deferred.lock().unwrap().drain(..) {
            callback();
        }
        assert_eq!(recorder.ping_values(), vec![4]);
    }

    #[test]
    fn test_publish_on_main_falls_back_inline() {
        let bus = EventBus::new();
        let recorder = Arc::new(Recorder::default());
        bus.subscribe(&recorder, &[]);

        bus.publish_on_main(Ping(6), &[]);
        assert_eq!(recorder.ping_values(), vec![6]);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        struct Tagged {
            tag: u32,
            log: Arc<Mutex<Vec<u32>>>,
        }
        impl Handler<Ping> for Tagged {
            fn handle(&self, _message: &Ping) {
                self.log.lock().unwrap().push(self.tag);
            }
        }
        impl Subscriber for Tagged {
            fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker> {
                vec![HandlerInvoker::bind::<Self, Ping>(self)]
            }
        }

        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let subscribers: Vec<Arc<Tagged>> = (0..5)
            .map(|tag| {
                Arc::new(Tagged {
                    tag,
                    log: Arc::clone(&log),
                })
            })
            .collect();
        for subscriber in &subscribers {
            bus.subscribe(subscriber, &[]);
        }

        bus.publish(Ping(0), &[]);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_concurrent_subscribe_unsubscribe_keeps_registry_consistent() {
        let bus = Arc::new(EventBus::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let bus = Arc::clone(&bus);
            handles.push(std::thread::spawn(move || {
                let keep = Arc::new(Recorder::default());
                let transient = Arc::new(Recorder::default());
                for _ in 0..100 {
                    bus.subscribe(&keep, &["keep"]);
                    bus.subscribe(&transient, &["t"]);
                    bus.unsubscribe(&transient, &[]);
                }
                keep // keep alive past the loop
            }));
        }

        let kept: Vec<Arc<Recorder>> = handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect();

        // one registration per surviving subscriber: no duplicates, no
        // lost updates
        assert_eq!(bus.subscriber_count(), kept.len());
        bus.publish(Ping(1), &["keep"]);
        for recorder in &kept {
            assert_eq!(recorder.ping_values(), vec![1]);
        }
    }
}
