//! Dispatch strategies for handler callbacks.
//!
//! A dispatch function receives a zero-argument callback and decides how
//! and when to run it. The two stock policies cover the common cases;
//! anything else (test queues, UI-thread marshalling) is just a closure.

use crate::bus::handler::DispatchCallback;

/// Runs each callback immediately, on the publisher's thread.
pub fn inline() -> impl Fn(DispatchCallback) {
    |callback| callback()
}

/// Defers each callback onto the given tokio runtime.
///
/// Publishers are not serialized behind the handlers: the publish call
/// returns as soon as the callbacks are spawned.
pub fn spawn_on(
    handle: tokio::runtime::Handle,
) -> impl Fn(DispatchCallback) + Send + Sync + 'static {
    move |callback| {
        handle.spawn(async move { callback() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc, Mutex};
    use std::time::Duration;

    use crate::bus::{EventBus, Handler, HandlerInvoker, Subscriber};

    struct Note(u32);

    struct Relay(Mutex<mpsc::Sender<u32>>);

    impl Relay {
        fn new() -> (Arc<Self>, mpsc::Receiver<u32>) {
            let (tx, rx) = mpsc::channel();
            (Arc::new(Self(Mutex::new(tx))), rx)
        }
    }

    impl Handler<Note> for Relay {
        fn handle(&self, message: &Note) {
            let _ = self.0.lock().unwrap().send(message.0);
        }
    }

    impl Subscriber for Relay {
        fn handlers(self: &Arc<Self>) -> Vec<HandlerInvoker> {
            vec![HandlerInvoker::bind::<Self, Note>(self)]
        }
    }

    #[test]
    fn test_inline_runs_before_publish_returns() {
        let bus = EventBus::new();
        let (relay, rx) = Relay::new();
        bus.subscribe(&relay, &[]);

        bus.publish_with_dispatcher(Note(1), inline(), &[]);
        assert_eq!(rx.try_recv(), Ok(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_on_defers_onto_the_runtime() {
        let bus = EventBus::new();
        let (relay, rx) = Relay::new();
        bus.subscribe(&relay, &[]);

        let dispatcher = spawn_on(tokio::runtime::Handle::current());
        bus.publish_with_dispatcher(Note(2), dispatcher, &[]);

        let received = rx
            .recv_timeout(Duration::from_secs(1))
            .expect("spawned handler did not run");
        assert_eq!(received, 2);
    }
}
