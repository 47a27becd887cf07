//! Test doubles shared by the conductor test modules.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::screen::{
    Activate, Close, ConductorId, Deactivate, Dispose, GuardClose, Lifecycle, ParentAware, Screen,
};

/// A screen exposing every capability, with counters for each hook and a
/// configurable close consent.
pub struct TestScreen {
    pub life: Lifecycle,
    pub activations: AtomicUsize,
    pub deactivations: AtomicUsize,
    pub closes: AtomicUsize,
    pub disposes: AtomicUsize,
    pub consent_queries: AtomicUsize,
    consent: AtomicBool,
    consent_delay: Option<Duration>,
}

impl TestScreen {
    pub fn new(consent: bool) -> Arc<Self> {
        Arc::new(Self {
            life: Lifecycle::new(),
            activations: AtomicUsize::new(0),
            deactivations: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            disposes: AtomicUsize::new(0),
            consent_queries: AtomicUsize::new(0),
            consent: AtomicBool::new(consent),
            consent_delay: None,
        })
    }

    /// Consent answered only after `delay` (models a pending user prompt).
    pub fn with_consent_delay(consent: bool, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            life: Lifecycle::new(),
            activations: AtomicUsize::new(0),
            deactivations: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            disposes: AtomicUsize::new(0),
            consent_queries: AtomicUsize::new(0),
            consent: AtomicBool::new(consent),
            consent_delay: Some(delay),
        })
    }

    pub fn queries(&self) -> usize {
        self.consent_queries.load(Ordering::SeqCst)
    }
}

impl Screen for TestScreen {
    fn as_activate(&self) -> Option<&dyn Activate> {
        Some(self)
    }
    fn as_deactivate(&self) -> Option<&dyn Deactivate> {
        Some(self)
    }
    fn as_close(&self) -> Option<&dyn Close> {
        Some(self)
    }
    fn as_guard_close(&self) -> Option<&dyn GuardClose> {
        Some(self)
    }
    fn as_dispose(&self) -> Option<&dyn Dispose> {
        Some(self)
    }
    fn as_parent_aware(&self) -> Option<&dyn ParentAware> {
        Some(self)
    }
}

impl Activate for TestScreen {
    fn activate(&self) {
        if self.life.activate().unwrap_or(false) {
            self.activations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Deactivate for TestScreen {
    fn deactivate(&self) {
        if self.life.deactivate().unwrap_or(false) {
            self.deactivations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Close for TestScreen {
    fn close(&self) {
        if let Some(transition) = self.life.close() {
            if transition.was_active {
                self.deactivations.fetch_add(1, Ordering::SeqCst);
            }
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl GuardClose for TestScreen {
    async fn can_close(&self) -> bool {
        self.consent_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.consent_delay {
            tokio::time::sleep(delay).await;
        }
        self.consent.load(Ordering::SeqCst)
    }
}

impl Dispose for TestScreen {
    fn dispose(&self) {
        self.disposes.fetch_add(1, Ordering::SeqCst);
    }
}

impl ParentAware for TestScreen {
    fn set_parent(&self, parent: Option<ConductorId>) {
        self.life.set_parent(parent);
    }
    fn parent(&self) -> Option<ConductorId> {
        self.life.parent()
    }
}
