/// Test doubles simulating the CAN engine and timer during integration tests.
use korri_can2040::{
    infra::codec::WireMessage,
    transport::{
        config::TransportConfig,
        engine_transport::TransportShared,
        registry::EngineInstance,
        traits::{
            can_engine::{CanEngine, EngineStatistics, NotifyCallback, NotifyKind},
            transport_timer::TransportTimer,
        },
    },
};
use std::cell::Cell;
use std::sync::{Mutex, MutexGuard};
use tokio::time::{sleep, Duration};

/// Engine slots are process-wide; tests binding them run one at a time.
static REGISTRY_LOCK: Mutex<()> = Mutex::new(());

#[allow(dead_code)]
pub fn registry_guard() -> MutexGuard<'static, ()> {
    REGISTRY_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fresh `'static` shared state for one transport.
#[allow(dead_code)]
pub fn leak_shared<const RX: usize>() -> &'static TransportShared<RX> {
    Box::leak(Box::new(TransportShared::new()))
}

thread_local! {
    static FAIL_NEXT_START: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Failures the mock engine can report.
pub enum MockError {
    StartFailed,
    Rejected,
}

#[allow(dead_code)]
/// Scripted engine capturing its notify callback and every submission.
pub struct MockEngine {
    pub config: TransportConfig,
    callback: NotifyCallback,
    /// Value returned by `can_accept()`.
    pub accepting: bool,
    /// Refuse this many submissions even while accepting.
    pub reject_next: usize,
    /// Stop accepting after this many more successful submissions.
    pub accept_budget: Option<usize>,
    pub submitted: Vec<WireMessage>,
    pub stopped: bool,
}

#[allow(dead_code)]
impl MockEngine {
    /// Make the next `start()` on this thread fail.
    pub fn fail_next_start() {
        FAIL_NEXT_START.with(|flag| flag.set(true));
    }

    /// Raise a notification the way the interrupt handler would.
    pub fn notify(&self, kind: NotifyKind, msg: &WireMessage) {
        (self.callback)(self.config.instance, kind, msg);
    }

    /// Simulate reception of `msg`.
    pub fn receive(&self, msg: WireMessage) {
        self.notify(NotifyKind::RxComplete, &msg);
    }

    /// Identifiers of every submitted message, in order.
    pub fn submitted_ids(&self) -> Vec<u32> {
        self.submitted.iter().map(|msg| msg.id).collect()
    }

    pub fn instance(&self) -> EngineInstance {
        self.config.instance
    }
}

impl CanEngine for MockEngine {
    type Error = MockError;

    fn start(config: &TransportConfig, callback: NotifyCallback) -> Result<Self, Self::Error> {
        if FAIL_NEXT_START.with(|flag| flag.replace(false)) {
            return Err(MockError::StartFailed);
        }
        Ok(Self {
            config: *config,
            callback,
            accepting: true,
            reject_next: 0,
            accept_budget: None,
            submitted: Vec::new(),
            stopped: false,
        })
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn can_accept(&self) -> bool {
        self.accepting && self.accept_budget != Some(0)
    }

    fn submit(&mut self, msg: &WireMessage) -> Result<(), Self::Error> {
        if self.reject_next > 0 {
            self.reject_next -= 1;
            return Err(MockError::Rejected);
        }
        if let Some(budget) = self.accept_budget.as_mut() {
            *budget = budget.saturating_sub(1);
        }
        self.submitted.push(*msg);
        Ok(())
    }

    fn statistics(&self) -> EngineStatistics {
        EngineStatistics {
            tx_total: self.submitted.len() as u32,
            tx_attempt: self.submitted.len() as u32,
            ..EngineStatistics::default()
        }
    }
}

#[allow(dead_code)]
/// Timer based on `tokio::time::sleep` to drive delays in tests.
pub struct MockTimer {
    pub waited_ms: u32,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn new() -> Self {
        Self { waited_ms: 0 }
    }
}

impl TransportTimer for MockTimer {
    async fn delay_ms(&mut self, millis: u32) {
        self.waited_ms += millis;
        sleep(Duration::from_millis(millis as u64)).await;
    }
}
