//! Polling transport bridging an interrupt-driven [`CanEngine`] to the
//! application.
//!
//! * Receive: the engine's notification context decodes each received message
//!   and pushes it into the receive queue of [`TransportShared`]; the
//!   application polls [`Transport::available`] and pops with
//!   [`Transport::next_frame`].
//! * Transmit: [`Transport::send`] submits directly when the engine can take
//!   a frame, otherwise parks the frame in the transmit queue. Every
//!   `available()` call drains that queue while the engine keeps accepting.
//!
//! A frame sent on the direct path can overtake frames still waiting in the
//! transmit queue. Callers needing strict global ordering must stick to one
//! path.
//!
//! ```text
//! Stopped --begin()--> Running --stop()--> Stopped
//!                      Running --reset()--> Stopped --> Running
//! ```
use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::error::{RegistryError, TransportError};
use crate::infra::codec::{decode, traits::WireFormat, WireMessage};
use crate::infra::queue::{bump, FrameQueue, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY};
use crate::transport::can_frame::CanFrame;
use crate::transport::config::TransportConfig;
use crate::transport::registry::{self, EngineInstance, NotificationSink};
use crate::transport::traits::can_engine::{CanEngine, EngineStatistics, NotifyKind};
use crate::transport::traits::frame_transport::{FrameTransport, SendStatus};

//==================================================================================TransportShared
/// State reachable from the notification context: the receive queue and the
/// counters the notification handler maintains.
///
/// Lives in a `static` (or any `'static` storage) so the engine registry can
/// hold a reference to it. One instance serves exactly one running transport:
/// `begin()` claims it and `stop()` releases it.
pub struct TransportShared<const RX: usize = DEFAULT_RX_CAPACITY> {
    rx: FrameQueue<RX>,
    /// Set while a running transport owns this state.
    claimed: Mutex<CriticalSectionRawMutex, Cell<bool>>,
    /// Error notifications since the last `begin()`. Written by the handler only.
    engine_errors: AtomicU32,
    /// Transmit-complete notifications since the last `begin()`. Written by the handler only.
    tx_completed: AtomicU32,
}

impl<const RX: usize> Default for TransportShared<RX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RX: usize> TransportShared<RX> {
    pub const fn new() -> Self {
        Self {
            rx: FrameQueue::new(),
            claimed: Mutex::new(Cell::new(false)),
            engine_errors: AtomicU32::new(0),
            tx_completed: AtomicU32::new(0),
        }
    }

    /// Receive queue filled by the notification handler.
    pub fn rx_queue(&self) -> &FrameQueue<RX> {
        &self.rx
    }

    /// Error notifications since the last `begin()`.
    pub fn engine_errors(&self) -> u32 {
        self.engine_errors.load(Ordering::Relaxed)
    }

    /// Transmit-complete notifications since the last `begin()`.
    pub fn tx_completed(&self) -> u32 {
        self.tx_completed.load(Ordering::Relaxed)
    }

    /// `true` while a running transport owns this state.
    pub fn is_claimed(&self) -> bool {
        self.claimed.lock(Cell::get)
    }

    /// Take ownership; `false` when another transport already holds it.
    fn claim(&self) -> bool {
        self.claimed.lock(|claimed| !claimed.replace(true))
    }

    fn release(&self) {
        self.claimed.lock(|claimed| claimed.set(false));
    }

    /// Empty the receive queue and zero the counters. Caller holds the claim
    /// and its engine is stopped.
    fn reset(&self) {
        self.rx.clear();
        self.engine_errors.store(0, Ordering::Relaxed);
        self.tx_completed.store(0, Ordering::Relaxed);
    }
}

impl<const RX: usize> NotificationSink for TransportShared<RX> {
    fn on_notify(&self, kind: NotifyKind, msg: &WireMessage) {
        match kind {
            NotifyKind::RxComplete => {
                // Overflow is absorbed by the queue's drop counter.
                if self.rx.try_push(decode(msg)).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::trace!("RX queue full, frame {:x} dropped", msg.id);
                }
            }
            // Sent frames are already counted at submit time.
            NotifyKind::TxComplete => bump(&self.tx_completed),
            NotifyKind::Error => {
                bump(&self.engine_errors);
                #[cfg(feature = "defmt")]
                defmt::warn!("CAN engine reported an error");
            }
        }
    }
}

//==================================================================================Statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Counters maintained by the polling side; zeroed by every `begin()`.
pub struct TransportStats {
    /// Frames handed to the engine (direct path and drain).
    pub frames_sent: u32,
    /// Frames handed to the application.
    pub frames_received: u32,
    /// `send()` calls that failed.
    pub send_errors: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Snapshot of the transport counters and buffer usage.
pub struct TransportStatus {
    pub running: bool,
    pub stats: TransportStats,
    /// Received frames dropped on a full receive queue.
    pub receive_errors: u32,
    pub engine_errors: u32,
    pub tx_completed: u32,
    pub rx_usage: usize,
    pub rx_peak: usize,
    pub tx_usage: usize,
    pub tx_peak: usize,
}

//==================================================================================Transport
/// Frame transport over a [`CanEngine`], with `RX`/`TX` frame queues.
pub struct Transport<
    E: CanEngine,
    const RX: usize = DEFAULT_RX_CAPACITY,
    const TX: usize = DEFAULT_TX_CAPACITY,
> {
    config: TransportConfig,
    shared: &'static TransportShared<RX>,
    tx: FrameQueue<TX>,
    /// `Some` exactly while Running.
    engine: Option<E>,
    /// Registry slot held while Running. The shared state is claimed exactly
    /// while this is `Some`.
    bound: Option<EngineInstance>,
    stats: TransportStats,
}

/// Transport with the recommended queue depths.
pub type DefaultTransport<E> = Transport<E, DEFAULT_RX_CAPACITY, DEFAULT_TX_CAPACITY>;

impl<E: CanEngine, const RX: usize, const TX: usize> Transport<E, RX, TX> {
    /// Create a stopped transport. Call [`begin`](Self::begin) to start the engine.
    pub fn new(config: TransportConfig, shared: &'static TransportShared<RX>) -> Self {
        Self {
            config,
            shared,
            tx: FrameQueue::new(),
            engine: None,
            bound: None,
            stats: TransportStats::default(),
        }
    }

    //==================================================================================Configuration
    /// Current configuration. Changes apply on the next `begin()`/`reset()`.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Replace the whole configuration.
    pub fn set_config(&mut self, config: TransportConfig) {
        self.config = config;
    }

    /// Select the TX/RX pins.
    pub fn set_pins(&mut self, tx_pin: u8, rx_pin: u8) {
        self.config = self.config.with_pins(tx_pin, rx_pin);
    }

    /// Select the engine instance (PIO block).
    pub fn set_instance(&mut self, instance: u8) -> Result<(), RegistryError> {
        self.config = self.config.with_instance(EngineInstance::new(instance)?);
        Ok(())
    }

    //==================================================================================Lifecycle
    /// Claim the shared state, clear both queues, zero the statistics, bind
    /// the registry slot, and start the engine. Stopped → Running.
    ///
    /// Fails with [`TransportError::SharedInUse`] while another transport runs
    /// on the same [`TransportShared`]; its queue is left untouched.
    pub fn begin(&mut self) -> Result<(), TransportError<E::Error>> {
        if self.engine.is_some() {
            return Err(TransportError::AlreadyRunning);
        }
        if !self.shared.claim() {
            #[cfg(feature = "defmt")]
            defmt::warn!("CAN transport shared state already claimed");
            return Err(TransportError::SharedInUse);
        }

        self.stats = TransportStats::default();
        self.tx.clear();
        self.shared.reset();

        let instance = self.config.instance;
        if let Err(err) = registry::bind(instance, self.shared) {
            self.shared.release();
            return Err(err.into());
        }
        self.bound = Some(instance);

        match E::start(&self.config, registry::callback_for(instance)) {
            Ok(engine) => {
                self.engine = Some(engine);
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "CAN transport running on engine {} ({} bit/s)",
                    instance.number(),
                    self.config.bitrate
                );
                Ok(())
            }
            Err(err) => {
                registry::unbind(instance);
                self.bound = None;
                self.shared.release();
                #[cfg(feature = "defmt")]
                defmt::warn!("CAN engine {} failed to start", instance.number());
                Err(TransportError::EngineStart(err))
            }
        }
    }

    /// Stop the engine, release the registry slot and the shared state.
    /// Running → Stopped.
    /// Queued frames stay in place until the next `begin()`.
    pub fn stop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
            #[cfg(feature = "defmt")]
            defmt::info!("CAN transport stopped");
        }
        if let Some(instance) = self.bound.take() {
            registry::unbind(instance);
            self.shared.release();
        }
    }

    /// Stop, empty both queues, drop the engine, and start a fresh one with the
    /// current configuration.
    pub fn reset(&mut self) -> Result<(), TransportError<E::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("CAN transport reset");
        self.stop();
        // The receive queue is cleared by `begin()` once the claim is retaken.
        self.tx.clear();
        self.begin()
    }

    /// `true` while Running.
    pub fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    //==================================================================================Polling
    /// Drain the transmit queue into the engine, then report whether a
    /// received frame is waiting.
    pub fn available(&mut self) -> bool {
        self.drain_tx();
        !self.shared.rx_queue().is_empty()
    }

    /// Pop the oldest received frame. `None` when the queue is empty; the
    /// queue is left untouched in that case.
    pub fn next_frame(&mut self) -> Option<CanFrame> {
        let frame = self.shared.rx_queue().try_pop()?;
        self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
        Some(frame)
    }

    /// Send a frame: direct submit when the engine can take it, otherwise
    /// park it in the transmit queue.
    ///
    /// # Errors
    ///
    /// - [`TransportError::NotRunning`] before `begin()`
    /// - [`TransportError::EngineRejected`] when the engine refuses a direct submit
    /// - [`TransportError::QueueFull`] when the engine is busy and the queue is full
    pub fn send(&mut self, frame: &CanFrame) -> Result<SendStatus, TransportError<E::Error>> {
        let Some(engine) = self.engine.as_mut() else {
            return Err(TransportError::NotRunning);
        };

        if engine.can_accept() {
            match engine.submit(&frame.to_wire()) {
                Ok(()) => {
                    self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
                    Ok(SendStatus::Submitted)
                }
                Err(err) => {
                    self.stats.send_errors = self.stats.send_errors.wrapping_add(1);
                    Err(TransportError::EngineRejected(err))
                }
            }
        } else if self.tx.try_push(*frame).is_ok() {
            Ok(SendStatus::Queued)
        } else {
            self.stats.send_errors = self.stats.send_errors.wrapping_add(1);
            Err(TransportError::QueueFull)
        }
    }

    /// Submit queued frames in order while the engine accepts them. A refused
    /// frame stays at the head for the next poll.
    fn drain_tx(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        while engine.can_accept() {
            let Some(frame) = self.tx.peek() else {
                break;
            };
            if engine.submit(&frame.to_wire()).is_err() {
                #[cfg(feature = "defmt")]
                defmt::debug!("Engine refused queued frame {:x}", frame.id);
                break;
            }
            self.tx.try_pop();
            self.stats.frames_sent = self.stats.frames_sent.wrapping_add(1);
        }
    }

    //==================================================================================Counters
    /// Frames handed to the application since the last `begin()`.
    pub fn received_count(&self) -> u32 {
        self.stats.frames_received
    }

    /// Frames handed to the engine since the last `begin()`.
    pub fn sent_count(&self) -> u32 {
        self.stats.frames_sent
    }

    /// Failed `send()` calls since the last `begin()`.
    pub fn send_error_count(&self) -> u32 {
        self.stats.send_errors
    }

    /// Received frames dropped on a full receive queue.
    pub fn receive_error_count(&self) -> u32 {
        self.shared.rx_queue().dropped()
    }

    /// Error notifications reported by the engine.
    pub fn engine_error_count(&self) -> u32 {
        self.shared.engine_errors()
    }

    /// Transmit-complete notifications reported by the engine.
    pub fn tx_completed_count(&self) -> u32 {
        self.shared.tx_completed()
    }

    /// Polling-side statistics.
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Frames waiting in the receive queue.
    pub fn receive_buffer_usage(&self) -> usize {
        self.shared.rx_queue().len()
    }

    /// Frames waiting in the transmit queue.
    pub fn transmit_buffer_usage(&self) -> usize {
        self.tx.len()
    }

    /// Highest receive queue fill level since the last `begin()`.
    pub fn receive_buffer_peak(&self) -> usize {
        self.shared.rx_queue().peak()
    }

    /// Highest transmit queue fill level since the last `begin()`.
    pub fn transmit_buffer_peak(&self) -> usize {
        self.tx.peak()
    }

    /// Snapshot of every counter.
    pub fn status(&self) -> TransportStatus {
        TransportStatus {
            running: self.is_running(),
            stats: self.stats,
            receive_errors: self.receive_error_count(),
            engine_errors: self.engine_error_count(),
            tx_completed: self.tx_completed_count(),
            rx_usage: self.receive_buffer_usage(),
            rx_peak: self.receive_buffer_peak(),
            tx_usage: self.transmit_buffer_usage(),
            tx_peak: self.transmit_buffer_peak(),
        }
    }

    //==================================================================================Engine access
    /// Engine-side counters; `None` while Stopped.
    pub fn engine_statistics(&self) -> Option<EngineStatistics> {
        self.engine.as_ref().map(CanEngine::statistics)
    }

    /// Running engine, for engine-specific calls.
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Running engine, mutably.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }
}

impl<E: CanEngine, const RX: usize, const TX: usize> Drop for Transport<E, RX, TX> {
    fn drop(&mut self) {
        self.stop();
    }
}

//==================================================================================FrameTransport
impl<E: CanEngine, const RX: usize, const TX: usize> FrameTransport for Transport<E, RX, TX> {
    type Error = TransportError<E::Error>;

    fn available(&mut self) -> bool {
        Transport::available(self)
    }

    fn next_frame(&mut self) -> Option<CanFrame> {
        Transport::next_frame(self)
    }

    fn send(&mut self, frame: &CanFrame) -> Result<SendStatus, Self::Error> {
        Transport::send(self, frame)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        Transport::reset(self)
    }

    fn received_count(&self) -> u32 {
        Transport::received_count(self)
    }

    fn sent_count(&self) -> u32 {
        Transport::sent_count(self)
    }

    fn send_error_count(&self) -> u32 {
        Transport::send_error_count(self)
    }
}
