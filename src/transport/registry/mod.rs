//! Bounded registry routing engine notifications to their transport.
//!
//! The engine notifies through a plain function pointer and cannot carry a
//! context pointer, so each engine instance owns a fixed slot here. A slot
//! holds a `'static` reference to the [`NotificationSink`] of the transport
//! currently driving that instance, and a dedicated trampoline function
//! forwards the engine's notifications to it.
//!
//! Slot access happens inside a critical section that only copies the sink
//! reference out; the sink itself runs outside it and never blocks.
use core::cell::Cell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::error::RegistryError;
use crate::infra::codec::WireMessage;
use crate::transport::traits::can_engine::{NotifyCallback, NotifyKind};

//==================================================================================Constants
/// Number of engine instances (PIO blocks) that can run concurrently.
pub const MAX_ENGINES: usize = 3;

//==================================================================================EngineInstance
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Validated engine instance number (`0..MAX_ENGINES`).
pub struct EngineInstance(u8);

impl EngineInstance {
    /// Instance 0.
    pub const FIRST: EngineInstance = EngineInstance(0);

    /// Validate an instance number.
    pub const fn new(instance: u8) -> Result<Self, RegistryError> {
        if (instance as usize) < MAX_ENGINES {
            Ok(Self(instance))
        } else {
            Err(RegistryError::InvalidInstance { instance })
        }
    }

    /// Raw instance number.
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for EngineInstance {
    type Error = RegistryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

//==================================================================================NotificationSink
/// Receiver of engine notifications. Runs in the notification context: it must
/// be bounded, must not block, and must not allocate.
pub trait NotificationSink: Sync {
    fn on_notify(&self, kind: NotifyKind, msg: &WireMessage);
}

//==================================================================================Slots
type Slot = Mutex<CriticalSectionRawMutex, Cell<Option<&'static dyn NotificationSink>>>;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: Slot = Mutex::new(Cell::new(None));

static SLOTS: [Slot; MAX_ENGINES] = [EMPTY_SLOT; MAX_ENGINES];

fn trampoline_0(instance: EngineInstance, kind: NotifyKind, msg: &WireMessage) {
    route(0, instance, kind, msg);
}

fn trampoline_1(instance: EngineInstance, kind: NotifyKind, msg: &WireMessage) {
    route(1, instance, kind, msg);
}

fn trampoline_2(instance: EngineInstance, kind: NotifyKind, msg: &WireMessage) {
    route(2, instance, kind, msg);
}

static TRAMPOLINES: [NotifyCallback; MAX_ENGINES] = [trampoline_0, trampoline_1, trampoline_2];

/// The trampoline bound to a slot decides the destination; the instance the
/// engine reports is only cross-checked.
fn route(slot: usize, _reported: EngineInstance, kind: NotifyKind, msg: &WireMessage) {
    #[cfg(feature = "defmt")]
    if _reported.index() != slot {
        defmt::warn!(
            "Engine {} notified through slot {}",
            _reported.number(),
            slot
        );
    }
    deliver(slot, kind, msg);
}

fn deliver(slot: usize, kind: NotifyKind, msg: &WireMessage) {
    let sink = SLOTS[slot].lock(|cell| cell.get());
    match sink {
        Some(sink) => sink.on_notify(kind, msg),
        None => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Notification on unbound slot {} dropped", slot);
        }
    }
}

//==================================================================================Public API
/// Callback to hand to the engine driving `instance`.
pub fn callback_for(instance: EngineInstance) -> NotifyCallback {
    TRAMPOLINES[instance.index()]
}

/// Attach `sink` to the slot of `instance`.
///
/// Fails with [`RegistryError::SlotInUse`] while another sink is bound.
pub fn bind(
    instance: EngineInstance,
    sink: &'static dyn NotificationSink,
) -> Result<(), RegistryError> {
    SLOTS[instance.index()].lock(|cell| {
        if cell.get().is_some() {
            return Err(RegistryError::SlotInUse {
                instance: instance.number(),
            });
        }
        cell.set(Some(sink));
        Ok(())
    })
}

/// Release the slot of `instance`. Later notifications on it are ignored.
pub fn unbind(instance: EngineInstance) {
    SLOTS[instance.index()].lock(|cell| cell.set(None));
}

/// `true` while a sink listens on `instance`.
pub fn is_bound(instance: EngineInstance) -> bool {
    SLOTS[instance.index()].lock(|cell| cell.get().is_some())
}

/// Forward a notification to the sink bound to `instance`, as the engine's
/// trampoline would.
pub fn dispatch(instance: EngineInstance, kind: NotifyKind, msg: &WireMessage) {
    deliver(instance.index(), kind, msg);
}
