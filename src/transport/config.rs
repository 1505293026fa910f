//! Deployment configuration for the transport and its engine.
use crate::transport::registry::EngineInstance;
use crate::transport::{CAN_BITRATE, DEFAULT_SYS_CLOCK_HZ};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Parameters handed to the engine on `begin()`.
pub struct TransportConfig {
    /// Engine instance (PIO block) driving the bus; selects the registry slot.
    pub instance: EngineInstance,
    /// GPIO driving the transceiver TX line.
    pub tx_pin: u8,
    /// GPIO sampling the transceiver RX line.
    pub rx_pin: u8,
    /// Bus bit rate in bit/s.
    pub bitrate: u32,
    /// System clock feeding the engine, in Hz.
    pub sys_clock_hz: u32,
}

impl TransportConfig {
    /// Configuration for the given engine instance and pins with the default
    /// bit rate and clock.
    pub const fn new(instance: EngineInstance, tx_pin: u8, rx_pin: u8) -> Self {
        Self {
            instance,
            tx_pin,
            rx_pin,
            bitrate: CAN_BITRATE,
            sys_clock_hz: DEFAULT_SYS_CLOCK_HZ,
        }
    }

    /// Replace the TX/RX pin pair.
    pub const fn with_pins(mut self, tx_pin: u8, rx_pin: u8) -> Self {
        self.tx_pin = tx_pin;
        self.rx_pin = rx_pin;
        self
    }

    /// Select another engine instance.
    pub const fn with_instance(mut self, instance: EngineInstance) -> Self {
        self.instance = instance;
        self
    }

    /// Override the bus bit rate.
    pub const fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    /// Override the engine clock.
    pub const fn with_sys_clock(mut self, sys_clock_hz: u32) -> Self {
        self.sys_clock_hz = sys_clock_hz;
        self
    }
}

impl Default for TransportConfig {
    /// Instance 0 on GPIO 1 (TX) / GPIO 2 (RX).
    fn default() -> Self {
        Self::new(EngineInstance::FIRST, 1, 2)
    }
}
