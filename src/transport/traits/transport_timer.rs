//! Asynchronous timer abstraction providing the delay used between attempts
//! of the timed send loop.

/// Timer trait abstraction; must remain thread-safe when applicable.
pub trait TransportTimer {
    /// Asynchronously wait for `millis` milliseconds.
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a;
}

/// [`TransportTimer`] driven by the embassy time driver.
#[cfg(feature = "embassy-time")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyTimer;

#[cfg(feature = "embassy-time")]
impl TransportTimer for EmbassyTimer {
    fn delay_ms<'a>(&'a mut self, millis: u32) -> impl core::future::Future<Output = ()> + 'a {
        embassy_time::Timer::after_millis(u64::from(millis))
    }
}
