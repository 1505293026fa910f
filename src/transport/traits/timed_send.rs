//! `FrameTransport` extension providing a bounded-wait send: the frame is
//! retried while the failure is transient, giving the transmit queue a chance
//! to drain between attempts, until the deadline expires.
//!
//! The core `send()` never waits; this helper is the opt-in layer for callers
//! that prefer trading latency for delivery.
use crate::{
    error::{SendTimeoutError, TransientError},
    transport::can_frame::CanFrame,
    transport::traits::{
        frame_transport::{FrameTransport, SendStatus},
        transport_timer::TransportTimer,
    },
    transport::SEND_RETRY_INTERVAL_MS,
};
use futures_util::Future;

/// Trait extending `FrameTransport` with a send-with-deadline helper.
pub trait TimedSend: FrameTransport
where
    <Self as FrameTransport>::Error: TransientError,
{
    /// Send `frame`, retrying transient failures every
    /// [`SEND_RETRY_INTERVAL_MS`] until `timeout_ms` has elapsed.
    ///
    /// Between attempts `available()` is polled so queued frames reach the
    /// engine and free room in the transmit queue. Received frames stay queued.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`SendTimeoutError::Timeout`] when every attempt failed transiently
    /// - [`SendTimeoutError::Transport`] on the first non-transient failure
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use korri_can2040::transport::{traits::timed_send::TimedSend, CAN_SEND_TIMEOUT_MS};
    ///
    /// transport
    ///     .send_with_timeout(&frame, &mut timer, CAN_SEND_TIMEOUT_MS)
    ///     .await?;
    /// ```
    fn send_with_timeout<'a, T: TransportTimer>(
        &'a mut self,
        frame: &'a CanFrame,
        timer: &'a mut T,
        timeout_ms: u32,
    ) -> impl Future<Output = Result<SendStatus, SendTimeoutError<Self::Error>>> + 'a;
}

impl<X: FrameTransport> TimedSend for X
where
    X::Error: TransientError,
{
    fn send_with_timeout<'a, T: TransportTimer>(
        &'a mut self,
        frame: &'a CanFrame,
        timer: &'a mut T,
        timeout_ms: u32,
    ) -> impl Future<Output = Result<SendStatus, SendTimeoutError<Self::Error>>> + 'a {
        async move {
            let mut elapsed_ms: u32 = 0;
            loop {
                match self.send(frame) {
                    Ok(status) => return Ok(status),
                    Err(err) if !err.is_transient() => {
                        return Err(SendTimeoutError::Transport(err));
                    }
                    Err(_) if elapsed_ms >= timeout_ms => {
                        return Err(SendTimeoutError::Timeout { elapsed_ms });
                    }
                    Err(_) => {}
                }

                timer.delay_ms(SEND_RETRY_INTERVAL_MS).await;
                elapsed_ms = elapsed_ms.saturating_add(SEND_RETRY_INTERVAL_MS);
                // Drain side effect only; received frames are left for the caller.
                let _ = self.available();
            }
        }
    }
}
