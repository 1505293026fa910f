//! Timed send integration tests: retry of transient failures, deadline expiry
//! and immediate surfacing of non-transient errors.
mod helpers;

use helpers::{leak_shared, registry_guard, MockEngine, MockTimer};
use korri_can2040::{
    error::{SendTimeoutError, TransportError},
    transport::{
        can_frame::CanFrame,
        config::TransportConfig,
        engine_transport::Transport,
        registry::EngineInstance,
        traits::{frame_transport::SendStatus, timed_send::TimedSend},
        CAN_SEND_TIMEOUT_MS,
    },
};

type TinyTransport = Transport<MockEngine, 2, 1>;

fn running() -> TinyTransport {
    let config = TransportConfig::new(EngineInstance::FIRST, 1, 2);
    let mut transport = Transport::new(config, leak_shared());
    transport.begin().unwrap();
    transport
}

fn frame(id: u32) -> CanFrame {
    CanFrame::new_extended(id, &[1, 2, 3]).unwrap()
}

#[tokio::test]
/// A ready engine needs no retry.
async fn test_immediate_success() {
    let _guard = registry_guard();
    let mut transport = running();
    let mut timer = MockTimer::new();

    let status = transport
        .send_with_timeout(&frame(1), &mut timer, CAN_SEND_TIMEOUT_MS)
        .await
        .unwrap();
    assert_eq!(status, SendStatus::Submitted);
    assert_eq!(timer.waited_ms, 0);
}

#[tokio::test]
/// A transient rejection is retried until the engine takes the frame.
async fn test_retry_after_rejection() {
    let _guard = registry_guard();
    let mut transport = running();
    let mut timer = MockTimer::new();
    transport.engine_mut().unwrap().reject_next = 3;

    let status = transport
        .send_with_timeout(&frame(2), &mut timer, CAN_SEND_TIMEOUT_MS)
        .await
        .unwrap();
    assert_eq!(status, SendStatus::Submitted);
    assert_eq!(timer.waited_ms, 3);
    assert_eq!(transport.send_error_count(), 3);
    assert_eq!(transport.engine().unwrap().submitted_ids(), vec![2 | 0x8000_0000]);
}

#[tokio::test]
/// A busy engine with a full queue ends in a timeout.
async fn test_timeout_when_queue_stays_full() {
    let _guard = registry_guard();
    let mut transport = running();
    let mut timer = MockTimer::new();
    transport.engine_mut().unwrap().accepting = false;

    assert_eq!(transport.send(&frame(1)), Ok(SendStatus::Queued));
    let result = transport.send_with_timeout(&frame(2), &mut timer, 5).await;

    assert!(matches!(
        result,
        Err(SendTimeoutError::Timeout { elapsed_ms: 5 })
    ));
    assert_eq!(timer.waited_ms, 5);
    assert_eq!(transport.transmit_buffer_usage(), 1);
}

#[tokio::test]
/// Misuse is not retried.
async fn test_not_running_is_immediate() {
    let _guard = registry_guard();
    let mut transport = running();
    transport.stop();
    let mut timer = MockTimer::new();

    let result = transport
        .send_with_timeout(&frame(1), &mut timer, CAN_SEND_TIMEOUT_MS)
        .await;
    assert!(matches!(
        result,
        Err(SendTimeoutError::Transport(TransportError::NotRunning))
    ));
    assert_eq!(timer.waited_ms, 0);
}

#[tokio::test]
/// Draining between attempts moves queued frames out before the retry.
async fn test_drain_between_attempts() {
    let _guard = registry_guard();
    let mut transport = running();
    let mut timer = MockTimer::new();
    transport.engine_mut().unwrap().accepting = false;
    transport.send(&frame(1)).unwrap();
    assert!(matches!(
        transport.send(&frame(2)),
        Err(TransportError::QueueFull)
    ));

    // First attempt is refused; the poll after the delay drains frame 1, then
    // the retry submits frame 2 directly.
    {
        let engine = transport.engine_mut().unwrap();
        engine.accepting = true;
        engine.reject_next = 1;
    }
    let status = transport
        .send_with_timeout(&frame(2), &mut timer, CAN_SEND_TIMEOUT_MS)
        .await
        .unwrap();

    assert_eq!(status, SendStatus::Submitted);
    assert_eq!(timer.waited_ms, 1);
    assert_eq!(transport.transmit_buffer_usage(), 0);
    assert_eq!(transport.send_error_count(), 2);
    assert_eq!(
        transport.engine().unwrap().submitted_ids(),
        vec![1 | 0x8000_0000, 2 | 0x8000_0000]
    );
}
