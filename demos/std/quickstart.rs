//! # Quickstart Example
//!
//! Minimal host walkthrough of korri-can2040:
//! - Plug an engine into the transport
//! - Send frames (direct path and queued path)
//! - Poll and read received frames
//!
//! The engine here is a loopback: every submitted frame is echoed back as a
//! receive notification, the way a bus in loopback mode would.
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use korri_can2040::infra::codec::WireMessage;
use korri_can2040::transport::can_frame::CanFrame;
use korri_can2040::transport::config::TransportConfig;
use korri_can2040::transport::engine_transport::{DefaultTransport, TransportShared};
use korri_can2040::transport::registry::EngineInstance;
use korri_can2040::transport::traits::can_engine::{CanEngine, NotifyCallback, NotifyKind};

static SHARED: TransportShared = TransportShared::new();

/// Loopback engine that can hold `window` frames in flight.
struct LoopbackEngine {
    instance: EngineInstance,
    callback: NotifyCallback,
    in_flight: usize,
    window: usize,
}

impl LoopbackEngine {
    /// Complete every in-flight frame, as the bus would between two polls.
    fn complete_all(&mut self) {
        for _ in 0..self.in_flight {
            (self.callback)(self.instance, NotifyKind::TxComplete, &WireMessage::default());
        }
        self.in_flight = 0;
    }
}

impl CanEngine for LoopbackEngine {
    type Error = ();

    fn start(config: &TransportConfig, callback: NotifyCallback) -> Result<Self, Self::Error> {
        println!(
            "   engine {} started: {} bit/s, TX pin {}, RX pin {}",
            config.instance.number(),
            config.bitrate,
            config.tx_pin,
            config.rx_pin
        );
        Ok(Self {
            instance: config.instance,
            callback,
            in_flight: 0,
            window: 2,
        })
    }

    fn stop(&mut self) {
        println!("   engine stopped");
    }

    fn can_accept(&self) -> bool {
        self.in_flight < self.window
    }

    fn submit(&mut self, msg: &WireMessage) -> Result<(), Self::Error> {
        if !self.can_accept() {
            return Err(());
        }
        self.in_flight += 1;
        (self.callback)(self.instance, NotifyKind::RxComplete, msg);
        Ok(())
    }
}

fn main() {
    println!("=== korri-can2040 Quickstart ===\n");

    // ======================================================================
    // 1. Configure and start the transport
    // ======================================================================
    println!("1. Starting the transport");

    let config = TransportConfig::new(EngineInstance::FIRST, 4, 5);
    let mut transport: DefaultTransport<LoopbackEngine> = DefaultTransport::new(config, &SHARED);
    if let Err(err) = transport.begin() {
        println!("   begin failed: {err}");
        return;
    }

    // ======================================================================
    // 2. Send a burst: two frames go out directly, the rest are queued
    // ======================================================================
    println!("\n2. Sending a burst of five frames");

    for n in 0..5u8 {
        let frame = match CanFrame::new_standard(0x100 + n as u32, &[n, n * 2]) {
            Ok(frame) => frame,
            Err(err) => {
                println!("   invalid frame: {err}");
                continue;
            }
        };
        match transport.send(&frame) {
            Ok(status) => println!("   frame {:#05x}: {:?}", frame.id, status),
            Err(err) => println!("   frame {:#05x}: {err}", frame.id),
        }
    }

    // ======================================================================
    // 3. Poll: each poll drains queued frames and reports received ones
    // ======================================================================
    println!("\n3. Polling");

    for round in 0..3 {
        if let Some(engine) = transport.engine_mut() {
            engine.complete_all();
        }
        while transport.available() {
            if let Some(frame) = transport.next_frame() {
                println!(
                    "   round {round}: received {:#05x} ext={} rtr={} data={:02x?}",
                    frame.id,
                    frame.ext,
                    frame.rtr,
                    frame.payload()
                );
            }
        }
    }

    // ======================================================================
    // 4. Counters
    // ======================================================================
    println!("\n4. Status");
    let status = transport.status();
    println!("   sent: {}", status.stats.frames_sent);
    println!("   received: {}", status.stats.frames_received);
    println!("   send errors: {}", status.stats.send_errors);
    println!("   tx completed: {}", status.tx_completed);
    println!("   tx queue peak: {}", status.tx_peak);

    transport.stop();
}
