//! Fixed-capacity single-producer/single-consumer ring of [`CanFrame`]s.
//!
//! The producer and the consumer may live in different execution contexts
//! (notification handler vs. polling loop). Each index has exactly one writer:
//! `tail` belongs to the producer, `head` to the consumer. Slot contents are
//! published with a release store on the owning index and observed with an
//! acquire load on the opposite side, so no lock is ever taken and no
//! operation blocks.
//!
//! Indices run over `0..2 * N` and are reduced modulo `N` only when
//! addressing a slot; `(tail - head) mod 2N` is the fill level, which keeps
//! empty (`0`) and full (`N`) distinct without a flag for any capacity,
//! power of two or not.
//!
//! Counters are single-writer too and are bumped with a load/store pair, which
//! also compiles on cores without read-modify-write atomics (Cortex-M0+).
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::transport::can_frame::CanFrame;

//==================================================================================Constants
/// Recommended receive queue depth.
pub const DEFAULT_RX_CAPACITY: usize = 64;
/// Recommended transmit queue depth.
pub const DEFAULT_TX_CAPACITY: usize = 16;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: UnsafeCell<CanFrame> = UnsafeCell::new(CanFrame::EMPTY);

//==================================================================================FrameQueue
/// Lock-free SPSC frame ring with `N` slots.
pub struct FrameQueue<const N: usize> {
    slots: [UnsafeCell<CanFrame>; N],
    /// Next slot to read, in `0..2 * N`. Written by the consumer only.
    head: AtomicUsize,
    /// Next slot to write, in `0..2 * N`. Written by the producer only.
    tail: AtomicUsize,
    /// Frames accepted since the last clear. Producer-owned.
    pushed: AtomicU32,
    /// Frames refused because the ring was full. Producer-owned.
    dropped: AtomicU32,
    /// Highest fill level observed since the last clear. Producer-owned.
    peak: AtomicUsize,
}

// SAFETY: slot access is partitioned by the head/tail protocol. A slot in
// `head..tail` is only read by the consumer, a slot outside it only written by
// the producer, and the release/acquire pair on the indices orders those
// accesses. Callers uphold the single-producer/single-consumer contract: the
// transport pushes receive frames only from the registry trampoline bound to
// its engine instance and pops them only from its own polling methods.
unsafe impl<const N: usize> Sync for FrameQueue<N> {}

impl<const N: usize> Default for FrameQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameQueue<N> {
    const NON_ZERO_CAPACITY: () = assert!(
        N > 0 && N <= usize::MAX / 2,
        "FrameQueue capacity must be non-zero and below usize::MAX / 2"
    );
    const INDEX_SPAN: usize = 2 * N;

    /// Index following `index`, wrapping at `2 * N`.
    #[inline]
    const fn advance(index: usize) -> usize {
        if index + 1 == Self::INDEX_SPAN {
            0
        } else {
            index + 1
        }
    }

    /// Frames between `head` and `tail`.
    #[inline]
    const fn distance(head: usize, tail: usize) -> usize {
        if tail >= head {
            tail - head
        } else {
            Self::INDEX_SPAN - head + tail
        }
    }

    /// Create an empty queue. Usable in `static` initializers.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO_CAPACITY;
        Self {
            slots: [EMPTY_SLOT; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            pushed: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    //==================================================================================Producer side
    /// Append a frame. Never blocks.
    ///
    /// When the ring is full the queue is left unchanged, the drop counter is
    /// bumped, and the frame is handed back.
    pub fn try_push(&self, frame: CanFrame) -> Result<(), CanFrame> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        let used = Self::distance(head, tail);
        if used >= N {
            bump(&self.dropped);
            return Err(frame);
        }

        // SAFETY: the slot lies outside `head..tail`, so the consumer never
        // touches it until the release store below publishes it.
        unsafe { *self.slots[tail % N].get() = frame };
        self.tail.store(Self::advance(tail), Ordering::Release);

        bump(&self.pushed);
        if used + 1 > self.peak.load(Ordering::Relaxed) {
            self.peak.store(used + 1, Ordering::Relaxed);
        }
        Ok(())
    }

    //==================================================================================Consumer side
    /// Remove the oldest frame. Never blocks; `None` when empty.
    pub fn try_pop(&self) -> Option<CanFrame> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: the slot lies inside `head..tail`; the producer will not
        // reuse it before the release store below hands it back.
        let frame = unsafe { *self.slots[head % N].get() };
        self.head.store(Self::advance(head), Ordering::Release);
        Some(frame)
    }

    /// Copy of the oldest frame without removing it.
    pub fn peek(&self) -> Option<CanFrame> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        // SAFETY: same argument as `try_pop`.
        Some(unsafe { *self.slots[head % N].get() })
    }

    /// Discard every queued frame and zero the counters.
    ///
    /// Runs on the consumer side: indices realign by moving `head` onto `tail`.
    /// The counters are producer-owned, so the producer must be quiescent
    /// (engine stopped) for their reset to stick.
    pub fn clear(&self) {
        let tail = self.tail.load(Ordering::Acquire);
        self.head.store(tail, Ordering::Release);
        self.pushed.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.peak.store(0, Ordering::Relaxed);
    }

    //==================================================================================Observers
    /// Number of frames currently queued.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        Self::distance(head, tail).min(N)
    }

    /// `true` when no frame is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when the next push would be refused.
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Fixed number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Frames accepted since the last clear.
    pub fn pushed(&self) -> u32 {
        self.pushed.load(Ordering::Relaxed)
    }

    /// Frames refused since the last clear.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Highest fill level since the last clear.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

/// Increment a counter that has a single writer.
#[inline]
pub(crate) fn bump(counter: &AtomicU32) {
    let value = counter.load(Ordering::Relaxed);
    counter.store(value.wrapping_add(1), Ordering::Relaxed);
}
