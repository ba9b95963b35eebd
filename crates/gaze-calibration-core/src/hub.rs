//! Rendezvous between the tracker's sample producer and the workflow loop.
//!
//! The hub owns the two pieces of shared state the workflow needs: the
//! most recent sample (for live overlays) and the capture window buffer (for
//! validation). Capture is gated by a flag so that only samples published
//! between [`SampleHub::open_window`] and [`SampleHub::close_window`] reach the
//! buffer. The flag lives under its own lock, held across the check and the
//! append on the producer side and across every flag change on the consumer
//! side, so no sample lands in a window that was already closed.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use parking_lot::Mutex;

use crate::{GazeSample, SampleWindowBuffer};

#[derive(Debug)]
pub struct SampleHub {
    latest: Mutex<Option<GazeSample>>,
    window: SampleWindowBuffer,
    /// Capture gate. Always taken before the window buffer's own lock.
    capturing: Mutex<bool>,
    disconnected: AtomicBool,
}

impl SampleHub {
    pub fn new(window_capacity: usize) -> Self {
        Self {
            latest: Mutex::new(None),
            window: SampleWindowBuffer::new(window_capacity),
            capturing: Mutex::new(false),
            disconnected: AtomicBool::new(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Producer side
    // ─────────────────────────────────────────────────────────────────────────

    /// Publish a sample from the tracker callback.
    ///
    /// Blocks only while the consumer opens, drains or discards the window.
    pub fn publish(&self, sample: GazeSample) {
        *self.latest.lock() = Some(sample);
        let capturing = self.capturing.lock();
        if *capturing {
            self.window.append(sample);
        }
    }

    /// Signal that the tracker went away.
    pub fn notify_disconnected(&self) {
        self.disconnected.store(true, Ordering::Release);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consumer side
    // ─────────────────────────────────────────────────────────────────────────

    /// Most recent sample, if any has arrived.
    pub fn latest(&self) -> Option<GazeSample> {
        *self.latest.lock()
    }

    /// Forget the most recent sample (e.g. when streaming restarts).
    pub fn reset_latest(&self) {
        *self.latest.lock() = None;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Clear the window and start capturing. Call at target onset.
    pub fn open_window(&self) {
        let mut capturing = self.capturing.lock();
        self.window.clear();
        *capturing = true;
    }

    /// Stop capturing and return everything captured since the window opened.
    pub fn close_window(&self) -> Vec<GazeSample> {
        let (samples, dropped) = {
            let mut capturing = self.capturing.lock();
            *capturing = false;
            let dropped = self.window.overwritten();
            (self.window.drain_all(), dropped)
        };
        if dropped > 0 {
            debug!(
                "capture window overflowed: kept {} samples, dropped {}",
                samples.len(),
                dropped
            );
        }
        samples
    }

    /// Stop capturing and throw the in-progress window away.
    pub fn discard_window(&self) {
        let mut capturing = self.capturing.lock();
        *capturing = false;
        self.window.clear();
    }

    pub fn is_capturing(&self) -> bool {
        *self.capturing.lock()
    }

    /// Read-only view of the capture buffer.
    pub fn window(&self) -> &SampleWindowBuffer {
        &self.window
    }
}

impl Default for SampleHub {
    fn default() -> Self {
        Self::new(1200)
    }
}
