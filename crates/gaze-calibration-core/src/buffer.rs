//! Fixed-capacity, overwrite-on-full sample ring.
//!
//! One producer (the tracker callback) appends, one consumer (the workflow
//! loop) drains or peeks. Both sides hold the lock only long enough to touch
//! the ring; the producer never waits for the consumer to make room.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::GazeSample;

#[derive(Debug)]
struct Ring {
    samples: VecDeque<GazeSample>,
    overwritten: usize,
}

/// Ring buffer of gaze samples with overwrite-oldest semantics.
#[derive(Debug)]
pub struct SampleWindowBuffer {
    ring: Mutex<Ring>,
    cap: usize,
}

impl SampleWindowBuffer {
    /// Create an empty buffer holding up to `capacity` samples.
    ///
    /// A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                samples: VecDeque::with_capacity(cap),
                overwritten: 0,
            }),
            cap,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn append(&self, sample: GazeSample) {
        let mut ring = self.ring.lock();
        if ring.samples.len() == self.cap {
            ring.samples.pop_front();
            ring.overwritten += 1;
        }
        ring.samples.push_back(sample);
    }

    /// Take every buffered sample in arrival order, leaving the buffer empty.
    pub fn drain_all(&self) -> Vec<GazeSample> {
        let mut ring = self.ring.lock();
        ring.overwritten = 0;
        ring.samples.drain(..).collect()
    }

    /// Copy every buffered sample in arrival order without removing them.
    pub fn peek_all(&self) -> Vec<GazeSample> {
        self.ring.lock().samples.iter().copied().collect()
    }

    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        ring.samples.clear();
        ring.overwritten = 0;
    }

    pub fn len(&self) -> usize {
        self.ring.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Samples evicted by overwrite since the last drain or clear.
    pub fn overwritten(&self) -> usize {
        self.ring.lock().overwritten
    }
}
