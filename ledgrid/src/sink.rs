//! Hand-off point for finished frames.
//!
//! A [`FrameSink`] receives a snapshot of the byte matrix after every
//! recompute. Real hardware transport lives outside this crate.

use crate::pack::ByteMatrix;

pub trait FrameSink {
    fn send(&mut self, frame: &ByteMatrix);
}

/// Discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn send(&mut self, _frame: &ByteMatrix) {}
}

/// Logs receipt of each frame and otherwise drops it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink {
    received: u64,
}

impl LogSink {
    pub fn received(&self) -> u64 {
        self.received
    }
}

impl FrameSink for LogSink {
    fn send(&mut self, frame: &ByteMatrix) {
        self.received += 1;
        log::info!(
            "received frame #{} ({}x{} registers): {:?}",
            self.received,
            frame.rows(),
            frame.registers(),
            frame.as_bytes()
        );
    }
}

/// Keeps only the most recent frame until it is taken.
#[derive(Debug, Default, Clone)]
pub struct LatestFrame {
    pending: Option<ByteMatrix>,
}

impl LatestFrame {
    pub fn take(&mut self) -> Option<ByteMatrix> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl FrameSink for LatestFrame {
    fn send(&mut self, frame: &ByteMatrix) {
        self.pending = Some(frame.clone());
    }
}

/// Collects every frame; handy in tests.
impl FrameSink for Vec<ByteMatrix> {
    fn send(&mut self, frame: &ByteMatrix) {
        self.push(frame.clone());
    }
}
