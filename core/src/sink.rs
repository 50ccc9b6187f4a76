//! Destinations for rendered trace blocks.
//!
//! A block is handed over in a single `write_block` call. Sinks that share a
//! writer serialize whole blocks, so traces from concurrent calls never
//! interleave mid-block.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// `tracing` target used by `TracingSink`.
pub const TRACE_TARGET: &str = "trace_core::http";

/// Append-only destination for trace blocks.
pub trait LogSink: Send + Sync {
    fn write_block(&self, block: &str);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn write_block(&self, block: &str) {
        (**self).write_block(block);
    }
}

/// Emits every block as one INFO event under [`TRACE_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_block(&self, block: &str) {
        tracing::info!(target: TRACE_TARGET, "{}", block.trim_end());
    }
}

/// Writes blocks verbatim to an `io::Write`, flushing after each one.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_block(&self, block: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let written = writer
            .write_all(block.as_bytes())
            .and_then(|()| writer.flush());
        if let Err(err) = written {
            tracing::warn!(error = %err, "failed to write trace block");
        }
    }
}

/// Keeps blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All blocks concatenated in write order.
    pub fn contents(&self) -> String {
        self.blocks().concat()
    }

    pub fn clear(&self) {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn write_block(&self, block: &str) {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block.to_string());
    }
}
