// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only sinks for agent status and result logs.
//!
//! Each sink owns one buffered file handle behind a mutex. A file removed by
//! log rotation is re-created on the next write.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("log sink closed")]
    Closed,

    #[error("log sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct LogSink {
    path: PathBuf,
    /// `None` once closed.
    writer: Mutex<Option<BufWriter<File>>>,
}

impl LogSink {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self { path, writer: Mutex::new(Some(BufWriter::new(file))) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `bytes` as one unit; concurrent writes never interleave.
    pub fn write(&self, bytes: &[u8]) -> Result<(), SinkError> {
        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(SinkError::Closed)?;
        if !self.path.exists() {
            debug!(path = %self.path.display(), "log file removed, reopening");
            // Whatever was buffered belonged to the rotated file.
            if let Err(e) = writer.flush() {
                warn!(path = %self.path.display(), error = %e, "flush to rotated log file failed");
            }
            *writer = BufWriter::new(open_append(&self.path)?);
        }
        writer.write_all(bytes)?;
        Ok(())
    }

    /// Append `line` followed by a newline.
    pub fn write_line(&self, line: &[u8]) -> Result<(), SinkError> {
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line);
        record.push(b'\n');
        self.write(&record)
    }

    pub fn flush(&self) -> Result<(), SinkError> {
        let mut guard = self.writer.lock();
        let writer = guard.as_mut().ok_or(SinkError::Closed)?;
        writer.flush()?;
        Ok(())
    }

    /// Flush and release the file. Later writes fail `Closed`.
    pub fn close(&self) -> Result<(), SinkError> {
        let mut guard = self.writer.lock();
        match guard.take() {
            Some(mut writer) => Ok(writer.flush()?),
            None => Err(SinkError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.writer.lock().is_none()
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Flush `sinks` every `period` until cancelled, then once more.
pub async fn run_flusher(sinks: Vec<Arc<LogSink>>, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => flush_all(&sinks),
        }
    }
    flush_all(&sinks);
}

fn flush_all(sinks: &[Arc<LogSink>]) {
    for sink in sinks {
        match sink.flush() {
            Ok(()) | Err(SinkError::Closed) => {}
            Err(e) => warn!(path = %sink.path().display(), error = %e, "log sink flush failed"),
        }
    }
}

#[cfg(test)]
#[path = "logsink_tests.rs"]
mod tests;
