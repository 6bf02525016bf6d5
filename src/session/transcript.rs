//! Per-session transcript — one JSON object per line, append-only.
//!
//! ```text
//! {"timestamp":"2026-10-14T09:12:03.511Z","level":"info","role":"user","content":"/order 17"}
//! {"timestamp":"2026-10-14T09:12:07.090Z","level":"info","role":"assistant","content":"...","usage":{...}}
//! ```
//!
//! The sink is an explicit handle owned by the session. Every entry is
//! flushed as soon as it is written; nothing is ever rewritten in place.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::llm::{LlmUsage, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub level: EntryLevel,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

impl TranscriptEntry {
    pub fn now(level: EntryLevel, role: Role, content: impl Into<String>) -> Self {
        Self { timestamp: Utc::now(), level, role, content: content.into(), usage: None }
    }

    pub fn with_usage(mut self, usage: Option<LlmUsage>) -> Self {
        self.usage = usage;
        self
    }
}

#[derive(Debug)]
pub struct TranscriptSink {
    path: PathBuf,
    /// `None` once closed.
    writer: Option<BufWriter<File>>,
}

impl TranscriptSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AppError::Transcript(format!("cannot open {}: {e}", path.display())))?;
        Ok(Self { path, writer: Some(BufWriter::new(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub fn append(&mut self, entry: &TranscriptEntry) -> Result<(), AppError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| AppError::Transcript(format!("{} is closed", self.path.display())))?;
        let line = serde_json::to_string(entry)
            .map_err(|e| AppError::Transcript(format!("serialise entry: {e}")))?;
        writeln!(writer, "{line}")
            .and_then(|_| writer.flush())
            .map_err(|e| AppError::Transcript(format!("cannot write {}: {e}", self.path.display())))
    }

    /// Flush and release the file. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), AppError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                AppError::Transcript(format!("cannot flush {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }
}

impl Drop for TranscriptSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Read a transcript file back into entries.
pub fn read_entries(path: &Path) -> Result<Vec<TranscriptEntry>, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Transcript(format!("cannot read {}: {e}", path.display())))?;
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).map_err(|e| {
                AppError::Transcript(format!("malformed line in {}: {e}", path.display()))
            })
        })
        .collect()
}
