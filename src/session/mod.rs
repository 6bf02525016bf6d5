//! One interactive dialog: its identity, its transcript sink, and the
//! controller that drives it.
//!
//! - **commands** — line classification (exit / reset / `/order` / FAQ / LLM).
//! - **controller** — the read–classify–act loop and its state machine.
//! - **transcript** — JSON-lines sink, one file per session.

pub mod commands;
pub mod controller;
pub mod transcript;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::llm::{LlmUsage, Role};
use transcript::{EntryLevel, TranscriptEntry, TranscriptSink};

pub use controller::{SessionController, Turn};

/// Primer used when no system prompt file is configured or readable.
pub const DEFAULT_PRIMER: &str = "Отвечай кратко и по делу. Если не уверен — так и скажи.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    /// Ended by an exit keyword.
    Terminated,
    /// Ended by end-of-input, a read error, or Ctrl-C.
    Interrupted,
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    transcript: TranscriptSink,
}

impl Session {
    /// Allocate a fresh id and open `<log_dir>/session_<id>.jsonl`.
    pub fn open(log_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(log_dir).map_err(|e| {
            AppError::Transcript(format!("cannot create log dir {}: {e}", log_dir.display()))
        })?;
        let id = Uuid::new_v4();
        let transcript = TranscriptSink::open(log_dir.join(format!("session_{id}.jsonl")))?;
        info!(session_id = %id, path = %transcript.path().display(), "session opened");
        Ok(Self { id, created_at: Utc::now(), transcript })
    }

    pub fn transcript_path(&self) -> &Path {
        self.transcript.path()
    }

    pub fn is_closed(&self) -> bool {
        self.transcript.is_closed()
    }

    /// Append one transcript entry. Failures are logged, not propagated:
    /// losing a transcript line must not end the conversation.
    pub fn record(
        &mut self,
        level: EntryLevel,
        role: Role,
        content: &str,
        usage: Option<LlmUsage>,
    ) {
        let entry = TranscriptEntry::now(level, role, content).with_usage(usage);
        if let Err(e) = self.transcript.append(&entry) {
            warn!(session_id = %self.id, error = %e, "transcript write failed");
        }
    }

    pub fn close(&mut self) -> Result<(), AppError> {
        self.transcript.close()
    }
}

/// Read the primer from `path`, falling back to [`DEFAULT_PRIMER`] when the
/// path is unset, unreadable, or blank.
pub fn load_primer(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return DEFAULT_PRIMER.to_string();
    };
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!(path = %path.display(), "system prompt file is empty; using built-in primer");
            DEFAULT_PRIMER.to_string()
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "cannot read system prompt file; using built-in primer"
            );
            DEFAULT_PRIMER.to_string()
        }
    }
}
