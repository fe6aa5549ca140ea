use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const MAX_LOG_ENTRIES: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub request_id: Uuid,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        component: impl Into<String>,
        request_id: Uuid,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            request_id,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Operator-facing record of relay outcomes: a bounded in-memory ring,
/// optionally mirrored to a JSONL file.
struct Journal {
    entries: VecDeque<LogEntry>,
    writer: Option<BufWriter<File>>,
}

impl Journal {
    fn push(&mut self, entry: LogEntry) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

#[derive(Clone)]
pub struct DiagnosticLog(Arc<Mutex<Journal>>);

impl DiagnosticLog {
    /// Log that appends every entry to `file_path`.
    pub fn to_file(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        Ok(Self::with_writer(Some(BufWriter::new(file))))
    }

    /// Log that only keeps entries in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_writer(None)
    }

    fn with_writer(writer: Option<BufWriter<File>>) -> Self {
        Self(Arc::new(Mutex::new(Journal {
            entries: VecDeque::with_capacity(64),
            writer,
        })))
    }

    /// A panic elsewhere while holding the lock must not silence the log.
    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Info => tracing::info!(
                component = %entry.component,
                request_id = %entry.request_id,
                "{}", entry.message
            ),
            LogLevel::Warn => tracing::warn!(
                component = %entry.component,
                request_id = %entry.request_id,
                "{}", entry.message
            ),
            LogLevel::Error => tracing::error!(
                component = %entry.component,
                request_id = %entry.request_id,
                detail = entry.detail.as_deref().unwrap_or(""),
                "{}", entry.message
            ),
        }
        self.journal().push(entry);
    }

    pub fn info(&self, component: &str, request_id: Uuid, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Info, component, request_id, message));
    }

    pub fn warn(&self, component: &str, request_id: Uuid, message: impl Into<String>) {
        self.record(LogEntry::new(LogLevel::Warn, component, request_id, message));
    }

    pub fn error(
        &self,
        component: &str,
        request_id: Uuid,
        message: impl Into<String>,
        detail: Option<String>,
    ) {
        let mut entry = LogEntry::new(LogLevel::Error, component, request_id, message);
        if let Some(detail) = detail {
            entry = entry.with_detail(detail);
        }
        self.record(entry);
    }

    /// Most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.journal().entries.iter().rev().take(limit).cloned().collect()
    }
}
