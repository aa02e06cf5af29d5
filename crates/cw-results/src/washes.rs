//! JSON-lines wash log.

use crate::ingest::parse_timestamp;
use crate::types::WashEvent;
use crate::{ResultsError, ResultsResult};
use chrono::NaiveDateTime;
use cw_project::PlantConfig;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk form of one wash entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WashRecord {
    #[serde(alias = "wash_ts", alias = "date", alias = "fecha")]
    pub timestamp: String,
    #[serde(alias = "enfriador", alias = "equipo")]
    pub cooler: String,
    #[serde(default, alias = "tipo")]
    pub wash_type: String,
    #[serde(default, alias = "comentario")]
    pub comment: String,
    #[serde(default, alias = "usuario")]
    pub operator: String,
}

impl WashRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        cooler: impl Into<String>,
        wash_type: impl Into<String>,
        comment: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            cooler: cooler.into(),
            wash_type: wash_type.into(),
            comment: comment.into(),
            operator: operator.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WashLog {
    path: PathBuf,
}

impl WashLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all events sorted by time.
    ///
    /// A missing log is an empty history. Lines that do not parse as an entry,
    /// and entries with an unusable timestamp, are skipped; unknown cooler
    /// names are kept with `unit: None`.
    pub fn load(&self, config: &PlantConfig) -> ResultsResult<Vec<WashEvent>> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "wash log not found; no washes known");
            return Ok(Vec::new());
        }

        let content = fs::read(&self.path)?;
        let mut events = Vec::new();
        let mut unreadable = 0usize;
        let mut dropped = 0usize;
        for (idx, bytes) in content.split(|&b| b == b'\n').enumerate() {
            let record = match std::str::from_utf8(bytes) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => serde_json::from_str::<WashRecord>(line).ok(),
                Err(_) => None,
            };
            let Some(record) = record else {
                tracing::debug!(line = idx + 1, "unreadable wash entry");
                unreadable += 1;
                continue;
            };
            let Some(timestamp) = parse_timestamp(&record.timestamp) else {
                dropped += 1;
                continue;
            };
            events.push(WashEvent {
                unit: config.resolve_unit_name(&record.cooler).map(str::to_string),
                cooler: record.cooler.trim().to_string(),
                timestamp,
                wash_type: record.wash_type,
                comment: record.comment,
                operator: record.operator,
            });
        }

        if unreadable > 0 {
            tracing::warn!(unreadable, "unreadable wash entries skipped");
        }
        if dropped > 0 {
            tracing::warn!(dropped, "wash entries without a valid timestamp dropped");
        }
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    /// Append one entry, creating the log if needed.
    pub fn append(&self, record: &WashRecord) -> ResultsResult<()> {
        if parse_timestamp(&record.timestamp).is_none() {
            return Err(ResultsError::InvalidTimestamp(record.timestamp.clone()));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        tracing::info!(cooler = %record.cooler, timestamp = %record.timestamp, "wash registered");
        Ok(())
    }
}

/// Events that belong to one unit, in time order.
pub fn events_for<'a>(events: &'a [WashEvent], unit: &str) -> Vec<&'a WashEvent> {
    events
        .iter()
        .filter(|e| e.unit.as_deref() == Some(unit))
        .collect()
}
