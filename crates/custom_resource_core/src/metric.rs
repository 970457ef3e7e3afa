use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::MetricSpec;

/// Anonymous usage record sent when the stack is launched or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricRecord {
    #[serde(rename = "Solution")]
    pub solution: String,
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(rename = "TimeStamp")]
    pub timestamp: String,
    #[serde(rename = "Data")]
    pub data: MetricData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricData {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(flatten)]
    pub event: MetricEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MetricEvent {
    Launched(String),
    Deleted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEventKind {
    Launched,
    Deleted,
}

impl MetricRecord {
    pub fn new(spec: &MetricSpec, kind: MetricEventKind, now: DateTime<Utc>) -> Self {
        let at = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let event = match kind {
            MetricEventKind::Launched => MetricEvent::Launched(at),
            MetricEventKind::Deleted => MetricEvent::Deleted(at),
        };

        Self {
            solution: spec.solution_id.clone(),
            uuid: spec.uuid.clone(),
            timestamp: format_metric_timestamp(now),
            data: MetricData {
                version: spec.version.clone(),
                event,
            },
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS.d` with a single tenths-of-a-second digit.
pub fn format_metric_timestamp(now: DateTime<Utc>) -> String {
    let tenths = (now.nanosecond() % 1_000_000_000) / 100_000_000;
    format!("{}.{tenths}", now.format("%Y-%m-%d %H:%M:%S"))
}
