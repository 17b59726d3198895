//! Job lifecycle events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    Queued,
    Started,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobEventKind {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobEventKind::Succeeded | JobEventKind::Failed | JobEventKind::TimedOut
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_id: Uuid,
    pub job_name: String,
    pub kind: JobEventKind,
    /// Failure description for `Failed` and `TimedOut`
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    pub fn new(job_id: Uuid, job_name: impl Into<String>, kind: JobEventKind) -> Self {
        Self {
            job_id,
            job_name: job_name.into(),
            kind,
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
