//! Daily visit queue
//!
//! Each visit gets one queue entry per day with a branch-scoped token
//! number. The status machine is deliberately permissive: front-desk staff
//! move entries in any direction, including re-opening a completed visit,
//! so there is no transition table to fight. Status changes never touch
//! charge or payment data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{QueueEntryId, VisitId};

use crate::error::BillingError;

/// Where a visit stands in today's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    Next,
    InRoom,
    Completed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::Next => "next",
            QueueStatus::InRoom => "in_room",
            QueueStatus::Completed => "completed",
        }
    }

    /// All statuses, in pipeline order
    pub fn all() -> [QueueStatus; 4] {
        [
            QueueStatus::Waiting,
            QueueStatus::Next,
            QueueStatus::InRoom,
            QueueStatus::Completed,
        ]
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueueStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(QueueStatus::Waiting),
            "next" => Ok(QueueStatus::Next),
            "in_room" => Ok(QueueStatus::InRoom),
            "completed" => Ok(QueueStatus::Completed),
            other => Err(BillingError::validation(format!(
                "unknown queue status: {other}"
            ))),
        }
    }
}

/// A visit's place in the daily walk-in queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Unique identifier
    pub id: QueueEntryId,
    /// Visit this entry belongs to
    pub visit_id: VisitId,
    /// Service date the token was issued for
    pub entry_date: NaiveDate,
    /// Branch-scoped sequential token number
    pub token_no: i64,
    /// Current queue status
    pub status: QueueStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Creates a new entry in the Waiting state
    pub fn new(visit_id: VisitId, entry_date: NaiveDate, token_no: i64) -> Self {
        let now = Utc::now();
        Self {
            id: QueueEntryId::new_v7(),
            visit_id,
            entry_date,
            token_no,
            status: QueueStatus::Waiting,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the entry to a new status; any transition is allowed
    pub fn set_status(&mut self, status: QueueStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
