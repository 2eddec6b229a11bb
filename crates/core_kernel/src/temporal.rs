//! Temporal types for billing periods and sequence scoping
//!
//! Patient codes are numbered within an organisation, branch and calendar
//! month; daily queue tokens are numbered within a branch and service date.
//! This module provides the period and scope-key value objects those
//! counters are keyed by.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::identifiers::{BranchId, OrgId};

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid billing period: year {year}, month {month}")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("Unparseable billing period: {0}")]
    UnparseablePeriod(String),

    #[error("Invalid scope key: {0}")]
    InvalidScopeKey(String),
}

/// A calendar month used to scope human-readable patient codes
///
/// Rendered as `YYYYMM` (e.g., `202501`), which is the prefix of the
/// patient code issued to walk-ins registered during that month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a billing period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) || !(1970..=9999).contains(&year) {
            return Err(TemporalError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    /// The period a given service date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month (1-12)
    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for BillingPeriod {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(TemporalError::UnparseablePeriod(s.to_string()));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| TemporalError::UnparseablePeriod(s.to_string()))?;
        let month: u32 = s[4..]
            .parse()
            .map_err(|_| TemporalError::UnparseablePeriod(s.to_string()))?;
        Self::new(year, month)
    }
}

/// The dimension over which a sequence counter is uniquely maintained
///
/// The allocator itself is agnostic to what the key encodes; callers build
/// keys as `org|branch|period` for patient codes or `org|branch|date` for
/// daily queue tokens. Counter values are unique and strictly increasing
/// within one scope key and unrelated across different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// Scope for monthly patient-code sequences: `org|branch|YYYYMM`
    pub fn monthly(org_id: OrgId, branch_id: BranchId, period: BillingPeriod) -> Self {
        Self(format!(
            "{}|{}|{}",
            org_id.as_uuid(),
            branch_id.as_uuid(),
            period
        ))
    }

    /// Scope for daily queue-token sequences: `org|branch|YYYY-MM-DD`
    pub fn daily(org_id: OrgId, branch_id: BranchId, date: NaiveDate) -> Self {
        Self(format!(
            "{}|{}|{}",
            org_id.as_uuid(),
            branch_id.as_uuid(),
            date
        ))
    }

    /// Builds a scope key from a raw string
    ///
    /// Rejects empty or oversized keys; everything else is accepted as-is,
    /// since the encoding belongs to the caller.
    pub fn custom(raw: impl Into<String>) -> Result<Self, TemporalError> {
        let raw = raw.into();
        if raw.trim().is_empty() || raw.len() > 120 {
            return Err(TemporalError::InvalidScopeKey(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
