//! Workflow error taxonomy
//!
//! The typed surface the caller-facing layer maps to display messages.
//! Every workflow method runs as one database transaction, so any of these
//! errors means the persisted state is exactly as it was before the call.

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ChargeId, PatientId, PaymentId, ServiceLineId, VisitId};
use domain_billing::BillingError;
use infra_db::{DatabaseError, LedgerError};

/// Errors surfaced by the visit billing workflows
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Bad input shape or range, rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// A discount or waiver was changed without justification
    #[error("A reason is required when changing a charge's discount")]
    ReasonRequired,

    /// Amount failed a range check
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Idempotency guard on initial charge creation
    #[error("A charge already exists for visit {visit_id} and service line {service_line_id}")]
    DuplicateCharge {
        visit_id: VisitId,
        service_line_id: ServiceLineId,
    },

    /// Referenced charge absent
    #[error("Charge {0} not found")]
    ChargeNotFound(ChargeId),

    /// Payment references a (visit, service line) with no charge
    #[error("No charge exists for visit {visit_id} and service line {service_line_id}")]
    NoChargeForService {
        visit_id: VisitId,
        service_line_id: ServiceLineId,
    },

    /// Referenced payment absent
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// Referenced patient absent
    #[error("Patient {0} not found")]
    PatientNotFound(PatientId),

    /// Referenced visit absent
    #[error("Visit {0} not found")]
    VisitNotFound(VisitId),

    /// Other referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payment status may only move Pending -> Accepted or Pending -> Waived
    #[error("Invalid payment status change: {from} -> {to}")]
    InvalidStatusChange { from: String, to: String },

    /// Unique constraint collision (e.g. phone already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lock wait exceeded; the caller should retry the whole operation
    #[error("Operation timed out waiting for a lock, retry: {0}")]
    ConcurrencyTimeout(String),

    /// Unclassified database failure
    #[error(transparent)]
    Database(DatabaseError),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation(message.into())
    }

    /// True when retrying the whole operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::ConcurrencyTimeout(_) => true,
            WorkflowError::Database(db) => db.is_retryable(),
            _ => false,
        }
    }
}

impl From<DatabaseError> for WorkflowError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(msg) => WorkflowError::NotFound(msg),
            DatabaseError::DuplicateEntry(msg) => WorkflowError::Conflict(msg),
            DatabaseError::LockTimeout(msg) => WorkflowError::ConcurrencyTimeout(msg),
            other => WorkflowError::Database(other),
        }
    }
}

impl From<LedgerError> for WorkflowError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::DuplicateCharge {
                visit_id,
                service_line_id,
            } => WorkflowError::DuplicateCharge {
                visit_id,
                service_line_id,
            },
            LedgerError::ChargeNotFound(id) => WorkflowError::ChargeNotFound(id),
            LedgerError::NoChargeForService {
                visit_id,
                service_line_id,
            } => WorkflowError::NoChargeForService {
                visit_id,
                service_line_id,
            },
            LedgerError::PaymentNotFound(id) => WorkflowError::PaymentNotFound(id),
            LedgerError::ReasonRequired => WorkflowError::ReasonRequired,
            LedgerError::InvalidAmount(amount) => WorkflowError::InvalidAmount(amount),
            LedgerError::InvalidStatusChange { from, to } => WorkflowError::InvalidStatusChange {
                from: from.to_string(),
                to: to.to_string(),
            },
            LedgerError::Db(db) => WorkflowError::from(db),
        }
    }
}

impl From<BillingError> for WorkflowError {
    fn from(error: BillingError) -> Self {
        match error {
            BillingError::ReasonRequired => WorkflowError::ReasonRequired,
            BillingError::InvalidAmount(amount) => WorkflowError::InvalidAmount(amount),
            BillingError::InvalidStatusChange { from, to } => {
                WorkflowError::InvalidStatusChange { from, to }
            }
            BillingError::Validation(msg) => WorkflowError::Validation(msg),
        }
    }
}
