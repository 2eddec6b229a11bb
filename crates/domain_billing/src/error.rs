//! Billing domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BillingError {
    /// Amount failed a range check (e.g., non-positive payment)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// A discount or waiver was changed without justification
    #[error("A reason is required when changing a charge's discount")]
    ReasonRequired,

    /// Payment status may only move Pending -> Accepted or Pending -> Waived
    #[error("Invalid payment status change: {from} -> {to}")]
    InvalidStatusChange { from: String, to: String },

    /// Input failed a structural check
    #[error("Validation error: {0}")]
    Validation(String),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }
}
