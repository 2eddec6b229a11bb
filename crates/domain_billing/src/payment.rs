//! Payment recording
//!
//! A payment is one money movement against a visit's service line, in
//! either direction: collections increase the paid total, refunds decrease
//! it. Payment rows are never mutated after creation; only the status may
//! move, once, out of Pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{Money, PaymentAllocationId, PaymentId, ChargeId, ServiceLineId, VisitId};

use crate::error::BillingError;

/// How the money moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Cheque,
    Wallet,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Card => "card",
            PaymentMode::Upi => "upi",
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Cheque => "cheque",
            PaymentMode::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMode::Cash),
            "card" => Ok(PaymentMode::Card),
            "upi" => Ok(PaymentMode::Upi),
            "bank_transfer" => Ok(PaymentMode::BankTransfer),
            "cheque" => Ok(PaymentMode::Cheque),
            "wallet" => Ok(PaymentMode::Wallet),
            other => Err(BillingError::validation(format!(
                "unknown payment mode: {other}"
            ))),
        }
    }
}

/// Whether the row adds to or subtracts from the paid total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Collection from the patient
    Payment,
    /// Money returned to the patient
    Refund,
}

impl PaymentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDirection::Payment => "payment",
            PaymentDirection::Refund => "refund",
        }
    }
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentDirection {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment" => Ok(PaymentDirection::Payment),
            "refund" => Ok(PaymentDirection::Refund),
            other => Err(BillingError::validation(format!(
                "unknown payment direction: {other}"
            ))),
        }
    }
}

/// Lifecycle of a payment row
///
/// A row is born Pending or Accepted. Pending may move exactly once to
/// Accepted or Waived; Accepted and Waived are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Accepted,
    Waived,
}

impl PaymentStatus {
    /// True when a transition to `to` is permitted
    pub fn can_transition_to(&self, to: PaymentStatus) -> bool {
        matches!(
            (self, to),
            (PaymentStatus::Pending, PaymentStatus::Accepted)
                | (PaymentStatus::Pending, PaymentStatus::Waived)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Accepted => "accepted",
            PaymentStatus::Waived => "waived",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "accepted" => Ok(PaymentStatus::Accepted),
            "waived" => Ok(PaymentStatus::Waived),
            other => Err(BillingError::validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

/// One money movement against a visit's service line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Visit being settled
    pub visit_id: VisitId,
    /// Service line being settled
    pub service_line_id: ServiceLineId,
    /// Amount moved, strictly positive
    pub amount: Money,
    /// Instrument used
    pub mode: PaymentMode,
    /// Collection or refund
    pub direction: PaymentDirection,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// Free-text note (refund voucher number, cheque reference)
    pub note: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment row
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidAmount` unless `amount > 0`. Refunds
    /// carry positive amounts too; the direction encodes the sign.
    pub fn new(
        visit_id: VisitId,
        service_line_id: ServiceLineId,
        amount: Money,
        mode: PaymentMode,
        direction: PaymentDirection,
        status: PaymentStatus,
        note: Option<String>,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::InvalidAmount(amount.amount()));
        }

        Ok(Self {
            id: PaymentId::new_v7(),
            visit_id,
            service_line_id,
            amount,
            mode,
            direction,
            status,
            note,
            created_at: Utc::now(),
        })
    }

    /// The amount with the direction's sign applied
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            PaymentDirection::Payment => self.amount,
            PaymentDirection::Refund => -self.amount,
        }
    }

    /// True when this row contributes to the paid total
    pub fn counts_toward_paid(&self) -> bool {
        self.status == PaymentStatus::Accepted
    }
}

/// Links a payment to the specific charge it settles
///
/// Kept one-to-one with the payment today; the link table exists so a
/// multi-line receipt can settle several charges from one payment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    /// Unique identifier
    pub id: PaymentAllocationId,
    /// Payment being allocated
    pub payment_id: PaymentId,
    /// Charge receiving the allocation
    pub charge_id: ChargeId,
    /// Portion of the payment applied to this charge
    pub amount: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PaymentAllocation {
    /// Allocates the full payment amount against one charge
    pub fn full(payment: &Payment, charge_id: ChargeId) -> Self {
        Self {
            id: PaymentAllocationId::new_v7(),
            payment_id: payment.id,
            charge_id,
            amount: payment.amount,
            created_at: payment.created_at,
        }
    }
}
