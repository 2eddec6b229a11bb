//! Billing Domain - Visit Charges, Payments, and Queue Tokens
//!
//! This crate implements the financial core of the clinic system: per-visit
//! service charges with audited discount adjustments, payments and refunds
//! allocated against those charges, and the daily queue status machine.
//!
//! # Charge Arithmetic
//!
//! Every charge keeps three amounts in lockstep:
//! - `gross`: the catalog fee before any discount
//! - `discount`: the amount knocked off, always within `[0, gross]`
//! - `net`: what the patient actually owes, always `gross - discount`
//!
//! Payments settle net amounts. When a discount edit drops net below what
//! has already been collected, the difference becomes a refund due - the
//! charge is not settled until an explicit refund payment resolves it.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{calculator, DiscountMode};
//!
//! let discount = calculator::apply_discount(gross, &DiscountMode::Percent(dec!(20)));
//! let net = calculator::compute_net(gross, discount);
//! let refund_due = calculator::compute_refund_due(net, paid);
//! ```

pub mod calculator;
pub mod charge;
pub mod payment;
pub mod queue;
pub mod error;

pub use calculator::{DiscountMode, Settlement};
pub use charge::{Charge, ChargeAdjustment};
pub use payment::{Payment, PaymentAllocation, PaymentDirection, PaymentMode, PaymentStatus};
pub use queue::{QueueEntry, QueueStatus};
pub use error::BillingError;
