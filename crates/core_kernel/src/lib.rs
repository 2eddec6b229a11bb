//! Core Kernel - Foundational types and utilities for the clinic billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and clinic rounding rules
//! - Temporal types for billing periods and sequence scoping
//! - Common identifiers and value objects

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, Rate, MoneyError};
pub use temporal::{BillingPeriod, ScopeKey, TemporalError};
pub use identifiers::{
    PatientId, VisitId, ChargeId, ChargeAdjustmentId, PaymentId, PaymentAllocationId,
    QueueEntryId, OrgId, BranchId, DoctorId, ServiceLineId, ActorId, ReferralId,
};
pub use error::CoreError;
