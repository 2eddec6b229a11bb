//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the clinic
//! billing system. These fixtures are designed to be consistent and
//! predictable for unit tests; randomised data comes from `generators`.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::faker::number::en::NumberWithFormat;
use fake::Fake;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{
    ActorId, BillingPeriod, BranchId, DoctorId, Money, OrgId, ScopeKey, ServiceLineId,
};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard consultation fee
    pub fn consultation_fee() -> Money {
        Money::new(dec!(500.00))
    }

    /// A larger procedure fee
    pub fn procedure_fee() -> Money {
        Money::new(dec!(1500.00))
    }

    /// A typical senior-citizen discount amount
    pub fn senior_discount() -> Money {
        Money::new(dec!(100.00))
    }

    /// Zero
    pub fn zero() -> Money {
        Money::zero()
    }
}

/// Fixture for identifier test data
///
/// Deterministic UUIDs so a test failure prints the same ids on every run.
pub struct IdFixtures;

impl IdFixtures {
    pub fn org() -> OrgId {
        OrgId::from(Uuid::from_u128(0x0a01))
    }

    pub fn branch() -> BranchId {
        BranchId::from(Uuid::from_u128(0x0b01))
    }

    pub fn other_branch() -> BranchId {
        BranchId::from(Uuid::from_u128(0x0b02))
    }

    pub fn doctor() -> DoctorId {
        DoctorId::from(Uuid::from_u128(0x0d01))
    }

    pub fn consultation_line() -> ServiceLineId {
        ServiceLineId::from(Uuid::from_u128(0x5c01))
    }

    pub fn lab_line() -> ServiceLineId {
        ServiceLineId::from(Uuid::from_u128(0x5c02))
    }

    pub fn receptionist() -> ActorId {
        ActorId::from(Uuid::from_u128(0xac01))
    }
}

/// Fixture for dates and sequence scopes
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// A fixed clinic day
    pub fn clinic_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// The billing period the clinic day falls in
    pub fn period() -> BillingPeriod {
        BillingPeriod::new(2025, 1).unwrap()
    }

    /// Monthly patient-code scope for the default org and branch
    pub fn monthly_scope() -> ScopeKey {
        ScopeKey::monthly(IdFixtures::org(), IdFixtures::branch(), Self::period())
    }

    /// Daily token scope for the default org and branch
    pub fn daily_scope() -> ScopeKey {
        ScopeKey::daily(IdFixtures::org(), IdFixtures::branch(), Self::clinic_day())
    }
}

/// Fixture for patient test data
pub struct PatientFixtures;

impl PatientFixtures {
    /// A random realistic full name
    pub fn full_name() -> String {
        Name().fake()
    }

    /// A random 10-digit mobile number
    pub fn phone() -> String {
        NumberWithFormat("98########").fake()
    }
}

/// Fixture for free-text fields
pub struct StringFixtures;

impl StringFixtures {
    pub fn discount_reason() -> String {
        "senior citizen".to_string()
    }

    pub fn waiver_reason() -> String {
        "camp patient".to_string()
    }

    pub fn refund_note() -> String {
        "voucher 118".to_string()
    }
}
