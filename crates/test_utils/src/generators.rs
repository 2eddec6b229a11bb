//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{BillingPeriod, Money, ScopeKey};
use domain_billing::{DiscountMode, PaymentDirection, PaymentMode, PaymentStatus, QueueStatus};

/// Strategy for non-negative amounts in minor units (paise)
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    0i64..100_000_000i64
}

/// Strategy for strictly positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Strategy for non-negative Money values
pub fn money_strategy() -> impl Strategy<Value = Money> {
    amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for strictly positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for discount expressions, including out-of-range values the
/// calculator must clamp
pub fn discount_mode_strategy() -> impl Strategy<Value = DiscountMode> {
    prop_oneof![
        (-50i64..200i64).prop_map(|pct| DiscountMode::Percent(Decimal::from(pct))),
        (-100_000i64..200_000_000i64).prop_map(|m| DiscountMode::Amount(Money::from_minor(m))),
        Just(DiscountMode::Waive),
    ]
}

/// Strategy for payment modes
pub fn payment_mode_strategy() -> impl Strategy<Value = PaymentMode> {
    prop_oneof![
        Just(PaymentMode::Cash),
        Just(PaymentMode::Card),
        Just(PaymentMode::Upi),
        Just(PaymentMode::BankTransfer),
        Just(PaymentMode::Cheque),
        Just(PaymentMode::Wallet),
    ]
}

/// Strategy for payment directions
pub fn payment_direction_strategy() -> impl Strategy<Value = PaymentDirection> {
    prop_oneof![
        Just(PaymentDirection::Payment),
        Just(PaymentDirection::Refund),
    ]
}

/// Strategy for payment statuses
pub fn payment_status_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Accepted),
        Just(PaymentStatus::Waived),
    ]
}

/// Strategy for queue statuses
pub fn queue_status_strategy() -> impl Strategy<Value = QueueStatus> {
    prop_oneof![
        Just(QueueStatus::Waiting),
        Just(QueueStatus::Next),
        Just(QueueStatus::InRoom),
        Just(QueueStatus::Completed),
    ]
}

/// Strategy for billing periods
pub fn billing_period_strategy() -> impl Strategy<Value = BillingPeriod> {
    (2020i32..2030i32, 1u32..=12u32)
        .prop_map(|(year, month)| BillingPeriod::new(year, month).unwrap())
}

/// Strategy for raw sequence scope keys
pub fn scope_key_strategy() -> impl Strategy<Value = ScopeKey> {
    "[a-z0-9]{2,8}\\|[a-z0-9]{2,8}\\|[0-9]{6}"
        .prop_map(|raw| ScopeKey::custom(raw).unwrap())
}
