//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_billing::{Charge, Settlement};

/// Asserts that a Money value equals an expected decimal amount
///
/// # Panics
///
/// Panics with both amounts in the message when they differ
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a settlement is fully settled
///
/// # Panics
///
/// Panics when anything is pending or refundable
pub fn assert_settled(settlement: &Settlement) {
    assert!(
        settlement.is_settled(),
        "Expected settled, got pending={} refund_due={}",
        settlement.pending,
        settlement.refund_due
    );
}

/// Asserts the pending side of a settlement, and that no refund is due
pub fn assert_pending(settlement: &Settlement, expected: Decimal) {
    assert_money_eq(settlement.pending, expected);
    assert!(
        settlement.refund_due.is_zero(),
        "Expected no refund due, got {}",
        settlement.refund_due
    );
}

/// Asserts the refund side of a settlement, and that nothing is pending
pub fn assert_refund_due(settlement: &Settlement, expected: Decimal) {
    assert_money_eq(settlement.refund_due, expected);
    assert!(
        settlement.pending.is_zero(),
        "Expected nothing pending, got {}",
        settlement.pending
    );
}

/// Asserts a charge's arithmetic invariants
///
/// `0 <= discount <= gross` and `net = gross - discount`.
pub fn assert_charge_invariants(charge: &Charge) {
    assert!(
        !charge.discount_amount.is_negative(),
        "Discount is negative: {}",
        charge.discount_amount
    );
    assert!(
        charge.discount_amount <= charge.gross_amount,
        "Discount {} exceeds gross {}",
        charge.discount_amount,
        charge.gross_amount
    );
    assert_eq!(
        charge.net_amount,
        charge.gross_amount - charge.discount_amount,
        "Net {} is not gross {} minus discount {}",
        charge.net_amount,
        charge.gross_amount,
        charge.discount_amount
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::calculator;
    use rust_decimal_macros::dec;

    use crate::builders::ChargeBuilder;

    #[test]
    fn test_assert_settled_passes_for_exact_payment() {
        let settlement = calculator::settle(Money::new(dec!(500.00)), Money::new(dec!(500.00)));
        assert_settled(&settlement);
    }

    #[test]
    #[should_panic(expected = "Expected settled")]
    fn test_assert_settled_panics_when_pending() {
        let settlement = calculator::settle(Money::new(dec!(500.00)), Money::zero());
        assert_settled(&settlement);
    }

    #[test]
    fn test_assert_charge_invariants_on_fresh_charge() {
        let charge = ChargeBuilder::new().build();
        assert_charge_invariants(&charge);
    }

    #[test]
    fn test_assert_refund_due() {
        let settlement = calculator::settle(Money::new(dec!(300.00)), Money::new(dec!(450.00)));
        assert_refund_due(&settlement, dec!(150.00));
    }
}
