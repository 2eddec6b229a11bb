//! Comprehensive tests for domain_billing

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ActorId, ChargeId, Money, ServiceLineId, VisitId};

use domain_billing::calculator::{self, DiscountMode};
use domain_billing::charge::{Charge, ChargeAdjustment};
use domain_billing::error::BillingError;
use domain_billing::payment::{
    Payment, PaymentAllocation, PaymentDirection, PaymentMode, PaymentStatus,
};
use domain_billing::queue::{QueueEntry, QueueStatus};

// ============================================================================
// Calculator Tests
// ============================================================================

mod calculator_tests {
    use super::*;

    #[test]
    fn test_net_plus_discount_equals_gross_within_range() {
        let gross = Money::new(dec!(750.00));
        for discount_minor in [0i64, 1, 7500, 37500, 75000] {
            let discount = Money::from_minor(discount_minor);
            let net = calculator::compute_net(gross, discount);
            assert_eq!(net + discount, gross, "discount {discount}");
        }
    }

    #[test]
    fn test_discount_above_gross_clamps_to_zero_net() {
        let net = calculator::compute_net(Money::new(dec!(100.00)), Money::new(dec!(100.01)));
        assert!(net.is_zero());
    }

    #[test]
    fn test_pending_when_underpaid() {
        let pending = calculator::compute_pending(Money::new(dec!(600.00)), Money::new(dec!(200.00)));
        assert_eq!(pending.amount(), dec!(400.00));
    }

    #[test]
    fn test_pending_floors_at_zero_when_overpaid() {
        let pending = calculator::compute_pending(Money::new(dec!(600.00)), Money::new(dec!(900.00)));
        assert!(pending.is_zero());
    }

    #[test]
    fn test_refund_due_when_overpaid() {
        let refund = calculator::compute_refund_due(Money::new(dec!(600.00)), Money::new(dec!(1000.00)));
        assert_eq!(refund.amount(), dec!(400.00));
    }

    #[test]
    fn test_refund_due_zero_when_underpaid() {
        let refund = calculator::compute_refund_due(Money::new(dec!(600.00)), Money::new(dec!(100.00)));
        assert!(refund.is_zero());
    }

    #[test]
    fn test_settlement_exact_payment_is_settled() {
        let settlement = calculator::settle(Money::new(dec!(450.00)), Money::new(dec!(450.00)));
        assert!(settlement.is_settled());
    }

    #[test]
    fn test_percent_mode() {
        let gross = Money::new(dec!(800.00));
        let discount = calculator::apply_discount(gross, &DiscountMode::Percent(dec!(25)));
        assert_eq!(discount.amount(), dec!(200.00));
    }

    #[test]
    fn test_percent_mode_clamps_out_of_range_values() {
        let gross = Money::new(dec!(800.00));

        assert_eq!(
            calculator::apply_discount(gross, &DiscountMode::Percent(dec!(120))),
            gross
        );
        assert!(calculator::apply_discount(gross, &DiscountMode::Percent(dec!(-5))).is_zero());
    }

    #[test]
    fn test_amount_mode_clamps_to_gross() {
        let gross = Money::new(dec!(300.00));
        let discount =
            calculator::apply_discount(gross, &DiscountMode::Amount(Money::new(dec!(500.00))));
        assert_eq!(discount, gross);
    }

    #[test]
    fn test_amount_mode_clamps_negative_to_zero() {
        let gross = Money::new(dec!(300.00));
        let discount =
            calculator::apply_discount(gross, &DiscountMode::Amount(Money::new(dec!(-50.00))));
        assert!(discount.is_zero());
    }

    #[test]
    fn test_waive_mode_discounts_full_gross() {
        let gross = Money::new(dec!(300.00));
        assert_eq!(calculator::apply_discount(gross, &DiscountMode::Waive), gross);
        assert!(calculator::waived_net(gross).is_zero());
    }

    /// Full waiver of an unpaid charge leaves nothing pending and nothing
    /// refundable.
    #[test]
    fn test_waive_unpaid_charge_settles_cleanly() {
        let gross = Money::new(dec!(500.00));
        let discount = calculator::apply_discount(gross, &DiscountMode::Waive);
        let net = calculator::compute_net(gross, discount);

        assert!(net.is_zero());
        let settlement = calculator::settle(net, Money::zero());
        assert!(settlement.is_settled());
    }

    /// Cutting net below an already-collected total surfaces the excess as
    /// refund due.
    #[test]
    fn test_discount_after_full_payment_creates_refund_due() {
        let gross = Money::new(dec!(1000.00));
        let paid = Money::new(dec!(1000.00));

        let discount =
            calculator::apply_discount(gross, &DiscountMode::Amount(Money::new(dec!(400.00))));
        let net = calculator::compute_net(gross, discount);

        assert_eq!(net.amount(), dec!(600.00));
        assert_eq!(calculator::compute_refund_due(net, paid).amount(), dec!(400.00));
    }

    #[test]
    fn test_calculator_functions_are_idempotent() {
        let gross = Money::new(dec!(333.33));
        let discount = Money::new(dec!(0.01));

        let first = calculator::compute_net(gross, discount);
        let second = calculator::compute_net(gross, discount);
        assert_eq!(first, second);
    }
}

// ============================================================================
// Charge Tests
// ============================================================================

mod charge_tests {
    use super::*;

    fn charge(gross: Decimal) -> Charge {
        Charge::new(VisitId::new(), ServiceLineId::new(), Money::new(gross))
    }

    #[test]
    fn test_initial_charge_invariants() {
        let c = charge(dec!(500.00));

        assert!(c.discount_amount.is_zero());
        assert_eq!(c.net_amount, c.gross_amount);
        assert_eq!(c.created_at, c.updated_at);
    }

    #[test]
    fn test_adjustment_keeps_net_consistent() {
        let mut c = charge(dec!(1000.00));
        c.adjust(
            &DiscountMode::Percent(dec!(30)),
            "follow-up visit",
            ActorId::new(),
        )
        .unwrap();

        assert_eq!(c.discount_amount.amount(), dec!(300.00));
        assert_eq!(c.net_amount, c.gross_amount - c.discount_amount);
    }

    #[test]
    fn test_adjustment_snapshot_captures_both_sides() {
        let mut c = charge(dec!(1000.00));
        let actor = ActorId::new();
        let adj: ChargeAdjustment = c
            .adjust(&DiscountMode::Amount(Money::new(dec!(400.00))), "package rate", actor)
            .unwrap()
            .unwrap();

        assert_eq!(adj.charge_id, c.id);
        assert_eq!(adj.old_gross.amount(), dec!(1000.00));
        assert_eq!(adj.old_discount.amount(), dec!(0.00));
        assert_eq!(adj.old_net.amount(), dec!(1000.00));
        assert_eq!(adj.new_discount.amount(), dec!(400.00));
        assert_eq!(adj.new_net.amount(), dec!(600.00));
        assert_eq!(adj.reason, "package rate");
        assert_eq!(adj.actor_id, actor);
    }

    #[test]
    fn test_empty_reason_rejected_and_charge_untouched() {
        let mut c = charge(dec!(500.00));
        let before = c.clone();

        let err = c
            .adjust(&DiscountMode::Percent(dec!(10)), "", ActorId::new())
            .unwrap_err();

        assert_eq!(err, BillingError::ReasonRequired);
        assert_eq!(c, before);
    }

    #[test]
    fn test_reapplying_current_discount_is_noop_without_reason() {
        let mut c = charge(dec!(500.00));
        c.adjust(&DiscountMode::Percent(dec!(20)), "staff family", ActorId::new())
            .unwrap();

        // Same resolved discount again, no reason: accepted as a no-op.
        let result = c
            .adjust(&DiscountMode::Amount(Money::new(dec!(100.00))), "", ActorId::new())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_successive_adjustments_chain_snapshots() {
        let mut c = charge(dec!(1000.00));
        let first = c
            .adjust(&DiscountMode::Percent(dec!(10)), "loyalty", ActorId::new())
            .unwrap()
            .unwrap();
        let second = c
            .adjust(&DiscountMode::Percent(dec!(50)), "escalated to owner", ActorId::new())
            .unwrap()
            .unwrap();

        assert_eq!(first.new_discount, second.old_discount);
        assert_eq!(first.new_net, second.old_net);
        assert_eq!(c.net_amount.amount(), dec!(500.00));
    }

    #[test]
    fn test_waiver_flag() {
        let mut c = charge(dec!(250.00));
        assert!(!c.is_waived());

        c.adjust(&DiscountMode::Waive, "charity case", ActorId::new())
            .unwrap();
        assert!(c.is_waived());
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    fn payment(
        amount: Decimal,
        direction: PaymentDirection,
        status: PaymentStatus,
    ) -> Result<Payment, BillingError> {
        Payment::new(
            VisitId::new(),
            ServiceLineId::new(),
            Money::new(amount),
            PaymentMode::Upi,
            direction,
            status,
            None,
        )
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(matches!(
            payment(dec!(0), PaymentDirection::Payment, PaymentStatus::Accepted),
            Err(BillingError::InvalidAmount(_))
        ));
        assert!(matches!(
            payment(dec!(-5), PaymentDirection::Refund, PaymentStatus::Accepted),
            Err(BillingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_refund_amount_stays_positive_sign_comes_from_direction() {
        let refund = payment(dec!(400.00), PaymentDirection::Refund, PaymentStatus::Accepted).unwrap();

        assert!(refund.amount.is_positive());
        assert!(refund.signed_amount().is_negative());
    }

    #[test]
    fn test_only_accepted_counts_toward_paid() {
        let accepted = payment(dec!(100.00), PaymentDirection::Payment, PaymentStatus::Accepted).unwrap();
        let pending = payment(dec!(100.00), PaymentDirection::Payment, PaymentStatus::Pending).unwrap();
        let waived = payment(dec!(100.00), PaymentDirection::Payment, PaymentStatus::Waived).unwrap();

        assert!(accepted.counts_toward_paid());
        assert!(!pending.counts_toward_paid());
        assert!(!waived.counts_toward_paid());
    }

    #[test]
    fn test_status_machine_only_leaves_pending_once() {
        for (from, to, expected) in [
            (PaymentStatus::Pending, PaymentStatus::Accepted, true),
            (PaymentStatus::Pending, PaymentStatus::Waived, true),
            (PaymentStatus::Accepted, PaymentStatus::Waived, false),
            (PaymentStatus::Waived, PaymentStatus::Accepted, false),
            (PaymentStatus::Accepted, PaymentStatus::Pending, false),
            (PaymentStatus::Waived, PaymentStatus::Pending, false),
        ] {
            assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
        }
    }

    #[test]
    fn test_allocation_links_payment_to_charge() {
        let p = payment(dec!(350.00), PaymentDirection::Payment, PaymentStatus::Accepted).unwrap();
        let charge_id = ChargeId::new();

        let allocation = PaymentAllocation::full(&p, charge_id);
        assert_eq!(allocation.amount, p.amount);
        assert_eq!(allocation.charge_id, charge_id);
        assert_eq!(allocation.created_at, p.created_at);
    }

    #[test]
    fn test_enum_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMode::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentDirection::Refund).unwrap(),
            "\"refund\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Waived).unwrap(),
            "\"waived\""
        );
    }
}

// ============================================================================
// Queue Tests
// ============================================================================

mod queue_tests {
    use super::*;

    #[test]
    fn test_entry_starts_waiting_with_token() {
        let entry = QueueEntry::new(VisitId::new(), Utc::now().date_naive(), 14);

        assert_eq!(entry.status, QueueStatus::Waiting);
        assert_eq!(entry.token_no, 14);
    }

    #[test]
    fn test_all_sixteen_transitions_allowed() {
        let mut entry = QueueEntry::new(VisitId::new(), Utc::now().date_naive(), 1);
        let mut count = 0;

        for from in QueueStatus::all() {
            for to in QueueStatus::all() {
                entry.set_status(from);
                entry.set_status(to);
                assert_eq!(entry.status, to);
                count += 1;
            }
        }
        assert_eq!(count, 16);
    }

    #[test]
    fn test_status_change_does_not_touch_token() {
        let mut entry = QueueEntry::new(VisitId::new(), Utc::now().date_naive(), 9);
        entry.set_status(QueueStatus::InRoom);
        entry.set_status(QueueStatus::Completed);

        assert_eq!(entry.token_no, 9);
        assert_eq!(entry.visit_id, entry.visit_id);
    }
}

// ============================================================================
// End-to-end domain flows (no persistence)
// ============================================================================

mod flow_tests {
    use super::*;

    /// Scenario: a fully-paid consultation gets a late discount; the ledger
    /// math must show the exact overcollection as refund due.
    #[test]
    fn test_discount_after_full_collection_flow() {
        let mut charge = Charge::new(
            VisitId::new(),
            ServiceLineId::new(),
            Money::new(dec!(1000.00)),
        );

        let collection = Payment::new(
            charge.visit_id,
            charge.service_line_id,
            charge.net_amount,
            PaymentMode::Cash,
            PaymentDirection::Payment,
            PaymentStatus::Accepted,
            None,
        )
        .unwrap();
        let paid = collection.signed_amount();

        charge
            .adjust(
                &DiscountMode::Amount(Money::new(dec!(400.00))),
                "billing correction",
                ActorId::new(),
            )
            .unwrap();

        let settlement = calculator::settle(charge.net_amount, paid);
        assert_eq!(charge.net_amount.amount(), dec!(600.00));
        assert!(settlement.pending.is_zero());
        assert_eq!(settlement.refund_due.amount(), dec!(400.00));

        // The refund is its own explicit payment row, never implied.
        let refund = Payment::new(
            charge.visit_id,
            charge.service_line_id,
            settlement.refund_due,
            PaymentMode::Cash,
            PaymentDirection::Refund,
            PaymentStatus::Accepted,
            Some("voucher 118".to_string()),
        )
        .unwrap();

        let paid_after = paid + refund.signed_amount();
        assert!(calculator::settle(charge.net_amount, paid_after).is_settled());
    }

    /// Overpayment is accepted at collection time and reconciled later,
    /// not rejected at the counter.
    #[test]
    fn test_overpayment_surfaces_as_refund_due() {
        let charge = Charge::new(
            VisitId::new(),
            ServiceLineId::new(),
            Money::new(dec!(300.00)),
        );

        let overpaid = Payment::new(
            charge.visit_id,
            charge.service_line_id,
            Money::new(dec!(500.00)),
            PaymentMode::Card,
            PaymentDirection::Payment,
            PaymentStatus::Accepted,
            None,
        )
        .unwrap();

        let settlement = calculator::settle(charge.net_amount, overpaid.signed_amount());
        assert_eq!(settlement.refund_due.amount(), dec!(200.00));
        assert!(settlement.pending.is_zero());
    }
}
