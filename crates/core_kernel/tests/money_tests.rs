//! Comprehensive unit tests for the Money module
//!
//! Tests cover money creation, arithmetic operations, the clinic rounding
//! rule, and edge cases.

use core_kernel::{Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_new_rounds_to_two_decimal_places() {
        let m = Money::new(dec!(100.123456789));
        assert_eq!(m.amount(), dec!(100.12));
    }

    #[test]
    fn test_from_minor_converts_paise_correctly() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero();
        assert!(m.is_zero());
    }

    #[test]
    fn test_negative_amount_creation() {
        let m = Money::new(dec!(-100.00));
        assert!(m.is_negative());
        assert_eq!(m.amount(), dec!(-100.00));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(Money::default(), Money::zero());
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(Money::new(dec!(0.005)).amount(), dec!(0.01));
        assert_eq!(Money::new(dec!(0.015)).amount(), dec!(0.02));
        assert_eq!(Money::new(dec!(0.025)).amount(), dec!(0.03));
    }

    #[test]
    fn test_negative_midpoint_rounds_away_from_zero() {
        assert_eq!(Money::new(dec!(-0.005)).amount(), dec!(-0.01));
        assert_eq!(Money::new(dec!(-0.025)).amount(), dec!(-0.03));
    }

    #[test]
    fn test_matches_scaled_integer_rounding() {
        // The cashier-facing rule: round(x * 100) / 100
        assert_eq!(Money::new(dec!(2.675)).amount(), dec!(2.68));
        assert_eq!(Money::new(dec!(17.3350)).amount(), dec!(17.34));
        assert_eq!(Money::new(dec!(1.004)).amount(), dec!(1.00));
    }

    #[test]
    fn test_percent_discount_rounding() {
        // 12.5% of 333.33 = 41.66625, rounds to 41.67
        let gross = Money::new(dec!(333.33));
        let discount = gross.multiply(dec!(0.125));
        assert_eq!(discount.amount(), dec!(41.67));
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_addition() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.25));
        assert_eq!((a + b).amount(), dec!(150.25));
    }

    #[test]
    fn test_subtraction() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.25));
        assert_eq!((a - b).amount(), dec!(49.75));
    }

    #[test]
    fn test_subtraction_can_go_negative() {
        let a = Money::new(dec!(50.00));
        let b = Money::new(dec!(100.00));
        assert_eq!((a - b).amount(), dec!(-50.00));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::new(dec!(50.00));
        let b = Money::new(dec!(100.00));
        assert!(a.saturating_sub(b).is_zero());
        assert_eq!(b.saturating_sub(a).amount(), dec!(50.00));
    }

    #[test]
    fn test_negation() {
        let m = Money::new(dec!(42.00));
        assert_eq!((-m).amount(), dec!(-42.00));
    }

    #[test]
    fn test_multiply_rounds_result() {
        let m = Money::new(dec!(10.01));
        assert_eq!(m.multiply(dec!(0.5)).amount(), dec!(5.01));
    }

    #[test]
    fn test_divide() {
        let m = Money::new(dec!(100.00));
        assert_eq!(m.divide(dec!(3)).unwrap().amount(), dec!(33.33));
    }

    #[test]
    fn test_divide_by_zero_errors() {
        let m = Money::new(dec!(100.00));
        assert_eq!(m.divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_sum_over_iterator() {
        let total: Money = vec![
            Money::new(dec!(10.00)),
            Money::new(dec!(20.00)),
            Money::new(dec!(30.50)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount(), dec!(60.50));
    }

    #[test]
    fn test_clamp() {
        let low = Money::zero();
        let high = Money::new(dec!(100.00));

        assert_eq!(Money::new(dec!(-5.00)).clamp(low, high), low);
        assert_eq!(Money::new(dec!(500.00)).clamp(low, high), high);
        assert_eq!(Money::new(dec!(50.00)).clamp(low, high).amount(), dec!(50.00));
    }
}

mod predicates {
    use super::*;

    #[test]
    fn test_is_zero() {
        assert!(Money::zero().is_zero());
        assert!(!Money::new(dec!(0.01)).is_zero());
    }

    #[test]
    fn test_is_positive() {
        assert!(Money::new(dec!(100.00)).is_positive());
        assert!(!Money::zero().is_positive());
        assert!(!Money::new(dec!(-1.00)).is_positive());
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::new(dec!(-1.00)).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(!Money::new(dec!(1.00)).is_negative());
    }

    #[test]
    fn test_abs() {
        assert_eq!(Money::new(dec!(-12.34)).abs().amount(), dec!(12.34));
    }

    #[test]
    fn test_ordering() {
        assert!(Money::new(dec!(1.00)) < Money::new(dec!(2.00)));
        assert!(Money::new(dec!(-1.00)) < Money::zero());
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::new(dec!(1234.5)).to_string(), "1234.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_rate_from_percentage() {
        let rate = Rate::from_percentage(dec!(25));
        assert_eq!(rate.as_decimal(), dec!(0.25));
        assert_eq!(rate.as_percentage(), dec!(25.00));
    }

    #[test]
    fn test_rate_apply() {
        let rate = Rate::from_percentage(dec!(10));
        let amount = Money::new(dec!(450.00));
        assert_eq!(rate.apply(&amount).amount(), dec!(45.00));
    }

    #[test]
    fn test_rate_display() {
        let rate = Rate::from_percentage(dec!(12.5));
        assert_eq!(rate.to_string(), "12.5%");
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn addition_is_commutative(
            a in -1_000_000_000i64..1_000_000_000i64,
            b in -1_000_000_000i64..1_000_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            prop_assert_eq!(ma + mb, mb + ma);
        }

        #[test]
        fn sub_then_add_round_trips(
            a in -1_000_000_000i64..1_000_000_000i64,
            b in -1_000_000_000i64..1_000_000_000i64
        ) {
            let ma = Money::from_minor(a);
            let mb = Money::from_minor(b);
            prop_assert_eq!((ma - mb) + mb, ma);
        }

        #[test]
        fn rounding_is_stable(amount in -1_000_000_000i64..1_000_000_000i64) {
            let m = Money::from_minor(amount);
            prop_assert_eq!(Money::new(m.amount()), m);
        }

        #[test]
        fn abs_is_never_negative(amount in -1_000_000_000i64..1_000_000_000i64) {
            prop_assert!(!Money::from_minor(amount).abs().is_negative());
        }
    }
}
