//! Charge arithmetic
//!
//! Pure, side-effect-free functions computing derived billing amounts.
//! Every function is deterministic, performs no I/O, and never fails:
//! out-of-range inputs are clamped to the nearest valid value rather than
//! rejected, so a cashier screen can always show a definite number.
//!
//! All results are rounded to two decimal places, half away from zero
//! (the `Money` invariant).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};

/// How a discount is expressed by the operator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum DiscountMode {
    /// Percentage of gross, clamped to [0, 100]
    Percent(Decimal),
    /// Absolute amount, clamped to [0, gross]
    Amount(Money),
    /// The full gross is written off; net becomes zero
    Waive,
}

/// The settled/unsettled position of a charge against its collections
///
/// At most one of `pending` and `refund_due` is positive; both are zero
/// exactly when paid equals net.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unpaid portion of net
    pub pending: Money,
    /// Overpaid portion relative to current net
    pub refund_due: Money,
}

impl Settlement {
    /// True when nothing is owed in either direction
    pub fn is_settled(&self) -> bool {
        self.pending.is_zero() && self.refund_due.is_zero()
    }
}

/// Net owed after a discount: `clamp(gross - discount, 0, gross)`
///
/// A discount above gross clamps net to zero, never negative.
pub fn compute_net(gross: Money, discount: Money) -> Money {
    (gross - discount).clamp(Money::zero(), gross)
}

/// Net owed for a fully waived charge (always zero)
pub fn waived_net(_gross: Money) -> Money {
    Money::zero()
}

/// Unpaid portion of net: `max(net - paid, 0)`
pub fn compute_pending(net: Money, paid: Money) -> Money {
    net.saturating_sub(paid)
}

/// Overpaid portion relative to net: `max(paid - net, 0)`
///
/// Lowering net below an already-collected paid total always produces a
/// positive refund due; the charge is not settled until that refund is
/// recorded as its own payment row.
pub fn compute_refund_due(net: Money, paid: Money) -> Money {
    paid.saturating_sub(net)
}

/// Resolves a discount expression into an absolute discount amount
pub fn apply_discount(gross: Money, mode: &DiscountMode) -> Money {
    match mode {
        DiscountMode::Percent(value) => {
            let pct = (*value).clamp(Decimal::ZERO, dec!(100));
            Rate::from_percentage(pct).apply(&gross)
        }
        DiscountMode::Amount(value) => (*value).clamp(Money::zero(), gross),
        DiscountMode::Waive => gross,
    }
}

/// Computes both sides of the settlement position in one call
pub fn settle(net: Money, paid: Money) -> Settlement {
    Settlement {
        pending: compute_pending(net, paid),
        refund_due: compute_refund_due(net, paid),
    }
}
