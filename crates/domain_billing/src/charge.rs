//! Visit charges and their audited adjustments
//!
//! A charge is one service line billed on one visit. Its discount can be
//! edited after the fact (doctors and receptionists re-negotiate fees at
//! the counter), but every financially significant edit appends an
//! immutable `ChargeAdjustment` snapshot so the trail stays reconstructable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{ActorId, ChargeAdjustmentId, ChargeId, Money, ServiceLineId, VisitId};

use crate::calculator::{self, DiscountMode};
use crate::error::BillingError;

/// One billed service line on a visit
///
/// # Invariants
///
/// - `0 <= discount_amount <= gross_amount`
/// - `net_amount = gross_amount - discount_amount`
///
/// Both hold by construction: the only mutation path is [`Charge::adjust`],
/// which derives the new discount through the calculator's clamping rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Unique identifier
    pub id: ChargeId,
    /// Visit this charge belongs to
    pub visit_id: VisitId,
    /// Catalog service line being billed
    pub service_line_id: ServiceLineId,
    /// Catalog fee before discount
    pub gross_amount: Money,
    /// Discount applied, within [0, gross]
    pub discount_amount: Money,
    /// Amount owed, gross - discount
    pub net_amount: Money,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Charge {
    /// Creates a new charge at the catalog rate with no discount
    pub fn new(visit_id: VisitId, service_line_id: ServiceLineId, gross: Money) -> Self {
        let now = Utc::now();
        Self {
            id: ChargeId::new_v7(),
            visit_id,
            service_line_id,
            gross_amount: gross,
            discount_amount: Money::zero(),
            net_amount: gross,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a discount edit, producing the audit snapshot
    ///
    /// The requested mode is resolved into an absolute discount through the
    /// calculator's clamping rules. If the resolved discount equals the
    /// current one the edit is a no-op: no snapshot, no error, regardless
    /// of the reason text. A real change with an empty reason is rejected.
    ///
    /// # Returns
    ///
    /// `Some(ChargeAdjustment)` capturing the old/new amounts when the
    /// charge changed, `None` when the edit was a no-op.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ReasonRequired` when the discount delta is
    /// non-zero and `reason` is blank.
    pub fn adjust(
        &mut self,
        mode: &DiscountMode,
        reason: &str,
        actor_id: ActorId,
    ) -> Result<Option<ChargeAdjustment>, BillingError> {
        let new_discount = calculator::apply_discount(self.gross_amount, mode);
        if new_discount == self.discount_amount {
            return Ok(None);
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BillingError::ReasonRequired);
        }

        let new_net = calculator::compute_net(self.gross_amount, new_discount);
        let adjustment = ChargeAdjustment {
            id: ChargeAdjustmentId::new_v7(),
            charge_id: self.id,
            old_gross: self.gross_amount,
            old_discount: self.discount_amount,
            old_net: self.net_amount,
            new_discount,
            new_net,
            reason: reason.to_string(),
            actor_id,
            created_at: Utc::now(),
        };

        debug!(
            charge_id = %self.id,
            old_net = %self.net_amount,
            new_net = %new_net,
            "charge discount adjusted"
        );

        self.discount_amount = new_discount;
        self.net_amount = new_net;
        self.updated_at = adjustment.created_at;

        Ok(Some(adjustment))
    }

    /// True when the charge has been fully written off
    pub fn is_waived(&self) -> bool {
        self.net_amount.is_zero() && self.gross_amount.is_positive()
    }
}

/// Immutable audit record of one discount edit
///
/// Append-only: adjustment rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeAdjustment {
    /// Unique identifier
    pub id: ChargeAdjustmentId,
    /// Charge this adjustment belongs to
    pub charge_id: ChargeId,
    /// Gross at the time of the edit
    pub old_gross: Money,
    /// Discount before the edit
    pub old_discount: Money,
    /// Net before the edit
    pub old_net: Money,
    /// Discount after the edit
    pub new_discount: Money,
    /// Net after the edit
    pub new_net: Money,
    /// Operator-supplied justification
    pub reason: String,
    /// Who made the edit
    pub actor_id: ActorId,
    /// When the edit happened
    pub created_at: DateTime<Utc>,
}
