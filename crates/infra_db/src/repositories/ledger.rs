//! Charge ledger persistence
//!
//! Persists charges, their audited adjustments, payments, and payment
//! allocations so the financial trail is always reconstructable. Every
//! operation takes a connection owned by the caller: the application layer
//! opens one transaction per use case and any error rolls the whole
//! operation back.
//!
//! The ledger never creates refund rows on its own. When a discount edit
//! drops net below the collected total, [`ChargeLedger::adjust_charge`]
//! reports the refund due and the caller must record the refund as its own
//! explicit payment, with its own mode and voucher note.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{ActorId, ChargeId, Money, PaymentId, ServiceLineId, VisitId};
use domain_billing::{
    calculator, BillingError, Charge, ChargeAdjustment, DiscountMode, Payment, PaymentAllocation,
    PaymentDirection, PaymentMode, PaymentStatus,
};

use crate::error::DatabaseError;

/// Errors surfaced by ledger operations
///
/// Typed so the caller-facing layer can map each case to a message instead
/// of parsing raw database errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Idempotency guard: one charge per (visit, service line)
    #[error("A charge already exists for visit {visit_id} and service line {service_line_id}")]
    DuplicateCharge {
        visit_id: VisitId,
        service_line_id: ServiceLineId,
    },

    /// Referenced charge does not exist
    #[error("Charge {0} not found")]
    ChargeNotFound(ChargeId),

    /// Payment references a (visit, service line) with no charge to settle
    #[error("No charge exists for visit {visit_id} and service line {service_line_id}")]
    NoChargeForService {
        visit_id: VisitId,
        service_line_id: ServiceLineId,
    },

    /// Referenced payment does not exist
    #[error("Payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// A discount or waiver was changed without justification
    #[error("A reason is required when changing a charge's discount")]
    ReasonRequired,

    /// Amount failed a range check
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Payment status may only move Pending -> Accepted or Pending -> Waived
    #[error("Invalid payment status change: {from} -> {to}")]
    InvalidStatusChange {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Underlying database failure
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

impl From<BillingError> for LedgerError {
    fn from(error: BillingError) -> Self {
        match error {
            BillingError::ReasonRequired => LedgerError::ReasonRequired,
            BillingError::InvalidAmount(amount) => LedgerError::InvalidAmount(amount),
            BillingError::InvalidStatusChange { .. } | BillingError::Validation(_) => {
                LedgerError::Db(DatabaseError::SerializationError(error.to_string()))
            }
        }
    }
}

/// Result of a discount edit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentOutcome {
    /// Net amount after the edit
    pub new_net: Money,
    /// Overcollection against the new net; positive means the caller must
    /// follow up with an explicit refund payment
    pub refund_due: Money,
    /// False when the edit resolved to the current discount (no-op)
    pub changed: bool,
}

/// Data for recording one money movement
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub visit_id: VisitId,
    pub service_line_id: ServiceLineId,
    pub amount: Money,
    pub mode: PaymentMode,
    pub direction: PaymentDirection,
    pub status: PaymentStatus,
    pub note: Option<String>,
}

/// Repository for the financial trail of a visit
pub struct ChargeLedger;

impl ChargeLedger {
    /// Inserts the initial charge for a service line at the catalog rate
    ///
    /// The new charge carries no discount; net equals gross.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` when `gross` is negative
    /// - `DuplicateCharge` when a charge already exists for the
    ///   (visit, service line) pair; ledger state is unchanged
    pub async fn record_initial_charge(
        conn: &mut PgConnection,
        visit_id: VisitId,
        service_line_id: ServiceLineId,
        gross: Money,
    ) -> Result<ChargeId, LedgerError> {
        if gross.is_negative() {
            return Err(LedgerError::InvalidAmount(gross.amount()));
        }

        let charge = Charge::new(visit_id, service_line_id, gross);
        let result = sqlx::query(
            r#"
            INSERT INTO charges (
                id, visit_id, service_line_id,
                gross_amount, discount_amount, net_amount,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(charge.id.as_uuid())
        .bind(charge.visit_id.as_uuid())
        .bind(charge.service_line_id.as_uuid())
        .bind(charge.gross_amount.amount())
        .bind(charge.discount_amount.amount())
        .bind(charge.net_amount.amount())
        .bind(charge.created_at)
        .bind(charge.updated_at)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => {
                info!(
                    charge_id = %charge.id,
                    visit_id = %visit_id,
                    gross = %gross,
                    "initial charge recorded"
                );
                Ok(charge.id)
            }
            Err(e) => match DatabaseError::from(&e) {
                DatabaseError::DuplicateEntry(_) => Err(LedgerError::DuplicateCharge {
                    visit_id,
                    service_line_id,
                }),
                other => Err(LedgerError::Db(other)),
            },
        }
    }

    /// Applies a discount edit under a row lock and appends the audit row
    ///
    /// Steps, all on the caller's transaction: lock the charge row, resolve
    /// the requested discount through the calculator's clamping rules,
    /// append a `ChargeAdjustment` snapshot, update the charge, and report
    /// the refund due against the currently accepted paid total.
    ///
    /// An edit that resolves to the current discount is a no-op: no audit
    /// row, no error, whatever the reason text. A real change with a blank
    /// reason is rejected with `ReasonRequired` and nothing is written.
    pub async fn adjust_charge(
        conn: &mut PgConnection,
        charge_id: ChargeId,
        mode: &DiscountMode,
        reason: &str,
        actor_id: ActorId,
    ) -> Result<AdjustmentOutcome, LedgerError> {
        let mut charge = Self::lock_charge(conn, charge_id).await?;

        let adjustment = charge.adjust(mode, reason, actor_id)?;
        let changed = adjustment.is_some();

        if let Some(adjustment) = adjustment {
            Self::insert_adjustment(conn, &adjustment).await?;

            sqlx::query(
                r#"
                UPDATE charges
                SET discount_amount = $2, net_amount = $3, updated_at = $4
                WHERE id = $1
                "#,
            )
            .bind(charge.id.as_uuid())
            .bind(charge.discount_amount.amount())
            .bind(charge.net_amount.amount())
            .bind(charge.updated_at)
            .execute(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(&e))?;
        }

        let paid = Self::paid_total(conn, charge_id).await?;
        let refund_due = calculator::compute_refund_due(charge.net_amount, paid);

        info!(
            charge_id = %charge_id,
            new_net = %charge.net_amount,
            refund_due = %refund_due,
            changed,
            "charge adjustment applied"
        );

        Ok(AdjustmentOutcome {
            new_net: charge.net_amount,
            refund_due,
            changed,
        })
    }

    /// Records a payment or refund with its allocation, atomically
    ///
    /// The amount must be strictly positive; the direction carries the
    /// sign. A collection larger than the pending amount is accepted
    /// deliberately: the counter takes what the patient hands over and the
    /// excess surfaces as refund due once a discount lowers net.
    pub async fn record_payment(
        conn: &mut PgConnection,
        new: NewPayment,
    ) -> Result<PaymentId, LedgerError> {
        let payment = Payment::new(
            new.visit_id,
            new.service_line_id,
            new.amount,
            new.mode,
            new.direction,
            new.status,
            new.note,
        )?;

        let charge = Self::find_charge(conn, new.visit_id, new.service_line_id)
            .await?
            .ok_or(LedgerError::NoChargeForService {
                visit_id: new.visit_id,
                service_line_id: new.service_line_id,
            })?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, visit_id, service_line_id, amount,
                mode, direction, status, note, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.visit_id.as_uuid())
        .bind(payment.service_line_id.as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.mode.as_str())
        .bind(payment.direction.as_str())
        .bind(payment.status.as_str())
        .bind(payment.note.as_deref())
        .bind(payment.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        let allocation = PaymentAllocation::full(&payment, charge.id);
        sqlx::query(
            r#"
            INSERT INTO payment_allocations (id, payment_id, charge_id, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(allocation.id.as_uuid())
        .bind(allocation.payment_id.as_uuid())
        .bind(allocation.charge_id.as_uuid())
        .bind(allocation.amount.amount())
        .bind(allocation.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        info!(
            payment_id = %payment.id,
            visit_id = %payment.visit_id,
            amount = %payment.amount,
            direction = %payment.direction,
            "payment recorded"
        );

        Ok(payment.id)
    }

    /// Signed sum of accepted allocations against a charge
    ///
    /// Collections add, refunds subtract. Pending and waived rows do not
    /// count toward the paid total.
    pub async fn paid_total(
        conn: &mut PgConnection,
        charge_id: ChargeId,
    ) -> Result<Money, LedgerError> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN p.direction = 'payment' THEN pa.amount ELSE -pa.amount END
            ), 0)
            FROM payment_allocations pa
            JOIN payments p ON p.id = pa.payment_id
            WHERE pa.charge_id = $1 AND p.status = 'accepted'
            "#,
        )
        .bind(charge_id.as_uuid())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(Money::new(total))
    }

    /// Moves a pending payment to accepted or waived, exactly once
    ///
    /// Any other transition is rejected with `InvalidStatusChange` and the
    /// row is left untouched.
    pub async fn update_payment_status(
        conn: &mut PgConnection,
        payment_id: PaymentId,
        new_status: PaymentStatus,
    ) -> Result<(), LedgerError> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM payments WHERE id = $1 FOR UPDATE")
                .bind(payment_id.as_uuid())
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| DatabaseError::from(&e))?;

        let current = current.ok_or(LedgerError::PaymentNotFound(payment_id))?;
        let current: PaymentStatus = parse_enum(&current)?;

        if !current.can_transition_to(new_status) {
            return Err(LedgerError::InvalidStatusChange {
                from: current,
                to: new_status,
            });
        }

        sqlx::query("UPDATE payments SET status = $2 WHERE id = $1")
            .bind(payment_id.as_uuid())
            .bind(new_status.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| DatabaseError::from(&e))?;

        debug!(payment_id = %payment_id, from = %current, to = %new_status, "payment status updated");
        Ok(())
    }

    /// Fetches a charge by id
    pub async fn get_charge(
        conn: &mut PgConnection,
        charge_id: ChargeId,
    ) -> Result<Charge, LedgerError> {
        let row: Option<ChargeRow> = sqlx::query_as(
            r#"
            SELECT id, visit_id, service_line_id,
                   gross_amount, discount_amount, net_amount,
                   created_at, updated_at
            FROM charges
            WHERE id = $1
            "#,
        )
        .bind(charge_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        row.map(Charge::from)
            .ok_or(LedgerError::ChargeNotFound(charge_id))
    }

    /// Fetches the charge for a (visit, service line) pair, if any
    pub async fn find_charge(
        conn: &mut PgConnection,
        visit_id: VisitId,
        service_line_id: ServiceLineId,
    ) -> Result<Option<Charge>, LedgerError> {
        let row: Option<ChargeRow> = sqlx::query_as(
            r#"
            SELECT id, visit_id, service_line_id,
                   gross_amount, discount_amount, net_amount,
                   created_at, updated_at
            FROM charges
            WHERE visit_id = $1 AND service_line_id = $2
            "#,
        )
        .bind(visit_id.as_uuid())
        .bind(service_line_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(row.map(Charge::from))
    }

    /// Adjustment history for a charge, oldest first
    pub async fn list_adjustments(
        conn: &mut PgConnection,
        charge_id: ChargeId,
    ) -> Result<Vec<ChargeAdjustment>, LedgerError> {
        let rows: Vec<AdjustmentRow> = sqlx::query_as(
            r#"
            SELECT id, charge_id, old_gross, old_discount, old_net,
                   new_discount, new_net, reason, actor_id, created_at
            FROM charge_adjustments
            WHERE charge_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(charge_id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(rows.into_iter().map(ChargeAdjustment::from).collect())
    }

    /// All payment rows against a visit, oldest first
    pub async fn list_payments(
        conn: &mut PgConnection,
        visit_id: VisitId,
    ) -> Result<Vec<Payment>, LedgerError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, visit_id, service_line_id, amount,
                   mode, direction, status, note, created_at
            FROM payments
            WHERE visit_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(visit_id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn lock_charge(
        conn: &mut PgConnection,
        charge_id: ChargeId,
    ) -> Result<Charge, LedgerError> {
        let row: Option<ChargeRow> = sqlx::query_as(
            r#"
            SELECT id, visit_id, service_line_id,
                   gross_amount, discount_amount, net_amount,
                   created_at, updated_at
            FROM charges
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(charge_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        row.map(Charge::from)
            .ok_or(LedgerError::ChargeNotFound(charge_id))
    }

    async fn insert_adjustment(
        conn: &mut PgConnection,
        adjustment: &ChargeAdjustment,
    ) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO charge_adjustments (
                id, charge_id, old_gross, old_discount, old_net,
                new_discount, new_net, reason, actor_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(adjustment.id.as_uuid())
        .bind(adjustment.charge_id.as_uuid())
        .bind(adjustment.old_gross.amount())
        .bind(adjustment.old_discount.amount())
        .bind(adjustment.old_net.amount())
        .bind(adjustment.new_discount.amount())
        .bind(adjustment.new_net.amount())
        .bind(&adjustment.reason)
        .bind(adjustment.actor_id.as_uuid())
        .bind(adjustment.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }
}

fn parse_enum<T: std::str::FromStr<Err = BillingError>>(raw: &str) -> Result<T, LedgerError> {
    raw.parse()
        .map_err(|e: BillingError| LedgerError::Db(DatabaseError::SerializationError(e.to_string())))
}

/// Database row for a charge
#[derive(Debug, Clone, FromRow)]
struct ChargeRow {
    id: Uuid,
    visit_id: Uuid,
    service_line_id: Uuid,
    gross_amount: Decimal,
    discount_amount: Decimal,
    net_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChargeRow> for Charge {
    fn from(row: ChargeRow) -> Self {
        Charge {
            id: ChargeId::from(row.id),
            visit_id: VisitId::from(row.visit_id),
            service_line_id: ServiceLineId::from(row.service_line_id),
            gross_amount: Money::new(row.gross_amount),
            discount_amount: Money::new(row.discount_amount),
            net_amount: Money::new(row.net_amount),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for a charge adjustment
#[derive(Debug, Clone, FromRow)]
struct AdjustmentRow {
    id: Uuid,
    charge_id: Uuid,
    old_gross: Decimal,
    old_discount: Decimal,
    old_net: Decimal,
    new_discount: Decimal,
    new_net: Decimal,
    reason: String,
    actor_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<AdjustmentRow> for ChargeAdjustment {
    fn from(row: AdjustmentRow) -> Self {
        ChargeAdjustment {
            id: core_kernel::ChargeAdjustmentId::from(row.id),
            charge_id: ChargeId::from(row.charge_id),
            old_gross: Money::new(row.old_gross),
            old_discount: Money::new(row.old_discount),
            old_net: Money::new(row.old_net),
            new_discount: Money::new(row.new_discount),
            new_net: Money::new(row.new_net),
            reason: row.reason,
            actor_id: ActorId::from(row.actor_id),
            created_at: row.created_at,
        }
    }
}

/// Database row for a payment
#[derive(Debug, Clone, FromRow)]
struct PaymentRow {
    id: Uuid,
    visit_id: Uuid,
    service_line_id: Uuid,
    amount: Decimal,
    mode: String,
    direction: String,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = LedgerError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from(row.id),
            visit_id: VisitId::from(row.visit_id),
            service_line_id: ServiceLineId::from(row.service_line_id),
            amount: Money::new(row.amount),
            mode: parse_enum(&row.mode)?,
            direction: parse_enum(&row.direction)?,
            status: parse_enum(&row.status)?,
            note: row.note,
            created_at: row.created_at,
        })
    }
}
