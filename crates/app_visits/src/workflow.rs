//! Visit billing workflows
//!
//! One use case, one database transaction. The workflow orchestrates the
//! sequence allocator, charge ledger, and queue repository; any error rolls
//! the whole transaction back and leaves persisted state untouched. There
//! is no cross-transaction saga or compensation logic.

use chrono::NaiveDate;
use tracing::info;

use core_kernel::{BranchId, ChargeId, PatientId, PaymentId, QueueEntryId, ScopeKey, VisitId};
use domain_billing::{
    calculator, Payment, PaymentDirection, PaymentStatus, QueueEntry, QueueStatus,
};
use infra_db::{
    ChargeLedger, DatabaseError, DatabasePool, NewPatient, NewPayment, NewVisit,
    PatientRepository, QueueRepository, SequenceAllocator, VisitRepository,
};

use crate::error::WorkflowError;
use crate::requests::{
    ChargeEditOutcome, ChargeStatement, CollectPaymentRequest, CollectionOutcome,
    EditChargeRequest, PatientSelector, RefundOutcome, RefundRequest, RegisterVisitRequest,
    RegistrationOutcome, UpdatePatientRequest,
};

/// Orchestrates registration, charge edits, collections, and refunds
#[derive(Clone)]
pub struct VisitBillingWorkflow {
    pool: DatabasePool,
}

impl VisitBillingWorkflow {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Registers a visit: resolves the patient, opens the encounter,
    /// issues the day's queue token, and records the initial charge
    ///
    /// New patients get a human code from the branch's monthly sequence;
    /// walk-ins with a known phone number reuse their existing record.
    /// Money collected at the desk is recorded in the same transaction.
    pub async fn register_visit(
        &self,
        req: RegisterVisitRequest,
    ) -> Result<RegistrationOutcome, WorkflowError> {
        validate_registration(&req)?;

        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;

        let (patient, newly_registered) = match &req.patient {
            PatientSelector::Existing { patient_id } => {
                let record = PatientRepository::get(&mut tx, *patient_id)
                    .await
                    .map_err(|e| {
                        if e.is_not_found() {
                            WorkflowError::PatientNotFound(*patient_id)
                        } else {
                            e.into()
                        }
                    })?;
                (record, false)
            }
            PatientSelector::New { full_name, phone } => {
                let existing = match phone.as_deref() {
                    Some(phone) => PatientRepository::find_by_phone(&mut tx, phone).await?,
                    None => None,
                };
                match existing {
                    Some(record) => (record, false),
                    None => {
                        let record = PatientRepository::create(
                            &mut tx,
                            NewPatient {
                                org_id: req.org_id,
                                branch_id: req.branch_id,
                                full_name: full_name.trim().to_string(),
                                phone: phone.clone(),
                            },
                            req.visit_date,
                        )
                        .await?;
                        (record, true)
                    }
                }
            }
        };

        let visit = VisitRepository::create(
            &mut tx,
            NewVisit {
                patient_id: patient.id,
                org_id: req.org_id,
                branch_id: req.branch_id,
                doctor_id: req.doctor_id,
                visit_date: req.visit_date,
                referral_id: req.referral_id,
            },
        )
        .await?;

        let queue_entry = QueueRepository::create_entry(
            &mut tx,
            req.org_id,
            req.branch_id,
            visit.id,
            req.visit_date,
        )
        .await?;

        let charge_id = ChargeLedger::record_initial_charge(
            &mut tx,
            visit.id,
            req.service_line_id,
            req.gross_amount,
        )
        .await?;

        let payment_id = match &req.registration_payment {
            Some(payment) => Some(
                ChargeLedger::record_payment(
                    &mut tx,
                    NewPayment {
                        visit_id: visit.id,
                        service_line_id: req.service_line_id,
                        amount: payment.amount,
                        mode: payment.mode,
                        direction: PaymentDirection::Payment,
                        status: PaymentStatus::Accepted,
                        note: None,
                    },
                )
                .await?,
            ),
            None => None,
        };

        tx.commit().await.map_err(sqlx_err)?;

        info!(
            visit_id = %visit.id,
            patient_code = %patient.human_code,
            token_no = queue_entry.token_no,
            newly_registered,
            "visit registered"
        );

        Ok(RegistrationOutcome {
            patient_id: patient.id,
            patient_code: patient.human_code,
            newly_registered,
            visit_id: visit.id,
            queue_entry_id: queue_entry.id,
            token_no: queue_entry.token_no,
            charge_id,
            payment_id,
        })
    }

    /// Edits the discount on a consultation charge
    ///
    /// When the new net drops below what has already been collected, the
    /// outcome reports a positive refund due. The refund is never recorded
    /// here: the caller must follow up with [`Self::record_refund`] so the
    /// refund carries its own mode and voucher note.
    pub async fn edit_consultation_charge(
        &self,
        req: EditChargeRequest,
    ) -> Result<ChargeEditOutcome, WorkflowError> {
        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;

        let outcome = ChargeLedger::adjust_charge(
            &mut tx,
            req.charge_id,
            &req.discount,
            &req.reason,
            req.actor_id,
        )
        .await?;

        tx.commit().await.map_err(sqlx_err)?;

        if outcome.refund_due.is_positive() {
            info!(
                charge_id = %req.charge_id,
                refund_due = %outcome.refund_due,
                "charge edit leaves a refund pending"
            );
        }

        Ok(ChargeEditOutcome {
            new_net: outcome.new_net,
            refund_due: outcome.refund_due,
            changed: outcome.changed,
        })
    }

    /// Collects a payment and reports the charge's new position
    ///
    /// An amount above the pending balance is accepted; the excess shows
    /// up as refund due in the outcome rather than being rejected at the
    /// counter.
    pub async fn collect_pending_payment(
        &self,
        req: CollectPaymentRequest,
    ) -> Result<CollectionOutcome, WorkflowError> {
        if !req.amount.is_positive() {
            return Err(WorkflowError::InvalidAmount(req.amount.amount()));
        }

        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;

        let payment_id = ChargeLedger::record_payment(
            &mut tx,
            NewPayment {
                visit_id: req.visit_id,
                service_line_id: req.service_line_id,
                amount: req.amount,
                mode: req.mode,
                direction: PaymentDirection::Payment,
                status: PaymentStatus::Accepted,
                note: req.note,
            },
        )
        .await?;

        let charge = ChargeLedger::find_charge(&mut tx, req.visit_id, req.service_line_id)
            .await?
            .ok_or(WorkflowError::NoChargeForService {
                visit_id: req.visit_id,
                service_line_id: req.service_line_id,
            })?;
        let paid = ChargeLedger::paid_total(&mut tx, charge.id).await?;
        let settlement = calculator::settle(charge.net_amount, paid);

        tx.commit().await.map_err(sqlx_err)?;

        info!(
            payment_id = %payment_id,
            visit_id = %req.visit_id,
            pending = %settlement.pending,
            "payment collected"
        );

        Ok(CollectionOutcome {
            payment_id,
            pending: settlement.pending,
            refund_due: settlement.refund_due,
        })
    }

    /// Records an explicit refund and reports what is still owed back
    pub async fn record_refund(&self, req: RefundRequest) -> Result<RefundOutcome, WorkflowError> {
        if !req.amount.is_positive() {
            return Err(WorkflowError::InvalidAmount(req.amount.amount()));
        }

        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;

        let payment_id = ChargeLedger::record_payment(
            &mut tx,
            NewPayment {
                visit_id: req.visit_id,
                service_line_id: req.service_line_id,
                amount: req.amount,
                mode: req.mode,
                direction: PaymentDirection::Refund,
                status: PaymentStatus::Accepted,
                note: req.note,
            },
        )
        .await?;

        let charge = ChargeLedger::find_charge(&mut tx, req.visit_id, req.service_line_id)
            .await?
            .ok_or(WorkflowError::NoChargeForService {
                visit_id: req.visit_id,
                service_line_id: req.service_line_id,
            })?;
        let paid = ChargeLedger::paid_total(&mut tx, charge.id).await?;
        let remaining = calculator::compute_refund_due(charge.net_amount, paid);

        tx.commit().await.map_err(sqlx_err)?;

        info!(
            payment_id = %payment_id,
            visit_id = %req.visit_id,
            remaining_refund_due = %remaining,
            "refund recorded"
        );

        Ok(RefundOutcome {
            payment_id,
            remaining_refund_due: remaining,
        })
    }

    /// Moves a pending payment to accepted or waived
    pub async fn resolve_pending_payment(
        &self,
        payment_id: PaymentId,
        new_status: PaymentStatus,
    ) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;
        ChargeLedger::update_payment_status(&mut tx, payment_id, new_status).await?;
        tx.commit().await.map_err(sqlx_err)?;
        Ok(())
    }

    /// Moves a queue entry to a new status
    ///
    /// Any transition is allowed, including re-opening a completed visit.
    /// Never touches charge or payment data.
    pub async fn set_queue_status(
        &self,
        queue_entry_id: QueueEntryId,
        status: QueueStatus,
    ) -> Result<(), WorkflowError> {
        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;
        QueueRepository::set_status(&mut tx, queue_entry_id, status).await?;
        tx.commit().await.map_err(sqlx_err)?;
        Ok(())
    }

    /// Allocates the next value of an arbitrary sequence scope
    ///
    /// For callers with no surrounding business write; the counter row's
    /// lock is held only for this short transaction.
    pub async fn allocate_sequence(&self, scope: &ScopeKey) -> Result<i64, WorkflowError> {
        Ok(SequenceAllocator::allocate_in_new_tx(&self.pool, scope).await?)
    }

    /// Edits a patient's name and phone at the desk
    ///
    /// The human code never changes.
    pub async fn update_patient_details(
        &self,
        req: UpdatePatientRequest,
    ) -> Result<(), WorkflowError> {
        if req.full_name.trim().is_empty() {
            return Err(WorkflowError::validation("patient name must not be empty"));
        }
        if let Some(phone) = &req.phone {
            if phone.trim().is_empty() {
                return Err(WorkflowError::validation(
                    "phone must be omitted rather than blank",
                ));
            }
        }

        let mut tx = self.pool.begin().await.map_err(sqlx_err)?;
        PatientRepository::update_contact(
            &mut tx,
            req.patient_id,
            req.full_name.trim(),
            req.phone.as_deref(),
        )
        .await
        .map_err(|e| {
            if e.is_not_found() {
                WorkflowError::PatientNotFound(req.patient_id)
            } else {
                e.into()
            }
        })?;
        tx.commit().await.map_err(sqlx_err)?;
        Ok(())
    }

    /// Full financial view of one charge for the billing screen
    pub async fn charge_statement(
        &self,
        charge_id: ChargeId,
    ) -> Result<ChargeStatement, WorkflowError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_err)?;

        let charge = ChargeLedger::get_charge(&mut conn, charge_id).await?;
        let adjustments = ChargeLedger::list_adjustments(&mut conn, charge_id).await?;
        let paid = ChargeLedger::paid_total(&mut conn, charge_id).await?;
        let settlement = calculator::settle(charge.net_amount, paid);

        Ok(ChargeStatement {
            charge,
            adjustments,
            paid,
            settlement,
        })
    }

    /// Every payment row recorded against a visit, oldest first
    pub async fn visit_payments(&self, visit_id: VisitId) -> Result<Vec<Payment>, WorkflowError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_err)?;

        VisitRepository::get(&mut conn, visit_id).await.map_err(|e| {
            if e.is_not_found() {
                WorkflowError::VisitNotFound(visit_id)
            } else {
                e.into()
            }
        })?;

        Ok(ChargeLedger::list_payments(&mut conn, visit_id).await?)
    }

    /// A patient's visit history, newest first
    pub async fn patient_visits(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<infra_db::VisitRecord>, WorkflowError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_err)?;
        Ok(VisitRepository::list_for_patient(&mut conn, patient_id).await?)
    }

    /// A branch's queue for one day, in token order
    pub async fn branch_queue(
        &self,
        branch_id: BranchId,
        entry_date: NaiveDate,
    ) -> Result<Vec<QueueEntry>, WorkflowError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_err)?;
        Ok(QueueRepository::list_for_day(&mut conn, branch_id, entry_date).await?)
    }

    /// One queue entry by id
    pub async fn queue_entry(
        &self,
        queue_entry_id: QueueEntryId,
    ) -> Result<QueueEntry, WorkflowError> {
        let mut conn = self.pool.acquire().await.map_err(sqlx_err)?;
        Ok(QueueRepository::get_entry(&mut conn, queue_entry_id).await?)
    }
}

fn sqlx_err(e: sqlx::Error) -> WorkflowError {
    WorkflowError::from(DatabaseError::from(&e))
}

fn validate_registration(req: &RegisterVisitRequest) -> Result<(), WorkflowError> {
    if req.gross_amount.is_negative() {
        return Err(WorkflowError::InvalidAmount(req.gross_amount.amount()));
    }

    if let PatientSelector::New { full_name, phone } = &req.patient {
        if full_name.trim().is_empty() {
            return Err(WorkflowError::validation("patient name must not be empty"));
        }
        if let Some(phone) = phone {
            if phone.trim().is_empty() {
                return Err(WorkflowError::validation(
                    "phone must be omitted rather than blank",
                ));
            }
        }
    }

    if let Some(payment) = &req.registration_payment {
        if !payment.amount.is_positive() {
            return Err(WorkflowError::InvalidAmount(payment.amount.amount()));
        }
    }

    Ok(())
}
