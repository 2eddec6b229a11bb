//! Workflow request and outcome types
//!
//! These are the shapes the caller-facing layer hands in after its own
//! authentication and input parsing. Amounts arrive as [`Money`], already
//! at two decimal places.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ActorId, BranchId, ChargeId, DoctorId, Money, OrgId, PatientId, PaymentId, QueueEntryId,
    ReferralId, ServiceLineId, VisitId,
};
use domain_billing::{DiscountMode, PaymentMode};

/// Which patient a registration is for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatientSelector {
    /// A returning patient picked from the desk search
    Existing { patient_id: PatientId },
    /// A walk-in; if the phone matches an existing record that record is
    /// reused instead of creating a duplicate
    New {
        full_name: String,
        phone: Option<String>,
    },
}

/// Money collected at the registration desk, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPayment {
    pub amount: Money,
    pub mode: PaymentMode,
}

/// Registers a visit: patient, encounter, queue token, initial charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVisitRequest {
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub doctor_id: DoctorId,
    pub visit_date: NaiveDate,
    pub referral_id: Option<ReferralId>,
    pub patient: PatientSelector,
    /// Catalog service line being billed for the consultation
    pub service_line_id: ServiceLineId,
    /// Catalog rate for that line
    pub gross_amount: Money,
    pub registration_payment: Option<RegistrationPayment>,
}

/// Everything the desk needs to print after a registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub patient_id: PatientId,
    pub patient_code: String,
    /// False when an existing patient record was reused
    pub newly_registered: bool,
    pub visit_id: VisitId,
    pub queue_entry_id: QueueEntryId,
    pub token_no: i64,
    pub charge_id: ChargeId,
    pub payment_id: Option<PaymentId>,
}

/// Edits the discount on a consultation charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditChargeRequest {
    pub charge_id: ChargeId,
    pub discount: DiscountMode,
    pub reason: String,
    pub actor_id: ActorId,
}

/// Result of a discount edit
///
/// A positive `refund_due` means the charge is not settled until the
/// caller follows up with an explicit refund.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChargeEditOutcome {
    pub new_net: Money,
    pub refund_due: Money,
    /// False when the edit resolved to the current discount
    pub changed: bool,
}

impl ChargeEditOutcome {
    /// True when the caller must record a refund before the charge is
    /// settled
    pub fn refund_pending(&self) -> bool {
        self.refund_due.is_positive()
    }
}

/// Collects money against a visit's service line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectPaymentRequest {
    pub visit_id: VisitId,
    pub service_line_id: ServiceLineId,
    pub amount: Money,
    pub mode: PaymentMode,
    pub note: Option<String>,
}

/// Position of the charge after a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionOutcome {
    pub payment_id: PaymentId,
    pub pending: Money,
    /// Positive when the counter accepted more than the pending amount
    pub refund_due: Money,
}

/// Returns money to the patient against a visit's service line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub visit_id: VisitId,
    pub service_line_id: ServiceLineId,
    pub amount: Money,
    pub mode: PaymentMode,
    /// Voucher number or similar reference for the cash book
    pub note: Option<String>,
}

/// Position of the charge after a refund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub payment_id: PaymentId,
    pub remaining_refund_due: Money,
}

/// Edits a patient's name or phone at the desk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub patient_id: PatientId,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Full financial view of one charge
///
/// Current amounts, the adjustment trail, and where the charge stands
/// against its collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeStatement {
    pub charge: domain_billing::Charge,
    pub adjustments: Vec<domain_billing::ChargeAdjustment>,
    pub paid: Money,
    pub settlement: domain_billing::Settlement,
}
