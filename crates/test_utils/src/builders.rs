//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::NaiveDate;

use core_kernel::{Money, ServiceLineId, VisitId};
use domain_billing::{
    Charge, Payment, PaymentDirection, PaymentMode, PaymentStatus, QueueEntry,
};
use infra_db::{NewPatient, NewVisit};

use crate::fixtures::{IdFixtures, MoneyFixtures, PatientFixtures, TemporalFixtures};

/// Builder for a test charge
pub struct ChargeBuilder {
    visit_id: VisitId,
    service_line_id: ServiceLineId,
    gross: Money,
}

impl Default for ChargeBuilder {
    fn default() -> Self {
        Self {
            visit_id: VisitId::new(),
            service_line_id: IdFixtures::consultation_line(),
            gross: MoneyFixtures::consultation_fee(),
        }
    }
}

impl ChargeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(mut self, visit_id: VisitId) -> Self {
        self.visit_id = visit_id;
        self
    }

    pub fn service_line(mut self, service_line_id: ServiceLineId) -> Self {
        self.service_line_id = service_line_id;
        self
    }

    pub fn gross(mut self, gross: Money) -> Self {
        self.gross = gross;
        self
    }

    pub fn build(self) -> Charge {
        Charge::new(self.visit_id, self.service_line_id, self.gross)
    }
}

/// Builder for a test payment
pub struct PaymentBuilder {
    visit_id: VisitId,
    service_line_id: ServiceLineId,
    amount: Money,
    mode: PaymentMode,
    direction: PaymentDirection,
    status: PaymentStatus,
    note: Option<String>,
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self {
            visit_id: VisitId::new(),
            service_line_id: IdFixtures::consultation_line(),
            amount: MoneyFixtures::consultation_fee(),
            mode: PaymentMode::Cash,
            direction: PaymentDirection::Payment,
            status: PaymentStatus::Accepted,
            note: None,
        }
    }
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(mut self, visit_id: VisitId) -> Self {
        self.visit_id = visit_id;
        self
    }

    pub fn service_line(mut self, service_line_id: ServiceLineId) -> Self {
        self.service_line_id = service_line_id;
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn mode(mut self, mode: PaymentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn refund(mut self) -> Self {
        self.direction = PaymentDirection::Refund;
        self
    }

    pub fn pending(mut self) -> Self {
        self.status = PaymentStatus::Pending;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builds the payment, panicking on invalid test input
    pub fn build(self) -> Payment {
        Payment::new(
            self.visit_id,
            self.service_line_id,
            self.amount,
            self.mode,
            self.direction,
            self.status,
            self.note,
        )
        .expect("test payment should be valid")
    }
}

/// Builder for a test queue entry
pub struct QueueEntryBuilder {
    visit_id: VisitId,
    entry_date: NaiveDate,
    token_no: i64,
}

impl Default for QueueEntryBuilder {
    fn default() -> Self {
        Self {
            visit_id: VisitId::new(),
            entry_date: TemporalFixtures::clinic_day(),
            token_no: 1,
        }
    }
}

impl QueueEntryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit(mut self, visit_id: VisitId) -> Self {
        self.visit_id = visit_id;
        self
    }

    pub fn token(mut self, token_no: i64) -> Self {
        self.token_no = token_no;
        self
    }

    pub fn build(self) -> QueueEntry {
        QueueEntry::new(self.visit_id, self.entry_date, self.token_no)
    }
}

/// A new-patient record with generated name and phone
pub fn new_patient() -> NewPatient {
    NewPatient {
        org_id: IdFixtures::org(),
        branch_id: IdFixtures::branch(),
        full_name: PatientFixtures::full_name(),
        phone: Some(PatientFixtures::phone()),
    }
}

/// A new-visit record for the default org, branch, and doctor
pub fn new_visit(patient_id: core_kernel::PatientId) -> NewVisit {
    NewVisit {
        patient_id,
        org_id: IdFixtures::org(),
        branch_id: IdFixtures::branch(),
        doctor_id: IdFixtures::doctor(),
        visit_date: TemporalFixtures::clinic_day(),
        referral_id: None,
    }
}
