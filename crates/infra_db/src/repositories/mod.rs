//! Repository implementations for the clinic billing core
//!
//! Each repository provides data access for one slice of the schema:
//!
//! - `sequence`: row-locked per-scope counters (patient codes, queue tokens)
//! - `ledger`: charges, adjustments, payments, and allocations
//! - `queue`: daily queue entries and status updates
//! - `patient`: patient identity records and human codes
//! - `visit`: clinical encounter records

pub mod sequence;
pub mod ledger;
pub mod queue;
pub mod patient;
pub mod visit;

pub use sequence::SequenceAllocator;
pub use ledger::{AdjustmentOutcome, ChargeLedger, LedgerError, NewPayment};
pub use queue::QueueRepository;
pub use patient::{NewPatient, PatientRecord, PatientRepository};
pub use visit::{NewVisit, VisitRecord, VisitRepository};
