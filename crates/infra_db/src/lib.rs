//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the clinic billing
//! core, implementing row-locked counters and the financial trail on
//! PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories that participate
//! in a business transaction take a `&mut PgConnection`, so the application
//! layer owns the transaction boundary: one use case, one transaction, and
//! any error rolls the whole thing back.
//!
//! The schema lives in `migrations/` at the workspace root and is applied
//! verbatim by the test harness.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, SequenceAllocator};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/clinic")).await?;
//! let mut tx = pool.begin().await?;
//! let token = SequenceAllocator::allocate(&mut *tx, &scope).await?;
//! tx.commit().await?;
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{
    AdjustmentOutcome, ChargeLedger, LedgerError, NewPatient, NewPayment, NewVisit,
    PatientRecord, PatientRepository, QueueRepository, SequenceAllocator, VisitRecord,
    VisitRepository,
};
