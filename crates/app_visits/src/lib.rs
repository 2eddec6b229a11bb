//! Application Layer - Visit Billing Workflows
//!
//! This crate is the surface the clinic's HTTP layer calls in-process. It
//! orchestrates the billing core - sequence allocation, the charge ledger,
//! and the daily queue - into the desk-level use cases:
//!
//! - register a visit (patient code, queue token, initial charge, optional
//!   desk payment)
//! - edit a consultation charge, surfacing any refund due
//! - collect pending payments and record explicit refunds
//! - move visits through the daily queue
//!
//! Each workflow method runs as exactly one database transaction; any
//! error rolls the whole operation back.
//!
//! # Example
//!
//! ```rust,ignore
//! use app_visits::{AppConfig, VisitBillingWorkflow};
//! use infra_db::create_pool;
//!
//! let config = AppConfig::from_env()?;
//! let pool = create_pool(config.database_config()).await?;
//! let workflow = VisitBillingWorkflow::new(pool);
//!
//! let outcome = workflow.register_visit(request).await?;
//! println!("token {}", outcome.token_no);
//! ```

pub mod config;
pub mod error;
pub mod requests;
pub mod telemetry;
pub mod workflow;

pub use config::AppConfig;
pub use error::WorkflowError;
pub use requests::{
    ChargeEditOutcome, ChargeStatement, CollectPaymentRequest, CollectionOutcome,
    EditChargeRequest, PatientSelector, RefundOutcome, RefundRequest, RegisterVisitRequest,
    RegistrationOutcome, RegistrationPayment, UpdatePatientRequest,
};
pub use telemetry::init_tracing;
pub use workflow::VisitBillingWorkflow;
