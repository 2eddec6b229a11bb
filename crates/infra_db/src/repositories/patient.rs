//! Patient identity persistence
//!
//! Patients are created on first registration and never deleted. Each new
//! patient receives a human-readable code numbered within the branch and
//! calendar month, e.g. `202501-0042`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::info;
use uuid::Uuid;

use core_kernel::{BillingPeriod, BranchId, OrgId, PatientId, ScopeKey};

use crate::error::DatabaseError;
use crate::repositories::sequence::SequenceAllocator;

/// Data for registering a new patient
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub full_name: String,
    pub phone: Option<String>,
}

/// A stored patient record
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub id: PatientId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub human_code: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository for patient identity records
pub struct PatientRepository;

impl PatientRepository {
    /// Registers a new patient, issuing their human code
    ///
    /// The code is `<period>-<seq>` where the sequence is allocated from
    /// the branch's monthly counter inside the caller's transaction. A
    /// rollback un-consumes the sequence value.
    ///
    /// # Errors
    ///
    /// `DuplicateEntry` when the phone number is already registered.
    pub async fn create(
        conn: &mut PgConnection,
        new: NewPatient,
        registered_on: NaiveDate,
    ) -> Result<PatientRecord, DatabaseError> {
        let period = BillingPeriod::from_date(registered_on);
        let scope = ScopeKey::monthly(new.org_id, new.branch_id, period);
        let seq = SequenceAllocator::allocate(conn, &scope).await?;
        let human_code = format!("{}-{:04}", period, seq);

        let record = PatientRecord {
            id: PatientId::new_v7(),
            org_id: new.org_id,
            branch_id: new.branch_id,
            human_code,
            full_name: new.full_name,
            phone: new.phone,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO patients (
                id, org_id, branch_id, human_code, full_name, phone, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.org_id.as_uuid())
        .bind(record.branch_id.as_uuid())
        .bind(&record.human_code)
        .bind(&record.full_name)
        .bind(record.phone.as_deref())
        .bind(record.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        info!(
            patient_id = %record.id,
            human_code = %record.human_code,
            "patient registered"
        );
        Ok(record)
    }

    /// Fetches a patient by id
    pub async fn get(
        conn: &mut PgConnection,
        patient_id: PatientId,
    ) -> Result<PatientRecord, DatabaseError> {
        let row: Option<PatientRow> = sqlx::query_as(
            r#"
            SELECT id, org_id, branch_id, human_code, full_name, phone, created_at
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(patient_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        row.map(PatientRecord::from)
            .ok_or_else(|| DatabaseError::not_found("Patient", patient_id))
    }

    /// Looks a patient up by phone number
    ///
    /// Phones are globally unique when present, so at most one record
    /// matches.
    pub async fn find_by_phone(
        conn: &mut PgConnection,
        phone: &str,
    ) -> Result<Option<PatientRecord>, DatabaseError> {
        let row: Option<PatientRow> = sqlx::query_as(
            r#"
            SELECT id, org_id, branch_id, human_code, full_name, phone, created_at
            FROM patients
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(row.map(PatientRecord::from))
    }

    /// Updates a patient's name and phone
    ///
    /// Reception and doctors edit these at the counter; the human code
    /// never changes.
    pub async fn update_contact(
        conn: &mut PgConnection,
        patient_id: PatientId,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET full_name = $2, phone = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(patient_id.as_uuid())
        .bind(full_name)
        .bind(phone)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Patient", patient_id));
        }
        Ok(())
    }
}

/// Database row for a patient
#[derive(Debug, Clone, FromRow)]
struct PatientRow {
    id: Uuid,
    org_id: Uuid,
    branch_id: Uuid,
    human_code: String,
    full_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PatientRow> for PatientRecord {
    fn from(row: PatientRow) -> Self {
        PatientRecord {
            id: PatientId::from(row.id),
            org_id: OrgId::from(row.org_id),
            branch_id: BranchId::from(row.branch_id),
            human_code: row.human_code,
            full_name: row.full_name,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}
