//! Visit persistence
//!
//! One row per clinical encounter. Date and doctor are fixed at creation;
//! the edit paths elevated roles use are outside this core.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::info;
use uuid::Uuid;

use core_kernel::{BranchId, DoctorId, OrgId, PatientId, ReferralId, VisitId};

use crate::error::DatabaseError;

/// Data for opening a new visit
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub patient_id: PatientId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub doctor_id: DoctorId,
    pub visit_date: NaiveDate,
    pub referral_id: Option<ReferralId>,
}

/// A stored visit record
#[derive(Debug, Clone, PartialEq)]
pub struct VisitRecord {
    pub id: VisitId,
    pub patient_id: PatientId,
    pub org_id: OrgId,
    pub branch_id: BranchId,
    pub doctor_id: DoctorId,
    pub visit_date: NaiveDate,
    pub referral_id: Option<ReferralId>,
    pub created_at: DateTime<Utc>,
}

/// Repository for clinical encounters
pub struct VisitRepository;

impl VisitRepository {
    /// Opens a new visit for a patient
    pub async fn create(
        conn: &mut PgConnection,
        new: NewVisit,
    ) -> Result<VisitRecord, DatabaseError> {
        let record = VisitRecord {
            id: VisitId::new_v7(),
            patient_id: new.patient_id,
            org_id: new.org_id,
            branch_id: new.branch_id,
            doctor_id: new.doctor_id,
            visit_date: new.visit_date,
            referral_id: new.referral_id,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO visits (
                id, patient_id, org_id, branch_id, doctor_id,
                visit_date, referral_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.patient_id.as_uuid())
        .bind(record.org_id.as_uuid())
        .bind(record.branch_id.as_uuid())
        .bind(record.doctor_id.as_uuid())
        .bind(record.visit_date)
        .bind(record.referral_id.map(|r| *r.as_uuid()))
        .bind(record.created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        info!(visit_id = %record.id, patient_id = %record.patient_id, "visit opened");
        Ok(record)
    }

    /// Fetches a visit by id
    pub async fn get(conn: &mut PgConnection, visit_id: VisitId) -> Result<VisitRecord, DatabaseError> {
        let row: Option<VisitRow> = sqlx::query_as(
            r#"
            SELECT id, patient_id, org_id, branch_id, doctor_id,
                   visit_date, referral_id, created_at
            FROM visits
            WHERE id = $1
            "#,
        )
        .bind(visit_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        row.map(VisitRecord::from)
            .ok_or_else(|| DatabaseError::not_found("Visit", visit_id))
    }

    /// A patient's visit history, newest first
    pub async fn list_for_patient(
        conn: &mut PgConnection,
        patient_id: PatientId,
    ) -> Result<Vec<VisitRecord>, DatabaseError> {
        let rows: Vec<VisitRow> = sqlx::query_as(
            r#"
            SELECT id, patient_id, org_id, branch_id, doctor_id,
                   visit_date, referral_id, created_at
            FROM visits
            WHERE patient_id = $1
            ORDER BY visit_date DESC, created_at DESC
            "#,
        )
        .bind(patient_id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(rows.into_iter().map(VisitRecord::from).collect())
    }
}

/// Database row for a visit
#[derive(Debug, Clone, FromRow)]
struct VisitRow {
    id: Uuid,
    patient_id: Uuid,
    org_id: Uuid,
    branch_id: Uuid,
    doctor_id: Uuid,
    visit_date: NaiveDate,
    referral_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<VisitRow> for VisitRecord {
    fn from(row: VisitRow) -> Self {
        VisitRecord {
            id: VisitId::from(row.id),
            patient_id: PatientId::from(row.patient_id),
            org_id: OrgId::from(row.org_id),
            branch_id: BranchId::from(row.branch_id),
            doctor_id: DoctorId::from(row.doctor_id),
            visit_date: row.visit_date,
            referral_id: row.referral_id.map(ReferralId::from),
            created_at: row.created_at,
        }
    }
}
