//! Daily queue persistence
//!
//! Queue entries are created once per visit per day with a token from the
//! branch's daily sequence. Status updates are single-row writes with no
//! effect on charge or payment data.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{BranchId, OrgId, QueueEntryId, ScopeKey, VisitId};
use domain_billing::{QueueEntry, QueueStatus};

use crate::error::DatabaseError;
use crate::repositories::sequence::SequenceAllocator;

/// Repository for daily queue entries
pub struct QueueRepository;

impl QueueRepository {
    /// Creates the day's queue entry for a visit, allocating its token
    ///
    /// The token comes from the branch's daily sequence, so concurrent
    /// registrations at the same branch receive distinct increasing
    /// numbers. One entry per visit per day; a second attempt fails with
    /// `DuplicateEntry` and consumes nothing once the transaction rolls
    /// back.
    pub async fn create_entry(
        conn: &mut PgConnection,
        org_id: OrgId,
        branch_id: BranchId,
        visit_id: VisitId,
        entry_date: NaiveDate,
    ) -> Result<QueueEntry, DatabaseError> {
        let scope = ScopeKey::daily(org_id, branch_id, entry_date);
        let token_no = SequenceAllocator::allocate(conn, &scope).await?;

        let entry = QueueEntry::new(visit_id, entry_date, token_no);
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, visit_id, entry_date, token_no, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.visit_id.as_uuid())
        .bind(entry.entry_date)
        .bind(entry.token_no)
        .bind(entry.status.as_str())
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        info!(
            queue_entry_id = %entry.id,
            visit_id = %visit_id,
            token_no,
            "queue entry created"
        );
        Ok(entry)
    }

    /// Moves an entry to a new status
    ///
    /// Any transition is allowed; staff re-order and re-open entries
    /// freely.
    pub async fn set_status(
        conn: &mut PgConnection,
        queue_entry_id: QueueEntryId,
        status: QueueStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(queue_entry_id.as_uuid())
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("QueueEntry", queue_entry_id));
        }

        debug!(queue_entry_id = %queue_entry_id, status = %status, "queue status updated");
        Ok(())
    }

    /// Fetches an entry by id
    pub async fn get_entry(
        conn: &mut PgConnection,
        queue_entry_id: QueueEntryId,
    ) -> Result<QueueEntry, DatabaseError> {
        let row: Option<QueueEntryRow> = sqlx::query_as(
            r#"
            SELECT id, visit_id, entry_date, token_no, status, created_at, updated_at
            FROM queue_entries
            WHERE id = $1
            "#,
        )
        .bind(queue_entry_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        row.map(QueueEntry::try_from)
            .transpose()?
            .ok_or_else(|| DatabaseError::not_found("QueueEntry", queue_entry_id))
    }

    /// A branch's queue for one day, in token order
    pub async fn list_for_day(
        conn: &mut PgConnection,
        branch_id: BranchId,
        entry_date: NaiveDate,
    ) -> Result<Vec<QueueEntry>, DatabaseError> {
        let rows: Vec<QueueEntryRow> = sqlx::query_as(
            r#"
            SELECT q.id, q.visit_id, q.entry_date, q.token_no, q.status,
                   q.created_at, q.updated_at
            FROM queue_entries q
            JOIN visits v ON v.id = q.visit_id
            WHERE v.branch_id = $1 AND q.entry_date = $2
            ORDER BY q.token_no
            "#,
        )
        .bind(branch_id.as_uuid())
        .bind(entry_date)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        rows.into_iter().map(QueueEntry::try_from).collect()
    }
}

/// Database row for a queue entry
#[derive(Debug, Clone, FromRow)]
struct QueueEntryRow {
    id: Uuid,
    visit_id: Uuid,
    entry_date: NaiveDate,
    token_no: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QueueEntryRow> for QueueEntry {
    type Error = DatabaseError;

    fn try_from(row: QueueEntryRow) -> Result<Self, Self::Error> {
        let status: QueueStatus = row
            .status
            .parse()
            .map_err(|e: domain_billing::BillingError| {
                DatabaseError::SerializationError(e.to_string())
            })?;

        Ok(QueueEntry {
            id: QueueEntryId::from(row.id),
            visit_id: VisitId::from(row.visit_id),
            entry_date: row.entry_date,
            token_no: row.token_no,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
