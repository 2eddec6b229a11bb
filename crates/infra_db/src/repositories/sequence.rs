//! Row-locked sequence allocation
//!
//! Patient codes and daily queue tokens are issued from per-scope counters
//! stored in `sequence_counters`. Multiple stateless server instances share
//! the same counters, so allocation relies on the database's row locks
//! rather than anything held in process memory.
//!
//! Values are unique and strictly increasing within one scope. They are not
//! guaranteed gap-free: a crash between statements can skip a value, which
//! is acceptable for human-readable codes.

use sqlx::PgConnection;
use tracing::debug;

use core_kernel::ScopeKey;

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

/// First value handed out for a fresh scope
const FIRST_VALUE: i64 = 1;

/// Allocates per-scope monotonic integers under row-level locking
///
/// The allocator is agnostic to what the scope key encodes; callers build
/// keys via [`ScopeKey::monthly`] for patient codes or [`ScopeKey::daily`]
/// for queue tokens.
pub struct SequenceAllocator;

impl SequenceAllocator {
    /// Allocates the next value for `scope` inside the caller's transaction
    ///
    /// Two concurrent callers for the same scope never receive the same
    /// value: the second blocks on the counter row's lock until the first
    /// commits, then reads the incremented value. If the enclosing
    /// transaction rolls back, the value is not consumed and the caller
    /// must retry the whole business operation.
    ///
    /// # Arguments
    ///
    /// * `conn` - Connection inside the enclosing transaction
    /// * `scope` - The counter's scope key
    ///
    /// # Returns
    ///
    /// The allocated value; `1` when the scope is fresh.
    pub async fn allocate(conn: &mut PgConnection, scope: &ScopeKey) -> Result<i64, DatabaseError> {
        // A fresh scope is created already pointing past the value we hand
        // out. Under a concurrent first allocation the losing insert blocks
        // on the index entry until the winner commits, then falls through
        // to the locked read below.
        let created = sqlx::query(
            r#"
            INSERT INTO sequence_counters (scope_key, next_value)
            VALUES ($1, $2)
            ON CONFLICT (scope_key) DO NOTHING
            "#,
        )
        .bind(scope.as_str())
        .bind(FIRST_VALUE + 1)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        if created.rows_affected() == 1 {
            debug!(scope = %scope, value = FIRST_VALUE, "created sequence scope");
            return Ok(FIRST_VALUE);
        }

        let value: i64 = sqlx::query_scalar(
            r#"
            SELECT next_value
            FROM sequence_counters
            WHERE scope_key = $1
            FOR UPDATE
            "#,
        )
        .bind(scope.as_str())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        sqlx::query(
            r#"
            UPDATE sequence_counters
            SET next_value = $2
            WHERE scope_key = $1
            "#,
        )
        .bind(scope.as_str())
        .bind(value + 1)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        debug!(scope = %scope, value, "allocated sequence value");
        Ok(value)
    }

    /// Allocates a value in its own short transaction
    ///
    /// For callers with no surrounding business write. The lock is held
    /// only for the duration of this call.
    pub async fn allocate_in_new_tx(
        pool: &DatabasePool,
        scope: &ScopeKey,
    ) -> Result<i64, DatabaseError> {
        let mut tx = pool.begin().await.map_err(|e| DatabaseError::from(&e))?;
        let value = Self::allocate(&mut tx, scope).await?;
        tx.commit().await.map_err(|e| DatabaseError::from(&e))?;
        Ok(value)
    }
}
