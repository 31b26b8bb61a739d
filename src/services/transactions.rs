//! Multi-document units that must be atomic or safely compensatable:
//! favorite toggling, username fan-out, and cascading deletes. Everything
//! here runs inside store transactions; an abort surfaces as `Conflict`.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::{MySql, Transaction};

use crate::config::DbPool;
use crate::services::error::{ApiError, ApiResult};

lazy_static! {
    // Alphanumeric, optionally split by a single embedded whitespace.
    static ref USERNAME_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9]+\s?[a-zA-Z0-9]+$|^[a-zA-Z0-9]+$").unwrap();
}

pub fn is_valid_username(name: &str) -> bool {
    USERNAME_RE.is_match(name)
}

/// Idempotent favorite toggle. Membership check, set mutation and counter
/// mutation happen in one transaction; the event row is locked first so
/// concurrent toggles on the same pair serialize instead of double-counting.
/// Returns the new like count.
pub async fn toggle_favorite(pool: &DbPool, user_id: &str, event_id: &str) -> ApiResult<i32> {
    let mut tx = pool.begin().await?;

    let like_count: Option<i32> =
        sqlx::query_scalar("SELECT like_count FROM events WHERE id = ? AND valid = TRUE FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

    // Toggling a deleted or unknown event is a stale-target conflict
    let like_count = like_count.ok_or_else(|| ApiError::conflict("Event no longer exists"))?;

    let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND event_id = ?")
        .bind(user_id)
        .bind(event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let new_count = if removed > 0 {
        sqlx::query("UPDATE events SET like_count = like_count - 1 WHERE id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        like_count - 1
    } else {
        sqlx::query("INSERT INTO favorites (user_id, event_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE events SET like_count = like_count + 1 WHERE id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        like_count + 1
    };

    tx.commit().await?;
    Ok(new_count)
}

/// Rename a user and fan the new name out to every comment they authored.
/// Either the user row and all author snapshots change, or none do.
pub async fn change_username(pool: &DbPool, user_id: &str, new_name: &str) -> ApiResult<()> {
    if !is_valid_username(new_name) {
        return Err(ApiError::conflict("Username is not allowed"));
    }

    let mut tx = pool.begin().await?;

    let current: Option<String> = sqlx::query_scalar("SELECT name FROM users WHERE id = ? FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

    let current = current.ok_or(ApiError::NotFound)?;
    if current == new_name {
        return Err(ApiError::conflict("Username is equal to the old one"));
    }

    let taken: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE name = ? AND id <> ?")
        .bind(new_name)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if taken.is_some() {
        return Err(ApiError::conflict("Username already in use"));
    }

    // The unique index on users.name backs this up against racing renames;
    // a duplicate-key abort rolls the whole unit back.
    sqlx::query("UPDATE users SET name = ? WHERE id = ?")
        .bind(new_name)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_to_conflict)?;

    sqlx::query("UPDATE comments SET author = ? WHERE user_id = ?")
        .bind(new_name)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

fn duplicate_to_conflict(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::conflict("Username already in use")
        }
        _ => ApiError::Database(e),
    }
}

/// Soft cascade: pull the event out of every favorites set, drop its
/// comments and invalidate it. The creation timestamp is re-stamped so the
/// tombstone sorts out of incremental sync windows.
pub async fn cascade_delete_event(pool: &DbPool, event_id: &str) -> ApiResult<()> {
    let mut tx = pool.begin().await?;
    cascade_delete_event_tx(&mut tx, event_id).await?;
    tx.commit().await?;
    Ok(())
}

async fn cascade_delete_event_tx(
    tx: &mut Transaction<'_, MySql>,
    event_id: &str,
) -> ApiResult<()> {
    sqlx::query("DELETE FROM favorites WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("UPDATE events SET valid = FALSE, creation_timestamp = ? WHERE id = ?")
        .bind(Utc::now().timestamp_millis())
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Hard cascade: true removal. Used when a moderation delete link is
/// followed, or when a quarantined event has no owner left to review it.
pub async fn hard_delete_event(pool: &DbPool, event_id: &str) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM favorites WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE event_id = ?")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    // categories, reporters and viewers fall with the event row (FK cascade)
    sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a user and everything that references them. Each owned event's
/// cascade is its own atomic unit; the overall sequence is idempotent, so an
/// interrupted run can simply be retried.
pub async fn cascade_delete_user(pool: &DbPool, user_id: &str) -> ApiResult<()> {
    // The counter compensation and the favorites rows it is derived from must
    // move together: if the decrement landed without the delete, a retry
    // would decrement the surviving rows a second time.
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE events e
         JOIN favorites f ON f.event_id = e.id
         SET e.like_count = e.like_count - 1
         WHERE f.user_id = ?",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM favorites WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let owned: Vec<String> = sqlx::query_scalar("SELECT id FROM events WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    for event_id in owned {
        cascade_delete_event(pool, &event_id).await?;
    }

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE sessions SET valid = FALSE WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
