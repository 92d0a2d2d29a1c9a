//! Reminder store operations.
//!
//! Timestamps are epoch milliseconds. A `next_call_time` of 0 marks a reminder
//! that will never fire (a one-off whose time had already passed).

use std::time::Duration;

use chrono::{DateTime, Utc};
use recurrence::{ReminderKind, Zone};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{CreatedReminder, NewReminder, Reminder};
use crate::validation::validate_new_reminder;

macro_rules! select_reminders {
    ($tail:literal) => {
        concat!(
            "SELECT id, user_id, phone_number, what, time_phrase, frequency, kind, ",
            "next_call_time, created_at, last_called, call_count, active, ",
            "last_call_id, locked_until FROM reminders ",
            $tail
        )
    };
}

fn generate_id() -> String {
    format!("reminder_{}", Uuid::new_v4().simple())
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Create a reminder, resolving its time phrase in `zone` relative to `now`.
pub async fn create_reminder(
    pool: &SqlitePool,
    new: &NewReminder,
    zone: &Zone,
    now: DateTime<Utc>,
) -> Result<CreatedReminder> {
    validate_new_reminder(new)?;

    let resolution = zone.resolve(&new.time, &new.frequency, now);
    let reminder = Reminder {
        id: generate_id(),
        user_id: new.user_id.clone(),
        phone_number: new.phone_number.trim().to_string(),
        what: new.what.trim().to_string(),
        time: new.time.trim().to_string(),
        frequency: new.frequency.clone(),
        kind: ReminderKind::classify(&new.what),
        next_call_time: resolution.next_call_time,
        created_at: now.timestamp_millis(),
        last_called: None,
        call_count: 0,
        active: true,
        last_call_id: None,
        locked_until: None,
    };

    sqlx::query(
        r#"
        INSERT INTO reminders (
            id, user_id, phone_number, what, time_phrase, frequency, kind,
            next_call_time, created_at, call_count, active
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 1)
        "#,
    )
    .bind(&reminder.id)
    .bind(&reminder.user_id)
    .bind(&reminder.phone_number)
    .bind(&reminder.what)
    .bind(&reminder.time)
    .bind(reminder.frequency.as_str())
    .bind(reminder.kind.as_str())
    .bind(reminder.next_call_time)
    .bind(reminder.created_at)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Reminder",
                    id: reminder.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    if !resolution.is_scheduled() {
        warn!(
            id = %reminder.id,
            time = %reminder.time,
            frequency = %reminder.frequency,
            "One-off reminder time has already passed; it will not be called"
        );
    }

    info!(
        id = %reminder.id,
        phone = %reminder.phone_number,
        frequency = %reminder.frequency,
        resolved = %resolution.time,
        next_call_time = reminder.next_call_time,
        "Reminder created"
    );

    Ok(CreatedReminder {
        reminder,
        resolved_time: resolution.time,
    })
}

/// Get a reminder by ID.
pub async fn get_reminder(pool: &SqlitePool, id: &str) -> Result<Reminder> {
    sqlx::query_as::<_, Reminder>(select_reminders!("WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Reminder",
            id: id.to_string(),
        })
}

/// List all active reminders.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as::<_, Reminder>(select_reminders!(
        "WHERE active = 1 ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

/// List active reminders for a phone number.
pub async fn list_by_phone(pool: &SqlitePool, phone_number: &str) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as::<_, Reminder>(select_reminders!(
        "WHERE active = 1 AND phone_number = ? ORDER BY created_at, id"
    ))
    .bind(phone_number.trim())
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

/// Count active reminders.
pub async fn count_active(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM reminders WHERE active = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Cancel a reminder. Returns `false` if no active reminder had that ID.
pub async fn cancel_reminder(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reminders
        SET active = 0, locked_until = NULL
        WHERE id = ? AND active = 1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    let cancelled = result.rows_affected() > 0;
    if cancelled {
        info!(id = %id, "Reminder cancelled");
    }
    Ok(cancelled)
}

/// List reminders that should fire at `now`, oldest first.
pub async fn list_due(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
    let reminders = sqlx::query_as::<_, Reminder>(select_reminders!(
        "WHERE active = 1 AND next_call_time > 0 AND next_call_time <= ? ORDER BY next_call_time, id"
    ))
    .bind(now.timestamp_millis())
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

/// List reminders that will fire after `now` but within `window`.
pub async fn list_upcoming(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<Vec<Reminder>> {
    let now_ms = now.timestamp_millis();
    let reminders = sqlx::query_as::<_, Reminder>(select_reminders!(
        "WHERE active = 1 AND next_call_time > ? AND next_call_time <= ? ORDER BY next_call_time, id"
    ))
    .bind(now_ms)
    .bind(now_ms.saturating_add(duration_ms(window)))
    .fetch_all(pool)
    .await?;

    Ok(reminders)
}

/// Reserve a due reminder for one scheduler for `lease`.
///
/// Succeeds only if the reminder is still active, due at `now` and not held
/// by an unexpired lease. Returns whether the claim was taken.
pub async fn claim_reminder(
    pool: &SqlitePool,
    id: &str,
    now: DateTime<Utc>,
    lease: Duration,
) -> Result<bool> {
    let now_ms = now.timestamp_millis();
    let result = sqlx::query(
        r#"
        UPDATE reminders
        SET locked_until = ?
        WHERE id = ?
          AND active = 1
          AND next_call_time > 0
          AND next_call_time <= ?
          AND (locked_until IS NULL OR locked_until <= ?)
        "#,
    )
    .bind(now_ms.saturating_add(duration_ms(lease)))
    .bind(id)
    .bind(now_ms)
    .bind(now_ms)
    .execute(pool)
    .await?;

    let claimed = result.rows_affected() > 0;
    debug!(id = %id, claimed, "Claim attempt");
    Ok(claimed)
}

/// Drop a claim so the reminder can be picked up on the next poll.
pub async fn release_claim(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE reminders
        SET locked_until = NULL
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record a successful firing and move the reminder to its next occurrence.
///
/// One-off reminders are deactivated; recurring ones advance by their period.
/// A reminder cancelled while its call was in flight stays inactive. The
/// claim lease is cleared.
pub async fn advance_reminder(
    pool: &SqlitePool,
    id: &str,
    zone: &Zone,
    fired_at: DateTime<Utc>,
    call_id: Option<&str>,
) -> Result<Reminder> {
    let mut tx = pool.begin().await?;

    let reminder = sqlx::query_as::<_, Reminder>(select_reminders!("WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Reminder",
            id: id.to_string(),
        })?;

    let advance = zone.advance(&reminder.frequency, reminder.next_call_time);
    let active = reminder.active && advance.active;
    let call_count = reminder.call_count + 1;
    let last_called = fired_at.timestamp_millis();
    let last_call_id = call_id
        .map(str::to_string)
        .or_else(|| reminder.last_call_id.clone());

    sqlx::query(
        r#"
        UPDATE reminders
        SET next_call_time = ?,
            active = ?,
            call_count = ?,
            last_called = ?,
            last_call_id = ?,
            locked_until = NULL
        WHERE id = ?
        "#,
    )
    .bind(advance.next_call_time)
    .bind(active)
    .bind(call_count)
    .bind(last_called)
    .bind(&last_call_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        id = %id,
        call_count,
        next_call_time = advance.next_call_time,
        active,
        "Reminder advanced"
    );

    Ok(Reminder {
        next_call_time: advance.next_call_time,
        active,
        call_count,
        last_called: Some(last_called),
        last_call_id,
        locked_until: None,
        ..reminder
    })
}
