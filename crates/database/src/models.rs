//! Database models.

use recurrence::{Frequency, ReminderKind, TimeOfDay, UNSCHEDULED};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A persisted request to phone someone at a computed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Opaque identifier (e.g., "reminder_3f2a...")
    pub id: String,
    /// Owning user, if known
    pub user_id: Option<String>,
    /// E.164 phone number to call
    pub phone_number: String,
    /// What the reminder is about
    pub what: String,
    /// The time phrase as the user gave it (e.g., "after dinner")
    #[sqlx(rename = "time_phrase")]
    pub time: String,
    #[sqlx(try_from = "String")]
    pub frequency: Frequency,
    #[sqlx(try_from = "String")]
    pub kind: ReminderKind,
    /// Next firing in epoch milliseconds; 0 means not scheduled
    pub next_call_time: i64,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    /// Last successful firing in epoch milliseconds
    pub last_called: Option<i64>,
    pub call_count: i64,
    pub active: bool,
    /// Downstream identifier of the most recent call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_call_id: Option<String>,
    /// Claim lease held by a scheduler, in epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<i64>,
}

impl Reminder {
    /// Whether the reminder has a firing time at all.
    pub fn is_scheduled(&self) -> bool {
        self.next_call_time > UNSCHEDULED
    }

    /// Whether the reminder should fire at `now_ms`.
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.active && self.is_scheduled() && self.next_call_time <= now_ms
    }
}

/// Input for creating a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub phone_number: String,
    pub what: String,
    pub time: String,
    /// Missing or `null` means once
    #[serde(default, deserialize_with = "frequency_or_once")]
    pub frequency: Frequency,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn frequency_or_once<'de, D>(deserializer: D) -> Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Frequency::from)
        .unwrap_or_default())
}

impl NewReminder {
    pub fn new(
        phone_number: impl Into<String>,
        what: impl Into<String>,
        time: impl Into<String>,
        frequency: impl Into<Frequency>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            what: what.into(),
            time: time.into(),
            frequency: frequency.into(),
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A freshly inserted reminder with the time its phrase was read as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedReminder {
    pub reminder: Reminder,
    pub resolved_time: TimeOfDay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reminder_optional_fields() {
        let explicit_null: NewReminder = serde_json::from_str(
            r#"{"what":"Take medicine","time":"9:00 PM","frequency":null,"phoneNumber":"+14155550001","userId":null}"#,
        )
        .unwrap();
        assert_eq!(explicit_null.frequency, Frequency::Once);
        assert_eq!(explicit_null.user_id, None);

        let omitted: NewReminder = serde_json::from_str(
            r#"{"what":"Take medicine","time":"9:00 PM","phoneNumber":"+14155550001"}"#,
        )
        .unwrap();
        assert_eq!(omitted, explicit_null);

        let weekly: NewReminder = serde_json::from_str(
            r#"{"what":"Checkup","time":"10 AM","frequency":"Weekly","phoneNumber":"+14155550001"}"#,
        )
        .unwrap();
        assert_eq!(weekly.frequency, Frequency::Weekly);
    }

    #[test]
    fn test_new_reminder_rejects_non_string_frequency() {
        let result = serde_json::from_str::<NewReminder>(
            r#"{"what":"Take medicine","time":"9:00 PM","frequency":3,"phoneNumber":"+14155550001"}"#,
        );
        assert!(result.is_err());
    }
}
