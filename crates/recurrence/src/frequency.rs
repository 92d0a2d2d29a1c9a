//! Frequency tags and reminder kinds.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How often a reminder repeats.
///
/// Unknown tags are kept verbatim in [`Frequency::Other`] and behave like
/// [`Frequency::Once`] for scheduling purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[default]
    Once,
    Daily,
    TwiceADay,
    Weekly,
    Monthly,
    Other(String),
}

impl Frequency {
    /// The wire/storage tag for this frequency.
    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::TwiceADay => "twice a day",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Other(tag) => tag,
        }
    }

    /// Whether the reminder stays active after it fires.
    pub fn is_recurring(&self) -> bool {
        matches!(
            self,
            Frequency::Daily | Frequency::TwiceADay | Frequency::Weekly | Frequency::Monthly
        )
    }
}

impl From<&str> for Frequency {
    fn from(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "once" | "" => Frequency::Once,
            "daily" => Frequency::Daily,
            "twice a day" => Frequency::TwiceADay,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Other(tag.to_string()),
        }
    }
}

impl From<String> for Frequency {
    fn from(tag: String) -> Self {
        Frequency::from(tag.as_str())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Frequency::from(tag))
    }
}

/// Coarse category of a reminder, derived from its description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Medication,
    Appointment,
    Exercise,
    #[default]
    Other,
}

impl ReminderKind {
    /// Classify a reminder description by keyword.
    pub fn classify(what: &str) -> Self {
        let what = what.to_lowercase();
        if what.contains("medicine") || what.contains("medication") {
            ReminderKind::Medication
        } else if what.contains("appointment") {
            ReminderKind::Appointment
        } else if what.contains("exercise") {
            ReminderKind::Exercise
        } else {
            ReminderKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Medication => "medication",
            ReminderKind::Appointment => "appointment",
            ReminderKind::Exercise => "exercise",
            ReminderKind::Other => "other",
        }
    }
}

impl From<&str> for ReminderKind {
    fn from(tag: &str) -> Self {
        match tag {
            "medication" => ReminderKind::Medication,
            "appointment" => ReminderKind::Appointment,
            "exercise" => ReminderKind::Exercise,
            _ => ReminderKind::Other,
        }
    }
}

impl From<String> for ReminderKind {
    fn from(tag: String) -> Self {
        ReminderKind::from(tag.as_str())
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
