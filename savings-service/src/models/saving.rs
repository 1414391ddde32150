use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How often a recurring saving repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatInterval::Daily => write!(f, "daily"),
            RepeatInterval::Weekly => write!(f, "weekly"),
            RepeatInterval::Monthly => write!(f, "monthly"),
            RepeatInterval::Yearly => write!(f, "yearly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Saving {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub amount: f64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<RepeatInterval>,
    /// Number of `repeat_interval` periods the recurrence runs for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_duration: Option<u32>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Saving {
    /// A new entry dated `date`, or now when no date is given.
    pub fn new(title: String, amount: f64, date: Option<DateTime<Utc>>) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            amount,
            date: date.map(|d| d.trunc_subsecs(3)).unwrap_or(now),
            category: None,
            repeat: false,
            repeat_interval: None,
            repeat_duration: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_recurrence(
        mut self,
        repeat: bool,
        interval: Option<RepeatInterval>,
        duration: Option<u32>,
    ) -> Self {
        self.repeat = repeat;
        if repeat {
            self.repeat_interval = interval;
            self.repeat_duration = duration;
        } else {
            self.repeat_interval = None;
            self.repeat_duration = None;
        }
        self
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, changes: &SavingChanges, now: DateTime<Utc>) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(amount) = changes.amount {
            self.amount = amount;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(category) = &changes.category {
            self.category = category.clone();
        }
        if let Some(repeat) = changes.repeat {
            self.repeat = repeat;
        }
        if let Some(interval) = changes.repeat_interval {
            self.repeat_interval = interval;
        }
        if let Some(duration) = changes.repeat_duration {
            self.repeat_duration = duration;
        }
        if changes.stops_recurrence() {
            self.repeat_interval = None;
            self.repeat_duration = None;
        }
        self.updated_at = now;
    }
}

/// Fields to change on an existing saving.
///
/// The outer `None` leaves a field untouched. For the optional fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavingChanges {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<Option<String>>,
    pub repeat: Option<bool>,
    pub repeat_interval: Option<Option<RepeatInterval>>,
    pub repeat_duration: Option<Option<u32>>,
}

impl SavingChanges {
    pub fn is_empty(&self) -> bool {
        *self == SavingChanges::default()
    }

    /// Turning `repeat` off drops the interval and duration with it.
    pub fn stops_recurrence(&self) -> bool {
        self.repeat == Some(false)
    }

    /// The `$set`/`$unset` update for this change, stamped with `updated_at = now`.
    pub fn to_update_document(&self, now: DateTime<Utc>) -> Document {
        let mut set = doc! { "updated_at": bson::DateTime::from_chrono(now) };
        let mut unset = Document::new();

        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(amount) = self.amount {
            set.insert("amount", amount);
        }
        if let Some(date) = self.date {
            set.insert("date", bson::DateTime::from_chrono(date));
        }
        match &self.category {
            Some(Some(category)) => {
                set.insert("category", category.as_str());
            }
            Some(None) => {
                unset.insert("category", "");
            }
            None => {}
        }
        if let Some(repeat) = self.repeat {
            set.insert("repeat", repeat);
        }

        if self.stops_recurrence() {
            unset.insert("repeat_interval", "");
            unset.insert("repeat_duration", "");
        } else {
            match self.repeat_interval {
                Some(Some(interval)) => {
                    set.insert("repeat_interval", interval.to_string());
                }
                Some(None) => {
                    unset.insert("repeat_interval", "");
                }
                None => {}
            }
            match self.repeat_duration {
                Some(Some(duration)) => {
                    set.insert("repeat_duration", i64::from(duration));
                }
                Some(None) => {
                    unset.insert("repeat_duration", "");
                }
                None => {}
            }
        }

        // MongoDB rejects an empty `$unset`.
        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        update
    }
}

/// Current time at BSON datetime precision, so stored and in-memory values agree.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
