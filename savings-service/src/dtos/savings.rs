use crate::models::{RepeatInterval, Saving, SavingChanges};
use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavingRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "validate_amount"))]
    pub amount: f64,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<DateTime<Utc>>,

    pub category: Option<String>,

    #[serde(default)]
    pub repeat: bool,

    pub repeat_interval: Option<RepeatInterval>,

    #[validate(range(min = 1, message = "Repeat duration must be at least 1"))]
    pub repeat_duration: Option<u32>,
}

impl From<CreateSavingRequest> for Saving {
    fn from(req: CreateSavingRequest) -> Self {
        Saving::new(req.title, req.amount, req.date)
            .with_category(req.category)
            .with_recurrence(req.repeat, req.repeat_interval, req.repeat_duration)
    }
}

/// Partial update. Absent fields are left alone; `null` clears `category`,
/// `repeatInterval` and `repeatDuration`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSavingRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub amount: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "nullable")]
    pub category: Option<Option<String>>,

    pub repeat: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    pub repeat_interval: Option<Option<RepeatInterval>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1, message = "Repeat duration must be at least 1"))]
    pub repeat_duration: Option<Option<u32>>,
}

impl From<UpdateSavingRequest> for SavingChanges {
    fn from(req: UpdateSavingRequest) -> Self {
        Self {
            title: req.title,
            amount: req.amount,
            date: req.date.map(|d| d.trunc_subsecs(3)),
            category: req.category,
            repeat: req.repeat,
            repeat_interval: req.repeat_interval,
            repeat_duration: req.repeat_duration,
        }
    }
}

/// A present field, `null` included, becomes `Some`; a missing one stays `None`
/// through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateInput {
    Instant(DateTime<Utc>),
    Day(NaiveDate),
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD`, read as midnight UTC.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DateInput>::deserialize(deserializer)?.map(|input| match input {
            DateInput::Instant(at) => at,
            DateInput::Day(day) => day.and_time(NaiveTime::MIN).and_utc(),
        }),
    )
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("finite");
        err.message = Some("Amount must be a finite number".into());
        Err(err)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateIntervalParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingResponse {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub date: String,
    pub category: Option<String>,
    pub repeat: bool,
    pub repeat_interval: Option<RepeatInterval>,
    pub repeat_duration: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Saving> for SavingResponse {
    fn from(saving: Saving) -> Self {
        Self {
            id: saving.id,
            title: saving.title,
            amount: saving.amount,
            date: saving.date.to_rfc3339(),
            category: saving.category,
            repeat: saving.repeat,
            repeat_interval: saving.repeat_interval,
            repeat_duration: saving.repeat_duration,
            created_at: saving.created_at.to_rfc3339(),
            updated_at: saving.updated_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create(json: serde_json::Value) -> Result<CreateSavingRequest, serde_json::Error> {
        serde_json::from_value(json)
    }

    #[test]
    fn create_request_accepts_minimal_body() {
        let req = create(serde_json::json!({ "title": "Rent", "amount": 500 })).unwrap();

        assert!(req.validate().is_ok());
        assert!(!req.repeat);
        assert!(req.date.is_none());
    }

    #[test]
    fn create_request_reads_camel_case_fields() {
        let req = create(serde_json::json!({
            "title": "Gym",
            "amount": 30.5,
            "date": "2024-05-01T08:00:00Z",
            "category": "health",
            "repeat": true,
            "repeatInterval": "monthly",
            "repeatDuration": 12
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.repeat_interval, Some(RepeatInterval::Monthly));
        assert_eq!(req.repeat_duration, Some(12));
    }

    #[test]
    fn empty_title_fails_validation() {
        let req = create(serde_json::json!({ "title": "", "amount": 1 })).unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn zero_repeat_duration_fails_validation() {
        let req = create(serde_json::json!({
            "title": "Gym",
            "amount": 1,
            "repeatDuration": 0
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn non_numeric_amount_does_not_deserialize() {
        assert!(create(serde_json::json!({ "title": "Rent", "amount": "500" })).is_err());
    }

    #[test]
    fn non_boolean_repeat_does_not_deserialize() {
        assert!(create(serde_json::json!({ "title": "Rent", "amount": 1, "repeat": "yes" })).is_err());
    }

    #[test]
    fn infinite_amount_fails_validation() {
        assert!(validate_amount(f64::INFINITY).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(-12.5).is_ok());
    }

    #[test]
    fn update_request_maps_to_changes() {
        let req: UpdateSavingRequest =
            serde_json::from_value(serde_json::json!({ "amount": 42.0 })).unwrap();

        let changes = SavingChanges::from(req);
        assert_eq!(changes.amount, Some(42.0));
        assert!(changes.title.is_none());
        assert!(!changes.is_empty());
    }

    #[test]
    fn bare_calendar_date_reads_as_midnight_utc() {
        let req = create(serde_json::json!({
            "title": "Rent",
            "amount": 500,
            "date": "2024-05-01"
        }))
        .unwrap();

        assert_eq!(
            req.date,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert!(
            create(serde_json::json!({ "title": "Rent", "amount": 1, "date": "May 1st" })).is_err()
        );
    }

    #[test]
    fn update_request_tells_null_from_missing() {
        let req: UpdateSavingRequest = serde_json::from_value(serde_json::json!({
            "category": null,
            "repeatDuration": 3
        }))
        .unwrap();

        assert_eq!(req.category, Some(None));
        assert_eq!(req.repeat_duration, Some(Some(3)));
        assert_eq!(req.repeat_interval, None);
        assert!(!SavingChanges::from(req).is_empty());
    }

    #[test]
    fn update_request_rejects_zero_repeat_duration() {
        let req: UpdateSavingRequest =
            serde_json::from_value(serde_json::json!({ "repeatDuration": 0 })).unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn response_uses_camel_case() {
        let saving = Saving::new("Rent".to_string(), 500.0, None)
            .with_recurrence(true, Some(RepeatInterval::Yearly), None);

        let json = serde_json::to_value(SavingResponse::from(saving.clone())).unwrap();
        assert_eq!(json["id"], saving.id);
        assert_eq!(json["repeatInterval"], "yearly");
        assert!(json.get("createdAt").is_some());
    }
}
