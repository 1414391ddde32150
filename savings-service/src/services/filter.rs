//! Query filters for listing savings.
//!
//! Each filter has two renderings that must agree: `to_document` for MongoDB
//! and `matches` for stores that filter in process.

use crate::models::Saving;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use mongodb::bson::{self, doc, Document};
use service_core::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavingFilter {
    All,
    Date(DateFilter),
    Category(String),
}

/// Calendar-day filter on a saving's `date`, evaluated in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// Everything dated on this day.
    Day(NaiveDate),
    /// Everything from the start of `start` to the end of `end`, both days included.
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateFilter {
    /// Build a filter from the `startDate`/`endDate` query pair.
    ///
    /// A missing end, or an end equal to the start, selects a single day.
    pub fn from_params(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, AppError> {
        match end {
            None => Ok(DateFilter::Day(start)),
            Some(end) if end == start => Ok(DateFilter::Day(start)),
            Some(end) if end < start => Err(AppError::BadRequest(anyhow::anyhow!(
                "startDate {} is after endDate {}",
                start,
                end
            ))),
            Some(end) => Ok(DateFilter::Range { start, end }),
        }
    }

    /// Half-open `[from, until)` window of instants this filter selects.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (first, last) = match *self {
            DateFilter::Day(day) => (day, day),
            DateFilter::Range { start, end } => (start, end),
        };
        let until = last
            .checked_add_days(Days::new(1))
            .map(start_of_day)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        (start_of_day(first), until)
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let (from, until) = self.window();
        from <= *at && *at < until
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

impl SavingFilter {
    pub fn to_document(&self) -> Document {
        match self {
            SavingFilter::All => doc! {},
            SavingFilter::Date(date) => {
                let (from, until) = date.window();
                doc! {
                    "date": {
                        "$gte": bson::DateTime::from_chrono(from),
                        "$lt": bson::DateTime::from_chrono(until),
                    }
                }
            }
            SavingFilter::Category(category) => doc! { "category": category.as_str() },
        }
    }

    pub fn matches(&self, saving: &Saving) -> bool {
        match self {
            SavingFilter::All => true,
            SavingFilter::Date(date) => date.contains(&saving.date),
            SavingFilter::Category(category) => saving.category.as_deref() == Some(category),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SavingFilter::All => "all",
            SavingFilter::Date(_) => "date",
            SavingFilter::Category(_) => "category",
        }
    }
}
