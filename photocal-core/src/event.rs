//! The event record extracted from a photo.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::UNTITLED_EVENT;
use crate::error::{PhotocalError, PhotocalResult};
use crate::validate::{is_canonical_date, is_valid_time};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// A calendar event, either pending review or saved in the store.
///
/// Records read back from storage are taken as-is; only records coming out
/// of the extraction pipeline are guaranteed to carry a canonical date/time.
/// Older records may lack any field but `id`; missing fields load empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// 24-hour `HH:MM`
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub context: String,
    /// Local handle to the source photo. Not guaranteed to outlive the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl EventRecord {
    pub fn new(
        title: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        context: impl Into<String>,
        photo_url: Option<String>,
    ) -> Self {
        EventRecord {
            id: next_id(),
            title: title.into(),
            date: date.into(),
            time: time.into(),
            context: context.into(),
            photo_url,
        }
    }

    /// Title to show, with the placeholder for empty titles.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_EVENT
        } else {
            &self.title
        }
    }

    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn naive_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").ok()
    }

    /// "Wednesday, March 20, 2024", or the raw date if it doesn't parse.
    pub fn date_label(&self) -> String {
        match self.naive_date() {
            Some(d) => d.format("%A, %B %-d, %Y").to_string(),
            None => self.date.clone(),
        }
    }

    /// "3:05 PM", or the raw time if it doesn't parse.
    pub fn time_label(&self) -> String {
        match self.naive_time() {
            Some(t) => t.format("%-I:%M %p").to_string(),
            None => self.time.clone(),
        }
    }

    /// Reject records whose date or time isn't in canonical form.
    pub fn check(&self) -> PhotocalResult<()> {
        if !is_canonical_date(&self.date) {
            return Err(PhotocalError::InvalidRecord(format!(
                "date '{}' is not a valid YYYY-MM-DD date",
                self.date
            )));
        }
        if !is_valid_time(&self.time) {
            return Err(PhotocalError::InvalidRecord(format!(
                "time '{}' is not a valid 24-hour HH:MM time",
                self.time
            )));
        }
        Ok(())
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

/// Millisecond timestamp, bumped so ids from one process never repeat.
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record() -> EventRecord {
        EventRecord {
            id: "1718000000000".to_string(),
            title: "Jazz Night".to_string(),
            date: "2024-03-20".to_string(),
            time: "15:05".to_string(),
            context: "Blue Note".to_string(),
            photo_url: None,
        }
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let ids: Vec<i64> = (0..50).map(|_| next_id().parse().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn serializes_with_camel_case_photo_url() {
        let mut record = make_record();
        record.photo_url = Some("file:///tmp/poster.jpg".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["photoUrl"], "file:///tmp/poster.jpg");
        assert!(json.get("photo_url").is_none());
    }

    #[test]
    fn missing_photo_url_is_omitted_and_accepted() {
        let json = serde_json::to_string(&make_record()).unwrap();
        assert!(!json.contains("photoUrl"));

        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, make_record());
    }

    #[test]
    fn empty_title_displays_placeholder() {
        let mut record = make_record();
        record.title = "  ".to_string();
        assert_eq!(record.display_title(), "Untitled Event");
        assert_eq!(record.to_string(), "Untitled Event");
    }

    #[test]
    fn labels() {
        let record = make_record();
        assert_eq!(record.date_label(), "Wednesday, March 20, 2024");
        assert_eq!(record.time_label(), "3:05 PM");
    }

    #[test]
    fn labels_fall_back_to_raw_values() {
        let mut record = make_record();
        record.date = "someday".to_string();
        record.time = "late".to_string();
        assert_eq!(record.date_label(), "someday");
        assert_eq!(record.time_label(), "late");
    }

    #[test]
    fn check_rejects_non_canonical_fields() {
        assert!(make_record().check().is_ok());

        let mut bad_date = make_record();
        bad_date.date = "2024-3-20".to_string();
        assert!(matches!(bad_date.check(), Err(PhotocalError::InvalidRecord(_))));

        let mut bad_time = make_record();
        bad_time.time = "25:00".to_string();
        assert!(matches!(bad_time.check(), Err(PhotocalError::InvalidRecord(_))));
    }
}
