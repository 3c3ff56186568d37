//! Core types for SongDesk

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::{Error, Result};

/// Strict shape of a date parameter; chrono alone accepts "2025-3-1"
static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

/// Accept strings, numbers and booleans as text; `null` becomes empty
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

/// Incoming song order from the intake form
///
/// Every field is optional on the wire; omitted fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub styles: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vocal: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brief: String,
    /// Requester email, when the form collects it
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    /// Occasion the song is for (wedding, birthday, ...)
    #[serde(default, deserialize_with = "lenient_string")]
    pub event_type: String,
}

/// Result returned to the intake form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongResponse {
    pub lyrics: String,
    pub song_urls: Vec<String>,
}

/// One order row, minus the server-side date/time stamps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub email: String,
    pub style: String,
    pub vocal: String,
    pub language: String,
    pub event_type: String,
    pub brief: String,
    pub lyrics: String,
    pub mp3_link_1: String,
    pub mp3_link_2: String,
}

impl LogRecord {
    /// Build a record from the order fields of a request
    pub fn from_request(req: &SongRequest) -> Self {
        Self {
            email: req.email.clone(),
            style: req.styles.clone(),
            vocal: req.vocal.clone(),
            language: req.language.clone(),
            event_type: req.event_type.clone(),
            brief: req.brief.clone(),
            ..Default::default()
        }
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = lyrics.into();
        self
    }

    /// Keep the first two links; extra links have no column
    pub fn with_links(mut self, links: &[String]) -> Self {
        let mut iter = links.iter();
        self.mp3_link_1 = iter.next().cloned().unwrap_or_default();
        self.mp3_link_2 = iter.next().cloned().unwrap_or_default();
        self
    }

    /// Cells of this record in `LOG_HEADER` order, stamped with `at`
    pub fn to_row(&self, at: NaiveDateTime) -> Vec<String> {
        vec![
            self.email.clone(),
            self.style.clone(),
            self.vocal.clone(),
            self.language.clone(),
            self.event_type.clone(),
            self.brief.clone(),
            self.lyrics.clone(),
            self.mp3_link_1.clone(),
            self.mp3_link_2.clone(),
            at.format(DATE_FORMAT).to_string(),
            at.format(TIME_FORMAT).to_string(),
        ]
    }
}

/// Calendar date that names a daily log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogDate(NaiveDate);

impl LogDate {
    pub fn from_datetime(at: &NaiveDateTime) -> Self {
        Self(at.date())
    }

    /// File name of this date's spreadsheet
    pub fn file_name(&self, prefix: &str) -> String {
        log_file_name(prefix, &self.to_string())
    }
}

impl FromStr for LogDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !DATE_REGEX.is_match(s) {
            return Err(Error::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(LogDate)
            .map_err(|_| Error::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}
