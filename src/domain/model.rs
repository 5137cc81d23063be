use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DATE_FORMAT: &str = "%Y%m%d";

/// Step between two retrievals. Weekly products are published on Mondays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
}

impl Cadence {
    pub fn step(&self) -> Duration {
        match self {
            Cadence::Daily => Duration::days(1),
            Cadence::Weekly => Duration::days(7),
        }
    }
}

/// Inclusive range of dates to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cadence: Cadence,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate, cadence: Cadence) -> Self {
        Self {
            start,
            end,
            cadence,
        }
    }

    /// Ascending dates from `start` to `end`. Empty when `end < start`.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let step = self.cadence.step();
        let end = self.end;
        std::iter::successors(Some(self.start), move |d| d.checked_add_signed(step))
            .take_while(move |d| *d <= end)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `{prefix}_{yyyymmdd}.nc`
pub fn output_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.nc", prefix, format_date(date))
}

/// One retrieval: built fresh for every date of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub source: String,
    pub date: NaiveDate,
    pub output_dir: PathBuf,
    pub prefix: String,
}

impl RetrievalRequest {
    pub fn date_str(&self) -> String {
        format_date(self.date)
    }

    pub fn output_file_name(&self) -> String {
        output_file_name(&self.prefix, self.date)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }
}
