//! File-backed source reading exported event logs and forecast documents.
//!
//! Layout under the data directory:
//!
//! ```text
//! history/<history_code>.csv   date,program,start,hours
//! forecast.json                Forecast document
//! shed_counts.json             ShedCounts document
//! ```
//!
//! Dates and times in the event log are wall-clock times in the utility's
//! IANA zone, daylight saving included.

use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{HistoryRequest, ShedSource};
use crate::config::{ClassConfig, SourceConfig};
use crate::error::FetchError;
use crate::shed::types::{Forecast, History, Interval, ShedCounts};

const FORECAST_FILE: &str = "forecast.json";
const SHED_COUNTS_FILE: &str = "shed_counts.json";

/// One row of an exported event log.
#[derive(Debug, Deserialize)]
struct EventRow {
    /// `MM/DD/YYYY`
    date: String,
    program: String,
    /// `HH:MM`, 24-hour local time
    start: String,
    hours: f64,
}

/// Resolves a wall-clock time in `tz`, taking the earlier instant when the
/// clock falls back and `None` inside a spring-forward gap.
fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

/// Clamps `t` to the start of its local day in `tz`.
///
/// Zones that spring forward at midnight start the day at 01:00.
pub fn local_midnight(t: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = t.with_timezone(&tz).date_naive().and_time(NaiveTime::MIN);
    local_to_utc(midnight, tz).or_else(|| local_to_utc(midnight + TimeDelta::hours(1), tz))
}

/// Reads records from a data directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
    tz: Tz,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            data_dir: data_dir.into(),
            tz,
        }
    }

    /// Builds a source from configuration, or `None` if the zone is unknown.
    pub fn from_config(config: &SourceConfig) -> Option<Self> {
        config.tz().map(|tz| Self::new(&config.data_dir, tz))
    }

    /// Path of the event log for `class`.
    pub fn history_path(&self, class: &ClassConfig) -> PathBuf {
        self.data_dir
            .join("history")
            .join(format!("{}.csv", class.history_code))
    }

    fn read_events(
        &self,
        reader: impl Read,
        path: &Path,
        class: &ClassConfig,
        days: RangeInclusive<NaiveDate>,
    ) -> Result<Vec<Interval>, FetchError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut events = Vec::new();
        for (i, row) in csv_reader.deserialize::<EventRow>().enumerate() {
            let row = row.map_err(|source| FetchError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            // header is line 1
            let line = i + 2;
            let record_error = |message: String| FetchError::Record {
                path: path.to_path_buf(),
                line,
                message,
            };

            let date = NaiveDate::parse_from_str(&row.date, "%m/%d/%Y")
                .map_err(|e| record_error(format!("bad date \"{}\": {e}", row.date)))?;
            if !days.contains(&date) {
                continue;
            }
            let time = NaiveTime::parse_from_str(&row.start, "%H:%M")
                .map_err(|e| record_error(format!("bad start time \"{}\": {e}", row.start)))?;
            if !row.hours.is_finite() {
                return Err(record_error(format!("bad hours {}", row.hours)));
            }

            let start = local_to_utc(date.and_time(time), self.tz).ok_or_else(|| {
                record_error(format!(
                    "{} {} does not exist in {}",
                    row.date,
                    row.start,
                    self.tz.name()
                ))
            })?;
            let end = TimeDelta::try_seconds((row.hours * 3600.0).round() as i64)
                .and_then(|length| start.checked_add_signed(length))
                .ok_or_else(|| record_error(format!("hours {} out of range", row.hours)))?;
            events.push(Interval::new(row.program, &*class.name, start, end));
        }
        Ok(events)
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, FetchError> {
        let path = self.data_dir.join(name);
        let content = fs::read_to_string(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FetchError::Json { path, source })
    }

    fn midnight(&self, t: DateTime<Utc>) -> Result<DateTime<Utc>, FetchError> {
        local_midnight(t, self.tz).ok_or_else(|| FetchError::Unavailable {
            what: format!("local midnight of {t}"),
            reason: format!("no such instant in {}", self.tz.name()),
        })
    }
}

impl ShedSource for FileSource {
    fn history(
        &self,
        class: &ClassConfig,
        request: &HistoryRequest,
    ) -> Result<History, FetchError> {
        let start_on = self.midnight(request.start)?;
        let end_on = self.midnight(request.end)?;
        let days = request.start.with_timezone(&self.tz).date_naive()
            ..=request.end.with_timezone(&self.tz).date_naive();

        let path = self.history_path(class);
        let intervals = match File::open(&path) {
            Ok(file) => self.read_events(file, &path, class, days)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no event log at {}, class {} has no events", path.display(), class.name);
                Vec::new()
            }
            Err(source) => return Err(FetchError::Io { path, source }),
        };

        // Days after today's midnight are not complete yet.
        let coverage_end = end_on.min(self.midnight(request.now)?);

        Ok(History {
            start_on,
            coverage_end,
            intervals,
        })
    }

    fn forecast(&self) -> Result<Forecast, FetchError> {
        self.read_json(FORECAST_FILE)
    }

    fn shed_counts(&self) -> Result<ShedCounts, FetchError> {
        self.read_json(SHED_COUNTS_FILE)
    }
}
