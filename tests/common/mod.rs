//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};

use shed_timeline::shed::types::{Interval, Likelihood, ScheduleEntry};

/// A minute on 2022-07-18, UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 7, 18, h, m, 0).unwrap()
}

/// Midnight closing 2022-07-18, used as a coverage boundary past every fixture.
pub fn end_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 7, 19, 0, 0, 0).unwrap()
}

/// Residential interval between two minutes of the fixture day.
pub fn interval(program: &str, start: (u32, u32), end: (u32, u32)) -> Interval {
    Interval::new(program, "R", at(start.0, start.1), at(end.0, end.1))
}

/// Forecast entry with both window timestamps set.
pub fn entry(
    class: &str,
    program: &str,
    likelihood: Likelihood,
    start: (u32, u32),
    end: (u32, u32),
) -> ScheduleEntry {
    ScheduleEntry {
        class: class.to_string(),
        program: program.to_string(),
        likelihood,
        expected_start: Some(at(start.0, start.1)),
        expected_end: Some(at(end.0, end.1)),
    }
}

/// Writes a data directory readable by `FileSource`.
///
/// Local time is America/Chicago, on daylight time in July: 09:00 local on
/// 07/18/2022 is 14:00 UTC.
pub fn write_data_dir(dir: &Path) {
    let history = dir.join("history");
    fs::create_dir_all(&history).unwrap();
    fs::write(
        history.join("RES.csv"),
        "date,program,start,hours\n\
         07/17/2022,Cycled Air Conditioning,14:00,2.0\n\
         07/17/2022,Cycled Air Conditioning,14:00,2.0\n\
         07/17/2022,Interruptible Water Heating,13:30,0.5\n",
    )
    .unwrap();
    fs::write(
        history.join("CI.csv"),
        "date,program,start,hours\n07/17/2022,GenSet,noon,1.0\n",
    )
    .unwrap();
    fs::write(
        dir.join("forecast.json"),
        r#"{
            "conservationGauge": "Peak",
            "today": [
                {"class": "Residential", "program": "Cycled Air Conditioning", "likelihood": "Scheduled",
                 "expectedStart": "2022-07-18T19:00:00Z", "expectedEnd": "2022-07-18T22:00:00Z"},
                {"class": "Residential", "program": "Interruptible Water Heating", "likelihood": "Likely",
                 "expectedStart": "2022-07-18T19:00:00Z", "expectedEnd": "2022-07-18T20:00:00Z"}
            ],
            "nextDay": [
                {"class": "CI", "program": "GenSet", "likelihood": "Possible"}
            ],
            "lastUpdated": "2022-07-18T13:00:00Z"
        }"#,
    )
    .unwrap();
    fs::write(
        dir.join("shed_counts.json"),
        r#"{"table": {"Cycled Air Conditioning": 7, "GenSet": 2}, "lastResetOn": "2022-01-01"}"#,
    )
    .unwrap();
}

/// Configuration pointing at a data directory written by [`write_data_dir`].
pub fn config_toml(data_dir: &Path, listen: &str) -> String {
    format!(
        r#"
[collection]
days_in_past = 3
days_ahead = 1

[[classes]]
name = "R"
history_code = "RES"
forecast_label = "Residential"

[[classes]]
name = "CI"
history_code = "CI"
forecast_label = "CI"

[source]
data_dir = "{}"
time_zone = "America/Chicago"

[server]
listen = "{listen}"
"#,
        data_dir.display().to_string().replace('\\', "\\\\")
    )
}
