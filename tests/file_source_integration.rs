//! End-to-end collection from a data directory through exposition and export.

mod common;

use std::fs;

use chrono::{Duration, TimeZone, Utc};

use common::{config_toml, write_data_dir};
use shed_timeline::collector::{Collector, CycleReport};
use shed_timeline::config::ExporterConfig;
use shed_timeline::error::FetchError;
use shed_timeline::exposition::{render_history, render_realtime};
use shed_timeline::io::export::export_csv;
use shed_timeline::source::FileSource;

/// 11:00 local time on 07/18/2022.
fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 7, 18, 16, 0, 0).unwrap()
}

fn collect(dir: &std::path::Path) -> CycleReport {
    let config = ExporterConfig::from_toml_str(&config_toml(dir, "127.0.0.1:0")).unwrap();
    assert!(config.validate().is_empty());
    let source = FileSource::from_config(&config.source).unwrap();
    Collector::new(&source, &config).collect(now())
}

#[test]
fn residential_signal_combines_log_and_schedule() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(dir.path());

    let report = collect(dir.path());
    let residential = report.reports().next().unwrap();

    assert_eq!(residential.class, "R");
    assert_eq!(
        residential.coverage_end,
        Utc.with_ymd_and_hms(2022, 7, 18, 5, 0, 0).unwrap()
    );

    let ac: Vec<_> = residential
        .samples
        .iter()
        .filter(|s| s.program == "Cycled Air Conditioning")
        .map(|s| (s.timestamp, s.value))
        .collect();
    let logged_start = Utc.with_ymd_and_hms(2022, 7, 17, 19, 0, 0).unwrap();
    let scheduled_start = Utc.with_ymd_and_hms(2022, 7, 18, 19, 0, 0).unwrap();
    // Duplicated row collapses; the scheduled run has no trailing 0 past coverage.
    assert_eq!(ac.len(), 1 + 120 + 1 + 1 + 180);
    assert_eq!(ac[0], (logged_start - Duration::minutes(1), 0));
    assert_eq!(ac[121], (logged_start + Duration::minutes(121), 0));
    assert_eq!(ac[122], (scheduled_start - Duration::minutes(1), 0));
    assert_eq!(ac.last(), Some(&(scheduled_start + Duration::minutes(179), 1)));

    let water = residential
        .samples
        .iter()
        .filter(|s| s.program == "Interruptible Water Heating")
        .count();
    assert_eq!(water, 1 + 30 + 1);

    let ac_countdown = &residential.countdowns["Cycled Air Conditioning"];
    assert_eq!(ac_countdown.ongoing, 0);
    assert_eq!(ac_countdown.seconds_until_start, Some(10_800.0));
    assert_eq!(ac_countdown.seconds_until_end, Some(21_600.0));
    assert_eq!(
        residential.countdowns["Interruptible Water Heating"].seconds_until_start,
        None
    );
}

#[test]
fn malformed_class_log_only_fails_that_class() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(dir.path());

    let report = collect(dir.path());

    assert_eq!(report.classes.len(), 2);
    assert!(report.classes[0].result.is_ok());
    assert_eq!(report.classes[1].class, "CI");
    assert!(matches!(
        report.classes[1].result,
        Err(FetchError::Record { line: 2, .. })
    ));
    assert!(report.forecast.is_some());
    assert!(report.shed_counts.is_some());
}

#[test]
fn oversized_hours_in_one_log_leave_other_classes_intact() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(dir.path());
    fs::write(
        dir.path().join("history").join("CI.csv"),
        "date,program,start,hours\n07/17/2022,GenSet,15:00,1e11\n",
    )
    .unwrap();

    let report = collect(dir.path());

    let residential = report.classes[0].result.as_ref().unwrap();
    assert!(!residential.samples.is_empty());
    match &report.classes[1].result {
        Err(FetchError::Record { line, message, .. }) => {
            assert_eq!(*line, 2);
            assert!(message.contains("out of range"), "{message}");
        }
        other => panic!("expected a record error for CI, got {other:?}"),
    }
}

#[test]
fn realtime_exposition_reflects_the_cycle() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(dir.path());

    let body = render_realtime(&collect(dir.path()));

    assert!(body.contains("greatriverenergy_conservation_gauge 3\n"));
    assert!(body.contains(
        "greatriverenergy_shed_likelihood{program=\"Cycled Air Conditioning\",when=\"today\"} 4\n"
    ));
    assert!(body.contains("greatriverenergy_shed_likelihood{program=\"GenSet\",when=\"next_day\"} 2\n"));
    assert!(body.contains("greatriverenergy_shed_count{program=\"GenSet\"} 2\n"));
    assert!(body.contains(
        "greatriverenergy_time_until_shed_start{class=\"R\",program=\"Cycled Air Conditioning\"} 10800\n"
    ));
    assert!(body.contains(
        "greatriverenergy_ongoing_shed_event{class=\"R\",program=\"Interruptible Water Heating\"} 0\n"
    ));
    assert!(!body.contains("class=\"CI\""));
}

#[test]
fn history_exposition_and_csv_export_agree() {
    let dir = tempfile::tempdir().unwrap();
    write_data_dir(dir.path());
    let report = collect(dir.path());

    let body = render_history(&report);
    let exposed = body.lines().filter(|l| l.starts_with("greatriverenergy_shed_event{")).count();

    let samples: Vec<_> = report
        .reports()
        .flat_map(|r| r.samples.iter().cloned())
        .collect();
    let out = dir.path().join("samples.csv");
    export_csv(&samples, &out).unwrap();
    let csv = fs::read_to_string(&out).unwrap();

    assert_eq!(exposed, samples.len());
    assert_eq!(csv.lines().count(), samples.len() + 1);
    assert_eq!(csv.lines().next(), Some("class,program,timestamp,value"));
}

#[test]
fn missing_documents_degrade_gauges_only() {
    let dir = tempfile::tempdir().unwrap();

    let report = collect(dir.path());

    assert!(report.forecast.is_none());
    assert!(report.shed_counts.is_none());
    assert_eq!(report.reports().count(), 2);
    assert!(report.reports().all(|r| r.samples.is_empty()));

    let body = render_realtime(&report);
    assert!(!body.contains("greatriverenergy_conservation_gauge"));
    assert!(body.contains("# TYPE greatriverenergy_ongoing_shed_event gauge\n"));
}
