//! Prometheus text exposition of a collection cycle.
//!
//! Two views are rendered from the same [`CycleReport`]:
//! - [`render_history`]: the reconstructed step signal, one timestamped
//!   `greatriverenergy_shed_event` sample per emitted point
//! - [`render_realtime`]: instantaneous gauges (countdowns, forecast
//!   likelihoods, conservation gauge and shed counts)

use std::fmt::Write;

use chrono::NaiveTime;

use crate::collector::CycleReport;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const SHED_EVENT: &str = "greatriverenergy_shed_event";
const ONGOING: &str = "greatriverenergy_ongoing_shed_event";
const UNTIL_START: &str = "greatriverenergy_time_until_shed_start";
const UNTIL_END: &str = "greatriverenergy_time_until_shed_end";
const CONSERVATION: &str = "greatriverenergy_conservation_gauge";
const LIKELIHOOD: &str = "greatriverenergy_shed_likelihood";
const SCHEDULE_UPDATED: &str = "greatriverenergy_scheduled_updated";
const SHED_COUNT: &str = "greatriverenergy_shed_count";
const SHED_COUNT_RESET: &str = "greatriverenergy_shed_count_reset_on";

fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// Accumulates metric families into an exposition body.
#[derive(Debug, Default)]
struct MetricWriter {
    body: String,
}

impl MetricWriter {
    fn family(&mut self, name: &str, kind: &str, help: &str) {
        // Writing to a String cannot fail.
        let _ = writeln!(self.body, "# HELP {name} {help}");
        let _ = writeln!(self.body, "# TYPE {name} {kind}");
    }

    fn sample(&mut self, name: &str, labels: &[(&str, &str)], value: f64, timestamp_ms: Option<i64>) {
        self.body.push_str(name);
        if !labels.is_empty() {
            let rendered: Vec<String> = labels
                .iter()
                .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
                .collect();
            let _ = write!(self.body, "{{{}}}", rendered.join(","));
        }
        let _ = write!(self.body, " {value}");
        if let Some(ts) = timestamp_ms {
            let _ = write!(self.body, " {ts}");
        }
        self.body.push('\n');
    }

    fn finish(self) -> String {
        self.body
    }
}

/// Renders every emitted step sample as a timestamped `greatriverenergy_shed_event` gauge.
pub fn render_history(report: &CycleReport) -> String {
    let mut w = MetricWriter::default();
    w.family(SHED_EVENT, "gauge", "A load shedding event that occurred");
    for class in report.reports() {
        for s in &class.samples {
            w.sample(
                SHED_EVENT,
                &[("class", s.class.as_str()), ("program", s.program.as_str())],
                f64::from(s.value),
                Some(s.timestamp.timestamp_millis()),
            );
        }
    }
    w.finish()
}

/// Renders countdowns and forecast gauges as instantaneous values.
pub fn render_realtime(report: &CycleReport) -> String {
    let mut w = MetricWriter::default();

    if let Some(forecast) = &report.forecast {
        w.family(
            CONSERVATION,
            "gauge",
            "An indicator of electric transmission system load versus capacity. 1 = Normal, 2 = Elevated, 3 = Peak, 4 = Critical",
        );
        w.sample(
            CONSERVATION,
            &[],
            f64::from(forecast.conservation_gauge.gauge_value()),
            None,
        );

        w.family(
            LIKELIHOOD,
            "gauge",
            "An indicator of the likelihood of using a load shedding program. 1 = Unlikely, 2 = Possible, 3 = Likely, 4 = Scheduled",
        );
        for (when, entries) in [("today", &forecast.today), ("next_day", &forecast.next_day)] {
            for entry in entries {
                if let Some(value) = entry.likelihood.gauge_value() {
                    w.sample(
                        LIKELIHOOD,
                        &[("program", entry.program.as_str()), ("when", when)],
                        f64::from(value),
                        None,
                    );
                }
            }
        }

        w.family(
            SCHEDULE_UPDATED,
            "gauge",
            "The timestamp at which the schedule was last updated",
        );
        w.sample(
            SCHEDULE_UPDATED,
            &[],
            forecast.last_updated.timestamp() as f64,
            None,
        );
    }

    if let Some(counts) = &report.shed_counts {
        w.family(
            SHED_COUNT,
            "counter",
            "The number of times a load shedding event occurred",
        );
        for (program, count) in &counts.table {
            w.sample(SHED_COUNT, &[("program", program.as_str())], *count as f64, None);
        }

        w.family(
            SHED_COUNT_RESET,
            "gauge",
            "The date at which the shed counts were last reset",
        );
        let reset = counts.last_reset_on.and_time(NaiveTime::MIN).and_utc();
        w.sample(SHED_COUNT_RESET, &[], reset.timestamp() as f64, None);
    }

    w.family(
        ONGOING,
        "gauge",
        "Whether a particular load shedding program is ongoing at the present time",
    );
    for class in report.reports() {
        for (program, record) in &class.countdowns {
            w.sample(
                ONGOING,
                &[("class", class.class.as_str()), ("program", program.as_str())],
                f64::from(record.ongoing),
                None,
            );
        }
    }

    w.family(
        UNTIL_START,
        "gauge",
        "The number of seconds before a scheduled shed event starts",
    );
    for class in report.reports() {
        for (program, record) in &class.countdowns {
            if let Some(seconds) = record.seconds_until_start {
                w.sample(
                    UNTIL_START,
                    &[("class", class.class.as_str()), ("program", program.as_str())],
                    seconds,
                    None,
                );
            }
        }
    }

    w.family(UNTIL_END, "gauge", "The number of seconds before a scheduled shed event ends");
    for class in report.reports() {
        for (program, record) in &class.countdowns {
            if let Some(seconds) = record.seconds_until_end {
                w.sample(
                    UNTIL_END,
                    &[("class", class.class.as_str()), ("program", program.as_str())],
                    seconds,
                    None,
                );
            }
        }
    }

    w.finish()
}
