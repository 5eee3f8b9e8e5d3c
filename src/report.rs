use std::fmt::Write;

use crate::models::{DateBucket, GroupedHealthChecks};
use crate::summary::{self, tier};

pub fn build_report(grouped: &GroupedHealthChecks, window: i64) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Team Health Check Report");
    let _ = writeln!(
        output,
        "Generated from the {window} most recent submissions"
    );

    if grouped.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No health checks recorded for this window.");
        return output;
    }

    for bucket in grouped {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", bucket.label);
        write_bucket(&mut output, bucket);
    }

    let comments: Vec<(&str, &str, &str)> = grouped
        .iter()
        .flat_map(|bucket| {
            bucket.checks.iter().filter_map(|check| {
                check
                    .why
                    .as_deref()
                    .map(|why| (check.name.as_str(), bucket.label.as_str(), why))
            })
        })
        .collect();

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Comments");

    if comments.is_empty() {
        let _ = writeln!(output, "No comments in this window.");
    } else {
        for (name, label, why) in comments.iter().take(5) {
            let _ = writeln!(output, "- {name} ({label}): {why}");
        }
    }

    output
}

fn write_bucket(output: &mut String, bucket: &DateBucket) {
    match summary::average(&bucket.checks) {
        Some(aggregate) => {
            let metrics = [
                ("Morale", aggregate.morale),
                ("Communication", aggregate.communication),
                ("Productivity", aggregate.productivity),
            ];
            for (name, value) in metrics {
                let band = tier(value);
                let _ = writeln!(
                    output,
                    "- {name}: {value:.0}% {} {}",
                    band.emoji(),
                    band.label()
                );
            }
        }
        None => {
            let _ = writeln!(output, "No health check data available for this period.");
        }
    }

    for check in &bucket.checks {
        let _ = write!(
            output,
            "- {}: morale {:.0}, communication {:.0}, productivity {:.0}",
            check.name, check.morale.value, check.communication.value, check.productivity.value
        );
        match &check.why {
            Some(why) => {
                let _ = writeln!(output, " — \"{why}\"");
            }
            None => {
                let _ = writeln!(output);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HealthCheck, MetricResponse};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_check(name: &str, morale: f64, why: Option<&str>) -> HealthCheck {
        HealthCheck {
            id: Uuid::new_v4(),
            name: name.to_string(),
            morale: MetricResponse {
                mood: "Okay".to_string(),
                value: morale,
            },
            communication: MetricResponse {
                mood: "Okay".to_string(),
                value: 50.0,
            },
            productivity: MetricResponse {
                mood: "Okay".to_string(),
                value: 50.0,
            },
            why: why.map(str::to_string),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_window_renders_fallback() {
        let report = build_report(&Vec::new(), 20);
        assert!(report.contains("No health checks recorded for this window."));
    }

    #[test]
    fn buckets_render_averages_and_submissions() {
        let grouped = vec![DateBucket {
            label: "Today".to_string(),
            checks: vec![
                sample_check("Avery Lee", 80.0, Some("Good sprint")),
                sample_check("Jules Moreno", 60.0, None),
            ],
        }];

        let report = build_report(&grouped, 20);
        assert!(report.contains("## Today"));
        assert!(report.contains("- Morale: 70% 🙂 Good"));
        assert!(report.contains("- Avery Lee: morale 80"));
        assert!(report.contains("— \"Good sprint\""));
        assert!(report.contains("- Avery Lee (Today): Good sprint"));
    }

    #[test]
    fn comments_section_notes_when_empty() {
        let grouped = vec![DateBucket {
            label: "Yesterday".to_string(),
            checks: vec![sample_check("Kiara Patel", 90.0, None)],
        }];

        let report = build_report(&grouped, 20);
        assert!(report.contains("No comments in this window."));
    }
}
