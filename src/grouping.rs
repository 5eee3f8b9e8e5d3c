use chrono::{Duration, Local, NaiveDate};

use crate::models::{DateBucket, GroupedHealthChecks, HealthCheck};

/// Bucket records by local calendar day, labelling the current day
/// "Today" and the previous one "Yesterday".
pub fn group_by_date(checks: &[HealthCheck]) -> GroupedHealthChecks {
    group_by_date_on(checks, Local::now().date_naive())
}

/// Same as `group_by_date` with the reference day passed explicitly.
///
/// Buckets are created on first encounter while scanning the input in
/// order, so with a timestamp-descending query the "Today" bucket
/// naturally comes first. Order within a bucket is the input order.
pub fn group_by_date_on(checks: &[HealthCheck], today: NaiveDate) -> GroupedHealthChecks {
    let mut groups: GroupedHealthChecks = Vec::new();

    for check in checks {
        let day = check.timestamp.with_timezone(&Local).date_naive();
        let label = date_label(day, today);
        match groups.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.checks.push(check.clone()),
            None => groups.push(DateBucket {
                label,
                checks: vec![check.clone()],
            }),
        }
    }

    groups
}

pub fn date_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if day == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        day.format("%B %-d, %Y").to_string()
    }
}
