use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::HealthCheckError;
use crate::models::{HealthCheck, MetricResponse, NewHealthCheck, RawHealthCheckRow};

/// Turn a loosely-typed stored row into a canonical record.
///
/// Coercion is lenient on purpose: a metric payload missing `mood` or
/// `value` falls back to `""`/`0.0`, and an absent or blank `why`
/// becomes `None`. The one hard failure is an unparseable timestamp,
/// which would otherwise mis-bucket the record during grouping.
pub fn normalize(raw: RawHealthCheckRow) -> Result<HealthCheck, HealthCheckError> {
    Ok(HealthCheck {
        id: raw.id,
        name: raw.name,
        morale: coerce_metric(&raw.morale),
        communication: coerce_metric(&raw.communication),
        productivity: coerce_metric(&raw.productivity),
        why: raw
            .why
            .filter(|why| !why.trim().is_empty()),
        timestamp: parse_timestamp(&raw.timestamp)?,
    })
}

/// Write-path guard: every metric value must lie within [0, 100].
/// Reads never validate, so historical rows always render.
pub fn validate(check: &NewHealthCheck) -> Result<(), HealthCheckError> {
    let metrics = [
        ("morale", &check.morale),
        ("communication", &check.communication),
        ("productivity", &check.productivity),
    ];

    for (metric, response) in metrics {
        if !(0.0..=100.0).contains(&response.value) {
            return Err(HealthCheckError::Validation {
                metric,
                value: response.value,
            });
        }
    }

    Ok(())
}

/// Accepts RFC 3339 as well as the `timestamptz::text` rendering
/// Postgres hands back (`2026-02-03 09:15:00.5+00`).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, HealthCheckError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| HealthCheckError::Format {
            value: value.to_string(),
            source,
        })
}

fn coerce_metric(payload: &Value) -> MetricResponse {
    MetricResponse {
        mood: payload
            .get("mood")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        value: payload.get("value").and_then(Value::as_f64).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn sample_row() -> RawHealthCheckRow {
        RawHealthCheckRow {
            id: Uuid::new_v4(),
            name: "Avery Lee".to_string(),
            morale: json!({"mood": "Good", "value": 72.0}),
            communication: json!({"mood": "Okay", "value": 55.0}),
            productivity: json!({"mood": "Great", "value": 90.0}),
            why: Some("Sprint went well".to_string()),
            timestamp: "2026-02-03T09:15:00Z".to_string(),
        }
    }

    #[test]
    fn normalizes_well_formed_rows() {
        let check = normalize(sample_row()).unwrap();
        assert_eq!(check.name, "Avery Lee");
        assert_eq!(check.morale.mood, "Good");
        assert_eq!(check.morale.value, 72.0);
        assert_eq!(check.why.as_deref(), Some("Sprint went well"));
    }

    #[test]
    fn missing_why_becomes_none() {
        let mut row = sample_row();
        row.why = None;
        assert_eq!(normalize(row).unwrap().why, None);
    }

    #[test]
    fn blank_why_becomes_none() {
        let mut row = sample_row();
        row.why = Some("   ".to_string());
        assert_eq!(normalize(row).unwrap().why, None);
    }

    #[test]
    fn missing_metric_fields_coerce_to_defaults() {
        let mut row = sample_row();
        row.morale = json!({"mood": "Good"});
        row.communication = json!({});
        let check = normalize(row).unwrap();
        assert_eq!(check.morale.value, 0.0);
        assert_eq!(check.communication.mood, "");
        assert_eq!(check.communication.value, 0.0);
    }

    #[test]
    fn accepts_postgres_text_timestamps() {
        let mut row = sample_row();
        row.timestamp = "2026-02-03 09:15:00.123456+00".to_string();
        let check = normalize(row).unwrap();
        assert_eq!(check.timestamp.to_rfc3339(), "2026-02-03T09:15:00.123456+00:00");
    }

    #[test]
    fn bad_timestamp_is_a_format_error() {
        let mut row = sample_row();
        row.timestamp = "last tuesday".to_string();
        match normalize(row) {
            Err(HealthCheckError::Format { value, .. }) => assert_eq!(value, "last tuesday"),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let check = NewHealthCheck {
            name: "Avery Lee".to_string(),
            morale: MetricResponse {
                mood: "Good".to_string(),
                value: 120.0,
            },
            communication: MetricResponse {
                mood: "Okay".to_string(),
                value: 50.0,
            },
            productivity: MetricResponse {
                mood: "Okay".to_string(),
                value: 50.0,
            },
            why: None,
            timestamp: Utc::now(),
        };

        match validate(&check) {
            Err(HealthCheckError::Validation { metric, value }) => {
                assert_eq!(metric, "morale");
                assert_eq!(value, 120.0);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn validate_accepts_boundary_values() {
        let check = NewHealthCheck {
            name: "Avery Lee".to_string(),
            morale: MetricResponse {
                mood: "Struggling".to_string(),
                value: 0.0,
            },
            communication: MetricResponse {
                mood: "Great".to_string(),
                value: 100.0,
            },
            productivity: MetricResponse {
                mood: "Okay".to_string(),
                value: 50.0,
            },
            why: None,
            timestamp: Utc::now(),
        };

        assert!(validate(&check).is_ok());
    }
}
