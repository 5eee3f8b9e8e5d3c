use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One rated dimension: a 0-100 value plus its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResponse {
    pub mood: String,
    pub value: f64,
}

/// A stored row as it comes back from Postgres. The metric columns are
/// JSONB and the timestamp is selected as text, so typing happens in
/// `normalize`, not in the query layer.
#[derive(Debug, Clone)]
pub struct RawHealthCheckRow {
    pub id: Uuid,
    pub name: String,
    pub morale: serde_json::Value,
    pub communication: serde_json::Value,
    pub productivity: serde_json::Value,
    pub why: Option<String>,
    pub timestamp: String,
}

/// Canonical health check record. Immutable once stored; rows are only
/// ever inserted or deleted.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub id: Uuid,
    pub name: String,
    pub morale: MetricResponse,
    pub communication: MetricResponse,
    pub productivity: MetricResponse,
    pub why: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A submission before the database has assigned it an id.
#[derive(Debug, Clone)]
pub struct NewHealthCheck {
    pub name: String,
    pub morale: MetricResponse,
    pub communication: MetricResponse,
    pub productivity: MetricResponse,
    pub why: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Records sharing one calendar-day label, in their queried order.
#[derive(Debug, Clone)]
pub struct DateBucket {
    pub label: String,
    pub checks: Vec<HealthCheck>,
}

/// Buckets in first-seen order over the input sequence.
pub type GroupedHealthChecks = Vec<DateBucket>;

/// Per-metric arithmetic means across some record set.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub morale: f64,
    pub communication: f64,
    pub productivity: f64,
}
