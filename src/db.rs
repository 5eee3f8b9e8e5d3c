use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::postgres::PgListener;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{MetricResponse, NewHealthCheck, RawHealthCheckRow};
use crate::normalize;
use crate::summary;

/// Channel the schema trigger notifies on every insert/update/delete.
const CHANGE_CHANNEL: &str = "health_checks_changes";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let seeds = vec![
        (
            Uuid::parse_str("6f1c2a84-40f1-4f29-9c4e-7b1a0d2f5c11")?,
            "Avery Lee",
            82.0,
            74.0,
            68.0,
            Some("Shipped the release on time"),
            now - Duration::hours(2),
        ),
        (
            Uuid::parse_str("b3d9e0c2-55a7-4e65-8f2d-9c0a1b4e7d22")?,
            "Jules Moreno",
            45.0,
            38.0,
            52.0,
            Some("Too many meetings this week"),
            now - Duration::hours(5),
        ),
        (
            Uuid::parse_str("1a7f4b90-9e3c-41d8-b6a5-0d2c8e5f9a33")?,
            "Kiara Patel",
            64.0,
            71.0,
            77.0,
            None,
            now - Duration::days(1),
        ),
    ];

    for (id, name, morale, communication, productivity, why, timestamp) in seeds {
        sqlx::query(
            r#"
            INSERT INTO team_health.health_checks
            (id, name, morale, communication, productivity, why, "timestamp")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(metric_payload(morale))
        .bind(metric_payload(communication))
        .bind(metric_payload(productivity))
        .bind(why)
        .bind(timestamp)
        .execute(pool)
        .await?;
    }

    Ok(())
}

fn metric_payload(value: f64) -> serde_json::Value {
    serde_json::json!({
        "mood": summary::tier(value).label(),
        "value": value,
    })
}

/// Recent window, newest first. Metric columns come back as raw JSONB
/// and the timestamp as text; `normalize` owns the typing.
pub async fn fetch_recent(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<RawHealthCheckRow>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, morale, communication, productivity, why,
               "timestamp"::text AS "timestamp"
        FROM team_health.health_checks
        ORDER BY "timestamp" DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("failed to fetch recent health checks")?;

    let mut checks = Vec::new();
    for row in rows {
        checks.push(RawHealthCheckRow {
            id: row.get("id"),
            name: row.get("name"),
            morale: row.get("morale"),
            communication: row.get("communication"),
            productivity: row.get("productivity"),
            why: row.get("why"),
            timestamp: row.get("timestamp"),
        });
    }

    Ok(checks)
}

pub async fn insert(pool: &PgPool, check: &NewHealthCheck) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO team_health.health_checks
        (id, name, morale, communication, productivity, why, "timestamp")
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&check.name)
    .bind(serde_json::to_value(&check.morale)?)
    .bind(serde_json::to_value(&check.communication)?)
    .bind(serde_json::to_value(&check.productivity)?)
    .bind(&check.why)
    .bind(check.timestamp)
    .fetch_one(pool)
    .await
    .context("failed to insert health check")?
    .get("id");

    Ok(id)
}

/// Returns whether a row was actually removed.
pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM team_health.health_checks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete health check")?;

    Ok(result.rows_affected() > 0)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        name: String,
        morale_mood: String,
        morale_value: f64,
        communication_mood: String,
        communication_value: f64,
        productivity_mood: String,
        productivity_value: f64,
        why: Option<String>,
        timestamp: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let check = NewHealthCheck {
            name: row.name,
            morale: MetricResponse {
                mood: row.morale_mood,
                value: row.morale_value,
            },
            communication: MetricResponse {
                mood: row.communication_mood,
                value: row.communication_value,
            },
            productivity: MetricResponse {
                mood: row.productivity_mood,
                value: row.productivity_value,
            },
            why: row.why.filter(|why| !why.trim().is_empty()),
            timestamp: normalize::parse_timestamp(&row.timestamp)
                .with_context(|| format!("row {}", index + 1))?,
        };

        normalize::validate(&check).with_context(|| format!("row {}", index + 1))?;
        insert(pool, &check).await?;
        inserted += 1;
    }

    Ok(inserted)
}

/// An open LISTEN session on the change channel.
pub struct Subscription {
    listener: PgListener,
}

pub async fn subscribe(pool: &PgPool) -> anyhow::Result<Subscription> {
    let mut listener = PgListener::connect_with(pool)
        .await
        .context("failed to open change listener")?;
    listener
        .listen(CHANGE_CHANNEL)
        .await
        .with_context(|| format!("failed to listen on {CHANGE_CHANNEL}"))?;

    tracing::debug!(channel = CHANGE_CHANNEL, "subscribed to health check changes");
    Ok(Subscription { listener })
}

impl Subscription {
    /// Resolves on the next change to the health check table.
    pub async fn recv(&mut self) -> anyhow::Result<()> {
        let notification = self
            .listener
            .recv()
            .await
            .context("change listener dropped")?;
        tracing::debug!(payload = notification.payload(), "change notification");
        Ok(())
    }

    pub async fn unsubscribe(mut self) -> anyhow::Result<()> {
        self.listener
            .unlisten_all()
            .await
            .context("failed to unlisten")?;
        Ok(())
    }
}
