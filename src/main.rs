use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod db;
mod error;
mod grouping;
mod models;
mod normalize;
mod report;
mod summary;

use models::{GroupedHealthChecks, MetricResponse, NewHealthCheck};
use summary::COLOR_RESET;

#[derive(Parser)]
#[command(name = "team-health-check")]
#[command(about = "Team health check tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Submit one health check
    Submit {
        #[arg(long)]
        name: String,
        /// Morale rating, 0-100
        #[arg(long)]
        morale: f64,
        /// Communication rating, 0-100
        #[arg(long)]
        communication: f64,
        /// Productivity rating, 0-100
        #[arg(long)]
        productivity: f64,
        /// Optional free-text comment
        #[arg(long)]
        why: Option<String>,
    },
    /// Show recent submissions grouped by day
    Results {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Delete a submission by id
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Import health checks from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Render results and refresh on every change
    Watch {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Submit {
            name,
            morale,
            communication,
            productivity,
            why,
        } => {
            let check = NewHealthCheck {
                name,
                morale: metric_response(morale),
                communication: metric_response(communication),
                productivity: metric_response(productivity),
                why: why.filter(|why| !why.trim().is_empty()),
                timestamp: Utc::now(),
            };
            normalize::validate(&check)?;

            let id = db::insert(&pool, &check).await?;
            println!(
                "Health check submitted. Thank you for participating, {}! ({id})",
                check.name
            );
        }
        Commands::Results { limit } => {
            let grouped = load_grouped(&pool, limit).await?;
            print_results(&grouped);
        }
        Commands::Delete { id } => {
            if db::delete(&pool, id).await? {
                println!("Health check deleted.");
            } else {
                println!("No health check found with id {id}.");
            }
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} health checks from {}.", csv.display());
        }
        Commands::Report { limit, out } => {
            let grouped = load_grouped(&pool, limit).await?;
            let report = report::build_report(&grouped, limit);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Watch { limit } => {
            watch(&pool, limit).await?;
        }
    }

    Ok(())
}

fn metric_response(value: f64) -> MetricResponse {
    MetricResponse {
        mood: summary::tier(value).label().to_string(),
        value,
    }
}

/// Fetch the recent window and run it through the core pipeline.
async fn load_grouped(pool: &PgPool, limit: i64) -> anyhow::Result<GroupedHealthChecks> {
    let rows = db::fetch_recent(pool, limit).await?;
    let checks = rows
        .into_iter()
        .map(normalize::normalize)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(grouping::group_by_date(&checks))
}

fn print_results(grouped: &GroupedHealthChecks) {
    if grouped.is_empty() {
        println!("No results found.");
        return;
    }

    for bucket in grouped {
        println!("{}", bucket.label);

        if let Some(aggregate) = summary::average(&bucket.checks) {
            let metrics = [
                ("Morale", aggregate.morale),
                ("Communication", aggregate.communication),
                ("Productivity", aggregate.productivity),
            ];
            for (name, value) in metrics {
                let band = summary::tier(value);
                println!(
                    "  {name}: {}{value:.0}%{COLOR_RESET} {} {}",
                    band.color(),
                    band.emoji(),
                    band.label()
                );
            }
        }

        for check in &bucket.checks {
            let time = check.timestamp.with_timezone(&Local).format("%H:%M");
            print!(
                "  - {} at {}: morale {:.0}, communication {:.0}, productivity {:.0}",
                check.name,
                time,
                check.morale.value,
                check.communication.value,
                check.productivity.value
            );
            match &check.why {
                Some(why) => println!(" — \"{why}\""),
                None => println!(),
            }
        }

        println!();
    }
}

/// Render once, then re-fetch and re-render the whole window on every
/// change notification. Ctrl-C tears the subscription down.
async fn watch(pool: &PgPool, limit: i64) -> anyhow::Result<()> {
    let mut subscription = db::subscribe(pool).await?;

    let grouped = load_grouped(pool, limit).await?;
    print_results(&grouped);
    println!("Watching for changes (ctrl-c to exit)...");

    loop {
        tokio::select! {
            changed = subscription.recv() => {
                changed?;
                tracing::info!("health checks changed, refreshing");
                let grouped = load_grouped(pool, limit).await?;
                print_results(&grouped);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.unsubscribe().await?;
    Ok(())
}
