//! Jobs command - SMS queue management.
//!
//! - `work`: Start the worker that delivers queued SMS
//! - `list`: Show SMS job counts by status
//! - `clear`: Remove failed SMS jobs from the queue
//!
//! ## Usage
//!
//! ```bash
//! cargo run -- jobs work
//! cargo run -- jobs list
//! cargo run -- jobs clear
//! ```

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_NAME_SMS};
use crate::errors::{AppError, AppResult};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Start the background job worker
///
/// Connects to the database and starts processing SMS jobs from the queue.
/// Uses apalis with PostgreSQL storage for job persistence.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;
    use apalis_sql::postgres::PostgresStorage;
    use apalis_sql::sqlx::postgres::PgPoolOptions;

    use crate::jobs::{sms_job_handler, sms_storage};

    tracing::info!("Connecting to database for job worker...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    // Run migrations for apalis tables first (associated function on pool)
    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new("sms-worker")
        .backend(sms_storage(pool))
        .build_fn(sms_job_handler);

    // Run with graceful shutdown on Ctrl+C
    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Connect and report whether the apalis schema exists yet.
async fn connect_queue(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    tracing::info!("Connecting to database...");

    let db = Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    let result = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists".to_string(),
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    let schema_exists = result
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false);

    Ok(schema_exists.then_some(db))
}

/// Per-status job counts
#[derive(Debug, Default, PartialEq, Eq)]
struct QueueCounts {
    pending: i64,
    running: i64,
    failed: i64,
    done: i64,
}

impl QueueCounts {
    fn record(&mut self, status: &str, count: i64) {
        match status {
            "Pending" => self.pending = count,
            "Running" => self.running = count,
            "Failed" | "Killed" => self.failed += count,
            "Done" => self.done = count,
            _ => {}
        }
    }
}

/// List pending and failed jobs
///
/// Queries the apalis job tables and displays status counts.
async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = connect_queue(config).await? else {
        println!("\n=== SMS Queue Status ===");
        println!("Job queue not initialized.");
        println!("Run 'jobs work' first to create the queue tables.");
        println!("========================\n");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs WHERE job_type = $1 GROUP BY status",
            [JOB_NAME_SMS.into()],
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    let mut counts = QueueCounts::default();
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            counts.record(&status, count);
        }
    }

    println!("\n=== SMS Queue Status ===");
    println!("Pending:  {}", counts.pending);
    println!("Running:  {}", counts.running);
    println!("Failed:   {}", counts.failed);
    println!("Done:     {}", counts.done);
    println!("========================\n");

    Ok(())
}

/// Clear failed jobs from the queue
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = connect_queue(config).await? else {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE job_type = $1 AND status IN ('Failed', 'Killed')",
            [JOB_NAME_SMS.into()],
        ))
        .await
        .map_err(|e| AppError::internal(format!("Failed to clear jobs: {}", e)))?;

    println!(
        "Cleared {} failed SMS job(s) from the queue.",
        result.rows_affected()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_killed_jobs_count_as_failed() {
        let mut counts = QueueCounts::default();
        counts.record("Pending", 3);
        counts.record("Failed", 1);
        counts.record("Killed", 2);
        counts.record("Unknown", 9);
        assert_eq!(
            counts,
            QueueCounts {
                pending: 3,
                running: 0,
                failed: 3,
                done: 0,
            }
        );
    }
}
