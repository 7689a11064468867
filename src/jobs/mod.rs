//! Background jobs processed by the apalis worker.

mod sms_job;

use apalis_sql::{postgres::PostgresStorage, sqlx::PgPool, Config};

use crate::config::JOB_NAME_SMS;

pub use sms_job::{sms_job_handler, SmsJob};

/// Queue storage for SMS jobs, shared by the API and the worker.
pub fn sms_storage(pool: PgPool) -> PostgresStorage<SmsJob> {
    PostgresStorage::new_with_config(pool, Config::new(JOB_NAME_SMS))
}
