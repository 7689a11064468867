//! Outbound SMS delivery for one-time codes.

use async_trait::async_trait;
use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;

use crate::errors::{AppError, AppResult};
use crate::jobs::SmsJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone: &str, body: String) -> AppResult<()>;
}

/// Hands messages to the background worker.
#[derive(Clone)]
pub struct QueuedSms {
    storage: PostgresStorage<SmsJob>,
}

impl QueuedSms {
    pub fn new(storage: PostgresStorage<SmsJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SmsSender for QueuedSms {
    async fn send(&self, phone: &str, body: String) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(SmsJob::new(phone, body))
            .await
            .map_err(|e| AppError::internal(format!("Failed to queue SMS: {}", e)))?;

        tracing::debug!(phone = %phone, "SMS queued");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogSms;

#[async_trait]
impl SmsSender for LogSms {
    async fn send(&self, phone: &str, body: String) -> AppResult<()> {
        tracing::info!(phone = %phone, body = %body, "SMS (not sent)");
        Ok(())
    }
}
