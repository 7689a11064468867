//! SMS background job.
//!
//! One-time codes are handed to the queue by `QueuedSms` and picked up by
//! the worker started with `jobs work`. There is no gateway integration:
//! the worker writes each message to the log.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// SMS job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsJob {
    /// Recipient in international format
    pub phone: String,
    /// Message text
    pub body: String,
}

impl SmsJob {
    pub fn new(phone: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            body: body.into(),
        }
    }
}

/// SMS job handler - processes queued messages
pub async fn sms_job_handler(job: SmsJob) -> Result<(), AppError> {
    if job.phone.is_empty() {
        return Err(AppError::validation("SMS job without a recipient"));
    }

    tracing::info!(phone = %job.phone, "Processing SMS job");
    tracing::info!(
        "=== SMS (not sent) ===\n\
         To: {}\n\
         {}\n\
         ======================",
        job.phone,
        job.body
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_serializes_as_plain_fields() {
        let job = SmsJob::new("+99365123456", "Your verification code is 123456");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["phone"], "+99365123456");
        assert_eq!(json["body"], "Your verification code is 123456");
    }

    #[tokio::test]
    async fn test_handler_logs_message() {
        let job = SmsJob::new("+99365123456", "hello");
        assert!(sms_job_handler(job).await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_rejects_missing_recipient() {
        let job = SmsJob::new("", "hello");
        assert!(sms_job_handler(job).await.is_err());
    }
}
