//! One-time password value object and the stored code record.
//!
//! Codes are never persisted in clear text: the row keeps an Argon2 hash
//! and the plain digits only leave the process inside the SMS.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::config::{OTP_LENGTH, OTP_MAX_ATTEMPTS};
use crate::errors::{AppError, AppResult};

/// Hashed one-time code.
#[derive(Clone)]
pub struct OtpCode {
    hash: String,
}

impl std::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpCode")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl OtpCode {
    /// Generate a fresh numeric code.
    ///
    /// Returns the plain digits (to be sent to the account holder) together
    /// with the hashed value object that gets stored.
    pub fn issue() -> AppResult<(String, Self)> {
        let plain = Self::random_digits();
        let code = Self::new(&plain)?;
        Ok((plain, code))
    }

    /// Hash an explicit code.
    ///
    /// # Errors
    /// Returns a validation error unless the input is exactly `OTP_LENGTH` digits.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if !Self::is_well_formed(plain_text) {
            return Err(AppError::validation(format!(
                "Code must be {} digits",
                OTP_LENGTH
            )));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Restore from a stored hash.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify submitted digits against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        if !Self::is_well_formed(plain_text) {
            return false;
        }
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    /// Exactly `OTP_LENGTH` ASCII digits.
    pub fn is_well_formed(plain_text: &str) -> bool {
        plain_text.len() == OTP_LENGTH && plain_text.bytes().all(|b| b.is_ascii_digit())
    }

    fn random_digits() -> String {
        let upper = 10u32.pow(OTP_LENGTH as u32);
        let value = rand::thread_rng().gen_range(0..upper);
        format!("{:0width$}", value, width = OTP_LENGTH)
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Code hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<OtpCode> for String {
    fn from(code: OtpCode) -> Self {
        code.hash
    }
}

/// A stored code issued to a user or seller.
#[derive(Debug, Clone)]
pub struct OneTimePassword {
    pub id: Uuid,
    /// User or seller id, depending on the table it was read from
    pub owner_id: Uuid,
    pub code: OtpCode,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    /// Wrong codes submitted against this record
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OneTimePassword {
    /// Expiry instant for a code issued at `now`.
    pub fn expiry_from(now: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
        now + Duration::minutes(ttl_minutes)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= OTP_MAX_ATTEMPTS
    }

    /// Not consumed, not expired and not guessed at too often
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_consumed() && !self.is_expired(now) && !self.is_exhausted()
    }

    /// Live and matching the submitted digits
    pub fn accepts(&self, plain_text: &str, now: DateTime<Utc>) -> bool {
        self.is_live(now) && self.code.verify(plain_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_produces_verifiable_code() {
        let (plain, code) = OtpCode::issue().unwrap();
        assert_eq!(plain.len(), OTP_LENGTH);
        assert!(plain.chars().all(|c| c.is_ascii_digit()));
        assert!(code.verify(&plain));
    }

    #[test]
    fn test_wrong_code_rejected() {
        let code = OtpCode::new("123456").unwrap();
        assert!(!code.verify("654321"));
        assert!(!code.verify("12345"));
        assert!(!code.verify("abcdef"));
    }

    #[test]
    fn test_from_hash_restores() {
        let code = OtpCode::new("000042").unwrap();
        let restored = OtpCode::from_hash(code.as_str().to_string());
        assert!(restored.verify("000042"));
    }

    #[test]
    fn test_malformed_code_not_hashed() {
        assert!(OtpCode::new("12ab56").is_err());
        assert!(OtpCode::new("1234567").is_err());
    }

    #[test]
    fn test_record_lifecycle() {
        let now = Utc::now();
        let mut otp = OneTimePassword {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            code: OtpCode::new("111222").unwrap(),
            expires_at: OneTimePassword::expiry_from(now, 10),
            consumed_at: None,
            attempts: 0,
            created_at: now,
        };

        assert!(otp.accepts("111222", now));
        assert!(!otp.accepts("111222", now + Duration::minutes(10)));

        otp.consumed_at = Some(now);
        assert!(!otp.accepts("111222", now));
    }

    #[test]
    fn test_exhausted_code_rejects_the_right_digits() {
        let now = Utc::now();
        let mut otp = OneTimePassword {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            code: OtpCode::new("908172").unwrap(),
            expires_at: OneTimePassword::expiry_from(now, 10),
            consumed_at: None,
            attempts: OTP_MAX_ATTEMPTS - 1,
            created_at: now,
        };
        assert!(otp.accepts("908172", now));

        otp.attempts = OTP_MAX_ATTEMPTS;
        assert!(otp.is_exhausted());
        assert!(!otp.accepts("908172", now));
    }
}
