//! Shared request validation rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// International phone number: a leading `+` and 8 to 15 digits
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{7,14}$").expect("phone pattern compiles"));

/// Wall-clock time of day, `HH:MM`
pub static TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern compiles"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_pattern() {
        assert!(PHONE_REGEX.is_match("+99365123456"));
        assert!(!PHONE_REGEX.is_match("99365123456"));
        assert!(!PHONE_REGEX.is_match("+0123"));
    }

    #[test]
    fn test_time_pattern() {
        assert!(TIME_REGEX.is_match("09:30"));
        assert!(TIME_REGEX.is_match("23:59"));
        assert!(!TIME_REGEX.is_match("24:00"));
        assert!(!TIME_REGEX.is_match("9:30"));
    }
}
