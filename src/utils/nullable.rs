//! Telling an explicit `null` apart from a missing field.

use serde::{Deserialize, Deserializer};

/// Use with `#[serde(default, deserialize_with = "nullable")]` on an
/// `Option<Option<T>>`: a missing field stays `None`, `null` becomes
/// `Some(None)`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        discount: Option<Option<i64>>,
    }

    #[test]
    fn test_missing_null_and_value() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.discount, None);

        let cleared: Patch = serde_json::from_str(r#"{"discount":null}"#).unwrap();
        assert_eq!(cleared.discount, Some(None));

        let set: Patch = serde_json::from_str(r#"{"discount":450}"#).unwrap();
        assert_eq!(set.discount, Some(Some(450)));
    }
}
