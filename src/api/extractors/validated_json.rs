//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::{AppError, FieldErrors};

/// Validated JSON extractor that automatically validates requests.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use validator::Validate;
/// use market_api::api::extractors::ValidatedJson;
///
/// #[derive(Deserialize, Validate)]
/// struct CreateBrandRequest {
///     #[validate(length(min = 1, max = 255))]
///     name: String,
/// }
///
/// async fn create_brand(ValidatedJson(payload): ValidatedJson<CreateBrandRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::InvalidFields(field_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten validator errors into a field → messages map.
///
/// Nested structs and lists report under dotted paths (`address.line`,
/// `compositions[0].qty`).
fn field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    collect(errors, "", &mut fields);
    fields
}

fn collect(errors: &validator::ValidationErrors, prefix: &str, fields: &mut FieldErrors) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages = errs.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field))
                });
                fields.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, fields),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{}[{}]", path, index), fields);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Line {
        #[validate(range(min = 0.0, message = "Quantity must not be negative"))]
        qty: f64,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn test_field_errors_use_paths() {
        let payload = Payload {
            name: String::new(),
            lines: vec![Line { qty: 1.0 }, Line { qty: -1.0 }],
        };
        let errors = payload.validate().unwrap_err();
        let fields = field_errors(&errors);

        assert_eq!(fields["name"], vec!["Name is required".to_string()]);
        assert_eq!(
            fields["lines[1].qty"],
            vec!["Quantity must not be negative".to_string()]
        );
    }
}
