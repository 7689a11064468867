//! Address payload shared by regions and shops.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::AddressInput;

/// Address upsert request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddressRequest {
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    #[schema(example = "Magtymguly sayoly 12")]
    pub line: String,
    #[validate(length(max = 16, message = "Postal code is too long"))]
    #[schema(example = "744000")]
    pub postal_code: Option<String>,
    #[schema(example = 37.9601)]
    pub latitude: Option<f64>,
    #[schema(example = 58.3261)]
    pub longitude: Option<f64>,
}

impl From<AddressRequest> for AddressInput {
    fn from(request: AddressRequest) -> Self {
        Self {
            line: request.line,
            postal_code: request.postal_code,
            latitude: request.latitude,
            longitude: request.longitude,
        }
    }
}
