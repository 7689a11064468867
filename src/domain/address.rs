//! Postal address attached to a shop or a region.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// What an address belongs to. Exactly one owner per address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOwner {
    Shop(Uuid),
    Region(Uuid),
}

impl AddressOwner {
    /// Rebuild the owner from the two nullable columns.
    pub fn from_columns(shop_id: Option<Uuid>, region_id: Option<Uuid>) -> Option<Self> {
        match (shop_id, region_id) {
            (Some(shop), None) => Some(AddressOwner::Shop(shop)),
            (None, Some(region)) => Some(AddressOwner::Region(region)),
            _ => None,
        }
    }

    pub fn shop_id(&self) -> Option<Uuid> {
        match self {
            AddressOwner::Shop(id) => Some(*id),
            AddressOwner::Region(_) => None,
        }
    }

    pub fn region_id(&self) -> Option<Uuid> {
        match self {
            AddressOwner::Region(id) => Some(*id),
            AddressOwner::Shop(_) => None,
        }
    }
}

/// Address domain entity
#[derive(Debug, Clone)]
pub struct Address {
    pub id: Uuid,
    pub owner: AddressOwner,
    pub line: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address fields written on upsert
#[derive(Debug, Clone, PartialEq)]
pub struct AddressInput {
    pub line: String,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressInput {
    /// Coordinates must be given together and lie on the globe.
    pub fn coordinates_valid(&self) -> bool {
        match (self.latitude, self.longitude) {
            (None, None) => true,
            (Some(lat), Some(lng)) => (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng),
            _ => false,
        }
    }
}

/// Address response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    #[schema(example = "Magtymguly avenue 12")]
    pub line: String,
    #[schema(example = "744000")]
    pub postal_code: Option<String>,
    #[schema(example = 37.95)]
    pub latitude: Option<f64>,
    #[schema(example = 58.38)]
    pub longitude: Option<f64>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            line: address.line,
            postal_code: address.postal_code,
            latitude: address.latitude,
            longitude: address.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(lat: Option<f64>, lng: Option<f64>) -> AddressInput {
        AddressInput {
            line: "Street 1".to_string(),
            postal_code: None,
            latitude: lat,
            longitude: lng,
        }
    }

    #[test]
    fn test_owner_from_columns() {
        let id = Uuid::new_v4();
        assert_eq!(AddressOwner::from_columns(Some(id), None), Some(AddressOwner::Shop(id)));
        assert_eq!(AddressOwner::from_columns(None, Some(id)), Some(AddressOwner::Region(id)));
        assert_eq!(AddressOwner::from_columns(Some(id), Some(id)), None);
        assert_eq!(AddressOwner::from_columns(None, None), None);
    }

    #[test]
    fn test_coordinates() {
        assert!(input(None, None).coordinates_valid());
        assert!(input(Some(37.9), Some(58.4)).coordinates_valid());
        assert!(!input(Some(37.9), None).coordinates_valid());
        assert!(!input(Some(91.0), Some(0.0)).coordinates_valid());
    }
}
