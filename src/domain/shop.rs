//! Shop entity owned by a user and located in a region.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::address::AddressResponse;
use crate::errors::{AppError, AppResult};

/// Opening hours. A shop either publishes both ends or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

impl BusinessHours {
    /// Combine the two nullable columns.
    ///
    /// Returns `Err` when only one end is present or both ends are equal.
    /// A closing time earlier than the opening time means the shop closes
    /// after midnight.
    pub fn from_pair(
        opens_at: Option<NaiveTime>,
        closes_at: Option<NaiveTime>,
    ) -> Result<Option<Self>, &'static str> {
        match (opens_at, closes_at) {
            (None, None) => Ok(None),
            (Some(opens_at), Some(closes_at)) if opens_at != closes_at => {
                Ok(Some(Self { opens_at, closes_at }))
            }
            (Some(_), Some(_)) => Err("Opening and closing times must differ"),
            _ => Err("Opening and closing times must be given together"),
        }
    }

    /// Pair request fields, reporting a mismatch against `closes_at`.
    pub fn from_request(
        opens_at: Option<NaiveTime>,
        closes_at: Option<NaiveTime>,
    ) -> AppResult<Option<Self>> {
        Self::from_pair(opens_at, closes_at).map_err(|msg| AppError::field("closes_at", msg))
    }

    /// Whether the shop is open at `time`.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if self.opens_at < self.closes_at {
            time >= self.opens_at && time < self.closes_at
        } else {
            time >= self.opens_at || time < self.closes_at
        }
    }
}

/// Shop domain entity
#[derive(Debug, Clone)]
pub struct Shop {
    pub id: Uuid,
    pub user_id: Uuid,
    pub region_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub hours: Option<BusinessHours>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Fields written when a shop is created
#[derive(Debug, Clone)]
pub struct NewShop {
    pub user_id: Uuid,
    pub region_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub hours: Option<BusinessHours>,
    pub status: bool,
}

/// Partial shop update; `hours` replaces both ends at once
#[derive(Debug, Clone, Default)]
pub struct ShopChanges {
    pub region_id: Option<Uuid>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub image: Option<String>,
    pub hours: Option<Option<BusinessHours>>,
    pub status: Option<bool>,
}

/// Listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShopFilter {
    pub user_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    /// Case-insensitive match on the name
    pub search: Option<String>,
}

/// Shop response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub region_id: Uuid,
    #[schema(example = "Gül Bazar")]
    pub name: String,
    #[schema(example = "gul-bazar")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(example = "+99312345678")]
    pub phone: Option<String>,
    pub image: Option<String>,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub opens_at: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "21:00:00")]
    pub closes_at: Option<NaiveTime>,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<Shop> for ShopResponse {
    fn from(shop: Shop) -> Self {
        Self {
            id: shop.id,
            user_id: shop.user_id,
            region_id: shop.region_id,
            name: shop.name,
            slug: shop.slug,
            description: shop.description,
            phone: shop.phone,
            image: shop.image,
            opens_at: shop.hours.map(|h| h.opens_at),
            closes_at: shop.hours.map(|h| h.closes_at),
            status: shop.status,
            address: None,
            created_at: shop.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_hours_pairing() {
        assert_eq!(BusinessHours::from_pair(None, None), Ok(None));
        assert!(BusinessHours::from_pair(Some(t(9, 0)), None).is_err());
        assert!(BusinessHours::from_pair(None, Some(t(9, 0))).is_err());
        assert!(BusinessHours::from_pair(Some(t(9, 0)), Some(t(9, 0))).is_err());
        assert!(BusinessHours::from_pair(Some(t(9, 0)), Some(t(18, 0)))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_is_open_same_day() {
        let hours = BusinessHours::from_pair(Some(t(9, 0)), Some(t(18, 0)))
            .unwrap()
            .unwrap();
        assert!(hours.is_open_at(t(9, 0)));
        assert!(hours.is_open_at(t(17, 59)));
        assert!(!hours.is_open_at(t(18, 0)));
        assert!(!hours.is_open_at(t(3, 0)));
    }

    #[test]
    fn test_is_open_overnight() {
        let hours = BusinessHours::from_pair(Some(t(20, 0)), Some(t(2, 0)))
            .unwrap()
            .unwrap();
        assert!(hours.is_open_at(t(23, 30)));
        assert!(hours.is_open_at(t(1, 0)));
        assert!(!hours.is_open_at(t(12, 0)));
    }
}
