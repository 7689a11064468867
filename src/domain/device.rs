//! Push notification tokens registered by users and sellers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::AccountKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Web => "web",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "web" => Ok(Platform::Web),
            other => Err(format!("Unknown platform '{}'", other)),
        }
    }
}

/// Owner of a device: a user or a seller, never both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceOwner {
    pub kind: AccountKind,
    pub id: Uuid,
}

impl DeviceOwner {
    pub fn user_id(&self) -> Option<Uuid> {
        (self.kind == AccountKind::User).then_some(self.id)
    }

    pub fn seller_id(&self) -> Option<Uuid> {
        (self.kind == AccountKind::Seller).then_some(self.id)
    }

    pub fn from_columns(user_id: Option<Uuid>, seller_id: Option<Uuid>) -> Option<Self> {
        match (user_id, seller_id) {
            (Some(id), None) => Some(Self {
                kind: AccountKind::User,
                id,
            }),
            (None, Some(id)) => Some(Self {
                kind: AccountKind::Seller,
                id,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Device {
    pub id: Uuid,
    pub owner: DeviceOwner,
    pub token: String,
    pub platform: Platform,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceResponse {
    pub id: Uuid,
    #[schema(example = "fcm-token-value")]
    pub token: String,
    pub platform: Platform,
    pub created_at: DateTime<Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            token: device.token,
            platform: device.platform,
            created_at: device.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_columns() {
        let id = Uuid::new_v4();
        let owner = DeviceOwner::from_columns(None, Some(id)).unwrap();
        assert_eq!(owner.kind, AccountKind::Seller);
        assert_eq!(owner.seller_id(), Some(id));
        assert_eq!(owner.user_id(), None);
        assert!(DeviceOwner::from_columns(Some(id), Some(id)).is_none());
    }
}
