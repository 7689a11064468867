//! Device service - Push tokens of the signed-in account.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, Device, DeviceOwner, Platform};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait DeviceService: Send + Sync {
    /// Register a push token. A known token moves to the caller.
    async fn register_device(
        &self,
        actor: Actor,
        token: String,
        platform: Platform,
    ) -> AppResult<Device>;

    async fn my_devices(&self, actor: Actor) -> AppResult<Vec<Device>>;

    /// Devices of other accounts read as missing.
    async fn remove_device(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct DeviceManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DeviceManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn owner_of(actor: &Actor) -> DeviceOwner {
    DeviceOwner {
        kind: actor.kind,
        id: actor.id,
    }
}

#[async_trait]
impl<U: UnitOfWork> DeviceService for DeviceManager<U> {
    async fn register_device(
        &self,
        actor: Actor,
        token: String,
        platform: Platform,
    ) -> AppResult<Device> {
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::field("token", "The token field is required."));
        }

        let device = self
            .uow
            .devices()
            .upsert(owner_of(&actor), token, platform)
            .await?;
        tracing::debug!(device_id = %device.id, platform = platform.as_str(), "Device registered");
        Ok(device)
    }

    async fn my_devices(&self, actor: Actor) -> AppResult<Vec<Device>> {
        self.uow.devices().list_for(owner_of(&actor)).await
    }

    async fn remove_device(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let devices = self.uow.devices();
        let device = devices
            .find_by_id(id)
            .await?
            .filter(|d| d.owner == owner_of(&actor))
            .ok_or_not_found()?;

        devices.delete(device.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountKind;
    use crate::infra::MockDeviceRepository;
    use crate::services::testing::TestUow;
    use chrono::Utc;

    fn device(id: Uuid, owner: DeviceOwner) -> Device {
        Device {
            id,
            owner,
            token: "fcm-token".to_string(),
            platform: Platform::Android,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn manager(devices: MockDeviceRepository) -> DeviceManager<TestUow> {
        DeviceManager::new(Arc::new(TestUow {
            devices: Arc::new(devices),
            ..Default::default()
        }))
    }

    fn seller(id: Uuid) -> Actor {
        Actor {
            id,
            kind: AccountKind::Seller,
            admin: false,
        }
    }

    #[tokio::test]
    async fn test_register_uses_seller_column() {
        let id = Uuid::new_v4();
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_upsert()
            .withf(move |owner, token, _| owner.seller_id() == Some(id) && token == "abc")
            .returning(|owner, _, _| Ok(device(Uuid::new_v4(), owner)));

        let registered = manager(devices)
            .register_device(seller(id), "  abc ".to_string(), Platform::Ios)
            .await
            .unwrap();
        assert_eq!(registered.owner.kind, AccountKind::Seller);
    }

    #[tokio::test]
    async fn test_blank_token_is_rejected() {
        let mut devices = MockDeviceRepository::new();
        devices.expect_upsert().never();

        let result = manager(devices)
            .register_device(seller(Uuid::new_v4()), "   ".to_string(), Platform::Web)
            .await;
        assert!(matches!(result, Err(AppError::InvalidFields(_))));
    }

    #[tokio::test]
    async fn test_user_cannot_remove_seller_device_with_same_id() {
        let id = Uuid::new_v4();
        let mut devices = MockDeviceRepository::new();
        devices.expect_find_by_id().returning(move |device_id| {
            Ok(Some(device(
                device_id,
                DeviceOwner {
                    kind: AccountKind::Seller,
                    id,
                },
            )))
        });
        devices.expect_delete().never();

        let actor = Actor {
            id,
            kind: AccountKind::User,
            admin: false,
        };
        let result = manager(devices).remove_device(actor, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
