//! Seller service - Seller accounts managed by administrators.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::ImageService;
use crate::config::FOLDER_SELLERS;
use crate::domain::{AccountChanges, AccountFilter, NewAccount, Seller};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::utils::slugify;

#[async_trait]
pub trait SellerService: Send + Sync {
    async fn get_seller(&self, id: Uuid) -> AppResult<Seller>;

    async fn list_sellers(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Seller>>;

    async fn create_seller(&self, account: NewAccount, image: Option<String>) -> AppResult<Seller>;

    async fn update_seller(
        &self,
        id: Uuid,
        changes: AccountChanges,
        image: Option<String>,
    ) -> AppResult<Seller>;

    /// Sellers are removed outright together with their codes and devices.
    async fn delete_seller(&self, id: Uuid) -> AppResult<()>;
}

pub struct SellerManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> SellerManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    async fn ensure_phone_free(&self, phone: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.uow.sellers().find_by_phone(phone).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(AppError::field("phone", "The phone has already been taken."))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> SellerService for SellerManager<U> {
    async fn get_seller(&self, id: Uuid) -> AppResult<Seller> {
        self.uow.sellers().find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_sellers(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Seller>> {
        let (sellers, total) = self.uow.sellers().list(filter, params.clone()).await?;
        Ok(Paginated::from_page(sellers, &params, total))
    }

    async fn create_seller(
        &self,
        mut account: NewAccount,
        image: Option<String>,
    ) -> AppResult<Seller> {
        self.ensure_phone_free(&account.phone, None).await?;

        account.image = self
            .images
            .store_optional(FOLDER_SELLERS, &slugify(&account.name), image.as_deref())
            .await?;
        let stored = account.image.clone();

        match self.uow.sellers().create(account).await {
            Ok(seller) => {
                tracing::info!(seller_id = %seller.id, "Seller created");
                Ok(seller)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn update_seller(
        &self,
        id: Uuid,
        mut changes: AccountChanges,
        image: Option<String>,
    ) -> AppResult<Seller> {
        let current = self.get_seller(id).await?;
        if let Some(phone) = changes.phone.as_deref() {
            self.ensure_phone_free(phone, Some(id)).await?;
        }

        let name = changes.name.as_deref().unwrap_or(&current.name);
        changes.image = self
            .images
            .store_optional(FOLDER_SELLERS, &slugify(name), image.as_deref())
            .await?;
        let stored = changes.image.clone();

        match self.uow.sellers().update(id, changes).await {
            Ok(seller) => {
                if stored.is_some() {
                    self.images.discard(current.image.as_deref()).await;
                }
                Ok(seller)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn delete_seller(&self, id: Uuid) -> AppResult<()> {
        let seller = self.get_seller(id).await?;
        self.uow.sellers().delete(id).await?;
        self.images.discard(seller.image.as_deref()).await;
        tracing::info!(seller_id = %id, "Seller deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountStatus;
    use crate::infra::{MockFileStorage, MockSellerRepository};
    use crate::services::testing::TestUow;
    use chrono::Utc;

    fn seller(id: Uuid) -> Seller {
        Seller {
            id,
            name: "Merdan".to_string(),
            phone: "+99361234567".to_string(),
            email: None,
            image: None,
            status: AccountStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_seller_is_not_found() {
        let mut sellers = MockSellerRepository::new();
        sellers.expect_find_by_id().returning(|_| Ok(None));
        sellers.expect_delete().never();

        let uow = TestUow {
            sellers: Arc::new(sellers),
            ..Default::default()
        };
        let service = SellerManager::new(
            Arc::new(uow),
            ImageService::new(Arc::new(MockFileStorage::new()), 1024),
        );

        let result = service.delete_seller(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_wraps_page_meta() {
        let mut sellers = MockSellerRepository::new();
        sellers
            .expect_list()
            .returning(|_, _| Ok((vec![seller(Uuid::new_v4())], 41)));

        let uow = TestUow {
            sellers: Arc::new(sellers),
            ..Default::default()
        };
        let service = SellerManager::new(
            Arc::new(uow),
            ImageService::new(Arc::new(MockFileStorage::new()), 1024),
        );

        let page = service
            .list_sellers(AccountFilter::default(), PaginationParams::new(3, 20))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.meta.total, 41);
        assert_eq!(page.meta.total_pages, 3);
    }
}
