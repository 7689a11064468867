//! Shop service - Shops owned by users, with address and opening hours.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::ImageService;
use crate::config::FOLDER_SHOPS;
use crate::domain::{
    Actor, Address, AddressInput, AddressOwner, NewShop, Shop, ShopChanges, ShopFilter,
    ShopResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::utils::slug_or;

#[async_trait]
pub trait ShopService: Send + Sync {
    async fn list_shops(
        &self,
        filter: ShopFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Shop>>;

    /// Shop with its address
    async fn get_shop(&self, id: Uuid) -> AppResult<ShopResponse>;

    /// Create a shop for `shop.user_id`. Only admins may create shops for
    /// somebody else. An empty slug is derived from the name.
    async fn create_shop(
        &self,
        actor: Actor,
        shop: NewShop,
        image: Option<String>,
        address: Option<AddressInput>,
    ) -> AppResult<ShopResponse>;

    async fn update_shop(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ShopChanges,
        image: Option<String>,
    ) -> AppResult<Shop>;

    /// Delete the shop with its products and every stored picture.
    async fn delete_shop(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn upsert_address(&self, actor: Actor, id: Uuid, input: AddressInput)
        -> AppResult<Address>;

    async fn remove_address(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct ShopManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> ShopManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    async fn find(&self, id: Uuid) -> AppResult<Shop> {
        self.uow.shops().find_by_id(id).await?.ok_or_not_found()
    }

    /// Load a shop the caller may change.
    async fn find_owned(&self, actor: &Actor, id: Uuid) -> AppResult<Shop> {
        let shop = self.find(id).await?;
        if actor.is_self_or_admin(shop.user_id) {
            Ok(shop)
        } else {
            Err(AppError::Forbidden)
        }
    }

    async fn check_region(&self, region_id: Uuid) -> AppResult<()> {
        match self.uow.regions().find_by_id(region_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::field("region_id", "The selected region is invalid.")),
        }
    }

    async fn check_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self.uow.shops().slug_taken(slug, except).await? {
            Err(AppError::field("slug", "The slug has already been taken."))
        } else {
            Ok(())
        }
    }
}

pub(super) fn check_address(input: &AddressInput) -> AppResult<()> {
    if input.coordinates_valid() {
        Ok(())
    } else {
        Err(AppError::field(
            "latitude",
            "Latitude and longitude must be given together and be in range.",
        ))
    }
}

#[async_trait]
impl<U: UnitOfWork> ShopService for ShopManager<U> {
    async fn list_shops(
        &self,
        filter: ShopFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<Shop>> {
        let (shops, total) = self.uow.shops().list(filter, params.clone()).await?;
        Ok(Paginated::from_page(shops, &params, total))
    }

    async fn get_shop(&self, id: Uuid) -> AppResult<ShopResponse> {
        let shop = self.find(id).await?;
        let address = self.uow.addresses().find_for(AddressOwner::Shop(id)).await?;

        let mut response = ShopResponse::from(shop);
        response.address = address.map(Into::into);
        Ok(response)
    }

    async fn create_shop(
        &self,
        actor: Actor,
        mut shop: NewShop,
        image: Option<String>,
        address: Option<AddressInput>,
    ) -> AppResult<ShopResponse> {
        if !actor.is_self_or_admin(shop.user_id) {
            return Err(AppError::Forbidden);
        }
        if shop.user_id != actor.id
            && self.uow.users().find_by_id(shop.user_id).await?.is_none()
        {
            return Err(AppError::field("user_id", "The selected user is invalid."));
        }
        if let Some(address) = &address {
            check_address(address)?;
        }
        self.check_region(shop.region_id).await?;

        shop.slug = slug_or(Some(&shop.slug), &shop.name);
        self.check_slug(&shop.slug, None).await?;

        shop.image = self
            .images
            .store_optional(FOLDER_SHOPS, &shop.slug, image.as_deref())
            .await?;
        let stored = shop.image.clone();

        let result = self
            .uow
            .transaction(|ctx| {
                Box::pin(async move {
                    let shop = ctx.shops().create(shop).await?;
                    let address = match address {
                        Some(input) => Some(
                            ctx.addresses()
                                .upsert(AddressOwner::Shop(shop.id), input)
                                .await?,
                        ),
                        None => None,
                    };
                    Ok((shop, address))
                })
            })
            .await;

        match result {
            Ok((shop, address)) => {
                tracing::info!(shop_id = %shop.id, user_id = %shop.user_id, "Shop created");
                let mut response = ShopResponse::from(shop);
                response.address = address.map(Into::into);
                Ok(response)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn update_shop(
        &self,
        actor: Actor,
        id: Uuid,
        mut changes: ShopChanges,
        image: Option<String>,
    ) -> AppResult<Shop> {
        let current = self.find_owned(&actor, id).await?;
        if let Some(region_id) = changes.region_id {
            self.check_region(region_id).await?;
        }
        if let Some(slug) = changes.slug.take() {
            let name = changes.name.as_deref().unwrap_or(&current.name);
            let slug = slug_or(Some(&slug), name);
            self.check_slug(&slug, Some(id)).await?;
            changes.slug = Some(slug);
        }

        let folder_slug = changes.slug.as_deref().unwrap_or(&current.slug).to_string();
        changes.image = self
            .images
            .store_optional(FOLDER_SHOPS, &folder_slug, image.as_deref())
            .await?;
        let stored = changes.image.clone();

        match self.uow.shops().update(id, changes).await {
            Ok(shop) => {
                if stored.is_some() {
                    self.images.discard(current.image.as_deref()).await;
                }
                Ok(shop)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn delete_shop(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let shop = self.find_owned(&actor, id).await?;
        let shops = self.uow.shops();

        let product_images = shops.product_image_paths(id).await?;
        shops.delete(id).await?;

        self.images.discard_all(&product_images).await;
        self.images.discard(shop.image.as_deref()).await;
        tracing::info!(shop_id = %id, "Shop deleted");
        Ok(())
    }

    async fn upsert_address(
        &self,
        actor: Actor,
        id: Uuid,
        input: AddressInput,
    ) -> AppResult<Address> {
        check_address(&input)?;
        self.find_owned(&actor, id).await?;
        self.uow.addresses().upsert(AddressOwner::Shop(id), input).await
    }

    async fn remove_address(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.find_owned(&actor, id).await?;
        if self.uow.addresses().remove(AddressOwner::Shop(id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}
