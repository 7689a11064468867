//! User service - Handles user-related business logic.
//!
//! By default, operations exclude soft-deleted users.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::ImageService;
use crate::config::FOLDER_USERS;
use crate::domain::{AccountChanges, AccountFilter, NewAccount, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};
use crate::utils::slugify;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by ID (excludes soft-deleted)
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Get user by ID including soft-deleted
    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User>;

    async fn list_users(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<User>>;

    /// Create a user. `image` is an inline base64 payload.
    async fn create_user(&self, account: NewAccount, image: Option<String>) -> AppResult<User>;

    /// Update user details (only active users)
    async fn update_user(
        &self,
        id: Uuid,
        changes: AccountChanges,
        image: Option<String>,
    ) -> AppResult<User>;

    /// Soft delete user (sets deleted_at timestamp)
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Permanently delete user from database (hard delete)
    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore_user(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    /// Phone and email stay unique across active and deleted users.
    async fn ensure_unique(
        &self,
        phone: Option<&str>,
        email: Option<&str>,
        except: Option<Uuid>,
    ) -> AppResult<()> {
        let users = self.uow.users();
        if let Some(phone) = phone {
            if let Some(existing) = users.find_by_phone_with_deleted(phone).await? {
                if Some(existing.id) != except {
                    return Err(AppError::field("phone", "The phone has already been taken."));
                }
            }
        }
        if let Some(email) = email {
            if let Some(existing) = users.find_by_email_with_deleted(email).await? {
                if Some(existing.id) != except {
                    return Err(AppError::field("email", "The email has already been taken."));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_user_with_deleted(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found()
    }

    async fn list_users(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<User>> {
        let (users, total) = self.uow.users().list(filter, params.clone()).await?;
        Ok(Paginated::from_page(users, &params, total))
    }

    async fn create_user(&self, mut account: NewAccount, image: Option<String>) -> AppResult<User> {
        self.ensure_unique(Some(&account.phone), account.email.as_deref(), None)
            .await?;

        account.image = self
            .images
            .store_optional(FOLDER_USERS, &slugify(&account.name), image.as_deref())
            .await?;
        let stored = account.image.clone();

        match self.uow.users().create(account).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User created");
                Ok(user)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn update_user(
        &self,
        id: Uuid,
        mut changes: AccountChanges,
        image: Option<String>,
    ) -> AppResult<User> {
        let current = self.get_user(id).await?;
        self.ensure_unique(changes.phone.as_deref(), changes.email.as_deref(), Some(id))
            .await?;

        let name = changes.name.as_deref().unwrap_or(&current.name);
        changes.image = self
            .images
            .store_optional(FOLDER_USERS, &slugify(name), image.as_deref())
            .await?;
        let replaced = changes.image.is_some();
        let stored = changes.image.clone();

        match self.uow.users().update(id, changes).await {
            Ok(user) => {
                if replaced {
                    self.images.discard(current.image.as_deref()).await;
                }
                Ok(user)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "User soft deleted");
        Ok(())
    }

    async fn hard_delete_user(&self, id: Uuid) -> AppResult<()> {
        let user = self.get_user_with_deleted(id).await?;
        // Shops and their products go with the user through the FK cascade
        let shop_files = self.uow.shops().owner_image_paths(id).await?;
        self.uow.users().hard_delete(id).await?;

        self.images.discard_all(&shop_files).await;
        self.images.discard(user.image.as_deref()).await;
        tracing::info!(user_id = %id, shop_files = shop_files.len(), "User permanently deleted");
        Ok(())
    }

    async fn restore_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().restore(id).await
    }
}
