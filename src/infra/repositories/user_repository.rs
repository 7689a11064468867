//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{paginate, search_condition, write_error};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{ROLE_USER, STATUS_ACTIVE};
use crate::domain::{AccountChanges, AccountFilter, NewAccount, User};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// By default, all query methods exclude soft-deleted records.
/// Use `*_with_deleted` variants to include them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by ID (excludes soft-deleted)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by ID including soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by phone including soft-deleted
    async fn find_by_phone_with_deleted(&self, phone: &str) -> AppResult<Option<User>>;

    /// Find user by email including soft-deleted
    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>>;

    /// Page through users, newest first
    async fn list(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<User>, u64)>;

    /// Create a new user
    async fn create(&self, account: NewAccount) -> AppResult<User>;

    /// Update user fields (only active users)
    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<User>;

    /// Soft delete user by ID (sets deleted_at timestamp)
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Permanently delete user from database (hard delete)
    async fn hard_delete(&self, id: Uuid) -> AppResult<()>;

    /// Restore a soft-deleted user
    async fn restore(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserRepository with soft delete
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_active_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_phone_with_deleted(&self, phone: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list(
        &self,
        filter: AccountFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        let mut query = UserEntity::find().order_by_desc(user::Column::CreatedAt);

        query = if filter.only_deleted {
            query.filter(user::Column::DeletedAt.is_not_null())
        } else if filter.with_deleted {
            query
        } else {
            query.filter(user::Column::DeletedAt.is_null())
        };

        if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
            query = query.filter(search_condition(
                &[user::Column::Name, user::Column::Phone, user::Column::Email],
                term,
            ));
        }

        let (models, total) = paginate(query, &self.db, &params).await?;
        Ok((models.into_iter().map(User::from).collect(), total))
    }

    async fn create(&self, account: NewAccount) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(account.name),
            phone: Set(account.phone),
            email: Set(account.email),
            image: Set(account.image),
            status: Set(account
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| STATUS_ACTIVE.to_string())),
            role: Set(account
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| ROLE_USER.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(&self.db).await.map_err(write_error)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> AppResult<User> {
        // Only allow updating active (non-deleted) users
        let user = self.find_active_model(id).await?;
        let mut active: ActiveModel = user.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = changes.email {
            active.email = Set(Some(email));
        }
        if let Some(image) = changes.image {
            active.image = Set(Some(image));
        }
        if let Some(status) = changes.status {
            active.status = Set(status.to_string());
        }
        if let Some(role) = changes.role {
            active.role = Set(role.to_string());
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(write_error)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        // Soft delete: set deleted_at timestamp
        let user = self.find_active_model(id).await?;

        let mut active: ActiveModel = user.into();
        let now = chrono::Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn hard_delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn restore(&self, id: Uuid) -> AppResult<User> {
        // Find the soft-deleted user
        let user = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_not_null())
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::validation("User is not deleted or does not exist"))?;

        let mut active: ActiveModel = user.into();
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }
}
