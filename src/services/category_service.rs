//! Category service - Product category tree.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::ImageService;
use crate::config::FOLDER_CATEGORIES;
use crate::domain::{
    build_forest, descendants, Category, CategoryChanges, CategoryResponse, NewCategory,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::utils::slug_or;

#[async_trait]
pub trait CategoryService: Send + Sync {
    /// Every category nested under its parent
    async fn category_tree(&self) -> AppResult<Vec<CategoryResponse>>;

    /// Category with its direct children
    async fn get_category(&self, id: Uuid) -> AppResult<CategoryResponse>;

    async fn create_category(
        &self,
        category: NewCategory,
        image: Option<String>,
    ) -> AppResult<Category>;

    /// Moving a category under itself or one of its descendants is refused.
    async fn update_category(
        &self,
        id: Uuid,
        changes: CategoryChanges,
        image: Option<String>,
    ) -> AppResult<Category>;

    /// Refused while subcategories or products reference the category.
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;
}

pub struct CategoryManager<U: UnitOfWork> {
    uow: Arc<U>,
    images: ImageService,
}

impl<U: UnitOfWork> CategoryManager<U> {
    pub fn new(uow: Arc<U>, images: ImageService) -> Self {
        Self { uow, images }
    }

    async fn find(&self, id: Uuid) -> AppResult<Category> {
        self.uow.categories().find_by_id(id).await?.ok_or_not_found()
    }

    async fn check_parent(&self, parent_id: Uuid) -> AppResult<()> {
        match self.uow.categories().find_by_id(parent_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::field(
                "category_id",
                "The selected parent category is invalid.",
            )),
        }
    }

    async fn check_slug(&self, slug: &str, except: Option<Uuid>) -> AppResult<()> {
        if self.uow.categories().slug_taken(slug, except).await? {
            Err(AppError::field("slug", "The slug has already been taken."))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CategoryService for CategoryManager<U> {
    async fn category_tree(&self) -> AppResult<Vec<CategoryResponse>> {
        let categories = self.uow.categories().all().await?;
        Ok(build_forest(categories, CategoryResponse::node))
    }

    async fn get_category(&self, id: Uuid) -> AppResult<CategoryResponse> {
        let categories = self.uow.categories().all().await?;
        let (mut found, rest): (Vec<Category>, Vec<Category>) =
            categories.into_iter().partition(|c| c.id == id);
        let category = found.pop().ok_or(AppError::NotFound)?;

        let children = rest
            .into_iter()
            .filter(|c| c.category_id == Some(id))
            .map(CategoryResponse::from)
            .collect();
        Ok(CategoryResponse::node(category, children))
    }

    async fn create_category(
        &self,
        mut category: NewCategory,
        image: Option<String>,
    ) -> AppResult<Category> {
        if let Some(parent_id) = category.category_id {
            self.check_parent(parent_id).await?;
        }
        category.slug = slug_or(Some(&category.slug), &category.name_en);
        self.check_slug(&category.slug, None).await?;

        category.image = self
            .images
            .store_optional(FOLDER_CATEGORIES, &category.slug, image.as_deref())
            .await?;
        let stored = category.image.clone();

        match self.uow.categories().create(category).await {
            Ok(category) => {
                tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
                Ok(category)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn update_category(
        &self,
        id: Uuid,
        mut changes: CategoryChanges,
        image: Option<String>,
    ) -> AppResult<Category> {
        let current = self.find(id).await?;

        if let Some(Some(parent_id)) = changes.category_id {
            if parent_id == id {
                return Err(AppError::field(
                    "category_id",
                    "A category cannot be its own parent.",
                ));
            }
            self.check_parent(parent_id).await?;

            let all = self.uow.categories().all().await?;
            if descendants(&all, id).contains(&parent_id) {
                return Err(AppError::field(
                    "category_id",
                    "A category cannot be moved under its own subcategory.",
                ));
            }
        }

        if let Some(slug) = changes.slug.take() {
            let name = changes.name_en.as_deref().unwrap_or(&current.name_en);
            let slug = slug_or(Some(&slug), name);
            self.check_slug(&slug, Some(id)).await?;
            changes.slug = Some(slug);
        }

        let folder_slug = changes.slug.as_deref().unwrap_or(&current.slug).to_string();
        changes.image = self
            .images
            .store_optional(FOLDER_CATEGORIES, &folder_slug, image.as_deref())
            .await?;
        let stored = changes.image.clone();

        match self.uow.categories().update(id, changes).await {
            Ok(category) => {
                if stored.is_some() {
                    self.images.discard(current.image.as_deref()).await;
                }
                Ok(category)
            }
            Err(e) => {
                self.images.discard(stored.as_deref()).await;
                Err(e)
            }
        }
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let category = self.find(id).await?;

        let categories = self.uow.categories();
        if categories.count_children(id).await? > 0 {
            return Err(AppError::conflict("Category still has subcategories"));
        }
        if categories.count_products(id).await? > 0 {
            return Err(AppError::conflict("Category still has products"));
        }

        categories.delete(id).await?;
        self.images.discard(category.image.as_deref()).await;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
