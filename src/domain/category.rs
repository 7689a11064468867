//! Product categories with localized names, arranged as a tree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::tree::TreeItem;

/// Category domain entity. `category_id` points at the parent.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeItem for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.category_id
    }
}

/// Fields written when a category is created
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub category_id: Option<Uuid>,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub slug: String,
    pub image: Option<String>,
}

/// Partial category update. `category_id: Some(None)` moves to the top level.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub category_id: Option<Option<Uuid>>,
    pub name_tm: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
}

/// Category response with nested children
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Miweler")]
    pub name_tm: String,
    #[schema(example = "Fruits")]
    pub name_en: String,
    #[schema(example = "Фрукты")]
    pub name_ru: String,
    #[schema(example = "fruits")]
    pub slug: String,
    pub image: Option<String>,
    #[serde(default)]
    pub children: Vec<CategoryResponse>,
}

impl CategoryResponse {
    pub fn node(category: Category, children: Vec<CategoryResponse>) -> Self {
        Self {
            children,
            ..Self::from(category)
        }
    }
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            category_id: category.category_id,
            name_tm: category.name_tm,
            name_en: category.name_en,
            name_ru: category.name_ru,
            slug: category.slug,
            image: category.image,
            children: Vec::new(),
        }
    }
}

/// Compact category view embedded in product responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub slug: String,
}

impl From<Category> for CategorySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name_tm: category.name_tm,
            name_en: category.name_en,
            name_ru: category.name_ru,
            slug: category.slug,
        }
    }
}
