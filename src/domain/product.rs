//! Products and the catalog entities attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::category::CategorySummary;
use super::shop::ShopResponse;

/// Unit of a composition quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QtyType {
    Gram,
    Kilogram,
    Milliliter,
    Liter,
    Piece,
    Percent,
}

impl QtyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QtyType::Gram => "gram",
            QtyType::Kilogram => "kilogram",
            QtyType::Milliliter => "milliliter",
            QtyType::Liter => "liter",
            QtyType::Piece => "piece",
            QtyType::Percent => "percent",
        }
    }
}

impl std::str::FromStr for QtyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gram" => Ok(QtyType::Gram),
            "kilogram" => Ok(QtyType::Kilogram),
            "milliliter" => Ok(QtyType::Milliliter),
            "liter" => Ok(QtyType::Liter),
            "piece" => Ok(QtyType::Piece),
            "percent" => Ok(QtyType::Percent),
            other => Err(format!("Unknown quantity type '{}'", other)),
        }
    }
}

/// Brand domain entity
#[derive(Debug, Clone)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Composition (ingredient / material) domain entity
#[derive(Debug, Clone)]
pub struct Composition {
    pub id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBrand {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BrandChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewComposition {
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompositionChanges {
    pub name_tm: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
}

/// Pivot row between a product and a composition
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionLink {
    pub composition_id: Uuid,
    pub qty: f64,
    pub qty_type: QtyType,
}

/// Product price in minor units with an optional discounted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub price: i64,
    pub discount_price: Option<i64>,
}

impl Pricing {
    /// Check the price rules. Returns the offending field and message.
    pub fn check(&self) -> Result<(), (&'static str, &'static str)> {
        if self.price < 0 {
            return Err(("price", "Price must not be negative"));
        }
        match self.discount_price {
            Some(discount) if discount < 0 => {
                Err(("discount_price", "Discount price must not be negative"))
            }
            Some(discount) if discount >= self.price => {
                Err(("discount_price", "Discount price must be below the price"))
            }
            _ => Ok(()),
        }
    }

    /// Price a buyer actually pays
    pub fn effective(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }
}

/// Product domain entity
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub shop_id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub slug: String,
    pub description: Option<String>,
    pub pricing: Pricing,
    pub stock: i32,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image attached to a product, ordered by `position`
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub path: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields written when a product is created
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: Uuid,
    pub shop_id: Uuid,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub slug: String,
    pub description: Option<String>,
    pub pricing: Pricing,
    pub stock: i32,
    pub status: bool,
}

/// Partial product update. Pricing is always written as a pair.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub category_id: Option<Uuid>,
    pub name_tm: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub pricing: Option<Pricing>,
    pub stock: Option<i32>,
    pub status: Option<bool>,
}

/// Product with its links and inline images, as submitted for creation
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub product: NewProduct,
    pub brand_ids: Vec<Uuid>,
    pub compositions: Vec<CompositionLink>,
    /// Base64 or data URI payloads, appended in order
    pub images: Vec<String>,
}

/// Product update as submitted.
///
/// Pricing is merged with the stored pair. Link lists replace the current
/// ones when present; images are appended.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub changes: ProductChanges,
    pub price: Option<i64>,
    pub discount_price: Option<Option<i64>>,
    pub brand_ids: Option<Vec<Uuid>>,
    pub compositions: Option<Vec<CompositionLink>>,
    pub images: Vec<String>,
}

impl ProductPatch {
    /// New pricing pair, `None` when neither end was sent.
    pub fn merged_pricing(&self, current: Pricing) -> Option<Pricing> {
        if self.price.is_none() && self.discount_price.is_none() {
            return None;
        }
        Some(Pricing {
            price: self.price.unwrap_or(current.price),
            discount_price: self.discount_price.unwrap_or(current.discount_price),
        })
    }
}

/// Listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub shop_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    /// Case-insensitive match on any localized name
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BrandResponse {
    pub id: Uuid,
    #[schema(example = "Nestle")]
    pub name: String,
    #[schema(example = "nestle")]
    pub slug: String,
    pub image: Option<String>,
}

impl From<Brand> for BrandResponse {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id,
            name: brand.name,
            slug: brand.slug,
            image: brand.image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompositionResponse {
    pub id: Uuid,
    #[schema(example = "Şeker")]
    pub name_tm: String,
    #[schema(example = "Sugar")]
    pub name_en: String,
    #[schema(example = "Сахар")]
    pub name_ru: String,
}

impl From<Composition> for CompositionResponse {
    fn from(composition: Composition) -> Self {
        Self {
            id: composition.id,
            name_tm: composition.name_tm,
            name_en: composition.name_en,
            name_ru: composition.name_ru,
        }
    }
}

/// Composition as listed on a product, with its pivot quantity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductCompositionResponse {
    #[serde(flatten)]
    pub composition: CompositionResponse,
    #[schema(example = 12.5)]
    pub qty: f64,
    pub qty_type: QtyType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImageResponse {
    pub id: Uuid,
    #[schema(example = "/storage/products/apple-juice/8f1c.png")]
    pub path: String,
    pub position: i32,
}

impl From<ProductImage> for ProductImageResponse {
    fn from(image: ProductImage) -> Self {
        Self {
            id: image.id,
            path: image.path,
            position: image.position,
        }
    }
}

/// Product response. Relations are filled on detail reads.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub shop_id: Uuid,
    #[schema(example = "Alma şiresi")]
    pub name_tm: String,
    #[schema(example = "Apple juice")]
    pub name_en: String,
    #[schema(example = "Яблочный сок")]
    pub name_ru: String,
    #[schema(example = "apple-juice")]
    pub slug: String,
    pub description: Option<String>,
    /// Minor currency units
    #[schema(example = 1250)]
    pub price: i64,
    pub discount_price: Option<i64>,
    #[schema(example = 40)]
    pub stock: i32,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopResponse>,
    #[serde(default)]
    pub brands: Vec<BrandResponse>,
    #[serde(default)]
    pub compositions: Vec<ProductCompositionResponse>,
    #[serde(default)]
    pub images: Vec<ProductImageResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            shop_id: product.shop_id,
            name_tm: product.name_tm,
            name_en: product.name_en,
            name_ru: product.name_ru,
            slug: product.slug,
            description: product.description,
            price: product.pricing.price,
            discount_price: product.pricing.discount_price,
            stock: product.stock,
            status: product.status,
            category: None,
            shop: None,
            brands: Vec::new(),
            compositions: Vec::new(),
            images: Vec::new(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_rules() {
        let ok = Pricing {
            price: 1000,
            discount_price: Some(900),
        };
        assert!(ok.check().is_ok());
        assert_eq!(ok.effective(), 900);

        let equal = Pricing {
            price: 1000,
            discount_price: Some(1000),
        };
        assert_eq!(equal.check().unwrap_err().0, "discount_price");

        let negative = Pricing {
            price: -1,
            discount_price: None,
        };
        assert_eq!(negative.check().unwrap_err().0, "price");

        let free = Pricing {
            price: 0,
            discount_price: None,
        };
        assert!(free.check().is_ok());
        assert_eq!(free.effective(), 0);
    }

    #[test]
    fn test_patch_merges_pricing() {
        let current = Pricing {
            price: 1000,
            discount_price: Some(800),
        };

        assert_eq!(ProductPatch::default().merged_pricing(current), None);

        let raise = ProductPatch {
            price: Some(1200),
            ..Default::default()
        };
        assert_eq!(
            raise.merged_pricing(current),
            Some(Pricing {
                price: 1200,
                discount_price: Some(800)
            })
        );

        let clear = ProductPatch {
            discount_price: Some(None),
            ..Default::default()
        };
        assert_eq!(clear.merged_pricing(current).unwrap().discount_price, None);
    }

    #[test]
    fn test_qty_type_round_trip_names() {
        for qty in [QtyType::Gram, QtyType::Liter, QtyType::Percent] {
            assert_eq!(qty.as_str().parse::<QtyType>(), Ok(qty));
        }
        assert!("bucket".parse::<QtyType>().is_err());
    }
}
