//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::{
    BrandResponse, CompositionResponse, ProductResponse, SellerResponse, ShopResponse,
    UserResponse,
};

/// Pagination query parameters (reusable across all list endpoints)
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[param(example = 1)]
    pub page: u64,
    /// Items per page, capped at 100
    #[serde(default = "default_per_page")]
    #[param(example = 20)]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Requested page, never below 1.
    ///
    /// Capped so the row offset (`page_index * limit`) fits in a Postgres
    /// `bigint`.
    pub fn page(&self) -> u64 {
        let last = i64::MAX as u64 / self.limit();
        self.page.clamp(1, last)
    }

    /// Zero-based page index for the database paginator
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }

    /// Get limit capped at maximum, never zero
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper (reusable for all list responses)
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PaginatedUsers = Paginated<UserResponse>,
    PaginatedSellers = Paginated<SellerResponse>,
    PaginatedShops = Paginated<ShopResponse>,
    PaginatedBrands = Paginated<BrandResponse>,
    PaginatedCompositions = Paginated<CompositionResponse>,
    PaginatedProducts = Paginated<ProductResponse>
)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            0
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Build from a page of rows fetched with `params`
    pub fn from_page(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        Self::new(data, params.page(), params.limit(), total)
    }

    /// Convert every item, keeping the metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        let params = PaginationParams::new(1, 10_000);
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
        assert_eq!(PaginationParams::new(1, 0).limit(), 1);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let params = PaginationParams::new(0, 20);
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_index(), 0);
        assert_eq!(PaginationParams::new(3, 20).page_index(), 2);
    }

    #[test]
    fn test_huge_page_keeps_offset_in_range() {
        for per_page in [1, 20, MAX_PAGE_SIZE] {
            let params = PaginationParams::new(u64::MAX, per_page);
            let offset = params
                .page_index()
                .checked_mul(params.limit())
                .expect("offset overflowed");
            assert!(offset <= i64::MAX as u64);
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Paginated::new(vec![1, 2], 1, 20, 41);
        assert_eq!(page.meta.total_pages, 3);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.data, vec![10, 20]);
        assert_eq!(mapped.meta.total, 41);
    }
}
