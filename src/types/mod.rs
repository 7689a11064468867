//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{
    Paginated, PaginatedBrands, PaginatedCompositions, PaginatedProducts, PaginatedSellers,
    PaginatedShops, PaginatedUsers, PaginationMeta, PaginationParams,
};
pub use response::{Created, MessageResponse, NoContent};
