//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis-backed rate limit counters
//! - Public file storage for uploaded images
//! - Unit of Work for transaction management

use async_trait::async_trait;

use crate::errors::AppResult;

pub mod cache;
pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStore};
pub use db::{Database, Migrator};
pub use repositories::*;
pub use storage::{FileStorage, LocalDisk};
pub use unit_of_work::{
    AddressWriter, Persistence, ProductWriter, ShopWriter, TransactionContext, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockFileStorage;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::{MockAddressWriter, MockProductWriter, MockShopWriter};

/// Backing system that can report whether it is reachable
#[async_trait]
pub trait Pingable: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}
