//! Address repository.
//!
//! The query functions are generic over the connection so the
//! transactional writers in the unit of work share them.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::base::write_error;
use super::entities::address::{self, Entity as AddressEntity};
use crate::domain::{Address, AddressInput, AddressOwner};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn find_for(&self, owner: AddressOwner) -> AppResult<Option<Address>>;

    /// Create or replace the single address of `owner`
    async fn upsert(&self, owner: AddressOwner, input: AddressInput) -> AppResult<Address>;

    /// Returns false when the owner had no address
    async fn remove(&self, owner: AddressOwner) -> AppResult<bool>;
}

pub struct AddressStore {
    db: DatabaseConnection,
}

impl AddressStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn find_for(&self, owner: AddressOwner) -> AppResult<Option<Address>> {
        find_for(&self.db, owner).await
    }

    async fn upsert(&self, owner: AddressOwner, input: AddressInput) -> AppResult<Address> {
        upsert(&self.db, owner, input).await
    }

    async fn remove(&self, owner: AddressOwner) -> AppResult<bool> {
        remove(&self.db, owner).await
    }
}

fn owner_filter(owner: AddressOwner) -> sea_orm::sea_query::SimpleExpr {
    match owner {
        AddressOwner::Shop(id) => address::Column::ShopId.eq(id),
        AddressOwner::Region(id) => address::Column::RegionId.eq(id),
    }
}

pub(crate) async fn find_for<C: ConnectionTrait>(
    conn: &C,
    owner: AddressOwner,
) -> AppResult<Option<Address>> {
    AddressEntity::find()
        .filter(owner_filter(owner))
        .one(conn)
        .await?
        .map(Address::try_from)
        .transpose()
}

pub(crate) async fn upsert<C: ConnectionTrait>(
    conn: &C,
    owner: AddressOwner,
    input: AddressInput,
) -> AppResult<Address> {
    let now = chrono::Utc::now();
    let existing = AddressEntity::find()
        .filter(owner_filter(owner))
        .one(conn)
        .await?;

    let model = match existing {
        Some(model) => {
            let mut active: address::ActiveModel = model.into();
            active.line = Set(input.line);
            active.postal_code = Set(input.postal_code);
            active.latitude = Set(input.latitude);
            active.longitude = Set(input.longitude);
            active.updated_at = Set(now);
            active.update(conn).await.map_err(write_error)?
        }
        None => address::ActiveModel {
            id: Set(Uuid::new_v4()),
            shop_id: Set(owner.shop_id()),
            region_id: Set(owner.region_id()),
            line: Set(input.line),
            postal_code: Set(input.postal_code),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(write_error)?,
    };

    Address::try_from(model)
}

pub(crate) async fn remove<C: ConnectionTrait>(conn: &C, owner: AddressOwner) -> AppResult<bool> {
    let result = AddressEntity::delete_many()
        .filter(owner_filter(owner))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
