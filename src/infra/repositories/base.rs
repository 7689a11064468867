//! Base repository traits following Interface Segregation Principle (ISP).
//!
//! These traits provide a foundation for the simple catalog repositories
//! with common CRUD operations that can be composed as needed.

use async_trait::async_trait;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, PaginatorTrait, PrimaryKeyTrait, Select,
    SqlErr,
};
use std::fmt::Debug;

use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

/// Fetch one page of a query together with the total row count.
pub(crate) async fn paginate<E>(
    select: Select<E>,
    db: &DatabaseConnection,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sync + 'static,
{
    let paginator = select.paginate(db, params.limit());
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(params.page_index()).await?;
    Ok((data, total))
}

/// Read operations (Query) - Single Responsibility
#[async_trait]
pub trait ReadRepository<E, M>: Send + Sync
where
    E: EntityTrait<Model = M>,
    M: Send + Sync + FromQueryResult + 'static,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Default listing order
    fn order(&self, select: Select<E>) -> Select<E> {
        select
    }

    /// Find entity by primary key
    async fn find_by_id(&self, id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType) -> AppResult<Option<M>>
    where
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: Clone + Send,
    {
        E::find_by_id(id)
            .one(self.db())
            .await
            .map_err(Into::into)
    }

    /// Find entities with pagination
    async fn find_paginated(&self, params: &PaginationParams) -> AppResult<(Vec<M>, u64)> {
        paginate(self.order(E::find()), self.db(), params).await
    }
}

/// Write operations (Command) - Single Responsibility
#[async_trait]
pub trait WriteRepository<E, M, A>: Send + Sync
where
    E: EntityTrait<Model = M>,
    M: Send + Sync + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Insert new entity
    async fn insert(&self, model: A) -> AppResult<M>
    where
        <<A as ActiveModelTrait>::Entity as EntityTrait>::Model: Send,
    {
        model.insert(self.db()).await.map_err(write_error)
    }

    /// Update existing entity
    async fn update(&self, model: A) -> AppResult<M>
    where
        <<A as ActiveModelTrait>::Entity as EntityTrait>::Model: Send,
    {
        model.update(self.db()).await.map_err(write_error)
    }
}

/// Delete operations - Single Responsibility
#[async_trait]
pub trait DeleteRepository<E>: Send + Sync
where
    E: EntityTrait,
{
    /// Get database connection reference
    fn db(&self) -> &DatabaseConnection;

    /// Delete entity by primary key, `NotFound` when nothing was removed
    async fn delete_by_id(&self, id: <E::PrimaryKey as PrimaryKeyTrait>::ValueType) -> AppResult<()>
    where
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: Clone + Send + Debug,
    {
        let result = E::delete_by_id(id).exec(self.db()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Case-insensitive substring match on any of `columns`.
pub(crate) fn search_condition<C: ColumnTrait>(columns: &[C], term: &str) -> Condition {
    let escaped = term.trim().replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    let pattern = format!("%{}%", escaped);
    columns.iter().fold(Condition::any(), |condition, column| {
        condition.add(Expr::col(*column).ilike(pattern.clone()))
    })
}

/// Map constraint violations raised by writes to client errors.
pub(crate) fn write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Unique constraint violation: {}", detail);
            AppError::conflict("A record with the same unique value already exists")
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            tracing::debug!("Foreign key violation: {}", detail);
            AppError::conflict("The record is referenced by or references missing data")
        }
        _ => AppError::Database(err),
    }
}
