//! Region service - Country / province / city / village hierarchy.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::shop_service::check_address;
use crate::domain::{
    build_forest, Address, AddressInput, AddressOwner, Region, RegionFilter, RegionInput,
    RegionResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait RegionService: Send + Sync {
    async fn list_regions(&self, filter: RegionFilter) -> AppResult<Vec<Region>>;

    /// Every region nested under its parent, countries at the top
    async fn region_tree(&self) -> AppResult<Vec<RegionResponse>>;

    /// Region with its direct children and address
    async fn get_region(&self, id: Uuid) -> AppResult<RegionResponse>;

    async fn create_region(&self, input: RegionInput) -> AppResult<Region>;

    async fn update_region(&self, id: Uuid, input: RegionInput) -> AppResult<Region>;

    /// Refused while child regions or shops reference the region.
    async fn delete_region(&self, id: Uuid) -> AppResult<()>;

    async fn upsert_address(&self, id: Uuid, input: AddressInput) -> AppResult<Address>;

    async fn remove_address(&self, id: Uuid) -> AppResult<()>;
}

pub struct RegionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RegionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, id: Uuid) -> AppResult<Region> {
        self.uow.regions().find_by_id(id).await?.ok_or_not_found()
    }

    /// Kind must sit exactly one level below the parent's kind.
    async fn check_placement(&self, input: &RegionInput, id: Option<Uuid>) -> AppResult<()> {
        match input.parent_id {
            None if input.kind.can_be_root() => Ok(()),
            None => Err(AppError::field(
                "parent_id",
                format!("A {} needs a parent region.", input.kind.as_str()),
            )),
            Some(parent_id) if Some(parent_id) == id => {
                Err(AppError::field("parent_id", "A region cannot be its own parent."))
            }
            Some(parent_id) => {
                let parent = self
                    .uow
                    .regions()
                    .find_by_id(parent_id)
                    .await?
                    .ok_or_else(|| AppError::field("parent_id", "The selected parent is invalid."))?;

                if parent.kind.can_parent(input.kind) {
                    Ok(())
                } else {
                    Err(AppError::field(
                        "kind",
                        format!(
                            "A {} cannot be placed under a {}.",
                            input.kind.as_str(),
                            parent.kind.as_str()
                        ),
                    ))
                }
            }
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> RegionService for RegionManager<U> {
    async fn list_regions(&self, filter: RegionFilter) -> AppResult<Vec<Region>> {
        self.uow.regions().list(filter).await
    }

    async fn region_tree(&self) -> AppResult<Vec<RegionResponse>> {
        let regions = self.uow.regions().list(RegionFilter::default()).await?;
        Ok(build_forest(regions, RegionResponse::node))
    }

    async fn get_region(&self, id: Uuid) -> AppResult<RegionResponse> {
        let region = self.find(id).await?;
        let children = self
            .uow
            .regions()
            .list(RegionFilter {
                parent_id: Some(id),
                kind: None,
            })
            .await?;
        let address = self.uow.addresses().find_for(AddressOwner::Region(id)).await?;

        let mut response =
            RegionResponse::node(region, children.into_iter().map(RegionResponse::from).collect());
        response.address = address.map(Into::into);
        Ok(response)
    }

    async fn create_region(&self, input: RegionInput) -> AppResult<Region> {
        self.check_placement(&input, None).await?;
        let region = self.uow.regions().create(input).await?;
        tracing::info!(region_id = %region.id, kind = region.kind.as_str(), "Region created");
        Ok(region)
    }

    async fn update_region(&self, id: Uuid, input: RegionInput) -> AppResult<Region> {
        let current = self.find(id).await?;
        self.check_placement(&input, Some(id)).await?;

        // Children were placed against the current kind
        if current.kind != input.kind && self.uow.regions().count_children(id).await? > 0 {
            return Err(AppError::field(
                "kind",
                "The kind of a region with child regions cannot change.",
            ));
        }

        self.uow.regions().update(id, input).await
    }

    async fn delete_region(&self, id: Uuid) -> AppResult<()> {
        self.find(id).await?;

        let regions = self.uow.regions();
        if regions.count_children(id).await? > 0 {
            return Err(AppError::conflict("Region still has child regions"));
        }
        if regions.count_shops(id).await? > 0 {
            return Err(AppError::conflict("Region still has shops"));
        }

        regions.delete(id).await?;
        tracing::info!(region_id = %id, "Region deleted");
        Ok(())
    }

    async fn upsert_address(&self, id: Uuid, input: AddressInput) -> AppResult<Address> {
        check_address(&input)?;
        self.find(id).await?;
        self.uow
            .addresses()
            .upsert(AddressOwner::Region(id), input)
            .await
    }

    async fn remove_address(&self, id: Uuid) -> AppResult<()> {
        self.find(id).await?;
        if self.uow.addresses().remove(AddressOwner::Region(id)).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegionKind;
    use crate::infra::MockRegionRepository;
    use crate::services::testing::TestUow;
    use chrono::Utc;

    fn region(id: Uuid, parent_id: Option<Uuid>, kind: RegionKind) -> Region {
        Region {
            id,
            parent_id,
            kind,
            name_tm: "Ahal".to_string(),
            name_en: "Ahal".to_string(),
            name_ru: "Ахал".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(parent_id: Option<Uuid>, kind: RegionKind) -> RegionInput {
        RegionInput {
            parent_id,
            kind,
            name_tm: "Täze".to_string(),
            name_en: "New".to_string(),
            name_ru: "Новый".to_string(),
        }
    }

    fn manager(regions: MockRegionRepository) -> RegionManager<TestUow> {
        RegionManager::new(Arc::new(TestUow {
            regions: Arc::new(regions),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_city_cannot_sit_under_country() {
        let country = Uuid::new_v4();
        let mut regions = MockRegionRepository::new();
        regions
            .expect_find_by_id()
            .returning(move |id| Ok(Some(region(id, None, RegionKind::Country))));
        regions.expect_create().never();

        let result = manager(regions)
            .create_region(input(Some(country), RegionKind::City))
            .await;
        match result {
            Err(AppError::InvalidFields(fields)) => assert!(fields.contains_key("kind")),
            other => panic!("unexpected: {:?}", other.map(|r| r.id)),
        }
    }

    #[tokio::test]
    async fn test_province_needs_parent() {
        let mut regions = MockRegionRepository::new();
        regions.expect_create().never();

        let result = manager(regions)
            .create_region(input(None, RegionKind::Province))
            .await;
        assert!(matches!(result, Err(AppError::InvalidFields(_))));
    }

    #[tokio::test]
    async fn test_province_under_country_is_created() {
        let country = Uuid::new_v4();
        let mut regions = MockRegionRepository::new();
        regions
            .expect_find_by_id()
            .returning(move |id| Ok(Some(region(id, None, RegionKind::Country))));
        regions
            .expect_create()
            .times(1)
            .returning(|input| Ok(region(Uuid::new_v4(), input.parent_id, input.kind)));

        let created = manager(regions)
            .create_region(input(Some(country), RegionKind::Province))
            .await
            .unwrap();
        assert_eq!(created.parent_id, Some(country));
    }

    #[tokio::test]
    async fn test_delete_refused_while_shops_exist() {
        let mut regions = MockRegionRepository::new();
        regions
            .expect_find_by_id()
            .returning(|id| Ok(Some(region(id, None, RegionKind::Country))));
        regions.expect_count_children().returning(|_| Ok(0));
        regions.expect_count_shops().returning(|_| Ok(2));
        regions.expect_delete().never();

        let result = manager(regions).delete_region(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_tree_nests_children() {
        let country = Uuid::new_v4();
        let province = Uuid::new_v4();
        let mut regions = MockRegionRepository::new();
        regions.expect_list().returning(move |_| {
            Ok(vec![
                region(province, Some(country), RegionKind::Province),
                region(country, None, RegionKind::Country),
            ])
        });

        let tree = manager(regions).region_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, country);
        assert_eq!(tree[0].children[0].id, province);
    }
}
