//! Administrative regions: country → province → city → village.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::address::AddressResponse;
use super::tree::TreeItem;

/// Level of a region in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Country,
    Province,
    City,
    Village,
}

impl RegionKind {
    /// Depth in the tree, countries are 0
    pub fn rank(&self) -> u8 {
        match self {
            RegionKind::Country => 0,
            RegionKind::Province => 1,
            RegionKind::City => 2,
            RegionKind::Village => 3,
        }
    }

    /// A parent must sit exactly one level above its child.
    pub fn can_parent(&self, child: RegionKind) -> bool {
        self.rank() + 1 == child.rank()
    }

    /// Only countries live at the top.
    pub fn can_be_root(&self) -> bool {
        matches!(self, RegionKind::Country)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionKind::Country => "country",
            RegionKind::Province => "province",
            RegionKind::City => "city",
            RegionKind::Village => "village",
        }
    }
}

impl std::str::FromStr for RegionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "country" => Ok(RegionKind::Country),
            "province" => Ok(RegionKind::Province),
            "city" => Ok(RegionKind::City),
            "village" => Ok(RegionKind::Village),
            other => Err(format!("Unknown region kind '{}'", other)),
        }
    }
}

/// Region domain entity
#[derive(Debug, Clone)]
pub struct Region {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub kind: RegionKind,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeItem for Region {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// Region creation / full update payload after validation
#[derive(Debug, Clone)]
pub struct RegionInput {
    pub parent_id: Option<Uuid>,
    pub kind: RegionKind,
    pub name_tm: String,
    pub name_en: String,
    pub name_ru: String,
}

/// Flat listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegionFilter {
    /// Direct children of this region
    pub parent_id: Option<Uuid>,
    pub kind: Option<RegionKind>,
}

/// Region response; `children` and `address` are filled on detail reads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionResponse {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub kind: RegionKind,
    #[schema(example = "Aşgabat")]
    pub name_tm: String,
    #[schema(example = "Ashgabat")]
    pub name_en: String,
    #[schema(example = "Ашхабад")]
    pub name_ru: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RegionResponse>,
}

impl RegionResponse {
    pub fn node(region: Region, children: Vec<RegionResponse>) -> Self {
        Self {
            children,
            ..Self::from(region)
        }
    }
}

impl From<Region> for RegionResponse {
    fn from(region: Region) -> Self {
        Self {
            id: region.id,
            parent_id: region.parent_id,
            kind: region.kind,
            name_tm: region.name_tm,
            name_en: region.name_en,
            name_ru: region.name_ru,
            address: None,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ordering() {
        assert!(RegionKind::Country.can_parent(RegionKind::Province));
        assert!(RegionKind::Province.can_parent(RegionKind::City));
        assert!(RegionKind::City.can_parent(RegionKind::Village));
        assert!(!RegionKind::Country.can_parent(RegionKind::City));
        assert!(!RegionKind::Village.can_parent(RegionKind::Village));
        assert!(!RegionKind::City.can_parent(RegionKind::Province));
    }

    #[test]
    fn test_only_countries_are_roots() {
        assert!(RegionKind::Country.can_be_root());
        assert!(!RegionKind::Province.can_be_root());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("city".parse::<RegionKind>(), Ok(RegionKind::City));
        assert!("town".parse::<RegionKind>().is_err());
    }
}
