use serde::{Deserialize, Serialize};

/// What a generation request is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Entity {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Campaign {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Scan {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Ecosystem,
    /// Bulk marker: one report per entity of the campaign.
    AllEntities {
        #[serde(alias = "campaignId")]
        campaign_id: String,
        #[serde(default, alias = "campaignName", skip_serializing_if = "Option::is_none")]
        campaign_name: Option<String>,
    },
}

impl Target {
    pub fn is_bulk(&self) -> bool {
        matches!(self, Self::AllEntities { .. })
    }

    /// The concrete identifier this target points at, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Entity { id, .. } | Self::Campaign { id, .. } | Self::Scan { id, .. } => Some(id),
            Self::AllEntities { campaign_id, .. } => Some(campaign_id),
            Self::Ecosystem => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        let name = match self {
            Self::Entity { name, .. } | Self::Campaign { name, .. } | Self::Scan { name, .. } => name,
            Self::AllEntities { campaign_name, .. } => campaign_name,
            Self::Ecosystem => return None,
        };
        name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Entity { .. } => "entity",
            Self::Campaign { .. } => "campaign",
            Self::Scan { .. } => "scan",
            Self::Ecosystem => "ecosystem",
            Self::AllEntities { .. } => "all_entities",
        }
    }
}
