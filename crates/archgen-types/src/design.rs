//! Design identifiers, baseline bundle, versions, and history shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::dna::DesignDna;
use crate::drift::DriftReport;

/// Unique identifier for a design, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignId(pub Uuid);

impl DesignId {
    /// Create a new DesignId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for DesignId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DesignId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a version of a design.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

impl VersionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VersionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Pixel placement of one panel on the composite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelCoordinates {
    /// Panel key ("elevation_N", "section_AA", "persp_main", "floor_plan").
    pub panel: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Write-once record of the first accepted generation for a design.
///
/// Created exactly once per design id and never mutated afterward. The
/// frozen DNA, locks, seed, and base prompt are the reference every later
/// modification is validated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineArtifactBundle {
    pub design_id: DesignId,
    pub baseline_image_url: String,
    /// Frozen DNA at acceptance time.
    pub baseline_dna: DesignDna,
    /// Frozen lock declarations, one per locked field.
    pub consistency_locks: Vec<String>,
    /// Base generation seed, copied verbatim into every later request.
    pub seed: u64,
    /// Frozen create-mode prompt.
    pub base_prompt: String,
    pub panel_coordinates: Vec<PanelCoordinates>,
    pub consistency_score: f64,
    pub created_at: DateTime<Utc>,
}

/// One accepted modification of a design. Append-only: versions are never
/// edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub version_id: VersionId,
    pub prompt: String,
    pub image_url: String,
    pub seed: u64,
    pub consistency_score: f64,
    pub ssim_score: f64,
    pub hash_distance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift_report: Option<DriftReport>,
    pub created_at: DateTime<Utc>,
}

/// Quick-toggle modification switches from the wizard UI. Each active
/// toggle declares one field group as an intended modification target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickToggles {
    #[serde(default)]
    pub change_materials: bool,
    #[serde(default)]
    pub change_roof: bool,
    #[serde(default)]
    pub change_openings: bool,
    #[serde(default)]
    pub change_dimensions: bool,
}

impl QuickToggles {
    /// Field groups this toggle set declares as open for modification.
    pub fn declared_groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::new();
        if self.change_materials {
            groups.push("materials");
        }
        if self.change_roof {
            groups.push("roof");
        }
        if self.change_openings {
            groups.push("openings");
        }
        if self.change_dimensions {
            groups.push("dimensions");
        }
        groups
    }
}

/// One modification call against an existing design. Transient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub design_id: DesignId,
    /// The modification itself ("add sections", "make the roof slate").
    pub delta_prompt: String,
    #[serde(default)]
    pub quick_toggles: QuickToggles,
    /// Free-form user context appended to the prompt, never a lock target.
    #[serde(default)]
    pub user_prompt: Option<String>,
    /// Updated DNA when the modification edits symbolic fields. Compared
    /// structurally against the frozen baseline DNA during drift
    /// validation; absent means "no symbolic change requested".
    #[serde(default)]
    pub updated_dna: Option<crate::dna::RawDesignDna>,
}

/// Result of a successful create flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignCreated {
    pub design_id: DesignId,
    pub image_url: String,
    pub seed: u64,
    pub consistency_score: f64,
}

/// Result of a successful modify flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignModified {
    pub version_id: VersionId,
    pub image_url: String,
    pub consistency_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift_report: Option<DriftReport>,
}

/// Baseline plus full append-only version list for one design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignHistory {
    pub baseline: BaselineArtifactBundle,
    pub versions: Vec<Version>,
}
