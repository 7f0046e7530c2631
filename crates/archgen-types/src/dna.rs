//! Design DNA: the canonical symbolic specification of a design.
//!
//! The DNA is the single source of truth that prompts are built from:
//! dimensions, material palette, openings, roof, and rooms. Raw input
//! arrives in loose shapes (numbers as strings, materials as a bare string
//! or a map) and is converted into the single tagged form at the boundary
//! by `archgen_core::dna::normalize` -- business logic never branches on
//! runtime shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical, normalized design DNA.
///
/// Invariants (maintained by the normalizer):
/// - `materials` and `rooms` are sorted by name.
/// - `dimensions.floor_count >= 1`, `roof.pitch_deg` in `0..=89`.
/// - Numeric fields are real numbers, never numeric-looking strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDna {
    pub project_id: String,
    /// Base generation seed, fixed at design creation and reused verbatim
    /// on every modification.
    pub seed: u64,
    pub dimensions: Dimensions,
    pub materials: Vec<MaterialEntry>,
    pub openings: Openings,
    pub roof: Roof,
    pub rooms: Vec<Room>,
    /// Free-form rules carried into every prompt (e.g. "symmetrical facade").
    pub consistency_rules: Vec<String>,
}

/// Overall building envelope in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub floor_count: u32,
}

/// One named entry in the material palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    /// Building element the material applies to ("walls", "roof", "trim").
    pub element: String,
    /// Material name ("terracotta brick", "larch cladding").
    pub name: String,
    /// Hex color, normalized to uppercase `#RRGGBB`.
    pub hex: String,
}

/// Window and door counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Openings {
    /// Window count per facade, keyed by facade name (N/S/E/W).
    /// BTreeMap keeps facade order stable for hashing and prompts.
    pub windows_per_facade: BTreeMap<String, u32>,
    pub door_count: u32,
}

/// Roof specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roof {
    pub kind: RoofKind,
    pub pitch_deg: f64,
    pub material: String,
}

/// Supported roof forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofKind {
    Flat,
    Gable,
    Hip,
    Shed,
    Mansard,
}

impl fmt::Display for RoofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoofKind::Flat => write!(f, "flat"),
            RoofKind::Gable => write!(f, "gable"),
            RoofKind::Hip => write!(f, "hip"),
            RoofKind::Shed => write!(f, "shed"),
            RoofKind::Mansard => write!(f, "mansard"),
        }
    }
}

impl FromStr for RoofKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(RoofKind::Flat),
            "gable" => Ok(RoofKind::Gable),
            "hip" | "hipped" => Ok(RoofKind::Hip),
            "shed" | "mono" | "monopitch" => Ok(RoofKind::Shed),
            "mansard" => Ok(RoofKind::Mansard),
            other => Err(format!("invalid roof kind: '{other}'")),
        }
    }
}

/// A named room with its target floor area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub area_m2: f64,
    pub floor: u32,
}

// ---------------------------------------------------------------------------
// Raw boundary shapes
// ---------------------------------------------------------------------------

/// A scalar that may arrive as a number or a numeric-looking string.
///
/// Raw DNA from the wizard UI is not type-stable: "15", 15 and 15.0 all
/// mean the same length. The normalizer coerces this into `f64` once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Coerce to f64, returning `None` for non-numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// Materials field as it arrives: either one color string for the whole
/// building, or a map of element -> color/name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMaterials {
    /// Single hex color applied to walls (legacy wizard shape).
    Single(String),
    /// Element -> material spec map.
    PerElement(BTreeMap<String, RawMaterialSpec>),
}

/// One raw material value: either just a hex string or a named entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMaterialSpec {
    Hex(String),
    Named { name: String, hex: String },
}

/// Raw, unnormalized DNA as accepted at the API boundary.
///
/// Every field is optional; the normalizer fills defaults and clamps
/// out-of-range values instead of erroring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDesignDna {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub length_m: Option<RawNumber>,
    #[serde(default)]
    pub width_m: Option<RawNumber>,
    #[serde(default)]
    pub height_m: Option<RawNumber>,
    #[serde(default)]
    pub floor_count: Option<RawNumber>,
    #[serde(default)]
    pub materials: Option<RawMaterials>,
    #[serde(default)]
    pub windows_per_facade: Option<BTreeMap<String, RawNumber>>,
    #[serde(default)]
    pub door_count: Option<RawNumber>,
    #[serde(default)]
    pub roof_kind: Option<String>,
    #[serde(default)]
    pub roof_pitch_deg: Option<RawNumber>,
    #[serde(default)]
    pub roof_material: Option<String>,
    #[serde(default)]
    pub rooms: Option<Vec<Room>>,
    #[serde(default)]
    pub consistency_rules: Option<Vec<String>>,
}

/// Dot-separated path naming a DNA field in diffs and drift reports
/// (e.g. `dimensions.length_m`, `materials.walls`, `roof.kind`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldPath(pub String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The top-level field group ("dimensions", "materials", "roof",
    /// "openings") this path belongs to.
    pub fn group(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structural diff between two normalized DNAs, restricted to the named
/// field groups so unrelated metadata never registers as drift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnaDiff {
    pub changed: Vec<FieldPath>,
    pub unchanged: Vec<FieldPath>,
}

impl DnaDiff {
    pub fn is_identical(&self) -> bool {
        self.changed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roof_kind_roundtrip() {
        for kind in [
            RoofKind::Flat,
            RoofKind::Gable,
            RoofKind::Hip,
            RoofKind::Shed,
            RoofKind::Mansard,
        ] {
            let s = kind.to_string();
            let parsed: RoofKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_roof_kind_aliases() {
        assert_eq!("hipped".parse::<RoofKind>().unwrap(), RoofKind::Hip);
        assert_eq!("monopitch".parse::<RoofKind>().unwrap(), RoofKind::Shed);
        assert!("onion-dome".parse::<RoofKind>().is_err());
    }

    #[test]
    fn test_raw_number_coercion() {
        assert_eq!(RawNumber::Number(15.0).as_f64(), Some(15.0));
        assert_eq!(RawNumber::Text("15".into()).as_f64(), Some(15.0));
        assert_eq!(RawNumber::Text(" 15.5 ".into()).as_f64(), Some(15.5));
        assert_eq!(RawNumber::Text("tall".into()).as_f64(), None);
    }

    #[test]
    fn test_raw_number_deserializes_untagged() {
        let n: RawNumber = serde_json::from_str("15").unwrap();
        assert_eq!(n.as_f64(), Some(15.0));
        let s: RawNumber = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(s.as_f64(), Some(15.0));
    }

    #[test]
    fn test_raw_materials_single_string() {
        let raw: RawMaterials = serde_json::from_str("\"#B8604E\"").unwrap();
        assert_eq!(raw, RawMaterials::Single("#B8604E".into()));
    }

    #[test]
    fn test_raw_materials_per_element_map() {
        let raw: RawMaterials = serde_json::from_str(
            r##"{"walls": "#B8604E", "roof": {"name": "slate", "hex": "#44464B"}}"##,
        )
        .unwrap();
        match raw {
            RawMaterials::PerElement(map) => {
                assert_eq!(map["walls"], RawMaterialSpec::Hex("#B8604E".into()));
                assert_eq!(
                    map["roof"],
                    RawMaterialSpec::Named {
                        name: "slate".into(),
                        hex: "#44464B".into()
                    }
                );
            }
            other => panic!("expected per-element map, got {other:?}"),
        }
    }

    #[test]
    fn test_field_path_group() {
        assert_eq!(FieldPath::new("dimensions.length_m").group(), "dimensions");
        assert_eq!(FieldPath::new("roof").group(), "roof");
    }

    #[test]
    fn test_raw_dna_all_fields_optional() {
        let raw: RawDesignDna = serde_json::from_str("{}").unwrap();
        assert!(raw.project_id.is_none());
        assert!(raw.materials.is_none());
    }
}
