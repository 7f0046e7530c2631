//! Raw DNA normalization.
//!
//! Converts the loose boundary shapes into the single canonical
//! [`DesignDna`] form: fills defaults, coerces numeric-looking strings,
//! clamps out-of-range values instead of erroring, and sorts collections
//! for a canonical order. Idempotent: normalizing the canonical form of a
//! DNA changes nothing.

use std::collections::BTreeMap;

use archgen_types::dna::{
    DesignDna, Dimensions, MaterialEntry, Openings, RawDesignDna, RawMaterialSpec, RawMaterials,
    RawNumber, Roof, RoofKind, Room,
};

/// Default envelope for a missing dimension, in metres.
const DEFAULT_LENGTH_M: f64 = 12.0;
const DEFAULT_WIDTH_M: f64 = 9.0;
const DEFAULT_STOREY_HEIGHT_M: f64 = 3.0;

/// Largest accepted envelope dimension; anything above is clamped.
const MAX_DIMENSION_M: f64 = 200.0;

const DEFAULT_WALL_HEX: &str = "#D9CBB8";
const DEFAULT_ROOF_MATERIAL: &str = "slate";

/// Normalize raw DNA into the canonical form.
///
/// Never fails: malformed values fall back to defaults, out-of-range
/// values are clamped (floor count at least 1, pitch in `0..=89`,
/// dimensions positive and bounded).
pub fn normalize(raw: &RawDesignDna) -> DesignDna {
    let floor_count = raw
        .floor_count
        .as_ref()
        .and_then(RawNumber::as_f64)
        .map(|f| f.round() as i64)
        .unwrap_or(1)
        .clamp(1, 12) as u32;

    let dimensions = Dimensions {
        length_m: clamp_dimension(number_or(&raw.length_m, DEFAULT_LENGTH_M)),
        width_m: clamp_dimension(number_or(&raw.width_m, DEFAULT_WIDTH_M)),
        height_m: clamp_dimension(number_or(
            &raw.height_m,
            DEFAULT_STOREY_HEIGHT_M * floor_count as f64,
        )),
        floor_count,
    };

    let openings = Openings {
        windows_per_facade: normalize_windows(raw.windows_per_facade.as_ref()),
        door_count: raw
            .door_count
            .as_ref()
            .and_then(RawNumber::as_f64)
            .map(|f| f.round().max(1.0) as u32)
            .unwrap_or(1),
    };

    let roof = Roof {
        kind: raw
            .roof_kind
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(RoofKind::Gable),
        pitch_deg: number_or(&raw.roof_pitch_deg, 35.0).clamp(0.0, 89.0),
        material: raw
            .roof_material
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ROOF_MATERIAL.to_string()),
    };

    let mut materials = normalize_materials(raw.materials.as_ref());
    materials.sort_by(|a, b| a.element.cmp(&b.element).then(a.name.cmp(&b.name)));

    let mut rooms: Vec<Room> = raw
        .rooms
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|r| Room {
            name: r.name.trim().to_string(),
            area_m2: r.area_m2.max(0.0),
            floor: r.floor.min(dimensions.floor_count.saturating_sub(1)),
        })
        .collect();
    rooms.sort_by(|a, b| a.name.cmp(&b.name));

    let mut consistency_rules = raw.consistency_rules.clone().unwrap_or_default();
    consistency_rules.retain(|r| !r.trim().is_empty());
    consistency_rules.sort();
    consistency_rules.dedup();

    DesignDna {
        project_id: raw
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "untitled".to_string()),
        seed: raw.seed.unwrap_or(0),
        dimensions,
        materials,
        openings,
        roof,
        rooms,
        consistency_rules,
    }
}

fn number_or(raw: &Option<RawNumber>, default: f64) -> f64 {
    raw.as_ref().and_then(RawNumber::as_f64).unwrap_or(default)
}

fn clamp_dimension(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        DEFAULT_WIDTH_M
    } else {
        value.min(MAX_DIMENSION_M)
    }
}

fn normalize_windows(raw: Option<&BTreeMap<String, RawNumber>>) -> BTreeMap<String, u32> {
    let mut out = BTreeMap::new();
    if let Some(map) = raw {
        for (facade, count) in map {
            let facade = facade.trim().to_uppercase();
            let count = count.as_f64().map(|f| f.round().max(0.0) as u32).unwrap_or(0);
            out.insert(facade, count);
        }
    }
    // Every facade present so prompts and diffs are shape-stable.
    for facade in ["N", "S", "E", "W"] {
        out.entry(facade.to_string()).or_insert(2);
    }
    out
}

fn normalize_materials(raw: Option<&RawMaterials>) -> Vec<MaterialEntry> {
    match raw {
        None => vec![MaterialEntry {
            element: "walls".to_string(),
            name: "render".to_string(),
            hex: DEFAULT_WALL_HEX.to_string(),
        }],
        Some(RawMaterials::Single(hex)) => vec![MaterialEntry {
            element: "walls".to_string(),
            name: "render".to_string(),
            hex: normalize_hex(hex),
        }],
        Some(RawMaterials::PerElement(map)) => map
            .iter()
            .map(|(element, spec)| match spec {
                RawMaterialSpec::Hex(hex) => MaterialEntry {
                    element: element.trim().to_lowercase(),
                    name: element.trim().to_lowercase(),
                    hex: normalize_hex(hex),
                },
                RawMaterialSpec::Named { name, hex } => MaterialEntry {
                    element: element.trim().to_lowercase(),
                    name: name.trim().to_lowercase(),
                    hex: normalize_hex(hex),
                },
            })
            .collect(),
    }
}

/// Uppercase `#RRGGBB`; anything unparseable falls back to the default
/// wall color rather than propagating garbage into prompts.
fn normalize_hex(hex: &str) -> String {
    let trimmed = hex.trim().trim_start_matches('#');
    if trimmed.len() == 6 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{}", trimmed.to_uppercase())
    } else if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        // #RGB shorthand -> #RRGGBB
        let expanded: String = trimmed.chars().flat_map(|c| [c, c]).collect();
        format!("#{}", expanded.to_uppercase())
    } else {
        DEFAULT_WALL_HEX.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with(f: impl FnOnce(&mut RawDesignDna)) -> RawDesignDna {
        let mut raw = RawDesignDna::default();
        f(&mut raw);
        raw
    }

    #[test]
    fn test_defaults_fill_empty_dna() {
        let dna = normalize(&RawDesignDna::default());
        assert_eq!(dna.project_id, "untitled");
        assert_eq!(dna.dimensions.floor_count, 1);
        assert_eq!(dna.roof.kind, RoofKind::Gable);
        assert_eq!(dna.materials.len(), 1);
        assert_eq!(dna.openings.windows_per_facade.len(), 4);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = raw_with(|r| {
            r.length_m = Some(RawNumber::Text("15".into()));
            r.width_m = Some(RawNumber::Number(10.0));
            r.floor_count = Some(RawNumber::Text("2".into()));
        });
        let dna = normalize(&raw);
        assert!((dna.dimensions.length_m - 15.0).abs() < f64::EPSILON);
        assert!((dna.dimensions.width_m - 10.0).abs() < f64::EPSILON);
        assert_eq!(dna.dimensions.floor_count, 2);
    }

    #[test]
    fn test_out_of_range_values_are_clamped_not_rejected() {
        let raw = raw_with(|r| {
            r.floor_count = Some(RawNumber::Number(0.0));
            r.roof_pitch_deg = Some(RawNumber::Number(135.0));
            r.length_m = Some(RawNumber::Number(-4.0));
        });
        let dna = normalize(&raw);
        assert_eq!(dna.dimensions.floor_count, 1);
        assert!((dna.roof.pitch_deg - 89.0).abs() < f64::EPSILON);
        assert!(dna.dimensions.length_m > 0.0);
    }

    #[test]
    fn test_single_string_materials_become_wall_entry() {
        let raw = raw_with(|r| r.materials = Some(RawMaterials::Single("#b8604e".into())));
        let dna = normalize(&raw);
        assert_eq!(dna.materials.len(), 1);
        assert_eq!(dna.materials[0].element, "walls");
        assert_eq!(dna.materials[0].hex, "#B8604E");
    }

    #[test]
    fn test_hex_shorthand_expanded() {
        let raw = raw_with(|r| r.materials = Some(RawMaterials::Single("#fa0".into())));
        let dna = normalize(&raw);
        assert_eq!(dna.materials[0].hex, "#FFAA00");
    }

    #[test]
    fn test_garbage_hex_falls_back() {
        let raw = raw_with(|r| r.materials = Some(RawMaterials::Single("reddish".into())));
        let dna = normalize(&raw);
        assert_eq!(dna.materials[0].hex, DEFAULT_WALL_HEX);
    }

    #[test]
    fn test_materials_are_sorted_canonically() {
        let mut map = BTreeMap::new();
        map.insert("walls".to_string(), RawMaterialSpec::Hex("#B8604E".into()));
        map.insert("roof".to_string(), RawMaterialSpec::Hex("#44464B".into()));
        let raw = raw_with(|r| r.materials = Some(RawMaterials::PerElement(map)));
        let dna = normalize(&raw);
        assert_eq!(dna.materials[0].element, "roof");
        assert_eq!(dna.materials[1].element, "walls");
    }

    #[test]
    fn test_consistency_rules_deduped_and_sorted() {
        let raw = raw_with(|r| {
            r.consistency_rules = Some(vec![
                "symmetrical facade".into(),
                "  ".into(),
                "symmetrical facade".into(),
                "aligned fenestration".into(),
            ]);
        });
        let dna = normalize(&raw);
        assert_eq!(
            dna.consistency_rules,
            vec!["aligned fenestration".to_string(), "symmetrical facade".to_string()]
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = raw_with(|r| {
            r.project_id = Some("villa".into());
            r.seed = Some(123456);
            r.length_m = Some(RawNumber::Text("15".into()));
            r.width_m = Some(RawNumber::Number(10.0));
            r.floor_count = Some(RawNumber::Number(2.0));
            r.materials = Some(RawMaterials::Single("#B8604E".into()));
            r.roof_kind = Some("hip".into());
        });
        let once = normalize(&raw);

        // Rebuild a raw DNA from the canonical form and normalize again.
        let again = normalize(&RawDesignDna {
            project_id: Some(once.project_id.clone()),
            seed: Some(once.seed),
            length_m: Some(RawNumber::Number(once.dimensions.length_m)),
            width_m: Some(RawNumber::Number(once.dimensions.width_m)),
            height_m: Some(RawNumber::Number(once.dimensions.height_m)),
            floor_count: Some(RawNumber::Number(once.dimensions.floor_count as f64)),
            materials: Some(RawMaterials::PerElement(
                once.materials
                    .iter()
                    .map(|m| {
                        (
                            m.element.clone(),
                            RawMaterialSpec::Named {
                                name: m.name.clone(),
                                hex: m.hex.clone(),
                            },
                        )
                    })
                    .collect(),
            )),
            windows_per_facade: Some(
                once.openings
                    .windows_per_facade
                    .iter()
                    .map(|(k, v)| (k.clone(), RawNumber::Number(*v as f64)))
                    .collect(),
            ),
            door_count: Some(RawNumber::Number(once.openings.door_count as f64)),
            roof_kind: Some(once.roof.kind.to_string()),
            roof_pitch_deg: Some(RawNumber::Number(once.roof.pitch_deg)),
            roof_material: Some(once.roof.material.clone()),
            rooms: Some(once.rooms.clone()),
            consistency_rules: Some(once.consistency_rules.clone()),
        });

        assert_eq!(once, again);
    }
}
