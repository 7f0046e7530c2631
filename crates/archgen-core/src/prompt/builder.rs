//! Create-mode prompt assembly.
//!
//! Enumerates every required visual element from the DNA: exact dimensions
//! with units, material names plus hex codes, opening counts per facade,
//! roof kind/pitch/material, and the sheet's panel layout. The negative
//! prompt forbids the known failure modes of the generation model
//! (duplicate buildings, geometry drift, hallucinated floors).

use serde::{Deserialize, Serialize};

use archgen_types::dna::{DesignDna, FieldPath};

use crate::layout::LayoutConfig;

/// Positive and negative prompt pair for one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBundle {
    pub prompt: String,
    pub negative_prompt: String,
}

/// Which flow the prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Create,
    Modify,
}

/// Baseline failure modes forbidden in every negative prompt.
const BASE_NEGATIVE_TERMS: &[&str] = &[
    "duplicate buildings",
    "multiple sheets",
    "geometry drift",
    "extra floors",
    "missing floors",
    "wrong material colors",
    "warped walls",
    "text artifacts",
    "watermark",
];

/// Stateless prompt builder.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt pair for a normalized DNA and sheet layout.
    ///
    /// `Modify` mode produces the same element enumeration; the
    /// consistency lock is applied on top by
    /// [`with_consistency_lock`](crate::prompt::with_consistency_lock).
    pub fn build(dna: &DesignDna, layout: &LayoutConfig, mode: PromptMode) -> PromptBundle {
        let mut sections = Vec::new();

        sections.push(format!(
            "Architectural presentation sheet for project '{}', {} panels on one page: {}.",
            dna.project_id,
            layout.panels.len(),
            layout
                .panels
                .iter()
                .map(|p| panel_label(&p.panel))
                .collect::<Vec<_>>()
                .join(", "),
        ));

        sections.push(format!("ELEMENTS:\n{}", Self::element_lines(dna).join("\n")));

        if !dna.rooms.is_empty() {
            let rooms = dna
                .rooms
                .iter()
                .map(|r| format!("{} {} on floor {}", r.name, format_area(r.area_m2), r.floor + 1))
                .collect::<Vec<_>>()
                .join("; ");
            sections.push(format!("ROOMS: {rooms}."));
        }

        if !dna.consistency_rules.is_empty() {
            sections.push(format!("RULES: {}.", dna.consistency_rules.join("; ")));
        }

        sections.push(
            "STYLE: clean orthographic line work, uniform lighting, neutral background, \
             consistent scale across panels."
                .to_string(),
        );

        PromptBundle {
            prompt: sections.join("\n\n"),
            negative_prompt: Self::negative_prompt(mode),
        }
    }

    /// The mode's base negative prompt. Deterministic, so a frozen base
    /// prompt can be re-paired with its negative half at modify time.
    pub fn negative_prompt(mode: PromptMode) -> String {
        let mut terms: Vec<&str> = BASE_NEGATIVE_TERMS.to_vec();
        if matches!(mode, PromptMode::Modify) {
            terms.push("changes to unrelated panels");
        }
        terms.join(", ")
    }

    /// One line per locked-down visual element, shared between the create
    /// prompt and the lock declarations so the two can never disagree.
    pub fn element_lines(dna: &DesignDna) -> Vec<String> {
        Self::element_declarations(dna)
            .into_iter()
            .map(|(_, line)| line)
            .collect()
    }

    /// `(field path, declaration line)` for every element the consistency
    /// lock can freeze. Ordering is fixed: dimensions, materials,
    /// openings, roof.
    pub fn element_declarations(dna: &DesignDna) -> Vec<(FieldPath, String)> {
        let mut out = Vec::new();

        out.push((
            FieldPath::new("dimensions.length_m"),
            format!("EXACT_LENGTH: {}", format_meters(dna.dimensions.length_m)),
        ));
        out.push((
            FieldPath::new("dimensions.width_m"),
            format!("EXACT_WIDTH: {}", format_meters(dna.dimensions.width_m)),
        ));
        out.push((
            FieldPath::new("dimensions.height_m"),
            format!("EXACT_HEIGHT: {}", format_meters(dna.dimensions.height_m)),
        ));
        out.push((
            FieldPath::new("dimensions.floor_count"),
            format!("EXACT_FLOORS: {}", dna.dimensions.floor_count),
        ));

        for material in &dna.materials {
            out.push((
                FieldPath::new(format!("materials.{}", material.element)),
                format!(
                    "MATERIAL_{}: {} {}",
                    material.element.to_uppercase(),
                    material.name,
                    material.hex
                ),
            ));
        }

        for (facade, count) in &dna.openings.windows_per_facade {
            out.push((
                FieldPath::new(format!("openings.windows.{facade}")),
                format!("WINDOWS_{facade}: {count}"),
            ));
        }
        out.push((
            FieldPath::new("openings.door_count"),
            format!("DOORS: {}", dna.openings.door_count),
        ));

        out.push((
            FieldPath::new("roof.kind"),
            format!("ROOF_TYPE: {}", dna.roof.kind),
        ));
        out.push((
            FieldPath::new("roof.pitch_deg"),
            format!("ROOF_PITCH: {} degrees", format_number(dna.roof.pitch_deg)),
        ));
        out.push((
            FieldPath::new("roof.material"),
            format!("ROOF_MATERIAL: {}", dna.roof.material),
        ));

        out
    }
}

fn panel_label(panel: &str) -> &str {
    match panel {
        "floor_plan" => "floor plan",
        "elevation_N" => "north elevation",
        "elevation_S" => "south elevation",
        "elevation_E" => "east elevation",
        "elevation_W" => "west elevation",
        "section_AA" => "section A-A",
        "section_BB" => "section B-B",
        "persp_main" => "hero perspective",
        other => other,
    }
}

fn format_meters(value: f64) -> String {
    format!("{}m", format_number(value))
}

fn format_area(value: f64) -> String {
    format!("{}sqm", format_number(value))
}

/// Integer-valued floats print without a trailing `.0` so the same DNA
/// always renders the same token ("15m", never "15.0m").
fn format_number(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::normalize;
    use archgen_types::dna::{RawDesignDna, RawMaterials, RawNumber};

    fn sample_dna() -> DesignDna {
        normalize(&RawDesignDna {
            project_id: Some("villa".into()),
            seed: Some(123456),
            length_m: Some(RawNumber::Number(15.0)),
            width_m: Some(RawNumber::Number(10.0)),
            floor_count: Some(RawNumber::Number(2.0)),
            materials: Some(RawMaterials::Single("#B8604E".into())),
            ..Default::default()
        })
    }

    #[test]
    fn test_create_prompt_enumerates_elements() {
        let bundle = PromptBuilder::build(&sample_dna(), &LayoutConfig::default(), PromptMode::Create);
        assert!(bundle.prompt.contains("EXACT_LENGTH: 15m"));
        assert!(bundle.prompt.contains("EXACT_WIDTH: 10m"));
        assert!(bundle.prompt.contains("EXACT_FLOORS: 2"));
        assert!(bundle.prompt.contains("#B8604E"));
        assert!(bundle.prompt.contains("ROOF_TYPE: gable"));
        assert!(bundle.prompt.contains("north elevation"));
    }

    #[test]
    fn test_negative_prompt_forbids_failure_modes() {
        let bundle = PromptBuilder::build(&sample_dna(), &LayoutConfig::default(), PromptMode::Create);
        assert!(bundle.negative_prompt.contains("duplicate buildings"));
        assert!(bundle.negative_prompt.contains("geometry drift"));
        assert!(bundle.negative_prompt.contains("extra floors"));
    }

    #[test]
    fn test_build_is_pure() {
        let dna = sample_dna();
        let layout = LayoutConfig::default();
        let a = PromptBuilder::build(&dna, &layout, PromptMode::Create);
        let b = PromptBuilder::build(&dna, &layout, PromptMode::Create);
        assert_eq!(a, b, "identical inputs must yield byte-identical prompts");
    }

    #[test]
    fn test_integer_dimensions_have_no_trailing_zero() {
        let bundle = PromptBuilder::build(&sample_dna(), &LayoutConfig::default(), PromptMode::Create);
        assert!(!bundle.prompt.contains("15.0m"));
    }

    #[test]
    fn test_fractional_dimensions_keep_fraction() {
        let mut dna = sample_dna();
        dna.dimensions.length_m = 15.5;
        let bundle = PromptBuilder::build(&dna, &LayoutConfig::default(), PromptMode::Create);
        assert!(bundle.prompt.contains("EXACT_LENGTH: 15.5m"));
    }

    #[test]
    fn test_declarations_cover_all_groups() {
        let decls = PromptBuilder::element_declarations(&sample_dna());
        let groups: std::collections::BTreeSet<&str> =
            decls.iter().map(|(path, _)| path.group()).collect();
        assert_eq!(
            groups,
            ["dimensions", "materials", "openings", "roof"].into_iter().collect()
        );
    }

    #[test]
    fn test_modify_mode_extends_negative_prompt() {
        let dna = sample_dna();
        let layout = LayoutConfig::default();
        let create = PromptBuilder::build(&dna, &layout, PromptMode::Create);
        let modify = PromptBuilder::build(&dna, &layout, PromptMode::Modify);
        assert!(modify.negative_prompt.contains("unrelated panels"));
        assert!(!create.negative_prompt.contains("unrelated panels"));
    }
}
