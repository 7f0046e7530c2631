//! Composite sheet layout.
//!
//! Describes which panels appear on the generated sheet and where, in
//! pixels. The default template follows the A1-landscape convention:
//! floor plan on the left half, perspective top right, elevation and
//! section stacked below it.

use serde::{Deserialize, Serialize};

use archgen_types::design::PanelCoordinates;

/// One panel slot in a layout, as a fraction of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSlot {
    /// Panel key ("floor_plan", "elevation_N", "section_AA", "persp_main").
    pub panel: String,
    pub x_frac: f64,
    pub y_frac: f64,
    pub width_frac: f64,
    pub height_frac: f64,
}

/// Sheet layout configuration: panel slots plus render size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub panels: Vec<PanelSlot>,
    pub sheet_width: u32,
    pub sheet_height: u32,
}

impl LayoutConfig {
    /// Standard four-panel sheet: plan left, perspective / elevation /
    /// section stacked right.
    pub fn standard(sheet_width: u32, sheet_height: u32) -> Self {
        let slot = |panel: &str, x: f64, y: f64, w: f64, h: f64| PanelSlot {
            panel: panel.to_string(),
            x_frac: x,
            y_frac: y,
            width_frac: w,
            height_frac: h,
        };
        Self {
            panels: vec![
                slot("floor_plan", 0.02, 0.02, 0.52, 0.88),
                slot("persp_main", 0.56, 0.02, 0.42, 0.36),
                slot("elevation_N", 0.56, 0.40, 0.42, 0.26),
                slot("section_AA", 0.56, 0.68, 0.42, 0.22),
            ],
            sheet_width,
            sheet_height,
        }
    }

    /// Resolve the fractional slots into pixel coordinates on the sheet.
    pub fn panel_coordinates(&self) -> Vec<PanelCoordinates> {
        self.panels
            .iter()
            .map(|slot| PanelCoordinates {
                panel: slot.panel.clone(),
                x: (slot.x_frac * self.sheet_width as f64).round() as u32,
                y: (slot.y_frac * self.sheet_height as f64).round() as u32,
                width: (slot.width_frac * self.sheet_width as f64).round() as u32,
                height: (slot.height_frac * self.sheet_height as f64).round() as u32,
            })
            .collect()
    }

    /// Structural completeness check used by the create flow: every panel
    /// must land fully inside the sheet and have a non-zero area.
    pub fn validate(&self) -> Result<(), String> {
        if self.panels.is_empty() {
            return Err("layout has no panels".to_string());
        }
        for coords in self.panel_coordinates() {
            if coords.width == 0 || coords.height == 0 {
                return Err(format!("panel '{}' has zero area", coords.panel));
            }
            if coords.x + coords.width > self.sheet_width
                || coords.y + coords.height > self.sheet_height
            {
                return Err(format!("panel '{}' overflows the sheet", coords.panel));
            }
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::standard(1536, 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout_validates() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_panel_coordinates_scale_with_sheet() {
        let layout = LayoutConfig::standard(1000, 500);
        let coords = layout.panel_coordinates();
        let plan = coords.iter().find(|c| c.panel == "floor_plan").unwrap();
        assert_eq!(plan.x, 20);
        assert_eq!(plan.width, 520);
        assert_eq!(plan.height, 440);
    }

    #[test]
    fn test_overflowing_panel_rejected() {
        let mut layout = LayoutConfig::default();
        layout.panels[0].width_frac = 1.5;
        let err = layout.validate().unwrap_err();
        assert!(err.contains("overflows"));
    }

    #[test]
    fn test_empty_layout_rejected() {
        let layout = LayoutConfig {
            panels: Vec::new(),
            sheet_width: 1536,
            sheet_height: 1024,
        };
        assert!(layout.validate().is_err());
    }
}
