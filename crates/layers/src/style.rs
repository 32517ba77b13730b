use serde::{Deserialize, Serialize};

/// Line stroke: width in pixels and an optional on/off dash pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<Vec<f32>>,
}

impl Stroke {
    pub const fn solid(width: f32) -> Self {
        Self { width, dash: None }
    }

    pub fn dashed(width: f32, pattern: &[f32]) -> Self {
        Self {
            width,
            dash: Some(pattern.to_vec()),
        }
    }
}

/// Colours and strokes for one box. Colours are RGBA, 0..=255.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub back_color: [u8; 4],
    pub front_color: [u8; 4],
    pub fill_color: [u8; 4],
    pub outline_color: [u8; 4],
    pub stroke: Stroke,
    pub outline_stroke: Stroke,
}

impl OverlayStyle {
    pub fn unselected() -> Self {
        Self {
            back_color: [0x99, 0x44, 0x99, 0xFF],
            front_color: [0x5D, 0x46, 0xB6, 0xFF],
            fill_color: [0x99, 0x44, 0x99, 0x32],
            outline_color: [178, 178, 178, 0xFF],
            stroke: Stroke::solid(1.0),
            outline_stroke: Stroke::dashed(1.0, &[10.0, 10.0]),
        }
    }

    pub fn selected() -> Self {
        Self {
            back_color: [0xF7, 0xBF, 0x18, 0xFF],
            front_color: [0xC7, 0xF7, 0x18, 0xFF],
            fill_color: [0xB6, 0x6A, 0x00, 0x30],
            ..Self::unselected()
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Default,
    Selected,
}

/// The two styles boxes are drawn with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyles {
    pub default: OverlayStyle,
    pub selected: OverlayStyle,
}

impl Default for OverlayStyles {
    fn default() -> Self {
        Self {
            default: OverlayStyle::unselected(),
            selected: OverlayStyle::selected(),
        }
    }
}

impl OverlayStyles {
    pub fn get(&self, kind: StyleKind) -> &OverlayStyle {
        match kind {
            StyleKind::Default => &self.default,
            StyleKind::Selected => &self.selected,
        }
    }
}
