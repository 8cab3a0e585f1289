use serde::{Deserialize, Serialize};
use std::fmt;

/// Colour the light can flash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Yellow,
    Green,
    Blue,
}

impl LightColor {
    /// Display colour used when the light is lit
    pub fn rgba(&self) -> [u8; 4] {
        match self {
            LightColor::Yellow => [250, 210, 20, 255],
            LightColor::Green => [40, 200, 90, 255],
            LightColor::Blue => [40, 110, 240, 255],
        }
    }
}

/// Response button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Button::Left => f.write_str("left"),
            Button::Right => f.write_str("right"),
        }
    }
}

/// What the player is supposed to do when a pattern is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Press(Button),
    Withhold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StimulusPattern {
    pub color: LightColor,
    pub expected: Expected,
    pub text: &'static str,
}

/// The fixed stimulus set, one pattern per colour.
pub static CATALOG: [StimulusPattern; 3] = [
    StimulusPattern {
        color: LightColor::Yellow,
        expected: Expected::Press(Button::Right),
        text: "黄色 → 右を押す",
    },
    StimulusPattern {
        color: LightColor::Green,
        expected: Expected::Press(Button::Left),
        text: "緑 → 左を押す",
    },
    StimulusPattern {
        color: LightColor::Blue,
        expected: Expected::Withhold,
        text: "青 → 押さない",
    },
];

impl StimulusPattern {
    pub fn for_color(color: LightColor) -> &'static StimulusPattern {
        CATALOG
            .iter()
            .find(|p| p.color == color)
            .unwrap_or(&CATALOG[0])
    }
}
