//! RGBA colors handed to the render layer.

use crate::random::RandomSource;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Highlight used for the cell under the last pointer hit.
    pub const RAY_WHITE: Color = Color::rgb(245, 245, 245);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Normalized `[r, g, b, a]` for shader uniforms and vertex colors.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Saturated accent colors used for effect spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeonColor {
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Magenta,
}

impl NeonColor {
    pub const ALL: [NeonColor; 6] = [
        NeonColor::Red,
        NeonColor::Green,
        NeonColor::Blue,
        NeonColor::Cyan,
        NeonColor::Yellow,
        NeonColor::Magenta,
    ];

    /// Pick one uniformly.
    pub fn random(rng: &mut impl RandomSource) -> Self {
        let idx = (rng.random() * Self::ALL.len() as f32) as usize;
        Self::ALL[idx.min(Self::ALL.len() - 1)]
    }

    pub fn color(self) -> Color {
        match self {
            NeonColor::Red => Color::rgb(255, 0, 0),
            NeonColor::Green => Color::rgb(0, 255, 0),
            NeonColor::Blue => Color::rgb(0, 0, 255),
            NeonColor::Cyan => Color::rgb(0, 255, 255),
            NeonColor::Yellow => Color::rgb(255, 255, 0),
            NeonColor::Magenta => Color::rgb(255, 0, 255),
        }
    }
}

impl From<NeonColor> for Color {
    fn from(neon: NeonColor) -> Self {
        neon.color()
    }
}
