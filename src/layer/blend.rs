//! Blend modes and the per-layer flag byte.

use crate::common::tag::Tag;
use bitflags::bitflags;
use phf::phf_map;
use serde::Serialize;

/// Blend mode named by a layer's four-character key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Blend {
    PassThrough,
    Normal,
    Dissolve,
    Darken,
    Multiply,
    ColorBurn,
    LinearBurn,
    DarkerColor,
    Lighten,
    Screen,
    ColorDodge,
    LinearDodge,
    LighterColor,
    Overlay,
    SoftLight,
    HardLight,
    VividLight,
    LinearLight,
    PinLight,
    HardMix,
    Difference,
    Exclusion,
    Subtract,
    Divide,
    Hue,
    Saturation,
    Color,
    Luminosity,
    /// Key not in the table, kept as read
    Other(Tag),
}

/// Perfect hash map of blend keys to modes.
static BLEND_KEYS: phf::Map<&'static [u8], Blend> = phf_map! {
    b"pass" => Blend::PassThrough,
    b"norm" => Blend::Normal,
    b"diss" => Blend::Dissolve,
    b"dark" => Blend::Darken,
    b"mul " => Blend::Multiply,
    b"idiv" => Blend::ColorBurn,
    b"lbrn" => Blend::LinearBurn,
    b"dkCl" => Blend::DarkerColor,
    b"lite" => Blend::Lighten,
    b"scrn" => Blend::Screen,
    b"div " => Blend::ColorDodge,
    b"lddg" => Blend::LinearDodge,
    b"lgCl" => Blend::LighterColor,
    b"over" => Blend::Overlay,
    b"sLit" => Blend::SoftLight,
    b"hLit" => Blend::HardLight,
    b"vLit" => Blend::VividLight,
    b"lLit" => Blend::LinearLight,
    b"pLit" => Blend::PinLight,
    b"hMix" => Blend::HardMix,
    b"diff" => Blend::Difference,
    b"smud" => Blend::Exclusion,
    b"fsub" => Blend::Subtract,
    b"fdiv" => Blend::Divide,
    b"hue " => Blend::Hue,
    b"sat " => Blend::Saturation,
    b"colr" => Blend::Color,
    b"lum " => Blend::Luminosity,
};

impl Blend {
    /// Look up a blend key; unknown keys become [`Blend::Other`].
    pub fn from_key(key: Tag) -> Self {
        BLEND_KEYS
            .get(&key.as_bytes()[..])
            .copied()
            .unwrap_or(Blend::Other(key))
    }

    /// Human-readable name, e.g. `"multiply"`. Unknown keys return `None`.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Blend::PassThrough => "pass through",
            Blend::Normal => "normal",
            Blend::Dissolve => "dissolve",
            Blend::Darken => "darken",
            Blend::Multiply => "multiply",
            Blend::ColorBurn => "color burn",
            Blend::LinearBurn => "linear burn",
            Blend::DarkerColor => "darker color",
            Blend::Lighten => "lighten",
            Blend::Screen => "screen",
            Blend::ColorDodge => "color dodge",
            Blend::LinearDodge => "linear dodge",
            Blend::LighterColor => "lighter color",
            Blend::Overlay => "overlay",
            Blend::SoftLight => "soft light",
            Blend::HardLight => "hard light",
            Blend::VividLight => "vivid light",
            Blend::LinearLight => "linear light",
            Blend::PinLight => "pin light",
            Blend::HardMix => "hard mix",
            Blend::Difference => "difference",
            Blend::Exclusion => "exclusion",
            Blend::Subtract => "subtract",
            Blend::Divide => "divide",
            Blend::Hue => "hue",
            Blend::Saturation => "saturation",
            Blend::Color => "color",
            Blend::Luminosity => "luminosity",
            Blend::Other(_) => return None,
        };
        Some(name)
    }
}

/// Clipping byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Clipping {
    Base,
    NonBase,
    Other(u8),
}

impl From<u8> for Clipping {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Clipping::Base,
            1 => Clipping::NonBase,
            other => Clipping::Other(other),
        }
    }
}

bitflags! {
    /// Layer record flag byte. Unknown bits are retained.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct LayerFlags: u8 {
        const TRANSPARENCY_PROTECTED = 1 << 0;
        const HIDDEN = 1 << 1;
        const OBSOLETE = 1 << 2;
        /// Set by newer writers; bit 4 is only meaningful when this is set
        const PIXEL_DATA_FLAG_VALID = 1 << 3;
        const PIXEL_DATA_IRRELEVANT = 1 << 4;
    }
}

impl LayerFlags {
    /// `Some(irrelevant)` when the writer recorded pixel data relevance.
    pub fn pixel_data_irrelevant(&self) -> Option<bool> {
        self.contains(LayerFlags::PIXEL_DATA_FLAG_VALID)
            .then(|| self.contains(LayerFlags::PIXEL_DATA_IRRELEVANT))
    }
}

/// Blend settings of one layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlendMode {
    pub key: Tag,
    pub mode: Blend,
    /// 0 (transparent) to 255 (opaque)
    pub opacity: u8,
    pub clipping: Clipping,
    pub flags: LayerFlags,
}

impl BlendMode {
    pub fn new(key: Tag, opacity: u8, clipping: u8, flags: u8) -> Self {
        Self {
            key,
            mode: Blend::from_key(key),
            opacity,
            clipping: Clipping::from(clipping),
            flags: LayerFlags::from_bits_retain(flags),
        }
    }

    /// Mode name, falling back to the raw key text.
    pub fn mode_name(&self) -> String {
        self.mode
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| self.key.to_text())
    }

    /// Opacity as a rounded percentage.
    pub fn opacity_percentage(&self) -> u8 {
        (self.opacity as f64 * 100.0 / 255.0).round() as u8
    }

    #[inline]
    pub fn visible(&self) -> bool {
        !self.flags.contains(LayerFlags::HIDDEN)
    }

    #[inline]
    pub fn transparency_protected(&self) -> bool {
        self.flags.contains(LayerFlags::TRANSPARENCY_PROTECTED)
    }

    #[inline]
    pub fn is_clipped(&self) -> bool {
        self.clipping != Clipping::Base
    }
}
