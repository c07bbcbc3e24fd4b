//! Small fixed-layout layer properties.

use crate::common::binary::Cursor;
use crate::common::error::Result;
use bitflags::bitflags;
use serde::Serialize;

/// Layers panel color label (`lclr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SheetColor {
    None,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Gray,
    Unknown(u16),
}

impl SheetColor {
    /// A color index followed by six unused bytes.
    pub fn parse(payload: &mut Cursor<'_>) -> Result<Self> {
        let color = payload.read_u16()?;
        payload.skip(6)?;
        Ok(Self::from(color))
    }
}

impl From<u16> for SheetColor {
    fn from(raw: u16) -> Self {
        match raw {
            0 => SheetColor::None,
            1 => SheetColor::Red,
            2 => SheetColor::Orange,
            3 => SheetColor::Yellow,
            4 => SheetColor::Green,
            5 => SheetColor::Blue,
            6 => SheetColor::Violet,
            7 => SheetColor::Gray,
            other => SheetColor::Unknown(other),
        }
    }
}

bitflags! {
    /// Locks set on a layer (`lspf`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct ProtectionFlags: u32 {
        const TRANSPARENCY = 1 << 0;
        const COMPOSITE = 1 << 1;
        const POSITION = 1 << 2;
    }
}

impl ProtectionFlags {
    pub fn parse(payload: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self::from_bits_retain(payload.read_u32()?))
    }
}

/// Reference point used by layer transforms (`fxrp`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    pub x: f64,
    pub y: f64,
}

impl ReferencePoint {
    pub fn parse(payload: &mut Cursor<'_>) -> Result<Self> {
        Ok(ReferencePoint {
            x: payload.read_f64()?,
            y: payload.read_f64()?,
        })
    }
}

/// One-byte boolean followed by padding (`clbl`, `infx`, `knko`).
pub(crate) fn parse_flag_byte(payload: &mut Cursor<'_>) -> Result<bool> {
    Ok(payload.read_u8()? != 0)
}
