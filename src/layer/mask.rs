//! Layer mask and blending ranges sub-records of a layer record.

use super::Rect;
use crate::common::binary::Cursor;
use crate::common::error::Result;
use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;

bitflags! {
    /// Layer mask flag byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct MaskFlags: u8 {
        const POSITION_RELATIVE = 1 << 0;
        const DISABLED = 1 << 1;
        const INVERT = 1 << 2;
        const FROM_RENDERING = 1 << 3;
        const HAS_PARAMETERS = 1 << 4;
    }
}

/// Raster layer mask attached to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerMask {
    pub rect: Rect,
    /// 0 or 255
    pub default_color: u8,
    pub flags: MaskFlags,
}

impl LayerMask {
    /// Decode the mask sub-record. An empty section means "no mask".
    ///
    /// The section may carry parameters and a second "real" mask after the
    /// fields decoded here; those bytes are skipped by the framer.
    pub fn parse(section: &mut Cursor<'_>) -> Result<Option<Self>> {
        if section.is_empty() {
            return Ok(None);
        }
        let rect = Rect::parse(section)?;
        let default_color = section.read_u8()?;
        let flags = MaskFlags::from_bits_retain(section.read_u8()?);
        Ok(Some(LayerMask {
            rect,
            default_color,
            flags,
        }))
    }

    #[inline]
    pub fn disabled(&self) -> bool {
        self.flags.contains(MaskFlags::DISABLED)
    }

    #[inline]
    pub fn relative(&self) -> bool {
        self.flags.contains(MaskFlags::POSITION_RELATIVE)
    }

    #[inline]
    pub fn invert(&self) -> bool {
        self.flags.contains(MaskFlags::INVERT)
    }
}

/// Black/white points of one blend-if range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlendRange {
    /// Black low, black high, white low, white high for the source layer
    pub source: [u8; 4],
    /// Same for the layers underneath
    pub destination: [u8; 4],
}

impl BlendRange {
    fn parse(section: &mut Cursor<'_>) -> Result<Self> {
        Ok(BlendRange {
            source: section.read_array()?,
            destination: section.read_array()?,
        })
    }
}

/// Blend-if ranges: composite gray plus one range per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlendingRanges {
    pub gray: BlendRange,
    pub channels: SmallVec<[BlendRange; 4]>,
}

impl BlendingRanges {
    pub fn parse(section: &mut Cursor<'_>) -> Result<Option<Self>> {
        if section.remaining() < 8 {
            return Ok(None);
        }
        let gray = BlendRange::parse(section)?;
        let mut channels = SmallVec::new();
        while section.remaining() >= 8 {
            channels.push(BlendRange::parse(section)?);
        }
        Ok(Some(BlendingRanges { gray, channels }))
    }
}
