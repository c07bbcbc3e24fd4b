//! File header.
//!
//! The header is the fixed 26-byte block at the very start of every document.
//! It is mapped directly onto a zerocopy struct of big-endian fields.

use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use serde::Serialize;
use zerocopy::{BE, FromBytes, Immutable, KnownLayout, U16, U32, Unaligned};

/// `8BPS`
pub const SIGNATURE: Tag = Tag::new(*b"8BPS");

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 26;

/// On-disk header layout.
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
struct RawHeader {
    signature: [u8; 4],
    version: U16<BE>,
    _reserved: [u8; 6],
    channels: U16<BE>,
    height: U32<BE>,
    width: U32<BE>,
    depth: U16<BE>,
    color_mode: U16<BE>,
}

/// Document color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorMode {
    Bitmap,
    Grayscale,
    Indexed,
    Rgb,
    Cmyk,
    Multichannel,
    Duotone,
    Lab,
    /// Any value outside the documented set, kept as read.
    Unknown(u16),
}

impl ColorMode {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => ColorMode::Bitmap,
            1 => ColorMode::Grayscale,
            2 => ColorMode::Indexed,
            3 => ColorMode::Rgb,
            4 => ColorMode::Cmyk,
            7 => ColorMode::Multichannel,
            8 => ColorMode::Duotone,
            9 => ColorMode::Lab,
            other => ColorMode::Unknown(other),
        }
    }

    /// The numeric value stored in the file.
    pub fn raw(&self) -> u16 {
        match self {
            ColorMode::Bitmap => 0,
            ColorMode::Grayscale => 1,
            ColorMode::Indexed => 2,
            ColorMode::Rgb => 3,
            ColorMode::Cmyk => 4,
            ColorMode::Multichannel => 7,
            ColorMode::Duotone => 8,
            ColorMode::Lab => 9,
            ColorMode::Unknown(raw) => *raw,
        }
    }

    /// Conventional mode name, e.g. `RGBColor`.
    pub fn name(&self) -> &'static str {
        match self {
            ColorMode::Bitmap => "Bitmap",
            ColorMode::Grayscale => "GrayScale",
            ColorMode::Indexed => "IndexedColor",
            ColorMode::Rgb => "RGBColor",
            ColorMode::Cmyk => "CMYKColor",
            ColorMode::Multichannel => "Multichannel",
            ColorMode::Duotone => "Duotone",
            ColorMode::Lab => "LabColor",
            ColorMode::Unknown(_) => "Unknown",
        }
    }
}

/// Decoded document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub signature: Tag,
    pub version: u16,
    /// Number of color channels, including alpha channels
    pub channels: u16,
    pub height: u32,
    pub width: u32,
    /// Bits per channel
    pub depth: u16,
    pub color_mode: ColorMode,
}

impl Header {
    /// Decode the header at the cursor position.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let offset = cursor.position();
        let bytes = cursor.read_bytes(HEADER_LEN)?;
        let raw = RawHeader::read_from_bytes(bytes).map_err(|_| PsdError::UnexpectedEof {
            offset,
            requested: HEADER_LEN,
            available: bytes.len(),
        })?;

        let signature = Tag::new(raw.signature);
        if signature != SIGNATURE {
            return Err(PsdError::InvalidSignature {
                offset,
                expected: SIGNATURE,
                found: signature,
            });
        }

        let version = raw.version.get();
        if version != 1 {
            return Err(PsdError::UnsupportedVersion {
                offset: offset + 4,
                version,
            });
        }

        Ok(Header {
            signature,
            version,
            channels: raw.channels.get(),
            height: raw.height.get(),
            width: raw.width.get(),
            depth: raw.depth.get(),
            color_mode: ColorMode::from_raw(raw.color_mode.get()),
        })
    }

    /// Whether the depth is one of 1, 8, 16 or 32 bits per channel.
    pub fn has_standard_depth(&self) -> bool {
        matches!(self.depth, 1 | 8 | 16 | 32)
    }
}
