//! Layer and mask information section.
//!
//! Layout inside the section's length prefix:
//!
//! 1. layer info sub-section (length-prefixed, padded to even)
//! 2. global layer mask (length-prefixed)
//! 3. document-level additional layer info records, padded to 4
//!
//! 16- and 32-bit documents written by newer versions keep their layers in
//! an `Lr16`/`Lr32` record of the third part and leave the first one empty.

use crate::common::binary::Cursor;
use crate::common::error::Result;
use crate::common::tag::Tag;
use crate::config::ParseOptions;
use crate::layer::LayerInfos;
use crate::layer::info;
use crate::layer::record::{LayerSection, parse_layer_section};
use log::debug;
use serde::Serialize;

/// Global layer mask settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalMask {
    pub overlay_color_space: u16,
    pub color_components: [u16; 4],
    /// 0 (transparent) to 100 (opaque)
    pub opacity: u16,
    /// 0 color selected, 1 color protected, 128 use per-layer value
    pub kind: u8,
}

impl GlobalMask {
    /// Decode the global mask section. Empty means absent.
    pub fn parse(section: &mut Cursor<'_>) -> Result<Option<Self>> {
        if section.is_empty() {
            return Ok(None);
        }
        let overlay_color_space = section.read_u16()?;
        let mut color_components = [0u16; 4];
        for component in color_components.iter_mut() {
            *component = section.read_u16()?;
        }
        let opacity = section.read_u16()?;
        let kind = section.read_u8()?;
        Ok(Some(GlobalMask {
            overlay_color_space,
            color_components,
            opacity,
            kind,
        }))
    }
}

/// Everything decoded from the layer and mask section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerAndMask {
    pub layers: LayerSection,
    pub global_mask: Option<GlobalMask>,
    /// Document-level records, `Lr16`/`Lr32` included as raw bytes
    pub infos: LayerInfos,
}

const LR16: Tag = Tag::new(*b"Lr16");
const LR32: Tag = Tag::new(*b"Lr32");

impl LayerAndMask {
    /// Decode the section body (the bytes inside its length prefix).
    pub fn parse(section: &mut Cursor<'_>, options: &ParseOptions) -> Result<Self> {
        if section.is_empty() {
            return Ok(LayerAndMask::default());
        }

        let mut layers = parse_layer_section(&mut section.read_section_padded(2)?, options)?;

        let global_mask = if section.remaining() >= 4 {
            GlobalMask::parse(&mut section.read_section()?)?
        } else {
            None
        };

        let mut infos = LayerInfos::new();
        while let Some((tag, mut payload)) = info::next_record(section, 4)? {
            if (tag == LR16 || tag == LR32) && layers.layers.is_empty() {
                debug!("reading layers from {} record", tag);
                layers = parse_layer_section(&mut payload.clone(), options)?;
            }
            let decoded = info::decode(&mut payload, tag, options)?;
            infos.insert(tag, decoded);
        }

        Ok(LayerAndMask {
            layers,
            global_mask,
            infos,
        })
    }
}
