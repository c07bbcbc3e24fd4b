//! Layer records and the layer info sub-section that holds them.

use super::blend::BlendMode;
use super::info::{self, LayerInfoExt};
use super::mask::{BlendingRanges, LayerMask};
use super::{ChannelInfo, Layer, LayerId, Rect};
use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use crate::config::ParseOptions;
use log::debug;
use smallvec::SmallVec;

/// Smallest possible layer record: rect, channel count, blend fields and an
/// empty extra data section.
const MIN_RECORD_LEN: usize = 16 + 2 + 12 + 4;
const CHANNEL_ENTRY_LEN: usize = 6;

/// Decoded layer info sub-section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSection {
    /// Records in file order, bottom-most first
    pub layers: Vec<Layer>,
    /// The layer count was negative: the first alpha channel holds the
    /// transparency of the merged result
    pub merged_alpha: bool,
}

/// Decode a layer info sub-section (the bytes inside its length prefix).
///
/// Layer count, every record, then the channel image data. Channel data
/// offsets are assigned from the position right after the last record.
pub fn parse_layer_section(section: &mut Cursor<'_>, options: &ParseOptions) -> Result<LayerSection> {
    if section.is_empty() {
        return Ok(LayerSection::default());
    }

    let count = section.read_i16()?;
    let merged_alpha = count < 0;
    let count = count.unsigned_abs() as usize;
    debug!("{} layer records, merged alpha: {}", count, merged_alpha);

    let mut layers = Vec::with_capacity(count.min(section.remaining() / MIN_RECORD_LEN));
    for index in 0..count {
        layers.push(parse_record(section, LayerId(index), options)?);
    }

    assign_channel_offsets(section, &mut layers)?;

    Ok(LayerSection {
        layers,
        merged_alpha,
    })
}

fn assign_channel_offsets(section: &Cursor<'_>, layers: &mut [Layer]) -> Result<()> {
    let declared: u64 = layers
        .iter()
        .flat_map(|layer| layer.channels.iter())
        .map(|channel| channel.length as u64)
        .sum();
    if declared > section.remaining() as u64 {
        return Err(PsdError::MalformedLength {
            offset: section.position(),
            declared,
            available: section.remaining() as u64,
        });
    }

    let mut offset = section.position();
    for channel in layers.iter_mut().flat_map(|layer| layer.channels.iter_mut()) {
        channel.data_offset = offset;
        offset += channel.length as u64;
    }
    Ok(())
}

/// Decode one layer record.
pub fn parse_record(cursor: &mut Cursor<'_>, id: LayerId, options: &ParseOptions) -> Result<Layer> {
    let offset = cursor.position();

    let rect = Rect::parse(cursor)?;
    if !rect.is_valid() {
        return Err(PsdError::InvalidBounds {
            offset,
            top: rect.top,
            left: rect.left,
            bottom: rect.bottom,
            right: rect.right,
        });
    }

    let channel_count = cursor.read_u16()? as usize;
    let mut channels = SmallVec::with_capacity(channel_count.min(cursor.remaining() / CHANNEL_ENTRY_LEN));
    for _ in 0..channel_count {
        channels.push(ChannelInfo {
            id: cursor.read_i16()?,
            length: cursor.read_u32()?,
            data_offset: 0,
        });
    }

    cursor.expect_tag(Tag::BIM)?;
    let key = cursor.read_tag()?;
    let opacity = cursor.read_u8()?;
    let clipping = cursor.read_u8()?;
    let flags = cursor.read_u8()?;
    cursor.skip(1)?;
    let blend_mode = BlendMode::new(key, opacity, clipping, flags);

    let mut extra = cursor.read_section()?;
    let mask = LayerMask::parse(&mut extra.read_section()?)?;
    let blending_ranges = BlendingRanges::parse(&mut extra.read_section()?)?;
    let legacy_name = extra.read_padded_pascal_string(4)?;
    let infos = info::parse_records(&mut extra, 2, options)?;

    let name = infos
        .unicode_name()
        .map(str::to_string)
        .unwrap_or_else(|| legacy_name.clone());

    Ok(Layer {
        id,
        name,
        legacy_name,
        rect,
        channels,
        blend_mode,
        mask,
        blending_ranges,
        infos,
        parent: None,
        children: Vec::new(),
        offset,
    })
}
