//! Additional layer information records.
//!
//! The tail of every layer record (and of the layer & mask section) is a run
//! of tagged records: a signature, a four-character key and a length-prefixed
//! payload. Keys with a known layout are decoded through a static dispatch
//! table; everything else is kept as raw bytes.

pub mod path;
pub mod properties;
pub mod section_divider;
pub mod vector_mask;

pub use path::{BezierKnot, Fixed824, PathPoint, PathRecord};
pub use properties::{ProtectionFlags, ReferencePoint, SheetColor};
pub use section_divider::{DividerKind, SectionDivider};
pub use vector_mask::{VectorMask, VectorMaskFlags};

use crate::common::binary::Cursor;
use crate::common::error::Result;
use crate::common::tag::Tag;
use crate::config::ParseOptions;
use bytes::Bytes;
use log::{trace, warn};
use phf::phf_map;
use serde::Serialize;
use std::collections::BTreeMap;

/// Decoded payload of one additional layer info record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayerInfo {
    /// `lyid`
    LayerId(u32),
    /// `lsct`, `lsdk`
    SectionDivider(SectionDivider),
    /// `luni`
    UnicodeName(String),
    /// `lclr`
    SheetColor(SheetColor),
    /// `iOpa`
    FillOpacity(u8),
    /// `lnsr`
    NameSource(Tag),
    /// `lspf`
    Protection(ProtectionFlags),
    /// `clbl`
    BlendClipping(bool),
    /// `infx`
    BlendInterior(bool),
    /// `knko`
    Knockout(bool),
    /// `fxrp`
    ReferencePoint(ReferencePoint),
    /// `vmsk`, `vsms`
    VectorMask(VectorMask),
    /// Any key without a decoder, or a failed decode in lenient mode
    Raw(Bytes),
}

/// Records keyed by tag. A repeated key keeps the last record.
pub type LayerInfos = BTreeMap<Tag, LayerInfo>;

type InfoDecoder = fn(&mut Cursor<'_>, Tag, &ParseOptions) -> Result<LayerInfo>;

fn decode_layer_id(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    payload.read_u32().map(LayerInfo::LayerId)
}

fn decode_section_divider(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    SectionDivider::parse(payload).map(LayerInfo::SectionDivider)
}

fn decode_unicode_name(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    payload.read_unicode_string().map(LayerInfo::UnicodeName)
}

fn decode_sheet_color(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    SheetColor::parse(payload).map(LayerInfo::SheetColor)
}

fn decode_fill_opacity(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    payload.read_u8().map(LayerInfo::FillOpacity)
}

fn decode_name_source(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    payload.read_tag().map(LayerInfo::NameSource)
}

fn decode_protection(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    ProtectionFlags::parse(payload).map(LayerInfo::Protection)
}

fn decode_blend_clipping(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    properties::parse_flag_byte(payload).map(LayerInfo::BlendClipping)
}

fn decode_blend_interior(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    properties::parse_flag_byte(payload).map(LayerInfo::BlendInterior)
}

fn decode_knockout(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    properties::parse_flag_byte(payload).map(LayerInfo::Knockout)
}

fn decode_reference_point(payload: &mut Cursor<'_>, _: Tag, _: &ParseOptions) -> Result<LayerInfo> {
    ReferencePoint::parse(payload).map(LayerInfo::ReferencePoint)
}

fn decode_vector_mask(payload: &mut Cursor<'_>, tag: Tag, options: &ParseOptions) -> Result<LayerInfo> {
    VectorMask::parse(payload, tag, options.strict).map(LayerInfo::VectorMask)
}

/// Perfect hash map of layer info keys to decoder functions.
static DECODERS: phf::Map<&'static [u8], InfoDecoder> = phf_map! {
    b"lyid" => decode_layer_id,
    b"lsct" => decode_section_divider,
    b"lsdk" => decode_section_divider,
    b"luni" => decode_unicode_name,
    b"lclr" => decode_sheet_color,
    b"iOpa" => decode_fill_opacity,
    b"lnsr" => decode_name_source,
    b"lspf" => decode_protection,
    b"clbl" => decode_blend_clipping,
    b"infx" => decode_blend_interior,
    b"knko" => decode_knockout,
    b"fxrp" => decode_reference_point,
    b"vmsk" => decode_vector_mask,
    b"vsms" => decode_vector_mask,
};

/// Decode one payload by key. Unknown keys are returned as [`LayerInfo::Raw`].
pub fn decode(payload: &mut Cursor<'_>, tag: Tag, options: &ParseOptions) -> Result<LayerInfo> {
    let Some(decoder) = DECODERS.get(&tag.as_bytes()[..]) else {
        return Ok(LayerInfo::Raw(payload.read_rest()));
    };

    let mut raw = payload.clone();
    match decoder(payload, tag, options) {
        Ok(info) => Ok(info),
        Err(err) if options.lenient_layer_info => {
            warn!("keeping {} record raw: {}", tag, err);
            Ok(LayerInfo::Raw(raw.read_rest()))
        },
        Err(err) => Err(err),
    }
}

/// Frame the next record, returning its key and payload.
///
/// The payload length is rounded up to a multiple of `align`. Returns `None`
/// when fewer than 12 bytes remain or the signature is not `8BIM`/`8B64`.
pub fn next_record<'a>(cursor: &mut Cursor<'a>, align: usize) -> Result<Option<(Tag, Cursor<'a>)>> {
    if cursor.remaining() < 12 {
        return Ok(None);
    }
    let offset = cursor.position();
    let signature = cursor.read_tag()?;
    if signature != Tag::BIM && signature != Tag::B64 {
        warn!(
            "unexpected layer info signature {} at offset {}, skipping the rest",
            signature, offset
        );
        return Ok(None);
    }
    let tag = cursor.read_tag()?;
    let payload = cursor.read_section_padded(align)?;
    trace!("layer info {} at offset {} ({} bytes)", tag, offset, payload.len());
    Ok(Some((tag, payload)))
}

/// Decode records until `cursor` is exhausted or a bad signature is found.
pub fn parse_records(cursor: &mut Cursor<'_>, align: usize, options: &ParseOptions) -> Result<LayerInfos> {
    let mut infos = LayerInfos::new();
    while let Some((tag, mut payload)) = next_record(cursor, align)? {
        let info = decode(&mut payload, tag, options)?;
        infos.insert(tag, info);
    }
    Ok(infos)
}

/// Typed views over a record map.
pub trait LayerInfoExt {
    fn section_divider(&self) -> Option<&SectionDivider>;
    fn unicode_name(&self) -> Option<&str>;
    fn vector_mask(&self) -> Option<&VectorMask>;
}

impl LayerInfoExt for LayerInfos {
    fn section_divider(&self) -> Option<&SectionDivider> {
        // lsct takes precedence; lsdk only appears in nested documents
        [b"lsct", b"lsdk"].into_iter().find_map(|key| match self.get(&Tag::new(*key)) {
            Some(LayerInfo::SectionDivider(divider)) => Some(divider),
            _ => None,
        })
    }

    fn unicode_name(&self) -> Option<&str> {
        match self.get(&Tag::new(*b"luni")) {
            Some(LayerInfo::UnicodeName(name)) => Some(name),
            _ => None,
        }
    }

    fn vector_mask(&self) -> Option<&VectorMask> {
        [b"vmsk", b"vsms"].into_iter().find_map(|key| match self.get(&Tag::new(*key)) {
            Some(LayerInfo::VectorMask(mask)) => Some(mask),
            _ => None,
        })
    }
}
