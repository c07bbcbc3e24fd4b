//! Layers and the folder hierarchy.
//!
//! Layer records are decoded in file order (bottom-most first) into an arena
//! owned by the [`crate::Document`]. Folder structure is expressed through
//! [`LayerId`] links: each layer knows its parent and its children, and both
//! child lists and the root list are ordered top-to-bottom.

pub mod blend;
pub mod info;
pub mod mask;
pub mod record;
pub mod tree;

pub use blend::{Blend, BlendMode, Clipping, LayerFlags};
pub use info::{LayerInfo, LayerInfos};
pub use mask::{BlendRange, BlendingRanges, LayerMask, MaskFlags};

use crate::common::binary::Cursor;
use crate::common::error::Result;
use crate::common::tag::Tag;
use info::{LayerInfoExt, SectionDivider, SheetColor, VectorMask};
use serde::Serialize;
use smallvec::SmallVec;

/// Index of a layer record in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub(crate) usize);

impl LayerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bounding rectangle in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Rect {
    /// Read top, left, bottom, right.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(Rect {
            top: cursor.read_i32()?,
            left: cursor.read_i32()?,
            bottom: cursor.read_i32()?,
            right: cursor.read_i32()?,
        })
    }

    /// `right >= left` and `bottom >= top`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.right >= self.left && self.bottom >= self.top
    }

    #[inline]
    pub fn width(&self) -> u32 {
        (self.right as i64 - self.left as i64).max(0) as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        (self.bottom as i64 - self.top as i64).max(0) as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// What a channel id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChannelKind {
    /// Color channel by index (0 = red, 1 = green, ... depending on mode)
    Color(u16),
    Transparency,
    UserMask,
    RealUserMask,
    Other(i16),
}

impl From<i16> for ChannelKind {
    fn from(id: i16) -> Self {
        match id {
            -1 => ChannelKind::Transparency,
            -2 => ChannelKind::UserMask,
            -3 => ChannelKind::RealUserMask,
            id if id >= 0 => ChannelKind::Color(id as u16),
            other => ChannelKind::Other(other),
        }
    }
}

/// One channel's entry in a layer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub id: i16,
    /// Length of the channel's compressed image data, including the
    /// compression marker
    pub length: u32,
    /// Absolute offset of the channel's image data in the input
    pub data_offset: u64,
}

impl ChannelInfo {
    #[inline]
    pub fn kind(&self) -> ChannelKind {
        ChannelKind::from(self.id)
    }
}

/// A decoded layer record together with its place in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) name: String,
    pub(crate) legacy_name: String,
    pub(crate) rect: Rect,
    pub(crate) channels: SmallVec<[ChannelInfo; 4]>,
    pub(crate) blend_mode: BlendMode,
    pub(crate) mask: Option<LayerMask>,
    pub(crate) blending_ranges: Option<BlendingRanges>,
    pub(crate) infos: LayerInfos,
    pub(crate) parent: Option<LayerId>,
    pub(crate) children: Vec<LayerId>,
    /// Offset of the record in the input
    pub(crate) offset: u64,
}

impl Layer {
    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display name: the Unicode name when present, else the Pascal name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Pascal name from the record itself.
    #[inline]
    pub fn legacy_name(&self) -> &str {
        &self.legacy_name
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.height()
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.rect.left
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.rect.top
    }

    #[inline]
    pub fn blend_mode(&self) -> &BlendMode {
        &self.blend_mode
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.blend_mode.visible()
    }

    /// Layer opacity, 0 to 255.
    #[inline]
    pub fn opacity(&self) -> u8 {
        self.blend_mode.opacity
    }

    /// Fill opacity (`iOpa`), 0 to 255.
    pub fn fill_opacity(&self) -> Option<u8> {
        match self.info(Tag::new(*b"iOpa")) {
            Some(LayerInfo::FillOpacity(opacity)) => Some(*opacity),
            _ => None,
        }
    }

    /// Open or closed folder.
    pub fn is_folder(&self) -> bool {
        self.section_divider().is_some_and(SectionDivider::is_folder)
    }

    /// Hidden marker closing a folder.
    pub fn is_folder_end(&self) -> bool {
        self.section_divider()
            .is_some_and(SectionDivider::is_folder_end)
    }

    /// Children, top-to-bottom. Empty for non-folders.
    #[inline]
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }

    #[inline]
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    #[inline]
    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    #[inline]
    pub fn mask(&self) -> Option<&LayerMask> {
        self.mask.as_ref()
    }

    #[inline]
    pub fn blending_ranges(&self) -> Option<&BlendingRanges> {
        self.blending_ranges.as_ref()
    }

    #[inline]
    pub fn info(&self, tag: Tag) -> Option<&LayerInfo> {
        self.infos.get(&tag)
    }

    #[inline]
    pub fn infos(&self) -> &LayerInfos {
        &self.infos
    }

    pub fn vector_mask(&self) -> Option<&VectorMask> {
        self.infos.vector_mask()
    }

    pub fn section_divider(&self) -> Option<&SectionDivider> {
        self.infos.section_divider()
    }

    /// Persistent layer id (`lyid`).
    pub fn layer_id(&self) -> Option<u32> {
        match self.info(Tag::new(*b"lyid")) {
            Some(LayerInfo::LayerId(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn sheet_color(&self) -> Option<SheetColor> {
        match self.info(Tag::new(*b"lclr")) {
            Some(LayerInfo::SheetColor(color)) => Some(*color),
            _ => None,
        }
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
