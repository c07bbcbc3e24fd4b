//! Section divider records (`lsct`, `lsdk`) that mark folder boundaries.

use crate::common::binary::Cursor;
use crate::common::error::Result;
use crate::common::tag::Tag;
use serde::Serialize;

/// Divider type stored in the first word of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DividerKind {
    /// Any other layer
    Other,
    OpenFolder,
    ClosedFolder,
    /// Hidden marker closing a folder in file order
    BoundingDivider,
    Unknown(u32),
}

impl From<u32> for DividerKind {
    fn from(raw: u32) -> Self {
        match raw {
            0 => DividerKind::Other,
            1 => DividerKind::OpenFolder,
            2 => DividerKind::ClosedFolder,
            3 => DividerKind::BoundingDivider,
            other => DividerKind::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionDivider {
    pub kind: DividerKind,
    /// Blend key of the folder, present when the payload is at least 12 bytes
    pub blend_key: Option<Tag>,
    /// 0 normal, 1 scene group; present when the payload is at least 16 bytes
    pub sub_type: Option<u32>,
}

impl SectionDivider {
    pub fn parse(payload: &mut Cursor<'_>) -> Result<Self> {
        let kind = DividerKind::from(payload.read_u32()?);

        let mut blend_key = None;
        let mut sub_type = None;
        if payload.remaining() >= 8 {
            payload.expect_tag(Tag::BIM)?;
            blend_key = Some(payload.read_tag()?);
            if payload.remaining() >= 4 {
                sub_type = Some(payload.read_u32()?);
            }
        }

        Ok(SectionDivider {
            kind,
            blend_key,
            sub_type,
        })
    }

    /// Open or closed folder.
    #[inline]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, DividerKind::OpenFolder | DividerKind::ClosedFolder)
    }

    #[inline]
    pub fn is_folder_end(&self) -> bool {
        self.kind == DividerKind::BoundingDivider
    }
}
