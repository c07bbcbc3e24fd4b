//! Vector mask (`vmsk`) and vector stroke mask (`vsms`) records.

use super::path::{PATH_RECORD_LEN, PathRecord};
use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use bitflags::bitflags;
use log::warn;
use serde::Serialize;

/// Bytes of the payload that precede the first path record in the count formula.
const RECORD_COUNT_BIAS: usize = 10;

bitflags! {
    /// Control flags word of a vector mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct VectorMaskFlags: u32 {
        const INVERT = 1 << 0;
        const NOT_LINKED = 1 << 1;
        const DISABLED = 1 << 2;
    }
}

/// Number of path records in a payload of `length` bytes, and whether the
/// length leaves a partial record.
///
/// ```
/// use psdkit::layer::info::vector_mask::path_record_count;
///
/// assert_eq!(path_record_count(10 + 26 * 3), (3, false));
/// assert_eq!(path_record_count(8 + 26 * 3), (2, true));
/// assert_eq!(path_record_count(4), (0, true));
/// ```
pub fn path_record_count(length: usize) -> (usize, bool) {
    match length.checked_sub(RECORD_COUNT_BIAS) {
        Some(body) => (body / PATH_RECORD_LEN, body % PATH_RECORD_LEN != 0),
        None => (0, true),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VectorMask {
    /// `vmsk` or `vsms`
    pub tag: Tag,
    pub version: u32,
    pub flags: VectorMaskFlags,
    /// Payload length the record count was derived from
    pub length: u64,
    pub paths: Vec<PathRecord>,
    misaligned: bool,
}

impl VectorMask {
    /// Decode a vector mask payload.
    ///
    /// With `strict` set, a payload length that does not fit a whole number of
    /// path records is an error; otherwise it is logged and flagged.
    pub fn parse(payload: &mut Cursor<'_>, tag: Tag, strict: bool) -> Result<Self> {
        let offset = payload.position();
        let length = payload.len();
        let (count, misaligned) = path_record_count(length);
        if misaligned {
            if strict {
                return Err(PsdError::MalformedVectorMask {
                    offset,
                    length: length as u64,
                });
            }
            warn!(
                "{} at offset {}: payload length {} leaves a partial path record",
                tag, offset, length
            );
        }

        let version = payload.read_u32()?;
        let flags = VectorMaskFlags::from_bits_retain(payload.read_u32()?);

        let mut paths = Vec::with_capacity(count.min(payload.remaining() / PATH_RECORD_LEN));
        for _ in 0..count {
            paths.push(PathRecord::parse(payload)?);
        }

        Ok(VectorMask {
            tag,
            version,
            flags,
            length: length as u64,
            paths,
            misaligned,
        })
    }

    /// Whether the payload length was not `10 + 26n`.
    #[inline]
    pub fn is_misaligned(&self) -> bool {
        self.misaligned
    }

    /// `vsms` rather than `vmsk`.
    #[inline]
    pub fn is_stroke(&self) -> bool {
        self.tag == *b"vsms"
    }

    #[inline]
    pub fn invert(&self) -> bool {
        self.flags.contains(VectorMaskFlags::INVERT)
    }

    #[inline]
    pub fn not_linked(&self) -> bool {
        self.flags.contains(VectorMaskFlags::NOT_LINKED)
    }

    #[inline]
    pub fn disabled(&self) -> bool {
        self.flags.contains(VectorMaskFlags::DISABLED)
    }
}
