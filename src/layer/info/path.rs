//! Path records.
//!
//! Vector masks (and clipping paths) are a flat sequence of 26-byte records.
//! The first two bytes select the record kind; the remaining 24 are laid out
//! per kind. Coordinates are 8.24 fixed point, relative to the document
//! bounds, with the vertical component stored first.

use crate::common::binary::Cursor;
use crate::common::error::Result;
use serde::Serialize;

/// Size of one path record in bytes.
pub const PATH_RECORD_LEN: usize = 26;

/// Signed 8.24 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Fixed824(pub i32);

impl Fixed824 {
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u32 << 24) as f64
    }

    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.read_i32().map(Fixed824)
    }
}

/// A point in path coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PathPoint {
    pub vertical: Fixed824,
    pub horizontal: Fixed824,
}

impl PathPoint {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(PathPoint {
            vertical: Fixed824::parse(cursor)?,
            horizontal: Fixed824::parse(cursor)?,
        })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.horizontal.to_f64()
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.vertical.to_f64()
    }
}

/// Bezier knot: the control point before the anchor, the anchor, and the
/// control point after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BezierKnot {
    pub preceding: PathPoint,
    pub anchor: PathPoint,
    pub leaving: PathPoint,
}

impl BezierKnot {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        Ok(BezierKnot {
            preceding: PathPoint::parse(cursor)?,
            anchor: PathPoint::parse(cursor)?,
            leaving: PathPoint::parse(cursor)?,
        })
    }
}

/// One decoded path record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathRecord {
    /// Selector 0
    ClosedSubpathLength { knots: u16 },
    /// Selectors 1 (linked) and 2 (unlinked)
    ClosedSubpathKnot { linked: bool, knot: BezierKnot },
    /// Selector 3
    OpenSubpathLength { knots: u16 },
    /// Selectors 4 (linked) and 5 (unlinked)
    OpenSubpathKnot { linked: bool, knot: BezierKnot },
    /// Selector 6
    PathFillRule,
    /// Selector 7
    Clipboard {
        top: Fixed824,
        left: Fixed824,
        bottom: Fixed824,
        right: Fixed824,
        resolution: Fixed824,
    },
    /// Selector 8
    InitialFillRule { all_pixels: bool },
    Unknown { selector: u16, data: [u8; 24] },
}

impl PathRecord {
    /// Decode one record. Always consumes exactly [`PATH_RECORD_LEN`] bytes.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let mut record = cursor.sub_cursor(PATH_RECORD_LEN)?;
        let selector = record.read_u16()?;

        let parsed = match selector {
            0 => PathRecord::ClosedSubpathLength {
                knots: record.read_u16()?,
            },
            1 | 2 => PathRecord::ClosedSubpathKnot {
                linked: selector == 1,
                knot: BezierKnot::parse(&mut record)?,
            },
            3 => PathRecord::OpenSubpathLength {
                knots: record.read_u16()?,
            },
            4 | 5 => PathRecord::OpenSubpathKnot {
                linked: selector == 4,
                knot: BezierKnot::parse(&mut record)?,
            },
            6 => PathRecord::PathFillRule,
            7 => PathRecord::Clipboard {
                top: Fixed824::parse(&mut record)?,
                left: Fixed824::parse(&mut record)?,
                bottom: Fixed824::parse(&mut record)?,
                right: Fixed824::parse(&mut record)?,
                resolution: Fixed824::parse(&mut record)?,
            },
            8 => PathRecord::InitialFillRule {
                all_pixels: record.read_u16()? != 0,
            },
            _ => PathRecord::Unknown {
                selector,
                data: record.read_array()?,
            },
        };

        Ok(parsed)
    }

    /// The knot carried by this record, if it is a knot record.
    pub fn knot(&self) -> Option<&BezierKnot> {
        match self {
            PathRecord::ClosedSubpathKnot { knot, .. } | PathRecord::OpenSubpathKnot { knot, .. } => {
                Some(knot)
            },
            _ => None,
        }
    }
}
