//! Layer comps, derived from the layer comps resource (1065).
//!
//! The resource holds a 4-byte descriptor version followed by a descriptor
//! whose `list` item contains one object per comp.

use super::descriptor::Descriptor;
use super::{Resources, ids};
use crate::common::binary::Cursor;
use crate::common::error::Result;
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// What a comp records about each layer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct CompCapture: u32 {
        const VISIBILITY = 1 << 0;
        const POSITION = 1 << 1;
        const APPEARANCE = 1 << 2;
    }
}

/// A named layer comp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerComp {
    pub id: i32,
    pub name: String,
    pub captured: CompCapture,
    /// Whether this is the comp that was last applied to the document
    pub applied: bool,
}

impl LayerComp {
    #[inline]
    pub fn captures_visibility(&self) -> bool {
        self.captured.contains(CompCapture::VISIBILITY)
    }
}

/// Decode the comps stored in `resources`, if any.
///
/// Error offsets are absolute: they include the resource's `data_offset`.
pub fn layer_comps(resources: &Resources) -> Result<Vec<LayerComp>> {
    let Some(resource) = resources.get(ids::LAYER_COMPS) else {
        return Ok(Vec::new());
    };

    let mut cursor = Cursor::new(&resource.data);
    let descriptor = cursor
        .read_u32()
        .and_then(|_version| Descriptor::parse(&mut cursor))
        .map_err(|err| err.shifted(resource.data_offset))?;
    Ok(from_descriptor(&descriptor))
}

fn from_descriptor(descriptor: &Descriptor) -> Vec<LayerComp> {
    let last_applied = descriptor
        .get("lastAppliedComp")
        .and_then(|v| v.as_integer());

    descriptor
        .get("list")
        .and_then(|v| v.as_list())
        .unwrap_or_default()
        .iter()
        .filter_map(|value| value.as_object())
        .map(|comp| {
            let id = comp
                .get("compID")
                .and_then(|v| v.as_integer())
                .unwrap_or_default();
            LayerComp {
                id,
                name: comp
                    .get("Nm  ")
                    .and_then(|v| v.as_text())
                    .unwrap_or_default()
                    .to_string(),
                captured: CompCapture::from_bits_retain(
                    comp.get("capturedInfo")
                        .and_then(|v| v.as_integer())
                        .unwrap_or_default() as u32,
                ),
                applied: last_applied == Some(id),
            }
        })
        .collect()
}
