//! Image resources section.
//!
//! The section is a sequence of resource blocks, each carrying a numeric id,
//! an optional name and an opaque payload. Payloads are kept as raw bytes;
//! only the layer comps resource is interpreted, as a derived view.
//!
//! Block layout:
//!
//! | field     | size                                   |
//! |-----------|----------------------------------------|
//! | signature | 4 (`8BIM`)                             |
//! | id        | 2                                      |
//! | name      | Pascal string, padded to even length   |
//! | length    | 4                                      |
//! | data      | `length` bytes, padded to even length  |

pub mod descriptor;
pub mod layer_comps;

pub use descriptor::{Descriptor, DescriptorValue};
pub use layer_comps::{CompCapture, LayerComp};

use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;

/// Well-known resource ids.
pub mod ids {
    pub const RESOLUTION_INFO: u16 = 1005;
    pub const LAYER_STATE: u16 = 1024;
    pub const LAYER_GROUPS: u16 = 1026;
    pub const GUIDES: u16 = 1032;
    pub const THUMBNAIL: u16 = 1036;
    pub const ICC_PROFILE: u16 = 1039;
    pub const SLICES: u16 = 1050;
    pub const LAYER_COMPS: u16 = 1065;
}

/// One resource block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub signature: Tag,
    pub id: u16,
    /// `None` when the block's Pascal name is empty
    pub name: Option<String>,
    pub data: Bytes,
    /// Absolute offset of the payload in the input
    pub data_offset: u64,
}

/// Resource blocks keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resources {
    blocks: BTreeMap<u16, Resource>,
}

impl Resources {
    /// Decode the length-prefixed resources section at the cursor.
    ///
    /// A block with a bad signature ends the scan: its length has not been
    /// read yet, so it cannot be skipped. Blocks read before it are kept.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let mut section = cursor.read_section()?;
        let mut resources = Resources::default();

        while !section.is_empty() {
            match Self::parse_block(&mut section) {
                Ok(resource) => {
                    log::trace!("resource {} ({} bytes)", resource.id, resource.data.len());
                    resources.insert(resource);
                },
                Err(err @ PsdError::InvalidResourceSignature { .. }) => {
                    log::warn!("stopping resource scan: {}", err);
                    break;
                },
                Err(err) => return Err(err),
            }
        }

        log::debug!("decoded {} image resources", resources.len());
        Ok(resources)
    }

    fn parse_block(section: &mut Cursor<'_>) -> Result<Resource> {
        let offset = section.position();
        let signature = section.read_tag()?;
        if signature != Tag::BIM {
            return Err(PsdError::InvalidResourceSignature {
                offset,
                found: signature,
            });
        }

        let id = section.read_u16()?;
        let name = section.read_padded_pascal_string(2)?;
        let mut payload = section.read_section_padded(2)?;
        let data_offset = payload.position();

        Ok(Resource {
            signature,
            id,
            name: (!name.is_empty()).then_some(name),
            data: payload.read_rest(),
            data_offset,
        })
    }

    /// Insert a block, replacing any earlier block with the same id.
    pub fn insert(&mut self, resource: Resource) {
        self.blocks.insert(resource.id, resource);
    }

    pub fn get(&self, id: u16) -> Option<&Resource> {
        self.blocks.get(&id)
    }

    /// Blocks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::binary::pad_to;
    use crate::common::error::ErrorKind;
    use proptest::prelude::*;

    fn block(id: u16, name: &str, data: &[u8]) -> Vec<u8> {
        let mut raw = b"8BIM".to_vec();
        raw.extend_from_slice(&id.to_be_bytes());
        raw.push(name.len() as u8);
        raw.extend_from_slice(name.as_bytes());
        if (name.len() + 1) % 2 != 0 {
            raw.push(0);
        }
        raw.extend_from_slice(&(data.len() as u32).to_be_bytes());
        raw.extend_from_slice(data);
        if data.len() % 2 != 0 {
            raw.push(0);
        }
        raw
    }

    fn section(blocks: &[Vec<u8>]) -> Bytes {
        let body: Vec<u8> = blocks.concat();
        let mut raw = (body.len() as u32).to_be_bytes().to_vec();
        raw.extend_from_slice(&body);
        Bytes::from(raw)
    }

    #[test]
    fn test_parse_blocks() {
        let data = section(&[block(1005, "", &[1, 2, 3]), block(1039, "icc", &[9; 4])]);
        let mut cursor = Cursor::new(&data);
        let resources = Resources::parse(&mut cursor).unwrap();

        assert_eq!(resources.len(), 2);
        let res = resources.get(ids::RESOLUTION_INFO).unwrap();
        assert_eq!(res.signature, Tag::BIM);
        assert_eq!(res.name, None);
        assert_eq!(&res.data[..], &[1, 2, 3]);
        let icc = resources.get(ids::ICC_PROFILE).unwrap();
        assert_eq!(icc.name.as_deref(), Some("icc"));
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_duplicate_ids_keep_last() {
        let data = section(&[block(7, "", b"first"), block(7, "", b"second")]);
        let resources = Resources::parse(&mut Cursor::new(&data)).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(&resources.get(7).unwrap().data[..], b"second");
    }

    #[test]
    fn test_bad_signature_stops_scan() {
        let mut broken = block(2, "", b"xx");
        broken[0..4].copy_from_slice(b"MeSa");
        let data = section(&[block(1, "", b"ok"), broken, block(3, "", b"lost")]);
        let mut cursor = Cursor::new(&data);
        let resources = Resources::parse(&mut cursor).unwrap();
        assert_eq!(resources.len(), 1);
        assert!(resources.get(1).is_some());
        // The outer cursor still lands after the section.
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_oversized_block_is_fatal() {
        let mut raw = b"8BIM".to_vec();
        raw.extend_from_slice(&1u16.to_be_bytes());
        raw.extend_from_slice(&[0, 0]);
        raw.extend_from_slice(&0xFFFF_FF00u32.to_be_bytes());
        let data = section(&[raw]);
        let err = Resources::parse(&mut Cursor::new(&data)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLength);
    }

    #[test]
    fn test_empty_section() {
        let data = section(&[]);
        let resources = Resources::parse(&mut Cursor::new(&data)).unwrap();
        assert!(resources.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_block_consumption_is_even(
            name in "[a-z]{0,12}",
            payload in prop::collection::vec(any::<u8>(), 0..40),
        ) {
            let raw = block(1000, &name, &payload);
            prop_assert_eq!(raw.len(), 6 + pad_to(name.len() + 1, 2) + 4 + pad_to(payload.len(), 2));

            let data = section(&[raw.clone(), block(1001, "", b"tail")]);
            let resources = Resources::parse(&mut Cursor::new(&data)).unwrap();
            let decoded = resources.get(1000).unwrap();
            prop_assert_eq!(&decoded.data[..], &payload[..]);
            prop_assert_eq!(decoded.data_offset as usize, 4 + 6 + pad_to(name.len() + 1, 2) + 4);
            prop_assert_eq!(&resources.get(1001).unwrap().data[..], b"tail");
        }
    }
}
