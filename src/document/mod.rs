//! The decoded document and the top-level entry points.

use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use crate::config::ParseOptions;
use crate::header::Header;
use crate::layer::{Layer, LayerId, LayerInfo, LayerInfos, tree};
use crate::layer_mask::{GlobalMask, LayerAndMask};
use crate::resources::layer_comps::layer_comps;
use crate::resources::{LayerComp, Resource, Resources};
use bytes::Bytes;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// A fully decoded layered image document.
///
/// Layers live in an arena in file order; navigation goes through
/// [`LayerId`]s. Every list this type hands out is ordered top-to-bottom,
/// the way the layers panel shows them.
///
/// # Examples
///
/// ```no_run
/// use psdkit::Document;
///
/// # fn main() -> psdkit::Result<()> {
/// let doc = Document::open("poster.psd")?;
/// println!("{}x{} {}", doc.header().width, doc.header().height, doc.header().color_mode.name());
///
/// for layer in doc.layers() {
///     println!("{} visible={} folder={}", layer.name(), layer.visible(), layer.is_folder());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    header: Header,
    color_mode_data: Bytes,
    resources: Resources,
    layers: Vec<Layer>,
    roots: Vec<LayerId>,
    global_mask: Option<GlobalMask>,
    infos: LayerInfos,
    merged_alpha: bool,
    layer_comps: Vec<LayerComp>,
    unbalanced_folders: bool,
    image_data_offset: u64,
}

impl Document {
    /// Read and decode a file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, &ParseOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::decode(&Bytes::from(data), options)
    }

    /// Decode an in-memory document. Payloads share the buffer.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        Self::decode(&data.into(), &ParseOptions::default())
    }

    fn decode(data: &Bytes, options: &ParseOptions) -> Result<Self> {
        let len = data.len() as u64;
        if let Some(limit) = options.max_input_len.filter(|&limit| len > limit) {
            return Err(PsdError::InputTooLarge { len, limit });
        }

        let mut cursor = Cursor::new(data);
        let header = Header::parse(&mut cursor)?;
        debug!(
            "{}x{} {} document, {} channels at {} bits",
            header.width,
            header.height,
            header.color_mode.name(),
            header.channels,
            header.depth
        );

        let color_mode_data = cursor.read_section()?.read_rest();
        let resources = Resources::parse(&mut cursor)?;
        let LayerAndMask {
            layers: section,
            global_mask,
            infos,
        } = LayerAndMask::parse(&mut cursor.read_section()?, options)?;
        let image_data_offset = cursor.position();

        let mut layers = section.layers;
        let forest = tree::build(&mut layers);

        let layer_comps = if options.build_layer_comps {
            match layer_comps(&resources) {
                Ok(comps) => comps,
                Err(err) if !options.strict => {
                    warn!("ignoring layer comps: {}", err);
                    Vec::new()
                },
                Err(err) => return Err(err),
            }
        } else {
            Vec::new()
        };

        Ok(Document {
            header,
            color_mode_data,
            resources,
            layers,
            roots: forest.roots,
            global_mask,
            infos,
            merged_alpha: section.merged_alpha,
            layer_comps,
            unbalanced_folders: forest.unbalanced,
            image_data_offset,
        })
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Raw color mode data: the palette of indexed documents, duotone
    /// settings, otherwise usually empty.
    #[inline]
    pub fn color_mode_data(&self) -> &Bytes {
        &self.color_mode_data
    }

    #[inline]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    #[inline]
    pub fn resource(&self, id: u16) -> Option<&Resource> {
        self.resources.get(id)
    }

    #[inline]
    pub fn layer_comps(&self) -> &[LayerComp] {
        &self.layer_comps
    }

    #[inline]
    pub fn global_mask(&self) -> Option<&GlobalMask> {
        self.global_mask.as_ref()
    }

    /// Top-level layers, top-to-bottom.
    pub fn roots(&self) -> impl DoubleEndedIterator<Item = &Layer> + '_ {
        self.roots.iter().filter_map(|id| self.layer(*id))
    }

    /// Every decoded record, top-to-bottom, bounding dividers included.
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = &Layer> + ExactSizeIterator + '_ {
        self.layers.iter().rev()
    }

    #[inline]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Children of `id`, top-to-bottom. Empty for unknown ids.
    pub fn children(&self, id: LayerId) -> impl Iterator<Item = &Layer> + '_ {
        self.layer(id)
            .map(Layer::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.layer(*child))
    }

    pub fn parent(&self, id: LayerId) -> Option<&Layer> {
        self.layer(id)?.parent().and_then(|parent| self.layer(parent))
    }

    /// All layers below `id` in the hierarchy, depth first, top-to-bottom.
    pub fn descendants(&self, id: LayerId) -> Vec<&Layer> {
        let mut out = Vec::new();
        let mut pending: Vec<LayerId> = self
            .layer(id)
            .map(|layer| layer.children().iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = pending.pop() {
            if let Some(layer) = self.layer(next) {
                out.push(layer);
                pending.extend(layer.children().iter().rev().copied());
            }
        }
        out
    }

    /// Topmost layer with this display name.
    pub fn find_layer(&self, name: &str) -> Option<&Layer> {
        self.layers().find(|layer| layer.name() == name)
    }

    /// Number of layer records, bounding dividers included.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The layer count was stored negative.
    #[inline]
    pub fn merged_alpha(&self) -> bool {
        self.merged_alpha
    }

    /// Document-level additional info record.
    #[inline]
    pub fn document_info(&self, tag: Tag) -> Option<&LayerInfo> {
        self.infos.get(&tag)
    }

    #[inline]
    pub fn document_infos(&self) -> &LayerInfos {
        &self.infos
    }

    /// Folder markers were left open and closed implicitly.
    #[inline]
    pub fn had_unbalanced_folders(&self) -> bool {
        self.unbalanced_folders
    }

    /// Offset of the merged image data section.
    #[inline]
    pub fn image_data_offset(&self) -> u64 {
        self.image_data_offset
    }
}

/// Decode a document from a byte slice, copying it once.
pub fn parse(data: &[u8]) -> Result<Document> {
    parse_bytes(Bytes::copy_from_slice(data))
}

/// Decode a document from a shared buffer without copying.
pub fn parse_bytes(data: Bytes) -> Result<Document> {
    parse_with_options(data, &ParseOptions::default())
}

pub fn parse_with_options(data: Bytes, options: &ParseOptions) -> Result<Document> {
    Document::decode(&data, options)
}

/// Decode several documents in parallel. Results keep the input order.
pub fn parse_many(inputs: &[Bytes], options: &ParseOptions) -> Vec<Result<Document>> {
    inputs
        .par_iter()
        .map(|data| Document::decode(data, options))
        .collect()
}

#[cfg(test)]
mod tests;
