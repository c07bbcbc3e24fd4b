//! psdkit - A Rust library for reading layered image documents (PSD)
//!
//! This library decodes the structure of Photoshop documents: the header,
//! color mode data, image resources and the layer hierarchy, with each
//! layer's geometry, blend settings, masks and additional information
//! records. Pixel data is not decompressed; every channel instead carries
//! the absolute offset of its image data.
//!
//! # Features
//!
//! - **Zero-copy payloads**: resource and raw record payloads share the
//!   input buffer through [`bytes::Bytes`]
//! - **Layer tree**: folders are rebuilt from their divider records into an
//!   arena navigated by [`LayerId`]
//! - **Layer comps**: decoded from the embedded action descriptor
//! - **Vector masks**: path records with 8.24 fixed-point coordinates
//! - **Bounded decoding**: every declared length is checked against the
//!   input before it is used
//!
//! # Example
//!
//! ```no_run
//! use psdkit::Document;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::open("poster.psd")?;
//!
//! fn print(doc: &Document, layer: &psdkit::Layer, depth: usize) {
//!     println!("{:indent$}{} ({}x{})", "", layer.name(), layer.width(), layer.height(), indent = depth * 2);
//!     for child in doc.children(layer.id()) {
//!         print(doc, child, depth + 1);
//!     }
//! }
//!
//! for root in doc.roots() {
//!     print(&doc, root, 0);
//! }
//!
//! for comp in doc.layer_comps() {
//!     println!("comp {}: {}", comp.id, comp.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Options
//!
//! ```no_run
//! use psdkit::{ParseOptions, parse_with_options};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("poster.psd")?;
//! let options = ParseOptions::new()
//!     .with_lenient_layer_info(true)
//!     .with_max_input_len(Some(512 << 20));
//! let doc = parse_with_options(data.into(), &options)?;
//! println!("{} layers", doc.layer_count());
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod document;
pub mod header;
pub mod layer;
pub mod layer_mask;
pub mod resources;

#[cfg(test)]
mod fixtures;

pub use common::{ErrorKind, PsdError, Result, Tag};
pub use config::ParseOptions;
pub use document::{Document, parse, parse_bytes, parse_many, parse_with_options};
pub use header::{ColorMode, Header};
pub use layer::{Layer, LayerId, LayerInfo, Rect};
pub use layer_mask::GlobalMask;
pub use resources::{LayerComp, Resource, Resources};
