//! Folder hierarchy reconstruction.
//!
//! Folders are not nested in the file. Instead, in file order (bottom-most
//! first), a hidden bounding divider opens a group, the group's layers
//! follow, and the folder record itself closes it. The builder walks the
//! records once with a stack of pending child lists and links parents and
//! children in the arena.

use super::info::DividerKind;
use super::{Layer, LayerId};
use log::warn;

/// Top-level layers and whether any folder was left open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    /// Root layers, top-to-bottom
    pub roots: Vec<LayerId>,
    pub unbalanced: bool,
}

fn attach(stack: &mut [Vec<LayerId>], roots: &mut Vec<LayerId>, id: LayerId) {
    match stack.last_mut() {
        Some(pending) => pending.push(id),
        None => roots.push(id),
    }
}

/// Link `layers` (in file order) into a forest.
///
/// Bounding dividers are not attached anywhere. Folder records without a
/// matching divider become empty folders; dividers without a matching
/// folder record are closed at the end of the list, their layers moving up
/// to the enclosing level.
pub fn build(layers: &mut [Layer]) -> Forest {
    let mut roots = Vec::new();
    let mut stack: Vec<Vec<LayerId>> = Vec::new();

    for index in 0..layers.len() {
        let id = LayerId(index);
        let kind = layers[index].section_divider().map(|divider| divider.kind);

        match kind {
            Some(DividerKind::BoundingDivider) => stack.push(Vec::new()),
            Some(DividerKind::OpenFolder | DividerKind::ClosedFolder) => {
                match stack.pop() {
                    Some(children) => {
                        for child in &children {
                            layers[child.0].parent = Some(id);
                        }
                        layers[index].children = children;
                    },
                    None => warn!(
                        "folder {:?} at offset {} has no bounding divider",
                        layers[index].name, layers[index].offset
                    ),
                }
                attach(&mut stack, &mut roots, id);
            },
            _ => attach(&mut stack, &mut roots, id),
        }
    }

    let unbalanced = !stack.is_empty();
    if unbalanced {
        warn!("{} folder(s) left open at the end of the layer list", stack.len());
        while let Some(pending) = stack.pop() {
            match stack.last_mut() {
                Some(outer) => outer.extend(pending),
                None => roots.extend(pending),
            }
        }
    }

    roots.reverse();
    for layer in layers.iter_mut() {
        layer.children.reverse();
    }

    Forest { roots, unbalanced }
}
