//! Four-character codes.
//!
//! Signatures (`8BPS`, `8BIM`), blend mode keys and layer info keys are all
//! stored as four raw bytes. They are almost always printable ASCII, but the
//! format does not guarantee it, so the bytes are kept as-is.

use serde::{Serialize, Serializer};
use std::fmt;

/// A four-byte code such as `8BIM`, `norm` or `vmsk`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tag([u8; 4]);

impl Tag {
    /// `8BIM`, the signature of resource blocks and most layer records.
    pub const BIM: Tag = Tag(*b"8BIM");
    /// `8B64`, the alternate layer info signature.
    pub const B64: Tag = Tag(*b"8B64");

    #[inline]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Lossy text form, replacing non-ASCII bytes.
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }
}

impl PartialEq<[u8; 4]> for Tag {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&[u8; 4]> for Tag {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.to_text())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Tag::new(*b"mul ").to_string(), "mul ");
        assert_eq!(Tag::new([0x38, 0x42, 0x00, 0xFF]).to_string(), "8B??");
    }

    #[test]
    fn test_compare_with_bytes() {
        assert_eq!(Tag::BIM, *b"8BIM");
        assert_ne!(Tag::B64, b"8BIM");
    }
}
