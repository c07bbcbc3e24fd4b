//! Action descriptors.
//!
//! A descriptor is a self-describing key/value object used by several
//! resources and layer records. Keys are identifier strings; values are
//! tagged by a four-character type code.

use crate::common::binary::Cursor;
use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use bytes::Bytes;
use serde::Serialize;

/// Nesting limit for objects and lists.
const MAX_DEPTH: usize = 32;

/// A decoded descriptor object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    pub name: String,
    pub class_id: String,
    pub items: Vec<(String, DescriptorValue)>,
}

/// A single descriptor value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DescriptorValue {
    Reference(Vec<ReferenceItem>),
    Object(Descriptor),
    List(Vec<DescriptorValue>),
    Double(f64),
    UnitFloat { unit: Tag, value: f64 },
    UnitFloats { unit: Tag, values: Vec<f64> },
    Text(String),
    Enum { type_id: String, value: String },
    Integer(i32),
    LargeInteger(i64),
    Boolean(bool),
    Class { name: String, class_id: String },
    Alias(Bytes),
    /// `Pth `: signature, sizes and a UTF-16LE path, kept as stored
    FilePath(Bytes),
    /// `ObAr`: one class whose items each hold a value per element
    ObjectArray {
        count: u32,
        name: String,
        class_id: String,
        items: Vec<(String, DescriptorValue)>,
    },
    RawData(Bytes),
}

/// One element of an `obj ` reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReferenceItem {
    Property { name: String, class_id: String, key: String },
    Class { name: String, class_id: String },
    Enum { name: String, class_id: String, type_id: String, value: String },
    Offset { name: String, class_id: String, value: u32 },
    Identifier(u32),
    Index(u32),
    Name { name: String, class_id: String, value: String },
}

impl Descriptor {
    /// Decode a descriptor at the cursor.
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        parse_object(cursor, 0)
    }

    /// Look up an item by key.
    pub fn get(&self, key: &str) -> Option<&DescriptorValue> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl DescriptorValue {
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            DescriptorValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DescriptorValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DescriptorValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[DescriptorValue]> {
        match self {
            DescriptorValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Descriptor> {
        match self {
            DescriptorValue::Object(d) => Some(d),
            _ => None,
        }
    }
}

/// Identifier string: a 4-byte length, or a bare four-character code when
/// the length is zero.
fn read_id(cursor: &mut Cursor<'_>) -> Result<String> {
    let len = cursor.read_u32()? as usize;
    let len = if len == 0 { 4 } else { len };
    let bytes = cursor.read_bytes(len)?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn read_class(cursor: &mut Cursor<'_>) -> Result<(String, String)> {
    let name = cursor.read_unicode_string()?;
    let class_id = read_id(cursor)?;
    Ok((name, class_id))
}

/// Capacity hint that never trusts a count beyond what the input can hold.
#[inline]
fn capacity(count: u32, cursor: &Cursor<'_>, min_item_len: usize) -> usize {
    (count as usize).min(cursor.remaining() / min_item_len)
}

fn parse_object(cursor: &mut Cursor<'_>, depth: usize) -> Result<Descriptor> {
    if depth > MAX_DEPTH {
        return Err(PsdError::MalformedDescriptor {
            offset: cursor.position(),
            reason: "nesting too deep".to_string(),
        });
    }

    let (name, class_id) = read_class(cursor)?;
    let items = parse_items(cursor, depth)?;

    Ok(Descriptor {
        name,
        class_id,
        items,
    })
}

fn parse_items(cursor: &mut Cursor<'_>, depth: usize) -> Result<Vec<(String, DescriptorValue)>> {
    let count = cursor.read_u32()?;
    let mut items = Vec::with_capacity(capacity(count, cursor, 8));
    for _ in 0..count {
        let key = read_id(cursor)?;
        let value = parse_value(cursor, depth)?;
        items.push((key, value));
    }
    Ok(items)
}

fn parse_value(cursor: &mut Cursor<'_>, depth: usize) -> Result<DescriptorValue> {
    let offset = cursor.position();
    let kind = cursor.read_tag()?;

    let value = match kind.as_bytes() {
        b"obj " => DescriptorValue::Reference(parse_reference(cursor)?),
        b"Objc" | b"GlbO" => DescriptorValue::Object(parse_object(cursor, depth + 1)?),
        b"VlLs" => {
            if depth >= MAX_DEPTH {
                return Err(PsdError::MalformedDescriptor {
                    offset,
                    reason: "nesting too deep".to_string(),
                });
            }
            let count = cursor.read_u32()?;
            let mut values = Vec::with_capacity(capacity(count, cursor, 4));
            for _ in 0..count {
                values.push(parse_value(cursor, depth + 1)?);
            }
            DescriptorValue::List(values)
        },
        b"doub" => DescriptorValue::Double(cursor.read_f64()?),
        b"UntF" => DescriptorValue::UnitFloat {
            unit: cursor.read_tag()?,
            value: cursor.read_f64()?,
        },
        b"UnFl" => {
            let unit = cursor.read_tag()?;
            let count = cursor.read_u32()?;
            let mut values = Vec::with_capacity(capacity(count, cursor, 8));
            for _ in 0..count {
                values.push(cursor.read_f64()?);
            }
            DescriptorValue::UnitFloats { unit, values }
        },
        b"TEXT" => DescriptorValue::Text(cursor.read_unicode_string()?),
        b"enum" => DescriptorValue::Enum {
            type_id: read_id(cursor)?,
            value: read_id(cursor)?,
        },
        b"long" => DescriptorValue::Integer(cursor.read_i32()?),
        b"comp" => {
            let high = cursor.read_u32()? as u64;
            let low = cursor.read_u32()? as u64;
            DescriptorValue::LargeInteger(((high << 32) | low) as i64)
        },
        b"bool" => DescriptorValue::Boolean(cursor.read_u8()? != 0),
        b"type" | b"GlbC" => {
            let (name, class_id) = read_class(cursor)?;
            DescriptorValue::Class { name, class_id }
        },
        b"alis" => {
            let len = cursor.read_u32()? as usize;
            DescriptorValue::Alias(cursor.read_shared(len)?)
        },
        b"Pth " => {
            let len = cursor.read_u32()? as usize;
            DescriptorValue::FilePath(cursor.read_shared(len)?)
        },
        b"ObAr" => {
            if depth >= MAX_DEPTH {
                return Err(PsdError::MalformedDescriptor {
                    offset,
                    reason: "nesting too deep".to_string(),
                });
            }
            let count = cursor.read_u32()?;
            let (name, class_id) = read_class(cursor)?;
            DescriptorValue::ObjectArray {
                count,
                name,
                class_id,
                items: parse_items(cursor, depth + 1)?,
            }
        },
        b"tdta" => {
            let len = cursor.read_u32()? as usize;
            DescriptorValue::RawData(cursor.read_shared(len)?)
        },
        _ => {
            return Err(PsdError::MalformedDescriptor {
                offset,
                reason: format!("unknown value type {}", kind),
            });
        },
    };

    Ok(value)
}

fn parse_reference(cursor: &mut Cursor<'_>) -> Result<Vec<ReferenceItem>> {
    let count = cursor.read_u32()?;
    let mut items = Vec::with_capacity(capacity(count, cursor, 4));

    for _ in 0..count {
        let offset = cursor.position();
        let kind = cursor.read_tag()?;
        let item = match kind.as_bytes() {
            b"prop" => {
                let (name, class_id) = read_class(cursor)?;
                ReferenceItem::Property {
                    name,
                    class_id,
                    key: read_id(cursor)?,
                }
            },
            b"Clss" => {
                let (name, class_id) = read_class(cursor)?;
                ReferenceItem::Class { name, class_id }
            },
            b"Enmr" => {
                let (name, class_id) = read_class(cursor)?;
                ReferenceItem::Enum {
                    name,
                    class_id,
                    type_id: read_id(cursor)?,
                    value: read_id(cursor)?,
                }
            },
            b"rele" => {
                let (name, class_id) = read_class(cursor)?;
                ReferenceItem::Offset {
                    name,
                    class_id,
                    value: cursor.read_u32()?,
                }
            },
            b"Idnt" => ReferenceItem::Identifier(cursor.read_u32()?),
            b"indx" => ReferenceItem::Index(cursor.read_u32()?),
            b"name" => {
                let (name, class_id) = read_class(cursor)?;
                ReferenceItem::Name {
                    name,
                    class_id,
                    value: cursor.read_unicode_string()?,
                }
            },
            _ => {
                return Err(PsdError::MalformedDescriptor {
                    offset,
                    reason: format!("unknown reference type {}", kind),
                });
            },
        };
        items.push(item);
    }

    Ok(items)
}
