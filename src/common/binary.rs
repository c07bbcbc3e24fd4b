//! Big-endian byte cursor and section framing.
//!
//! Every section of a document is decoded through a [`Cursor`]: a forward
//! reader over a window of the shared input buffer. Positions are always
//! absolute offsets into the whole input so that errors and channel data
//! offsets can be reported without any bookkeeping by the caller.
//!
//! Variable-length sections are read with [`Cursor::read_section`], which
//! frames the section in a sub-cursor and moves the outer cursor past it
//! *before* the caller looks at the payload. A decoder that reads less than
//! the whole payload (or gives up early) therefore never desynchronizes the
//! records that follow.

use crate::common::error::{PsdError, Result};
use crate::common::tag::Tag;
use bytes::Bytes;
use zerocopy::{BE, F64, FromBytes, I16, I32, U16, U32};

/// Round `len` up to the next multiple of `align`.
#[inline]
pub fn pad_to(len: usize, align: usize) -> usize {
    if align <= 1 {
        len
    } else {
        len.div_ceil(align) * align
    }
}

/// Forward reader over a window `[start, end)` of the input.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use psdkit::common::Cursor;
///
/// let data = Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0xAB, 0xCD, 0x01]);
/// let mut cursor = Cursor::new(&data);
/// let mut section = cursor.read_section().unwrap();
/// assert_eq!(cursor.position(), 6);
/// assert_eq!(section.read_u8().unwrap(), 0xAB);
/// assert_eq!(cursor.read_u8().unwrap(), 0x01);
/// ```
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a Bytes,
    start: usize,
    end: usize,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the whole buffer.
    pub fn new(source: &'a Bytes) -> Self {
        Self {
            source,
            start: 0,
            end: source.len(),
            pos: 0,
        }
    }

    /// Current absolute position.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Absolute offset of the first byte of this window.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start as u64
    }

    /// Absolute offset one past the last byte of this window.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end as u64
    }

    /// Size of the whole window.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Bytes left between the position and the end of the window.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// Move to an absolute position inside the window.
    pub fn seek(&mut self, absolute: u64) -> Result<()> {
        if absolute < self.start as u64 || absolute > self.end as u64 {
            return Err(PsdError::UnexpectedEof {
                offset: absolute,
                requested: 0,
                available: self.remaining(),
            });
        }
        self.pos = absolute as usize;
        Ok(())
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(PsdError::UnexpectedEof {
                offset: self.pos as u64,
                requested: n,
                available: self.remaining(),
            });
        }
        let source: &'a Bytes = self.source;
        let slice = &source[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Borrow the next `n` bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Share the next `n` bytes without copying.
    pub fn read_shared(&mut self, n: usize) -> Result<Bytes> {
        let from = self.pos;
        self.take(n)?;
        Ok(self.source.slice(from..from + n))
    }

    /// Share everything left in the window.
    pub fn read_rest(&mut self) -> Bytes {
        let from = self.pos;
        self.pos = self.end;
        self.source.slice(from..self.end)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let offset = self.pos as u64;
        U16::<BE>::read_from_bytes(self.take(2)?)
            .map(|v| v.get())
            .map_err(|_| eof(offset, 2))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        let offset = self.pos as u64;
        I16::<BE>::read_from_bytes(self.take(2)?)
            .map(|v| v.get())
            .map_err(|_| eof(offset, 2))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let offset = self.pos as u64;
        U32::<BE>::read_from_bytes(self.take(4)?)
            .map(|v| v.get())
            .map_err(|_| eof(offset, 4))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let offset = self.pos as u64;
        I32::<BE>::read_from_bytes(self.take(4)?)
            .map(|v| v.get())
            .map_err(|_| eof(offset, 4))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        let offset = self.pos as u64;
        F64::<BE>::read_from_bytes(self.take(8)?)
            .map(|v| v.get())
            .map_err(|_| eof(offset, 8))
    }

    /// Read a four-character code.
    #[inline]
    pub fn read_tag(&mut self) -> Result<Tag> {
        self.read_array::<4>().map(Tag::new)
    }

    /// Read a four-character code and fail with `InvalidSignature` unless it
    /// equals `expected`.
    pub fn expect_tag(&mut self, expected: Tag) -> Result<()> {
        let offset = self.position();
        let found = self.read_tag()?;
        if found != expected {
            return Err(PsdError::InvalidSignature {
                offset,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Read a Pascal string: a 1-byte length followed by that many bytes.
    pub fn read_pascal_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a Pascal string whose total size, length byte included, is
    /// padded to a multiple of `align`.
    pub fn read_padded_pascal_string(&mut self, align: usize) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.take(len)?;
        self.skip(pad_to(len + 1, align) - (len + 1))?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a Unicode string: a 4-byte count of UTF-16BE code units followed
    /// by the units. Trailing NULs are dropped.
    pub fn read_unicode_string(&mut self) -> Result<String> {
        let offset = self.position();
        let count = self.read_u32()? as u64;
        if count * 2 > self.remaining() as u64 {
            return Err(PsdError::MalformedLength {
                offset,
                declared: count * 2,
                available: self.remaining() as u64,
            });
        }
        let units: Vec<u16> = self
            .take(count as usize * 2)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units)
            .trim_end_matches('\0')
            .to_string())
    }

    /// Carve the next `n` bytes into a bounded cursor and move past them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<Cursor<'a>> {
        let from = self.pos;
        self.take(n)?;
        Ok(Cursor {
            source: self.source,
            start: from,
            end: from + n,
            pos: from,
        })
    }

    /// Frame a length-prefixed section.
    ///
    /// Reads a 4-byte length and returns a cursor over exactly that many
    /// bytes. On return `self` is already positioned after the section.
    pub fn read_section(&mut self) -> Result<Cursor<'a>> {
        self.read_section_padded(1)
    }

    /// Like [`Cursor::read_section`], but the outer cursor also skips the
    /// padding that rounds the section length up to a multiple of `align`.
    ///
    /// The returned cursor covers the declared length; padding past the end
    /// of the enclosing window is tolerated.
    pub fn read_section_padded(&mut self, align: usize) -> Result<Cursor<'a>> {
        let offset = self.position();
        let declared = self.read_u32()? as usize;
        if declared > self.remaining() {
            return Err(PsdError::MalformedLength {
                offset,
                declared: declared as u64,
                available: self.remaining() as u64,
            });
        }
        let from = self.pos;
        let advance = pad_to(declared, align).min(self.remaining());
        self.pos += advance;
        Ok(Cursor {
            source: self.source,
            start: from,
            end: from + declared,
            pos: from,
        })
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("pos", &self.pos)
            .finish()
    }
}

#[inline]
fn eof(offset: u64, requested: usize) -> PsdError {
    PsdError::UnexpectedEof {
        offset,
        requested,
        available: 0,
    }
}
