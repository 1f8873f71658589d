use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Fixed-width big-endian reads over a borrowed class file buffer.
///
/// Every read addresses `base + field_offset`, mirroring how structures in
/// the class file format are described: a structure starts at `base` and its
/// fields live at fixed offsets from there.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
}
impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn slice(&self, offset: usize, width: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(width)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(ClassFileError::TruncatedInput {
                offset,
                width,
                len: self.bytes.len(),
            })
    }

    fn field(&self, field_offset: usize, base: usize, width: usize) -> Result<&'a [u8]> {
        let offset = base
            .checked_add(field_offset)
            .ok_or(ClassFileError::TruncatedInput {
                offset: base,
                width,
                len: self.bytes.len(),
            })?;
        self.slice(offset, width)
    }

    pub fn u1(&self, field_offset: usize, base: usize) -> Result<u8> {
        Ok(self.field(field_offset, base, 1)?[0])
    }

    pub fn u2(&self, field_offset: usize, base: usize) -> Result<u16> {
        Ok(Endian::read_u16(self.field(field_offset, base, 2)?))
    }

    pub fn u4(&self, field_offset: usize, base: usize) -> Result<u32> {
        Ok(Endian::read_u32(self.field(field_offset, base, 4)?))
    }

    pub fn i1(&self, field_offset: usize, base: usize) -> Result<i8> {
        Ok(self.u1(field_offset, base)? as i8)
    }

    pub fn i2(&self, field_offset: usize, base: usize) -> Result<i16> {
        Ok(Endian::read_i16(self.field(field_offset, base, 2)?))
    }

    pub fn i4(&self, field_offset: usize, base: usize) -> Result<i32> {
        Ok(Endian::read_i32(self.field(field_offset, base, 4)?))
    }

    pub fn i8(&self, field_offset: usize, base: usize) -> Result<i64> {
        Ok(Endian::read_i64(self.field(field_offset, base, 8)?))
    }

    pub fn f4(&self, field_offset: usize, base: usize) -> Result<f32> {
        Ok(Endian::read_f32(self.field(field_offset, base, 4)?))
    }

    pub fn f8(&self, field_offset: usize, base: usize) -> Result<f64> {
        Ok(Endian::read_f64(self.field(field_offset, base, 8)?))
    }

    /// Decodes `length` bytes of modified UTF-8 starting at `base`.
    ///
    /// Borrows from the buffer when the bytes happen to be plain UTF-8, which
    /// is the common case for class and member names.
    pub fn utf8(&self, base: usize, length: usize) -> Result<Cow<'a, str>> {
        let bytes = self.slice(base, length)?;
        cesu8::from_java_cesu8(bytes).map_err(|_| ClassFileError::InvalidModifiedUtf8(base))
    }
}
