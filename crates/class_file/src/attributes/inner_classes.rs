use std::borrow::Cow;

use crate::{AccessFlags, ConstantPool, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassesEntry<'a> {
    pub inner_class_info_index: u16,
    pub inner_class_name: Cow<'a, str>,
    /// Zero for top-level, local and anonymous classes.
    pub outer_class_info_index: u16,
    pub outer_class_name: Option<Cow<'a, str>>,
    /// Zero for anonymous classes.
    pub inner_name_index: u16,
    pub inner_name: Option<Cow<'a, str>>,
    pub access_flags: AccessFlags,
}
impl<'a> InnerClassesEntry<'a> {
    pub const SIZE: usize = 8;

    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let inner_class_info_index = r.u2(0, offset)?;
        let outer_class_info_index = r.u2(2, offset)?;
        let inner_name_index = r.u2(4, offset)?;
        let access_flags = AccessFlags::from_bits_truncate(r.u2(6, offset)?);

        Ok(Self {
            inner_class_info_index,
            inner_class_name: constant_pool.class_name(inner_class_info_index)?,
            outer_class_info_index,
            outer_class_name: constant_pool.optional_class_name(outer_class_info_index)?,
            inner_name_index,
            inner_name: constant_pool.optional_utf8(inner_name_index)?,
            access_flags,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        Self::SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InnerClassesAttribute<'a> {
    pub classes: Vec<InnerClassesEntry<'a>>,
}
impl<'a> InnerClassesAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let count = constant_pool.reader().u2(0, offset)? as usize;
        let classes = (0..count)
            .map(|i| {
                InnerClassesEntry::decode(constant_pool, offset + 2 + i * InnerClassesEntry::SIZE)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { classes })
    }

    pub fn size_in_bytes(&self) -> usize {
        2 + self.classes.len() * InnerClassesEntry::SIZE
    }
}
