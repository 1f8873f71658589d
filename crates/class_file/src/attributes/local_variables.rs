use std::borrow::Cow;

use crate::{ConstantPool, Result};

/// The five `u2` fields shared by `LocalVariableTable` and
/// `LocalVariableTypeTable` entries, with the name and type resolved.
fn decode_entry<'a>(
    constant_pool: &ConstantPool<'a>,
    offset: usize,
) -> Result<(u16, u16, Cow<'a, str>, Cow<'a, str>, u16)> {
    let r = constant_pool.reader();
    let start_pc = r.u2(0, offset)?;
    let length = r.u2(2, offset)?;
    let name = constant_pool.utf8(r.u2(4, offset)?)?;
    let type_name = constant_pool.utf8(r.u2(6, offset)?)?;
    let index = r.u2(8, offset)?;

    Ok((start_pc, length, name, type_name, index))
}

const ENTRY_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableEntry<'a> {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
    pub name: Cow<'a, str>,
    pub descriptor: Cow<'a, str>,
}
impl<'a> LocalVariableEntry<'a> {
    pub const SIZE: usize = ENTRY_SIZE;

    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let (start_pc, length, name, descriptor, index) = decode_entry(constant_pool, offset)?;

        Ok(Self {
            start_pc,
            length,
            index,
            name,
            descriptor,
        })
    }

    /// Whether the variable is live at `pc`: `[start_pc, start_pc + length)`.
    pub fn covers(&self, pc: usize) -> bool {
        let start = self.start_pc as usize;
        start <= pc && pc < start + self.length as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableTypeEntry<'a> {
    pub start_pc: u16,
    pub length: u16,
    pub index: u16,
    pub name: Cow<'a, str>,
    pub signature: Cow<'a, str>,
}
impl<'a> LocalVariableTypeEntry<'a> {
    pub const SIZE: usize = ENTRY_SIZE;

    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let (start_pc, length, name, signature, index) = decode_entry(constant_pool, offset)?;

        Ok(Self {
            start_pc,
            length,
            index,
            name,
            signature,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalVariableAttribute<'a> {
    pub entries: Vec<LocalVariableEntry<'a>>,
}
impl<'a> LocalVariableAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let count = constant_pool.reader().u2(0, offset)? as usize;
        let entries = (0..count)
            .map(|i| LocalVariableEntry::decode(constant_pool, offset + 2 + i * ENTRY_SIZE))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn size_in_bytes(&self) -> usize {
        2 + self.entries.len() * ENTRY_SIZE
    }

    /// First entry for `slot` that is live at `pc`.
    pub fn find(&self, slot: u16, pc: usize) -> Option<&LocalVariableEntry<'a>> {
        self.entries
            .iter()
            .find(|entry| entry.index == slot && entry.covers(pc))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalVariableTypeAttribute<'a> {
    pub entries: Vec<LocalVariableTypeEntry<'a>>,
}
impl<'a> LocalVariableTypeAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let count = constant_pool.reader().u2(0, offset)? as usize;
        let entries = (0..count)
            .map(|i| LocalVariableTypeEntry::decode(constant_pool, offset + 2 + i * ENTRY_SIZE))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn size_in_bytes(&self) -> usize {
        2 + self.entries.len() * ENTRY_SIZE
    }
}
