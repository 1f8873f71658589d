use std::borrow::Cow;

use crate::{
    attributes::{AttributeTable, LocalVariableAttribute},
    ConstantPool, Result,
};

use super::Attribute;

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionTableEntry<'a> {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// Zero catches everything (`finally`).
    pub catch_type: u16,
    pub catch_type_name: Option<Cow<'a, str>>,
}
impl<'a> ExceptionTableEntry<'a> {
    pub const SIZE: usize = 8;

    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let catch_type = r.u2(6, offset)?;

        Ok(Self {
            start_pc: r.u2(0, offset)?,
            end_pc: r.u2(2, offset)?,
            handler_pc: r.u2(4, offset)?,
            catch_type,
            catch_type_name: constant_pool.optional_class_name(catch_type)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeAttribute<'a> {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: &'a [u8],
    /// Offset of `code` in the class file buffer.
    pub code_offset: usize,
    pub exception_table: Vec<ExceptionTableEntry<'a>>,
    pub attributes: AttributeTable<'a>,
    size: usize,
}
impl<'a> CodeAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let max_stack = r.u2(0, offset)?;
        let max_locals = r.u2(2, offset)?;
        let code_length = r.u4(4, offset)? as usize;
        let code_offset = offset + 8;
        let code = r.slice(code_offset, code_length)?;

        let table_offset = code_offset + code_length;
        let exception_table_length = r.u2(0, table_offset)? as usize;
        let exception_table = (0..exception_table_length)
            .map(|i| {
                ExceptionTableEntry::decode(
                    constant_pool,
                    table_offset + 2 + i * ExceptionTableEntry::SIZE,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let attributes_offset =
            table_offset + 2 + exception_table_length * ExceptionTableEntry::SIZE;
        let (attributes, attributes_size) =
            AttributeTable::decode(constant_pool, attributes_offset)?;

        Ok(Self {
            max_stack,
            max_locals,
            code,
            code_offset,
            exception_table,
            attributes,
            size: attributes_offset + attributes_size - offset,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size
    }

    /// The method's `LocalVariableTable`, if it was compiled with one.
    pub fn local_variables(
        &self,
        constant_pool: &ConstantPool<'a>,
    ) -> Result<Option<LocalVariableAttribute<'a>>> {
        match self.attributes.attribute("LocalVariableTable", constant_pool)? {
            Some(Attribute::LocalVariableTable(table)) => Ok(Some(table)),
            _ => Ok(None),
        }
    }

    pub fn line_numbers(
        &self,
        constant_pool: &ConstantPool<'a>,
    ) -> Result<Option<LineNumberTableAttribute>> {
        match self.attributes.attribute("LineNumberTable", constant_pool)? {
            Some(Attribute::LineNumberTable(table)) => Ok(Some(table)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberEntry {
    pub start_pc: u16,
    pub line_number: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineNumberTableAttribute {
    pub entries: Vec<LineNumberEntry>,
}
impl LineNumberTableAttribute {
    pub fn decode(constant_pool: &ConstantPool, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let count = r.u2(0, offset)? as usize;
        let entries = (0..count)
            .map(|i| -> Result<LineNumberEntry> {
                let base = offset + 2 + i * 4;
                Ok(LineNumberEntry {
                    start_pc: r.u2(0, base)?,
                    line_number: r.u2(2, base)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn size_in_bytes(&self) -> usize {
        2 + self.entries.len() * 4
    }

    /// Source line of the instruction at `pc`.
    pub fn line_at(&self, pc: u16) -> Option<u16> {
        self.entries
            .iter()
            .filter(|e| e.start_pc <= pc)
            .max_by_key(|e| e.start_pc)
            .map(|e| e.line_number)
    }
}

#[cfg(test)]
mod code_attribute_tests {
    use super::*;
    use crate::constant_pool::tags;

    fn utf8(s: &str) -> Vec<u8> {
        let mut v = vec![tags::UTF8];
        v.extend_from_slice(&(s.len() as u16).to_be_bytes());
        v.extend_from_slice(s.as_bytes());
        v
    }

    // #1 "LineNumberTable", #2 "LocalVariableTable", #3 "this", #4 "Lp/C;",
    // #5 "java/lang/Exception", #6 Class #5
    fn pool() -> Vec<u8> {
        let mut bytes = [
            "LineNumberTable",
            "LocalVariableTable",
            "this",
            "Lp/C;",
            "java/lang/Exception",
        ]
        .iter()
        .flat_map(|s| utf8(s))
        .collect::<Vec<_>>();
        bytes.extend_from_slice(&[tags::CLASS, 0, 5]);
        bytes
    }

    #[test]
    fn it_should_decode_a_code_attribute_with_nested_tables() {
        let mut bytes = pool();
        let offset = bytes.len();
        bytes.extend_from_slice(&[0, 1, 0, 1, 0, 0, 0, 2, 0x2a, 0xb1]);
        bytes.extend_from_slice(&[0, 2, 0, 0, 0, 1, 0, 1, 0, 6, 0, 0, 0, 2, 0, 1, 0, 0]);
        bytes.extend_from_slice(&[0, 2]);
        bytes.extend_from_slice(&[0, 1, 0, 0, 0, 6, 0, 1, 0, 0, 0, 7]);
        bytes.extend_from_slice(&[0, 2, 0, 0, 0, 12, 0, 1, 0, 0, 0, 2, 0, 3, 0, 4, 0, 0]);
        let cp = ConstantPool::build(&bytes, 0, 7).unwrap();

        let code = CodeAttribute::decode(&cp, offset).unwrap();

        assert_eq!(code.max_stack, 1);
        assert_eq!(code.max_locals, 1);
        assert_eq!(code.code, &[0x2a, 0xb1]);
        assert_eq!(code.code_offset, offset + 8);
        assert_eq!(code.exception_table.len(), 2);
        assert_eq!(
            code.exception_table[0].catch_type_name.as_deref(),
            Some("java/lang/Exception")
        );
        assert_eq!(code.exception_table[1].catch_type_name, None);
        assert_eq!(code.size_in_bytes(), bytes.len() - offset);

        let lines = code.line_numbers(&cp).unwrap().unwrap();
        assert_eq!(lines.line_at(0), Some(7));
        assert_eq!(lines.line_at(1), Some(7));

        let locals = code.local_variables(&cp).unwrap().unwrap();
        assert_eq!(locals.entries[0].name, "this");
        assert_eq!(locals.entries[0].descriptor, "Lp/C;");
    }
}
