use std::borrow::Cow;

use log::{debug, trace};

use crate::{reader::ByteReader, ClassFileError, Result};

pub mod tags {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

/// Byte width of the entry starting at `offset`, tag included.
fn entry_width(reader: &ByteReader, offset: usize) -> Result<usize> {
    use tags::*;

    let width = match reader.u1(0, offset)? {
        UTF8 => 3 + reader.u2(1, offset)? as usize,
        INTEGER | FLOAT => 5,
        LONG | DOUBLE => 9,
        CLASS | STRING | METHOD_TYPE | MODULE | PACKAGE => 3,
        FIELD_REF | METHOD_REF | INTERFACE_METHOD_REF | NAME_AND_TYPE | DYNAMIC
        | INVOKE_DYNAMIC => 5,
        METHOD_HANDLE => 4,
        tag => return Err(ClassFileError::InvalidCpInfoTag { tag, offset }),
    };

    Ok(width)
}

/// Byte offsets of every usable constant pool entry.
///
/// Slot 0 is never used, and the slot following a `Long` or `Double` is
/// reserved: both stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPoolOffsetTable {
    offsets: Vec<Option<usize>>,
    end_offset: usize,
}
impl ConstantPoolOffsetTable {
    pub fn build(reader: &ByteReader, start_offset: usize, count: u16) -> Result<Self> {
        let count = count as usize;
        let mut offsets = vec![None; count.max(1)];
        let mut offset = start_offset;

        let mut index = 1;
        while index < count {
            let tag = reader.u1(0, offset)?;
            let width = entry_width(reader, offset)?;
            // the whole entry has to be present, not only its tag
            reader.slice(offset, width)?;
            trace!("cp #{index}: tag {tag} at offset {offset} ({width} bytes)");

            offsets[index] = Some(offset);
            offset += width;

            // Long and Double take up two slots
            index += match tag {
                tags::LONG | tags::DOUBLE => 2,
                _ => 1,
            };
        }

        Ok(Self {
            offsets,
            end_offset: offset,
        })
    }

    pub fn get(&self, index: u16) -> Option<usize> {
        self.offsets.get(index as usize).copied().flatten()
    }

    /// Number of usable entries.
    pub fn len(&self) -> usize {
        self.offsets.iter().filter(|o| o.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `constant_pool_count` this table was built from.
    pub fn count(&self) -> u16 {
        self.offsets.len() as u16
    }

    /// Offset of the first byte after the constant pool.
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_some())
            .map(|(i, _)| i as u16)
    }
}

/// A constant pool over a borrowed class file buffer.
///
/// Entries are decoded on every call to [`ConstantPool::entry`]; nothing is
/// cached. Callers needing repeated access to the same entry keep the
/// decoded value around themselves.
#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    reader: ByteReader<'a>,
    table: ConstantPoolOffsetTable,
}
impl<'a> ConstantPool<'a> {
    pub fn build(bytes: &'a [u8], start_offset: usize, count: u16) -> Result<Self> {
        let reader = ByteReader::new(bytes);
        let table = ConstantPoolOffsetTable::build(&reader, start_offset, count)?;
        debug!(
            "constant pool: {} usable entries of {count} slots, ends at {}",
            table.len(),
            table.end_offset()
        );

        Ok(Self { reader, table })
    }

    /// Builds the pool whose `constant_pool_count` is stored at `offset`.
    pub fn parse(bytes: &'a [u8], offset: usize) -> Result<Self> {
        let count = ByteReader::new(bytes).u2(0, offset)?;
        Self::build(bytes, offset + 2, count)
    }

    pub fn table(&self) -> &ConstantPoolOffsetTable {
        &self.table
    }

    pub fn reader(&self) -> ByteReader<'a> {
        self.reader
    }

    fn offset(&self, index: u16) -> Result<usize> {
        self.table
            .get(index)
            .ok_or(ClassFileError::InvalidConstantPoolIndex(index))
    }

    pub fn tag(&self, index: u16) -> Result<u8> {
        self.reader.u1(0, self.offset(index)?)
    }

    /// Offset of entry `index`, which must carry `tag`.
    fn expect(&self, index: u16, tag: u8, expected: &'static str) -> Result<usize> {
        let offset = self.offset(index)?;
        match self.reader.u1(0, offset)? {
            found if found == tag => Ok(offset),
            found => Err(ClassFileError::InvalidConstantPoolEntry {
                index,
                expected,
                found,
            }),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<Cow<'a, str>> {
        let offset = self.expect(index, tags::UTF8, "Utf8")?;
        let length = self.reader.u2(1, offset)?;
        self.reader.utf8(offset + 3, length as usize)
    }

    /// Like [`ConstantPool::utf8`], but index 0 means absent.
    pub fn optional_utf8(&self, index: u16) -> Result<Option<Cow<'a, str>>> {
        match index {
            0 => Ok(None),
            _ => self.utf8(index).map(Some),
        }
    }

    pub fn class_name(&self, index: u16) -> Result<Cow<'a, str>> {
        let offset = self.expect(index, tags::CLASS, "Class")?;
        self.utf8(self.reader.u2(1, offset)?)
    }

    /// Like [`ConstantPool::class_name`], but index 0 means absent.
    pub fn optional_class_name(&self, index: u16) -> Result<Option<Cow<'a, str>>> {
        match index {
            0 => Ok(None),
            _ => self.class_name(index).map(Some),
        }
    }

    /// Resolves a `NameAndType` entry to its name and descriptor.
    pub fn name_and_type(&self, index: u16) -> Result<(Cow<'a, str>, Cow<'a, str>)> {
        let offset = self.expect(index, tags::NAME_AND_TYPE, "NameAndType")?;
        let name = self.utf8(self.reader.u2(1, offset)?)?;
        let descriptor = self.utf8(self.reader.u2(3, offset)?)?;
        Ok((name, descriptor))
    }

    fn member_ref(&self, offset: usize) -> Result<MemberRef<'a>> {
        let class_index = self.reader.u2(1, offset)?;
        let name_and_type_index = self.reader.u2(3, offset)?;
        let class_name = self.class_name(class_index)?;
        let (member_name, descriptor) = self.name_and_type(name_and_type_index)?;

        Ok(MemberRef {
            class_index,
            class_name,
            name_and_type_index,
            member_name,
            descriptor,
        })
    }

    fn dynamic(&self, offset: usize) -> Result<DynamicInfo<'a>> {
        let bootstrap_method_attr_index = self.reader.u2(1, offset)?;
        let name_and_type_index = self.reader.u2(3, offset)?;
        let (name, descriptor) = self.name_and_type(name_and_type_index)?;

        Ok(DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
            name,
            descriptor,
        })
    }

    /// Decodes entry `index`, following its references down to the `Utf8`
    /// entries they name.
    pub fn entry(&self, index: u16) -> Result<ConstantPoolEntry<'a>> {
        use tags::*;

        let offset = self.offset(index)?;
        let r = &self.reader;

        let entry = match r.u1(0, offset)? {
            UTF8 => {
                let length = r.u2(1, offset)?;
                ConstantPoolEntry::Utf8(r.utf8(offset + 3, length as usize)?)
            }
            INTEGER => ConstantPoolEntry::Integer(r.i4(1, offset)?),
            FLOAT => ConstantPoolEntry::Float(r.f4(1, offset)?),
            LONG => ConstantPoolEntry::Long(r.i8(1, offset)?),
            DOUBLE => ConstantPoolEntry::Double(r.f8(1, offset)?),
            CLASS => {
                let name_index = r.u2(1, offset)?;
                ConstantPoolEntry::Class {
                    name_index,
                    name: self.utf8(name_index)?,
                }
            }
            STRING => {
                let string_index = r.u2(1, offset)?;
                ConstantPoolEntry::String {
                    string_index,
                    text: self.utf8(string_index)?,
                }
            }
            FIELD_REF => ConstantPoolEntry::FieldRef(self.member_ref(offset)?),
            METHOD_REF => ConstantPoolEntry::MethodRef(self.member_ref(offset)?),
            INTERFACE_METHOD_REF => {
                ConstantPoolEntry::InterfaceMethodRef(self.member_ref(offset)?)
            }
            NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
                name_index: r.u2(1, offset)?,
                descriptor_index: r.u2(3, offset)?,
            },
            METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
                reference_kind: r.u1(1, offset)?,
                reference_index: r.u2(2, offset)?,
            },
            METHOD_TYPE => {
                let descriptor_index = r.u2(1, offset)?;
                ConstantPoolEntry::MethodType {
                    descriptor_index,
                    descriptor: self.utf8(descriptor_index)?,
                }
            }
            DYNAMIC => ConstantPoolEntry::Dynamic(self.dynamic(offset)?),
            INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic(self.dynamic(offset)?),
            MODULE => {
                let name_index = r.u2(1, offset)?;
                ConstantPoolEntry::Module {
                    name_index,
                    name: self.utf8(name_index)?,
                }
            }
            PACKAGE => {
                let name_index = r.u2(1, offset)?;
                ConstantPoolEntry::Package {
                    name_index,
                    name: self.utf8(name_index)?,
                }
            }
            tag => return Err(ClassFileError::InvalidCpInfoTag { tag, offset }),
        };

        Ok(entry)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ConstantPoolEntry<'a> {
    Utf8(Cow<'a, str>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
        name: Cow<'a, str>,
    },
    String {
        string_index: u16,
        text: Cow<'a, str>,
    },
    FieldRef(MemberRef<'a>),
    MethodRef(MemberRef<'a>),
    InterfaceMethodRef(MemberRef<'a>),
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        reference_kind: u8,
        reference_index: u16,
    },
    MethodType {
        descriptor_index: u16,
        descriptor: Cow<'a, str>,
    },
    Dynamic(DynamicInfo<'a>),
    InvokeDynamic(DynamicInfo<'a>),
    Module {
        name_index: u16,
        name: Cow<'a, str>,
    },
    Package {
        name_index: u16,
        name: Cow<'a, str>,
    },
}
impl ConstantPoolEntry<'_> {
    pub fn tag(&self) -> u8 {
        use tags::*;

        match self {
            ConstantPoolEntry::Utf8(_) => UTF8,
            ConstantPoolEntry::Integer(_) => INTEGER,
            ConstantPoolEntry::Float(_) => FLOAT,
            ConstantPoolEntry::Long(_) => LONG,
            ConstantPoolEntry::Double(_) => DOUBLE,
            ConstantPoolEntry::Class { .. } => CLASS,
            ConstantPoolEntry::String { .. } => STRING,
            ConstantPoolEntry::FieldRef(_) => FIELD_REF,
            ConstantPoolEntry::MethodRef(_) => METHOD_REF,
            ConstantPoolEntry::InterfaceMethodRef(_) => INTERFACE_METHOD_REF,
            ConstantPoolEntry::NameAndType { .. } => NAME_AND_TYPE,
            ConstantPoolEntry::MethodHandle { .. } => METHOD_HANDLE,
            ConstantPoolEntry::MethodType { .. } => METHOD_TYPE,
            ConstantPoolEntry::Dynamic(_) => DYNAMIC,
            ConstantPoolEntry::InvokeDynamic(_) => INVOKE_DYNAMIC,
            ConstantPoolEntry::Module { .. } => MODULE,
            ConstantPoolEntry::Package { .. } => PACKAGE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConstantPoolEntry::Utf8(_) => "Utf8",
            ConstantPoolEntry::Integer(_) => "Integer",
            ConstantPoolEntry::Float(_) => "Float",
            ConstantPoolEntry::Long(_) => "Long",
            ConstantPoolEntry::Double(_) => "Double",
            ConstantPoolEntry::Class { .. } => "Class",
            ConstantPoolEntry::String { .. } => "String",
            ConstantPoolEntry::FieldRef(_) => "Fieldref",
            ConstantPoolEntry::MethodRef(_) => "Methodref",
            ConstantPoolEntry::InterfaceMethodRef(_) => "InterfaceMethodref",
            ConstantPoolEntry::NameAndType { .. } => "NameAndType",
            ConstantPoolEntry::MethodHandle { .. } => "MethodHandle",
            ConstantPoolEntry::MethodType { .. } => "MethodType",
            ConstantPoolEntry::Dynamic(_) => "Dynamic",
            ConstantPoolEntry::InvokeDynamic(_) => "InvokeDynamic",
            ConstantPoolEntry::Module { .. } => "Module",
            ConstantPoolEntry::Package { .. } => "Package",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct MemberRef<'a> {
    pub class_index: u16,
    pub class_name: Cow<'a, str>,
    pub name_and_type_index: u16,
    pub member_name: Cow<'a, str>,
    pub descriptor: Cow<'a, str>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo<'a> {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
    pub name: Cow<'a, str>,
    pub descriptor: Cow<'a, str>,
}

#[cfg(test)]
mod constant_pool_tests {
    use super::*;

    fn utf8(s: &str) -> Vec<u8> {
        let mut v = vec![tags::UTF8];
        v.extend_from_slice(&(s.len() as u16).to_be_bytes());
        v.extend_from_slice(s.as_bytes());
        v
    }

    fn pool(entries: &[Vec<u8>]) -> Vec<u8> {
        entries.concat()
    }

    #[test]
    fn it_should_decode_every_literal_kind() {
        let bytes = pool(&[
            utf8("hello"),                                   // #1
            vec![tags::INTEGER, 0xff, 0xff, 0xff, 0x85],     // #2
            vec![tags::FLOAT, 0x40, 0x49, 0x0f, 0xdb],       // #3
            vec![tags::LONG, 0, 0, 0, 1, 0, 0, 0, 2],        // #4, #5 reserved
            vec![tags::DOUBLE, 0xbf, 0xf0, 0, 0, 0, 0, 0, 0], // #6, #7 reserved
            vec![tags::STRING, 0, 1],                        // #8
            vec![tags::CLASS, 0, 1],                         // #9
            vec![tags::NAME_AND_TYPE, 0, 1, 0, 1],           // #10
        ]);
        let cp = ConstantPool::build(&bytes, 0, 11).unwrap();

        assert_eq!(cp.entry(1).unwrap(), ConstantPoolEntry::Utf8("hello".into()));
        assert_eq!(cp.entry(2).unwrap(), ConstantPoolEntry::Integer(-123));
        assert_eq!(
            cp.entry(3).unwrap(),
            ConstantPoolEntry::Float(f32::from_bits(0x4049_0fdb))
        );
        assert_eq!(cp.entry(4).unwrap(), ConstantPoolEntry::Long(0x1_0000_0002));
        assert_eq!(cp.entry(6).unwrap(), ConstantPoolEntry::Double(-1.0));
        assert_eq!(
            cp.entry(8).unwrap(),
            ConstantPoolEntry::String {
                string_index: 1,
                text: "hello".into()
            }
        );
        assert_eq!(
            cp.entry(9).unwrap(),
            ConstantPoolEntry::Class {
                name_index: 1,
                name: "hello".into()
            }
        );
        assert_eq!(
            cp.entry(10).unwrap(),
            ConstantPoolEntry::NameAndType {
                name_index: 1,
                descriptor_index: 1
            }
        );
        assert_eq!(cp.table().end_offset(), bytes.len());
    }

    #[test]
    fn it_should_decode_every_reference_kind() {
        let bytes = pool(&[
            utf8("p/A"),                                    // #1
            vec![tags::CLASS, 0, 1],                        // #2
            utf8("f"),                                      // #3
            utf8("I"),                                      // #4
            vec![tags::NAME_AND_TYPE, 0, 3, 0, 4],          // #5
            vec![tags::FIELD_REF, 0, 2, 0, 5],              // #6
            vec![tags::INTERFACE_METHOD_REF, 0, 2, 0, 5],   // #7
            vec![tags::METHOD_HANDLE, 1, 0, 6],             // #8
            utf8("()V"),                                    // #9
            vec![tags::METHOD_TYPE, 0, 9],                  // #10
            vec![tags::DYNAMIC, 0, 2, 0, 5],                // #11
            vec![tags::INVOKE_DYNAMIC, 0, 3, 0, 5],         // #12
            utf8("java.base"),                              // #13
            vec![tags::MODULE, 0, 13],                      // #14
            vec![tags::PACKAGE, 0, 1],                      // #15
        ]);
        let cp = ConstantPool::build(&bytes, 0, 16).unwrap();
        let member = MemberRef {
            class_index: 2,
            class_name: "p/A".into(),
            name_and_type_index: 5,
            member_name: "f".into(),
            descriptor: "I".into(),
        };

        assert_eq!(cp.entry(6).unwrap(), ConstantPoolEntry::FieldRef(member.clone()));
        assert_eq!(cp.entry(6).unwrap().kind(), "Fieldref");
        assert_eq!(
            cp.entry(7).unwrap(),
            ConstantPoolEntry::InterfaceMethodRef(member)
        );
        assert_eq!(cp.entry(7).unwrap().kind(), "InterfaceMethodref");
        assert_eq!(
            cp.entry(8).unwrap(),
            ConstantPoolEntry::MethodHandle {
                reference_kind: 1,
                reference_index: 6
            }
        );
        assert_eq!(
            cp.entry(10).unwrap(),
            ConstantPoolEntry::MethodType {
                descriptor_index: 9,
                descriptor: "()V".into()
            }
        );
        assert_eq!(
            cp.entry(11).unwrap(),
            ConstantPoolEntry::Dynamic(DynamicInfo {
                bootstrap_method_attr_index: 2,
                name_and_type_index: 5,
                name: "f".into(),
                descriptor: "I".into()
            })
        );
        assert_eq!(
            cp.entry(12).unwrap(),
            ConstantPoolEntry::InvokeDynamic(DynamicInfo {
                bootstrap_method_attr_index: 3,
                name_and_type_index: 5,
                name: "f".into(),
                descriptor: "I".into()
            })
        );
        assert_eq!(
            cp.entry(14).unwrap(),
            ConstantPoolEntry::Module {
                name_index: 13,
                name: "java.base".into()
            }
        );
        assert_eq!(
            cp.entry(15).unwrap(),
            ConstantPoolEntry::Package {
                name_index: 1,
                name: "p/A".into()
            }
        );
        assert_eq!(cp.table().end_offset(), bytes.len());
    }

    #[test]
    fn it_should_reject_a_member_whose_name_and_type_is_not_one() {
        let bytes = pool(&[
            utf8("p/A"),                        // #1
            vec![tags::CLASS, 0, 1],            // #2
            vec![tags::FIELD_REF, 0, 2, 0, 1],  // #3
            vec![tags::DYNAMIC, 0, 0, 0, 2],    // #4
        ]);
        let cp = ConstantPool::build(&bytes, 0, 5).unwrap();

        assert_eq!(
            cp.entry(3),
            Err(ClassFileError::InvalidConstantPoolEntry {
                index: 1,
                expected: "NameAndType",
                found: tags::UTF8
            })
        );
        assert_eq!(
            cp.entry(4),
            Err(ClassFileError::InvalidConstantPoolEntry {
                index: 2,
                expected: "NameAndType",
                found: tags::CLASS
            })
        );
    }

    #[test]
    fn it_should_reserve_the_slot_after_long_and_double() {
        let bytes = pool(&[
            vec![tags::LONG, 0, 0, 0, 0, 0, 0, 0, 7],
            vec![tags::DOUBLE, 0, 0, 0, 0, 0, 0, 0, 0],
            utf8("x"),
        ]);
        let cp = ConstantPool::build(&bytes, 0, 6).unwrap();

        assert_eq!(cp.table().len(), 6 - 1 - 2);
        assert_eq!(cp.table().indices().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(cp.table().get(1), Some(0));
        assert_eq!(cp.table().get(3), Some(9));
        assert_eq!(cp.table().get(5), Some(18));
        assert_eq!(
            cp.entry(2),
            Err(ClassFileError::InvalidConstantPoolIndex(2))
        );
        assert_eq!(
            cp.entry(4),
            Err(ClassFileError::InvalidConstantPoolIndex(4))
        );
        assert_eq!(cp.entry(5).unwrap(), ConstantPoolEntry::Utf8("x".into()));
    }

    #[test]
    fn it_should_decode_the_same_entry_repeatedly() {
        let bytes = pool(&[utf8("java/lang/Object"), vec![tags::CLASS, 0, 1]]);
        let cp = ConstantPool::build(&bytes, 0, 3).unwrap();

        assert_eq!(cp.entry(2).unwrap(), cp.entry(2).unwrap());
    }

    #[test]
    fn it_should_reject_references_to_the_wrong_kind() {
        let bytes = pool(&[
            vec![tags::INTEGER, 0, 0, 0, 1],
            vec![tags::CLASS, 0, 1],
            vec![tags::METHOD_REF, 0, 1, 0, 1],
        ]);
        let cp = ConstantPool::build(&bytes, 0, 4).unwrap();

        assert_eq!(
            cp.entry(2),
            Err(ClassFileError::InvalidConstantPoolEntry {
                index: 1,
                expected: "Utf8",
                found: tags::INTEGER
            })
        );
        assert_eq!(
            cp.entry(3),
            Err(ClassFileError::InvalidConstantPoolEntry {
                index: 1,
                expected: "Class",
                found: tags::INTEGER
            })
        );
    }

    #[test]
    fn it_should_reject_index_zero_and_out_of_range_indices() {
        let bytes = utf8("a");
        let cp = ConstantPool::build(&bytes, 0, 2).unwrap();

        assert_eq!(
            cp.entry(0),
            Err(ClassFileError::InvalidConstantPoolIndex(0))
        );
        assert_eq!(
            cp.entry(2),
            Err(ClassFileError::InvalidConstantPoolIndex(2))
        );
        assert_eq!(cp.optional_utf8(0), Ok(None));
    }

    #[test]
    fn it_should_fail_on_unknown_tags_and_truncated_entries() {
        assert_eq!(
            ConstantPool::build(&[2, 0, 0], 0, 2).unwrap_err(),
            ClassFileError::InvalidCpInfoTag { tag: 2, offset: 0 }
        );
        assert!(matches!(
            ConstantPool::build(&[tags::UTF8, 0, 5, b'a'], 0, 2).unwrap_err(),
            ClassFileError::TruncatedInput { .. }
        ));
    }

    #[test]
    fn it_should_parse_the_count_before_the_pool() {
        let mut bytes = vec![0xca, 0xfe, 0, 2];
        bytes.extend(utf8("abc"));
        let cp = ConstantPool::parse(&bytes, 2).unwrap();

        assert_eq!(cp.table().count(), 2);
        assert_eq!(cp.utf8(1).unwrap(), "abc");
    }
}
