use std::borrow::Cow;

use crate::{ClassFileError, ConstantPool, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationTypeInfo<'a> {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object {
        cpool_index: u16,
        class_name: Cow<'a, str>,
    },
    /// `offset` is the pc of the `new` instruction that created the object.
    Uninitialized {
        offset: u16,
    },
}
impl<'a> VerificationTypeInfo<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();

        let info = match r.u1(0, offset)? {
            0 => VerificationTypeInfo::Top,
            1 => VerificationTypeInfo::Integer,
            2 => VerificationTypeInfo::Float,
            3 => VerificationTypeInfo::Double,
            4 => VerificationTypeInfo::Long,
            5 => VerificationTypeInfo::Null,
            6 => VerificationTypeInfo::UninitializedThis,
            7 => {
                let cpool_index = r.u2(1, offset)?;
                VerificationTypeInfo::Object {
                    cpool_index,
                    class_name: constant_pool.class_name(cpool_index)?,
                }
            }
            8 => VerificationTypeInfo::Uninitialized {
                offset: r.u2(1, offset)?,
            },
            tag => return Err(ClassFileError::InvalidVerificationTypeTag(tag)),
        };

        Ok(info)
    }

    pub fn tag(&self) -> u8 {
        match self {
            VerificationTypeInfo::Top => 0,
            VerificationTypeInfo::Integer => 1,
            VerificationTypeInfo::Float => 2,
            VerificationTypeInfo::Double => 3,
            VerificationTypeInfo::Long => 4,
            VerificationTypeInfo::Null => 5,
            VerificationTypeInfo::UninitializedThis => 6,
            VerificationTypeInfo::Object { .. } => 7,
            VerificationTypeInfo::Uninitialized { .. } => 8,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        match self {
            VerificationTypeInfo::Object { .. } | VerificationTypeInfo::Uninitialized { .. } => 3,
            _ => 1,
        }
    }
}

/// Decodes `count` verification types starting at `offset`.
fn decode_types<'a>(
    constant_pool: &ConstantPool<'a>,
    offset: usize,
    count: usize,
) -> Result<(Vec<VerificationTypeInfo<'a>>, usize)> {
    let mut cursor = offset;
    let mut types = Vec::with_capacity(count);
    for _ in 0..count {
        let info = VerificationTypeInfo::decode(constant_pool, cursor)?;
        cursor += info.size_in_bytes();
        types.push(info);
    }

    Ok((types, cursor - offset))
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame<'a> {
    Same {
        offset_delta: u16,
    },
    SameLocals1StackItem {
        offset_delta: u16,
        stack: VerificationTypeInfo<'a>,
    },
    Chop {
        offset_delta: u16,
        /// Number of locals removed, 1 to 3.
        k: u8,
    },
    Append {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo<'a>>,
    },
    Full {
        offset_delta: u16,
        locals: Vec<VerificationTypeInfo<'a>>,
        stack: Vec<VerificationTypeInfo<'a>>,
    },
}
impl<'a> StackMapFrame<'a> {
    /// Decodes the frame at `offset`, returning it with its size in bytes.
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<(Self, usize)> {
        let r = constant_pool.reader();
        let frame_type = r.u1(0, offset)?;

        let decoded = match frame_type {
            0..=63 => (
                StackMapFrame::Same {
                    offset_delta: frame_type as u16,
                },
                1,
            ),
            64..=127 => {
                let stack = VerificationTypeInfo::decode(constant_pool, offset + 1)?;
                let size = 1 + stack.size_in_bytes();
                (
                    StackMapFrame::SameLocals1StackItem {
                        offset_delta: frame_type as u16 - 64,
                        stack,
                    },
                    size,
                )
            }
            247 => {
                let offset_delta = r.u2(1, offset)?;
                let stack = VerificationTypeInfo::decode(constant_pool, offset + 3)?;
                let size = 3 + stack.size_in_bytes();
                (
                    StackMapFrame::SameLocals1StackItem {
                        offset_delta,
                        stack,
                    },
                    size,
                )
            }
            248..=250 => (
                StackMapFrame::Chop {
                    offset_delta: r.u2(1, offset)?,
                    k: 251 - frame_type,
                },
                3,
            ),
            251 => (
                StackMapFrame::Same {
                    offset_delta: r.u2(1, offset)?,
                },
                3,
            ),
            252..=254 => {
                let offset_delta = r.u2(1, offset)?;
                let count = (frame_type - 251) as usize;
                let (locals, size) = decode_types(constant_pool, offset + 3, count)?;
                (
                    StackMapFrame::Append {
                        offset_delta,
                        locals,
                    },
                    3 + size,
                )
            }
            255 => {
                let offset_delta = r.u2(1, offset)?;
                let locals_count = r.u2(3, offset)? as usize;
                let (locals, locals_size) = decode_types(constant_pool, offset + 5, locals_count)?;
                let stack_offset = offset + 5 + locals_size;
                let stack_count = r.u2(0, stack_offset)? as usize;
                let (stack, stack_size) =
                    decode_types(constant_pool, stack_offset + 2, stack_count)?;
                (
                    StackMapFrame::Full {
                        offset_delta,
                        locals,
                        stack,
                    },
                    5 + locals_size + 2 + stack_size,
                )
            }
            _ => return Err(ClassFileError::InvalidStackMapFrameType(frame_type)),
        };

        Ok(decoded)
    }

    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackMapTableAttribute<'a> {
    pub frames: Vec<StackMapFrame<'a>>,
    size: usize,
}
impl<'a> StackMapTableAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let count = constant_pool.reader().u2(0, offset)?;

        let mut cursor = offset + 2;
        let mut frames = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (frame, size) = StackMapFrame::decode(constant_pool, cursor)?;
            cursor += size;
            frames.push(frame);
        }

        Ok(Self {
            frames,
            size: cursor - offset,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size
    }
}
