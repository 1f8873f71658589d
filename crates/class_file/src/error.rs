use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassFileError {
    #[error("Truncated input: {width} byte(s) at offset {offset} exceed buffer of {len} bytes")]
    TruncatedInput {
        offset: usize,
        width: usize,
        len: usize,
    },
    #[error("Expected {expected} at constant pool index {index}, found tag {found}")]
    InvalidConstantPoolEntry {
        index: u16,
        expected: &'static str,
        found: u8,
    },
    #[error("Invalid constant pool index: {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid cp info tag {tag} at offset {offset}")]
    InvalidCpInfoTag { tag: u8, offset: usize },
    #[error("Invalid modified UTF-8 at offset {0}")]
    InvalidModifiedUtf8(usize),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid verification type tag: {0}")]
    InvalidVerificationTypeTag(u8),
    #[error("Invalid stack map frame type: {0}")]
    InvalidStackMapFrameType(u8),
    #[error("Invalid element value tag: {0:?}")]
    InvalidElementValueTag(char),
    #[error("Element value at offset {offset} nests deeper than {limit} levels")]
    ElementValueTooDeep { offset: usize, limit: usize },
    #[error("Invalid descriptor: {0:?}")]
    InvalidDescriptor(String),
}
