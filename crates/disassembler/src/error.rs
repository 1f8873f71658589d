use jdis_class_file::ClassFileError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DisassemblerError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    #[error("{mnemonic} expects {expected}, found {found}")]
    UnexpectedConstantPoolEntry {
        mnemonic: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Invalid array type code: {0}")]
    InvalidArrayType(u8),
    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),
    #[error("Operands do not match {0}")]
    UnexpectedOperands(&'static str),
    #[error("Operand {value} out of range for {mnemonic}")]
    OperandOutOfRange { mnemonic: &'static str, value: i64 },
    #[error("tableswitch {low}..={high} with {offsets} jump offsets")]
    MalformedSwitch { low: i32, high: i32, offsets: usize },
}
