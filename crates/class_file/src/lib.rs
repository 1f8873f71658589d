// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
pub mod constant_pool;
pub mod descriptor;
mod error;
mod parser;
pub mod reader;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo};
pub use access_flags::AccessFlags;
pub use constant_pool::{ConstantPool, ConstantPoolEntry, ConstantPoolOffsetTable, MemberRef};
pub use error::ClassFileError;
pub use parser::Parser;
pub use reader::ByteReader;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;
