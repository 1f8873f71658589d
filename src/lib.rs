//! Decodes Java class files and renders their bytecode as text.

pub use jdis_class_file as class_file;
pub use jdis_disassembler as disassembler;
