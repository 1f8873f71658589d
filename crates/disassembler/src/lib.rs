// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-6.html

mod context;
mod disassembler;
mod error;
mod local_names;
pub mod names;
pub mod opcodes;
pub mod templates;

pub use context::{DisassemblerOptions, DisassemblyContext};
pub use disassembler::{Disassembler, IndexWidth, Operands};
pub use error::DisassemblerError;
pub use local_names::{LocalName, LocalNameResolver, RECEIVER_NAME};
pub use templates::{DefaultTemplates, TemplateKey, Templates};

pub type Result<T, E = DisassemblerError> = std::result::Result<T, E>;
