use std::fmt::{self, Write};

use jdis_class_file::{ConstantPool, ConstantPoolEntry, MemberRef};
use log::trace;

use crate::{
    names,
    opcodes::{self, array_type, OperandKind, Opcode},
    templates::{DefaultTemplates, TemplateKey, Templates},
    DisassemblerError, DisassemblyContext, Result,
};

/// Width of local variable indices and `iinc` constants. Only instructions
/// following `wide` are `Wide`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    Narrow,
    Wide,
}

/// Operands of one instruction, as read from the code array.
///
/// Branch and switch offsets are relative to the instruction's pc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    None,
    Local(u16),
    /// `bipush` and `sipush`.
    Immediate(i32),
    Increment {
        slot: u16,
        value: i16,
    },
    Branch(i32),
    /// Constant pool index of `ldc`, field and method instructions and the
    /// class instructions.
    Constant(u16),
    InvokeInterface {
        index: u16,
        count: u8,
    },
    MultiANewArray {
        index: u16,
        dimensions: u8,
    },
    ArrayType(u8),
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    LookupSwitch {
        default: i32,
        pairs: Vec<(i32, i32)>,
    },
    /// The instruction following `wide`.
    Wide {
        opcode: u8,
        operands: Box<Operands>,
    },
}

struct Line {
    /// `None` for switch cases.
    pc: Option<u32>,
    text: String,
}

/// Renders single instructions of a method body into the context's sink.
pub struct Disassembler<'r, 'a, W, T = DefaultTemplates> {
    constant_pool: &'r ConstantPool<'a>,
    context: DisassemblyContext<'a, W>,
    templates: T,
}
impl<'r, 'a, W: fmt::Write> Disassembler<'r, 'a, W> {
    pub fn new(constant_pool: &'r ConstantPool<'a>, context: DisassemblyContext<'a, W>) -> Self {
        Self::with_templates(constant_pool, context, DefaultTemplates)
    }
}
impl<'r, 'a, W: fmt::Write, T: Templates> Disassembler<'r, 'a, W, T> {
    pub fn with_templates(
        constant_pool: &'r ConstantPool<'a>,
        context: DisassemblyContext<'a, W>,
        templates: T,
    ) -> Self {
        Self {
            constant_pool,
            context,
            templates,
        }
    }

    pub fn context(&self) -> &DisassemblyContext<'a, W> {
        &self.context
    }

    pub fn templates(&self) -> &T {
        &self.templates
    }

    pub fn into_context(self) -> DisassemblyContext<'a, W> {
        self.context
    }

    pub fn into_sink(self) -> W {
        self.context.into_sink()
    }

    /// Appends the lines of the instruction at `pc` to the sink. Nothing is
    /// written if the instruction cannot be rendered.
    pub fn instruction(&mut self, pc: u32, code: u8, operands: &Operands) -> Result<()> {
        let opcode = opcodes::opcode(code).ok_or(DisassemblerError::UnknownOpcode(code))?;

        let mut lines = Vec::new();
        self.render(pc, opcode, operands, IndexWidth::Narrow, &mut lines)?;
        self.flush(&lines)
    }

    fn render(
        &self,
        pc: u32,
        opcode: Opcode,
        operands: &Operands,
        width: IndexWidth,
        lines: &mut Vec<Line>,
    ) -> Result<()> {
        trace!("{pc}: {} {operands:?} ({width:?})", opcode.mnemonic);
        let mnemonic = opcode.mnemonic;

        let text = match (opcode.operands, operands) {
            (OperandKind::None, Operands::None) => self.format(TemplateKey::Simple, &[mnemonic]),
            (OperandKind::ImplicitLocal(slot), Operands::None) => {
                self.local(mnemonic, pc, slot as u16, false)
            }
            (OperandKind::Local, Operands::Local(slot)) => {
                check_slot(mnemonic, *slot, width)?;
                self.local(mnemonic, pc, *slot, true)
            }
            (OperandKind::Iinc, Operands::Increment { slot, value }) => {
                check_slot(mnemonic, *slot, width)?;
                if width == IndexWidth::Narrow {
                    check_range(mnemonic, *value as i64, i8::MIN as i64, i8::MAX as i64)?;
                }
                let local = self.context.resolver().resolve(pc, *slot, true).to_string();
                self.format(TemplateKey::Iinc, &[mnemonic, &local, &value.to_string()])
            }
            (OperandKind::Byte, Operands::Immediate(value)) => {
                check_range(mnemonic, *value as i64, i8::MIN as i64, i8::MAX as i64)?;
                self.format(TemplateKey::Immediate, &[mnemonic, &value.to_string()])
            }
            (OperandKind::Short, Operands::Immediate(value)) => {
                check_range(mnemonic, *value as i64, i16::MIN as i64, i16::MAX as i64)?;
                self.format(TemplateKey::Immediate, &[mnemonic, &value.to_string()])
            }
            (OperandKind::Branch, Operands::Branch(offset)) => {
                self.format(TemplateKey::Branch, &[mnemonic, &target(pc, *offset)])
            }
            (OperandKind::Ldc, Operands::Constant(index)) => {
                if opcode.code == opcodes::LDC {
                    check_range(mnemonic, *index as i64, 0, u8::MAX as i64)?;
                }
                self.ldc(mnemonic, *index)?
            }
            (OperandKind::Ldc2W, Operands::Constant(index)) => self.ldc2_w(mnemonic, *index)?,
            (OperandKind::Field, Operands::Constant(index)) => self.field(mnemonic, *index)?,
            (OperandKind::Method, Operands::Constant(index)) => self.method(mnemonic, *index)?,
            (OperandKind::InvokeInterface, Operands::InvokeInterface { index, count }) => {
                self.invoke_interface(mnemonic, *index, *count)?
            }
            (OperandKind::InvokeDynamic, Operands::Constant(index)) => {
                self.invoke_dynamic(mnemonic, *index)?
            }
            (OperandKind::Class, Operands::Constant(index)) => {
                let name = self.class_reference(mnemonic, *index)?;
                self.format(
                    TemplateKey::ClassReference,
                    &[mnemonic, &index.to_string(), &name],
                )
            }
            (OperandKind::MultiANewArray, Operands::MultiANewArray { index, dimensions }) => {
                let name = self.class_reference(mnemonic, *index)?;
                self.format(
                    TemplateKey::MultiANewArray,
                    &[mnemonic, &index.to_string(), &name, &dimensions.to_string()],
                )
            }
            (OperandKind::NewArray, Operands::ArrayType(code)) => {
                let element = array_type(*code).ok_or(DisassemblerError::InvalidArrayType(*code))?;
                self.format(TemplateKey::NewArray, &[mnemonic, element, &code.to_string()])
            }
            (
                OperandKind::TableSwitch,
                Operands::TableSwitch {
                    default,
                    low,
                    high,
                    offsets,
                },
            ) => return self.table_switch(pc, mnemonic, *default, *low, *high, offsets, lines),
            (OperandKind::LookupSwitch, Operands::LookupSwitch { default, pairs }) => {
                return self.lookup_switch(pc, mnemonic, *default, pairs, lines)
            }
            (
                OperandKind::Wide,
                Operands::Wide {
                    opcode: code,
                    operands,
                },
            ) => {
                let widened = opcodes::opcode(*code)
                    .filter(Opcode::is_widenable)
                    .ok_or(DisassemblerError::UnexpectedOperands(mnemonic))?;
                let widened_pc = pc.checked_add(1).ok_or(DisassemblerError::OperandOutOfRange {
                    mnemonic,
                    value: pc as i64 + 1,
                })?;
                lines.push(Line {
                    pc: Some(pc),
                    text: self.format(TemplateKey::Wide, &[mnemonic]),
                });
                return self.render(widened_pc, widened, operands, IndexWidth::Wide, lines);
            }
            _ => return Err(DisassemblerError::UnexpectedOperands(mnemonic)),
        };

        lines.push(Line { pc: Some(pc), text });
        Ok(())
    }

    fn format(&self, key: TemplateKey, args: &[&str]) -> String {
        self.templates.format(key, args)
    }

    fn compact(&self) -> bool {
        self.context.options.compact_names
    }

    fn local(&self, mnemonic: &str, pc: u32, slot: u16, show_index: bool) -> String {
        let local = self.context.resolver().resolve(pc, slot, show_index).to_string();
        self.format(TemplateKey::Local, &[mnemonic, &local])
    }

    fn ldc(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        let compact = self.compact();
        let i = index.to_string();

        let text = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::Integer(value) => {
                self.format(TemplateKey::LdcInteger, &[mnemonic, &i, &value.to_string()])
            }
            ConstantPoolEntry::Float(value) => {
                self.format(TemplateKey::LdcFloat, &[mnemonic, &i, &names::java_float(value)])
            }
            ConstantPoolEntry::String { text, .. } => self.format(
                TemplateKey::LdcString,
                &[mnemonic, &i, &names::escape_string(&text)],
            ),
            ConstantPoolEntry::Class { name, .. } => self.format(
                TemplateKey::LdcClass,
                &[mnemonic, &i, &names::class_reference(&name, compact)?],
            ),
            ConstantPoolEntry::MethodType { descriptor, .. } => self.format(
                TemplateKey::LdcMethodType,
                &[mnemonic, &i, &names::method_signature(&descriptor, compact)?],
            ),
            ConstantPoolEntry::MethodHandle {
                reference_kind,
                reference_index,
            } => {
                let kind = names::reference_kind(reference_kind)
                    .map(str::to_owned)
                    .unwrap_or_else(|| reference_kind.to_string());
                self.format(
                    TemplateKey::LdcMethodHandle,
                    &[mnemonic, &i, &kind, &reference_index.to_string()],
                )
            }
            ConstantPoolEntry::Dynamic(dynamic) => self.format(
                TemplateKey::LdcDynamic,
                &[
                    mnemonic,
                    &i,
                    &dynamic.name,
                    &names::type_signature(&dynamic.descriptor, compact)?,
                    &dynamic.bootstrap_method_attr_index.to_string(),
                ],
            ),
            other => {
                return Err(DisassemblerError::UnexpectedConstantPoolEntry {
                    mnemonic,
                    expected: "a loadable constant",
                    found: other.kind(),
                })
            }
        };

        Ok(text)
    }

    fn ldc2_w(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        let i = index.to_string();

        let text = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::Long(value) => {
                self.format(TemplateKey::Ldc2WLong, &[mnemonic, &i, &value.to_string()])
            }
            ConstantPoolEntry::Double(value) => self.format(
                TemplateKey::Ldc2WDouble,
                &[mnemonic, &i, &names::java_double(value)],
            ),
            other => {
                return Err(DisassemblerError::UnexpectedConstantPoolEntry {
                    mnemonic,
                    expected: "Long or Double",
                    found: other.kind(),
                })
            }
        };

        Ok(text)
    }

    fn field(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        let field = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::FieldRef(field) => field,
            other => return Err(unexpected(mnemonic, "Fieldref", &other)),
        };
        let compact = self.compact();

        Ok(self.format(
            TemplateKey::FieldAccess,
            &[
                mnemonic,
                &index.to_string(),
                &names::class_name(&field.class_name, compact),
                &field.member_name,
                &names::type_signature(&field.descriptor, compact)?,
            ],
        ))
    }

    fn method(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        // invokestatic and invokespecial may name interface methods
        let method = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::MethodRef(method)
            | ConstantPoolEntry::InterfaceMethodRef(method) => method,
            other => return Err(unexpected(mnemonic, "Methodref", &other)),
        };

        self.invoke(mnemonic, index, &method, None)
    }

    fn invoke_interface(&self, mnemonic: &'static str, index: u16, count: u8) -> Result<String> {
        let method = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::InterfaceMethodRef(method) => method,
            other => return Err(unexpected(mnemonic, "InterfaceMethodref", &other)),
        };

        self.invoke(mnemonic, index, &method, Some(count))
    }

    fn invoke(
        &self,
        mnemonic: &str,
        index: u16,
        method: &MemberRef,
        count: Option<u8>,
    ) -> Result<String> {
        let compact = self.compact();
        let i = index.to_string();
        let class_name = names::class_name(&method.class_name, compact);

        let text = match count {
            _ if method.member_name == "<init>" => self.format(
                TemplateKey::ConstructorInvoke,
                &[
                    mnemonic,
                    &i,
                    &class_name,
                    &names::constructor_signature(&method.descriptor, compact)?,
                ],
            ),
            Some(count) => self.format(
                TemplateKey::InterfaceInvoke,
                &[
                    mnemonic,
                    &i,
                    &class_name,
                    &method.member_name,
                    &names::method_signature(&method.descriptor, compact)?,
                    &count.to_string(),
                ],
            ),
            None => self.format(
                TemplateKey::MethodInvoke,
                &[
                    mnemonic,
                    &i,
                    &class_name,
                    &method.member_name,
                    &names::method_signature(&method.descriptor, compact)?,
                ],
            ),
        };

        Ok(text)
    }

    fn invoke_dynamic(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        let call_site = match self.constant_pool.entry(index)? {
            ConstantPoolEntry::InvokeDynamic(call_site) => call_site,
            other => return Err(unexpected(mnemonic, "InvokeDynamic", &other)),
        };

        Ok(self.format(
            TemplateKey::DynamicInvoke,
            &[
                mnemonic,
                &index.to_string(),
                &call_site.bootstrap_method_attr_index.to_string(),
                &call_site.name,
                &names::method_signature(&call_site.descriptor, self.compact())?,
            ],
        ))
    }

    fn class_reference(&self, mnemonic: &'static str, index: u16) -> Result<String> {
        match self.constant_pool.entry(index)? {
            ConstantPoolEntry::Class { name, .. } => names::class_reference(&name, self.compact()),
            other => Err(unexpected(mnemonic, "Class", &other)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn table_switch(
        &self,
        pc: u32,
        mnemonic: &str,
        default: i32,
        low: i32,
        high: i32,
        offsets: &[i32],
        lines: &mut Vec<Line>,
    ) -> Result<()> {
        let cases = high as i64 - low as i64 + 1;
        if cases < 0 || cases != offsets.len() as i64 {
            return Err(DisassemblerError::MalformedSwitch {
                low,
                high,
                offsets: offsets.len(),
            });
        }

        lines.push(Line {
            pc: Some(pc),
            text: self.format(TemplateKey::SwitchDefault, &[mnemonic, &target(pc, default)]),
        });
        for (key, offset) in (low..=high).zip(offsets) {
            lines.push(Line {
                pc: None,
                text: self.format(
                    TemplateKey::TableSwitchCase,
                    &[&key.to_string(), &target(pc, *offset)],
                ),
            });
        }

        Ok(())
    }

    fn lookup_switch(
        &self,
        pc: u32,
        mnemonic: &str,
        default: i32,
        pairs: &[(i32, i32)],
        lines: &mut Vec<Line>,
    ) -> Result<()> {
        lines.push(Line {
            pc: Some(pc),
            text: self.format(TemplateKey::SwitchDefault, &[mnemonic, &target(pc, default)]),
        });
        for (key, offset) in pairs {
            lines.push(Line {
                pc: None,
                text: self.format(
                    TemplateKey::LookupSwitchCase,
                    &[&key.to_string(), &target(pc, *offset)],
                ),
            });
        }

        Ok(())
    }

    fn flush(&mut self, lines: &[Line]) -> Result<()> {
        let options = &self.context.options;
        let width = options.pc_column_width;

        let mut text = String::new();
        for line in lines {
            text.extend(std::iter::repeat('\t').take(options.indent_level));
            match line.pc {
                Some(pc) => write!(text, "{pc:>width$}: ")?,
                None => write!(text, "{:width$}    ", "")?,
            }
            text.push_str(&line.text);
            text.push_str(&options.line_separator);
        }

        self.context.sink.write_str(&text)?;
        Ok(())
    }
}

fn target(pc: u32, offset: i32) -> String {
    (pc as i64 + offset as i64).to_string()
}

fn check_slot(mnemonic: &'static str, slot: u16, width: IndexWidth) -> Result<()> {
    match width {
        IndexWidth::Narrow => check_range(mnemonic, slot as i64, 0, u8::MAX as i64),
        IndexWidth::Wide => Ok(()),
    }
}

fn check_range(mnemonic: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DisassemblerError::OperandOutOfRange { mnemonic, value })
    }
}

fn unexpected(
    mnemonic: &'static str,
    expected: &'static str,
    found: &ConstantPoolEntry,
) -> DisassemblerError {
    DisassemblerError::UnexpectedConstantPoolEntry {
        mnemonic,
        expected,
        found: found.kind(),
    }
}
