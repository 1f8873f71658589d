use std::{borrow::Cow, fmt};

use jdis_class_file::{
    attributes::LocalVariableAttribute, descriptor::MethodDescriptor, ClassFile, MethodInfo,
};
use log::debug;

use crate::{LocalNameResolver, Result};

/// How disassembled lines are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassemblerOptions {
    pub line_separator: String,
    /// Tabs written before every line.
    pub indent_level: usize,
    /// Width the pc is right-aligned to.
    pub pc_column_width: usize,
    /// Show `String` instead of `java.lang.String`.
    pub compact_names: bool,
}
impl Default for DisassemblerOptions {
    fn default() -> Self {
        Self {
            line_separator: "\n".to_owned(),
            indent_level: 0,
            pc_column_width: 4,
            compact_names: false,
        }
    }
}

/// Everything the renderers need to know about the method body being
/// disassembled. Built once per method.
#[derive(Debug)]
pub struct DisassemblyContext<'a, W> {
    pub sink: W,
    pub options: DisassemblerOptions,
    pub local_variables: Option<LocalVariableAttribute<'a>>,
    pub parameter_names: Option<Vec<Option<Cow<'a, str>>>>,
    pub parameter_slot_widths: Vec<u8>,
    pub is_static: bool,
}
impl<'a, W: fmt::Write> DisassemblyContext<'a, W> {
    pub fn new(
        sink: W,
        options: DisassemblerOptions,
        method_descriptor: &str,
        is_static: bool,
    ) -> Result<Self> {
        let parameter_slot_widths =
            MethodDescriptor::parse(method_descriptor)?.parameter_slot_widths();

        Ok(Self {
            sink,
            options,
            local_variables: None,
            parameter_names: None,
            parameter_slot_widths,
            is_static,
        })
    }

    pub fn with_local_variables(
        mut self,
        local_variables: Option<LocalVariableAttribute<'a>>,
    ) -> Self {
        self.local_variables = local_variables;
        self
    }

    pub fn with_parameter_names(
        mut self,
        parameter_names: Option<Vec<Option<Cow<'a, str>>>>,
    ) -> Self {
        self.parameter_names = parameter_names;
        self
    }

    /// Collects the descriptor, `LocalVariableTable` and `MethodParameters`
    /// of `method`.
    pub fn for_method(
        sink: W,
        options: DisassemblerOptions,
        class_file: &ClassFile<'a>,
        method: &MethodInfo<'a>,
    ) -> Result<Self> {
        let constant_pool = &class_file.constant_pool;
        let descriptor = class_file.method_descriptor(method)?;

        let local_variables = match method.code(constant_pool)? {
            Some(code) => code.local_variables(constant_pool)?,
            None => None,
        };
        let parameter_names = method.parameter_names(constant_pool)?;
        debug!(
            "method {}{descriptor}: local variable table {}, parameter names {}",
            class_file.method_name(method)?,
            local_variables.is_some(),
            parameter_names.is_some()
        );

        Ok(Self::new(sink, options, &descriptor, method.is_static())?
            .with_local_variables(local_variables)
            .with_parameter_names(parameter_names))
    }

    pub fn resolver(&self) -> LocalNameResolver<'_, 'a> {
        LocalNameResolver {
            local_variables: self.local_variables.as_ref(),
            parameter_names: self.parameter_names.as_deref(),
            parameter_slot_widths: &self.parameter_slot_widths,
            is_static: self.is_static,
        }
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
