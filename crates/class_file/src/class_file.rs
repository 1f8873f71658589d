use std::borrow::Cow;

use crate::{
    attributes::{Attribute, AttributeTable, CodeAttribute},
    parser::Parser,
    AccessFlags, ConstantPool, Result,
};

#[derive(Debug)]
pub struct ClassFile<'a> {
    /// `(major, minor)`
    pub version: (u16, u16),
    pub constant_pool: ConstantPool<'a>,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo<'a>>,
    pub methods: Vec<MethodInfo<'a>>,
    pub attributes: AttributeTable<'a>,
}
impl<'a> ClassFile<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<ClassFile<'a>> {
        Parser::new(bytes).parse()
    }

    pub fn super_class(&self) -> Result<Option<Cow<'a, str>>> {
        // If the value of the super_class item is zero, then this class file must represent the
        // class Object, the only class or interface without a direct superclass.
        self.constant_pool.optional_class_name(self.super_class)
    }

    pub fn class_name(&self) -> Result<Cow<'a, str>> {
        // The constant_pool entry at this_class must be a CONSTANT_Class_info structure
        // representing the class or interface defined by this class file.
        self.constant_pool.class_name(self.this_class)
    }

    pub fn interface_names(&self) -> Result<Vec<Cow<'a, str>>> {
        self.interfaces
            .iter()
            .map(|&index| self.constant_pool.class_name(index))
            .collect()
    }

    pub fn field_name(&self, field: &FieldInfo) -> Result<Cow<'a, str>> {
        self.constant_pool.utf8(field.name_index)
    }

    pub fn field_descriptor(&self, field: &FieldInfo) -> Result<Cow<'a, str>> {
        self.constant_pool.utf8(field.descriptor_index)
    }

    pub fn method_name(&self, method: &MethodInfo) -> Result<Cow<'a, str>> {
        self.constant_pool.utf8(method.name_index)
    }

    pub fn method_descriptor(&self, method: &MethodInfo) -> Result<Cow<'a, str>> {
        self.constant_pool.utf8(method.descriptor_index)
    }

    /// First method called `name`, whatever its descriptor.
    pub fn method_by_name(&self, name: &str) -> Result<Option<&MethodInfo<'a>>> {
        for method in &self.methods {
            if self.method_name(method)? == name {
                return Ok(Some(method));
            }
        }

        Ok(None)
    }
}

#[derive(Debug)]
pub struct FieldInfo<'a> {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: AttributeTable<'a>,
}

#[derive(Debug)]
pub struct MethodInfo<'a> {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: AttributeTable<'a>,
}
impl<'a> MethodInfo<'a> {
    pub fn is_static(&self) -> bool {
        self.access_flags.is_static()
    }

    /// `None` for abstract and native methods.
    pub fn code(&self, constant_pool: &ConstantPool<'a>) -> Result<Option<CodeAttribute<'a>>> {
        match self.attributes.attribute("Code", constant_pool)? {
            Some(Attribute::Code(code)) => Ok(Some(code)),
            _ => Ok(None),
        }
    }

    /// Names from the `MethodParameters` attribute, if the method has one.
    pub fn parameter_names(
        &self,
        constant_pool: &ConstantPool<'a>,
    ) -> Result<Option<Vec<Option<Cow<'a, str>>>>> {
        match self.attributes.attribute("MethodParameters", constant_pool)? {
            Some(Attribute::MethodParameters(parameters)) => Ok(Some(parameters.names())),
            _ => Ok(None),
        }
    }
}
