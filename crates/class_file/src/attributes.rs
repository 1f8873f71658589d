mod annotations;
mod code;
mod inner_classes;
mod local_variables;
mod method_parameters;
mod stack_map;

use std::borrow::Cow;

use log::{trace, warn};

use crate::{ConstantPool, Result};

pub use annotations::{
    Annotation, AnnotationComponent, AnnotationDefaultAttribute, ElementValue, MAX_NESTING_DEPTH,
    ParameterAnnotationsAttribute, RuntimeAnnotationsAttribute,
};
pub use code::{CodeAttribute, ExceptionTableEntry, LineNumberEntry, LineNumberTableAttribute};
pub use inner_classes::{InnerClassesAttribute, InnerClassesEntry};
pub use local_variables::{
    LocalVariableAttribute, LocalVariableEntry, LocalVariableTypeAttribute, LocalVariableTypeEntry,
};
pub use method_parameters::{MethodParameter, MethodParametersAttribute};
pub use stack_map::{StackMapFrame, StackMapTableAttribute, VerificationTypeInfo};

/// `attribute_name_index` and `attribute_length`, shared by every attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeHeader<'a> {
    pub name_index: u16,
    pub name: Cow<'a, str>,
    pub length: u32,
    /// Offset of the header in the class file buffer.
    pub offset: usize,
}
impl<'a> AttributeHeader<'a> {
    pub const SIZE: usize = 6;

    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let name_index = r.u2(0, offset)?;
        let length = r.u4(2, offset)?;
        let name = constant_pool.utf8(name_index)?;

        Ok(Self {
            name_index,
            name,
            length,
            offset,
        })
    }

    /// Offset of the attribute's `info` bytes.
    pub fn info_offset(&self) -> usize {
        self.offset + Self::SIZE
    }

    pub fn info<'b>(&self, constant_pool: &ConstantPool<'b>) -> Result<&'b [u8]> {
        constant_pool
            .reader()
            .slice(self.info_offset(), self.length as usize)
    }

    pub fn size_in_bytes(&self) -> usize {
        Self::SIZE + self.length as usize
    }
}

/// An `attributes_count` followed by that many attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeTable<'a> {
    pub attributes: Vec<AttributeHeader<'a>>,
}
impl<'a> AttributeTable<'a> {
    /// Decodes the table whose count is stored at `offset`, returning it
    /// together with the number of bytes it occupies.
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<(Self, usize)> {
        let count = constant_pool.reader().u2(0, offset)?;

        let mut cursor = offset + 2;
        let mut attributes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let header = AttributeHeader::decode(constant_pool, cursor)?;
            // the whole body has to be there before the next one is looked at
            header.info(constant_pool)?;
            trace!("attribute {} ({} bytes) at {cursor}", header.name, header.length);

            cursor += header.size_in_bytes();
            attributes.push(header);
        }

        Ok((Self { attributes }, cursor - offset))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&AttributeHeader<'a>> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeHeader<'a>> {
        self.attributes.iter()
    }

    /// Decodes the body of the attribute called `name`, if there is one.
    pub fn attribute(
        &self,
        name: &str,
        constant_pool: &ConstantPool<'a>,
    ) -> Result<Option<Attribute<'a>>> {
        self.find_by_name(name)
            .map(|header| Attribute::decode(constant_pool, header))
            .transpose()
    }
}
impl<'a, 'b> IntoIterator for &'b AttributeTable<'a> {
    type Item = &'b AttributeHeader<'a>;
    type IntoIter = std::slice::Iter<'b, AttributeHeader<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

/// A decoded attribute body. Attributes not listed here are kept as their
/// raw `info` bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'a> {
    Code(CodeAttribute<'a>),
    LineNumberTable(LineNumberTableAttribute),
    LocalVariableTable(LocalVariableAttribute<'a>),
    LocalVariableTypeTable(LocalVariableTypeAttribute<'a>),
    InnerClasses(InnerClassesAttribute<'a>),
    StackMapTable(StackMapTableAttribute<'a>),
    MethodParameters(MethodParametersAttribute<'a>),
    RuntimeVisibleAnnotations(RuntimeAnnotationsAttribute<'a>),
    RuntimeInvisibleAnnotations(RuntimeAnnotationsAttribute<'a>),
    RuntimeVisibleParameterAnnotations(ParameterAnnotationsAttribute<'a>),
    RuntimeInvisibleParameterAnnotations(ParameterAnnotationsAttribute<'a>),
    AnnotationDefault(AnnotationDefaultAttribute<'a>),
    Other {
        name: Cow<'a, str>,
        info: &'a [u8],
    },
}
impl<'a> Attribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, header: &AttributeHeader<'a>) -> Result<Self> {
        let offset = header.info_offset();
        let cp = constant_pool;

        let attribute = match header.name.as_ref() {
            "Code" => Attribute::Code(CodeAttribute::decode(cp, offset)?),
            "LineNumberTable" => {
                Attribute::LineNumberTable(LineNumberTableAttribute::decode(cp, offset)?)
            }
            "LocalVariableTable" => {
                Attribute::LocalVariableTable(LocalVariableAttribute::decode(cp, offset)?)
            }
            "LocalVariableTypeTable" => {
                Attribute::LocalVariableTypeTable(LocalVariableTypeAttribute::decode(cp, offset)?)
            }
            "InnerClasses" => Attribute::InnerClasses(InnerClassesAttribute::decode(cp, offset)?),
            "StackMapTable" => {
                Attribute::StackMapTable(StackMapTableAttribute::decode(cp, offset)?)
            }
            "MethodParameters" => {
                Attribute::MethodParameters(MethodParametersAttribute::decode(cp, offset)?)
            }
            "RuntimeVisibleAnnotations" => Attribute::RuntimeVisibleAnnotations(
                RuntimeAnnotationsAttribute::decode(cp, offset)?,
            ),
            "RuntimeInvisibleAnnotations" => Attribute::RuntimeInvisibleAnnotations(
                RuntimeAnnotationsAttribute::decode(cp, offset)?,
            ),
            "RuntimeVisibleParameterAnnotations" => Attribute::RuntimeVisibleParameterAnnotations(
                ParameterAnnotationsAttribute::decode(cp, offset)?,
            ),
            "RuntimeInvisibleParameterAnnotations" => {
                Attribute::RuntimeInvisibleParameterAnnotations(
                    ParameterAnnotationsAttribute::decode(cp, offset)?,
                )
            }
            "AnnotationDefault" => {
                Attribute::AnnotationDefault(AnnotationDefaultAttribute::decode(cp, offset)?)
            }
            _ => Attribute::Other {
                name: header.name.clone(),
                info: header.info(cp)?,
            },
        };

        if let Some(consumed) = attribute.size_in_bytes() {
            if consumed != header.length as usize {
                warn!(
                    "attribute {} declares {} bytes but {consumed} were decoded",
                    header.name, header.length
                );
            }
        }

        Ok(attribute)
    }

    /// Bytes of `info` consumed while decoding.
    fn size_in_bytes(&self) -> Option<usize> {
        let size = match self {
            Attribute::Code(a) => a.size_in_bytes(),
            Attribute::LineNumberTable(a) => a.size_in_bytes(),
            Attribute::LocalVariableTable(a) => a.size_in_bytes(),
            Attribute::LocalVariableTypeTable(a) => a.size_in_bytes(),
            Attribute::InnerClasses(a) => a.size_in_bytes(),
            Attribute::StackMapTable(a) => a.size_in_bytes(),
            Attribute::MethodParameters(a) => a.size_in_bytes(),
            Attribute::RuntimeVisibleAnnotations(a) | Attribute::RuntimeInvisibleAnnotations(a) => {
                a.size_in_bytes()
            }
            Attribute::RuntimeVisibleParameterAnnotations(a)
            | Attribute::RuntimeInvisibleParameterAnnotations(a) => a.size_in_bytes(),
            Attribute::AnnotationDefault(a) => a.size_in_bytes(),
            Attribute::Other { .. } => return None,
        };

        Some(size)
    }
}
