use std::borrow::Cow;

use crate::{
    constant_pool::{tags, ConstantPoolEntry},
    ClassFileError, ConstantPool, Result,
};

/// Deepest nesting of arrays and annotations inside one element value.
pub const MAX_NESTING_DEPTH: usize = 256;

/// An `element_value`. Nested values make the structure self-describing:
/// every decode reports how many bytes it consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue<'a> {
    /// `B`, `C`, `D`, `F`, `I`, `J`, `S`, `Z` or `s`.
    Const {
        tag: char,
        const_value_index: u16,
        value: ConstantPoolEntry<'a>,
    },
    Enum {
        type_name_index: u16,
        type_name: Cow<'a, str>,
        const_name_index: u16,
        const_name: Cow<'a, str>,
    },
    Class {
        class_info_index: u16,
        /// A return descriptor, `V` for `void.class`.
        class_info: Cow<'a, str>,
    },
    Annotation(Box<Annotation<'a>>),
    Array(Vec<ElementValue<'a>>),
}
impl<'a> ElementValue<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<(Self, usize)> {
        Self::decode_nested(constant_pool, offset, 0)
    }

    fn decode_nested(
        constant_pool: &ConstantPool<'a>,
        offset: usize,
        depth: usize,
    ) -> Result<(Self, usize)> {
        if depth > MAX_NESTING_DEPTH {
            return Err(ClassFileError::ElementValueTooDeep {
                offset,
                limit: MAX_NESTING_DEPTH,
            });
        }
        let r = constant_pool.reader();
        let tag = r.u1(0, offset)? as char;

        let decoded = match tag {
            'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' => {
                let const_value_index = r.u2(1, offset)?;
                let value = const_value(constant_pool, tag, const_value_index)?;
                (
                    ElementValue::Const {
                        tag,
                        const_value_index,
                        value,
                    },
                    3,
                )
            }
            'e' => {
                let type_name_index = r.u2(1, offset)?;
                let const_name_index = r.u2(3, offset)?;
                (
                    ElementValue::Enum {
                        type_name_index,
                        type_name: constant_pool.utf8(type_name_index)?,
                        const_name_index,
                        const_name: constant_pool.utf8(const_name_index)?,
                    },
                    5,
                )
            }
            'c' => {
                let class_info_index = r.u2(1, offset)?;
                (
                    ElementValue::Class {
                        class_info_index,
                        class_info: constant_pool.utf8(class_info_index)?,
                    },
                    3,
                )
            }
            '@' => {
                let (annotation, size) =
                    Annotation::decode_nested(constant_pool, offset + 1, depth + 1)?;
                (ElementValue::Annotation(Box::new(annotation)), 1 + size)
            }
            '[' => {
                let count = r.u2(1, offset)?;
                let mut consumed = 3;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let (value, size) =
                        Self::decode_nested(constant_pool, offset + consumed, depth + 1)?;
                    consumed += size;
                    values.push(value);
                }
                (ElementValue::Array(values), consumed)
            }
            tag => return Err(ClassFileError::InvalidElementValueTag(tag)),
        };

        Ok(decoded)
    }
}

/// The constant behind a `Const` element value, checked against the kind its
/// tag calls for.
fn const_value<'a>(
    constant_pool: &ConstantPool<'a>,
    tag: char,
    index: u16,
) -> Result<ConstantPoolEntry<'a>> {
    let (expected_tag, expected) = match tag {
        'D' => (tags::DOUBLE, "Double"),
        'F' => (tags::FLOAT, "Float"),
        'J' => (tags::LONG, "Long"),
        's' => (tags::UTF8, "Utf8"),
        _ => (tags::INTEGER, "Integer"),
    };

    match constant_pool.tag(index)? {
        found if found == expected_tag => constant_pool.entry(index),
        found => Err(ClassFileError::InvalidConstantPoolEntry {
            index,
            expected,
            found,
        }),
    }
}

/// An `element_value_pair` of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationComponent<'a> {
    pub name_index: u16,
    pub name: Cow<'a, str>,
    pub value: ElementValue<'a>,
}
impl<'a> AnnotationComponent<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<(Self, usize)> {
        Self::decode_nested(constant_pool, offset, 0)
    }

    fn decode_nested(
        constant_pool: &ConstantPool<'a>,
        offset: usize,
        depth: usize,
    ) -> Result<(Self, usize)> {
        let name_index = constant_pool.reader().u2(0, offset)?;
        let name = constant_pool.utf8(name_index)?;
        let (value, size) = ElementValue::decode_nested(constant_pool, offset + 2, depth)?;

        Ok((
            Self {
                name_index,
                name,
                value,
            },
            2 + size,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<'a> {
    pub type_index: u16,
    /// Field descriptor of the annotation interface.
    pub type_name: Cow<'a, str>,
    pub components: Vec<AnnotationComponent<'a>>,
}
impl<'a> Annotation<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<(Self, usize)> {
        Self::decode_nested(constant_pool, offset, 0)
    }

    fn decode_nested(
        constant_pool: &ConstantPool<'a>,
        offset: usize,
        depth: usize,
    ) -> Result<(Self, usize)> {
        let r = constant_pool.reader();
        let type_index = r.u2(0, offset)?;
        let type_name = constant_pool.utf8(type_index)?;
        let count = r.u2(2, offset)?;

        let mut consumed = 4;
        let mut components = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (component, size) =
                AnnotationComponent::decode_nested(constant_pool, offset + consumed, depth)?;
            consumed += size;
            components.push(component);
        }

        Ok((
            Self {
                type_index,
                type_name,
                components,
            },
            consumed,
        ))
    }
}

/// Decodes `count` annotations starting at `offset`.
fn decode_annotations<'a>(
    constant_pool: &ConstantPool<'a>,
    offset: usize,
    count: usize,
) -> Result<(Vec<Annotation<'a>>, usize)> {
    let mut cursor = offset;
    let mut annotations = Vec::with_capacity(count);
    for _ in 0..count {
        let (annotation, size) = Annotation::decode(constant_pool, cursor)?;
        cursor += size;
        annotations.push(annotation);
    }

    Ok((annotations, cursor - offset))
}

/// `RuntimeVisibleAnnotations` and `RuntimeInvisibleAnnotations`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuntimeAnnotationsAttribute<'a> {
    pub annotations: Vec<Annotation<'a>>,
    size: usize,
}
impl<'a> RuntimeAnnotationsAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let count = constant_pool.reader().u2(0, offset)? as usize;
        let (annotations, size) = decode_annotations(constant_pool, offset + 2, count)?;

        Ok(Self {
            annotations,
            size: 2 + size,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size
    }
}

/// `RuntimeVisibleParameterAnnotations` and
/// `RuntimeInvisibleParameterAnnotations`, one list per parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterAnnotationsAttribute<'a> {
    pub parameters: Vec<Vec<Annotation<'a>>>,
    size: usize,
}
impl<'a> ParameterAnnotationsAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let r = constant_pool.reader();
        let count = r.u1(0, offset)?;

        let mut cursor = offset + 1;
        let mut parameters = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let annotations_count = r.u2(0, cursor)? as usize;
            let (annotations, size) =
                decode_annotations(constant_pool, cursor + 2, annotations_count)?;
            cursor += 2 + size;
            parameters.push(annotations);
        }

        Ok(Self {
            parameters,
            size: cursor - offset,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDefaultAttribute<'a> {
    pub default_value: ElementValue<'a>,
    size: usize,
}
impl<'a> AnnotationDefaultAttribute<'a> {
    pub fn decode(constant_pool: &ConstantPool<'a>, offset: usize) -> Result<Self> {
        let (default_value, size) = ElementValue::decode(constant_pool, offset)?;
        Ok(Self {
            default_value,
            size,
        })
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size
    }
}
