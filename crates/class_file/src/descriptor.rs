use std::{fmt, str::Chars};

use crate::{ClassFileError, Result};

/// Most array dimensions a descriptor may have.
pub const MAX_ARRAY_DIMENSIONS: u8 = 255;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Object(String),
    Short,
    Boolean,
    /// Dimensions (at least one) and the element type.
    Array(u8, ArrayType),
}
impl FieldType {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars();
        let field_type = parse_field_type(&mut chars, descriptor)?;
        match chars.next() {
            None => Ok(field_type),
            Some(_) => Err(invalid(descriptor)),
        }
    }

    /// Long and double occupy two local variable slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, FieldType::Long | FieldType::Double)
    }

    pub fn slot_width(&self) -> u8 {
        if self.is_wide() {
            2
        } else {
            1
        }
    }
}
impl From<ArrayType> for FieldType {
    fn from(element: ArrayType) -> Self {
        match element {
            ArrayType::Byte => FieldType::Byte,
            ArrayType::Char => FieldType::Char,
            ArrayType::Double => FieldType::Double,
            ArrayType::Float => FieldType::Float,
            ArrayType::Int => FieldType::Int,
            ArrayType::Long => FieldType::Long,
            ArrayType::Object(name) => FieldType::Object(name),
            ArrayType::Short => FieldType::Short,
            ArrayType::Boolean => FieldType::Boolean,
        }
    }
}

impl fmt::Display for FieldType {
    /// Writes the type back in descriptor form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Byte => f.write_str("B"),
            FieldType::Char => f.write_str("C"),
            FieldType::Double => f.write_str("D"),
            FieldType::Float => f.write_str("F"),
            FieldType::Int => f.write_str("I"),
            FieldType::Long => f.write_str("J"),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Short => f.write_str("S"),
            FieldType::Boolean => f.write_str("Z"),
            FieldType::Array(dimensions, element) => {
                for _ in 0..*dimensions {
                    f.write_str("[")?;
                }
                write!(f, "{element}")
            }
        }
    }
}

/// The element type of an array: any field type except another array.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ArrayType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Object(String),
    Short,
    Boolean,
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayType::Byte => f.write_str("B"),
            ArrayType::Char => f.write_str("C"),
            ArrayType::Double => f.write_str("D"),
            ArrayType::Float => f.write_str("F"),
            ArrayType::Int => f.write_str("I"),
            ArrayType::Long => f.write_str("J"),
            ArrayType::Object(name) => write!(f, "L{name};"),
            ArrayType::Short => f.write_str("S"),
            ArrayType::Boolean => f.write_str("Z"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}
impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut chars = descriptor.chars();
        if chars.next() != Some('(') {
            return Err(invalid(descriptor));
        }

        let mut parameters = Vec::new();
        loop {
            let mut lookahead = chars.clone();
            match lookahead.next() {
                Some(')') => {
                    chars = lookahead;
                    break;
                }
                Some(_) => parameters.push(parse_field_type(&mut chars, descriptor)?),
                None => return Err(invalid(descriptor)),
            }
        }

        let return_type = match chars.as_str() {
            "V" => None,
            rest => Some(FieldType::parse(rest).map_err(|_| invalid(descriptor))?),
        };

        Ok(Self {
            parameters,
            return_type,
        })
    }

    /// Local variable slots taken by each parameter, in declaration order.
    pub fn parameter_slot_widths(&self) -> Vec<u8> {
        self.parameters.iter().map(FieldType::slot_width).collect()
    }
}

fn invalid(descriptor: &str) -> ClassFileError {
    ClassFileError::InvalidDescriptor(descriptor.to_owned())
}

fn parse_field_type(chars: &mut Chars, descriptor: &str) -> Result<FieldType> {
    let mut dimensions = 0u8;
    while chars.as_str().starts_with('[') {
        if dimensions == MAX_ARRAY_DIMENSIONS {
            return Err(invalid(descriptor));
        }
        chars.next();
        dimensions += 1;
    }

    let element = parse_element_type(chars, descriptor)?;
    if dimensions == 0 {
        Ok(element.into())
    } else {
        Ok(FieldType::Array(dimensions, element))
    }
}

fn parse_element_type(chars: &mut Chars, descriptor: &str) -> Result<ArrayType> {
    let element = match chars.next().ok_or_else(|| invalid(descriptor))? {
        'B' => ArrayType::Byte,
        'C' => ArrayType::Char,
        'D' => ArrayType::Double,
        'F' => ArrayType::Float,
        'I' => ArrayType::Int,
        'J' => ArrayType::Long,
        'S' => ArrayType::Short,
        'Z' => ArrayType::Boolean,
        'L' => {
            let rest = chars.as_str();
            let end = rest.find(';').ok_or_else(|| invalid(descriptor))?;
            if end == 0 {
                return Err(invalid(descriptor));
            }
            let name = rest[..end].to_owned();
            *chars = rest[end + 1..].chars();
            ArrayType::Object(name)
        }
        _ => return Err(invalid(descriptor)),
    };

    Ok(element)
}
