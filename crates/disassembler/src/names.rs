use jdis_class_file::descriptor::{ArrayType, FieldType, MethodDescriptor};

use crate::Result;

/// Renders an internal class name (`java/lang/String`) for display.
///
/// Compact names keep only what follows the last `/` or `.`.
pub fn class_name(name: &str, compact: bool) -> String {
    if compact {
        match name.rfind(|c| c == '/' || c == '.') {
            Some(separator) => name[separator + 1..].to_owned(),
            None => name.to_owned(),
        }
    } else {
        name.replace('/', ".")
    }
}

/// The operand of `new`, `checkcast` and friends: either a plain class name
/// or, for array classes, a field descriptor.
pub fn class_reference(name: &str, compact: bool) -> Result<String> {
    if name.is_empty() {
        Ok("\"\"".to_owned())
    } else if name.starts_with('[') {
        type_signature(name, compact)
    } else {
        Ok(class_name(name, compact))
    }
}

pub fn field_type(field_type: &FieldType, compact: bool) -> String {
    match field_type {
        FieldType::Byte => "byte".to_owned(),
        FieldType::Char => "char".to_owned(),
        FieldType::Double => "double".to_owned(),
        FieldType::Float => "float".to_owned(),
        FieldType::Int => "int".to_owned(),
        FieldType::Long => "long".to_owned(),
        FieldType::Short => "short".to_owned(),
        FieldType::Boolean => "boolean".to_owned(),
        FieldType::Object(name) => class_name(name, compact),
        FieldType::Array(dimensions, element) => {
            element_type(element, compact) + &"[]".repeat(*dimensions as usize)
        }
    }
}

fn element_type(element: &ArrayType, compact: bool) -> String {
    match element {
        ArrayType::Object(name) => class_name(name, compact),
        primitive => field_type(&FieldType::from(primitive.clone()), compact),
    }
}

/// A field descriptor as a source type, `[Ljava/lang/String;` becoming
/// `java.lang.String[]`.
pub fn type_signature(descriptor: &str, compact: bool) -> Result<String> {
    Ok(field_type(&FieldType::parse(descriptor)?, compact))
}

fn parameter_list(descriptor: &MethodDescriptor, compact: bool) -> String {
    let parameters = descriptor
        .parameters
        .iter()
        .map(|p| field_type(p, compact))
        .collect::<Vec<_>>();

    format!("({})", parameters.join(", "))
}

/// `(int, float) : void`
pub fn method_signature(descriptor: &str, compact: bool) -> Result<String> {
    let descriptor = MethodDescriptor::parse(descriptor)?;
    let return_type = match &descriptor.return_type {
        Some(return_type) => field_type(return_type, compact),
        None => "void".to_owned(),
    };

    Ok(format!(
        "{} : {return_type}",
        parameter_list(&descriptor, compact)
    ))
}

/// `(int)`; constructors have no return type worth showing.
pub fn constructor_signature(descriptor: &str, compact: bool) -> Result<String> {
    Ok(parameter_list(&MethodDescriptor::parse(descriptor)?, compact))
}

/// Escapes a string constant the way it would be written in Java source.
pub fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{8}' => escaped.push_str("\\b"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\u{c}' => escaped.push_str("\\f"),
            '\r' => escaped.push_str("\\r"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }

    escaped
}

pub fn java_float(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f32::INFINITY {
        "Infinity".to_owned()
    } else if value == f32::NEG_INFINITY {
        "-Infinity".to_owned()
    } else {
        format!("{value:?}")
    }
}

pub fn java_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "Infinity".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else {
        format!("{value:?}")
    }
}

/// `reference_kind` of a `CONSTANT_MethodHandle`.
pub fn reference_kind(kind: u8) -> Option<&'static str> {
    let name = match kind {
        1 => "REF_getField",
        2 => "REF_getStatic",
        3 => "REF_putField",
        4 => "REF_putStatic",
        5 => "REF_invokeVirtual",
        6 => "REF_invokeStatic",
        7 => "REF_invokeSpecial",
        8 => "REF_newInvokeSpecial",
        9 => "REF_invokeInterface",
        _ => return None,
    };

    Some(name)
}

#[cfg(test)]
mod names_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_should_render_class_names() {
        assert_eq!(class_name("java/lang/String", false), "java.lang.String");
        assert_eq!(class_name("java/lang/String", true), "String");
        assert_eq!(class_name("Top", true), "Top");
        assert_eq!(class_name("a.b.C", true), "C");
    }

    #[test]
    fn it_should_render_class_references() {
        assert_eq!(class_reference("", false).unwrap(), "\"\"");
        assert_eq!(
            class_reference("[[Ljava/lang/Object;", false).unwrap(),
            "java.lang.Object[][]"
        );
        assert_eq!(class_reference("[I", true).unwrap(), "int[]");
        assert_eq!(class_reference("my/Type", true).unwrap(), "Type");
    }

    #[test]
    fn it_should_render_deep_arrays() {
        let descriptor = format!("{}J", "[".repeat(255));

        assert_eq!(
            type_signature(&descriptor, false).unwrap(),
            format!("long{}", "[]".repeat(255))
        );
        assert!(class_reference(&format!("[{descriptor}"), false).is_err());
    }

    #[test]
    fn it_should_render_method_signatures() {
        assert_eq!(method_signature("(IF)V", false).unwrap(), "(int, float) : void");
        assert_eq!(
            method_signature("()Ljava/lang/String;", false).unwrap(),
            "() : java.lang.String"
        );
        assert_eq!(
            method_signature("([Ljava/lang/String;J)[D", true).unwrap(),
            "(String[], long) : double[]"
        );
        assert_eq!(constructor_signature("(I)V", false).unwrap(), "(int)");
        assert!(method_signature("(I", false).is_err());
    }

    #[test]
    fn it_should_escape_strings() {
        assert_eq!(escape_string("a\"b\\c\n\t"), "a\\\"b\\\\c\\n\\t");
        assert_eq!(escape_string("\u{1}"), "\\u0001");
        assert_eq!(escape_string("plain é"), "plain é");
    }

    #[test]
    fn it_should_render_floating_point_values() {
        assert_eq!(java_float(1.5), "1.5");
        assert_eq!(java_float(0.1), "0.1");
        assert_eq!(java_float(f32::NAN), "NaN");
        assert_eq!(java_double(2.0), "2.0");
        assert_eq!(java_double(f64::NEG_INFINITY), "-Infinity");
    }
}
