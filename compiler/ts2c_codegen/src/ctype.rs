//! C spelling of native types.
//!
//! Containers are always handled through pointers:
//!
//! | native type            | C type                      |
//! |------------------------|-----------------------------|
//! | dynamic `T[]`          | `struct array_<tag(T)> *`   |
//! | static `T[n]`          | `T name[n]` (declaration)   |
//! | `{ [key]: T }`         | `struct dict_<tag(T)> *`    |
//! | struct                 | `struct <name> *`           |

use ts2c_types::{NativeType, Primitive};

/// Name fragment identifying a type inside container struct names.
pub fn type_tag(ty: &NativeType) -> String {
    match ty {
        NativeType::Primitive(p) => match p {
            Primitive::Str => "string".to_string(),
            Primitive::Pointer => "pointer".to_string(),
            Primitive::Boxed => "js_var".to_string(),
            Primitive::Native(name) => name
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
            other => other.c_name().to_string(),
        },
        NativeType::Array(a) => format!("array_{}", type_tag(&a.element)),
        NativeType::Dict(e) => format!("dict_{}", type_tag(e)),
        NativeType::Struct(s) if s.name.is_empty() => "obj".to_string(),
        NativeType::Struct(s) => s.name.clone(),
    }
}

/// C type of a value of `ty`.
pub fn c_type(ty: &NativeType) -> String {
    match ty {
        NativeType::Primitive(p) => p.c_name().to_string(),
        NativeType::Array(a) if a.dynamic => format!("struct {} *", type_tag(ty)),
        NativeType::Array(a) => pointer_to(&c_type(&a.element)),
        NativeType::Dict(_) => format!("struct {} *", type_tag(ty)),
        NativeType::Struct(_) => format!("struct {} *", type_tag(ty)),
    }
}

/// C type of a temporary holding a fresh value of `ty`; string buffers are
/// writable.
pub fn temp_c_type(ty: &NativeType) -> String {
    if ty.is_str() {
        "char *".to_string()
    } else {
        c_type(ty)
    }
}

/// `T *` spelled without a doubled space.
pub fn pointer_to(c: &str) -> String {
    if c.ends_with('*') {
        format!("{c}*")
    } else {
        format!("{c} *")
    }
}

/// Declaration of `name` with type `ty`.
pub fn declaration(ty: &NativeType, name: &str) -> String {
    match ty {
        NativeType::Array(a) if !a.dynamic => {
            format!("{} {name}[{}]", c_type(&a.element), a.capacity.max(1))
        }
        _ => format!("{} {name}", c_type(ty)),
    }
}

/// Declaration with an initializer where C needs one: pointers start as
/// `NULL`.
pub fn local_declaration(ty: &NativeType, name: &str) -> String {
    if is_pointer(ty) {
        format!("{} = NULL;", declaration(ty, name))
    } else {
        format!("{};", declaration(ty, name))
    }
}

/// Values of `ty` are C pointers.
pub fn is_pointer(ty: &NativeType) -> bool {
    match ty {
        NativeType::Primitive(p) => matches!(p, Primitive::Str | Primitive::Pointer),
        NativeType::Array(a) => a.dynamic,
        NativeType::Dict(_) | NativeType::Struct(_) => true,
    }
}

/// The neutral value of `ty`, used for missing dictionary entries.
pub fn zero_value(ty: &NativeType) -> &'static str {
    if is_pointer(ty) {
        "NULL"
    } else {
        "0"
    }
}

/// `typeof` of a value of `ty`.
pub fn js_type_name(ty: &NativeType) -> &'static str {
    match ty {
        NativeType::Primitive(p) => match p {
            Primitive::Int | Primitive::Long | Primitive::Float => "number",
            Primitive::Bool => "boolean",
            Primitive::Str => "string",
            Primitive::Void => "undefined",
            Primitive::Pointer | Primitive::Boxed | Primitive::Native(_) => "object",
        },
        NativeType::Array(_) | NativeType::Dict(_) | NativeType::Struct(_) => "object",
    }
}

/// A C string literal with the contents `text`.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\{:03o}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// C spelling of a numeric literal written as `raw`.
pub fn number_literal(raw: &str, value: f64) -> String {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("0b") || lower.starts_with("0o") {
        format!("{value}")
    } else {
        raw.to_string()
    }
}
