//! The native type model.
//!
//! Every source value is eventually represented by one of these C-level
//! shapes. Types are finite trees; nothing refers back to itself.

use std::fmt;

/// Scalar C types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `int16_t`, the default for integer literals.
    Int,
    /// `int32_t`, for integers that do not fit in 16 bits.
    Long,
    Float,
    /// `uint8_t`
    Bool,
    /// `const char *`
    Str,
    Void,
    /// `void *`: nothing is known yet. Loses every merge.
    Pointer,
    /// `struct js_var`: incompatible evidence. Wins every merge.
    Boxed,
    /// A platform type forced by a plugin, spelled as given.
    Native(String),
}

impl Primitive {
    /// C spelling.
    pub fn c_name(&self) -> &str {
        match self {
            Primitive::Int => "int16_t",
            Primitive::Long => "int32_t",
            Primitive::Float => "float",
            Primitive::Bool => "uint8_t",
            Primitive::Str => "const char *",
            Primitive::Void => "void",
            Primitive::Pointer => "void *",
            Primitive::Boxed => "struct js_var",
            Primitive::Native(name) => name,
        }
    }

    /// Position in `int16_t < int32_t < float`.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            Primitive::Int => Some(0),
            Primitive::Long => Some(1),
            Primitive::Float => Some(2),
            _ => None,
        }
    }
}

/// `Array{element, capacity, dynamic}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    pub element: NativeType,
    /// Element count of the largest literal seen; meaningful for static
    /// arrays only.
    pub capacity: u32,
    /// Needs a growable heap representation.
    pub dynamic: bool,
}

/// A record with named fields, kept in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct StructType {
    /// C tag; empty until inference finalization names it.
    pub name: String,
    pub fields: Vec<(String, NativeType)>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&NativeType> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// Structural equality: the name and field order do not matter.
impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, ty)| other.field(name) == Some(ty))
    }
}

/// A native type.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeType {
    Primitive(Primitive),
    Array(Box<ArrayType>),
    /// String-keyed map with uniform values.
    Dict(Box<NativeType>),
    Struct(StructType),
}

impl NativeType {
    pub const INT: NativeType = NativeType::Primitive(Primitive::Int);
    pub const LONG: NativeType = NativeType::Primitive(Primitive::Long);
    pub const FLOAT: NativeType = NativeType::Primitive(Primitive::Float);
    pub const BOOL: NativeType = NativeType::Primitive(Primitive::Bool);
    pub const STR: NativeType = NativeType::Primitive(Primitive::Str);
    pub const VOID: NativeType = NativeType::Primitive(Primitive::Void);
    pub const POINTER: NativeType = NativeType::Primitive(Primitive::Pointer);
    pub const BOXED: NativeType = NativeType::Primitive(Primitive::Boxed);

    pub fn native(name: impl Into<String>) -> Self {
        NativeType::Primitive(Primitive::Native(name.into()))
    }

    pub fn array(element: NativeType, capacity: u32, dynamic: bool) -> Self {
        NativeType::Array(Box::new(ArrayType {
            element,
            capacity,
            dynamic,
        }))
    }

    pub fn dict(element: NativeType) -> Self {
        NativeType::Dict(Box::new(element))
    }

    /// Unnamed struct from `(field, type)` pairs.
    pub fn structure<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, NativeType)>,
        S: Into<String>,
    {
        NativeType::Struct(StructType {
            name: String::new(),
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        })
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            NativeType::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            NativeType::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            NativeType::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive()
            .is_some_and(|p| p.numeric_rank().is_some())
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Float))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Str))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Bool))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Void))
    }

    /// Nothing is known about the value (`void *`).
    pub fn is_unknown(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Pointer))
    }

    pub fn is_boxed(&self) -> bool {
        matches!(self, NativeType::Primitive(Primitive::Boxed))
    }

    pub fn is_dynamic_array(&self) -> bool {
        self.as_array().is_some_and(|a| a.dynamic)
    }

    pub fn is_static_array(&self) -> bool {
        self.as_array().is_some_and(|a| !a.dynamic)
    }

    pub fn is_dict(&self) -> bool {
        matches!(self, NativeType::Dict(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, NativeType::Struct(_))
    }

    /// Values of this type live on the heap and need an allocation.
    pub fn is_heap_container(&self) -> bool {
        self.is_dynamic_array() || self.is_dict() || self.is_struct()
    }

    /// Element type of arrays and dicts.
    pub fn element(&self) -> Option<&NativeType> {
        match self {
            NativeType::Array(a) => Some(&a.element),
            NativeType::Dict(e) => Some(e),
            _ => None,
        }
    }

    /// Every array at any depth becomes dynamic.
    #[must_use]
    pub fn dynamize(&self) -> NativeType {
        match self {
            NativeType::Array(a) => NativeType::array(a.element.dynamize(), a.capacity, true),
            NativeType::Dict(e) => NativeType::dict(e.dynamize()),
            NativeType::Struct(s) => NativeType::Struct(StructType {
                name: s.name.clone(),
                fields: s
                    .fields
                    .iter()
                    .map(|(n, t)| (n.clone(), t.dynamize()))
                    .collect(),
            }),
            NativeType::Primitive(_) => self.clone(),
        }
    }

    /// Does any struct appear in this type (at any depth)?
    pub fn contains_struct(&self) -> bool {
        match self {
            NativeType::Struct(_) => true,
            NativeType::Array(a) => a.element.contains_struct(),
            NativeType::Dict(e) => e.contains_struct(),
            NativeType::Primitive(_) => false,
        }
    }
}

impl From<Primitive> for NativeType {
    fn from(p: Primitive) -> Self {
        NativeType::Primitive(p)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Primitive(p) => f.write_str(p.c_name()),
            NativeType::Array(a) if a.dynamic => write!(f, "{}[]", a.element),
            NativeType::Array(a) => write!(f, "{}[{}]", a.element, a.capacity),
            NativeType::Dict(e) => write!(f, "{{ [key]: {e} }}"),
            NativeType::Struct(s) => {
                if !s.name.is_empty() {
                    write!(f, "struct {} ", s.name)?;
                }
                f.write_str("{ ")?;
                for (i, (name, ty)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                f.write_str(" }")
            }
        }
    }
}
