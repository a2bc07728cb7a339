use std::fmt;

/// The parse result: top-level definitions in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct File {
    pub definitions: Vec<Definition>,
}

/// A definition declared outside any message.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    Message(Message),
    Enum(Enum),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
}

/// An enumeration. Only the value names are retained; their numbers have no
/// counterpart in the generated schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    Singular(SingularField),
    Repeated(RepeatedField),
    Map(MapField),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SingularField {
    pub ty: Ty,
    pub name: String,
    pub number: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RepeatedField {
    pub ty: Ty,
    pub name: String,
    pub number: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapField {
    pub key_ty: KeyTy,
    pub ty: Ty,
    pub name: String,
    pub number: i32,
}

/// A field type: either a protobuf scalar or a (possibly dotted) reference to
/// a named message or enum.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Named(String),
}

/// Valid key types for a map field. Map keys are always scalar, so they never
/// need reference resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyTy {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
}

impl Field {
    pub fn name(&self) -> &str {
        match self {
            Field::Singular(field) => &field.name,
            Field::Repeated(field) => &field.name,
            Field::Map(field) => &field.name,
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            Field::Singular(field) => field.number,
            Field::Repeated(field) => field.number,
            Field::Map(field) => field.number,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Double => write!(f, "double"),
            Ty::Float => write!(f, "float"),
            Ty::Int32 => write!(f, "int32"),
            Ty::Int64 => write!(f, "int64"),
            Ty::Uint32 => write!(f, "uint32"),
            Ty::Uint64 => write!(f, "uint64"),
            Ty::Sint32 => write!(f, "sint32"),
            Ty::Sint64 => write!(f, "sint64"),
            Ty::Fixed32 => write!(f, "fixed32"),
            Ty::Fixed64 => write!(f, "fixed64"),
            Ty::Sfixed32 => write!(f, "sfixed32"),
            Ty::Sfixed64 => write!(f, "sfixed64"),
            Ty::Bool => write!(f, "bool"),
            Ty::String => write!(f, "string"),
            Ty::Bytes => write!(f, "bytes"),
            Ty::Named(name) => write!(f, "{}", name),
        }
    }
}
