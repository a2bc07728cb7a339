
use indexmap::{map::Entry, IndexMap};
use serde::Serialize;

use crate::{
    ast::{Definition, Enum, Field, File, Message, Ty},
    error::ErrorKind,
    metadata::{Method, Port},
    prefix_name,
    resolve::{self, NameSet},
    JSON_MEDIA_TYPE, OCTET_STREAM_MEDIA_TYPE, PROTOBUF_MEDIA_TYPE, TEXT_MEDIA_TYPE,
};

const INT64_NOTE: &str =
    "Note: 64-bit integers are string-encoded when using application/json";

/// An OpenAPI (Swagger 2.0) Schema Object. Members that are `None` are
/// omitted when serializing.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(rename = "x-metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Synthesizes prefixed OpenAPI definitions for every message and enum in the
/// file, hoisting nested declarations into the flat definitions mapping.
pub(crate) fn definitions(
    file: &File,
    refs: &NameSet,
) -> Result<IndexMap<String, Schema>, ErrorKind> {
    let mut defs = IndexMap::new();
    let mut scope = Vec::new();
    for definition in &file.definitions {
        match definition {
            Definition::Message(message) => {
                message_definitions(message, refs, &mut scope, &mut defs)?
            }
            Definition::Enum(enum_) => insert_enum_definition(enum_, &scope, &mut defs),
        }
    }
    Ok(defs)
}

fn message_definitions(
    message: &Message,
    refs: &NameSet,
    scope: &mut Vec<String>,
    defs: &mut IndexMap<String, Schema>,
) -> Result<(), ErrorKind> {
    scope.push(message.name.clone());

    for enum_ in &message.enums {
        insert_enum_definition(enum_, scope, defs);
    }
    for nested in &message.messages {
        message_definitions(nested, refs, scope, defs)?;
    }

    let mut schema = Schema {
        ty: Some("object".to_owned()),
        ..Default::default()
    };

    // Swagger 2.0 forbids an empty `required` array, so zero-field messages
    // carry neither `properties` nor `required`.
    if !message.fields.is_empty() {
        let mut properties = IndexMap::new();
        for field in &message.fields {
            properties.insert(field.name().to_owned(), field_schema(field, refs, scope)?);
        }
        let mut required: Vec<String> = properties.keys().cloned().collect();
        required.sort();
        schema.properties = Some(properties);
        schema.required = Some(required);
    }

    defs.insert(prefix_name(&scope.join(".")), schema);
    scope.pop();
    Ok(())
}

fn insert_enum_definition(enum_: &Enum, scope: &[String], defs: &mut IndexMap<String, Schema>) {
    let mut name = scope.join(".");
    if !name.is_empty() {
        name.push('.');
    }
    name.push_str(&enum_.name);

    defs.insert(
        prefix_name(&name),
        Schema {
            ty: Some("string".to_owned()),
            values: Some(enum_.values.clone()),
            ..Default::default()
        },
    );
}

fn field_schema(field: &Field, refs: &NameSet, scope: &[String]) -> Result<Schema, ErrorKind> {
    match field {
        Field::Map(map) => Ok(Schema {
            ty: Some("object".to_owned()),
            additional_properties: Some(Box::new(type_schema(&map.ty, refs, scope)?)),
            ..Default::default()
        }),
        Field::Repeated(repeated) => Ok(Schema {
            ty: Some("array".to_owned()),
            items: Some(Box::new(type_schema(&repeated.ty, refs, scope)?)),
            ..Default::default()
        }),
        Field::Singular(field) => type_schema(&field.ty, refs, scope),
    }
}

fn type_schema(ty: &Ty, refs: &NameSet, scope: &[String]) -> Result<Schema, ErrorKind> {
    let schema = match ty {
        Ty::Double => scalar("number", Some("double"), None),
        Ty::Float => scalar("number", Some("float"), None),
        Ty::Int32 | Ty::Uint32 | Ty::Sint32 | Ty::Fixed32 | Ty::Sfixed32 => {
            scalar("integer", Some("int32"), None)
        }
        Ty::Int64 | Ty::Uint64 | Ty::Sint64 | Ty::Fixed64 | Ty::Sfixed64 => {
            scalar("integer", Some("int64"), Some(INT64_NOTE))
        }
        Ty::Bool => scalar("boolean", None, None),
        Ty::String => scalar("string", None, None),
        Ty::Bytes => scalar("string", Some("byte"), None),
        Ty::Named(name) => {
            let qualified = resolve::resolve(name, refs, scope)?;
            Schema {
                reference: Some(format!("#/definitions/{}", prefix_name(&qualified.to_string()))),
                ..Default::default()
            }
        }
    };
    Ok(schema)
}

fn scalar(
    ty: &'static str,
    format: Option<&'static str>,
    description: Option<&'static str>,
) -> Schema {
    Schema {
        ty: Some(ty.to_owned()),
        format: format.map(str::to_owned),
        description: description.map(str::to_owned),
        ..Default::default()
    }
}

/// Synthesizes definitions for method payload types that are not transported
/// as protobuf. The first declaration of a raw type name wins; later
/// declarations of the same name are skipped.
pub(crate) fn raw_definitions(
    methods: &[Method],
) -> Result<IndexMap<String, Schema>, ErrorKind> {
    let mut defs = IndexMap::new();
    for method in methods {
        for port in [&method.input, &method.output] {
            if let Some(schema) = raw_schema(port)? {
                match defs.entry(port.name.clone()) {
                    Entry::Occupied(existing) => {
                        if *existing.get() != schema {
                            tracing::warn!(
                                name = %port.name,
                                method = %method.name,
                                "conflicting definitions for raw type, keeping the first",
                            );
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(schema);
                    }
                }
            }
        }
    }
    Ok(defs)
}

fn raw_schema(port: &Port) -> Result<Option<Schema>, ErrorKind> {
    // Protobuf-capable ports are covered by the IDL-derived definitions.
    if port.media_type.iter().any(|m| m == PROTOBUF_MEDIA_TYPE) {
        return Ok(None);
    }

    let mut schema = match port.media_type.first().map(String::as_str) {
        Some(JSON_MEDIA_TYPE) => scalar("object", None, None),
        Some(TEXT_MEDIA_TYPE) => scalar("string", None, None),
        Some(OCTET_STREAM_MEDIA_TYPE) => scalar("string", Some("binary"), None),
        Some(other) => {
            return Err(ErrorKind::UnknownMediaType {
                media_type: other.to_owned(),
                type_name: port.name.clone(),
            })
        }
        None => return Ok(None),
    };

    schema.description = Some(port.description.clone().unwrap_or_default());
    schema.metadata = port.metadata.clone();
    Ok(Some(schema))
}
