use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::ErrorKind, prefix_name, JSON_MEDIA_TYPE, PROTOBUF_MEDIA_TYPE,
};

/// The version directory of document templates that all supported metadata
/// schemas render against.
pub(crate) const TEMPLATE_VERSION: &str = "0.6.0";

const MAX_SCHEMA_VERSION: (u32, u32) = (0, 6);

/// Model metadata, as deserialized from a `metadata.json` document. Fields
/// not needed for schema generation are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Metadata {
    /// Schema identifier of the form `<name>:<major>.<minor>.<patch>`.
    pub schema: String,
    /// Method declarations, keyed by method name in document order.
    pub methods: IndexMap<String, MethodDecl>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MethodDecl {
    pub input: PortDecl,
    pub output: PortDecl,
    #[serde(default)]
    pub description: Option<String>,
}

/// A method input or output as declared in the metadata. Schemas older than
/// 0.6 declare a bare type name; 0.6 declares the type name together with its
/// accepted media types.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum PortDecl {
    Name(String),
    Typed(PortType),
}

#[derive(Clone, Debug, Deserialize)]
pub struct PortType {
    pub name: String,
    pub media_type: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A reconciled method descriptor, ready to be merged into a document
/// template by the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub input: Port,
    pub output: Port,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Port {
    /// The prefixed schema name of the payload type.
    pub name: String,
    pub media_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Normalizes method declarations across the supported metadata schema
/// versions into the canonical descriptor shape, and selects the template
/// version to render against.
pub(crate) fn reconcile(metadata: &Metadata) -> Result<(Vec<Method>, String), ErrorKind> {
    let (major, minor, _) = parse_schema_version(&metadata.schema)?;
    if (major, minor) > MAX_SCHEMA_VERSION {
        return Err(ErrorKind::UnsupportedSchemaVersion { major, minor });
    }

    let methods = metadata
        .methods
        .iter()
        .map(|(name, decl)| Method {
            name: name.clone(),
            input: reconcile_port(&decl.input),
            output: reconcile_port(&decl.output),
            description: decl.description.clone(),
        })
        .collect();

    Ok((methods, TEMPLATE_VERSION.to_owned()))
}

fn reconcile_port(decl: &PortDecl) -> Port {
    match decl {
        // Pre-0.6 schemas implicitly accept both JSON and protobuf transport
        // for every method.
        PortDecl::Name(name) => Port {
            name: prefix_name(name),
            media_type: both_media_types(),
            description: None,
            metadata: None,
        },
        PortDecl::Typed(ty) => Port {
            name: prefix_name(&ty.name),
            // Protobuf-capable methods are always also JSON-capable.
            media_type: if ty.media_type.iter().any(|m| m == PROTOBUF_MEDIA_TYPE) {
                both_media_types()
            } else {
                ty.media_type.clone()
            },
            description: ty.description.clone(),
            metadata: ty.metadata.clone(),
        },
    }
}

fn both_media_types() -> Vec<String> {
    vec![JSON_MEDIA_TYPE.to_owned(), PROTOBUF_MEDIA_TYPE.to_owned()]
}

fn parse_schema_version(schema: &str) -> Result<(u32, u32, u32), ErrorKind> {
    let invalid = || ErrorKind::InvalidSchemaId {
        schema: schema.to_owned(),
    };

    let (_, version) = schema.split_once(':').ok_or_else(invalid)?;
    match version
        .splitn(3, '.')
        .map(|part| part.parse().map_err(|_| invalid()))
        .collect::<Result<Vec<u32>, _>>()?
        .as_slice()
    {
        &[major, minor, patch] => Ok((major, minor, patch)),
        _ => Err(invalid()),
    }
}
