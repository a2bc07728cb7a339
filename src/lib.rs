//! Compilation of a constrained protobuf IDL dialect and model method
//! metadata into OpenAPI (Swagger 2.0) schema definitions.
//!
//! The IDL dialect covers messages, enums, nested messages and enums, and
//! singular, repeated and map fields with protobuf scalar types. Method
//! metadata declares, per method, the input and output payload types and the
//! media types they accept. [`compile()`] turns both into a flat mapping of
//! prefixed definition names to Schema Objects, together with normalized
//! per-method descriptors, ready to be merged into an OpenAPI document
//! template by an external renderer.
//!
//! See the documentation for [`compile()`] for an example.
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod ast;

mod error;
mod generate;
mod lex;
mod metadata;
mod parse;
mod resolve;

use indexmap::IndexMap;
use serde::Serialize;

pub use crate::{
    error::{Error, ParseError},
    generate::Schema,
    metadata::{Metadata, Method, MethodDecl, Port, PortDecl, PortType},
};

/// Media type of binary protobuf payloads.
pub const PROTOBUF_MEDIA_TYPE: &str = "application/vnd.google.protobuf";
/// Media type of JSON payloads.
pub const JSON_MEDIA_TYPE: &str = "application/json";
/// Media type of plain-text payloads.
pub const TEXT_MEDIA_TYPE: &str = "text/plain";
/// Media type of raw binary payloads.
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// Namespace prefix applied to every definition name, so that IDL-derived
/// schema names cannot collide with names introduced at the method level.
pub const DEFINITION_PREFIX: &str = "Model";

pub(crate) const MAX_FIELD_NUMBER: i32 = 536_870_911;

/// The compiled output: everything the document renderer needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpenApi {
    /// The `definitions` section: prefixed name to Schema Object, IDL-derived
    /// definitions first, then raw method payload types.
    pub definitions: IndexMap<String, Schema>,
    /// Reconciled method descriptors in declaration order.
    pub methods: Vec<Method>,
    /// The version directory of document templates to render against.
    pub template_version: String,
}

/// Parses IDL source text into its abstract syntax tree.
///
/// This function only checks the syntax of the source; type references are
/// resolved later, during [`compile()`].
///
/// # Examples
///
/// ```
/// # use protoas::{ast, parse};
/// #
/// let file = parse("message Empty {}").unwrap();
/// assert_eq!(file, ast::File {
///     definitions: vec![ast::Definition::Message(ast::Message {
///         name: "Empty".to_owned(),
///         ..Default::default()
///     })],
/// });
/// ```
pub fn parse(source: &str) -> Result<ast::File, ParseError> {
    parse::parse_file(source).map_err(|errors| ParseError::new(errors, source))
}

/// Compiles IDL source text and model metadata into OpenAPI definitions and
/// normalized method descriptors.
///
/// Compilation is a pure, single-pass operation: it performs no I/O and
/// yields identical output for identical input.
///
/// # Examples
///
/// ```
/// # use serde_json::json;
/// #
/// let source = "
///     message AddIn {
///         double x = 1;
///         double y = 2;
///     }
///     message AddOut {
///         double value = 1;
///     }
/// ";
/// let metadata: protoas::Metadata = serde_json::from_value(json!({
///     "schema": "acumos.schema.model:0.6.0",
///     "methods": {
///         "add": {
///             "input": {
///                 "name": "AddIn",
///                 "media_type": ["application/vnd.google.protobuf"]
///             },
///             "output": {
///                 "name": "AddOut",
///                 "media_type": ["application/vnd.google.protobuf"]
///             }
///         }
///     }
/// }))
/// .unwrap();
///
/// let oas = protoas::compile(source, &metadata).unwrap();
/// assert!(oas.definitions.contains_key("Model.AddIn"));
/// assert_eq!(oas.methods[0].input.name, "Model.AddIn");
/// assert_eq!(oas.template_version, "0.6.0");
/// ```
pub fn compile(source: &str, metadata: &Metadata) -> Result<OpenApi, Error> {
    let (methods, template_version) = metadata::reconcile(metadata).map_err(Error::from_kind)?;

    let file = parse(source)?;
    let refs = resolve::build_refs(&file);

    let mut definitions = generate::definitions(&file, &refs).map_err(Error::from_kind)?;
    for (name, schema) in generate::raw_definitions(&methods).map_err(Error::from_kind)? {
        // IDL-derived definitions win name clashes with raw types.
        definitions.entry(name).or_insert(schema);
    }

    tracing::debug!(
        definitions = definitions.len(),
        methods = methods.len(),
        "compiled OpenAPI definitions",
    );

    Ok(OpenApi {
        definitions,
        methods,
        template_version,
    })
}

pub(crate) fn prefix_name(name: &str) -> String {
    format!("{}.{}", DEFINITION_PREFIX, name)
}
