use std::{fmt, sync::Arc};

use logos::Span;
use miette::{Diagnostic, SourceCode};
use thiserror::Error;

/// An error that may occur while parsing IDL source text.
#[derive(Error, Diagnostic)]
#[error("{}", kind)]
#[diagnostic(forward(kind))]
pub struct ParseError {
    kind: ParseErrorKind,
    #[related]
    related: Vec<ParseErrorKind>,
    #[source_code]
    source_code: Arc<dyn SourceCode>,
}

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub(crate) enum ParseErrorKind {
    #[error("invalid token")]
    InvalidToken {
        #[label("found here")]
        span: Span,
    },
    #[error("integer is too large")]
    IntegerOutOfRange {
        #[label("integer defined here")]
        span: Span,
    },
    #[error("unknown syntax '{syntax}'")]
    #[diagnostic(help("the only supported value is 'proto3'"))]
    UnknownSyntax {
        syntax: String,
        #[label("defined here")]
        span: Span,
    },
    #[error("multiple package names specified")]
    DuplicatePackage {
        #[label("defined here…")]
        first: Span,
        #[label("…and again here")]
        second: Span,
    },
    #[error("{kind} are not supported")]
    #[diagnostic(help(
        "this IDL dialect only allows messages, enums and singular, repeated or map fields"
    ))]
    Unsupported {
        kind: &'static str,
        #[label("found here")]
        span: Span,
    },
    #[error("field numbers must be between 1 and {}", crate::MAX_FIELD_NUMBER)]
    InvalidMessageNumber {
        #[label("defined here")]
        span: Span,
    },
    #[error("enum numbers must be between 0 and {}", i32::MAX)]
    InvalidEnumNumber {
        #[label("defined here")]
        span: Span,
    },
    #[error("expected {expected}, but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        #[label("found here")]
        span: Span,
    },
    #[error("expected {expected}, but reached end of file")]
    UnexpectedEof { expected: String },
}

/// An error that can occur when compiling an IDL file and method metadata
/// into OpenAPI definitions.
#[derive(Diagnostic, Error)]
#[error(transparent)]
#[diagnostic(transparent)]
pub struct Error {
    kind: Box<ErrorKind>,
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum ErrorKind {
    #[error("{}", err)]
    #[diagnostic(forward(err))]
    Parse { err: ParseError },
    #[error("failed to find a reference for named type '{name}' (searched {})", fmt_scopes(scopes))]
    #[diagnostic(help(
        "type references are resolved against the innermost enclosing scope first"
    ))]
    UnresolvedTypeName { name: String, scopes: Vec<String> },
    #[error("malformed schema identifier '{schema}'")]
    #[diagnostic(help("expected the form '<name>:<major>.<minor>.<patch>'"))]
    InvalidSchemaId { schema: String },
    #[error("metadata schema version {major}.{minor} is not supported")]
    #[diagnostic(help("the newest supported schema version is 0.6"))]
    UnsupportedSchemaVersion { major: u32, minor: u32 },
    #[error("unknown media type '{media_type}' declared for type '{type_name}'")]
    #[diagnostic(help(
        "recognized media types are 'application/vnd.google.protobuf', 'application/json', \
         'text/plain' and 'application/octet-stream'"
    ))]
    UnknownMediaType {
        media_type: String,
        type_name: String,
    },
}

fn fmt_scopes(scopes: &[String]) -> String {
    scopes
        .iter()
        .map(|scope| {
            if scope.is_empty() {
                "the global scope".to_owned()
            } else {
                format!("'{}'", scope)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseError {
    pub(crate) fn new(mut related: Vec<ParseErrorKind>, source: impl Into<String>) -> Self {
        debug_assert!(!related.is_empty());
        let kind = related.remove(0);
        ParseError {
            kind,
            related,
            source_code: Arc::new(source.into()),
        }
    }

    /// Override the source code for this error.
    ///
    /// This may be used to include the file name in the error.
    pub fn with_source_code<S>(self, source: S) -> Self
    where
        S: SourceCode + 'static,
    {
        ParseError {
            kind: self.kind,
            related: self.related,
            source_code: Arc::new(source),
        }
    }
}

impl fmt::Debug for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entry(&self.kind)
            .entries(&self.related)
            .finish()
    }
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Self {
        Error {
            kind: Box::new(kind),
        }
    }

    /// Returns true if this error is caused by invalid IDL source text.
    pub fn is_parse(&self) -> bool {
        matches!(&*self.kind, ErrorKind::Parse { .. })
    }

    /// Returns true if a type reference did not resolve in any enclosing scope.
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(&*self.kind, ErrorKind::UnresolvedTypeName { .. })
    }

    /// Returns true if the metadata schema version exceeds the supported ceiling.
    pub fn is_unsupported_schema(&self) -> bool {
        matches!(
            &*self.kind,
            ErrorKind::UnsupportedSchemaVersion { .. } | ErrorKind::InvalidSchemaId { .. }
        )
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::from_kind(ErrorKind::Parse { err })
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.kind {
            ErrorKind::Parse { err } => err.fmt(f),
            _ => write!(f, "{}", self),
        }
    }
}

#[test]
fn fmt_unresolved_scopes() {
    let err = Error::from_kind(ErrorKind::UnresolvedTypeName {
        name: "Bogus".to_owned(),
        scopes: vec!["Outer.Inner".to_owned(), "Outer".to_owned(), String::new()],
    });

    assert!(err.is_unresolved_reference());
    assert_eq!(
        format!("{}", err),
        "failed to find a reference for named type 'Bogus' \
         (searched 'Outer.Inner', 'Outer', the global scope)"
    );
}
