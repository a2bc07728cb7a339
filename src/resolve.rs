use std::{collections::HashSet, fmt};

use crate::{
    ast::{Definition, Enum, File, Message},
    error::ErrorKind,
};

/// The full path of a message or enum from the global scope, e.g.
/// `(Outer, Inner)` for a message `Inner` nested in `Outer`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedName(Vec<String>);

pub(crate) type NameSet = HashSet<QualifiedName>;

/// Enumerates every message and enum reachable in the file, at every nesting
/// depth, keyed by its full path.
pub(crate) fn build_refs(file: &File) -> NameSet {
    let mut refs = NameSet::new();
    for definition in &file.definitions {
        match definition {
            Definition::Message(message) => add_message_refs(message, &[], &mut refs),
            Definition::Enum(enum_) => add_enum_ref(enum_, &[], &mut refs),
        }
    }
    refs
}

fn add_message_refs(message: &Message, scope: &[String], refs: &mut NameSet) {
    refs.insert(QualifiedName::new(scope, &message.name));

    let child_scope = join_scope(scope, &message.name);
    for enum_ in &message.enums {
        add_enum_ref(enum_, &child_scope, refs);
    }
    for nested in &message.messages {
        add_message_refs(nested, &child_scope, refs);
    }
}

fn add_enum_ref(enum_: &Enum, scope: &[String], refs: &mut NameSet) {
    refs.insert(QualifiedName::new(scope, &enum_.name));
}

/// Resolves a (possibly dotted) type reference against the set of known
/// names, searching the innermost enclosing scope first and widening one
/// segment at a time out to the global scope. A type nested in the current
/// scope therefore shadows a global type of the same name.
pub(crate) fn resolve(
    type_name: &str,
    refs: &NameSet,
    scope: &[String],
) -> Result<QualifiedName, ErrorKind> {
    let segments: Vec<String> = type_name.split('.').map(str::to_owned).collect();

    for len in (0..=scope.len()).rev() {
        let mut candidate = scope[..len].to_vec();
        candidate.extend_from_slice(&segments);
        let candidate = QualifiedName(candidate);
        if refs.contains(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ErrorKind::UnresolvedTypeName {
        name: type_name.to_owned(),
        scopes: (0..=scope.len())
            .rev()
            .map(|len| scope[..len].join("."))
            .collect(),
    })
}

fn join_scope(scope: &[String], name: &str) -> Vec<String> {
    let mut child = scope.to_vec();
    child.push(name.to_owned());
    child
}

impl QualifiedName {
    fn new(scope: &[String], name: &str) -> Self {
        QualifiedName(join_scope(scope, name))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
