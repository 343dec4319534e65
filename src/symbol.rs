//! Symbol occurrences, the postings stored in index segments.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::DocumentId;

/// The kind of symbol an occurrence refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// A class, enum or record.
    Type,
    Interface,
    Field,
    Method,
    Constructor,
}

impl SymbolKind {
    /// Whether this kind names a type (class-like or interface).
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Type | SymbolKind::Interface)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Type => "type",
            SymbolKind::Interface => "interface",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
        };
        f.write_str(name)
    }
}

/// Role of an occurrence, decided at index time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Declaration,
    Reference,
    /// A reference reached through a receiver whose type is not resolved,
    /// e.g. `x.run()`.
    QualifiedReference,
}

impl Role {
    pub fn is_declaration(self) -> bool {
        self == Role::Declaration
    }
}

/// Byte range of an occurrence inside its document. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SourceSpan { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One occurrence of a symbol in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolOccurrence {
    pub kind: SymbolKind,
    pub role: Role,
    pub simple_name: String,
    /// Package (or namespace) of the document, dot separated. Empty for the
    /// default package.
    pub qualified_container_path: String,
    /// Simple name of the innermost type enclosing the occurrence, if any.
    pub declaring_entity: Option<String>,
    /// Names of the types enclosing the occurrence, outermost first.
    pub enclosing_names: Vec<String>,
    pub span: SourceSpan,
    pub document: DocumentId,
}

impl SymbolOccurrence {
    /// Fully qualified name of the symbol for declarations of types,
    /// e.g. `org.example.Outer.Inner`.
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.enclosing_names.len() + 2);
        if !self.qualified_container_path.is_empty() {
            parts.push(&self.qualified_container_path);
        }
        parts.extend(self.enclosing_names.iter().map(String::as_str));
        parts.push(&self.simple_name);
        parts.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let occurrence = SymbolOccurrence {
            kind: SymbolKind::Type,
            role: Role::Declaration,
            simple_name: "Inner".to_string(),
            qualified_container_path: "org.example".to_string(),
            declaring_entity: Some("Outer".to_string()),
            enclosing_names: vec!["Outer".to_string()],
            span: SourceSpan::new(10, 15),
            document: DocumentId::new("Outer.java"),
        };
        assert_eq!(occurrence.qualified_name(), "org.example.Outer.Inner");
        assert_eq!(occurrence.span.len(), 5);
        assert!(SymbolKind::Interface.is_type());
        assert!(!SymbolKind::Field.is_type());
    }
}
