//! Extractor for brace-delimited source languages (Java, C#, Kotlin and
//! relatives).
//!
//! This is a lexical scanner, not a parser. Comments and literals are
//! blanked out first (byte offsets are preserved), then identifiers are
//! classified from their immediate neighbourhood and from brace nesting:
//!
//! - `class|interface|enum|record Name` declares a type and its body.
//!   `new T(...) {` opens an anonymous body owned by `T`.
//! - Directly inside a type body, `Name(` declares a constructor when it
//!   repeats the type name and a method when it follows a type, and
//!   `Type a, b =|;|,` declares fields.
//! - `import a.b.T;` references `T`. Wildcard imports reference nothing.
//! - Anywhere else, `new T(` references a type and its constructor, `x(`
//!   references a method, `.x` references a member through a receiver, and
//!   capitalised names reference types.
//!
//! Member references reached through a receiver use
//! [`Role::QualifiedReference`] since the receiver type is not resolved.

use std::ops::Range;
use std::sync::LazyLock;

use ahash::AHashSet;
use regex::Regex;

use crate::document::DocumentId;
use crate::error::Result;
use crate::indexer::extract::SymbolExtractor;
use crate::symbol::{Role, SourceSpan, SymbolKind, SymbolOccurrence};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}_$][\p{L}\p{N}_$]*").expect("identifier pattern should be valid")
});

/// Reserved words of the supported languages. Never indexed.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "assert", "base", "bool", "boolean", "break", "byte", "case", "catch",
    "char", "class", "const", "continue", "default", "do", "double", "else", "enum", "extends",
    "false", "final", "finally", "float", "for", "foreach", "fun", "goto", "if", "implements",
    "import", "in", "instanceof", "int", "interface", "internal", "is", "long", "namespace",
    "native", "new", "null", "object", "open", "override", "package", "permits", "private",
    "protected", "public", "readonly", "record", "return", "sealed", "short", "static",
    "strictfp", "string", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "using", "val", "var", "virtual", "void", "volatile", "when",
    "while", "yield",
];

/// Keywords that can end the type part of a member declaration.
const TYPE_KEYWORDS: &[&str] = &[
    "bool", "boolean", "byte", "char", "double", "float", "fun", "int", "long", "object",
    "short", "string", "val", "var", "void",
];

static KEYWORD_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| KEYWORDS.iter().copied().collect());

fn is_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word)
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$' || byte >= 0x80
}

/// `ALL_CAPS` names are taken to be constants.
fn is_constant_name(word: &str) -> bool {
    word.len() > 1
        && word.chars().any(|c| c.is_uppercase())
        && word
            .chars()
            .all(|c| c.is_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_type_name(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && !is_constant_name(word)
}

/// Symbol extractor for Java-like source files.
#[derive(Debug, Clone, Default)]
pub struct BraceSourceExtractor;

impl BraceSourceExtractor {
    pub fn new() -> Self {
        BraceSourceExtractor
    }
}

impl SymbolExtractor for BraceSourceExtractor {
    fn extract(&self, document: &DocumentId, content: &str) -> Result<Vec<SymbolOccurrence>> {
        let masked = mask_comments_and_literals(content);
        let scan = SourceScan::new(&masked);
        Ok(scan.occurrences(document))
    }

    fn name(&self) -> &'static str {
        "brace-source"
    }
}

/// Replace comments, string literals and character literals with spaces.
/// Newlines are kept and the output has the same byte length as `text`.
pub fn mask_comments_and_literals(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let end = match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => find_from(bytes, i, b"\n"),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = find_from(bytes, i + 2, b"*/");
                (close + 2).min(bytes.len())
            }
            b'"' if bytes[i..].starts_with(b"\"\"\"") => {
                let close = find_from(bytes, i + 3, b"\"\"\"");
                (close + 3).min(bytes.len())
            }
            quote @ (b'"' | b'\'') => literal_end(bytes, i, quote),
            byte => {
                out.push(byte);
                i += 1;
                continue;
            }
        };
        out.extend(
            bytes[i..end]
                .iter()
                .map(|&b| if b == b'\n' { b'\n' } else { b' ' }),
        );
        i = end;
    }

    // Masked regions start and end on ASCII delimiters, so `out` is valid
    // UTF-8 whenever `text` is.
    String::from_utf8_lossy(&out).into_owned()
}

/// Index of the first `needle` at or after `from`, or the input length.
fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> usize {
    if from >= bytes.len() {
        return bytes.len();
    }
    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map_or(bytes.len(), |pos| from + pos)
}

/// End (exclusive) of the quoted literal opening at `start`. Unterminated
/// literals stop at the end of the line.
fn literal_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

#[derive(Debug)]
struct TypeDeclaration {
    name: String,
    kind: SymbolKind,
    is_enum: bool,
    /// Body of `new T(...) { ... }`; `name_span` is the `T` reference.
    anonymous: bool,
    name_span: Range<usize>,
    /// From the opening brace to the closing brace (exclusive).
    body: Range<usize>,
    brace_depth: u32,
    paren_depth: u32,
}

impl TypeDeclaration {
    fn encloses(&self, pos: usize) -> bool {
        self.body.start < pos && pos < self.body.end
    }
}

/// Lexical facts about one masked document.
struct SourceScan<'a> {
    text: &'a str,
    bytes: &'a [u8],
    idents: Vec<Range<usize>>,
    /// Brace and parenthesis depth before each byte.
    braces: Vec<u32>,
    parens: Vec<u32>,
    package: String,
    skipped: Vec<Range<usize>>,
    imports: Vec<Range<usize>>,
    types: Vec<TypeDeclaration>,
}

impl<'a> SourceScan<'a> {
    fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let idents = IDENTIFIER
            .find_iter(text)
            .filter(|m| m.start() == 0 || !is_ident_byte(bytes[m.start() - 1]))
            .map(|m| m.range())
            .collect();

        let mut braces = Vec::with_capacity(bytes.len() + 1);
        let mut parens = Vec::with_capacity(bytes.len() + 1);
        let (mut brace, mut paren) = (0u32, 0u32);
        for &byte in bytes {
            braces.push(brace);
            parens.push(paren);
            match byte {
                b'{' => brace += 1,
                b'}' => brace = brace.saturating_sub(1),
                b'(' => paren += 1,
                b')' => paren = paren.saturating_sub(1),
                _ => {}
            }
        }
        braces.push(brace);
        parens.push(paren);

        let mut scan = SourceScan {
            text,
            bytes,
            idents,
            braces,
            parens,
            package: String::new(),
            skipped: Vec::new(),
            imports: Vec::new(),
            types: Vec::new(),
        };
        scan.scan_directives();
        scan.scan_types();
        scan
    }

    fn word(&self, range: &Range<usize>) -> &'a str {
        &self.text[range.clone()]
    }

    /// Package, namespace, import and using directives at top level.
    fn scan_directives(&mut self) {
        let mut package = None;
        let mut skipped = Vec::new();
        let mut imports = Vec::new();
        for ident in &self.idents {
            let word = self.word(ident);
            if !matches!(word, "package" | "namespace" | "import" | "using")
                || self.braces[ident.start] != 0
            {
                continue;
            }
            let end = self.bytes[ident.end..]
                .iter()
                .position(|&b| matches!(b, b';' | b'{' | b'\n'))
                .map_or(self.bytes.len(), |pos| ident.end + pos);

            if matches!(word, "package" | "namespace") && package.is_none() {
                let name: String = self.text[ident.end..end]
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                if name.chars().all(|c| c == '.' || c == '_' || c.is_alphanumeric()) {
                    package = Some(name);
                }
            }
            if word == "import" && !self.text[ident.end..end].trim_end().ends_with('*') {
                let imported = self.idents.iter().rev().find(|r| {
                    ident.end <= r.start && r.end <= end && is_type_name(self.word(r))
                });
                if let Some(imported) = imported {
                    imports.push(imported.clone());
                }
            }
            skipped.push(ident.start..end);
        }
        self.package = package.unwrap_or_default();
        self.skipped = skipped;
        self.imports = imports;
    }

    fn scan_types(&mut self) {
        let mut types = Vec::new();
        for (i, ident) in self.idents.iter().enumerate() {
            let word = self.word(ident);
            if let Some(body) = self.anonymous_body(i, ident) {
                let inside = (body.start + 1).min(self.bytes.len());
                types.push(TypeDeclaration {
                    name: word.to_string(),
                    kind: SymbolKind::Type,
                    is_enum: false,
                    anonymous: true,
                    name_span: ident.clone(),
                    body,
                    brace_depth: self.braces[inside],
                    paren_depth: self.parens[inside],
                });
                continue;
            }
            if !matches!(word, "class" | "interface" | "enum" | "record")
                || matches!(self.prev_byte(ident.start), Some(b'.' | b':'))
            {
                continue;
            }
            let Some(name) = self.idents.get(i + 1) else {
                continue;
            };
            let name_word = self.word(name);
            if is_keyword(name_word) || !self.text[ident.end..name.start].trim().is_empty() {
                continue;
            }
            if word == "record" && !matches!(self.next_byte(name.end), Some(b'(' | b'<')) {
                continue;
            }

            let body = self.find_body(name.end);
            let inside = (body.start + 1).min(self.bytes.len());
            types.push(TypeDeclaration {
                name: name_word.to_string(),
                kind: if word == "interface" {
                    SymbolKind::Interface
                } else {
                    SymbolKind::Type
                },
                is_enum: word == "enum",
                anonymous: false,
                name_span: name.clone(),
                body,
                brace_depth: self.braces[inside],
                paren_depth: self.parens[inside],
            });
        }
        self.types = types;
    }

    /// Body of `new T(...) {`, when identifier `i` is such a `T`.
    fn anonymous_body(&self, i: usize, ident: &Range<usize>) -> Option<Range<usize>> {
        if !self.follows_new(i, ident.start) || is_keyword(self.word(ident)) {
            return None;
        }
        let mut pos = ident.end;
        if self.next_byte(pos) == Some(b'<') {
            let close = self.matching(self.next_index(pos)?, b'<', b'>');
            pos = (close + 1).min(self.bytes.len());
        }
        let open_paren = self.next_index(pos)?;
        if self.bytes[open_paren] != b'(' {
            return None;
        }
        let close_paren = self.matching(open_paren, b'(', b')');
        let open = self.next_index((close_paren + 1).min(self.bytes.len()))?;
        (self.bytes[open] == b'{').then(|| open..self.matching(open, b'{', b'}'))
    }

    /// Body of a type whose header starts at `from`. A header without a
    /// body yields an empty range.
    fn find_body(&self, from: usize) -> Range<usize> {
        for (offset, &byte) in self.bytes[from..].iter().enumerate() {
            match byte {
                b'{' => {
                    let open = from + offset;
                    return open..self.matching(open, b'{', b'}');
                }
                b';' | b'}' => break,
                _ => {}
            }
        }
        from..from
    }

    /// Position of the delimiter closing the one at `open`, or the input
    /// length when it is never closed.
    fn matching(&self, open: usize, left: u8, right: u8) -> usize {
        let mut depth = 0u32;
        for (offset, &byte) in self.bytes[open..].iter().enumerate() {
            if byte == left {
                depth += 1;
            } else if byte == right {
                depth -= 1;
                if depth == 0 {
                    return open + offset;
                }
            }
        }
        self.bytes.len()
    }

    fn prev_index(&self, pos: usize) -> Option<usize> {
        self.bytes[..pos]
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
    }

    fn prev_byte(&self, pos: usize) -> Option<u8> {
        self.prev_index(pos).map(|i| self.bytes[i])
    }

    fn next_index(&self, pos: usize) -> Option<usize> {
        self.bytes[pos..]
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|offset| pos + offset)
    }

    fn next_byte(&self, pos: usize) -> Option<u8> {
        self.next_index(pos).map(|i| self.bytes[i])
    }

    fn is_skipped(&self, pos: usize) -> bool {
        self.skipped.iter().any(|range| range.contains(&pos))
    }

    /// Types whose body contains `pos`, outermost first.
    fn enclosing(&self, pos: usize) -> Vec<&TypeDeclaration> {
        self.types.iter().filter(|t| t.encloses(pos)).collect()
    }

    /// The type `pos` is directly a member of, if it is at member level.
    fn member_of(&self, pos: usize) -> Option<&TypeDeclaration> {
        let owner = self.types.iter().rev().find(|t| t.encloses(pos))?;
        (self.braces[pos] == owner.brace_depth && self.parens[pos] == owner.paren_depth)
            .then_some(owner)
    }

    /// Whether the token before identifier `i` can end a declared type,
    /// as in `int x`, `List<String> x` or `String[] x`.
    fn follows_type(&self, i: usize, start: usize) -> bool {
        let Some(pos) = self.prev_index(start) else {
            return false;
        };
        match self.bytes[pos] {
            b']' => true,
            b'>' => pos == 0 || self.bytes[pos - 1] != b'-',
            byte if is_ident_byte(byte) => {
                let Some(prev) = i.checked_sub(1).map(|j| &self.idents[j]) else {
                    return false;
                };
                let word = self.word(prev);
                prev.end == pos + 1 && (!is_keyword(word) || TYPE_KEYWORDS.contains(&word))
            }
            _ => false,
        }
    }

    /// Whether identifier `i` follows a `,` that continues a field
    /// declaration, as `b` in `int a = 1, b;`.
    fn continues_declaration(&self, i: usize, owner: &TypeDeclaration) -> bool {
        let start = self.idents[i].start;
        let statement = self.bytes[owner.body.start..start]
            .iter()
            .rposition(|&b| matches!(b, b';' | b'{' | b'}'))
            .map_or(owner.body.start, |offset| owner.body.start + offset);

        (0..i)
            .rev()
            .take_while(|&j| self.idents[j].start > statement)
            .any(|j| {
                let ident = &self.idents[j];
                self.braces[ident.start] == owner.brace_depth
                    && self.parens[ident.start] == owner.paren_depth
                    && matches!(self.next_byte(ident.end), Some(b'=' | b';' | b','))
                    && self.follows_type(j, ident.start)
            })
    }

    fn follows_new(&self, i: usize, start: usize) -> bool {
        i.checked_sub(1).is_some_and(|j| {
            let prev = &self.idents[j];
            self.word(prev) == "new" && self.text[prev.end..start].trim().is_empty()
        })
    }

    fn occurrences(&self, document: &DocumentId) -> Vec<SymbolOccurrence> {
        let declared: AHashSet<usize> = self
            .types
            .iter()
            .filter(|t| !t.anonymous)
            .map(|t| t.name_span.start)
            .collect();
        let mut out = Vec::new();

        for declaration in self.types.iter().filter(|t| !t.anonymous) {
            out.push(self.occurrence(
                document,
                declaration.kind,
                Role::Declaration,
                &declaration.name_span,
            ));
        }
        for import in &self.imports {
            out.push(self.occurrence(document, SymbolKind::Type, Role::Reference, import));
        }

        for (i, ident) in self.idents.iter().enumerate() {
            if is_keyword(self.word(ident))
                || declared.contains(&ident.start)
                || self.is_skipped(ident.start)
            {
                continue;
            }
            for (kind, role) in self.classify(i, ident) {
                out.push(self.occurrence(document, kind, role, ident));
            }
        }
        out
    }

    fn classify(&self, i: usize, ident: &Range<usize>) -> Vec<(SymbolKind, Role)> {
        let word = self.word(ident);
        let prev = self.prev_byte(ident.start);
        let next = self.next_byte(ident.end);
        let after_new = self.follows_new(i, ident.start);

        if let Some(owner) = self.member_of(ident.start) {
            if !after_new && !matches!(prev, Some(b'.' | b'@')) {
                if next == Some(b'(') {
                    if word == owner.name && !owner.anonymous {
                        return vec![(SymbolKind::Constructor, Role::Declaration)];
                    }
                    if self.follows_type(i, ident.start) {
                        return vec![(SymbolKind::Method, Role::Declaration)];
                    }
                } else if matches!(next, Some(b'=' | b';' | b','))
                    && (self.follows_type(i, ident.start)
                        || (prev == Some(b',') && self.continues_declaration(i, owner)))
                {
                    return vec![(SymbolKind::Field, Role::Declaration)];
                }
                if owner.is_enum
                    && matches!(prev, Some(b'{' | b','))
                    && !self.bytes[owner.body.start..ident.start].contains(&b';')
                {
                    return vec![(SymbolKind::Field, Role::Declaration)];
                }
            }
        }

        if after_new {
            let mut found = vec![(SymbolKind::Type, Role::Reference)];
            if matches!(next, Some(b'(' | b'<')) {
                found.push((SymbolKind::Constructor, Role::Reference));
            }
            return found;
        }

        let found = match (prev, next) {
            (Some(b'@'), _) => (SymbolKind::Type, Role::Reference),
            (Some(b'.'), Some(b'(')) => (SymbolKind::Method, Role::QualifiedReference),
            (_, Some(b'(')) => (SymbolKind::Method, Role::Reference),
            (Some(b'.'), _) if is_type_name(word) => (SymbolKind::Type, Role::QualifiedReference),
            (Some(b'.'), _) => (SymbolKind::Field, Role::QualifiedReference),
            _ if is_constant_name(word) => (SymbolKind::Field, Role::Reference),
            _ if is_type_name(word) => (SymbolKind::Type, Role::Reference),
            _ => return Vec::new(),
        };
        vec![found]
    }

    fn occurrence(
        &self,
        document: &DocumentId,
        kind: SymbolKind,
        role: Role,
        span: &Range<usize>,
    ) -> SymbolOccurrence {
        let enclosing = self.enclosing(span.start);
        SymbolOccurrence {
            kind,
            role,
            simple_name: self.word(span).to_string(),
            qualified_container_path: self.package.clone(),
            declaring_entity: enclosing.last().map(|t| t.name.clone()),
            enclosing_names: enclosing.iter().map(|t| t.name.clone()).collect(),
            span: SourceSpan::new(span.start, span.end),
            document: document.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<SymbolOccurrence> {
        BraceSourceExtractor::new()
            .extract(&DocumentId::new("Test.java"), content)
            .unwrap()
    }

    fn find<'a>(
        occurrences: &'a [SymbolOccurrence],
        name: &str,
    ) -> Vec<&'a SymbolOccurrence> {
        occurrences.iter().filter(|o| o.simple_name == name).collect()
    }

    #[test]
    fn test_mask_preserves_offsets() {
        let text = "a /* x\ny */ \"s{\" 'c' // end\nb";
        let masked = mask_comments_and_literals(text);
        assert_eq!(masked.len(), text.len());
        assert_eq!(masked.find('b'), text.rfind('b'));
        assert!(!masked.contains('{'));
        assert_eq!(masked.matches('\n').count(), 2);
    }

    #[test]
    fn test_single_type_declaration() {
        let content = "package org.example;\n\npublic class Foo {\n}\n";
        let occurrences = extract(content);

        assert_eq!(occurrences.len(), 1);
        let foo = &occurrences[0];
        assert_eq!(foo.kind, SymbolKind::Type);
        assert_eq!(foo.role, Role::Declaration);
        assert_eq!(foo.qualified_container_path, "org.example");
        assert_eq!(foo.span.start, content.find("Foo").unwrap());
        assert_eq!(foo.span.len(), 3);
        assert_eq!(foo.declaring_entity, None);
    }

    #[test]
    fn test_members_and_references() {
        let content = r#"package p;

import java.util.List;

public class Outer {
    private static final int MAX = 10;
    private List<String> names = new ArrayList<>();

    public Outer() {
        helper();
    }

    void helper() {
        this.names.clear(); // Outer helper() in a comment
        String s = "Outer.helper()";
    }

    interface Inner {
        void run();
    }
}
"#;
        let occurrences = extract(content);

        let outer = find(&occurrences, "Outer");
        assert_eq!(outer.len(), 2);
        assert!(outer.iter().all(|o| o.role == Role::Declaration));
        assert!(outer.iter().any(|o| o.kind == SymbolKind::Type));
        assert!(outer.iter().any(|o| o.kind == SymbolKind::Constructor));

        let helper = find(&occurrences, "helper");
        assert_eq!(helper.len(), 2);
        assert!(helper
            .iter()
            .any(|o| o.kind == SymbolKind::Method && o.role == Role::Declaration));
        assert!(helper
            .iter()
            .any(|o| o.kind == SymbolKind::Method && o.role == Role::Reference));

        let max = find(&occurrences, "MAX");
        assert_eq!(max.len(), 1);
        assert_eq!((max[0].kind, max[0].role), (SymbolKind::Field, Role::Declaration));

        let names = find(&occurrences, "names");
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|o| o.role == Role::Declaration));
        assert!(names.iter().any(|o| o.role == Role::QualifiedReference));

        let array_list = find(&occurrences, "ArrayList");
        assert_eq!(array_list.len(), 2);
        assert!(array_list.iter().any(|o| o.kind == SymbolKind::Constructor));

        let clear = find(&occurrences, "clear");
        assert_eq!(clear[0].role, Role::QualifiedReference);

        // Only the imported type of an import is indexed.
        assert!(find(&occurrences, "util").is_empty());
        let list = find(&occurrences, "List");
        assert_eq!(list.len(), 2);
        assert!(list
            .iter()
            .all(|o| o.kind == SymbolKind::Type && o.role == Role::Reference));

        let inner = find(&occurrences, "Inner");
        assert_eq!(inner[0].kind, SymbolKind::Interface);
        assert_eq!(inner[0].enclosing_names, vec!["Outer".to_string()]);

        let run = find(&occurrences, "run");
        assert_eq!((run[0].kind, run[0].role), (SymbolKind::Method, Role::Declaration));
        assert_eq!(run[0].declaring_entity.as_deref(), Some("Inner"));
        assert_eq!(run[0].enclosing_names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn test_type_reference_from_field() {
        let occurrences = extract("class Bar {\n    Foo foo;\n}\n");
        let foo = find(&occurrences, "Foo");
        assert_eq!(foo.len(), 1);
        assert_eq!((foo[0].kind, foo[0].role), (SymbolKind::Type, Role::Reference));
        assert_eq!(foo[0].declaring_entity.as_deref(), Some("Bar"));

        let field = find(&occurrences, "foo");
        assert_eq!((field[0].kind, field[0].role), (SymbolKind::Field, Role::Declaration));
    }

    #[test]
    fn test_instantiation_and_receivers() {
        let content = "class A { void m() { Foo f = new Foo(); f.bar(); f.baz = 1; } }";
        let occurrences = extract(content);

        let foo = find(&occurrences, "Foo");
        assert_eq!(foo.iter().filter(|o| o.kind == SymbolKind::Type).count(), 2);
        assert_eq!(
            foo.iter()
                .filter(|o| o.kind == SymbolKind::Constructor && o.role == Role::Reference)
                .count(),
            1
        );
        assert_eq!(find(&occurrences, "bar")[0].role, Role::QualifiedReference);
        assert_eq!(find(&occurrences, "baz")[0].kind, SymbolKind::Field);
        assert!(find(&occurrences, "f").is_empty());
    }

    #[test]
    fn test_enum_constants() {
        let occurrences = extract("enum Color { RED, GREEN; Color() {} }");
        for constant in ["RED", "GREEN"] {
            let found = find(&occurrences, constant);
            assert_eq!((found[0].kind, found[0].role), (SymbolKind::Field, Role::Declaration));
        }
        assert_eq!(find(&occurrences, "Color").len(), 2);
    }

    #[test]
    fn test_literals_do_not_affect_nesting() {
        let occurrences = extract("class A { char c = '{'; String s = \"}}\"; void m() {} }");
        let m = find(&occurrences, "m");
        assert_eq!((m[0].kind, m[0].role), (SymbolKind::Method, Role::Declaration));
        assert_eq!(m[0].declaring_entity.as_deref(), Some("A"));
    }

    #[test]
    fn test_class_literal_is_not_a_declaration() {
        let occurrences = extract("class A { Object o = A.class; }");
        let a = find(&occurrences, "A");
        assert_eq!(a.iter().filter(|o| o.role == Role::Declaration).count(), 1);
    }

    #[test]
    fn test_malformed_input_is_tolerated() {
        let occurrences = extract("class A { /* never closed");
        assert_eq!(occurrences.len(), 1);
        assert!(extract("}}} class { (((").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_imports_reference_types() {
        let content =
            "package b;\nimport a.Foo;\nimport static a.Bar.MAX;\nimport c.*;\nclass Use {}\n";
        let occurrences = extract(content);

        let foo = find(&occurrences, "Foo");
        assert_eq!(foo.len(), 1);
        assert_eq!((foo[0].kind, foo[0].role), (SymbolKind::Type, Role::Reference));
        assert_eq!(foo[0].span.start, content.find("Foo").unwrap());
        assert_eq!(foo[0].declaring_entity, None);

        assert_eq!(find(&occurrences, "Bar").len(), 1);
        assert!(find(&occurrences, "MAX").is_empty());
        assert!(find(&occurrences, "c").is_empty());
        assert_eq!(occurrences.len(), 3);
    }

    #[test]
    fn test_anonymous_class_members() {
        let content = r#"class Host {
    void start() {
        exec(new Runnable() {
            public void run() {
                tick();
            }
        });
        Comparator<String> c = new Comparator<String>() {
            public int compare(String a, String b) { return 0; }
        };
    }
}
"#;
        let occurrences = extract(content);

        let run = find(&occurrences, "run");
        assert_eq!(run.len(), 1);
        assert_eq!((run[0].kind, run[0].role), (SymbolKind::Method, Role::Declaration));
        assert_eq!(run[0].declaring_entity.as_deref(), Some("Runnable"));

        let compare = find(&occurrences, "compare");
        assert_eq!((compare[0].kind, compare[0].role), (SymbolKind::Method, Role::Declaration));

        let tick = find(&occurrences, "tick");
        assert_eq!((tick[0].kind, tick[0].role), (SymbolKind::Method, Role::Reference));

        // The instantiated type is referenced, never declared.
        let runnable = find(&occurrences, "Runnable");
        assert!(runnable.iter().all(|o| o.role == Role::Reference));
        assert!(runnable.iter().any(|o| o.kind == SymbolKind::Constructor));
        let declarations = occurrences
            .iter()
            .filter(|o| o.kind == SymbolKind::Type && o.role == Role::Declaration)
            .count();
        assert_eq!(declarations, 1);
    }

    #[test]
    fn test_multiple_declarators() {
        let content = "class A {\n    int a, b = 2, c;\n    Map<K, V> m;\n    void f(int x, int y) {}\n}\n";
        let occurrences = extract(content);

        for name in ["a", "b", "c", "m"] {
            let found = find(&occurrences, name);
            assert_eq!(found.len(), 1, "{name}");
            assert_eq!((found[0].kind, found[0].role), (SymbolKind::Field, Role::Declaration));
        }
        assert!(find(&occurrences, "y").is_empty());
        assert_eq!(find(&occurrences, "V")[0].role, Role::Reference);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let content = "package q; class X { int y; X() { z(); } }";
        assert_eq!(extract(content), extract(content));
    }
}
