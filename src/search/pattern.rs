//! Query patterns and key matching.
//!
//! Matching is a pure function of the compiled pattern and a symbol key; it
//! does not know anything about segments.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SymdexError};
use crate::symbol::{Role, SymbolKind};

/// How the pattern text is compared with symbol keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// The key equals the pattern.
    #[default]
    Exact,
    /// The key starts with the pattern.
    Prefix,
    /// The pattern is a wildcard expression: `*` matches any sequence and
    /// `?` any single character. `\*` and `\?` match themselves.
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// The kind of symbol a search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchFor {
    /// Classes and interfaces alike.
    Type,
    Field,
    Method,
    Constructor,
}

impl SearchFor {
    pub fn matches(self, kind: SymbolKind) -> bool {
        match self {
            SearchFor::Type => kind.is_type(),
            SearchFor::Field => kind == SymbolKind::Field,
            SearchFor::Method => kind == SymbolKind::Method,
            SearchFor::Constructor => kind == SymbolKind::Constructor,
        }
    }
}

/// Which occurrence roles a search reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LimitTo {
    Declarations,
    References,
    #[default]
    AllOccurrences,
}

impl LimitTo {
    pub fn matches(self, role: Role) -> bool {
        match self {
            LimitTo::Declarations => role.is_declaration(),
            LimitTo::References => !role.is_declaration(),
            LimitTo::AllOccurrences => true,
        }
    }
}

/// A symbol search request.
///
/// # Examples
///
/// ```
/// use symdex::search::{LimitTo, MatchMode, QueryPattern, SearchFor};
///
/// let pattern = QueryPattern::new("get*", SearchFor::Method, LimitTo::Declarations)
///     .with_match_mode(MatchMode::Pattern)
///     .case_insensitive();
/// let matcher = pattern.compile().unwrap();
/// assert!(matcher.matches("GetValue"));
/// assert!(!matcher.matches("set"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPattern {
    pub text: String,
    pub match_mode: MatchMode,
    pub case_sensitivity: CaseSensitivity,
    pub search_for: SearchFor,
    pub limit_to: LimitTo,
}

impl QueryPattern {
    /// An exact, case-sensitive pattern.
    pub fn new<S: Into<String>>(text: S, search_for: SearchFor, limit_to: LimitTo) -> Self {
        QueryPattern {
            text: text.into(),
            match_mode: MatchMode::Exact,
            case_sensitivity: CaseSensitivity::Sensitive,
            search_for,
            limit_to,
        }
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    pub fn case_insensitive(self) -> Self {
        self.with_case_sensitivity(CaseSensitivity::Insensitive)
    }

    /// Validate the pattern text and compile its key matcher.
    pub fn compile(&self) -> Result<KeyMatcher> {
        KeyMatcher::new(&self.text, self.match_mode, self.case_sensitivity)
    }
}

/// A compiled key predicate.
#[derive(Debug, Clone)]
pub struct KeyMatcher {
    text: String,
    mode: MatchMode,
    case_sensitivity: CaseSensitivity,
    regex: Option<Regex>,
}

impl KeyMatcher {
    /// Compile `text`. Empty text, whitespace, and malformed wildcard
    /// expressions are rejected with [`SymdexError::InvalidPattern`].
    pub fn new(text: &str, mode: MatchMode, case_sensitivity: CaseSensitivity) -> Result<Self> {
        if text.is_empty() {
            return Err(SymdexError::invalid_pattern("pattern is empty"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(SymdexError::invalid_pattern(format!(
                "pattern {text:?} contains whitespace"
            )));
        }

        let regex = match mode {
            MatchMode::Pattern => Some(
                RegexBuilder::new(&wildcard_to_regex(text)?)
                    .case_insensitive(case_sensitivity == CaseSensitivity::Insensitive)
                    .build()
                    .map_err(|e| {
                        SymdexError::invalid_pattern(format!("invalid wildcard {text:?}: {e}"))
                    })?,
            ),
            MatchMode::Exact | MatchMode::Prefix => None,
        };

        let text = match case_sensitivity {
            CaseSensitivity::Sensitive => text.to_string(),
            CaseSensitivity::Insensitive => text.to_lowercase(),
        };

        Ok(KeyMatcher {
            text,
            mode,
            case_sensitivity,
            regex,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        if let Some(regex) = &self.regex {
            return regex.is_match(key);
        }

        let folded;
        let key = match self.case_sensitivity {
            CaseSensitivity::Sensitive => key,
            CaseSensitivity::Insensitive => {
                folded = key.to_lowercase();
                folded.as_str()
            }
        };
        match self.mode {
            MatchMode::Exact => key == self.text,
            MatchMode::Prefix => key.starts_with(&self.text),
            MatchMode::Pattern => false,
        }
    }

    /// The single key this matcher accepts, when it can be looked up
    /// directly instead of scanning.
    pub fn exact_key(&self) -> Option<&str> {
        (self.mode == MatchMode::Exact && self.case_sensitivity == CaseSensitivity::Sensitive)
            .then_some(self.text.as_str())
    }
}

/// Translate a wildcard expression to an anchored regular expression.
fn wildcard_to_regex(pattern: &str) -> Result<String> {
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => expr.push_str(&regex::escape(&escaped.to_string())),
                None => {
                    return Err(SymdexError::invalid_pattern(format!(
                        "dangling escape in {pattern:?}"
                    )));
                }
            },
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }

    expr.push('$');
    Ok(expr)
}
