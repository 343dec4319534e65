//! Sinks for search results.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::document::ContainerId;
use crate::error::Result;
use crate::job::ProgressMonitor;
use crate::symbol::{Role, SymbolOccurrence};

/// Confidence of a reported match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accuracy {
    Exact,
    /// The match could not be confirmed, e.g. a member reached through a
    /// receiver whose type is unknown.
    Potential,
}

impl Accuracy {
    pub fn of(role: Role) -> Self {
        match role {
            Role::Declaration | Role::Reference => Accuracy::Exact,
            Role::QualifiedReference => Accuracy::Potential,
        }
    }
}

/// Receives the matches of one search.
///
/// `about_to_start` and `done` are each called exactly once per search,
/// even when nothing matches; `accept` is called once per match in between.
pub trait SearchResultCollector: Debug {
    fn about_to_start(&mut self) {}

    /// Accept one match. Returning an error aborts the search; `done` is
    /// still called.
    fn accept(
        &mut self,
        container: &ContainerId,
        start: usize,
        end: usize,
        element: &SymbolOccurrence,
        accuracy: Accuracy,
    ) -> Result<()>;

    fn done(&mut self) {}

    /// Progress handle checked between containers. A cancelled monitor
    /// stops the search early.
    fn progress_monitor(&self) -> Option<&dyn ProgressMonitor> {
        None
    }
}

/// Counts matches.
#[derive(Debug, Default, Clone)]
pub struct CountingCollector {
    pub exact: usize,
    pub potential: usize,
    pub started: usize,
    pub finished: usize,
}

impl CountingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All matches, exact or potential.
    pub fn count(&self) -> usize {
        self.exact + self.potential
    }
}

impl SearchResultCollector for CountingCollector {
    fn about_to_start(&mut self) {
        self.started += 1;
    }

    fn accept(
        &mut self,
        _container: &ContainerId,
        _start: usize,
        _end: usize,
        _element: &SymbolOccurrence,
        accuracy: Accuracy,
    ) -> Result<()> {
        match accuracy {
            Accuracy::Exact => self.exact += 1,
            Accuracy::Potential => self.potential += 1,
        }
        Ok(())
    }

    fn done(&mut self) {
        self.finished += 1;
    }
}

/// One reported match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub container: ContainerId,
    pub start: usize,
    pub end: usize,
    pub element: SymbolOccurrence,
    pub accuracy: Accuracy,
}

/// Keeps every match in arrival order.
#[derive(Debug, Default, Clone)]
pub struct MatchCollector {
    matches: Vec<SearchMatch>,
    limit: Option<usize>,
}

impl MatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` matches; later ones are dropped.
    pub fn with_limit(limit: usize) -> Self {
        MatchCollector {
            matches: Vec::new(),
            limit: Some(limit),
        }
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<SearchMatch> {
        self.matches
    }
}

impl SearchResultCollector for MatchCollector {
    fn about_to_start(&mut self) {
        self.matches.clear();
    }

    fn accept(
        &mut self,
        container: &ContainerId,
        start: usize,
        end: usize,
        element: &SymbolOccurrence,
        accuracy: Accuracy,
    ) -> Result<()> {
        if self.limit.is_some_and(|limit| self.matches.len() >= limit) {
            return Ok(());
        }
        self.matches.push(SearchMatch {
            container: container.clone(),
            start,
            end,
            element: element.clone(),
            accuracy,
        });
        Ok(())
    }
}

/// Receives the results of an all-type-names search.
pub trait TypeNameRequestor {
    fn accept_class(
        &mut self,
        package: &str,
        simple_name: &str,
        enclosing_names: &[String],
        path: &str,
    );

    fn accept_interface(
        &mut self,
        package: &str,
        simple_name: &str,
        enclosing_names: &[String],
        path: &str,
    );
}

/// A type reported by an all-type-names search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNameMatch {
    pub package: String,
    pub simple_name: String,
    pub enclosing_names: Vec<String>,
    pub path: String,
    pub is_interface: bool,
}

impl TypeNameMatch {
    /// `package.Outer.Name`
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(self.enclosing_names.len() + 2);
        if !self.package.is_empty() {
            parts.push(&self.package);
        }
        parts.extend(self.enclosing_names.iter().map(String::as_str));
        parts.push(&self.simple_name);
        parts.join(".")
    }
}

/// Collects reported types.
#[derive(Debug, Default, Clone)]
pub struct TypeNameCollector {
    pub types: Vec<TypeNameMatch>,
}

impl TypeNameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_count(&self) -> usize {
        self.types.iter().filter(|t| !t.is_interface).count()
    }

    pub fn interface_count(&self) -> usize {
        self.types.iter().filter(|t| t.is_interface).count()
    }

    fn push(
        &mut self,
        package: &str,
        simple_name: &str,
        enclosing_names: &[String],
        path: &str,
        is_interface: bool,
    ) {
        self.types.push(TypeNameMatch {
            package: package.to_string(),
            simple_name: simple_name.to_string(),
            enclosing_names: enclosing_names.to_vec(),
            path: path.to_string(),
            is_interface,
        });
    }
}

impl TypeNameRequestor for TypeNameCollector {
    fn accept_class(
        &mut self,
        package: &str,
        simple_name: &str,
        enclosing_names: &[String],
        path: &str,
    ) {
        self.push(package, simple_name, enclosing_names, path, false);
    }

    fn accept_interface(
        &mut self,
        package: &str,
        simple_name: &str,
        enclosing_names: &[String],
        path: &str,
    ) {
        self.push(package, simple_name, enclosing_names, path, true);
    }
}
