//! Evaluates query patterns against the index store.

use std::sync::Arc;

use log::{debug, trace};

use crate::document::ContainerId;
use crate::error::{Result, SymdexError};
use crate::index::{IndexSegment, SharedIndexStore};
use crate::job::Scheduler;
use crate::search::collector::{Accuracy, SearchResultCollector, TypeNameRequestor};
use crate::search::pattern::{CaseSensitivity, KeyMatcher, MatchMode, QueryPattern};
use crate::search::scope::SearchScope;
use crate::search::WaitPolicy;
use crate::symbol::{SymbolKind, SymbolOccurrence};

/// Which type declarations an all-type-names search reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeNameKind {
    /// Classes and interfaces.
    #[default]
    Type,
    Class,
    Interface,
}

impl TypeNameKind {
    fn matches(self, kind: SymbolKind) -> bool {
        match self {
            TypeNameKind::Type => kind.is_type(),
            TypeNameKind::Class => kind == SymbolKind::Type,
            TypeNameKind::Interface => kind == SymbolKind::Interface,
        }
    }
}

/// Parameters of [`SearchEngine::search_all_type_names`]. Absent filters
/// match everything.
#[derive(Debug, Clone, Default)]
pub struct TypeNameQuery {
    pub package: Option<String>,
    pub name: Option<String>,
    pub match_mode: MatchMode,
    pub case_sensitivity: CaseSensitivity,
    pub kind: TypeNameKind,
}

impl TypeNameQuery {
    /// Every type declaration.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    pub fn with_kind(mut self, kind: TypeNameKind) -> Self {
        self.kind = kind;
        self
    }

    fn compile(&self) -> Result<(Option<KeyMatcher>, Option<KeyMatcher>)> {
        let compile = |filter: &Option<String>| {
            filter
                .as_deref()
                .map(|text| KeyMatcher::new(text, self.match_mode, self.case_sensitivity))
                .transpose()
        };
        Ok((compile(&self.package)?, compile(&self.name)?))
    }
}

/// Searches the index store.
///
/// Every search first synchronises with the scheduler according to its
/// [`WaitPolicy`], then captures the segments of the scope and scans them.
/// Jobs requested after that point do not affect the running search.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    store: SharedIndexStore,
    scheduler: Arc<Scheduler>,
    wait_policy: WaitPolicy,
}

impl SearchEngine {
    pub fn new(store: SharedIndexStore, scheduler: Arc<Scheduler>) -> Self {
        SearchEngine {
            store,
            scheduler,
            wait_policy: WaitPolicy::default(),
        }
    }

    /// Set the policy used by [`SearchEngine::search`].
    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait_policy
    }

    /// Stream the occurrences matching `pattern` in `scope` to `collector`.
    ///
    /// A malformed pattern fails before any collector callback. Otherwise
    /// `about_to_start` and `done` are always called, in that order, with
    /// matches in between: scope order, then key order, then occurrence
    /// order. Containers that are not indexed contribute nothing.
    pub fn search(
        &self,
        pattern: &QueryPattern,
        scope: &SearchScope,
        collector: &mut dyn SearchResultCollector,
    ) -> Result<()> {
        let matcher = pattern.compile()?;
        let segments = self.snapshot(scope, self.wait_policy)?;

        collector.about_to_start();
        let result = Self::scan(pattern, &matcher, &segments, collector);
        collector.done();
        result
    }

    fn scan(
        pattern: &QueryPattern,
        matcher: &KeyMatcher,
        segments: &[(ContainerId, Arc<IndexSegment>)],
        collector: &mut dyn SearchResultCollector,
    ) -> Result<()> {
        for (container, segment) in segments {
            if collector
                .progress_monitor()
                .is_some_and(|progress| progress.is_canceled())
            {
                debug!("Search for {:?} cancelled", pattern.text);
                return Ok(());
            }

            let mut visit = |occurrences: &[SymbolOccurrence]| -> Result<()> {
                for occurrence in occurrences {
                    if pattern.search_for.matches(occurrence.kind)
                        && pattern.limit_to.matches(occurrence.role)
                    {
                        collector.accept(
                            container,
                            occurrence.span.start,
                            occurrence.span.end,
                            occurrence,
                            Accuracy::of(occurrence.role),
                        )?;
                    }
                }
                Ok(())
            };

            match matcher.exact_key() {
                Some(key) => visit(segment.get(key))?,
                None => {
                    for (key, occurrences) in segment.iter() {
                        if matcher.matches(key) {
                            visit(occurrences)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Report every type declaration matching `query` in `scope`.
    ///
    /// Classes (including enums and records) go to `accept_class`,
    /// interfaces to `accept_interface`. The path passed along is the
    /// container id joined with the document path.
    pub fn search_all_type_names(
        &self,
        query: &TypeNameQuery,
        scope: &SearchScope,
        requestor: &mut dyn TypeNameRequestor,
        wait_policy: WaitPolicy,
    ) -> Result<()> {
        let (package_matcher, name_matcher) = query.compile()?;
        let segments = self.snapshot(scope, wait_policy)?;

        for (container, segment) in &segments {
            for (key, occurrences) in segment.iter() {
                if name_matcher.as_ref().is_some_and(|m| !m.matches(key)) {
                    continue;
                }
                for occurrence in occurrences {
                    if !occurrence.role.is_declaration()
                        || !query.kind.matches(occurrence.kind)
                        || package_matcher
                            .as_ref()
                            .is_some_and(|m| !m.matches(&occurrence.qualified_container_path))
                    {
                        continue;
                    }

                    let path = document_path(container, occurrence);
                    if occurrence.kind == SymbolKind::Interface {
                        requestor.accept_interface(
                            &occurrence.qualified_container_path,
                            &occurrence.simple_name,
                            &occurrence.enclosing_names,
                            &path,
                        );
                    } else {
                        requestor.accept_class(
                            &occurrence.qualified_container_path,
                            &occurrence.simple_name,
                            &occurrence.enclosing_names,
                            &path,
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Synchronise with the scheduler, then capture the segments of `scope`.
    fn snapshot(
        &self,
        scope: &SearchScope,
        wait_policy: WaitPolicy,
    ) -> Result<Vec<(ContainerId, Arc<IndexSegment>)>> {
        match wait_policy {
            WaitPolicy::WaitUntilReady => self.scheduler.wait_until_idle()?,
            WaitPolicy::ForceImmediate => {}
            WaitPolicy::CancelIfNotReady => {
                let pending = self.scheduler.awaiting_jobs_count();
                if pending > 0 {
                    return Err(SymdexError::not_ready(format!(
                        "{pending} indexing jobs pending"
                    )));
                }
            }
        }

        let store = self.store.read();
        let segments = scope
            .resolve(&store)
            .into_iter()
            .filter_map(|container| match store.get_checked(&container) {
                Ok(segment) => Some((container, segment)),
                Err(e) => {
                    trace!("Skipping {e}");
                    None
                }
            })
            .collect();
        Ok(segments)
    }
}

fn document_path(container: &ContainerId, occurrence: &SymbolOccurrence) -> String {
    format!(
        "{}/{}",
        container.as_str().trim_end_matches('/'),
        occurrence.document
    )
}
