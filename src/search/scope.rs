//! The set of containers a search looks at.

use ahash::AHashSet;

use crate::document::ContainerId;
use crate::index::IndexStore;

/// Immutable set of containers to search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    /// The listed containers, in this order.
    Containers(Vec<ContainerId>),
    /// Every container present in the store when the search runs.
    Workspace,
}

impl SearchScope {
    /// A scope over `containers`. Duplicates are dropped, keeping the first
    /// occurrence.
    pub fn containers<I, C>(containers: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ContainerId>,
    {
        let mut seen = AHashSet::new();
        let containers = containers
            .into_iter()
            .map(Into::into)
            .filter(|id: &ContainerId| seen.insert(id.clone()))
            .collect();
        SearchScope::Containers(containers)
    }

    pub fn workspace() -> Self {
        SearchScope::Workspace
    }

    pub fn empty() -> Self {
        SearchScope::Containers(Vec::new())
    }

    /// The containers to scan, in scan order.
    pub fn resolve(&self, store: &IndexStore) -> Vec<ContainerId> {
        match self {
            SearchScope::Containers(containers) => containers.clone(),
            SearchScope::Workspace => store.containers(),
        }
    }
}
