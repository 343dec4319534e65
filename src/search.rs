//! Symbol search over the index store.
//!
//! # Examples
//!
//! ```no_run
//! use symdex::config::SymdexConfig;
//! use symdex::manager::IndexManager;
//! use symdex::search::{CountingCollector, LimitTo, QueryPattern, SearchFor, SearchScope};
//!
//! let manager = IndexManager::open(SymdexConfig::in_memory()).unwrap();
//! let mut collector = CountingCollector::new();
//! manager
//!     .search_engine()
//!     .search(
//!         &QueryPattern::new("Foo", SearchFor::Type, LimitTo::AllOccurrences),
//!         &SearchScope::workspace(),
//!         &mut collector,
//!     )
//!     .unwrap();
//! assert_eq!(collector.count(), 0);
//! ```

use serde::{Deserialize, Serialize};

pub mod collector;
pub mod engine;
pub mod pattern;
pub mod scope;

pub use collector::{
    Accuracy, CountingCollector, MatchCollector, SearchMatch, SearchResultCollector,
    TypeNameCollector, TypeNameMatch, TypeNameRequestor,
};
pub use engine::{SearchEngine, TypeNameKind, TypeNameQuery};
pub use pattern::{CaseSensitivity, KeyMatcher, LimitTo, MatchMode, QueryPattern, SearchFor};
pub use scope::SearchScope;

/// How a search synchronises with indexing jobs that are still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// Block until the scheduler is idle.
    #[default]
    WaitUntilReady,
    /// Search whatever is in the store right now.
    ForceImmediate,
    /// Fail with [`crate::error::SymdexError::NotReady`] if jobs are pending.
    CancelIfNotReady,
}
