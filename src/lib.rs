//! # Symdex
//!
//! Background symbol indexing for source code, with a search interface
//! served from the resulting index.
//!
//! ## Overview
//!
//! - [`index`]: per-container index segments and the durable store holding them
//! - [`job`]: a single-threaded FIFO scheduler that runs every store mutation
//! - [`indexer`]: symbol extraction and the jobs that build segments
//! - [`search`]: exact, prefix and wildcard searches streaming to collectors
//! - [`manager`]: opens a store from [`config::SymdexConfig`] and wires it all up
//!
//! Searches block until pending indexing jobs have run (by default), so a
//! search never observes a container whose indexing is still in flight.

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod job;
pub mod manager;
pub mod search;
pub mod storage;
pub mod symbol;

pub mod prelude {
    pub use crate::config::SymdexConfig;
    pub use crate::document::{ContainerId, Document, DocumentId};
    pub use crate::error::{Result, SymdexError};
    pub use crate::manager::IndexManager;
    pub use crate::search::{
        Accuracy, CaseSensitivity, LimitTo, MatchMode, QueryPattern, SearchFor, SearchScope,
        WaitPolicy,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
