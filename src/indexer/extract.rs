//! Symbol extraction from document content.
//!
//! Extraction is polymorphic over the content type of a document. An
//! [`ExtractorRegistry`] picks the extractor for a document by its file
//! extension, falling back to an optional default.
//!
//! # Examples
//!
//! ```
//! use symdex::document::DocumentId;
//! use symdex::indexer::extract::ExtractorRegistry;
//!
//! let registry = ExtractorRegistry::default();
//! assert!(registry.get(&DocumentId::new("src/Foo.java")).is_some());
//! assert!(registry.get(&DocumentId::new("README.md")).is_none());
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use ahash::AHashMap;

use crate::document::DocumentId;
use crate::error::Result;
use crate::indexer::brace::BraceSourceExtractor;
use crate::symbol::SymbolOccurrence;

/// Turns the content of one document into symbol occurrences.
///
/// Implementations must be deterministic: the same content always yields
/// the same occurrences.
pub trait SymbolExtractor: Send + Sync + Debug {
    /// Extract the occurrences found in `content`. Every occurrence must
    /// carry `document` as its document id.
    fn extract(&self, document: &DocumentId, content: &str) -> Result<Vec<SymbolOccurrence>>;

    /// Get the name of this extractor (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// File extensions handled by [`BraceSourceExtractor`] in the default registry.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["java", "cs", "kt", "groovy", "scala"];

/// Maps file extensions to extractors.
///
/// Reuse a single extractor instance for several extensions with
/// `Arc::clone`.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    by_extension: AHashMap<String, Arc<dyn SymbolExtractor>>,
    fallback: Option<Arc<dyn SymbolExtractor>>,
}

impl ExtractorRegistry {
    /// An empty registry: no document has an extractor.
    pub fn new() -> Self {
        ExtractorRegistry {
            by_extension: AHashMap::new(),
            fallback: None,
        }
    }

    /// Register `extractor` for documents ending in `.extension`. Matching
    /// is case-insensitive.
    pub fn register(&mut self, extension: impl Into<String>, extractor: Arc<dyn SymbolExtractor>) {
        self.by_extension
            .insert(extension.into().to_ascii_lowercase(), extractor);
    }

    /// Use `extractor` for documents no registered extension matches.
    pub fn with_fallback(mut self, extractor: Arc<dyn SymbolExtractor>) -> Self {
        self.fallback = Some(extractor);
        self
    }

    /// The extractor responsible for `document`, if any.
    pub fn get(&self, document: &DocumentId) -> Option<&Arc<dyn SymbolExtractor>> {
        document
            .extension()
            .and_then(|ext| self.by_extension.get(&ext.to_ascii_lowercase()))
            .or(self.fallback.as_ref())
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let source: Arc<dyn SymbolExtractor> = Arc::new(BraceSourceExtractor::new());
        let mut registry = ExtractorRegistry::new();
        for extension in DEFAULT_SOURCE_EXTENSIONS {
            registry.register(*extension, Arc::clone(&source));
        }
        registry
    }
}
