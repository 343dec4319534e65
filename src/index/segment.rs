//! Index segments: the postings of one container.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::{ContainerId, Document, DocumentId};
use crate::symbol::SymbolOccurrence;

/// Ordered mapping from symbol key to occurrences for one container.
///
/// Keys are the simple names of the symbols exactly as written in the
/// source. Query semantics (case folding, prefixes, wildcards) are applied
/// by the search side and never baked into the segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSegment {
    container: ContainerId,
    revisions: BTreeMap<DocumentId, u64>,
    postings: BTreeMap<String, Vec<SymbolOccurrence>>,
}

impl IndexSegment {
    /// An empty segment for `container`.
    pub fn empty(container: ContainerId) -> Self {
        IndexSegment {
            container,
            revisions: BTreeMap::new(),
            postings: BTreeMap::new(),
        }
    }

    pub fn builder(container: ContainerId) -> SegmentBuilder {
        SegmentBuilder {
            segment: IndexSegment::empty(container),
        }
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    /// Revisions of the documents this segment was built from.
    pub fn revisions(&self) -> &BTreeMap<DocumentId, u64> {
        &self.revisions
    }

    /// Whether this segment was built from exactly `documents` at their
    /// current revisions.
    pub fn is_built_from(&self, documents: &[Document]) -> bool {
        documents.len() == self.revisions.len()
            && documents
                .iter()
                .all(|doc| self.revisions.get(&doc.id) == Some(&doc.revision))
    }

    /// Occurrences for an exact key.
    pub fn get(&self, key: &str) -> &[SymbolOccurrence] {
        self.postings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over keys and their occurrences in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SymbolOccurrence])> {
        self.postings
            .iter()
            .map(|(key, occurrences)| (key.as_str(), occurrences.as_slice()))
    }

    pub fn key_count(&self) -> usize {
        self.postings.len()
    }

    pub fn occurrence_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    pub fn document_count(&self) -> usize {
        self.revisions.len()
    }
}

/// Accumulates occurrences into a segment.
///
/// The result does not depend on the order documents are visited in:
/// postings are sorted when the segment is built.
#[derive(Debug)]
pub struct SegmentBuilder {
    segment: IndexSegment,
}

impl SegmentBuilder {
    /// Record that `document` at its revision is part of the segment.
    pub fn add_document(&mut self, document: &Document) -> &mut Self {
        self.segment
            .revisions
            .insert(document.id.clone(), document.revision);
        self
    }

    pub fn add_occurrence(&mut self, occurrence: SymbolOccurrence) -> &mut Self {
        self.segment
            .postings
            .entry(occurrence.simple_name.clone())
            .or_default()
            .push(occurrence);
        self
    }

    pub fn build(mut self) -> IndexSegment {
        for occurrences in self.segment.postings.values_mut() {
            occurrences.sort_by(|a, b| {
                a.document
                    .cmp(&b.document)
                    .then(a.span.cmp(&b.span))
                    .then(a.kind.cmp(&b.kind))
                    .then(a.role.cmp(&b.role))
            });
            occurrences.dedup();
        }
        self.segment
    }
}
