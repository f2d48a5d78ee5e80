//! Trie node storage

use std::collections::BTreeMap;

use serde::Serialize;

/// Index of a node in the trie arena
pub type NodeId = usize;

/// Index of an inserted document
pub type DocId = usize;

/// The root node is always the first arena slot
pub const ROOT: NodeId = 0;

/// Start position of an inserted substring inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Location {
    pub doc: DocId,
    /// Character offset in the document text
    pub offset: usize,
}

/// One PATRICIA trie node.
///
/// The edge label leading into the node is `docs[doc][start..end]`;
/// `parent` is used for statistics rollup and string reconstruction only.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) doc: DocId,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: BTreeMap<char, NodeId>,
    pub(crate) locations: Vec<Location>,
    pub(crate) total: usize,
    pub(crate) unique_count: usize,
}

impl Node {
    pub(crate) fn new(doc: DocId, start: usize, end: usize, parent: Option<NodeId>) -> Self {
        Self {
            doc,
            start,
            end,
            parent,
            children: BTreeMap::new(),
            locations: Vec::new(),
            total: 0,
            unique_count: 0,
        }
    }

    pub(crate) fn label_len(&self) -> usize {
        self.end - self.start
    }
}

/// Rollup statistics of a node's subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    /// Recorded occurrences in the subtree
    pub total: usize,
    /// Distinct submissions among those occurrences
    pub unique_count: usize,
}
