//! Substring index: a PATRICIA trie over every bounded-length substring
//!
//! Every suffix of every inserted document (optionally truncated to a
//! maximum length) is threaded through one compressed trie. A suffix that is
//! at least `min_len` characters long records its start position at the
//! node where it ends. After [`SubstringIndex::update_stats`], each node
//! knows how many occurrences its subtree holds and how many distinct
//! submissions they come from, which is what rare-fragment search needs:
//! text shared by a handful of submissions is evidence, text shared by all
//! of them is boilerplate.
//!
//! # Architecture
//!
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by index.
//! Edge labels are spans into the inserted documents rather than owned
//! strings, so splitting an edge only adjusts offsets.
//!
//! Statistics are only valid until the next mutation. Shared queries on a
//! stale index return [`AcError::StaleIndex`]; [`SubstringIndex::find_rare`]
//! takes `&mut self` and recomputes on demand.

mod node;

pub use node::{DocId, Location, NodeId, NodeStats, ROOT};

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::error::{AcError, Result};
use node::Node;

/// Default minimum length, in characters, for a substring to count
pub const DEFAULT_MIN_LEN: usize = 5;

struct Document {
    submission: usize,
    chars: Vec<char>,
}

pub struct SubstringIndex {
    nodes: Vec<Node>,
    docs: Vec<Document>,
    submissions: Vec<String>,
    submission_index: AHashMap<String, usize>,
    min_len: usize,
    stale: bool,
}

impl Default for SubstringIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LEN)
    }
}

impl SubstringIndex {
    pub fn new(min_len: usize) -> Self {
        Self {
            nodes: vec![Node::new(0, 0, 0, None)],
            docs: Vec::new(),
            submissions: Vec::new(),
            submission_index: AHashMap::new(),
            min_len,
            stale: false,
        }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    // ============================================
    // Insertion
    // ============================================

    /// Index every substring of `text` for `submission`.
    ///
    /// For each start offset the suffix beginning there is inserted,
    /// truncated to `max_len` characters when given.
    pub fn insert(&mut self, text: &str, submission: &str, max_len: Option<usize>) -> DocId {
        let submission = self.intern(submission);
        let doc = self.docs.len();
        self.docs.push(Document {
            submission,
            chars: text.chars().collect(),
        });

        let len = self.docs[doc].chars.len();
        for i in 0..len {
            let limit = match max_len {
                Some(max) if len - i > max => i + max,
                _ => len,
            };
            if limit > i {
                self.insert_suffix(doc, i, limit);
            }
        }

        self.stale = true;
        debug!(
            "Indexed {} chars for submission {} ({} nodes)",
            len,
            self.submissions[submission],
            self.nodes.len()
        );
        doc
    }

    fn intern(&mut self, submission: &str) -> usize {
        if let Some(&idx) = self.submission_index.get(submission) {
            return idx;
        }
        let idx = self.submissions.len();
        self.submissions.push(submission.to_string());
        self.submission_index.insert(submission.to_string(), idx);
        idx
    }

    /// Insert `chars[suffix_start..limit]` of `doc`
    fn insert_suffix(&mut self, doc: DocId, suffix_start: usize, limit: usize) {
        let location = Location {
            doc,
            offset: suffix_start,
        };
        let record = limit - suffix_start >= self.min_len;

        let mut parent = ROOT;
        let mut offset = suffix_start;

        loop {
            let chars = &self.docs[doc].chars;
            let remaining = limit - offset;
            let first = chars[offset];

            let next = match self.nodes[parent].children.get(&first).copied() {
                Some(next) => next,
                None => {
                    let id = self.nodes.len();
                    let mut leaf = Node::new(doc, offset, limit, Some(parent));
                    if record {
                        leaf.locations.push(location);
                    }
                    self.nodes.push(leaf);
                    self.nodes[parent].children.insert(first, id);
                    return;
                }
            };

            let (next_doc, next_start, next_len) = {
                let n = &self.nodes[next];
                (n.doc, n.start, n.label_len())
            };
            let label = &self.docs[next_doc].chars[next_start..next_start + next_len];
            let common = remaining.min(next_len);
            let p = (0..common)
                .find(|&p| chars[offset + p] != label[p])
                .unwrap_or(common);

            if p < common {
                // Diverges inside the edge: split into a branch with two children
                let label_rest = label[p];
                let branch = self.nodes.len();
                self.nodes
                    .push(Node::new(next_doc, next_start, next_start + p, Some(parent)));
                let mut leaf = Node::new(doc, offset + p, limit, Some(branch));
                if record {
                    leaf.locations.push(location);
                }
                let leaf_id = self.nodes.len();
                let leaf_first = chars[offset + p];
                self.nodes.push(leaf);

                self.nodes[next].start += p;
                self.nodes[next].parent = Some(branch);
                let branch_node = &mut self.nodes[branch];
                branch_node.children.insert(leaf_first, leaf_id);
                branch_node.children.insert(label_rest, next);
                self.nodes[parent].children.insert(first, branch);
                return;
            }

            if remaining < next_len {
                // Runs out inside the edge: split at its end
                let label_rest = label[remaining];
                let mid = self.nodes.len();
                let mut mid_node =
                    Node::new(next_doc, next_start, next_start + remaining, Some(parent));
                if record {
                    mid_node.locations.push(location);
                }
                mid_node.children.insert(label_rest, next);
                self.nodes.push(mid_node);

                self.nodes[next].start += remaining;
                self.nodes[next].parent = Some(mid);
                self.nodes[parent].children.insert(first, mid);
                return;
            }

            if remaining == next_len {
                if record {
                    self.nodes[next].locations.push(location);
                }
                return;
            }

            offset += next_len;
            parent = next;
        }
    }

    /// Drop every recorded location, keeping the trie shape
    pub fn clear_locations(&mut self) -> usize {
        for node in &mut self.nodes {
            node.locations.clear();
        }
        self.stale = true;
        debug!("Cleared locations on {} nodes", self.nodes.len());
        self.nodes.len()
    }

    // ============================================
    // Statistics
    // ============================================

    /// Recompute `total` and `unique_count` for every node in one bottom-up
    /// pass. Does nothing when the statistics are already current.
    pub fn update_stats(&mut self) {
        if !self.stale {
            return;
        }

        let order = self.preorder(ROOT);
        let mut totals = vec![0usize; self.nodes.len()];
        let mut sets: Vec<Option<AHashSet<usize>>> = (0..self.nodes.len()).map(|_| None).collect();

        for &id in order.iter().rev() {
            let mut set = sets[id].take().unwrap_or_default();
            let node = &self.nodes[id];
            for loc in &node.locations {
                set.insert(self.docs[loc.doc].submission);
            }
            let total = totals[id] + node.locations.len();
            let unique_count = set.len();
            let parent = node.parent;

            let node = &mut self.nodes[id];
            node.total = total;
            node.unique_count = unique_count;

            if let Some(parent) = parent {
                totals[parent] += total;
                // Merge the smaller set into the larger one
                let slot = &mut sets[parent];
                match slot.take() {
                    None => *slot = Some(set),
                    Some(mut acc) => {
                        if acc.len() < set.len() {
                            std::mem::swap(&mut acc, &mut set);
                        }
                        acc.extend(set);
                        *slot = Some(acc);
                    }
                }
            }
        }

        self.stale = false;
    }

    fn ensure_fresh(&self) -> Result<()> {
        if self.stale {
            Err(AcError::StaleIndex)
        } else {
            Ok(())
        }
    }

    fn checked(&self, node: NodeId) -> Result<&Node> {
        self.nodes.get(node).ok_or(AcError::UnknownNode {
            node,
            len: self.nodes.len(),
        })
    }

    pub fn stats(&self, node: NodeId) -> Result<NodeStats> {
        self.ensure_fresh()?;
        let n = self.checked(node)?;
        Ok(NodeStats {
            total: n.total,
            unique_count: n.unique_count,
        })
    }

    // ============================================
    // Queries
    // ============================================

    /// Every non-root node whose subtree spans between `min` and `max`
    /// distinct submissions, recomputing statistics first if needed
    pub fn find_rare(&mut self, min: usize, max: usize) -> Vec<NodeId> {
        self.update_stats();
        self.collect_rare(min, max)
    }

    /// Like [`Self::find_rare`] but rejects a stale index instead of
    /// recomputing
    pub fn try_find_rare(&self, min: usize, max: usize) -> Result<Vec<NodeId>> {
        self.ensure_fresh()?;
        Ok(self.collect_rare(min, max))
    }

    fn collect_rare(&self, min: usize, max: usize) -> Vec<NodeId> {
        self.preorder(ROOT)
            .into_iter()
            .filter(|&id| id != ROOT)
            .filter(|&id| {
                let count = self.nodes[id].unique_count;
                count >= min && count <= max
            })
            .collect()
    }

    /// Whether no child carries the same number of submissions, so that the
    /// node's string cannot be extended without losing evidence
    pub fn is_maximal(&self, node: NodeId) -> Result<bool> {
        self.ensure_fresh()?;
        let n = self.checked(node)?;
        let count = n.unique_count;
        Ok(n.children
            .values()
            .all(|&c| self.nodes[c].unique_count != count))
    }

    /// Node whose path from the root starts with `s`
    pub fn find(&self, s: &str) -> Option<NodeId> {
        let wanted: Vec<char> = s.chars().collect();
        if wanted.is_empty() {
            return None;
        }

        let mut node = ROOT;
        let mut i = 0;
        loop {
            let next = *self.nodes[node].children.get(&wanted[i])?;
            for &c in self.label(next) {
                if wanted[i] != c {
                    return None;
                }
                i += 1;
                if i == wanted.len() {
                    return Some(next);
                }
            }
            node = next;
        }
    }

    // Node ids handed out by this index are always valid. The accessors
    // below index the arena directly and panic on an id from elsewhere;
    // `stats` and `is_maximal` report `UnknownNode` instead.

    /// Every location recorded in the node's subtree
    pub fn locations(&self, node: NodeId) -> Vec<Location> {
        self.preorder(node)
            .into_iter()
            .flat_map(|id| self.nodes[id].locations.iter().copied())
            .collect()
    }

    /// Full string spelled by the path from the root to `node`
    pub fn string(&self, node: NodeId) -> String {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes[id].parent;
        }
        chain
            .iter()
            .rev()
            .flat_map(|&id| self.label(id).iter())
            .collect()
    }

    /// Length in characters of [`Self::string`]
    pub fn depth(&self, node: NodeId) -> usize {
        let mut len = 0;
        let mut current = Some(node);
        while let Some(id) = current {
            len += self.nodes[id].label_len();
            current = self.nodes[id].parent;
        }
        len
    }

    pub fn submission_of(&self, doc: DocId) -> &str {
        &self.submissions[self.docs[doc].submission]
    }

    /// Distinct submissions with a location under `node`, sorted
    pub fn submissions_under(&self, node: NodeId) -> Vec<String> {
        let mut ids: Vec<usize> = self
            .locations(node)
            .iter()
            .map(|loc| self.docs[loc.doc].submission)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let mut names: Vec<String> = ids.into_iter().map(|i| self.submissions[i].clone()).collect();
        names.sort();
        names
    }

    fn label(&self, node: NodeId) -> &[char] {
        let n = &self.nodes[node];
        if n.start == n.end {
            return &[];
        }
        &self.docs[n.doc].chars[n.start..n.end]
    }

    fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.values().rev().copied());
        }
        order
    }
}
