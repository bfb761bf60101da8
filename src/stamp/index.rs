//! Comment index: which comment groups belong to which node.
//!
//! Each node owns at most one doc group plus any number of other groups that
//! sit inside it. The index is built once per pass, updated as docs are
//! stamped, then projected back into `SyntaxTree::comments`.

use std::collections::{BTreeMap, HashSet};

use crate::syntax::{Comment, CommentGroup, NodeId, SyntaxTree};

/// Text of the placeholder group used when a file has no comments at all.
const PLACEHOLDER: &str = "// docstamp";

#[derive(Debug, Default)]
struct Entry {
    doc: Option<CommentGroup>,
    floating: Vec<CommentGroup>,
}

/// Mapping from node id to its comment groups.
#[derive(Debug)]
pub struct CommentIndex {
    entries: BTreeMap<NodeId, Entry>,
    placeholder: bool,
}

impl CommentIndex {
    /// Associate every comment group of `tree` with a node.
    ///
    /// Doc groups go to the node they document. Everything else goes to the
    /// innermost node enclosing it, or the file root.
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut entries: BTreeMap<NodeId, Entry> = BTreeMap::new();
        let mut doc_positions = HashSet::new();

        for (id, node) in tree.nodes() {
            if let Some(doc) = &node.doc {
                doc_positions.insert(doc.pos());
                entries.entry(id).or_default().doc = Some(doc.clone());
            }
        }

        for group in &tree.comments {
            if doc_positions.contains(&group.pos()) {
                continue;
            }
            let owner = tree.innermost_containing(group.pos());
            entries.entry(owner).or_default().floating.push(group.clone());
        }

        let placeholder = tree.comments.is_empty();
        if placeholder {
            let group = CommentGroup::single(Comment::synthesized(PLACEHOLDER, 0));
            entries.entry(tree.root()).or_default().floating.insert(0, group);
        }

        Self {
            entries,
            placeholder,
        }
    }

    /// The doc group recorded for `id`.
    pub fn doc(&self, id: NodeId) -> Option<&CommentGroup> {
        self.entries.get(&id).and_then(|e| e.doc.as_ref())
    }

    /// Record `group` as the doc of `id`, replacing any previous doc.
    pub fn set_doc(&mut self, id: NodeId, group: CommentGroup) {
        self.entries.entry(id).or_default().doc = Some(group);
    }

    /// Total number of groups held, placeholder included.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|e| usize::from(e.doc.is_some()) + e.floating.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the index and return every group ordered by position.
    pub fn into_comments(mut self, root: NodeId) -> Vec<CommentGroup> {
        if self.placeholder {
            if let Some(entry) = self.entries.get_mut(&root) {
                entry.floating.remove(0);
            }
        }

        let mut groups: Vec<CommentGroup> = self
            .entries
            .into_values()
            .flat_map(|e| e.doc.into_iter().chain(e.floating))
            .collect();
        groups.sort_by_key(CommentGroup::pos);
        groups
    }
}
