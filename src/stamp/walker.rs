//! Declaration walker.
//!
//! Depth-first, pre-order walk over the tree using an explicit worklist.
//! Each node is dispatched on its [`NodeKind`]; documentable exported
//! declarations are handed to the synthesizer and the resulting doc is
//! written back to both the node and the comment index.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::index::CommentIndex;
use super::synth::{stamp_doc, DocAction, Variant};
use super::template::Template;
use crate::syntax::{is_exported, NodeId, NodeKind, SyntaxTree};

/// A doc comment the walker changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocEdit {
    /// Name the doc was stamped for.
    pub name: String,
    /// Line of the declaration (1-indexed).
    pub line: usize,
    pub action: DocAction,
}

pub(crate) struct Walker<'a> {
    template: &'a Template,
    per_entry_comment: bool,
    index: &'a mut CommentIndex,
    /// Declarations found inside function bodies.
    shadowed: HashSet<NodeId>,
    edits: Vec<DocEdit>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(template: &'a Template, per_entry_comment: bool, index: &'a mut CommentIndex) -> Self {
        Self {
            template,
            per_entry_comment,
            index,
            shadowed: HashSet::new(),
            edits: Vec::new(),
        }
    }

    /// Walk the whole tree and return the docs that changed.
    pub(crate) fn walk(mut self, tree: &mut SyntaxTree) -> Vec<DocEdit> {
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            self.visit(tree, id);
            stack.extend(tree.node(id).children.iter().rev().copied());
        }
        self.edits
    }

    fn visit(&mut self, tree: &mut SyntaxTree, id: NodeId) {
        match tree.node(id).kind.clone() {
            NodeKind::FunctionDecl { name } => {
                if self.shadowed.contains(&id) || !is_exported(&name) {
                    return;
                }
                self.stamp(tree, id, &name, Variant::TopLevel);
            }
            NodeKind::LocalDeclMarker { decl } => {
                self.shadowed.insert(decl);
            }
            NodeKind::ValueGroup {
                keyword,
                parenthesized,
            } => {
                if self.shadowed.contains(&id) {
                    return;
                }
                let children = tree.node(id).children.clone();

                if parenthesized && self.per_entry_comment {
                    debug!(
                        keyword = keyword.as_str(),
                        entries = children.len(),
                        line = tree.node(id).span.start_line,
                        "stamping group entries individually"
                    );
                    for entry in children {
                        if let Some(name) = first_name(tree, entry).filter(|n| is_exported(n)) {
                            self.stamp(tree, entry, &name, Variant::Indented);
                        }
                    }
                    return;
                }

                let Some(&first) = children.first() else {
                    return;
                };
                if let Some(name) = first_name(tree, first).filter(|n| is_exported(n)) {
                    self.stamp(tree, id, &name, Variant::TopLevel);
                }
            }
            NodeKind::TypeDecl { names } => {
                if self.shadowed.contains(&id) {
                    return;
                }
                if let Some(name) = names.first().filter(|n| is_exported(n)) {
                    self.stamp(tree, id, name, Variant::TopLevel);
                }
            }
            NodeKind::File | NodeKind::ValueEntry { .. } | NodeKind::Other => {}
        }
    }

    fn stamp(&mut self, tree: &mut SyntaxTree, id: NodeId, name: &str, variant: Variant) {
        let node = tree.node_mut(id);
        let anchor = node.span.start_byte;
        let action = stamp_doc(&mut node.doc, name, anchor, self.template, variant);

        if let Some(doc) = &node.doc {
            self.index.set_doc(id, doc.clone());
        }

        if action.changed() {
            debug!(name, line = node.span.start_line, ?action, "stamped doc comment");
            self.edits.push(DocEdit {
                name: name.to_string(),
                line: node.span.start_line,
                action,
            });
        }
    }
}

/// First declared name of a value entry.
fn first_name(tree: &SyntaxTree, entry: NodeId) -> Option<String> {
    match &tree.node(entry).kind {
        NodeKind::ValueEntry { names } => names.first().cloned(),
        _ => None,
    }
}
