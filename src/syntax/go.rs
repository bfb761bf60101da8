//! Go front end using tree-sitter.
//!
//! Builds a [`SyntaxTree`] with:
//! - Function and method declarations
//! - `var`/`const` groups and their entries
//! - Type declarations
//! - Local declaration markers for declarations inside function bodies
//! - Comment groups, with doc comments attached to the node they precede

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Language, Node as TsNode, Parser};

use super::{Comment, CommentGroup, NodeId, NodeKind, Span, SyntaxParser, SyntaxTree, ValueKeyword};
use crate::error::StampError;

/// Go language front end.
pub struct GoParser {
    language: Language,
}

impl GoParser {
    /// Create a new Go parser.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new tree-sitter parser for this thread.
    fn create_parser(&self, path: &Path) -> Result<Parser, StampError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| StampError::parse(path, e.to_string()))?;
        Ok(parser)
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxParser for GoParser {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, StampError> {
        let mut parser = self.create_parser(path)?;
        let ts_tree = parser
            .parse(source, None)
            .ok_or_else(|| StampError::parse(path, "parser produced no tree"))?;

        let root = ts_tree.root_node();
        if root.has_error() {
            let at = first_error(root)
                .map(|n| Span::from_node(n).to_string())
                .unwrap_or_else(|| "unknown position".to_string());
            return Err(StampError::parse(path, format!("syntax error at {}", at)));
        }

        let mut builder = TreeBuilder::new(path, source, root);
        let root_id = builder.tree.root();
        builder.build_children(root, root_id);
        Ok(builder.finish())
    }
}

/// Locate the first ERROR or MISSING node in document order.
///
/// Some recoveries flag a subtree without leaving either kind of node; the
/// first error-bearing node with no error-bearing children stands in then.
fn first_error(root: TsNode) -> Option<TsNode> {
    let mut cursor = root.walk();
    let mut innermost = None;
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if innermost.is_none() && node.has_error() {
            let mut children = node.walk();
            if !node.children(&mut children).any(|c| c.has_error()) {
                innermost = Some(node);
            }
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return innermost;
            }
        }
    }
}

/// A comment group plus what the grouping pass learned about it.
struct GroupInfo {
    group: CommentGroup,
    end_byte: usize,
    /// The group starts on a line that already holds code.
    trailing: bool,
}

struct TreeBuilder<'a> {
    source: &'a str,
    tree: SyntaxTree,
    groups: Vec<GroupInfo>,
    /// Group index keyed by the end byte of its last comment, trailing blanks trimmed.
    groups_by_end: HashMap<usize, usize>,
}

impl<'a> TreeBuilder<'a> {
    fn new(path: &Path, source: &'a str, root: TsNode) -> Self {
        let tree = SyntaxTree::new(
            path.to_string_lossy().to_string(),
            source.to_string(),
            Span::from_node(root),
        );

        let mut comments = Vec::new();
        collect_comments(root, &mut comments);
        let groups = group_comments(source, &comments);
        let groups_by_end = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (source[..g.end_byte].trim_end().len(), i))
            .collect();

        Self {
            source,
            tree,
            groups,
            groups_by_end,
        }
    }

    fn finish(mut self) -> SyntaxTree {
        let groups = self.groups.into_iter().map(|g| g.group).collect();
        self.tree.set_source_comments(groups);
        self.tree
    }

    fn text(&self, node: TsNode) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// The comment group directly above `node`, if any.
    ///
    /// The group must end on the previous line with only whitespace in between,
    /// and must not trail code on its own first line.
    fn doc_for(&self, node: TsNode) -> Option<CommentGroup> {
        let start = node.start_byte();
        let before = self.source[..start].trim_end();
        let gap = &self.source[before.len()..start];
        if gap.matches('\n').count() != 1 {
            return None;
        }
        let info = &self.groups[*self.groups_by_end.get(&before.len())?];
        if info.trailing {
            return None;
        }
        Some(info.group.clone())
    }

    fn build_children(&mut self, node: TsNode, parent: NodeId) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            self.build_node(child, node, parent);
        }
    }

    fn build_node(&mut self, node: TsNode, ts_parent: TsNode, parent: NodeId) {
        match node.kind() {
            "comment" => {}
            "function_declaration" | "method_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let id = self.push_decl(parent, NodeKind::FunctionDecl { name }, node);
                self.build_children(node, id);
            }
            "var_declaration" | "const_declaration" | "type_declaration" => {
                // Kind is patched once the wrapped declaration has an id.
                let marker = (ts_parent.kind() != "source_file")
                    .then(|| self.tree.push(parent, NodeKind::Other, Span::from_node(node)));
                let owner = marker.unwrap_or(parent);
                let decl = if node.kind() == "type_declaration" {
                    self.build_type_decl(node, owner)
                } else {
                    self.build_value_group(node, owner)
                };
                if let Some(marker) = marker {
                    self.tree.node_mut(marker).kind = NodeKind::LocalDeclMarker { decl };
                }
            }
            _ => {
                if node.named_child_count() == 0 {
                    return;
                }
                let id = self.tree.push(parent, NodeKind::Other, Span::from_node(node));
                self.build_children(node, id);
            }
        }
    }

    fn push_decl(&mut self, parent: NodeId, kind: NodeKind, node: TsNode) -> NodeId {
        let doc = self.doc_for(node);
        let id = self.tree.push(parent, kind, Span::from_node(node));
        self.tree.node_mut(id).doc = doc;
        id
    }

    fn build_value_group(&mut self, node: TsNode, parent: NodeId) -> NodeId {
        let (keyword, spec_kind) = if node.kind() == "const_declaration" {
            (ValueKeyword::Const, "const_spec")
        } else {
            (ValueKeyword::Var, "var_spec")
        };
        let parenthesized = is_parenthesized(node);
        let id = self.push_decl(
            parent,
            NodeKind::ValueGroup {
                keyword,
                parenthesized,
            },
            node,
        );

        for spec in specs(node, &[spec_kind]) {
            let names = field_texts(spec, "name", self.source);
            let entry = self.tree.push(id, NodeKind::ValueEntry { names }, Span::from_node(spec));
            if parenthesized {
                let doc = self.doc_for(spec);
                self.tree.node_mut(entry).doc = doc;
            }
            // Values may hold function literals with their own declarations.
            self.build_children(spec, entry);
        }
        id
    }

    fn build_type_decl(&mut self, node: TsNode, parent: NodeId) -> NodeId {
        let names = specs(node, &["type_spec", "type_alias"])
            .into_iter()
            .flat_map(|spec| field_texts(spec, "name", self.source))
            .collect();
        self.push_decl(parent, NodeKind::TypeDecl { names }, node)
    }
}

/// Spec nodes of a declaration, looking through `*_spec_list` wrappers.
fn specs<'t>(node: TsNode<'t>, kinds: &[&str]) -> Vec<TsNode<'t>> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            found.push(child);
        } else if child.kind().ends_with("_spec_list") {
            let mut inner = child.walk();
            found.extend(child.named_children(&mut inner).filter(|c| kinds.contains(&c.kind())));
        }
    }
    found
}

/// Whether a declaration uses the `( ... )` multi-entry form.
fn is_parenthesized(node: TsNode) -> bool {
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.iter().any(|c| {
        c.kind() == "(" || (c.kind().ends_with("_spec_list") && c.child(0).is_some_and(|p| p.kind() == "("))
    })
}

fn field_texts(node: TsNode, field: &str, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .map(|n| source[n.byte_range()].to_string())
        .collect()
}

/// Collect every comment node in document order.
fn collect_comments<'t>(node: TsNode<'t>, out: &mut Vec<TsNode<'t>>) {
    if node.kind() == "comment" {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        collect_comments(child, out);
    }
}

/// Split comments into groups.
///
/// Comments separated only by whitespace with at most one newline belong to
/// the same group. A comment that trails code on its line starts a group that
/// only takes further comments from that same line.
fn group_comments(source: &str, comments: &[TsNode]) -> Vec<GroupInfo> {
    let mut groups: Vec<GroupInfo> = Vec::new();

    for node in comments {
        let span = Span::from_node(*node);
        let comment = Comment::from_source(&source[node.byte_range()], span);

        if let Some(current) = groups.last_mut() {
            let gap = &source[current.end_byte..span.start_byte];
            let newlines = gap.matches('\n').count();
            let limit = if current.trailing { 0 } else { 1 };
            if gap.trim().is_empty() && newlines <= limit {
                current.group.list.push(comment);
                current.end_byte = span.end_byte;
                continue;
            }
        }

        let line_start = source[..span.start_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let trailing = !source[line_start..span.start_byte].trim().is_empty();
        groups.push(GroupInfo {
            group: CommentGroup::single(comment),
            end_byte: span.end_byte,
            trailing,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_go(source: &str) -> SyntaxTree {
        GoParser::new()
            .parse(Path::new("test.go"), source)
            .unwrap()
    }

    fn kinds(tree: &SyntaxTree) -> Vec<NodeKind> {
        tree.nodes()
            .map(|(_, n)| n.kind.clone())
            .filter(|k| *k != NodeKind::Other && *k != NodeKind::File)
            .collect()
    }

    #[test]
    fn test_handles_go_extension_only() {
        let parser = GoParser::new();
        assert_eq!(parser.language_id(), "go");
        assert!(parser.handles_extension("go"));
        assert!(!parser.handles_extension("rs"));
        assert!(!parser.handles_extension(""));
    }

    #[test]
    fn test_functions_and_methods() {
        let tree = parse_go(
            r#"
package main

func main() {}

func (c *Config) Validate() error {
    return nil
}
"#,
        );
        let kinds = kinds(&tree);
        assert!(kinds.contains(&NodeKind::FunctionDecl { name: "main".to_string() }));
        assert!(kinds.contains(&NodeKind::FunctionDecl { name: "Validate".to_string() }));
    }

    #[test]
    fn test_value_groups() {
        let tree = parse_go(
            r#"
package main

const Version = "1.0"

var (
    A = 1
    B, C = 2, 3
)
"#,
        );
        let groups: Vec<_> = tree
            .nodes()
            .filter_map(|(id, n)| match n.kind {
                NodeKind::ValueGroup { keyword, parenthesized } => Some((id, keyword, parenthesized)),
                _ => None,
            })
            .collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, ValueKeyword::Const);
        assert!(!groups[0].2);
        assert_eq!(groups[1].1, ValueKeyword::Var);
        assert!(groups[1].2);

        let entries: Vec<_> = tree
            .node(groups[1].0)
            .children
            .iter()
            .map(|&c| tree.node(c).kind.clone())
            .collect();
        assert_eq!(
            entries,
            vec![
                NodeKind::ValueEntry { names: vec!["A".to_string()] },
                NodeKind::ValueEntry { names: vec!["B".to_string(), "C".to_string()] },
            ]
        );
    }

    #[test]
    fn test_empty_value_group() {
        let tree = parse_go("package main\n\nvar ()\n");
        let (id, _) = tree
            .nodes()
            .find(|(_, n)| matches!(n.kind, NodeKind::ValueGroup { .. }))
            .unwrap();
        assert!(tree.node(id).children.is_empty());
        assert_eq!(
            tree.node(id).kind,
            NodeKind::ValueGroup { keyword: ValueKeyword::Var, parenthesized: true }
        );
    }

    #[test]
    fn test_local_declarations_are_marked() {
        let tree = parse_go(
            r#"
package main

func run() {
    var Local = 1
    type Inner struct{}
    _ = Local
}
"#,
        );
        let markers: Vec<NodeId> = tree
            .nodes()
            .filter_map(|(_, n)| match n.kind {
                NodeKind::LocalDeclMarker { decl } => Some(decl),
                _ => None,
            })
            .collect();
        assert_eq!(markers.len(), 2);
        assert!(matches!(tree.node(markers[0]).kind, NodeKind::ValueGroup { .. }));
        assert!(matches!(tree.node(markers[1]).kind, NodeKind::TypeDecl { .. }));
    }

    #[test]
    fn test_doc_attachment() {
        let tree = parse_go(
            r#"
package main

// Documented is documented.
// Second line.
func Documented() {}

// Floating comment.

func Undocumented() {}
"#,
        );
        let documented = tree.find_declaration("Documented").unwrap();
        let doc = tree.node(documented).doc.as_ref().unwrap();
        assert_eq!(doc.list.len(), 2);
        assert_eq!(doc.text(), "Documented is documented.\nSecond line.\n");

        let undocumented = tree.find_declaration("Undocumented").unwrap();
        assert!(tree.node(undocumented).doc.is_none());
        assert_eq!(tree.comments.len(), 2);
    }

    #[test]
    fn test_trailing_comment_is_not_doc() {
        let tree = parse_go(
            r#"
package main

var x = 1 // trailing
func Next() {}
"#,
        );
        let next = tree.find_declaration("Next").unwrap();
        assert!(tree.node(next).doc.is_none());
    }

    #[test]
    fn test_parenthesized_entry_docs() {
        let tree = parse_go(
            r#"
package main

// Group doc.
const (
    // A doc.
    A = 1
    B = 2
)
"#,
        );
        let (group, _) = tree
            .nodes()
            .find(|(_, n)| matches!(n.kind, NodeKind::ValueGroup { .. }))
            .unwrap();
        assert_eq!(tree.node(group).doc.as_ref().unwrap().text(), "Group doc.\n");

        let a = tree.find_declaration("A").unwrap();
        assert_eq!(tree.node(a).doc.as_ref().unwrap().text(), "A doc.\n");
        let b = tree.find_declaration("B").unwrap();
        assert!(tree.node(b).doc.is_none());
    }

    fn parse_error(source: &str) -> String {
        match GoParser::new().parse(Path::new("bad.go"), source) {
            Err(StampError::Parse { reason, .. }) => reason,
            other => panic!("expected parse failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let reason = parse_error("package main\n\nfunc (\n");
        assert!(reason.starts_with("syntax error at "));
    }

    #[test]
    fn test_syntax_error_always_has_position() {
        let position = regex::Regex::new(r"^syntax error at \d+:\d+$").unwrap();
        for source in [
            "package main\n\nfunc (\n",
            "package main\n\nvar ( A = 1; B = 2 )\n",
            "package main\n\nfunc Oops( {\n",
        ] {
            let reason = parse_error(source);
            assert!(position.is_match(&reason), "{:?} -> {}", source, reason);
        }
    }
}
