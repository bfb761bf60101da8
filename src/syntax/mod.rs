//! Syntax tree model shared by the parser, the stamping engine and the renderer.
//!
//! The tree is an arena of [`Node`]s addressed by [`NodeId`]. Ids are assigned
//! once while the tree is built and never change, so side tables (such as the
//! comment index) can key on them instead of on node identity.
//!
//! Only the shapes the stamping engine cares about get a dedicated
//! [`NodeKind`]; every other syntax container is kept as `Other` so that a
//! depth-first walk still reaches nested declarations.

mod go;
mod render;

pub use go::GoParser;
pub use render::render;

use std::fmt;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::StampError;

lazy_static! {
    /// Tool directives such as `//go:generate`, `//nolint:foo`, `//line`.
    ///
    /// Matched against the comment text with the leading `//` removed.
    static ref DIRECTIVE: Regex = Regex::new(r"^(?:line |extern |export |[a-z0-9]+:[a-z0-9])").unwrap();
}

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Whether `offset` falls inside this span.
    pub fn contains(&self, offset: usize) -> bool {
        self.start_byte <= offset && offset < self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Reports whether a Go identifier is exported (starts with an upper-case letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// A single `//` or `/* */` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Raw comment text including its delimiters.
    pub text: String,
    /// Where the comment sits in the original source. `None` for synthesized comments.
    pub span: Option<Span>,
    /// Ordering key: the source offset, or the anchor offset of a synthesized comment.
    pub pos: usize,
}

impl Comment {
    /// A comment read from the source file.
    pub fn from_source(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span: Some(span),
            pos: span.start_byte,
        }
    }

    /// A comment created by the engine, placed before the code at `pos`.
    pub fn synthesized(text: impl Into<String>, pos: usize) -> Self {
        Self {
            text: text.into(),
            span: None,
            pos,
        }
    }

    /// Whether this is a `//` comment.
    pub fn is_line(&self) -> bool {
        self.text.trim_start().starts_with("//")
    }
}

/// An ordered run of comments with no blank line or code between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    pub fn new(list: Vec<Comment>) -> Self {
        Self { list }
    }

    /// A group holding one comment.
    pub fn single(comment: Comment) -> Self {
        Self {
            list: vec![comment],
        }
    }

    /// Ordering key of the group (its first comment).
    pub fn pos(&self) -> usize {
        self.list.first().map(|c| c.pos).unwrap_or(0)
    }

    /// Whether every comment in the group is a `//` comment.
    pub fn is_line_comment(&self) -> bool {
        !self.list.is_empty() && self.list.iter().all(Comment::is_line)
    }

    /// The documentation text of the group.
    ///
    /// Comment markers, the first space after `//`, directive lines and
    /// trailing whitespace are removed. Leading and trailing blank lines are
    /// dropped and runs of blank lines are collapsed to one. A non-empty
    /// result always ends in a newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for comment in &self.list {
            let raw = comment.text.trim_start();
            let body = if let Some(rest) = raw.strip_prefix("//") {
                if let Some(rest) = rest.strip_prefix(' ') {
                    rest
                } else if DIRECTIVE.is_match(rest) {
                    continue;
                } else {
                    rest
                }
            } else if let Some(rest) = raw.strip_prefix("/*") {
                rest.strip_suffix("*/").unwrap_or(rest)
            } else {
                raw
            };

            lines.extend(body.split('\n').map(|l| l.trim_end().to_string()));
        }

        let mut kept: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            if !line.is_empty() || kept.last().is_some_and(|prev| !prev.is_empty()) {
                kept.push(line);
            }
        }
        if kept.last().is_some_and(|last| !last.is_empty()) {
            kept.push(String::new());
        }

        kept.join("\n")
    }

    /// First line of [`CommentGroup::text`].
    pub fn first_line(&self) -> String {
        self.text().lines().next().unwrap_or("").to_string()
    }
}

/// Stable index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// `var` or `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKeyword {
    Var,
    Const,
}

impl ValueKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKeyword::Var => "var",
            ValueKeyword::Const => "const",
        }
    }
}

/// Closed set of node shapes the stamping engine distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The file root.
    File,
    /// A function or method declaration.
    FunctionDecl { name: String },
    /// A declaration statement inside a function body. Wraps `decl`.
    LocalDeclMarker { decl: NodeId },
    /// A `var` or `const` declaration; children are its entries.
    ValueGroup {
        keyword: ValueKeyword,
        parenthesized: bool,
    },
    /// One spec line of a value group, e.g. `A, B = 1, 2`.
    ValueEntry { names: Vec<String> },
    /// A `type` declaration.
    TypeDecl { names: Vec<String> },
    /// Any other syntax container.
    Other,
}

/// A node of the syntax tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Doc comment attached directly before the node.
    pub doc: Option<CommentGroup>,
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// File path (for error reporting).
    pub path: String,
    /// Original source text.
    pub source: String,
    /// Every comment group in the file, ordered by position.
    pub comments: Vec<CommentGroup>,
    nodes: Vec<Node>,
    /// Spans of the comments as they were parsed, used by the renderer.
    source_comments: Vec<Span>,
}

impl SyntaxTree {
    pub(crate) fn new(path: String, source: String, root_span: Span) -> Self {
        let root = Node {
            kind: NodeKind::File,
            span: root_span,
            parent: None,
            children: Vec::new(),
            doc: None,
        };
        Self {
            path,
            source,
            comments: Vec::new(),
            nodes: vec![root],
            source_comments: Vec::new(),
        }
    }

    /// The file root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// All nodes with their ids, in creation (pre-order) order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Append a node under `parent` and return its id.
    pub(crate) fn push(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
            doc: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn set_source_comments(&mut self, groups: Vec<CommentGroup>) {
        self.source_comments = groups
            .iter()
            .flat_map(|g| g.list.iter().filter_map(|c| c.span))
            .collect();
        self.comments = groups;
    }

    /// Spans of the comments present when the file was parsed.
    pub fn source_comments(&self) -> &[Span] {
        &self.source_comments
    }

    /// The deepest node whose span contains `offset`; the root if none does.
    pub fn innermost_containing(&self, offset: usize) -> NodeId {
        let mut current = self.root();
        'descend: loop {
            for &child in &self.node(current).children {
                if self.node(child).span.contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Find the first declaration node declaring `name`.
    pub fn find_declaration(&self, name: &str) -> Option<NodeId> {
        self.nodes().find_map(|(id, node)| {
            let declares = match &node.kind {
                NodeKind::FunctionDecl { name: n } => n == name,
                NodeKind::ValueEntry { names } | NodeKind::TypeDecl { names } => {
                    names.iter().any(|n| n == name)
                }
                _ => false,
            };
            declares.then_some(id)
        })
    }
}

/// Front end that turns source text into a [`SyntaxTree`].
///
/// Parsers are stateless between files; implementations create any per-call
/// parser state internally so one instance can be shared across threads.
pub trait SyntaxParser: Send + Sync {
    /// Returns the language identifier (e.g., "go").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this parser handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse a source file.
    ///
    /// Fails with [`StampError::Parse`] when the source is not well formed.
    fn parse(&self, path: &Path, source: &str) -> Result<SyntaxTree, StampError>;

    /// Check if this parser handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Comment {
        Comment::synthesized(text, 0)
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("DoThing"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("doThing"));
        assert!(!is_exported("_Hidden"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_group_text_strips_markers() {
        let group = CommentGroup::new(vec![line("// Foo does things."), line("//   indented")]);
        assert_eq!(group.text(), "Foo does things.\n  indented\n");
    }

    #[test]
    fn test_group_text_skips_directives() {
        let group = CommentGroup::new(vec![line("// Run runs."), line("//nolint:errcheck")]);
        assert_eq!(group.text(), "Run runs.\n");

        let directive_only = CommentGroup::single(line("//go:generate stringer"));
        assert_eq!(directive_only.text(), "");
    }

    #[test]
    fn test_group_text_block_comment() {
        let group = CommentGroup::single(line("/*\nFoo is a thing.\n\n\nMore.\n*/"));
        assert_eq!(group.text(), "Foo is a thing.\n\nMore.\n");
    }

    #[test]
    fn test_group_text_indented_comment() {
        let group = CommentGroup::single(line("\t// A ..."));
        assert_eq!(group.text(), "A ...\n");
        assert_eq!(group.first_line(), "A ...");
    }

    #[test]
    fn test_is_line_comment() {
        assert!(CommentGroup::single(line("// x")).is_line_comment());
        assert!(!CommentGroup::single(line("/* x */")).is_line_comment());
        assert!(!CommentGroup::new(vec![line("// x"), line("/* y */")]).is_line_comment());
    }
}
