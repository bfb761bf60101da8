//! Render a stamped tree back to source text.
//!
//! Only comment bytes change. The original source is copied through and the
//! differences between the parsed comments and `SyntaxTree::comments` are
//! spliced in:
//! - a parsed comment whose text changed is replaced in place
//! - a parsed comment that is gone is removed, together with its line when
//!   nothing else lives there
//! - a synthesized comment becomes a new line above its anchor, indented
//!   like the anchor line; an anchor that does not start its line is first
//!   moved onto a line of its own
//!
//! Inserted lines use the line ending of the line they are inserted into.

use std::collections::HashSet;

use super::{Span, SyntaxTree};

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Produce the source text of `tree` with its current comments.
pub fn render(tree: &SyntaxTree) -> String {
    let source = tree.source.as_str();
    let mut edits = Vec::new();
    let mut present = HashSet::new();

    for comment in tree.comments.iter().flat_map(|g| g.list.iter()) {
        match comment.span {
            Some(span) => {
                present.insert(span.start_byte);
                let original = &source[span.start_byte..span.end_byte];
                if original != comment.text {
                    let mut text = comment.text.clone();
                    if original.ends_with('\r') && !text.ends_with('\r') {
                        text.push('\r');
                    }
                    edits.push(Edit {
                        start: span.start_byte,
                        end: span.end_byte,
                        text,
                    });
                }
            }
            None => edits.push(insertion(source, comment.pos.min(source.len()), &comment.text)),
        }
    }

    for span in tree.source_comments() {
        if !present.contains(&span.start_byte) {
            edits.push(removal(source, span));
        }
    }

    // Insertions are empty ranges, so they sort ahead of a removal at the same offset.
    edits.sort_by_key(|e| (e.start, e.end));

    let mut out = String::with_capacity(source.len() + edits.iter().map(|e| e.text.len()).sum::<usize>());
    let mut cursor = 0;
    for edit in edits {
        if edit.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..edit.start]);
        out.push_str(&edit.text);
        cursor = edit.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Insertion edit placing `text` on its own line above the code at `anchor`.
fn insertion(source: &str, anchor: usize, text: &str) -> Edit {
    let at = line_start(source, anchor);
    let indent = indentation(source, at);
    let eol = line_ending(source, at);
    let body = text.trim_start();

    if source[at..anchor].trim().is_empty() {
        return Edit {
            start: at,
            end: at,
            text: format!("{indent}{body}{eol}"),
        };
    }

    // The anchor shares its line with earlier code: break the line before it.
    // Leading whitespace of `text` (the indented variant) adds to the line's indent.
    let extra = &text[..text.len() - body.len()];
    let start = source[..anchor].trim_end_matches([' ', '\t']).len();
    Edit {
        start,
        end: anchor,
        text: format!("{eol}{indent}{extra}{body}{eol}{indent}{extra}"),
    }
}

/// Removal edit for a parsed comment that no longer exists.
fn removal(source: &str, span: &Span) -> Edit {
    let start = line_start(source, span.start_byte);
    let end = source[span.end_byte..]
        .find('\n')
        .map(|i| span.end_byte + i + 1)
        .unwrap_or(source.len());

    let alone = source[start..span.start_byte].trim().is_empty()
        && source[span.end_byte..end].trim().is_empty();
    if alone {
        return Edit {
            start,
            end,
            text: String::new(),
        };
    }

    let before = source[..span.start_byte].trim_end_matches([' ', '\t']);
    Edit {
        start: before.len().max(start),
        end: span.end_byte,
        text: String::new(),
    }
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// `"\r\n"` when the line starting at `line_start` ends with one, else `"\n"`.
fn line_ending(source: &str, line_start: usize) -> &'static str {
    let line = &source[line_start..];
    let end = line.find('\n').unwrap_or(line.len());
    if line[..end].ends_with('\r') {
        "\r\n"
    } else {
        "\n"
    }
}

fn indentation(source: &str, line_start: usize) -> &str {
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Comment, CommentGroup, GoParser, SyntaxParser};
    use std::path::Path;

    fn parse(source: &str) -> SyntaxTree {
        GoParser::new().parse(Path::new("render.go"), source).unwrap()
    }

    #[test]
    fn test_unchanged_tree_renders_verbatim() {
        let source = "package main\n\n// Foo is foo.\nfunc Foo() {}\n\nvar x = 1 // trailing\n";
        let tree = parse(source);
        assert_eq!(render(&tree), source);
    }

    #[test]
    fn test_insert_uses_anchor_indentation() {
        let source = "package main\n\nconst (\n    A = 1\n)\n";
        let mut tree = parse(source);
        let anchor = source.find("A = 1").unwrap();
        tree.comments
            .push(CommentGroup::single(Comment::synthesized("\t// A ...", anchor)));
        assert_eq!(
            render(&tree),
            "package main\n\nconst (\n    // A ...\n    A = 1\n)\n"
        );
    }

    #[test]
    fn test_replace_changed_comment() {
        let source = "package main\n\n// does things\nfunc Foo() {}\n";
        let mut tree = parse(source);
        tree.comments[0].list[0].text = "// Foo does things".to_string();
        assert_eq!(render(&tree), "package main\n\n// Foo does things\nfunc Foo() {}\n");
    }

    #[test]
    fn test_removed_comment_takes_its_line() {
        let source = "package main\n\n// Foo\nfunc Foo() {}\n";
        let mut tree = parse(source);
        let pos = tree.comments[0].pos();
        tree.comments = vec![CommentGroup::single(Comment::synthesized("// Foo ...", pos))];
        assert_eq!(render(&tree), "package main\n\n// Foo ...\nfunc Foo() {}\n");
    }

    #[test]
    fn test_mid_line_anchor_gets_its_own_line() {
        let source = "package main\n\ntype T int; func (T) M() {}\n";
        let mut tree = parse(source);
        let anchor = source.find("func").unwrap();
        tree.comments
            .push(CommentGroup::single(Comment::synthesized("// M ...", anchor)));
        assert_eq!(
            render(&tree),
            "package main\n\ntype T int;\n// M ...\nfunc (T) M() {}\n"
        );
    }

    #[test]
    fn test_mid_line_entry_is_indented() {
        let source = "package main\n\nvar ( A = 1; B = 2; )\n";
        let mut tree = parse(source);
        let anchor = source.find("B = 2").unwrap();
        tree.comments
            .push(CommentGroup::single(Comment::synthesized("\t// B ...", anchor)));
        assert_eq!(
            render(&tree),
            "package main\n\nvar ( A = 1;\n\t// B ...\n\tB = 2; )\n"
        );
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let source = "package main\r\n\r\n// does things\r\nfunc Foo() {}\r\n\r\nfunc Bar() {}\r\n";
        let mut tree = parse(source);
        tree.comments[0].list[0].text = "// Foo does things".to_string();
        let anchor = source.find("func Bar").unwrap();
        tree.comments
            .push(CommentGroup::single(Comment::synthesized("// Bar ...", anchor)));
        assert_eq!(
            render(&tree),
            "package main\r\n\r\n// Foo does things\r\nfunc Foo() {}\r\n\r\n// Bar ...\r\nfunc Bar() {}\r\n"
        );
    }
}
