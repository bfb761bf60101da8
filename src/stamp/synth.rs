//! Comment synthesizer: the decision policy for a single doc comment.

use serde::Serialize;

use super::template::Template;
use crate::syntax::{Comment, CommentGroup};

/// Which template variant a declaration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    TopLevel,
    /// Entry inside a parenthesized `var`/`const` group.
    Indented,
}

/// What happened to a declaration's doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocAction {
    /// No doc existed; one was synthesized.
    Inserted,
    /// The doc was just the name; it was replaced.
    Replaced,
    /// The first line was a directive-style comment; a line was added above it.
    Prepended,
    /// The name was injected at the start of the first line.
    Rewritten,
    /// The doc was acceptable as is.
    Kept,
}

impl DocAction {
    pub fn changed(&self) -> bool {
        *self != DocAction::Kept
    }
}

/// Bring `doc` into shape for the declaration `name`.
///
/// `anchor` is the start offset of the declaration; freshly synthesized
/// comments are placed there.
pub fn stamp_doc(
    doc: &mut Option<CommentGroup>,
    name: &str,
    anchor: usize,
    template: &Template,
    variant: Variant,
) -> DocAction {
    let text = || match variant {
        Variant::TopLevel => template.render(name),
        Variant::Indented => template.render_indented(name),
    };

    let Some(group) = doc.as_mut() else {
        *doc = Some(CommentGroup::single(Comment::synthesized(text(), anchor)));
        return DocAction::Inserted;
    };

    if group.text().trim() == name {
        let pos = group.pos();
        *doc = Some(CommentGroup::single(Comment::synthesized(text(), pos)));
        return DocAction::Replaced;
    }

    if group.is_line_comment() && !has_name_prefix(group, name) {
        return modify(group, name, template);
    }

    DocAction::Kept
}

/// Whether the first doc line starts with `name` as a whole word.
fn has_name_prefix(group: &CommentGroup, name: &str) -> bool {
    group.first_line().split_whitespace().next() == Some(name)
}

fn modify(group: &mut CommentGroup, name: &str, template: &Template) -> DocAction {
    let pos = group.pos();
    let first = &mut group.list[0];
    let raw = first.text.trim_start();

    if raw.starts_with("//") && !raw.starts_with("// ") {
        group
            .list
            .insert(0, Comment::synthesized(template.render(name), pos));
        return DocAction::Prepended;
    }

    let rest = raw.strip_prefix("// ").unwrap_or(raw);
    first.text = Template::render_prefixed(name, rest);
    DocAction::Rewritten
}
