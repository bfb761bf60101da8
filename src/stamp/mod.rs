//! The stamping engine.
//!
//! One call to [`stamp`] processes one parsed file:
//!
//! ```text
//! SyntaxTree ──▶ CommentIndex::build ──▶ Walker (synthesizer per declaration)
//!                                              │
//!        modified? ◀── compare signatures ◀── project index onto tree
//! ```
//!
//! The engine holds no global state and does no I/O, so independent trees
//! can be stamped on different threads without coordination.

mod index;
mod synth;
mod template;
mod walker;

pub use index::CommentIndex;
pub use synth::{stamp_doc, DocAction, Variant};
pub use template::{Template, COMMENT_BASE, COMMENT_INDENTED_BASE, DEFAULT_TEMPLATE};
pub use walker::DocEdit;

use serde::Serialize;

use crate::error::StampError;
use crate::syntax::{CommentGroup, SyntaxTree};
use walker::Walker;

/// Options for one stamping pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampOptions {
    /// Suffix appended after `// <name> `.
    pub template: String,
    /// Give each exported entry of a parenthesized `var`/`const` group its
    /// own comment instead of one comment for the whole group.
    pub per_entry_comment: bool,
}

impl Default for StampOptions {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            per_entry_comment: false,
        }
    }
}

/// Result of one stamping pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StampOutcome {
    /// Whether any comment text in the file changed.
    pub modified: bool,
    /// The docs that were inserted or rewritten.
    pub edits: Vec<DocEdit>,
}

/// Stamp doc comments onto every exported declaration of `tree`.
///
/// The template is validated before the tree is touched, so on error the
/// tree is left exactly as it was.
pub fn stamp(tree: &mut SyntaxTree, options: &StampOptions) -> Result<StampOutcome, StampError> {
    let template = Template::new(&options.template)?;

    let before = comment_signature(&tree.comments);

    let mut index = CommentIndex::build(tree);
    let edits = Walker::new(&template, options.per_entry_comment, &mut index).walk(tree);
    tree.comments = index.into_comments(tree.root());

    let after = comment_signature(&tree.comments);

    Ok(StampOutcome {
        modified: before != after,
        edits,
    })
}

/// Concatenated text of every comment group.
pub fn comment_signature(groups: &[CommentGroup]) -> String {
    groups.iter().map(CommentGroup::text).collect()
}
