//! Doc comment templates.
//!
//! A template is the user supplied suffix appended to a fixed comment base:
//! `// %s ` followed by the suffix. The only verb allowed is `%s` (the
//! declaration name), and it must appear exactly once in the combined
//! pattern. `%%` is a literal percent sign.

use crate::error::StampError;

/// Comment base for top-level declarations.
pub const COMMENT_BASE: &str = "// %s ";

/// Comment base for entries inside a parenthesized `var`/`const` group.
pub const COMMENT_INDENTED_BASE: &str = "\t// %s ";

/// Suffix used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "...";

/// A validated doc comment template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
}

impl Template {
    /// Build a template from its suffix.
    pub fn new(suffix: &str) -> Result<Self, StampError> {
        let pattern = format!("{}{}", COMMENT_BASE, suffix);
        let verbs = count_verbs(&pattern).map_err(|reason| StampError::template(suffix, reason))?;
        if verbs != 1 {
            return Err(StampError::template(
                suffix,
                format!("expected exactly one name placeholder, found {}", verbs),
            ));
        }
        Ok(Self { pattern })
    }

    /// Comment text for a top-level declaration.
    pub fn render(&self, name: &str) -> String {
        fill(&self.pattern, name)
    }

    /// Comment text for an entry of a parenthesized group.
    pub fn render_indented(&self, name: &str) -> String {
        let indented = self.pattern.replacen(COMMENT_BASE, COMMENT_INDENTED_BASE, 1);
        fill(&indented, name)
    }

    /// Rewrite an existing first comment line so that it starts with `name`.
    ///
    /// `rest` is the original line with its `// ` prefix removed.
    pub fn render_prefixed(name: &str, rest: &str) -> String {
        let line = format!("{}{}", fill(COMMENT_BASE, name), rest);
        line.trim_end().to_string()
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            pattern: format!("{}{}", COMMENT_BASE, DEFAULT_TEMPLATE),
        }
    }
}

/// Count `%s` verbs, rejecting any other verb.
fn count_verbs(pattern: &str) -> Result<usize, String> {
    let mut count = 0;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.next() {
            Some('s') => count += 1,
            Some('%') => {}
            Some(other) => return Err(format!("unsupported verb %{}", other)),
            None => return Err("dangling % at end of template".to_string()),
        }
    }
    Ok(count)
}

/// Substitute `name` for every `%s` and unescape `%%`.
fn fill(pattern: &str, name: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + name.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push_str(name),
            Some(other) => out.push(other),
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template() {
        let template = Template::new(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(template.render("DoThing"), "// DoThing ...");
        assert_eq!(template, Template::default());
    }

    #[test]
    fn test_indented_variant() {
        let template = Template::new("is exported.").unwrap();
        assert_eq!(template.render("A"), "// A is exported.");
        assert_eq!(template.render_indented("A"), "\t// A is exported.");
    }

    #[test]
    fn test_percent_escape() {
        let template = Template::new("is 100%% done").unwrap();
        assert_eq!(template.render("X"), "// X is 100% done");
    }

    #[test]
    fn test_extra_placeholder_rejected() {
        let err = Template::new("%s again").unwrap_err();
        assert!(matches!(err, StampError::Template { .. }));
    }

    #[test]
    fn test_unknown_verb_rejected() {
        assert!(Template::new("has %d items").is_err());
        assert!(Template::new("ends with %").is_err());
    }

    #[test]
    fn test_render_prefixed() {
        assert_eq!(Template::render_prefixed("Run", "starts the job."), "// Run starts the job.");
        assert_eq!(Template::render_prefixed("Run", ""), "// Run");
    }
}
