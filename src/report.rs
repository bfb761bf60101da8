//! Output formatting for docstamp results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};

use crate::runner::{FileStatus, RunSummary};
use crate::stamp::DocAction;

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub files_scanned: usize,
    pub modified: usize,
    pub errors: usize,
    pub files: Vec<JsonFile>,
}

/// Per-file entry of the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<JsonDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One stamped doc comment.
#[derive(Serialize, Deserialize)]
pub struct JsonDoc {
    pub name: String,
    pub line: usize,
    pub action: String,
}

/// Build the JSON report for a run.
pub fn build_json(summary: &RunSummary) -> JsonReport {
    let files = summary
        .files
        .iter()
        .map(|f| JsonFile {
            path: f.path.clone(),
            status: f.status.to_string(),
            docs: f
                .edits
                .iter()
                .map(|e| JsonDoc {
                    name: e.name.clone(),
                    line: e.line,
                    action: action_label(e.action).to_string(),
                })
                .collect(),
            error: f.error.clone(),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        files_scanned: summary.scanned(),
        modified: summary.modified_count(),
        errors: summary.error_count(),
        files,
    }
}

/// Write results in JSON format.
pub fn write_json(summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&build_json(summary))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored terminal format.
///
/// `wrote` tells whether modified files were written back or only checked.
pub fn write_pretty(summary: &RunSummary, wrote: bool, verbose: bool) {
    for file in &summary.files {
        match file.status {
            FileStatus::Modified => {
                let label = if wrote { "stamped" } else { "would stamp" };
                println!("{} {}", label.yellow().bold(), file.path);
                for edit in &file.edits {
                    println!(
                        "  {}:{} {} {}",
                        file.path.dimmed(),
                        edit.line,
                        edit.name.cyan(),
                        action_label(edit.action).dimmed()
                    );
                }
            }
            FileStatus::Error => {
                println!(
                    "{} {}: {}",
                    "error".red().bold(),
                    file.path,
                    file.error.as_deref().unwrap_or("unknown error")
                );
            }
            FileStatus::Unchanged => {
                if verbose {
                    println!("{} {}", "ok".green(), file.path);
                }
            }
        }
    }

    println!();
    let modified = summary.modified_count();
    let headline = format!(
        "{} file(s) scanned, {} {}, {} error(s)",
        summary.scanned(),
        modified,
        if wrote { "stamped" } else { "need stamping" },
        summary.error_count()
    );
    if summary.has_errors() {
        println!("{}", headline.red());
    } else if modified > 0 {
        println!("{}", headline.yellow());
    } else {
        println!("{}", headline.green());
    }
}

/// Print the rewritten source of every modified file.
pub fn write_sources(summary: &RunSummary) {
    for file in &summary.files {
        if let Some(output) = &file.output {
            print!("{}", output);
        }
    }
}

fn action_label(action: DocAction) -> &'static str {
    match action {
        DocAction::Inserted => "inserted",
        DocAction::Replaced => "replaced",
        DocAction::Prepended => "prepended",
        DocAction::Rewritten => "rewritten",
        DocAction::Kept => "kept",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FileOutcome;
    use crate::stamp::DocEdit;

    #[test]
    fn test_json_report_shape() {
        let summary = RunSummary {
            files: vec![
                FileOutcome {
                    path: "a.go".to_string(),
                    status: FileStatus::Modified,
                    edits: vec![DocEdit {
                        name: "Serve".to_string(),
                        line: 3,
                        action: DocAction::Inserted,
                    }],
                    error: None,
                    output: Some(String::new()),
                },
                FileOutcome {
                    path: "b.go".to_string(),
                    status: FileStatus::Error,
                    edits: vec![],
                    error: Some("failed to parse".to_string()),
                    output: None,
                },
            ],
        };

        let report = build_json(&summary);
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.modified, 1);
        assert_eq!(report.errors, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "modified");
        assert_eq!(json["files"][0]["docs"][0]["action"], "inserted");
        assert!(json["files"][0].get("error").is_none());
        assert_eq!(json["files"][1]["error"], "failed to parse");
        assert!(json["files"][1].get("docs").is_none());
    }
}
