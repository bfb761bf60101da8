//! Command-line interface for docstamp.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::report;
use crate::runner::Runner;
use crate::syntax::{GoParser, SyntaxParser};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Doc comment stamper for Go sources.
///
/// Makes sure every exported function, method, type, var and const carries a
/// doc comment that starts with its name. Missing comments are synthesized
/// from a template; existing comments are only touched when they do not
/// start with the declaration name.
#[derive(Parser)]
#[command(name = "docstamp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to process
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Text placed after `// <Name> ` in synthesized comments
    #[arg(short, long)]
    pub template: Option<String>,

    /// Comment each exported entry of a parenthesized var/const group
    #[arg(short = 'p', long)]
    pub per_entry_comment: bool,

    /// Write stamped files back in place
    #[arg(short, long)]
    pub write: bool,

    /// Exit non-zero if any file would change (for pre-commit hooks)
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Print the stamped source of modified files instead of a report
    #[arg(long, conflicts_with = "write")]
    pub print: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also process `_test.go` files
    #[arg(long)]
    pub include_tests: bool,

    /// Log every decision
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Load the config file named on the command line, or discover one.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = match &cli.config {
        Some(p) => Some(p.clone()),
        None => Config::discover(Path::new(".")),
    };

    let mut config = match path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            Config::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("failed to parse config {}: {}", p.display(), e))?
        }
        None => Config::default(),
    };

    // Command-line flags win over the config file
    if let Some(template) = &cli.template {
        config.template = Some(template.clone());
    }
    if cli.per_entry_comment {
        config.per_entry_comment = Some(true);
    }
    if cli.include_tests {
        config.include_test_files = Some(true);
    }

    Ok(config)
}

/// Collect Go files to process under `root`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let parser = GoParser::new();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden, vendored and fixture directories
            !(name.starts_with('.') || name == "vendor" || name == "testdata")
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !parser.handles_extension(ext) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with("_test.go") && !config.should_include_test_files() {
            continue;
        }
        if config.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Run the tool.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = match load_config(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid configuration: {}", e);
        return Ok(EXIT_ERROR);
    }

    let mut files = Vec::new();
    for path in &cli.paths {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: cannot access path {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        };
        if metadata.is_dir() {
            files.extend(collect_files(path, &config)?);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        warn!("no Go files to process");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(config.stamp_options()).write(cli.write);
    let summary = runner.run(&files);

    if cli.print {
        report::write_sources(&summary);
    } else {
        match cli.format {
            Format::Json => report::write_json(&summary)?,
            Format::Pretty => report::write_pretty(&summary, cli.write, cli.verbose),
        }
    }

    if summary.has_errors() {
        Ok(EXIT_ERROR)
    } else if cli.check && summary.modified_count() > 0 {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    #[test]
    fn test_collect_files_filters() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "main.go");
        touch(temp.path(), "main_test.go");
        touch(temp.path(), "README.md");
        touch(temp.path(), "vendor/dep/dep.go");
        touch(temp.path(), "testdata/fixture.go");
        touch(temp.path(), ".git/hook.go");
        touch(temp.path(), "gen/api.go");
        touch(temp.path(), "pkg/lib.go");

        let config = Config {
            excluded_paths: vec!["**/gen/**".to_string()],
            ..Config::default()
        };
        let mut files: Vec<_> = collect_files(temp.path(), &config)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        files.sort();
        assert_eq!(files, vec!["main.go", "pkg/lib.go"]);

        let with_tests = Config {
            include_test_files: Some(true),
            ..Config::default()
        };
        let files = collect_files(temp.path(), &with_tests).unwrap();
        assert!(files.iter().any(|p| p.ends_with("main_test.go")));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from(["docstamp", "-p", "--check", "-t", "is exported.", "src"]);
        assert!(cli.per_entry_comment);
        assert!(cli.check);
        assert_eq!(cli.template.as_deref(), Some("is exported."));
        assert_eq!(cli.paths, vec![PathBuf::from("src")]);
        assert_eq!(cli.format, Format::Pretty);
    }

    #[test]
    fn test_write_conflicts_with_check() {
        assert!(Cli::try_parse_from(["docstamp", "--write", "--check"]).is_err());
    }
}
