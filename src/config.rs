//! Configuration file for docstamp.
//!
//! A config file sets project-wide defaults; command-line flags override it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::stamp::{StampOptions, Template, DEFAULT_TEMPLATE};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["docstamp.yaml", ".docstamp.yaml"];

/// Top-level config definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Text placed after `// <name> ` in synthesized comments (default: "...")
    #[serde(default)]
    pub template: Option<String>,
    /// Comment each exported entry of a parenthesized var/const group (default: false)
    #[serde(default)]
    pub per_entry_comment: Option<bool>,
    /// Whether to include `_test.go` files (default: false)
    #[serde(default)]
    pub include_test_files: Option<bool>,
    /// Glob patterns for paths to skip (e.g., "**/gen/**", "**/*.pb.go")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Find a config file in `dir`, if there is one.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Returns the template suffix (defaults to "...").
    pub fn get_template(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Returns whether to comment group entries individually (defaults to false).
    pub fn should_comment_per_entry(&self) -> bool {
        self.per_entry_comment.unwrap_or(false)
    }

    /// Returns whether to include test files (defaults to false).
    pub fn should_include_test_files(&self) -> bool {
        self.include_test_files.unwrap_or(false)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }

    /// Options for the stamping engine.
    pub fn stamp_options(&self) -> StampOptions {
        StampOptions {
            template: self.get_template().to_string(),
            per_entry_comment: self.should_comment_per_entry(),
        }
    }
}

/// Validate a config.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    Template::new(config.get_template())?;

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
