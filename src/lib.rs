//! Docstamp - doc comment stamper for Go sources.
//!
//! Docstamp makes sure every exported declaration in a Go file carries a doc
//! comment that starts with the declaration's name. Missing or trivial docs
//! are synthesized from a template, misnamed line comments get the name
//! injected, and everything else is left alone. A file is only rewritten
//! when its comment text actually changed, and a second pass is always a
//! no-op.
//!
//! # Architecture
//!
//! - `syntax`: syntax tree model, tree-sitter Go front end and the renderer
//!   that splices comment edits back into the source
//! - `stamp`: the engine (comment index, declaration walker, synthesizer,
//!   modification detection)
//! - `config`: YAML config file
//! - `runner`: per-file pipeline, parallel over files
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use docstamp::{render, stamp, GoParser, StampOptions, SyntaxParser};
//!
//! let mut tree = GoParser::new()
//!     .parse(Path::new("x.go"), "package x\n\nfunc Run() {}\n")
//!     .unwrap();
//! let outcome = stamp(&mut tree, &StampOptions::default()).unwrap();
//! assert!(outcome.modified);
//! assert_eq!(render(&tree), "package x\n\n// Run ...\nfunc Run() {}\n");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod stamp;
pub mod syntax;

pub use config::Config;
pub use error::StampError;
pub use runner::{FileOutcome, FileStatus, RunSummary, Runner};
pub use stamp::{stamp, DocAction, DocEdit, StampOptions, StampOutcome, Template};
pub use syntax::{render, GoParser, SyntaxParser, SyntaxTree};
