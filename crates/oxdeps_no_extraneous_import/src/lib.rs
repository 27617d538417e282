//! `no-extraneous-import` check for JavaScript/TypeScript projects.
//!
//! Walks a project, classifies every import with [`oxdeps_core::Classifier`]
//! and reports the ones whose package is not declared in the nearest
//! `package.json`.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use oxdeps_no_extraneous_import::{Config, run_no_extraneous_import_check};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from([
//!     "no-extraneous-import",
//!     "--root",
//!     "/path/to/project",
//!     "--allow-module",
//!     "electron",
//! ]);
//!
//! let result = run_no_extraneous_import_check(cfg.clone())?;
//!
//! if result.has_failures() {
//!     let mut stdout = BufWriter::new(std::io::stdout());
//!     oxdeps_no_extraneous_import::print_diagnostics_tree(&mut stdout, &result, &cfg)?;
//!     stdout.flush()?;
//! }
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod reporter;
mod types;

// Re-export public API
pub use checker::run_no_extraneous_import_check;
pub use config::{Config, DEFAULT_OPTIONS_FILE, OutputFormat};
pub use reporter::{print_diagnostics_tree, print_json, print_no_extraneous_message};
pub use types::{CheckResult, Diagnostic, ManifestFailure};
