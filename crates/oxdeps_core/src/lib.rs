//! Core engine for oxdeps.
//!
//! This crate decides whether the modules imported by JavaScript/TypeScript
//! files are backed by the project's `package.json`, including:
//! - Extracting import targets from JS/TS files
//! - Finding and caching the nearest manifest of a file
//! - Resolving specifiers on disk (relative, node_modules, extra roots)
//! - Classifying each import as built-in, allowed, local, declared or extraneous

mod allow;
mod builtins;
mod classify;
mod collector;
mod config;
mod constants;
mod convert_path;
mod error;
mod manifest;
mod parser;
mod resolver;
mod specifier;
mod types;

// Re-export public API
pub use allow::AllowList;
pub use builtins::is_builtin_module;
pub use classify::{Category, ClassificationResult, Classifier};
pub use collector::{CollectorConfig, collect_source_files};
pub use config::{ResolutionConfig, ResolutionOptions, find_git_root, load_options};
pub use constants::{DEFAULT_TRY_EXTENSIONS, JS_TS_EXTENSIONS, MANIFEST_FILE};
pub use convert_path::{
    ConvertPathOption, ConvertRuleOption, GlobPathConverter, IdentityConverter, PathConverter,
};
pub use error::{ConfigError, ManifestError, ResolutionIoError};
pub use manifest::{Manifest, ManifestReader};
pub use parser::{import_targets_for, import_targets_in_source};
pub use resolver::{Resolution, ResolveCache, exists_on_disk, resolve_on_disk};
pub use specifier::{is_local_path, package_root_name};
pub use types::{ImportKind, ImportTarget, Position};
