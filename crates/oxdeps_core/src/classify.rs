//! Classification of import specifiers against the project's manifest.
//!
//! A [`Classifier`] owns the per-run caches and answers, for each
//! [`ImportTarget`], whether the referenced module is a Node.js built-in, an
//! allow-listed name, a local file, a declared dependency, or extraneous. The
//! checks run in that order and the first match wins.

use log::{debug, trace};
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    builtins::is_builtin_module,
    config::ResolutionConfig,
    error::ManifestError,
    manifest::{ManifestReader, absolute_from_cwd},
    resolver::{ResolveCache, exists_on_disk},
    specifier::{is_local_path, package_root_name},
    types::ImportTarget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    BuiltIn,
    Allowed,
    Declared,
    Extraneous,
    /// Local files and specifiers that cannot name a package. Never reported.
    Local,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::BuiltIn => "built-in",
            Category::Allowed => "allowed",
            Category::Declared => "declared",
            Category::Extraneous => "extraneous",
            Category::Local => "local",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub reason: String,
    /// Package root name, absent for local specifiers
    pub package_name: Option<String>,
    /// Manifest consulted, when the manifest lookup ran and found one
    pub manifest_path: Option<PathBuf>,
}

impl ClassificationResult {
    fn new(category: Category, reason: String, package_name: Option<&str>) -> Self {
        Self {
            category,
            reason,
            package_name: package_name.map(str::to_string),
            manifest_path: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.category != Category::Extraneous
    }
}

/// Classification engine for one analysis run.
///
/// Shared by reference across worker threads; the manifest and resolution
/// caches only ever grow.
#[derive(Debug)]
pub struct Classifier {
    config: Arc<ResolutionConfig>,
    manifests: ManifestReader,
    resolutions: ResolveCache,
}

impl Classifier {
    pub fn new(config: Arc<ResolutionConfig>) -> Self {
        Self { config, manifests: ManifestReader::new(), resolutions: ResolveCache::new() }
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    pub fn manifests(&self) -> &ManifestReader {
        &self.manifests
    }

    pub fn cached_resolutions(&self) -> usize {
        self.resolutions.len()
    }

    /// Classifies one import found in `from_file`.
    ///
    /// Fails only when the manifest governing `from_file` exists but cannot be
    /// read or parsed.
    pub fn classify(
        &self,
        target: &ImportTarget,
        from_file: &Path,
    ) -> Result<ClassificationResult, ManifestError> {
        let specifier = target.specifier.as_str();
        trace!("Classifying '{}' ({}) in {}", specifier, target.kind, from_file.display());

        let root_name = package_root_name(specifier);

        if let Some(name) = root_name {
            if is_builtin_module(name) {
                return Ok(ClassificationResult::new(
                    Category::BuiltIn,
                    format!("\"{}\" is a Node.js built-in module", name),
                    Some(name),
                ));
            }
            if self.config.allow_modules.is_allowed(name) {
                return Ok(ClassificationResult::new(
                    Category::Allowed,
                    format!("\"{}\" is in allowModules", name),
                    Some(name),
                ));
            }
        }

        if is_local_path(specifier) {
            return Ok(ClassificationResult::new(
                Category::Local,
                format!("\"{}\" is a local path", specifier),
                None,
            ));
        }
        let Some(name) = root_name else {
            return Ok(ClassificationResult::new(
                Category::Local,
                format!("\"{}\" does not name a package", specifier),
                None,
            ));
        };

        let from_file = absolute_from_cwd(from_file);
        let converted = self.config.path_converter.convert(&from_file);
        if exists_on_disk(&self.config, &converted, specifier, &self.resolutions) {
            return Ok(ClassificationResult::new(
                Category::Local,
                format!("\"{}\" resolves to a project file", specifier),
                Some(name),
            ));
        }

        let manifest = self.manifests.manifest_for_converted(&converted)?;
        let result = match manifest {
            Some(m) if m.declares(name) => ClassificationResult {
                manifest_path: Some(m.path.clone()),
                ..ClassificationResult::new(
                    Category::Declared,
                    format!("\"{}\" is declared in {}", name, m.path.display()),
                    Some(name),
                )
            },
            Some(m) => ClassificationResult {
                manifest_path: Some(m.path.clone()),
                ..ClassificationResult::new(
                    Category::Extraneous,
                    format!("\"{}\" is extraneous (not declared in {})", name, m.path.display()),
                    Some(name),
                )
            },
            None => ClassificationResult::new(
                Category::Extraneous,
                format!("\"{}\" is extraneous (no manifest found)", name),
                Some(name),
            ),
        };

        if !result.passed() {
            debug!("{}:{} {}", from_file.display(), target.position.line, result.reason);
        }
        Ok(result)
    }
}
