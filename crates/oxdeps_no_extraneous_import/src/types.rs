use serde::Serialize;

use oxdeps_core::ImportKind;

/// One extraneous import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// File path relative to the project root
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub kind: ImportKind,
    /// Package root name, e.g. `@scope/pkg` for `@scope/pkg/sub`
    pub module_name: String,
    pub specifier: String,
    pub message: String,
    /// Manifest that was consulted, relative to the project root
    pub manifest_path: Option<String>,
}

/// A `package.json` that could not be loaded, with the files it kept from
/// being checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFailure {
    pub manifest_path: String,
    pub message: String,
    pub skipped_files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub manifest_errors: Vec<ManifestFailure>,
    pub files_analyzed: usize,
    pub imports_checked: usize,
}

impl CheckResult {
    pub fn has_failures(&self) -> bool {
        !self.diagnostics.is_empty() || !self.manifest_errors.is_empty()
    }
}

pub(crate) fn extraneous_message(module_name: &str) -> String {
    format!("\"{}\" is extraneous.", module_name)
}
