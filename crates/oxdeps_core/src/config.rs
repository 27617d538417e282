use anyhow::{Context, Result, anyhow};
use log::{debug, trace};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    allow::AllowList,
    constants::DEFAULT_TRY_EXTENSIONS,
    convert_path::{ConvertPathOption, GlobPathConverter, IdentityConverter, PathConverter},
    error::ConfigError,
};

/// Resolution options as they appear in an options file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResolutionOptions {
    #[serde(default)]
    pub allow_modules: Vec<String>,
    #[serde(default)]
    pub convert_path: Option<ConvertPathOption>,
    #[serde(default)]
    pub resolve_paths: Vec<String>,
    #[serde(default)]
    pub try_extensions: Option<Vec<String>>,
}

/// Read-only settings shared by every classification in a run.
#[derive(Debug, Clone)]
pub struct ResolutionConfig {
    pub allow_modules: AllowList,
    pub path_converter: Arc<dyn PathConverter>,
    pub resolve_paths: Vec<PathBuf>,
    pub try_extensions: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            allow_modules: AllowList::default(),
            path_converter: Arc::new(IdentityConverter),
            resolve_paths: Vec::new(),
            try_extensions: DEFAULT_TRY_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ResolutionConfig {
    /// Builds the run configuration. Relative `resolvePaths` and `convertPath`
    /// globs are taken relative to `root`.
    pub fn from_options(root: &Path, opts: &ResolutionOptions) -> Result<Self, ConfigError> {
        let allow_modules = AllowList::new(&opts.allow_modules)?;

        let path_converter: Arc<dyn PathConverter> = match &opts.convert_path {
            Some(option) => Arc::new(GlobPathConverter::new(root, option)?),
            None => Arc::new(IdentityConverter),
        };

        let resolve_paths = opts
            .resolve_paths
            .iter()
            .map(|p| {
                let p = Path::new(p);
                if p.is_absolute() { p.to_path_buf() } else { root.join(p) }
            })
            .collect();

        let try_extensions = match &opts.try_extensions {
            Some(exts) => {
                if let Some(bad) = exts.iter().find(|e| !e.starts_with('.')) {
                    return Err(ConfigError::Extension(bad.clone()));
                }
                exts.clone()
            }
            None => DEFAULT_TRY_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        debug!(
            "Resolution config: {} resolve paths, try extensions {:?}",
            opts.resolve_paths.len(),
            try_extensions
        );
        Ok(Self { allow_modules, path_converter, resolve_paths, try_extensions })
    }
}

/// Reads a JSON options file.
pub fn load_options(path: &Path) -> Result<ResolutionOptions> {
    debug!("Reading options from {}", path.display());
    let src = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&src)
        .with_context(|| format!("Invalid options file {}", path.display()))
}

/// Walks up from `start` to the first directory containing `.git`.
pub fn find_git_root(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root from {}", start.display());
    let mut current_dir = start;

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir.to_path_buf());
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent,
            None => return Err(anyhow!("Could not find .git directory in any parent folder")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = ResolutionConfig::from_options(Path::new("/p"), &ResolutionOptions::default())
            .unwrap();
        assert_eq!(cfg.try_extensions, vec![".js", ".json", ".node"]);
        assert!(cfg.resolve_paths.is_empty());
        assert!(cfg.allow_modules.is_empty());
        let f = Path::new("/p/dist/a.js");
        assert_eq!(cfg.path_converter.convert(f), f.to_path_buf());
    }

    #[test]
    fn test_options_parse_camel_case() {
        let opts: ResolutionOptions = serde_json::from_str(
            r#"{
                "allowModules": ["electron"],
                "convertPath": { "dist/**": ["^dist/(.+)$", "src/$1"] },
                "resolvePaths": ["lib", "/abs/shared"],
                "tryExtensions": [".ts", ".js"]
            }"#,
        )
        .unwrap();
        let cfg = ResolutionConfig::from_options(Path::new("/p"), &opts).unwrap();
        assert!(cfg.allow_modules.is_allowed("electron"));
        assert_eq!(cfg.resolve_paths, vec![PathBuf::from("/p/lib"), PathBuf::from("/abs/shared")]);
        assert_eq!(cfg.try_extensions, vec![".ts", ".js"]);
        assert_eq!(
            cfg.path_converter.convert(Path::new("/p/dist/a.js")),
            PathBuf::from("/p/src/a.js")
        );
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result = serde_json::from_str::<ResolutionOptions>(r#"{ "allowModule": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_extension_without_dot_is_rejected() {
        let opts = ResolutionOptions {
            try_extensions: Some(vec!["js".to_string()]),
            ..ResolutionOptions::default()
        };
        let result = ResolutionConfig::from_options(Path::new("/p"), &opts);
        assert!(matches!(result, Err(ConfigError::Extension(ext)) if ext == "js"));
    }

    #[test]
    fn test_load_options_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".oxdepsrc.json");
        fs::write(&path, "{ nope").unwrap();
        let err = load_options(&path).unwrap_err();
        assert!(format!("{:#}", err).contains(".oxdepsrc.json"));
    }

    #[test]
    fn test_find_git_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        let subdir = root.join("src").join("components");
        fs::create_dir_all(&subdir).unwrap();

        let git_root = find_git_root(&subdir).unwrap();
        assert_eq!(git_root, root.to_path_buf());
    }
}
