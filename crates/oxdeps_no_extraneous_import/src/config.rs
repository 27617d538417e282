use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::{env, path::PathBuf};

use oxdeps_core::{ResolutionConfig, ResolutionOptions, find_git_root, load_options};

/// Options file looked up in the project root when `--config` is not given
pub const DEFAULT_OPTIONS_FILE: &str = ".oxdepsrc.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "no-extraneous-import")]
#[command(about = "Report imports of packages that package.json does not declare")]
pub struct Config {
    /// Root directory of the project (defaults to git root, then the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// JSON options file with allowModules, convertPath, resolvePaths and tryExtensions
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Module name or glob that is never extraneous (repeatable)
    #[arg(long = "allow-module")]
    pub allow_modules: Vec<String>,

    /// Extra directory to resolve bare specifiers against (repeatable, in order)
    #[arg(long = "resolve-path")]
    pub resolve_paths: Vec<String>,

    /// Extension tried on extension-less specifiers (repeatable, replaces the defaults)
    #[arg(long = "try-extension")]
    pub try_extensions: Vec<String>,

    /// Only check files matching this glob, relative to the root (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Also check require() calls
    #[arg(long = "require")]
    pub include_require: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,

    #[clap(skip)]
    pub options: ResolutionOptions,

    #[clap(skip)]
    initialized: bool,
}

impl Config {
    /// Resolves the root directory and merges the options file with the
    /// command-line flags. Flags add to list options; `--try-extension`
    /// replaces the file's list. Later calls are no-ops.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            debug!("Config already initialized");
            return Ok(());
        }

        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().with_context(|| format!("Root {} does not exist", r.display()))?
        } else {
            let cwd = env::current_dir()?;
            debug!("No root provided, searching for git root");
            find_git_root(&cwd).unwrap_or_else(|e| {
                debug!("{}; using {}", e, cwd.display());
                cwd
            })
        };
        info!("Using root directory: {}", root.display());

        let options_path = match self.config.clone() {
            Some(p) if p.is_absolute() => Some(p),
            Some(p) => Some(env::current_dir()?.join(p)),
            None => Some(root.join(DEFAULT_OPTIONS_FILE)).filter(|p| p.is_file()),
        };
        let mut options = match &options_path {
            Some(p) => load_options(p)?,
            None => ResolutionOptions::default(),
        };

        options.allow_modules.extend(self.allow_modules.iter().cloned());
        options.resolve_paths.extend(self.resolve_paths.iter().cloned());
        if !self.try_extensions.is_empty() {
            options.try_extensions = Some(self.try_extensions.clone());
        }
        debug!("Effective options: {:?}", options);

        self.options = options;
        self.root = Some(root);
        self.initialized = true;
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root.as_ref().ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn resolution_config(&self) -> Result<ResolutionConfig> {
        let root = self.root()?;
        ResolutionConfig::from_options(root, &self.options).context("Invalid resolution options")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn base_config(root: &Path) -> Config {
        Config::parse_from(["no-extraneous-import", "--root", root.to_str().unwrap()])
    }

    #[test]
    fn test_defaults_without_options_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = base_config(temp_dir.path());
        cfg.initialize().unwrap();
        assert_eq!(cfg.root().unwrap(), &temp_dir.path().canonicalize().unwrap());
        let resolution = cfg.resolution_config().unwrap();
        assert_eq!(resolution.try_extensions, vec![".js", ".json", ".node"]);
        assert_eq!(cfg.format, OutputFormat::Tree);
    }

    #[test]
    fn test_options_file_merged_with_flags() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join(DEFAULT_OPTIONS_FILE),
            r#"{ "allowModules": ["electron"], "tryExtensions": [".ts"] }"#,
        )
        .unwrap();

        let mut cfg = Config::parse_from([
            "no-extraneous-import",
            "--root",
            root.to_str().unwrap(),
            "--allow-module",
            "@internal/*",
            "--try-extension",
            ".tsx",
        ]);
        cfg.initialize().unwrap();

        assert_eq!(cfg.options.allow_modules, vec!["electron", "@internal/*"]);
        let resolution = cfg.resolution_config().unwrap();
        assert_eq!(resolution.try_extensions, vec![".tsx"]);
        assert!(resolution.allow_modules.is_allowed("@internal/db"));
    }

    #[test]
    fn test_initialize_twice_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = Config::parse_from([
            "no-extraneous-import",
            "--root",
            temp_dir.path().to_str().unwrap(),
            "--allow-module",
            "electron",
        ]);
        cfg.initialize().unwrap();
        cfg.initialize().unwrap();
        assert_eq!(cfg.options.allow_modules, vec!["electron"]);
    }

    #[test]
    fn test_options_file_read_once() {
        let temp_dir = TempDir::new().unwrap();
        let options_file = temp_dir.path().join(DEFAULT_OPTIONS_FILE);
        fs::write(&options_file, r#"{ "allowModules": ["electron"] }"#).unwrap();

        let mut cfg = base_config(temp_dir.path());
        cfg.initialize().unwrap();
        // A second read would now fail
        fs::write(&options_file, "{ broken").unwrap();
        cfg.initialize().unwrap();
        assert_eq!(cfg.options.allow_modules, vec!["electron"]);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let mut cfg = Config::parse_from([
            "no-extraneous-import",
            "--root",
            temp_dir.path().to_str().unwrap(),
            "--config",
            missing.to_str().unwrap(),
        ]);
        assert!(cfg.initialize().is_err());
    }

    #[test]
    fn test_root_before_initialize_is_error() {
        let cfg = Config::parse_from(["no-extraneous-import"]);
        assert!(cfg.root().is_err());
    }
}
