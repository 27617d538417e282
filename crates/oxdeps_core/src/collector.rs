use anyhow::{Context, Result};
use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::PathBuf;

use crate::constants::{JS_TS_EXTENSIONS, NODE_MODULES};

pub struct CollectorConfig {
    pub root: PathBuf,
    /// Globs relative to `root`; empty means every JS/TS file
    pub include: Vec<String>,
}

/// Walks `root` (respecting .gitignore, never entering `node_modules`) and
/// returns the JS/TS files to check, sorted.
pub fn collect_source_files(cfg: &CollectorConfig) -> Result<Vec<PathBuf>> {
    debug!("Collecting source files under {}", cfg.root.display());

    let include = if cfg.include.is_empty() {
        None
    } else {
        let mut builder = GlobSetBuilder::new();
        for p in &cfg.include {
            builder.add(Glob::new(p).with_context(|| format!("Invalid --include glob '{}'", p))?);
        }
        Some(builder.build().context("Invalid --include glob set")?)
    };

    let mut files: Vec<PathBuf> = Vec::new();
    let root = &cfg.root;
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|e| e.file_name() != NODE_MODULES && e.file_name() != ".git")
        .build();

    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }

        let Some(ext) = p.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !JS_TS_EXTENSIONS.contains(&ext) || p.to_string_lossy().ends_with(".d.ts") {
            continue;
        }

        if let Some(set) = &include {
            let rel = p.strip_prefix(root).unwrap_or(p);
            if !set.is_match(rel) {
                trace!("Skipping file outside --include: {}", rel.display());
                continue;
            }
        }

        trace!("Found source file: {}", p.display());
        files.push(p.to_path_buf());
    }

    files.sort();
    debug!("Collected {} source files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn rel_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collects_js_ts_and_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "");
        create_test_file(root, "src/b.jsx", "");
        create_test_file(root, "src/types.d.ts", "");
        create_test_file(root, "README.md", "");
        create_test_file(root, "node_modules/dep/index.js", "");

        let cfg = CollectorConfig { root: root.to_path_buf(), include: vec![] };
        let files = collect_source_files(&cfg).unwrap();
        assert_eq!(rel_names(root, &files), vec!["src/a.ts", "src/b.jsx"]);
    }

    #[test]
    fn test_include_glob_filters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.js", "");
        create_test_file(root, "scripts/build.js", "");

        let cfg = CollectorConfig { root: root.to_path_buf(), include: vec!["src/**".to_string()] };
        let files = collect_source_files(&cfg).unwrap();
        assert_eq!(rel_names(root, &files), vec!["src/a.js"]);
    }

    #[test]
    fn test_invalid_include_glob() {
        let temp_dir = TempDir::new().unwrap();
        let cfg =
            CollectorConfig { root: temp_dir.path().to_path_buf(), include: vec!["[".to_string()] };
        assert!(collect_source_files(&cfg).is_err());
    }
}
