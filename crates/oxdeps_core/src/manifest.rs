use dashmap::DashMap;
use log::{debug, trace, warn};
use serde_json::Value;
use std::{
    collections::BTreeSet,
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    constants::{DEPENDENCY_FIELDS, MANIFEST_FILE},
    convert_path::PathConverter,
    error::ManifestError,
};

/// Declared dependency names of one `package.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub dependency_names: BTreeSet<String>,
}

impl Manifest {
    pub fn declares(&self, package_name: &str) -> bool {
        self.dependency_names.contains(package_name)
    }

    /// Parses the dependency-bearing fields of a manifest document.
    pub fn parse(path: &Path, src: &str) -> Result<Self, ManifestError> {
        let json: Value = serde_json::from_str(src).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let Some(obj) = json.as_object() else {
            return Err(ManifestError::NotAnObject { path: path.to_path_buf() });
        };

        let mut dependency_names = BTreeSet::new();
        for field in DEPENDENCY_FIELDS {
            match obj.get(*field) {
                Some(Value::Object(deps)) => {
                    dependency_names.extend(deps.keys().cloned());
                }
                Some(Value::Array(names)) => {
                    dependency_names
                        .extend(names.iter().filter_map(|n| n.as_str()).map(str::to_string));
                }
                Some(other) => {
                    trace!("Ignoring non-collection '{}' in {}: {}", field, path.display(), other);
                }
                None => {}
            }
        }

        Ok(Self { path: path.to_path_buf(), dependency_names })
    }
}

/// Finds and caches the nearest manifest of source files for one run.
#[derive(Debug, Default)]
pub struct ManifestReader {
    manifests: DashMap<PathBuf, Arc<Manifest>>,
    failures: DashMap<PathBuf, ManifestError>,
    nearest: DashMap<PathBuf, Option<PathBuf>>,
}

impl ManifestReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts `file` and returns the manifest closest to the converted path,
    /// or `None` when no ancestor directory holds one.
    pub fn resolve_manifest(
        &self,
        file: &Path,
        converter: &dyn PathConverter,
    ) -> Result<Option<Arc<Manifest>>, ManifestError> {
        let converted = converter.convert(file);
        self.manifest_for_converted(&converted)
    }

    /// Same as [`resolve_manifest`](Self::resolve_manifest) for a path that has
    /// already gone through the converter.
    pub fn manifest_for_converted(
        &self,
        converted: &Path,
    ) -> Result<Option<Arc<Manifest>>, ManifestError> {
        let converted = absolute_from_cwd(converted);
        let Some(start) = converted.parent() else {
            return Ok(None);
        };
        match self.find_nearest(start) {
            Some(manifest_path) => self.load(&manifest_path).map(Some),
            None => {
                trace!("No {} above {}", MANIFEST_FILE, converted.display());
                Ok(None)
            }
        }
    }

    /// Manifests that failed to load, each listed once.
    pub fn failures(&self) -> Vec<ManifestError> {
        let mut out: Vec<ManifestError> = self.failures.iter().map(|e| e.value().clone()).collect();
        out.sort_by(|a, b| a.path().cmp(b.path()));
        out
    }

    pub fn cached_manifests(&self) -> usize {
        self.manifests.len()
    }

    fn find_nearest(&self, start: &Path) -> Option<PathBuf> {
        if let Some(hit) = self.nearest.get(start) {
            trace!("Cache hit for nearest manifest: {}", start.display());
            return hit.clone();
        }

        let mut visited = Vec::new();
        let mut current = Some(start);
        let mut found = None;

        while let Some(dir) = current {
            if let Some(hit) = self.nearest.get(dir) {
                found = hit.clone();
                break;
            }
            visited.push(dir.to_path_buf());
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                trace!("Found manifest at: {}", candidate.display());
                found = Some(candidate);
                break;
            }
            current = dir.parent();
        }

        for dir in visited {
            self.nearest.insert(dir, found.clone());
        }
        found
    }

    fn load(&self, manifest_path: &Path) -> Result<Arc<Manifest>, ManifestError> {
        if let Some(m) = self.manifests.get(manifest_path) {
            trace!("Cache hit for manifest: {}", manifest_path.display());
            return Ok(Arc::clone(m.value()));
        }
        if let Some(err) = self.failures.get(manifest_path) {
            return Err(err.value().clone());
        }

        let result = read_manifest(manifest_path);
        match result {
            Ok(manifest) => {
                debug!(
                    "Loaded {} with {} declared dependencies",
                    manifest_path.display(),
                    manifest.dependency_names.len()
                );
                let manifest = Arc::new(manifest);
                // Concurrent misses may both parse; keep whichever landed first
                let entry = self
                    .manifests
                    .entry(manifest_path.to_path_buf())
                    .or_insert_with(|| Arc::clone(&manifest));
                Ok(Arc::clone(entry.value()))
            }
            Err(err) => {
                warn!("{}", err);
                self.failures.insert(manifest_path.to_path_buf(), err.clone());
                Err(err)
            }
        }
    }
}

/// Relative paths are taken from the working directory so upward walks reach
/// the filesystem root.
pub(crate) fn absolute_from_cwd(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            warn!("Failed to get current directory for {}: {}", path.display(), e);
            path.to_path_buf()
        }
    }
}

fn read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let src = fs::read_to_string(path).map_err(|e: io::Error| ManifestError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Manifest::parse(path, &src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert_path::{ConvertPathOption, GlobPathConverter, IdentityConverter};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_parse_unions_all_dependency_fields() {
        let src = r#"{
            "name": "app",
            "dependencies": { "a": "^1.0.0" },
            "devDependencies": { "b": "^1.0.0" },
            "peerDependencies": { "c": "*" },
            "optionalDependencies": { "d": "*" },
            "bundledDependencies": ["e"],
            "scripts": { "f": "echo" }
        }"#;
        let m = Manifest::parse(Path::new("/p/package.json"), src).unwrap();
        let names: Vec<&str> = m.dependency_names.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert!(!m.declares("f"));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let result = Manifest::parse(Path::new("/p/package.json"), "{ not json");
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let result = Manifest::parse(Path::new("/p/package.json"), "[1, 2]");
        assert!(matches!(result, Err(ManifestError::NotAnObject { .. })));
    }

    #[test]
    fn test_nearest_manifest_wins() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", r#"{ "dependencies": { "outer": "1" } }"#);
        let inner = create_test_file(
            root,
            "packages/app/package.json",
            r#"{ "dependencies": { "inner": "1" } }"#,
        );
        let file = create_test_file(root, "packages/app/src/deep/index.js", "");

        let reader = ManifestReader::new();
        let m = reader.resolve_manifest(&file, &IdentityConverter).unwrap().unwrap();
        assert_eq!(m.path, inner);
        assert!(m.declares("inner"));
        assert!(!m.declares("outer"));
    }

    #[test]
    fn test_missing_manifest_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "src/index.js", "");
        let reader = ManifestReader::new();
        // The temp dir may live under a directory with its own package.json, so
        // only assert that nothing inside the fixture was picked up.
        let found = reader.resolve_manifest(&file, &IdentityConverter).unwrap();
        if let Some(m) = found {
            assert!(!m.path.starts_with(temp_dir.path()));
        }
    }

    #[test]
    fn test_cache_returns_same_object() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", r#"{ "dependencies": { "a": "1" } }"#);
        let a = create_test_file(root, "src/a.js", "");
        let b = create_test_file(root, "src/nested/b.js", "");

        let reader = ManifestReader::new();
        let m1 = reader.resolve_manifest(&a, &IdentityConverter).unwrap().unwrap();
        let m2 = reader.resolve_manifest(&b, &IdentityConverter).unwrap().unwrap();
        assert!(Arc::ptr_eq(&m1, &m2));
        assert_eq!(reader.cached_manifests(), 1);
    }

    #[test]
    fn test_converter_applied_before_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let src_manifest =
            create_test_file(root, "src/package.json", r#"{ "dependencies": { "a": "1" } }"#);
        create_test_file(root, "package.json", r#"{ "dependencies": {} }"#);
        let dist_file = create_test_file(root, "dist/a.js", "");

        let opt: ConvertPathOption =
            serde_json::from_str(r#"{ "dist/**": ["^dist/(.+)$", "src/$1"] }"#).unwrap();
        let conv = GlobPathConverter::new(root, &opt).unwrap();

        let reader = ManifestReader::new();
        let m = reader.resolve_manifest(&dist_file, &conv).unwrap().unwrap();
        assert_eq!(m.path, src_manifest);
    }

    #[test]
    fn test_relative_path_walks_from_cwd() {
        let reader = ManifestReader::new();
        let _ = reader.manifest_for_converted(Path::new("no-such-dir/a.js"));
        let cwd = env::current_dir().unwrap();
        assert!(reader.nearest.contains_key(&cwd.join("no-such-dir")));
        assert!(reader.nearest.contains_key(&cwd));
        assert!(!reader.nearest.contains_key(Path::new("")));
    }

    #[test]
    fn test_parse_failure_is_cached_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "package.json", "{ broken");
        let a = create_test_file(root, "a.js", "");
        let b = create_test_file(root, "b.js", "");

        let reader = ManifestReader::new();
        assert!(reader.resolve_manifest(&a, &IdentityConverter).is_err());
        assert!(reader.resolve_manifest(&b, &IdentityConverter).is_err());
        assert_eq!(reader.failures().len(), 1);
        assert_eq!(reader.cached_manifests(), 0);
    }
}
