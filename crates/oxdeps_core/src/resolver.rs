use dashmap::DashMap;
use log::{debug, trace, warn};
use path_clean::clean;
use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    config::ResolutionConfig,
    constants::{INDEX_FILE_STEM, NODE_MODULES},
    error::ResolutionIoError,
    specifier::{is_local_path, package_root_name},
};

/// Where a specifier was found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A project file, reached relatively or through a `resolvePaths` root
    Local(PathBuf),
    /// Something inside a `node_modules` directory
    Package(PathBuf),
}

/// Resolutions keyed by (importing directory, specifier).
pub type ResolveCache = DashMap<(PathBuf, String), Option<Resolution>>;

/// True when `specifier` resolves to a project file from `from_file`.
/// Installed packages do not count.
pub fn exists_on_disk(
    cfg: &ResolutionConfig,
    from_file: &Path,
    specifier: &str,
    cache: &ResolveCache,
) -> bool {
    matches!(resolve_on_disk(cfg, from_file, specifier, cache), Some(Resolution::Local(_)))
}

/// Resolves `specifier` as imported from `from_file`, which must already have
/// gone through the path converter.
///
/// The default lookup runs first (relative to the importing directory for
/// path-shaped specifiers, `node_modules` of every ancestor for bare ones),
/// then each `resolve_paths` root in order. A local hit from either search
/// beats a package hit.
pub fn resolve_on_disk(
    cfg: &ResolutionConfig,
    from_file: &Path,
    specifier: &str,
    cache: &ResolveCache,
) -> Option<Resolution> {
    let from_dir = from_file.parent().unwrap_or(Path::new("/")).to_path_buf();
    let key = (from_dir, specifier.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", specifier, key.0.display());
        return v.clone();
    }
    trace!("Resolving: '{}' from {}", specifier, from_file.display());

    let default = resolve_default(cfg, &key.0, specifier);
    let resolved = match default {
        Some(Resolution::Local(_)) => default,
        other => resolve_in_roots(cfg, specifier).or(other),
    };

    if let Some(r) = &resolved {
        debug!("Resolved '{}' from {} to {:?}", specifier, from_file.display(), r);
    }
    cache.insert(key, resolved.clone());
    resolved
}

fn resolve_default(cfg: &ResolutionConfig, from_dir: &Path, specifier: &str) -> Option<Resolution> {
    if is_local_path(specifier) {
        trace!("Resolving as relative import: '{}'", specifier);
        let candidate = if Path::new(specifier).is_absolute() {
            PathBuf::from(specifier)
        } else {
            clean(from_dir.join(specifier))
        };
        return resolve_file(&candidate, &cfg.try_extensions).map(Resolution::Local);
    }

    let root_name = package_root_name(specifier)?;
    trace!("Walking up from {} to find node_modules for '{}'", from_dir.display(), specifier);
    let mut current = Some(from_dir);
    while let Some(dir) = current {
        let nm = dir.join(NODE_MODULES);
        if let Some(resolved) = resolve_file(&nm.join(specifier), &cfg.try_extensions) {
            return Some(Resolution::Package(resolved));
        }
        // A subpath the package does not ship still belongs to the package
        let pkg_dir = nm.join(root_name);
        if probe(&pkg_dir).is_some_and(|m| m.is_dir()) {
            return Some(Resolution::Package(pkg_dir));
        }
        current = dir.parent();
    }
    trace!("'{}' is not installed in any node_modules", specifier);
    None
}

fn resolve_in_roots(cfg: &ResolutionConfig, specifier: &str) -> Option<Resolution> {
    for root in &cfg.resolve_paths {
        let candidate = clean(root.join(specifier));
        trace!("Trying resolve path candidate: {}", candidate.display());
        if let Some(resolved) = resolve_file(&candidate, &cfg.try_extensions) {
            trace!("Resolved '{}' under resolve path {}", specifier, root.display());
            return Some(Resolution::Local(resolved));
        }
    }
    None
}

/// Verbatim file, then each extension appended, then `index<ext>` inside a
/// directory.
fn resolve_file(p: &Path, try_extensions: &[String]) -> Option<PathBuf> {
    let meta = probe(p);
    if meta.as_ref().is_some_and(|m| m.is_file()) {
        return Some(canonical(p.to_path_buf()));
    }

    for ext in try_extensions {
        let mut s = OsString::from(p.as_os_str());
        s.push(ext);
        let candidate = PathBuf::from(s);
        if probe(&candidate).is_some_and(|m| m.is_file()) {
            return Some(canonical(candidate));
        }
    }

    if meta.is_some_and(|m| m.is_dir()) {
        for ext in try_extensions {
            let candidate = p.join(format!("{}{}", INDEX_FILE_STEM, ext));
            if probe(&candidate).is_some_and(|m| m.is_file()) {
                return Some(canonical(candidate));
            }
        }
    }

    None
}

fn canonical(p: PathBuf) -> PathBuf {
    p.canonicalize().unwrap_or(p)
}

/// Stats `path`; anything but "not found" is logged and treated as missing.
fn probe(path: &Path) -> Option<fs::Metadata> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            None
        }
        Err(source) => {
            warn!("{}", ResolutionIoError { path: path.to_path_buf(), source });
            None
        }
    }
}
