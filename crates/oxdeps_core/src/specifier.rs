use std::path::Path;

/// True for specifiers that name a file path rather than a package:
/// `./x`, `../x`, `.`, `..`, `/abs/x` and platform absolute paths.
pub fn is_local_path(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/') || Path::new(specifier).is_absolute()
}

/// Extracts the package root name of a bare specifier.
///
/// `@scope/name/sub` yields `@scope/name`, `name/sub` yields `name`, and
/// `node:fs/promises` yields `node:fs`. Returns `None` for path-shaped
/// specifiers and for anything that cannot name a package (empty strings,
/// URLs, `data:` specifiers, `#` subpath imports from the `imports` field).
pub fn package_root_name(specifier: &str) -> Option<&str> {
    if specifier.is_empty() || specifier.starts_with('#') || is_local_path(specifier) {
        return None;
    }

    if let Some(scheme_end) = specifier.find(':')
        && &specifier[..scheme_end] != "node"
    {
        return None;
    }

    let end = if specifier.starts_with('@') {
        // Scoped: keep the first two segments
        match specifier.find('/') {
            Some(first) => specifier[first + 1..]
                .find('/')
                .map(|second| first + 1 + second)
                .unwrap_or(specifier.len()),
            None => specifier.len(),
        }
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    let root = &specifier[..end];
    if root.is_empty() || root == "@" { None } else { Some(root) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscoped_root() {
        assert_eq!(package_root_name("lodash"), Some("lodash"));
        assert_eq!(package_root_name("lodash/fp/map"), Some("lodash"));
    }

    #[test]
    fn test_scoped_root() {
        assert_eq!(package_root_name("@scope/pkg"), Some("@scope/pkg"));
        assert_eq!(package_root_name("@scope/pkg/sub/path"), Some("@scope/pkg"));
        // Incomplete scope is still reported as-is
        assert_eq!(package_root_name("@scope"), Some("@scope"));
    }

    #[test]
    fn test_local_paths_have_no_root() {
        for spec in ["./a", "../a/b", ".", "..", "/abs/file.js"] {
            assert!(is_local_path(spec), "{} should be local", spec);
            assert_eq!(package_root_name(spec), None);
        }
    }

    #[test]
    fn test_node_scheme_is_kept() {
        assert_eq!(package_root_name("node:fs"), Some("node:fs"));
        assert_eq!(package_root_name("node:fs/promises"), Some("node:fs"));
    }

    #[test]
    fn test_urls_have_no_root() {
        assert_eq!(package_root_name("https://esm.sh/react"), None);
        assert_eq!(package_root_name("data:text/javascript,export default 1"), None);
        assert_eq!(package_root_name(""), None);
    }

    #[test]
    fn test_subpath_imports_have_no_root() {
        assert_eq!(package_root_name("#internal/log"), None);
        assert_eq!(package_root_name("#config"), None);
        assert!(!is_local_path("#config"));
    }
}
