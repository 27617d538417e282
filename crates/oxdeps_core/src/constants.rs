//! Constants for file extensions, manifests and resolution defaults.
//!
//! ## Supported Extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)

/// File extensions for JavaScript/TypeScript files that should be checked
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extensions appended to extension-less specifiers when no `tryExtensions`
/// option is configured (in priority order, leading dot included)
pub const DEFAULT_TRY_EXTENSIONS: &[&str] = &[".js", ".json", ".node"];

/// Base name of the index file tried when a specifier names a directory
pub const INDEX_FILE_STEM: &str = "index";

/// Conventional file name of the dependency manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest fields whose entries count as declared dependencies
pub const DEPENDENCY_FIELDS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
    "bundledDependencies",
    "bundleDependencies",
];

/// Directory holding installed packages
pub const NODE_MODULES: &str = "node_modules";
