use serde::Serialize;
use std::fmt;

/// 1-based line and column of an import specifier in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    /// `import x from 'm'` and side-effect `import 'm'`
    Import,
    /// `export { x } from 'm'` and `export * from 'm'`
    Export,
    /// `import('m')`
    DynamicImport,
    /// `require('m')`, only collected when requested
    Require,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportKind::Import => "import",
            ImportKind::Export => "export",
            ImportKind::DynamicImport => "import()",
            ImportKind::Require => "require()",
        };
        f.write_str(s)
    }
}

/// One module reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportTarget {
    pub specifier: String,
    pub position: Position,
    pub kind: ImportKind,
}

impl ImportTarget {
    pub fn new(specifier: impl Into<String>, position: Position, kind: ImportKind) -> Self {
        Self { specifier: specifier.into(), position, kind }
    }
}
