use anyhow::{Context, Result};
use log::{debug, trace, warn};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::{fs, path::Path};

use crate::types::{ImportKind, ImportTarget, Position};

/// Reads `file` and returns its import targets in source order.
///
/// Every `import`, re-exporting `export ... from`, and `import()` with a
/// static specifier yields one target; `require('...')` calls are included
/// when `include_require` is set. Type-only imports are kept, since the
/// package still has to be declared.
pub fn import_targets_for(file: &Path, include_require: bool) -> Result<Vec<ImportTarget>> {
    trace!("Parsing file for imports: {}", file.display());
    let src =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let targets = import_targets_in_source(file, &src, include_require);
    debug!("Found {} import targets in {}", targets.len(), file.display());
    Ok(targets)
}

/// Same as [`import_targets_for`] for source text already in memory; `file`
/// only selects the dialect (TS, JSX, ESM).
pub fn import_targets_in_source(
    file: &Path,
    src: &str,
    include_require: bool,
) -> Vec<ImportTarget> {
    let st = source_type_for(file);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, src, st).parse();

    if panicked {
        warn!("Parser gave up on {}; imports after the error are not checked", file.display());
    } else if !errors.is_empty() {
        debug!("{} syntax errors in {}", errors.len(), file.display());
    }

    let mut collector =
        ImportCollector { lines: LineIndex::new(src), include_require, targets: Vec::new() };
    collector.visit_program(&program);

    let mut targets = collector.targets;
    targets.sort_by_key(|t| t.position);
    targets
}

struct ImportCollector<'s> {
    lines: LineIndex<'s>,
    include_require: bool,
    targets: Vec<ImportTarget>,
}

impl ImportCollector<'_> {
    fn push(&mut self, specifier: &str, offset: u32, kind: ImportKind) {
        let position = self.lines.position(offset as usize);
        trace!("Found {} '{}' at {}:{}", kind, specifier, position.line, position.column);
        self.targets.push(ImportTarget::new(specifier, position, kind));
    }
}

impl<'a> Visit<'a> for ImportCollector<'_> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.push(decl.source.value.as_str(), decl.source.span.start, ImportKind::Import);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.push(decl.source.value.as_str(), decl.source.span.start, ImportKind::Export);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            self.push(source.value.as_str(), source.span.start, ImportKind::Export);
        }
        // `export const x = await import('y')` still needs walking
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        match &expr.source {
            Expression::StringLiteral(sl) => {
                self.push(sl.value.as_str(), sl.span.start, ImportKind::DynamicImport);
            }
            Expression::TemplateLiteral(tl) if tl.expressions.is_empty() => {
                if let Some(cooked) = tl.quasis.first().and_then(|q| q.value.cooked.as_ref()) {
                    self.push(cooked.as_str(), tl.span.start, ImportKind::DynamicImport);
                }
            }
            _ => trace!("Skipping import() with a computed specifier"),
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if self.include_require
            && let Expression::Identifier(callee_ident) = &call.callee
            && callee_ident.name.as_str() == "require"
            && call.arguments.len() == 1
            && let Some(Expression::StringLiteral(sl)) = call.arguments[0].as_expression()
        {
            self.push(sl.value.as_str(), sl.span.start, ImportKind::Require);
        }
        walk::walk_call_expression(self, call);
    }
}

/// Byte offset to 1-based line/column conversion.
struct LineIndex<'s> {
    src: &'s str,
    line_starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    fn new(src: &'s str) -> Self {
        let line_starts =
            std::iter::once(0).chain(src.match_indices('\n').map(|(i, _)| i + 1)).collect();
        Self { src, line_starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line_idx =
            self.line_starts.partition_point(|&start| start <= offset).saturating_sub(1);
        let line_start = self.line_starts[line_idx];
        let end = offset.min(self.src.len());
        let column = self.src.get(line_start..end).map(|s| s.chars().count()).unwrap_or(0) + 1;
        Position { line: line_idx + 1, column }
    }
}

fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    // Parse as ES modules unless the file is explicitly CommonJS
    SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx") | Some("js")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")))
        .with_module(!matches!(ext, Some("cjs") | Some("cts")))
}
