use std::{
    collections::BTreeMap,
    env,
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::Colorize;
use log::{debug, trace};

use crate::{
    config::Config,
    types::{CheckResult, Diagnostic, ManifestFailure},
};

/// Relativize a root-relative path to the current working directory so
/// `file:line:col` links are clickable
fn relativize_to_cwd(root: &Path, relative_to_root: &str) -> String {
    let Ok(cwd) = env::current_dir() else {
        debug!("Failed to get current directory");
        return relative_to_root.to_string();
    };
    let abs_path = root.join(relative_to_root);
    match make_relative(&abs_path, &cwd) {
        Some(rel) => {
            trace!("Relativized '{}' to '{}'", relative_to_root, rel.display());
            rel.to_string_lossy().to_string()
        }
        None => relative_to_root.to_string(),
    }
}

/// Path from `base` to `target`; `None` when they share no root
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    if target.first() != base.first() {
        return None;
    }

    let common = target.iter().zip(&base).take_while(|(t, b)| t == b).count();
    let mut result = PathBuf::new();
    for _ in common..base.len() {
        result.push("..");
    }
    for component in &target[common..] {
        result.push(component.as_os_str());
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

fn display_path(cfg: &Config, relative_to_root: &str) -> String {
    match &cfg.root {
        Some(root) => relativize_to_cwd(root, relative_to_root),
        None => relative_to_root.to_string(),
    }
}

pub fn print_no_extraneous_message<W: Write>(writer: &mut W, files: usize) -> io::Result<()> {
    debug!("No extraneous imports found");
    writeln!(
        writer,
        "{} No extraneous imports found in {} files",
        "✓".green().bold(),
        files.to_string().cyan()
    )?;
    writer.flush()?;
    Ok(())
}

/// Prints diagnostics grouped by file, then manifest errors, then a summary.
pub fn print_diagnostics_tree<W: Write>(
    writer: &mut W,
    result: &CheckResult,
    cfg: &Config,
) -> io::Result<()> {
    debug!("Printing diagnostics tree for {} diagnostics", result.diagnostics.len());

    let mut by_file: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
    for d in &result.diagnostics {
        by_file.entry(d.file.as_str()).or_default().push(d);
    }

    if !by_file.is_empty() {
        writeln!(writer, "{} Extraneous imports found\n", "⚠".yellow().bold())?;
    }

    for (file, diagnostics) in &by_file {
        let path = display_path(cfg, file);
        writeln!(writer, "{}", path.bright_white().bold())?;

        for (idx, d) in diagnostics.iter().enumerate() {
            let prefix = if idx == diagnostics.len() - 1 { "└──" } else { "├──" };
            writeln!(
                writer,
                "{}  {}  {} {}",
                prefix.dimmed(),
                format!("{}:{}:{}", path, d.line, d.column).blue(),
                d.message.red(),
                format!("({})", d.kind).dimmed()
            )?;
        }
        writeln!(writer)?;
    }

    print_manifest_errors(writer, &result.manifest_errors, cfg)?;
    print_summary(writer, result, by_file.len())?;

    writer.flush()?;
    Ok(())
}

fn print_manifest_errors<W: Write>(
    writer: &mut W,
    failures: &[ManifestFailure],
    cfg: &Config,
) -> io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    writeln!(writer, "{} Manifests that could not be loaded\n", "✖".red().bold())?;
    for failure in failures {
        writeln!(writer, "{}", display_path(cfg, &failure.manifest_path).bright_white().bold())?;
        writeln!(writer, "{}  {}", "├──".dimmed(), failure.message.red())?;
        writeln!(
            writer,
            "{}  {} files not checked",
            "└──".dimmed(),
            failure.skipped_files.len().to_string().yellow()
        )?;
        writeln!(writer)?;
    }
    Ok(())
}

fn print_summary<W: Write>(writer: &mut W, result: &CheckResult, files: usize) -> io::Result<()> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for d in &result.diagnostics {
        *counts.entry(d.module_name.as_str()).or_default() += 1;
    }

    // Most imported first, ties by name
    let mut top: Vec<(&str, usize)> = counts.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    top.truncate(5);

    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "{}", "Summary".bold())?;
    writeln!(
        writer,
        "  Extraneous imports: {}",
        result.diagnostics.len().to_string().yellow().bold()
    )?;
    writeln!(writer, "  Files with violations: {}", files.to_string().yellow())?;
    if !result.manifest_errors.is_empty() {
        writeln!(
            writer,
            "  Manifest errors: {}",
            result.manifest_errors.len().to_string().red().bold()
        )?;
    }

    if !top.is_empty() {
        writeln!(writer, "  Top {} undeclared modules:", top.len())?;
        for (idx, (name, count)) in top.iter().enumerate() {
            writeln!(writer, "    {}. {} ({} imports)", idx + 1, name.red(), count)?;
        }
    }
    Ok(())
}

/// Writes the whole result as pretty JSON.
pub fn print_json<W: Write>(writer: &mut W, result: &CheckResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, result)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
