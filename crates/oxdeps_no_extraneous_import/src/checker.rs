use anyhow::{Result, anyhow};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use oxdeps_core::{Category, Classifier, CollectorConfig, collect_source_files, import_targets_for};

use crate::{
    config::Config,
    types::{CheckResult, Diagnostic, ManifestFailure, extraneous_message},
};

enum FileOutcome {
    Checked { diagnostics: Vec<Diagnostic>, imports: usize },
    /// The governing manifest failed to load; nothing in the file was reported
    ManifestFailed(PathBuf),
    Unparsed,
}

pub fn run_no_extraneous_import_check(mut cfg: Config) -> Result<CheckResult> {
    info!("Starting no-extraneous-import check");

    cfg.initialize()?;
    let root = cfg.root()?.clone();
    let resolution = Arc::new(cfg.resolution_config()?);

    let files = collect_source_files(&CollectorConfig {
        root: root.clone(),
        include: cfg.include.clone(),
    })?;
    if files.is_empty() {
        warn!("No source files found under {}", root.display());
        return Err(anyhow!("No source files found under {}", root.display()));
    }
    info!("Processing {} source files in parallel", files.len());

    let classifier = Classifier::new(resolution);
    let include_require = cfg.include_require;

    // collect() keeps the sorted file order, and targets come back in source order
    let outcomes: Vec<(&PathBuf, FileOutcome)> = files
        .par_iter()
        .map(|file| (file, check_file(&classifier, &root, file, include_require)))
        .collect();

    let mut result = CheckResult::default();
    let mut skipped: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
    for (file, outcome) in outcomes {
        match outcome {
            FileOutcome::Checked { diagnostics, imports } => {
                result.files_analyzed += 1;
                result.imports_checked += imports;
                result.diagnostics.extend(diagnostics);
            }
            FileOutcome::ManifestFailed(manifest) => {
                skipped.entry(manifest).or_default().push(relative_to_root(&root, file));
            }
            FileOutcome::Unparsed => {}
        }
    }

    result.manifest_errors = classifier
        .manifests()
        .failures()
        .into_iter()
        .map(|err| ManifestFailure {
            manifest_path: relative_to_root(&root, err.path()),
            message: err.to_string(),
            skipped_files: skipped.remove(err.path()).unwrap_or_default(),
        })
        .collect();

    info!(
        "No-extraneous-import check complete. Found {} diagnostics and {} manifest errors",
        result.diagnostics.len(),
        result.manifest_errors.len()
    );
    debug!(
        "Cache statistics: manifests={}, resolutions={}",
        classifier.manifests().cached_manifests(),
        classifier.cached_resolutions()
    );

    Ok(result)
}

fn check_file(
    classifier: &Classifier,
    root: &Path,
    file: &Path,
    include_require: bool,
) -> FileOutcome {
    debug!("Thread {:?} processing: {}", thread::current().id(), file.display());

    let targets = match import_targets_for(file, include_require) {
        Ok(targets) => targets,
        Err(e) => {
            warn!("Error parsing imports for {}: {:#}", file.display(), e);
            return FileOutcome::Unparsed;
        }
    };

    let rel_file = relative_to_root(root, file);
    let mut diagnostics = Vec::new();

    for target in &targets {
        let classification = match classifier.classify(target, file) {
            Ok(c) => c,
            Err(e) => {
                debug!("Skipping {}: {}", rel_file, e);
                return FileOutcome::ManifestFailed(e.path().clone());
            }
        };
        trace!("{} '{}' is {}", rel_file, target.specifier, classification.category);

        if classification.category != Category::Extraneous {
            continue;
        }
        let module_name =
            classification.package_name.unwrap_or_else(|| target.specifier.clone());
        diagnostics.push(Diagnostic {
            file: rel_file.clone(),
            line: target.position.line,
            column: target.position.column,
            kind: target.kind,
            message: extraneous_message(&module_name),
            module_name,
            specifier: target.specifier.clone(),
            manifest_path: classification.manifest_path.map(|p| relative_to_root(root, &p)),
        });
    }

    debug!("{}: {} imports, {} extraneous", rel_file, targets.len(), diagnostics.len());
    FileOutcome::Checked { diagnostics, imports: targets.len() }
}

fn relative_to_root(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).to_string_lossy().replace('\\', "/")
}
