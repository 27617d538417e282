use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, trace};
use regex::Regex;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::error::ConfigError;

/// Maps a source file to the location used for manifest lookup and resolution.
pub trait PathConverter: Send + Sync + fmt::Debug {
    fn convert(&self, path: &Path) -> PathBuf;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl PathConverter for IdentityConverter {
    fn convert(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// `convertPath` as written in the options file.
///
/// Object form: `{ "dist/**/*.js": ["^dist/(.+)$", "src/$1"] }`.
/// Array form: `[{ "include": ["dist/**"], "exclude": ["dist/vendor/**"],
/// "replace": ["^dist/(.+)$", "src/$1"] }]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConvertPathOption {
    Map(BTreeMap<String, (String, String)>),
    Rules(Vec<ConvertRuleOption>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRuleOption {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub replace: (String, String),
}

struct ConvertRule {
    include: GlobSet,
    exclude: Option<GlobSet>,
    from: Regex,
    to: String,
}

impl fmt::Debug for ConvertRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertRule").field("from", &self.from.as_str()).field("to", &self.to).finish()
    }
}

/// Glob-selected regex rewriting of paths relative to a base directory.
/// The first rule whose include set matches (and exclude set does not) wins.
#[derive(Debug)]
pub struct GlobPathConverter {
    base: PathBuf,
    rules: Vec<ConvertRule>,
}

impl GlobPathConverter {
    pub fn new(base: impl Into<PathBuf>, option: &ConvertPathOption) -> Result<Self, ConfigError> {
        let rule_options: Vec<ConvertRuleOption> = match option {
            ConvertPathOption::Map(map) => map
                .iter()
                .map(|(glob, replace)| ConvertRuleOption {
                    include: vec![glob.clone()],
                    exclude: Vec::new(),
                    replace: replace.clone(),
                })
                .collect(),
            ConvertPathOption::Rules(rules) => rules.clone(),
        };

        let mut rules = Vec::with_capacity(rule_options.len());
        for opt in &rule_options {
            let include = build_glob_set(&opt.include)?;
            let exclude =
                if opt.exclude.is_empty() { None } else { Some(build_glob_set(&opt.exclude)?) };
            let from = Regex::new(&opt.replace.0)
                .map_err(|source| ConfigError::Regex { pattern: opt.replace.0.clone(), source })?;
            rules.push(ConvertRule { include, exclude, from, to: opt.replace.1.clone() });
        }

        let base = base.into();
        debug!("Loaded {} convertPath rules relative to {}", rules.len(), base.display());
        Ok(Self { base, rules })
    }
}

impl PathConverter for GlobPathConverter {
    fn convert(&self, path: &Path) -> PathBuf {
        let (relative, under_base) = match path.strip_prefix(&self.base) {
            Ok(rel) => (rel.to_string_lossy().replace('\\', "/"), true),
            Err(_) => (path.to_string_lossy().replace('\\', "/"), false),
        };

        for rule in &self.rules {
            if !rule.include.is_match(&relative) {
                continue;
            }
            if rule.exclude.as_ref().is_some_and(|ex| ex.is_match(&relative)) {
                trace!("'{}' excluded from convertPath rule {:?}", relative, rule);
                continue;
            }
            let converted = rule.from.replace(&relative, rule.to.as_str()).into_owned();
            trace!("Converted '{}' to '{}'", relative, converted);
            return if under_base { self.base.join(converted) } else { PathBuf::from(converted) };
        }

        path.to_path_buf()
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        let glob =
            Glob::new(p).map_err(|source| ConfigError::Glob { pattern: p.clone(), source })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::Glob { pattern: patterns.join(","), source })
}
