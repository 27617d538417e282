use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, trace};
use std::collections::HashSet;

use crate::error::ConfigError;

/// Module names exempt from the manifest check.
///
/// Plain entries match exactly. Entries containing glob syntax (`*`, `?`, `[`,
/// `{`) are compiled into a [`GlobSet`], so `@internal/*` allows every package
/// in the `@internal` scope.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    exact: HashSet<String>,
    patterns: Option<GlobSet>,
}

impl AllowList {
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut exact = HashSet::new();
        let mut builder = GlobSetBuilder::new();
        let mut pattern_count = 0;

        for entry in entries {
            let entry = entry.as_ref();
            if entry.contains(['*', '?', '[', '{']) {
                let glob = Glob::new(entry)
                    .map_err(|source| ConfigError::Glob { pattern: entry.to_string(), source })?;
                builder.add(glob);
                pattern_count += 1;
            } else {
                exact.insert(entry.to_string());
            }
        }

        let patterns = if pattern_count > 0 {
            Some(builder.build().map_err(|source| ConfigError::Glob {
                pattern: "<allowModules>".to_string(),
                source,
            })?)
        } else {
            None
        };

        debug!("Allow list: {} exact names, {} patterns", exact.len(), pattern_count);
        Ok(Self { exact, patterns })
    }

    pub fn is_allowed(&self, module_name: &str) -> bool {
        if self.exact.contains(module_name) {
            trace!("'{}' is allow-listed by name", module_name);
            return true;
        }
        let matched = self.patterns.as_ref().is_some_and(|set| set.is_match(module_name));
        if matched {
            trace!("'{}' is allow-listed by pattern", module_name);
        }
        matched
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_none()
    }
}
