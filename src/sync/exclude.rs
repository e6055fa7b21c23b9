//! Exclude pattern matching for mirror passes.
//!
//! Patterns are globs matched against relative paths (always `/`-separated).
//! An excluded path is never created or copied into the replica, and an
//! excluded replica path is never pruned.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Pattern matching for path exclusion.
#[derive(Debug, Clone)]
pub struct ExcludePatterns {
    /// Compiled glob set for matching.
    glob_set: GlobSet,
    /// Raw pattern strings (for display).
    patterns: Vec<String>,
}

impl Default for ExcludePatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl ExcludePatterns {
    /// Create an empty pattern set; nothing is excluded.
    pub fn new() -> Self {
        Self {
            glob_set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Create from a list of patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut pattern_list = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .with_context(|| format!("Invalid exclude pattern: {}", pattern))?;
            builder.add(glob);
            pattern_list.push(pattern.to_string());
        }

        Ok(Self {
            glob_set: builder.build()?,
            patterns: pattern_list,
        })
    }

    /// Add a pattern to the exclude set.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
        let mut patterns = self.patterns.clone();
        patterns.push(pattern.to_string());
        *self = Self::from_patterns(&patterns)?;
        Ok(())
    }

    /// Check if a relative path should be left alone.
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        if self.glob_set.is_match(path) {
            return true;
        }

        // Each component on its own, so "cache" also covers "cache/a/b"
        path.split('/')
            .filter(|name| !name.is_empty())
            .any(|name| self.glob_set.is_match(name))
    }

    /// Get the list of patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Parse patterns from a string (one per line, like .gitignore).
    ///
    /// Blank lines and `#` comments are skipped. Negations (`!pattern`) are
    /// not supported and ignored. A trailing `/` is dropped.
    pub fn parse_ignore(content: &str) -> Result<Self> {
        let patterns: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
            .map(|line| line.trim_end_matches('/'))
            .filter(|line| !line.is_empty())
            .collect();

        Self::from_patterns(&patterns)
    }

    /// Read patterns from an ignore-style file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exclude file: {}", path.display()))?;
        Self::parse_ignore(&content)
    }

    /// Merge another exclude patterns set into this one.
    pub fn merge(&mut self, other: &ExcludePatterns) -> Result<()> {
        for pattern in &other.patterns {
            if !self.patterns.contains(pattern) {
                self.add_pattern(pattern)?;
            }
        }
        Ok(())
    }
}
