use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, IoResultExt, Result};

/// glob patterns from the work tree's ignore file
///
/// one pattern per line; blank lines and lines starting with `#` are
/// skipped. a pattern of n `/`-separated components matches the last n
/// components of a path, so `*.log` matches in any directory and
/// `build/*` matches `build/out.o` as well as `src/build/out.o`. a leading
/// `/` anchors the pattern at the work tree root.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    pattern: Pattern,
    components: usize,
    anchored: bool,
}

impl IgnoreRules {
    /// load rules from `path`; a missing file yields no rules
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).with_path(path)?;
        Self::parse(&content)
    }

    /// parse rules from ignore file content
    pub fn parse(content: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (anchored, glob) = match line.strip_prefix('/') {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            let pattern = Pattern::new(glob).map_err(|e| Error::InvalidIgnorePattern {
                pattern: line.to_string(),
                message: e.msg.to_string(),
            })?;
            rules.push(Rule {
                pattern,
                components: glob.split('/').count(),
                anchored,
            });
        }
        Ok(Self { rules })
    }

    /// is the `/`-separated relative path ignored
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let depth = rel_path.split('/').count();

        self.rules.iter().any(|rule| {
            if rule.components > depth || (rule.anchored && rule.components != depth) {
                return false;
            }
            let skip = depth - rule.components;
            let tail = match skip {
                0 => rel_path,
                n => rel_path
                    .match_indices('/')
                    .nth(n - 1)
                    .map_or(rel_path, |(i, _)| &rel_path[i + 1..]),
            };
            rule.pattern.matches_with(tail, options)
        })
    }

    /// number of patterns
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// are there no patterns
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
