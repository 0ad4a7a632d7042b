use crate::error::{FlattenError, Result};
use glob::{MatchOptions, Pattern};

const WILDCARD_CHARS: [char; 3] = ['*', '?', '['];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single exclusion rule, matched against a base name only.
#[derive(Debug, Clone)]
enum Rule {
    Exact(String),
    Glob(Pattern),
}

impl Rule {
    fn matches(&self, name: &str) -> bool {
        match self {
            Rule::Exact(exact) => exact == name,
            Rule::Glob(pattern) => pattern.matches_with(name, MATCH_OPTIONS),
        }
    }
}

/// Compiled set of exclusion patterns.
///
/// Patterns containing `*`, `?` or `[` use shell glob syntax; anything else
/// requires exact, case-sensitive equality with the base name.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    sources: Vec<String>,
    rules: Vec<Rule>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut sources = Vec::with_capacity(patterns.len());
        let mut rules = Vec::with_capacity(patterns.len());

        for raw in patterns {
            let raw = raw.as_ref();
            if raw.is_empty() {
                continue;
            }
            let rule = if is_wildcard(raw) {
                let pattern = Pattern::new(raw).map_err(|e| {
                    FlattenError::config(format!("invalid exclusion pattern '{}': {}", raw, e))
                })?;
                Rule::Glob(pattern)
            } else {
                Rule::Exact(raw.to_string())
            };
            sources.push(raw.to_string());
            rules.push(rule);
        }

        Ok(Self { sources, rules })
    }

    /// True if any pattern matches `name`. An empty set never matches.
    pub fn matches(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Pure function form of the matcher for one-off checks.
///
/// Patterns that fail to compile as globs are compared literally.
pub fn matches<S: AsRef<str>>(name: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        if is_wildcard(pattern) {
            Pattern::new(pattern)
                .map(|p| p.matches_with(name, MATCH_OPTIONS))
                .unwrap_or(pattern == name)
        } else {
            pattern == name
        }
    })
}

fn is_wildcard(pattern: &str) -> bool {
    pattern.contains(WILDCARD_CHARS)
}
