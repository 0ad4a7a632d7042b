use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Names handed out during one run.
///
/// Owned by a single run; a fresh registry starts every run so separate runs
/// never see each other's claims.
#[derive(Debug, Default)]
pub struct DestinationRegistry {
    /// Times each undisambiguated `stem.ext` name has been resolved.
    assignments: HashMap<String, usize>,
    /// Next suffix to try per `stem.ext`; runs ahead of `assignments` when
    /// names are skipped because they already exist on disk.
    next_suffix: HashMap<String, usize>,
    claimed: HashSet<String>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.contains(name)
    }

    /// How many times `base_name` has been resolved so far.
    pub fn assignments(&self, base_name: &str) -> usize {
        self.assignments.get(base_name).copied().unwrap_or(0)
    }

    /// First suffix the next resolution of `base_name` will try.
    pub fn next_suffix(&self, base_name: &str) -> usize {
        self.next_suffix.get(base_name).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Produce a destination name unique within this run.
///
/// Tries `stem.ext`, then `stem_1.ext`, `stem_2.ext`, ... skipping names
/// already claimed in `registry` and, when `dest_dir` is given, names that
/// already exist on disk. Suffixes tried for a base name are never retried.
pub fn resolve(
    dest_dir: Option<&Path>,
    stem: &str,
    ext: &str,
    registry: &mut DestinationRegistry,
) -> String {
    let base_name = format!("{}.{}", stem, ext);
    let mut suffix = registry.next_suffix(&base_name);

    let name = loop {
        let candidate = if suffix == 0 {
            base_name.clone()
        } else {
            format!("{}_{}.{}", stem, suffix, ext)
        };
        suffix += 1;

        if registry.is_claimed(&candidate) {
            continue;
        }
        if dest_dir.is_some_and(|dir| dir.join(&candidate).exists()) {
            debug!(name = %candidate, "Destination name already on disk");
            continue;
        }
        break candidate;
    };

    *registry.assignments.entry(base_name.clone()).or_insert(0) += 1;
    registry.next_suffix.insert(base_name, suffix);
    registry.claimed.insert(name.clone());
    name
}
