use crate::error::{FlattenError, Result};
use serde::Serialize;
use tracing::warn;

/// Output extension given to inputs left without an explicit output.
pub const FALLBACK_EXTENSION: &str = "txt";

/// How the input list is paired with the output list.
///
/// Chosen once, purely by comparing the lengths of the two lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// Same length: `in[i] -> out[i]`.
    Positional,
    /// One output for several inputs: every input maps to it.
    ManyToOne,
    /// Pair positionally while outputs last, then fall back to `txt`.
    PositionalWithFallback,
}

impl MappingPolicy {
    pub fn select(in_len: usize, out_len: usize) -> Self {
        if out_len == in_len {
            MappingPolicy::Positional
        } else if out_len == 1 {
            MappingPolicy::ManyToOne
        } else {
            MappingPolicy::PositionalWithFallback
        }
    }

    /// Output extension for the input at `index` under this policy.
    fn output_for<'a>(&self, index: usize, outputs: &'a [String]) -> &'a str {
        match self {
            MappingPolicy::Positional => &outputs[index],
            MappingPolicy::ManyToOne => &outputs[0],
            MappingPolicy::PositionalWithFallback => outputs
                .get(index)
                .map(String::as_str)
                .unwrap_or(FALLBACK_EXTENSION),
        }
    }
}

/// One row of the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// Lower-case, without the leading dot.
    pub input: String,
    /// Case as configured, without the leading dot.
    pub output: String,
    pub fallback: bool,
}

/// Ordered input-extension to output-extension table.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionMapping {
    policy: MappingPolicy,
    entries: Vec<MappingEntry>,
}

impl ExtensionMapping {
    pub fn build<S: AsRef<str>, T: AsRef<str>>(in_exts: &[S], out_exts: &[T]) -> Result<Self> {
        if in_exts.is_empty() {
            return Err(FlattenError::config("at least one input extension is required"));
        }
        if out_exts.is_empty() {
            return Err(FlattenError::config("at least one output extension is required"));
        }

        let inputs = in_exts
            .iter()
            .map(|ext| normalize_extension(ext.as_ref()).map(|e| e.to_lowercase()))
            .collect::<Result<Vec<_>>>()?;
        let outputs = out_exts
            .iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let policy = MappingPolicy::select(inputs.len(), outputs.len());
        if policy == MappingPolicy::PositionalWithFallback && outputs.len() > inputs.len() {
            warn!(
                unused = ?&outputs[inputs.len()..],
                "More output extensions than input extensions; surplus outputs ignored"
            );
        }

        let mut entries: Vec<MappingEntry> = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            if entries.iter().any(|entry| &entry.input == input) {
                warn!(extension = %input, "Duplicate input extension ignored");
                continue;
            }
            let output = policy.output_for(index, &outputs);
            entries.push(MappingEntry {
                input: input.clone(),
                output: output.to_string(),
                fallback: policy == MappingPolicy::PositionalWithFallback
                    && index >= outputs.len(),
            });
        }

        Ok(Self { policy, entries })
    }

    /// Output extension for an input extension, compared case-insensitively.
    ///
    /// `None` means the extension is not configured at all, which is distinct
    /// from being mapped to the fallback.
    pub fn lookup(&self, ext: &str) -> Option<&str> {
        let ext = ext.strip_prefix('.').unwrap_or(ext).to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.input == ext)
            .map(|entry| entry.output.as_str())
    }

    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn input_extensions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.input.as_str())
    }
}

/// Trim whitespace and a single leading dot; reject empty results.
fn normalize_extension(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(FlattenError::config(format!("invalid extension '{}'", raw)));
    }
    Ok(bare.to_string())
}
