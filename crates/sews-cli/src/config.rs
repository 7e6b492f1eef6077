//! Pipeline option loading: defaults, then an optional JSON file, then
//! command-line overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use sews_model::{PipelineOptions, ShortfallPolicy};

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OptionOverrides {
    pub seed: Option<u64>,
    pub horizon_hours: Option<usize>,
    pub test_fraction: Option<f64>,
    pub negative_ratio: Option<usize>,
    pub shortfall: Option<ShortfallPolicy>,
}

impl OptionOverrides {
    pub fn apply(&self, options: &mut PipelineOptions) {
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(hours) = self.horizon_hours {
            options.horizon_hours = hours;
        }
        if let Some(fraction) = self.test_fraction {
            options.test_fraction = fraction;
        }
        if let Some(ratio) = self.negative_ratio {
            options.negative_ratio = ratio;
        }
        if let Some(policy) = self.shortfall {
            options.shortfall = policy;
        }
    }
}

/// Reads options from `path`; keys missing from the file keep defaults.
pub fn load_options_file(path: &Path) -> Result<PipelineOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

/// Resolves the effective options and validates them.
pub fn resolve_options(
    config: Option<&Path>,
    overrides: &OptionOverrides,
) -> Result<PipelineOptions> {
    let mut options = match config {
        Some(path) => load_options_file(path)?,
        None => PipelineOptions::default(),
    };
    overrides.apply(&mut options);
    options.validate().context("invalid pipeline options")?;
    Ok(options)
}
