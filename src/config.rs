//! Comparison weight vector and its on-disk store.
//!
//! A weight vector is supplied per reconciliation run (usually from project
//! configuration) and is read-only for the duration of the run.

use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Default weights file: `~/.paper_reconcile_weights.json`
fn default_weights_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".paper_reconcile_weights.json"))
        .ok_or_else(|| ReconcileError::Config("Cannot determine home directory".to_string()))
}

/// Per-field importance plus the acceptance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonWeights {
    pub title_weight: f64,
    /// Accepted for compatibility with project configuration; unused
    #[serde(default)]
    pub title_levenshtein: f64,
    pub abstract_weight: f64,
    /// Accepted for compatibility with project configuration; unused
    #[serde(default)]
    pub abstract_levenshtein: f64,
    pub author_weight: f64,
    pub year_weight: f64,
    /// Aggregate score must be strictly greater than this, in [0, 1]
    pub overall_weight: f64,
}

impl Default for ComparisonWeights {
    fn default() -> Self {
        Self {
            title_weight: 10.0,
            title_levenshtein: 0.0,
            abstract_weight: 7.0,
            abstract_levenshtein: 0.0,
            author_weight: 8.0,
            year_weight: 2.0,
            overall_weight: 0.85,
        }
    }
}

impl ComparisonWeights {
    /// Reject vectors the scoring arithmetic cannot work with.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("titleWeight", self.title_weight),
            ("abstractWeight", self.abstract_weight),
            ("authorWeight", self.author_weight),
            ("yearWeight", self.year_weight),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconcileError::Validation(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.overall_weight) {
            return Err(ReconcileError::Validation(format!(
                "overallWeight must be within [0, 1], got {}",
                self.overall_weight
            )));
        }

        Ok(())
    }

    /// Parse and validate a weight vector from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let weights: Self = serde_json::from_str(content)?;
        weights.validate()?;
        Ok(weights)
    }
}

/// Loads and saves the default weight vector
pub struct WeightsStore {
    path: PathBuf,
}

impl WeightsStore {
    /// Create a store at the default path
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: default_weights_path()?,
        })
    }

    /// Create a store with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the stored weights.
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse or validate is an error.
    pub fn load(&self) -> Result<ComparisonWeights> {
        if !self.path.exists() {
            debug!("Weights file not found, using defaults: {:?}", self.path);
            return Ok(ComparisonWeights::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        match ComparisonWeights::from_json(&content) {
            Ok(weights) => {
                info!("Loaded comparison weights from {:?}", self.path);
                Ok(weights)
            }
            Err(e) => {
                warn!("Invalid weights file {:?}: {}", self.path, e);
                Err(e)
            }
        }
    }

    /// Validate and save weights to file
    pub fn save(&self, weights: &ComparisonWeights) -> Result<()> {
        weights.validate()?;
        let content = serde_json::to_string_pretty(weights)?;
        std::fs::write(&self.path, content)?;
        info!("Saved comparison weights to {:?}", self.path);
        Ok(())
    }
}
