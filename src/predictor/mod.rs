//! Predictor option bundles.
//!
//! Static data consumed by the extraction runtime: each option names a path
//! in the extracted document tree and the models to try there. Bundles are
//! compiled into the binary and validated on load.

pub mod option;

use std::collections::BTreeMap;

use thiserror::Error;

pub use option::{Bundle, ModelInvocation, PredictorOption, ProphetConfig};

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Invalid predictor bundle: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Predictor option {index} ({path}): {reason}")]
    InvalidOption {
        index: usize,
        path: String,
        reason: String,
    },

    #[error("Unknown predictor bundle '{0}'")]
    UnknownBundle(String),
}

const BUNDLED: &[(&str, &str)] = &[
    (
        "guosen_optional_stock",
        include_str!("../../predictors/guosen_optional_stock.json"),
    ),
    (
        "guosen_real_estate",
        include_str!("../../predictors/guosen_real_estate.json"),
    ),
    (
        "swhysc_bond_rate",
        include_str!("../../predictors/swhysc_bond_rate.json"),
    ),
];

/// Loaded bundles by name. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct PredictorStore {
    bundles: BTreeMap<String, ProphetConfig>,
}

impl PredictorStore {
    /// Parse and validate the compiled-in bundles.
    pub fn bundled() -> Result<Self, PredictorError> {
        let mut store = Self::default();
        for (name, source) in BUNDLED {
            store.insert(*name, ProphetConfig::from_json(source)?);
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, config: ProphetConfig) {
        self.bundles.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Result<&ProphetConfig, PredictorError> {
        self.bundles
            .get(name)
            .ok_or_else(|| PredictorError::UnknownBundle(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
