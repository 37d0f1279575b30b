//! Predictor option records.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PredictorError;

/// A bundle file: `{"prophet_config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub prophet_config: ProphetConfig,
}

/// Predictor options plus their (unused) dependency map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphetConfig {
    #[serde(default)]
    pub depends: BTreeMap<String, Vec<String>>,
    pub predictor_options: Vec<PredictorOption>,
}

/// Binds a document path to the models tried there, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorOption {
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_primary_key: Option<Vec<String>>,
    pub models: Vec<ModelInvocation>,
}

/// A model name plus whatever parameters the extraction runtime accepts.
/// Parameters are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInvocation {
    pub name: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl ModelInvocation {
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Boolean parameter; absent or non-boolean reads as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.params.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Regex list parameter. Accepts a list of strings, a single string, or a
    /// map of column name to list (flattened in key order).
    pub fn patterns(&self, key: &str) -> Vec<&str> {
        fn collect<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
            match value {
                Value::String(s) => out.push(s),
                Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
                Value::Object(map) => map.values().for_each(|v| collect(v, out)),
                _ => {}
            }
        }
        let mut out = Vec::new();
        if let Some(value) = self.params.get(key) {
            collect(value, &mut out);
        }
        out
    }
}

impl ProphetConfig {
    /// Parse a bundle and validate every option.
    pub fn from_json(source: &str) -> Result<Self, PredictorError> {
        let bundle: Bundle = serde_json::from_str(source)?;
        bundle.prophet_config.validate()?;
        Ok(bundle.prophet_config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PredictorError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| PredictorError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&source)
    }

    pub fn validate(&self) -> Result<(), PredictorError> {
        for (index, option) in self.predictor_options.iter().enumerate() {
            let invalid = |reason: &str| PredictorError::InvalidOption {
                index,
                path: option.path.join("/"),
                reason: reason.to_string(),
            };
            if option.path.is_empty() || option.path.iter().any(|p| p.is_empty()) {
                return Err(invalid("empty path"));
            }
            if option.models.is_empty() {
                return Err(invalid("no models"));
            }
            if option.models.iter().any(|m| m.name.trim().is_empty()) {
                return Err(invalid("model without a name"));
            }
        }
        Ok(())
    }

    /// Render back to the bundle layout.
    pub fn to_json_pretty(&self) -> Result<String, PredictorError> {
        let bundle = Bundle {
            prophet_config: self.clone(),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }
}
