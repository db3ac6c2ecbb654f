//! Decoder policy knobs.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How elements of an array of objects are located in a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayStrategy {
    /// Use the `<path>.key` sentinel when present, positional indices otherwise.
    #[default]
    KeyThenIndex,
    IndexOnly,
    KeyOnly,
}

/// Spelling of positional element paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexNotation {
    /// `items.0.price`
    #[default]
    Dotted,
    /// `items[0].price`
    Bracketed,
}

impl IndexNotation {
    pub fn element_path(self, base: &str, index: usize) -> String {
        match self {
            IndexNotation::Dotted => format!("{base}.{index}"),
            IndexNotation::Bracketed => format!("{base}[{index}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub array_strategy: ArrayStrategy,
    pub index_notation: IndexNotation,
    /// Last segment of the reserved key-list entry, `<path>.<key_sentinel>`.
    pub key_sentinel: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            array_strategy: ArrayStrategy::default(),
            index_notation: IndexNotation::default(),
            key_sentinel: "key".to_string(),
        }
    }
}

impl DecoderConfig {
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_json_str(&src)
    }

    pub fn with_array_strategy(mut self, strategy: ArrayStrategy) -> Self {
        self.array_strategy = strategy;
        self
    }

    pub fn with_index_notation(mut self, notation: IndexNotation) -> Self {
        self.index_notation = notation;
        self
    }

    pub(crate) fn key_path(&self, base: &str) -> String {
        format!("{base}.{}", self.key_sentinel)
    }
}
