use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{
    algorithms::ThresholdPreprocessor,
    distribution::{AdaptivePolicy, Distribution},
    error::{ContourError, Result},
    finder::{ContourFinder, FindOptions},
    modes::{ApproximationMethod, RetrievalMode},
    types::Point,
};

/// File-backed extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub retrieval: RetrievalMode,
    pub approximation: ApproximationMethod,
    /// `[dx, dy]` added to every point
    pub offset: [i32; 2],
    pub distribution: Distribution,
    /// Upper bound on worker threads; every logical CPU when absent
    pub max_workers: Option<usize>,
    pub adaptive: AdaptivePolicy,
    /// Binarise input images with this cut-off before tracing
    pub threshold: Option<u8>,
}

impl ExtractionConfig {
    pub fn find_options(&self) -> FindOptions {
        FindOptions {
            mode: self.retrieval,
            method: self.approximation,
            offset: Point::new(self.offset[0], self.offset[1]),
            distribution: self.distribution,
            max_workers: self.max_workers,
            adaptive: self.adaptive,
        }
    }

    /// Build a finder backed by the default tracer
    pub fn finder(&self) -> ContourFinder {
        ContourFinder::builder()
            .with_options(self.find_options())
            .build()
    }

    pub fn preprocessor(&self) -> Option<ThresholdPreprocessor> {
        self.threshold.map(|threshold| ThresholdPreprocessor { threshold })
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref),
            Some("json") => Self::from_json_file(path_ref),
            _ => Err(ContourError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save configuration, choosing the format from the file extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(ContourError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }

    /// Get the JSON schema of the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ExtractionConfig)
    }
}
