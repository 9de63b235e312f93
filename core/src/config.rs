//! Configuration for API-description builds.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! max_depth: 5
//! response:
//!   default_content_type: application/xml
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_MAX_DEPTH;
use crate::error::Result;

/// Content type used when a response declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/xml";

/// Settings for response descriptors.
///
/// # Examples
///
/// ```
/// # use schema_synth_core::ResponseConfig;
/// let config = ResponseConfig::default();
/// assert_eq!(config.default_content_type, "application/xml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Content type attached to responses that list none.
    pub default_content_type: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// Top-level schema synthesis configuration.
///
/// # Examples
///
/// ```no_run
/// use schema_synth_core::SchemaConfig;
///
/// let config = SchemaConfig::load("schema-synth.yml").unwrap();
/// println!("walking at most {} levels", config.max_depth);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Depth budget for the type walker.
    pub max_depth: usize,
    /// Response descriptor settings.
    pub response: ResponseConfig,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            response: ResponseConfig::default(),
        }
    }
}

impl SchemaConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SchemaError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::SchemaError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SchemaError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::SchemaError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
