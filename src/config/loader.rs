//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading jurisdiction
//! rules from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::Jurisdiction;

use super::table::RuleTable;
use super::types::{JurisdictionRules, JurisdictionsConfig, RulesetMetadata};

/// Loads and provides access to jurisdiction rules.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// validates them into a [`RuleTable`].
///
/// # Directory Structure
///
/// ```text
/// config/australia/
/// ├── ruleset.yaml        # Rule set metadata
/// └── jurisdictions.yaml  # One entry per jurisdiction
/// ```
///
/// # Example
///
/// ```no_run
/// use logbook_engine::config::ConfigLoader;
/// use logbook_engine::models::Jurisdiction;
///
/// let loader = ConfigLoader::load("./config/australia").unwrap();
/// let vic = loader.rules(Jurisdiction::Vic).unwrap();
/// println!("VIC bonus cap: {}s", vic.bonus_cap_seconds());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    table: RuleTable,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/australia")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A jurisdiction is missing or its rules fail validation
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<RulesetMetadata>(&path.join("ruleset.yaml"))?;
        let jurisdictions =
            Self::load_yaml::<JurisdictionsConfig>(&path.join("jurisdictions.yaml"))?;

        let table = RuleTable::new(metadata, jurisdictions.jurisdictions)?;
        info!(
            ruleset = %table.metadata().name,
            version = %table.metadata().version,
            "loaded jurisdiction rules"
        );

        Ok(Self { table })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rule table.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Consumes the loader, returning the rule table.
    pub fn into_table(self) -> RuleTable {
        self.table
    }

    /// Returns the rule set metadata.
    pub fn ruleset(&self) -> &RulesetMetadata {
        self.table.metadata()
    }

    /// Gets the rules for a jurisdiction.
    pub fn rules(&self, jurisdiction: Jurisdiction) -> EngineResult<&JurisdictionRules> {
        self.table.rules(jurisdiction)
    }
}
