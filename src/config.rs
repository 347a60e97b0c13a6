//! File-based configuration.
//!
//! ```toml
//! [catalog]
//! path = "dbs/db_us.json"
//!
//! [search]
//! excluded_fields = ["description"]
//!
//! [aliases.specs]
//! chip = "processor"
//!
//! [aliases.num_specs]
//! bucks = "price"
//! ```
//!
//! Every section is optional. Aliases are layered over the built-in table.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::error::{StorageError, ValidationError};
use crate::query::SearchOptions;

/// Where the catalog snapshot lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

/// User aliases, layered over [`AliasTable::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasConfig {
    #[serde(default)]
    pub specs: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub num_specs: std::collections::HashMap<String, String>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LelnovoConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub aliases: AliasConfig,
}

impl LelnovoConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` for malformed TOML, unknown
    /// keys, or an alias with an empty name or target.
    pub fn from_toml_str(s: &str) -> Result<Self, ValidationError> {
        let config: Self = toml::from_str(s).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read or parsed, or a
    /// validation error if an alias is empty.
    pub fn from_file(path: impl AsRef<Path>) -> crate::LelnovoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| StorageError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let all = self.aliases.specs.iter().chain(&self.aliases.num_specs);
        for (alias, target) in all {
            if alias.trim().is_empty() || target.trim().is_empty() {
                return Err(ValidationError::InvalidConfig {
                    reason: format!("alias '{alias}' -> '{target}' has an empty side"),
                });
            }
        }
        Ok(())
    }

    /// Built-in aliases with the configured ones layered on top.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::default();
        table.merge(AliasTable {
            specs: self.aliases.specs.clone(),
            num_specs: self.aliases.num_specs.clone(),
        });
        table
    }

    pub fn search_options(&self) -> &SearchOptions {
        &self.search
    }
}
