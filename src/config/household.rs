//! Household configuration loading from config.toml
//!
//! The config file names the household, lists its members, and carries ledger options.
//! Configured members are used to seed the database on first run.

use crate::{
    entities::member::MemberRole,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::{collections::HashSet, path::Path};
use tracing::debug;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HOME_HARMONY_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Household identity
    pub household: HouseholdConfig,
    /// Ledger behaviour
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Members to seed
    pub members: Vec<MemberConfig>,
}

/// The `[household]` table
#[derive(Debug, Deserialize, Clone)]
pub struct HouseholdConfig {
    /// Display name of the household
    pub name: String,
    /// Code roommates use to join
    pub invite_code: String,
    /// Id of the owning member, must be one of `members`
    pub owner_id: String,
}

/// The `[ledger]` table
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LedgerConfig {
    /// Re-check share sums before computing balances
    #[serde(default = "default_revalidate_shares")]
    pub revalidate_shares: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            revalidate_shares: default_revalidate_shares(),
        }
    }
}

const fn default_revalidate_shares() -> bool {
    true
}

/// Configuration for a single member
#[derive(Debug, Deserialize, Clone)]
pub struct MemberConfig {
    /// Unique member id
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Owner or member
    #[serde(default)]
    pub role: MemberRole,
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when the member list is empty, a member id repeats, or the
    /// owner is not a configured member.
    pub fn validate(&self) -> Result<()> {
        if self.members.is_empty() {
            return Err(Error::Config {
                message: "config.toml must list at least one member".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(member.id.as_str()) {
                return Err(Error::Config {
                    message: format!("Duplicate member id in config.toml: {}", member.id),
                });
            }
        }

        if !seen.contains(self.household.owner_id.as_str()) {
            return Err(Error::Config {
                message: format!(
                    "Household owner {} is not a configured member",
                    self.household.owner_id
                ),
            });
        }

        Ok(())
    }
}

/// Parses and validates household configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads household configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or required fields are missing
/// - The member list fails [`Config::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    debug!("Loading household configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `HOME_HARMONY_CONFIG`, or `./config.toml` when unset.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
