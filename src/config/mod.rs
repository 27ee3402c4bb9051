/// Database configuration and connection management
pub mod database;

/// Household configuration loading from config.toml
pub mod household;
