//! Configuration for the Jupiter adapter
//!
//! `Amm::from_keyed_account` takes no configuration argument, so the
//! adapter reads a process-wide [`AdapterConfig`] that hosts set once at
//! startup, either directly or from a TOML file.

use std::str::FromStr;
use std::sync::RwLock;

use crema_core::{CREMA_LABEL, CREMA_PROGRAM_ID};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error::ConfigError;

/// Which loaded tick arrays the swap simulation may walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickWindow {
    /// Only the array holding the current tick
    #[default]
    CurrentArray,
    /// The current array and its loaded neighbours in swap direction, up to
    /// the first gap
    Fetched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Crema program id, base58
    pub program_id: String,
    /// Label reported to the router
    pub label: String,
    pub simulation_window: TickWindow,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            program_id: CREMA_PROGRAM_ID.to_string(),
            label: CREMA_LABEL.to_string(),
            simulation_window: TickWindow::default(),
        }
    }
}

impl AdapterConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let program_id = self.program_id()?;
        if program_id == Pubkey::default() {
            return Err(ConfigError::InvalidProgramId(self.program_id.clone()));
        }
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("label must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn program_id(&self) -> Result<Pubkey, ConfigError> {
        Pubkey::from_str(&self.program_id)
            .map_err(|_| ConfigError::InvalidProgramId(self.program_id.clone()))
    }
}

/// Global configuration instance with proper synchronization
pub static ADAPTER_CONFIG: Lazy<RwLock<AdapterConfig>> =
    Lazy::new(|| RwLock::new(AdapterConfig::default()));

/// Replace the global configuration after validating it
pub fn set_adapter_config(config: AdapterConfig) -> Result<(), ConfigError> {
    config.validate()?;
    match ADAPTER_CONFIG.write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
    Ok(())
}

/// Snapshot of the global configuration
pub fn adapter_config() -> AdapterConfig {
    match ADAPTER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
