//! Configuration Module
//!
//! This module defines the configuration structures for the admission and
//! ledger core. Configuration is loaded from TOML files and parsed using
//! serde; the embedding node passes the resulting sections to the component
//! constructors.

use crate::types::Address;
use ethers::types::U256;
use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [genesis]
/// address = "hx0000000000000000000000000000000000000000"
/// treasury_address = "hx1111111111111111111111111111111111111111"
/// total_supply = "100000000000000000000"
///
/// [context]
/// max_size = 10
///
/// [step]
/// step_price = 10000000000
/// minimum_step = 100000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub genesis: GenesisConfig,
    pub context: ContextConfig,
    pub step: StepConfig,
}

/// Genesis bootstrap configuration
///
/// Identifies the two accounts materialized at chain start and the initial
/// total supply, all of which is credited to the genesis account. Addresses
/// are parsed with the usual fallback, so a malformed value in the file
/// becomes an opaque ledger key rather than a load error.
#[derive(Debug, Clone, Deserialize)]
pub struct GenesisConfig {
    pub address: Address,
    pub treasury_address: Address,
    /// Initial total supply in loop units, credited to the genesis account.
    /// Kept as a decimal string because supplies exceed TOML's integer range.
    pub total_supply: String,
}

impl GenesisConfig {
    /// Parse the configured total supply into the ledger's balance type
    pub fn initial_supply(&self) -> anyhow::Result<U256> {
        U256::from_dec_str(&self.total_supply)
            .map_err(|e| anyhow::anyhow!("invalid genesis total_supply: {e}"))
    }
}

/// Execution context pool configuration
///
/// `max_size` bounds how many contexts may be checked out concurrently; the
/// pool is the sole admission-control point for concurrent state access.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    pub max_size: usize,
}

/// Step (fee-metering) protocol parameters for v3 transactions
///
/// # Fields
/// - `step_price`: price of one step in loop units; v3 fee = stepLimit * step_price
/// - `minimum_step`: lowest stepLimit a v3 transaction may declare
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub step_price: u64,
    pub minimum_step: u64,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
