use config::{Config, ConfigError, Environment, File};
use ethers::types::{Address, U256};
use serde::Deserialize;
use std::path::Path;

use crate::adapters::oracle::OracleSpec;
use crate::error::{ParleyError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub oracle: OracleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier stamped on every ledger request
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    /// Betting contract address
    pub betting_contract_address: String,
    /// Multisend packing contract address
    pub multisend_contract_address: String,
    /// Shared multisig wallet controlled by the agent set
    pub safe_contract_address: String,
    /// Bettor address, also the recipient of the batched native transfer
    pub transfer_target_address: String,
    /// Match identifier to bet on
    pub match_key: String,
    /// Bet amount in wei (decimal string, may exceed u64)
    pub betting_amount: String,
}

fn default_chain_id() -> String {
    "gnosis".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Endpoint serving the betting-outcome signal
    pub url: String,
    /// HTTP method (GET or POST)
    #[serde(default = "default_oracle_method")]
    pub method: String,
    /// Dotted path to the object holding the boolean `result` field
    #[serde(default)]
    pub response_path: String,
}

fn default_oracle_method() -> String {
    "GET".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Public gateway used only for log output of stored content hashes
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://gateway.autonolas.tech/ipfs/".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> std::result::Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("chain.chain_id", "gnosis")?
            .set_default("oracle.method", "GET")?
            .set_default("oracle.response_path", "")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("PARLEY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (PARLEY_CHAIN__MATCH_KEY, etc.)
            .add_source(
                Environment::with_prefix("PARLEY")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("betting_contract_address", &self.chain.betting_contract_address),
            ("multisend_contract_address", &self.chain.multisend_contract_address),
            ("safe_contract_address", &self.chain.safe_contract_address),
            ("transfer_target_address", &self.chain.transfer_target_address),
        ] {
            if value.parse::<Address>().is_err() {
                errors.push(format!("{name} is not a valid address: {value}"));
            }
        }

        if self.chain.match_key.is_empty() {
            errors.push("match_key must not be empty".to_string());
        }

        if U256::from_dec_str(&self.chain.betting_amount).is_err() {
            errors.push(format!(
                "betting_amount is not a decimal wei amount: {}",
                self.chain.betting_amount
            ));
        }

        if !matches!(self.oracle.method.as_str(), "GET" | "POST") {
            errors.push(format!("oracle method must be GET or POST: {}", self.oracle.method));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Immutable, typed per-run parameter set handed to each stage constructor.
///
/// Built once from [`AppConfig`] at startup; stages share it behind an `Arc`
/// and never mutate it.
#[derive(Debug, Clone)]
pub struct Params {
    pub chain_id: String,
    pub betting_contract_address: Address,
    pub multisend_contract_address: Address,
    pub transfer_target_address: Address,
    pub match_key: String,
    pub betting_amount: U256,
    pub oracle_spec: OracleSpec,
    pub storage_gateway_url: String,
}

impl Params {
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        let parse_addr = |name: &str, value: &str| -> Result<Address> {
            value
                .parse::<Address>()
                .map_err(|e| ParleyError::AddressParsing(format!("{name}: {e}")))
        };

        Ok(Self {
            chain_id: cfg.chain.chain_id.clone(),
            betting_contract_address: parse_addr(
                "betting_contract_address",
                &cfg.chain.betting_contract_address,
            )?,
            multisend_contract_address: parse_addr(
                "multisend_contract_address",
                &cfg.chain.multisend_contract_address,
            )?,
            transfer_target_address: parse_addr(
                "transfer_target_address",
                &cfg.chain.transfer_target_address,
            )?,
            match_key: cfg.chain.match_key.clone(),
            betting_amount: U256::from_dec_str(&cfg.chain.betting_amount)
                .map_err(|e| ParleyError::Validation(format!("betting_amount: {e}")))?,
            oracle_spec: OracleSpec {
                url: cfg.oracle.url.clone(),
                method: cfg.oracle.method.clone(),
                response_path: cfg.oracle.response_path.clone(),
            },
            storage_gateway_url: cfg.storage.gateway_url.clone(),
        })
    }
}
