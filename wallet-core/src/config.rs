//! Configuration for the wallet service

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wallet service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Admission control configuration
    pub admission: AdmissionConfig,

    /// Transfer protocol configuration
    pub transfer: TransferConfig,

    /// Actor mailbox configuration
    pub mailbox: MailboxConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "wallet-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            admission: AdmissionConfig::default(),
            transfer: TransferConfig::default(),
            mailbox: MailboxConfig::default(),
        }
    }
}

/// Admission control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Maximum concurrently outstanding inbound credits per account
    pub max_in_flight: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self { max_in_flight: 10 }
    }
}

/// Transfer protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// How long the sender waits for the credit confirmation (seconds)
    pub deadline_secs: u64,
}

impl TransferConfig {
    /// Deadline as a duration
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { deadline_secs: 60 }
    }
}

/// Actor mailbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Bounded mailbox capacity per account actor
    pub capacity: usize,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {e}")))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(value) = std::env::var("WALLET_ADMISSION_MAX_IN_FLIGHT") {
            config.admission.max_in_flight = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("WALLET_ADMISSION_MAX_IN_FLIGHT: {e}")))?;
        }

        if let Ok(value) = std::env::var("WALLET_TRANSFER_DEADLINE_SECS") {
            config.transfer.deadline_secs = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("WALLET_TRANSFER_DEADLINE_SECS: {e}")))?;
        }

        if let Ok(value) = std::env::var("WALLET_MAILBOX_CAPACITY") {
            config.mailbox.capacity = value
                .parse()
                .map_err(|e| crate::Error::Config(format!("WALLET_MAILBOX_CAPACITY: {e}")))?;
        }

        Ok(config)
    }
}
