//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote catalog service settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rate computation defaults
    #[serde(default)]
    pub rates: RateConfig,

    /// Channel resolution classes
    #[serde(default)]
    pub channels: ChannelConfig,

    /// Selectable clients
    #[serde(default)]
    pub clients: ClientConfig,

    /// Target audience groups, first entry is the default
    #[serde(default = "defaults::target_groups")]
    pub target_groups: Vec<TargetGroup>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(e) => {
                log::warn!(
                    "Config load failed from {:?}: {}. Using defaults.",
                    path.as_ref(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(AppError::validation("catalog.base_url is empty"));
        }
        url::Url::parse(&self.catalog.base_url)?;
        if self.catalog.user_agent.trim().is_empty() {
            return Err(AppError::validation("catalog.user_agent is empty"));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(AppError::validation("catalog.timeout_secs must be > 0"));
        }
        if self.catalog.max_concurrent == 0 {
            return Err(AppError::validation("catalog.max_concurrent must be > 0"));
        }
        if !self.rates.default_discount_percent.is_finite() {
            return Err(AppError::validation(
                "rates.default_discount_percent must be a finite number",
            ));
        }

        if self.clients.options.is_empty() {
            return Err(AppError::validation("No clients defined"));
        }
        if !self.clients.is_known(&self.clients.default) {
            return Err(AppError::validation(format!(
                "clients.default '{}' is not one of clients.options",
                self.clients.default
            )));
        }

        for contract in &self.channels.contracted {
            if !self.clients.is_known(&contract.client) {
                return Err(AppError::validation(format!(
                    "Channel '{}' is contracted to unknown client '{}'",
                    contract.channel, contract.client
                )));
            }
            if self.channels.special.contains(&contract.channel) {
                return Err(AppError::validation(format!(
                    "Channel '{}' is both special and client-contracted",
                    contract.channel
                )));
            }
        }

        let mut contracted = HashSet::new();
        for contract in &self.channels.contracted {
            if !contracted.insert(contract.channel.as_str()) {
                return Err(AppError::validation(format!(
                    "Channel '{}' has more than one contract",
                    contract.channel
                )));
            }
        }

        if self.target_groups.is_empty() {
            return Err(AppError::validation("No target groups defined"));
        }
        let mut keys = HashSet::new();
        for group in &self.target_groups {
            if !keys.insert(group.key.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate target group key '{}'",
                    group.key
                )));
            }
        }
        Ok(())
    }

    /// Key of the default target group.
    pub fn default_target_group(&self) -> &str {
        self.target_groups
            .first()
            .map(|g| g.key.as_str())
            .unwrap_or("tvr_all")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            rates: RateConfig::default(),
            channels: ChannelConfig::default(),
            clients: ClientConfig::default(),
            target_groups: defaults::target_groups(),
        }
    }
}

/// Remote catalog service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog service
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent catalog requests when prefetching channels
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Rate computation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Discount seeded for ordinary channels without an initial value
    #[serde(default = "defaults::discount")]
    pub default_discount_percent: f64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            default_discount_percent: defaults::discount(),
        }
    }
}

/// Static channel class membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channels priced by the catalog's fixed net cost
    #[serde(default = "defaults::special_channels")]
    pub special: Vec<String>,

    /// Channels with a fixed rate for one client
    #[serde(default = "defaults::contracted_channels")]
    pub contracted: Vec<ContractedChannel>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            special: defaults::special_channels(),
            contracted: defaults::contracted_channels(),
        }
    }
}

/// A channel whose contracted rate applies to a single client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractedChannel {
    pub channel: String,
    pub client: String,
}

/// Selectable clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "defaults::client_options")]
    pub options: Vec<String>,

    #[serde(default = "defaults::default_client")]
    pub default: String,
}

impl ClientConfig {
    pub fn is_known(&self, client: &str) -> bool {
        self.options.iter().any(|c| c == client)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            options: defaults::client_options(),
            default: defaults::default_client(),
        }
    }
}

/// A target audience group and the catalog rating column it selects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetGroup {
    /// Catalog column key (e.g., "tvr_abc_15_30")
    pub key: String,

    /// Human-readable label
    pub label: String,
}

mod defaults {
    use super::{ContractedChannel, TargetGroup};

    // Catalog defaults
    pub fn base_url() -> String {
        "https://optwebapp-production-60b4.up.railway.app".into()
    }
    pub fn user_agent() -> String {
        concat!("ratecard/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Rate defaults
    pub fn discount() -> f64 {
        30.0
    }

    // Channel defaults
    pub fn special_channels() -> Vec<String> {
        vec![
            "SHAKTHI TV".into(),
            "SHAKTHI NEWS".into(),
            "SIRASA TV".into(),
            "SIRASA NEWS".into(),
        ]
    }
    pub fn contracted_channels() -> Vec<ContractedChannel> {
        vec![ContractedChannel {
            channel: "DERANA TV".into(),
            client: "Cargills".into(),
        }]
    }

    // Client defaults
    pub fn client_options() -> Vec<String> {
        vec!["Cargills".into(), "Other".into()]
    }
    pub fn default_client() -> String {
        "Other".into()
    }

    // Target group defaults
    pub fn target_groups() -> Vec<TargetGroup> {
        [
            ("tvr_all", "All TG"),
            ("tvr_abc_15_90", "SEC ABC | Age 15-90"),
            ("tvr_abc_30_60", "SEC ABC | Age 30-60"),
            ("tvr_abc_15_30", "SEC ABC | Age 15-30"),
            ("tvr_abc_20_plus", "SEC ABC | Age 20+"),
            ("tvr_ab_15_plus", "SEC AB | Age 15+"),
            ("tvr_cd_15_plus", "SEC CD | Age 15+"),
            ("tvr_ab_female_15_45", "SEC AB | Female Age 15-45"),
            ("tvr_abc_15_60", "SEC ABC | Age 15-60"),
            ("tvr_bcde_15_plus", "SEC BCDE | Age 15+"),
            ("tvr_abcde_15_plus", "SEC ABCDE | Age 15+"),
            ("tvr_abc_female_15_60", "SEC ABC | Female Age 15-60"),
            ("tvr_abc_male_15_60", "SEC ABC | Male Age 15-60"),
        ]
        .into_iter()
        .map(|(key, label)| TargetGroup {
            key: key.into(),
            label: label.into(),
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.catalog.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_contract_client() {
        let mut config = Config::default();
        config.channels.contracted.push(ContractedChannel {
            channel: "ITN".into(),
            client: "Keells".into(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_channel_in_two_classes() {
        let mut config = Config::default();
        config.channels.special.push("DERANA TV".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_target_groups() {
        let mut config = Config::default();
        config.target_groups.push(TargetGroup {
            key: "tvr_all".into(),
            label: "again".into(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [rates]
            default_discount_percent = 20.0

            [channels]
            special = ["NEWS1"]
            "#,
        )
        .unwrap();
        assert_eq!(config.rates.default_discount_percent, 20.0);
        assert_eq!(config.channels.special, vec!["NEWS1".to_string()]);
        assert_eq!(config.channels.contracted.len(), 1);
        assert_eq!(config.default_target_group(), "tvr_all");
        assert_eq!(config.clients.default, "Other");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.target_groups.len(), 13);
    }

    #[test]
    fn load_or_default_falls_back_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratecard.toml");
        std::fs::write(&path, "[rates\ndefault_discount_percent = 10").unwrap();

        assert!(Config::load(&path).is_err());
        let config = Config::load_or_default(&path);
        assert_eq!(config.rates.default_discount_percent, 30.0);
    }

    #[test]
    fn load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratecard.toml");
        std::fs::write(&path, "[rates]\ndefault_discount_percent = 10.0\n").unwrap();

        let config = Config::load_or_default(&path);
        assert_eq!(config.rates.default_discount_percent, 10.0);
    }
}
