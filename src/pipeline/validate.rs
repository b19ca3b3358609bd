// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;

/// Validate the configuration and log what it defines.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("Config OK");
    log::info!("  catalog: {}", config.catalog.base_url);
    log::info!(
        "  timeout: {}s, max concurrent: {}",
        config.catalog.timeout_secs,
        config.catalog.max_concurrent
    );
    log::info!("  default discount: {}%", config.rates.default_discount_percent);
    log::info!("  special channels: {}", config.channels.special.join(", "));
    for contract in &config.channels.contracted {
        log::info!("  contracted: {} -> {}", contract.channel, contract.client);
    }
    log::info!(
        "  clients: {} (default {})",
        config.clients.options.join(", "),
        config.clients.default
    );
    log::info!(
        "  target groups: {} (default {})",
        config.target_groups.len(),
        config.default_target_group()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(run_validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_default_client() {
        let mut config = Config::default();
        config.clients.default = "Keells".into();
        assert!(run_validate(&config).is_err());
    }
}
