// src/pipeline/channels.rs

//! Channel overview: resolution class and catalog size per channel.

use serde::Serialize;

use crate::engine::{ChannelClass, LockPolicy};
use crate::models::Config;
use crate::services::{CatalogProvider, fetch_many};

/// Catalog status of one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub channel: String,
    #[serde(flatten)]
    pub class: ChannelClass,
    /// Slot count, absent when the catalog could not be loaded
    pub slots: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetch every channel's catalog concurrently and summarize it.
///
/// With no channels given, the configured special and contracted channels
/// are listed. Summaries keep the order of `channels`.
pub async fn run_channels(
    config: &Config,
    provider: &dyn CatalogProvider,
    channels: &[String],
    target_group: Option<&str>,
) -> Vec<ChannelSummary> {
    let channels = if channels.is_empty() {
        configured_channels(config)
    } else {
        channels.to_vec()
    };
    let target_group = target_group.unwrap_or_else(|| config.default_target_group());
    let policy = LockPolicy::from_config(&config.channels);

    let mut results = fetch_many(
        provider,
        &channels,
        target_group,
        config.catalog.max_concurrent,
    )
    .await;

    let summaries: Vec<ChannelSummary> = channels
        .iter()
        .map(|channel| {
            let class = policy.class_of(channel);
            let position = results.iter().position(|(c, _)| c == channel);
            match position.map(|i| results.swap_remove(i).1) {
                Some(Ok(slots)) => ChannelSummary {
                    channel: channel.clone(),
                    class,
                    slots: Some(slots.len()),
                    error: None,
                },
                Some(Err(e)) => ChannelSummary {
                    channel: channel.clone(),
                    class,
                    slots: None,
                    error: Some(e.to_string()),
                },
                None => ChannelSummary {
                    channel: channel.clone(),
                    class,
                    slots: None,
                    error: Some("not fetched".into()),
                },
            }
        })
        .collect();

    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        log::warn!("{} of {} channel catalogs failed to load", failed, summaries.len());
    }
    summaries
}

fn configured_channels(config: &Config) -> Vec<String> {
    let mut channels = config.channels.special.clone();
    for contract in &config.channels.contracted {
        if !channels.contains(&contract.channel) {
            channels.push(contract.channel.clone());
        }
    }
    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::FileCatalog;

    const BODY: &str = r#"{ "programs": [
        { "id": 1, "day": "Monday", "time": "19:00", "program": "News", "cost": 500 },
        { "id": 2, "day": "Monday", "time": "20:00", "program": "Drama", "cost": 900 }
    ] }"#;

    #[tokio::test]
    async fn test_channels_reports_class_and_count() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("SIRASA TV.json"), BODY).unwrap();
        let catalog = FileCatalog::new(dir.path());

        let channels = vec!["SIRASA TV".to_string(), "DERANA TV".to_string()];
        let summaries = run_channels(&Config::default(), &catalog, &channels, None).await;

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].channel, "SIRASA TV");
        assert_eq!(summaries[0].class, ChannelClass::Special);
        assert_eq!(summaries[0].slots, Some(2));
        assert_eq!(
            summaries[1].class,
            ChannelClass::ClientContracted {
                client: "Cargills".into()
            }
        );
        assert!(summaries[1].slots.is_none());
        assert!(summaries[1].error.is_some());
    }

    #[test]
    fn test_configured_channels_default_list() {
        let channels = configured_channels(&Config::default());
        assert!(channels.contains(&"SHAKTHI TV".to_string()));
        assert!(channels.contains(&"DERANA TV".to_string()));
        assert_eq!(channels.len(), 5);
    }
}
