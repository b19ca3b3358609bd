// src/pipeline/resolve.rs

//! One-shot rate resolution for a channel.

use std::sync::Arc;

use crate::engine::{EventOutcome, RateEvent, RateSettings, SessionSetup};
use crate::error::Result;
use crate::models::{Config, RateSheet};
use crate::services::{CatalogProvider, RateSession};

/// Inputs of a single resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Planned channels; the resolved channel is added if missing
    pub channels: Vec<String>,
    pub channel: String,
    pub client: Option<String>,
    pub target_group: Option<String>,
    pub discount: Option<f64>,
}

/// Open a session on `request.channel`, apply the discount and return the
/// resulting sheet.
pub async fn run_resolve(
    config: &Config,
    provider: Arc<dyn CatalogProvider>,
    request: ResolveRequest,
) -> Result<RateSheet> {
    let mut channels = vec![request.channel.clone()];
    channels.extend(
        request
            .channels
            .into_iter()
            .filter(|c| *c != request.channel),
    );

    let setup = SessionSetup {
        channels,
        client: request.client,
        target_group: request.target_group,
        ..SessionSetup::default()
    };
    let settings = Arc::new(RateSettings::from_config(config));
    let mut session = RateSession::open(provider, settings, setup)?;
    session.settle().await;

    if let Some(percent) = request.discount {
        let outcome = session.dispatch(RateEvent::DiscountEdited { percent });
        if outcome != EventOutcome::Applied {
            log::warn!(
                "Discount {}% not applied to {}: {:?}",
                percent,
                request.channel,
                outcome
            );
        }
    }

    let sheet = session.context().sheet();
    log::info!(
        "Resolved {} slots for {} ({} unresolved)",
        sheet.rows.len(),
        sheet.selection,
        sheet.unresolved().count()
    );
    Ok(sheet)
}
