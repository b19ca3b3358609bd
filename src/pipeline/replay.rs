// src/pipeline/replay.rs

//! Replay a recorded sequence of rate-screen events.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{EventOutcome, RateEvent, RateSettings, SessionSetup};
use crate::error::Result;
use crate::models::{Config, RateSheet};
use crate::services::{CatalogProvider, RateSession};

/// A recorded session: how it opened and what the user did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub setup: SessionSetup,
    #[serde(default)]
    pub events: Vec<RateEvent>,
}

impl ReplayScript {
    /// Load a script from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Counts of how the replayed events were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub ignored: usize,
    pub stale: usize,
}

/// Apply every scripted event in order, waiting for the reload each
/// selection change triggers before moving on.
pub async fn run_replay(
    config: &Config,
    provider: Arc<dyn CatalogProvider>,
    script: ReplayScript,
) -> Result<(RateSheet, ReplaySummary)> {
    let settings = Arc::new(RateSettings::from_config(config));
    let mut session = RateSession::open(provider, settings, script.setup)?;
    session.settle().await;

    let mut summary = ReplaySummary::default();
    for (index, event) in script.events.into_iter().enumerate() {
        let kind = event.kind();
        match session.dispatch(event) {
            EventOutcome::Applied => summary.applied += 1,
            EventOutcome::Ignored(reason) => {
                summary.ignored += 1;
                log::warn!("Event #{} ({}) ignored: {:?}", index + 1, kind, reason);
            }
            EventOutcome::Stale => summary.stale += 1,
        }
        session.settle().await;
    }

    log::info!(
        "Replayed {} events: {} applied, {} ignored, {} stale",
        summary.applied + summary.ignored + summary.stale,
        summary.applied,
        summary.ignored,
        summary.stale
    );
    Ok((session.context().sheet(), summary))
}
