// src/services/session.rs

//! Async driver around the rate reducer.
//!
//! Reloads run as spawned tasks and report back through a channel, so
//! responses can arrive in any order; the reducer discards the ones whose
//! selection is no longer active.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::engine::{
    EventOutcome, RateContext, RateEvent, RateSettings, ReloadRequest, SessionSetup,
};
use crate::error::Result;
use crate::services::catalog::{CatalogProvider, load_or_empty};

/// A rate-setting session bound to a catalog provider.
pub struct RateSession {
    context: RateContext,
    provider: Arc<dyn CatalogProvider>,
    tx: mpsc::UnboundedSender<RateEvent>,
    rx: mpsc::UnboundedReceiver<RateEvent>,
    in_flight: usize,
}

impl RateSession {
    /// Open a session and start loading the first channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        provider: Arc<dyn CatalogProvider>,
        settings: Arc<RateSettings>,
        setup: SessionSetup,
    ) -> Result<Self> {
        let transition = RateContext::open(settings, setup)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let mut session = Self {
            context: transition.context,
            provider,
            tx,
            rx,
            in_flight: 0,
        };
        if let Some(request) = transition.reload {
            session.spawn_reload(request);
        }
        Ok(session)
    }

    /// Apply a user event, starting a reload if the selection changed.
    pub fn dispatch(&mut self, event: RateEvent) -> EventOutcome {
        let step = self.context.dispatch(event);
        if let Some(request) = step.reload {
            self.spawn_reload(request);
        }
        step.outcome
    }

    /// Wait for every outstanding reload and apply its response.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            self.in_flight -= 1;
            self.context.dispatch(event);
        }
    }

    /// Number of reloads whose responses have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn context(&self) -> &RateContext {
        &self.context
    }

    pub fn into_context(self) -> RateContext {
        self.context
    }

    fn spawn_reload(&mut self, request: ReloadRequest) {
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let selection = request.selection;
            let slots =
                load_or_empty(provider.as_ref(), &selection.channel, &selection.target_group)
                    .await;
            // The receiver only goes away with the session itself.
            let _ = tx.send(RateEvent::CatalogLoaded {
                origin: selection,
                slots,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::engine::{LockPolicy, RateSource};
    use crate::error::AppError;
    use crate::models::ProgramSlot;

    /// In-memory catalog with a per-channel response delay.
    struct StubCatalog {
        channels: HashMap<String, (Duration, Vec<ProgramSlot>)>,
    }

    #[async_trait]
    impl CatalogProvider for StubCatalog {
        async fn fetch(&self, channel: &str, _target_group: &str) -> Result<Vec<ProgramSlot>> {
            let Some((delay, slots)) = self.channels.get(channel) else {
                return Err(AppError::catalog(channel, "unreachable"));
            };
            tokio::time::sleep(*delay).await;
            Ok(slots.clone())
        }
    }

    fn slot(channel: &str, id: &str, list: f64) -> ProgramSlot {
        ProgramSlot {
            id: id.into(),
            channel: channel.into(),
            day: "Sunday".into(),
            time: "08:00".into(),
            program: "Cartoons".into(),
            slot: None,
            list_price: Some(list),
            special_net_cost: None,
            contracted_rate: None,
            rating: 0.5,
        }
    }

    fn settings() -> Arc<RateSettings> {
        Arc::new(RateSettings {
            policy: LockPolicy::new(["NEWS1".to_string()], Vec::<(String, String)>::new()),
            default_discount_percent: 30.0,
            clients: vec!["Other".into()],
            default_client: "Other".into(),
            target_groups: vec!["tvr_all".into(), "tvr_cd_15_plus".into()],
        })
    }

    fn catalog() -> Arc<dyn CatalogProvider> {
        let mut channels = HashMap::new();
        channels.insert(
            "SLOW".to_string(),
            (Duration::from_millis(80), vec![slot("SLOW", "s1", 1000.0)]),
        );
        channels.insert(
            "FAST".to_string(),
            (Duration::ZERO, vec![slot("FAST", "f1", 2000.0)]),
        );
        Arc::new(StubCatalog { channels })
    }

    fn setup(channels: &[&str]) -> SessionSetup {
        SessionSetup {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            ..SessionSetup::default()
        }
    }

    #[tokio::test]
    async fn test_open_loads_first_channel() {
        let mut session = RateSession::open(catalog(), settings(), setup(&["FAST"])).unwrap();
        assert_eq!(session.in_flight(), 1);

        session.settle().await;
        let ctx = session.context();
        assert!(!ctx.is_loading());
        assert_eq!(ctx.rate("f1").unwrap().value, 1400.0);
    }

    #[tokio::test]
    async fn test_slow_response_for_old_channel_is_discarded() {
        let mut session =
            RateSession::open(catalog(), settings(), setup(&["SLOW", "FAST"])).unwrap();
        session.dispatch(RateEvent::ChannelChanged {
            channel: "FAST".into(),
        });
        assert_eq!(session.in_flight(), 2);

        session.settle().await;
        let ctx = session.context();
        assert_eq!(ctx.selection().channel, "FAST");
        assert_eq!(ctx.slots().len(), 1);
        assert_eq!(ctx.slots()[0].channel, "FAST");
        assert!(ctx.rate("s1").is_none());
        assert!(!ctx.is_loading());
    }

    #[tokio::test]
    async fn test_override_survives_target_group_reload() {
        let mut session = RateSession::open(catalog(), settings(), setup(&["FAST"])).unwrap();
        session.settle().await;

        session.dispatch(RateEvent::RateOverridden {
            slot_id: "f1".into(),
            value: 1500.0,
        });
        session.dispatch(RateEvent::TargetGroupChanged {
            target_group: "tvr_cd_15_plus".into(),
        });
        session.settle().await;

        let rate = session.context().rate("f1").unwrap();
        assert_eq!(rate.value, 1500.0);
        assert_eq!(rate.source, RateSource::Override);
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_empty_catalog() {
        let mut session =
            RateSession::open(catalog(), settings(), setup(&["FAST", "DOWN"])).unwrap();
        session.settle().await;
        session.dispatch(RateEvent::ChannelChanged {
            channel: "DOWN".into(),
        });
        session.settle().await;

        let ctx = session.into_context();
        assert!(!ctx.is_loading());
        assert_eq!(ctx.rows().count(), 0);
    }
}
