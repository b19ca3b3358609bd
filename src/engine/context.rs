// src/engine/context.rs

//! The rate reducer.
//!
//! `RateContext` owns everything the rate-setting screen mutates: the
//! selection, per-channel discounts, the visible catalog snapshot, the
//! resolved rates and the override registry. Each [`RateEvent`] is applied
//! by one handler, and every handler that needs a computed rate goes through
//! the same precedence routine in [`crate::engine::resolve`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::event::{EventOutcome, IgnoreReason, RateEvent, ReloadRequest};
use crate::engine::lock::{ChannelClass, LockPolicy, LockReason};
use crate::engine::overrides::OverrideRegistry;
use crate::engine::resolve::{RateSource, ResolvedRate, compute, resolve};
use crate::error::{AppError, Result};
use crate::models::{Config, ProgramSlot, Selection, SlotId};

/// Static rules shared by every session.
#[derive(Debug, Clone)]
pub struct RateSettings {
    pub policy: LockPolicy,
    pub default_discount_percent: f64,
    pub clients: Vec<String>,
    pub default_client: String,
    pub target_groups: Vec<String>,
}

impl RateSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: LockPolicy::from_config(&config.channels),
            default_discount_percent: config.rates.default_discount_percent,
            clients: config.clients.options.clone(),
            default_client: config.clients.default.clone(),
            target_groups: config.target_groups.iter().map(|g| g.key.clone()).collect(),
        }
    }

    fn default_target_group(&self) -> &str {
        self.target_groups
            .first()
            .map(String::as_str)
            .unwrap_or("tvr_all")
    }
}

/// How a rate-setting session starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSetup {
    /// Channels in the plan; the first one becomes active
    pub channels: Vec<String>,

    /// Discounts restored from an earlier visit
    #[serde(default)]
    pub initial_discounts: HashMap<String, f64>,

    #[serde(default)]
    pub client: Option<String>,

    #[serde(default)]
    pub target_group: Option<String>,
}

/// Discount input state of the active channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountView {
    pub channel: String,
    pub percent: f64,
    pub editable: bool,
    pub lock_reason: Option<LockReason>,
}

/// Outcome of [`RateContext::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub outcome: EventOutcome,
    /// Catalog fetch to perform, present after a selection change
    pub reload: Option<ReloadRequest>,
}

impl Step {
    fn applied() -> Self {
        Self {
            outcome: EventOutcome::Applied,
            reload: None,
        }
    }

    fn ignored(reason: IgnoreReason) -> Self {
        Self {
            outcome: EventOutcome::Ignored(reason),
            reload: None,
        }
    }

    fn stale() -> Self {
        Self {
            outcome: EventOutcome::Stale,
            reload: None,
        }
    }
}

/// Result of [`RateContext::apply_event`]: the next context and its effects.
#[derive(Debug, Clone)]
pub struct Transition {
    pub context: RateContext,
    pub outcome: EventOutcome,
    pub reload: Option<ReloadRequest>,
}

/// Rate-setting state for one plan.
#[derive(Debug, Clone)]
pub struct RateContext {
    settings: Arc<RateSettings>,
    planned: Vec<String>,
    selection: Selection,
    discounts: BTreeMap<String, f64>,
    snapshot: Vec<ProgramSlot>,
    snapshot_origin: Option<Selection>,
    rates: HashMap<SlotId, ResolvedRate>,
    overrides: OverrideRegistry,
    pending: Option<Selection>,
}

impl RateContext {
    /// Open a session over the planned channels and request the first
    /// catalog load.
    pub fn open(settings: Arc<RateSettings>, setup: SessionSetup) -> Result<Transition> {
        let Some(first) = setup.channels.first().cloned() else {
            return Err(AppError::validation("No channels selected for the plan"));
        };

        let client = setup
            .client
            .unwrap_or_else(|| settings.default_client.clone());
        if !settings.clients.contains(&client) {
            return Err(AppError::validation(format!("Unknown client '{client}'")));
        }

        let target_group = setup
            .target_group
            .unwrap_or_else(|| settings.default_target_group().to_string());
        if !settings.target_groups.contains(&target_group) {
            return Err(AppError::validation(format!(
                "Unknown target group '{target_group}'"
            )));
        }

        let mut planned: Vec<String> = Vec::with_capacity(setup.channels.len());
        for channel in setup.channels {
            if !planned.contains(&channel) {
                planned.push(channel);
            }
        }

        // Special channels always start at zero; contract locks depend on the
        // client and are pinned on selection instead.
        let discounts = planned
            .iter()
            .map(|channel| {
                let percent = if settings.policy.class_of(channel) == ChannelClass::Special {
                    0.0
                } else {
                    setup
                        .initial_discounts
                        .get(channel)
                        .copied()
                        .filter(|p| p.is_finite())
                        .unwrap_or(settings.default_discount_percent)
                };
                (channel.clone(), percent)
            })
            .collect();

        let mut context = Self {
            settings,
            planned,
            selection: Selection::new(first, client, target_group),
            discounts,
            snapshot: Vec::new(),
            snapshot_origin: None,
            rates: HashMap::new(),
            overrides: OverrideRegistry::new(),
            pending: None,
        };
        context.pin_if_locked();
        let step = context.request_reload();

        Ok(Transition {
            context,
            outcome: step.outcome,
            reload: step.reload,
        })
    }

    /// Apply one event, consuming this context and returning the next one.
    pub fn apply_event(mut self, event: RateEvent) -> Transition {
        let step = self.dispatch(event);
        Transition {
            context: self,
            outcome: step.outcome,
            reload: step.reload,
        }
    }

    /// Apply one event in place.
    pub fn dispatch(&mut self, event: RateEvent) -> Step {
        let kind = event.kind();
        let step = match event {
            RateEvent::ChannelChanged { channel } => self.change_channel(channel),
            RateEvent::ClientChanged { client } => self.change_client(client),
            RateEvent::TargetGroupChanged { target_group } => {
                self.change_target_group(target_group)
            }
            RateEvent::DiscountEdited { percent } => self.edit_discount(percent),
            RateEvent::RateOverridden { slot_id, value } => self.override_rate(slot_id, value),
            RateEvent::RateReset { slot_id } => self.reset_rate(&slot_id),
            RateEvent::CatalogLoaded { origin, slots } => self.load_catalog(origin, slots),
        };

        match step.outcome {
            EventOutcome::Applied => log::debug!("{kind} applied ({})", self.selection),
            EventOutcome::Ignored(reason) => log::debug!("{kind} ignored: {reason:?}"),
            EventOutcome::Stale => log::debug!(
                "{kind} discarded: response no longer matches {}",
                self.selection
            ),
        }
        step
    }

    fn change_channel(&mut self, channel: String) -> Step {
        if !self.planned.contains(&channel) {
            return Step::ignored(IgnoreReason::UnknownChannel);
        }
        if channel == self.selection.channel {
            return Step::ignored(IgnoreReason::Unchanged);
        }
        self.selection.channel = channel;
        self.pin_if_locked();
        self.request_reload()
    }

    fn change_client(&mut self, client: String) -> Step {
        if !self.settings.clients.contains(&client) {
            return Step::ignored(IgnoreReason::UnknownClient);
        }
        if client == self.selection.client {
            return Step::ignored(IgnoreReason::Unchanged);
        }
        self.selection.client = client;
        self.pin_if_locked();
        self.rederive_active();
        self.request_reload()
    }

    fn change_target_group(&mut self, target_group: String) -> Step {
        if !self.settings.target_groups.contains(&target_group) {
            return Step::ignored(IgnoreReason::UnknownTargetGroup);
        }
        if target_group == self.selection.target_group {
            return Step::ignored(IgnoreReason::Unchanged);
        }
        self.selection.target_group = target_group;
        self.request_reload()
    }

    fn edit_discount(&mut self, percent: f64) -> Step {
        if !percent.is_finite() {
            return Step::ignored(IgnoreReason::NotANumber);
        }
        if self.is_active_locked() {
            return Step::ignored(IgnoreReason::Locked);
        }
        self.discounts.insert(self.selection.channel.clone(), percent);
        self.rederive_active();
        Step::applied()
    }

    fn override_rate(&mut self, slot_id: SlotId, value: f64) -> Step {
        if !value.is_finite() {
            return Step::ignored(IgnoreReason::NotANumber);
        }
        if !self.rates.contains_key(&slot_id) {
            return Step::ignored(IgnoreReason::UnknownSlot);
        }
        self.overrides.set(slot_id.clone(), value);
        self.rates.insert(
            slot_id,
            ResolvedRate {
                value,
                source: RateSource::Override,
            },
        );
        Step::applied()
    }

    fn reset_rate(&mut self, slot_id: &str) -> Step {
        let Some(rate) = self
            .snapshot
            .iter()
            .find(|slot| slot.id == slot_id)
            .map(|slot| self.computed(slot))
        else {
            return Step::ignored(IgnoreReason::UnknownSlot);
        };
        self.overrides.clear(slot_id);
        self.rates.insert(slot_id.to_string(), rate);
        Step::applied()
    }

    fn load_catalog(&mut self, origin: Selection, slots: Vec<ProgramSlot>) -> Step {
        if origin != self.selection {
            return Step::stale();
        }

        let mut seen = HashSet::new();
        let slots: Vec<ProgramSlot> = slots
            .into_iter()
            .filter(|slot| {
                let fresh = seen.insert(slot.id.clone());
                if !fresh {
                    log::warn!(
                        "Duplicate slot id {} in catalog for {}; keeping the first row",
                        slot.id,
                        slot.channel
                    );
                }
                fresh
            })
            .collect();

        let present: HashSet<&str> = slots.iter().map(|slot| slot.id.as_str()).collect();
        let dropped = self.overrides.retain_ids(&present);

        let rates = slots
            .iter()
            .map(|slot| (slot.id.clone(), self.resolved(slot)))
            .collect();

        log::info!(
            "Loaded {} slots for {} ({} overrides kept, {} dropped)",
            slots.len(),
            origin,
            self.overrides.len(),
            dropped
        );

        self.rates = rates;
        self.snapshot = slots;
        self.snapshot_origin = Some(origin);
        self.pending = None;
        Step::applied()
    }

    /// Re-derive every non-overridden row of the active channel.
    fn rederive_active(&mut self) {
        let active = &self.selection.channel;
        let updates: Vec<(SlotId, ResolvedRate)> = self
            .snapshot
            .iter()
            .filter(|slot| &slot.channel == active && !self.overrides.is_overridden(&slot.id))
            .map(|slot| (slot.id.clone(), self.computed(slot)))
            .collect();
        self.rates.extend(updates);
    }

    fn pin_if_locked(&mut self) {
        if self.is_active_locked() {
            self.discounts.insert(self.selection.channel.clone(), 0.0);
        }
    }

    fn request_reload(&mut self) -> Step {
        self.pending = Some(self.selection.clone());
        Step {
            outcome: EventOutcome::Applied,
            reload: Some(ReloadRequest {
                selection: self.selection.clone(),
            }),
        }
    }

    fn is_active_locked(&self) -> bool {
        self.settings
            .policy
            .is_locked(&self.selection.channel, &self.selection.client)
    }

    fn resolved(&self, slot: &ProgramSlot) -> ResolvedRate {
        resolve(
            slot,
            self.settings
                .policy
                .rule_for(&slot.channel, &self.selection.client),
            self.effective_discount(&slot.channel),
            self.overrides.active(&slot.id),
        )
    }

    fn computed(&self, slot: &ProgramSlot) -> ResolvedRate {
        compute(
            slot,
            self.settings
                .policy
                .rule_for(&slot.channel, &self.selection.client),
            self.effective_discount(&slot.channel),
        )
    }

    // --- Views ---

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn planned_channels(&self) -> &[String] {
        &self.planned
    }

    /// Whether a reload for the current selection is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Selection the visible snapshot was loaded for.
    pub fn snapshot_origin(&self) -> Option<&Selection> {
        self.snapshot_origin.as_ref()
    }

    pub fn slots(&self) -> &[ProgramSlot] {
        &self.snapshot
    }

    pub fn rate(&self, slot_id: &str) -> Option<ResolvedRate> {
        self.rates.get(slot_id).copied()
    }

    /// Visible slots in catalog order with their resolved rates.
    pub fn rows(&self) -> impl Iterator<Item = (&ProgramSlot, ResolvedRate)> {
        self.snapshot
            .iter()
            .filter_map(|slot| self.rate(&slot.id).map(|rate| (slot, rate)))
    }

    pub fn overrides(&self) -> &OverrideRegistry {
        &self.overrides
    }

    /// Discount in force for `channel` under the current client.
    pub fn effective_discount(&self, channel: &str) -> f64 {
        if self
            .settings
            .policy
            .is_locked(channel, &self.selection.client)
        {
            return 0.0;
        }
        self.discounts
            .get(channel)
            .copied()
            .unwrap_or(self.settings.default_discount_percent)
    }

    /// Effective discount of every planned channel.
    pub fn channel_discounts(&self) -> BTreeMap<String, f64> {
        self.planned
            .iter()
            .map(|channel| (channel.clone(), self.effective_discount(channel)))
            .collect()
    }

    pub fn discount_view(&self) -> DiscountView {
        let channel = self.selection.channel.clone();
        let lock_reason = self
            .settings
            .policy
            .lock_reason(&channel, &self.selection.client);
        DiscountView {
            percent: self.effective_discount(&channel),
            editable: lock_reason.is_none(),
            lock_reason,
            channel,
        }
    }
}
