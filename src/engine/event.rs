// src/engine/event.rs

//! Inputs to the rate reducer and what it reports back.

use serde::{Deserialize, Serialize};

use crate::models::{ProgramSlot, Selection, SlotId};

/// Every input that can change the negotiated rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RateEvent {
    ChannelChanged {
        channel: String,
    },
    ClientChanged {
        client: String,
    },
    TargetGroupChanged {
        target_group: String,
    },
    /// New discount percentage for the active channel
    DiscountEdited {
        percent: f64,
    },
    RateOverridden {
        slot_id: SlotId,
        value: f64,
    },
    RateReset {
        slot_id: SlotId,
    },
    /// Catalog response, tagged with the selection that requested it
    CatalogLoaded {
        origin: Selection,
        slots: Vec<ProgramSlot>,
    },
}

impl RateEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RateEvent::ChannelChanged { .. } => "channel_changed",
            RateEvent::ClientChanged { .. } => "client_changed",
            RateEvent::TargetGroupChanged { .. } => "target_group_changed",
            RateEvent::DiscountEdited { .. } => "discount_edited",
            RateEvent::RateOverridden { .. } => "rate_overridden",
            RateEvent::RateReset { .. } => "rate_reset",
            RateEvent::CatalogLoaded { .. } => "catalog_loaded",
        }
    }
}

/// A catalog fetch the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadRequest {
    pub selection: Selection,
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// Input rejected, state untouched
    Ignored(IgnoreReason),
    /// Catalog response for a selection that is no longer active
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Discount edit on a locked channel
    Locked,
    UnknownChannel,
    UnknownClient,
    UnknownTargetGroup,
    /// Slot is not part of the visible snapshot
    UnknownSlot,
    NotANumber,
    /// Selection field set to its current value
    Unchanged,
}
