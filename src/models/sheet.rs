//! Rate sheet handed to the plan and export screens.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{LockReason, RateSource};
use crate::models::{Selection, SlotId};

/// Snapshot of every negotiated rate of the active channel plus the
/// discount state of the whole plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSheet {
    pub generated_at: DateTime<Utc>,
    pub selection: Selection,

    /// Effective discount of the active channel
    pub discount_percent: f64,

    /// Whether the discount input accepts edits
    pub discount_editable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_reason: Option<LockReason>,

    /// Effective discount per planned channel
    pub channel_discounts: BTreeMap<String, f64>,

    /// SHA-256 over the catalog snapshot the rows were derived from
    pub catalog_digest: String,

    pub rows: Vec<RateRow>,
}

impl RateSheet {
    /// Negotiated rate per slot id.
    pub fn negotiated_rates(&self) -> BTreeMap<&str, f64> {
        self.rows
            .iter()
            .map(|row| (row.id.as_str(), row.rate))
            .collect()
    }

    /// Rows whose rate could not be derived from the catalog.
    pub fn unresolved(&self) -> impl Iterator<Item = &RateRow> {
        self.rows
            .iter()
            .filter(|row| row.source == RateSource::Unresolved)
    }
}

/// One visible program slot with its resolved rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub id: SlotId,
    pub day: String,
    pub time: String,
    pub program: String,
    pub rating: f64,
    pub list_price: Option<f64>,
    pub rate: f64,
    pub source: RateSource,
    pub overridden: bool,
}
