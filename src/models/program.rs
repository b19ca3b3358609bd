//! Program slot records delivered by the catalog service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{parse_number, value_text};

/// Identifier of a program slot, unique within one catalog snapshot.
pub type SlotId = String;

/// Raw catalog response body: `{ "programs": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub programs: Vec<CatalogRecord>,
}

/// One program row as the catalog sends it.
///
/// Values are kept loosely typed; prices may be numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub day: Value,
    #[serde(default)]
    pub time: Value,
    #[serde(default)]
    pub program: Value,
    #[serde(default)]
    pub slot: Value,

    /// List price for the reference spot duration
    #[serde(default)]
    pub cost: Value,

    /// Fixed net cost stored for special channels
    #[serde(default)]
    pub net_cost: Value,

    /// Fixed rate stored for the contracted client
    #[serde(default)]
    pub contracted_rate: Value,

    /// Legacy column name of the contracted rate
    #[serde(default)]
    pub cargills_rate: Value,

    /// Remaining columns, including one rating column per target group
    #[serde(flatten)]
    pub columns: HashMap<String, Value>,
}

impl CatalogRecord {
    /// Convert into a slot for `channel`, picking the rating column of
    /// `target_group`. Returns `None` when the row has no usable id.
    pub fn into_slot(self, channel: &str, target_group: &str) -> Option<ProgramSlot> {
        let id = value_text(&self.id);
        if id.is_empty() {
            return None;
        }

        let rating = self
            .columns
            .get(target_group)
            .and_then(parse_number)
            .unwrap_or(0.0);

        let slot = value_text(&self.slot);
        Some(ProgramSlot {
            id,
            channel: channel.to_string(),
            day: value_text(&self.day),
            time: value_text(&self.time),
            program: value_text(&self.program),
            slot: (!slot.is_empty()).then_some(slot),
            list_price: parse_number(&self.cost),
            special_net_cost: parse_number(&self.net_cost),
            contracted_rate: parse_number(&self.contracted_rate)
                .or_else(|| parse_number(&self.cargills_rate)),
            rating,
        })
    }
}

/// One schedulable program instance of a channel's catalog snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSlot {
    /// Stable identifier within the snapshot
    pub id: SlotId,

    /// Channel the slot was fetched for
    pub channel: String,

    pub day: String,
    pub time: String,

    /// Program display name
    pub program: String,

    /// Catalog slot code (e.g., prime/non-prime band)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    /// List price; `None` when the catalog value is missing or not numeric
    pub list_price: Option<f64>,

    #[serde(default)]
    pub special_net_cost: Option<f64>,

    #[serde(default)]
    pub contracted_rate: Option<f64>,

    /// Audience rating for the selected target group
    #[serde(default)]
    pub rating: f64,
}
