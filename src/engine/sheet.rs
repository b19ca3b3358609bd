// src/engine/sheet.rs

//! Building the rate sheet handed on to the plan.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::engine::context::RateContext;
use crate::models::{ProgramSlot, RateRow, RateSheet};

impl RateContext {
    /// Capture the visible rates and the plan's discounts.
    pub fn sheet(&self) -> RateSheet {
        let view = self.discount_view();
        let rows = self
            .rows()
            .map(|(slot, rate)| RateRow {
                id: slot.id.clone(),
                day: slot.day.clone(),
                time: slot.time.clone(),
                program: slot.program.clone(),
                rating: slot.rating,
                list_price: slot.list_price,
                rate: rate.value,
                source: rate.source,
                overridden: rate.is_overridden(),
            })
            .collect();

        RateSheet {
            generated_at: Utc::now(),
            selection: self.selection().clone(),
            discount_percent: view.percent,
            discount_editable: view.editable,
            lock_reason: view.lock_reason,
            channel_discounts: self.channel_discounts(),
            catalog_digest: catalog_digest(self.slots()),
            rows,
        }
    }
}

/// Hex SHA-256 over the ids and source prices of a snapshot.
pub fn catalog_digest(slots: &[ProgramSlot]) -> String {
    let mut hasher = Sha256::new();
    for slot in slots {
        let line = format!(
            "{}|{}|{}|{}|{}\n",
            slot.channel,
            slot.id,
            price_text(slot.list_price),
            price_text(slot.special_net_cost),
            price_text(slot.contracted_rate),
        );
        hasher.update(line.as_bytes());
    }
    hex::encode(hasher.finalize())
}

fn price_text(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::{RateEvent, RateSettings, RateSource, SessionSetup};
    use crate::models::Config;

    fn slot(id: &str, list: Option<f64>) -> ProgramSlot {
        ProgramSlot {
            id: id.into(),
            channel: "ITN".into(),
            day: "Friday".into(),
            time: "21:00".into(),
            program: "Teledrama".into(),
            slot: None,
            list_price: list,
            special_net_cost: None,
            contracted_rate: None,
            rating: 4.25,
        }
    }

    fn loaded_context() -> RateContext {
        let settings = Arc::new(RateSettings::from_config(&Config::default()));
        let setup = SessionSetup {
            channels: vec!["ITN".into(), "SIRASA TV".into()],
            ..SessionSetup::default()
        };
        let mut ctx = RateContext::open(settings, setup).unwrap().context;
        let origin = ctx.selection().clone();
        ctx.dispatch(RateEvent::CatalogLoaded {
            origin,
            slots: vec![slot("1", Some(1000.0)), slot("2", None)],
        });
        ctx.dispatch(RateEvent::RateOverridden {
            slot_id: "1".into(),
            value: 650.0,
        });
        ctx
    }

    #[test]
    fn test_sheet_rows_follow_catalog_order() {
        let sheet = loaded_context().sheet();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].id, "1");
        assert_eq!(sheet.rows[0].rate, 650.0);
        assert!(sheet.rows[0].overridden);
        assert_eq!(sheet.rows[1].source, RateSource::Unresolved);
        assert_eq!(sheet.unresolved().count(), 1);
        assert_eq!(sheet.negotiated_rates().get("1"), Some(&650.0));
    }

    #[test]
    fn test_sheet_reports_discounts() {
        let sheet = loaded_context().sheet();

        assert_eq!(sheet.discount_percent, 30.0);
        assert!(sheet.discount_editable);
        assert_eq!(sheet.lock_reason, None);
        assert_eq!(sheet.channel_discounts.get("SIRASA TV"), Some(&0.0));
    }

    #[test]
    fn test_sheet_serializes_sources_in_snake_case() {
        let json = serde_json::to_value(loaded_context().sheet()).unwrap();
        assert_eq!(json["rows"][0]["source"], "override");
        assert_eq!(json["rows"][1]["source"], "unresolved");
        assert!(json.get("lock_reason").is_none());
    }

    #[test]
    fn test_catalog_digest_tracks_prices() {
        let a = catalog_digest(&[slot("1", Some(1000.0))]);
        let b = catalog_digest(&[slot("1", Some(1000.0))]);
        let c = catalog_digest(&[slot("1", Some(1100.0))]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
