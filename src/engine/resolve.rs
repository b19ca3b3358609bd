// src/engine/resolve.rs

//! Per-slot rate precedence.
//!
//! Highest to lowest: manual override, contracted client rate, special net
//! cost, discounted list price. Every missing or non-finite source value
//! falls through to the list price; a slot without a list price at that
//! point is unresolved and reported with a zero rate.

use serde::{Deserialize, Serialize};

use crate::models::ProgramSlot;
use crate::utils::round_cents;

/// Computed rule selected by the lock policy for a channel and client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRule {
    /// Contracted client active on its contracted channel
    Contracted,
    /// Special channel net cost
    Special,
    /// List price less the channel discount
    Discounted,
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Override,
    Contracted,
    Special,
    /// Fixed-rate rule whose stored rate was missing
    ListPrice,
    Discounted,
    Unresolved,
}

/// Effective rate of one program slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub value: f64,
    pub source: RateSource,
}

impl ResolvedRate {
    pub fn is_overridden(&self) -> bool {
        self.source == RateSource::Override
    }

    pub fn is_unresolved(&self) -> bool {
        self.source == RateSource::Unresolved
    }

    fn unresolved() -> Self {
        Self {
            value: 0.0,
            source: RateSource::Unresolved,
        }
    }
}

/// Resolve a slot's rate, letting an active override win.
pub fn resolve(
    slot: &ProgramSlot,
    rule: RateRule,
    discount_percent: f64,
    manual: Option<f64>,
) -> ResolvedRate {
    match manual {
        Some(value) => ResolvedRate {
            value,
            source: RateSource::Override,
        },
        None => compute(slot, rule, discount_percent),
    }
}

/// Rate a slot would have without any override.
pub fn compute(slot: &ProgramSlot, rule: RateRule, discount_percent: f64) -> ResolvedRate {
    let fixed = match rule {
        RateRule::Contracted => Some((slot.contracted_rate, RateSource::Contracted)),
        RateRule::Special => Some((slot.special_net_cost, RateSource::Special)),
        RateRule::Discounted => None,
    };

    match fixed {
        Some((Some(value), source)) if value.is_finite() => ResolvedRate { value, source },
        Some(_) => match finite(slot.list_price) {
            Some(value) => ResolvedRate {
                value,
                source: RateSource::ListPrice,
            },
            None => ResolvedRate::unresolved(),
        },
        None => match finite(slot.list_price) {
            Some(price) => ResolvedRate {
                value: round_cents(price * (1.0 - discount_percent / 100.0)),
                source: RateSource::Discounted,
            },
            None => ResolvedRate::unresolved(),
        },
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(list: Option<f64>, special: Option<f64>, contracted: Option<f64>) -> ProgramSlot {
        ProgramSlot {
            id: "1".into(),
            channel: "TEST".into(),
            day: "Monday".into(),
            time: "19:00".into(),
            program: "News".into(),
            slot: None,
            list_price: list,
            special_net_cost: special,
            contracted_rate: contracted,
            rating: 2.5,
        }
    }

    #[test]
    fn test_override_wins_over_every_rule() {
        let s = slot(Some(1000.0), Some(450.0), Some(600.0));
        for rule in [RateRule::Contracted, RateRule::Special, RateRule::Discounted] {
            for discount in [0.0, 30.0, 100.0] {
                let r = resolve(&s, rule, discount, Some(123.456));
                assert_eq!(r.value, 123.456);
                assert!(r.is_overridden());
            }
        }
    }

    #[test]
    fn test_discounted_rounds_to_cents() {
        let s = slot(Some(800.0), None, None);
        assert_eq!(compute(&s, RateRule::Discounted, 25.0).value, 600.0);

        let s = slot(Some(999.99), None, None);
        assert_eq!(compute(&s, RateRule::Discounted, 33.0).value, 669.99);
    }

    #[test]
    fn test_discount_range_matches_formula() {
        let s = slot(Some(1234.56), None, None);
        for step in 0..=100 {
            let discount = step as f64;
            let expected = round_cents(1234.56 * (1.0 - discount / 100.0));
            assert_eq!(compute(&s, RateRule::Discounted, discount).value, expected);
        }
    }

    #[test]
    fn test_special_uses_net_cost_and_ignores_discount() {
        let s = slot(Some(1000.0), Some(450.0), None);
        let r = compute(&s, RateRule::Special, 30.0);
        assert_eq!(r.value, 450.0);
        assert_eq!(r.source, RateSource::Special);
    }

    #[test]
    fn test_special_without_net_cost_falls_back_to_list_price() {
        let s = slot(Some(1000.0), None, None);
        let r = compute(&s, RateRule::Special, 30.0);
        assert_eq!(r.value, 1000.0);
        assert_eq!(r.source, RateSource::ListPrice);
    }

    #[test]
    fn test_contracted_uses_contracted_rate() {
        let s = slot(Some(1000.0), None, Some(600.0));
        assert_eq!(compute(&s, RateRule::Contracted, 0.0).value, 600.0);
        let s = slot(Some(1000.0), None, Some(f64::NAN));
        assert_eq!(compute(&s, RateRule::Contracted, 0.0).value, 1000.0);
    }

    #[test]
    fn test_missing_list_price_is_unresolved() {
        let s = slot(None, None, None);
        for rule in [RateRule::Contracted, RateRule::Special, RateRule::Discounted] {
            let r = compute(&s, rule, 10.0);
            assert!(r.is_unresolved());
            assert_eq!(r.value, 0.0);
        }
    }

    #[test]
    fn test_fixed_rate_does_not_need_list_price() {
        let s = slot(None, Some(450.0), None);
        assert_eq!(compute(&s, RateRule::Special, 0.0).value, 450.0);
    }

    #[test]
    fn test_discount_above_hundred_is_not_clamped() {
        let s = slot(Some(100.0), None, None);
        assert_eq!(compute(&s, RateRule::Discounted, 150.0).value, -50.0);
    }
}
