// src/engine/lock.rs

//! Channel resolution classes and the discount lock policy.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::engine::resolve::RateRule;
use crate::models::ChannelConfig;

/// How a channel's rates are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ChannelClass {
    Ordinary,
    /// Fixed net cost per slot, for every client
    Special,
    /// Fixed rate for one named client only
    ClientContracted { client: String },
}

/// Why a channel's discount input is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    Special,
    Contracted,
}

impl LockReason {
    /// Badge text shown next to the channel header.
    pub fn label(self) -> &'static str {
        match self {
            LockReason::Special => "Special Channel Rate",
            LockReason::Contracted => "Contracted Client Rate",
        }
    }
}

/// Static class membership of every configured channel.
#[derive(Debug, Clone, Default)]
pub struct LockPolicy {
    special: HashSet<String>,
    contracted: HashMap<String, String>,
}

impl LockPolicy {
    pub fn new<S, C>(special: S, contracted: C) -> Self
    where
        S: IntoIterator<Item = String>,
        C: IntoIterator<Item = (String, String)>,
    {
        Self {
            special: special.into_iter().collect(),
            contracted: contracted.into_iter().collect(),
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(
            config.special.iter().cloned(),
            config
                .contracted
                .iter()
                .map(|c| (c.channel.clone(), c.client.clone())),
        )
    }

    pub fn class_of(&self, channel: &str) -> ChannelClass {
        if self.special.contains(channel) {
            ChannelClass::Special
        } else if let Some(client) = self.contracted.get(channel) {
            ChannelClass::ClientContracted {
                client: client.clone(),
            }
        } else {
            ChannelClass::Ordinary
        }
    }

    /// Reason the discount of `channel` is pinned to zero for `client`, if any.
    pub fn lock_reason(&self, channel: &str, client: &str) -> Option<LockReason> {
        if self.special.contains(channel) {
            return Some(LockReason::Special);
        }
        match self.contracted.get(channel) {
            Some(contracted) if contracted == client => Some(LockReason::Contracted),
            _ => None,
        }
    }

    pub fn is_locked(&self, channel: &str, client: &str) -> bool {
        self.lock_reason(channel, client).is_some()
    }

    /// Computed rule that prices slots of `channel` while `client` is active.
    pub fn rule_for(&self, channel: &str, client: &str) -> RateRule {
        match self.lock_reason(channel, client) {
            Some(LockReason::Contracted) => RateRule::Contracted,
            Some(LockReason::Special) => RateRule::Special,
            None => RateRule::Discounted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LockPolicy {
        LockPolicy::new(
            ["NEWS1".to_string()],
            [("DERANA TV".to_string(), "Cargills".to_string())],
        )
    }

    #[test]
    fn test_special_channel_locked_for_every_client() {
        let policy = policy();
        assert!(policy.is_locked("NEWS1", "Cargills"));
        assert!(policy.is_locked("NEWS1", "Other"));
        assert_eq!(policy.rule_for("NEWS1", "Other"), RateRule::Special);
    }

    #[test]
    fn test_contracted_channel_locked_only_for_its_client() {
        let policy = policy();
        assert!(policy.is_locked("DERANA TV", "Cargills"));
        assert!(!policy.is_locked("DERANA TV", "Other"));
        assert_eq!(
            policy.lock_reason("DERANA TV", "Cargills"),
            Some(LockReason::Contracted)
        );
        assert_eq!(policy.rule_for("DERANA TV", "Other"), RateRule::Discounted);
    }

    #[test]
    fn test_ordinary_channel_never_locked() {
        let policy = policy();
        assert!(!policy.is_locked("ITN", "Cargills"));
        assert_eq!(policy.class_of("ITN"), ChannelClass::Ordinary);
    }

    #[test]
    fn test_from_default_config() {
        let policy = LockPolicy::from_config(&ChannelConfig::default());
        assert_eq!(policy.class_of("SIRASA TV"), ChannelClass::Special);
        assert_eq!(
            policy.class_of("DERANA TV"),
            ChannelClass::ClientContracted {
                client: "Cargills".into()
            }
        );
    }
}
