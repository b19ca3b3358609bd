//! Selection context parameterizing rate resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The active channel, client and target audience group.
///
/// Every catalog reload is tagged with the selection that issued it; a
/// response is only applied while the tag still equals the live selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub channel: String,
    pub client: String,
    pub target_group: String,
}

impl Selection {
    pub fn new(
        channel: impl Into<String>,
        client: impl Into<String>,
        target_group: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            client: client.into(),
            target_group: target_group.into(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.channel, self.client, self.target_group)
    }
}
