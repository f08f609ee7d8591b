use std::collections::HashMap;

use routewise_core::{AmountMsat, ChannelDirection, ConstraintKind};
use serde::{Deserialize, Serialize};

/// A caller-supplied bound on the usable amount of one channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "short_channel_id_dir")]
    pub scidd: ChannelDirection,
    pub kind: ConstraintKind,
    pub timestamp: u64,
    #[serde(rename = "amount_msat")]
    pub limit: AmountMsat,
}

/// Constraints of a single layer, keyed by channel direction and kind.
#[derive(Debug, Clone, Default)]
pub struct ConstraintTable {
    entries: HashMap<(ChannelDirection, ConstraintKind), Constraint>,
}

impl ConstraintTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a constraint, replacing any previous one for the same key
    /// regardless of timestamps.
    pub fn update(
        &mut self,
        scidd: ChannelDirection,
        kind: ConstraintKind,
        timestamp: u64,
        limit: AmountMsat,
    ) -> Constraint {
        let constraint = Constraint {
            scidd,
            kind,
            timestamp,
            limit,
        };
        self.entries.insert((scidd, kind), constraint);
        constraint
    }

    pub fn find(&self, scidd: &ChannelDirection, kind: ConstraintKind) -> Option<&Constraint> {
        self.entries.get(&(*scidd, kind))
    }

    /// Remove every constraint older than `cutoff`, returning how many went.
    pub fn trim(&mut self, cutoff: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, c| c.timestamp >= cutoff);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.values()
    }
}
