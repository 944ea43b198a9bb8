//! Wire types for the Solana JSON-RPC methods used by the exporter.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Finality level requested from the node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    /// Highest finality; blocks at this level are rooted by a supermajority.
    #[default]
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "processed" | "recent" => Ok(Commitment::Processed),
            "confirmed" | "single" | "singlegossip" => Ok(Commitment::Confirmed),
            "finalized" | "max" | "root" => Ok(Commitment::Finalized),
            other => Err(format!(
                "unknown commitment level {other:?} (expected processed, confirmed or finalized)"
            )),
        }
    }
}

/// Result of `getEpochInfo`: where the chain is at the requested commitment.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    /// Current slot.
    pub absolute_slot: u64,
    /// Offset of `absolute_slot` within the current epoch.
    pub slot_index: u64,
    pub epoch: u64,
    pub slots_in_epoch: u64,
    /// Total transactions processed since genesis. Older nodes omit it.
    #[serde(default)]
    pub transaction_count: Option<u64>,
}

impl EpochInfo {
    /// Absolute slot of the first slot in the current epoch.
    pub fn first_slot(&self) -> u64 {
        self.absolute_slot.saturating_sub(self.slot_index)
    }

    /// First slot past the end of the current epoch.
    pub fn last_slot(&self) -> u64 {
        self.first_slot().saturating_add(self.slots_in_epoch)
    }

    /// Slots left before the epoch boundary.
    pub fn remaining_slots(&self) -> u64 {
        self.last_slot().saturating_sub(self.absolute_slot)
    }
}

/// Result of `getLeaderSchedule`: leader identity -> relative slot offsets.
pub type RawLeaderSchedule = HashMap<String, Vec<u64>>;
