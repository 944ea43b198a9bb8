//! Leader schedule for a single epoch.

use std::collections::HashMap;

use crate::rpc::RawLeaderSchedule;

/// Relative slot offset -> leader identity, for exactly one epoch.
///
/// Built by inverting the `getLeaderSchedule` shape (`leader -> [offsets]`).
/// The watcher replaces it wholesale on every epoch change; nothing is
/// merged across epochs.
#[derive(Clone, Debug, Default)]
pub struct LeaderSchedule {
    epoch: u64,
    slots: HashMap<u64, String>,
}

impl LeaderSchedule {
    pub fn from_rpc(epoch: u64, raw: RawLeaderSchedule) -> Self {
        let mut slots = HashMap::with_capacity(raw.values().map(Vec::len).sum());
        for (leader, offsets) in raw {
            for offset in offsets {
                slots.insert(offset, leader.clone());
            }
        }
        Self { epoch, slots }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Leader assigned to `offset` within the epoch, if any.
    pub fn leader_at(&self, offset: u64) -> Option<&str> {
        self.slots.get(&offset).map(String::as_str)
    }

    /// Number of leader slots in the schedule.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
