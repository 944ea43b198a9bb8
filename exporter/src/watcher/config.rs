use std::time::Duration;

use crate::rpc::Commitment;

/// Slot watcher parameters.
#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// Time between ticks. A tick that overruns delays the next one.
    pub interval: Duration,
    /// Commitment used for `getEpochInfo` and `getLeaderSchedule`.
    pub commitment: Commitment,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            commitment: Commitment::Finalized,
        }
    }
}
