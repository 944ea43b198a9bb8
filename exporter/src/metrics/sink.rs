//! The write-side interface the slot watcher uses to publish metrics.

use std::sync::Arc;

/// Gauges refreshed on every successful `getEpochInfo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchGauge {
    /// Transactions processed since genesis.
    TransactionCount,
    /// Absolute slot observed at the watcher's commitment.
    SlotHeight,
    EpochNumber,
    EpochFirstSlot,
    /// First slot past the current epoch.
    EpochLastSlot,
}

/// Outcome of a leader slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// The leader produced a block that reached the watcher's commitment.
    Produced,
    Skipped,
}

impl SlotStatus {
    /// Value of the `status` label on `solana_leader_slots_total`.
    pub fn as_label(&self) -> &'static str {
        match self {
            SlotStatus::Produced => "valid",
            SlotStatus::Skipped => "skipped",
        }
    }
}

/// Destination for the watcher's gauges and per-leader counters.
///
/// Implementations must tolerate concurrent reads (scrapes) while the
/// watcher writes; Prometheus metrics are atomic, so
/// [`super::SlotMetrics`] satisfies this directly.
pub trait MetricsSink: Send + Sync {
    fn set_gauge(&self, gauge: WatchGauge, value: u64);

    /// Adds one to the `(status, leader)` counter.
    fn inc_leader_slot(&self, status: SlotStatus, leader: &str);
}

impl<S: MetricsSink> MetricsSink for Arc<S> {
    fn set_gauge(&self, gauge: WatchGauge, value: u64) {
        (**self).set_gauge(gauge, value)
    }

    fn inc_leader_slot(&self, status: SlotStatus, leader: &str) {
        (**self).inc_leader_slot(status, leader)
    }
}
