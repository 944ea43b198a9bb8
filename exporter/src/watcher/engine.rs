//! The slot watcher task.
//!
//! Each tick:
//!
//! 1. fetches `getEpochInfo` and publishes the position gauges,
//! 2. refetches the leader schedule when the epoch changed, resetting the
//!    watermark to the current offset (no backfill),
//! 3. otherwise asks `getConfirmedBlocks` for every slot between the
//!    watermark and the current offset and counts each one as produced or
//!    skipped for its leader,
//! 4. commits the new watermark.
//!
//! Any RPC failure aborts the tick before state is touched, so the next
//! tick re-requests the same (possibly wider) range.

use std::collections::HashSet;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::config::WatcherConfig;
use super::error::WatchError;
use super::schedule::LeaderSchedule;
use crate::metrics::{MetricsSink, SlotStatus, WatchGauge};
use crate::rpc::{EpochInfo, RpcError, RpcGateway};

/// Step at which a tick gave up because of an RPC failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    EpochInfo,
    LeaderSchedule,
    ConfirmedBlocks,
}

/// What a single tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// An RPC call failed; no cross-tick state changed.
    Aborted(AbortReason),
    /// A new leader schedule was loaded and the watermark reset.
    EpochChanged { epoch: u64, slot_index: u64 },
    /// No new slots since the last tick.
    Stalled,
    /// The node reported an offset behind the watermark; ignored.
    Regressed { watermark: u64, slot_index: u64 },
    /// Slots in `[watermark, slot_index)` were attributed to their leaders.
    Classified { produced: u64, skipped: u64 },
}

/// Long-running reconciliation loop over a Solana node.
///
/// Generic over the RPC gateway `G` and the metrics sink `S` so tests can
/// drive it with scripted responses and inspect every counter write.
pub struct SlotWatcher<G, S> {
    config: WatcherConfig,
    rpc: G,
    sink: S,
    schedule: Option<LeaderSchedule>,
    /// Epoch the cached schedule belongs to.
    last_epoch: Option<u64>,
    /// Highest offset already classified in `last_epoch`.
    watermark: u64,
}

impl<G, S> SlotWatcher<G, S>
where
    G: RpcGateway,
    S: MetricsSink,
{
    pub fn new(config: WatcherConfig, rpc: G, sink: S) -> Self {
        Self {
            config,
            rpc,
            sink,
            schedule: None,
            last_epoch: None,
            watermark: 0,
        }
    }

    pub fn watermark(&self) -> u64 {
        self.watermark
    }

    pub fn last_epoch(&self) -> Option<u64> {
        self.last_epoch
    }

    pub fn schedule(&self) -> Option<&LeaderSchedule> {
        self.schedule.as_ref()
    }

    /// Runs ticks on the configured interval until a fatal error.
    ///
    /// Only [`WatchError`] ends the loop; cancel it by dropping the future.
    pub async fn run(mut self) -> Result<(), WatchError> {
        let mut ticker = time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            commitment = %self.config.commitment,
            "slot watcher running"
        );

        loop {
            ticker.tick().await;
            if let Err(e) = self.tick().await {
                error!("slot watcher stopped: {e}");
                return Err(e);
            }
        }
    }

    /// Processes one tick. See the module docs for the algorithm.
    pub async fn tick(&mut self) -> Result<TickOutcome, WatchError> {
        let info = match self.rpc.get_epoch_info(self.config.commitment).await {
            Ok(info) => info,
            Err(e) => {
                warn!("failed to fetch epoch info, retrying: {e}");
                return Ok(TickOutcome::Aborted(AbortReason::EpochInfo));
            }
        };

        let first_slot = info.first_slot();
        self.publish_position(&info);

        if self.last_epoch != Some(info.epoch) {
            return Ok(self.enter_epoch(&info).await);
        }

        if info.slot_index == self.watermark {
            debug!(slot = info.absolute_slot, "slot has not advanced, skipping");
            return Ok(TickOutcome::Stalled);
        }

        if info.slot_index < self.watermark {
            warn!(
                slot = info.absolute_slot,
                offset = info.slot_index,
                watermark = self.watermark,
                "node reported a slot behind the watermark, skipping"
            );
            return Ok(TickOutcome::Regressed {
                watermark: self.watermark,
                slot_index: info.slot_index,
            });
        }

        info!(
            "confirmed slot {} (offset {}, +{}), epoch {} (from slot {} to {}, {} remaining)",
            info.absolute_slot,
            info.slot_index,
            info.slot_index - self.watermark,
            info.epoch,
            first_slot,
            info.last_slot(),
            info.remaining_slots(),
        );

        let range_start = first_slot + self.watermark;
        let range_end = first_slot + info.slot_index - 1;

        let confirmed: HashSet<u64> =
            match self.rpc.get_confirmed_blocks(range_start, range_end).await {
                Ok(slots) => slots.into_iter().collect(),
                Err(e) => {
                    warn!(
                        "failed to request confirmed blocks at {} ({range_start}..={range_end}), retrying: {e}",
                        self.watermark
                    );
                    return Ok(TickOutcome::Aborted(AbortReason::ConfirmedBlocks));
                }
            };

        debug!(
            range_start,
            range_end,
            confirmed = confirmed.len(),
            "fetched confirmed blocks"
        );

        // Resolve every leader first so a schedule gap counts nothing.
        let leaders = self.resolve_leaders(&info)?;

        let (mut produced, mut skipped) = (0, 0);
        for (slot, offset, leader) in leaders {
            let status = if confirmed.contains(&slot) {
                produced += 1;
                SlotStatus::Produced
            } else {
                skipped += 1;
                SlotStatus::Skipped
            };
            self.sink.inc_leader_slot(status, leader);
            debug!(slot, offset, leader, status = status.as_label(), "classified slot");
        }

        self.watermark = info.slot_index;
        Ok(TickOutcome::Classified { produced, skipped })
    }

    fn publish_position(&self, info: &EpochInfo) {
        if let Some(count) = info.transaction_count {
            self.sink.set_gauge(WatchGauge::TransactionCount, count);
        }
        self.sink.set_gauge(WatchGauge::SlotHeight, info.absolute_slot);
        self.sink.set_gauge(WatchGauge::EpochNumber, info.epoch);
        self.sink
            .set_gauge(WatchGauge::EpochFirstSlot, info.first_slot());
        self.sink.set_gauge(WatchGauge::EpochLastSlot, info.last_slot());
    }

    async fn enter_epoch(&mut self, info: &EpochInfo) -> TickOutcome {
        let first_slot = info.first_slot();
        match self.last_epoch {
            Some(previous) => info!(
                "new epoch at slot {first_slot}: {} (previous: {previous})",
                info.epoch
            ),
            None => info!("starting in epoch {} at slot {first_slot}", info.epoch),
        }

        let schedule = match self.fetch_schedule(info.epoch, first_slot).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("failed to request leader schedule, retrying: {e}");
                return TickOutcome::Aborted(AbortReason::LeaderSchedule);
            }
        };

        debug!(
            leader_slots = schedule.len(),
            epoch = info.epoch,
            "loaded leader schedule"
        );

        self.schedule = Some(schedule);
        self.last_epoch = Some(info.epoch);
        // Slots before the current offset are never backfilled.
        self.watermark = info.slot_index;

        TickOutcome::EpochChanged {
            epoch: info.epoch,
            slot_index: info.slot_index,
        }
    }

    async fn fetch_schedule(
        &self,
        epoch: u64,
        first_slot: u64,
    ) -> Result<LeaderSchedule, RpcError> {
        const METHOD: &str = "getLeaderSchedule";

        let raw = self
            .rpc
            .get_leader_schedule(first_slot, self.config.commitment)
            .await?
            .ok_or_else(|| {
                RpcError::decode(METHOD, format!("no leader schedule for slot {first_slot}"))
            })?;

        let schedule = LeaderSchedule::from_rpc(epoch, raw);
        if schedule.is_empty() {
            return Err(RpcError::decode(
                METHOD,
                format!("empty leader schedule for slot {first_slot}"),
            ));
        }
        Ok(schedule)
    }

    /// Maps each offset in `[watermark, slot_index)` to `(slot, offset, leader)`.
    fn resolve_leaders(&self, info: &EpochInfo) -> Result<Vec<(u64, u64, &str)>, WatchError> {
        let first_slot = info.first_slot();
        let missing = |offset: u64| WatchError::MissingLeader {
            epoch: info.epoch,
            slot: first_slot + offset,
            offset,
        };

        let schedule = self.schedule.as_ref().ok_or_else(|| missing(self.watermark))?;

        (self.watermark..info.slot_index)
            .map(|offset| {
                schedule
                    .leader_at(offset)
                    .map(|leader| (first_slot + offset, offset, leader))
                    .ok_or_else(|| missing(offset))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{Commitment, RawLeaderSchedule};
    use serde_json::Value;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SLOTS_IN_EPOCH: u64 = 1000;

    fn position(epoch: u64, slot_index: u64) -> EpochInfo {
        EpochInfo {
            absolute_slot: epoch * SLOTS_IN_EPOCH + slot_index,
            slot_index,
            epoch,
            slots_in_epoch: SLOTS_IN_EPOCH,
            transaction_count: Some(1_000_000 + slot_index),
        }
    }

    fn leader(offset: u64) -> String {
        format!("leader-{offset}")
    }

    /// One distinct leader per offset so counters identify individual slots.
    fn full_schedule() -> RawLeaderSchedule {
        (0..SLOTS_IN_EPOCH).map(|i| (leader(i), vec![i])).collect()
    }

    fn transport(method: &str) -> RpcError {
        RpcError::Transport {
            method: method.to_string(),
            message: "connection refused".to_string(),
        }
    }

    /// Gateway answering from queues; confirmed blocks are "every slot in
    /// the range except `skipped`", unless a failure is queued.
    #[derive(Default)]
    struct ScriptedGateway {
        epoch_infos: Mutex<VecDeque<Result<EpochInfo, RpcError>>>,
        schedules: Mutex<VecDeque<Result<Option<RawLeaderSchedule>, RpcError>>>,
        block_failures: Mutex<u32>,
        skipped: Mutex<HashSet<u64>>,
        schedule_requests: Mutex<Vec<u64>>,
        block_requests: Mutex<Vec<(u64, u64)>>,
    }

    impl ScriptedGateway {
        fn push_position(&self, epoch: u64, slot_index: u64) {
            self.epoch_infos
                .lock()
                .unwrap()
                .push_back(Ok(position(epoch, slot_index)));
        }

        fn push_epoch_error(&self) {
            self.epoch_infos
                .lock()
                .unwrap()
                .push_back(Err(transport("getEpochInfo")));
        }

        fn push_schedule(&self, schedule: Result<Option<RawLeaderSchedule>, RpcError>) {
            self.schedules.lock().unwrap().push_back(schedule);
        }

        fn fail_next_blocks(&self, n: u32) {
            *self.block_failures.lock().unwrap() += n;
        }

        fn skip(&self, slots: &[u64]) {
            self.skipped.lock().unwrap().extend(slots.iter().copied());
        }

        fn block_requests(&self) -> Vec<(u64, u64)> {
            self.block_requests.lock().unwrap().clone()
        }

        fn schedule_requests(&self) -> Vec<u64> {
            self.schedule_requests.lock().unwrap().clone()
        }
    }

    impl RpcGateway for ScriptedGateway {
        async fn get_epoch_info(&self, commitment: Commitment) -> Result<EpochInfo, RpcError> {
            assert_eq!(commitment, Commitment::Finalized);
            self.epoch_infos
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(transport("getEpochInfo")))
        }

        async fn get_leader_schedule(
            &self,
            slot: u64,
            _commitment: Commitment,
        ) -> Result<Option<RawLeaderSchedule>, RpcError> {
            self.schedule_requests.lock().unwrap().push(slot);
            self.schedules
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Some(full_schedule())))
        }

        async fn get_confirmed_blocks(&self, start: u64, end: u64) -> Result<Vec<u64>, RpcError> {
            self.block_requests.lock().unwrap().push((start, end));
            {
                let mut failures = self.block_failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(RpcError::Timeout {
                        method: "getConfirmedBlocks".to_string(),
                        timeout: Duration::from_secs(5),
                    });
                }
            }
            let skipped = self.skipped.lock().unwrap();
            Ok((start..=end).filter(|s| !skipped.contains(s)).collect())
        }

        async fn call_value(&self, method: &str) -> Result<Value, RpcError> {
            Err(transport(method))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        gauges: Mutex<HashMap<WatchGauge, u64>>,
        counters: Mutex<HashMap<(SlotStatus, String), u64>>,
    }

    impl RecordingSink {
        fn gauge(&self, gauge: WatchGauge) -> Option<u64> {
            self.gauges.lock().unwrap().get(&gauge).copied()
        }

        fn count(&self, status: SlotStatus, offset: u64) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(&(status, leader(offset)))
                .copied()
                .unwrap_or(0)
        }

        fn total(&self) -> u64 {
            self.counters.lock().unwrap().values().sum()
        }

        fn snapshot(&self) -> HashMap<(SlotStatus, String), u64> {
            self.counters.lock().unwrap().clone()
        }
    }

    impl MetricsSink for RecordingSink {
        fn set_gauge(&self, gauge: WatchGauge, value: u64) {
            self.gauges.lock().unwrap().insert(gauge, value);
        }

        fn inc_leader_slot(&self, status: SlotStatus, leader: &str) {
            *self
                .counters
                .lock()
                .unwrap()
                .entry((status, leader.to_string()))
                .or_default() += 1;
        }
    }

    type TestWatcher = SlotWatcher<Arc<ScriptedGateway>, Arc<RecordingSink>>;

    fn watcher() -> (TestWatcher, Arc<ScriptedGateway>, Arc<RecordingSink>) {
        let rpc = Arc::new(ScriptedGateway::default());
        let sink = Arc::new(RecordingSink::default());
        let watcher = SlotWatcher::new(WatcherConfig::default(), rpc.clone(), sink.clone());
        (watcher, rpc, sink)
    }

    #[tokio::test]
    async fn counts_slots_across_epoch_boundary() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        let outcome = w.tick().await.expect("tick 1");
        assert_eq!(
            outcome,
            TickOutcome::EpochChanged {
                epoch: 5,
                slot_index: 100
            }
        );
        assert_eq!(w.watermark(), 100);
        assert_eq!(w.last_epoch(), Some(5));
        assert_eq!(rpc.schedule_requests(), vec![5000]);
        assert!(rpc.block_requests().is_empty());

        rpc.push_position(5, 103);
        rpc.skip(&[5102]);
        let outcome = w.tick().await.expect("tick 2");
        assert_eq!(
            outcome,
            TickOutcome::Classified {
                produced: 2,
                skipped: 1
            }
        );
        assert_eq!(rpc.block_requests(), vec![(5100, 5102)]);
        assert_eq!(sink.count(SlotStatus::Produced, 100), 1);
        assert_eq!(sink.count(SlotStatus::Produced, 101), 1);
        assert_eq!(sink.count(SlotStatus::Skipped, 102), 1);
        assert_eq!(sink.total(), 3);
        assert_eq!(w.watermark(), 103);

        rpc.push_position(6, 2);
        let outcome = w.tick().await.expect("tick 3");
        assert_eq!(outcome, TickOutcome::EpochChanged { epoch: 6, slot_index: 2 });
        assert_eq!(w.watermark(), 2);
        assert_eq!(w.schedule().map(LeaderSchedule::epoch), Some(6));
        assert_eq!(rpc.schedule_requests(), vec![5000, 6000]);
        // Offsets 103..999 of epoch 5 are never classified.
        assert_eq!(sink.total(), 3);
        assert_eq!(rpc.block_requests().len(), 1);
    }

    #[tokio::test]
    async fn publishes_position_gauges() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        w.tick().await.expect("tick");

        assert_eq!(sink.gauge(WatchGauge::SlotHeight), Some(5100));
        assert_eq!(sink.gauge(WatchGauge::EpochNumber), Some(5));
        assert_eq!(sink.gauge(WatchGauge::EpochFirstSlot), Some(5000));
        assert_eq!(sink.gauge(WatchGauge::EpochLastSlot), Some(6000));
        assert_eq!(sink.gauge(WatchGauge::TransactionCount), Some(1_000_100));
    }

    #[tokio::test]
    async fn stalled_slot_does_no_work() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        rpc.push_position(5, 100);
        w.tick().await.expect("tick 1");
        assert_eq!(w.tick().await.expect("tick 2"), TickOutcome::Stalled);

        assert!(rpc.block_requests().is_empty());
        assert_eq!(sink.total(), 0);
        assert_eq!(w.watermark(), 100);
    }

    #[tokio::test]
    async fn epoch_info_failure_touches_nothing() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_epoch_error();
        assert_eq!(
            w.tick().await.expect("tick"),
            TickOutcome::Aborted(AbortReason::EpochInfo)
        );
        assert_eq!(w.last_epoch(), None);
        assert!(w.schedule().is_none());
        assert_eq!(sink.gauge(WatchGauge::SlotHeight), None);
        assert!(rpc.schedule_requests().is_empty());
    }

    #[tokio::test]
    async fn leader_schedule_failure_is_retried_next_tick() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        rpc.push_schedule(Err(transport("getLeaderSchedule")));
        assert_eq!(
            w.tick().await.expect("tick 1"),
            TickOutcome::Aborted(AbortReason::LeaderSchedule)
        );
        assert_eq!(w.last_epoch(), None);
        assert_eq!(w.watermark(), 0);
        // Gauges still reflect the position that was read.
        assert_eq!(sink.gauge(WatchGauge::SlotHeight), Some(5100));

        rpc.push_position(5, 104);
        assert_eq!(
            w.tick().await.expect("tick 2"),
            TickOutcome::EpochChanged {
                epoch: 5,
                slot_index: 104
            }
        );
        assert_eq!(w.watermark(), 104);
        assert_eq!(rpc.schedule_requests(), vec![5000, 5000]);
        assert_eq!(sink.total(), 0);
    }

    #[tokio::test]
    async fn null_or_empty_schedule_is_retryable() {
        let (mut w, rpc, _sink) = watcher();

        rpc.push_position(5, 100);
        rpc.push_schedule(Ok(None));
        assert_eq!(
            w.tick().await.expect("tick 1"),
            TickOutcome::Aborted(AbortReason::LeaderSchedule)
        );

        rpc.push_position(5, 100);
        rpc.push_schedule(Ok(Some(RawLeaderSchedule::new())));
        assert_eq!(
            w.tick().await.expect("tick 2"),
            TickOutcome::Aborted(AbortReason::LeaderSchedule)
        );
        assert_eq!(w.last_epoch(), None);
        assert!(w.schedule().is_none());
    }

    #[tokio::test]
    async fn confirmed_blocks_failure_retries_identical_range() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        w.tick().await.expect("tick 1");

        rpc.push_position(5, 103);
        rpc.skip(&[5101]);
        rpc.fail_next_blocks(1);
        assert_eq!(
            w.tick().await.expect("tick 2"),
            TickOutcome::Aborted(AbortReason::ConfirmedBlocks)
        );
        assert_eq!(w.watermark(), 100);
        assert_eq!(sink.total(), 0);

        rpc.push_position(5, 103);
        assert_eq!(
            w.tick().await.expect("tick 3"),
            TickOutcome::Classified {
                produced: 2,
                skipped: 1
            }
        );
        assert_eq!(rpc.block_requests(), vec![(5100, 5102), (5100, 5102)]);

        let after_retry = sink.snapshot();

        // Same inputs executed once, without the failure, give the same counters.
        let (mut once, rpc_once, sink_once) = watcher();
        rpc_once.skip(&[5101]);
        rpc_once.push_position(5, 100);
        rpc_once.push_position(5, 103);
        once.tick().await.expect("tick 1");
        once.tick().await.expect("tick 2");
        assert_eq!(sink_once.snapshot(), after_retry);
        assert_eq!(once.watermark(), w.watermark());
    }

    #[tokio::test]
    async fn failed_range_is_widened_on_next_tick() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        w.tick().await.expect("tick 1");

        rpc.push_position(5, 103);
        rpc.fail_next_blocks(1);
        w.tick().await.expect("tick 2");

        rpc.push_position(5, 106);
        assert_eq!(
            w.tick().await.expect("tick 3"),
            TickOutcome::Classified {
                produced: 6,
                skipped: 0
            }
        );
        assert_eq!(rpc.block_requests(), vec![(5100, 5102), (5100, 5105)]);
        for offset in 100..106 {
            assert_eq!(sink.count(SlotStatus::Produced, offset), 1);
        }
        assert_eq!(sink.total(), 6);
    }

    #[tokio::test]
    async fn regressed_position_is_ignored() {
        let (mut w, rpc, sink) = watcher();

        rpc.push_position(5, 100);
        w.tick().await.expect("tick 1");

        rpc.push_position(5, 97);
        assert_eq!(
            w.tick().await.expect("tick 2"),
            TickOutcome::Regressed {
                watermark: 100,
                slot_index: 97
            }
        );
        assert_eq!(w.watermark(), 100);

        rpc.push_position(5, 101);
        w.tick().await.expect("tick 3");
        assert_eq!(sink.total(), 1);
        assert_eq!(sink.count(SlotStatus::Produced, 100), 1);
    }

    #[tokio::test]
    async fn missing_leader_is_fatal_and_counts_nothing() {
        let (mut w, rpc, sink) = watcher();

        let mut schedule = full_schedule();
        schedule.remove(&leader(102));
        rpc.push_schedule(Ok(Some(schedule)));

        rpc.push_position(5, 100);
        w.tick().await.expect("tick 1");

        rpc.push_position(5, 104);
        let err = w.tick().await.expect_err("gap in schedule must be fatal");
        match err {
            WatchError::MissingLeader {
                epoch,
                slot,
                offset,
            } => {
                assert_eq!(epoch, 5);
                assert_eq!(slot, 5102);
                assert_eq!(offset, 102);
            }
        }
        assert_eq!(sink.total(), 0);
        assert_eq!(w.watermark(), 100);
    }

    #[tokio::test]
    async fn each_slot_is_counted_at_most_once() {
        let (mut w, rpc, sink) = watcher();
        rpc.skip(&[5003, 5010, 5011, 6000, 6001, 6002]);
        rpc.fail_next_blocks(1);

        // Interleave progress, stalls, regressions and failures.
        rpc.push_position(5, 0);
        rpc.push_position(5, 4);
        rpc.push_epoch_error();
        rpc.push_position(5, 4);
        rpc.push_position(5, 4);
        rpc.push_position(5, 9);
        rpc.push_position(5, 12);
        rpc.push_position(5, 11);
        rpc.push_position(5, 15);
        rpc.push_position(6, 0);
        rpc.push_position(6, 3);

        let mut outcomes = Vec::new();
        let mut watermarks = Vec::new();
        for _ in 0..11 {
            outcomes.push(w.tick().await.expect("no fatal errors"));
            watermarks.push((w.last_epoch(), w.watermark()));
        }
        assert_eq!(outcomes[1], TickOutcome::Aborted(AbortReason::ConfirmedBlocks));
        assert_eq!(outcomes[2], TickOutcome::Aborted(AbortReason::EpochInfo));
        assert_eq!(outcomes[4], TickOutcome::Stalled);

        let counters = sink.snapshot();
        assert!(counters.values().all(|&n| n == 1));
        // Epoch 5 offsets 0..15 and epoch 6 offsets 0..3, each exactly once.
        assert_eq!(sink.total(), 15 + 3);
        assert_eq!(sink.count(SlotStatus::Skipped, 3), 1);
        assert_eq!(sink.count(SlotStatus::Skipped, 10), 1);
        assert_eq!(sink.count(SlotStatus::Skipped, 11), 1);
        // Offsets 0..3 were produced in epoch 5 and skipped in epoch 6.
        assert_eq!(sink.count(SlotStatus::Produced, 1), 1);
        assert_eq!(sink.count(SlotStatus::Skipped, 1), 1);

        // Within an epoch the watermark never decreases.
        for pair in watermarks.windows(2) {
            let ((e0, w0), (e1, w1)) = (pair[0], pair[1]);
            if e0 == e1 {
                assert!(w1 >= w0, "watermark went back from {w0} to {w1}");
            }
        }
    }

    #[tokio::test]
    async fn run_returns_fatal_error() {
        let rpc = Arc::new(ScriptedGateway::default());
        let sink = Arc::new(RecordingSink::default());

        let mut schedule = full_schedule();
        schedule.remove(&leader(7));
        rpc.push_schedule(Ok(Some(schedule)));
        rpc.push_position(2, 5);
        rpc.push_position(2, 9);

        let config = WatcherConfig {
            interval: Duration::from_millis(1),
            ..WatcherConfig::default()
        };
        let watcher = SlotWatcher::new(config, rpc.clone(), sink.clone());

        let result = tokio::time::timeout(Duration::from_secs(5), watcher.run())
            .await
            .expect("watcher should stop on its own");
        assert!(matches!(
            result,
            Err(WatchError::MissingLeader { offset: 7, .. })
        ));
        assert_eq!(sink.total(), 0);
    }
}
