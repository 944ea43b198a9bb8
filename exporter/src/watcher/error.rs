/// Errors that stop the slot watcher.
///
/// RPC failures are not represented here: they only abort the current
/// tick (see [`super::AbortReason`]).
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The node reported a position its own leader schedule does not cover.
    #[error("slot {slot} (offset {offset}) missing from epoch {epoch} leader schedule")]
    MissingLeader { epoch: u64, slot: u64, offset: u64 },
}
