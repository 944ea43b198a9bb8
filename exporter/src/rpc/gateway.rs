use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use super::error::RpcError;
use super::types::{Commitment, EpochInfo, RawLeaderSchedule};

/// Read-only view of a Solana node.
///
/// The slot watcher and the field mapper are generic over this trait so
/// they can run against [`super::HttpRpcClient`] in production and against
/// scripted fakes in tests. Implementations must bound every call with a
/// timeout; callers never add their own.
pub trait RpcGateway: Send + Sync {
    /// `getEpochInfo` at the given commitment.
    fn get_epoch_info(
        &self,
        commitment: Commitment,
    ) -> impl Future<Output = Result<EpochInfo, RpcError>> + Send;

    /// `getLeaderSchedule` for the epoch containing `slot`.
    ///
    /// `Ok(None)` means the node has no schedule for that epoch.
    fn get_leader_schedule(
        &self,
        slot: u64,
        commitment: Commitment,
    ) -> impl Future<Output = Result<Option<RawLeaderSchedule>, RpcError>> + Send;

    /// `getConfirmedBlocks` for the inclusive range `[start, end]`.
    ///
    /// Skipped slots are absent from the result.
    fn get_confirmed_blocks(
        &self,
        start: u64,
        end: u64,
    ) -> impl Future<Output = Result<Vec<u64>, RpcError>> + Send;

    /// Calls an argument-less method and returns its raw `result`.
    fn call_value(&self, method: &str) -> impl Future<Output = Result<Value, RpcError>> + Send;
}

impl<G: RpcGateway> RpcGateway for Arc<G> {
    fn get_epoch_info(
        &self,
        commitment: Commitment,
    ) -> impl Future<Output = Result<EpochInfo, RpcError>> + Send {
        (**self).get_epoch_info(commitment)
    }

    fn get_leader_schedule(
        &self,
        slot: u64,
        commitment: Commitment,
    ) -> impl Future<Output = Result<Option<RawLeaderSchedule>, RpcError>> + Send {
        (**self).get_leader_schedule(slot, commitment)
    }

    fn get_confirmed_blocks(
        &self,
        start: u64,
        end: u64,
    ) -> impl Future<Output = Result<Vec<u64>, RpcError>> + Send {
        (**self).get_confirmed_blocks(start, end)
    }

    fn call_value(&self, method: &str) -> impl Future<Output = Result<Value, RpcError>> + Send {
        (**self).call_value(method)
    }
}
