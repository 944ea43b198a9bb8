//! Solana JSON-RPC gateway.
//!
//! This module provides the read-only view of a Solana node that the rest
//! of the exporter consumes:
//!
//! - wire types for the handful of methods we call ([`types`]),
//! - a structured error taxonomy ([`error::RpcError`]),
//! - the [`gateway::RpcGateway`] trait the slot watcher and field mapper
//!   are generic over, and
//! - an HTTP implementation backed by `reqwest` ([`client::HttpRpcClient`]).

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::HttpRpcClient;
pub use error::RpcError;
pub use gateway::RpcGateway;
pub use types::{Commitment, EpochInfo, RawLeaderSchedule};
