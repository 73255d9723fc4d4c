//! Round Coordinator Client boundary.
//!
//! The coordinator replicates payloads across the agent set and reaches
//! agreement on one value per stage; the core consumes that contract and
//! never advances a stage unilaterally. Suspension semantics are load-bearing:
//! `reach_agreement` resolves only once the replica set has converged, and a
//! cancelled or timed-out round surfaces as an error, not a value.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Event, StageId, StagePayload};

use crate::error::Result;

/// The sequencer's state machine, exposed for registration with the
/// coordinator before the first round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRegistration {
    pub initial_stage: StageId,
    /// Stages that run logic, in run order
    pub stages: Vec<StageId>,
    /// Full (state, event) -> state table, including terminal edges
    pub transitions: Vec<(StageId, Event, StageId)>,
}

/// Client for the external round coordinator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundClient: Send + Sync {
    /// Announce the stage set and transition table driving this run
    async fn register_stages(&self, registration: StageRegistration) -> Result<()>;

    /// Submit a locally computed payload and suspend until the replica set
    /// agrees; returns the agreed payload
    async fn reach_agreement(&self, payload: StagePayload) -> Result<StagePayload>;

    /// Timestamp of the last agreed block, identical on every replica
    async fn synchronized_clock(&self) -> Result<i64>;
}
