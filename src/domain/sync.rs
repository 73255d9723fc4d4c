use serde::{Deserialize, Serialize};

use crate::domain::state::{Event, StageId};
use crate::error::{ParleyError, Result};

/// A stage's locally computed candidate value, proposed for cross-replica
/// agreement. Replaced by the agreed value once a threshold of replicas match.
///
/// Serialization is the wire format the coordinator agrees on, so every field
/// here must be computed deterministically from agreed inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StagePayload {
    DataPull {
        betting_result: Option<bool>,
        betting_ipfs_hash: Option<String>,
        has_placed_bet: Option<bool>,
    },
    Decision {
        event: Event,
    },
    TxPreparation {
        tx_submitter: String,
        tx_hash: Option<String>,
    },
}

impl StagePayload {
    /// The stage this payload belongs to
    pub fn stage(&self) -> StageId {
        match self {
            StagePayload::DataPull { .. } => StageId::DataPull,
            StagePayload::Decision { .. } => StageId::DecisionMaking,
            StagePayload::TxPreparation { .. } => StageId::TxPreparation,
        }
    }

    /// The event an agreed payload feeds into the transition table.
    ///
    /// An agreed TxPreparation payload without a hash means no replica could
    /// build one, so the run ends in `Failed` rather than `Done`.
    pub fn resulting_event(&self) -> Event {
        match self {
            StagePayload::DataPull { .. } => Event::Done,
            StagePayload::Decision { event } => *event,
            StagePayload::TxPreparation { tx_hash, .. } => {
                if tx_hash.is_some() {
                    Event::Done
                } else {
                    Event::Failed
                }
            }
        }
    }

    /// Canonical byte encoding submitted for agreement.
    ///
    /// serde_json writes struct fields in declaration order, so identical
    /// payloads encode to identical bytes on every replica.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// The replicated, agreement-gated state shared by all replicas.
///
/// Fields accumulate monotonically across stages within one run and are only
/// written through [`SynchronizedData::commit`] with an agreed payload. Stages
/// read it; they never write it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynchronizedData {
    pub betting_result: Option<bool>,
    pub betting_ipfs_hash: Option<String>,
    pub has_placed_bet: Option<bool>,
    /// Address of the shared multisig wallet; supplied externally, immutable
    pub safe_contract_address: String,
    pub tx_hash: Option<String>,
    pub tx_submitter: Option<String>,
    #[serde(skip)]
    committed: Vec<StageId>,
}

impl SynchronizedData {
    pub fn new(safe_contract_address: impl Into<String>) -> Self {
        Self {
            betting_result: None,
            betting_ipfs_hash: None,
            has_placed_bet: None,
            safe_contract_address: safe_contract_address.into(),
            tx_hash: None,
            tx_submitter: None,
            committed: Vec::new(),
        }
    }

    /// Apply an agreed payload at the agreement boundary.
    ///
    /// Each stage commits at most once per run; a second commit for the same
    /// stage is an error, never a silent overwrite. Fields inside a payload
    /// may legitimately be absent (best-effort sub-steps), so the write-once
    /// guard tracks stages, not field presence.
    pub fn commit(&mut self, payload: &StagePayload) -> Result<()> {
        let stage = payload.stage();
        if self.committed.contains(&stage) {
            return Err(ParleyError::AlreadyCommitted(stage.as_str()));
        }

        match payload {
            StagePayload::DataPull {
                betting_result,
                betting_ipfs_hash,
                has_placed_bet,
            } => {
                self.betting_result = *betting_result;
                self.betting_ipfs_hash = betting_ipfs_hash.clone();
                self.has_placed_bet = *has_placed_bet;
            }
            // The decision event drives the sequencer, not the store
            StagePayload::Decision { .. } => {}
            StagePayload::TxPreparation {
                tx_submitter,
                tx_hash,
            } => {
                self.tx_submitter = Some(tx_submitter.clone());
                self.tx_hash = tx_hash.clone();
            }
        }

        self.committed.push(stage);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_pull_payload() -> StagePayload {
        StagePayload::DataPull {
            betting_result: Some(true),
            betting_ipfs_hash: Some("bafybeigdyrzt5".to_string()),
            has_placed_bet: Some(false),
        }
    }

    #[test]
    fn test_commit_populates_fields() {
        let mut data = SynchronizedData::new("0xSafe");
        data.commit(&data_pull_payload()).unwrap();
        assert_eq!(data.betting_result, Some(true));
        assert_eq!(data.has_placed_bet, Some(false));
        assert_eq!(data.betting_ipfs_hash.as_deref(), Some("bafybeigdyrzt5"));
        assert_eq!(data.safe_contract_address, "0xSafe");
    }

    #[test]
    fn test_commit_is_write_once_per_stage() {
        let mut data = SynchronizedData::new("0xSafe");
        data.commit(&data_pull_payload()).unwrap();
        let err = data.commit(&data_pull_payload()).unwrap_err();
        assert!(matches!(err, ParleyError::AlreadyCommitted("DATA_PULL")));
    }

    #[test]
    fn test_write_once_holds_for_all_absent_fields() {
        // A fully degraded payload still counts as the stage's one commit
        let degraded = StagePayload::DataPull {
            betting_result: None,
            betting_ipfs_hash: None,
            has_placed_bet: None,
        };
        let mut data = SynchronizedData::new("0xSafe");
        data.commit(&degraded).unwrap();
        assert!(data.commit(&degraded).is_err());
    }

    #[test]
    fn test_resulting_event_for_tx_preparation() {
        let with_hash = StagePayload::TxPreparation {
            tx_submitter: StageId::TxPreparation.as_str().to_string(),
            tx_hash: Some("ab".repeat(32)),
        };
        let without_hash = StagePayload::TxPreparation {
            tx_submitter: StageId::TxPreparation.as_str().to_string(),
            tx_hash: None,
        };
        assert_eq!(with_hash.resulting_event(), Event::Done);
        assert_eq!(without_hash.resulting_event(), Event::Failed);
    }

    #[test]
    fn test_canonical_bytes_are_stable() {
        let a = data_pull_payload().canonical_bytes().unwrap();
        let b = data_pull_payload().canonical_bytes().unwrap();
        assert_eq!(a, b);

        let decoded: StagePayload = serde_json::from_slice(&a).unwrap();
        assert_eq!(decoded, data_pull_payload());
    }

    #[test]
    fn test_decision_event_wire_format() {
        let payload = StagePayload::Decision {
            event: Event::Transact,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"TRANSACT\""));
    }
}
