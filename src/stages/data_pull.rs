//! DataPull stage.
//!
//! Pulls the betting-outcome signal from the oracle, persists the raw signal
//! to content-addressed storage, and reads the on-chain placement status.
//! Every sub-step degrades to an absent value on failure; the payload carries
//! whatever partial data is available and the run continues.

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::adapters::betting;
use crate::adapters::oracle::{outcome_result, OracleClient};
use crate::adapters::storage::{metadata_filepath, ContentStore};
use crate::config::Params;
use crate::domain::StagePayload;
use crate::ledger::LedgerClient;

pub struct DataPullStage {
    params: Arc<Params>,
    oracle: Arc<dyn OracleClient>,
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn LedgerClient>,
}

impl DataPullStage {
    pub fn new(
        params: Arc<Params>,
        oracle: Arc<dyn OracleClient>,
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            params,
            oracle,
            store,
            ledger,
        }
    }

    /// Compute this replica's candidate payload
    pub async fn run(&self) -> StagePayload {
        let signal = self.fetch_betting_signal().await;

        let betting_result = match &signal {
            Some(signal) => match outcome_result(signal) {
                Ok(result) => Some(result),
                Err(e) => {
                    error!("Malformed oracle signal: {e}");
                    None
                }
            },
            None => None,
        };

        let betting_ipfs_hash = match &signal {
            Some(signal) => self.store_signal(signal).await,
            None => None,
        };

        let has_placed_bet = self.read_has_placed_bet().await;

        StagePayload::DataPull {
            betting_result,
            betting_ipfs_hash,
            has_placed_bet,
        }
    }

    async fn fetch_betting_signal(&self) -> Option<Value> {
        match self.oracle.fetch(&self.params.oracle_spec).await {
            Ok(signal) => {
                info!("Betting result API value: {signal}");
                Some(signal)
            }
            Err(e) => {
                error!("Failed to fetch betting signal: {e}");
                None
            }
        }
    }

    /// Persistence failure is non-fatal; the run proceeds without a hash
    async fn store_signal(&self, signal: &Value) -> Option<String> {
        let path = metadata_filepath();
        match self.store.put_json(&path, signal).await {
            Ok(hash) => {
                info!(
                    "Betting result data stored: {}{hash}",
                    self.params.storage_gateway_url
                );
                Some(hash)
            }
            Err(e) => {
                warn!("Failed to persist betting signal: {e}");
                None
            }
        }
    }

    async fn read_has_placed_bet(&self) -> Option<bool> {
        match betting::has_placed_bet(
            self.ledger.as_ref(),
            self.params.betting_contract_address,
            &self.params.chain_id,
            self.params.transfer_target_address,
            &self.params.match_key,
        )
        .await
        {
            Ok(placed) => {
                info!("Placed bet value from contract: {placed}");
                Some(placed)
            }
            Err(e) => {
                error!("Error while retrieving the betting placement result: {e}");
                None
            }
        }
    }
}
