//! TxPreparation stage.
//!
//! Builds the safe transaction hash the wallet owners must sign: either a
//! single bet-placement call or a batched native-transfer + bet-placement
//! multisend. The path is selected from the synchronized clock so every
//! replica picks the same one.

use chrono::DateTime;
use ethers::types::U256;
use std::sync::Arc;
use tracing::{error, info};

use crate::adapters::betting;
use crate::adapters::multisend::{self, MultiSendTx};
use crate::adapters::safe::{build_safe_tx_hash, SafeOperation, SafeTx};
use crate::config::Params;
use crate::domain::{StageId, StagePayload, SynchronizedData};
use crate::error::Result;
use crate::ledger::LedgerClient;

/// Value of the batched native transfer; 1 wei exercises the transfer path
pub const NATIVE_TRANSFER_VALUE: u64 = 1;

/// Transaction shape selected for this round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPath {
    /// Single bet-placement call from the wallet
    PlaceBet,
    /// Multisend batch of native transfer + bet placement
    Batched,
}

/// Select the path from the synchronized timestamp's final decimal digit:
/// digits 0-6 place a single bet, 7-9 build the batch.
pub fn select_path(timestamp: i64) -> TxPath {
    if timestamp.rem_euclid(10) <= 6 {
        TxPath::PlaceBet
    } else {
        TxPath::Batched
    }
}

pub struct TxPreparationStage {
    params: Arc<Params>,
    ledger: Arc<dyn LedgerClient>,
}

impl TxPreparationStage {
    pub fn new(params: Arc<Params>, ledger: Arc<dyn LedgerClient>) -> Self {
        Self { params, ledger }
    }

    /// Compute this replica's candidate payload.
    ///
    /// `timestamp` must come from the coordinator's synchronized clock, never
    /// a replica-local one. A failed hash construction degrades to an absent
    /// hash in the payload; no partial hash is ever submitted.
    pub async fn run(&self, data: &SynchronizedData, timestamp: i64) -> StagePayload {
        let clock = DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| timestamp.to_string());
        info!("Synchronized timestamp is {timestamp} ({clock})");

        let tx_hash = match select_path(timestamp) {
            TxPath::PlaceBet => {
                info!("Preparing a betting transaction");
                self.place_bet_tx_hash(data).await
            }
            TxPath::Batched => {
                info!("Preparing a multisend transaction");
                self.batched_tx_hash(data).await
            }
        };

        let tx_hash = match tx_hash {
            Ok(hash) => {
                info!("Safe transaction hash is {hash}");
                Some(hash)
            }
            Err(e) => {
                error!("Could not build the safe transaction hash: {e}");
                None
            }
        };

        StagePayload::TxPreparation {
            tx_submitter: StageId::TxPreparation.as_str().to_string(),
            tx_hash,
        }
    }

    async fn place_bet_call_data(&self) -> Result<Vec<u8>> {
        betting::build_place_bet_tx(
            self.ledger.as_ref(),
            self.params.betting_contract_address,
            &self.params.chain_id,
            self.params.transfer_target_address,
            &self.params.match_key,
        )
        .await
    }

    /// Safe -> betting contract, carrying the configured bet amount
    async fn place_bet_tx_hash(&self, data: &SynchronizedData) -> Result<String> {
        let call_data = self.place_bet_call_data().await?;
        let tx = SafeTx {
            to_address: self.params.betting_contract_address,
            value: self.params.betting_amount,
            data: call_data,
            operation: SafeOperation::Call,
        };
        build_safe_tx_hash(
            self.ledger.as_ref(),
            &data.safe_contract_address,
            &self.params.chain_id,
            &tx,
        )
        .await
    }

    /// Safe -> multisend, delegate-called so the packed sub-calls execute in
    /// the wallet's own context; the wallet itself moves no native value.
    async fn batched_tx_hash(&self, data: &SynchronizedData) -> Result<String> {
        let call_data = self.place_bet_call_data().await?;

        let batch = vec![
            MultiSendTx::native_transfer(
                self.params.transfer_target_address,
                U256::from(NATIVE_TRANSFER_VALUE),
            ),
            MultiSendTx::contract_call(
                self.params.betting_contract_address,
                self.params.betting_amount,
                &call_data,
            ),
        ];

        let packed = multisend::pack_transactions(
            self.ledger.as_ref(),
            self.params.multisend_contract_address,
            &self.params.chain_id,
            &batch,
        )
        .await?;
        info!("Multisend data is {}", hex::encode(&packed));

        let tx = SafeTx {
            to_address: self.params.multisend_contract_address,
            value: U256::zero(),
            data: packed,
            operation: SafeOperation::DelegateCall,
        };
        build_safe_tx_hash(
            self.ledger.as_ref(),
            &data.safe_contract_address,
            &self.params.chain_id,
            &tx,
        )
        .await
    }
}
