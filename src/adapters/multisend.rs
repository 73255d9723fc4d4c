//! Multisend packing adapter.
//!
//! Packs an ordered list of sub-transactions into the single encoded call the
//! multisend contract executes. The packing itself runs behind the ledger
//! interface; this module owns the sub-transaction wire type and the request.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use super::addr_hex;
use crate::error::{ParleyError, Result};
use crate::ledger::{ContractRequest, LedgerClient, RequestPerformative};

/// Ledger-side identifier of the multisend contract package
pub const MULTISEND_CONTRACT_ID: &str = "multisend";

/// Execution mode of one packed sub-transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiSendOperation {
    #[serde(rename = "CALL")]
    Call,
    #[serde(rename = "DELEGATECALL")]
    DelegateCall,
}

/// One sub-transaction in the packed batch.
///
/// `data` stays absent for native transfers; `value` is a decimal wei string
/// so amounts above u64 survive the JSON boundary unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSendTx {
    pub operation: MultiSendOperation,
    pub to: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl MultiSendTx {
    /// A native-value transfer with no call data
    pub fn native_transfer(to: Address, value: U256) -> Self {
        Self {
            operation: MultiSendOperation::Call,
            to: addr_hex(to),
            value: value.to_string(),
            data: None,
        }
    }

    /// A contract call carrying value and call data
    pub fn contract_call(to: Address, value: U256, data: &[u8]) -> Self {
        Self {
            operation: MultiSendOperation::Call,
            to: addr_hex(to),
            value: value.to_string(),
            data: Some(format!("0x{}", hex::encode(data))),
        }
    }
}

/// Pack the ordered sub-transaction list into one encoded call
pub async fn pack_transactions(
    ledger: &dyn LedgerClient,
    contract_address: Address,
    chain_id: &str,
    txs: &[MultiSendTx],
) -> Result<Vec<u8>> {
    let request = ContractRequest::new(
        RequestPerformative::GetRawTransaction,
        addr_hex(contract_address),
        MULTISEND_CONTRACT_ID,
        "get_tx_data",
        chain_id,
    )
    .with_kwarg("multi_send_txs", serde_json::to_value(txs)?);

    let response = ledger.call(request).await?;
    let value = response.expect_key(
        RequestPerformative::GetRawTransaction.expected_response(),
        "data",
    )?;
    let packed_hex = value
        .as_str()
        .ok_or_else(|| ParleyError::ContractCall(format!("packed data is not a string: {value}")))?;
    let packed_hex = packed_hex.strip_prefix("0x").unwrap_or(packed_hex);
    hex::decode(packed_hex)
        .map_err(|e| ParleyError::ContractCall(format!("packed data is not hex: {e}")))
}
