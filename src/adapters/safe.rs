//! Multisig wallet adapter and transaction-hash finalization.
//!
//! The wallet computes the hash its owners must sign; this module requests
//! that hash, validates its shape, and packs it with the transaction fields
//! into the canonical hex string submitted for agreement. Every replica must
//! reproduce that string byte for byte, so nothing here may depend on
//! replica-local state.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use super::addr_hex;
use crate::error::{ParleyError, Result};
use crate::ledger::{ContractRequest, LedgerClient, RequestPerformative};

/// Ledger-side identifier of the multisig wallet package
pub const SAFE_CONTRACT_ID: &str = "gnosis_safe";

/// Marker prefixing every wallet-returned hash
pub const HASH_MARKER: &str = "0x";

/// Hex length of a 32-byte hash once the marker is stripped
pub const TX_HASH_LENGTH: usize = 64;

/// Gas forwarded with the safe transaction; always zero here
pub const SAFE_GAS: u64 = 0;

/// Execution mode of a safe transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeOperation {
    /// Plain call from the wallet
    Call,
    /// Delegate call, executing in the wallet's own storage/value context
    DelegateCall,
}

impl SafeOperation {
    /// Wire code understood by the wallet contract
    pub fn code(&self) -> u8 {
        match self {
            SafeOperation::Call => 0,
            SafeOperation::DelegateCall => 1,
        }
    }
}

/// Inputs of one wallet signature-hash computation
#[derive(Debug, Clone)]
pub struct SafeTx {
    pub to_address: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub operation: SafeOperation,
}

/// Request the wallet's signature hash and finalize it into the canonical
/// agreement string.
pub async fn build_safe_tx_hash(
    ledger: &dyn LedgerClient,
    safe_address: &str,
    chain_id: &str,
    tx: &SafeTx,
) -> Result<String> {
    let request = ContractRequest::new(
        RequestPerformative::GetState,
        safe_address,
        SAFE_CONTRACT_ID,
        "get_raw_safe_transaction_hash",
        chain_id,
    )
    .with_kwarg("to_address", addr_hex(tx.to_address))
    .with_kwarg("value", tx.value.to_string())
    .with_kwarg("data", format!("0x{}", hex::encode(&tx.data)))
    .with_kwarg("safe_tx_gas", SAFE_GAS)
    .with_kwarg("operation", tx.operation.code());

    let response = ledger.call(request).await?;
    let value = response.expect_key(RequestPerformative::GetState.expected_response(), "tx_hash")?;
    let raw_hash = value
        .as_str()
        .ok_or_else(|| ParleyError::InvalidTxHash(format!("tx_hash is not a string: {value}")))?;

    let stripped = strip_hash_marker(raw_hash)?;
    hash_payload_to_hex(
        stripped,
        tx.value,
        U256::from(SAFE_GAS),
        tx.to_address,
        &tx.data,
        tx.operation,
    )
}

/// Strip the 2-character marker and enforce the exact stripped length.
///
/// A wrong length is fatal to the attempt; a truncated or padded hash must
/// never be propagated.
pub fn strip_hash_marker(raw: &str) -> Result<&str> {
    let stripped = raw
        .strip_prefix(HASH_MARKER)
        .ok_or_else(|| ParleyError::InvalidTxHash(format!("missing {HASH_MARKER} marker: {raw}")))?;
    if stripped.len() != TX_HASH_LENGTH {
        return Err(ParleyError::InvalidTxHash(format!(
            "stripped hash length {} != {TX_HASH_LENGTH}",
            stripped.len()
        )));
    }
    Ok(stripped)
}

/// Pack the stripped wallet hash with the transaction fields into the final
/// lowercase-hex payload string.
///
/// Layout: 32-byte hash, value as 32-byte big-endian word, gas as 32-byte
/// big-endian word, 20-byte destination, 1-byte operation code, call data.
pub fn hash_payload_to_hex(
    safe_tx_hash: &str,
    ether_value: U256,
    safe_tx_gas: U256,
    to_address: Address,
    data: &[u8],
    operation: SafeOperation,
) -> Result<String> {
    if safe_tx_hash.len() != TX_HASH_LENGTH {
        return Err(ParleyError::InvalidTxHash(format!(
            "hash length {} != {TX_HASH_LENGTH}",
            safe_tx_hash.len()
        )));
    }
    let hash_bytes = hex::decode(safe_tx_hash)
        .map_err(|e| ParleyError::InvalidTxHash(format!("hash is not hex: {e}")))?;

    let mut word = [0u8; 32];
    let mut packed = Vec::with_capacity(32 + 32 + 32 + 20 + 1 + data.len());
    packed.extend_from_slice(&hash_bytes);
    ether_value.to_big_endian(&mut word);
    packed.extend_from_slice(&word);
    safe_tx_gas.to_big_endian(&mut word);
    packed.extend_from_slice(&word);
    packed.extend_from_slice(to_address.as_bytes());
    packed.push(operation.code());
    packed.extend_from_slice(data);

    Ok(hex::encode(packed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ContractResponse, MockLedgerClient, ResponsePerformative};
    use serde_json::{json, Map};

    const SAFE_ADDRESS: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";

    fn destination() -> Address {
        "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            .parse()
            .unwrap()
    }

    fn wallet_response(tx_hash: &str) -> ContractResponse {
        let mut body = Map::new();
        body.insert("tx_hash".to_string(), json!(tx_hash));
        ContractResponse::new(ResponsePerformative::State, body)
    }

    #[test]
    fn test_strip_hash_marker_exact_length_only() {
        let good = format!("0x{}", "ab".repeat(32));
        assert_eq!(strip_hash_marker(&good).unwrap(), "ab".repeat(32));

        let short = format!("0x{}", "ab".repeat(31));
        let long = format!("0x{}", "ab".repeat(33));
        let unmarked = "ab".repeat(33);
        assert!(strip_hash_marker(&short).is_err());
        assert!(strip_hash_marker(&long).is_err());
        assert!(strip_hash_marker(&unmarked).is_err());
    }

    #[test]
    fn test_hash_payload_layout() {
        let hash = "11".repeat(32);
        let packed = hash_payload_to_hex(
            &hash,
            U256::from(5),
            U256::zero(),
            destination(),
            &[0xde, 0xad],
            SafeOperation::DelegateCall,
        )
        .unwrap();

        // 32 hash + 32 value + 32 gas + 20 address + 1 operation + 2 data bytes
        assert_eq!(packed.len(), (32 + 32 + 32 + 20 + 1 + 2) * 2);
        assert!(packed.starts_with(&hash));
        // value word: 31 zero bytes then 0x05
        assert_eq!(&packed[64..128], format!("{}05", "00".repeat(31)));
        // gas word is all zeroes
        assert_eq!(&packed[128..192], "00".repeat(32));
        // destination, operation code, data
        assert_eq!(&packed[192..232], "5fbdb2315678afecb367f032d93f642f64180aa3");
        assert_eq!(&packed[232..234], "01");
        assert_eq!(&packed[234..], "dead");
    }

    #[test]
    fn test_hash_payload_is_deterministic() {
        let hash = "2f".repeat(32);
        let build = || {
            hash_payload_to_hex(
                &hash,
                U256::from(10_000_000_000_000_000u64),
                U256::zero(),
                destination(),
                &[1, 2, 3],
                SafeOperation::Call,
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[tokio::test]
    async fn test_build_safe_tx_hash_request_shape() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_call()
            .withf(|request| {
                request.performative == RequestPerformative::GetState
                    && request.contract_address == SAFE_ADDRESS
                    && request.callable == "get_raw_safe_transaction_hash"
                    && request.kwargs["safe_tx_gas"] == json!(0)
                    && request.kwargs["operation"] == json!(0)
                    && request.kwargs["value"] == json!("7")
            })
            .returning(|_| Ok(wallet_response(&format!("0x{}", "aa".repeat(32)))));

        let tx = SafeTx {
            to_address: destination(),
            value: U256::from(7),
            data: vec![],
            operation: SafeOperation::Call,
        };
        let finalized = build_safe_tx_hash(&ledger, SAFE_ADDRESS, "gnosis", &tx)
            .await
            .unwrap();
        assert!(finalized.starts_with(&"aa".repeat(32)));
    }

    #[tokio::test]
    async fn test_build_safe_tx_hash_rejects_short_hash() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_call()
            .returning(|_| Ok(wallet_response(&format!("0x{}", "aa".repeat(31)))));

        let tx = SafeTx {
            to_address: destination(),
            value: U256::zero(),
            data: vec![],
            operation: SafeOperation::Call,
        };
        let err = build_safe_tx_hash(&ledger, SAFE_ADDRESS, "gnosis", &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::InvalidTxHash(_)));
    }
}
