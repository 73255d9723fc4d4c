//! Betting contract adapter
//!
//! Stateless request builders and response validators for the betting
//! contract. Each operation issues exactly one ledger call and never retries;
//! retry policy belongs to the caller.

use ethers::types::Address;
use serde_json::Value;

use super::addr_hex;
use crate::error::{ParleyError, Result};
use crate::ledger::{ContractRequest, LedgerClient, RequestPerformative};

/// Ledger-side identifier of the betting contract package
pub const BETTING_CONTRACT_ID: &str = "betting";

/// List the valid match identifiers known to the contract
pub async fn match_keys(
    ledger: &dyn LedgerClient,
    contract_address: Address,
    chain_id: &str,
) -> Result<Vec<String>> {
    let request = ContractRequest::new(
        RequestPerformative::GetState,
        addr_hex(contract_address),
        BETTING_CONTRACT_ID,
        "match_keys",
        chain_id,
    );
    let response = ledger.call(request).await?;
    let value = response.expect_key(
        RequestPerformative::GetState.expected_response(),
        "match_keys",
    )?;

    let keys = value
        .as_array()
        .ok_or_else(|| ParleyError::ContractCall("match_keys body is not an array".to_string()))?;
    keys.iter()
        .map(|key| {
            key.as_str().map(str::to_string).ok_or_else(|| {
                ParleyError::ContractCall(format!("match key is not a string: {key}"))
            })
        })
        .collect()
}

/// Check whether the bettor has already placed a bet on the match
pub async fn has_placed_bet(
    ledger: &dyn LedgerClient,
    contract_address: Address,
    chain_id: &str,
    bettor: Address,
    match_key: &str,
) -> Result<bool> {
    let request = ContractRequest::new(
        RequestPerformative::GetRawTransaction,
        addr_hex(contract_address),
        BETTING_CONTRACT_ID,
        "has_placed_bet",
        chain_id,
    )
    .with_kwarg("bettor", addr_hex(bettor))
    .with_kwarg("match_key", match_key);

    let response = ledger.call(request).await?;
    let value = response.expect_key(
        RequestPerformative::GetRawTransaction.expected_response(),
        "data",
    )?;
    value
        .as_bool()
        .ok_or_else(|| ParleyError::ContractCall(format!("has_placed_bet is not a bool: {value}")))
}

/// Check whether the match key exists on the contract
pub async fn is_valid_match_key(
    ledger: &dyn LedgerClient,
    contract_address: Address,
    chain_id: &str,
    match_key: &str,
) -> Result<bool> {
    let request = ContractRequest::new(
        RequestPerformative::GetState,
        addr_hex(contract_address),
        BETTING_CONTRACT_ID,
        "is_valid_match_key",
        chain_id,
    )
    .with_kwarg("match_key", match_key);

    let response = ledger.call(request).await?;
    let value = response.expect_key(RequestPerformative::GetState.expected_response(), "data")?;
    value.as_bool().ok_or_else(|| {
        ParleyError::ContractCall(format!("is_valid_match_key is not a bool: {value}"))
    })
}

/// ABI-encode a `placeBet` call; returns raw call data, not a signed tx
pub async fn build_place_bet_tx(
    ledger: &dyn LedgerClient,
    contract_address: Address,
    chain_id: &str,
    bettor: Address,
    match_key: &str,
) -> Result<Vec<u8>> {
    let request = ContractRequest::new(
        RequestPerformative::GetRawTransaction,
        addr_hex(contract_address),
        BETTING_CONTRACT_ID,
        "build_place_bet_tx",
        chain_id,
    )
    .with_kwarg("bettor", addr_hex(bettor))
    .with_kwarg("match_key", match_key);

    let response = ledger.call(request).await?;
    let value = response.expect_key(
        RequestPerformative::GetRawTransaction.expected_response(),
        "data",
    )?;
    decode_call_data(value)
}

fn decode_call_data(value: &Value) -> Result<Vec<u8>> {
    let data_hex = value
        .as_str()
        .ok_or_else(|| ParleyError::ContractCall(format!("call data is not a string: {value}")))?;
    let data_hex = data_hex.strip_prefix("0x").unwrap_or(data_hex);
    hex::decode(data_hex)
        .map_err(|e| ParleyError::ContractCall(format!("call data is not hex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ContractResponse, MockLedgerClient, ResponsePerformative};
    use serde_json::{json, Map};

    fn betting_address() -> Address {
        "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            .parse()
            .unwrap()
    }

    fn bettor_address() -> Address {
        "0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc"
            .parse()
            .unwrap()
    }

    fn response(performative: ResponsePerformative, key: &str, value: Value) -> ContractResponse {
        let mut body = Map::new();
        body.insert(key.to_string(), value);
        ContractResponse::new(performative, body)
    }

    #[tokio::test]
    async fn test_has_placed_bet_request_shape() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_call()
            .withf(|request| {
                request.performative == RequestPerformative::GetRawTransaction
                    && request.callable == "has_placed_bet"
                    && request.contract_id == BETTING_CONTRACT_ID
                    && request.chain_id == "gnosis"
                    && request.kwargs["match_key"] == json!("match_001")
                    && request.kwargs["bettor"]
                        == json!("0x9965507d1a55bcc2695c58ba16fb37d819b0a4dc")
            })
            .returning(|_| {
                Ok(response(
                    ResponsePerformative::RawTransaction,
                    "data",
                    json!(false),
                ))
            });

        let placed = has_placed_bet(
            &ledger,
            betting_address(),
            "gnosis",
            bettor_address(),
            "match_001",
        )
        .await
        .unwrap();
        assert!(!placed);
    }

    #[tokio::test]
    async fn test_has_placed_bet_rejects_wrong_performative() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_call()
            .returning(|_| Ok(response(ResponsePerformative::Error, "data", json!(true))));

        let err = has_placed_bet(
            &ledger,
            betting_address(),
            "gnosis",
            bettor_address(),
            "match_001",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ParleyError::UnexpectedPerformative { .. }));
    }

    #[tokio::test]
    async fn test_build_place_bet_tx_decodes_hex() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_call().returning(|_| {
            Ok(response(
                ResponsePerformative::RawTransaction,
                "data",
                json!("0xdeadbeef"),
            ))
        });

        let data = build_place_bet_tx(
            &ledger,
            betting_address(),
            "gnosis",
            bettor_address(),
            "match_001",
        )
        .await
        .unwrap();
        assert_eq!(data, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[tokio::test]
    async fn test_match_keys_rejects_non_string_entries() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_call().returning(|_| {
            Ok(response(
                ResponsePerformative::State,
                "match_keys",
                json!(["match_001", 7]),
            ))
        });

        let err = match_keys(&ledger, betting_address(), "gnosis")
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::ContractCall(_)));
    }

    #[tokio::test]
    async fn test_is_valid_match_key() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_call()
            .withf(|request| {
                request.performative == RequestPerformative::GetState
                    && request.callable == "is_valid_match_key"
            })
            .returning(|_| Ok(response(ResponsePerformative::State, "data", json!(true))));

        assert!(
            is_valid_match_key(&ledger, betting_address(), "gnosis", "match_001")
                .await
                .unwrap()
        );
    }
}
