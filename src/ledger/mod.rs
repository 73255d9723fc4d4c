//! Ledger read/encode interface boundary.
//!
//! The ledger itself is an external collaborator; this module defines the
//! typed request/response messages exchanged with it and the client trait the
//! adapters call through. Responses carrying any performative other than the
//! one matching the request kind are treated as errors by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ParleyError, Result};

/// Message kinds a request can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPerformative {
    /// Ask the ledger to run an encode routine or a raw read
    GetRawTransaction,
    /// Ask the ledger for contract state
    GetState,
}

impl RequestPerformative {
    /// The response kind a well-formed reply must carry
    pub fn expected_response(&self) -> ResponsePerformative {
        match self {
            RequestPerformative::GetRawTransaction => ResponsePerformative::RawTransaction,
            RequestPerformative::GetState => ResponsePerformative::State,
        }
    }
}

impl fmt::Display for RequestPerformative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestPerformative::GetRawTransaction => write!(f, "get_raw_transaction"),
            RequestPerformative::GetState => write!(f, "get_state"),
        }
    }
}

/// Message kinds a response can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePerformative {
    RawTransaction,
    State,
    Error,
}

impl fmt::Display for ResponsePerformative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponsePerformative::RawTransaction => write!(f, "raw_transaction"),
            ResponsePerformative::State => write!(f, "state"),
            ResponsePerformative::Error => write!(f, "error"),
        }
    }
}

/// One contract read or encode request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRequest {
    pub performative: RequestPerformative,
    pub contract_address: String,
    pub contract_id: String,
    pub callable: String,
    pub chain_id: String,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl ContractRequest {
    pub fn new(
        performative: RequestPerformative,
        contract_address: impl Into<String>,
        contract_id: impl Into<String>,
        callable: impl Into<String>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            performative,
            contract_address: contract_address.into(),
            contract_id: contract_id.into(),
            callable: callable.into(),
            chain_id: chain_id.into(),
            kwargs: Map::new(),
        }
    }

    pub fn with_kwarg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.to_string(), value.into());
        self
    }
}

/// The ledger's reply to a [`ContractRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractResponse {
    pub performative: ResponsePerformative,
    #[serde(default)]
    pub body: Map<String, Value>,
}

impl ContractResponse {
    pub fn new(performative: ResponsePerformative, body: Map<String, Value>) -> Self {
        Self { performative, body }
    }

    /// Validate the performative and pull one key out of the body.
    pub fn expect_key(&self, expected: ResponsePerformative, key: &str) -> Result<&Value> {
        if self.performative != expected {
            return Err(ParleyError::UnexpectedPerformative {
                expected: expected.to_string(),
                got: self.performative.to_string(),
            });
        }
        self.body
            .get(key)
            .ok_or_else(|| ParleyError::MissingResponseKey(key.to_string()))
    }
}

/// Client for the external ledger read/encode interface.
///
/// Implementations issue exactly one request per call and never retry; retry
/// policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn call(&self, request: ContractRequest) -> Result<ContractResponse>;
}
