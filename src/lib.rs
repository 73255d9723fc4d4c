pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod stages;

pub use adapters::{
    ContentStore, HttpOracleClient, MultiSendOperation, MultiSendTx, OracleClient, OracleSpec,
    SafeOperation, SafeTx, SAFE_GAS, TX_HASH_LENGTH,
};
pub use config::{AppConfig, Params};
pub use coordinator::{RoundClient, StageRegistration};
pub use domain::{Event, StageId, StagePayload, SynchronizedData};
pub use error::{ParleyError, Result};
pub use ledger::{
    ContractRequest, ContractResponse, LedgerClient, RequestPerformative, ResponsePerformative,
};
pub use stages::{DataPullStage, DecisionStage, Sequencer, TxPreparationStage};
