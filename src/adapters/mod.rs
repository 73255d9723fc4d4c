pub mod betting;
pub mod multisend;
pub mod oracle;
pub mod safe;
pub mod storage;

pub use multisend::{MultiSendOperation, MultiSendTx};
pub use oracle::{HttpOracleClient, OracleClient, OracleSpec};
pub use safe::{build_safe_tx_hash, hash_payload_to_hex, SafeOperation, SafeTx, SAFE_GAS, TX_HASH_LENGTH};
pub use storage::{metadata_filepath, ContentStore, METADATA_FILENAME};

/// Full lowercase hex rendering of an address for wire kwargs.
///
/// `Display` on `Address` abbreviates the middle bytes, which must never reach
/// an agreed payload or a ledger request.
pub(crate) fn addr_hex(address: ethers::types::Address) -> String {
    format!("{address:?}")
}
