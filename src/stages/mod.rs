pub mod data_pull;
pub mod decision;
pub mod sequencer;
pub mod tx_preparation;

pub use data_pull::DataPullStage;
pub use decision::{decide, DecisionStage};
pub use sequencer::Sequencer;
pub use tx_preparation::{select_path, TxPath, TxPreparationStage, NATIVE_TRANSFER_VALUE};
