//! Stage sequencer.
//!
//! Wires the three stages into one run. The sequencer never advances
//! unilaterally: each stage's payload goes through the coordinator, the
//! agreed value is committed into the synchronized store, and only the
//! resulting event moves the state machine.

use std::sync::Arc;
use tracing::info;

use crate::adapters::betting;
use crate::adapters::oracle::OracleClient;
use crate::adapters::storage::ContentStore;
use crate::config::Params;
use crate::coordinator::{RoundClient, StageRegistration};
use crate::domain::{StageId, SynchronizedData};
use crate::error::{ParleyError, Result};
use crate::ledger::LedgerClient;
use crate::stages::{DataPullStage, DecisionStage, TxPreparationStage};

pub struct Sequencer {
    params: Arc<Params>,
    round: Arc<dyn RoundClient>,
    ledger: Arc<dyn LedgerClient>,
    data_pull: DataPullStage,
    decision: DecisionStage,
    tx_preparation: TxPreparationStage,
}

impl Sequencer {
    pub fn new(
        params: Arc<Params>,
        round: Arc<dyn RoundClient>,
        ledger: Arc<dyn LedgerClient>,
        oracle: Arc<dyn OracleClient>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            data_pull: DataPullStage::new(
                params.clone(),
                oracle,
                store,
                ledger.clone(),
            ),
            decision: DecisionStage::new(),
            tx_preparation: TxPreparationStage::new(params.clone(), ledger.clone()),
            params,
            round,
            ledger,
        }
    }

    /// The registered stage set and transition table, derived from the
    /// domain table so the two can never drift apart.
    pub fn registration() -> StageRegistration {
        let stages = vec![
            StageId::DataPull,
            StageId::DecisionMaking,
            StageId::TxPreparation,
        ];
        let mut transitions = Vec::new();
        for stage in &stages {
            for event in stage.valid_events() {
                if let Some(next) = stage.transition(event) {
                    transitions.push((*stage, event, next));
                }
            }
        }
        StageRegistration {
            initial_stage: StageId::DataPull,
            stages,
            transitions,
        }
    }

    /// Pre-run sanity check: the configured match key must exist on-chain.
    pub async fn verify_onchain_setup(&self) -> Result<()> {
        let valid = betting::is_valid_match_key(
            self.ledger.as_ref(),
            self.params.betting_contract_address,
            &self.params.chain_id,
            &self.params.match_key,
        )
        .await?;
        if valid {
            return Ok(());
        }

        let known = betting::match_keys(
            self.ledger.as_ref(),
            self.params.betting_contract_address,
            &self.params.chain_id,
        )
        .await?;
        Err(ParleyError::Validation(format!(
            "match key `{}` is unknown to the betting contract; known keys: {known:?}",
            self.params.match_key
        )))
    }

    /// Drive one run to a terminal state.
    ///
    /// `data` is the single shared store; it is only written here, with
    /// coordinator-agreed payloads, at the agreement boundary.
    pub async fn run(&self, data: &mut SynchronizedData) -> Result<StageId> {
        self.round.register_stages(Self::registration()).await?;

        let mut stage = StageId::DataPull;
        while !stage.is_terminal() {
            let payload = match stage {
                StageId::DataPull => self.data_pull.run().await,
                StageId::DecisionMaking => self.decision.run(data),
                StageId::TxPreparation => {
                    let timestamp = self.round.synchronized_clock().await?;
                    self.tx_preparation.run(data, timestamp).await
                }
                StageId::Done | StageId::Failed => break,
            };

            let agreed = self.round.reach_agreement(payload).await?;
            data.commit(&agreed)?;

            let event = agreed.resulting_event();
            let next = stage
                .transition(event)
                .ok_or_else(|| ParleyError::InvalidTransition {
                    state: stage.to_string(),
                    event: event.to_string(),
                })?;
            info!("Stage {stage} agreed on {event}; advancing to {next}");
            stage = next;
        }

        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Event;

    #[test]
    fn test_registration_matches_domain_table() {
        let registration = Sequencer::registration();
        assert_eq!(registration.initial_stage, StageId::DataPull);
        assert_eq!(
            registration.stages,
            vec![
                StageId::DataPull,
                StageId::DecisionMaking,
                StageId::TxPreparation
            ]
        );
        assert_eq!(
            registration.transitions,
            vec![
                (StageId::DataPull, Event::Done, StageId::DecisionMaking),
                (
                    StageId::DecisionMaking,
                    Event::Transact,
                    StageId::TxPreparation
                ),
                (StageId::DecisionMaking, Event::Done, StageId::Done),
                (StageId::TxPreparation, Event::Done, StageId::Done),
                (StageId::TxPreparation, Event::Failed, StageId::Failed),
            ]
        );
    }
}
