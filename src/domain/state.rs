use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageId {
    /// Pulling the oracle signal and on-chain placement status
    DataPull,
    /// Deciding whether to transact from the agreed facts
    DecisionMaking,
    /// Building the safe transaction hash to sign
    TxPreparation,
    /// Run finished, nothing left to do
    Done,
    /// Run finished without a usable transaction hash
    Failed,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::DataPull => "DATA_PULL",
            StageId::DecisionMaking => "DECISION_MAKING",
            StageId::TxPreparation => "TX_PREPARATION",
            StageId::Done => "DONE",
            StageId::Failed => "FAILED",
        }
    }

    /// Next state for an agreed event, or None if the pair is not in the table
    pub fn transition(&self, event: Event) -> Option<StageId> {
        use StageId::*;

        match (self, event) {
            (DataPull, Event::Done) => Some(DecisionMaking),
            (DecisionMaking, Event::Transact) => Some(TxPreparation),
            (DecisionMaking, Event::Done) => Some(Done),
            (TxPreparation, Event::Done) => Some(Done),
            (TxPreparation, Event::Failed) => Some(Failed),
            _ => None,
        }
    }

    /// Valid events from the current state
    pub fn valid_events(&self) -> Vec<Event> {
        use StageId::*;

        match self {
            DataPull => vec![Event::Done],
            DecisionMaking => vec![Event::Transact, Event::Done],
            TxPreparation => vec![Event::Done, Event::Failed],
            Done | Failed => vec![],
        }
    }

    /// Is this a terminal state for the run?
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageId::Done | StageId::Failed)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for StageId {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "DATA_PULL" => Ok(StageId::DataPull),
            "DECISION_MAKING" => Ok(StageId::DecisionMaking),
            "TX_PREPARATION" => Ok(StageId::TxPreparation),
            "DONE" => Ok(StageId::Done),
            "FAILED" => Ok(StageId::Failed),
            _ => Err(format!("Unknown stage: {}", s)),
        }
    }
}

/// Agreed events driving stage transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    /// Stage completed; advance along the default edge
    Done,
    /// Decision was to place a bet
    Transact,
    /// Stage could not produce a usable result
    Failed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Done => "DONE",
            Event::Transact => "TRANSACT",
            Event::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Event {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "DONE" => Ok(Event::Done),
            "TRANSACT" => Ok(Event::Transact),
            "FAILED" => Ok(Event::Failed),
            _ => Err(format!("Unknown event: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use StageId::*;

        assert_eq!(DataPull.transition(Event::Done), Some(DecisionMaking));
        assert_eq!(DecisionMaking.transition(Event::Transact), Some(TxPreparation));
        assert_eq!(DecisionMaking.transition(Event::Done), Some(Done));
        assert_eq!(TxPreparation.transition(Event::Done), Some(Done));
        assert_eq!(TxPreparation.transition(Event::Failed), Some(Failed));

        // Everything else is rejected
        assert_eq!(DataPull.transition(Event::Transact), None);
        assert_eq!(DataPull.transition(Event::Failed), None);
        assert_eq!(DecisionMaking.transition(Event::Failed), None);
        assert_eq!(TxPreparation.transition(Event::Transact), None);
    }

    #[test]
    fn test_terminal_states_have_no_edges() {
        for event in [Event::Done, Event::Transact, Event::Failed] {
            assert_eq!(StageId::Done.transition(event), None);
            assert_eq!(StageId::Failed.transition(event), None);
        }
        assert!(StageId::Done.valid_events().is_empty());
        assert!(StageId::Failed.valid_events().is_empty());
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!(StageId::try_from("DATA_PULL").unwrap(), StageId::DataPull);
        assert_eq!(
            StageId::try_from("tx_preparation").unwrap(),
            StageId::TxPreparation
        );
        assert!(StageId::try_from("UNKNOWN").is_err());
        assert_eq!(Event::try_from("transact").unwrap(), Event::Transact);
    }
}
