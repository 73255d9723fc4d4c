//! DecisionMaking stage.
//!
//! Pure function over previously agreed facts; no I/O besides the final
//! agreement step handled by the sequencer.

use tracing::info;

use crate::domain::{Event, StagePayload, SynchronizedData};

#[derive(Debug, Default)]
pub struct DecisionStage;

impl DecisionStage {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether to transact from the agreed facts
    pub fn run(&self, data: &SynchronizedData) -> StagePayload {
        let event = decide(data.betting_result, data.has_placed_bet);
        match event {
            Event::Transact => {
                info!("Betting result is true and the bet is not placed yet. Transacting.")
            }
            _ => info!("Betting result is false, unknown, or the bet is already placed. Not transacting."),
        }
        StagePayload::Decision { event }
    }
}

/// Transact only when the outcome is known-true and the bet is known-unplaced.
///
/// An absent fact (a degraded DataPull sub-step) is never actionable: betting
/// on an unknown outcome or an unknown placement status could double-bet.
pub fn decide(betting_result: Option<bool>, has_placed_bet: Option<bool>) -> Event {
    match (betting_result, has_placed_bet) {
        (Some(true), Some(false)) => Event::Transact,
        _ => Event::Done,
    }
}
