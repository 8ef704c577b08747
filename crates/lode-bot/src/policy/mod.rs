mod heuristic;

pub use heuristic::HeuristicPolicy;

use crate::bot::BotParams;
use lode_core::game::session::Session;
use lode_core::model::command::Command;
use lode_core::model::entity::EntityId;

/// Unified interface for per-unit decision-making.
///
/// `choose` runs once per friendly unit per turn, after the observation has
/// been fully ingested. It may claim dig targets and placement commitments on
/// the session; those are the only mutations allowed during the decision
/// phase.
pub trait Policy: Send {
    fn choose(&mut self, session: &mut Session, unit: EntityId, params: &BotParams) -> Command;
}
