use crate::bot::BotParams;
use crate::policy::Policy;
use lode_core::game::session::{IngestError, Session};
use lode_core::model::command::Command;
use lode_core::model::entity::EntityId;
use lode_core::model::observation::TurnObservation;

/// Drives one full cycle per turn: the observation is ingested before any
/// decision runs, then every friendly unit gets exactly one command, in
/// registry order. Later units observe targets claimed by earlier ones.
pub struct TurnController<P: Policy> {
    policy: P,
    params: BotParams,
}

impl<P: Policy> TurnController<P> {
    pub fn new(policy: P, params: BotParams) -> Self {
        Self { policy, params }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn play_turn(
        &mut self,
        session: &mut Session,
        obs: &TurnObservation,
    ) -> Result<Vec<(EntityId, Command)>, IngestError> {
        session.ingest(obs)?;

        let units = session.allied_units();
        let mut commands = Vec::with_capacity(units.len());
        for unit in units {
            let command = self.policy.choose(session, unit, &self.params);
            commands.push((unit, command));
        }
        Ok(commands)
    }
}
