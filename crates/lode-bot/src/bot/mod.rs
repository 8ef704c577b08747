mod blast;
mod candidates;
mod controller;
mod lattice;
mod params;

pub use blast::{blast_region, favorable_detonation};
pub use candidates::{CandidateKind, DigCandidate, dig_candidate};
pub use controller::TurnController;
pub use lattice::{nearest_free_point, radar_lattice, trap_lattice};
pub use params::BotParams;
