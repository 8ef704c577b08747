use crate::game::session::Session;
use crate::model::coord::Coord;
use serde::{Deserialize, Serialize};

/// Diagnostic digest of a session, captured for logs and replay footers.
/// Deliberately summary-level: belief state lives only for the current match,
/// so there is no restore path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub turn: u32,
    pub my_score: u32,
    pub enemy_score: u32,
    pub radar_cooldown: u32,
    pub trap_cooldown: u32,
    pub known_ore_cells: usize,
    pub marked_cells: usize,
    pub dug_cells: usize,
    pub last_lode: Option<Coord>,
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        Self {
            turn: session.turn(),
            my_score: session.my_score(),
            enemy_score: session.enemy_score(),
            radar_cooldown: session.radar_cooldown(),
            trap_cooldown: session.trap_cooldown(),
            known_ore_cells: session.grid().known_ore_cells().len(),
            marked_cells: session.grid().marked_cells().len(),
            dug_cells: session.grid().dug_cells().len(),
            last_lode: session.last_lode(),
        }
    }

    pub fn to_json(session: &Session) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(session))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionSnapshot;
    use crate::game::session::Session;
    use crate::model::coord::Coord;
    use crate::model::observation::TurnObservation;

    #[test]
    fn snapshot_serializes_to_json() {
        let mut session = Session::new(4, 3);
        session.ingest(&TurnObservation::unknown_board(4, 3)).unwrap();
        let json = SessionSnapshot::to_json(&session).unwrap();
        assert!(json.contains("\"turn\": 1"));
        assert!(json.contains("\"known_ore_cells\": 0"));
    }

    #[test]
    fn snapshot_round_trips() {
        let mut session = Session::new(4, 3);
        session.ingest(&TurnObservation::unknown_board(4, 3)).unwrap();
        session.found(Coord::new(2, 1));

        let snapshot = SessionSnapshot::capture(&session);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back = SessionSnapshot::from_json(&json).unwrap();

        assert_eq!(back, snapshot);
        assert_eq!(back.last_lode, Some(Coord::new(2, 1)));
        assert_eq!(back.known_ore_cells, 1);
    }
}
