use crate::model::coord::Coord;
use crate::model::entity::{EntityId, EntityKind, Item};
use serde::{Deserialize, Serialize};

/// One ore reading for one cell: either hidden or an exact amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OreToken {
    Unknown,
    Amount(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReport {
    pub ore: OreToken,
    pub hole: bool,
}

impl CellReport {
    pub const fn hidden() -> Self {
        Self {
            ore: OreToken::Unknown,
            hole: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Coord,
    pub item: Item,
}

/// The structured per-turn record handed over by the transport. Rows are
/// row-major: `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnObservation {
    pub my_score: u32,
    pub enemy_score: u32,
    pub radar_cooldown: u32,
    pub trap_cooldown: u32,
    pub cells: Vec<Vec<CellReport>>,
    pub entities: Vec<EntityRecord>,
}

impl TurnObservation {
    /// A fully hidden board with no visible entities; the usual test and
    /// simulation starting point.
    pub fn unknown_board(width: usize, height: usize) -> Self {
        Self {
            my_score: 0,
            enemy_score: 0,
            radar_cooldown: 0,
            trap_cooldown: 0,
            cells: vec![vec![CellReport::hidden(); width]; height],
            entities: Vec::new(),
        }
    }

    pub fn set_cell(&mut self, coord: Coord, report: CellReport) {
        self.cells[coord.y as usize][coord.x as usize] = report;
    }
}
