use lode_core::game::session::Session;
use lode_core::model::cell::{Cell, DigBelief, OreBelief};
use lode_core::model::coord::Coord;

use crate::bot::BotParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    KnownOre,
    Marked,
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigCandidate {
    pub coord: Coord,
    pub kind: CandidateKind,
}

/// Picks the best untargeted dig site for a unit at `origin`: confirmed ore
/// first, then inferred-potential cells, then blind probes on the coarse
/// sub-lattice. Cells under a known trap are never offered.
pub fn dig_candidate(
    session: &Session,
    origin: Coord,
    params: &BotParams,
) -> Option<DigCandidate> {
    let known = nearest_cell(session, origin, |cell| {
        matches!(cell.ore(), OreBelief::Known(amount) if amount > 0)
    })
    .map(|coord| DigCandidate {
        coord,
        kind: CandidateKind::KnownOre,
    });
    if known.is_some() {
        return known;
    }

    let marked = nearest_cell(session, origin, |cell| cell.ore().is_potential()).map(|coord| {
        DigCandidate {
            coord,
            kind: CandidateKind::Marked,
        }
    });
    if marked.is_some() {
        return marked;
    }

    let stride = params.probe_stride.max(1);
    nearest_cell(session, origin, |cell| {
        let at = cell.coord();
        at.x > 0
            && at.x % stride == 0
            && at.y % stride == 0
            && cell.ore() == OreBelief::Unknown
            && cell.dig() == DigBelief::Undug
    })
    .map(|coord| DigCandidate {
        coord,
        kind: CandidateKind::Probe,
    })
}

fn nearest_cell<F>(session: &Session, origin: Coord, accept: F) -> Option<Coord>
where
    F: Fn(&Cell) -> bool,
{
    session
        .grid()
        .cells()
        .filter(|cell| !cell.is_targeted())
        .filter(|cell| !session.trap_positions().contains(&cell.coord()))
        .filter(|cell| accept(cell))
        .min_by_key(|cell| cell.coord().dist2(origin))
        .map(Cell::coord)
}
