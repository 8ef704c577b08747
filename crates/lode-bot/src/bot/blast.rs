use lode_core::game::session::Session;
use lode_core::model::coord::Coord;
use lode_core::model::entity::EntityKind;
use std::collections::BTreeSet;

fn adjacents(at: Coord) -> [Coord; 5] {
    [
        at,
        Coord::new(at.x - 1, at.y),
        Coord::new(at.x + 1, at.y),
        Coord::new(at.x, at.y - 1),
        Coord::new(at.x, at.y + 1),
    ]
}

/// Every cell hit when the trap at `ignition` goes off: the chain of
/// orthogonally connected traps plus one ring around each of them.
pub fn blast_region(traps: &BTreeSet<Coord>, ignition: Coord) -> BTreeSet<Coord> {
    let mut chained = BTreeSet::from([ignition]);
    let mut frontier = vec![ignition];
    while let Some(at) = frontier.pop() {
        for next in adjacents(at) {
            if traps.contains(&next) && chained.insert(next) {
                frontier.push(next);
            }
        }
    }

    let mut region = BTreeSet::new();
    for trap in &chained {
        region.extend(adjacents(*trap));
    }
    region
}

/// Whether detonating the trap at `ignition` trades favorably: strictly more
/// visible enemies than allies caught in the blast, and at least one enemy.
pub fn favorable_detonation(session: &Session, ignition: Coord) -> bool {
    let region = blast_region(session.trap_positions(), ignition);
    let mut allies = 0usize;
    let mut enemies = 0usize;
    for entity in session.entities() {
        if !entity.kind().is_unit() || !entity.pos().is_placed() {
            continue;
        }
        if region.contains(&entity.pos()) {
            match entity.kind() {
                EntityKind::Ally => allies += 1,
                EntityKind::Enemy => enemies += 1,
                _ => {}
            }
        }
    }
    enemies > allies && enemies > 0
}
