use super::Policy;
use crate::bot::{
    BotParams, CandidateKind, dig_candidate, favorable_detonation, nearest_free_point,
    radar_lattice, trap_lattice,
};
use lode_core::game::session::Session;
use lode_core::model::command::{Command, RequestKind};
use lode_core::model::coord::Coord;
use lode_core::model::entity::{EntityId, Item};
use std::collections::BTreeSet;
use tracing::{Level, event};

/// The rule-cascade policy: first matching rule wins, every rule is a pure
/// function of the session's belief state plus the targets claimed by units
/// decided earlier this turn.
pub struct HeuristicPolicy;

impl HeuristicPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for HeuristicPolicy {
    fn choose(&mut self, session: &mut Session, unit: EntityId, params: &BotParams) -> Command {
        let Some(entity) = session.entity(unit) else {
            return Command::Wait;
        };
        let pos = entity.pos();
        let item = entity.item();
        let committed = entity.placement_target();

        let (command, rule) = evaluate(session, unit, params, pos, item, committed);
        log_decision(session, unit, pos, item, rule, &command);
        command
    }
}

fn evaluate(
    session: &mut Session,
    unit: EntityId,
    params: &BotParams,
    pos: Coord,
    item: Item,
    committed: Option<Coord>,
) -> (Command, &'static str) {
    if !pos.is_placed() {
        return (Command::Wait, "out_of_play");
    }

    // Detonating an adjacent trap outranks everything else; the dig is
    // deliberate and claims no target.
    if let Some(trap) = adjacent_detonation(session, pos) {
        return (Command::Dig(trap), "detonate");
    }

    let known_ore = session.grid().known_ore_cells().len();

    if pos.x == 0
        && item == Item::None
        && session.radar_cooldown() == 0
        && known_ore < params.low_ore_watermark
    {
        return (Command::Request(RequestKind::Radar), "radar_request");
    }

    if item == Item::Radar {
        let lattice = radar_lattice(
            session.grid().width(),
            session.grid().height(),
            params.radar_spacing,
        );
        return (
            placement_command(session, unit, pos, committed, &lattice),
            "radar_site",
        );
    }

    if item == Item::Trap {
        let lattice = trap_lattice(session.grid().width(), session.grid().height());
        return (
            placement_command(session, unit, pos, committed, &lattice),
            "trap_site",
        );
    }

    if pos.x == 0
        && item == Item::None
        && session.trap_cooldown() == 0
        && known_ore >= params.low_ore_watermark
    {
        return (Command::Request(RequestKind::Trap), "trap_request");
    }

    if item == Item::Crystal {
        return (Command::Move(Coord::new(0, pos.y)), "haul_home");
    }

    if let Some(candidate) = dig_candidate(session, pos, params) {
        session.claim_dig_target(unit, candidate.coord);
        let rule = match candidate.kind {
            CandidateKind::KnownOre => "dig_known",
            CandidateKind::Marked => "dig_marked",
            CandidateKind::Probe => "dig_probe",
        };
        return (Command::Dig(candidate.coord), rule);
    }

    (Command::Wait, "idle")
}

fn adjacent_detonation(session: &Session, pos: Coord) -> Option<Coord> {
    let reachable = [
        pos,
        Coord::new(pos.x - 1, pos.y),
        Coord::new(pos.x + 1, pos.y),
        Coord::new(pos.x, pos.y - 1),
        Coord::new(pos.x, pos.y + 1),
    ];
    reachable
        .into_iter()
        .find(|at| session.trap_positions().contains(at) && favorable_detonation(session, *at))
}

/// Walks the unit to its committed placement point, or picks the nearest
/// free lattice point anchored at the last successful dig. A fully occupied
/// lattice degrades to dropping the item mid-board.
fn placement_command(
    session: &mut Session,
    unit: EntityId,
    pos: Coord,
    committed: Option<Coord>,
    lattice: &[Coord],
) -> Command {
    if let Some(at) = committed {
        return Command::Dig(at);
    }

    let origin = session.last_lode().unwrap_or(pos);
    let reserved: BTreeSet<Coord> = session
        .entities()
        .filter(|entity| entity.id() != unit)
        .filter_map(|entity| entity.placement_target())
        .collect();

    let choice = nearest_free_point(lattice, origin, |point| {
        session.radar_positions().contains(&point)
            || session.trap_positions().contains(&point)
            || reserved.contains(&point)
    });

    match choice {
        Some(at) => {
            session.commit_placement(unit, at);
            Command::Dig(at)
        }
        None => Command::Dig(Coord::new(
            session.grid().width() / 2,
            session.grid().height() / 2,
        )),
    }
}

fn log_decision(
    session: &Session,
    unit: EntityId,
    pos: Coord,
    item: Item,
    rule: &'static str,
    command: &Command,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    event!(
        target: "lode_bot::decide",
        Level::INFO,
        turn = session.turn(),
        unit = unit.0,
        x = pos.x,
        y = pos.y,
        item = ?item,
        rule,
        command = %command,
    );

    if !decide_details_enabled() {
        return;
    }

    event!(
        target: "lode_bot::decide",
        Level::INFO,
        turn = session.turn(),
        unit = unit.0,
        known_ore = session.grid().known_ore_cells().len(),
        marked = session.grid().marked_cells().len(),
        dug = session.grid().dug_cells().len(),
        radar_cooldown = session.radar_cooldown(),
        trap_cooldown = session.trap_cooldown(),
    );
}

fn decide_details_enabled() -> bool {
    std::env::var("LODE_DECIDE_DETAILS")
        .map(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{HeuristicPolicy, Policy};
    use crate::bot::BotParams;
    use lode_core::game::session::Session;
    use lode_core::model::command::{Command, RequestKind};
    use lode_core::model::coord::Coord;
    use lode_core::model::entity::{EntityId, EntityKind, Item};
    use lode_core::model::observation::{CellReport, EntityRecord, OreToken, TurnObservation};

    fn record(id: u32, kind: EntityKind, x: i32, y: i32, item: Item) -> EntityRecord {
        EntityRecord {
            id: EntityId(id),
            kind,
            pos: Coord::new(x, y),
            item,
        }
    }

    fn ore(amount: u16) -> CellReport {
        CellReport {
            ore: OreToken::Amount(amount),
            hole: false,
        }
    }

    fn choose(session: &mut Session, unit: u32) -> Command {
        HeuristicPolicy::new().choose(session, EntityId(unit), &BotParams::default())
    }

    #[test]
    fn bare_board_at_home_requests_a_radar() {
        let mut session = Session::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.entities.push(record(0, EntityKind::Ally, 0, 0, Item::None));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Request(RequestKind::Radar));
    }

    #[test]
    fn radar_on_cooldown_blocks_the_request() {
        let mut session = Session::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.radar_cooldown = 3;
        obs.entities.push(record(0, EntityKind::Ally, 0, 0, Item::None));
        session.ingest(&obs).unwrap();

        assert_ne!(choose(&mut session, 0), Command::Request(RequestKind::Radar));
    }

    #[test]
    fn crystal_carrier_heads_home_along_its_row() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.entities
            .push(record(0, EntityKind::Ally, 5, 3, Item::Crystal));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Move(Coord::new(0, 3)));
    }

    #[test]
    fn known_ore_is_dug_and_claimed() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.set_cell(Coord::new(2, 1), ore(3));
        obs.entities.push(record(0, EntityKind::Ally, 1, 1, Item::None));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Dig(Coord::new(2, 1)));
        assert!(session.grid().cell(Coord::new(2, 1)).unwrap().is_targeted());
        assert_eq!(
            session.entity(EntityId(0)).unwrap().dig_target(),
            Some(Coord::new(2, 1))
        );
    }

    #[test]
    fn later_units_exclude_earlier_targets() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.set_cell(Coord::new(2, 1), ore(3));
        obs.set_cell(Coord::new(8, 1), ore(1));
        obs.entities.push(record(0, EntityKind::Ally, 1, 1, Item::None));
        obs.entities.push(record(1, EntityKind::Ally, 1, 1, Item::None));
        session.ingest(&obs).unwrap();

        let first = choose(&mut session, 0);
        let second = choose(&mut session, 1);
        assert_eq!(first, Command::Dig(Coord::new(2, 1)));
        assert_eq!(second, Command::Dig(Coord::new(8, 1)));
    }

    #[test]
    fn radar_carrier_commits_to_a_lattice_point_and_reuses_it() {
        let mut session = Session::new(30, 15);
        let mut obs = TurnObservation::unknown_board(30, 15);
        obs.entities
            .push(record(0, EntityKind::Ally, 4, 0, Item::Radar));
        session.ingest(&obs).unwrap();

        let first = choose(&mut session, 0);
        let Command::Dig(site) = first else {
            panic!("expected a dig, got {first:?}");
        };
        assert_eq!(
            session.entity(EntityId(0)).unwrap().placement_target(),
            Some(site)
        );

        // Next turn, mid-walk: the same site is reused rather than re-picked.
        let mut next = TurnObservation::unknown_board(30, 15);
        next.entities
            .push(record(0, EntityKind::Ally, 6, 1, Item::Radar));
        session.ingest(&next).unwrap();
        assert_eq!(choose(&mut session, 0), Command::Dig(site));
    }

    #[test]
    fn placement_skips_points_under_existing_radars() {
        let mut session = Session::new(30, 15);
        let mut obs = TurnObservation::unknown_board(30, 15);
        obs.entities
            .push(record(0, EntityKind::Ally, 1, 0, Item::Radar));
        obs.entities
            .push(record(20, EntityKind::Radar, 1, 0, Item::None));
        session.ingest(&obs).unwrap();

        let command = choose(&mut session, 0);
        let Command::Dig(site) = command else {
            panic!("expected a dig, got {command:?}");
        };
        assert_ne!(site, Coord::new(1, 0));
    }

    #[test]
    fn two_carriers_pick_distinct_sites() {
        let mut session = Session::new(30, 15);
        let mut obs = TurnObservation::unknown_board(30, 15);
        obs.entities
            .push(record(0, EntityKind::Ally, 4, 0, Item::Radar));
        obs.entities
            .push(record(1, EntityKind::Ally, 4, 0, Item::Radar));
        session.ingest(&obs).unwrap();

        let first = choose(&mut session, 0);
        let second = choose(&mut session, 1);
        assert_ne!(first, second);
    }

    #[test]
    fn plentiful_ore_at_home_requests_a_trap() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        for x in 2..7 {
            obs.set_cell(Coord::new(x, 5), ore(2));
        }
        obs.entities.push(record(0, EntityKind::Ally, 0, 2, Item::None));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Request(RequestKind::Trap));
    }

    #[test]
    fn favorable_adjacent_trap_is_detonated_first() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.set_cell(Coord::new(2, 1), ore(3));
        obs.entities.push(record(0, EntityKind::Ally, 5, 5, Item::None));
        obs.entities.push(record(30, EntityKind::Trap, 5, 6, Item::None));
        obs.entities.push(record(6, EntityKind::Enemy, 5, 7, Item::None));
        obs.entities.push(record(7, EntityKind::Enemy, 4, 6, Item::None));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Dig(Coord::new(5, 6)));
        // Detonation digs claim nothing.
        assert_eq!(session.entity(EntityId(0)).unwrap().dig_target(), None);
    }

    #[test]
    fn out_of_play_units_wait() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.entities
            .push(record(0, EntityKind::Ally, -1, -1, Item::None));
        session.ingest(&obs).unwrap();

        assert_eq!(choose(&mut session, 0), Command::Wait);
    }

    #[test]
    fn empty_board_far_from_home_still_probes() {
        let mut session = Session::new(10, 10);
        let mut obs = TurnObservation::unknown_board(10, 10);
        obs.radar_cooldown = 5;
        obs.entities.push(record(0, EntityKind::Ally, 4, 4, Item::None));
        session.ingest(&obs).unwrap();

        let command = choose(&mut session, 0);
        assert!(matches!(command, Command::Dig(_)), "got {command:?}");
    }

    #[test]
    fn details_flag_reads_the_environment() {
        unsafe {
            std::env::remove_var("LODE_DECIDE_DETAILS");
        }
        assert!(!super::decide_details_enabled());
        unsafe {
            std::env::set_var("LODE_DECIDE_DETAILS", "on");
        }
        assert!(super::decide_details_enabled());
        unsafe {
            std::env::remove_var("LODE_DECIDE_DETAILS");
        }
    }
}
