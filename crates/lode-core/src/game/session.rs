use crate::game::config::BeliefConfig;
use crate::model::cell::DigBelief;
use crate::model::coord::Coord;
use crate::model::entity::{Entity, EntityId, EntityKind, Item};
use crate::model::grid::{Grid, GridError};
use crate::model::observation::{EntityRecord, OreToken, TurnObservation};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// One match's worth of mutable world state: the belief grid, the entity
/// registry, counters, and the spatial anchor for exploratory placement.
/// Everything is reached through this handle; there is no ambient global
/// state, so independent sessions can coexist.
#[derive(Debug, Clone)]
pub struct Session {
    turn: u32,
    my_score: u32,
    enemy_score: u32,
    radar_cooldown: u32,
    trap_cooldown: u32,
    grid: Grid,
    entities: BTreeMap<EntityId, Entity>,
    radars: BTreeSet<Coord>,
    traps: BTreeSet<Coord>,
    last_lode: Option<Coord>,
    config: BeliefConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestError {
    Grid(GridError),
}

impl Session {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, BeliefConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: BeliefConfig) -> Self {
        Self {
            turn: 0,
            my_score: 0,
            enemy_score: 0,
            radar_cooldown: 0,
            trap_cooldown: 0,
            grid: Grid::new(width, height),
            entities: BTreeMap::new(),
            radars: BTreeSet::new(),
            traps: BTreeSet::new(),
            last_lode: None,
            config,
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn my_score(&self) -> u32 {
        self.my_score
    }

    pub fn enemy_score(&self) -> u32 {
        self.enemy_score
    }

    pub fn radar_cooldown(&self) -> u32 {
        self.radar_cooldown
    }

    pub fn trap_cooldown(&self) -> u32 {
        self.trap_cooldown
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> BeliefConfig {
        self.config
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Friendly unit ids in registry order; the fixed decision order.
    pub fn allied_units(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.kind() == EntityKind::Ally)
            .map(Entity::id)
            .collect()
    }

    pub fn radar_positions(&self) -> &BTreeSet<Coord> {
        &self.radars
    }

    pub fn trap_positions(&self) -> &BTreeSet<Coord> {
        &self.traps
    }

    pub fn last_lode(&self) -> Option<Coord> {
        self.last_lode
    }

    /// Folds one turn's observation into the world model. Runs strictly
    /// before any decision for the turn: grid merge and mark expiry first,
    /// then entity updates (which may refine the grid through inference).
    pub fn ingest(&mut self, obs: &TurnObservation) -> Result<(), IngestError> {
        self.turn += 1;
        self.my_score = obs.my_score;
        self.enemy_score = obs.enemy_score;
        self.radar_cooldown = obs.radar_cooldown;
        self.trap_cooldown = obs.trap_cooldown;

        self.grid
            .apply_observation(&obs.cells, self.turn, self.config.mark_ttl)
            .map_err(IngestError::Grid)?;

        self.radars.clear();
        self.traps.clear();

        for record in &obs.entities {
            match record.kind {
                EntityKind::Radar => {
                    self.radars.insert(record.pos);
                    self.upsert_static(record);
                }
                EntityKind::Trap => {
                    self.traps.insert(record.pos);
                    self.upsert_static(record);
                }
                EntityKind::Ally | EntityKind::Enemy => self.observe_unit(record),
            }

            if record.pos.is_placed() {
                if let Some(cell) = self.grid.cell_mut(record.pos) {
                    cell.add_occupant(record.id);
                }
            }
        }

        Ok(())
    }

    /// Records that a dig at `at` yielded a resource and anchors future
    /// exploratory placement there.
    pub fn found(&mut self, at: Coord) {
        self.grid
            .register_yield(at, self.turn, self.config.found_yield);
        self.last_lode = Some(at);
    }

    /// Commits a unit to digging a cell for the rest of this turn. Later
    /// units see the flag and pick elsewhere; this is the only intra-turn
    /// coordination.
    pub fn claim_dig_target(&mut self, unit: EntityId, at: Coord) {
        if let Some(cell) = self.grid.cell_mut(at) {
            cell.set_targeted(true);
        }
        if let Some(entity) = self.entities.get_mut(&unit) {
            entity.set_dig_target(Some(at));
        }
    }

    /// Remembers a unit's chosen placement point so it keeps walking to the
    /// same spot on later turns and other units skip it.
    pub fn commit_placement(&mut self, unit: EntityId, at: Coord) {
        if let Some(entity) = self.entities.get_mut(&unit) {
            entity.set_placement_target(Some(at));
        }
    }

    fn upsert_static(&mut self, record: &EntityRecord) {
        self.entities
            .entry(record.id)
            .and_modify(|entity| {
                entity.observe(record.pos, record.item);
            })
            .or_insert_with(|| Entity::new(record.id, record.kind, record.pos, record.item));
    }

    /// Per-unit update. First sighting registers the entity without any
    /// inference (there is no prior position to compare against). Later
    /// sightings run, in order: displacement, position/item fold-in, homing
    /// inference, dig-target resolution.
    fn observe_unit(&mut self, record: &EntityRecord) {
        let config = self.config;
        let (homing_origin, resolution) = match self.entities.entry(record.id) {
            Entry::Vacant(vacant) => {
                vacant.insert(Entity::new(record.id, record.kind, record.pos, record.item));
                return;
            }
            Entry::Occupied(mut occupied) => {
                let entity = occupied.get_mut();
                let previous = entity.pos();
                let (dx, dy) = entity.observe(record.pos, record.item);

                let mut homing_origin = None;
                if entity.kind() == EntityKind::Enemy {
                    let homing = dx < config.homing_dx && dy == 0;
                    if homing && !entity.is_homing() {
                        homing_origin = Some(previous);
                    }
                    entity.set_homing(homing);
                }

                let mut resolution = None;
                if dx == 0 && dy == 0 {
                    if let Some(target) = entity.dig_target() {
                        resolution = Some((target, entity.item() == Item::Crystal));
                        entity.set_dig_target(None);
                    }
                }

                (homing_origin, resolution)
            }
        };

        // A homing transition means the enemy just picked something up near
        // its pre-move cell; any freshly dug neighbor is the likely source.
        if let Some(origin) = homing_origin {
            for neighbor in self.grid.neighbors(origin) {
                let fresh = self
                    .grid
                    .cell(neighbor)
                    .map(|cell| match cell.dig() {
                        DigBelief::Dug { turn } => {
                            self.turn.saturating_sub(turn) < config.fresh_dig_age
                        }
                        DigBelief::Undug => false,
                    })
                    .unwrap_or(false);
                if fresh {
                    self.found(neighbor);
                }
            }
        }

        // A unit that held a target and stayed put has resolved its dig,
        // one way or the other. The target is released exactly once.
        if let Some((target, carrying_crystal)) = resolution {
            if carrying_crystal {
                self.found(target);
            } else if let Some(cell) = self.grid.cell_mut(target) {
                cell.merge_ore(OreToken::Amount(0));
            }
            if let Some(cell) = self.grid.cell_mut(target) {
                cell.set_targeted(false);
            }
        }
    }
}
