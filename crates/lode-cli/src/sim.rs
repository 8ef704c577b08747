use anyhow::anyhow;
use lode_bot::{BotParams, HeuristicPolicy, TurnController};
use lode_core::game::config::BeliefConfig;
use lode_core::game::session::Session;
use lode_core::game::snapshot::SessionSnapshot;
use lode_core::model::command::{Command, RequestKind};
use lode_core::model::coord::Coord;
use lode_core::model::entity::{EntityId, EntityKind, Item};
use lode_core::model::observation::{CellReport, EntityRecord, OreToken, TurnObservation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

const MOVE_BUDGET: i32 = 4;
const RADAR_RANGE: i32 = 4;
const REQUEST_COOLDOWN: u32 = 5;

/// Offline self-play setup: a hidden ore field, friendly units at the home
/// column, and the real controller driving them.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub seed: u64,
    pub turns: u32,
    pub width: u32,
    pub height: u32,
    pub units: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            turns: 200,
            width: 30,
            height: 15,
            units: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub turns_played: u32,
    pub crystals_delivered: u32,
    pub holes_dug: u32,
    pub radars_placed: u32,
    pub final_snapshot: SessionSnapshot,
}

#[derive(Serialize)]
struct ReplayRecord<'a> {
    turn: u32,
    score: u32,
    commands: &'a [(EntityId, Command)],
}

#[derive(Debug, Clone, Copy)]
struct SimUnit {
    pos: Coord,
    item: Item,
}

/// A deliberately small stand-in for the match engine: enough movement, dig,
/// and visibility rules to exercise every decision path end to end.
struct Engine {
    width: i32,
    height: i32,
    ore: Vec<u16>,
    holes: Vec<bool>,
    revealed: Vec<bool>,
    units: BTreeMap<EntityId, SimUnit>,
    radars: Vec<Coord>,
    traps: Vec<Coord>,
    score: u32,
    radar_cooldown: u32,
    trap_cooldown: u32,
    holes_dug: u32,
}

impl Engine {
    fn new(config: &SimConfig, rng: &mut StdRng) -> Self {
        let width = config.width as i32;
        let height = config.height as i32;
        let mut ore = vec![0u16; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                // Veins sit away from the home column.
                if x >= 3 && rng.gen_bool(0.12) {
                    ore[(y * width + x) as usize] = rng.gen_range(1..=3);
                }
            }
        }

        let mut units = BTreeMap::new();
        for id in 0..config.units {
            let y = (id as i32 * height / config.units.max(1) as i32).min(height - 1);
            units.insert(
                EntityId(id),
                SimUnit {
                    pos: Coord::new(0, y),
                    item: Item::None,
                },
            );
        }

        Self {
            width,
            height,
            ore,
            holes: vec![false; (width * height) as usize],
            revealed: vec![false; (width * height) as usize],
            units,
            radars: Vec::new(),
            traps: Vec::new(),
            score: 0,
            radar_cooldown: 0,
            trap_cooldown: 0,
            holes_dug: 0,
        }
    }

    fn index(&self, at: Coord) -> usize {
        (at.y * self.width + at.x) as usize
    }

    fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.x < self.width && at.y >= 0 && at.y < self.height
    }

    fn observe(&self) -> TurnObservation {
        let mut cells = Vec::with_capacity(self.height as usize);
        for y in 0..self.height {
            let mut row = Vec::with_capacity(self.width as usize);
            for x in 0..self.width {
                let index = (y * self.width + x) as usize;
                let ore = if self.revealed[index] {
                    OreToken::Amount(self.ore[index])
                } else {
                    OreToken::Unknown
                };
                row.push(CellReport {
                    ore,
                    hole: self.holes[index],
                });
            }
            cells.push(row);
        }

        let mut entities = Vec::new();
        for (id, unit) in &self.units {
            entities.push(EntityRecord {
                id: *id,
                kind: EntityKind::Ally,
                pos: unit.pos,
                item: unit.item,
            });
        }
        for (index, at) in self.radars.iter().enumerate() {
            entities.push(EntityRecord {
                id: EntityId(100 + index as u32),
                kind: EntityKind::Radar,
                pos: *at,
                item: Item::None,
            });
        }
        for (index, at) in self.traps.iter().enumerate() {
            entities.push(EntityRecord {
                id: EntityId(200 + index as u32),
                kind: EntityKind::Trap,
                pos: *at,
                item: Item::None,
            });
        }

        TurnObservation {
            my_score: self.score,
            enemy_score: 0,
            radar_cooldown: self.radar_cooldown,
            trap_cooldown: self.trap_cooldown,
            cells,
            entities,
        }
    }

    fn apply(&mut self, id: EntityId, command: Command) {
        let Some(mut unit) = self.units.get(&id).copied() else {
            return;
        };

        match command {
            Command::Wait => {}
            Command::Move(dest) => {
                unit.pos = step_toward(unit.pos, dest, MOVE_BUDGET);
            }
            Command::Dig(dest) => {
                if !self.in_bounds(dest) {
                    // Ignore digs off the board.
                } else if manhattan(unit.pos, dest) <= 1 {
                    self.dig(&mut unit, dest);
                } else {
                    unit.pos = step_toward(unit.pos, dest, MOVE_BUDGET);
                }
            }
            Command::Request(kind) => match kind {
                RequestKind::Radar => {
                    if self.radar_cooldown == 0 && unit.item == Item::None {
                        unit.item = Item::Radar;
                        self.radar_cooldown = REQUEST_COOLDOWN;
                    }
                }
                RequestKind::Trap => {
                    if self.trap_cooldown == 0 && unit.item == Item::None {
                        unit.item = Item::Trap;
                        self.trap_cooldown = REQUEST_COOLDOWN;
                    }
                }
            },
        }

        // Crystals bank the moment the carrier reaches the home column.
        if unit.pos.x == 0 && unit.item == Item::Crystal {
            unit.item = Item::None;
            self.score += 1;
        }

        self.units.insert(id, unit);
    }

    fn dig(&mut self, unit: &mut SimUnit, dest: Coord) {
        let index = self.index(dest);
        if !self.holes[index] {
            self.holes[index] = true;
            self.holes_dug += 1;
        }
        match unit.item {
            Item::Radar => {
                self.radars.push(dest);
                self.reveal_around(dest);
                unit.item = Item::None;
            }
            Item::Trap => {
                self.traps.push(dest);
                unit.item = Item::None;
            }
            Item::None => {
                if self.ore[index] > 0 {
                    self.ore[index] -= 1;
                    unit.item = Item::Crystal;
                }
            }
            Item::Crystal => {}
        }
    }

    fn reveal_around(&mut self, center: Coord) {
        for y in 0..self.height {
            for x in 0..self.width {
                let at = Coord::new(x, y);
                if manhattan(at, center) <= RADAR_RANGE {
                    let index = self.index(at);
                    self.revealed[index] = true;
                }
            }
        }
    }

    fn end_turn(&mut self) {
        self.radar_cooldown = self.radar_cooldown.saturating_sub(1);
        self.trap_cooldown = self.trap_cooldown.saturating_sub(1);
    }
}

fn manhattan(a: Coord, b: Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

fn step_toward(from: Coord, to: Coord, budget: i32) -> Coord {
    let mut pos = from;
    let mut budget = budget;
    while budget > 0 && pos.x != to.x {
        pos.x += (to.x - pos.x).signum();
        budget -= 1;
    }
    while budget > 0 && pos.y != to.y {
        pos.y += (to.y - pos.y).signum();
        budget -= 1;
    }
    pos
}

/// Runs the real controller against the simulated engine. Identical seeds
/// produce identical transcripts.
pub fn run_sim(config: &SimConfig, mut replay: Option<&mut dyn Write>) -> anyhow::Result<SimReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut engine = Engine::new(config, &mut rng);
    let mut session = Session::with_config(config.width, config.height, BeliefConfig::default());
    let mut controller = TurnController::new(HeuristicPolicy::new(), BotParams::default());

    let mut turns_played = 0;
    for _ in 0..config.turns {
        let obs = engine.observe();
        let commands = controller
            .play_turn(&mut session, &obs)
            .map_err(|err| anyhow!("observation rejected by the world model: {err:?}"))?;

        for (id, command) in &commands {
            engine.apply(*id, *command);
        }
        engine.end_turn();
        turns_played += 1;

        if let Some(out) = replay.as_deref_mut() {
            let record = ReplayRecord {
                turn: turns_played,
                score: engine.score,
                commands: &commands,
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
    }

    Ok(SimReport {
        turns_played,
        crystals_delivered: engine.score,
        holes_dug: engine.holes_dug,
        radars_placed: engine.radars.len() as u32,
        final_snapshot: SessionSnapshot::capture(&session),
    })
}
