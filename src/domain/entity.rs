/// Entities: player vitals, boss, inventory, world flags, and the
/// per-tick input frame handed in by the input binding.
///
/// Counters (`*_ms`) are in milliseconds and never go negative.

use serde::{Deserialize, Serialize};

use super::geom::Vec2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Facing for a movement vector: dominant axis wins, ties go vertical.
    /// Returns None for the zero vector.
    pub fn from_vector(v: Vec2) -> Option<Facing> {
        if v.length_sq() <= 0.0 {
            return None;
        }
        if v.x.abs() > v.y.abs() {
            Some(if v.x > 0.0 { Facing::Right } else { Facing::Left })
        } else {
            Some(if v.y > 0.0 { Facing::Down } else { Facing::Up })
        }
    }

    /// Unit offset along this facing (screen coordinates, +y is down).
    pub fn unit(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Facing> {
        match s {
            "up" => Some(Facing::Up),
            "down" => Some(Facing::Down),
            "left" => Some(Facing::Left),
            "right" => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Which combatant a stat change targets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Actor {
    Player,
    Boss,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub facing: Facing,
    pub speed: f32,
    pub attack_cooldown_ms: f32,
    pub invulnerable_ms: f32,
}

impl PlayerState {
    pub fn new(pos: Vec2, max_hp: i32, attack: i32, speed: f32) -> Self {
        PlayerState {
            pos,
            hp: max_hp,
            max_hp,
            attack,
            facing: Facing::Down,
            speed,
            attack_cooldown_ms: 0.0,
            invulnerable_ms: 0.0,
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }
}

/// Boss combat state. `active` mirrors collider/visibility and is derived
/// from `golem_defeated`; a dormant boss is active but not `awake`.
#[derive(Clone, Debug, PartialEq)]
pub struct BossState {
    pub pos: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub awake: bool,
    pub active: bool,
    pub attack_cooldown_ms: f32,
}

impl BossState {
    pub fn new(spawn: Vec2, max_hp: i32) -> Self {
        BossState {
            pos: spawn,
            hp: max_hp,
            max_hp,
            awake: false,
            active: true,
            attack_cooldown_ms: 0.0,
        }
    }
}

/// The seed pickup dropped by the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedPickup {
    pub pos: Vec2,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub has_seed: bool,
}

/// Inventory slots addressable through the store.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Item {
    Seed,
}

/// One-way world flags. Once true, never false again in a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldFlags {
    pub golem_defeated: bool,
    pub seed_collected: bool,
    pub lore_stone_read: bool,
    pub pond_visited: bool,
    pub grove_awakened: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flag {
    GolemDefeated,
    SeedCollected,
    LoreStoneRead,
    PondVisited,
    GroveAwakened,
}

impl WorldFlags {
    pub(crate) fn slot(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::GolemDefeated => &mut self.golem_defeated,
            Flag::SeedCollected => &mut self.seed_collected,
            Flag::LoreStoneRead => &mut self.lore_stone_read,
            Flag::PondVisited => &mut self.pond_visited,
            Flag::GroveAwakened => &mut self.grove_awakened,
        }
    }
}

/// Frame input: movement is level-triggered, everything else is an edge
/// (true only on the frame the key went down). `run` is a held modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub movement: Vec2,
    pub run: bool,
    pub attack: bool,
    pub interact: bool,
    pub save: bool,
    pub load: bool,
}

/// Decrement a countdown by elapsed time, clamped at zero.
#[inline]
pub fn tick_down(counter: &mut f32, dt_ms: f32) {
    *counter = (*counter - dt_ms).max(0.0);
}
