/// WorldState: the single mutable record of a running session.
///
/// ## Mutation
///
/// Stats with invariants (hp, stage, flags, inventory) only change through
/// `set_hp` / `set_stage` / `set_flag` / `set_inventory`. Each one clamps or
/// rejects, returns whether anything changed, and pushes a `hud-update`
/// when the change is player-visible.
///
/// Positions and countdowns belong to the movement and combat resolvers and
/// go through the small helpers further down.
///
/// ## Derived state
///
/// `quest.description`, `boss.active` and `seed.active` are never stored in a
/// save. They follow from stage and flags; `rederive` recomputes them.

use crate::config::GameConfig;
use crate::domain::entity::{
    tick_down, Actor, BossState, Facing, Flag, Inventory, Item, PlayerState, SeedPickup, WorldFlags,
};
use crate::domain::combat::clamp_hp;
use crate::domain::geom::Vec2;
use crate::domain::quest::{QuestEntry, QuestStage};
use super::event::{EventChannel, GameEvent, HudPayload};
use super::layout::WorldLayout;
use super::save::SaveSnapshot;

#[derive(Clone, Debug, PartialEq)]
pub struct QuestState {
    pub stage: QuestStage,
    pub description: &'static str,
    pub log: Vec<QuestEntry>,
}

impl QuestState {
    fn new() -> Self {
        QuestState {
            stage: QuestStage::Intro,
            description: QuestStage::Intro.description(),
            log: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldState {
    player: PlayerState,
    inventory: Inventory,
    quest: QuestState,
    flags: WorldFlags,
    boss: BossState,
    seed: SeedPickup,
}

// ── Construction ──

impl WorldState {
    /// Fresh session state from compiled/configured defaults only.
    pub fn new(config: &GameConfig, layout: &WorldLayout) -> Self {
        WorldState {
            player: PlayerState::new(
                layout.player_spawn(),
                config.player.max_hp,
                config.player.attack,
                config.player.speed,
            ),
            inventory: Inventory::default(),
            quest: QuestState::new(),
            flags: WorldFlags::default(),
            boss: BossState::new(layout.boss_spawn(), config.boss.max_hp),
            seed: SeedPickup { pos: layout.seed_spawn(), active: false },
        }
    }

    /// Merge a snapshot field by field. Absent fields keep their current
    /// value; the stage is overwritten directly, not transitioned.
    /// Call `rederive` afterwards.
    pub fn apply_snapshot(&mut self, snap: &SaveSnapshot) {
        let p = &snap.player;
        self.player.pos.x = p.x.unwrap_or(self.player.pos.x);
        self.player.pos.y = p.y.unwrap_or(self.player.pos.y);
        if let Some(hp) = p.hp {
            self.player.hp = hp.clamp(0, self.player.max_hp);
        }
        self.player.facing = p.direction.unwrap_or(self.player.facing);

        if let Some(stage) = snap.quest.stage {
            self.quest.stage = stage;
        }
        self.quest.description = self.quest.stage.description();

        self.inventory.has_seed = snap.inventory.has_seed.unwrap_or(self.inventory.has_seed);

        let w = &snap.world;
        let f = &mut self.flags;
        f.golem_defeated = w.golem_defeated.unwrap_or(f.golem_defeated);
        f.seed_collected = w.seed_collected.unwrap_or(f.seed_collected);
        f.lore_stone_read = w.lore_stone_read.unwrap_or(f.lore_stone_read);
        f.pond_visited = w.pond_visited.unwrap_or(f.pond_visited);
        f.grove_awakened = w.grove_awakened.unwrap_or(f.grove_awakened);

        if let Some(hp) = w.golem_hp {
            self.boss.hp = hp.clamp(0, self.boss.max_hp);
        }
    }

    /// Recompute enablement and presentation state from flags and stage.
    ///
    /// Holding the seed and having collected it are OR'd: either one marks
    /// both, and the pickup stays hidden.
    pub fn rederive(&mut self, layout: &WorldLayout) {
        let seed_held = self.inventory.has_seed || self.flags.seed_collected;
        self.inventory.has_seed = seed_held;
        self.flags.seed_collected = seed_held;

        self.quest.description = self.quest.stage.description();

        self.boss.pos = layout.boss_spawn();
        self.boss.attack_cooldown_ms = 0.0;
        if self.flags.golem_defeated {
            self.boss.active = false;
            self.boss.awake = false;
            self.boss.hp = 0;
        } else {
            self.boss.active = true;
            self.boss.awake = matches!(self.quest.stage, QuestStage::Battle | QuestStage::SeedFound);
        }

        self.seed.pos = layout.seed_spawn();
        self.seed.active = self.flags.golem_defeated && !seed_held;
    }
}

// ── Read-only views ──

impl WorldState {
    pub fn player(&self) -> &PlayerState { &self.player }
    pub fn inventory(&self) -> &Inventory { &self.inventory }
    pub fn quest(&self) -> &QuestState { &self.quest }
    pub fn flags(&self) -> &WorldFlags { &self.flags }
    pub fn boss(&self) -> &BossState { &self.boss }
    pub fn seed(&self) -> &SeedPickup { &self.seed }

    pub fn stage(&self) -> QuestStage {
        self.quest.stage
    }

    pub fn hud(&self) -> HudPayload {
        HudPayload {
            hp: self.player.hp,
            max_hp: self.player.max_hp,
            attack: self.player.attack,
            quest_stage: self.quest.stage,
            has_seed: self.inventory.has_seed,
            boss_hp: self.boss.hp,
            boss_alive: self.boss.active,
        }
    }

    fn notify_hud(&self, events: &mut EventChannel) {
        events.emit(GameEvent::HudUpdate(self.hud()));
    }
}

// ── Sanctioned mutators ──

impl WorldState {
    /// Add `delta` to an actor's hp, clamped into `[0, max]`.
    pub fn set_hp(&mut self, actor: Actor, delta: i32, events: &mut EventChannel) -> bool {
        let (hp, max) = match actor {
            Actor::Player => (&mut self.player.hp, self.player.max_hp),
            Actor::Boss => (&mut self.boss.hp, self.boss.max_hp),
        };
        let next = clamp_hp(*hp, delta, max);
        if next == *hp {
            return false;
        }
        *hp = next;
        self.notify_hud(events);
        true
    }

    /// Move to `next` if it is the immediate successor of the current stage.
    pub fn set_stage(&mut self, next: QuestStage, events: &mut EventChannel) -> bool {
        if self.quest.stage.next() != Some(next) {
            return false;
        }
        self.quest.stage = next;
        self.quest.description = next.description();
        self.notify_hud(events);
        true
    }

    /// Flags only ever go false → true. Defeating the golem also disables it.
    pub fn set_flag(&mut self, flag: Flag, value: bool, events: &mut EventChannel) -> bool {
        let slot = self.flags.slot(flag);
        if !value || *slot {
            return false;
        }
        *slot = true;
        if flag == Flag::GolemDefeated {
            self.boss.active = false;
            self.boss.awake = false;
            self.boss.hp = 0;
            self.notify_hud(events);
        }
        true
    }

    /// Inventory is monotonic. Taking the seed hides its pickup.
    pub fn set_inventory(&mut self, item: Item, value: bool, events: &mut EventChannel) -> bool {
        match item {
            Item::Seed => {
                if !value || self.inventory.has_seed {
                    return false;
                }
                self.inventory.has_seed = true;
                self.seed.active = false;
            }
        }
        self.notify_hud(events);
        true
    }

    pub(crate) fn push_log(&mut self, entry: QuestEntry) {
        self.quest.log.push(entry);
    }

    /// Take over the append-only log of the session this state replaces.
    pub(crate) fn inherit_log(&mut self, previous: &mut WorldState) {
        let mut log = std::mem::take(&mut previous.quest.log);
        log.append(&mut self.quest.log);
        self.quest.log = log;
    }
}

// ── Movement / timers (resolver-owned) ──

impl WorldState {
    /// Decrement every countdown by `dt_ms`, clamped at zero.
    pub(crate) fn tick_timers(&mut self, dt_ms: f32) {
        tick_down(&mut self.player.attack_cooldown_ms, dt_ms);
        tick_down(&mut self.player.invulnerable_ms, dt_ms);
        tick_down(&mut self.boss.attack_cooldown_ms, dt_ms);
    }

    pub(crate) fn move_player(&mut self, pos: Vec2) {
        self.player.pos = pos;
    }

    pub(crate) fn face(&mut self, facing: Facing) {
        self.player.facing = facing;
    }

    pub(crate) fn start_attack_cooldown(&mut self, ms: f32) {
        self.player.attack_cooldown_ms = ms.max(0.0);
    }

    pub(crate) fn grant_invulnerability(&mut self, ms: f32) {
        self.player.invulnerable_ms = ms.max(0.0);
    }

    pub(crate) fn move_boss(&mut self, pos: Vec2) {
        self.boss.pos = pos;
    }

    pub(crate) fn start_boss_cooldown(&mut self, ms: f32) {
        self.boss.attack_cooldown_ms = ms.max(0.0);
    }

    /// Dormant → awake. No-op once defeated or already awake.
    pub(crate) fn wake_boss(&mut self) -> bool {
        if !self.boss.active || self.boss.awake {
            return false;
        }
        self.boss.awake = true;
        true
    }

    pub(crate) fn reveal_seed(&mut self, pos: Vec2) {
        if self.inventory.has_seed {
            return;
        }
        self.seed.pos = pos;
        self.seed.active = true;
    }
}
