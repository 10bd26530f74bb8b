/// The session driver: owns the world and advances it one tick at a time.
///
/// Processing order inside `Session::step`:
///   1. Dialogue disambiguation (attack/interact edges advance a showing line)
///   2. Countdown timers
///   3. Player movement
///   4. Player attack
///   5. Boss AI
///   6. Seed pickup
///   7. Interactions
///   8. Story beacons
///   9. Pending checkpoint
///  10. Manual save / load edges
///  11. Periodic HUD refresh
///  12. Drain events, feed dialogue queue
///
/// Nothing blocks. Storage failures come back as system messages.

use tracing::{debug, info};

use crate::config::GameConfig;
use crate::domain::entity::{tick_down, Facing, Flag, FrameInput, Item};
use crate::domain::geom::{Rect, Vec2};
use crate::domain::script;
use super::beacon::BeaconResolver;
use super::combat;
use super::event::{DialogueQueue, EventChannel, GameEvent};
use super::interaction::InteractionResolver;
use super::layout::WorldLayout;
use super::quest;
use super::save::{self, SaveStore};
use super::world::WorldState;

/// Keeps the player's center this far from the map edge.
const EDGE_MARGIN: f32 = 16.0;
/// Side of the seed pickup's square.
const SEED_SIZE: f32 = 20.0;

pub struct Session {
    config: GameConfig,
    layout: WorldLayout,
    world: WorldState,
    interactions: InteractionResolver,
    beacons: BeaconResolver,
    dialogue: DialogueQueue,
    events: EventChannel,
    store: Box<dyn SaveStore>,
    hud_timer_ms: f32,
}

// ══════════════════════════════════════════════════════════════
// Lifecycle
// ══════════════════════════════════════════════════════════════

impl Session {
    /// Build a session from defaults, merged with whatever `store` holds.
    /// Returns the opening events (dialogue, HUD, quest status).
    pub fn start(config: GameConfig, layout: WorldLayout, store: Box<dyn SaveStore>) -> (Self, Vec<GameEvent>) {
        let defaults = WorldState::new(&config, &layout);
        let loaded = save::load_game(store.as_ref());
        let resumed = loaded.is_some();
        let world = match &loaded {
            Some(snap) => save::reconcile(defaults, snap, &layout),
            None => defaults,
        };

        let mut session = Session {
            interactions: InteractionResolver::from_layout(&layout),
            beacons: BeaconResolver::from_layout(&layout),
            dialogue: DialogueQueue::new(),
            events: EventChannel::new(),
            hud_timer_ms: config.timing.hud_refresh_ms,
            config,
            layout,
            world,
            store,
        };

        info!(resumed, stage = %session.world.stage(), "session_started");
        if resumed {
            session.events.say(script::RESUMED);
        } else {
            session.events.say(script::OPENING);
        }
        session.announce_status();
        let opening = session.flush();
        (session, opening)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn dialogue(&self) -> &DialogueQueue {
        &self.dialogue
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn interactions(&self) -> &InteractionResolver {
        &self.interactions
    }

    pub fn beacons(&self) -> &BeaconResolver {
        &self.beacons
    }

    /// Explicit dialogue advance from the presentation side.
    pub fn advance_dialogue(&mut self) -> bool {
        self.dialogue.advance()
    }

    fn announce_status(&mut self) {
        self.events.emit(GameEvent::HudUpdate(self.world.hud()));
        self.events.emit(quest::status_event(&self.world));
    }

    fn flush(&mut self) -> Vec<GameEvent> {
        let out = self.events.drain();
        self.dialogue.absorb(&out);
        out
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

impl Session {
    pub fn step(&mut self, input: &FrameInput, dt_ms: f32) -> Vec<GameEvent> {
        let dt_ms = dt_ms.max(0.0);
        let mut input = *input;

        if self.dialogue.is_active() && (input.attack || input.interact) {
            self.dialogue.advance();
            input.attack = false;
            input.interact = false;
        }

        self.world.tick_timers(dt_ms);
        resolve_player_movement(&mut self.world, &self.config, &self.layout, &input, dt_ms);
        if input.attack {
            combat::player_attack(&mut self.world, &self.config, &mut self.events);
        }
        combat::update_boss(&mut self.world, &self.config, &self.layout, dt_ms, &mut self.events);
        resolve_seed_pickup(&mut self.world, &self.config, &mut self.events);
        self.interactions.update(&mut self.world, input.interact, &mut self.events);
        self.beacons.update(&mut self.world, &self.layout, &mut self.events);

        if self.events.take_checkpoint() {
            self.checkpoint();
        }
        if input.save {
            self.save();
        }
        if input.load {
            self.load();
        }

        tick_down(&mut self.hud_timer_ms, dt_ms);
        if self.hud_timer_ms <= 0.0 {
            self.hud_timer_ms = self.config.timing.hud_refresh_ms;
            self.events.emit(GameEvent::HudUpdate(self.world.hud()));
        }

        self.flush()
    }
}

// ══════════════════════════════════════════════════════════════
// Persistence
// ══════════════════════════════════════════════════════════════

impl Session {
    fn checkpoint(&mut self) {
        let snap = save::serialize(&self.world);
        if save::save_game(self.store.as_mut(), &snap) {
            debug!(stage = %self.world.stage(), "auto_checkpoint");
        }
    }

    /// Manual save. Reports the outcome as a system message.
    pub fn save(&mut self) -> bool {
        let snap = save::serialize(&self.world);
        let ok = save::save_game(self.store.as_mut(), &snap);
        let msg = if ok { script::MSG_SAVED } else { script::MSG_SAVE_FAILED };
        self.events.system_message(msg);
        ok
    }

    /// Manual load: the stored snapshot is merged over fresh defaults.
    /// Beacon latches and the quest log carry over from the live session;
    /// the interaction selection is dropped.
    pub fn load(&mut self) -> bool {
        let snap = match save::load_game(self.store.as_ref()) {
            Some(snap) => snap,
            None => {
                self.events.system_message(script::MSG_NO_SAVE);
                return false;
            }
        };
        let defaults = WorldState::new(&self.config, &self.layout);
        let mut loaded = save::reconcile(defaults, &snap, &self.layout);
        loaded.inherit_log(&mut self.world);
        self.world = loaded;
        self.interactions = InteractionResolver::from_layout(&self.layout);
        self.events.take_checkpoint();
        self.hud_timer_ms = self.config.timing.hud_refresh_ms;

        info!(stage = %self.world.stage(), "save_loaded");
        self.events.emit(GameEvent::InteractionAvailable(None));
        self.events.system_message(script::MSG_LOADED);
        self.announce_status();
        true
    }

    /// Erase the stored save. The live session is untouched.
    pub fn clear_save(&mut self) -> bool {
        let ok = save::clear_save(self.store.as_mut());
        let msg = if ok { script::MSG_SAVE_CLEARED } else { script::MSG_CLEAR_FAILED };
        self.events.system_message(msg);
        ok
    }
}

// ══════════════════════════════════════════════════════════════
// Movement / pickup
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(
    world: &mut WorldState,
    cfg: &GameConfig,
    layout: &WorldLayout,
    input: &FrameInput,
    dt_ms: f32,
) {
    let mut dir = input.movement;
    if dir.length_sq() <= f32::EPSILON {
        return;
    }
    if dir.length_sq() > 1.0 {
        dir = dir.normalized();
    }
    if let Some(facing) = Facing::from_vector(dir) {
        world.face(facing);
    }

    let mut speed = world.player().speed;
    if input.run {
        speed *= cfg.player.run_multiplier;
    }
    let next = world.player().pos + dir.scale(speed * dt_ms / 1000.0);
    let min = Vec2::new(EDGE_MARGIN, EDGE_MARGIN);
    let max = layout.pixel_size() - min;
    world.move_player(next.clamp(min, max));
}

fn resolve_seed_pickup(world: &mut WorldState, cfg: &GameConfig, events: &mut EventChannel) {
    let seed = *world.seed();
    if !seed.active {
        return;
    }
    let body = Rect::centered(world.player().pos, cfg.player.body_width, cfg.player.body_height);
    if !body.intersects(&Rect::centered(seed.pos, SEED_SIZE, SEED_SIZE)) {
        return;
    }

    world.set_inventory(Item::Seed, true, events);
    world.set_flag(Flag::SeedCollected, true, events);
    info!("seed_collected");
    events.emit(GameEvent::SeedCollected { at: seed.pos });
    events.system_message(script::MSG_SEED_COLLECTED);
    events.request_checkpoint();
}
