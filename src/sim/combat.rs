/// Combat resolver: player slashes, boss pursuit/melee, player stagger.
///
/// Countdowns are decremented once per tick by `WorldState::tick_timers`
/// before anything here runs, so a trigger fires on the first tick its
/// counter is observed at zero and never retroactively.

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::combat::{attack_hitbox, pursue};
use crate::domain::entity::{Actor, Flag};
use crate::domain::geom::Rect;
use crate::domain::quest::QuestStage;
use crate::domain::script;
use super::event::{EventChannel, GameEvent};
use super::layout::WorldLayout;
use super::quest;
use super::world::WorldState;

fn boss_bounds(world: &WorldState, cfg: &GameConfig) -> Rect {
    Rect::centered(world.boss().pos, cfg.boss.body_width, cfg.boss.body_height)
}

/// Handle a fresh `attack` press. Returns false while on cooldown.
///
/// Only a boss that is both enabled and awake can be hit; a dormant golem
/// is sealed and shrugs the slash off.
pub fn player_attack(world: &mut WorldState, cfg: &GameConfig, events: &mut EventChannel) -> bool {
    if world.player().attack_cooldown_ms > 0.0 {
        return false;
    }
    world.start_attack_cooldown(cfg.combat.attack_cooldown_ms);

    let p = world.player();
    let hitbox = attack_hitbox(p.pos, p.facing, cfg.combat.hit_box, cfg.combat.hit_offset);
    events.emit(GameEvent::AttackSwing {
        facing: p.facing,
        at: p.pos + p.facing.unit().scale(cfg.combat.hit_offset),
    });

    let boss = world.boss();
    if boss.active && boss.awake && hitbox.intersects(&boss_bounds(world, cfg)) {
        let attack = world.player().attack;
        damage_boss(world, attack, events);
    }
    true
}

/// Apply `amount` to the boss. Reaching zero runs the defeat sequence.
pub fn damage_boss(world: &mut WorldState, amount: i32, events: &mut EventChannel) {
    if !world.boss().active {
        return;
    }
    world.set_hp(Actor::Boss, -amount, events);
    events.emit(GameEvent::Damage { target: Actor::Boss, amount, at: world.boss().pos });
    debug!(hp = world.boss().hp, "boss_hit");
    if world.boss().hp <= 0 {
        defeat_boss(world, events);
    }
}

/// Disable the boss, drop the seed where it fell, move the quest on.
/// Runs at most once per session.
pub fn defeat_boss(world: &mut WorldState, events: &mut EventChannel) {
    let at = world.boss().pos;
    if !world.set_flag(Flag::GolemDefeated, true, events) {
        return;
    }
    info!(x = at.x, y = at.y, "boss_defeated");
    events.emit(GameEvent::BossDefeated { at });
    events.say(script::GOLEM_DEFEATED);
    quest::log_entry(world, script::LOG_GOLEM_DEFEATED, events);
    world.reveal_seed(at);
    if let Err(e) = quest::advance(world, QuestStage::SeedFound, None, events) {
        warn!(error = %e, "boss_defeat_advance_failed");
    }
    events.request_checkpoint();
}

/// Awake boss: walk straight at the player, strike on contact when the
/// melee cooldown has run out. The cooldown restarts on every swing, even
/// one the player's invulnerability absorbs.
pub fn update_boss(
    world: &mut WorldState,
    cfg: &GameConfig,
    layout: &WorldLayout,
    dt_ms: f32,
    events: &mut EventChannel,
) {
    let boss = world.boss();
    if !boss.active || !boss.awake {
        return;
    }
    let target = world.player().pos;
    let next = pursue(boss.pos, target, cfg.boss.speed, dt_ms);
    world.move_boss(next);

    let distance = next.distance(target);
    if distance < cfg.boss.contact_range && world.boss().attack_cooldown_ms <= 0.0 {
        world.start_boss_cooldown(cfg.boss.attack_cooldown_ms);
        damage_player(world, cfg.boss.damage, cfg, layout, events);
    }
}

/// Hurt the player. Rejected outright while invulnerable. Dropping to zero
/// staggers: full heal, back to spawn, longer grace window.
pub fn damage_player(
    world: &mut WorldState,
    amount: i32,
    cfg: &GameConfig,
    layout: &WorldLayout,
    events: &mut EventChannel,
) -> bool {
    if world.player().is_invulnerable() {
        return false;
    }
    world.set_hp(Actor::Player, -amount, events);
    world.grant_invulnerability(cfg.combat.hurt_invulnerable_ms);
    events.emit(GameEvent::Damage { target: Actor::Player, amount, at: world.player().pos });

    if world.player().hp <= 0 {
        stagger(world, cfg, layout, events);
    }
    true
}

fn stagger(world: &mut WorldState, cfg: &GameConfig, layout: &WorldLayout, events: &mut EventChannel) {
    info!("player_staggered");
    let heal = world.player().max_hp - world.player().hp;
    world.set_hp(Actor::Player, heal, events);
    world.move_player(layout.player_spawn());
    world.grant_invulnerability(cfg.combat.respawn_invulnerable_ms);
    events.emit(GameEvent::PlayerStaggered);
    events.say(script::PLAYER_STAGGERED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Facing;
    use crate::domain::geom::Vec2;

    struct Rig {
        cfg: GameConfig,
        layout: WorldLayout,
        world: WorldState,
        ev: EventChannel,
    }

    fn rig() -> Rig {
        let cfg = GameConfig::default();
        let layout = WorldLayout::default();
        let world = WorldState::new(&cfg, &layout);
        Rig { cfg, layout, world, ev: EventChannel::new() }
    }

    /// Quest at `battle`, boss awake, player just right of it facing left.
    fn battle_rig() -> Rig {
        let mut r = rig();
        for stage in [QuestStage::Accepted, QuestStage::Attuned, QuestStage::Battle] {
            quest::advance(&mut r.world, stage, None, &mut r.ev).unwrap();
        }
        r.world.wake_boss();
        let boss = r.world.boss().pos;
        r.world.move_player(boss + Vec2::new(30.0, 0.0));
        r.world.face(Facing::Left);
        r.ev.drain();
        r.ev.take_checkpoint();
        r
    }

    #[test]
    fn seven_hits_defeat_the_boss() {
        let mut r = battle_rig();
        let mut hp_seen = vec![r.world.boss().hp];
        for _ in 0..7 {
            assert!(player_attack(&mut r.world, &r.cfg, &mut r.ev));
            hp_seen.push(r.world.boss().hp);
            r.world.tick_timers(360.0);
        }
        assert_eq!(hp_seen, vec![14, 12, 10, 8, 6, 4, 2, 0]);
        assert!(r.world.flags().golem_defeated);
        assert!(!r.world.boss().active);
        assert!(r.world.seed().active);
        assert_eq!(r.world.seed().pos, r.world.boss().pos);
        assert_eq!(r.world.stage(), QuestStage::SeedFound);
        assert!(r.ev.take_checkpoint());
        assert!(!r.world.hud().boss_alive);

        let defeats = r.ev.iter().filter(|e| matches!(e, GameEvent::BossDefeated { .. })).count();
        assert_eq!(defeats, 1);
    }

    #[test]
    fn hits_after_defeat_do_nothing() {
        let mut r = battle_rig();
        for _ in 0..7 {
            player_attack(&mut r.world, &r.cfg, &mut r.ev);
            r.world.tick_timers(400.0);
        }
        let log_len = r.world.quest().log.len();
        player_attack(&mut r.world, &r.cfg, &mut r.ev);
        defeat_boss(&mut r.world, &mut r.ev);
        assert_eq!(r.world.quest().log.len(), log_len);
        assert_eq!(r.world.stage(), QuestStage::SeedFound);
        assert_eq!(r.world.boss().hp, 0);
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut r = battle_rig();
        assert!(player_attack(&mut r.world, &r.cfg, &mut r.ev));
        r.world.tick_timers(359.0);
        assert!(!player_attack(&mut r.world, &r.cfg, &mut r.ev));
        assert_eq!(r.world.boss().hp, 12);
        r.world.tick_timers(1.0);
        assert!(player_attack(&mut r.world, &r.cfg, &mut r.ev));
        assert_eq!(r.world.boss().hp, 10);
    }

    #[test]
    fn facing_away_misses() {
        let mut r = battle_rig();
        r.world.face(Facing::Right);
        assert!(player_attack(&mut r.world, &r.cfg, &mut r.ev));
        assert_eq!(r.world.boss().hp, 14);
        assert!(r.ev.iter().any(|e| matches!(e, GameEvent::AttackSwing { facing: Facing::Right, .. })));
    }

    #[test]
    fn dormant_boss_cannot_be_hurt() {
        let mut r = rig();
        let boss = r.world.boss().pos;
        r.world.move_player(boss + Vec2::new(0.0, 30.0));
        r.world.face(Facing::Up);
        player_attack(&mut r.world, &r.cfg, &mut r.ev);
        assert_eq!(r.world.boss().hp, 14);
    }

    #[test]
    fn invulnerability_window_scenario() {
        let mut r = rig();
        assert!(damage_player(&mut r.world, 2, &r.cfg, &r.layout, &mut r.ev));
        assert_eq!(r.world.player().hp, 6);
        assert_eq!(r.world.player().invulnerable_ms, 800.0);

        r.world.tick_timers(200.0);
        let timer = r.world.player().invulnerable_ms;
        assert!(!damage_player(&mut r.world, 2, &r.cfg, &r.layout, &mut r.ev));
        assert_eq!(r.world.player().hp, 6);
        assert_eq!(r.world.player().invulnerable_ms, timer);

        r.world.tick_timers(700.0);
        assert!(damage_player(&mut r.world, 2, &r.cfg, &r.layout, &mut r.ev));
        assert_eq!(r.world.player().hp, 4);
    }

    #[test]
    fn lethal_damage_staggers_instead_of_ending() {
        let mut r = rig();
        r.world.move_player(Vec2::new(5.0, 5.0));
        damage_player(&mut r.world, 100, &r.cfg, &r.layout, &mut r.ev);
        assert_eq!(r.world.player().hp, 8);
        assert_eq!(r.world.player().pos, r.layout.player_spawn());
        assert_eq!(r.world.player().invulnerable_ms, 1200.0);
        assert!(r.ev.iter().any(|e| *e == GameEvent::PlayerStaggered));
    }

    #[test]
    fn awake_boss_closes_in_and_strikes_on_cooldown() {
        let mut r = battle_rig();
        let start = r.world.boss().pos;
        r.world.move_player(start + Vec2::new(200.0, 0.0));
        update_boss(&mut r.world, &r.cfg, &r.layout, 1000.0, &mut r.ev);
        assert!((r.world.boss().pos.x - (start.x + 70.0)).abs() < 1e-3);
        assert_eq!(r.world.player().hp, 8);

        r.world.move_player(r.world.boss().pos + Vec2::new(20.0, 0.0));
        update_boss(&mut r.world, &r.cfg, &r.layout, 16.0, &mut r.ev);
        assert_eq!(r.world.player().hp, 6);
        assert_eq!(r.world.boss().attack_cooldown_ms, 1200.0);

        // Still in contact but on cooldown
        r.world.tick_timers(900.0);
        update_boss(&mut r.world, &r.cfg, &r.layout, 16.0, &mut r.ev);
        assert_eq!(r.world.player().hp, 6);
    }

    #[test]
    fn blocked_swing_still_restarts_cooldown() {
        let mut r = battle_rig();
        r.world.grant_invulnerability(500.0);
        r.world.move_player(r.world.boss().pos + Vec2::new(20.0, 0.0));
        update_boss(&mut r.world, &r.cfg, &r.layout, 16.0, &mut r.ev);
        assert_eq!(r.world.player().hp, 8);
        assert_eq!(r.world.boss().attack_cooldown_ms, 1200.0);
        assert!(!r.ev.iter().any(|e| matches!(e, GameEvent::Damage { target: Actor::Player, .. })));
    }

    #[test]
    fn dormant_boss_stays_put() {
        let mut r = rig();
        let start = r.world.boss().pos;
        r.world.move_player(start + Vec2::new(10.0, 0.0));
        update_boss(&mut r.world, &r.cfg, &r.layout, 1000.0, &mut r.ev);
        assert_eq!(r.world.boss().pos, start);
        assert_eq!(r.world.player().hp, 8);
    }
}
