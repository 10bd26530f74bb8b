/// Story beacons: one-shot, location-triggered events.
///
/// A beacon latches the first time the player comes within
/// `radius + BEACON_TOLERANCE` tiles of its center, whether or not the
/// quest is in a state where it does anything. The effect table below
/// only looks at the public stage and world flags.

use tracing::{debug, info, warn};

use crate::domain::entity::Flag;
use crate::domain::quest::QuestStage;
use crate::domain::script;
use super::event::EventChannel;
use super::layout::WorldLayout;
use super::quest;
use super::world::WorldState;

/// Extra reach in tiles, so standing on the rim does not flicker.
pub const BEACON_TOLERANCE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct StoryBeacon {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    triggered: bool,
}

impl StoryBeacon {
    pub fn new(id: &str, x: f32, y: f32, radius: f32) -> Self {
        StoryBeacon { id: id.to_string(), x, y, radius, triggered: false }
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }
}

#[derive(Debug, Default)]
pub struct BeaconResolver {
    beacons: Vec<StoryBeacon>,
}

impl BeaconResolver {
    pub fn from_layout(layout: &WorldLayout) -> Self {
        BeaconResolver {
            beacons: layout.beacons.iter()
                .map(|b| StoryBeacon::new(&b.id, b.x, b.y, b.radius))
                .collect(),
        }
    }

    pub fn beacons(&self) -> &[StoryBeacon] {
        &self.beacons
    }

    pub fn update(&mut self, world: &mut WorldState, layout: &WorldLayout, events: &mut EventChannel) {
        let p = layout.to_tiles(world.player().pos);
        for beacon in self.beacons.iter_mut().filter(|b| !b.triggered) {
            let dx = p.x - beacon.x;
            let dy = p.y - beacon.y;
            if (dx * dx + dy * dy).sqrt() <= beacon.radius + BEACON_TOLERANCE {
                beacon.triggered = true;
                debug!(id = %beacon.id, "beacon_triggered");
                fire(&beacon.id, world, events);
            }
        }
    }

    /// Latch and dispatch a beacon regardless of distance. A beacon that
    /// already fired does nothing.
    pub fn trigger(&mut self, id: &str, world: &mut WorldState, events: &mut EventChannel) -> bool {
        match self.beacons.iter_mut().find(|b| b.id == id && !b.triggered) {
            Some(beacon) => {
                beacon.triggered = true;
                fire(id, world, events);
                true
            }
            None => false,
        }
    }
}

/// Beacon effects, gated on stage and flags. Anything not matched is a
/// spent beacon with no gameplay effect.
fn fire(id: &str, world: &mut WorldState, events: &mut EventChannel) {
    match id {
        "pond" if world.stage() == QuestStage::Accepted && !world.flags().pond_visited => {
            world.set_flag(Flag::PondVisited, true, events);
            events.say(script::POND_ATTUNED);
            if let Err(e) = quest::advance(world, QuestStage::Attuned, Some(script::LOG_POND_ATTUNED), events) {
                warn!(error = %e, "pond_beacon_advance_failed");
            }
        }
        "groveEntrance" if world.stage() == QuestStage::Attuned && !world.boss().awake => {
            world.set_flag(Flag::GroveAwakened, true, events);
            events.say(script::GOLEM_WAKES);
            quest::log_entry(world, script::LOG_GOLEM_WOKE, events);
            if world.wake_boss() {
                info!("boss_awake");
            }
            if let Err(e) = quest::advance(world, QuestStage::Battle, None, events) {
                warn!(error = %e, "grove_beacon_advance_failed");
            }
            events.request_checkpoint();
        }
        _ => debug!(%id, stage = %world.stage(), "beacon_spent_without_effect"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::geom::Vec2;

    fn setup() -> (WorldState, BeaconResolver, WorldLayout) {
        let layout = WorldLayout::default();
        let world = WorldState::new(&GameConfig::default(), &layout);
        (world, BeaconResolver::from_layout(&layout), layout)
    }

    fn stand_on(world: &mut WorldState, layout: &WorldLayout, id: &str) {
        let b = layout.beacons.iter().find(|b| b.id == id).unwrap();
        world.move_player(Vec2::new(b.x * layout.tile_size, b.y * layout.tile_size));
    }

    fn to_stage(world: &mut WorldState, stage: QuestStage) {
        let mut ev = EventChannel::new();
        while world.stage() < stage {
            let next = world.stage().next().unwrap();
            quest::advance(world, next, None, &mut ev).unwrap();
        }
    }

    #[test]
    fn pond_advances_when_quest_accepted() {
        let (mut w, mut r, layout) = setup();
        let mut ev = EventChannel::new();
        to_stage(&mut w, QuestStage::Accepted);
        stand_on(&mut w, &layout, "pond");
        r.update(&mut w, &layout, &mut ev);
        assert_eq!(w.stage(), QuestStage::Attuned);
        assert!(w.flags().pond_visited);
        assert_eq!(w.quest().log.len(), 1);
    }

    #[test]
    fn pond_too_early_latches_without_effect() {
        let (mut w, mut r, layout) = setup();
        let mut ev = EventChannel::new();
        stand_on(&mut w, &layout, "pond");
        r.update(&mut w, &layout, &mut ev);
        assert!(r.beacons().iter().find(|b| b.id == "pond").unwrap().triggered());
        assert_eq!(w.stage(), QuestStage::Intro);
        assert!(!w.flags().pond_visited);

        // Spent: reaching the right stage later does not re-fire it.
        to_stage(&mut w, QuestStage::Accepted);
        r.update(&mut w, &layout, &mut ev);
        assert_eq!(w.stage(), QuestStage::Accepted);
    }

    #[test]
    fn second_trigger_changes_nothing() {
        let (mut w, mut r, _) = setup();
        let mut ev = EventChannel::new();
        to_stage(&mut w, QuestStage::Accepted);
        assert!(r.trigger("pond", &mut w, &mut ev));
        let after_first = w.clone();
        ev.drain();
        assert!(!r.trigger("pond", &mut w, &mut ev));
        assert_eq!(w, after_first);
        assert!(ev.is_empty());
    }

    #[test]
    fn grove_entrance_wakes_the_boss() {
        let (mut w, mut r, layout) = setup();
        let mut ev = EventChannel::new();
        to_stage(&mut w, QuestStage::Attuned);
        stand_on(&mut w, &layout, "groveEntrance");
        r.update(&mut w, &layout, &mut ev);
        assert!(w.boss().awake);
        assert!(w.flags().grove_awakened);
        assert_eq!(w.stage(), QuestStage::Battle);
        assert!(ev.take_checkpoint());
    }

    #[test]
    fn tolerance_extends_reach() {
        let (mut w, mut r, layout) = setup();
        let mut ev = EventChannel::new();
        let b = layout.beacons.iter().find(|b| b.id == "pond").unwrap().clone();
        let reach = b.radius + BEACON_TOLERANCE;
        w.move_player(Vec2::new((b.x + reach - 0.01) * layout.tile_size, b.y * layout.tile_size));
        r.update(&mut w, &layout, &mut ev);
        assert!(r.beacons()[0].triggered());

        let (mut w, mut r, layout) = setup();
        w.move_player(Vec2::new((b.x + reach + 0.1) * layout.tile_size, b.y * layout.tile_size));
        r.update(&mut w, &layout, &mut ev);
        assert!(!r.beacons()[0].triggered());
    }

    #[test]
    fn unknown_beacon_ids_are_harmless() {
        let mut layout = WorldLayout::default();
        layout.beacons.push(crate::sim::layout::BeaconDef {
            id: "mystery".into(), x: 1.0, y: 1.0, radius: 1.0,
        });
        let mut w = WorldState::new(&GameConfig::default(), &layout);
        let mut r = BeaconResolver::from_layout(&layout);
        let mut ev = EventChannel::new();
        let before = w.clone();
        assert!(r.trigger("mystery", &mut w, &mut ev));
        assert_eq!(w, before);
    }
}
