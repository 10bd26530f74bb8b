/// Interaction resolver: nearest enabled point of interest in range,
/// fired on a fresh `interact` press.
///
/// Per tick:
///   1. Measure distance from the player to every enabled interactable
///   2. Keep the closest one strictly inside its own radius
///   3. Emit `interaction-available` only when the selection changes
///   4. On an `interact` edge, dispatch the selection's kind

use crate::domain::geom::Vec2;
use super::event::{EventChannel, GameEvent};
use super::layout::{InteractionKind, WorldLayout};
use super::quest;
use super::world::WorldState;

#[derive(Clone, Debug, PartialEq)]
pub struct Interactable {
    pub id: String,
    pub kind: InteractionKind,
    pub pos: Vec2,
    pub radius: f32,
    pub prompt: String,
    pub enabled: bool,
}

#[derive(Debug, Default)]
pub struct InteractionResolver {
    interactables: Vec<Interactable>,
    selected: Option<usize>,
}

impl InteractionResolver {
    pub fn from_layout(layout: &WorldLayout) -> Self {
        let interactables = layout.interactables.iter()
            .map(|def| Interactable {
                id: def.id.clone(),
                kind: def.kind,
                pos: layout.anchor_for(def.kind),
                radius: def.radius,
                prompt: def.prompt.clone(),
                enabled: true,
            })
            .collect();
        InteractionResolver { interactables, selected: None }
    }

    pub fn selected(&self) -> Option<&Interactable> {
        self.selected.map(|i| &self.interactables[i])
    }

    /// Run one tick. `interact` is the edge-triggered input for this frame.
    pub fn update(&mut self, world: &mut WorldState, interact: bool, events: &mut EventChannel) {
        let player = world.player().pos;
        let nearest = self.nearest(player);

        if nearest != self.selected {
            self.selected = nearest;
            let prompt = nearest.map(|i| self.interactables[i].prompt.clone());
            events.emit(GameEvent::InteractionAvailable(prompt));
        }

        if interact {
            if let Some(i) = self.selected {
                dispatch(self.interactables[i].kind, world, events);
            }
        }
    }

    fn nearest(&self, player: Vec2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, it) in self.interactables.iter().enumerate() {
            if !it.enabled {
                continue;
            }
            let d = player.distance(it.pos);
            if d >= it.radius {
                continue;
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }
}

fn dispatch(kind: InteractionKind, world: &mut WorldState, events: &mut EventChannel) {
    match kind {
        InteractionKind::TalkElder => quest::talk_to_elder(world, events),
        InteractionKind::InspectLore => quest::inspect_lore(world, events),
    }
}
