/// Quest progression and the dialogue actions that drive it.

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entity::Flag;
use crate::domain::quest::{QuestEntry, QuestStage};
use crate::domain::script;
use super::event::{EventChannel, GameEvent};
use super::wall_clock_ms;
use super::world::WorldState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestError {
    #[error("cannot advance quest from {from} to {to}: not the next stage")]
    NotSuccessor { from: QuestStage, to: QuestStage },
}

/// Advance the live quest by exactly one stage.
///
/// On success: description is recomputed, `entry` (if any) goes to the log,
/// a `quest-update` is emitted and a checkpoint is requested.
pub fn advance(
    world: &mut WorldState,
    target: QuestStage,
    entry: Option<&str>,
    events: &mut EventChannel,
) -> Result<(), QuestError> {
    let from = world.stage();
    if !world.set_stage(target, events) {
        warn!(%from, to = %target, "quest_transition_rejected");
        return Err(QuestError::NotSuccessor { from, to: target });
    }
    info!(%from, to = %target, "quest_advanced");
    if let Some(text) = entry {
        log_entry(world, text, events);
    }
    events.emit(GameEvent::QuestUpdate {
        stage: target,
        description: world.quest().description.to_string(),
    });
    events.request_checkpoint();
    Ok(())
}

/// Append to the quest log and tell the presentation layer.
pub fn log_entry(world: &mut WorldState, text: &str, events: &mut EventChannel) {
    world.push_log(QuestEntry { text: text.to_string(), timestamp_ms: wall_clock_ms() });
    events.emit(GameEvent::QuestLog(text.to_string()));
}

/// Current stage + description, as sent in `quest-update`.
pub fn status_event(world: &WorldState) -> GameEvent {
    GameEvent::QuestUpdate {
        stage: world.stage(),
        description: world.quest().description.to_string(),
    }
}

pub fn talk_to_elder(world: &mut WorldState, events: &mut EventChannel) {
    let stage = world.stage();
    events.say(script::elder(stage));
    let result = match stage {
        QuestStage::Intro => advance(world, QuestStage::Accepted, None, events),
        QuestStage::SeedFound => {
            let r = advance(world, QuestStage::Completed, None, events);
            world.set_flag(Flag::GroveAwakened, true, events);
            events.request_checkpoint();
            r
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!(error = %e, "elder_dialogue_advance_failed");
    }
}

/// First read rewards a log entry and a checkpoint; later reads only
/// get the "already read" branch.
pub fn inspect_lore(world: &mut WorldState, events: &mut EventChannel) {
    if world.flags().lore_stone_read {
        events.say(script::LORE_ALREADY_READ);
        return;
    }
    world.set_flag(Flag::LoreStoneRead, true, events);
    events.say(script::LORE_FIRST_READ);
    log_entry(world, script::LOG_LORE_READ, events);
    events.request_checkpoint();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::layout::WorldLayout;

    fn fresh() -> WorldState {
        WorldState::new(&GameConfig::default(), &WorldLayout::default())
    }

    fn names(events: &mut EventChannel) -> Vec<&'static str> {
        events.drain().iter().map(GameEvent::name).collect()
    }

    #[test]
    fn advance_updates_description_log_and_requests_checkpoint() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        advance(&mut w, QuestStage::Accepted, Some("took the task"), &mut ev).unwrap();
        assert_eq!(w.stage(), QuestStage::Accepted);
        assert_eq!(w.quest().description, QuestStage::Accepted.description());
        assert_eq!(w.quest().log.len(), 1);
        assert_eq!(w.quest().log[0].text, "took the task");
        assert!(ev.checkpoint_pending());
        assert!(ev.iter().any(|e| matches!(e,
            GameEvent::QuestUpdate { stage: QuestStage::Accepted, .. })));
    }

    #[test]
    fn skipping_and_regressing_are_rejected() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        let err = advance(&mut w, QuestStage::Battle, None, &mut ev).unwrap_err();
        assert_eq!(err, QuestError::NotSuccessor { from: QuestStage::Intro, to: QuestStage::Battle });
        assert!(advance(&mut w, QuestStage::Intro, None, &mut ev).is_err());
        assert_eq!(w.stage(), QuestStage::Intro);
        assert!(!ev.checkpoint_pending());
        assert!(ev.is_empty());
    }

    #[test]
    fn elder_at_intro_accepts_the_quest() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        talk_to_elder(&mut w, &mut ev);
        assert_eq!(w.stage(), QuestStage::Accepted);
        assert_eq!(names(&mut ev), ["dialogue", "hud-update", "quest-update"]);
    }

    #[test]
    fn elder_repeats_hint_without_advancing() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        advance(&mut w, QuestStage::Accepted, None, &mut ev).unwrap();
        ev.drain();
        ev.take_checkpoint();
        talk_to_elder(&mut w, &mut ev);
        talk_to_elder(&mut w, &mut ev);
        assert_eq!(w.stage(), QuestStage::Accepted);
        assert_eq!(names(&mut ev), ["dialogue", "dialogue"]);
        assert!(!ev.checkpoint_pending());
    }

    #[test]
    fn elder_completes_quest_from_seed_found() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        for stage in [QuestStage::Accepted, QuestStage::Attuned, QuestStage::Battle, QuestStage::SeedFound] {
            advance(&mut w, stage, None, &mut ev).unwrap();
        }
        talk_to_elder(&mut w, &mut ev);
        assert_eq!(w.stage(), QuestStage::Completed);
        assert!(w.flags().grove_awakened);
        talk_to_elder(&mut w, &mut ev);
        assert_eq!(w.stage(), QuestStage::Completed);
    }

    #[test]
    fn lore_reward_is_given_once() {
        let mut w = fresh();
        let mut ev = EventChannel::new();
        inspect_lore(&mut w, &mut ev);
        assert!(w.flags().lore_stone_read);
        assert_eq!(w.quest().log.len(), 1);
        assert!(ev.take_checkpoint());
        let first = ev.drain();
        assert_eq!(first[0], GameEvent::dialogue(script::LORE_FIRST_READ));

        inspect_lore(&mut w, &mut ev);
        assert_eq!(w.quest().log.len(), 1);
        assert!(!ev.checkpoint_pending());
        assert_eq!(ev.drain(), vec![GameEvent::dialogue(script::LORE_ALREADY_READ)]);
    }
}
