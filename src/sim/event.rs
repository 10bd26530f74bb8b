/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD, dialogue, and effects.
///
/// Payloads are owned copies; nothing here borrows live state.

use std::collections::VecDeque;

use crate::domain::entity::{Actor, Facing};
use crate::domain::geom::Vec2;
use crate::domain::quest::QuestStage;
use crate::domain::script::Speech;

/// Read-only projection of player-visible stats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudPayload {
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub quest_stage: QuestStage,
    pub has_seed: bool,
    pub boss_hp: i32,
    pub boss_alive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    HudUpdate(HudPayload),
    QuestUpdate { stage: QuestStage, description: String },
    Dialogue { speaker: String, lines: Vec<String> },
    InteractionAvailable(Option<String>),
    SystemMessage(String),
    QuestLog(String),
    // Visual-only
    AttackSwing { facing: Facing, at: Vec2 },
    Damage { target: Actor, amount: i32, at: Vec2 },
    BossDefeated { at: Vec2 },
    SeedCollected { at: Vec2 },
    PlayerStaggered,
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::HudUpdate(_) => "hud-update",
            GameEvent::QuestUpdate { .. } => "quest-update",
            GameEvent::Dialogue { .. } => "dialogue",
            GameEvent::InteractionAvailable(_) => "interaction-available",
            GameEvent::SystemMessage(_) => "system-message",
            GameEvent::QuestLog(_) => "quest-log",
            GameEvent::AttackSwing { .. } => "attack-swing",
            GameEvent::Damage { .. } => "damage",
            GameEvent::BossDefeated { .. } => "boss-defeated",
            GameEvent::SeedCollected { .. } => "seed-collected",
            GameEvent::PlayerStaggered => "player-staggered",
        }
    }

    pub fn dialogue(speech: Speech) -> Self {
        GameEvent::Dialogue {
            speaker: speech.speaker.to_string(),
            lines: speech.lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Outbound queue, core → presentation. Also carries the pending
/// checkpoint request, which never leaves the core.
#[derive(Debug, Default)]
pub struct EventChannel {
    queue: VecDeque<GameEvent>,
    checkpoint: bool,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.queue.push_back(event);
    }

    pub fn say(&mut self, speech: Speech) {
        self.emit(GameEvent::dialogue(speech));
    }

    pub fn system_message(&mut self, text: &str) {
        self.emit(GameEvent::SystemMessage(text.to_string()));
    }

    /// Take every pending event in emission order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.queue.iter()
    }

    pub fn request_checkpoint(&mut self) {
        self.checkpoint = true;
    }

    pub fn checkpoint_pending(&self) -> bool {
        self.checkpoint
    }

    /// Clear and return the pending checkpoint request.
    pub fn take_checkpoint(&mut self) -> bool {
        std::mem::take(&mut self.checkpoint)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct DialogueBlock {
    speaker: String,
    lines: Vec<String>,
}

/// Sequential dialogue consumer: one current line at a time, advanced only
/// by an explicit edge from the presentation side.
#[derive(Debug, Default)]
pub struct DialogueQueue {
    pending: VecDeque<DialogueBlock>,
    current: Option<(DialogueBlock, usize)>,
}

impl DialogueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, speaker: &str, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.pending.push_back(DialogueBlock {
            speaker: speaker.to_string(),
            lines: lines.to_vec(),
        });
        if self.current.is_none() {
            self.show_next();
        }
    }

    /// Feed every `dialogue` event in `events` into the queue, in order.
    pub fn absorb(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::Dialogue { speaker, lines } = event {
                self.enqueue(speaker, lines);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// `(speaker, line)` currently on screen.
    pub fn current(&self) -> Option<(&str, &str)> {
        self.current
            .as_ref()
            .map(|(block, idx)| (block.speaker.as_str(), block.lines[*idx].as_str()))
    }

    /// Step to the next line, or the next queued block. Returns whether a
    /// line is still showing afterwards.
    pub fn advance(&mut self) -> bool {
        if let Some((block, idx)) = self.current.as_mut() {
            if *idx + 1 < block.lines.len() {
                *idx += 1;
                return true;
            }
        }
        self.show_next();
        self.current.is_some()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.current = None;
    }

    fn show_next(&mut self) {
        self.current = self.pending.pop_front().map(|block| (block, 0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::script;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn channel_preserves_order_and_drains() {
        let mut ch = EventChannel::new();
        ch.system_message("a");
        ch.emit(GameEvent::QuestLog("b".into()));
        ch.say(script::RESUMED);
        let names: Vec<&str> = ch.iter().map(GameEvent::name).collect();
        assert_eq!(names, ["system-message", "quest-log", "dialogue"]);
        assert_eq!(ch.drain().len(), 3);
        assert!(ch.is_empty());
    }

    #[test]
    fn checkpoint_request_is_taken_once() {
        let mut ch = EventChannel::new();
        assert!(!ch.take_checkpoint());
        ch.request_checkpoint();
        ch.request_checkpoint();
        assert!(ch.checkpoint_pending());
        assert!(ch.take_checkpoint());
        assert!(!ch.take_checkpoint());
    }

    #[test]
    fn dialogue_walks_lines_then_blocks() {
        let mut q = DialogueQueue::new();
        assert!(!q.is_active());
        q.enqueue("Elder", &lines(&["one", "two"]));
        q.enqueue("Nova", &lines(&["three"]));
        assert_eq!(q.current(), Some(("Elder", "one")));
        assert!(q.advance());
        assert_eq!(q.current(), Some(("Elder", "two")));
        assert!(q.advance());
        assert_eq!(q.current(), Some(("Nova", "three")));
        assert!(!q.advance());
        assert_eq!(q.current(), None);
        assert!(!q.advance());
    }

    #[test]
    fn enqueue_while_active_does_not_interrupt() {
        let mut q = DialogueQueue::new();
        q.enqueue("A", &lines(&["first"]));
        q.enqueue("B", &lines(&["second"]));
        assert_eq!(q.current(), Some(("A", "first")));
    }

    #[test]
    fn empty_blocks_are_skipped() {
        let mut q = DialogueQueue::new();
        q.enqueue("A", &[]);
        assert!(!q.is_active());
    }

    #[test]
    fn absorb_picks_only_dialogue_events() {
        let mut q = DialogueQueue::new();
        q.absorb(&[
            GameEvent::SystemMessage("x".into()),
            GameEvent::dialogue(script::OPENING),
        ]);
        assert_eq!(q.current().map(|(s, _)| s), Some(script::ELDER));
    }
}
