/// Line-based presentation: prints simulation events to the terminal.
///
/// Raw mode is on, so every line ends in `\r\n`. HUD updates are only
/// printed when something in them changed; dialogue is shown one line at
/// a time straight from the queue.

use std::io::{self, Stdout, Write};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{cursor, execute, queue, style::Print, terminal};

use crate::domain::entity::Actor;
use crate::sim::event::{DialogueQueue, GameEvent, HudPayload};

pub struct Console<W: Write> {
    out: W,
    last_hud: Option<HudPayload>,
    last_line: Option<(String, String)>,
    enhanced: bool,
}

impl Console<Stdout> {
    pub fn stdout() -> Self {
        Console::new(io::stdout())
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Console { out, last_hud: None, last_line: None, enhanced: false }
    }

    /// Enter raw mode. Returns whether key release events will be reported.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(self.out, cursor::Hide)?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }
        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.out, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.out, cursor::Show)?;
        terminal::disable_raw_mode()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text), Print("\r\n"))
    }

    pub fn render_events(&mut self, events: &[GameEvent]) -> io::Result<()> {
        for event in events {
            if let GameEvent::HudUpdate(hud) = event {
                if self.last_hud.as_ref() == Some(hud) {
                    continue;
                }
                self.last_hud = Some(hud.clone());
            }
            if let Some(text) = describe(event) {
                self.line(&text)?;
            }
        }
        self.out.flush()
    }

    /// Print the queue's current line if it changed since last call.
    pub fn render_dialogue(&mut self, dialogue: &DialogueQueue) -> io::Result<()> {
        let current = dialogue.current().map(|(s, l)| (s.to_string(), l.to_string()));
        if current == self.last_line {
            return Ok(());
        }
        if let Some((speaker, line)) = &current {
            let text = format!("  {speaker}: {line}   [enter]");
            self.line(&text)?;
        }
        self.last_line = current;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// One printable line per event. Dialogue goes through the queue instead.
pub fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::HudUpdate(h) => {
            let boss = if h.boss_alive {
                format!("golem {}", h.boss_hp)
            } else {
                "golem calmed".to_string()
            };
            let seed = if h.has_seed { "  [seed]" } else { "" };
            Some(format!(
                "HP {}/{}  ATK {}  quest {}  {boss}{seed}",
                h.hp, h.max_hp, h.attack, h.quest_stage
            ))
        }
        GameEvent::QuestUpdate { description, .. } => Some(format!("Quest: {description}")),
        GameEvent::Dialogue { .. } => None,
        GameEvent::InteractionAvailable(Some(prompt)) => Some(format!("({prompt})")),
        GameEvent::InteractionAvailable(None) => None,
        GameEvent::SystemMessage(text) => Some(format!("* {text}")),
        GameEvent::QuestLog(entry) => Some(format!("Log: {entry}")),
        GameEvent::AttackSwing { .. } => None,
        GameEvent::Damage { target, amount, .. } => Some(match target {
            Actor::Player => format!("You take {amount} damage."),
            Actor::Boss => format!("The golem takes {amount} damage."),
        }),
        GameEvent::BossDefeated { .. } => Some("The golem crumbles.".to_string()),
        GameEvent::SeedCollected { .. } => None,
        GameEvent::PlayerStaggered => Some("You stagger back to the village.".to_string()),
    }
}
