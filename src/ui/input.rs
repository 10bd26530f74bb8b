/// Terminal key tracking and the mapping to `FrameInput`.
///
/// Held keys drive movement; fresh presses drive the edge signals.
/// Terminals that do not report key release fall back to a hold timeout.
///
/// Bindings:
///   arrows / wasd    move        WASD (shifted)  move + run
///   space / j        attack      e               interact
///   p                save        l               load
///   X (shifted)      erase save
///   enter            advance dialogue

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::FrameInput;
use crate::domain::geom::Vec2;

/// After this long without a Press/Repeat event the key counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const RUN: &[KeyCode] = &[KeyCode::Char('W'), KeyCode::Char('A'), KeyCode::Char('S'), KeyCode::Char('D')];
const ATTACK: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Char('J')];
const INTERACT: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const SAVE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const LOAD: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const ADVANCE: &[KeyCode] = &[KeyCode::Enter];
const CLEAR: &[KeyCode] = &[KeyCode::Char('X')];

pub struct InputState {
    last_active: HashMap<KeyCode, Instant>,
    fresh_presses: Vec<KeyCode>,
    /// Shift seen on an arrow key since the last drain.
    shifted: bool,
    pub raw_events: Vec<KeyEvent>,
    /// Only true once keyboard enhancement is confirmed.
    pub honor_release: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            shifted: false,
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Read every pending terminal event without blocking. Once per frame.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.shifted = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                match key.kind {
                    KeyEventKind::Release if self.honor_release => {
                        self.last_active.remove(&key.code);
                    }
                    KeyEventKind::Release => {}
                    _ => {
                        if key.modifiers.contains(KeyModifiers::SHIFT) {
                            self.shifted = true;
                        }
                        self.record_press(key.code, Instant::now());
                    }
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub(crate) fn record_press(&mut self, code: KeyCode, at: Instant) {
        let was_held = self.is_held(code);
        self.last_active.insert(code, at);
        if !was_held {
            self.fresh_presses.push(code);
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn quit_pressed(&self) -> bool {
        self.was_pressed(KeyCode::Esc) || self.ctrl_c_pressed()
    }

    pub fn advance_pressed(&self) -> bool {
        self.any_pressed(ADVANCE)
    }

    pub fn clear_pressed(&self) -> bool {
        self.any_pressed(CLEAR)
    }

    /// Movement as a unit-or-zero vector. Opposing keys cancel.
    pub fn movement(&self) -> Vec2 {
        let axis = |neg: &[KeyCode], pos: &[KeyCode]| -> f32 {
            match (self.any_held(neg), self.any_held(pos)) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        };
        Vec2::new(axis(LEFT, RIGHT), axis(UP, DOWN)).normalized()
    }

    pub fn frame_input(&self) -> FrameInput {
        FrameInput {
            movement: self.movement(),
            run: self.shifted || self.any_held(RUN),
            attack: self.any_pressed(ATTACK),
            interact: self.any_pressed(INTERACT),
            save: self.any_pressed(SAVE),
            load: self.any_pressed(LOAD),
        }
    }
}
