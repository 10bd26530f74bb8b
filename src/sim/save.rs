/// Save and load game progress: one JSON slot, no versioning.
///
/// ## Shape
///
/// ```text
/// { player:    { x, y, hp, direction },
///   quest:     { stage },
///   inventory: { hasSeed },
///   world:     { golemDefeated, seedCollected, loreStoneRead,
///                pondVisited, groveAwakened, golemHp },
///   timestamp }
/// ```
///
/// Every field is optional on the way in. Reading is lenient per field: a
/// value of the wrong type is dropped on its own and the rest of the
/// snapshot still applies. Anything that is not a JSON object is treated
/// exactly like "no save".
///
/// Storage failures never reach the tick: `save_game` / `load_game` log
/// and collapse them to `false` / `None`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::entity::Facing;
use crate::domain::quest::{describe_raw, QuestStage};
use super::layout::WorldLayout;
use super::wall_clock_ms;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SaveSnapshot {
    pub player: PlayerSnapshot,
    pub quest: QuestSnapshot,
    pub inventory: InventorySnapshot,
    pub world: WorldSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Facing>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct QuestSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<QuestStage>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_seed: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golem_defeated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_collected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lore_stone_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pond_visited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grove_awakened: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golem_hp: Option<i32>,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save storage is unavailable")]
    Unavailable,
    #[error("save storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

// ══════════════════════════════════════════════════════════════
// Projection / reconciliation
// ══════════════════════════════════════════════════════════════

/// Project the persisted subset of `w`. Reads only.
pub fn serialize(w: &WorldState) -> SaveSnapshot {
    let p = w.player();
    let f = w.flags();
    SaveSnapshot {
        player: PlayerSnapshot {
            x: Some(p.pos.x),
            y: Some(p.pos.y),
            hp: Some(p.hp),
            direction: Some(p.facing),
        },
        quest: QuestSnapshot { stage: Some(w.stage()) },
        inventory: InventorySnapshot { has_seed: Some(w.inventory().has_seed) },
        world: WorldSnapshot {
            golem_defeated: Some(f.golem_defeated),
            seed_collected: Some(f.seed_collected),
            lore_stone_read: Some(f.lore_stone_read),
            pond_visited: Some(f.pond_visited),
            grove_awakened: Some(f.grove_awakened),
            golem_hp: Some(w.boss().hp),
        },
        timestamp: Some(wall_clock_ms()),
    }
}

/// Merge `snap` into `defaults` and recompute everything derived.
pub fn reconcile(mut defaults: WorldState, snap: &SaveSnapshot, layout: &WorldLayout) -> WorldState {
    defaults.apply_snapshot(snap);
    defaults.rederive(layout);
    defaults
}

pub fn encode(snap: &SaveSnapshot) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(snap)?)
}

/// Parse persisted text. `None` for anything that is not a JSON object.
pub fn deserialize(raw: &str) -> Option<SaveSnapshot> {
    let root: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "save_parse_failed");
            return None;
        }
    };
    if !root.is_object() {
        warn!("save_not_an_object");
        return None;
    }

    let stage = match root.pointer("/quest/stage").and_then(Value::as_str) {
        Some(raw_stage) => {
            let parsed = QuestStage::parse(raw_stage);
            if parsed.is_none() {
                warn!(stage = raw_stage, shown_as = describe_raw(raw_stage), "save_unknown_stage");
            }
            parsed
        }
        None => None,
    };

    Some(SaveSnapshot {
        player: PlayerSnapshot {
            x: number(&root, "/player/x"),
            y: number(&root, "/player/y"),
            hp: integer(&root, "/player/hp"),
            direction: root
                .pointer("/player/direction")
                .and_then(Value::as_str)
                .and_then(Facing::parse),
        },
        quest: QuestSnapshot { stage },
        inventory: InventorySnapshot { has_seed: flag(&root, "/inventory/hasSeed") },
        world: WorldSnapshot {
            golem_defeated: flag(&root, "/world/golemDefeated"),
            seed_collected: flag(&root, "/world/seedCollected"),
            lore_stone_read: flag(&root, "/world/loreStoneRead"),
            pond_visited: flag(&root, "/world/pondVisited"),
            grove_awakened: flag(&root, "/world/groveAwakened"),
            golem_hp: integer(&root, "/world/golemHp"),
        },
        timestamp: root.pointer("/timestamp").and_then(Value::as_u64),
    })
}

fn number(root: &Value, path: &str) -> Option<f32> {
    let v = root.pointer(path)?.as_f64()? as f32;
    v.is_finite().then_some(v)
}

fn integer(root: &Value, path: &str) -> Option<i32> {
    let v = root.pointer(path)?;
    if let Some(i) = v.as_i64() {
        return Some(i.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
    }
    let f = v.as_f64()?;
    f.is_finite().then(|| f.round() as i32)
}

fn flag(root: &Value, path: &str) -> Option<bool> {
    root.pointer(path)?.as_bool()
}

// ══════════════════════════════════════════════════════════════
// Storage
// ══════════════════════════════════════════════════════════════

/// A single persisted slot.
pub trait SaveStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<String>, SaveError>;
    fn write(&mut self, payload: &str) -> Result<(), SaveError>;
    fn clear(&mut self) -> Result<(), SaveError>;
}

/// JSON file on disk, written via temp file + rename.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: Option<PathBuf>,
}

impl FileStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        FileStore { path: Some(path.into()) }
    }

    /// `file_name` inside the first writable save directory.
    pub fn in_save_dir(file_name: &str) -> Self {
        match save_dir() {
            Some(dir) => Self::at(dir.join(file_name)),
            None => {
                warn!("no writable save directory");
                FileStore { path: None }
            }
        }
    }

    fn require_path(&self) -> Result<&Path, SaveError> {
        self.path.as_deref().ok_or(SaveError::Unavailable)
    }
}

impl SaveStore for FileStore {
    fn read(&self) -> Result<Option<String>, SaveError> {
        match fs::read_to_string(self.require_path()?) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, payload: &str) -> Result<(), SaveError> {
        write_atomic(self.require_path()?, payload.as_bytes())?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SaveError> {
        match fs::remove_file(self.require_path()?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot. Used for throwaway sessions and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails with `Unavailable`.
    pub fn unavailable() -> Self {
        MemoryStore { slot: None, unavailable: true }
    }

    pub fn with_payload(payload: &str) -> Self {
        MemoryStore { slot: Some(payload.to_string()), unavailable: false }
    }

    pub fn payload(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, SaveError> {
        if self.unavailable {
            return Err(SaveError::Unavailable);
        }
        Ok(self.slot.clone())
    }

    fn write(&mut self, payload: &str) -> Result<(), SaveError> {
        if self.unavailable {
            return Err(SaveError::Unavailable);
        }
        self.slot = Some(payload.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SaveError> {
        if self.unavailable {
            return Err(SaveError::Unavailable);
        }
        self.slot = None;
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════
// Fail-soft façade
// ══════════════════════════════════════════════════════════════

pub fn save_game<S: SaveStore + ?Sized>(store: &mut S, snap: &SaveSnapshot) -> bool {
    let result = encode(snap).and_then(|text| store.write(&text));
    match result {
        Ok(()) => {
            info!(stage = ?snap.quest.stage, "checkpoint_saved");
            true
        }
        Err(e) => {
            warn!(error = %e, "save_failed");
            false
        }
    }
}

pub fn load_game<S: SaveStore + ?Sized>(store: &S) -> Option<SaveSnapshot> {
    match store.read() {
        Ok(Some(text)) => deserialize(&text),
        Ok(None) => {
            debug!("no_save_present");
            None
        }
        Err(e) => {
            warn!(error = %e, "load_failed");
            None
        }
    }
}

pub fn clear_save<S: SaveStore + ?Sized>(store: &mut S) -> bool {
    match store.clear() {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "clear_save_failed");
            false
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> Option<PathBuf> {
    // 1. Exe directory, if writable (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let marker = parent.join(".write_test_lumin_grove");
            if fs::write(&marker, "").is_ok() {
                let _ = fs::remove_file(&marker);
                return Some(parent.to_path_buf());
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/lumin-grove");
        if fs::create_dir_all(&xdg).is_ok() {
            return Some(xdg);
        }
    }

    // 3. CWD
    std::env::current_dir().ok()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path_for(path);
    fs::write(&tmp, bytes)?;

    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("save.json");
    path.with_file_name(format!("{name}.tmp"))
}
