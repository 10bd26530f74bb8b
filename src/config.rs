/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub combat: CombatConfig,
    pub boss: BossConfig,
    pub timing: TimingConfig,
    pub layout_file: Option<PathBuf>,
    pub save_file: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    pub max_hp: i32,
    pub attack: i32,
    pub speed: f32,          // px per second
    pub run_multiplier: f32, // applied while `run` is held
    pub body_width: f32,
    pub body_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CombatConfig {
    pub attack_cooldown_ms: f32,
    pub hit_box: f32,    // side of the square slash region
    pub hit_offset: f32, // distance from player center along facing
    pub hurt_invulnerable_ms: f32,
    pub respawn_invulnerable_ms: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossConfig {
    pub max_hp: i32,
    pub speed: f32,
    pub contact_range: f32,
    pub attack_cooldown_ms: f32,
    pub damage: i32,
    pub body_width: f32,
    pub body_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub hud_refresh_ms: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    combat: TomlCombat,
    #[serde(default)]
    boss: TomlBoss,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_player_hp")]
    max_hp: i32,
    #[serde(default = "default_player_attack")]
    attack: i32,
    #[serde(default = "default_player_speed")]
    speed: f32,
    #[serde(default = "default_run_multiplier")]
    run_multiplier: f32,
    #[serde(default = "default_player_body_w")]
    body_width: f32,
    #[serde(default = "default_player_body_h")]
    body_height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCombat {
    #[serde(default = "default_attack_cooldown")]
    attack_cooldown_ms: f32,
    #[serde(default = "default_hit_box")]
    hit_box: f32,
    #[serde(default = "default_hit_offset")]
    hit_offset: f32,
    #[serde(default = "default_hurt_invulnerable")]
    hurt_invulnerable_ms: f32,
    #[serde(default = "default_respawn_invulnerable")]
    respawn_invulnerable_ms: f32,
}

#[derive(Deserialize, Debug)]
struct TomlBoss {
    #[serde(default = "default_boss_hp")]
    max_hp: i32,
    #[serde(default = "default_boss_speed")]
    speed: f32,
    #[serde(default = "default_contact_range")]
    contact_range: f32,
    #[serde(default = "default_boss_cooldown")]
    attack_cooldown_ms: f32,
    #[serde(default = "default_boss_damage")]
    damage: i32,
    #[serde(default = "default_boss_body")]
    body_width: f32,
    #[serde(default = "default_boss_body")]
    body_height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hud_refresh")]
    hud_refresh_ms: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    layout_file: Option<String>,
    #[serde(default = "default_save_file")]
    save_file: String,
}

// ── Defaults ──

fn default_player_hp() -> i32 { 8 }
fn default_player_attack() -> i32 { 2 }
fn default_player_speed() -> f32 { 180.0 }
fn default_run_multiplier() -> f32 { 1.2 }
fn default_player_body_w() -> f32 { 16.0 }
fn default_player_body_h() -> f32 { 20.0 }

fn default_attack_cooldown() -> f32 { 360.0 }
fn default_hit_box() -> f32 { 40.0 }
fn default_hit_offset() -> f32 { 20.0 }
fn default_hurt_invulnerable() -> f32 { 800.0 }
fn default_respawn_invulnerable() -> f32 { 1200.0 }

fn default_boss_hp() -> i32 { 14 }
fn default_boss_speed() -> f32 { 70.0 }
fn default_contact_range() -> f32 { 36.0 }
fn default_boss_cooldown() -> f32 { 1200.0 }
fn default_boss_damage() -> i32 { 2 }
fn default_boss_body() -> f32 { 32.0 }

fn default_tick_rate() -> u64 { 16 }      // ~60 ticks per second
fn default_hud_refresh() -> f32 { 1500.0 }
fn default_save_file() -> String { "lumin-grove-save-v1.json".into() }

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            max_hp: default_player_hp(),
            attack: default_player_attack(),
            speed: default_player_speed(),
            run_multiplier: default_run_multiplier(),
            body_width: default_player_body_w(),
            body_height: default_player_body_h(),
        }
    }
}

impl Default for TomlCombat {
    fn default() -> Self {
        TomlCombat {
            attack_cooldown_ms: default_attack_cooldown(),
            hit_box: default_hit_box(),
            hit_offset: default_hit_offset(),
            hurt_invulnerable_ms: default_hurt_invulnerable(),
            respawn_invulnerable_ms: default_respawn_invulnerable(),
        }
    }
}

impl Default for TomlBoss {
    fn default() -> Self {
        TomlBoss {
            max_hp: default_boss_hp(),
            speed: default_boss_speed(),
            contact_range: default_contact_range(),
            attack_cooldown_ms: default_boss_cooldown(),
            damage: default_boss_damage(),
            body_width: default_boss_body(),
            body_height: default_boss_body(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            hud_refresh_ms: default_hud_refresh(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            layout_file: None,
            save_file: default_save_file(),
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(cfg: TomlConfig) -> Self {
        GameConfig {
            player: PlayerConfig {
                max_hp: cfg.player.max_hp.max(1),
                attack: cfg.player.attack,
                speed: cfg.player.speed,
                run_multiplier: cfg.player.run_multiplier,
                body_width: cfg.player.body_width,
                body_height: cfg.player.body_height,
            },
            combat: CombatConfig {
                attack_cooldown_ms: cfg.combat.attack_cooldown_ms,
                hit_box: cfg.combat.hit_box,
                hit_offset: cfg.combat.hit_offset,
                hurt_invulnerable_ms: cfg.combat.hurt_invulnerable_ms,
                respawn_invulnerable_ms: cfg.combat.respawn_invulnerable_ms,
            },
            boss: BossConfig {
                max_hp: cfg.boss.max_hp.max(1),
                speed: cfg.boss.speed,
                contact_range: cfg.boss.contact_range,
                attack_cooldown_ms: cfg.boss.attack_cooldown_ms,
                damage: cfg.boss.damage,
                body_width: cfg.boss.body_width,
                body_height: cfg.boss.body_height,
            },
            timing: TimingConfig {
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                hud_refresh_ms: cfg.timing.hud_refresh_ms,
            },
            layout_file: cfg.general.layout_file.map(PathBuf::from),
            save_file: cfg.general.save_file,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/lumin-grove`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut config: GameConfig = load_toml(&search_dirs).into();

        // Relative layout paths resolve against the first dir that has them
        if let Some(layout) = config.layout_file.take() {
            let resolved = if layout.is_absolute() {
                layout
            } else {
                search_dirs.iter()
                    .map(|d| d.join(&layout))
                    .find(|p| p.is_file())
                    .unwrap_or(layout)
            };
            config.layout_file = Some(resolved);
        }

        config
    }

    /// Parse a config document directly. Used by `load` and tests.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from)
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
pub(crate) fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/lumin-grove");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        debug!(path = %path.display(), "config_loaded");
                        return cfg;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read config");
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.player.max_hp, 8);
        assert_eq!(cfg.player.attack, 2);
        assert_eq!(cfg.boss.max_hp, 14);
        assert_eq!(cfg.combat.attack_cooldown_ms, 360.0);
        assert_eq!(cfg.combat.hurt_invulnerable_ms, 800.0);
        assert_eq!(cfg.combat.respawn_invulnerable_ms, 1200.0);
        assert_eq!(cfg.boss.attack_cooldown_ms, 1200.0);
        assert_eq!(cfg.save_file, "lumin-grove-save-v1.json");
        assert!(cfg.layout_file.is_none());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("[boss]\nmax_hp = 20\n").unwrap();
        assert_eq!(cfg.boss.max_hp, 20);
        assert_eq!(cfg.boss.damage, 2);
        assert_eq!(cfg.player, GameConfig::default().player);
    }

    #[test]
    fn nonsense_hp_is_clamped_to_one() {
        let cfg = GameConfig::from_toml_str("[player]\nmax_hp = 0\n").unwrap();
        assert_eq!(cfg.player.max_hp, 1);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[player\nmax_hp = ").is_err());
    }
}
