/// World layout: where things are.
///
/// ## Sources (priority order):
///   1. Layout TOML named by `general.layout_file` in config.toml
///   2. Built-in layout
///
/// ## Layout format:
///   ```toml
///   tile_size = 32
///   width = 40            # tiles
///   height = 30
///
///   [spawns]
///   player = [20.0, 22.0] # tile coordinates
///   elder = [18.0, 20.0]
///   lore_stone = [24.0, 19.0]
///   boss = [20.0, 6.0]
///   seed = [20.0, 7.0]
///
///   [[interactables]]
///   id = "elder"
///   kind = "talk-elder"
///   radius = 60.0         # pixels
///   prompt = "E - Talk to Elda Lin"
///
///   [[beacons]]
///   id = "pond"
///   x = 10.0              # tile coordinates
///   y = 10.0
///   radius = 1.5          # tiles
///   ```
///
/// Layout data is trusted; it is not validated beyond TOML parsing.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::geom::Vec2;

/// The fixed set of things an interactable can do.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    TalkElder,
    InspectLore,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InteractableDef {
    pub id: String,
    pub kind: InteractionKind,
    pub radius: f32,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BeaconDef {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Spawns {
    #[serde(default = "default_player_spawn")]
    pub player: [f32; 2],
    #[serde(default = "default_elder_spawn")]
    pub elder: [f32; 2],
    #[serde(default = "default_lore_spawn")]
    pub lore_stone: [f32; 2],
    #[serde(default = "default_boss_spawn")]
    pub boss: [f32; 2],
    #[serde(default = "default_seed_spawn")]
    pub seed: [f32; 2],
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WorldLayout {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub spawns: Spawns,
    #[serde(default = "default_interactables")]
    pub interactables: Vec<InteractableDef>,
    #[serde(default = "default_beacons")]
    pub beacons: Vec<BeaconDef>,
}

// ── Built-in layout ──

fn default_tile_size() -> f32 { 32.0 }
fn default_width() -> u32 { 40 }
fn default_height() -> u32 { 30 }
fn default_player_spawn() -> [f32; 2] { [20.0, 22.0] }
fn default_elder_spawn() -> [f32; 2] { [18.0, 20.0] }
fn default_lore_spawn() -> [f32; 2] { [24.0, 19.0] }
fn default_boss_spawn() -> [f32; 2] { [20.0, 6.0] }
fn default_seed_spawn() -> [f32; 2] { [20.0, 7.0] }

fn default_interactables() -> Vec<InteractableDef> {
    vec![
        InteractableDef {
            id: "elder".into(),
            kind: InteractionKind::TalkElder,
            radius: 60.0,
            prompt: "E - Talk to Elda Lin".into(),
        },
        InteractableDef {
            id: "lore".into(),
            kind: InteractionKind::InspectLore,
            radius: 50.0,
            prompt: "E - Examine the ancient tablet".into(),
        },
    ]
}

fn default_beacons() -> Vec<BeaconDef> {
    vec![
        BeaconDef { id: "pond".into(), x: 10.0, y: 10.0, radius: 1.5 },
        BeaconDef { id: "groveEntrance".into(), x: 20.0, y: 11.0, radius: 2.0 },
    ]
}

impl Default for Spawns {
    fn default() -> Self {
        Spawns {
            player: default_player_spawn(),
            elder: default_elder_spawn(),
            lore_stone: default_lore_spawn(),
            boss: default_boss_spawn(),
            seed: default_seed_spawn(),
        }
    }
}

impl Default for WorldLayout {
    fn default() -> Self {
        WorldLayout {
            tile_size: default_tile_size(),
            width: default_width(),
            height: default_height(),
            spawns: Spawns::default(),
            interactables: default_interactables(),
            beacons: default_beacons(),
        }
    }
}

// ── Loading ──

impl WorldLayout {
    /// Load from `path`, or the built-in layout when `path` is None,
    /// unreadable, or malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return WorldLayout::default();
        };
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str::<WorldLayout>(&text) {
                Ok(layout) => {
                    debug!(path = %path.display(), "layout_loaded");
                    layout
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "layout parse error, using built-in layout");
                    WorldLayout::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read layout, using built-in layout");
                WorldLayout::default()
            }
        }
    }
}

// ── Tile → pixel conversions ──

impl WorldLayout {
    /// Center of a tile in pixels.
    pub fn tile_center(&self, tile: [f32; 2]) -> Vec2 {
        Vec2::new((tile[0] + 0.5) * self.tile_size, (tile[1] + 0.5) * self.tile_size)
    }

    /// Anchor of a standing prop (feet near the bottom of its tile).
    pub fn prop_anchor(&self, tile: [f32; 2]) -> Vec2 {
        Vec2::new((tile[0] + 0.5) * self.tile_size, (tile[1] + 0.8) * self.tile_size)
    }

    pub fn player_spawn(&self) -> Vec2 {
        self.tile_center(self.spawns.player)
    }

    pub fn boss_spawn(&self) -> Vec2 {
        self.tile_center(self.spawns.boss)
    }

    pub fn seed_spawn(&self) -> Vec2 {
        self.tile_center(self.spawns.seed)
    }

    /// Where the actor backing an interaction kind stands.
    pub fn anchor_for(&self, kind: InteractionKind) -> Vec2 {
        match kind {
            InteractionKind::TalkElder => self.prop_anchor(self.spawns.elder),
            InteractionKind::InspectLore => self.prop_anchor(self.spawns.lore_stone),
        }
    }

    /// Map size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.width as f32 * self.tile_size, self.height as f32 * self.tile_size)
    }

    /// Pixel position → fractional tile coordinates.
    pub fn to_tiles(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x / self.tile_size, p.y / self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layout_has_both_interactions_and_beacons() {
        let layout = WorldLayout::default();
        assert_eq!(layout.interactables.len(), 2);
        assert!(layout.beacons.iter().any(|b| b.id == "pond"));
        assert!(layout.beacons.iter().any(|b| b.id == "groveEntrance"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let layout: WorldLayout = toml::from_str("tile_size = 16\n[spawns]\nplayer = [1.0, 2.0]\n").unwrap();
        assert_eq!(layout.tile_size, 16.0);
        assert_eq!(layout.spawns.player, [1.0, 2.0]);
        assert_eq!(layout.spawns.boss, default_boss_spawn());
        assert_eq!(layout.interactables, default_interactables());
    }

    #[test]
    fn kinds_parse_from_kebab_case() {
        let text = r#"
            [[interactables]]
            id = "stone"
            kind = "inspect-lore"
            radius = 10.0
            prompt = "look"
        "#;
        let layout: WorldLayout = toml::from_str(text).unwrap();
        assert_eq!(layout.interactables[0].kind, InteractionKind::InspectLore);
        assert!(layout.beacons.len() == 2);
    }

    #[test]
    fn tile_conversions() {
        let layout = WorldLayout::default();
        assert_eq!(layout.tile_center([0.0, 0.0]), Vec2::new(16.0, 16.0));
        let anchor = layout.prop_anchor([1.0, 1.0]);
        assert_eq!(anchor.x, 48.0);
        assert!((anchor.y - 57.6).abs() < 1e-3);
        assert_eq!(layout.to_tiles(Vec2::new(64.0, 32.0)), Vec2::new(2.0, 1.0));
        assert_eq!(layout.pixel_size(), Vec2::new(1280.0, 960.0));
    }

    #[test]
    fn missing_file_falls_back() {
        let layout = WorldLayout::load(Some(Path::new("/definitely/not/here.toml")));
        assert_eq!(layout, WorldLayout::default());
    }
}
