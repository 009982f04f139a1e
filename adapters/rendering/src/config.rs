use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{bail, ensure, Context, Result};
use mipsman_core::{ClientId, Direction, EntityRole, Terrain};
use mipsman_system_animation::CaptureTiming;
use serde::Deserialize;

use crate::{Color, MarkerKind, Palette, SpriteHandle, SpriteId, SpriteSheet, Viewport};

/// Renderer configuration format version understood by this crate.
pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Everything needed to build an [`IsoRenderer`](crate::IsoRenderer) and its sprites.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererConfig {
    /// Client the renderer presents the game for.
    pub local_client: ClientId,
    /// Whether the base plate and pyramid are drawn under the map.
    pub map_base: bool,
    /// Surface the frames are presented on.
    pub viewport: Viewport,
    /// Playback parameters of the capture overlay.
    pub capture: CaptureTiming,
    /// Colors of the map base.
    pub palette: Palette,
    /// Sprite handles for every drawable element.
    pub sprites: SpriteSheet,
}

impl RendererConfig {
    /// Loads a configuration file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read renderer config at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid renderer config at {}", path.display()))
    }

    /// Parses a configuration from TOML source.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(contents).context("failed to parse renderer config toml contents")?;
        if raw.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported renderer config version {}; expected {}",
                raw.version,
                SUPPORTED_CONFIG_VERSION
            );
        }

        let viewport = Viewport::new(raw.viewport.width, raw.viewport.height)
            .context("invalid [viewport] section")?;
        let sprites = raw.sprites.into_sheet()?;

        Ok(Self {
            local_client: ClientId::new(raw.local_client),
            map_base: raw.map_base,
            viewport,
            capture: CaptureTiming::new(
                Duration::from_millis(raw.capture.duration_ms),
                raw.capture.frames,
            ),
            palette: raw.palette.into_palette(),
            sprites,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    version: u32,
    local_client: u32,
    #[serde(default = "default_map_base")]
    map_base: bool,
    viewport: RawViewport,
    #[serde(default)]
    capture: RawCapture,
    #[serde(default)]
    palette: RawPalette,
    sprites: RawSprites,
}

fn default_map_base() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawViewport {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCapture {
    duration_ms: u64,
    frames: u32,
}

impl Default for RawCapture {
    fn default() -> Self {
        let timing = CaptureTiming::default();
        Self {
            duration_ms: u64::try_from(timing.duration().as_millis()).unwrap_or(u64::MAX),
            frames: timing.frames(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPalette {
    light: Option<[u8; 3]>,
    medium: Option<[u8; 3]>,
    dark: Option<[u8; 3]>,
}

impl RawPalette {
    fn into_palette(self) -> Palette {
        let defaults = Palette::default();
        let color = |rgb: Option<[u8; 3]>, fallback: Color| {
            rgb.map_or(fallback, |[red, green, blue]| {
                Color::from_rgb_u8(red, green, blue)
            })
        };
        Palette {
            light: color(self.light, defaults.light),
            medium: color(self.medium, defaults.medium),
            dark: color(self.dark, defaults.dark),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSprite {
    id: u32,
    width: f32,
    height: f32,
}

impl RawSprite {
    fn into_handle(self) -> Result<SpriteHandle> {
        ensure!(
            self.width.is_finite()
                && self.height.is_finite()
                && self.width > 0.0
                && self.height > 0.0,
            "sprite #{} must have positive dimensions (received {}x{})",
            self.id,
            self.width,
            self.height
        );
        Ok(SpriteHandle::new(SpriteId::new(self.id), self.width, self.height))
    }
}

fn into_handles(sprites: Vec<RawSprite>) -> Result<Vec<SpriteHandle>> {
    sprites.into_iter().map(RawSprite::into_handle).collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPellet {
    opaque: Vec<RawSprite>,
    translucent: Vec<RawSprite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMarkers {
    chased: RawSprite,
    local: RawSprite,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnimation {
    role: EntityRole,
    direction: Direction,
    frames: Vec<RawSprite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSprites {
    terrain: HashMap<String, RawSprite>,
    pellet: RawPellet,
    markers: RawMarkers,
    #[serde(default)]
    animations: Vec<RawAnimation>,
}

impl RawSprites {
    fn into_sheet(self) -> Result<SpriteSheet> {
        let mut terrain = Vec::with_capacity(self.terrain.len());
        for (code, sprite) in self.terrain {
            let code: u8 = code
                .trim()
                .parse()
                .with_context(|| format!("terrain code `{code}` is not a number in 0..=255"))?;
            terrain.push((Terrain::from_code(code), sprite.into_handle()?));
        }
        terrain.sort_by_key(|(terrain, _)| *terrain);

        let Some(floor) = terrain
            .iter()
            .find(|(terrain, _)| terrain.is_floor())
            .map(|(_, sprite)| *sprite)
        else {
            bail!("sprite manifest missing floor terrain (code 0)");
        };

        ensure!(
            !self.pellet.opaque.is_empty() && !self.pellet.translucent.is_empty(),
            "pellet sprites need at least one opaque and one translucent frame"
        );

        let mut sheet = SpriteSheet::new(floor)
            .with_pellet(
                into_handles(self.pellet.opaque)?,
                into_handles(self.pellet.translucent)?,
            )
            .with_marker(MarkerKind::Chased, self.markers.chased.into_handle()?)
            .with_marker(MarkerKind::LocalClient, self.markers.local.into_handle()?);

        for (kind, sprite) in terrain {
            sheet = sheet.with_terrain(kind, sprite);
        }

        for animation in self.animations {
            if sheet.has_animation(animation.role, animation.direction) {
                bail!(
                    "sprite manifest contains duplicate animation for {:?} facing {:?}",
                    animation.role,
                    animation.direction
                );
            }
            ensure!(
                !animation.frames.is_empty(),
                "animation for {:?} facing {:?} has no frames",
                animation.role,
                animation.direction
            );
            sheet = sheet.with_animation(
                animation.role,
                animation.direction,
                into_handles(animation.frames)?,
            );
        }

        Ok(sheet)
    }
}
