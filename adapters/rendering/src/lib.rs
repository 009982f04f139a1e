#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Isometric presentation layer for MIPSman.
//!
//! The [`DepthCompositor`] turns a world snapshot into an ordered sequence of
//! draw calls on a [`DrawSink`]. Terrain, pellets and entities are merged in a
//! single far-to-near sweep over a precomputed anti-diagonal traversal, so
//! nearer objects always paint over farther ones. [`IsoRenderer`] wraps the
//! compositor with frame timing, the capture overlay and the map base plate.
//!
//! Sprite decoding and the pixel blit itself live behind the
//! [`SpriteProvider`] and [`DrawSink`] traits.

mod compositor;
mod config;
mod map_base;
mod projection;
mod renderer;
mod sink;
mod sprites;

pub use compositor::{DepthCompositor, EntityCursor, FrameReport, FrameRoles, WorldSnapshot};
pub use config::{RendererConfig, SUPPORTED_CONFIG_VERSION};
pub use map_base::{MapBase, Palette, MAP_BORDER};
pub use projection::{IsoProjector, Viewport};
pub use renderer::{FrameOutcome, IsoRenderer};
pub use sink::{DrawCommand, DrawSink, RecordingSink};
pub use sprites::{
    MarkerKind, PelletVisibility, SpriteHandle, SpriteId, SpriteProvider, SpriteSheet,
    SpriteVariant,
};

use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Errors raised when reconfiguring the compositor.
///
/// A rejected reconfiguration leaves the previous state active.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// Grids must contain at least one row and one column.
    #[error("grid dimensions must be positive (received {rows}x{columns})")]
    EmptyGrid {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// Viewports must have a non-zero area.
    #[error("viewport dimensions must be positive (received {width}x{height})")]
    EmptyViewport {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Tile footprints must be positive and finite.
    #[error("tile size must be positive and finite (received {width}x{height})")]
    InvalidTileSize {
        /// Requested tile width in pixels.
        width: f32,
        /// Requested tile height in pixels.
        height: f32,
    },
    /// The tile size is derived from the floor sprite, which is missing.
    #[error("sprite provider has no floor sprite to derive the tile size from")]
    MissingFloorSprite,
}
