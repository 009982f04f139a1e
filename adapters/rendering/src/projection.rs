use glam::Vec2;

use crate::ConfigurationError;

/// Pixel dimensions of the surface frames are presented on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a viewport, rejecting zero-sized surfaces.
    pub const fn new(width: u32, height: u32) -> Result<Self, ConfigurationError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::EmptyViewport { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Screen point the grid's far corner is anchored to.
    ///
    /// Horizontally centred, a tenth of the way down the screen.
    #[must_use]
    pub fn render_origin(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 10.0)
    }
}

/// Affine grid-to-screen transform shared by every sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoProjector {
    origin: Vec2,
    tile_size: Vec2,
}

impl IsoProjector {
    /// Creates a projector anchored at `origin` for tiles of `tile_size` (width, height).
    pub fn new(origin: Vec2, tile_size: Vec2) -> Result<Self, ConfigurationError> {
        if !tile_size.is_finite() || tile_size.x <= 0.0 || tile_size.y <= 0.0 {
            return Err(ConfigurationError::InvalidTileSize {
                width: tile_size.x,
                height: tile_size.y,
            });
        }
        Ok(Self { origin, tile_size })
    }

    /// Render origin the projection is anchored to.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Footprint of a single tile as (width, height).
    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Projects a grid position to the top-left screen corner of a sprite.
    ///
    /// `sprite_size` is (width, height). The sprite is centred horizontally on
    /// its footprint and its bottom edge rests on the footprint's base.
    #[must_use]
    pub fn project(&self, x: f32, y: f32, sprite_size: Vec2) -> Vec2 {
        let half_tile = self.tile_size / 2.0;
        Vec2::new(
            self.origin.x - (y - x) * half_tile.x + (self.tile_size.x - sprite_size.x) / 2.0,
            self.origin.y + (y + x) * half_tile.y + (self.tile_size.y - sprite_size.y),
        )
    }
}
