use glam::Vec2;

use crate::{Color, DrawSink, IsoProjector};

/// Padding in pixels between the map tiles and the edge of the base plate.
pub const MAP_BORDER: f32 = 10.0;

/// Fraction of the viewport width the pyramid hangs below a 20-column map.
const PYRAMID_DEPTH_RATIO: f32 = 0.04;
const PYRAMID_REFERENCE_COLUMNS: f32 = 20.0;

/// Three-tone palette used to shade the map base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Top face of the base plate.
    pub light: Color,
    /// Left face of the pyramid.
    pub medium: Color,
    /// Right face of the pyramid.
    pub dark: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            light: Color::from_rgb_u8(0xd8, 0xc3, 0x9a),
            medium: Color::from_rgb_u8(0x9c, 0x82, 0x5c),
            dark: Color::from_rgb_u8(0x5e, 0x4c, 0x36),
        }
    }
}

/// Screen-space polygons of the plate and inverted pyramid drawn under the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapBase {
    /// Plate outline: top-left, top-right, bottom-right, bottom-left.
    pub top: [Vec2; 4],
    /// Right pyramid face: top-right, bottom-right, apex.
    pub right: [Vec2; 3],
    /// Left pyramid face: bottom-left, bottom-right, apex.
    pub left: [Vec2; 3],
}

impl MapBase {
    /// Derives the base geometry for a `rows x columns` map.
    #[must_use]
    pub fn compute(projector: &IsoProjector, rows: u32, columns: u32, viewport_width: f32) -> Self {
        let tile = projector.tile_size();
        let rows = rows as f32;
        let columns = columns as f32;
        let corner = |x: f32, y: f32| projector.project(x, y, tile);

        let top_left = corner(0.0, 0.0) + Vec2::new(0.5 * tile.x, -0.5 * MAP_BORDER);
        let top_right = corner(rows, 0.0) + Vec2::new(MAP_BORDER + tile.x, 0.5 * tile.y);
        let bottom_left = corner(0.0, columns) + Vec2::new(-0.5 * MAP_BORDER, 0.5 * tile.y);
        let bottom_right =
            corner(rows, columns) + Vec2::new(0.5 * tile.x, 0.5 * MAP_BORDER + tile.y);

        let depth = PYRAMID_DEPTH_RATIO * viewport_width * columns / PYRAMID_REFERENCE_COLUMNS;
        let apex = Vec2::new(
            corner(rows / 2.0, columns / 2.0).x,
            bottom_right.y + depth,
        );

        Self {
            top: [top_left, top_right, bottom_right, bottom_left],
            right: [top_right, bottom_right, apex],
            left: [bottom_left, bottom_right, apex],
        }
    }

    /// Apex of the pyramid.
    #[must_use]
    pub const fn apex(&self) -> Vec2 {
        self.right[2]
    }

    /// Fills the faces with the palette and outlines them in black.
    pub fn draw<S>(&self, palette: &Palette, sink: &mut S)
    where
        S: DrawSink + ?Sized,
    {
        sink.fill_polygon(&self.top, palette.light);
        sink.fill_polygon(&self.right, palette.dark);
        sink.fill_polygon(&self.left, palette.medium);

        sink.stroke_polygon(&self.left, Color::BLACK);
        sink.stroke_polygon(&self.right, Color::BLACK);
        sink.stroke_polygon(&self.top, Color::BLACK);
    }
}
