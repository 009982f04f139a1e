use std::fmt;

use glam::Vec2;

use crate::{Color, SpriteHandle, SpriteId};

/// Synchronous, order-preserving draw primitive.
///
/// Only [`draw_sprite`](DrawSink::draw_sprite) is required; the order of its
/// calls within a frame is the compositor's output. The remaining methods
/// default to no-ops for backends without vector drawing.
pub trait DrawSink {
    /// Draws a sprite with its top-left corner at `at`.
    fn draw_sprite(&mut self, sprite: SpriteHandle, at: Vec2);

    /// Fills the whole surface with a single color.
    fn clear(&mut self, _color: Color) {}

    /// Fills a convex polygon.
    fn fill_polygon(&mut self, _points: &[Vec2], _color: Color) {}

    /// Outlines a closed polygon.
    fn stroke_polygon(&mut self, _points: &[Vec2], _color: Color) {}
}

/// Draw call captured by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Sprite blitted at a screen position.
    Sprite {
        /// Sprite that was drawn.
        sprite: SpriteHandle,
        /// Top-left screen position.
        at: Vec2,
    },
    /// Surface cleared to a color.
    Clear(Color),
    /// Polygon filled with a color.
    FillPolygon {
        /// Polygon vertices in screen space.
        points: Vec<Vec2>,
        /// Fill color.
        color: Color,
    },
    /// Polygon outlined with a color.
    StrokePolygon {
        /// Polygon vertices in screen space.
        points: Vec<Vec2>,
        /// Outline color.
        color: Color,
    },
}

impl DrawCommand {
    /// Identifier of the drawn sprite, if the command is a sprite blit.
    #[must_use]
    pub fn sprite_id(&self) -> Option<SpriteId> {
        match self {
            Self::Sprite { sprite, .. } => Some(sprite.id()),
            _ => None,
        }
    }
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sprite { sprite, at } => write!(
                f,
                "sprite #{} ({}x{}) at ({:.1}, {:.1})",
                sprite.id().get(),
                sprite.width(),
                sprite.height(),
                at.x,
                at.y
            ),
            Self::Clear(color) => write!(
                f,
                "clear rgba({:.2}, {:.2}, {:.2}, {:.2})",
                color.red, color.green, color.blue, color.alpha
            ),
            Self::FillPolygon { points, .. } => write!(f, "fill polygon ({} points)", points.len()),
            Self::StrokePolygon { points, .. } => {
                write!(f, "stroke polygon ({} points)", points.len())
            }
        }
    }
}

/// Sink that records every draw call in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSink {
    commands: Vec<DrawCommand>,
}

impl RecordingSink {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Identifiers of every sprite drawn, in call order.
    #[must_use]
    pub fn sprite_ids(&self) -> Vec<SpriteId> {
        self.commands
            .iter()
            .filter_map(DrawCommand::sprite_id)
            .collect()
    }

    /// Removes and returns the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl DrawSink for RecordingSink {
    fn draw_sprite(&mut self, sprite: SpriteHandle, at: Vec2) {
        self.commands.push(DrawCommand::Sprite { sprite, at });
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polygon(&mut self, points: &[Vec2], color: Color) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_preserves_call_order() {
        let mut sink = RecordingSink::new();
        let first = SpriteHandle::new(SpriteId::new(1), 8.0, 8.0);
        let second = SpriteHandle::new(SpriteId::new(2), 8.0, 8.0);

        sink.clear(Color::BLACK);
        sink.draw_sprite(second, Vec2::new(1.0, 2.0));
        sink.draw_sprite(first, Vec2::ZERO);

        assert_eq!(sink.sprite_ids(), vec![SpriteId::new(2), SpriteId::new(1)]);
        assert_eq!(sink.commands().len(), 3);
        assert_eq!(sink.take().len(), 3);
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn sprite_commands_display_position() {
        let command = DrawCommand::Sprite {
            sprite: SpriteHandle::new(SpriteId::new(7), 64.0, 32.0),
            at: Vec2::new(400.0, 60.0),
        };
        assert_eq!(command.to_string(), "sprite #7 (64x32) at (400.0, 60.0)");
    }
}
