use std::time::Duration;

use mipsman_core::ClientId;
use mipsman_system_animation::{CaptureOverlay, CaptureTiming, FrameClock};
use tracing::{debug, info};

use crate::{
    Color, ConfigurationError, DepthCompositor, DrawSink, FrameReport, MapBase, Palette,
    RendererConfig, SpriteHandle, SpriteProvider, Viewport, WorldSnapshot,
};

/// What a call to [`IsoRenderer::render`] put on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The full isometric scene was composited.
    Composited(FrameReport),
    /// The capture overlay replaced the scene.
    Capture {
        /// Client whose entity was captured.
        captured: ClientId,
        /// Overlay frame shown, in `0..frames`.
        frame: u32,
        /// Entity sprite drawn on the overlay, if the captured entity was found.
        drawn: Option<SpriteHandle>,
    },
}

impl FrameOutcome {
    /// Report of the composited frame, if the scene was drawn.
    #[must_use]
    pub const fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Composited(report) => Some(report),
            Self::Capture { .. } => None,
        }
    }
}

/// Frame-level driver around [`DepthCompositor`].
///
/// Owns the frame clock that turns presentation timestamps into animation
/// deltas, the optional map base, and the time-bounded capture overlay.
#[derive(Clone, Debug)]
pub struct IsoRenderer {
    compositor: DepthCompositor,
    frame_clock: FrameClock,
    capture_timing: CaptureTiming,
    capture: Option<CaptureOverlay>,
    palette: Palette,
    map_base: bool,
}

impl IsoRenderer {
    /// Wraps a compositor with default capture timing and palette.
    #[must_use]
    pub fn new(compositor: DepthCompositor) -> Self {
        Self {
            compositor,
            frame_clock: FrameClock::new(),
            capture_timing: CaptureTiming::default(),
            capture: None,
            palette: Palette::default(),
            map_base: false,
        }
    }

    /// Builds a renderer from a loaded configuration.
    pub fn from_config(config: &RendererConfig) -> Result<Self, ConfigurationError> {
        let compositor =
            DepthCompositor::from_sprites(config.local_client, config.viewport, &config.sprites)?;
        Ok(Self::new(compositor)
            .with_capture_timing(config.capture)
            .with_map_base(config.map_base, config.palette))
    }

    /// Overrides the capture overlay timing.
    #[must_use]
    pub fn with_capture_timing(mut self, timing: CaptureTiming) -> Self {
        self.capture_timing = timing;
        self
    }

    /// Enables or disables the map base and sets its colors.
    #[must_use]
    pub fn with_map_base(mut self, enabled: bool, palette: Palette) -> Self {
        self.map_base = enabled;
        self.palette = palette;
        self
    }

    /// Underlying compositor.
    #[must_use]
    pub const fn compositor(&self) -> &DepthCompositor {
        &self.compositor
    }

    /// Mutable access to the underlying compositor.
    pub fn compositor_mut(&mut self) -> &mut DepthCompositor {
        &mut self.compositor
    }

    /// Capture overlay currently scheduled, if any.
    #[must_use]
    pub const fn capture(&self) -> Option<&CaptureOverlay> {
        self.capture.as_ref()
    }

    /// Reconfigures the viewport, deriving the tile footprint from the floor sprite.
    pub fn set_viewport<P>(
        &mut self,
        viewport: Viewport,
        sprites: &P,
    ) -> Result<(), ConfigurationError>
    where
        P: SpriteProvider + ?Sized,
    {
        self.compositor.set_viewport_from_sprites(viewport, sprites)
    }

    /// Starts the capture overlay for `captured` at presentation time `now`.
    ///
    /// A capture already in progress is replaced. Frames presented before
    /// `now` still show the composited scene.
    pub fn start_capture(&mut self, captured: ClientId, now: Duration) {
        info!(
            client = captured.get(),
            duration_ms = self.capture_timing.duration().as_millis() as u64,
            "capture overlay started"
        );
        self.capture = Some(CaptureOverlay::start(captured, now, self.capture_timing));
    }

    /// Renders the frame presented at `now`.
    ///
    /// While a capture overlay is active the scene is replaced by a black
    /// screen showing the captured entity's current frame; otherwise the map
    /// base (when enabled) and the composited scene are drawn.
    pub fn render<P, S>(
        &mut self,
        world: &mut WorldSnapshot<'_>,
        now: Duration,
        sprites: &P,
        sink: &mut S,
    ) -> FrameOutcome
    where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let dt = self.frame_clock.advance(now);

        if let Some(overlay) = self.capture {
            if let Some(frame) = overlay.frame_at(now) {
                sink.clear(Color::BLACK);
                let drawn = world
                    .entities
                    .iter()
                    .find(|entity| entity.client == overlay.captured())
                    .and_then(|entity| self.compositor.draw_current_frame(entity, sprites, sink));
                return FrameOutcome::Capture {
                    captured: overlay.captured(),
                    frame,
                    drawn,
                };
            }

            if overlay.has_expired(now) {
                debug!(
                    client = overlay.captured().get(),
                    started_at_ms = overlay.started_at().as_millis() as u64,
                    "capture overlay finished"
                );
                self.capture = None;
            }
        }

        if self.map_base {
            let (rows, columns) = world.grid.dimensions();
            let viewport_width = self.compositor.viewport().width() as f32;
            MapBase::compute(self.compositor.projector(), rows, columns, viewport_width)
                .draw(&self.palette, sink);
        }

        FrameOutcome::Composited(self.compositor.compose(world, dt, sprites, sink))
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use mipsman_core::{Direction, Entity, EntityRole, Grid, GridPosition, PelletMap, Terrain};

    use super::*;
    use crate::{DrawCommand, RecordingSink, SpriteId, SpriteSheet};

    fn sprites() -> SpriteSheet {
        let handle = |id| SpriteHandle::new(SpriteId::new(id), 64.0, 32.0);
        SpriteSheet::new(handle(1))
            .with_pellet(vec![handle(10)], vec![handle(11)])
            .with_animation(EntityRole::Chaser, Direction::East, vec![handle(30)])
    }

    fn renderer(sprites: &SpriteSheet) -> IsoRenderer {
        let viewport = Viewport::new(800, 600).expect("valid viewport");
        let compositor =
            DepthCompositor::from_sprites(ClientId::new(1), viewport, sprites).expect("floor");
        IsoRenderer::new(compositor)
    }

    #[test]
    fn capture_replaces_scene_until_it_expires() {
        let sprites = sprites();
        let mut renderer = renderer(&sprites);
        let grid = Grid::filled(2, 2, Terrain::Floor).expect("valid grid");
        let pellets = PelletMap::new();
        let mut entities = vec![Entity::new(
            ClientId::new(7),
            GridPosition::new(1.0, 1.0),
            Direction::East,
        )];

        renderer.start_capture(ClientId::new(7), Duration::ZERO);

        let mut sink = RecordingSink::new();
        let outcome = renderer.render(
            &mut WorldSnapshot::new(&grid, &mut entities, &pellets),
            Duration::from_millis(100),
            &sprites,
            &mut sink,
        );
        assert!(matches!(
            outcome,
            FrameOutcome::Capture { frame: 2, drawn: Some(_), .. }
        ));
        assert_eq!(sink.commands()[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(sink.sprite_ids(), vec![SpriteId::new(30)]);

        let mut sink = RecordingSink::new();
        let outcome = renderer.render(
            &mut WorldSnapshot::new(&grid, &mut entities, &pellets),
            Duration::from_millis(800),
            &sprites,
            &mut sink,
        );
        assert_eq!(outcome.report().map(|report| report.floor_tiles), Some(4));
        assert!(renderer.capture().is_none());
    }

    #[test]
    fn scheduled_capture_waits_and_keeps_the_animation_still() {
        let sprites = sprites();
        let mut renderer = renderer(&sprites);
        let grid = Grid::filled(2, 2, Terrain::Floor).expect("valid grid");
        let pellets = PelletMap::new();
        let mut entities = vec![Entity::new(
            ClientId::new(7),
            GridPosition::new(1.0, 1.0),
            Direction::East,
        )
        .with_animation_speed(10.0)];

        renderer.start_capture(ClientId::new(7), Duration::from_millis(20));

        let mut sink = RecordingSink::new();
        let outcome = renderer.render(
            &mut WorldSnapshot::new(&grid, &mut entities, &pellets),
            Duration::from_millis(16),
            &sprites,
            &mut sink,
        );
        assert!(outcome.report().is_some());
        assert_eq!(
            renderer.capture().map(CaptureOverlay::captured),
            Some(ClientId::new(7))
        );

        let before = entities[0].animation;
        for now in [20, 200, 400] {
            let mut sink = RecordingSink::new();
            let outcome = renderer.render(
                &mut WorldSnapshot::new(&grid, &mut entities, &pellets),
                Duration::from_millis(now),
                &sprites,
                &mut sink,
            );
            assert!(matches!(outcome, FrameOutcome::Capture { .. }));
        }
        assert_eq!(entities[0].animation, before);
    }

    #[test]
    fn compositor_can_switch_the_local_client() {
        let sprites = sprites();
        let mut renderer = renderer(&sprites);

        renderer
            .compositor_mut()
            .set_local_client(ClientId::new(9));

        assert_eq!(renderer.compositor().local_client(), ClientId::new(9));
    }

    #[test]
    fn map_base_is_drawn_before_tiles() {
        let sprites = sprites();
        let mut renderer = renderer(&sprites).with_map_base(true, Palette::default());
        let grid = Grid::filled(2, 2, Terrain::Floor).expect("valid grid");
        let pellets = PelletMap::new();
        let mut entities: Vec<Entity> = Vec::new();
        let mut sink = RecordingSink::new();

        let _ = renderer.render(
            &mut WorldSnapshot::new(&grid, &mut entities, &pellets),
            Duration::ZERO,
            &sprites,
            &mut sink,
        );

        assert!(matches!(sink.commands()[0], DrawCommand::FillPolygon { .. }));
        assert_eq!(sink.commands().len(), 6 + 4);
        assert_eq!(
            sink.commands()[6],
            DrawCommand::Sprite {
                sprite: SpriteHandle::new(SpriteId::new(1), 64.0, 32.0),
                at: Vec2::new(400.0, 60.0),
            }
        );
    }
}
