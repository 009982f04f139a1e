use std::{cmp::Ordering, time::Duration};

use glam::Vec2;
use mipsman_core::{CellCoord, ClientId, Entity, Grid, PelletMap};
use mipsman_system_animation::tick;
use mipsman_system_traversal::TraversalOrder;
use tracing::{debug, warn};

use crate::{
    ConfigurationError, DrawSink, IsoProjector, MarkerKind, PelletVisibility, SpriteHandle,
    SpriteProvider, Viewport,
};

/// World state consumed by a single frame.
///
/// Everything is read-only apart from the entities' animation fields.
#[derive(Debug)]
pub struct WorldSnapshot<'a> {
    /// Terrain of the map being shown.
    pub grid: &'a Grid,
    /// Entities in the order the gameplay layer delivered them.
    pub entities: &'a mut [Entity],
    /// Pellets keyed by the cell they occupy.
    pub pellets: &'a PelletMap,
}

impl<'a> WorldSnapshot<'a> {
    /// Bundles the per-frame world state.
    #[must_use]
    pub fn new(grid: &'a Grid, entities: &'a mut [Entity], pellets: &'a PelletMap) -> Self {
        Self {
            grid,
            entities,
            pellets,
        }
    }
}

/// Tally of what a frame drew and what it had to leave out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Floor tiles drawn by the underlay pass.
    pub floor_tiles: usize,
    /// Wall and obstacle tiles drawn by the depth pass.
    pub terrain_tiles: usize,
    /// Pellet overlays drawn.
    pub pellets_drawn: usize,
    /// Entities drawn.
    pub entities_drawn: usize,
    /// Markers drawn above entities.
    pub markers_drawn: usize,
    /// Entities left under the cursor after the traversal and drawn last.
    pub late_entities: usize,
    /// Entities skipped for lying outside the grid.
    pub skipped_entities: usize,
    /// Pellets skipped for referencing cells outside the grid.
    pub skipped_pellets: usize,
    /// Draws skipped because the sprite provider had no sprite.
    pub missing_sprites: usize,
}

impl FrameReport {
    /// Whether any element of the snapshot could not be drawn.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.skipped_entities > 0 || self.skipped_pellets > 0 || self.missing_sprites > 0
    }

    fn log(&self) {
        if self.is_degraded() {
            warn!(
                skipped_entities = self.skipped_entities,
                skipped_pellets = self.skipped_pellets,
                missing_sprites = self.missing_sprites,
                late_entities = self.late_entities,
                "frame composited with elements left out"
            );
        } else if self.late_entities > 0 {
            debug!(
                late_entities = self.late_entities,
                "entities drawn after the depth pass"
            );
        }
    }
}

/// Role lookups resolved once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRoles {
    local_client: ClientId,
    local_holds_chase: bool,
}

impl FrameRoles {
    /// Resolves whether the local client currently holds the chased role.
    #[must_use]
    pub fn resolve(entities: &[Entity], local_client: ClientId) -> Self {
        let local_holds_chase = entities
            .iter()
            .any(|entity| entity.chased && entity.client == local_client);
        Self {
            local_client,
            local_holds_chase,
        }
    }

    /// Whether the local client holds the chased role this frame.
    #[must_use]
    pub const fn local_holds_chase(&self) -> bool {
        self.local_holds_chase
    }

    /// Visibility pellets are drawn with this frame.
    #[must_use]
    pub const fn pellet_visibility(&self) -> PelletVisibility {
        PelletVisibility::for_local_player(self.local_holds_chase)
    }

    /// Marker to draw above the entity, if any.
    #[must_use]
    pub fn marker_for(&self, entity: &Entity) -> Option<MarkerKind> {
        if entity.chased {
            Some(MarkerKind::Chased)
        } else if entity.client == self.local_client {
            Some(MarkerKind::LocalClient)
        } else {
            None
        }
    }
}

/// Position in the depth-sorted entity list shared by the passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityCursor {
    order: Vec<usize>,
    next: usize,
}

impl EntityCursor {
    /// Sorts the drawable entities by depth key, keeping input order on ties.
    ///
    /// Entities outside the grid are left out and counted in the report.
    #[must_use]
    pub fn depth_sorted(grid: &Grid, entities: &[Entity], report: &mut FrameReport) -> Self {
        let mut order: Vec<usize> = Vec::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            if grid.contains_position(entity.position) {
                order.push(index);
            } else {
                report.skipped_entities += 1;
            }
        }

        // Keys are finite here; `partial_cmp` also treats `-0.0` and `0.0` as ties.
        order.sort_by(|&a, &b| {
            entities[a]
                .position
                .depth_key()
                .partial_cmp(&entities[b].position.depth_key())
                .unwrap_or(Ordering::Equal)
        });

        Self { order, next: 0 }
    }

    /// Index of the entity under the cursor.
    #[must_use]
    pub fn peek(&self) -> Option<usize> {
        self.order.get(self.next).copied()
    }

    /// Moves past the entity under the cursor.
    pub fn advance(&mut self) {
        if self.next < self.order.len() {
            self.next += 1;
        }
    }

    /// Entity indices not yet drawn.
    #[must_use]
    pub fn remaining(&self) -> &[usize] {
        &self.order[self.next..]
    }

    /// Whether every entity has been drawn.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.order.len()
    }
}

/// Whether an entity should be drawn right after the terrain at `cell`.
///
/// The entity must be at least as deep as the cell and strictly further
/// along `x`.
#[must_use]
fn entity_follows_cell(entity: &Entity, cell: CellCoord) -> bool {
    entity.position.depth_key() >= cell.depth_key() as f32 && entity.position.x > cell.x() as f32
}

/// Painter's-algorithm compositor for the isometric grid.
///
/// Holds only the cached traversal order and projection parameters; every
/// frame is composited from the snapshot passed in.
#[derive(Clone, Debug)]
pub struct DepthCompositor {
    local_client: ClientId,
    viewport: Viewport,
    projector: IsoProjector,
    order: TraversalOrder,
}

impl DepthCompositor {
    /// Creates a compositor for the viewport with an explicit tile footprint.
    pub fn new(
        local_client: ClientId,
        viewport: Viewport,
        tile_size: Vec2,
    ) -> Result<Self, ConfigurationError> {
        let projector = IsoProjector::new(viewport.render_origin(), tile_size)?;
        Ok(Self {
            local_client,
            viewport,
            projector,
            order: TraversalOrder::default(),
        })
    }

    /// Creates a compositor whose tile footprint is the floor sprite's size.
    pub fn from_sprites<P>(
        local_client: ClientId,
        viewport: Viewport,
        sprites: &P,
    ) -> Result<Self, ConfigurationError>
    where
        P: SpriteProvider + ?Sized,
    {
        let floor = sprites
            .floor()
            .ok_or(ConfigurationError::MissingFloorSprite)?;
        Self::new(local_client, viewport, floor.size())
    }

    /// Switches to a new viewport and tile footprint.
    ///
    /// The traversal order is left untouched; it only depends on the grid.
    pub fn set_viewport(
        &mut self,
        viewport: Viewport,
        tile_size: Vec2,
    ) -> Result<(), ConfigurationError> {
        let projector = IsoProjector::new(viewport.render_origin(), tile_size)?;
        self.viewport = viewport;
        self.projector = projector;
        debug!(
            width = viewport.width(),
            height = viewport.height(),
            tile_width = tile_size.x,
            tile_height = tile_size.y,
            "viewport reconfigured"
        );
        Ok(())
    }

    /// Switches to a new viewport, taking the tile footprint from the floor sprite.
    pub fn set_viewport_from_sprites<P>(
        &mut self,
        viewport: Viewport,
        sprites: &P,
    ) -> Result<(), ConfigurationError>
    where
        P: SpriteProvider + ?Sized,
    {
        let floor = sprites
            .floor()
            .ok_or(ConfigurationError::MissingFloorSprite)?;
        self.set_viewport(viewport, floor.size())
    }

    /// Plans the traversal for a grid, skipping the work when the dimensions are unchanged.
    ///
    /// Returns `true` when the order was recomputed.
    pub fn load_grid(&mut self, rows: u32, columns: u32) -> Result<bool, ConfigurationError> {
        if rows == 0 || columns == 0 {
            return Err(ConfigurationError::EmptyGrid { rows, columns });
        }

        let replanned = self.order.replan_if_needed(rows, columns);
        if replanned {
            debug!(rows, columns, "traversal order replanned");
        }
        Ok(replanned)
    }

    /// Changes the client whose entity and pellet visibility are privileged.
    pub fn set_local_client(&mut self, local_client: ClientId) {
        self.local_client = local_client;
    }

    /// Client the compositor renders for.
    #[must_use]
    pub const fn local_client(&self) -> ClientId {
        self.local_client
    }

    /// Active viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Active projection.
    #[must_use]
    pub const fn projector(&self) -> &IsoProjector {
        &self.projector
    }

    /// Cached traversal order.
    #[must_use]
    pub const fn order(&self) -> &TraversalOrder {
        &self.order
    }

    /// Composites one frame into the sink.
    ///
    /// `dt` is the time since the previous completed frame and drives the
    /// entity animations. Malformed snapshot elements are skipped and counted.
    pub fn compose<P, S>(
        &mut self,
        world: &mut WorldSnapshot<'_>,
        dt: Duration,
        sprites: &P,
        sink: &mut S,
    ) -> FrameReport
    where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let (rows, columns) = world.grid.dimensions();
        if self.order.replan_if_needed(rows, columns) {
            debug!(rows, columns, "traversal order replanned for new grid");
        }

        let mut report = FrameReport {
            skipped_pellets: world
                .pellets
                .iter()
                .filter(|(cell, pellet)| pellet.active && !world.grid.contains(**cell))
                .count(),
            ..FrameReport::default()
        };

        let roles = FrameRoles::resolve(&*world.entities, self.local_client);
        let cursor = EntityCursor::depth_sorted(world.grid, &*world.entities, &mut report);

        self.floor_pass(world.grid, sprites, sink, &mut report);
        let cursor = self.depth_pass(world, dt, &roles, cursor, sprites, sink, &mut report);
        self.flush_entities(world, dt, &roles, cursor, sprites, sink, &mut report);

        report.log();
        report
    }

    /// Pass 1: draws every floor cell in traversal order.
    pub fn floor_pass<P, S>(
        &self,
        grid: &Grid,
        sprites: &P,
        sink: &mut S,
        report: &mut FrameReport,
    ) where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let floor = sprites.floor();
        for cell in self.order.iter() {
            if !grid.terrain(cell).is_some_and(|terrain| terrain.is_floor()) {
                continue;
            }

            match floor {
                Some(sprite) => {
                    self.draw_at_cell(sprite, cell, sink);
                    report.floor_tiles += 1;
                }
                None => report.missing_sprites += 1,
            }
        }
    }

    /// Pass 2: draws pellets and terrain in traversal order, interleaving entities.
    ///
    /// Returns the cursor so the caller can see which entities are still pending.
    #[allow(clippy::too_many_arguments)] // Each pass receives its frame state explicitly.
    pub fn depth_pass<P, S>(
        &self,
        world: &mut WorldSnapshot<'_>,
        dt: Duration,
        roles: &FrameRoles,
        mut cursor: EntityCursor,
        sprites: &P,
        sink: &mut S,
        report: &mut FrameReport,
    ) -> EntityCursor
    where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let pellet_sprite = sprites.pellet(roles.pellet_visibility()).first();

        for cell in self.order.iter() {
            if let Some(pellet) = world.pellets.get(&cell).filter(|pellet| pellet.active) {
                if !world.grid.contains(pellet.cell) {
                    report.skipped_pellets += 1;
                } else if let Some(sprite) = pellet_sprite {
                    let anchor = pellet.cell.position().offset(-0.5, -0.5);
                    let at = self.projector.project(anchor.x, anchor.y, sprite.size());
                    sink.draw_sprite(sprite, at);
                    report.pellets_drawn += 1;
                } else {
                    report.missing_sprites += 1;
                }
            }

            let Some(terrain) = world.grid.terrain(cell) else {
                continue;
            };
            if terrain.is_floor() {
                continue;
            }

            match sprites.terrain(terrain) {
                Some(sprite) => {
                    self.draw_at_cell(sprite, cell, sink);
                    report.terrain_tiles += 1;
                }
                None => report.missing_sprites += 1,
            }

            while let Some(index) = cursor.peek() {
                if !entity_follows_cell(&world.entities[index], cell) {
                    break;
                }
                self.draw_entity(&mut world.entities[index], dt, roles, sprites, sink, report);
                cursor.advance();
            }
        }

        cursor
    }

    /// Draws the entities the depth pass did not reach, in depth order.
    #[allow(clippy::too_many_arguments)] // Mirrors the depth pass signature.
    pub fn flush_entities<P, S>(
        &self,
        world: &mut WorldSnapshot<'_>,
        dt: Duration,
        roles: &FrameRoles,
        mut cursor: EntityCursor,
        sprites: &P,
        sink: &mut S,
        report: &mut FrameReport,
    ) where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        while let Some(index) = cursor.peek() {
            report.late_entities += 1;
            self.draw_entity(&mut world.entities[index], dt, roles, sprites, sink, report);
            cursor.advance();
        }
    }

    /// Draws the entity's current animation frame without a marker.
    ///
    /// Advances the animation clock first. Returns the frame drawn, or `None`
    /// when the provider has no frames for the entity.
    pub fn draw_entity_frame<P, S>(
        &self,
        entity: &mut Entity,
        dt: Duration,
        sprites: &P,
        sink: &mut S,
    ) -> Option<SpriteHandle>
    where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let frames = sprites.entity_frames(entity.role(), entity.direction);
        let _ = tick(&mut entity.animation, frames.len(), dt);
        self.draw_current_frame(entity, sprites, sink)
    }

    /// Draws the entity's current animation frame without advancing its clock.
    pub fn draw_current_frame<P, S>(
        &self,
        entity: &Entity,
        sprites: &P,
        sink: &mut S,
    ) -> Option<SpriteHandle>
    where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let frames = sprites.entity_frames(entity.role(), entity.direction);
        let frame = *frames.get(entity.animation.frame_index)?;

        let anchor = entity.position.offset(-0.5, -0.5);
        sink.draw_sprite(frame, self.projector.project(anchor.x, anchor.y, frame.size()));
        Some(frame)
    }

    fn draw_entity<P, S>(
        &self,
        entity: &mut Entity,
        dt: Duration,
        roles: &FrameRoles,
        sprites: &P,
        sink: &mut S,
        report: &mut FrameReport,
    ) where
        P: SpriteProvider + ?Sized,
        S: DrawSink + ?Sized,
    {
        let Some(frame) = self.draw_entity_frame(entity, dt, sprites, sink) else {
            report.missing_sprites += 1;
            return;
        };
        report.entities_drawn += 1;

        let Some(kind) = roles.marker_for(entity) else {
            return;
        };
        let Some(marker) = sprites.marker(kind) else {
            report.missing_sprites += 1;
            return;
        };

        // Stacking the frame height lifts the marker above the entity's head.
        let anchor = entity.position.offset(-0.5, -0.5);
        let footprint = Vec2::new(marker.width(), marker.height() + frame.height());
        sink.draw_sprite(marker, self.projector.project(anchor.x, anchor.y, footprint));
        report.markers_drawn += 1;
    }

    fn draw_at_cell<S>(&self, sprite: SpriteHandle, cell: CellCoord, sink: &mut S)
    where
        S: DrawSink + ?Sized,
    {
        let at = self
            .projector
            .project(cell.x() as f32, cell.y() as f32, sprite.size());
        sink.draw_sprite(sprite, at);
    }
}
