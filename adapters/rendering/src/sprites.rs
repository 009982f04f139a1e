use std::collections::HashMap;

use glam::Vec2;
use mipsman_core::{Direction, EntityRole, Terrain};

/// Opaque identifier of a decoded sprite owned by the asset layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(u32);

impl SpriteId {
    /// Creates a new sprite identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Sprite reference handed to the draw primitive, with its pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteHandle {
    id: SpriteId,
    size: Vec2,
}

impl SpriteHandle {
    /// Creates a handle for a sprite of the provided dimensions.
    #[must_use]
    pub const fn new(id: SpriteId, width: f32, height: f32) -> Self {
        Self {
            id,
            size: Vec2::new(width, height),
        }
    }

    /// Identifier of the sprite.
    #[must_use]
    pub const fn id(&self) -> SpriteId {
        self.id
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.x
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.y
    }

    /// Dimensions as (width, height).
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }
}

/// How pellets appear to the local player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PelletVisibility {
    /// The local player holds the chased role and sees pellets in full.
    Opaque,
    /// Everyone else only sees a faint hint of each pellet.
    Translucent,
}

impl PelletVisibility {
    /// Selects the visibility for a local player that does or does not hold the chase.
    #[must_use]
    pub const fn for_local_player(holds_chase: bool) -> Self {
        if holds_chase {
            Self::Opaque
        } else {
            Self::Translucent
        }
    }
}

/// Frames of a sprite tagged with the variant they belong to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteVariant<'a> {
    /// Fully opaque frames.
    Opaque(&'a [SpriteHandle]),
    /// Translucent frames.
    Translucent(&'a [SpriteHandle]),
}

impl<'a> SpriteVariant<'a> {
    /// Frames of the variant.
    #[must_use]
    pub const fn frames(&self) -> &'a [SpriteHandle] {
        match *self {
            Self::Opaque(frames) | Self::Translucent(frames) => frames,
        }
    }

    /// First frame of the variant, used for static overlays.
    #[must_use]
    pub fn first(&self) -> Option<SpriteHandle> {
        self.frames().first().copied()
    }

    /// Visibility the variant represents.
    #[must_use]
    pub const fn visibility(&self) -> PelletVisibility {
        match self {
            Self::Opaque(_) => PelletVisibility::Opaque,
            Self::Translucent(_) => PelletVisibility::Translucent,
        }
    }
}

/// Marker drawn above distinguished entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Marks the entity holding the chased role.
    Chased,
    /// Marks the entity controlled by the local client.
    LocalClient,
}

/// Source of sprite handles for everything the compositor draws.
pub trait SpriteProvider {
    /// Sprite for a terrain code.
    fn terrain(&self, terrain: Terrain) -> Option<SpriteHandle>;

    /// Floor sprite; its dimensions define the tile footprint.
    fn floor(&self) -> Option<SpriteHandle> {
        self.terrain(Terrain::Floor)
    }

    /// Pellet frames for the requested visibility.
    fn pellet(&self, visibility: PelletVisibility) -> SpriteVariant<'_>;

    /// Animation frames for an entity's role and facing.
    fn entity_frames(&self, role: EntityRole, direction: Direction) -> &[SpriteHandle];

    /// Marker sprite of the requested kind.
    fn marker(&self, kind: MarkerKind) -> Option<SpriteHandle>;
}

/// In-memory [`SpriteProvider`] assembled from a manifest or by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteSheet {
    terrain: HashMap<Terrain, SpriteHandle>,
    pellet_opaque: Vec<SpriteHandle>,
    pellet_translucent: Vec<SpriteHandle>,
    markers: HashMap<MarkerKind, SpriteHandle>,
    animations: HashMap<(EntityRole, Direction), Vec<SpriteHandle>>,
}

impl SpriteSheet {
    /// Creates a sheet holding only the floor sprite.
    #[must_use]
    pub fn new(floor: SpriteHandle) -> Self {
        Self {
            terrain: HashMap::from([(Terrain::Floor, floor)]),
            pellet_opaque: Vec::new(),
            pellet_translucent: Vec::new(),
            markers: HashMap::new(),
            animations: HashMap::new(),
        }
    }

    /// Registers the sprite drawn for a terrain code.
    #[must_use]
    pub fn with_terrain(mut self, terrain: Terrain, sprite: SpriteHandle) -> Self {
        let _ = self.terrain.insert(terrain, sprite);
        self
    }

    /// Registers the pellet frames for both visibility variants.
    #[must_use]
    pub fn with_pellet(
        mut self,
        opaque: Vec<SpriteHandle>,
        translucent: Vec<SpriteHandle>,
    ) -> Self {
        self.pellet_opaque = opaque;
        self.pellet_translucent = translucent;
        self
    }

    /// Registers a marker sprite.
    #[must_use]
    pub fn with_marker(mut self, kind: MarkerKind, sprite: SpriteHandle) -> Self {
        let _ = self.markers.insert(kind, sprite);
        self
    }

    /// Registers the animation frames for a role and facing.
    #[must_use]
    pub fn with_animation(
        mut self,
        role: EntityRole,
        direction: Direction,
        frames: Vec<SpriteHandle>,
    ) -> Self {
        let _ = self.animations.insert((role, direction), frames);
        self
    }

    /// Whether an animation has been registered for the role and facing.
    #[must_use]
    pub fn has_animation(&self, role: EntityRole, direction: Direction) -> bool {
        self.animations.contains_key(&(role, direction))
    }
}

impl SpriteProvider for SpriteSheet {
    fn terrain(&self, terrain: Terrain) -> Option<SpriteHandle> {
        self.terrain.get(&terrain).copied()
    }

    fn pellet(&self, visibility: PelletVisibility) -> SpriteVariant<'_> {
        match visibility {
            PelletVisibility::Opaque => SpriteVariant::Opaque(&self.pellet_opaque),
            PelletVisibility::Translucent => SpriteVariant::Translucent(&self.pellet_translucent),
        }
    }

    fn entity_frames(&self, role: EntityRole, direction: Direction) -> &[SpriteHandle] {
        self.animations
            .get(&(role, direction))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn marker(&self, kind: MarkerKind) -> Option<SpriteHandle> {
        self.markers.get(&kind).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u32) -> SpriteHandle {
        SpriteHandle::new(SpriteId::new(id), 16.0, 16.0)
    }

    #[test]
    fn pellet_variant_follows_local_chase() {
        let sheet = SpriteSheet::new(handle(1)).with_pellet(vec![handle(10)], vec![handle(11)]);

        let opaque = sheet.pellet(PelletVisibility::for_local_player(true));
        let translucent = sheet.pellet(PelletVisibility::for_local_player(false));

        assert_eq!(opaque.visibility(), PelletVisibility::Opaque);
        assert_eq!(opaque.first(), Some(handle(10)));
        assert_eq!(translucent.visibility(), PelletVisibility::Translucent);
        assert_eq!(translucent.first(), Some(handle(11)));
    }

    #[test]
    fn missing_animation_yields_no_frames() {
        let sheet = SpriteSheet::new(handle(1));
        assert!(sheet
            .entity_frames(EntityRole::Chased, Direction::West)
            .is_empty());
        assert!(!sheet.has_animation(EntityRole::Chased, Direction::West));
    }

    #[test]
    fn floor_defaults_to_floor_terrain() {
        let sheet = SpriteSheet::new(handle(1)).with_terrain(Terrain::Wall(2), handle(2));

        assert_eq!(sheet.floor(), Some(handle(1)));
        assert_eq!(sheet.terrain(Terrain::Wall(2)), Some(handle(2)));
        assert_eq!(sheet.terrain(Terrain::Wall(3)), None);
    }
}
