#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the MIPSman presentation layer.
//!
//! This crate defines the world snapshot the compositor consumes: the
//! immutable [`Grid`] of terrain codes, the moving [`Entity`] values owned by
//! connected clients, and the consumable [`Pellet`] overlays. The gameplay
//! layer produces these values; presentation systems only ever read them,
//! with the single exception of the per-entity [`AnimationState`].

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terrain code reserved for walkable floor cells.
pub const FLOOR_CODE: u8 = 0;

/// Unique identifier assigned to a connected client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u32);

impl ClientId {
    /// Creates a new client identifier with the provided numeric value.
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

/// Location of a single grid cell.
///
/// `x` indexes the grid's rows and `y` its columns, matching the layout the
/// isometric projection expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Depth key of the cell; larger values are nearer to the viewer.
    #[must_use]
    pub const fn depth_key(&self) -> u32 {
        self.x + self.y
    }

    /// Continuous position of the cell's anchor.
    #[must_use]
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.x as f32, self.y as f32)
    }
}

/// Continuous grid-space position used by entities that interpolate between cells.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Position along the row axis.
    pub x: f32,
    /// Position along the column axis.
    pub y: f32,
}

impl GridPosition {
    /// Creates a new continuous position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Depth key of the position; see [`CellCoord::depth_key`].
    #[must_use]
    pub fn depth_key(&self) -> f32 {
        self.x + self.y
    }

    /// Returns a copy shifted by the provided amounts.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Kind of terrain stored in a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Terrain {
    /// Walkable floor, always drawn underneath everything else.
    Floor,
    /// Wall or obstacle identified by its non-zero terrain code.
    Wall(u8),
}

impl Terrain {
    /// Decodes a raw terrain code.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        if code == FLOOR_CODE {
            Self::Floor
        } else {
            Self::Wall(code)
        }
    }

    /// Raw code of the terrain.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Floor => FLOOR_CODE,
            Self::Wall(code) => code,
        }
    }

    /// Whether the terrain is floor.
    #[must_use]
    pub const fn is_floor(self) -> bool {
        matches!(self, Self::Floor)
    }
}

/// Errors raised while constructing a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Grids must contain at least one row and one column.
    #[error("grid dimensions must be positive (received {rows}x{columns})")]
    EmptyDimensions {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// The supplied cell codes do not fill the grid exactly.
    #[error("grid of {rows}x{columns} requires {expected} cells (received {actual})")]
    CellCountMismatch {
        /// Requested number of rows.
        rows: u32,
        /// Requested number of columns.
        columns: u32,
        /// Number of cells implied by the dimensions.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },
    /// A cell coordinate fell outside the grid.
    #[error("cell ({x}, {y}) lies outside the grid")]
    OutOfBounds {
        /// Row index of the rejected cell.
        x: u32,
        /// Column index of the rejected cell.
        y: u32,
    },
}

/// Rectangular map of terrain codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    columns: u32,
    cells: Vec<Terrain>,
}

impl Grid {
    /// Creates a grid from row-major terrain codes.
    pub fn new(rows: u32, columns: u32, codes: &[u8]) -> Result<Self, GridError> {
        let expected = Self::checked_cell_count(rows, columns)?;
        if codes.len() != expected {
            return Err(GridError::CellCountMismatch {
                rows,
                columns,
                expected,
                actual: codes.len(),
            });
        }

        Ok(Self {
            rows,
            columns,
            cells: codes.iter().copied().map(Terrain::from_code).collect(),
        })
    }

    /// Creates a grid where every cell holds the same terrain.
    pub fn filled(rows: u32, columns: u32, terrain: Terrain) -> Result<Self, GridError> {
        let count = Self::checked_cell_count(rows, columns)?;
        Ok(Self {
            rows,
            columns,
            cells: vec![terrain; count],
        })
    }

    /// Creates a grid from one vector of terrain codes per row.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let row_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let columns = rows.first().map_or(0, Vec::len);
        let column_count = u32::try_from(columns).unwrap_or(u32::MAX);
        let codes: Vec<u8> = rows.iter().flatten().copied().collect();

        if rows.iter().any(|row| row.len() != columns) {
            return Err(GridError::CellCountMismatch {
                rows: row_count,
                columns: column_count,
                expected: rows.len() * columns,
                actual: codes.len(),
            });
        }

        Self::new(row_count, column_count, &codes)
    }

    /// Returns a copy of the grid with a single cell replaced.
    pub fn with_terrain(mut self, cell: CellCoord, terrain: Terrain) -> Result<Self, GridError> {
        let index = self.index(cell).ok_or(GridError::OutOfBounds {
            x: cell.x(),
            y: cell.y(),
        })?;
        self.cells[index] = terrain;
        Ok(self)
    }

    /// Number of rows (extent of the `x` axis).
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns (extent of the `y` axis).
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Rows and columns as a pair.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Whether the coordinate addresses a cell inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x() < self.rows && cell.y() < self.columns
    }

    /// Whether a continuous position lies over the grid.
    #[must_use]
    pub fn contains_position(&self, position: GridPosition) -> bool {
        position.is_finite()
            && position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.rows as f32
            && position.y < self.columns as f32
    }

    /// Terrain stored at the provided cell.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell).map(|index| self.cells[index])
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let columns = usize::try_from(self.columns).ok()?;
        Some(x * columns + y)
    }

    fn checked_cell_count(rows: u32, columns: u32) -> Result<usize, GridError> {
        if rows == 0 || columns == 0 {
            return Err(GridError::EmptyDimensions { rows, columns });
        }
        let rows_usize = usize::try_from(rows).unwrap_or(usize::MAX);
        let columns_usize = usize::try_from(columns).unwrap_or(usize::MAX);
        Ok(rows_usize.saturating_mul(columns_usize))
    }
}

/// Cardinal facing directions available to entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Facing toward decreasing `y`.
    North,
    /// Facing toward increasing `x`.
    East,
    /// Facing toward increasing `y`.
    South,
    /// Facing toward decreasing `x`.
    West,
}

/// Role an entity currently plays in the chase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    /// Pursuing the chased entity.
    Chaser,
    /// The single entity everyone else pursues.
    Chased,
}

/// Frame-timing fields advanced by the animation clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    /// Index of the frame currently shown.
    #[serde(default)]
    pub frame_index: usize,
    /// Time accumulated since the frame last advanced.
    #[serde(default)]
    pub elapsed: Duration,
    /// Playback rate in frames per second.
    pub speed: f32,
}

impl AnimationState {
    /// Creates an animation state positioned at the first frame.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            frame_index: 0,
            elapsed: Duration::ZERO,
            speed,
        }
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Snapshot of a moving entity as resolved by the gameplay layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Client controlling the entity.
    pub client: ClientId,
    /// Interpolated position of the entity.
    pub position: GridPosition,
    /// Direction the entity is facing.
    pub direction: Direction,
    /// Whether the entity currently holds the chased role.
    #[serde(default)]
    pub chased: bool,
    /// Animation timing owned by the presentation layer.
    #[serde(default)]
    pub animation: AnimationState,
}

impl Entity {
    /// Creates a chaser entity with a frozen animation.
    #[must_use]
    pub fn new(client: ClientId, position: GridPosition, direction: Direction) -> Self {
        Self {
            client,
            position,
            direction,
            chased: false,
            animation: AnimationState::default(),
        }
    }

    /// Marks whether the entity holds the chased role.
    #[must_use]
    pub fn with_chased(mut self, chased: bool) -> Self {
        self.chased = chased;
        self
    }

    /// Overrides the animation playback rate.
    #[must_use]
    pub fn with_animation_speed(mut self, speed: f32) -> Self {
        self.animation.speed = speed;
        self
    }

    /// Role derived from the chased flag.
    #[must_use]
    pub const fn role(&self) -> EntityRole {
        if self.chased {
            EntityRole::Chased
        } else {
            EntityRole::Chaser
        }
    }
}

/// Consumable item anchored to a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pellet {
    /// Cell the pellet sits on.
    pub cell: CellCoord,
    /// Whether the pellet is still available.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Pellet {
    /// Creates an active pellet at the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord) -> Self {
        Self { cell, active: true }
    }

    /// Overrides the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Pellets keyed by the cell they occupy.
pub type PelletMap = HashMap<CellCoord, Pellet>;

/// Collects pellets into a map keyed by their own cell.
#[must_use]
pub fn pellet_map<I>(pellets: I) -> PelletMap
where
    I: IntoIterator<Item = Pellet>,
{
    pellets
        .into_iter()
        .map(|pellet| (pellet.cell, pellet))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_key_sums_coordinates() {
        assert_eq!(CellCoord::new(3, 4).depth_key(), 7);
        assert!((GridPosition::new(1.5, 2.25).depth_key() - 3.75).abs() < f32::EPSILON);
    }

    #[test]
    fn terrain_codes_decode_floor_and_walls() {
        assert_eq!(Terrain::from_code(0), Terrain::Floor);
        assert_eq!(Terrain::from_code(3), Terrain::Wall(3));
        assert_eq!(Terrain::Wall(3).code(), 3);
        assert!(Terrain::Floor.is_floor());
    }

    #[test]
    fn grid_rejects_empty_dimensions() {
        let error = Grid::filled(0, 4, Terrain::Floor).expect_err("zero rows must fail");
        assert_eq!(
            error,
            GridError::EmptyDimensions {
                rows: 0,
                columns: 4
            }
        );
    }

    #[test]
    fn grid_rejects_mismatched_cell_count() {
        let error = Grid::new(2, 2, &[0, 0, 0]).expect_err("three cells cannot fill 2x2");
        assert!(matches!(
            error,
            GridError::CellCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn grid_rows_are_indexed_by_x() {
        let grid = Grid::from_rows(&[vec![0, 1, 0], vec![0, 0, 2]]).expect("valid rows");

        assert_eq!(grid.dimensions(), (2, 3));
        assert_eq!(grid.terrain(CellCoord::new(0, 1)), Some(Terrain::Wall(1)));
        assert_eq!(grid.terrain(CellCoord::new(1, 2)), Some(Terrain::Wall(2)));
        assert_eq!(grid.terrain(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(Grid::from_rows(&[vec![0, 0], vec![0]]).is_err());
    }

    #[test]
    fn with_terrain_rejects_cells_outside_grid() {
        let grid = Grid::filled(2, 2, Terrain::Floor).expect("valid grid");
        let error = grid
            .with_terrain(CellCoord::new(2, 0), Terrain::Wall(1))
            .expect_err("out-of-bounds cell");
        assert_eq!(error, GridError::OutOfBounds { x: 2, y: 0 });
    }

    #[test]
    fn contains_position_rejects_non_finite_and_outside_values() {
        let grid = Grid::filled(3, 3, Terrain::Floor).expect("valid grid");

        assert!(grid.contains_position(GridPosition::new(2.9, 0.0)));
        assert!(!grid.contains_position(GridPosition::new(3.0, 0.0)));
        assert!(!grid.contains_position(GridPosition::new(-0.1, 1.0)));
        assert!(!grid.contains_position(GridPosition::new(f32::NAN, 1.0)));
    }

    #[test]
    fn entity_role_follows_chased_flag() {
        let entity = Entity::new(ClientId::new(1), GridPosition::new(0.0, 0.0), Direction::East);
        assert_eq!(entity.role(), EntityRole::Chaser);
        assert_eq!(entity.with_chased(true).role(), EntityRole::Chased);
    }

    #[test]
    fn pellet_map_keys_pellets_by_cell() {
        let pellets = pellet_map([
            Pellet::new(CellCoord::new(1, 1)),
            Pellet::new(CellCoord::new(2, 0)).with_active(false),
        ]);

        assert_eq!(pellets.len(), 2);
        assert!(pellets[&CellCoord::new(1, 1)].active);
        assert!(!pellets[&CellCoord::new(2, 0)].active);
    }
}
