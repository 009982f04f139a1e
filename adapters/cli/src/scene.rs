use std::{fs, path::Path};

use anyhow::{Context, Result};
use mipsman_core::{pellet_map, Entity, Grid, Pellet, PelletMap};
use mipsman_rendering::WorldSnapshot;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    rows: Vec<String>,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    pellets: Vec<Pellet>,
}

/// Map, entities and pellets replayed by the command-line adapter.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scene {
    grid: Grid,
    entities: Vec<Entity>,
    pellets: PelletMap,
}

impl Scene {
    /// Loads a scene description from disk.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid scene at {}", path.display()))
    }

    /// Parses a scene from TOML source.
    ///
    /// Each entry of `rows` is one grid row with one digit per cell code.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let file: SceneFile =
            toml::from_str(contents).context("failed to parse scene toml contents")?;
        let rows = file
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect::<Result<Vec<_>>>()?;
        let grid = Grid::from_rows(&rows).context("scene rows do not form a valid grid")?;

        Ok(Self {
            grid,
            entities: file.entities,
            pellets: pellet_map(file.pellets),
        })
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn pellets(&self) -> &PelletMap {
        &self.pellets
    }

    /// Borrows the scene as the state for one frame.
    pub(crate) fn snapshot(&mut self) -> WorldSnapshot<'_> {
        WorldSnapshot::new(&self.grid, &mut self.entities, &self.pellets)
    }
}

fn parse_row(index: usize, row: &str) -> Result<Vec<u8>> {
    row.trim()
        .chars()
        .map(|cell| {
            cell.to_digit(10)
                .and_then(|code| u8::try_from(code).ok())
                .with_context(|| format!("row {index} contains non-digit cell `{cell}`"))
        })
        .collect()
}
