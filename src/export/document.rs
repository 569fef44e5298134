use std::path::Path;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::map_core::biome::{Biome, BiomeTiers, Cell};
use crate::map_core::generator::GeneratedMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellEntry {
    pub x: i32,
    pub y: i32,
    pub height: f32,
    /// `None` for river cells.
    pub biome: Option<Biome>,
    pub variant: Option<usize>,
    pub tile: String,
}

/// Everything a renderer needs to place tiles, in one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDocument {
    pub width: usize,
    pub height: usize,
    pub center: [f32; 2],
    pub river_tile: String,
    pub rivers: Vec<Vec<[i32; 2]>>,
    pub cells: Vec<CellEntry>,
}

impl MapDocument {
    /// Fails if a cell's variant has no configured tile identifier.
    pub fn new(map: &GeneratedMap, tiers: &BiomeTiers, river_tile: &str) -> anyhow::Result<Self> {
        let size = map.size();
        let cells = map
            .cells()
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let pos = size.coord(idx);
                let (biome, variant, tile) = match cell {
                    Cell::River => (None, None, river_tile),
                    Cell::Tile(t) => {
                        let id = tiers.tile_id(*t).ok_or_else(|| {
                            anyhow!(
                                "no {:?} tile for variant {} at ({}, {})",
                                t.biome,
                                t.variant,
                                pos.x,
                                pos.y
                            )
                        })?;
                        (Some(t.biome), Some(t.variant), id)
                    }
                };
                Ok(CellEntry {
                    x: pos.x,
                    y: pos.y,
                    height: map.heights.get(pos),
                    biome,
                    variant,
                    tile: tile.to_string(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            width: map.width(),
            height: map.height(),
            center: map.center().to_array(),
            river_tile: river_tile.to_string(),
            rivers: map
                .rivers
                .rivers
                .iter()
                .map(|r| r.cells.iter().map(|c| c.to_array()).collect())
                .collect(),
            cells,
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote map document to {}", path.display());
        Ok(())
    }
}
