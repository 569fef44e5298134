use glam::{IVec2, Vec2};

use crate::map_core::biome::{BiomeClassifier, BiomeTiers, Cell, ClassifierInput, TileType};
use crate::map_core::config::MapConfig;
use crate::map_core::error::GenerationError;
use crate::map_core::features::{FeatureDetector, FeatureSets};
use crate::map_core::grid::{GridSize, HeightField, OccupancyGrid};
use crate::map_core::layer::Layer;
use crate::map_core::noise_field::NoiseField;
use crate::map_core::rivers::{RiverInput, RiverNetwork, RiverSimulator};

/// Finished map, handed read-only to whatever draws it.
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub heights: HeightField,
    pub features: FeatureSets,
    pub rivers: RiverNetwork,
    cells: Vec<Cell>,
}

impl GeneratedMap {
    pub fn size(&self) -> GridSize {
        self.heights.size()
    }

    pub fn width(&self) -> usize {
        self.heights.width()
    }

    pub fn height(&self) -> usize {
        self.heights.height()
    }

    pub fn cell(&self, pos: IVec2) -> Cell {
        self.cells[self.size().index(pos)]
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn tile(&self, pos: IVec2) -> Option<TileType> {
        match self.cell(pos) {
            Cell::Tile(tile) => Some(tile),
            Cell::River => None,
        }
    }

    pub fn is_river(&self, pos: IVec2) -> bool {
        self.cell(pos) == Cell::River
    }

    /// Middle of the map in cell units, where a viewer should centre.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.width() as f32 - 1.0) / 2.0,
            (self.height() as f32 - 1.0) / 2.0,
        )
    }
}

pub struct MapGenerator {
    size: GridSize,
    noise: NoiseField,
    features: FeatureDetector,
    rivers: RiverSimulator,
    classifier: BiomeClassifier,
}

impl MapGenerator {
    /// Validates `config` and prepares every stage. Nothing is generated yet.
    pub fn new(config: &MapConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let tiers = BiomeTiers::new(&config.thresholds, &config.tiles);
        Ok(Self {
            size: GridSize::new(config.width, config.height),
            noise: NoiseField::new(config.seed, &config.noise),
            features: FeatureDetector::new(&config.thresholds),
            rivers: RiverSimulator::new(&config.thresholds, &config.river),
            classifier: BiomeClassifier::new(tiers),
        })
    }

    pub fn tiers(&self) -> &BiomeTiers {
        self.classifier.tiers()
    }

    pub fn generate(&self) -> Result<GeneratedMap, GenerationError> {
        let heights = self.noise.generate(self.size)?;
        log::debug!("sampled {}x{} height field", self.size.width, self.size.height);

        self.generate_from_heights(heights)
    }

    /// Runs every stage after noise on a prepared height field of any size.
    pub fn generate_from_heights(
        &self,
        heights: HeightField,
    ) -> Result<GeneratedMap, GenerationError> {
        let features = self.features.generate(&heights)?;

        let mut occupancy = OccupancyGrid::new(heights.size());
        let rivers = self.rivers.generate(RiverInput {
            field: &heights,
            occupancy: &mut occupancy,
            features: &features,
        })?;
        log::debug!(
            "carved {} rivers over {} cells ({} abandoned)",
            rivers.rivers.len(),
            rivers.cell_count(),
            rivers.faults.len()
        );

        let cells = self.classifier.generate(ClassifierInput {
            field: &heights,
            occupancy: &occupancy,
        })?;
        for (idx, cell) in cells.iter().enumerate() {
            if matches!(cell, Cell::Tile(_)) {
                occupancy.claim(heights.size().coord(idx));
            }
        }
        debug_assert_eq!(occupancy.occupied_count(), heights.size().cell_count());

        log::info!(
            "generated {}x{} map: {} peaks, {} lakes, {} rivers",
            heights.width(),
            heights.height(),
            features.peaks.len(),
            features.lake_bottoms.len(),
            rivers.rivers.len()
        );

        Ok(GeneratedMap {
            heights,
            features,
            rivers,
            cells,
        })
    }
}
