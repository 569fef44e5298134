use glam::IVec2;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::map_core::config::{ThresholdConfig, TileConfig};
use crate::map_core::error::GenerationError;
use crate::map_core::grid::{HeightField, OccupancyGrid};
use crate::map_core::layer::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Forest,
    Swamp,
    Sea,
}

/// A concrete tile: the biome tier and the variant picked inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileType {
    pub biome: Biome,
    pub variant: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    River,
    Tile(TileType),
}

/// A height band owning one tile identifier per intra-biome threshold.
#[derive(Debug, Clone)]
pub struct BiomeTier {
    pub key: f32,
    pub biome: Biome,
    pub variants: Vec<String>,
}

/// Tiers sorted by descending key, plus the shared intra-biome thresholds.
#[derive(Debug, Clone)]
pub struct BiomeTiers {
    tiers: Vec<BiomeTier>,
    intra: Vec<f32>,
}

impl BiomeTiers {
    /// Builds the forest / swamp / sea ladder. Thresholds must already be validated.
    pub fn new(thresholds: &ThresholdConfig, tiles: &TileConfig) -> Self {
        let mut tiers = vec![
            BiomeTier {
                key: thresholds.forest,
                biome: Biome::Forest,
                variants: tiles.forest.clone(),
            },
            BiomeTier {
                key: thresholds.swamp,
                biome: Biome::Swamp,
                variants: tiles.swamp.clone(),
            },
            BiomeTier {
                key: 0.0,
                biome: Biome::Sea,
                variants: tiles.sea.clone(),
            },
        ];
        tiers.sort_by(|a, b| b.key.total_cmp(&a.key));
        Self {
            tiers,
            intra: thresholds.intra.clone(),
        }
    }

    pub fn tiers(&self) -> &[BiomeTier] {
        &self.tiers
    }

    pub fn intra(&self) -> &[f32] {
        &self.intra
    }

    pub fn tier(&self, biome: Biome) -> Option<&BiomeTier> {
        self.tiers.iter().find(|t| t.biome == biome)
    }

    /// Identifier configured for `tile`, if the variant exists.
    pub fn tile_id(&self, tile: TileType) -> Option<&str> {
        self.tier(tile.biome)
            .and_then(|t| t.variants.get(tile.variant))
            .map(String::as_str)
    }

    /// First tier whose key is at or below `height`, then the first intra-biome
    /// threshold at or below the height's position inside that tier.
    pub fn classify(&self, height: f32) -> Option<TileType> {
        let mut previous_key = 1.0;
        for tier in &self.tiers {
            if tier.key <= height {
                let span = previous_key - tier.key;
                let frac = if span > 0.0 {
                    (height - tier.key) / span
                } else {
                    1.0
                };
                return self
                    .intra
                    .iter()
                    .position(|t| *t <= frac)
                    .map(|variant| TileType {
                        biome: tier.biome,
                        variant,
                    });
            }
            previous_key = tier.key;
        }
        None
    }
}

pub struct ClassifierInput<'a> {
    pub field: &'a HeightField,
    pub occupancy: &'a OccupancyGrid,
}

pub struct BiomeClassifier {
    tiers: BiomeTiers,
}

impl BiomeClassifier {
    pub fn new(tiers: BiomeTiers) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &BiomeTiers {
        &self.tiers
    }

    pub fn classify(&self, field: &HeightField, pos: IVec2) -> Result<TileType, GenerationError> {
        let height = field.get(pos);
        self.tiers
            .classify(height)
            .ok_or(GenerationError::Unclassified {
                x: pos.x,
                y: pos.y,
                height,
            })
    }
}

/// Fills every unclaimed cell with a tile; claimed cells stay rivers.
impl<'a> Layer<ClassifierInput<'a>, Vec<Cell>> for BiomeClassifier {
    fn generate(&self, input: ClassifierInput<'a>) -> Result<Vec<Cell>, GenerationError> {
        let size = input.field.size();
        maybe_par_iter!(0..size.cell_count())
            .map(|idx| {
                let pos = size.coord(idx);
                if input.occupancy.is_occupied(pos) {
                    Ok(Cell::River)
                } else {
                    self.classify(input.field, pos).map(Cell::Tile)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_core::grid::GridSize;

    fn tiers(forest: f32, swamp: f32, intra: Vec<f32>) -> BiomeTiers {
        let n = intra.len();
        let names = |prefix: &str| (0..n).map(|i| format!("{prefix}_{i}")).collect();
        BiomeTiers::new(
            &ThresholdConfig {
                forest,
                swamp,
                intra,
            },
            &TileConfig {
                forest: names("forest"),
                swamp: names("swamp"),
                sea: names("sea"),
                river: "river".to_string(),
            },
        )
    }

    #[test]
    fn tiers_are_sorted_descending() {
        let t = tiers(0.6, 0.3, vec![0.5, 0.0]);
        let keys: Vec<f32> = t.tiers().iter().map(|t| t.key).collect();
        assert_eq!(keys, vec![0.6, 0.3, 0.0]);
    }

    #[test]
    fn picks_tier_then_variant() {
        let t = tiers(0.6, 0.3, vec![0.75, 0.5, 0.0]);
        // (0.95 - 0.6) / 0.4 = 0.875
        assert_eq!(
            t.classify(0.95),
            Some(TileType { biome: Biome::Forest, variant: 0 })
        );
        // (0.4 - 0.3) / 0.3 = 0.33
        assert_eq!(
            t.classify(0.4),
            Some(TileType { biome: Biome::Swamp, variant: 2 })
        );
        // 0.2 / 0.3 = 0.67
        assert_eq!(
            t.classify(0.2),
            Some(TileType { biome: Biome::Sea, variant: 1 })
        );
        assert_eq!(t.tile_id(TileType { biome: Biome::Sea, variant: 1 }), Some("sea_1"));
    }

    #[test]
    fn zero_height_lands_in_sea() {
        let t = tiers(0.6, 0.3, vec![0.5, 0.0]);
        assert_eq!(
            t.classify(0.0),
            Some(TileType { biome: Biome::Sea, variant: 1 })
        );
    }

    #[test]
    fn gap_in_thresholds_is_reported() {
        let t = tiers(0.6, 0.3, vec![0.5, 0.25]);
        assert_eq!(t.classify(0.31), None);

        let field = HeightField::from_values(GridSize::new(1, 1), vec![0.31]).unwrap();
        let occupancy = OccupancyGrid::new(field.size());
        let result = BiomeClassifier::new(t).generate(ClassifierInput {
            field: &field,
            occupancy: &occupancy,
        });
        assert!(matches!(result, Err(GenerationError::Unclassified { x: 0, y: 0, .. })));
    }

    #[test]
    fn top_of_range_with_forest_at_one() {
        let t = tiers(1.0, 0.3, vec![0.5, 0.0]);
        assert_eq!(
            t.classify(1.0),
            Some(TileType { biome: Biome::Forest, variant: 0 })
        );
    }

    #[test]
    fn chosen_thresholds_never_exceed_the_height() {
        let t = tiers(0.55, 0.25, vec![0.8, 0.6, 0.3, 0.0]);
        for i in 0..=100 {
            let h = i as f32 / 100.0;
            let tile = t.classify(h).unwrap();
            let mut previous = 1.0;
            for tier in t.tiers() {
                if tier.biome == tile.biome {
                    assert!(tier.key <= h);
                    let frac = (h - tier.key) / (previous - tier.key);
                    assert!(t.intra()[tile.variant] <= frac);
                    break;
                }
                previous = tier.key;
            }
        }
    }

    #[test]
    fn occupied_cells_stay_rivers() {
        let field = HeightField::from_values(GridSize::new(2, 1), vec![0.5, 0.5]).unwrap();
        let mut occupancy = OccupancyGrid::new(field.size());
        occupancy.claim(IVec2::new(1, 0));
        let cells = BiomeClassifier::new(tiers(0.6, 0.3, vec![0.5, 0.0]))
            .generate(ClassifierInput {
                field: &field,
                occupancy: &occupancy,
            })
            .unwrap();
        assert_eq!(
            cells,
            vec![
                Cell::Tile(TileType { biome: Biome::Swamp, variant: 0 }),
                Cell::River
            ]
        );
    }
}
