use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::map_core::error::ConfigError;
use crate::map_core::noise_field::NoiseKind;

/// Recommended range for [`RiverConfig::bias`]. Values outside it still work but
/// produce rivers that either zig-zag or refuse to turn.
pub const RECOMMENDED_RIVER_BIAS: std::ops::RangeInclusive<f32> = 0.5..=0.8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u32,
    pub noise: NoiseConfig,
    pub thresholds: ThresholdConfig,
    pub river: RiverConfig,
    pub tiles: TileConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            seed: 0,
            noise: NoiseConfig::default(),
            thresholds: ThresholdConfig::default(),
            river: RiverConfig::default(),
            tiles: TileConfig::default(),
        }
    }
}

impl MapConfig {
    /// Reads a JSON config. A missing file is not an error: defaults are used.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("no {} found, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = serde_json::from_str(&contents).map_err(ConfigError::Parse)?;
        log::info!("loaded {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > i32::MAX as usize
            || self.height > i32::MAX as usize
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let scale = self.noise.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidScale(scale));
        }

        self.thresholds.validate()?;

        let bias = self.river.bias;
        if !bias.is_finite() || bias <= 0.0 || bias > 1.0 {
            return Err(ConfigError::InvalidRiverBias(bias));
        }
        if !RECOMMENDED_RIVER_BIAS.contains(&bias) {
            log::warn!(
                "river bias {bias} is outside the recommended range {:?}",
                RECOMMENDED_RIVER_BIAS
            );
        }

        let expected = self.thresholds.intra.len();
        for (biome, variants) in [
            ("forest", &self.tiles.forest),
            ("swamp", &self.tiles.swamp),
            ("sea", &self.tiles.sea),
        ] {
            if variants.len() != expected {
                return Err(ConfigError::VariantCountMismatch {
                    biome,
                    expected,
                    actual: variants.len(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub kind: NoiseKind,
    pub offset: [f32; 2],
    /// Size of a biome in cells. Sample coordinates are divided by it.
    pub scale: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            kind: NoiseKind::default(),
            offset: [0.0, 0.0],
            scale: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub forest: f32,
    pub swamp: f32,
    /// Descending cutoffs that pick a variant inside a biome tier.
    pub intra: Vec<f32>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            forest: 0.6,
            swamp: 0.35,
            intra: vec![0.75, 0.5, 0.25, 0.0],
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("forest", self.forest), ("swamp", self.swamp)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        if self.swamp > self.forest {
            return Err(ConfigError::SwampAboveForest {
                swamp: self.swamp,
                forest: self.forest,
            });
        }

        if self.intra.is_empty() {
            return Err(ConfigError::EmptyIntraThresholds);
        }
        if let Some(&value) = self.intra.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: "intra-biome",
                value,
            });
        }
        for index in 1..self.intra.len() {
            let (prev, next) = (self.intra[index - 1], self.intra[index]);
            if next > prev {
                return Err(ConfigError::IntraThresholdsNotDescending { index, prev, next });
            }
        }

        Ok(())
    }

    /// Lowest height at which a local maximum counts as a mountain peak.
    pub fn mountain_band(&self) -> f32 {
        self.intra[0] * (1.0 - self.forest) + self.forest
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    pub bias: f32,
    /// Walk length after which a river is abandoned. Defaults to `width * height`.
    pub max_river_steps: Option<usize>,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            bias: 0.65,
            max_river_steps: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub forest: Vec<String>,
    pub swamp: Vec<String>,
    pub sea: Vec<String>,
    pub river: String,
}

impl Default for TileConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            forest: names(&["forest_peak", "forest_dense", "forest", "forest_edge"]),
            swamp: names(&["swamp_reeds", "swamp", "swamp_bog", "swamp_mud"]),
            sea: names(&["sea_shallows", "sea", "sea_deep", "sea_abyss"]),
            river: "river".to_string(),
        }
    }
}
