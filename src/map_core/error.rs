//! Error types for configuration and map generation.

/// Problems found while loading or validating a [`MapConfig`](super::config::MapConfig).
///
/// Every variant is detected before any generation work begins.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("map dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("noise scale must be a finite value greater than zero, got {0}")]
    InvalidScale(f32),

    #[error("{name} threshold must lie in [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f32 },

    #[error("swamp threshold ({swamp}) must not exceed forest threshold ({forest})")]
    SwampAboveForest { swamp: f32, forest: f32 },

    #[error("at least one intra-biome threshold is required")]
    EmptyIntraThresholds,

    #[error(
        "intra-biome thresholds must be in descending order: \
         index {index} ({next}) rises above the previous threshold ({prev})"
    )]
    IntraThresholdsNotDescending { index: usize, prev: f32, next: f32 },

    #[error("{biome} has {actual} tile variants, expected {expected} (one per intra-biome threshold)")]
    VariantCountMismatch {
        biome: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("river bias coefficient must lie in (0, 1], got {0}")]
    InvalidRiverBias(f32),

    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Fatal errors for a single generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("height field for a {width}x{height} grid needs one value per cell, got {actual}")]
    HeightFieldSize {
        width: usize,
        height: usize,
        actual: usize,
    },

    /// The tier list or intra-biome thresholds leave a gap that this height falls into.
    #[error("no tile matches height {height} at ({x}, {y})")]
    Unclassified { x: i32, y: i32, height: f32 },
}
