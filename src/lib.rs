pub mod cli;
pub mod export;
pub mod map_core;

pub use map_core::config::MapConfig;
pub use map_core::error::{ConfigError, GenerationError};
pub use map_core::generator::{GeneratedMap, MapGenerator};
