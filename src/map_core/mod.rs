#[macro_use]
mod par;

pub mod biome;
pub mod config;
pub mod error;
pub mod features;
pub mod generator;
pub mod grid;
pub mod layer;
pub mod noise_field;
pub mod rivers;
