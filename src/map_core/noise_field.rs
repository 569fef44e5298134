//! Height field synthesis from coherent noise.

use glam::{IVec2, Vec2};
use noise::core::worley::ReturnType;
use noise::{NoiseFn, Perlin, Simplex, Worley};
use serde::{Deserialize, Serialize};
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

use crate::map_core::config::NoiseConfig;
use crate::map_core::error::GenerationError;
use crate::map_core::grid::{GridSize, HeightField};
use crate::map_core::layer::Layer;

/// Noise family used to build the height field.
///
/// A config that omits the kind gets [`NoiseKind::Perlin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    #[default]
    Perlin,
    Simplex,
    /// Distance to the nearest feature point, used directly as height.
    Worley,
}

enum Source {
    Perlin(Perlin),
    Simplex(Simplex),
    Worley(Worley),
}

impl Source {
    fn new(kind: NoiseKind, seed: u32) -> Self {
        match kind {
            NoiseKind::Perlin => Source::Perlin(Perlin::new(seed)),
            NoiseKind::Simplex => Source::Simplex(Simplex::new(seed)),
            NoiseKind::Worley => {
                Source::Worley(Worley::new(seed).set_return_type(ReturnType::Distance))
            }
        }
    }

    fn sample(&self, p: [f64; 2]) -> f32 {
        let v = match self {
            Source::Perlin(n) => (n.get(p) + 1.0) * 0.5,
            Source::Simplex(n) => (n.get(p) + 1.0) * 0.5,
            // The generator rescales distance to `d * 2 - 1`; undo that.
            Source::Worley(n) => (n.get(p) + 1.0) * 0.5,
        };
        (v as f32).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoiseField {
    kind: NoiseKind,
    seed: u32,
    offset: Vec2,
    scale: f32,
}

impl NoiseField {
    /// `config.scale` must already be validated as positive.
    pub fn new(seed: u32, config: &NoiseConfig) -> Self {
        Self {
            kind: config.kind,
            seed,
            offset: Vec2::from(config.offset),
            scale: config.scale,
        }
    }

    pub fn sample(&self, pos: IVec2) -> f32 {
        self.sample_from(&Source::new(self.kind, self.seed), pos)
    }

    fn sample_from(&self, source: &Source, pos: IVec2) -> f32 {
        let p = (pos.as_vec2() + self.offset) / self.scale;
        source.sample([p.x as f64, p.y as f64])
    }
}

impl Layer<GridSize, HeightField> for NoiseField {
    fn generate(&self, size: GridSize) -> Result<HeightField, GenerationError> {
        let field = *self;
        // One generator per row; the worley generator is not shared across threads.
        let rows: Vec<Vec<f32>> = maybe_par_iter!(0..size.height)
            .map(move |y| {
                let source = Source::new(field.kind, field.seed);
                (0..size.width)
                    .map(|x| field.sample_from(&source, IVec2::new(x as i32, y as i32)))
                    .collect()
            })
            .collect();
        HeightField::from_values(size, rows.concat())
    }
}
