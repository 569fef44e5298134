use glam::IVec2;
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

use crate::map_core::config::ThresholdConfig;
use crate::map_core::error::GenerationError;
use crate::map_core::grid::HeightField;
use crate::map_core::layer::Layer;

/// River sources and sinks, in scan order (column by column).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSets {
    pub peaks: Vec<IVec2>,
    pub lake_bottoms: Vec<IVec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Peak,
    LakeBottom,
}

pub struct FeatureDetector {
    mountain_band: f32,
    swamp: f32,
}

impl FeatureDetector {
    pub fn new(thresholds: &ThresholdConfig) -> Self {
        Self {
            mountain_band: thresholds.mountain_band(),
            swamp: thresholds.swamp,
        }
    }

    fn classify(&self, field: &HeightField, pos: IVec2) -> Option<Feature> {
        let h = field.get(pos);
        let mut neighbours = field.size().neighbours(pos).map(|n| field.get(n));
        if h >= self.mountain_band {
            neighbours.all(|n| n <= h).then_some(Feature::Peak)
        } else if h < self.swamp {
            neighbours.all(|n| n >= h).then_some(Feature::LakeBottom)
        } else {
            None
        }
    }
}

impl Layer<&HeightField, FeatureSets> for FeatureDetector {
    fn generate(&self, field: &HeightField) -> Result<FeatureSets, GenerationError> {
        let size = field.size();
        let rows = size.height;
        let found: Vec<(IVec2, Feature)> = maybe_par_iter!(0..size.cell_count())
            .filter_map(|k| {
                let pos = IVec2::new((k / rows) as i32, (k % rows) as i32);
                self.classify(field, pos).map(|f| (pos, f))
            })
            .collect();

        let mut sets = FeatureSets::default();
        for (pos, feature) in found {
            match feature {
                Feature::Peak => sets.peaks.push(pos),
                Feature::LakeBottom => sets.lake_bottoms.push(pos),
            }
        }
        log::debug!(
            "found {} peaks and {} lake bottoms",
            sets.peaks.len(),
            sets.lake_bottoms.len()
        );
        Ok(sets)
    }
}
