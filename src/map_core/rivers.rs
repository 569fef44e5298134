//! River carving: each peak sends a river downhill toward its nearest lake.
//!
//! Walks run one after another because every river claims cells in the shared
//! [`OccupancyGrid`], and later rivers have to route around earlier ones.

use glam::{IVec2, Vec2};

use crate::map_core::config::{RiverConfig, ThresholdConfig};
use crate::map_core::error::GenerationError;
use crate::map_core::features::FeatureSets;
use crate::map_core::grid::{HeightField, OccupancyGrid, NEIGHBOUR_OFFSETS};
use crate::map_core::layer::Layer;

/// Compass bearings, in the same clockwise order as [`NEIGHBOUR_OFFSETS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bearing {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Bearing {
    /// Picks the bearing for a step along `delta`.
    ///
    /// An axis wins when it dominates the other one even after scaling by `bias`;
    /// otherwise the step goes diagonally.
    pub fn toward(delta: Vec2, bias: f32) -> Self {
        if (delta.x * bias).abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Bearing::East
            } else {
                Bearing::West
            }
        } else if (delta.y * bias).abs() > delta.x.abs() {
            if delta.y > 0.0 {
                Bearing::North
            } else {
                Bearing::South
            }
        } else {
            match (delta.x > 0.0, delta.y > 0.0) {
                (true, true) => Bearing::NorthEast,
                (false, true) => Bearing::NorthWest,
                (true, false) => Bearing::SouthEast,
                (false, false) => Bearing::SouthWest,
            }
        }
    }

    const ALL: [Bearing; 8] = [
        Bearing::North,
        Bearing::NorthEast,
        Bearing::East,
        Bearing::SouthEast,
        Bearing::South,
        Bearing::SouthWest,
        Bearing::West,
        Bearing::NorthWest,
    ];

    pub fn offset(self) -> IVec2 {
        NEIGHBOUR_OFFSETS[self as usize]
    }

    pub fn counter_clockwise(self) -> Self {
        Self::ALL[(self as usize + 7) % 8]
    }

    pub fn clockwise(self) -> Self {
        Self::ALL[(self as usize + 1) % 8]
    }

    /// The bearing itself, then its counter-clockwise and clockwise neighbours.
    pub fn fan(self) -> [IVec2; 3] {
        [
            self.offset(),
            self.counter_clockwise().offset(),
            self.clockwise().offset(),
        ]
    }
}

/// A river that could not reach its lake. Its cells are released again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiverFault {
    #[error("river from {peak} gave up after {steps} steps")]
    StepLimit { peak: IVec2, steps: usize },

    #[error("river from {peak} is boxed in at {at}")]
    Blocked { peak: IVec2, at: IVec2 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct River {
    pub source: IVec2,
    pub lake: IVec2,
    /// Claimed cells from source to mouth. Excludes the peak and the terminal lake cell.
    pub cells: Vec<IVec2>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiverNetwork {
    pub rivers: Vec<River>,
    pub faults: Vec<RiverFault>,
}

impl RiverNetwork {
    /// Every river cell, in carve order.
    pub fn cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.rivers.iter().flat_map(|r| r.cells.iter().copied())
    }

    pub fn cell_count(&self) -> usize {
        self.rivers.iter().map(|r| r.cells.len()).sum()
    }
}

pub struct RiverInput<'a> {
    pub field: &'a HeightField,
    pub occupancy: &'a mut OccupancyGrid,
    pub features: &'a FeatureSets,
}

pub struct RiverSimulator {
    swamp: f32,
    bias: f32,
    max_steps: Option<usize>,
}

impl RiverSimulator {
    pub fn new(thresholds: &ThresholdConfig, config: &RiverConfig) -> Self {
        Self {
            swamp: thresholds.swamp,
            bias: config.bias,
            max_steps: config.max_river_steps,
        }
    }

    /// Carves one river per peak, mutating `occupancy` as it goes.
    pub fn carve(
        &self,
        field: &HeightField,
        occupancy: &mut OccupancyGrid,
        features: &FeatureSets,
    ) -> RiverNetwork {
        let mut network = RiverNetwork::default();
        if features.lake_bottoms.is_empty() {
            if !features.peaks.is_empty() {
                log::debug!("no lake bottoms, skipping {} rivers", features.peaks.len());
            }
            return network;
        }

        for &peak in &features.peaks {
            let Some(lake) = nearest_lake(peak, &features.lake_bottoms) else {
                continue;
            };
            match self.walk(field, occupancy, peak, lake) {
                Ok(cells) => network.rivers.push(River {
                    source: peak,
                    lake,
                    cells,
                }),
                Err(fault) => {
                    log::warn!("abandoning river: {fault}");
                    network.faults.push(fault);
                }
            }
        }
        network
    }

    fn walk(
        &self,
        field: &HeightField,
        occupancy: &mut OccupancyGrid,
        peak: IVec2,
        lake: IVec2,
    ) -> Result<Vec<IVec2>, RiverFault> {
        let max_steps = self
            .max_steps
            .unwrap_or_else(|| field.size().cell_count());
        let mut cells: Vec<IVec2> = Vec::new();
        let mut current = peak;

        let fault = loop {
            if cells.len() >= max_steps {
                break RiverFault::StepLimit {
                    peak,
                    steps: cells.len(),
                };
            }
            let bearing = Bearing::toward((lake - current).as_vec2(), self.bias);
            let Some(next) = lowest_in_fan(field, occupancy, current, bearing) else {
                break RiverFault::Blocked { peak, at: current };
            };
            if field.get(next) < self.swamp {
                return Ok(cells);
            }
            occupancy.claim(next);
            cells.push(next);
            current = next;
        };

        for cell in cells {
            occupancy.release(cell);
        }
        Err(fault)
    }
}

impl<'a> Layer<RiverInput<'a>, RiverNetwork> for RiverSimulator {
    fn generate(&self, input: RiverInput<'a>) -> Result<RiverNetwork, GenerationError> {
        Ok(self.carve(input.field, input.occupancy, input.features))
    }
}

/// Closest lake by straight-line distance; the first one wins a tie.
pub fn nearest_lake(from: IVec2, lakes: &[IVec2]) -> Option<IVec2> {
    let mut best: Option<(IVec2, f32)> = None;
    for &lake in lakes {
        let d = from.as_vec2().distance(lake.as_vec2());
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((lake, d));
        }
    }
    best.map(|(lake, _)| lake)
}

/// Lowest free cell of the fan. The centre wins ties, then the counter-clockwise flank.
fn lowest_in_fan(
    field: &HeightField,
    occupancy: &OccupancyGrid,
    current: IVec2,
    bearing: Bearing,
) -> Option<IVec2> {
    let mut best: Option<(IVec2, f32)> = None;
    for offset in bearing.fan() {
        let candidate = current + offset;
        if !occupancy.is_free(candidate) {
            continue;
        }
        let h = field.get(candidate);
        if best.map_or(true, |(_, bh)| h < bh) {
            best = Some((candidate, h));
        }
    }
    best.map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_core::grid::GridSize;

    fn field(width: usize, height: usize, f: impl Fn(i32, i32) -> f32) -> HeightField {
        let size = GridSize::new(width, height);
        let values = (0..size.cell_count())
            .map(|i| {
                let p = size.coord(i);
                f(p.x, p.y)
            })
            .collect();
        HeightField::from_values(size, values).unwrap()
    }

    fn simulator(max_steps: Option<usize>) -> RiverSimulator {
        RiverSimulator {
            swamp: 0.3,
            bias: 0.65,
            max_steps,
        }
    }

    /// Valley draining toward a lake at (4, 0).
    fn valley() -> HeightField {
        field(9, 5, |x, y| {
            if (x, y) == (4, 0) {
                0.0
            } else {
                0.35 + 0.08 * (x - 4).abs() as f32 + 0.1 * y as f32
            }
        })
    }

    #[test]
    fn bearing_follows_dominant_axis() {
        assert_eq!(Bearing::toward(Vec2::new(5.0, 1.0), 0.65), Bearing::East);
        assert_eq!(Bearing::toward(Vec2::new(-5.0, 1.0), 0.65), Bearing::West);
        assert_eq!(Bearing::toward(Vec2::new(1.0, 5.0), 0.65), Bearing::North);
        assert_eq!(Bearing::toward(Vec2::new(0.0, -4.0), 0.65), Bearing::South);
        assert_eq!(Bearing::toward(Vec2::new(3.0, 3.0), 0.65), Bearing::NorthEast);
        assert_eq!(Bearing::toward(Vec2::new(-3.0, -3.0), 0.65), Bearing::SouthWest);
        assert_eq!(Bearing::toward(Vec2::new(3.0, -2.5), 0.65), Bearing::SouthEast);
    }

    #[test]
    fn fan_spans_neighbouring_bearings() {
        assert_eq!(
            Bearing::North.fan(),
            [IVec2::new(0, 1), IVec2::new(-1, 1), IVec2::new(1, 1)]
        );
        assert_eq!(
            Bearing::SouthEast.fan(),
            [IVec2::new(1, -1), IVec2::new(1, 0), IVec2::new(0, -1)]
        );
        assert_eq!(Bearing::West.offset(), IVec2::new(-1, 0));
        assert_eq!(Bearing::North.counter_clockwise(), Bearing::NorthWest);
        assert_eq!(Bearing::NorthWest.clockwise(), Bearing::North);
    }

    #[test]
    fn nearest_lake_keeps_first_on_tie() {
        let lakes = [IVec2::new(0, 0), IVec2::new(4, 0), IVec2::new(2, 4)];
        assert_eq!(nearest_lake(IVec2::new(2, 0), &lakes), Some(IVec2::new(0, 0)));
        assert_eq!(nearest_lake(IVec2::new(2, 3), &lakes), Some(IVec2::new(2, 4)));
        assert_eq!(nearest_lake(IVec2::ZERO, &[]), None);
    }

    #[test]
    fn river_descends_into_lake() {
        let f = valley();
        let mut occupancy = OccupancyGrid::new(f.size());
        let features = FeatureSets {
            peaks: vec![IVec2::new(2, 4)],
            lake_bottoms: vec![IVec2::new(4, 0)],
        };
        let network = simulator(None).carve(&f, &mut occupancy, &features);

        assert!(network.faults.is_empty());
        assert_eq!(
            network.rivers[0].cells,
            vec![IVec2::new(3, 3), IVec2::new(4, 2), IVec2::new(4, 1)]
        );
        assert!(network.cells().all(|c| f.get(c) >= 0.3));
        assert_eq!(occupancy.occupied_count(), 3);
        assert!(!occupancy.is_occupied(IVec2::new(4, 0)));
    }

    #[test]
    fn later_river_diverts_around_earlier_one() {
        let f = valley();
        let lake = IVec2::new(4, 0);
        let (left, right) = (IVec2::new(2, 4), IVec2::new(6, 4));
        assert_eq!(
            left.as_vec2().distance(lake.as_vec2()),
            right.as_vec2().distance(lake.as_vec2())
        );

        let mut alone = OccupancyGrid::new(f.size());
        let solo = simulator(None).carve(
            &f,
            &mut alone,
            &FeatureSets {
                peaks: vec![right],
                lake_bottoms: vec![lake],
            },
        );
        assert!(solo.rivers[0].cells.contains(&IVec2::new(4, 2)));

        let mut occupancy = OccupancyGrid::new(f.size());
        let network = simulator(None).carve(
            &f,
            &mut occupancy,
            &FeatureSets {
                peaks: vec![left, right],
                lake_bottoms: vec![lake],
            },
        );
        assert_eq!(network.rivers.len(), 2);
        let second = &network.rivers[1].cells;
        assert_eq!(
            second,
            &vec![IVec2::new(5, 3), IVec2::new(5, 2), IVec2::new(5, 1)]
        );
        assert!(network.rivers[0].cells.iter().all(|c| !second.contains(c)));
        assert_eq!(occupancy.occupied_count(), network.cell_count());
    }

    #[test]
    fn step_limit_abandons_and_releases() {
        let f = valley();
        let mut occupancy = OccupancyGrid::new(f.size());
        let features = FeatureSets {
            peaks: vec![IVec2::new(2, 4)],
            lake_bottoms: vec![IVec2::new(4, 0)],
        };
        let network = simulator(Some(1)).carve(&f, &mut occupancy, &features);

        assert!(network.rivers.is_empty());
        assert_eq!(
            network.faults,
            vec![RiverFault::StepLimit {
                peak: IVec2::new(2, 4),
                steps: 1
            }]
        );
        assert_eq!(occupancy.occupied_count(), 0);
    }

    #[test]
    fn boxed_in_river_is_reported() {
        let f = field(3, 1, |x, _| [0.9, 0.6, 0.1][x as usize]);
        let mut occupancy = OccupancyGrid::new(f.size());
        occupancy.claim(IVec2::new(1, 0));
        let features = FeatureSets {
            peaks: vec![IVec2::ZERO],
            lake_bottoms: vec![IVec2::new(2, 0)],
        };
        let network = simulator(None).carve(&f, &mut occupancy, &features);

        assert!(network.rivers.is_empty());
        assert_eq!(
            network.faults,
            vec![RiverFault::Blocked {
                peak: IVec2::ZERO,
                at: IVec2::ZERO
            }]
        );
    }

    #[test]
    fn no_lakes_means_no_rivers() {
        let f = valley();
        let mut occupancy = OccupancyGrid::new(f.size());
        let features = FeatureSets {
            peaks: vec![IVec2::new(2, 4)],
            lake_bottoms: Vec::new(),
        };
        let network = simulator(None).carve(&f, &mut occupancy, &features);
        assert_eq!(network, RiverNetwork::default());
    }
}
