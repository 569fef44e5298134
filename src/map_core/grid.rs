use glam::IVec2;

use crate::map_core::error::GenerationError;

/// The eight neighbour offsets, clockwise from north (`+y`).
pub const NEIGHBOUR_OFFSETS: [IVec2; 8] = [
    IVec2::new(0, 1),
    IVec2::new(1, 1),
    IVec2::new(1, 0),
    IVec2::new(1, -1),
    IVec2::new(0, -1),
    IVec2::new(-1, -1),
    IVec2::new(-1, 0),
    IVec2::new(-1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Row-major index. Caller guarantees `pos` is in bounds.
    pub fn index(&self, pos: IVec2) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    pub fn coord(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// In-bounds 8-neighbours of `pos`.
    pub fn neighbours(self, pos: IVec2) -> impl Iterator<Item = IVec2> {
        NEIGHBOUR_OFFSETS
            .iter()
            .map(move |offset| pos + *offset)
            .filter(move |n| self.contains(*n))
    }
}

/// Normalized terrain heights in `[0, 1]`, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    size: GridSize,
    values: Vec<f32>,
}

impl HeightField {
    /// `values` must hold exactly one value per cell, row-major.
    pub fn from_values(size: GridSize, values: Vec<f32>) -> Result<Self, GenerationError> {
        if values.len() != size.cell_count() {
            return Err(GenerationError::HeightFieldSize {
                width: size.width,
                height: size.height,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn get(&self, pos: IVec2) -> f32 {
        self.values[self.size.index(pos)]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Marks cells already claimed by a river or a biome tile.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    size: GridSize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![false; size.cell_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn is_occupied(&self, pos: IVec2) -> bool {
        self.cells[self.size.index(pos)]
    }

    /// In bounds and not yet claimed.
    pub fn is_free(&self, pos: IVec2) -> bool {
        self.size.contains(pos) && !self.is_occupied(pos)
    }

    pub fn claim(&mut self, pos: IVec2) {
        let idx = self.size.index(pos);
        debug_assert!(!self.cells[idx], "cell {pos} claimed twice");
        self.cells[idx] = true;
    }

    pub fn release(&mut self, pos: IVec2) {
        let idx = self.size.index(pos);
        self.cells[idx] = false;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_has_three_neighbours() {
        let size = GridSize::new(4, 3);
        assert_eq!(size.neighbours(IVec2::ZERO).count(), 3);
        assert_eq!(size.neighbours(IVec2::new(1, 1)).count(), 8);
        assert_eq!(GridSize::new(1, 1).neighbours(IVec2::ZERO).count(), 0);
    }

    #[test]
    fn index_and_coord_agree() {
        let size = GridSize::new(5, 7);
        for idx in 0..size.cell_count() {
            assert_eq!(size.index(size.coord(idx)), idx);
        }
    }

    #[test]
    fn height_field_rejects_wrong_length() {
        let result = HeightField::from_values(GridSize::new(3, 2), vec![0.5; 5]);
        assert!(matches!(
            result,
            Err(GenerationError::HeightFieldSize {
                width: 3,
                height: 2,
                actual: 5
            })
        ));
        assert!(HeightField::from_values(GridSize::new(3, 2), vec![0.5; 6]).is_ok());
    }

    #[test]
    fn out_of_bounds_is_never_free() {
        let mut grid = OccupancyGrid::new(GridSize::new(2, 2));
        assert!(!grid.is_free(IVec2::new(-1, 0)));
        assert!(!grid.is_free(IVec2::new(0, 2)));
        grid.claim(IVec2::new(1, 1));
        assert!(!grid.is_free(IVec2::new(1, 1)));
        grid.release(IVec2::new(1, 1));
        assert!(grid.is_free(IVec2::new(1, 1)));
    }
}
