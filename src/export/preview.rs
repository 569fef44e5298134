use std::path::Path;

use anyhow::Context;

use crate::map_core::biome::{Biome, Cell};
use crate::map_core::generator::GeneratedMap;

const RIVER: [f32; 3] = [0.20, 0.45, 0.85];

fn biome_base(biome: Biome) -> [f32; 3] {
    match biome {
        Biome::Forest => [0.21, 0.43, 0.23],
        Biome::Swamp => [0.42, 0.45, 0.28],
        Biome::Sea => [0.15, 0.30, 0.55],
    }
}

/// RGBA colour for a cell. Higher variants (lower in their tier) are darker.
pub fn cell_color(cell: Cell, variant_count: usize) -> [u8; 4] {
    let rgb = match cell {
        Cell::River => RIVER,
        Cell::Tile(tile) => {
            let base = biome_base(tile.biome);
            let shade = if variant_count > 1 {
                tile.variant as f32 / (variant_count - 1) as f32
            } else {
                0.0
            };
            let k = 1.0 - shade * 0.45;
            [base[0] * k, base[1] * k, base[2] * k]
        }
    };
    [
        (rgb[0] * 255.0) as u8,
        (rgb[1] * 255.0) as u8,
        (rgb[2] * 255.0) as u8,
        255,
    ]
}

/// One pixel per cell, `+y` pointing up the image.
pub fn preview_pixels(map: &GeneratedMap, variant_count: usize) -> Vec<u8> {
    let (w, h) = (map.width(), map.height());
    let mut pixels = Vec::with_capacity(w * h * 4);
    for row in 0..h {
        let y = h - 1 - row;
        for x in 0..w {
            let cell = map.cells()[y * w + x];
            pixels.extend_from_slice(&cell_color(cell, variant_count));
        }
    }
    pixels
}

pub fn save_preview(map: &GeneratedMap, variant_count: usize, path: &Path) -> anyhow::Result<()> {
    let pixels = preview_pixels(map, variant_count);
    image::save_buffer(
        path,
        &pixels,
        map.width() as u32,
        map.height() as u32,
        image::ColorType::Rgba8,
    )
    .context("failed to encode PNG")?;
    log::info!("preview saved: {}", path.display());
    Ok(())
}
