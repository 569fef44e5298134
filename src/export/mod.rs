//! Hand-off formats for whatever renders the map.

mod document;
#[cfg(not(target_arch = "wasm32"))]
mod preview;

pub use document::{CellEntry, MapDocument};
#[cfg(not(target_arch = "wasm32"))]
pub use preview::{preview_pixels, save_preview};
