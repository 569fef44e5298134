#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    use tilemap_gen::cli::CliArgs;
    use tilemap_gen::export::{save_preview, MapDocument};
    use tilemap_gen::{MapConfig, MapGenerator};

    env_logger::init();
    let cli = CliArgs::from_env_args()?;

    let mut config = MapConfig::load(&cli.config_path)
        .with_context(|| format!("failed to load {}", cli.config_path.display()))?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    log::info!(
        "generating {}x{} map, noise {:?}, seed {}",
        config.width,
        config.height,
        config.noise.kind,
        config.seed
    );

    let generator = MapGenerator::new(&config).context("invalid map configuration")?;
    let map = generator.generate().context("map generation failed")?;

    if !map.rivers.faults.is_empty() {
        log::warn!("{} rivers could not be completed", map.rivers.faults.len());
    }

    MapDocument::new(&map, generator.tiers(), &config.tiles.river)?.save(&cli.out_path)?;
    if let Some(path) = &cli.preview_path {
        save_preview(&map, config.thresholds.intra.len(), path)?;
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the only useful wasm target.
}
