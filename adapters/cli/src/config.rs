//! Layered settings: built-in defaults, then an optional TOML file, then flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use gridmerge_core::{Position, Token};
use gridmerge_world::GridConfig;
use serde::Deserialize;

const DEFAULT_SAVE_PATH: &str = "gridmerge-session.json";

/// Fully resolved settings for one run of the binary.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) grid: GridConfig,
    pub(crate) save_path: PathBuf,
}

/// Values that command-line flags may override.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) save_path: Option<PathBuf>,
}

/// Shape of the optional TOML settings file; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    tile_size: Option<f64>,
    seed: Option<u64>,
    spawn_probability: Option<f64>,
    seed_values: Option<Vec<u32>>,
    interaction_radius: Option<u32>,
    win_threshold: Option<u32>,
    start_lat: Option<f64>,
    start_lng: Option<f64>,
    save_path: Option<PathBuf>,
}

/// Resolves settings from an optional file path and flag overrides.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let file = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => FileSettings::default(),
    };
    resolve(file, overrides)
}

fn parse(contents: &str) -> Result<FileSettings> {
    toml::from_str(contents).context("failed to parse settings toml contents")
}

fn resolve(file: FileSettings, overrides: Overrides) -> Result<Settings> {
    let mut grid = GridConfig::default();

    if let Some(tile_size) = file.tile_size {
        grid.tile_size = tile_size;
    }
    if let Some(seed) = overrides.seed.or(file.seed) {
        grid.seed = seed;
    }
    if let Some(probability) = file.spawn_probability {
        grid.spawn_probability = probability;
    }
    if let Some(values) = file.seed_values {
        grid.seed_values = values
            .into_iter()
            .map(|value| Token::new(value).context("seed values must be positive"))
            .collect::<Result<_>>()?;
    }
    if let Some(radius) = file.interaction_radius {
        grid.interaction_radius = radius;
    }
    if let Some(threshold) = file.win_threshold {
        let Some(threshold) = Token::new(threshold) else {
            bail!("win threshold must be positive");
        };
        grid.win_threshold = threshold;
    }
    grid.start = Position::new(
        file.start_lat.unwrap_or(grid.start.lat()),
        file.start_lng.unwrap_or(grid.start.lng()),
    );

    grid.validate().context("settings describe an unplayable grid")?;

    let save_path = overrides
        .save_path
        .or(file.save_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_PATH));

    Ok(Settings { grid, save_path })
}
