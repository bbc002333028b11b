use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};
use serde::Deserialize;
use thiserror::Error;

/// File picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "astar-visualizer.toml";

const MAX_GRID_SIZE: usize = 400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("grid_size must be between 2 and 400, got {0}")]
    GridSize(usize),
    #[error("window_width {width} is too small for a grid of {grid_size} cells")]
    WindowWidth { width: u32, grid_size: usize },
    #[error("steps_per_frame must be at least 1")]
    StepsPerFrame,
}

/// Settings of the visualizer window.
///
/// ```toml
/// grid_size = 80
/// window_width = 800
/// steps_per_frame = 1
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Cells along each side of the grid.
    pub grid_size: usize,
    /// Side of the square window in pixels.
    pub window_width: u32,
    /// Search steps taken between two repaints.
    pub steps_per_frame: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: 80,
            window_width: 800,
            steps_per_frame: 1,
        }
    }
}

/// Command line of the visualizer. Flags override values from the configuration file.
#[derive(Debug, Default, Parser)]
#[command(version, about = "Paint a grid and watch A* search it")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Cells along each side of the grid
    #[arg(short = 'n', long)]
    pub grid_size: Option<usize>,
    /// Side of the square window in pixels
    #[arg(short, long)]
    pub window_width: Option<u32>,
    /// Search steps taken between two repaints
    #[arg(short, long)]
    pub steps_per_frame: Option<usize>,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::from_toml_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overrides fields with the flags that were given.
    pub fn apply(&mut self, args: &Args) {
        if let Some(grid_size) = args.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(window_width) = args.window_width {
            self.window_width = window_width;
        }
        if let Some(steps_per_frame) = args.steps_per_frame {
            self.steps_per_frame = steps_per_frame;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        if (self.window_width as usize) < self.grid_size {
            return Err(ConfigError::WindowWidth {
                width: self.window_width,
                grid_size: self.grid_size,
            });
        }
        if self.steps_per_frame == 0 {
            return Err(ConfigError::StepsPerFrame);
        }
        Ok(())
    }

    /// Pixel side of one cell. The window is trimmed to a whole number of cells.
    pub fn cell_px(&self) -> u32 {
        self.window_width / self.grid_size as u32
    }
}

/// Builds the configuration from an explicit file, or the default file if present, then applies
/// the command line flags and validates the result.
pub fn resolve(args: &Args) -> Result<Config, ConfigError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                Config::load(path).unwrap_or_else(|e| {
                    warn!("Ignoring {}: {}", DEFAULT_CONFIG_FILE, e);
                    Config::default()
                })
            } else {
                Config::default()
            }
        }
    };
    config.apply(args);
    config.validate()?;
    Ok(config)
}
