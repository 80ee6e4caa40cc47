//! Command-line flags and the layered settings they feed into.
//!
//! Settings are resolved from, lowest priority first: built-in defaults, an
//! optional TOML file given with `--config`, `WAVE_GRID_*` environment
//! variables and finally explicit command-line flags.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wfc_core::PropagationMode;

/// Prefix of the environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "WAVE_GRID_";

/// Represents the different visualization modes available.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationMode {
    /// No display.
    None,
    /// Colored glyphs on stdout.
    #[default]
    Terminal,
}

/// How far each collapse propagates.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationArg {
    /// Only the direct neighbors of the collapsed cell.
    #[default]
    SingleHop,
    /// Keep propagating from neighbors that were forced to collapse.
    Eager,
}

impl From<PropagationArg> for PropagationMode {
    fn from(arg: PropagationArg) -> Self {
        match arg {
            PropagationArg::SingleHop => Self::SingleHop,
            PropagationArg::Eager => Self::Eager,
        }
    }
}

/// Log level for progress reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

impl From<ProgressLogLevel> for LevelFilter {
    fn from(level: ProgressLogLevel) -> Self {
        match level {
            ProgressLogLevel::Trace => Self::Trace,
            ProgressLogLevel::Debug => Self::Debug,
            ProgressLogLevel::Info => Self::Info,
            ProgressLogLevel::Warn => Self::Warn,
        }
    }
}

/// Log level for everything except progress reports.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Command-line flags for the Wave Grid application.
///
/// Every value flag is optional so that unset flags fall through to the
/// config file, the environment or the defaults.
#[derive(Parser, Debug, Default)]
#[command(name = "wave-grid", author, version, about, long_about = None)]
pub struct AppConfig {
    /// TOML file with settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// RON or JSON rule file. The built-in three-tile set is used if omitted.
    #[arg(short, long, value_name = "FILE")]
    pub rule_file: Option<PathBuf>,

    /// Side length of the square grid.
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Propagation strategy.
    #[arg(long, value_enum)]
    pub propagation: Option<PropagationArg>,

    /// Path to save the generated grid as text.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Path to save the generated grid as a PNG image.
    #[arg(long, value_name = "FILE")]
    pub image_output: Option<PathBuf>,

    /// Directory holding one `<label>.png` per tile. Defaults to the rule
    /// file's directory.
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Side length in pixels of one tile in the image output.
    #[arg(long, value_name = "PIXELS")]
    pub tile_resolution: Option<u32>,

    /// Choose the visualization mode.
    #[arg(long, value_enum)]
    pub visualization_mode: Option<VisualizationMode>,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub report_progress_interval: Option<Duration>,

    /// Abort after this many collapse steps.
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Terminal color for a tile, as LABEL=COLOR. Repeatable.
    #[arg(long = "color", value_name = "LABEL=COLOR")]
    pub colors: Vec<String>,

    /// Log level for everything except progress reports.
    #[arg(long, value_enum)]
    pub global_log_level: Option<GlobalLogLevel>,

    /// Log level for progress reports.
    #[arg(long, value_enum)]
    pub progress_log_level: Option<ProgressLogLevel>,
}

impl AppConfig {
    /// Flags given on the command line, shaped like [`Settings`].
    fn overrides(&self) -> Result<CliOverrides<'_>, AppError> {
        let palette = self
            .colors
            .iter()
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(label, color)| (label.trim().to_owned(), color.trim().to_owned()))
                    .ok_or_else(|| {
                        AppError::Config(format!("Expected LABEL=COLOR, got '{entry}'"))
                    })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(CliOverrides {
            size: self.size,
            seed: self.seed,
            propagation: self.propagation,
            rule_file: self.rule_file.as_ref(),
            output_path: self.output_path.as_ref(),
            image_output: self.image_output.as_ref(),
            assets_dir: self.assets_dir.as_ref(),
            tile_resolution: self.tile_resolution,
            visualization_mode: self.visualization_mode,
            report_progress_interval: self.report_progress_interval,
            max_iterations: self.max_iterations,
            palette,
            global_log_level: self.global_log_level,
            progress_log_level: self.progress_log_level,
        })
    }
}

#[derive(Serialize)]
struct CliOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    propagation: Option<PropagationArg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule_file: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_output: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets_dir: Option<&'a PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tile_resolution: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visualization_mode: Option<VisualizationMode>,
    #[serde(skip_serializing_if = "Option::is_none", with = "humantime_opt")]
    report_progress_interval: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_iterations: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    palette: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_log_level: Option<GlobalLogLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_log_level: Option<ProgressLogLevel>,
}

/// Fully resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Side length of the square grid.
    pub size: usize,
    /// Seed for the engine RNG; drawn at random if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Propagation strategy.
    pub propagation: PropagationArg,
    /// Rule file; the built-in tile set is used if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_file: Option<PathBuf>,
    /// Text output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// PNG output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_output: Option<PathBuf>,
    /// Directory with one `<label>.png` per tile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
    /// Pixels per tile side in the image output.
    pub tile_resolution: u32,
    /// Where the finished grid is shown.
    pub visualization_mode: VisualizationMode,
    /// Interval between progress log lines; no reports if unset.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "humantime_opt")]
    pub report_progress_interval: Option<Duration>,
    /// Abort after this many collapse steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    /// Tile label to color name, e.g. `A = "red"`.
    pub palette: BTreeMap<String, String>,
    /// Log level outside the progress module.
    pub global_log_level: GlobalLogLevel,
    /// Log level of progress reports.
    pub progress_log_level: ProgressLogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        let palette = [("A", "red"), ("B", "blue"), ("C", "yellow")]
            .into_iter()
            .map(|(label, color)| (label.to_owned(), color.to_owned()))
            .collect();
        Self {
            size: 10,
            seed: None,
            propagation: PropagationArg::default(),
            rule_file: None,
            output_path: None,
            image_output: None,
            assets_dir: None,
            tile_resolution: 32,
            visualization_mode: VisualizationMode::default(),
            report_progress_interval: None,
            max_iterations: None,
            palette,
            global_log_level: GlobalLogLevel::default(),
            progress_log_level: ProgressLogLevel::default(),
        }
    }
}

impl Settings {
    /// Merges defaults, the config file, the environment and `cli`.
    ///
    /// # Errors
    ///
    /// `AppError::Config` if `--config` names a missing file, a `--color`
    /// entry is malformed, the grid size or tile resolution is zero, or an
    /// image output has no assets directory; `AppError::Figment` if a layer
    /// holds a value of the wrong type.
    pub fn load(cli: &AppConfig) -> Result<Self, AppError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = &cli.config {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        let settings: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli.overrides()?))
            .extract()?;

        if settings.size == 0 {
            return Err(AppError::Config("Grid size must be positive".to_owned()));
        }
        if settings.tile_resolution == 0 {
            return Err(AppError::Config(
                "Tile resolution must be positive".to_owned(),
            ));
        }
        if settings.image_output.is_some() && settings.tile_assets_dir().is_none() {
            return Err(AppError::Config(
                "Image output needs --assets-dir or a rule file".to_owned(),
            ));
        }
        Ok(settings)
    }

    /// Where tile images are read from: `assets_dir`, else the rule file's directory.
    pub fn tile_assets_dir(&self) -> Option<&Path> {
        self.assets_dir
            .as_deref()
            .or_else(|| self.rule_file.as_deref().and_then(Path::parent))
    }
}

/// (De)serializes an optional duration as a humantime string such as `"1s 500ms"`.
mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Writes `Some` as a humantime string.
    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => s.serialize_str(&humantime::format_duration(*duration).to_string()),
            None => s.serialize_none(),
        }
    }

    /// Reads an optional humantime string.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|text| humantime::parse_duration(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}
