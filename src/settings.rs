use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::grid::EnergyGrid;
use crate::material::MIRROR_PERIODS;
use crate::snell;

/// Environment variable prefix for configuration overrides, e.g. `REFLECTIVITY_METAL_THICKNESS`.
pub const ENV_PREFIX: &str = "reflectivity";
/// Environment variable pointing at the project root when not run through cargo.
pub const ROOT_DIR_VAR: &str = "REFLECTIVITY_ROOT_DIR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_file_loads() {
        let settings = load_default_config().unwrap();
        assert_eq!(settings.incidence_angle, 0.0);
        assert_eq!(settings.metal_thickness, 30.0);
        assert_eq!(settings.polymer_thickness, 100.0);
        assert_eq!(settings.spacer_thickness, 200.0);
        assert_eq!(settings.mirror_periods, MIRROR_PERIODS);
        assert_eq!(settings.energy, EnergyGrid::default());
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut settings = Settings::default();
        let args = CliArgs::parse_from([
            "reflectivity",
            "--theta",
            "0.25",
            "--metal",
            "12.5",
            "--periods",
            "4",
            "--dir",
            "out",
        ]);
        args.apply(&mut settings);
        assert_eq!(settings.incidence_angle, 0.25);
        assert_eq!(settings.metal_thickness, 12.5);
        assert_eq!(settings.polymer_thickness, 100.0);
        assert_eq!(settings.mirror_periods, 4);
        assert_eq!(settings.directory, PathBuf::from("out"));
    }

    #[test]
    fn environment_then_cli_override_config_file() {
        env::set_var("REFLECTIVITY_METAL_THICKNESS", "12.5");
        env::set_var("REFLECTIVITY_ENERGY__STEP", "0.01");
        env::set_var("REFLECTIVITY_POLYMER_THICKNESS", "70");

        let args = CliArgs::parse_from(["reflectivity", "--polymer", "50"]);
        let settings = load_config_with(args);

        env::remove_var("REFLECTIVITY_METAL_THICKNESS");
        env::remove_var("REFLECTIVITY_ENERGY__STEP");
        env::remove_var("REFLECTIVITY_POLYMER_THICKNESS");

        let settings = settings.unwrap();
        assert_eq!(settings.metal_thickness, 12.5);
        assert_eq!(settings.energy.step, 0.01);
        assert_eq!(settings.energy.start, 2.8);
        // command line wins over the environment
        assert_eq!(settings.polymer_thickness, 50.0);
        assert_eq!(settings.spacer_thickness, 200.0);
    }

    #[test]
    fn validation_rejects_unphysical_values() {
        let mut settings = Settings::default();
        settings.spacer_thickness = -1.0;
        assert!(validate_config(&settings).is_err());

        let mut settings = Settings::default();
        settings.incidence_angle = std::f64::consts::FRAC_PI_2;
        assert!(validate_config(&settings).is_err());

        let mut settings = Settings::default();
        settings.mirror_periods = 0;
        assert!(validate_config(&settings).is_err());

        let mut settings = Settings::default();
        settings.energy.step = 0.0;
        assert!(validate_config(&settings).is_err());

        assert!(validate_config(&Settings::default()).is_ok());
    }
}

/// Runtime configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Incidence angle in air, in radians.
    pub incidence_angle: f64,
    pub metal_thickness: f64,
    pub polymer_thickness: f64,
    pub spacer_thickness: f64,
    #[serde(default = "default_mirror_periods")]
    pub mirror_periods: usize,
    #[serde(default)]
    pub energy: EnergyGrid,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_mirror_periods() -> usize {
    MIRROR_PERIODS
}

fn default_directory() -> PathBuf {
    PathBuf::from("reflectivity_run")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            incidence_angle: 0.0,
            metal_thickness: 30.0,
            polymer_thickness: 100.0,
            spacer_thickness: 200.0,
            mirror_periods: default_mirror_periods(),
            energy: EnergyGrid::default(),
            directory: default_directory(),
        }
    }
}

/// Loads `config/default.toml` without environment or command-line overrides.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration file, then environment overrides, then command-line overrides.
pub fn load_config() -> Result<Settings> {
    load_config_with(CliArgs::parse())
}

pub fn load_config_with(args: CliArgs) -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    args.apply(&mut config);

    validate_config(&config)?;

    info!("{}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the REFLECTIVITY_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var(ROOT_DIR_VAR) {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(PathBuf::from)
        .ok_or_else(|| {
            anyhow!(
                "Could not find project root directory; set {} to a directory containing config/",
                ROOT_DIR_VAR
            )
        })
}

pub fn validate_config(config: &Settings) -> Result<()> {
    snell::validate_incidence(config.incidence_angle)?;
    for (name, value) in [
        ("metal thickness", config.metal_thickness),
        ("polymer thickness", config.polymer_thickness),
        ("spacer thickness", config.spacer_thickness),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(anyhow!("{} must be finite and non-negative, got {}", name, value));
        }
    }
    if config.mirror_periods == 0 {
        return Err(anyhow!("Mirror must have at least one period"));
    }
    config.energy.validate()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Reflectivity - TE transfer-matrix spectra of a Bragg mirror / polymer / metal stack"
)]
pub struct CliArgs {
    /// Incidence angle in air, in radians, measured from the stack normal.
    #[arg(short, long)]
    theta: Option<f64>,

    /// Thickness of the aluminium layer in nm.
    #[arg(short, long)]
    metal: Option<f64>,

    /// Thickness of the PMMA layer in nm.
    #[arg(short, long)]
    polymer: Option<f64>,

    /// Thickness of the silica spacer layer in nm.
    #[arg(short, long)]
    spacer: Option<f64>,

    /// Number of SiO/SiN periods on top of the first SiN mirror layer.
    #[arg(long)]
    periods: Option<usize>,

    /// Output directory for the spectrum and summary files.
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

impl CliArgs {
    /// Overrides the values given on the command line.
    pub fn apply(self, config: &mut Settings) {
        if let Some(theta) = self.theta {
            config.incidence_angle = theta;
        }
        if let Some(metal) = self.metal {
            config.metal_thickness = metal;
        }
        if let Some(polymer) = self.polymer {
            config.polymer_thickness = polymer;
        }
        if let Some(spacer) = self.spacer {
            config.spacer_thickness = spacer;
        }
        if let Some(periods) = self.periods {
            config.mirror_periods = periods;
        }
        if let Some(dir) = self.dir {
            config.directory = dir;
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Incidence Angle: {:.6} rad
  - Metal Thickness: {:.3} nm
  - Polymer Thickness: {:.3} nm
  - Spacer Thickness: {:.3} nm
  - Mirror Periods: {}
  - Energy Range: [{:.4}, {:.4}) eV, step {:.4} eV
  - Output Directory: {:?}
  ",
            self.incidence_angle,
            self.metal_thickness,
            self.polymer_thickness,
            self.spacer_thickness,
            self.mirror_periods,
            self.energy.start,
            self.energy.stop,
            self.energy.step,
            self.directory,
        )
    }
}
