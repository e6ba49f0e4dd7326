use std::fs::File;
use std::path::{Path, PathBuf};

use adaptive_rk_core::{AdaptiveSettings, TimestampPolicy};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::output::Delimiter;

/// One integration run. Defaults reproduce the classic oscillating example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
    pub final_time: f64,
    pub settings: AdaptiveSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 3.0,
            x0: 3.0,
            y0: 3.0,
            final_time: 10.0,
            settings: AdaptiveSettings::default(),
        }
    }
}

impl RunConfig {
    /// File name used when no output path is given, e.g. `adapt_a_1_b_3.csv`.
    pub fn default_output(&self) -> PathBuf {
        PathBuf::from(format!("adapt_a_{}_b_{}.csv", self.a, self.b))
    }
}

/// Reads a YAML run configuration. Missing fields take their defaults.
pub fn load_run_config(path: &Path) -> Result<RunConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file {}.", path.display()))?;
    let config: RunConfig = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config file {}.", path.display()))?;
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Timestamps {
    /// Advance time by h/2 per accepted point.
    Half,
    /// Advance time by h per accepted point.
    Full,
}

impl From<Timestamps> for TimestampPolicy {
    fn from(value: Timestamps) -> Self {
        match value {
            Timestamps::Half => TimestampPolicy::HalfStep,
            Timestamps::Full => TimestampPolicy::FullStep,
        }
    }
}

/// Integrate the Brusselator with adaptive step-doubling RK4 and write t, x, y as CSV.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML run configuration; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub a: Option<f64>,
    #[arg(long)]
    pub b: Option<f64>,
    #[arg(long)]
    pub x0: Option<f64>,
    #[arg(long)]
    pub y0: Option<f64>,
    /// Initial step size.
    #[arg(long)]
    pub h0: Option<f64>,
    /// Final time.
    #[arg(long)]
    pub t_final: Option<f64>,
    /// Local error tolerance per step.
    #[arg(long)]
    pub tolerance: Option<f64>,
    #[arg(long)]
    pub max_rejections: Option<usize>,
    #[arg(long)]
    pub min_step: Option<f64>,
    #[arg(long)]
    pub max_points: Option<usize>,
    #[arg(long, value_enum)]
    pub timestamps: Option<Timestamps>,
    /// Output file. Defaults to adapt_a_<a>_b_<b>.csv.
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,
    /// Write the trajectory to stdout instead of a file.
    #[arg(long)]
    pub stdout: bool,
    #[arg(long, value_enum, default_value_t = Delimiter::Space)]
    pub delimiter: Delimiter,
    /// Emit a `t,x,y` header row.
    #[arg(long)]
    pub header: bool,
    /// Log the fixed point and its stability before integrating.
    #[arg(long)]
    pub report: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Loads the config file if any, then applies flag overrides.
    pub fn resolve_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => load_run_config(path)?,
            None => RunConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(a) = self.a {
            config.a = a;
        }
        if let Some(b) = self.b {
            config.b = b;
        }
        if let Some(x0) = self.x0 {
            config.x0 = x0;
        }
        if let Some(y0) = self.y0 {
            config.y0 = y0;
        }
        if let Some(t_final) = self.t_final {
            config.final_time = t_final;
        }

        let settings = &mut config.settings;
        if let Some(h0) = self.h0 {
            settings.initial_step = h0;
        }
        if let Some(tolerance) = self.tolerance {
            settings.tolerance = tolerance;
        }
        if let Some(max_rejections) = self.max_rejections {
            settings.max_rejections = max_rejections;
        }
        if let Some(min_step) = self.min_step {
            settings.min_step_size = min_step;
        }
        if let Some(max_points) = self.max_points {
            settings.max_points = max_points;
        }
        if let Some(timestamps) = self.timestamps {
            settings.timestamp_policy = timestamps.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, RunConfig};
    use adaptive_rk_core::TimestampPolicy;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn defaults_match_reference_example() {
        let config = RunConfig::default();
        assert_eq!((config.a, config.b, config.x0, config.y0), (1.0, 3.0, 3.0, 3.0));
        assert_eq!(config.final_time, 10.0);
        assert_eq!(config.settings.initial_step, 0.01);
        assert_eq!(config.settings.tolerance, 1e-5);
        assert_eq!(config.default_output(), PathBuf::from("adapt_a_1_b_3.csv"));
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let yaml = "b: 1.0\nsettings:\n  tolerance: 1.0e-6\n  timestamp_policy: full_step\n";
        let config: RunConfig = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(config.a, 1.0);
        assert_eq!(config.b, 1.0);
        assert_eq!(config.settings.tolerance, 1e-6);
        assert_eq!(config.settings.initial_step, 0.01);
        assert_eq!(config.settings.timestamp_policy, TimestampPolicy::FullStep);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "adaptive-rk",
            "--b",
            "1",
            "--t-final",
            "2.5",
            "--tolerance",
            "1e-7",
            "--timestamps",
            "full",
            "--max-rejections",
            "12",
        ])
        .expect("valid args");
        let config = cli.resolve_config().expect("no config file");
        assert_eq!(config.b, 1.0);
        assert_eq!(config.final_time, 2.5);
        assert_eq!(config.settings.tolerance, 1e-7);
        assert_eq!(config.settings.max_rejections, 12);
        assert_eq!(config.settings.timestamp_policy, TimestampPolicy::FullStep);
        assert_eq!(config.a, 1.0);
    }

    #[test]
    fn output_and_stdout_conflict() {
        let result = Cli::try_parse_from(["adaptive-rk", "--stdout", "-o", "out.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_config_file_reports_path() {
        let cli = Cli::try_parse_from(["adaptive-rk", "--config", "does/not/exist.yaml"])
            .expect("valid args");
        let err = cli.resolve_config().expect_err("file is missing");
        assert!(format!("{err}").contains("does/not/exist.yaml"));
    }
}
