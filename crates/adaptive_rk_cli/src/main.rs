use adaptive_rk_core::equilibrium::{analyze_equilibrium, Stability};
use adaptive_rk_core::{AdaptiveIntegrator, Brusselator, IntegrationError, State, Trajectory};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use config::{Cli, RunConfig};
use output::{open_output, write_trajectory};

mod config;
mod output;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(log_level(cli.verbose, cli.report))?;

    let config = cli.resolve_config()?;
    if cli.report {
        report_equilibrium(&config);
    }

    let trajectory = run(&config)?;

    let path = if cli.stdout {
        None
    } else {
        Some(cli.output.clone().unwrap_or_else(|| config.default_output()))
    };
    let writer = open_output(path.as_deref())?;
    write_trajectory(writer, &trajectory, cli.delimiter, cli.header)?;
    if let Some(path) = path {
        info!("Wrote {} points to {}", trajectory.len(), path.display());
    }
    Ok(())
}

/// `--report` lifts the level to at least `Info` so the report is shown.
fn log_level(verbose: u8, report: bool) -> LevelFilter {
    match verbose {
        0 if report => LevelFilter::Info,
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(level: LevelFilter) -> Result<()> {
    // stdout may carry the trajectory.
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("Failed to initialise logger.")
}

fn equilibrium_summary(config: &RunConfig) -> std::result::Result<String, IntegrationError> {
    let report = analyze_equilibrium(&Brusselator::new(config.a, config.b))?;
    let behaviour = match report.stability {
        Stability::Stable => "trajectories settle onto it",
        Stability::Unstable => "trajectories approach a limit cycle",
        Stability::Center => "parameters sit on the Hopf threshold",
    };
    Ok(format!(
        "Fixed point ({}, {}) is {:?}: {}; eigenvalues {:?}",
        report.state.x, report.state.y, report.stability, behaviour, report.eigenvalues
    ))
}

fn report_equilibrium(config: &RunConfig) {
    match equilibrium_summary(config) {
        Ok(summary) => info!("{summary}"),
        Err(err) => warn!("No equilibrium report: {err}"),
    }
}

fn run(config: &RunConfig) -> Result<Trajectory> {
    info!(
        "Integrating a = {}, b = {} from ({}, {}) to t = {} (h0 = {}, tolerance = {:e})",
        config.a,
        config.b,
        config.x0,
        config.y0,
        config.final_time,
        config.settings.initial_step,
        config.settings.tolerance
    );
    let trajectory = AdaptiveIntegrator::new(config.settings)
        .integrate(
            &Brusselator::new(config.a, config.b),
            State::new(config.x0, config.y0),
            config.final_time,
        )
        .context("Adaptive integration failed.")?;
    info!(
        "Accepted {} points ({} rejected trials), final t = {}",
        trajectory.len(),
        trajectory.rejections(),
        trajectory.final_time()
    );
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::{equilibrium_summary, log_level, run};
    use crate::config::RunConfig;
    use log::LevelFilter;

    #[test]
    fn report_raises_default_level_to_info() {
        assert_eq!(log_level(0, false), LevelFilter::Warn);
        assert_eq!(log_level(0, true), LevelFilter::Info);
        assert_eq!(log_level(1, false), LevelFilter::Info);
        assert_eq!(log_level(2, true), LevelFilter::Debug);
        assert_eq!(log_level(5, false), LevelFilter::Trace);
    }

    #[test]
    fn equilibrium_summary_describes_default_parameters() {
        let summary = equilibrium_summary(&RunConfig::default()).expect("a = 1 has an equilibrium");
        assert!(summary.starts_with("Fixed point (1, 3) is Unstable"));
        assert!(summary.contains("limit cycle"));
    }

    #[test]
    fn equilibrium_summary_reports_missing_equilibrium() {
        let config = RunConfig {
            a: 0.0,
            ..RunConfig::default()
        };
        let err = equilibrium_summary(&config).expect_err("a = 0");
        assert!(format!("{err}").contains("no finite equilibrium"));
    }

    #[test]
    fn run_reaches_final_time() {
        let config = RunConfig {
            final_time: 1.0,
            ..RunConfig::default()
        };
        let trajectory = run(&config).expect("default example integrates");
        assert!(trajectory.final_time() >= 1.0);
    }

    #[test]
    fn run_wraps_core_errors() {
        let mut config = RunConfig::default();
        config.settings.tolerance = -1.0;
        let err = run(&config).expect_err("negative tolerance");
        let message = format!("{err:#}");
        assert!(message.contains("Adaptive integration failed"));
        assert!(message.contains("tolerance"));
    }
}
