use anyhow::Context;
use clap::Parser;
use log::info;
use publish::line::DataLine;
use publish::report::SessionReport;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Measurement, Runner};

mod generator;
mod publish;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic-sweep driver for the envelope peak detector")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 20.0)]
    update_rate: f64,
    #[arg(long, default_value_t = 200)]
    data_length: usize,
    /// Number of measurements to take; 0 with --realtime runs until Ctrl+C
    #[arg(long)]
    measurements: Option<usize>,
    /// Pace sweeps at the sensor update rate
    #[arg(long, default_value_t = false)]
    realtime: bool,
    /// Write a JSON session report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn publish_measurement(measurement: &Measurement) {
    println!("{}", DataLine::new().float("distance", measurement.distance_cm));
}

fn run_offline(runner: &mut Runner, measurements: usize) -> anyhow::Result<Vec<Measurement>> {
    let mut collected = Vec::new();
    for _ in 0..measurements {
        for measurement in runner.measure()? {
            publish_measurement(&measurement);
            collected.push(measurement);
        }
    }
    Ok(collected)
}

/// Wall-clock spacing between sweeps at `update_rate` Hz.
fn sweep_period(update_rate: f64) -> anyhow::Result<Duration> {
    let period = Duration::try_from_secs_f64(1.0 / update_rate)
        .with_context(|| format!("update rate {} Hz has no sweep period", update_rate))?;
    anyhow::ensure!(!period.is_zero(), "update rate {} Hz is too fast to pace", update_rate);
    Ok(period)
}

fn run_paced(runner: &mut Runner, measurements: usize) -> anyhow::Result<Vec<Measurement>> {
    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime for paced sweeps")?;
    let sweep_limit = (measurements > 0).then(|| measurements * runner.sweeps_per_measurement());
    let period = sweep_period(runner.update_rate())?;

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(period);
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut collected = Vec::new();
        let mut sweeps = 0;
        while sweep_limit.map_or(true, |limit| sweeps < limit) {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(measurement) = runner.step()? {
                        publish_measurement(&measurement);
                        collected.push(measurement);
                    }
                    sweeps += 1;
                }
                result = &mut ctrl_c => {
                    result.context("awaiting Ctrl+C")?;
                    info!("interrupted after {} sweeps", sweeps);
                    break;
                }
            }
        }
        Ok::<_, anyhow::Error>(collected)
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.update_rate, args.data_length)
    };
    if let Some(measurements) = args.measurements {
        workflow_config.measurements = measurements;
    }

    let mut runner = Runner::new(&workflow_config)?;
    println!(
        "{}",
        DataLine::message("Started")
            .int("measurements", workflow_config.measurements as i64)
            .int("sweeps_per_measurement", runner.sweeps_per_measurement() as i64)
    );

    let measurements = if args.realtime {
        run_paced(&mut runner, workflow_config.measurements)?
    } else {
        run_offline(&mut runner, workflow_config.measurements)?
    };

    let metrics = runner.metrics();
    info!(
        "processed {} sweeps, {} batches, {} with peaks",
        metrics.sweeps, metrics.batches, metrics.batches_with_peaks
    );
    if let Some(result) = runner.last_result() {
        info!("last sweep index {}", result.sweep_index);
    }
    println!("{}", DataLine::message("Stopped"));

    if let Some(path) = args.report {
        let report = SessionReport {
            measurements,
            metrics,
            last_batch: runner.last_batch().cloned(),
        };
        report.write(&path)?;
        info!("report written to {}", path.display());
    }

    Ok(())
}
