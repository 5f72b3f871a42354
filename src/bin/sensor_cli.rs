use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use sensor_sentinel::engine::PendingCalibration;
use sensor_sentinel::pipeline::FeedOutcome;
use sensor_sentinel::sensors::{field_strength, pseudo_field_from_motion};
use sensor_sentinel::{
    init_logging, AppConfig, ChannelId, ManualTimeSource, Sample, SensorEngine, Vector3,
};

#[derive(Parser, Debug)]
#[command(
    name = "sensor_cli",
    about = "Replay recorded sensor readings through calibration and classification"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calibrate on the first window of each channel, then classify the rest
    Replay {
        /// JSON-lines file of readings ("-" for stdin)
        #[arg(long)]
        input: PathBuf,
        /// JSON configuration file (defaults when omitted or unreadable)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the session record here when the replay ends
        #[arg(long)]
        export: Option<PathBuf>,
        /// Classify from the first reading using fallback thresholds
        #[arg(long, default_value_t = false)]
        skip_calibration: bool,
        /// Derive the field channel from motion when no magnetometer is present
        #[arg(long, default_value_t = false)]
        pseudo_field: bool,
    },
    /// Print the default configuration as JSON
    Defaults,
}

/// One line of replay input
#[derive(Debug, Deserialize)]
#[serde(tag = "sensor", rename_all = "snake_case")]
enum Reading {
    /// Pre-computed field magnitude
    Field { timestamp_ms: u64, value: f64 },
    /// Raw three-axis magnetometer reading
    Magnetometer {
        timestamp_ms: u64,
        x: f64,
        y: f64,
        z: f64,
    },
    /// Three-axis acceleration including gravity
    Motion {
        timestamp_ms: u64,
        x: f64,
        y: f64,
        z: f64,
    },
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            input,
            config,
            export,
            skip_calibration,
            pseudo_field,
        } => run_replay(input, config, export, skip_calibration, pseudo_field),
        Commands::Defaults => run_defaults(),
    }
}

fn run_replay(
    input: PathBuf,
    config_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
    skip_calibration: bool,
    pseudo_field: bool,
) -> Result<ExitCode> {
    let config = config_path
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    let clock = Arc::new(ManualTimeSource::new(0));
    let engine = SensorEngine::with_time_source(config, clock.clone())
        .context("building sensor engine from configuration")?;

    let mut pending: Vec<PendingCalibration> = Vec::new();
    if !skip_calibration {
        for channel in ChannelId::ALL {
            pending.push(
                engine
                    .start_calibration(channel)
                    .with_context(|| format!("starting {} calibration", channel))?,
            );
        }
    }

    let reader: Box<dyn BufRead> = if input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = fs::File::open(&input)
            .with_context(|| format!("opening replay input {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut skipped = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let reading: Reading = match serde_json::from_str(&line) {
            Ok(reading) => reading,
            Err(err) => {
                log::warn!("[Replay] line {} skipped: {}", index + 1, err);
                skipped += 1;
                continue;
            }
        };

        let timestamp_ms = reading_timestamp(&reading);
        clock.set(timestamp_ms);

        for (channel, sample) in route(&engine, &reading, pseudo_field) {
            match engine.feed(channel, sample, timestamp_ms) {
                Ok(FeedOutcome::Classified(result)) => {
                    writeln!(out, "{}", serde_json::to_string(&result)?)?;
                }
                Ok(FeedOutcome::CalibrationComplete(profile)) => {
                    log::info!("[Replay] {} calibrated: {:?}", channel, profile);
                }
                Ok(_) => {}
                Err(err) => {
                    log::warn!("[Replay] line {} rejected: {}", index + 1, err);
                    skipped += 1;
                }
            }
        }

        for channel in ChannelId::ALL {
            if let Some(result) = engine.poll(channel, timestamp_ms)? {
                writeln!(out, "{}", serde_json::to_string(&result)?)?;
            }
        }
    }

    for calibration in pending {
        let channel = calibration.channel();
        if let Err(err) = calibration.finish_now() {
            log::warn!("[Replay] {} calibration incomplete: {}", channel, err);
        }
    }
    out.flush()?;

    let session = engine.export_session()?;
    if let Some(path) = export_path {
        fs::write(&path, session.to_json_pretty()?)
            .with_context(|| format!("writing session export {}", path.display()))?;
    }

    eprintln!(
        "replay complete: {} anomalies, {} updates, {} lines skipped",
        session.anomaly_count,
        engine.session().total_updates(),
        skipped
    );
    Ok(ExitCode::from(0))
}

fn reading_timestamp(reading: &Reading) -> u64 {
    match reading {
        Reading::Field { timestamp_ms, .. }
        | Reading::Magnetometer { timestamp_ms, .. }
        | Reading::Motion { timestamp_ms, .. } => *timestamp_ms,
    }
}

/// Map a reading to the channel samples it produces
fn route(engine: &SensorEngine, reading: &Reading, pseudo_field: bool) -> Vec<(ChannelId, Sample)> {
    match *reading {
        Reading::Field { value, .. } => vec![(ChannelId::Field, Sample::Scalar(value))],
        Reading::Magnetometer { x, y, z, .. } => vec![(
            ChannelId::Field,
            Sample::Scalar(field_strength(Vector3::new(x, y, z))),
        )],
        Reading::Motion { x, y, z, .. } => {
            let acceleration = Vector3::new(x, y, z);
            let mut samples = vec![(ChannelId::Motion, Sample::Vector(acceleration))];
            if pseudo_field {
                let motion = &engine.config().motion;
                let gravity = engine
                    .profile(ChannelId::Motion)
                    .ok()
                    .and_then(|profile| profile.as_vector().map(|p| p.gravity_magnitude))
                    .unwrap_or(motion.default_gravity);
                samples.push((
                    ChannelId::Field,
                    Sample::Scalar(pseudo_field_from_motion(
                        acceleration,
                        gravity,
                        motion.pseudo_field_scale,
                    )),
                ));
            }
            samples
        }
    }
}

fn run_defaults() -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&AppConfig::default())?);
    Ok(ExitCode::from(0))
}
