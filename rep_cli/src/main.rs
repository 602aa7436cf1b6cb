use clap::{Parser, Subcommand};
use rep_core::feedback::FeedbackKind;
use rep_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "repcount")]
#[command(about = "Pose-based repetition counter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the exercises that can be counted
    Exercises,

    /// Replay a recorded frame file through the rep counter
    Replay {
        /// JSON Lines file with one frame per line
        file: PathBuf,

        /// Exercise id (see `repcount exercises`)
        #[arg(long, short)]
        exercise: String,

        /// Do not append the session summary to the log
        #[arg(long)]
        no_log: bool,

        /// Print the session summary as JSON instead of feedback lines
        #[arg(long)]
        json: bool,
    },

    /// Show logged sessions, newest first
    History {
        /// Maximum number of sessions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    rep_core::logging::init_with_level(rep_core::logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Exercises => cmd_exercises(&config),
        Commands::Replay {
            file,
            exercise,
            no_log,
            json,
        } => cmd_replay(&config, &data_dir, &file, &exercise, no_log, json),
        Commands::History { limit } => cmd_history(&data_dir, limit),
    }
}

fn cmd_exercises(config: &Config) -> Result<()> {
    let catalog = config.catalog()?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid catalog".into()));
    }

    for def in catalog.exercises.values() {
        let p = &def.profile;
        println!("{:<16} {}", def.id, def.name);
        println!(
            "{:<16} {}: flexed < {}, extended > {}",
            "", p.primary_joint, p.flexed_threshold, p.extended_threshold
        );
        if let Some((joint, threshold)) = p.error_check() {
            println!("{:<16} form check: {} > {}", "", joint, threshold);
        }
    }
    Ok(())
}

fn cmd_replay(
    config: &Config,
    data_dir: &Path,
    file: &Path,
    exercise_id: &str,
    no_log: bool,
    json: bool,
) -> Result<()> {
    let catalog = config.catalog()?;
    let exercise = catalog.get(exercise_id)?.clone();
    let frames = read_frames(file)?;
    tracing::info!("Replaying {} frames from {:?}", frames.len(), file);
    let provider = LandmarkAngles::new(config.tracking.min_visibility);

    if !json {
        println!("{} ({})", exercise.name, exercise.id);
    }

    // Feedback printing runs off the frame loop, as a speech sink would
    let sink = if json {
        BackgroundSink::spawn(LogSink)?
    } else {
        BackgroundSink::spawn(ConsoleSink)?
    };

    let mut session = TrainingSession::start(exercise, config.feedback.clone(), sink)?;
    for frame in &frames {
        session.process(&frame.to_angles(&provider));
    }
    let (summary, sink) = session.finish();
    sink.shutdown()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("  Reps: {}", summary.reps);
        println!("  Form errors: {}", summary.form_errors);
        println!(
            "  Frames: {} ({} dropped)",
            summary.frames_seen, summary.frames_dropped
        );
    }

    if !no_log {
        let mut log = JsonlSessionLog::in_data_dir(data_dir);
        log.append(&summary)?;
        if !json {
            println!("\n✓ Session logged!");
        }
    }

    Ok(())
}

fn cmd_history(data_dir: &Path, limit: usize) -> Result<()> {
    let log = JsonlSessionLog::in_data_dir(data_dir);
    let summaries = read_summaries(log.path())?;

    if summaries.is_empty() {
        println!("No sessions logged yet.");
        return Ok(());
    }

    for summary in summaries.iter().rev().take(limit) {
        println!(
            "{}  {:<16} {:>3} reps  {} form errors",
            summary.finished_at.format("%Y-%m-%d %H:%M"),
            summary.exercise_id,
            summary.reps,
            summary.form_errors
        );
    }
    Ok(())
}

/// Prints feedback to stdout, marking messages a voice sink would speak
struct ConsoleSink;

impl FeedbackSink for ConsoleSink {
    fn deliver(&mut self, message: &FeedbackMessage) -> Result<()> {
        let marker = match message.kind {
            FeedbackKind::Info => "→",
            FeedbackKind::Progress => "#",
            FeedbackKind::Warning => "!",
        };
        let voice = if message.speak { " 🔊" } else { "" };
        println!("  {} {}{}", marker, message.text, voice);
        Ok(())
    }
}
