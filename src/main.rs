use trajectorize::all::*;
use trajectorize::synthetic::{self, SyntheticParameters};
use trajectorize::util;

use clap::Parser;
use std::time::Duration;

#[derive(Parser)]
struct Args {
  #[clap(long, default_value = "info")]
  log_level: String,
  // Seconds after which long-running stages stop and keep what they have.
  #[clap(long)]
  time_limit: Option<f64>,
  #[clap(subcommand)]
  command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
  /// Track a raw capture (JSON lines of frames) into fragments.
  Trajectorize {
    #[clap(short, long)]
    input: PathBuf,
    #[clap(short, long)]
    output: PathBuf,
    #[clap(flatten)]
    parameters: ParameterSet,
  },
  /// Join broken fragments of a track file.
  Match {
    #[clap(short, long)]
    input: PathBuf,
    #[clap(short, long)]
    output: PathBuf,
    #[clap(flatten)]
    parameters: ParameterSet,
  },
  /// Interpolate short gaps between fragments with the same name.
  FillGaps {
    #[clap(short, long)]
    input: PathBuf,
    #[clap(short, long)]
    output: PathBuf,
    #[clap(flatten)]
    parameters: ParameterSet,
  },
  /// Average fragments with the same name into one per frame.
  Consolidate {
    #[clap(short, long)]
    input: PathBuf,
    #[clap(short, long)]
    output: PathBuf,
    #[clap(flatten)]
    parameters: ParameterSet,
  },
  /// Write a generated capture.
  Synthetic {
    #[clap(short, long)]
    output: PathBuf,
    #[clap(long, default_value = "100")]
    frame_rate: f64,
    #[clap(flatten)]
    settings: SyntheticParameters,
  },
}

fn handle_error(err: &anyhow::Error) {
  for (i, e) in err.chain().enumerate() {
    println!("  {}: {}", i + 1, e);
  }
}

fn main() {
  if let Err(err) = run() {
    handle_error(&err);
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let args = Args::parse();
  let level = util::parse_level(&args.log_level)
    .ok_or(anyhow!("Unknown log level {}.", args.log_level))?;
  env_logger::Builder::new()
    .filter_level(level)
    .format(util::format_log)
    .init();

  let time_limit = match args.time_limit {
    Some(t) if t < 0. => bail!("Time limit must not be negative."),
    Some(t) => Some(Duration::from_secs_f64(t)),
    None => None,
  };
  let mut progress = LogProgress::new(time_limit);

  match args.command {
    Command::Trajectorize { input, output, parameters } => {
      parameters.validate()?;
      let mut capture = Input::read_capture(&input, parameters.frame_rate)?;
      info!("Read {} frames at {} fps.", capture.num_frames(), capture.frame_rate);
      let track_set = trajectorize(&mut capture, &parameters, &mut progress);
      save(&track_set, capture.frame_rate, &output)?;
    },
    Command::Match { input, output, parameters } => {
      let (mut track_set, parameters) = load(&input, parameters)?;
      match_fragments(&mut track_set, &parameters, &mut progress);
      save(&track_set, parameters.frame_rate, &output)?;
    },
    Command::FillGaps { input, output, parameters } => {
      let (mut track_set, parameters) = load(&input, parameters)?;
      fill_gaps(&mut track_set, &parameters, &mut progress)
        .context("Gap filling failed, nothing was written.")?;
      save(&track_set, parameters.frame_rate, &output)?;
    },
    Command::Consolidate { input, output, parameters } => {
      let (mut track_set, parameters) = load(&input, parameters)?;
      consolidate(&mut track_set, &parameters.passthrough(), &mut progress);
      save(&track_set, parameters.frame_rate, &output)?;
    },
    Command::Synthetic { output, frame_rate, settings } => {
      if frame_rate <= 0. {
        bail!("Frame rate must be positive.");
      }
      let capture = synthetic::generate(&settings, frame_rate);
      write_capture(&output, &capture)?;
      info!("Wrote {} frames to {}.", capture.num_frames(), output.display());
    },
  }
  if progress.is_cancelled() {
    warn!("Time limit reached, output is incomplete.");
  }
  Ok(())
}

// The frame rate stored in the track file takes precedence.
fn load(path: &Path, mut parameters: ParameterSet) -> Result<(TrackSet, ParameterSet)> {
  let file = TrackFile::load(path)?;
  parameters.frame_rate = file.frame_rate;
  parameters.validate()?;
  let track_set = file.into_track_set()?;
  info!("Read {} fragments from {}.", track_set.len(), path.display());
  Ok((track_set, parameters))
}

fn save(track_set: &TrackSet, frame_rate: f64, path: &Path) -> Result<()> {
  TrackFile::new(track_set, frame_rate).save(path)?;
  info!("Wrote {} fragments to {}.", track_set.len(), path.display());
  Ok(())
}
