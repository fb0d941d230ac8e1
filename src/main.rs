mod decoder;
mod detect;
mod extractor;
mod renderer;
mod review;
mod shared;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::shared::config::Config;
use crate::shared::constants;

#[derive(Parser)]
#[command(author, version, about = "Curate object-detection training frames from video", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every Nth frame from the .mp4 files in a folder
    Extract {
        #[arg(short, long)]
        videos: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        interval: u64,
    },
    /// Review extracted frames one by one (y keep / n reject / b back / q quit)
    Review {
        #[arg(short, long)]
        frames: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run a YOLOv8 detector over a live source and display the annotated stream
    Stream {
        /// Camera index, video file path or stream URL
        #[arg(short, long)]
        source: String,
        #[arg(short, long)]
        model: PathBuf,
        #[arg(long, default_value_t = constants::DEFAULT_CONF_THRESHOLD)]
        conf: f32,
        #[arg(long, default_value_t = constants::DEFAULT_IOU_THRESHOLD)]
        iou: f32,
    },
    /// Prompt-gated extract + review pipeline driven by the config file
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    utils::logger::init();

    // Reset terminal state in case a previous run crashed in raw mode.
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract {
            videos,
            output,
            interval,
        } => {
            extractor::extract_frames(videos, output, *interval)?;
        }
        Commands::Review { frames, output } => {
            review::review_frames(frames, output)?;
        }
        Commands::Stream {
            source,
            model,
            conf,
            iou,
        } => {
            detect::stream::run_stream(source, model, *conf, *iou)?;
        }
        Commands::Run { config } => {
            run_pipeline(config.as_deref())?;
        }
    }

    Ok(())
}

/// The original two-step workflow: each stage behind a yes/no prompt, with
/// folders taken from the config file.
fn run_pipeline(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    if prompt_yes_no("Extract frames from videos?")? {
        extractor::extract_frames(&config.video_dir, &config.frames_dir, config.frame_interval)?;
    }

    if prompt_yes_no("Review extracted frames?")? {
        review::review_frames(&config.frames_dir, &config.filtered_dir)?;
    }

    Ok(())
}

fn prompt_yes_no(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
