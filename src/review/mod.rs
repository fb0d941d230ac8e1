pub mod session;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use opencv::imgcodecs;
use opencv::prelude::*;
use std::path::Path;

use crate::decoder::video::mat_to_rgb;
use crate::renderer::cell::CellData;
use crate::renderer::{scaler, DisplayManager, FrameProcessor};
use crate::utils::logger;
use session::{Decision, ReviewSession, Step};

enum PassOutcome {
    Finished,
    Quit,
    Restart,
}

/// Interactive keep/reject loop over extracted frames.
///
/// `y` keep, `n` reject, `b` back (restarts the pass over the remaining
/// list), `q` quit; any other key advances like `n`. Progress survives
/// interruption through the marker file in the output folder.
pub fn review_frames(input_dir: &Path, output_dir: &Path) -> Result<()> {
    loop {
        let mut session = ReviewSession::load(input_dir, output_dir)?;

        if session.is_empty() {
            println!("No .jpg frames found in {:?}", input_dir);
            return Ok(());
        }
        if session.current().is_none() {
            println!("All {} frames already reviewed.", session.len());
            return Ok(());
        }

        let outcome = run_pass(&mut session)?;

        // The display is gone here, prints reach the normal screen again.
        match outcome {
            PassOutcome::Restart => continue,
            PassOutcome::Finished => {
                println!("Review complete: {} frames processed.", session.len());
                return Ok(());
            }
            PassOutcome::Quit => {
                println!(
                    "Review stopped at frame {} of {}; run again to resume.",
                    session.position() + 1,
                    session.len()
                );
                return Ok(());
            }
        }
    }
}

/// One pass over the remaining frames. Owns the display for its duration so
/// the terminal is restored on every way out.
fn run_pass(session: &mut ReviewSession) -> Result<PassOutcome> {
    let mut display = DisplayManager::new()?;

    let (cols, rows) = display.terminal_size_chars()?;
    let pixel_w = cols as u32;
    let pixel_h = rows as u32 * 2;

    let processor = FrameProcessor::new(pixel_w as usize, pixel_h as usize);
    let mut cells = vec![CellData::default(); processor.cell_count()];

    while let Some(path) = session.current().map(Path::to_path_buf) {
        let canvas = load_frame_canvas(&path, pixel_w, pixel_h)?;
        processor.process_frame_into(&canvas, &mut cells);
        display.render_diff(&cells, pixel_w as usize)?;

        let decision = read_decision()?;
        logger::debug(&format!("Decision {:?} for {:?}", decision, path));

        match session.apply(decision)? {
            Step::Continue => {}
            Step::Finished => return Ok(PassOutcome::Finished),
            Step::Quit => return Ok(PassOutcome::Quit),
            Step::Restart => return Ok(PassOutcome::Restart),
        }
    }

    Ok(PassOutcome::Finished)
}

/// Decode a frame image and letterbox it into the terminal pixel grid.
fn load_frame_canvas(path: &Path, pixel_w: u32, pixel_h: u32) -> Result<Vec<u8>> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Non-UTF-8 frame path: {:?}", path))?;

    let frame = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)
        .with_context(|| format!("Failed to read image {:?}", path))?;
    if frame.empty() {
        return Err(anyhow!("Unreadable image: {:?}", path));
    }

    let (rgb, width, height) = mat_to_rgb(&frame)?;
    scaler::letterbox_rgb(&rgb, width, height, pixel_w, pixel_h)
}

/// Block until a key press and map it to a decision. Ctrl-C counts as quit;
/// raw mode swallows the signal otherwise.
fn read_decision() -> Result<Decision> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && key.code == KeyCode::Char('c')
            {
                return Ok(Decision::Quit);
            }
            return Ok(match key.code {
                KeyCode::Char('y') => Decision::Keep,
                KeyCode::Char('n') => Decision::Reject,
                KeyCode::Char('q') => Decision::Quit,
                KeyCode::Char('b') => Decision::Back,
                _ => Decision::Skip,
            });
        }
    }
}
