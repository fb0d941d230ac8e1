use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants;
use crate::utils::{file_utils, logger};

/// A single-key verdict on the frame currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `y` - copy the frame to the output folder.
    Keep,
    /// `n` - drop the frame.
    Reject,
    /// `q` - stop reviewing, leave the rest for a later session.
    Quit,
    /// `b` - restart the pass over the remaining list.
    Back,
    /// Any unbound key; advances exactly like Reject.
    Skip,
}

/// What the caller should do after a decision was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Finished,
    Quit,
    /// Reload the session and run a fresh pass. This is the literal behavior
    /// of `b`: iteration restarts over the remaining list, it does not rewind
    /// a single step (the resume marker has already advanced).
    Restart,
}

/// Resumable review state over the sorted frame list.
///
/// Owned by the caller and passed through the loop by reference; the only
/// ambient state is the `progress.txt` marker in the output folder, one plain
/// filename overwritten after every decision so an interrupted session picks
/// up at the successor frame.
pub struct ReviewSession {
    output_dir: PathBuf,
    progress_path: PathBuf,
    frames: Vec<PathBuf>,
    index: usize,
    start_index: usize,
}

impl ReviewSession {
    pub fn load(input_dir: &Path, output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output folder: {:?}", output_dir))?;

        let frames = file_utils::list_files(input_dir, constants::FRAME_EXTENSION)?;
        let progress_path = output_dir.join(constants::PROGRESS_FILE);

        let start_index = match fs::read_to_string(&progress_path) {
            Ok(marker) => {
                let marker = marker.trim();
                match frames
                    .iter()
                    .position(|p| file_utils::file_name_string(p) == marker)
                {
                    Some(pos) => pos + 1,
                    None => {
                        if !marker.is_empty() {
                            logger::info(&format!(
                                "Marker '{}' not in current frame list, restarting from 0",
                                marker
                            ));
                        }
                        0
                    }
                }
            }
            Err(_) => 0,
        };

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            progress_path,
            frames,
            index: start_index,
            start_index,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Index of the frame shown next.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Path> {
        self.frames.get(self.index).map(|p| p.as_path())
    }

    /// Apply a decision to the current frame.
    ///
    /// `y`/`n`/unbound keys write the marker and advance; `q` leaves the
    /// marker at its previous value; `b` past the resume point requests a
    /// restart without touching the marker, and at the resume point falls
    /// through like an unbound key.
    pub fn apply(&mut self, decision: Decision) -> Result<Step> {
        let frame = match self.frames.get(self.index) {
            Some(frame) => frame.clone(),
            None => return Ok(Step::Finished),
        };
        let frame_name = file_utils::file_name_string(&frame);

        match decision {
            Decision::Quit => return Ok(Step::Quit),
            Decision::Back if self.index > self.start_index => return Ok(Step::Restart),
            Decision::Keep => {
                let dest = self.output_dir.join(&frame_name);
                fs::copy(&frame, &dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", frame, dest))?;
                logger::debug(&format!("Kept {}", frame_name));
            }
            Decision::Reject | Decision::Skip | Decision::Back => {
                logger::debug(&format!("Rejected {}", frame_name));
            }
        }

        fs::write(&self.progress_path, &frame_name)
            .with_context(|| format!("Failed to write marker {:?}", self.progress_path))?;
        self.index += 1;

        if self.index >= self.frames.len() {
            Ok(Step::Finished)
        } else {
            Ok(Step::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::create_dir_all;

    fn setup(name: &str, frames: &[(&str, &[u8])]) -> (PathBuf, PathBuf) {
        let base = std::env::temp_dir().join(format!(
            "framesift-review-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&base);
        let input = base.join("frames");
        let output = base.join("filtered");
        create_dir_all(&input).unwrap();
        for (file, bytes) in frames {
            fs::write(input.join(file), bytes).unwrap();
        }
        (input, output)
    }

    fn marker(output: &Path) -> Option<String> {
        fs::read_to_string(output.join(constants::PROGRESS_FILE)).ok()
    }

    #[test]
    fn test_keep_reject_quit_scenario() {
        let (input, output) = setup(
            "scenario",
            &[("a.jpg", b"AAA"), ("b.jpg", b"BBB"), ("c.jpg", b"CCC")],
        );
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.current().unwrap().file_name().unwrap(), "a.jpg");
        assert_eq!(session.apply(Decision::Keep).unwrap(), Step::Continue);
        assert_eq!(session.apply(Decision::Reject).unwrap(), Step::Continue);
        assert_eq!(session.apply(Decision::Quit).unwrap(), Step::Quit);

        // exactly one identical copy, marker at b.jpg, c.jpg untouched
        assert_eq!(fs::read(output.join("a.jpg")).unwrap(), b"AAA");
        assert!(!output.join("b.jpg").exists());
        assert!(!output.join("c.jpg").exists());
        assert_eq!(marker(&output).unwrap(), "b.jpg");
    }

    #[test]
    fn test_resume_at_successor_of_marker() {
        let (input, output) = setup("resume", &[("a.jpg", b"A"), ("b.jpg", b"B"), ("c.jpg", b"C")]);
        create_dir_all(&output).unwrap();
        fs::write(output.join(constants::PROGRESS_FILE), "b.jpg").unwrap();

        let session = ReviewSession::load(&input, &output).unwrap();
        assert_eq!(session.position(), 2);
        assert_eq!(session.current().unwrap().file_name().unwrap(), "c.jpg");
    }

    #[test]
    fn test_stale_marker_resets_to_zero() {
        let (input, output) = setup("stale", &[("a.jpg", b"A"), ("b.jpg", b"B")]);
        create_dir_all(&output).unwrap();
        fs::write(output.join(constants::PROGRESS_FILE), "gone.jpg").unwrap();

        let session = ReviewSession::load(&input, &output).unwrap();
        assert_eq!(session.position(), 0);
    }

    #[test]
    fn test_quit_without_decisions_writes_no_marker() {
        let (input, output) = setup("quit-first", &[("a.jpg", b"A")]);
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.apply(Decision::Quit).unwrap(), Step::Quit);
        assert!(marker(&output).is_none());
        assert!(!output.join("a.jpg").exists());
    }

    #[test]
    fn test_skip_advances_like_reject() {
        let (input, output) = setup("skip", &[("a.jpg", b"A"), ("b.jpg", b"B")]);
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.apply(Decision::Skip).unwrap(), Step::Continue);
        assert_eq!(marker(&output).unwrap(), "a.jpg");
        assert!(!output.join("a.jpg").exists());
    }

    #[test]
    fn test_back_at_resume_point_falls_through() {
        let (input, output) = setup("back-start", &[("a.jpg", b"A"), ("b.jpg", b"B")]);
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.apply(Decision::Back).unwrap(), Step::Continue);
        assert_eq!(session.position(), 1);
        assert_eq!(marker(&output).unwrap(), "a.jpg");
    }

    #[test]
    fn test_back_past_resume_point_restarts_over_remaining_list() {
        let (input, output) = setup(
            "back-restart",
            &[("a.jpg", b"A"), ("b.jpg", b"B"), ("c.jpg", b"C")],
        );
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.apply(Decision::Keep).unwrap(), Step::Continue);
        assert_eq!(session.apply(Decision::Back).unwrap(), Step::Restart);
        // marker untouched by the restart request
        assert_eq!(marker(&output).unwrap(), "a.jpg");

        // the reloaded session resumes at the same frame, not one earlier:
        // restart-over-remaining-list, the documented quirk
        let reloaded = ReviewSession::load(&input, &output).unwrap();
        assert_eq!(reloaded.position(), 1);
        assert_eq!(reloaded.current().unwrap().file_name().unwrap(), "b.jpg");
    }

    #[test]
    fn test_list_exhaustion_finishes() {
        let (input, output) = setup("exhaust", &[("a.jpg", b"A"), ("b.jpg", b"B")]);
        let mut session = ReviewSession::load(&input, &output).unwrap();

        assert_eq!(session.apply(Decision::Reject).unwrap(), Step::Continue);
        assert_eq!(session.apply(Decision::Keep).unwrap(), Step::Finished);
        assert_eq!(session.apply(Decision::Keep).unwrap(), Step::Finished);
        assert_eq!(marker(&output).unwrap(), "b.jpg");
    }

    #[test]
    fn test_interrupted_session_resumes_exactly_at_quit_point() {
        let (input, output) = setup(
            "reopen",
            &[("a.jpg", b"A"), ("b.jpg", b"B"), ("c.jpg", b"C")],
        );

        let mut first = ReviewSession::load(&input, &output).unwrap();
        first.apply(Decision::Keep).unwrap();
        assert_eq!(first.apply(Decision::Quit).unwrap(), Step::Quit);

        let second = ReviewSession::load(&input, &output).unwrap();
        assert_eq!(second.position(), 1);
        assert_eq!(second.current().unwrap().file_name().unwrap(), "b.jpg");
    }
}
