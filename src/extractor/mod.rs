use anyhow::{Context, Result};
use opencv::{core::Vector, imgcodecs};
use std::fs;
use std::path::Path;

use crate::decoder::VideoDecoder;
use crate::shared::constants;
use crate::utils::{file_utils, logger};

/// True when the frame at `index` should be written for the given interval.
/// Frames are counted from 0, so `n` decodable frames at interval `i` yield
/// `ceil(n / i)` captures.
fn is_capture_index(index: u64, interval: u64) -> bool {
    index % interval.max(1) == 0
}

/// `{stem}_frame_{index:06}.jpg`
fn frame_file_name(stem: &str, index: u64) -> String {
    format!(
        "{}_frame_{:06}.{}",
        stem,
        index,
        constants::FRAME_EXTENSION
    )
}

/// Decode every video in `video_dir` and write every `interval`-th frame as a
/// JPEG into `output_dir`.
///
/// End of stream and decode errors both just end that video; the next file is
/// still processed. Partially written output stays where it is.
pub fn extract_frames(video_dir: &Path, output_dir: &Path, interval: u64) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output folder: {:?}", output_dir))?;

    let videos = file_utils::list_files(video_dir, constants::VIDEO_EXTENSION)?;
    if videos.is_empty() {
        println!(
            "No .{} files found in {:?}",
            constants::VIDEO_EXTENSION,
            video_dir
        );
        return Ok(());
    }

    for video_path in &videos {
        let stem = video_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut decoder = match VideoDecoder::open_file(video_path) {
            Ok(d) => d,
            Err(e) => {
                println!("Skipping {:?}: {}", video_path, e);
                logger::error(&format!("Open failed for {:?}: {}", video_path, e));
                continue;
            }
        };

        println!(
            "Extracting frames from {} ({} frames, every {})",
            file_utils::file_name_string(video_path),
            decoder.frame_count(),
            interval.max(1)
        );

        let mut frame_index: u64 = 0;
        let mut written: u64 = 0;

        loop {
            let frame = match decoder.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    // Same handling as EOF, best effort by design upstream.
                    logger::debug(&format!("Decode ended for {:?}: {}", video_path, e));
                    break;
                }
            };

            if is_capture_index(frame_index, interval) {
                let name = frame_file_name(&stem, frame_index);
                let out_path = output_dir.join(&name);
                let out_str = out_path
                    .to_str()
                    .with_context(|| format!("Non-UTF-8 output path: {:?}", out_path))?;
                imgcodecs::imwrite(out_str, &frame, &Vector::<i32>::new())
                    .with_context(|| format!("Failed to write {:?}", out_path))?;
                written += 1;
            }
            frame_index += 1;
        }

        println!("  {} frames decoded, {} written", frame_index, written);
        logger::info(&format!(
            "Extracted {} of {} frames from {:?}",
            written, frame_index, video_path
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_indices_are_every_nth_from_zero() {
        let captured: Vec<u64> = (0..10).filter(|&i| is_capture_index(i, 3)).collect();
        assert_eq!(captured, vec![0, 3, 6, 9]);
    }

    #[test]
    fn test_capture_count_is_ceil_n_over_i() {
        for (n, i) in [(10u64, 3u64), (9, 3), (1, 5), (100, 1), (7, 7)] {
            let count = (0..n).filter(|&idx| is_capture_index(idx, i)).count() as u64;
            assert_eq!(count, n.div_ceil(i), "n={} i={}", n, i);
        }
    }

    #[test]
    fn test_interval_zero_behaves_like_one() {
        assert!(is_capture_index(0, 0));
        assert!(is_capture_index(1, 0));
    }

    #[test]
    fn test_frame_file_name_zero_padded() {
        assert_eq!(frame_file_name("clip", 0), "clip_frame_000000.jpg");
        assert_eq!(frame_file_name("clip", 42), "clip_frame_000042.jpg");
        assert_eq!(frame_file_name("clip", 1234567), "clip_frame_1234567.jpg");
    }

    #[test]
    fn test_frame_file_names_sort_in_frame_order() {
        let mut names: Vec<String> =
            [30u64, 0, 60, 90].iter().map(|&i| frame_file_name("a", i)).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "a_frame_000000.jpg",
                "a_frame_000030.jpg",
                "a_frame_000060.jpg",
                "a_frame_000090.jpg"
            ]
        );
    }
}
