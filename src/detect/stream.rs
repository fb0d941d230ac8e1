use anyhow::Result;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::labels;
use super::model::Detector;
use super::types::Detection;
use crate::decoder::video::mat_to_rgb;
use crate::decoder::VideoDecoder;
use crate::renderer::cell::CellData;
use crate::renderer::{scaler, DisplayManager, FrameProcessor};
use crate::utils::logger;

enum StreamEnd {
    Quit,
    EndOfStream,
    Interrupted,
}

/// Annotated live view: read, detect, overlay, render, until `q`, Ctrl-C
/// or the source runs out.
pub fn run_stream(source: &str, model_path: &Path, conf: f32, iou: f32) -> Result<()> {
    let mut detector = match Detector::load(model_path, conf, iou) {
        Ok(detector) => detector,
        Err(err) => {
            logger::error(&format!("Model load failed: {:#}", err));
            println!("Failed to load model {:?}: {:#}", model_path, err);
            return Ok(());
        }
    };

    let mut decoder = match VideoDecoder::open_source(source) {
        Ok(decoder) => decoder,
        Err(err) => {
            logger::error(&format!("Source open failed: {:#}", err));
            println!("Failed to open video source '{}': {:#}", source, err);
            return Ok(());
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let end = stream_loop(&mut decoder, &mut detector, &running)?;

    match end {
        StreamEnd::Quit => println!("Stream stopped."),
        StreamEnd::Interrupted => println!("Stream interrupted."),
        StreamEnd::EndOfStream => println!("End of stream: {}", decoder.label()),
    }
    Ok(())
}

fn stream_loop(
    decoder: &mut VideoDecoder,
    detector: &mut Detector,
    running: &AtomicBool,
) -> Result<StreamEnd> {
    let mut display = DisplayManager::new()?;

    let (cols, rows) = display.terminal_size_chars()?;
    let pixel_w = cols as u32;
    let pixel_h = rows as u32 * 2;

    let processor = FrameProcessor::new(pixel_w as usize, pixel_h as usize);
    let mut cells = vec![CellData::default(); processor.cell_count()];

    loop {
        if !running.load(Ordering::SeqCst) {
            return Ok(StreamEnd::Interrupted);
        }

        if crossterm::event::poll(Duration::from_millis(0))? {
            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if key.code == crossterm::event::KeyCode::Char('q') {
                    return Ok(StreamEnd::Quit);
                }
            }
        }

        // decode errors end the stream the same way EOF does
        let mut frame = match decoder.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(StreamEnd::EndOfStream),
            Err(err) => {
                logger::error(&format!("Frame read failed: {:#}", err));
                return Ok(StreamEnd::EndOfStream);
            }
        };

        let detections = detector.detect(&frame)?;
        draw_overlay(&mut frame, &detections)?;

        let (rgb, width, height) = mat_to_rgb(&frame)?;
        let canvas = scaler::letterbox_rgb(&rgb, width, height, pixel_w, pixel_h)?;
        processor.process_frame_into(&canvas, &mut cells);
        display.render_diff(&cells, pixel_w as usize)?;
    }
}

/// Class-colored boxes and `name conf` labels, drawn on the BGR frame.
fn draw_overlay(frame: &mut Mat, detections: &[Detection]) -> Result<()> {
    let frame_w = frame.cols();
    let frame_h = frame.rows();

    for det in detections {
        let (r, g, b) = labels::class_color(det.class_id());
        let color = Scalar::new(b as f64, g as f64, r as f64, 0.0);

        let x = (det.xmin() as i32).clamp(0, frame_w - 1);
        let y = (det.ymin() as i32).clamp(0, frame_h - 1);
        let w = (det.width() as i32).clamp(1, frame_w - x);
        let h = (det.height() as i32).clamp(1, frame_h - y);

        imgproc::rectangle(frame, Rect::new(x, y, w, h), color, 2, imgproc::LINE_8, 0)?;

        let label = format!(
            "{} {:.2}",
            labels::class_name(det.class_id()),
            det.confidence()
        );
        let origin = Point::new(x, (y - 5).max(12));
        imgproc::put_text(
            frame,
            &label,
            origin,
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            imgproc::LINE_8,
            false,
        )?;
    }

    Ok(())
}
