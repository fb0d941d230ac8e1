use anyhow::{anyhow, Result};
use opencv::{core, core::Mat, imgproc, prelude::*, videoio};
use std::path::Path;

/// Convert a BGR `Mat` into a packed RGB byte buffer plus dimensions.
pub fn mat_to_rgb(frame: &Mat) -> Result<(Vec<u8>, u32, u32)> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    if !rgb.is_continuous() {
        return Err(anyhow!("Frame is not continuous"));
    }

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    Ok((rgb.data_bytes()?.to_vec(), width, height))
}

/// Thin wrapper over an OpenCV `VideoCapture`.
///
/// Frames come out as BGR `Mat`s at the source resolution; color conversion
/// and scaling happen at the point of use (JPEG write, inference, display).
pub struct VideoDecoder {
    capture: videoio::VideoCapture,
    fps: f64,
    frame_count: u64,
    label: String,
}

impl VideoDecoder {
    pub fn open_file(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Non-UTF-8 video path: {:?}", path))?;

        // CAP_ANY lets OpenCV pick the platform backend
        // (AVFoundation / Media Foundation / V4L2-GStreamer).
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        Self::from_capture(capture, path_str.to_string())
    }

    /// Open a source string the way the streamer interprets it: an integer is
    /// a camera index, anything else is a file path or stream URL.
    pub fn open_source(source: &str) -> Result<Self> {
        let capture = match source.parse::<i32>() {
            Ok(index) => videoio::VideoCapture::new(index, videoio::CAP_ANY)?,
            Err(_) => videoio::VideoCapture::from_file(source, videoio::CAP_ANY)?,
        };
        Self::from_capture(capture, source.to_string())
    }

    fn from_capture(capture: videoio::VideoCapture, label: String) -> Result<Self> {
        if !capture.is_opened()? {
            return Err(anyhow!("Failed to open video source: {}", label));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;

        crate::utils::logger::debug(&format!(
            "Opened video source {} ({}x{}, {:.2} fps, {} frames)",
            label,
            capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
            fps,
            frame_count
        ));

        Ok(Self {
            capture,
            fps,
            frame_count,
            label,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Reported frame total; 0 for live sources.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read the next BGR frame. `Ok(None)` is end of stream; a decode error
    /// is propagated and left to the caller, which in every flow here treats
    /// it the same as EOF.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None);
        }
        if frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        let _ = self.capture.release();
        crate::utils::logger::debug(&format!("Released video source {}", self.label));
    }
}
