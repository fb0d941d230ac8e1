use anyhow::{anyhow, bail, Context, Result};
use fast_image_resize as fr;
use fr::images::Image;
use ndarray::{Array4, Axis};
use opencv::core::Mat;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;

use super::postprocess::{decode_predictions, non_max_suppression};
use super::types::Detection;
use crate::decoder::video::mat_to_rgb;
use crate::shared::constants;
use crate::utils::logger;

/// YOLOv8 ONNX detector over an `ort` session.
pub struct Detector {
    session: Session,
    input_name: String,
    output_name: String,
    input_size: u32,
    conf_threshold: f32,
    iou_threshold: f32,
}

impl Detector {
    pub fn load(model_path: &Path, conf_threshold: f32, iou_threshold: f32) -> Result<Self> {
        let session = Session::builder()?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load detection model {:?}", model_path))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| anyhow!("Model has no inputs: {:?}", model_path))?;
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| anyhow!("Model has no outputs: {:?}", model_path))?;

        logger::info(&format!(
            "Loaded model {:?} (input '{}', output '{}')",
            model_path, input_name, output_name
        ));

        Ok(Self {
            session,
            input_name,
            output_name,
            input_size: constants::MODEL_INPUT_SIZE,
            conf_threshold,
            iou_threshold,
        })
    }

    /// Run the detector on one BGR frame; boxes come back in frame pixels.
    pub fn detect(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
        let (rgb, width, height) = mat_to_rgb(frame)?;
        let ratio = (self.input_size as f32 / width as f32)
            .min(self.input_size as f32 / height as f32);

        let input = self.preprocess(&rgb, width, height, ratio)?;

        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(input.view())?
        ])?;
        let output = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;

        // detection head layout: [1, 4+nc, anchors]
        let shape = output.shape().to_vec();
        if shape.len() != 3 || shape[1] <= 4 {
            bail!("Unexpected model output shape {:?}", shape);
        }
        let preds = output
            .index_axis(Axis(0), 0)
            .into_dimensionality::<ndarray::Ix2>()?;

        let mut detections = decode_predictions(
            preds,
            ratio,
            width as f32,
            height as f32,
            self.conf_threshold,
        );
        non_max_suppression(&mut detections, self.iou_threshold);
        Ok(detections)
    }

    /// Scale the frame into the top-left of a gray square canvas, NCHW f32
    /// in [0, 1].
    fn preprocess(&self, rgb: &[u8], width: u32, height: u32, ratio: f32) -> Result<Array4<f32>> {
        let size = self.input_size as usize;
        let new_w = ((width as f32 * ratio).round() as u32).clamp(1, self.input_size);
        let new_h = ((height as f32 * ratio).round() as u32).clamp(1, self.input_size);

        let src = Image::from_vec_u8(width, height, rgb.to_vec(), fr::PixelType::U8x3)?;
        let mut dst = Image::new(new_w, new_h, fr::PixelType::U8x3);
        let mut resizer = fr::Resizer::new();
        resizer.resize(&src, &mut dst, None)?;
        let scaled = dst.buffer();

        let mut input = Array4::<f32>::from_elem((1, 3, size, size), 144.0 / 255.0);
        for y in 0..new_h as usize {
            for x in 0..new_w as usize {
                let p = (y * new_w as usize + x) * 3;
                input[[0, 0, y, x]] = scaled[p] as f32 / 255.0;
                input[[0, 1, y, x]] = scaled[p + 1] as f32 / 255.0;
                input[[0, 2, y, x]] = scaled[p + 2] as f32 / 255.0;
            }
        }

        Ok(input)
    }
}
