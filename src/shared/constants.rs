pub const APP_NAME: &str = "framesift";

pub const CONFIG_FILE: &str = "framesift.config";
pub const ERROR_LOG_FILE: &str = "framesift.error.log";
pub const DEBUG_LOG_FILE: &str = "framesift.debug.log";

/// Marker file written into the review output folder after every decision.
pub const PROGRESS_FILE: &str = "progress.txt";

pub const VIDEO_EXTENSION: &str = "mp4";
pub const FRAME_EXTENSION: &str = "jpg";

/// Square input size of the YOLOv8 ONNX detection models.
pub const MODEL_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
