pub mod cell;
pub mod display;
pub mod processor;
pub mod scaler;

pub use display::DisplayManager;
pub use processor::FrameProcessor;
