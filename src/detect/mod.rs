pub mod labels;
pub mod model;
pub mod postprocess;
pub mod stream;
pub mod types;

pub use model::Detector;
pub use types::Detection;
