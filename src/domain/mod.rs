pub mod errors;
pub mod landmarks;
pub mod model;
pub mod pipeline;
pub mod prediction;
pub mod recognition;
pub mod segmentation;
pub mod video;
pub mod vocabulary;
