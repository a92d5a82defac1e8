pub mod hand_detector;
pub mod model_catalog;
pub mod session;
pub mod sign_classifier;
