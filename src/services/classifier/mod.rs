pub mod encoder;
pub mod inference;
pub mod labels;
pub mod model_manager;
pub mod ranking;
