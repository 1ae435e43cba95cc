pub mod chart;
pub mod classifier;
pub mod fs_service;
pub mod pipeline;
