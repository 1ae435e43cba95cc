pub mod chart;
pub mod classifier;
