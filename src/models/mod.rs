pub mod chart_types;
pub mod classify_types;
