// Domain layer - Facilities, series and the pure chart algorithms
pub mod bucketizer;
pub mod dashboard;
pub mod facility;
pub mod merge;
pub mod telemetry;
pub mod weather;
pub mod zero_fill;
