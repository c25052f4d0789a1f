// Domain layer - Series, values and anomaly descriptors
pub mod anomaly;
pub mod error;
pub mod telemetry;
pub mod timestamp;
pub mod value;
