// Telemetry generator - synthetic series, anomaly injection and delivery
pub mod application;
pub mod domain;
pub mod infrastructure;
