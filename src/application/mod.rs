// Application layer - Anomaly injection, generation and delivery use cases
pub mod anomaly_creators;
pub mod anomaly_service;
pub mod generation_service;
pub mod push_service;
pub mod random;
pub mod signal_generator;
pub mod telemetry_sink;
