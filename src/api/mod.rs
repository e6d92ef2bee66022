mod detector_api;

pub use detector_api::{ColorReport, DetectionSnapshot, DetectorApi};
