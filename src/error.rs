use std::time::Duration;
use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Settings Error: {0}")]
    Settings(#[from] ::config::ConfigError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Network Error: {0}")]
    Network(#[from] NetworkError),
    #[error("Acquisition Error: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error("Coordinator Error: {0}")]
    Coordinator(String),
}

// Camera / frame source errors, never fatal to the detection loop.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("No frame available")]
    Unavailable,
    #[error("Frame source closed")]
    Closed,
    #[error("Failed to read frame from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Frame decode task failed: {0}")]
    DecodeTask(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Sample region is empty for a {width}x{height} frame")]
    EmptyRegion { width: u32, height: u32 },
}

// Network Error Type
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Notification address is empty")]
    EmptyAddress,
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write to {address}: {source}")]
    Write {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Timed out talking to {address} after {after:?}")]
    Timeout { address: String, after: Duration },
    #[error("Actuator service failed: {0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration document must be a JSON object")]
    NotAnObject,
    #[error("Configuration document is missing the `selectors` field")]
    MissingSelectors,
    #[error("Invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("Invalid color `{0}`, expected #rrggbb")]
    InvalidColor(String),
    #[error("Selector {id} has invalid margin {margin}")]
    InvalidMargin { id: i64, margin: f64 },
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write configuration to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
