pub mod api;
pub mod camera;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod detection;
pub mod error;
pub mod notifier;
pub mod store;

pub use api::DetectorApi;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::{AcquisitionError, AppError, ConfigError, ExtractionError, NetworkError};
