//! Infrastructure layer: filesystem locations and configuration loading.

pub mod config_service;
pub mod paths;

pub use config_service::ConfigService;
pub use paths::{PathError, WahlomatPaths};
