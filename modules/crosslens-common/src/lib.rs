pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LogFormat};
pub use error::{CrossLensError, Result};
pub use types::*;
