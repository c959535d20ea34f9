pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{ReconError, Result};
pub use models::ReconOutcome;
pub use service::{BankRegistry, ReconService};
