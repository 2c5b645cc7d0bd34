pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{json_store::JsonFileStore, memory::InMemoryRepository};
pub use config::PortalConfig;
pub use core::evaluator::{evaluate, evaluate_with};
pub use core::portal::Portal;
pub use domain::model::{Company, NewCompany, Scheme, Suggestion};
pub use utils::error::{PortalError, Result};
