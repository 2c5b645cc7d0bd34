pub mod catalog;
pub mod evaluator;
pub mod mindmap;
pub mod portal;

pub use crate::domain::model::{Company, Scheme, Suggestion};
pub use crate::domain::ports::{ConfigProvider, PortalRepository};
pub use crate::utils::error::Result;
