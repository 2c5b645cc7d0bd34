// Adapters layer: concrete implementations for external systems (storage, catalog files, http).

pub mod explain;
pub mod json_store;
pub mod memory;
pub mod seed;
