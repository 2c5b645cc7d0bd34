use crate::domain::model::{FrameworkRecord, RelationSeed, SchemeRecord};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/seed.json");

/// A catalog import document: schemes, relations declared by code, and
/// compliance frameworks with their requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub schemes: Vec<SchemeRecord>,
    #[serde(default)]
    pub relations: Vec<RelationSeed>,
    #[serde(default)]
    pub frameworks: Vec<FrameworkRecord>,
}

impl CatalogFile {
    pub fn builtin() -> Result<Self> {
        Ok(serde_json::from_str(BUILTIN_CATALOG)?)
    }

    /// Accepts either a `{schemes, relations}` document or a bare array of schemes.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if value.is_array() {
            Ok(Self {
                schemes: serde_json::from_value(value)?,
                ..Self::default()
            })
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }
}
