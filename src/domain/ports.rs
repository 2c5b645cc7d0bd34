use crate::domain::model::{Company, Evidence, FileRecord, Framework, Relation, Scheme};
use crate::domain::scoring::ScoringWeights;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Data access for the portal. Stands in for the shared database client;
/// every layer that needs storage receives one explicitly.
#[async_trait]
pub trait PortalRepository: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>>;
    async fn get_company(&self, id: &str) -> Result<Option<Company>>;
    async fn insert_company(&self, company: Company) -> Result<()>;
    /// Replaces the stored record with the same id.
    async fn update_company(&self, company: Company) -> Result<()>;

    async fn list_schemes(&self) -> Result<Vec<Scheme>>;
    async fn find_scheme_by_code(&self, code: &str) -> Result<Option<Scheme>>;
    /// Inserts, or replaces the stored record with the same id.
    async fn save_scheme(&self, scheme: Scheme) -> Result<()>;

    async fn list_relations(&self) -> Result<Vec<Relation>>;
    async fn insert_relation(&self, relation: Relation) -> Result<()>;

    async fn list_frameworks(&self) -> Result<Vec<Framework>>;
    async fn find_framework_by_code(&self, code: &str) -> Result<Option<Framework>>;
    /// Inserts, or replaces the stored record with the same id.
    async fn save_framework(&self, framework: Framework) -> Result<()>;

    async fn list_files(&self) -> Result<Vec<FileRecord>>;
    async fn get_file(&self, id: &str) -> Result<Option<FileRecord>>;
    async fn insert_file(&self, file: FileRecord) -> Result<()>;

    async fn list_evidence(&self) -> Result<Vec<Evidence>>;
    async fn insert_evidence(&self, evidence: Evidence) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn store_path(&self) -> &str;
    fn scoring_weights(&self) -> ScoringWeights;
}
