use crate::domain::model::{Company, Evidence, FileRecord, Framework, Relation, Scheme};
use crate::domain::ports::PortalRepository;
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the portal stores, in one serializable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalSnapshot {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl PortalSnapshot {
    pub fn insert_company(&mut self, company: Company) -> Result<()> {
        if self.companies.iter().any(|c| c.id == company.id) {
            return Err(PortalError::validation(format!(
                "Company id {} already exists",
                company.id
            )));
        }
        self.companies.push(company);
        Ok(())
    }

    pub fn update_company(&mut self, company: Company) -> Result<()> {
        match self.companies.iter_mut().find(|c| c.id == company.id) {
            Some(slot) => {
                *slot = company;
                Ok(())
            }
            None => Err(PortalError::not_found("Company", company.id)),
        }
    }

    pub fn save_scheme(&mut self, scheme: Scheme) -> Result<()> {
        if self
            .schemes
            .iter()
            .any(|s| s.code == scheme.code && s.id != scheme.id)
        {
            return Err(PortalError::validation(format!(
                "Scheme code {} is already taken",
                scheme.code
            )));
        }
        match self.schemes.iter_mut().find(|s| s.id == scheme.id) {
            Some(slot) => *slot = scheme,
            None => self.schemes.push(scheme),
        }
        Ok(())
    }

    pub fn insert_relation(&mut self, relation: Relation) -> Result<()> {
        self.relations.push(relation);
        Ok(())
    }

    pub fn save_framework(&mut self, framework: Framework) -> Result<()> {
        if self
            .frameworks
            .iter()
            .any(|f| f.code == framework.code && f.id != framework.id)
        {
            return Err(PortalError::validation(format!(
                "Framework code {} is already taken",
                framework.code
            )));
        }
        match self.frameworks.iter_mut().find(|f| f.id == framework.id) {
            Some(slot) => *slot = framework,
            None => self.frameworks.push(framework),
        }
        Ok(())
    }

    pub fn insert_file(&mut self, file: FileRecord) -> Result<()> {
        if self.files.iter().any(|f| f.id == file.id) {
            return Err(PortalError::validation(format!("File id {} already exists", file.id)));
        }
        self.files.push(file);
        Ok(())
    }

    pub fn insert_evidence(&mut self, evidence: Evidence) -> Result<()> {
        if self.evidence.iter().any(|e| e.id == evidence.id) {
            return Err(PortalError::validation(format!(
                "Evidence id {} already exists",
                evidence.id
            )));
        }
        self.evidence.push(evidence);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<PortalSnapshot>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: PortalSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub async fn snapshot(&self) -> PortalSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn replace(&self, snapshot: PortalSnapshot) {
        *self.state.lock().await = snapshot;
    }
}

#[async_trait]
impl PortalRepository for InMemoryRepository {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        Ok(self.state.lock().await.companies.clone())
    }

    async fn get_company(&self, id: &str) -> Result<Option<Company>> {
        let state = self.state.lock().await;
        Ok(state.companies.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_company(&self, company: Company) -> Result<()> {
        self.state.lock().await.insert_company(company)
    }

    async fn update_company(&self, company: Company) -> Result<()> {
        self.state.lock().await.update_company(company)
    }

    async fn list_schemes(&self) -> Result<Vec<Scheme>> {
        Ok(self.state.lock().await.schemes.clone())
    }

    async fn find_scheme_by_code(&self, code: &str) -> Result<Option<Scheme>> {
        let state = self.state.lock().await;
        Ok(state.schemes.iter().find(|s| s.code == code).cloned())
    }

    async fn save_scheme(&self, scheme: Scheme) -> Result<()> {
        self.state.lock().await.save_scheme(scheme)
    }

    async fn list_relations(&self) -> Result<Vec<Relation>> {
        Ok(self.state.lock().await.relations.clone())
    }

    async fn insert_relation(&self, relation: Relation) -> Result<()> {
        self.state.lock().await.insert_relation(relation)
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>> {
        Ok(self.state.lock().await.frameworks.clone())
    }

    async fn find_framework_by_code(&self, code: &str) -> Result<Option<Framework>> {
        let state = self.state.lock().await;
        Ok(state.frameworks.iter().find(|f| f.code == code).cloned())
    }

    async fn save_framework(&self, framework: Framework) -> Result<()> {
        self.state.lock().await.save_framework(framework)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        Ok(self.state.lock().await.files.clone())
    }

    async fn get_file(&self, id: &str) -> Result<Option<FileRecord>> {
        let state = self.state.lock().await;
        Ok(state.files.iter().find(|f| f.id == id).cloned())
    }

    async fn insert_file(&self, file: FileRecord) -> Result<()> {
        self.state.lock().await.insert_file(file)
    }

    async fn list_evidence(&self) -> Result<Vec<Evidence>> {
        Ok(self.state.lock().await.evidence.clone())
    }

    async fn insert_evidence(&self, evidence: Evidence) -> Result<()> {
        self.state.lock().await.insert_evidence(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SchemeRecord;
    use chrono::Utc;

    #[tokio::test]
    async fn test_scheme_code_stays_unique() {
        let repo = InMemoryRepository::new();
        let record = SchemeRecord {
            code: "BRSR".to_string(),
            title: "BRSR".to_string(),
            ..Default::default()
        };
        repo.save_scheme(record.clone().into_scheme(Utc::now())).await.unwrap();

        let clash = repo.save_scheme(record.into_scheme(Utc::now())).await;
        assert!(clash.is_err());
        assert_eq!(repo.list_schemes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_company_fails() {
        let repo = InMemoryRepository::new();
        let company = crate::domain::model::NewCompany {
            name: "Ghost".to_string(),
            ..Default::default()
        }
        .into_company("ghost".to_string(), Utc::now());
        assert!(repo.update_company(company).await.is_err());
    }

    #[test]
    fn test_old_snapshot_without_evidence_sections_loads() {
        let snapshot: PortalSnapshot =
            serde_json::from_str(r#"{"companies": [], "schemes": [], "relations": []}"#).unwrap();
        assert!(snapshot.frameworks.is_empty());
        assert!(snapshot.files.is_empty());
        assert!(snapshot.evidence.is_empty());
    }
}
