use crate::adapters::memory::{InMemoryRepository, PortalSnapshot};
use crate::domain::model::{Company, Evidence, FileRecord, Framework, Relation, Scheme};
use crate::domain::ports::PortalRepository;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed repository: the whole store is one JSON document, rewritten
/// after every change. A change becomes visible to readers only once it is
/// on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryRepository,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<PortalSnapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Store {} not found, starting empty", path.display());
                PortalSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            "Loaded store {}: {} companies, {} schemes, {} relations",
            path.display(),
            snapshot.companies.len(),
            snapshot.schemes.len(),
            snapshot.relations.len()
        );

        Ok(Self {
            path,
            inner: InMemoryRepository::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &PortalSnapshot) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the state, writes it, then publishes it.
    async fn commit<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut PortalSnapshot) -> Result<()> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut next = self.inner.snapshot().await;
        change(&mut next)?;
        if let Err(e) = self.persist(&next).await {
            tracing::error!("❌ Failed to write store {}: {}", self.path.display(), e);
            return Err(e);
        }
        self.inner.replace(next).await;
        Ok(())
    }
}

#[async_trait]
impl PortalRepository for JsonFileStore {
    async fn list_companies(&self) -> Result<Vec<Company>> {
        self.inner.list_companies().await
    }

    async fn get_company(&self, id: &str) -> Result<Option<Company>> {
        self.inner.get_company(id).await
    }

    async fn insert_company(&self, company: Company) -> Result<()> {
        self.commit(|state| state.insert_company(company)).await
    }

    async fn update_company(&self, company: Company) -> Result<()> {
        self.commit(|state| state.update_company(company)).await
    }

    async fn list_schemes(&self) -> Result<Vec<Scheme>> {
        self.inner.list_schemes().await
    }

    async fn find_scheme_by_code(&self, code: &str) -> Result<Option<Scheme>> {
        self.inner.find_scheme_by_code(code).await
    }

    async fn save_scheme(&self, scheme: Scheme) -> Result<()> {
        self.commit(|state| state.save_scheme(scheme)).await
    }

    async fn list_relations(&self) -> Result<Vec<Relation>> {
        self.inner.list_relations().await
    }

    async fn insert_relation(&self, relation: Relation) -> Result<()> {
        self.commit(|state| state.insert_relation(relation)).await
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>> {
        self.inner.list_frameworks().await
    }

    async fn find_framework_by_code(&self, code: &str) -> Result<Option<Framework>> {
        self.inner.find_framework_by_code(code).await
    }

    async fn save_framework(&self, framework: Framework) -> Result<()> {
        self.commit(|state| state.save_framework(framework)).await
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.inner.list_files().await
    }

    async fn get_file(&self, id: &str) -> Result<Option<FileRecord>> {
        self.inner.get_file(id).await
    }

    async fn insert_file(&self, file: FileRecord) -> Result<()> {
        self.commit(|state| state.insert_file(file)).await
    }

    async fn list_evidence(&self) -> Result<Vec<Evidence>> {
        self.inner.list_evidence().await
    }

    async fn insert_evidence(&self, evidence: Evidence) -> Result<()> {
        self.commit(|state| state.insert_evidence(evidence)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NewCompany;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("portal.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        let company = NewCompany {
            name: "Panaji Prints".to_string(),
            tags: vec!["goa".to_string()],
            ..Default::default()
        }
        .into_company("c-1".to_string(), Utc::now());
        store.insert_company(company.clone()).await.unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_company("c-1").await.unwrap(), Some(company));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, crate::utils::error::PortalError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        // a directory in the temp file's place makes the write fail
        std::fs::create_dir(dir.path().join("portal.json.tmp")).unwrap();

        let company = NewCompany {
            name: "Ghost".to_string(),
            ..Default::default()
        }
        .into_company("c-1".to_string(), Utc::now());
        assert!(store.insert_company(company.clone()).await.is_err());
        assert_eq!(store.get_company("c-1").await.unwrap(), None);
        assert!(!path.exists());

        std::fs::remove_dir(dir.path().join("portal.json.tmp")).unwrap();
        store.insert_company(company.clone()).await.unwrap();
        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_companies().await.unwrap(), vec![company]);
    }

    #[tokio::test]
    async fn test_rejected_change_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.json");
        let store = JsonFileStore::open(&path).await.unwrap();

        let company = NewCompany {
            name: "Nowhere".to_string(),
            ..Default::default()
        }
        .into_company("c-9".to_string(), Utc::now());
        assert!(store.update_company(company).await.is_err());
        assert!(!path.exists());
    }
}
