use crate::core::evaluator::evaluate_with;
use crate::core::mindmap::{self, MindmapGraph};
use crate::domain::model::{
    Company, Evidence, EvidenceDetail, FileRecord, Framework, FrameworkRecord, NewCompany, NewEvidence, NewFile,
    Relation, RelationSeed, RequirementRef, Scheme, SchemeRecord, Suggestion,
};
use crate::domain::ports::{ConfigProvider, PortalRepository};
use crate::domain::scoring::ScoringWeights;
use crate::utils::error::{PortalError, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
}

pub struct Portal<R: PortalRepository> {
    repo: R,
    weights: ScoringWeights,
}

impl<R: PortalRepository> Portal<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            weights: ScoringWeights::default(),
        }
    }

    pub fn from_config<C: ConfigProvider>(repo: R, config: &C) -> Self {
        Self {
            repo,
            weights: config.scoring_weights(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub async fn create_company(&self, input: NewCompany) -> Result<Company> {
        validate_company(&input)?;
        let company = input.into_company(Uuid::new_v4().to_string(), Utc::now());
        self.repo.insert_company(company.clone()).await?;
        tracing::info!("🏭 Created company {} ({})", company.name, company.id);
        Ok(company)
    }

    /// Full-record update; `id` and `created_at` are kept.
    pub async fn update_company(&self, id: &str, input: NewCompany) -> Result<Company> {
        validate_company(&input)?;
        let existing = self.get_company(id).await?;
        let company = input.into_company(existing.id, existing.created_at);
        self.repo.update_company(company.clone()).await?;
        tracing::info!("✏️ Updated company {}", company.id);
        Ok(company)
    }

    /// Newest first.
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let mut companies = self.repo.list_companies().await?;
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(companies)
    }

    pub async fn get_company(&self, id: &str) -> Result<Company> {
        self.repo
            .get_company(id)
            .await?
            .ok_or_else(|| PortalError::not_found("Company", id))
    }

    /// Ordered by category, then title.
    pub async fn list_schemes(&self) -> Result<Vec<Scheme>> {
        let mut schemes = self.repo.list_schemes().await?;
        schemes.sort_by(|a, b| {
            a.category_or_empty()
                .cmp(b.category_or_empty())
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(schemes)
    }

    pub async fn get_scheme(&self, code: &str) -> Result<Scheme> {
        self.repo
            .find_scheme_by_code(code)
            .await?
            .ok_or_else(|| PortalError::not_found("Scheme", code))
    }

    /// Upserts by `code`.
    pub async fn import_schemes(&self, records: Vec<SchemeRecord>) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for (row, record) in records.into_iter().enumerate() {
            require_text("code", &record.code, row)?;
            require_text("title", &record.title, row)?;

            let now = Utc::now();
            match self.repo.find_scheme_by_code(&record.code).await? {
                Some(mut existing) => {
                    record.apply_to(&mut existing, now);
                    self.repo.save_scheme(existing).await?;
                    summary.updated += 1;
                }
                None => {
                    tracing::debug!("Creating scheme {}", record.code);
                    self.repo.save_scheme(record.into_scheme(now)).await?;
                    summary.created += 1;
                }
            }
        }
        summary.total = self.repo.list_schemes().await?.len();
        tracing::info!(
            "📚 Imported/updated {} schemes. Total now in store: {}",
            summary.created + summary.updated,
            summary.total
        );
        Ok(summary)
    }

    /// Resolves codes to ids; unresolvable pairs are skipped, duplicates ignored.
    pub async fn seed_relations(&self, seeds: Vec<RelationSeed>) -> Result<RelationSummary> {
        let id_by_code: HashMap<String, String> = self
            .repo
            .list_schemes()
            .await?
            .into_iter()
            .map(|s| (s.code, s.id))
            .collect();
        let mut existing = self.repo.list_relations().await?;
        let mut summary = RelationSummary::default();

        for seed in seeds {
            let (Some(from_id), Some(to_id)) = (id_by_code.get(&seed.from_code), id_by_code.get(&seed.to_code))
            else {
                tracing::warn!(
                    "⚠️ Skipping relation: could not resolve {} or {}",
                    seed.from_code,
                    seed.to_code
                );
                summary.skipped += 1;
                continue;
            };

            let duplicate = existing.iter().any(|r| {
                &r.from_id == from_id && &r.to_id == to_id && r.relation_type == seed.relation_type
            });
            if duplicate {
                summary.existing += 1;
                continue;
            }

            let relation = Relation {
                id: Uuid::new_v4().to_string(),
                from_id: from_id.clone(),
                to_id: to_id.clone(),
                relation_type: seed.relation_type,
                note: seed.note,
            };
            self.repo.insert_relation(relation.clone()).await?;
            existing.push(relation);
            summary.created += 1;
        }

        tracing::info!(
            "🔗 Relations: {} created, {} already present, {} skipped",
            summary.created,
            summary.existing,
            summary.skipped
        );
        Ok(summary)
    }

    pub async fn suggest_for(&self, company_id: &str) -> Result<Vec<Suggestion>> {
        let company = self.get_company(company_id).await?;
        let schemes = self.list_schemes().await?;
        let suggestions = evaluate_with(&company, &schemes, &self.weights);
        tracing::debug!(
            "Evaluated {} schemes for {}: {} suggestions",
            schemes.len(),
            company.name,
            suggestions.len()
        );
        Ok(suggestions)
    }

    pub async fn mindmap(&self) -> Result<MindmapGraph> {
        let schemes = self.list_schemes().await?;
        let relations = self.repo.list_relations().await?;
        Ok(mindmap::build(&schemes, &relations))
    }

    /// Upserts by `code`; requirements are replaced but keep ids by code.
    pub async fn import_frameworks(&self, records: Vec<FrameworkRecord>) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for (row, record) in records.into_iter().enumerate() {
            require_text("code", &record.code, row)?;
            require_text("title", &record.title, row)?;
            for requirement in &record.requirements {
                require_text("requirement code", &requirement.code, row)?;
                require_text("requirement title", &requirement.title, row)?;
            }

            match self.repo.find_framework_by_code(&record.code).await? {
                Some(mut existing) => {
                    record.apply_to(&mut existing);
                    self.repo.save_framework(existing).await?;
                    summary.updated += 1;
                }
                None => {
                    tracing::debug!("Creating framework {}", record.code);
                    self.repo.save_framework(record.into_framework(Utc::now())).await?;
                    summary.created += 1;
                }
            }
        }
        summary.total = self.repo.list_frameworks().await?.len();
        tracing::info!(
            "🧭 Imported/updated {} frameworks. Total now in store: {}",
            summary.created + summary.updated,
            summary.total
        );
        Ok(summary)
    }

    /// Ordered by code.
    pub async fn list_frameworks(&self) -> Result<Vec<Framework>> {
        let mut frameworks = self.repo.list_frameworks().await?;
        frameworks.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(frameworks)
    }

    pub async fn get_framework(&self, code: &str) -> Result<Framework> {
        self.repo
            .find_framework_by_code(code)
            .await?
            .ok_or_else(|| PortalError::not_found("Framework", code))
    }

    pub async fn register_file(&self, input: NewFile) -> Result<FileRecord> {
        let filename = input.filename.trim();
        if filename.is_empty() {
            return Err(PortalError::validation("Filename is required"));
        }
        if let Some(url) = &input.url {
            check_link(url)?;
        }

        let file = FileRecord {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            mime_type: input.mime_type,
            size_bytes: input.size_bytes,
            url: input.url,
            created_at: Utc::now(),
        };
        self.repo.insert_file(file.clone()).await?;
        tracing::info!("📎 Registered file {} ({})", file.filename, file.id);
        Ok(file)
    }

    /// Newest first.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut files = self.repo.list_files().await?;
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    pub async fn add_evidence(&self, input: NewEvidence) -> Result<Evidence> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(PortalError::validation("Title is required"));
        }
        if input.file_id.is_none() && input.url.is_none() {
            return Err(PortalError::validation("Attach a file or a URL as evidence"));
        }
        if let Some(url) = &input.url {
            check_link(url)?;
        }

        let company = self.get_company(&input.company_id).await?;
        if let Some(file_id) = &input.file_id {
            if self.repo.get_file(file_id).await?.is_none() {
                return Err(PortalError::not_found("File", file_id.as_str()));
            }
        }
        let requirement_id = match &input.requirement_code {
            Some(code) => Some(self.resolve_requirement(input.framework_code.as_deref(), code).await?),
            None => None,
        };

        let evidence = Evidence {
            id: Uuid::new_v4().to_string(),
            company_id: company.id,
            title: title.to_string(),
            requirement_id,
            file_id: input.file_id,
            url: input.url,
            uploaded_at: Utc::now(),
        };
        self.repo.insert_evidence(evidence.clone()).await?;
        tracing::info!("🗂️ Added evidence '{}' for {}", evidence.title, company.name);
        Ok(evidence)
    }

    /// Newest first, optionally for one company, joined with company,
    /// requirement and file details.
    pub async fn list_evidence(&self, company_id: Option<&str>) -> Result<Vec<EvidenceDetail>> {
        let companies: HashMap<String, String> = self
            .repo
            .list_companies()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let requirements: HashMap<String, RequirementRef> = self
            .repo
            .list_frameworks()
            .await?
            .into_iter()
            .flat_map(|f| {
                let framework_code = f.code;
                f.requirements.into_iter().map(move |r| {
                    (
                        r.id,
                        RequirementRef {
                            framework_code: framework_code.clone(),
                            code: r.code,
                            title: r.title,
                        },
                    )
                })
            })
            .collect();
        let files: HashMap<String, FileRecord> = self
            .repo
            .list_files()
            .await?
            .into_iter()
            .map(|f| (f.id.clone(), f))
            .collect();

        let mut evidence: Vec<Evidence> = self
            .repo
            .list_evidence()
            .await?
            .into_iter()
            .filter(|e| company_id.map_or(true, |id| e.company_id == id))
            .collect();
        evidence.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

        Ok(evidence
            .into_iter()
            .map(|e| EvidenceDetail {
                company_name: companies.get(&e.company_id).cloned(),
                requirement: e.requirement_id.as_ref().and_then(|id| requirements.get(id).cloned()),
                file: e.file_id.as_ref().and_then(|id| files.get(id).cloned()),
                evidence: e,
            })
            .collect())
    }

    /// Finds a requirement by code, within one framework when given.
    /// A code shared by several frameworks must be qualified.
    async fn resolve_requirement(&self, framework_code: Option<&str>, code: &str) -> Result<String> {
        if let Some(framework_code) = framework_code {
            let framework = self.get_framework(framework_code).await?;
            return framework
                .requirement(code)
                .map(|r| r.id.clone())
                .ok_or_else(|| PortalError::not_found("Requirement", format!("{}/{}", framework_code, code)));
        }

        let matches: Vec<(String, String)> = self
            .repo
            .list_frameworks()
            .await?
            .into_iter()
            .filter_map(|f| f.requirement(code).map(|r| (f.code.clone(), r.id.clone())))
            .collect();
        match matches.as_slice() {
            [] => Err(PortalError::not_found("Requirement", code)),
            [(_, id)] => Ok(id.clone()),
            many => Err(PortalError::validation(format!(
                "Requirement {} exists in several frameworks ({}); pass the framework code",
                code,
                many.iter().map(|(f, _)| f.as_str()).collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

fn check_link(url: &str) -> Result<()> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| PortalError::validation(format!("'{}' is not a valid URL: {}", url, e)))
}

fn require_text(field: &str, value: &str, row: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PortalError::validation(format!(
            "Import row {} is missing a {}",
            row + 1,
            field
        )));
    }
    Ok(())
}

fn validate_company(input: &NewCompany) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(PortalError::validation("Name is required"));
    }
    Ok(())
}
