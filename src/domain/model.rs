use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// `null` and missing both mean "no items".
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default)]
    pub revenue_band: Option<String>,
    #[serde(default)]
    pub export: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub export_regions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload for a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
    #[serde(default)]
    pub revenue_band: Option<String>,
    #[serde(default)]
    pub export: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub export_regions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

impl NewCompany {
    pub fn into_company(self, id: String, created_at: DateTime<Utc>) -> Company {
        Company {
            id,
            name: self.name.trim().to_string(),
            industry: self.industry,
            employees: self.employees,
            revenue_band: self.revenue_band,
            export: self.export,
            export_regions: self.export_regions,
            tags: self.tags,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
    #[serde(default)]
    pub deadlines: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<Reference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scheme {
    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}

/// One row of a catalog import, keyed by `code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeRecord {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub eligibility: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
    #[serde(default)]
    pub deadlines: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<Reference>,
}

impl SchemeRecord {
    pub fn into_scheme(self, now: DateTime<Utc>) -> Scheme {
        Scheme {
            id: Uuid::new_v4().to_string(),
            code: self.code,
            title: self.title,
            category: self.category,
            issuing_authority: self.issuing_authority,
            mandatory: self.mandatory,
            description: self.description,
            eligibility: self.eligibility,
            process: self.process,
            benefits: self.benefits,
            deadlines: self.deadlines,
            features: self.features,
            tags: self.tags,
            references: self.references,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every catalog field of `scheme`; identity and `created_at` are kept.
    pub fn apply_to(self, scheme: &mut Scheme, now: DateTime<Utc>) {
        scheme.title = self.title;
        scheme.category = self.category;
        scheme.issuing_authority = self.issuing_authority;
        scheme.mandatory = self.mandatory;
        scheme.description = self.description;
        scheme.eligibility = self.eligibility;
        scheme.process = self.process;
        scheme.benefits = self.benefits;
        scheme.deadlines = self.deadlines;
        scheme.features = self.features;
        scheme.tags = self.tags;
        scheme.references = self.references;
        scheme.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub scheme: Scheme,
    pub reason: String,
    pub mandatory: bool,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Requires,
    AlignsWith,
    ConflictsWith,
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationType::Requires => "REQUIRES",
            RelationType::AlignsWith => "ALIGNS_WITH",
            RelationType::ConflictsWith => "CONFLICTS_WITH",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default)]
    pub note: Option<String>,
}

/// Relation declared by scheme code, resolved to ids at seed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationSeed {
    pub from_code: String,
    pub to_code: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default)]
    pub note: Option<String>,
}

/// A requirement inside a framework; evidence attaches to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Framework {
    pub id: String,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: Vec<Requirement>,
    pub created_at: DateTime<Utc>,
}

impl Framework {
    pub fn requirement(&self, code: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.code == code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementRecord {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Framework import payload, upserted by `code`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkRecord {
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: Vec<RequirementRecord>,
}

impl FrameworkRecord {
    pub fn into_framework(self, now: DateTime<Utc>) -> Framework {
        Framework {
            id: Uuid::new_v4().to_string(),
            code: self.code,
            title: self.title,
            description: self.description,
            requirements: self
                .requirements
                .into_iter()
                .map(|r| r.into_requirement(None))
                .collect(),
            created_at: now,
        }
    }

    /// Replaces the framework's content. Requirements whose code already
    /// existed keep their id, so attached evidence stays linked.
    pub fn apply_to(self, framework: &mut Framework) {
        let requirements = self
            .requirements
            .into_iter()
            .map(|r| {
                let id = framework.requirement(&r.code).map(|old| old.id.clone());
                r.into_requirement(id)
            })
            .collect();
        framework.title = self.title;
        framework.description = self.description;
        framework.requirements = requirements;
    }
}

impl RequirementRecord {
    fn into_requirement(self, id: Option<String>) -> Requirement {
        Requirement {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            code: self.code,
            title: self.title,
            description: self.description,
        }
    }
}

/// Metadata for an uploaded document. The bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Proof that a company meets a requirement: an uploaded file, a URL, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    pub company_id: String,
    pub title: String,
    #[serde(default)]
    pub requirement_id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Evidence payload; the requirement is named by code and resolved by the portal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvidence {
    pub company_id: String,
    pub title: String,
    #[serde(default)]
    pub framework_code: Option<String>,
    #[serde(default)]
    pub requirement_code: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementRef {
    pub framework_code: String,
    pub code: String,
    pub title: String,
}

/// Evidence joined with the names a reader needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDetail {
    pub evidence: Evidence,
    pub company_name: Option<String>,
    pub requirement: Option<RequirementRef>,
    pub file: Option<FileRecord>,
}
