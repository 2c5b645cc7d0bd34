use crate::core::catalog::group_by_category;
use crate::domain::model::{Company, EvidenceDetail, FileRecord, Framework, Scheme, Suggestion};
use crate::utils::error::{PortalError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unsupported format '{}': use table, json or csv", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

fn obligation(mandatory: bool) -> &'static str {
    if mandatory {
        "Mandatory"
    } else {
        "Voluntary"
    }
}

#[derive(Serialize)]
struct SuggestionRow<'a> {
    code: &'a str,
    title: &'a str,
    category: &'a str,
    mandatory: bool,
    score: u32,
    reason: &'a str,
}

#[derive(Serialize)]
struct SchemeRow<'a> {
    code: &'a str,
    title: &'a str,
    category: &'a str,
    issuing_authority: &'a str,
    mandatory: bool,
    tags: String,
}

#[derive(Serialize)]
struct CompanyRow<'a> {
    id: &'a str,
    name: &'a str,
    industry: &'a str,
    employees: Option<u32>,
    revenue_band: &'a str,
    export: bool,
    export_regions: String,
    tags: String,
    created_at: String,
}

#[derive(Serialize)]
struct FrameworkRow<'a> {
    framework: &'a str,
    framework_title: &'a str,
    requirement: &'a str,
    requirement_title: &'a str,
}

#[derive(Serialize)]
struct FileRow<'a> {
    id: &'a str,
    filename: &'a str,
    mime_type: &'a str,
    size_bytes: Option<u64>,
    url: &'a str,
    created_at: String,
}

#[derive(Serialize)]
struct EvidenceRow<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    framework: &'a str,
    requirement: &'a str,
    file: &'a str,
    url: &'a str,
    uploaded_at: String,
}

fn to_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PortalError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_suggestions(company: &Company, suggestions: &[Suggestion], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(suggestions)?),
        OutputFormat::Csv => to_csv(suggestions.iter().map(|s| SuggestionRow {
            code: &s.scheme.code,
            title: &s.scheme.title,
            category: s.scheme.category_or_empty(),
            mandatory: s.mandatory,
            score: s.score,
            reason: &s.reason,
        })),
        OutputFormat::Table => {
            let mut out = format!("Suggested schemes for {}\n", company.name);
            if suggestions.is_empty() {
                out.push_str(
                    "No applicable schemes found yet. Try adding tags like goa, producer, \
                     or mark the company as an exporter.\n",
                );
                return Ok(out);
            }
            for s in suggestions {
                out.push_str(&format!(
                    "{:>3}  {:<9}  {:<12}  {}\n       {}\n",
                    s.score,
                    obligation(s.mandatory),
                    s.scheme.code,
                    s.scheme.title,
                    s.reason
                ));
            }
            Ok(out)
        }
    }
}

pub fn render_schemes(schemes: &[&Scheme], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(schemes)?),
        OutputFormat::Csv => to_csv(schemes.iter().map(|s| SchemeRow {
            code: &s.code,
            title: &s.title,
            category: s.category_or_empty(),
            issuing_authority: s.issuing_authority.as_deref().unwrap_or(""),
            mandatory: s.mandatory,
            tags: s.tags.join(";"),
        })),
        OutputFormat::Table => {
            if schemes.is_empty() {
                return Ok("No results match your filters.\n".to_string());
            }
            let mut out = String::new();
            for (category, items) in group_by_category(schemes) {
                out.push_str(&format!("{}\n", category));
                for s in items {
                    out.push_str(&format!("  {:<12}  {:<9}  {}\n", s.code, obligation(s.mandatory), s.title));
                }
            }
            Ok(out)
        }
    }
}

pub fn render_scheme_detail(scheme: &Scheme) -> String {
    let mut out = format!(
        "{}\n{} • {} • {}\n",
        scheme.title,
        scheme.category_or_empty(),
        scheme.issuing_authority.as_deref().unwrap_or("—"),
        obligation(scheme.mandatory)
    );

    let sections = [
        ("Overview", &scheme.description),
        ("Eligibility / Applicability", &scheme.eligibility),
        ("Process / Workflow", &scheme.process),
        ("Benefits / Risks", &scheme.benefits),
        ("Key Dates / Deadlines", &scheme.deadlines),
    ];
    for (heading, body) in sections {
        if let Some(body) = body.as_deref().filter(|b| !b.trim().is_empty()) {
            out.push_str(&format!("\n{}\n{}\n", heading, body));
        }
    }

    if !scheme.features.is_empty() {
        out.push_str("\nKey Features / Obligations\n");
        for feature in &scheme.features {
            out.push_str(&format!("  - {}\n", feature));
        }
    }

    if !scheme.references.is_empty() {
        out.push_str("\nReferences\n");
        for (i, r) in scheme.references.iter().enumerate() {
            let label = r
                .label
                .clone()
                .unwrap_or_else(|| format!("Reference {}", i + 1));
            let mut line = format!("  - {}", label);
            if let Some(url) = &r.url {
                line.push_str(&format!(" <{}>", url));
            }
            if let Some(filename) = &r.filename {
                line.push_str(&format!(" — {}", filename));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    if !scheme.tags.is_empty() {
        let tags: Vec<String> = scheme.tags.iter().map(|t| format!("#{}", t)).collect();
        out.push_str(&format!("\n{}\n", tags.join(" ")));
    }
    out
}

pub fn render_companies(companies: &[Company], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(companies)?),
        OutputFormat::Csv => to_csv(companies.iter().map(|c| CompanyRow {
            id: &c.id,
            name: &c.name,
            industry: c.industry.as_deref().unwrap_or(""),
            employees: c.employees,
            revenue_band: c.revenue_band.as_deref().unwrap_or(""),
            export: c.export,
            export_regions: c.export_regions.join(";"),
            tags: c.tags.join(";"),
            created_at: c.created_at.to_rfc3339(),
        })),
        OutputFormat::Table => {
            if companies.is_empty() {
                return Ok("No companies yet. Use `company add` to get started.\n".to_string());
            }
            let mut out = String::new();
            for c in companies {
                let tags: Vec<String> = c.tags.iter().take(4).map(|t| format!("#{}", t)).collect();
                out.push_str(&format!(
                    "{}  {}\n    {} · {}  {}\n",
                    c.id,
                    c.name,
                    c.industry.as_deref().unwrap_or("Industry: —"),
                    if c.export { "Exporter" } else { "Domestic" },
                    tags.join(" ")
                ));
            }
            Ok(out)
        }
    }
}

pub fn render_frameworks(frameworks: &[Framework], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(frameworks)?),
        OutputFormat::Csv => to_csv(frameworks.iter().flat_map(|f| {
            f.requirements.iter().map(move |r| FrameworkRow {
                framework: &f.code,
                framework_title: &f.title,
                requirement: &r.code,
                requirement_title: &r.title,
            })
        })),
        OutputFormat::Table => {
            if frameworks.is_empty() {
                return Ok("No frameworks yet. Add a `frameworks` section to an import file.\n".to_string());
            }
            Ok(frameworks.iter().map(render_framework_detail).collect::<Vec<_>>().join("\n"))
        }
    }
}

pub fn render_framework_detail(framework: &Framework) -> String {
    let mut out = format!("{} ({})\n", framework.title, framework.code);
    if let Some(description) = framework.description.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push_str(&format!("{}\n", description));
    }
    for r in &framework.requirements {
        out.push_str(&format!("  - {}: {}\n", r.code, r.title));
    }
    out
}

pub fn render_files(files: &[FileRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(files)?),
        OutputFormat::Csv => to_csv(files.iter().map(|f| FileRow {
            id: &f.id,
            filename: &f.filename,
            mime_type: f.mime_type.as_deref().unwrap_or(""),
            size_bytes: f.size_bytes,
            url: f.url.as_deref().unwrap_or(""),
            created_at: f.created_at.to_rfc3339(),
        })),
        OutputFormat::Table => {
            if files.is_empty() {
                return Ok("No files registered.\n".to_string());
            }
            let mut out = String::new();
            for f in files {
                out.push_str(&format!(
                    "{}  {} ({})\n",
                    f.id,
                    f.filename,
                    f.mime_type.as_deref().unwrap_or("unknown type")
                ));
            }
            Ok(out)
        }
    }
}

pub fn render_evidence(items: &[EvidenceDetail], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => to_csv(items.iter().map(|d| EvidenceRow {
            id: &d.evidence.id,
            title: &d.evidence.title,
            company: d.company_name.as_deref().unwrap_or(&d.evidence.company_id),
            framework: d.requirement.as_ref().map_or("", |r| r.framework_code.as_str()),
            requirement: d.requirement.as_ref().map_or("", |r| r.code.as_str()),
            file: d.file.as_ref().map_or("", |f| f.filename.as_str()),
            url: d.evidence.url.as_deref().unwrap_or(""),
            uploaded_at: d.evidence.uploaded_at.to_rfc3339(),
        })),
        OutputFormat::Table => {
            if items.is_empty() {
                return Ok("No evidence recorded yet.\n".to_string());
            }
            let mut out = String::new();
            for d in items {
                out.push_str(&format!("{}\n", d.evidence.title));
                let company = d.company_name.as_deref().unwrap_or(&d.evidence.company_id);
                match &d.requirement {
                    Some(r) => out.push_str(&format!("    {} • {} {}: {}\n", company, r.framework_code, r.code, r.title)),
                    None => out.push_str(&format!("    {}\n", company)),
                }
                if let Some(f) = &d.file {
                    out.push_str(&format!(
                        "    File: {} ({})\n",
                        f.filename,
                        f.mime_type.as_deref().unwrap_or("unknown type")
                    ));
                }
                if let Some(url) = &d.evidence.url {
                    out.push_str(&format!("    URL: {}\n", url));
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{NewCompany, Reference, SchemeRecord};
    use chrono::Utc;

    fn suggestion() -> Suggestion {
        let scheme = SchemeRecord {
            code: "EU-CBAM".to_string(),
            title: "EU CBAM, Carbon Border Adjustment".to_string(),
            category: Some("Trade & Carbon (EU)".to_string()),
            mandatory: true,
            ..Default::default()
        }
        .into_scheme(Utc::now());
        Suggestion {
            scheme,
            reason: "Exports → EU applicability".to_string(),
            mandatory: true,
            score: 75,
        }
    }

    fn company() -> Company {
        NewCompany {
            name: "Vasco Foundry".to_string(),
            ..Default::default()
        }
        .into_company("c1".to_string(), Utc::now())
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let out = render_suggestions(&company(), &[suggestion()], OutputFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("code,title,category,mandatory,score,reason"));
        assert_eq!(
            lines.next(),
            Some("EU-CBAM,\"EU CBAM, Carbon Border Adjustment\",Trade & Carbon (EU),true,75,Exports → EU applicability")
        );
    }

    #[test]
    fn test_table_mentions_empty_result() {
        let out = render_suggestions(&company(), &[], OutputFormat::Table).unwrap();
        assert!(out.contains("No applicable schemes found yet"));
    }

    #[test]
    fn test_json_embeds_scheme() {
        let out = render_suggestions(&company(), &[suggestion()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["scheme"]["code"], "EU-CBAM");
        assert_eq!(value[0]["score"], 75);
    }

    #[test]
    fn test_detail_numbers_unlabelled_references() {
        let mut scheme = suggestion().scheme;
        scheme.references = vec![Reference {
            label: None,
            url: Some("https://taxation-customs.ec.europa.eu/carbon-border-adjustment-mechanism_en".to_string()),
            filename: None,
        }];
        let out = render_scheme_detail(&scheme);
        assert!(out.contains("  - Reference 1 <https://"));
        assert!(out.contains("Mandatory"));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_evidence_table_and_csv() {
        use crate::domain::model::{Evidence, RequirementRef};

        let now = Utc::now();
        let detail = EvidenceDetail {
            evidence: Evidence {
                id: "e1".to_string(),
                company_id: "c1".to_string(),
                title: "Consent to Operate".to_string(),
                requirement_id: Some("r1".to_string()),
                file_id: Some("f1".to_string()),
                url: None,
                uploaded_at: now,
            },
            company_name: Some("Vasco Foundry".to_string()),
            requirement: Some(RequirementRef {
                framework_code: "BRSR-CORE".to_string(),
                code: "P6".to_string(),
                title: "Environment".to_string(),
            }),
            file: Some(FileRecord {
                id: "f1".to_string(),
                filename: "cto.pdf".to_string(),
                mime_type: Some("application/pdf".to_string()),
                size_bytes: None,
                url: None,
                created_at: now,
            }),
        };

        let table = render_evidence(std::slice::from_ref(&detail), OutputFormat::Table).unwrap();
        assert!(table.contains("Vasco Foundry • BRSR-CORE P6: Environment"));
        assert!(table.contains("File: cto.pdf (application/pdf)"));

        let csv = render_evidence(&[detail], OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("id,title,company,framework,requirement,file,url,uploaded_at")
        );
        assert!(lines.next().unwrap().starts_with("e1,Consent to Operate,Vasco Foundry,BRSR-CORE,P6,cto.pdf,,"));
    }
}
