use crate::adapters::explain::{ExplainClient, NewsItem};
use crate::adapters::seed::CatalogFile;
use crate::app::report::{self, OutputFormat};
use crate::config::cli::{CliConfig, Command, CompanyCommand, EvidenceCommand, FileCommand, FrameworkCommand, SchemeCommand};
use crate::config::PortalConfig;
use crate::core::catalog::{all_categories, all_tags, SchemeFilter};
use crate::core::portal::Portal;
use crate::domain::ports::PortalRepository;
use crate::utils::error::Result;
use crate::utils::validation::validate_file_extension;

/// Runs one CLI command and returns the text to print.
pub async fn execute<R: PortalRepository>(
    portal: &Portal<R>,
    config: &PortalConfig,
    cli: CliConfig,
) -> Result<String> {
    match cli.command {
        Command::Company { action } => company(portal, action).await,
        Command::Scheme { action } => scheme(portal, action).await,
        Command::Framework { action } => match action {
            FrameworkCommand::List { format } => report::render_frameworks(&portal.list_frameworks().await?, format),
            FrameworkCommand::Show { code } => Ok(report::render_framework_detail(&portal.get_framework(&code).await?)),
        },
        Command::File { action } => match action {
            FileCommand::Add(args) => {
                let file = portal.register_file(args.into()).await?;
                Ok(format!("📎 Registered {} ({})\n", file.filename, file.id))
            }
            FileCommand::List { format } => report::render_files(&portal.list_files().await?, format),
        },
        Command::Evidence { action } => match action {
            EvidenceCommand::Add(args) => {
                let evidence = portal.add_evidence(args.into()).await?;
                Ok(format!("✅ Recorded evidence '{}' ({})\n", evidence.title, evidence.id))
            }
            EvidenceCommand::List { company, format } => {
                report::render_evidence(&portal.list_evidence(company.as_deref()).await?, format)
            }
        },
        Command::Import { file } => {
            validate_file_extension("import", &file, &["json"])?;
            tracing::info!("📁 Importing catalog from {}", file);
            let catalog = CatalogFile::from_file(&file).await?;
            load_catalog(portal, catalog).await
        }
        Command::Seed => {
            tracing::info!("🌱 Seeding built-in catalog");
            load_catalog(portal, CatalogFile::builtin()?).await
        }
        Command::Suggest { company_id, format } => {
            let company = portal.get_company(&company_id).await?;
            let suggestions = portal.suggest_for(&company_id).await?;
            report::render_suggestions(&company, &suggestions, format)
        }
        Command::Mindmap => Ok(serde_json::to_string_pretty(&portal.mindmap().await?)?),
        Command::Explain {
            title,
            summary,
            source,
            published_at,
        } => {
            let client = ExplainClient::from_config(&config.explain)?;
            let item = NewsItem {
                title,
                summary,
                source,
                published_at,
            };
            client.explain(&item).await
        }
    }
}

async fn company<R: PortalRepository>(portal: &Portal<R>, action: CompanyCommand) -> Result<String> {
    match action {
        CompanyCommand::Add(args) => {
            let company = portal.create_company(args.into()).await?;
            Ok(format!("✅ Created company {} ({})\n", company.name, company.id))
        }
        CompanyCommand::Update { id, fields } => {
            let company = portal.update_company(&id, fields.into()).await?;
            Ok(format!("✅ Updated company {} ({})\n", company.name, company.id))
        }
        CompanyCommand::List { format } => {
            report::render_companies(&portal.list_companies().await?, format)
        }
        CompanyCommand::Show { id } => {
            let company = portal.get_company(&id).await?;
            report::render_companies(std::slice::from_ref(&company), OutputFormat::Json)
        }
    }
}

async fn scheme<R: PortalRepository>(portal: &Portal<R>, action: SchemeCommand) -> Result<String> {
    match action {
        SchemeCommand::List {
            query,
            category,
            tag,
            mandatory,
            format,
        } => {
            let schemes = portal.list_schemes().await?;
            let filter = SchemeFilter {
                query,
                categories: category,
                tags: tag,
                mandatory,
            };
            let hits = filter.apply(&schemes);
            tracing::debug!("{} of {} schemes match", hits.len(), schemes.len());
            report::render_schemes(&hits, format)
        }
        SchemeCommand::Show { code } => Ok(report::render_scheme_detail(&portal.get_scheme(&code).await?)),
        SchemeCommand::Facets => {
            let schemes = portal.list_schemes().await?;
            Ok(format!(
                "Categories:\n  {}\nTags:\n  {}\n",
                all_categories(&schemes).join("\n  "),
                all_tags(&schemes)
                    .iter()
                    .map(|t| format!("#{}", t))
                    .collect::<Vec<_>>()
                    .join(" ")
            ))
        }
    }
}

async fn load_catalog<R: PortalRepository>(portal: &Portal<R>, catalog: CatalogFile) -> Result<String> {
    let schemes = portal.import_schemes(catalog.schemes).await?;
    let relations = portal.seed_relations(catalog.relations).await?;
    let mut out = format!(
        "✅ Schemes: {} created, {} updated, {} total\n🔗 Relations: {} created, {} already present, {} skipped\n",
        schemes.created,
        schemes.updated,
        schemes.total,
        relations.created,
        relations.existing,
        relations.skipped
    );
    if !catalog.frameworks.is_empty() {
        let frameworks = portal.import_frameworks(catalog.frameworks).await?;
        out.push_str(&format!(
            "🧭 Frameworks: {} created, {} updated, {} total\n",
            frameworks.created, frameworks.updated, frameworks.total
        ));
    }
    Ok(out)
}
