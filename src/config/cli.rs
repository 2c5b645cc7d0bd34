use crate::app::report::OutputFormat;
use crate::core::catalog::MandatoryFilter;
use crate::domain::model::{NewCompany, NewEvidence, NewFile};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "esg-portal")]
#[command(about = "ESG compliance portal for MSMEs: companies, scheme catalog and suggestions")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "esg-portal.toml")]
    pub config: String,

    /// Override the store path from the config
    #[arg(long)]
    pub store: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Manage company profiles
    Company {
        #[command(subcommand)]
        action: CompanyCommand,
    },
    /// Browse the scheme catalog
    Scheme {
        #[command(subcommand)]
        action: SchemeCommand,
    },
    /// Browse compliance frameworks and their requirements
    Framework {
        #[command(subcommand)]
        action: FrameworkCommand,
    },
    /// Register and list uploaded document metadata
    File {
        #[command(subcommand)]
        action: FileCommand,
    },
    /// Record and list compliance evidence
    Evidence {
        #[command(subcommand)]
        action: EvidenceCommand,
    },
    /// Upsert schemes, relations and frameworks from a JSON file
    Import { file: String },
    /// Load the built-in scheme catalog and relations
    Seed,
    /// Rank applicable schemes for a company
    Suggest {
        company_id: String,
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Print the mindmap graph as JSON
    Mindmap,
    /// Ask the language model for an MSME brief on a news item
    Explain {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        published_at: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CompanyCommand {
    Add(CompanyArgs),
    Update {
        id: String,
        #[command(flatten)]
        fields: CompanyArgs,
    },
    List {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    Show { id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SchemeCommand {
    List {
        /// Free-text search over title, code, description, category, authority and tags
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        category: Vec<String>,
        #[arg(long)]
        tag: Vec<String>,
        #[arg(long, default_value = "all")]
        mandatory: MandatoryFilter,
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    Show { code: String },
    /// List distinct categories and tags
    Facets,
}

#[derive(Debug, Clone, Subcommand)]
pub enum FrameworkCommand {
    List {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    Show { code: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum FileCommand {
    Add(FileArgs),
    List {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum EvidenceCommand {
    Add(EvidenceArgs),
    List {
        /// Only evidence for this company id
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    #[arg(long)]
    pub filename: String,
    #[arg(long)]
    pub mime_type: Option<String>,
    #[arg(long)]
    pub size: Option<u64>,
    /// Where the stored document can be fetched
    #[arg(long)]
    pub url: Option<String>,
}

impl From<FileArgs> for NewFile {
    fn from(args: FileArgs) -> Self {
        NewFile {
            filename: args.filename,
            mime_type: args.mime_type,
            size_bytes: args.size,
            url: args.url,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct EvidenceArgs {
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub title: String,
    /// Framework code, needed when the requirement code is not unique
    #[arg(long)]
    pub framework: Option<String>,
    #[arg(long)]
    pub requirement: Option<String>,
    /// Id of a registered file
    #[arg(long)]
    pub file: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
}

impl From<EvidenceArgs> for NewEvidence {
    fn from(args: EvidenceArgs) -> Self {
        NewEvidence {
            company_id: args.company,
            title: args.title,
            framework_code: args.framework,
            requirement_code: args.requirement,
            file_id: args.file,
            url: args.url,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long)]
    pub employees: Option<u32>,
    #[arg(long)]
    pub revenue_band: Option<String>,
    /// The company exports
    #[arg(long)]
    pub export: bool,
    #[arg(long = "export-region", value_delimiter = ',')]
    pub export_regions: Vec<String>,
    #[arg(long = "tag", value_delimiter = ',')]
    pub tags: Vec<String>,
}

impl From<CompanyArgs> for NewCompany {
    fn from(args: CompanyArgs) -> Self {
        NewCompany {
            name: args.name,
            industry: args.industry,
            employees: args.employees,
            revenue_band: args.revenue_band,
            export: args.export,
            export_regions: args.export_regions,
            tags: args.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_company_add() {
        let cli = CliConfig::try_parse_from([
            "esg-portal",
            "company",
            "add",
            "--name",
            "Margao Metals",
            "--export",
            "--tag",
            "goa,manufacturing",
            "--export-region",
            "EU",
        ])
        .unwrap();

        let Command::Company {
            action: CompanyCommand::Add(args),
        } = cli.command
        else {
            panic!("expected company add");
        };
        let company = NewCompany::from(args);
        assert_eq!(company.tags, vec!["goa", "manufacturing"]);
        assert_eq!(company.export_regions, vec!["EU"]);
        assert!(company.export);
    }

    #[test]
    fn test_parse_scheme_list_filters() {
        let cli = CliConfig::try_parse_from([
            "esg-portal",
            "scheme",
            "list",
            "--mandatory",
            "true",
            "--category",
            "Disclosure (Global)",
            "--format",
            "csv",
        ])
        .unwrap();
        match cli.command {
            Command::Scheme {
                action: SchemeCommand::List { mandatory, category, format, .. },
            } => {
                assert_eq!(mandatory, MandatoryFilter::Mandatory);
                assert_eq!(category, vec!["Disclosure (Global)"]);
                assert_eq!(format, OutputFormat::Csv);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_evidence_add() {
        let cli = CliConfig::try_parse_from([
            "esg-portal",
            "evidence",
            "add",
            "--company",
            "c-1",
            "--title",
            "Consent to Operate",
            "--framework",
            "BRSR-CORE",
            "--requirement",
            "P6",
            "--url",
            "https://goaspcb.gov.in/cto/1234",
        ])
        .unwrap();

        let Command::Evidence {
            action: EvidenceCommand::Add(args),
        } = cli.command
        else {
            panic!("expected evidence add");
        };
        let evidence = NewEvidence::from(args);
        assert_eq!(evidence.company_id, "c-1");
        assert_eq!(evidence.framework_code.as_deref(), Some("BRSR-CORE"));
        assert_eq!(evidence.requirement_code.as_deref(), Some("P6"));
        assert!(evidence.file_id.is_none());
    }
}
