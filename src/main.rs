use clap::Parser;
use esg_portal::app::commands;
use esg_portal::utils::error::{ErrorSeverity, PortalError};
use esg_portal::utils::{logger, validation::Validate};
use esg_portal::{CliConfig, JsonFileStore, Portal, PortalConfig};

fn exit_code(e: &PortalError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &PortalError) -> ! {
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match PortalConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            report_failure(&e);
        }
    };

    let level = config.logging.level.as_deref();
    if config.logging.json {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }

    tracing::info!("Starting esg-portal CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store_path = cli.store.clone().unwrap_or_else(|| config.store.path.clone());
    let store = match JsonFileStore::open(&store_path).await {
        Ok(store) => store,
        Err(e) => report_failure(&e),
    };
    tracing::debug!("📁 Using store {}", store.path().display());
    let portal = Portal::from_config(store, &config);
    tracing::debug!("Scoring weights: {:?}", portal.weights());

    match commands::execute(&portal, &config, cli).await {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            if exit_code(&e) == 0 {
                // not-found style outcomes are reported but not treated as failures
                tracing::warn!("⚠️ {}", e);
                eprintln!("⚠️ {}", e.user_friendly_message());
            } else {
                report_failure(&e);
            }
        }
    }

    Ok(())
}
