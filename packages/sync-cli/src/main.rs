use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use politemall::{Config, CredentialResolver, Credentials, MemoryStore, Store};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "politeshop-sync")]
#[command(about = "Crawl a POLITEMall account and print what was found")]
struct Cli {
    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Values are normally copied out of a logged-in browser session.
#[derive(Args)]
struct CredentialArgs {
    /// POLITEMall subdomain, e.g. nplms
    #[arg(long, env = "POLITE_DOMAIN")]
    domain: String,

    #[arg(long, env = "D2L_SESSION_VAL", hide_env_values = true)]
    session_val: String,

    #[arg(long, env = "D2L_SECURE_SESSION_VAL", hide_env_values = true)]
    secure_session_val: String,

    #[arg(long, env = "BRIGHTSPACE_TOKEN", hide_env_values = true)]
    brightspace_token: String,

    /// Session token printed by a previous run
    #[arg(long, env = "POLITESHOP_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// Required when no session token is given
    #[arg(long, env = "CSRF_TOKEN", hide_env_values = true)]
    csrf_token: Option<String>,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Credentials {
            subdomain: args.domain,
            session_val: args.session_val,
            secure_session_val: args.secure_session_val,
            brightspace_token: args.brightspace_token,
            session_token: args.session_token,
            csrf_token: args.csrf_token,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl semesters, user, school and modules
    Sync,
    /// Print the unit tree of one module
    Units {
        /// Module (organization) ID
        module_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    let _ = dotenvy::dotenv();

    // Logs go to stderr, stdout is reserved for JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,politemall=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let resolver = CredentialResolver::new(&config);

    let credentials = Credentials::from(cli.credentials);
    let resolved = resolver
        .resolve(&credentials)
        .await
        .context("Failed to resolve credentials")?;

    if let Some(issued) = &resolved.issued_token {
        eprintln!(
            "New session token (valid until {}), reuse it with:\nPOLITESHOP_TOKEN={}",
            issued.expires_at.to_rfc3339(),
            issued.token
        );
    }

    let session = &resolved.session;
    tracing::info!(user_id = %session.user_id(), tenant_id = session.tenant_id(), "Session resolved");
    let output = match cli.command {
        Commands::Sync => {
            let store = MemoryStore::new();
            let report = politemall::sync_user(session.crawler(), &store)
                .await
                .context("Sync failed")?;
            let modules = store.get_user_modules(session.user_id().as_str()).await?;
            json!({ "report": report, "modules": modules })
        }
        Commands::Units { module_id } => {
            let units = politemall::module_units(session.crawler(), &module_id)
                .await
                .with_context(|| format!("Failed to fetch units of module {}", module_id))?;
            serde_json::to_value(units)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
