use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sales_report::config::{parse_utc_offset, DEFAULT_LOGO_PATH, DEFAULT_UTC_OFFSET};
use sales_report::fonts;
use sales_report::http::{router, AppState, REPORT_ROUTE};
use sales_report::store::firestore::DEFAULT_COLLECTION;
use sales_report::store::{FirestoreSalesSource, SalesSource, ServiceAccountKey};
use sales_report::ReportSettings;

/// Serves the TechNorth sales report as a PDF download.
///
/// Every option can also be set through the environment variable shown in `--help`,
/// including from a `.env` file in the working directory.
#[derive(Debug, Parser)]
#[command(author, version, about = "TechNorth sales report service")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Service-account key used to read Firestore.
    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        default_value = "serviceAccountKey.json"
    )]
    credentials: PathBuf,

    /// Firestore collection holding the sales.
    #[arg(long, env = "SALES_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// Logo printed in the report header.
    #[arg(long, env = "REPORT_LOGO_PATH", default_value = DEFAULT_LOGO_PATH)]
    logo: PathBuf,

    /// Directory searched first for the report font family.
    #[arg(long, env = "REPORT_FONTS_DIR")]
    fonts_dir: Option<PathBuf>,

    /// UTC offset used to print dates, e.g. -06:00.
    #[arg(long, env = "REPORT_UTC_OFFSET", default_value = DEFAULT_UTC_OFFSET)]
    utc_offset: String,

    /// Firestore emulator address (host:port). Skips Google authentication.
    #[arg(long, env = "FIRESTORE_EMULATOR_HOST")]
    emulator_host: Option<String>,

    /// Project used with the emulator when no credential file is readable.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT", default_value = "demo-technorth")]
    project_id: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let source = connect_store(&cli)?;

    fonts::report_font_family(cli.fonts_dir.as_deref())?;
    if let Ok(location) = fonts::locate_font_family(cli.fonts_dir.as_deref()) {
        tracing::info!(
            "using font family {} from {}",
            location.family,
            location.directory.display()
        );
    }

    let settings = ReportSettings::default()
        .with_logo_path(cli.logo)
        .with_font_directory(cli.fonts_dir)
        .with_utc_offset(parse_utc_offset(&cli.utc_offset)?);

    let app = router(AppState::new(source, settings));
    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    tracing::info!(
        "sales report available at http://{}{}",
        listener.local_addr()?,
        REPORT_ROUTE
    );

    axum::serve(listener, app).await?;
    Ok(())
}

fn connect_store(cli: &Cli) -> Result<Arc<dyn SalesSource>, Box<dyn Error>> {
    if let Some(host) = &cli.emulator_host {
        let project_id = ServiceAccountKey::from_file(&cli.credentials)
            .map(|key| key.project_id)
            .unwrap_or_else(|_| cli.project_id.clone());
        tracing::warn!("using Firestore emulator at {host} (project {project_id})");
        return Ok(Arc::new(FirestoreSalesSource::emulator(
            host,
            project_id,
            cli.collection.as_str(),
        )));
    }

    let key = ServiceAccountKey::from_file(&cli.credentials)?;
    tracing::info!(
        "reading collection '{}' of project {} as {}",
        cli.collection,
        key.project_id,
        key.client_email
    );
    Ok(Arc::new(FirestoreSalesSource::new(key, cli.collection.as_str())?))
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
