//! CNIS — employment-history extraction server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cnis_extract::{JsonFragmentsSource, PlainTextSource, TextSource};
use cnis_history::HistorySession;
use cnis_server::{build_router, AppState};
use cnis_store::SqliteProfileStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn resolve_data_dir() -> PathBuf {
    std::env::var("CNIS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

/// Run the reconstruction over a local file and print the result.
fn extract_file(path: &Path, config: &cnis_core::AppConfig) -> anyhow::Result<()> {
    let document = std::fs::read(path)?;
    let source: &dyn TextSource = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => &JsonFragmentsSource,
        _ => &PlainTextSource,
    };

    let mut session = HistorySession::open(
        path.display().to_string(),
        None,
        config.heuristics.clone(),
    );
    let outcome = session.extract(source, &document)?;
    eprintln!("{}", outcome.message());
    println!("{}", serde_json::to_string_pretty(&session.view())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = resolve_data_dir();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "extract" => {
                if args.len() < 3 {
                    eprintln!("Usage: cnis extract <statement.txt|fragments.json>");
                    std::process::exit(1);
                }
                let config = cnis_core::AppConfig::from_env(&data_dir)?;
                return extract_file(Path::new(&args[2]), &config);
            }
            "--help" | "-h" | "help" => {
                println!("CNIS — employment-history extraction server");
                println!();
                println!("Usage: cnis [command]");
                println!();
                println!("Commands:");
                println!("  (none)                   Start the server");
                println!("  extract <file>           Extract bonds from a text or JSON fragment file");
                println!("  help                     Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'cnis help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());

    let config = cnis_core::AppConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = SqliteProfileStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
    if let Some(path) = store.db_path() {
        info!("Profile store: {}", path.display());
    }

    let state = Arc::new(AppState::new(config, Arc::new(store)));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("CNIS server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
