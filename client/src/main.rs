//! kinbase - command-line access to a record store.
//!
//! ```text
//! kinbase select <app> <query>        print matching records as JSON lines
//! kinbase upload <path>               upload a file and print its key
//! kinbase download <file-key> <path>  save an uploaded file
//! ```
//!
//! Connection settings come from the environment (or a `.env` file); see
//! [`Config::from_env`].

use kinbase_client::{Config, Database, HttpTransport};
use kinbase_engine::{codec, AppId, PendingUpload};
use serde_json::json;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: kinbase select <app> <query> | upload <path> | download <file-key> <path>";

/// Log filter used when `RUST_LOG` is unset. The binary's own target is
/// `kinbase`, the library logs under `kinbase_client`.
const DEFAULT_LOG_FILTER: &str = "kinbase=info,kinbase_client=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!("Connecting to {}", config.base_url);

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let db = Database::new(HttpTransport::new(config)?);

    match args.as_slice() {
        ["select", app, query] => {
            let app: AppId = app.parse()?;
            let rs = db.select(app, query, &[]).await?;
            for record in &rs {
                let fields = codec::encode_fields(record)?;
                let line = json!({
                    "id": record.id(),
                    "revision": record.revision(),
                    "record": fields,
                });
                println!("{}", line);
            }
        }
        ["upload", path] => {
            let file_key = db.upload_file(&PendingUpload::from_path(path, None)).await?;
            println!("{}", file_key);
        }
        ["download", file_key, path] => {
            let bytes = db.transport().download(file_key).await?;
            tokio::fs::write(path, &bytes).await?;
            tracing::info!("Wrote {} bytes to {}", bytes.len(), path);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
