//! B-roll planner binary.

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use broll_worker::{BrollPipeline, PlannerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("broll=info".parse().unwrap());

    // Logs go to stderr so stdout carries only the suggestions JSON
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting broll-planner");

    let config = PlannerConfig::from_env();
    info!("Planner config: {:?}", config);

    let suggestions_path = config.suggestions_path.clone();

    let pipeline = match BrollPipeline::from_config(config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create planner pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let outcome = pipeline.run().await;

    let rendered = match serde_json::to_string_pretty(&outcome.suggestions) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize suggestions: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", rendered);

    if let Some(path) = suggestions_path {
        match tokio::fs::write(&path, &rendered).await {
            Ok(()) => info!(path = %path.display(), "Wrote suggestions"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write suggestions"),
        }
    }

    info!(
        run_id = %outcome.run_id,
        items = outcome.items.len(),
        new_items = outcome.new_count,
        persisted = outcome.persisted,
        "Planner run complete"
    );
}
