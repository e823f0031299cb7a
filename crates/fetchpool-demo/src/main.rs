#![doc = include_str!("../README.md")]

mod config;
mod model;
mod telemetry;

use clap::Parser;
use config::{CliArgs, DemoConfig};
use fetchpool::Pool;
use futures::stream::{FuturesUnordered, StreamExt};
use model::ApiResponse;
use std::{collections::BTreeMap, sync::Arc};
use telemetry::init_telemetry;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

type PageResults = BTreeMap<usize, fetchpool::Result<(u16, ApiResponse)>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DemoConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let pool = Arc::new(Pool::new(config.pool).await?);

    let pages = tokio::select! {
        pages = fetch_pages(&pool, &config) => Some(pages),
        () = shutdown_signal() => None,
    };

    // Anything still queued is failed with `Shutdown`; calls already on the
    // wire finish within the request timeout.
    pool.shutdown().await;

    if let Some(pages) = pages {
        report(&pages);
    }

    providers.shutdown();
    Ok(())
}

/// Submits one GET per page, all at once, and collects the outcomes by page.
///
/// With more pages than workers the extra submissions queue up and wait,
/// so this also exercises the pool's backpressure.
async fn fetch_pages(pool: &Arc<Pool>, config: &DemoConfig) -> PageResults {
    let mut tasks = (1..=config.pages)
        .map(|page| {
            let pool = Arc::clone(pool);
            let url = config.page_url(page);
            async move {
                let mut response = ApiResponse::default();
                let outcome = pool
                    .get(&url, &mut response)
                    .await
                    .map(|fetched| fetched.status_code);
                (page, outcome.map(|status_code| (status_code, response)))
            }
        })
        .collect::<FuturesUnordered<_>>();

    let mut pages = BTreeMap::new();
    while let Some((page, outcome)) = tasks.next().await {
        #[cfg(feature = "tracing")]
        {
            match &outcome {
                Ok((status_code, _)) => {
                    tracing::info!("Page {page} fetched (status {status_code})");
                }
                Err(e) => tracing::warn!("Page {page} failed: {e}"),
            }
        }
        pages.insert(page, outcome);
    }
    pages
}

fn report(pages: &PageResults) {
    for (page, outcome) in pages {
        match outcome {
            Ok((status_code, response)) => {
                println!("page {page} (status {status_code})");
                for character in &response.results {
                    println!(
                        "character name: {}. character image: {} character gender: {} character origin city: {}",
                        character.name, character.image, character.gender, character.origin.name
                    );
                }
                println!(
                    "{} characters in total, next page: {}",
                    response.info.count,
                    response.info.next.as_deref().unwrap_or("none")
                );
            }
            Err(e) => eprintln!("page {page} failed: {e}"),
        }
    }
}

fn log_startup_info(_config: &DemoConfig) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting demo with full config: {:#?}", _config);
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Fetching {} pages of {} with {} workers",
            _config.pages,
            _config.base_url,
            _config.pool.num_workers
        );
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never
/// resolves, so the fetch runs to completion instead.
async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }
}
