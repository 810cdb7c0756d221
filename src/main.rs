//! Tunecache warm-up tool
//!
//! Composition root: builds the process-wide caches, prefetches artwork
//! through a worker pool fed by a suspending queue, and prints cache
//! statistics as JSON.
//!
//! Usage: `tunecache [ARTWORK_URL]...`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunecache::cache::ArtworkCache;
use tunecache::models::Artwork;
use tunecache::tasks::{with_retry, with_timeout, RetryPolicy, SuspendingQueue};
use tunecache::{NamedCaches, Timeout};

const WORKERS: usize = 4;
const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let caches = NamedCaches::global();
    let urls: Vec<String> = std::env::args().skip(1).collect();
    info!(count = urls.len(), "prefetching artwork");

    let queue: Arc<SuspendingQueue<Option<String>>> = Arc::new(SuspendingQueue::new());
    let workers: Vec<_> = (0..WORKERS)
        .map(|_| tokio::spawn(prefetch_worker(Arc::clone(&queue), caches.artwork.clone())))
        .collect();

    for url in urls {
        queue.enqueue(Some(url));
    }
    for _ in 0..WORKERS {
        queue.enqueue(None);
    }

    let mut fetched = 0;
    for worker in workers {
        fetched += worker.await.context("prefetch worker panicked")?;
    }
    info!(fetched, "prefetch complete");

    let mut report = serde_json::Map::new();
    for (name, stats) in caches.stats().await {
        report.insert(name.to_string(), serde_json::to_value(stats)?);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Pulls URLs until it receives `None`, returning how many it cached.
async fn prefetch_worker(queue: Arc<SuspendingQueue<Option<String>>>, cache: ArtworkCache) -> usize {
    let policy = RetryPolicy::new(3, Duration::from_millis(200)).with_max_delay(Duration::from_secs(2));
    let mut fetched = 0;

    while let Some(url) = queue.dequeue().await {
        if cache.contains(&url).await {
            continue;
        }
        let source = url.as_str();
        let result = with_retry(policy, || async move {
            with_timeout(FETCH_TIMEOUT, load_artwork(source))
                .await
                .map_err(LoadError::from)
                .and_then(|loaded| loaded)
        })
        .await;
        match result {
            Ok(artwork) => {
                cache.set(url, Arc::new(artwork)).await;
                fetched += 1;
            }
            Err(err) => warn!(%url, error = %err, "artwork prefetch failed"),
        }
    }
    fetched
}

/// Reads artwork from a local path or `file://` URL.
async fn load_artwork(url: &str) -> Result<Artwork, LoadError> {
    let path = url.strip_prefix("file://").unwrap_or(url);
    let bytes = tokio::fs::read(path).await?;
    let content_type = match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(Artwork::new(bytes, content_type, 0, 0))
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Timeout(#[from] Timeout),
}
