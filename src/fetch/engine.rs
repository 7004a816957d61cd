//! Bounded-concurrency fetch engine for catalog detail pages.
//!
//! The engine turns a list of URLs into a keyed set of page bodies. Each URL
//! runs in its own Tokio task; a semaphore caps how many are in flight at
//! once. A failed fetch is recorded against its URL and never cancels the
//! tasks still running.
//!
//! # Example
//!
//! ```no_run
//! use catalog_core::config::Settings;
//! use catalog_core::fetch::{FetchEngine, PageClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let client = PageClient::new(&settings)?;
//! let engine = FetchEngine::new(settings.concurrency);
//! let urls = vec!["https://example.com/projects/101".to_string()];
//! let report = engine.fetch_all(&client, &urls).await;
//! println!("fetched {} of {}", report.documents.len(), report.outcomes());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{FetchError, PageClient};

/// Returns the cache key for a page URL: its last non-empty path segment.
///
/// ```
/// use catalog_core::fetch::document_key;
///
/// assert_eq!(document_key("https://example.com/projects/1234"), Some("1234".to_string()));
/// assert_eq!(document_key("https://example.com/projects/1234/"), Some("1234".to_string()));
/// assert_eq!(document_key("not a url"), None);
/// ```
#[must_use]
pub fn document_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(ToString::to_string)
}

/// One URL that did not produce a document.
#[derive(Debug)]
pub struct FetchFailure {
    /// The URL as submitted.
    pub url: String,
    /// What went wrong.
    pub error: FetchError,
}

/// Outcome of a [`FetchEngine::fetch_all`] batch.
#[derive(Debug)]
pub struct FetchReport {
    /// Successful fetches keyed by [`document_key`].
    pub documents: HashMap<String, String>,
    /// Per-URL failures.
    pub failures: Vec<FetchFailure>,
    /// Wall-clock time for the whole batch.
    pub elapsed: Duration,
    /// Highest number of requests observed in flight at the same time.
    pub peak_in_flight: usize,
}

impl FetchReport {
    /// Total number of recorded outcomes (successes plus failures).
    #[must_use]
    pub fn outcomes(&self) -> usize {
        self.documents.len() + self.failures.len()
    }
}

/// Tracks current and peak in-flight requests across tasks.
#[derive(Debug, Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Fetch engine for concurrent page retrieval.
///
/// # Concurrency Model
///
/// - Each URL runs in its own Tokio task over a shared [`PageClient`]
/// - A semaphore permit is acquired before a task is spawned and released
///   when the task ends (RAII)
/// - A concurrency of `0` disables the semaphore entirely
/// - Successful bodies go into a shared `DashMap`; keys are distinct per URL
///   so writers never contend on the same entry
#[derive(Debug, Clone)]
pub struct FetchEngine {
    semaphore: Option<Arc<Semaphore>>,
    concurrency: usize,
}

impl FetchEngine {
    /// Creates an engine allowing at most `concurrency` fetches in flight.
    ///
    /// `0` means unlimited.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        let semaphore = (concurrency > 0).then(|| Arc::new(Semaphore::new(concurrency)));
        debug!(concurrency, unlimited = semaphore.is_none(), "creating fetch engine");
        Self {
            semaphore,
            concurrency,
        }
    }

    /// Returns the configured concurrency limit (`0` = unlimited).
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches every URL and waits until each has succeeded or failed.
    ///
    /// Individual failures never fail the batch; they are returned in
    /// [`FetchReport::failures`]. The report always holds exactly one
    /// outcome per submitted URL: when two URLs share a document key, only
    /// the first is fetched and the rest are reported as
    /// [`FetchError::DuplicateKey`].
    #[instrument(skip(self, client, urls), fields(urls = urls.len(), concurrency = self.concurrency))]
    pub async fn fetch_all(&self, client: &PageClient, urls: &[String]) -> FetchReport {
        let started = Instant::now();
        let documents: Arc<DashMap<String, String>> = Arc::new(DashMap::new());
        let in_flight = Arc::new(InFlight::default());
        let mut failures = Vec::new();
        let mut handles: Vec<(String, JoinHandle<Result<(), FetchError>>)> = Vec::new();
        let mut claimed: HashMap<String, &str> = HashMap::with_capacity(urls.len());

        info!("starting to fetch");

        for url in urls {
            let Some(key) = document_key(url) else {
                warn!(url = %url, "skipping URL without a usable path segment");
                failures.push(FetchFailure {
                    url: url.clone(),
                    error: FetchError::invalid_url(url.as_str()),
                });
                continue;
            };

            if let Some(first_url) = claimed.get(&key) {
                warn!(url = %url, key = %key, first_url = %first_url, "duplicate document key; skipping");
                failures.push(FetchFailure {
                    url: url.clone(),
                    error: FetchError::duplicate_key(url.as_str(), key, *first_url),
                });
                continue;
            }
            claimed.insert(key.clone(), url.as_str());

            // Acquire before spawning so at most `concurrency` tasks exist at once
            let permit = match &self.semaphore {
                Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        failures.push(FetchFailure {
                            url: url.clone(),
                            error: FetchError::aborted(url.as_str(), "semaphore closed"),
                        });
                        continue;
                    }
                },
                None => None,
            };

            let client = client.clone();
            let documents = Arc::clone(&documents);
            let in_flight = Arc::clone(&in_flight);
            let task_url = url.clone();

            handles.push((
                url.clone(),
                tokio::spawn(async move {
                    let _permit = permit;
                    in_flight.enter();
                    let result = client.get_text(&task_url).await;
                    in_flight.exit();

                    documents.insert(key.clone(), result?);
                    debug!(key = %key, "stored document");
                    Ok(())
                }),
            ));
        }

        debug!(task_count = handles.len(), "waiting for fetches to complete");

        for (url, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(url = %url, error = %error, "fetch failed");
                    failures.push(FetchFailure { url, error });
                }
                Err(join_error) => {
                    warn!(url = %url, error = %join_error, "fetch task panicked");
                    failures.push(FetchFailure {
                        error: FetchError::aborted(url.as_str(), join_error.to_string()),
                        url,
                    });
                }
            }
        }

        let elapsed = started.elapsed();
        let documents: HashMap<String, String> = match Arc::try_unwrap(documents) {
            Ok(map) => map.into_iter().collect(),
            Err(shared) => shared
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };

        info!(
            fetched = documents.len(),
            failed = failures.len(),
            elapsed_ms = elapsed.as_millis(),
            peak_in_flight = in_flight.peak(),
            "fetch batch complete"
        );

        FetchReport {
            documents,
            failures,
            elapsed,
            peak_in_flight: in_flight.peak(),
        }
    }
}
