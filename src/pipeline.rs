//! End-to-end cache rebuild: index -> fetch -> document cache -> records.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cache::{CacheError, DocumentCache};
use crate::config::Settings;
use crate::fetch::{FetchEngine, FetchError, FetchFailure, PageClient};
use crate::index::{IndexError, index_base, load_index_page, parse_index};
use crate::record::{ExtractError, FieldExtractor, RecordStore, StoreError, load_selected_ids};

/// Errors that abort a rebuild before anything is replaced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The index page could not be obtained.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// The page client could not be built.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The index page listed no projects; the existing cache is kept.
    #[error(
        "no project links found in index page {}; keeping the existing cache (delete it to re-render)",
        .index.display()
    )]
    NoProjectsDiscovered {
        /// Index page that was parsed.
        index: PathBuf,
    },

    /// Every detail-page fetch failed; the existing cache is kept.
    #[error("none of the {attempted} project pages could be fetched; keeping the existing cache")]
    NothingFetched {
        /// Number of URLs attempted.
        attempted: usize,
    },

    /// The document cache could not be rebuilt or read.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The record store could not be written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of a full rebuild.
#[derive(Debug)]
pub struct RebuildReport {
    /// Project URLs found in the index (after any limit).
    pub discovered: usize,
    /// Detail pages written to the cache.
    pub cached: usize,
    /// URLs that could not be fetched.
    pub fetch_failures: Vec<FetchFailure>,
    /// Time spent in the fetch batch.
    pub fetch_elapsed: Duration,
    /// Outcome of record extraction.
    pub records: RecordsReport,
}

/// Summary of the extraction pass.
#[derive(Debug)]
pub struct RecordsReport {
    /// Records written to the store.
    pub saved: usize,
    /// Cached documents that were skipped.
    pub skipped: Vec<ExtractError>,
    /// Time spent extracting and saving.
    pub elapsed: Duration,
}

/// Rebuilds the document cache and record store from the live index.
///
/// `limit` keeps only the first `limit` discovered URLs. An index with no
/// project links is an error unless `limit` is `Some(0)`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the index, cache or store step fails as a
/// whole. Individual page failures are reported in the returned summary.
#[instrument(skip(settings))]
pub async fn rebuild_cache(
    settings: &Settings,
    limit: Option<usize>,
) -> Result<RebuildReport, PipelineError> {
    let client = PageClient::new(settings)?;
    let base = index_base(settings)?;
    let index_html = load_index_page(settings, &client).await?;

    let mut urls = parse_index(&index_html, &base);
    if urls.is_empty() && limit != Some(0) {
        return Err(PipelineError::NoProjectsDiscovered {
            index: settings.index_cache_path.clone(),
        });
    }
    if let Some(limit) = limit {
        urls.truncate(limit);
        info!(limit, urls = urls.len(), "limiting fetch to first urls");
    }

    let engine = FetchEngine::new(settings.concurrency);
    let fetched = engine.fetch_all(&client, &urls).await;
    info!(
        elapsed_secs = fetched.elapsed.as_secs_f64(),
        fetched = fetched.documents.len(),
        failed = fetched.failures.len(),
        "fetch phase complete"
    );

    if fetched.documents.is_empty() && !urls.is_empty() {
        return Err(PipelineError::NothingFetched {
            attempted: urls.len(),
        });
    }

    let cache = DocumentCache::open(&settings.cache_dir);
    let cached = cache.rebuild(&fetched.documents)?;
    let records = rebuild_records(settings)?;

    Ok(RebuildReport {
        discovered: urls.len(),
        cached,
        fetch_failures: fetched.failures,
        fetch_elapsed: fetched.elapsed,
        records,
    })
}

/// Re-extracts every cached document and replaces the record store.
///
/// # Errors
///
/// Returns [`PipelineError::Cache`] if the cache is missing or unreadable and
/// [`PipelineError::Store`] if the selected list or store write fails.
#[instrument(skip(settings))]
pub fn rebuild_records(settings: &Settings) -> Result<RecordsReport, PipelineError> {
    let started = Instant::now();
    let selected = load_selected_ids(&settings.selected_path)?;
    let documents = DocumentCache::open(&settings.cache_dir).list_all()?;

    let extraction = FieldExtractor::new(selected).extract_all(&documents);
    for skipped in &extraction.skipped {
        warn!(key = skipped.key(), "skipped cached document");
    }

    RecordStore::new(&settings.store_path).save(&extraction.records)?;

    let report = RecordsReport {
        saved: extraction.records.len(),
        skipped: extraction.skipped,
        elapsed: started.elapsed(),
    };
    info!(
        saved = report.saved,
        skipped = report.skipped.len(),
        "record store rebuilt"
    );
    Ok(report)
}
