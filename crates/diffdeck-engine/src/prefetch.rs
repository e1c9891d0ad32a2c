//! Bounded, all-settled prefetch of current file content.

use crate::traits::{ContentError, FileContentProvider};
use futures::stream::{self, StreamExt};

/// Result of fetching one file.
#[derive(Debug)]
pub struct PrefetchOutcome {
    pub path: String,
    pub result: Result<String, ContentError>,
}

/// Fetch every path with at most `concurrency` requests in flight.
///
/// One outcome per path, in completion order. A failed fetch never cancels
/// the others.
pub async fn prefetch_contents<P>(
    provider: &P,
    paths: Vec<String>,
    concurrency: usize,
) -> Vec<PrefetchOutcome>
where
    P: FileContentProvider + ?Sized,
{
    let total = paths.len();
    let outcomes: Vec<PrefetchOutcome> = stream::iter(paths)
        .map(|path| async move {
            let result = provider.get_file_content(&path).await;
            PrefetchOutcome { path, result }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        log::warn!("Prefetch: {} of {} file fetches failed", failed, total);
    } else {
        log::debug!("Prefetch: fetched {} files", total);
    }
    outcomes
}
