// Bounded, lazily fetched historian pages
use crate::application::telemetry_repository::{FetchedHistory, TelemetryError};
use crate::domain::telemetry::Sample;
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};

/// Page cap used when the configuration does not set one.
pub const DEFAULT_MAX_PAGES: usize = 50;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage {
    pub rows: Vec<Sample>,
    pub skipped_rows: usize,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<HistoryPage, TelemetryError>;
}

/// Pages of `query`, following continuation tokens. Yields at most
/// `max_pages` pages and ends after the first error.
pub fn pages<'a, S>(
    source: &'a S,
    query: &'a str,
    max_pages: usize,
) -> impl Stream<Item = Result<HistoryPage, TelemetryError>> + Send + 'a
where
    S: PageSource + ?Sized,
{
    async_stream::try_stream! {
        let mut token: Option<String> = None;
        for _ in 0..max_pages {
            let page = source.fetch_page(query, token.as_deref()).await?;
            token = page.next_page_token.clone();
            let last = token.is_none();
            yield page;
            if last {
                break;
            }
        }
    }
}

/// Drain every page of `query` into one history. Any failed page fails the
/// whole fetch.
pub async fn fetch_all<S>(
    source: &S,
    query: &str,
    max_pages: usize,
) -> Result<FetchedHistory, TelemetryError>
where
    S: PageSource + ?Sized,
{
    let stream = pages(source, query, max_pages);
    futures::pin_mut!(stream);

    let mut history = FetchedHistory::default();
    let mut more_available = false;

    while let Some(page) = stream.next().await {
        let page = page?;
        history.pages += 1;
        history.skipped_rows += page.skipped_rows;
        more_available = page.next_page_token.is_some();

        tracing::debug!(
            "Page {}: {} rows, more pages: {}",
            history.pages,
            page.rows.len(),
            more_available
        );
        history.samples.extend(page.rows);
    }

    if more_available {
        history.truncated = true;
        tracing::warn!(
            "Stopped pagination after {} pages with a continuation token outstanding",
            history.pages
        );
    }

    tracing::debug!(
        "Fetched {} pages, {} rows ({} skipped)",
        history.pages,
        history.samples.len(),
        history.skipped_rows
    );

    Ok(history)
}
