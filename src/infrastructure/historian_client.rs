// Historian HTTP client: paginated SQL-style history queries
use crate::application::pagination::{fetch_all, HistoryPage, PageSource};
use crate::application::telemetry_repository::{
    FetchedHistory, TelemetryError, TelemetryRepository,
};
use crate::domain::telemetry::{Sample, TimeRange};
use crate::infrastructure::config::{prepare_query, HistorianSettings};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Credentials {
    base_url: String,
    username: String,
    password: String,
}

#[derive(Debug, Clone)]
pub struct HistorianClient {
    client: reqwest::Client,
    credentials: Option<Credentials>,
    max_pages: usize,
    query_template: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    results: Option<PageResults>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageResults {
    #[serde(default)]
    values: Option<Vec<serde_json::Value>>,
}

impl HistorianClient {
    pub fn new(settings: &HistorianSettings) -> Self {
        let credentials = match (&settings.base_url, &settings.username, &settings.password) {
            (Some(base_url), Some(username), Some(password)) => Some(Credentials {
                base_url: base_url.trim_end_matches('/').to_string(),
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        Self {
            client: reqwest::Client::new(),
            credentials,
            max_pages: settings.max_pages,
            query_template: settings.query_template.clone(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn build_query(&self, point_name: &str, range: TimeRange) -> String {
        let mut vars = HashMap::new();
        vars.insert("point".to_string(), point_name.to_string());
        vars.insert("start".to_string(), range.start.to_string());
        vars.insert("end".to_string(), range.end.to_string());
        prepare_query(&self.query_template, &vars)
    }
}

fn build_page_url(base_url: &str, query: &str, page_token: Option<&str>) -> String {
    let mut url = format!("{}?query={}", base_url, urlencoding::encode(query));
    if let Some(token) = page_token {
        url.push_str("&PageToken=");
        url.push_str(&urlencoding::encode(token));
    }
    url
}

/// Decode one page body. Rows that are not `[timestamp, number|null]` are
/// skipped and counted.
fn decode_page(body: &str) -> Result<HistoryPage, TelemetryError> {
    let response: PageResponse = serde_json::from_str(body)
        .map_err(|e| TelemetryError::MalformedResponse(e.to_string()))?;

    let mut page = HistoryPage {
        next_page_token: response.next_page_token.filter(|token| !token.is_empty()),
        ..Default::default()
    };

    let rows = response.results.and_then(|r| r.values).unwrap_or_default();
    for row in &rows {
        match decode_row(row) {
            Some(sample) => page.rows.push(sample),
            None => page.skipped_rows += 1,
        }
    }

    Ok(page)
}

fn decode_row(row: &serde_json::Value) -> Option<Sample> {
    let cells = row.as_array()?;
    let timestamp = cells.first()?.as_f64()?.floor() as i64;
    let value = match cells.get(1)? {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => Some(n.as_f64()?),
        _ => return None,
    };
    Some(Sample::new(timestamp, value))
}

#[async_trait]
impl PageSource for HistorianClient {
    async fn fetch_page(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<HistoryPage, TelemetryError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(TelemetryError::MissingCredentials)?;
        let url = build_page_url(&credentials.base_url, query, page_token);

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!("Historian query failed with status {}", status);
            return Err(TelemetryError::Provider { status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TelemetryError::Transport(e.to_string()))?;

        decode_page(&body)
    }
}

#[async_trait]
impl TelemetryRepository for HistorianClient {
    async fn fetch_history(
        &self,
        point_name: &str,
        range: TimeRange,
    ) -> Result<FetchedHistory, TelemetryError> {
        if self.credentials.is_none() {
            return Err(TelemetryError::MissingCredentials);
        }

        let query = self.build_query(point_name, range);
        tracing::debug!("Executing history query: {}", query);
        fetch_all(self, &query, self.max_pages).await
    }
}
