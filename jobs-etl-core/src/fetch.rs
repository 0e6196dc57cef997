//! Job Fetcher: one GET against `<base_url>/jobs?page=<N>`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::contract::{JobSource, RawJobRecord};
use crate::error::{body_snippet, FetchError};

/// [`JobSource`] backed by the public jobs HTTP API.
pub struct ApiJobSource {
    client: Client,
    url: Url,
    results_key: String,
}

impl ApiJobSource {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let url = jobs_url(&config.base_url, config.page);
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;
        Ok(Self {
            client,
            url,
            results_key: config.results_key.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Builds the listing URL, keeping any query pairs already present on `base`.
pub fn jobs_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    let path = format!("{}/jobs", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut()
        .append_pair("page", &page.to_string());
    url
}

/// Interprets an API response. Anything but a 200 carrying a JSON object with an
/// array under `results_key` is an [`FetchError::Api`].
pub fn parse_jobs_response(
    status: u16,
    body: &str,
    results_key: &str,
) -> Result<Vec<RawJobRecord>, FetchError> {
    let api_error = |reason: String| FetchError::Api {
        status,
        reason,
        snippet: body_snippet(body),
    };

    if status != StatusCode::OK.as_u16() {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unexpected status")
            .to_string();
        return Err(api_error(reason));
    }

    let mut json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| api_error(format!("response body is not valid JSON: {e}")))?;

    match json.get_mut(results_key).map(serde_json::Value::take) {
        Some(serde_json::Value::Array(jobs)) => Ok(jobs),
        Some(_) => Err(api_error(format!("`{results_key}` is not a list"))),
        None => Err(api_error(format!("`{results_key}` key missing from response"))),
    }
}

#[async_trait]
impl JobSource for ApiJobSource {
    async fn fetch(&self) -> Result<Vec<RawJobRecord>, FetchError> {
        info!(url = %self.url, "Reading the jobs API");

        let network_error = |e: reqwest::Error| FetchError::Network {
            url: self.url.to_string(),
            source: e,
        };

        let resp = self.client.get(self.url.clone()).send().await.map_err(|e| {
            error!(error = ?e, url = %self.url, "Request to jobs API failed");
            network_error(e)
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            error!(error = ?e, url = %self.url, %status, "Failed to read jobs API response body");
            network_error(e)
        })?;
        debug!(%status, bytes = body.len(), "Jobs API responded");

        match parse_jobs_response(status.as_u16(), &body, &self.results_key) {
            Ok(jobs) => {
                info!(count = jobs.len(), "Jobs API reading done");
                Ok(jobs)
            }
            Err(e) => {
                error!(%status, url = %self.url, snippet = %body_snippet(&body), "Jobs API returned an unusable response");
                Err(e)
            }
        }
    }
}
