//! REST API client.

use crate::config::GatewayConfig;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use shared_types::{Deadline, LedgerError};
use std::time::Duration;
use tracing::{debug, trace};

pub const BATCHES_PATH: &str = "/batches";
pub const BATCH_STATUSES_PATH: &str = "/batch_statuses";
pub const STATE_PATH: &str = "/state";
pub const TRANSACTIONS_PATH: &str = "/transactions";

const OCTET_STREAM: &str = "application/octet-stream";
const MAX_ERROR_BODY: usize = 512;

/// Client for the ledger REST API.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl RestGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /batches` with a serialized `BatchList`.
    pub async fn post_batches(&self, deadline: &Deadline, body: Vec<u8>) -> Result<Bytes, LedgerError> {
        let url = self.url(BATCHES_PATH);
        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, OCTET_STREAM)
            .body(body);
        self.send(deadline, request, url).await
    }

    /// `GET /batch_statuses?id=&wait=`. The server may hold the request for
    /// up to `wait_secs`.
    pub async fn batch_status(
        &self,
        deadline: &Deadline,
        batch_id: &str,
        wait_secs: u64,
    ) -> Result<Bytes, LedgerError> {
        let url = self.url(BATCH_STATUSES_PATH);
        let request = self
            .client
            .get(&url)
            .query(&[("id", batch_id.to_string()), ("wait", wait_secs.to_string())])
            .timeout(self.request_timeout + Duration::from_secs(wait_secs));
        self.send(deadline, request, url).await
    }

    /// `GET /state/{address}`.
    pub async fn state(&self, deadline: &Deadline, address: &str) -> Result<Bytes, LedgerError> {
        let url = format!("{}{}/{}", self.base_url, STATE_PATH, address);
        let request = self.client.get(&url);
        self.send(deadline, request, url).await
    }

    /// First page of `GET /state?address={prefix}`.
    pub async fn state_range(&self, deadline: &Deadline, prefix: &str) -> Result<Bytes, LedgerError> {
        let url = self.url(STATE_PATH);
        let request = self.client.get(&url).query(&[("address", prefix)]);
        self.send(deadline, request, url).await
    }

    /// Follow a `paging.next` link.
    pub async fn follow(&self, deadline: &Deadline, next: &str) -> Result<Bytes, LedgerError> {
        let url = self.rebase(next);
        let request = self.client.get(&url);
        self.send(deadline, request, url).await
    }

    /// `GET /transactions/{id}`.
    pub async fn transaction(&self, deadline: &Deadline, transaction_id: &str) -> Result<Bytes, LedgerError> {
        let url = format!("{}{}/{}", self.base_url, TRANSACTIONS_PATH, transaction_id);
        let request = self.client.get(&url);
        self.send(deadline, request, url).await
    }

    /// Paging links carry the validator's own host name, which is often not
    /// reachable from here. Keep the path and query, swap the origin.
    fn rebase(&self, link: &str) -> String {
        match link.find(STATE_PATH) {
            Some(start) if link.starts_with("http") => format!("{}{}", self.base_url, &link[start..]),
            _ if link.starts_with('/') => self.url(link),
            _ => link.to_string(),
        }
    }

    async fn send(
        &self,
        deadline: &Deadline,
        request: RequestBuilder,
        url: String,
    ) -> Result<Bytes, LedgerError> {
        trace!(%url, "REST request");
        deadline
            .run(async {
                let response = request.send().await.map_err(|e| transport_error(&url, e))?;
                let status = response.status();

                if status == StatusCode::NOT_FOUND {
                    debug!(%url, "Nothing at address");
                    return Err(LedgerError::NotFound(url.clone()));
                }

                let body = response.bytes().await.map_err(|e| transport_error(&url, e))?;
                if !status.is_success() {
                    let text: String = String::from_utf8_lossy(&body).chars().take(MAX_ERROR_BODY).collect();
                    return Err(LedgerError::HttpStatus {
                        status: status.as_u16(),
                        url: url.clone(),
                        body: text,
                    });
                }
                Ok(body)
            })
            .await
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> LedgerError {
    if e.is_connect() {
        LedgerError::Transport(format!("cannot connect to {url}"))
    } else if e.is_timeout() {
        LedgerError::Transport(format!("request to {url} timed out"))
    } else {
        LedgerError::Transport(format!("request to {url} failed: {e}"))
    }
}
