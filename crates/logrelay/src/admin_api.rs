// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fire-and-forget delivery of events to the HTTP administration API.
//!
//! Each relayed event is a single `POST <base_url>/<endpoint>` with a JSON body. Failures of
//! any kind are logged and dropped: there is no retry and no queue, and nothing is reported
//! back to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::errors::ForwardError;
use crate::router::Endpoint;

/// Destination for routed events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers `payload` (one serialized event) to `endpoint`. Must not fail the caller.
    async fn forward(&self, endpoint: Endpoint, payload: &str);
}

/// Builds the reqwest client used for admin API calls.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    builder.build()
}

/// Like [`build_client`], but an unusable proxy is logged and the client connects directly.
pub fn build_client_or_direct(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    match (build_client(proxy_url, timeout), proxy_url) {
        (Ok(client), _) => Ok(client),
        (Err(e), Some(proxy)) => {
            warn!("Ignoring HTTPS proxy {:?}: {}", proxy, e);
            build_client(None, timeout)
        }
        (Err(e), None) => Err(e),
    }
}

#[derive(Clone, Debug)]
pub struct AdminApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        AdminApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Sends one event and reads the response.
    ///
    /// Any status outside 2xx is an error carrying the response body.
    pub async fn post(
        &self,
        endpoint: Endpoint,
        payload: &str,
    ) -> Result<(StatusCode, String), ForwardError> {
        let response = self
            .client
            .post(self.url_for(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_owned())
            .send()
            .await
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ForwardError::Body)?;
        if !status.is_success() {
            return Err(ForwardError::Status { status, body });
        }
        Ok((status, body))
    }
}

#[async_trait]
impl EventSink for AdminApiClient {
    async fn forward(&self, endpoint: Endpoint, payload: &str) {
        let time = std::time::Instant::now();
        match self.post(endpoint, payload).await {
            Ok((status, body)) => {
                debug!(
                    "Relayed event to {} in {}ms: {} {}",
                    endpoint,
                    time.elapsed().as_millis(),
                    status,
                    body
                );
            }
            Err(e) => {
                error!("Failed to relay event to {}: {}", endpoint, e);
            }
        }
    }
}
