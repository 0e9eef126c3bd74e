// This file is part of Arena.

// Copyright (C) 2026 Arena Labs.
// SPDX-License-Identifier: GPL-3.0-or-later

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP client against the stream endpoint.

use std::time::Duration;

use crate::query::StreamQuery;
use crate::types::{sort_logs, QueryResponse};
use crate::StreamError;

const LOG_TARGET: &str = "arena_stream";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Base URL of the stream service.
    pub url: String,
    /// Optional bearer credential sent with every request.
    pub bearer_token: Option<String>,
    pub request_timeout: Duration,
}

impl StreamConfig {
    pub fn new(url: String, bearer_token: Option<String>) -> Self {
        StreamConfig {
            url,
            bearer_token,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Thin wrapper over the stream HTTP API. Holds no cursor state; the
/// scheduling loop passes the cursor in with every query.
#[derive(Clone)]
pub struct StreamClient {
    http: reqwest::Client,
    config: StreamConfig,
}

impl StreamClient {
    pub fn new(config: StreamConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| StreamError::UpstreamUnavailable(err.to_string()))?;
        Ok(StreamClient { http, config })
    }

    fn request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetches one batch starting at the query's cursor. Logs come back
    /// ordered by `(block_number, log_index)`.
    pub async fn poll(&self, query: &StreamQuery) -> Result<QueryResponse, StreamError> {
        let url = format!("{}/query", self.config.url.trim_end_matches('/'));
        let response = self
            .request(self.http.post(&url).json(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::UpstreamUnavailable(format!(
                "{} responded {}",
                url, status
            )));
        }

        let mut batch: QueryResponse = response.json().await?;
        sort_logs(&mut batch.logs);

        log::debug!(
            target: LOG_TARGET,
            "polled from_block={} next_block={} logs={} txs={}",
            query.from_block,
            batch.next_block,
            batch.logs.len(),
            batch.transactions.len()
        );

        Ok(batch)
    }

    /// Liveness probe with a short timeout of its own.
    pub async fn healthy(&self) -> bool {
        let url = format!("{}/height", self.config.url.trim_end_matches('/'));
        let result = self
            .request(self.http.get(&url).timeout(HEALTH_TIMEOUT))
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::warn!(target: LOG_TARGET, "health probe failed: {}", err);
                false
            }
        }
    }
}
