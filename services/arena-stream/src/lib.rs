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

//! # Arena Stream
//!
//! Polling client for the block-stream service the indexer tails. One
//! request carries a block cursor plus log and transaction filters; one
//! response carries a bounded batch and the next cursor. The client
//! performs no retries of its own, the scheduling loop owns backoff.

#![forbid(unsafe_code)]

pub mod client;
pub mod query;
pub mod types;

pub use client::{StreamClient, StreamConfig};
pub use query::{LogFilter, StreamQuery, TxFilter};
pub use types::{BlockHeader, LogRecord, QueryResponse, TxRecord};

/// Stream client failures. IO and timeout problems surface as
/// `UpstreamUnavailable` and are retried by the caller's loop.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("stream returned an unusable response: {0}")]
    BadResponse(String),
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StreamError::BadResponse(err.to_string())
        } else {
            StreamError::UpstreamUnavailable(err.to_string())
        }
    }
}
