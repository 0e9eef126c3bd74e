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

//! # Arena Indexer
//!
//! Tails the staking, rewards and conviction-claims contracts and turns
//! their logs and transactions into authoritative relational state.
//! Decoding maps `topic0` onto six known events; dispatch applies each
//! log at most once by pairing the domain mutation with the chain-event
//! append inside a single database transaction; two scheduler loops
//! drive the streams from persisted cursors.

#![forbid(unsafe_code)]

pub mod abi;
pub mod claims;
pub mod decode;
pub mod dispatch;
pub mod scheduler;

pub use dispatch::{Dispatcher, Outcome};
pub use scheduler::{Scheduler, SchedulerConfig};

use arena_store::StoreError;
use arena_stream::StreamError;

/// Infrastructure failures that abort the current batch. Everything
/// decode-shaped is handled inline as a logged skip and never reaches
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl IndexerError {
    /// The scheduling loop retries the batch after its delay when the
    /// failure is transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            IndexerError::Store(err) => err.is_retryable(),
            IndexerError::Stream(StreamError::UpstreamUnavailable(_)) => true,
            IndexerError::Stream(StreamError::BadResponse(_)) => false,
        }
    }
}
