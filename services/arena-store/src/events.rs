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

//! The chain-event intake table and its at-most-once gate.
//!
//! Dispatch order is fixed: the domain handler writes first, the event
//! is appended second, both inside one transaction. A duplicate append
//! means another worker already applied this log; the caller rolls the
//! whole transaction back.

use arena_primitives::{BlockNumber, ChainEvent, LogIndex};
use ethereum_types::H256;
use sqlx::PgConnection;

use crate::codec::{block_from_db, block_to_db, log_index_to_db};
use crate::StoreError;

pub struct EventsRepo;

impl EventsRepo {
    /// Cheap fast path checked before any domain work is attempted.
    pub async fn is_present(
        conn: &mut PgConnection,
        tx_hash: H256,
        log_index: LogIndex,
    ) -> Result<bool, StoreError> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM chain_events WHERE tx_hash = $1 AND log_index = $2)",
        )
        .bind(tx_hash.as_bytes())
        .bind(log_index_to_db(log_index))
        .fetch_one(&mut *conn)
        .await?;
        Ok(present)
    }

    /// Appends the raw event. Returns `true` iff a row was inserted;
    /// `false` means the `(tx_hash, log_index)` key already exists.
    pub async fn append(conn: &mut PgConnection, event: &ChainEvent) -> Result<bool, StoreError> {
        let topics: Vec<Vec<u8>> = event
            .topics
            .iter()
            .map(|topic| topic.as_bytes().to_vec())
            .collect();

        let result = sqlx::query(
            "INSERT INTO chain_events \
                 (block_number, block_hash, block_timestamp, tx_hash, log_index, \
                  address, topics, data, event_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (tx_hash, log_index) DO NOTHING",
        )
        .bind(block_to_db(event.coords.block_number)?)
        .bind(event.coords.block_hash.as_bytes())
        .bind(event.coords.block_timestamp)
        .bind(event.coords.tx_hash.as_bytes())
        .bind(log_index_to_db(event.coords.log_index))
        .bind(event.address.as_bytes())
        .bind(&topics)
        .bind(&event.data)
        .bind(event.kind.as_str())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resume cursor: the highest ingested block, or `start_block` when
    /// the table is empty.
    pub async fn last_block_number(
        conn: &mut PgConnection,
        start_block: BlockNumber,
    ) -> Result<BlockNumber, StoreError> {
        let last: Option<i64> = sqlx::query_scalar("SELECT MAX(block_number) FROM chain_events")
            .fetch_one(&mut *conn)
            .await?;
        match last {
            Some(block) => block_from_db(block),
            None => Ok(start_block),
        }
    }
}
