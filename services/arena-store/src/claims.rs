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

//! Conviction claim rows decoded from `claim(...)` calldata. The
//! transaction hash is the idempotency key; re-ingesting a known hash is
//! a silent no-op.

use arena_primitives::claims::ConvictionClaim;
use arena_primitives::BlockNumber;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use ethereum_types::H256;
use sqlx::PgConnection;

use crate::codec::{
    amount_from_db, amount_to_db, block_from_db, block_to_db, h160_from_db, h256_from_db,
};
use crate::StoreError;

#[derive(sqlx::FromRow)]
struct ClaimRow {
    tx_hash: Vec<u8>,
    account: Vec<u8>,
    season: i16,
    duration_seconds: i64,
    eligible_amount: BigDecimal,
    claimed_amount: BigDecimal,
    block_number: i64,
    block_timestamp: DateTime<Utc>,
}

impl ClaimRow {
    fn into_domain(self) -> Result<ConvictionClaim, StoreError> {
        Ok(ConvictionClaim {
            tx_hash: h256_from_db(&self.tx_hash)?,
            account: h160_from_db(&self.account)?,
            season: u8::try_from(self.season).map_err(|_| StoreError::OutOfRange("season"))?,
            duration_secs: u64::try_from(self.duration_seconds)
                .map_err(|_| StoreError::OutOfRange("claim duration"))?,
            eligible_amount: amount_from_db(&self.eligible_amount)?,
            claimed_amount: amount_from_db(&self.claimed_amount)?,
            block_number: block_from_db(self.block_number)?,
            block_timestamp: self.block_timestamp,
        })
    }
}

pub struct ConvictionClaimsRepo;

impl ConvictionClaimsRepo {
    pub async fn is_present(conn: &mut PgConnection, tx_hash: H256) -> Result<bool, StoreError> {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM conviction_claims WHERE tx_hash = $1)",
        )
        .bind(tx_hash.as_bytes())
        .fetch_one(&mut *conn)
        .await?;
        Ok(present)
    }

    /// Inserts the claim. Returns `true` iff a row was inserted.
    pub async fn save(
        conn: &mut PgConnection,
        claim: &ConvictionClaim,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO conviction_claims \
                 (tx_hash, account, season, duration_seconds, eligible_amount, \
                  claimed_amount, block_number, block_timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (tx_hash) DO NOTHING",
        )
        .bind(claim.tx_hash.as_bytes())
        .bind(claim.account.as_bytes())
        .bind(i16::from(claim.season))
        .bind(
            i64::try_from(claim.duration_secs)
                .map_err(|_| StoreError::OutOfRange("claim duration"))?,
        )
        .bind(amount_to_db(claim.eligible_amount))
        .bind(amount_to_db(claim.claimed_amount))
        .bind(block_to_db(claim.block_number)?)
        .bind(claim.block_timestamp)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_tx(
        conn: &mut PgConnection,
        tx_hash: H256,
    ) -> Result<Option<ConvictionClaim>, StoreError> {
        let row: Option<ClaimRow> = sqlx::query_as(
            "SELECT tx_hash, account, season, duration_seconds, eligible_amount, \
                    claimed_amount, block_number, block_timestamp \
             FROM conviction_claims WHERE tx_hash = $1",
        )
        .bind(tx_hash.as_bytes())
        .fetch_optional(&mut *conn)
        .await?;
        row.map(ClaimRow::into_domain).transpose()
    }

    /// Resume cursor for the transactions loop.
    pub async fn last_block_number(
        conn: &mut PgConnection,
        start_block: BlockNumber,
    ) -> Result<BlockNumber, StoreError> {
        let last: Option<i64> =
            sqlx::query_scalar("SELECT MAX(block_number) FROM conviction_claims")
                .fetch_one(&mut *conn)
                .await?;
        match last {
            Some(block) => block_from_db(block),
            None => Ok(start_block),
        }
    }
}
