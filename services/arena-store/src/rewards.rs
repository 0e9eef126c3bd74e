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

//! Reward batches and per-user rewards. The reward allocator writes the
//! rows; this repository reconciles them with on-chain proof, linking
//! `AllocationAdded` to the root row and `RewardClaimed` to the reward
//! row. It never creates rewards or allocations.

use arena_primitives::rewards::RewardsRoot;
use arena_primitives::CompetitionId;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use ethereum_types::{H160, H256, U256};
use sqlx::PgConnection;

use crate::codec::{amount_from_db, amount_to_db, h160_from_db, h256_from_db};
use crate::StoreError;

#[derive(sqlx::FromRow)]
struct RootRow {
    root_hash: Vec<u8>,
    competition_id: String,
    tx_hash: Option<Vec<u8>>,
    token_address: Vec<u8>,
    allocated_amount: BigDecimal,
    start_timestamp: DateTime<Utc>,
}

impl RootRow {
    fn into_domain(self) -> Result<RewardsRoot, StoreError> {
        Ok(RewardsRoot {
            root_hash: h256_from_db(&self.root_hash)?,
            competition_id: self.competition_id,
            tx_hash: self.tx_hash.as_deref().map(h256_from_db).transpose()?,
            token_address: h160_from_db(&self.token_address)?,
            allocated_amount: amount_from_db(&self.allocated_amount)?,
            start_timestamp: self.start_timestamp,
        })
    }
}

pub struct RewardsRepo;

impl RewardsRepo {
    /// Resolves a merkle root to its competition, if known.
    pub async fn competition_for_root(
        conn: &mut PgConnection,
        root: H256,
    ) -> Result<Option<CompetitionId>, StoreError> {
        let competition_id: Option<String> =
            sqlx::query_scalar("SELECT competition_id FROM rewards_roots WHERE root_hash = $1")
                .bind(root.as_bytes())
                .fetch_optional(&mut *conn)
                .await?;
        Ok(competition_id)
    }

    pub async fn find_root(
        conn: &mut PgConnection,
        root: H256,
    ) -> Result<Option<RewardsRoot>, StoreError> {
        let row: Option<RootRow> = sqlx::query_as(
            "SELECT root_hash, competition_id, tx_hash, token_address, \
                    allocated_amount, start_timestamp \
             FROM rewards_roots WHERE root_hash = $1",
        )
        .bind(root.as_bytes())
        .fetch_optional(&mut *conn)
        .await?;
        row.map(RootRow::into_domain).transpose()
    }

    /// Links an `AllocationAdded` log to its root row. Returns `false`
    /// when the root is unknown.
    pub async fn set_root_tx_hash(
        conn: &mut PgConnection,
        root: H256,
        tx_hash: H256,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE rewards_roots SET tx_hash = $2 WHERE root_hash = $1")
                .bind(root.as_bytes())
                .bind(tx_hash.as_bytes())
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks the matching unclaimed reward as claimed. Returns `false`
    /// when no matching row exists.
    pub async fn mark_reward_claimed(
        conn: &mut PgConnection,
        competition_id: &str,
        user_address: H160,
        amount: U256,
        claimed_tx: H256,
        claimed_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE rewards SET claimed_at = $4, claimed_tx = $5 \
             WHERE competition_id = $1 AND user_address = $2 AND amount = $3 \
               AND claimed_at IS NULL",
        )
        .bind(competition_id)
        .bind(user_address.as_bytes())
        .bind(amount_to_db(amount))
        .bind(claimed_at)
        .bind(claimed_tx.as_bytes())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Records a new root row. Used by the reward allocator side of the
    /// shared table and by integration tests.
    pub async fn insert_root(
        conn: &mut PgConnection,
        root: &RewardsRoot,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rewards_roots \
                 (root_hash, competition_id, tx_hash, token_address, \
                  allocated_amount, start_timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(root.root_hash.as_bytes())
        .bind(&root.competition_id)
        .bind(root.tx_hash.as_ref().map(|hash| hash.as_bytes().to_vec()))
        .bind(root.token_address.as_bytes())
        .bind(amount_to_db(root.allocated_amount))
        .bind(root.start_timestamp)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Records an unclaimed reward row for a competition.
    pub async fn insert_reward(
        conn: &mut PgConnection,
        competition_id: &str,
        user_address: H160,
        amount: U256,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rewards (competition_id, user_address, amount) VALUES ($1, $2, $3)",
        )
        .bind(competition_id)
        .bind(user_address.as_bytes())
        .bind(amount_to_db(amount))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
