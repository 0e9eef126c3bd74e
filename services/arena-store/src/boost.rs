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

//! Boost ledger: materialized `boost_balances` rows plus the
//! append-only `boost_changes` log.
//!
//! Every mutation locks the balance row, appends exactly one change and
//! rewrites the materialized balance, so `SUM(delta_amount)` per balance
//! and the `balance` column never diverge. `merge_boost` reparents a
//! user's entire change history onto another user in one transaction.

use arena_primitives::boost::{BoostBalance, BoostChange, BoostCredit, MergedBalance};
use arena_primitives::{SignedAmount, UserId};
use arena_utils::arena_ensure;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use ethereum_types::{H160, U256};
use sqlx::PgConnection;

use crate::codec::{
    amount_from_db, amount_to_db, delta_from_db, delta_to_db, h160_from_db, h256_from_db,
};
use crate::StoreError;

const LOG_TARGET: &str = "arena_boost";

#[derive(sqlx::FromRow)]
struct BalanceRow {
    id: i64,
    user_id: String,
    competition_id: String,
    balance: BigDecimal,
    updated_at: DateTime<Utc>,
}

impl BalanceRow {
    fn into_domain(self) -> Result<BoostBalance, StoreError> {
        Ok(BoostBalance {
            id: self.id,
            user_id: self.user_id,
            competition_id: self.competition_id,
            balance: amount_from_db(&self.balance)?,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChangeRow {
    id: i64,
    balance_id: i64,
    delta_amount: BigDecimal,
    wallet: Vec<u8>,
    idem_key: Option<Vec<u8>>,
    meta: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl ChangeRow {
    fn into_domain(self) -> Result<BoostChange, StoreError> {
        Ok(BoostChange {
            id: self.id,
            balance_id: self.balance_id,
            delta_amount: delta_from_db(&self.delta_amount)?,
            wallet: h160_from_db(&self.wallet)?,
            idem_key: self.idem_key.as_deref().map(h256_from_db).transpose()?,
            meta: self.meta,
            created_at: self.created_at,
        })
    }
}

enum Direction {
    Increase,
    Decrease,
}

pub struct BoostRepo;

impl BoostRepo {
    /// Credits boost, creating the balance row on first use. A repeated
    /// `idem_key` for the same balance is a no-op returning the current
    /// balance.
    pub async fn increase(
        conn: &mut PgConnection,
        credit: &BoostCredit,
    ) -> Result<BoostBalance, StoreError> {
        Self::adjust(conn, credit, Direction::Increase).await
    }

    /// Debits boost. Fails with `InsufficientBoost` rather than letting
    /// a balance go negative.
    pub async fn decrease(
        conn: &mut PgConnection,
        credit: &BoostCredit,
    ) -> Result<BoostBalance, StoreError> {
        Self::adjust(conn, credit, Direction::Decrease).await
    }

    async fn adjust(
        conn: &mut PgConnection,
        credit: &BoostCredit,
        direction: Direction,
    ) -> Result<BoostBalance, StoreError> {
        // The no-op DO UPDATE makes the upsert always return the id and
        // take the row lock that serializes concurrent writers.
        let balance_id: i64 = sqlx::query_scalar(
            "INSERT INTO boost_balances (user_id, competition_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, competition_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id",
        )
        .bind(&credit.user_id)
        .bind(&credit.competition_id)
        .fetch_one(&mut *conn)
        .await?;

        let row: BalanceRow = sqlx::query_as(
            "SELECT id, user_id, competition_id, balance, updated_at \
             FROM boost_balances WHERE id = $1 FOR UPDATE",
        )
        .bind(balance_id)
        .fetch_one(&mut *conn)
        .await?;

        if let Some(idem_key) = credit.idem_key {
            let already_applied: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM boost_changes \
                 WHERE balance_id = $1 AND idem_key = $2)",
            )
            .bind(balance_id)
            .bind(idem_key.as_bytes())
            .fetch_one(&mut *conn)
            .await?;
            if already_applied {
                log::debug!(
                    target: LOG_TARGET,
                    "boost change with idem key {:?} already applied to balance {}",
                    idem_key,
                    balance_id
                );
                return row.into_domain();
            }
        }

        let current = amount_from_db(&row.balance)?;
        let (new_balance, delta) = match direction {
            Direction::Increase => {
                let raised = current
                    .checked_add(credit.amount)
                    .ok_or(StoreError::OutOfRange("boost balance"))?;
                (raised, SignedAmount::Positive(credit.amount))
            }
            Direction::Decrease => match current.checked_sub(credit.amount) {
                Some(lowered) => (lowered, SignedAmount::Negative(credit.amount)),
                None => {
                    return Err(StoreError::InsufficientBoost {
                        user_id: credit.user_id.clone(),
                        competition_id: credit.competition_id.clone(),
                    })
                }
            },
        };

        sqlx::query(
            "INSERT INTO boost_changes (balance_id, delta_amount, wallet, idem_key, meta) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(balance_id)
        .bind(delta_to_db(delta))
        .bind(credit.wallet.as_bytes())
        .bind(credit.idem_key.as_ref().map(|key| key.as_bytes().to_vec()))
        .bind(&credit.meta)
        .execute(&mut *conn)
        .await?;

        let updated: BalanceRow = sqlx::query_as(
            "UPDATE boost_balances SET balance = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, user_id, competition_id, balance, updated_at",
        )
        .bind(balance_id)
        .bind(amount_to_db(new_balance))
        .fetch_one(&mut *conn)
        .await?;

        updated.into_domain()
    }

    /// Sum of change deltas for one `(user, competition)` pair. Zero
    /// when the pair has no balance row.
    pub async fn user_boost_balance(
        conn: &mut PgConnection,
        user_id: &str,
        competition_id: &str,
    ) -> Result<U256, StoreError> {
        let sum: Option<BigDecimal> = sqlx::query_scalar(
            "SELECT SUM(bc.delta_amount) \
             FROM boost_changes bc \
             JOIN boost_balances bb ON bb.id = bc.balance_id \
             WHERE bb.user_id = $1 AND bb.competition_id = $2",
        )
        .bind(user_id)
        .bind(competition_id)
        .fetch_one(&mut *conn)
        .await?;

        match sum {
            Some(total) => amount_from_db(&total),
            None => Ok(U256::zero()),
        }
    }

    /// Moves every balance of `from_user` onto `to_user`, rewriting the
    /// change history to point at the destination balances and leaving
    /// the source balances at zero. Must run inside a transaction; any
    /// failure (including colliding idempotency keys between the two
    /// sides) aborts the whole merge.
    pub async fn merge_boost(
        conn: &mut PgConnection,
        from_user: &str,
        to_user: &str,
    ) -> Result<Vec<MergedBalance>, StoreError> {
        let destination_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(to_user)
                .fetch_one(&mut *conn)
                .await?;
        arena_ensure!(
            destination_exists,
            StoreError::ForeignKeyViolation,
            target: LOG_TARGET,
            "cannot merge boost into missing user {}",
            to_user
        );

        let sources: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, competition_id FROM boost_balances \
             WHERE user_id = $1 ORDER BY competition_id FOR UPDATE",
        )
        .bind(from_user)
        .fetch_all(&mut *conn)
        .await?;

        let mut merged = Vec::with_capacity(sources.len());
        for (source_id, competition_id) in sources {
            let destination_id: i64 = sqlx::query_scalar(
                "INSERT INTO boost_balances (user_id, competition_id) VALUES ($1, $2) \
                 ON CONFLICT (user_id, competition_id) DO UPDATE SET user_id = EXCLUDED.user_id \
                 RETURNING id",
            )
            .bind(to_user)
            .bind(&competition_id)
            .fetch_one(&mut *conn)
            .await?;

            if destination_id == source_id {
                // Merging a user into itself changes nothing.
                continue;
            }

            sqlx::query("UPDATE boost_changes SET balance_id = $2 WHERE balance_id = $1")
                .bind(source_id)
                .bind(destination_id)
                .execute(&mut *conn)
                .await?;

            sqlx::query(
                "UPDATE boost_balances SET balance = 0, updated_at = now() WHERE id = $1",
            )
            .bind(source_id)
            .execute(&mut *conn)
            .await?;

            let new_balance: BigDecimal = sqlx::query_scalar(
                "UPDATE boost_balances \
                 SET balance = (SELECT COALESCE(SUM(delta_amount), 0) \
                                FROM boost_changes WHERE balance_id = $1), \
                     updated_at = now() \
                 WHERE id = $1 \
                 RETURNING balance",
            )
            .bind(destination_id)
            .fetch_one(&mut *conn)
            .await?;

            merged.push(MergedBalance {
                competition_id,
                new_balance: amount_from_db(&new_balance)?,
            });
        }

        log::info!(
            target: LOG_TARGET,
            "merged {} boost balances from user {} into user {}",
            merged.len(),
            from_user,
            to_user
        );
        Ok(merged)
    }

    /// Wallet to platform user lookup used by the stake award flow.
    pub async fn find_user_by_wallet(
        conn: &mut PgConnection,
        wallet: H160,
    ) -> Result<Option<UserId>, StoreError> {
        let user_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE wallet = $1 LIMIT 1")
                .bind(wallet.as_bytes())
                .fetch_optional(&mut *conn)
                .await?;
        Ok(user_id)
    }

    /// Change log of one balance in insertion order.
    pub async fn changes_for_balance(
        conn: &mut PgConnection,
        balance_id: i64,
    ) -> Result<Vec<BoostChange>, StoreError> {
        let rows: Vec<ChangeRow> = sqlx::query_as(
            "SELECT id, balance_id, delta_amount, wallet, idem_key, meta, created_at \
             FROM boost_changes WHERE balance_id = $1 ORDER BY created_at, id",
        )
        .bind(balance_id)
        .fetch_all(&mut *conn)
        .await?;
        rows.into_iter().map(ChangeRow::into_domain).collect()
    }
}
