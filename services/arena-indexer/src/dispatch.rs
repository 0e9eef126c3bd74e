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

//! Log dispatch. One database transaction per log, with the fixed
//! ordering: domain handler writes first, chain-event append second. A
//! rejected append means another worker already applied the log; the
//! transaction rolls back and nothing is visible.

use std::sync::Arc;

use arena_primitives::boost::{BoostAward, BoostCredit};
use arena_primitives::stake::{NewStake, RelockArgs, UnstakeArgs};
use arena_store::boost::BoostRepo;
use arena_store::competitions::CompetitionsRepo;
use arena_store::events::EventsRepo;
use arena_store::rewards::RewardsRepo;
use arena_store::stakes::{StakeOutcome, StakesRepo};
use arena_store::StoreError;
use arena_stream::LogRecord;
use sqlx::{PgConnection, PgPool};

use crate::decode::{decode_log, DecodeError, DecodedLog, EventPayload};
use crate::IndexerError;

const LOG_TARGET: &str = "arena_dispatch";

/// What happened to one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Domain mutation committed together with the event row.
    Applied,
    /// The log was already ingested; nothing changed.
    Duplicate,
    /// Undecodable or rejected by the domain; logged and passed over.
    Skipped,
}

/// Per-batch accounting, logged once per poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub applied: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Applied => self.applied += 1,
            Outcome::Duplicate => self.duplicates += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct Dispatcher {
    pool: PgPool,
    award: Arc<dyn BoostAward>,
}

impl Dispatcher {
    pub fn new(pool: PgPool, award: Arc<dyn BoostAward>) -> Self {
        Dispatcher { pool, award }
    }

    /// Processes a poll's worth of logs in stream order. Infrastructure
    /// errors abort the batch so the loop can retry without advancing
    /// its cursor.
    pub async fn process_batch(&self, logs: &[LogRecord]) -> Result<BatchStats, IndexerError> {
        let mut stats = BatchStats::default();
        if logs.is_empty() {
            return Ok(stats);
        }

        for record in logs {
            stats.record(self.process_log(record).await?);
        }

        log::info!(
            target: LOG_TARGET,
            "batch done: {} applied, {} duplicates, {} skipped",
            stats.applied,
            stats.duplicates,
            stats.skipped
        );
        Ok(stats)
    }

    /// Applies a single log at most once.
    pub async fn process_log(&self, record: &LogRecord) -> Result<Outcome, IndexerError> {
        let decoded = match decode_log(record) {
            Ok(decoded) => decoded,
            Err(DecodeError::UnknownTopic(topic)) => {
                log::debug!(
                    target: LOG_TARGET,
                    "skipping log {:?}/{} with unknown topic {:?}",
                    record.tx_hash,
                    record.log_index,
                    topic
                );
                return Ok(Outcome::Skipped);
            }
            Err(err) => {
                log::warn!(
                    target: LOG_TARGET,
                    "skipping undecodable log {:?}/{}: {}",
                    record.tx_hash,
                    record.log_index,
                    err
                );
                return Ok(Outcome::Skipped);
            }
        };

        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;

        // Fast path; the unique index still decides races.
        if EventsRepo::is_present(&mut conn, record.tx_hash, record.log_index).await? {
            log::debug!(
                target: LOG_TARGET,
                "log {:?}/{} already ingested",
                record.tx_hash,
                record.log_index
            );
            return Ok(Outcome::Duplicate);
        }

        let mut tx = sqlx::Connection::begin(&mut *conn).await.map_err(StoreError::from)?;

        match self.apply_domain(&mut tx, &decoded).await {
            Ok(()) => {}
            Err(StoreError::InvalidStateTransition(reason)) => {
                tx.rollback().await.map_err(StoreError::from)?;
                log::error!(
                    target: LOG_TARGET,
                    "rejected {} log {:?}/{}: {}",
                    decoded.raw.kind,
                    record.tx_hash,
                    record.log_index,
                    reason
                );
                return Ok(Outcome::Skipped);
            }
            Err(err) => return Err(err.into()),
        }

        let inserted = EventsRepo::append(&mut tx, &decoded.raw).await?;
        if !inserted {
            tx.rollback().await.map_err(StoreError::from)?;
            log::debug!(
                target: LOG_TARGET,
                "lost append race for log {:?}/{}, rolled back",
                record.tx_hash,
                record.log_index
            );
            return Ok(Outcome::Duplicate);
        }

        tx.commit().await.map_err(StoreError::from)?;
        Ok(Outcome::Applied)
    }

    async fn apply_domain(
        &self,
        conn: &mut PgConnection,
        decoded: &DecodedLog,
    ) -> Result<(), StoreError> {
        let coords = decoded.coords();
        match &decoded.payload {
            EventPayload::Stake {
                staker,
                token_id,
                amount,
                start_time,
                lockup_end_time,
            } => {
                // Lockup duration from the emitted window; the block
                // timestamp is the authoritative clock.
                let duration_secs = lockup_end_time
                    .checked_sub(*start_time)
                    .map(|window| window.min(u64::MAX.into()).low_u64())
                    .unwrap_or(0);
                let args = NewStake {
                    stake_id: *token_id,
                    wallet: *staker,
                    amount: *amount,
                    duration_secs,
                };
                match StakesRepo::stake(conn, &args, coords).await? {
                    StakeOutcome::Created(stake) => {
                        self.award_open_competitions(conn, &stake, decoded).await?;
                    }
                    StakeOutcome::AlreadyExists => {}
                }
                Ok(())
            }
            EventPayload::Unstake {
                token_id,
                amount_to_unstake,
                withdraw_allowed_time,
                ..
            } => {
                let can_withdraw_after = arena_utils::time::from_unix_secs(*withdraw_allowed_time)
                    .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
                // Despite its name, `amountToUnstake` carries what is
                // left on the position after the unstake.
                StakesRepo::unstake(
                    conn,
                    &UnstakeArgs {
                        stake_id: *token_id,
                        remaining_amount: *amount_to_unstake,
                        can_withdraw_after,
                    },
                    coords,
                )
                .await?;
                Ok(())
            }
            EventPayload::Relock {
                token_id,
                updated_old_stake_amount,
                ..
            } => {
                StakesRepo::relock(
                    conn,
                    &RelockArgs {
                        stake_id: *token_id,
                        updated_amount: *updated_old_stake_amount,
                    },
                    coords,
                )
                .await?;
                Ok(())
            }
            EventPayload::Withdraw { token_id, .. } => {
                StakesRepo::withdraw(conn, *token_id, coords).await?;
                Ok(())
            }
            EventPayload::RewardClaimed { root, user, amount } => {
                let competition_id = match RewardsRepo::competition_for_root(conn, *root).await? {
                    Some(competition_id) => competition_id,
                    None => {
                        log::warn!(
                            target: LOG_TARGET,
                            "reward claim for unknown root {:?}, nothing to reconcile",
                            root
                        );
                        return Ok(());
                    }
                };
                let marked = RewardsRepo::mark_reward_claimed(
                    conn,
                    &competition_id,
                    *user,
                    *amount,
                    coords.tx_hash,
                    coords.block_timestamp,
                )
                .await?;
                if !marked {
                    log::warn!(
                        target: LOG_TARGET,
                        "no unclaimed reward row for competition {} user {:?} amount {}",
                        competition_id,
                        user,
                        amount
                    );
                }
                Ok(())
            }
            EventPayload::AllocationAdded { root, .. } => {
                let linked = RewardsRepo::set_root_tx_hash(conn, *root, coords.tx_hash).await?;
                if !linked {
                    log::warn!(
                        target: LOG_TARGET,
                        "allocation added for unknown root {:?}, nothing to reconcile",
                        root
                    );
                }
                Ok(())
            }
        }
    }

    /// Awards boost for a fresh stake in every competition whose boost
    /// window contains the stake's block timestamp. Sequential, inside
    /// the caller's transaction; the policy owns the formula.
    async fn award_open_competitions(
        &self,
        conn: &mut PgConnection,
        stake: &arena_primitives::stake::Stake,
        decoded: &DecodedLog,
    ) -> Result<(), StoreError> {
        let coords = decoded.coords();
        let open = CompetitionsRepo::get_open_for_boosting(conn, coords.block_timestamp).await?;
        if open.is_empty() {
            return Ok(());
        }

        let user_id = match BoostRepo::find_user_by_wallet(conn, stake.wallet).await? {
            Some(user_id) => user_id,
            None => {
                log::debug!(
                    target: LOG_TARGET,
                    "no platform user for wallet {:?}, stake {} earns no boost",
                    stake.wallet,
                    stake.stake_id
                );
                return Ok(());
            }
        };

        for window in open {
            let Some(amount) = self.award.award_for_stake(stake, &window) else {
                continue;
            };
            let credit = BoostCredit {
                user_id: user_id.clone(),
                competition_id: window.competition_id.clone(),
                wallet: stake.wallet,
                amount,
                // The transaction hash is unique per balance here: one
                // stake log awards each competition at most once.
                idem_key: Some(coords.tx_hash),
                meta: Some(serde_json::json!({
                    "source": "stake",
                    "stakeId": stake.stake_id.to_string(),
                    "txHash": arena_utils::hex::hash_to_hex(&coords.tx_hash),
                    "logIndex": coords.log_index,
                })),
            };
            let balance = BoostRepo::increase(conn, &credit).await?;
            log::info!(
                target: LOG_TARGET,
                "awarded {} boost to user {} in competition {} for stake {}",
                amount,
                balance.user_id,
                balance.competition_id,
                stake.stake_id
            );
        }
        Ok(())
    }
}
