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

//! Stake state machine: `stake -> unstake(partial|full) -> relock ->
//! withdraw`, persisted into `stakes` plus one `stake_changes` journal
//! row per mutation.
//!
//! Transitions are computed by pure planner functions and applied under
//! a `SELECT ... FOR UPDATE` row lock, so concurrent writers serialize
//! per `stake_id`. Withdraw zeroes the amount and journals the full
//! negative delta; the journal of a withdrawn stake sums to zero.

use arena_primitives::stake::{NewStake, RelockArgs, Stake, StakeEventKind, UnstakeArgs};
use arena_primitives::{EventCoords, SignedAmount};
use arena_utils::ok_or_error;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use ethereum_types::U256;
use sqlx::PgConnection;

use crate::codec::{
    amount_from_db, amount_to_db, block_to_db, delta_to_db, h160_from_db, log_index_to_db,
};
use crate::StoreError;

const LOG_TARGET: &str = "arena_stakes";

/// Rejected state-machine transitions. These are skippable from the
/// indexing loop's point of view; they never kill the loop.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("stake {0} does not exist")]
    NotFound(U256),
    #[error("stake {0} is already withdrawn")]
    AlreadyWithdrawn(U256),
    #[error("stake {stake_id} cannot be withdrawn before {allowed_at}")]
    WithdrawNotAllowedYet {
        stake_id: U256,
        allowed_at: DateTime<Utc>,
    },
    #[error("unstake cannot raise stake {stake_id} from {current} to {requested}")]
    UnstakeIncreasesAmount {
        stake_id: U256,
        current: U256,
        requested: U256,
    },
}

/// A planned mutation: the row as it will be after the update plus the
/// journal entry recording the move.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub stake: Stake,
    pub kind: StakeEventKind,
    pub delta: SignedAmount,
    pub prev_amount: U256,
}

/// Pure transition planners. No IO, fully unit-tested; the repository
/// applies their output inside the caller's transaction.
pub mod plan {
    use super::*;

    /// A brand new position. `can_unstake_after` is the block timestamp
    /// plus the lockup; absurd lockups saturate instead of wrapping.
    pub fn new_stake(args: &NewStake, at: DateTime<Utc>) -> Transition {
        let lockup = i64::try_from(args.duration_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .unwrap_or(chrono::TimeDelta::MAX);
        let can_unstake_after = at
            .checked_add_signed(lockup)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Transition {
            stake: Stake {
                stake_id: args.stake_id,
                wallet: args.wallet,
                amount: args.amount,
                staked_at: at,
                can_unstake_after,
                relocked_at: None,
                unstaked_at: None,
                withdrawn_at: None,
                can_withdraw_after: None,
            },
            kind: StakeEventKind::Stake,
            delta: SignedAmount::Positive(args.amount),
            prev_amount: U256::zero(),
        }
    }

    /// Partial or full unstake; full is `remaining_amount == 0`.
    pub fn unstake(
        current: &Stake,
        args: &UnstakeArgs,
        at: DateTime<Utc>,
    ) -> Result<Transition, TransitionError> {
        if current.is_withdrawn() {
            return Err(TransitionError::AlreadyWithdrawn(current.stake_id));
        }
        if args.remaining_amount > current.amount {
            return Err(TransitionError::UnstakeIncreasesAmount {
                stake_id: current.stake_id,
                current: current.amount,
                requested: args.remaining_amount,
            });
        }

        let mut stake = current.clone();
        stake.amount = args.remaining_amount;
        stake.unstaked_at = Some(at);
        stake.can_withdraw_after = Some(args.can_withdraw_after);

        Ok(Transition {
            kind: StakeEventKind::Unstake,
            delta: SignedAmount::from_diff(current.amount, args.remaining_amount),
            prev_amount: current.amount,
            stake,
        })
    }

    /// Relock of a (possibly unstaked) position. Clears `unstaked_at`.
    pub fn relock(
        current: &Stake,
        args: &RelockArgs,
        at: DateTime<Utc>,
    ) -> Result<Transition, TransitionError> {
        if current.is_withdrawn() {
            return Err(TransitionError::AlreadyWithdrawn(current.stake_id));
        }

        let mut stake = current.clone();
        stake.amount = args.updated_amount;
        stake.relocked_at = Some(at);
        stake.unstaked_at = None;

        Ok(Transition {
            kind: StakeEventKind::Relock,
            delta: SignedAmount::from_diff(current.amount, args.updated_amount),
            prev_amount: current.amount,
            stake,
        })
    }

    /// Final transition. Zeroes the amount and journals the negative of
    /// whatever was left, keeping the journal sum equal to the amount.
    pub fn withdraw(current: &Stake, at: DateTime<Utc>) -> Result<Transition, TransitionError> {
        if current.is_withdrawn() {
            return Err(TransitionError::AlreadyWithdrawn(current.stake_id));
        }
        if let Some(allowed_at) = current.can_withdraw_after {
            if at < allowed_at {
                return Err(TransitionError::WithdrawNotAllowedYet {
                    stake_id: current.stake_id,
                    allowed_at,
                });
            }
        }

        let mut stake = current.clone();
        stake.amount = U256::zero();
        stake.withdrawn_at = Some(at);

        Ok(Transition {
            kind: StakeEventKind::Withdraw,
            delta: SignedAmount::from_diff(current.amount, U256::zero()),
            prev_amount: current.amount,
            stake,
        })
    }
}

/// Result of a `stake` call. Duplicate `Stake` logs for an existing
/// `stake_id` are a no-op, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum StakeOutcome {
    Created(Stake),
    AlreadyExists,
}

#[derive(sqlx::FromRow)]
struct StakeRow {
    stake_id: BigDecimal,
    wallet: Vec<u8>,
    amount: BigDecimal,
    staked_at: DateTime<Utc>,
    can_unstake_after: DateTime<Utc>,
    relocked_at: Option<DateTime<Utc>>,
    unstaked_at: Option<DateTime<Utc>>,
    withdrawn_at: Option<DateTime<Utc>>,
    can_withdraw_after: Option<DateTime<Utc>>,
}

impl StakeRow {
    fn into_domain(self) -> Result<Stake, StoreError> {
        Ok(Stake {
            stake_id: amount_from_db(&self.stake_id)?,
            wallet: h160_from_db(&self.wallet)?,
            amount: amount_from_db(&self.amount)?,
            staked_at: self.staked_at,
            can_unstake_after: self.can_unstake_after,
            relocked_at: self.relocked_at,
            unstaked_at: self.unstaked_at,
            withdrawn_at: self.withdrawn_at,
            can_withdraw_after: self.can_withdraw_after,
        })
    }
}

const STAKE_COLUMNS: &str = "stake_id, wallet, amount, staked_at, can_unstake_after, \
     relocked_at, unstaked_at, withdrawn_at, can_withdraw_after";

pub struct StakesRepo;

impl StakesRepo {
    pub async fn find_by_id(
        conn: &mut PgConnection,
        stake_id: U256,
    ) -> Result<Option<Stake>, StoreError> {
        let query = format!("SELECT {} FROM stakes WHERE stake_id = $1", STAKE_COLUMNS);
        let row: Option<StakeRow> = sqlx::query_as(&query)
            .bind(amount_to_db(stake_id))
            .fetch_optional(&mut *conn)
            .await?;
        row.map(StakeRow::into_domain).transpose()
    }

    /// Row-locked read; concurrent writers on one stake serialize here.
    async fn lock_by_id(
        conn: &mut PgConnection,
        stake_id: U256,
    ) -> Result<Option<Stake>, StoreError> {
        let query = format!(
            "SELECT {} FROM stakes WHERE stake_id = $1 FOR UPDATE",
            STAKE_COLUMNS
        );
        let row: Option<StakeRow> = sqlx::query_as(&query)
            .bind(amount_to_db(stake_id))
            .fetch_optional(&mut *conn)
            .await?;
        row.map(StakeRow::into_domain).transpose()
    }

    /// New stake. Idempotent on `stake_id`: a second `Stake` log for an
    /// existing id changes nothing and appends no journal row.
    pub async fn stake(
        conn: &mut PgConnection,
        args: &NewStake,
        coords: &EventCoords,
    ) -> Result<StakeOutcome, StoreError> {
        if Self::lock_by_id(conn, args.stake_id).await?.is_some() {
            log::debug!(
                target: LOG_TARGET,
                "duplicate stake event for existing stake {}, skipping",
                args.stake_id
            );
            return Ok(StakeOutcome::AlreadyExists);
        }

        let transition = plan::new_stake(args, coords.block_timestamp);

        sqlx::query(
            "INSERT INTO stakes \
                 (stake_id, wallet, amount, staked_at, can_unstake_after) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(amount_to_db(transition.stake.stake_id))
        .bind(transition.stake.wallet.as_bytes())
        .bind(amount_to_db(transition.stake.amount))
        .bind(transition.stake.staked_at)
        .bind(transition.stake.can_unstake_after)
        .execute(&mut *conn)
        .await?;

        Self::append_change(conn, &transition, coords).await?;
        Ok(StakeOutcome::Created(transition.stake))
    }

    pub async fn unstake(
        conn: &mut PgConnection,
        args: &UnstakeArgs,
        coords: &EventCoords,
    ) -> Result<Stake, StoreError> {
        let mb_current = Self::lock_by_id(conn, args.stake_id).await?;
        let current = ok_or_error!(
            mb_current,
            TransitionError::NotFound(args.stake_id),
            target: LOG_TARGET,
            "unstake of missing stake {}",
            args.stake_id
        )?;
        let transition = plan::unstake(&current, args, coords.block_timestamp)?;
        Self::apply(conn, &transition, coords).await?;
        Ok(transition.stake)
    }

    pub async fn relock(
        conn: &mut PgConnection,
        args: &RelockArgs,
        coords: &EventCoords,
    ) -> Result<Stake, StoreError> {
        let mb_current = Self::lock_by_id(conn, args.stake_id).await?;
        let current = ok_or_error!(
            mb_current,
            TransitionError::NotFound(args.stake_id),
            target: LOG_TARGET,
            "relock of missing stake {}",
            args.stake_id
        )?;
        let transition = plan::relock(&current, args, coords.block_timestamp)?;
        Self::apply(conn, &transition, coords).await?;
        Ok(transition.stake)
    }

    pub async fn withdraw(
        conn: &mut PgConnection,
        stake_id: U256,
        coords: &EventCoords,
    ) -> Result<Stake, StoreError> {
        let mb_current = Self::lock_by_id(conn, stake_id).await?;
        let current = ok_or_error!(
            mb_current,
            TransitionError::NotFound(stake_id),
            target: LOG_TARGET,
            "withdraw of missing stake {}",
            stake_id
        )?;
        let transition = plan::withdraw(&current, coords.block_timestamp)?;
        Self::apply(conn, &transition, coords).await?;
        Ok(transition.stake)
    }

    async fn apply(
        conn: &mut PgConnection,
        transition: &Transition,
        coords: &EventCoords,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE stakes SET \
                 amount = $2, relocked_at = $3, unstaked_at = $4, withdrawn_at = $5, \
                 can_withdraw_after = $6, updated_at = now() \
             WHERE stake_id = $1",
        )
        .bind(amount_to_db(transition.stake.stake_id))
        .bind(amount_to_db(transition.stake.amount))
        .bind(transition.stake.relocked_at)
        .bind(transition.stake.unstaked_at)
        .bind(transition.stake.withdrawn_at)
        .bind(transition.stake.can_withdraw_after)
        .execute(&mut *conn)
        .await?;

        Self::append_change(conn, transition, coords).await
    }

    async fn append_change(
        conn: &mut PgConnection,
        transition: &Transition,
        coords: &EventCoords,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO stake_changes \
                 (stake_id, delta_amount, prev_amount, new_amount, event_kind, \
                  block_number, block_hash, block_timestamp, tx_hash, log_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(amount_to_db(transition.stake.stake_id))
        .bind(delta_to_db(transition.delta))
        .bind(amount_to_db(transition.prev_amount))
        .bind(amount_to_db(transition.stake.amount))
        .bind(transition.kind.as_str())
        .bind(block_to_db(coords.block_number)?)
        .bind(coords.block_hash.as_bytes())
        .bind(coords.block_timestamp)
        .bind(coords.tx_hash.as_bytes())
        .bind(log_index_to_db(coords.log_index))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ethereum_types::H160;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sample_stake() -> Transition {
        plan::new_stake(
            &NewStake {
                stake_id: 1.into(),
                wallet: H160::repeat_byte(0xaa),
                amount: 1000.into(),
                duration_secs: 86_400,
            },
            at(1_700_000_000),
        )
    }

    #[test]
    fn new_stake_sets_lockup_window() {
        let transition = sample_stake();
        assert_eq!(transition.stake.staked_at, at(1_700_000_000));
        assert_eq!(transition.stake.can_unstake_after, at(1_700_086_400));
        assert_eq!(transition.delta, SignedAmount::Positive(1000.into()));
        assert_eq!(transition.prev_amount, U256::zero());
        assert_eq!(transition.kind, StakeEventKind::Stake);
    }

    #[test]
    fn absurd_lockup_saturates() {
        let transition = plan::new_stake(
            &NewStake {
                stake_id: 1.into(),
                wallet: H160::repeat_byte(0xaa),
                amount: 1.into(),
                duration_secs: u64::MAX,
            },
            at(1_700_000_000),
        );
        assert!(transition.stake.can_unstake_after > at(4_000_000_000));
    }

    #[test]
    fn partial_unstake_journals_the_difference() {
        let stake = sample_stake().stake;
        let transition = plan::unstake(
            &stake,
            &UnstakeArgs {
                stake_id: stake.stake_id,
                remaining_amount: 300.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        )
        .unwrap();

        assert_eq!(transition.stake.amount, U256::from(300));
        assert_eq!(transition.delta, SignedAmount::Negative(700.into()));
        assert_eq!(transition.stake.unstaked_at, Some(at(1_700_050_000)));
        assert_eq!(transition.stake.can_withdraw_after, Some(at(1_700_090_000)));
    }

    #[test]
    fn unstake_cannot_increase_amount() {
        let stake = sample_stake().stake;
        let result = plan::unstake(
            &stake,
            &UnstakeArgs {
                stake_id: stake.stake_id,
                remaining_amount: 2000.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        );
        assert!(matches!(
            result,
            Err(TransitionError::UnstakeIncreasesAmount { .. })
        ));
    }

    #[test]
    fn relock_clears_unstaked_at() {
        let stake = sample_stake().stake;
        let unstaked = plan::unstake(
            &stake,
            &UnstakeArgs {
                stake_id: stake.stake_id,
                remaining_amount: 300.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        )
        .unwrap()
        .stake;

        let transition = plan::relock(
            &unstaked,
            &RelockArgs {
                stake_id: unstaked.stake_id,
                updated_amount: 800.into(),
            },
            at(1_700_060_000),
        )
        .unwrap();

        assert_eq!(transition.stake.amount, U256::from(800));
        assert_eq!(transition.delta, SignedAmount::Positive(500.into()));
        assert_eq!(transition.stake.unstaked_at, None);
        assert_eq!(transition.stake.relocked_at, Some(at(1_700_060_000)));
    }

    #[test]
    fn withdraw_zeroes_and_journals_remainder() {
        let stake = sample_stake().stake;
        let unstaked = plan::unstake(
            &stake,
            &UnstakeArgs {
                stake_id: stake.stake_id,
                remaining_amount: 300.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        )
        .unwrap()
        .stake;

        let transition = plan::withdraw(&unstaked, at(1_700_090_001)).unwrap();
        assert_eq!(transition.stake.amount, U256::zero());
        assert_eq!(transition.delta, SignedAmount::Negative(300.into()));
        assert!(transition.stake.is_withdrawn());
    }

    #[test]
    fn withdraw_respects_the_waiting_period() {
        let stake = sample_stake().stake;
        let unstaked = plan::unstake(
            &stake,
            &UnstakeArgs {
                stake_id: stake.stake_id,
                remaining_amount: 0.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        )
        .unwrap()
        .stake;

        assert!(matches!(
            plan::withdraw(&unstaked, at(1_700_089_999)),
            Err(TransitionError::WithdrawNotAllowedYet { .. })
        ));
        assert!(plan::withdraw(&unstaked, at(1_700_090_000)).is_ok());
    }

    #[test]
    fn withdrawn_stakes_are_final() {
        let stake = sample_stake().stake;
        let withdrawn = {
            let mut s = stake.clone();
            s.withdrawn_at = Some(at(1_700_100_000));
            s
        };

        assert!(matches!(
            plan::unstake(
                &withdrawn,
                &UnstakeArgs {
                    stake_id: withdrawn.stake_id,
                    remaining_amount: 0.into(),
                    can_withdraw_after: at(1_700_090_000),
                },
                at(1_700_100_001)
            ),
            Err(TransitionError::AlreadyWithdrawn(_))
        ));
        assert!(matches!(
            plan::relock(
                &withdrawn,
                &RelockArgs {
                    stake_id: withdrawn.stake_id,
                    updated_amount: 5.into()
                },
                at(1_700_100_001)
            ),
            Err(TransitionError::AlreadyWithdrawn(_))
        ));
        assert!(matches!(
            plan::withdraw(&withdrawn, at(1_700_100_001)),
            Err(TransitionError::AlreadyWithdrawn(_))
        ));
    }

    #[test]
    fn journal_deltas_sum_to_the_amount_at_every_step() {
        let mut sum = SignedAmount::zero();
        let mut apply = |delta: SignedAmount, expected: U256| {
            sum = match delta {
                SignedAmount::Positive(v) => {
                    SignedAmount::Positive(sum.apply_to(U256::zero()).unwrap() + v)
                }
                SignedAmount::Negative(v) => {
                    SignedAmount::Positive(sum.apply_to(U256::zero()).unwrap() - v)
                }
            };
            assert_eq!(sum.magnitude(), expected);
        };

        let staked = sample_stake();
        apply(staked.delta, staked.stake.amount);

        let unstaked = plan::unstake(
            &staked.stake,
            &UnstakeArgs {
                stake_id: staked.stake.stake_id,
                remaining_amount: 300.into(),
                can_withdraw_after: at(1_700_090_000),
            },
            at(1_700_050_000),
        )
        .unwrap();
        apply(unstaked.delta, unstaked.stake.amount);

        let withdrawn = plan::withdraw(&unstaked.stake, at(1_700_090_000)).unwrap();
        apply(withdrawn.delta, withdrawn.stake.amount);
        assert_eq!(withdrawn.stake.amount, U256::zero());
    }
}
