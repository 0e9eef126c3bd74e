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

//! Boost balances and their append-only change log.

use chrono::{DateTime, Utc};
use ethereum_types::{H160, H256, U256};

use crate::competition::BoostWindow;
use crate::stake::Stake;
use crate::{CompetitionId, SignedAmount, UserId};

/// Materialized per-(user, competition) boost. `balance` always equals
/// the sum of the change deltas pointing at this row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoostBalance {
    pub id: i64,
    pub user_id: UserId,
    pub competition_id: CompetitionId,
    pub balance: U256,
    pub updated_at: DateTime<Utc>,
}

/// One entry of the boost change log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoostChange {
    pub id: i64,
    pub balance_id: i64,
    pub delta_amount: SignedAmount,
    pub wallet: H160,
    pub idem_key: Option<H256>,
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Arguments of an `increase` or `decrease` on the ledger.
#[derive(Clone, Debug)]
pub struct BoostCredit {
    pub user_id: UserId,
    pub competition_id: CompetitionId,
    pub wallet: H160,
    pub amount: U256,
    /// At-most-once key, unique per balance when provided.
    pub idem_key: Option<H256>,
    pub meta: Option<serde_json::Value>,
}

/// Per-competition outcome of a user merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedBalance {
    pub competition_id: CompetitionId,
    pub new_balance: U256,
}

/// Policy hook deciding the boost credited for holding a stake during a
/// competition's boost window. The formula is owned by the caller-side
/// service; the ledger only guarantees atomicity with the stake row.
pub trait BoostAward: Send + Sync {
    /// Award for `stake` in `competition`, or `None` for no award.
    fn award_for_stake(&self, stake: &Stake, competition: &BoostWindow) -> Option<U256>;
}

/// Policy that never awards. Used when no award service is wired in.
pub struct NoAward;

impl BoostAward for NoAward {
    fn award_for_stake(&self, _stake: &Stake, _competition: &BoostWindow) -> Option<U256> {
        None
    }
}
