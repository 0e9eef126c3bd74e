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

//! Staked positions and their append-only journal.

use chrono::{DateTime, Utc};
use ethereum_types::{H160, U256};
use serde::{Deserialize, Serialize};

use crate::{EventCoords, SignedAmount};

/// A locked position identified on-chain by `stake_id`. Rows persist
/// after withdrawal for audit; `withdrawn_at` marks them final.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stake {
    pub stake_id: U256,
    /// Staker wallet, lowercased at ingest.
    pub wallet: H160,
    pub amount: U256,
    pub staked_at: DateTime<Utc>,
    pub can_unstake_after: DateTime<Utc>,
    pub relocked_at: Option<DateTime<Utc>>,
    pub unstaked_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub can_withdraw_after: Option<DateTime<Utc>>,
}

impl Stake {
    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn_at.is_some()
    }
}

/// Kind of a stake journal entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StakeEventKind {
    Stake,
    Unstake,
    Relock,
    Withdraw,
}

impl StakeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StakeEventKind::Stake => "stake",
            StakeEventKind::Unstake => "unstake",
            StakeEventKind::Relock => "relock",
            StakeEventKind::Withdraw => "withdraw",
        }
    }
}

/// One journal row. For any `stake_id` the deltas sum to the current
/// `amount` of the position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeChange {
    pub id: i64,
    pub stake_id: U256,
    pub delta_amount: SignedAmount,
    pub prev_amount: U256,
    pub new_amount: U256,
    pub event_kind: StakeEventKind,
    pub coords: EventCoords,
    pub created_at: DateTime<Utc>,
}

/// Arguments of a new-stake mutation.
#[derive(Clone, Debug)]
pub struct NewStake {
    pub stake_id: U256,
    pub wallet: H160,
    pub amount: U256,
    /// Lockup duration in seconds; `can_unstake_after` is the block
    /// timestamp plus this.
    pub duration_secs: u64,
}

/// Arguments of a partial or full unstake. Full unstake is
/// `remaining_amount == 0`.
#[derive(Clone, Debug)]
pub struct UnstakeArgs {
    pub stake_id: U256,
    pub remaining_amount: U256,
    pub can_withdraw_after: DateTime<Utc>,
}

/// Arguments of a relock.
#[derive(Clone, Debug)]
pub struct RelockArgs {
    pub stake_id: U256,
    pub updated_amount: U256,
}
