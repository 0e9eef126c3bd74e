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

//! Merkle-root reward batches and the per-user reward rows they link to.

use chrono::{DateTime, Utc};
use ethereum_types::{H160, H256, U256};

use crate::CompetitionId;

/// One published rewards batch, identified on-chain by its merkle root.
/// `tx_hash` is filled in when the matching `AllocationAdded` log is
/// reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardsRoot {
    pub root_hash: H256,
    pub competition_id: CompetitionId,
    pub tx_hash: Option<H256>,
    pub token_address: H160,
    pub allocated_amount: U256,
    pub start_timestamp: DateTime<Utc>,
}

/// A single user's reward inside a batch. Marked claimed when the
/// matching `RewardClaimed` log is reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    pub competition_id: CompetitionId,
    pub user_address: H160,
    pub amount: U256,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_tx: Option<H256>,
}
