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

//! Raw chain intake types shared between the decoder and the events table.

use chrono::{DateTime, Utc};
use ethereum_types::{H160, H256};
use serde::{Deserialize, Serialize};

use crate::{BlockNumber, LogIndex};

/// Where on the chain a log was emitted. Stamped onto every journal row
/// so any domain mutation can be traced back to its originating log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCoords {
    pub block_number: BlockNumber,
    pub block_hash: H256,
    pub block_timestamp: DateTime<Utc>,
    pub tx_hash: H256,
    pub log_index: LogIndex,
}

/// Kind of a consumed contract event. `Unknown` is kept for logs that
/// matched the address filter but none of the known topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainEventKind {
    Stake,
    Unstake,
    Relock,
    Withdraw,
    RewardClaimed,
    AllocationAdded,
    Unknown,
}

impl ChainEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainEventKind::Stake => "stake",
            ChainEventKind::Unstake => "unstake",
            ChainEventKind::Relock => "relock",
            ChainEventKind::Withdraw => "withdraw",
            ChainEventKind::RewardClaimed => "rewardClaimed",
            ChainEventKind::AllocationAdded => "allocationAdded",
            ChainEventKind::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "stake" => ChainEventKind::Stake,
            "unstake" => ChainEventKind::Unstake,
            "relock" => ChainEventKind::Relock,
            "withdraw" => ChainEventKind::Withdraw,
            "rewardClaimed" => ChainEventKind::RewardClaimed,
            "allocationAdded" => ChainEventKind::AllocationAdded,
            _ => ChainEventKind::Unknown,
        }
    }
}

impl core::fmt::Display for ChainEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw log as appended to the intake table. Identity is
/// `(block_number, tx_hash, log_index)`; rows are never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEvent {
    pub coords: EventCoords,
    pub address: H160,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
    pub kind: ChainEventKind,
}
