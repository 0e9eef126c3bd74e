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

//! # Arena Primitives
//!
//! Shared domain types of the Arena on-chain indexing and boost/stake
//! accounting core. Everything here is plain data: chain coordinates,
//! stake and boost records, reward linkage rows, the conviction-claim
//! penalty schedule and the leaderboard read models. Services depend on
//! this crate instead of on each other.

#![forbid(unsafe_code)]

pub mod boost;
pub mod chain;
pub mod claims;
pub mod competition;
pub mod leaderboard;
pub mod rewards;
pub mod signed_amount;
pub mod stake;

pub use chain::{ChainEvent, ChainEventKind, EventCoords};
pub use signed_amount::SignedAmount;

/// Chain block height.
pub type BlockNumber = u64;

/// Position of a log inside its block.
pub type LogIndex = u32;

/// Opaque platform user identifier.
pub type UserId = String;

/// Opaque competition identifier.
pub type CompetitionId = String;

/// Opaque agent identifier.
pub type AgentId = String;
