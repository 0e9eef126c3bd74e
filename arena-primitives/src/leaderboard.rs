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

//! Read models served by the leaderboard metrics queries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::competition::CompetitionType;
use crate::{AgentId, CompetitionId};

/// One rating row of an agent for a competition type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentScore {
    pub agent_id: AgentId,
    pub competition_type: CompetitionType,
    pub mu: f64,
    pub sigma: f64,
    pub ordinal: f64,
    pub created_at: DateTime<Utc>,
}

/// Rank of an agent within its competition type. Ranks are dense row
/// numbers ordered by ordinal descending, older score first on ties.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentRank {
    pub agent_id: AgentId,
    pub competition_type: CompetitionType,
    pub ordinal: f64,
    pub rank: i64,
}

/// Generic per-agent counter row (competitions, trades, positions, votes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentCount {
    pub agent_id: AgentId,
    pub count: i64,
}

/// Best (lowest) final placement an agent ever reached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BestPlacement {
    pub agent_id: AgentId,
    pub competition_id: CompetitionId,
    pub placement: i32,
}

/// Best profit-and-loss over all of an agent's competitions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BestPnl {
    pub agent_id: AgentId,
    pub pnl: f64,
}

/// Sum of an agent's returns across competitions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TotalRoi {
    pub agent_id: AgentId,
    pub roi: f64,
}

/// Everything the bulk metrics call returns in one round trip per facet.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BulkAgentMetrics {
    pub agent_ranks: Vec<AgentRank>,
    pub competition_counts: Vec<AgentCount>,
    pub trade_counts: Vec<AgentCount>,
    pub position_counts: Vec<AgentCount>,
    pub best_placements: Vec<BestPlacement>,
    pub best_pnls: Vec<BestPnl>,
    pub total_rois: Vec<TotalRoi>,
    pub vote_counts: Vec<AgentCount>,
    pub all_agent_scores: Vec<AgentScore>,
}

/// Aggregate stats over one competition type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompetitionTypeStats {
    pub competition_type: CompetitionType,
    pub total_agents: i64,
    pub total_competitions: i64,
    pub total_trades: i64,
    pub total_positions: i64,
    pub total_votes: i64,
}

/// Platform-wide aggregate stats.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub total_agents: i64,
    pub total_users: i64,
    pub total_competitions: i64,
    pub total_trades: i64,
    pub total_votes: i64,
}
