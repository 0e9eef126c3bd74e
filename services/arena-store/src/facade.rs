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

//! Pool-level entry points for the other platform services. Each call
//! owns its connection and, where several statements must land
//! together, its transaction. The indexer's dispatcher does not come
//! through here; it composes repositories on its own transaction.

use arena_primitives::boost::{BoostBalance, BoostCredit, MergedBalance};
use arena_primitives::competition::CompetitionType;
use arena_primitives::leaderboard::{
    AgentRank, BulkAgentMetrics, CompetitionTypeStats, GlobalStats,
};
use arena_primitives::stake::Stake;
use arena_primitives::AgentId;
use ethereum_types::U256;
use sqlx::{Connection, PgPool};

use crate::boost::BoostRepo;
use crate::leaderboard::LeaderboardRepo;
use crate::stakes::StakesRepo;
use crate::StoreError;

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Store { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_stake(&self, stake_id: U256) -> Result<Option<Stake>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        StakesRepo::find_by_id(&mut conn, stake_id).await
    }

    /// Credits boost in a transaction of its own.
    pub async fn boost_increase(&self, credit: &BoostCredit) -> Result<BoostBalance, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        let balance = BoostRepo::increase(&mut tx, credit).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Debits boost in a transaction of its own. `InsufficientBoost`
    /// propagates to the caller.
    pub async fn boost_decrease(&self, credit: &BoostCredit) -> Result<BoostBalance, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        let balance = BoostRepo::decrease(&mut tx, credit).await?;
        tx.commit().await?;
        Ok(balance)
    }

    pub async fn user_boost_balance(
        &self,
        user_id: &str,
        competition_id: &str,
    ) -> Result<U256, StoreError> {
        let mut conn = self.pool.acquire().await?;
        BoostRepo::user_boost_balance(&mut conn, user_id, competition_id).await
    }

    /// Reparents every boost balance of `from_user` onto `to_user`.
    /// All-or-nothing; partial merges cannot be observed.
    pub async fn merge_boost(
        &self,
        from_user: &str,
        to_user: &str,
    ) -> Result<Vec<MergedBalance>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;
        let merged = BoostRepo::merge_boost(&mut tx, from_user, to_user).await?;
        tx.commit().await?;
        Ok(merged)
    }

    pub async fn bulk_agent_metrics(
        &self,
        agent_ids: &[AgentId],
    ) -> Result<BulkAgentMetrics, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_bulk_agent_metrics(&mut conn, agent_ids).await
    }

    pub async fn global_agent_metrics_for_type(
        &self,
        competition_type: CompetitionType,
    ) -> Result<Vec<AgentRank>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_global_agent_metrics_for_type(&mut conn, competition_type).await
    }

    pub async fn stats_for_competition_type(
        &self,
        competition_type: CompetitionType,
    ) -> Result<CompetitionTypeStats, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_stats_for_competition_type(&mut conn, competition_type).await
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_global_stats(&mut conn).await
    }

    pub async fn total_ranked_agents(&self) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_total_ranked_agents(&mut conn).await
    }

    pub async fn total_active_agents(&self) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        LeaderboardRepo::get_total_active_agents(&mut conn).await
    }
}
