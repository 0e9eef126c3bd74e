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

//! Leaderboard metrics over agent scores and competition results.
//! Read-only; ranks are computed in SQL with a window pass so ties
//! break deterministically in favor of the older score.

use arena_primitives::competition::CompetitionType;
use arena_primitives::leaderboard::{
    AgentCount, AgentRank, AgentScore, BestPlacement, BestPnl, BulkAgentMetrics,
    CompetitionTypeStats, GlobalStats, TotalRoi,
};
use arena_primitives::AgentId;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::StoreError;

/// Latest score per `(agent, type)`; the window pass ranks these.
const LATEST_SCORES: &str = "SELECT DISTINCT ON (agent_id, type) \
         agent_id, type, mu, sigma, ordinal, created_at \
     FROM agent_scores \
     ORDER BY agent_id, type, created_at DESC";

const RANKED_SCORES: &str = "SELECT agent_id, type, ordinal, \
         ROW_NUMBER() OVER (PARTITION BY type \
                            ORDER BY ordinal DESC, created_at ASC) AS rank \
     FROM latest";

#[derive(sqlx::FromRow)]
struct RankRow {
    agent_id: String,
    #[sqlx(rename = "type")]
    competition_type: String,
    ordinal: f64,
    rank: i64,
}

impl From<RankRow> for AgentRank {
    fn from(row: RankRow) -> Self {
        AgentRank {
            agent_id: row.agent_id,
            competition_type: CompetitionType::from_str(&row.competition_type),
            ordinal: row.ordinal,
            rank: row.rank,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    agent_id: String,
    #[sqlx(rename = "type")]
    competition_type: String,
    mu: f64,
    sigma: f64,
    ordinal: f64,
    created_at: DateTime<Utc>,
}

impl From<ScoreRow> for AgentScore {
    fn from(row: ScoreRow) -> Self {
        AgentScore {
            agent_id: row.agent_id,
            competition_type: CompetitionType::from_str(&row.competition_type),
            mu: row.mu,
            sigma: row.sigma,
            ordinal: row.ordinal,
            created_at: row.created_at,
        }
    }
}

pub struct LeaderboardRepo;

impl LeaderboardRepo {
    /// All per-agent metrics facets in one call. An empty id set yields
    /// empty facets without touching the database.
    pub async fn get_bulk_agent_metrics(
        conn: &mut PgConnection,
        agent_ids: &[AgentId],
    ) -> Result<BulkAgentMetrics, StoreError> {
        if agent_ids.is_empty() {
            return Ok(BulkAgentMetrics::default());
        }

        let agent_ranks = Self::ranks_for(conn, agent_ids).await?;
        let competition_counts =
            Self::counts_for(conn, "competition_agents", agent_ids).await?;
        let trade_counts = Self::counts_for(conn, "trades", agent_ids).await?;
        let position_counts = Self::counts_for(conn, "positions", agent_ids).await?;
        let vote_counts = Self::counts_for(conn, "votes", agent_ids).await?;

        let best_placements: Vec<(String, String, i32)> = sqlx::query_as(
            "SELECT DISTINCT ON (agent_id) agent_id, competition_id, placement \
             FROM competition_agents \
             WHERE agent_id = ANY($1) AND placement IS NOT NULL \
             ORDER BY agent_id, placement ASC",
        )
        .bind(agent_ids)
        .fetch_all(&mut *conn)
        .await?;

        let best_pnls: Vec<(String, f64)> = sqlx::query_as(
            "SELECT agent_id, MAX(pnl) FROM competition_agents \
             WHERE agent_id = ANY($1) AND pnl IS NOT NULL \
             GROUP BY agent_id ORDER BY agent_id",
        )
        .bind(agent_ids)
        .fetch_all(&mut *conn)
        .await?;

        let total_rois: Vec<(String, f64)> = sqlx::query_as(
            "SELECT agent_id, SUM(roi) FROM competition_agents \
             WHERE agent_id = ANY($1) AND roi IS NOT NULL \
             GROUP BY agent_id ORDER BY agent_id",
        )
        .bind(agent_ids)
        .fetch_all(&mut *conn)
        .await?;

        let all_scores_sql = format!(
            "WITH latest AS ({}) \
             SELECT agent_id, type, mu, sigma, ordinal, created_at FROM latest \
             WHERE agent_id = ANY($1) ORDER BY agent_id, type",
            LATEST_SCORES
        );
        let all_agent_scores: Vec<ScoreRow> = sqlx::query_as(&all_scores_sql)
            .bind(agent_ids)
            .fetch_all(&mut *conn)
            .await?;

        Ok(BulkAgentMetrics {
            agent_ranks,
            competition_counts,
            trade_counts,
            position_counts,
            best_placements: best_placements
                .into_iter()
                .map(|(agent_id, competition_id, placement)| BestPlacement {
                    agent_id,
                    competition_id,
                    placement,
                })
                .collect(),
            best_pnls: best_pnls
                .into_iter()
                .map(|(agent_id, pnl)| BestPnl { agent_id, pnl })
                .collect(),
            total_rois: total_rois
                .into_iter()
                .map(|(agent_id, roi)| TotalRoi { agent_id, roi })
                .collect(),
            vote_counts,
            all_agent_scores: all_agent_scores.into_iter().map(AgentScore::from).collect(),
        })
    }

    /// Ranks of every agent within one competition type.
    pub async fn get_global_agent_metrics_for_type(
        conn: &mut PgConnection,
        competition_type: CompetitionType,
    ) -> Result<Vec<AgentRank>, StoreError> {
        let sql = format!(
            "WITH latest AS ({}), ranked AS ({}) \
             SELECT agent_id, type, ordinal, rank FROM ranked \
             WHERE type = $1 ORDER BY rank",
            LATEST_SCORES, RANKED_SCORES
        );
        let rows: Vec<RankRow> = sqlx::query_as(&sql)
            .bind(competition_type.as_str())
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(AgentRank::from).collect())
    }

    pub async fn get_stats_for_competition_type(
        conn: &mut PgConnection,
        competition_type: CompetitionType,
    ) -> Result<CompetitionTypeStats, StoreError> {
        let (total_agents, total_competitions, total_trades, total_positions, total_votes): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                 (SELECT COUNT(DISTINCT ca.agent_id) FROM competition_agents ca \
                      JOIN competitions c ON c.id = ca.competition_id WHERE c.type = $1), \
                 (SELECT COUNT(*) FROM competitions WHERE type = $1), \
                 (SELECT COUNT(*) FROM trades t \
                      JOIN competitions c ON c.id = t.competition_id WHERE c.type = $1), \
                 (SELECT COUNT(*) FROM positions p \
                      JOIN competitions c ON c.id = p.competition_id WHERE c.type = $1), \
                 (SELECT COUNT(*) FROM votes v \
                      JOIN competitions c ON c.id = v.competition_id WHERE c.type = $1)",
        )
        .bind(competition_type.as_str())
        .fetch_one(&mut *conn)
        .await?;

        Ok(CompetitionTypeStats {
            competition_type,
            total_agents,
            total_competitions,
            total_trades,
            total_positions,
            total_votes,
        })
    }

    pub async fn get_global_stats(conn: &mut PgConnection) -> Result<GlobalStats, StoreError> {
        let (total_agents, total_users, total_competitions, total_trades, total_votes): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                 (SELECT COUNT(*) FROM agents), \
                 (SELECT COUNT(*) FROM users), \
                 (SELECT COUNT(*) FROM competitions), \
                 (SELECT COUNT(*) FROM trades), \
                 (SELECT COUNT(*) FROM votes)",
        )
        .fetch_one(&mut *conn)
        .await?;

        Ok(GlobalStats {
            total_agents,
            total_users,
            total_competitions,
            total_trades,
            total_votes,
        })
    }

    /// Agents that hold at least one score row.
    pub async fn get_total_ranked_agents(conn: &mut PgConnection) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT agent_id) FROM agent_scores")
            .fetch_one(&mut *conn)
            .await?;
        Ok(total)
    }

    pub async fn get_total_active_agents(conn: &mut PgConnection) -> Result<i64, StoreError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM agents WHERE status = 'active'")
                .fetch_one(&mut *conn)
                .await?;
        Ok(total)
    }

    async fn ranks_for(
        conn: &mut PgConnection,
        agent_ids: &[AgentId],
    ) -> Result<Vec<AgentRank>, StoreError> {
        let sql = format!(
            "WITH latest AS ({}), ranked AS ({}) \
             SELECT agent_id, type, ordinal, rank FROM ranked \
             WHERE agent_id = ANY($1) ORDER BY type, rank",
            LATEST_SCORES, RANKED_SCORES
        );
        let rows: Vec<RankRow> = sqlx::query_as(&sql)
            .bind(agent_ids)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(AgentRank::from).collect())
    }

    async fn counts_for(
        conn: &mut PgConnection,
        table: &str,
        agent_ids: &[AgentId],
    ) -> Result<Vec<AgentCount>, StoreError> {
        // `table` is one of four compile-time names, never user input.
        let sql = format!(
            "SELECT agent_id, COUNT(*) FROM {} \
             WHERE agent_id = ANY($1) GROUP BY agent_id ORDER BY agent_id",
            table
        );
        let rows: Vec<(String, i64)> = sqlx::query_as(&sql)
            .bind(agent_ids)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(agent_id, count)| AgentCount { agent_id, count })
            .collect())
    }
}
