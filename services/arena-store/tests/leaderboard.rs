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

//! Leaderboard query scenarios against a real Postgres. Ignored by
//! default; run with a disposable database and `-- --ignored`.

use arena_primitives::competition::CompetitionType;
use arena_store::leaderboard::LeaderboardRepo;
use chrono::{TimeZone, Utc};
use sqlx::PgPool;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("set DATABASE_URL to a disposable postgres database");
    let pool = arena_store::connect(&url, 5).await.expect("connect");
    arena_store::migrate(&pool).await.expect("migrate");
    pool
}

async fn seed(pool: &PgPool) {
    sqlx::query(
        "INSERT INTO users (id) VALUES ('lb-owner') ON CONFLICT (id) DO NOTHING",
    )
    .execute(pool)
    .await
    .unwrap();

    for agent in ["lb-a1", "lb-a2", "lb-a3"] {
        sqlx::query(
            "INSERT INTO agents (id, owner_id, status) VALUES ($1, 'lb-owner', 'active') \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(agent)
        .execute(pool)
        .await
        .unwrap();
    }

    sqlx::query("DELETE FROM agent_scores WHERE agent_id LIKE 'lb-%'")
        .execute(pool)
        .await
        .unwrap();

    let insert = |agent: &'static str, ordinal: f64, created_secs: i64| {
        let pool = pool.clone();
        async move {
            sqlx::query(
                "INSERT INTO agent_scores (agent_id, type, mu, sigma, ordinal, created_at) \
                 VALUES ($1, 'trading', 25.0, 8.0, $2, $3)",
            )
            .bind(agent)
            .bind(ordinal)
            .bind(Utc.timestamp_opt(created_secs, 0).unwrap())
            .execute(&pool)
            .await
            .unwrap();
        }
    };

    // lb-a2 has an older, higher score that a newer one supersedes.
    insert("lb-a2", 200.0, 1_000).await;
    insert("lb-a2", 100.0, 3_000).await;
    // lb-a1 ties lb-a2 on ordinal with an older latest score.
    insert("lb-a1", 100.0, 2_000).await;
    insert("lb-a3", 50.0, 2_500).await;
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migratable postgres"]
async fn ranks_use_latest_scores_and_break_ties_by_age() {
    let pool = test_pool().await;
    seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    let ids = vec![
        "lb-a1".to_string(),
        "lb-a2".to_string(),
        "lb-a3".to_string(),
    ];
    let metrics = LeaderboardRepo::get_bulk_agent_metrics(&mut conn, &ids)
        .await
        .unwrap();

    let rank_of = |agent: &str| {
        metrics
            .agent_ranks
            .iter()
            .find(|rank| rank.agent_id == agent && rank.competition_type == CompetitionType::Trading)
            .map(|rank| rank.rank)
    };

    // Both tie at 100; lb-a1's latest score is older, so it ranks first.
    assert_eq!(rank_of("lb-a1"), Some(1));
    assert_eq!(rank_of("lb-a2"), Some(2));
    assert_eq!(rank_of("lb-a3"), Some(3));

    // Latest-score selection: lb-a2's superseded 200 is gone.
    let a2_scores: Vec<_> = metrics
        .all_agent_scores
        .iter()
        .filter(|score| score.agent_id == "lb-a2")
        .collect();
    assert_eq!(a2_scores.len(), 1);
    assert_eq!(a2_scores[0].ordinal, 100.0);

    // Determinism across invocations.
    let again = LeaderboardRepo::get_bulk_agent_metrics(&mut conn, &ids)
        .await
        .unwrap();
    let pairs = |m: &arena_primitives::leaderboard::BulkAgentMetrics| {
        m.agent_ranks
            .iter()
            .map(|r| (r.agent_id.clone(), r.rank))
            .collect::<Vec<_>>()
    };
    assert_eq!(pairs(&metrics), pairs(&again));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migratable postgres"]
async fn empty_agent_set_yields_empty_facets() {
    let pool = test_pool().await;
    let mut conn = pool.acquire().await.unwrap();

    let metrics = LeaderboardRepo::get_bulk_agent_metrics(&mut conn, &[])
        .await
        .unwrap();
    assert!(metrics.agent_ranks.is_empty());
    assert!(metrics.competition_counts.is_empty());
    assert!(metrics.all_agent_scores.is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migratable postgres"]
async fn global_counters_are_consistent() {
    let pool = test_pool().await;
    seed(&pool).await;
    let mut conn = pool.acquire().await.unwrap();

    let ranked = LeaderboardRepo::get_total_ranked_agents(&mut conn)
        .await
        .unwrap();
    assert!(ranked >= 3);

    let active = LeaderboardRepo::get_total_active_agents(&mut conn)
        .await
        .unwrap();
    assert!(active >= 3);

    let global = LeaderboardRepo::get_global_stats(&mut conn).await.unwrap();
    assert!(global.total_agents >= 3);
    assert!(global.total_users >= 1);

    let trading = LeaderboardRepo::get_global_agent_metrics_for_type(
        &mut conn,
        CompetitionType::Trading,
    )
    .await
    .unwrap();
    assert!(trading.len() >= 3);
    // Ranks are dense starting at one.
    assert_eq!(trading[0].rank, 1);
}
