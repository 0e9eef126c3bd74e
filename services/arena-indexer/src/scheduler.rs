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

//! The two long-running loops. Each resumes from its persisted cursor,
//! polls one batch, processes it, and only then advances; a failed
//! batch is retried after the polling delay with the cursor unchanged,
//! so the cursor never passes an unprocessed log.

use std::time::Duration;

use arena_primitives::BlockNumber;
use arena_store::claims::ConvictionClaimsRepo;
use arena_store::events::EventsRepo;
use arena_store::StoreError;
use arena_stream::{LogFilter, StreamClient, StreamError, StreamQuery, TxFilter};
use async_trait::async_trait;
use ethereum_types::H160;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::claims::ClaimsProcessor;
use crate::dispatch::Dispatcher;
use crate::{abi, IndexerError};

const LOG_TARGET: &str = "arena_scheduler";

#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Contract whose logs drive the stake machine.
    pub staking_contract: H160,
    /// Contract whose logs drive the claims reconciler.
    pub rewards_contract: H160,
    /// Contract whose inbound `claim(...)` calls are decoded.
    pub conviction_claims_contract: H160,
    /// Fallback cursor for the events loop.
    pub event_start_block: BlockNumber,
    /// Fallback cursor for the transactions loop.
    pub transactions_start_block: BlockNumber,
    /// Pause between polls and after failed batches.
    pub delay: Duration,
}

/// Polling seam so the loops can be driven by a scripted stream in
/// tests. The production impl is the HTTP client.
#[async_trait]
pub trait BlockStream: Send + Sync {
    async fn poll(
        &self,
        query: &StreamQuery,
    ) -> Result<arena_stream::QueryResponse, StreamError>;
}

#[async_trait]
impl BlockStream for StreamClient {
    async fn poll(
        &self,
        query: &StreamQuery,
    ) -> Result<arena_stream::QueryResponse, StreamError> {
        StreamClient::poll(self, query).await
    }
}

pub struct Scheduler<S> {
    stream: S,
    pool: PgPool,
    dispatcher: Dispatcher,
    claims: ClaimsProcessor,
    config: SchedulerConfig,
    shutdown: CancellationToken,
}

impl<S: BlockStream> Scheduler<S> {
    pub fn new(
        stream: S,
        pool: PgPool,
        dispatcher: Dispatcher,
        claims: ClaimsProcessor,
        config: SchedulerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Scheduler {
            stream,
            pool,
            dispatcher,
            claims,
            config,
            shutdown,
        }
    }

    /// Events cursor: the last ingested block or the configured start,
    /// whichever is later.
    pub async fn resume_events_cursor(&self) -> Result<BlockNumber, IndexerError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;
        let last =
            EventsRepo::last_block_number(&mut conn, self.config.event_start_block).await?;
        Ok(last.max(self.config.event_start_block))
    }

    pub async fn resume_transactions_cursor(&self) -> Result<BlockNumber, IndexerError> {
        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;
        let last = ConvictionClaimsRepo::last_block_number(
            &mut conn,
            self.config.transactions_start_block,
        )
        .await?;
        Ok(last.max(self.config.transactions_start_block))
    }

    /// Runs the log loop until shutdown.
    pub async fn run_events(&self) -> Result<(), IndexerError> {
        let from_block = self.resume_events_cursor().await?;
        self.run_events_from(from_block).await;
        Ok(())
    }

    /// Runs the claim-transactions loop until shutdown.
    pub async fn run_transactions(&self) -> Result<(), IndexerError> {
        let from_block = self.resume_transactions_cursor().await?;
        self.run_transactions_from(from_block).await;
        Ok(())
    }

    pub async fn run_events_from(&self, mut from_block: BlockNumber) {
        log::info!(
            target: LOG_TARGET,
            "events loop starting at block {}",
            from_block
        );

        let mut topics = abi::staking_topics();
        topics.extend(abi::rewards_topics());
        let filter = LogFilter::new(
            vec![self.config.staking_contract, self.config.rewards_contract],
            topics,
        );

        while !self.shutdown.is_cancelled() {
            let query = StreamQuery::logs(from_block, filter.clone());
            match self.stream.poll(&query).await {
                Ok(batch) => match self.dispatcher.process_batch(&batch.logs).await {
                    Ok(_) => from_block = batch.next_block,
                    Err(err) => log::error!(
                        target: LOG_TARGET,
                        "event batch at block {} failed (retryable: {}): {}",
                        from_block,
                        err.is_retryable(),
                        err
                    ),
                },
                Err(err) => log::warn!(
                    target: LOG_TARGET,
                    "event poll at block {} failed: {}",
                    from_block,
                    err
                ),
            }
            self.idle().await;
        }

        log::info!(
            target: LOG_TARGET,
            "events loop stopped at block {}",
            from_block
        );
    }

    pub async fn run_transactions_from(&self, mut from_block: BlockNumber) {
        log::info!(
            target: LOG_TARGET,
            "transactions loop starting at block {}",
            from_block
        );

        let filter = TxFilter::new(
            vec![self.config.conviction_claims_contract],
            vec![abi::CLAIM_SELECTOR],
        );

        while !self.shutdown.is_cancelled() {
            let query = StreamQuery::transactions(from_block, filter.clone());
            match self.stream.poll(&query).await {
                Ok(batch) => match self.claims.process_batch(&batch.transactions).await {
                    Ok(_) => from_block = batch.next_block,
                    Err(err) => log::error!(
                        target: LOG_TARGET,
                        "claims batch at block {} failed (retryable: {}): {}",
                        from_block,
                        err.is_retryable(),
                        err
                    ),
                },
                Err(err) => log::warn!(
                    target: LOG_TARGET,
                    "claims poll at block {} failed: {}",
                    from_block,
                    err
                ),
            }
            self.idle().await;
        }

        log::info!(
            target: LOG_TARGET,
            "transactions loop stopped at block {}",
            from_block
        );
    }

    /// Delay between polls, cut short by shutdown.
    async fn idle(&self) {
        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            _ = tokio::time::sleep(self.config.delay) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_primitives::boost::NoAward;
    use arena_stream::QueryResponse;
    use std::sync::{Arc, Mutex};

    /// Scripted stream: hands out empty batches with increasing
    /// cursors, records every requested `from_block`, and cancels the
    /// token when the script runs out.
    struct ScriptedStream {
        next_blocks: Mutex<Vec<BlockNumber>>,
        seen_from: Mutex<Vec<BlockNumber>>,
        shutdown: CancellationToken,
    }

    #[async_trait]
    impl BlockStream for ScriptedStream {
        async fn poll(&self, query: &StreamQuery) -> Result<QueryResponse, StreamError> {
            self.seen_from.lock().unwrap().push(query.from_block);
            let mut script = self.next_blocks.lock().unwrap();
            if script.is_empty() {
                self.shutdown.cancel();
                return Err(StreamError::UpstreamUnavailable("script over".into()));
            }
            let next_block = script.remove(0);
            Ok(QueryResponse {
                next_block,
                blocks: vec![],
                logs: vec![],
                transactions: vec![],
            })
        }
    }

    fn lazy_pool() -> PgPool {
        // Never actually connected; empty batches touch no database.
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool")
    }

    fn scheduler(shutdown: CancellationToken, script: Vec<BlockNumber>) -> Scheduler<ScriptedStream> {
        let pool = lazy_pool();
        let stream = ScriptedStream {
            next_blocks: Mutex::new(script),
            seen_from: Mutex::new(vec![]),
            shutdown: shutdown.clone(),
        };
        let config = SchedulerConfig {
            staking_contract: H160::repeat_byte(0x11),
            rewards_contract: H160::repeat_byte(0x12),
            conviction_claims_contract: H160::repeat_byte(0x13),
            event_start_block: 0,
            transactions_start_block: 0,
            delay: Duration::from_millis(1),
        };
        Scheduler::new(
            stream,
            pool.clone(),
            Dispatcher::new(pool.clone(), Arc::new(NoAward)),
            ClaimsProcessor::new(pool),
            config,
            shutdown,
        )
    }

    #[tokio::test]
    async fn events_loop_advances_cursor_batch_by_batch() {
        let shutdown = CancellationToken::new();
        let scheduler = scheduler(shutdown, vec![6, 9, 15]);

        scheduler.run_events_from(5).await;

        let seen = scheduler.stream.seen_from.lock().unwrap().clone();
        assert_eq!(seen, vec![5, 6, 9, 15]);
    }

    #[tokio::test]
    async fn transactions_loop_advances_cursor_batch_by_batch() {
        let shutdown = CancellationToken::new();
        let scheduler = scheduler(shutdown, vec![101, 200]);

        scheduler.run_transactions_from(100).await;

        let seen = scheduler.stream.seen_from.lock().unwrap().clone();
        assert_eq!(seen, vec![100, 101, 200]);
    }

    #[tokio::test]
    async fn cancelled_loop_exits_without_polling() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let scheduler = scheduler(shutdown, vec![6]);

        scheduler.run_events_from(5).await;

        assert!(scheduler.stream.seen_from.lock().unwrap().is_empty());
    }
}
