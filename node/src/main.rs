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

//! Process boot: settings, logger, database pool and the two indexing
//! loops, with signal-driven graceful shutdown.

#![forbid(unsafe_code)]

mod cli;
mod settings;

use std::sync::Arc;

use anyhow::Context;
use arena_indexer::claims::ClaimsProcessor;
use arena_indexer::{Dispatcher, Scheduler};
use arena_primitives::boost::NoAward;
use arena_stream::{StreamClient, StreamConfig};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::settings::Settings;

const LOG_TARGET: &str = "arena_node";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    env_logger::Builder::new()
        .parse_filters(&settings.log_filter)
        .init();

    let pool = arena_store::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("connecting to the database")?;
    arena_store::migrate(&pool)
        .await
        .context("applying migrations")?;

    if cli.migrate_only {
        log::info!(target: LOG_TARGET, "migrations applied, exiting");
        return Ok(());
    }

    let scheduler_config = settings.scheduler_config()?;
    let stream = StreamClient::new(StreamConfig::new(
        settings.stream.url.clone(),
        settings.stream.bearer_token.clone(),
    ))
    .context("building the stream client")?;
    if !stream.healthy().await {
        log::warn!(
            target: LOG_TARGET,
            "stream endpoint {} is not answering yet, the loops will keep retrying",
            settings.stream.url
        );
    }

    // The boost formula is owned by the platform's award service; the
    // indexer runs without one unless wired differently at deploy time.
    let dispatcher = Dispatcher::new(pool.clone(), Arc::new(NoAward));
    let claims = ClaimsProcessor::new(pool.clone());

    let shutdown = CancellationToken::new();
    let scheduler = Arc::new(Scheduler::new(
        stream,
        pool,
        dispatcher,
        claims,
        scheduler_config,
        shutdown.clone(),
    ));

    let events_loop = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_events().await })
    };
    let transactions_loop = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run_transactions().await })
    };

    shutdown_signal().await?;
    log::info!(target: LOG_TARGET, "shutdown requested, draining loops");
    shutdown.cancel();

    let (events, transactions) = tokio::try_join!(events_loop, transactions_loop)
        .context("joining indexing loops")?;
    events.context("events loop failed")?;
    transactions.context("transactions loop failed")?;

    log::info!(target: LOG_TARGET, "arena-node stopped cleanly");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("listening for ctrl-c")?,
        _ = sigterm.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await.context("listening for ctrl-c")
}
