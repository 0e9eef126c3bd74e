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

//! # Arena Store
//!
//! Relational state of the indexing core: schema, migrations and
//! repositories. Repository methods take a `&mut PgConnection` so a
//! caller can compose several of them inside one transaction; the
//! dispatcher relies on that to keep domain mutations and the chain
//! event append atomic.

#![forbid(unsafe_code)]

pub mod boost;
pub mod claims;
mod codec;
pub mod competitions;
pub mod error;
pub mod events;
pub mod facade;
pub mod leaderboard;
pub mod rewards;
pub mod stakes;

pub use error::StoreError;
pub use facade::Store;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const LOG_TARGET: &str = "arena_store";

/// Connects a pool sized for the two indexing loops plus request
/// handlers sharing it.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Applies the embedded migrations. Run once at boot before any loop
/// starts.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| StoreError::Migration(err.to_string()))?;
    log::info!(target: LOG_TARGET, "database migrations are up to date");
    Ok(())
}
