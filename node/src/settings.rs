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

//! Layered node settings: a TOML file plus `ARENA_`-prefixed
//! environment overrides (`ARENA_DATABASE__URL` and friends).

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use arena_indexer::SchedulerConfig;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct ChainSettings {
    /// Address whose logs drive the stake machine.
    pub staking_contract: String,
    /// Address whose logs drive the claims reconciler.
    pub rewards_contract: String,
    /// Address whose inbound `claim(...)` calls are decoded.
    pub conviction_claims_contract: String,
    #[serde(default)]
    pub event_start_block: u64,
    #[serde(default)]
    pub transactions_start_block: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StreamSettings {
    /// Block stream endpoint.
    pub url: String,
    pub bearer_token: Option<String>,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_delay_ms() -> u64 {
    2_000
}

#[derive(Clone, Debug, Deserialize)]
pub struct IndexerSettings {
    /// Backoff between polls and after failed batches.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for IndexerSettings {
    fn default() -> Self {
        IndexerSettings {
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub chain: ChainSettings,
    pub stream: StreamSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub indexer: IndexerSettings,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("ARENA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building configuration")?
            .try_deserialize::<Settings>()
            .context("deserializing configuration")?;
        Ok(settings)
    }

    pub fn scheduler_config(&self) -> anyhow::Result<SchedulerConfig> {
        let address = |name: &str, value: &str| {
            arena_utils::hex::parse_address(value)
                .with_context(|| format!("parsing {} address {:?}", name, value))
        };
        Ok(SchedulerConfig {
            staking_contract: address("staking contract", &self.chain.staking_contract)?,
            rewards_contract: address("rewards contract", &self.chain.rewards_contract)?,
            conviction_claims_contract: address(
                "conviction claims contract",
                &self.chain.conviction_claims_contract,
            )?,
            event_start_block: self.chain.event_start_block,
            transactions_start_block: self.chain.transactions_start_block,
            delay: Duration::from_millis(self.indexer.delay_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        log_filter = "info,arena_dispatch=debug"

        [chain]
        staking_contract = "0x1111111111111111111111111111111111111111"
        rewards_contract = "0x2222222222222222222222222222222222222222"
        conviction_claims_contract = "0x3333333333333333333333333333333333333333"
        event_start_block = 1000

        [stream]
        url = "http://localhost:8545"
        bearer_token = "secret"

        [database]
        url = "postgres://localhost/arena"
    "#;

    fn parse(toml: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn parses_sample_settings_with_defaults() {
        let settings = parse(SAMPLE);
        assert_eq!(settings.chain.event_start_block, 1000);
        assert_eq!(settings.chain.transactions_start_block, 0);
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.indexer.delay_ms, 2_000);
        assert_eq!(settings.stream.bearer_token.as_deref(), Some("secret"));
    }

    #[test]
    fn builds_a_scheduler_config() {
        let settings = parse(SAMPLE);
        let config = settings.scheduler_config().unwrap();
        assert_eq!(
            config.staking_contract,
            arena_utils::hex::parse_address("0x1111111111111111111111111111111111111111")
                .unwrap()
        );
        assert_eq!(config.delay, Duration::from_millis(2_000));
    }

    #[test]
    fn rejects_a_bad_contract_address() {
        let mut settings = parse(SAMPLE);
        settings.chain.staking_contract = "0x1234".to_string();
        assert!(settings.scheduler_config().is_err());
    }
}
