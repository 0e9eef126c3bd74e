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

//! Conviction-claims transaction pipeline: decode `claim(...)` calls,
//! apply the duration penalty schedule and record one row per
//! transaction hash.

use arena_primitives::claims::{apply_penalty, ConvictionClaim};
use arena_store::claims::ConvictionClaimsRepo;
use arena_store::StoreError;
use arena_stream::TxRecord;
use sqlx::PgPool;

use crate::decode::{decode_claim, DecodeError};
use crate::dispatch::{BatchStats, Outcome};
use crate::IndexerError;

const LOG_TARGET: &str = "arena_claims";

pub struct ClaimsProcessor {
    pool: PgPool,
}

impl ClaimsProcessor {
    pub fn new(pool: PgPool) -> Self {
        ClaimsProcessor { pool }
    }

    /// Processes a poll's worth of claim transactions.
    pub async fn process_batch(
        &self,
        transactions: &[TxRecord],
    ) -> Result<BatchStats, IndexerError> {
        let mut stats = BatchStats::default();
        if transactions.is_empty() {
            return Ok(stats);
        }

        for record in transactions {
            let outcome = self.process_transaction(record).await?;
            match outcome {
                Outcome::Applied => stats.applied += 1,
                Outcome::Duplicate => stats.duplicates += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
        }

        log::info!(
            target: LOG_TARGET,
            "claims batch done: {} applied, {} duplicates, {} skipped",
            stats.applied,
            stats.duplicates,
            stats.skipped
        );
        Ok(stats)
    }

    /// Records one `claim(...)` transaction at most once, keyed by its
    /// transaction hash.
    pub async fn process_transaction(&self, record: &TxRecord) -> Result<Outcome, IndexerError> {
        let call = match decode_claim(record) {
            Ok(call) => call,
            Err(DecodeError::NotAClaimCall) => {
                log::debug!(
                    target: LOG_TARGET,
                    "transaction {:?} is not a claim call, skipping",
                    record.tx_hash
                );
                return Ok(Outcome::Skipped);
            }
            Err(err) => {
                log::warn!(
                    target: LOG_TARGET,
                    "skipping undecodable claim transaction {:?}: {}",
                    record.tx_hash,
                    err
                );
                return Ok(Outcome::Skipped);
            }
        };

        let Some(claimed_amount) = apply_penalty(call.amount, call.duration_secs) else {
            log::warn!(
                target: LOG_TARGET,
                "claim {:?} has invalid lock duration {}s, skipping",
                record.tx_hash,
                call.duration_secs
            );
            return Ok(Outcome::Skipped);
        };

        let Some(block_timestamp) = arena_utils::time::from_unix_secs(record.block_timestamp)
        else {
            log::warn!(
                target: LOG_TARGET,
                "claim {:?} carries an out-of-range block timestamp {}, skipping",
                record.tx_hash,
                record.block_timestamp
            );
            return Ok(Outcome::Skipped);
        };

        let mut conn = self.pool.acquire().await.map_err(StoreError::from)?;

        if ConvictionClaimsRepo::is_present(&mut conn, record.tx_hash).await? {
            log::debug!(
                target: LOG_TARGET,
                "claim {:?} already recorded",
                record.tx_hash
            );
            return Ok(Outcome::Duplicate);
        }

        let claim = ConvictionClaim {
            tx_hash: record.tx_hash,
            account: call.to,
            season: call.season,
            duration_secs: call.duration_secs,
            eligible_amount: call.amount,
            claimed_amount,
            block_number: record.block_number,
            block_timestamp,
        };

        let inserted = ConvictionClaimsRepo::save(&mut conn, &claim).await?;
        if !inserted {
            log::debug!(
                target: LOG_TARGET,
                "lost insert race for claim {:?}",
                record.tx_hash
            );
            return Ok(Outcome::Duplicate);
        }

        log::info!(
            target: LOG_TARGET,
            "recorded conviction claim {:?}: account {:?} season {} eligible {} claimed {}",
            claim.tx_hash,
            claim.account,
            claim.season,
            claim.eligible_amount,
            claim.claimed_amount
        );
        Ok(Outcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::{H160, H256};
    use hex_literal::hex;

    fn processor() -> ClaimsProcessor {
        // Never connected; the records below are rejected before any
        // database work starts.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        ClaimsProcessor::new(pool)
    }

    fn record(input: Vec<u8>) -> TxRecord {
        TxRecord {
            block_number: 42,
            block_timestamp: 1_700_000_000,
            tx_hash: H256::repeat_byte(0xc7),
            from: H160::repeat_byte(0x01),
            to: H160::repeat_byte(0x02),
            input,
        }
    }

    #[tokio::test]
    async fn foreign_selectors_are_skipped() {
        let outcome = processor()
            .process_transaction(&record(hex!("deadbeef").to_vec()))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
    }

    #[tokio::test]
    async fn off_schedule_durations_are_skipped() {
        // A well-formed claim with duration 123, which is not on the
        // penalty schedule.
        let input = hex!(
            "2ac96e2a\
             00000000000000000000000000000000000000000000000000000000000000c0\
             000000000000000000000000ffffffffffffffffffffffffffffffffffffffff\
             0000000000000000000000000000000000000000000000000000000000002710\
             0000000000000000000000000000000000000000000000000000000000000001\
             000000000000000000000000000000000000000000000000000000000000007b\
             00000000000000000000000000000000000000000000000000000000000000e0\
             0000000000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000"
        )
        .to_vec();

        let outcome = processor()
            .process_transaction(&record(input))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
    }
}
