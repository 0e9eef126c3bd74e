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

//! Conviction claims and their duration penalty schedule.

use chrono::{DateTime, Utc};
use ethereum_types::{H160, H256, U256};

use crate::BlockNumber;

/// Seconds in thirty days.
const MONTH_SECS: u64 = 2_592_000;

/// Lock duration to payout fraction. Claiming without a lock keeps a
/// tenth of the eligible amount; a full twelve-month lock keeps all of it.
const PENALTY_SCHEDULE: &[(u64, u64, u64)] = &[
    (0, 1, 10),
    (MONTH_SECS, 1, 5),
    (3 * MONTH_SECS, 2, 5),
    (6 * MONTH_SECS, 3, 5),
    (365 * 86_400, 1, 1),
];

/// Payout for `eligible` under a lock of `duration_secs`. `None` when
/// the duration is not on the schedule.
pub fn apply_penalty(eligible: U256, duration_secs: u64) -> Option<U256> {
    let (_, num, den) = PENALTY_SCHEDULE
        .iter()
        .find(|(duration, _, _)| *duration == duration_secs)?;
    let num = U256::from(*num);
    let den = U256::from(*den);
    // floor(eligible * num / den) without widening: the quotient part
    // scales exactly and the remainder part stays below den * num.
    let quotient = eligible / den;
    let remainder = eligible % den;
    Some(quotient * num + remainder * num / den)
}

/// A decoded `claim(...)` transaction, keyed by its transaction hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvictionClaim {
    pub tx_hash: H256,
    pub account: H160,
    pub season: u8,
    pub duration_secs: u64,
    pub eligible_amount: U256,
    pub claimed_amount: U256,
    pub block_number: BlockNumber,
    pub block_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_fractions() {
        let eligible = U256::from(10_000u64);
        assert_eq!(apply_penalty(eligible, 0), Some(U256::from(1_000u64)));
        assert_eq!(
            apply_penalty(eligible, 2_592_000),
            Some(U256::from(2_000u64))
        );
        assert_eq!(
            apply_penalty(eligible, 7_776_000),
            Some(U256::from(4_000u64))
        );
        assert_eq!(
            apply_penalty(eligible, 15_552_000),
            Some(U256::from(6_000u64))
        );
        assert_eq!(
            apply_penalty(eligible, 31_536_000),
            Some(U256::from(10_000u64))
        );
    }

    #[test]
    fn off_schedule_durations_are_rejected() {
        let eligible = U256::from(10_000u64);
        assert_eq!(apply_penalty(eligible, 1), None);
        assert_eq!(apply_penalty(eligible, 2_592_001), None);
        assert_eq!(apply_penalty(eligible, u64::MAX), None);
    }

    #[test]
    fn full_range_does_not_overflow() {
        // 2^256 - 1 at the 12 month tier pays out unchanged.
        assert_eq!(apply_penalty(U256::MAX, 31_536_000), Some(U256::MAX));
        // and scaled tiers round down.
        assert_eq!(
            apply_penalty(U256::from(9u64), 2_592_000),
            Some(U256::from(1u64))
        );
    }
}
