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

//! Conversions between column values and domain types. Every lossy
//! direction returns `StoreError::OutOfRange` instead of truncating.

use arena_primitives::{BlockNumber, LogIndex, SignedAmount};
use bigdecimal::BigDecimal;
use ethereum_types::{H160, H256, U256};

use crate::StoreError;

pub(crate) fn block_to_db(block: BlockNumber) -> Result<i64, StoreError> {
    i64::try_from(block).map_err(|_| StoreError::OutOfRange("block number"))
}

pub(crate) fn block_from_db(block: i64) -> Result<BlockNumber, StoreError> {
    BlockNumber::try_from(block).map_err(|_| StoreError::OutOfRange("block number"))
}

pub(crate) fn log_index_to_db(log_index: LogIndex) -> i32 {
    // Log indexes fit i32 on every chain this indexer targets.
    log_index as i32
}

pub(crate) fn amount_to_db(amount: U256) -> BigDecimal {
    arena_utils::num::u256_to_decimal(amount)
}

pub(crate) fn amount_from_db(amount: &BigDecimal) -> Result<U256, StoreError> {
    arena_utils::num::decimal_to_u256(amount).ok_or(StoreError::OutOfRange("unsigned amount"))
}

pub(crate) fn delta_to_db(delta: SignedAmount) -> BigDecimal {
    arena_utils::num::signed_to_decimal(delta)
}

pub(crate) fn delta_from_db(delta: &BigDecimal) -> Result<SignedAmount, StoreError> {
    arena_utils::num::decimal_to_signed(delta).ok_or(StoreError::OutOfRange("signed amount"))
}

pub(crate) fn h160_from_db(bytes: &[u8]) -> Result<H160, StoreError> {
    if bytes.len() != 20 {
        return Err(StoreError::OutOfRange("20-byte address"));
    }
    Ok(H160::from_slice(bytes))
}

pub(crate) fn h256_from_db(bytes: &[u8]) -> Result<H256, StoreError> {
    if bytes.len() != 32 {
        return Err(StoreError::OutOfRange("32-byte hash"));
    }
    Ok(H256::from_slice(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_round_trips() {
        let amount = U256::from(1_000u64);
        assert_eq!(amount_from_db(&amount_to_db(amount)).unwrap(), amount);
    }

    #[test]
    fn bad_byte_lengths_are_out_of_range() {
        assert!(matches!(
            h160_from_db(&[0u8; 19]),
            Err(StoreError::OutOfRange(_))
        ));
        assert!(matches!(
            h256_from_db(&[0u8; 31]),
            Err(StoreError::OutOfRange(_))
        ));
    }

    #[test]
    fn block_numbers_past_i64_are_rejected() {
        assert!(block_to_db(u64::MAX).is_err());
        assert!(block_from_db(-1).is_err());
        assert_eq!(block_from_db(block_to_db(17).unwrap()).unwrap(), 17);
    }
}
