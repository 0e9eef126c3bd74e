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

//! 256-bit integers at the SQL edge. Amounts live as `U256` in the
//! domain and as `NUMERIC(78,0)` in the database; deltas carry a sign.

use arena_primitives::SignedAmount;
use bigdecimal::num_bigint::{BigInt, Sign, ToBigInt};
use bigdecimal::BigDecimal;
use ethereum_types::U256;

/// Unsigned 256-bit value as an exact decimal.
pub fn u256_to_decimal(value: U256) -> BigDecimal {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    BigDecimal::from(BigInt::from_bytes_be(Sign::Plus, &bytes))
}

/// Exact decimal back into `U256`. `None` for fractional, negative or
/// out-of-range values.
pub fn decimal_to_u256(value: &BigDecimal) -> Option<U256> {
    if !value.is_integer() {
        return None;
    }
    let int = value.to_bigint()?;
    let (sign, bytes) = int.to_bytes_be();
    if sign == Sign::Minus || bytes.len() > 32 {
        return None;
    }
    Some(U256::from_big_endian(&bytes))
}

/// Signed journal delta as an exact decimal.
pub fn signed_to_decimal(value: SignedAmount) -> BigDecimal {
    let magnitude = u256_to_decimal(value.magnitude());
    match value {
        SignedAmount::Positive(_) => magnitude,
        SignedAmount::Negative(_) => -magnitude,
    }
}

/// Exact decimal back into a signed delta.
pub fn decimal_to_signed(value: &BigDecimal) -> Option<SignedAmount> {
    if !value.is_integer() {
        return None;
    }
    let int = value.to_bigint()?;
    let (sign, bytes) = int.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    let magnitude = U256::from_big_endian(&bytes);
    Some(match sign {
        Sign::Minus => SignedAmount::Negative(magnitude),
        _ => SignedAmount::Positive(magnitude),
    })
}
