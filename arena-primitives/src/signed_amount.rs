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

//! Signed 256-bit deltas for journal rows.

use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// A journal delta. Magnitudes are unsigned 256-bit integers; the sign
/// is carried separately so the zero case is always `Positive(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedAmount {
    Positive(U256),
    Negative(U256),
}

impl SignedAmount {
    pub fn zero() -> Self {
        SignedAmount::Positive(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude().is_zero()
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, SignedAmount::Negative(value) if !value.is_zero())
    }

    pub fn magnitude(&self) -> U256 {
        match self {
            SignedAmount::Positive(value) | SignedAmount::Negative(value) => *value,
        }
    }

    /// Delta that moves a balance from `prev` to `new`.
    pub fn from_diff(prev: U256, new: U256) -> Self {
        if new >= prev {
            SignedAmount::Positive(new - prev)
        } else {
            SignedAmount::Negative(prev - new)
        }
    }

    /// Applies the delta to `value`. `None` on overflow or when the
    /// delta would take the value below zero.
    pub fn apply_to(&self, value: U256) -> Option<U256> {
        match self {
            SignedAmount::Positive(delta) => value.checked_add(*delta),
            SignedAmount::Negative(delta) => value.checked_sub(*delta),
        }
    }
}

impl core::fmt::Display for SignedAmount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SignedAmount::Positive(value) => write!(f, "{}", value),
            SignedAmount::Negative(value) => write!(f, "-{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_signs() {
        assert_eq!(
            SignedAmount::from_diff(300.into(), 1000.into()),
            SignedAmount::Positive(700.into())
        );
        assert_eq!(
            SignedAmount::from_diff(1000.into(), 300.into()),
            SignedAmount::Negative(700.into())
        );
        assert_eq!(
            SignedAmount::from_diff(1000.into(), 1000.into()),
            SignedAmount::Positive(0.into())
        );
        assert!(SignedAmount::from_diff(5.into(), 5.into()).is_zero());
    }

    #[test]
    fn apply_round_trips_diff() {
        let prev = U256::from(1000);
        let new = U256::from(300);
        let delta = SignedAmount::from_diff(prev, new);
        assert_eq!(delta.apply_to(prev), Some(new));
    }

    #[test]
    fn apply_refuses_underflow() {
        let delta = SignedAmount::Negative(10.into());
        assert_eq!(delta.apply_to(5.into()), None);
    }

    #[test]
    fn display_carries_sign() {
        assert_eq!(SignedAmount::Negative(700.into()).to_string(), "-700");
        assert_eq!(SignedAmount::Positive(42.into()).to_string(), "42");
    }
}
