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

//! Hex normalization at the wire edge. Inbound strings may be mixed
//! case with or without a `0x` prefix; everything stored or rendered is
//! lowercase `0x` hex.

use ethereum_types::{H160, H256};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum HexError {
    #[error("hex string has wrong length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("invalid hex digit")]
    InvalidDigit,
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    let stripped = strip_prefix(s);
    let bytes = hex::decode(stripped).map_err(|_| HexError::InvalidDigit)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HexError::WrongLength { expected: N, actual })
}

/// Parses a 20-byte address, lowercasing any checksum casing.
pub fn parse_address(s: &str) -> Result<H160, HexError> {
    parse_fixed::<20>(s).map(H160)
}

/// Parses a 32-byte hash.
pub fn parse_hash(s: &str) -> Result<H256, HexError> {
    parse_fixed::<32>(s).map(H256)
}

/// Parses a 4-byte function selector.
pub fn parse_selector(s: &str) -> Result<[u8; 4], HexError> {
    parse_fixed::<4>(s)
}

/// Lowercase `0x` rendering of arbitrary bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn address_to_hex(address: &H160) -> String {
    to_hex(address.as_bytes())
}

pub fn hash_to_hex(hash: &H256) -> String {
    to_hex(hash.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex as hexlit;

    #[test]
    fn parses_mixed_case_addresses() {
        let lower = parse_address("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let upper = parse_address("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        let bare = parse_address("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, bare);
        assert_eq!(
            lower,
            H160(hexlit!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_address("0xabcd"),
            Err(HexError::WrongLength {
                expected: 20,
                actual: 2
            })
        );
        assert_eq!(
            parse_address("0xzzaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            Err(HexError::InvalidDigit)
        );
    }

    #[test]
    fn renders_lowercase_with_prefix() {
        let address = parse_address("0xAABBCCDDEEFF00112233445566778899AABBCCDD").unwrap();
        assert_eq!(
            address_to_hex(&address),
            "0xaabbccddeeff00112233445566778899aabbccdd"
        );
        let hash = parse_hash(
            "0xBEEF000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            hash_to_hex(&hash),
            "0xbeef000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn selector_parses() {
        assert_eq!(parse_selector("0x2ac96e2a").unwrap(), hexlit!("2ac96e2a"));
    }
}
