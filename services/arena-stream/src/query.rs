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

//! Query shapes sent to the stream service.

use arena_primitives::BlockNumber;
use ethereum_types::{H160, H256};
use serde::Serialize;

use crate::types::selector_hex;

/// Selects logs by emitting contract and `topic0`. Topics are matched
/// positionally; only the first position is ever filtered here.
#[derive(Clone, Debug, Serialize)]
pub struct LogFilter {
    pub address: Vec<H160>,
    pub topics: Vec<Vec<H256>>,
}

impl LogFilter {
    pub fn new(address: Vec<H160>, topic0: Vec<H256>) -> Self {
        LogFilter {
            address,
            topics: vec![topic0],
        }
    }
}

/// Selects successful transactions by recipient and 4-byte selector.
#[derive(Clone, Debug, Serialize)]
pub struct TxFilter {
    pub to: Vec<H160>,
    #[serde(with = "selector_hex")]
    pub sighash: Vec<[u8; 4]>,
    /// 1 selects successful transactions only.
    pub status: u8,
}

impl TxFilter {
    pub fn new(to: Vec<H160>, sighash: Vec<[u8; 4]>) -> Self {
        TxFilter {
            to,
            sighash,
            status: 1,
        }
    }
}

/// Which fields the response must carry for each record kind.
#[derive(Clone, Debug, Serialize)]
pub struct FieldSelection {
    pub block: Vec<&'static str>,
    pub log: Vec<&'static str>,
    pub transaction: Vec<&'static str>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        FieldSelection {
            block: vec!["number", "hash", "timestamp"],
            log: vec![
                "blockNumber",
                "blockHash",
                "blockTimestamp",
                "transactionHash",
                "logIndex",
                "address",
                "topics",
                "data",
            ],
            transaction: vec![
                "blockNumber",
                "blockTimestamp",
                "hash",
                "from",
                "to",
                "input",
            ],
        }
    }
}

/// One poll request: a starting cursor plus filters.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    pub from_block: BlockNumber,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<TxFilter>,
    pub field_selection: FieldSelection,
}

impl StreamQuery {
    /// Log query starting at `from_block`.
    pub fn logs(from_block: BlockNumber, filter: LogFilter) -> Self {
        StreamQuery {
            from_block,
            logs: vec![filter],
            transactions: vec![],
            field_selection: FieldSelection::default(),
        }
    }

    /// Transaction query starting at `from_block`.
    pub fn transactions(from_block: BlockNumber, filter: TxFilter) -> Self {
        StreamQuery {
            from_block,
            logs: vec![],
            transactions: vec![filter],
            field_selection: FieldSelection::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn log_query_wire_shape() {
        let contract = H160(hex!("00000000000000000000000000000000000000aa"));
        let topic = H256(hex!(
            "00000000000000000000000000000000000000000000000000000000000000bb"
        ));
        let query = StreamQuery::logs(42, LogFilter::new(vec![contract], vec![topic]));
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(value["fromBlock"], 42);
        assert_eq!(
            value["logs"][0]["address"][0],
            "0x00000000000000000000000000000000000000aa"
        );
        assert_eq!(
            value["logs"][0]["topics"][0][0],
            "0x00000000000000000000000000000000000000000000000000000000000000bb"
        );
        assert!(value.get("transactions").is_none());
    }

    #[test]
    fn tx_query_wire_shape() {
        let contract = H160(hex!("00000000000000000000000000000000000000cc"));
        let query =
            StreamQuery::transactions(7, TxFilter::new(vec![contract], vec![hex!("2ac96e2a")]));
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(value["fromBlock"], 7);
        assert_eq!(value["transactions"][0]["sighash"][0], "0x2ac96e2a");
        assert_eq!(value["transactions"][0]["status"], 1);
        assert!(value.get("logs").is_none());
    }
}
