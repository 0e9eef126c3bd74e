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

//! Batch records returned by the stream service. Raw payload bytes stay
//! `0x` hex on the wire and become byte vectors here; timestamps stay
//! unix seconds until the decoder stamps domain rows.

use arena_primitives::{BlockNumber, LogIndex};
use ethereum_types::{H160, H256};
use serde::Deserialize;

/// `0x`-prefixed hex string to raw bytes.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let stripped = text.strip_prefix("0x").unwrap_or(&text);
        hex::decode(stripped).map_err(serde::de::Error::custom)
    }
}

/// 4-byte selectors as `0x` hex strings.
pub(crate) mod selector_hex {
    use serde::ser::SerializeSeq;
    use serde::Serializer;

    pub fn serialize<S>(selectors: &[[u8; 4]], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(selectors.len()))?;
        for selector in selectors {
            seq.serialize_element(&format!("0x{}", hex::encode(selector)))?;
        }
        seq.end()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockHeader {
    pub number: BlockNumber,
    pub hash: H256,
    pub timestamp: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub block_number: BlockNumber,
    pub block_hash: H256,
    pub block_timestamp: u64,
    #[serde(rename = "transactionHash")]
    pub tx_hash: H256,
    pub log_index: LogIndex,
    pub address: H160,
    pub topics: Vec<H256>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub block_number: BlockNumber,
    pub block_timestamp: u64,
    #[serde(rename = "hash")]
    pub tx_hash: H256,
    pub from: H160,
    pub to: H160,
    #[serde(with = "hex_bytes")]
    pub input: Vec<u8>,
}

/// One bounded batch. `next_block` is the cursor for the next poll and
/// always advances past every record in the batch.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub next_block: BlockNumber,
    #[serde(default)]
    pub blocks: Vec<BlockHeader>,
    #[serde(default)]
    pub logs: Vec<LogRecord>,
    #[serde(default)]
    pub transactions: Vec<TxRecord>,
}

/// Batches are consumed strictly in `(block_number, log_index)` order.
pub(crate) fn sort_logs(logs: &mut [LogRecord]) {
    logs.sort_by_key(|log| (log.block_number, log.log_index));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_batch() {
        let raw = serde_json::json!({
            "nextBlock": 101,
            "blocks": [
                { "number": 100, "hash": "0x00000000000000000000000000000000000000000000000000000000000000b1", "timestamp": 1_700_000_000u64 }
            ],
            "logs": [
                {
                    "blockNumber": 100,
                    "blockHash": "0x00000000000000000000000000000000000000000000000000000000000000b1",
                    "blockTimestamp": 1_700_000_000u64,
                    "transactionHash": "0x00000000000000000000000000000000000000000000000000000000000000a1",
                    "logIndex": 3,
                    "address": "0x00000000000000000000000000000000000000aa",
                    "topics": ["0x00000000000000000000000000000000000000000000000000000000000000cc"],
                    "data": "0x00ff"
                }
            ],
            "transactions": [
                {
                    "blockNumber": 100,
                    "blockTimestamp": 1_700_000_000u64,
                    "hash": "0x00000000000000000000000000000000000000000000000000000000000000dd",
                    "from": "0x00000000000000000000000000000000000000ee",
                    "to": "0x00000000000000000000000000000000000000ff",
                    "input": "0x2ac96e2a"
                }
            ]
        });

        let parsed: QueryResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.next_block, 101);
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.logs[0].log_index, 3);
        assert_eq!(parsed.logs[0].data, vec![0x00, 0xff]);
        assert_eq!(parsed.transactions[0].input, vec![0x2a, 0xc9, 0x6e, 0x2a]);
    }

    #[test]
    fn missing_record_arrays_default_to_empty() {
        let parsed: QueryResponse =
            serde_json::from_value(serde_json::json!({ "nextBlock": 5 })).unwrap();
        assert_eq!(parsed.next_block, 5);
        assert!(parsed.blocks.is_empty());
        assert!(parsed.logs.is_empty());
        assert!(parsed.transactions.is_empty());
    }

    #[test]
    fn logs_sort_by_block_then_index() {
        fn log(block: u64, index: u32) -> LogRecord {
            LogRecord {
                block_number: block,
                block_hash: H256::zero(),
                block_timestamp: 0,
                tx_hash: H256::zero(),
                log_index: index,
                address: H160::zero(),
                topics: vec![],
                data: vec![],
            }
        }

        let mut logs = vec![log(7, 2), log(6, 9), log(7, 0), log(5, 1)];
        sort_logs(&mut logs);
        let order: Vec<_> = logs
            .iter()
            .map(|l| (l.block_number, l.log_index))
            .collect();
        assert_eq!(order, vec![(5, 1), (6, 9), (7, 0), (7, 2)]);
    }
}
