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

//! ABI-shaped decoding of stream records into domain events. Anything
//! malformed comes back as a `DecodeError`; the dispatcher logs it and
//! skips the record without persisting.

use arena_primitives::{ChainEvent, ChainEventKind, EventCoords};
use arena_stream::{LogRecord, TxRecord};
use ethabi::{RawLog, Token};
use ethereum_types::{H160, H256, U256};

use crate::abi;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Log matched the address filter but none of the known topics.
    #[error("unknown topic0 {0:?}")]
    UnknownTopic(H256),
    #[error("log carries no topics")]
    NoTopics,
    #[error("malformed {event} payload: {reason}")]
    Malformed {
        event: &'static str,
        reason: String,
    },
    #[error("block timestamp {0} is out of range")]
    BadTimestamp(u64),
    #[error("transaction input is not a claim call")]
    NotAClaimCall,
}

/// Payload of one of the six consumed events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventPayload {
    Stake {
        staker: H160,
        token_id: U256,
        amount: U256,
        start_time: U256,
        lockup_end_time: U256,
    },
    Unstake {
        staker: H160,
        token_id: U256,
        amount_to_unstake: U256,
        withdraw_allowed_time: u64,
    },
    Relock {
        staker: H160,
        token_id: U256,
        updated_old_stake_amount: U256,
    },
    Withdraw {
        staker: H160,
        token_id: U256,
        amount: U256,
    },
    RewardClaimed {
        root: H256,
        user: H160,
        amount: U256,
    },
    AllocationAdded {
        root: H256,
        token: H160,
        allocated_amount: U256,
        start_timestamp: U256,
    },
}

/// A fully decoded log: the raw intake row plus the typed payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedLog {
    pub raw: ChainEvent,
    pub payload: EventPayload,
}

impl DecodedLog {
    pub fn coords(&self) -> &EventCoords {
        &self.raw.coords
    }
}

/// A decoded `claim(...)` call. Only the retained arguments; the proof
/// and signature are verified on-chain, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimCall {
    pub to: H160,
    pub amount: U256,
    pub season: u8,
    pub duration_secs: u64,
}

fn coords_of_log(record: &LogRecord) -> Result<EventCoords, DecodeError> {
    let block_timestamp = arena_utils::time::from_unix_secs(record.block_timestamp)
        .ok_or(DecodeError::BadTimestamp(record.block_timestamp))?;
    Ok(EventCoords {
        block_number: record.block_number,
        block_hash: record.block_hash,
        block_timestamp,
        tx_hash: record.tx_hash,
        log_index: record.log_index,
    })
}

fn param(log: &ethabi::Log, event: &'static str, name: &str) -> Result<Token, DecodeError> {
    log.params
        .iter()
        .find(|param| param.name == name)
        .map(|param| param.value.clone())
        .ok_or_else(|| DecodeError::Malformed {
            event,
            reason: format!("missing param {}", name),
        })
}

fn uint_param(log: &ethabi::Log, event: &'static str, name: &str) -> Result<U256, DecodeError> {
    match param(log, event, name)? {
        Token::Uint(value) => Ok(value),
        other => Err(DecodeError::Malformed {
            event,
            reason: format!("param {} is not a uint: {:?}", name, other),
        }),
    }
}

fn u64_param(log: &ethabi::Log, event: &'static str, name: &str) -> Result<u64, DecodeError> {
    let value = uint_param(log, event, name)?;
    if value > U256::from(u64::MAX) {
        return Err(DecodeError::Malformed {
            event,
            reason: format!("param {} exceeds u64", name),
        });
    }
    Ok(value.low_u64())
}

fn address_param(log: &ethabi::Log, event: &'static str, name: &str) -> Result<H160, DecodeError> {
    match param(log, event, name)? {
        Token::Address(value) => Ok(value),
        other => Err(DecodeError::Malformed {
            event,
            reason: format!("param {} is not an address: {:?}", name, other),
        }),
    }
}

fn bytes32_param(log: &ethabi::Log, event: &'static str, name: &str) -> Result<H256, DecodeError> {
    match param(log, event, name)? {
        Token::FixedBytes(bytes) if bytes.len() == 32 => Ok(H256::from_slice(&bytes)),
        other => Err(DecodeError::Malformed {
            event,
            reason: format!("param {} is not bytes32: {:?}", name, other),
        }),
    }
}

fn parse(
    event: &ethabi::Event,
    name: &'static str,
    record: &LogRecord,
) -> Result<ethabi::Log, DecodeError> {
    event
        .parse_log(RawLog {
            topics: record.topics.clone(),
            data: record.data.clone(),
        })
        .map_err(|err| DecodeError::Malformed {
            event: name,
            reason: err.to_string(),
        })
}

/// Decodes one stream log into its raw intake row and typed payload.
pub fn decode_log(record: &LogRecord) -> Result<DecodedLog, DecodeError> {
    let topic0 = *record.topics.first().ok_or(DecodeError::NoTopics)?;
    let kind = abi::kind_for_topic(topic0);
    let coords = coords_of_log(record)?;

    let payload = match kind {
        ChainEventKind::Stake => {
            let log = parse(&abi::STAKE, "Stake", record)?;
            EventPayload::Stake {
                staker: address_param(&log, "Stake", "staker")?,
                token_id: uint_param(&log, "Stake", "tokenId")?,
                amount: uint_param(&log, "Stake", "amount")?,
                start_time: uint_param(&log, "Stake", "startTime")?,
                lockup_end_time: uint_param(&log, "Stake", "lockupEndTime")?,
            }
        }
        ChainEventKind::Unstake => {
            let log = parse(&abi::UNSTAKE, "Unstake", record)?;
            EventPayload::Unstake {
                staker: address_param(&log, "Unstake", "staker")?,
                token_id: uint_param(&log, "Unstake", "tokenId")?,
                amount_to_unstake: uint_param(&log, "Unstake", "amountToUnstake")?,
                withdraw_allowed_time: u64_param(&log, "Unstake", "withdrawAllowedTime")?,
            }
        }
        ChainEventKind::Relock => {
            let log = parse(&abi::RELOCK, "Relock", record)?;
            EventPayload::Relock {
                staker: address_param(&log, "Relock", "staker")?,
                token_id: uint_param(&log, "Relock", "tokenId")?,
                updated_old_stake_amount: uint_param(&log, "Relock", "updatedOldStakeAmount")?,
            }
        }
        ChainEventKind::Withdraw => {
            let log = parse(&abi::WITHDRAW, "Withdraw", record)?;
            EventPayload::Withdraw {
                staker: address_param(&log, "Withdraw", "staker")?,
                token_id: uint_param(&log, "Withdraw", "tokenId")?,
                amount: uint_param(&log, "Withdraw", "amount")?,
            }
        }
        ChainEventKind::RewardClaimed => {
            let log = parse(&abi::REWARD_CLAIMED, "RewardClaimed", record)?;
            EventPayload::RewardClaimed {
                root: bytes32_param(&log, "RewardClaimed", "root")?,
                user: address_param(&log, "RewardClaimed", "user")?,
                amount: uint_param(&log, "RewardClaimed", "amount")?,
            }
        }
        ChainEventKind::AllocationAdded => {
            let log = parse(&abi::ALLOCATION_ADDED, "AllocationAdded", record)?;
            EventPayload::AllocationAdded {
                root: bytes32_param(&log, "AllocationAdded", "root")?,
                token: address_param(&log, "AllocationAdded", "token")?,
                allocated_amount: uint_param(&log, "AllocationAdded", "allocatedAmount")?,
                start_timestamp: uint_param(&log, "AllocationAdded", "startTimestamp")?,
            }
        }
        ChainEventKind::Unknown => return Err(DecodeError::UnknownTopic(topic0)),
    };

    Ok(DecodedLog {
        raw: ChainEvent {
            coords,
            address: record.address,
            topics: record.topics.clone(),
            data: record.data.clone(),
            kind,
        },
        payload,
    })
}

/// Decodes `claim(...)` calldata, keeping `to`, `amount`, `season` and
/// `duration`.
pub fn decode_claim(record: &TxRecord) -> Result<ClaimCall, DecodeError> {
    if record.input.len() < 4 || record.input[..4] != abi::CLAIM_SELECTOR {
        return Err(DecodeError::NotAClaimCall);
    }

    let tokens = abi::CLAIM_FUNCTION
        .decode_input(&record.input[4..])
        .map_err(|err| DecodeError::Malformed {
            event: "claim",
            reason: err.to_string(),
        })?;

    let uint_at = |index: usize, name: &str| -> Result<U256, DecodeError> {
        match tokens.get(index) {
            Some(Token::Uint(value)) => Ok(*value),
            other => Err(DecodeError::Malformed {
                event: "claim",
                reason: format!("argument {} is not a uint: {:?}", name, other),
            }),
        }
    };

    let to = match tokens.get(1) {
        Some(Token::Address(value)) => *value,
        other => {
            return Err(DecodeError::Malformed {
                event: "claim",
                reason: format!("argument to is not an address: {:?}", other),
            })
        }
    };
    let amount = uint_at(2, "amount")?;

    let season = uint_at(3, "season")?;
    if season > U256::from(u8::MAX) {
        return Err(DecodeError::Malformed {
            event: "claim",
            reason: "argument season exceeds u8".to_string(),
        });
    }

    let duration = uint_at(4, "duration")?;
    if duration > U256::from(u64::MAX) {
        return Err(DecodeError::Malformed {
            event: "claim",
            reason: "argument duration exceeds u64".to_string(),
        });
    }

    Ok(ClaimCall {
        to,
        amount,
        season: season.low_u64() as u8,
        duration_secs: duration.low_u64(),
    })
}
