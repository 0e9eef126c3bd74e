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

//! The six contract events and one function call this indexer consumes.
//! Definitions are built in code rather than loaded from ABI JSON; the
//! keccak signatures are the routing keys for dispatch.

use arena_primitives::ChainEventKind;
use ethabi::{Event, EventParam, Function, Param, ParamType, StateMutability};
use ethereum_types::H256;
use once_cell::sync::Lazy;

/// Selector of `claim(bytes32[],address,uint256,uint8,uint256,bytes)`.
pub const CLAIM_SELECTOR: [u8; 4] = [0x2a, 0xc9, 0x6e, 0x2a];

fn event(name: &str, inputs: Vec<(&str, ParamType, bool)>) -> Event {
    Event {
        name: name.to_string(),
        inputs: inputs
            .into_iter()
            .map(|(name, kind, indexed)| EventParam {
                name: name.to_string(),
                kind,
                indexed,
            })
            .collect(),
        anonymous: false,
    }
}

pub static STAKE: Lazy<Event> = Lazy::new(|| {
    event(
        "Stake",
        vec![
            ("staker", ParamType::Address, true),
            ("tokenId", ParamType::Uint(256), false),
            ("amount", ParamType::Uint(256), false),
            ("startTime", ParamType::Uint(256), false),
            ("lockupEndTime", ParamType::Uint(256), false),
        ],
    )
});

pub static UNSTAKE: Lazy<Event> = Lazy::new(|| {
    event(
        "Unstake",
        vec![
            ("staker", ParamType::Address, true),
            ("tokenId", ParamType::Uint(256), false),
            ("amountToUnstake", ParamType::Uint(256), false),
            ("withdrawAllowedTime", ParamType::Uint(64), false),
        ],
    )
});

pub static RELOCK: Lazy<Event> = Lazy::new(|| {
    event(
        "Relock",
        vec![
            ("staker", ParamType::Address, true),
            ("tokenId", ParamType::Uint(256), false),
            ("updatedOldStakeAmount", ParamType::Uint(256), false),
        ],
    )
});

pub static WITHDRAW: Lazy<Event> = Lazy::new(|| {
    event(
        "Withdraw",
        vec![
            ("staker", ParamType::Address, true),
            ("tokenId", ParamType::Uint(256), false),
            ("amount", ParamType::Uint(256), false),
        ],
    )
});

pub static REWARD_CLAIMED: Lazy<Event> = Lazy::new(|| {
    event(
        "RewardClaimed",
        vec![
            ("root", ParamType::FixedBytes(32), true),
            ("user", ParamType::Address, true),
            ("amount", ParamType::Uint(256), false),
        ],
    )
});

pub static ALLOCATION_ADDED: Lazy<Event> = Lazy::new(|| {
    event(
        "AllocationAdded",
        vec![
            ("root", ParamType::FixedBytes(32), true),
            ("token", ParamType::Address, true),
            ("allocatedAmount", ParamType::Uint(256), false),
            ("startTimestamp", ParamType::Uint(256), false),
        ],
    )
});

#[allow(deprecated)] // `constant` has no replacement when building a Function by hand
pub static CLAIM_FUNCTION: Lazy<Function> = Lazy::new(|| {
    let input = |name: &str, kind: ParamType| Param {
        name: name.to_string(),
        kind,
        internal_type: None,
    };
    Function {
        name: "claim".to_string(),
        inputs: vec![
            input("proof", ParamType::Array(Box::new(ParamType::FixedBytes(32)))),
            input("to", ParamType::Address),
            input("amount", ParamType::Uint(256)),
            input("season", ParamType::Uint(8)),
            input("duration", ParamType::Uint(256)),
            input("signature", ParamType::Bytes),
        ],
        outputs: vec![],
        constant: None,
        state_mutability: StateMutability::NonPayable,
    }
});

/// Routes a `topic0` to the event kind, `Unknown` when none matches.
pub fn kind_for_topic(topic0: H256) -> ChainEventKind {
    if topic0 == STAKE.signature() {
        ChainEventKind::Stake
    } else if topic0 == UNSTAKE.signature() {
        ChainEventKind::Unstake
    } else if topic0 == RELOCK.signature() {
        ChainEventKind::Relock
    } else if topic0 == WITHDRAW.signature() {
        ChainEventKind::Withdraw
    } else if topic0 == REWARD_CLAIMED.signature() {
        ChainEventKind::RewardClaimed
    } else if topic0 == ALLOCATION_ADDED.signature() {
        ChainEventKind::AllocationAdded
    } else {
        ChainEventKind::Unknown
    }
}

/// `topic0` values of the staking contract events.
pub fn staking_topics() -> Vec<H256> {
    vec![
        STAKE.signature(),
        UNSTAKE.signature(),
        RELOCK.signature(),
        WITHDRAW.signature(),
    ]
}

/// `topic0` values of the rewards contract events.
pub fn rewards_topics() -> Vec<H256> {
    vec![REWARD_CLAIMED.signature(), ALLOCATION_ADDED.signature()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn event_signatures_are_the_known_topics() {
        assert_eq!(
            STAKE.signature(),
            H256(hex!(
                "2720efa4b2dd4f3f8a347da3cbd290a522e9432da9072c5b8e6300496fdde282"
            ))
        );
        assert_eq!(
            UNSTAKE.signature(),
            H256(hex!(
                "13b538773da652bc6ace9e45c3362bde5fa0a147319d25f19f9a3abe1b76e9a2"
            ))
        );
        assert_eq!(
            RELOCK.signature(),
            H256(hex!(
                "732bb053e7a01aa5bdddd99623a4babbb36177debb85cff06592a420c4270a7d"
            ))
        );
        assert_eq!(
            WITHDRAW.signature(),
            H256(hex!(
                "f279e6a1f5e320cca91135676d9cb6e44ca8a08c0b88342bcdb1144f6511b568"
            ))
        );
        assert_eq!(
            REWARD_CLAIMED.signature(),
            H256(hex!(
                "fe236dfc7ce073698734b89da1aee0e7551c9c6d264404c502e6e8fefc1132a8"
            ))
        );
        assert_eq!(
            ALLOCATION_ADDED.signature(),
            H256(hex!(
                "445b0c1846d34293892483b1dbd287a52d37e329a05ba5ea8f03f2b0b866d8d1"
            ))
        );
    }

    #[test]
    fn claim_selector_matches_the_signature() {
        let params: Vec<ParamType> = CLAIM_FUNCTION
            .inputs
            .iter()
            .map(|param| param.kind.clone())
            .collect();
        assert_eq!(
            ethabi::short_signature(&CLAIM_FUNCTION.name, &params),
            CLAIM_SELECTOR
        );
    }

    #[test]
    fn every_topic_routes_to_its_kind() {
        assert_eq!(
            kind_for_topic(STAKE.signature()),
            ChainEventKind::Stake
        );
        assert_eq!(kind_for_topic(UNSTAKE.signature()), ChainEventKind::Unstake);
        assert_eq!(kind_for_topic(RELOCK.signature()), ChainEventKind::Relock);
        assert_eq!(
            kind_for_topic(WITHDRAW.signature()),
            ChainEventKind::Withdraw
        );
        assert_eq!(
            kind_for_topic(REWARD_CLAIMED.signature()),
            ChainEventKind::RewardClaimed
        );
        assert_eq!(
            kind_for_topic(ALLOCATION_ADDED.signature()),
            ChainEventKind::AllocationAdded
        );
        assert_eq!(
            kind_for_topic(H256::repeat_byte(0x99)),
            ChainEventKind::Unknown
        );
    }

    #[test]
    fn filter_topic_sets_are_disjoint_and_complete() {
        let staking = staking_topics();
        let rewards = rewards_topics();
        assert_eq!(staking.len(), 4);
        assert_eq!(rewards.len(), 2);
        assert!(staking.iter().all(|topic| !rewards.contains(topic)));
    }
}
