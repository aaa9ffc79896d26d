//! # Event emission
//!
//! Best-effort notifications for off-system indexers. Events mirror the
//! state transitions but carry no authority; dropping every one of them
//! loses observability, never correctness.

use crate::market::Side;
use crate::{AccountId, Balance, MarketId, StakeIndex, Timestamp};
use serde::Serialize;

/// One notification per completed state transition.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum MarketEvent {
    MarketCreated {
        market_id: MarketId,
        creator: AccountId,
        question: String,
        end_time: Timestamp,
    },
    StakePlaced {
        market_id: MarketId,
        side: Side,
        staker: AccountId,
        gross: Balance,
        net: Balance,
        units: Balance,
        stake_index: StakeIndex,
    },
    OutcomeProposed {
        market_id: MarketId,
        proposer: AccountId,
        outcome: Side,
        bond: Balance,
        liveness_deadline: Timestamp,
    },
    ProposalChallenged {
        market_id: MarketId,
        challenger: AccountId,
        bond: Balance,
    },
    ProposalResolved {
        market_id: MarketId,
        outcome: Side,
        challenged: bool,
    },
    RewardsDistributed {
        market_id: MarketId,
        creator_share: Balance,
        protocol_share: Balance,
        staker_pool: Balance,
    },
    StakeClaimed {
        market_id: MarketId,
        side: Side,
        stake_index: StakeIndex,
        staker: AccountId,
        principal: Balance,
        reward: Balance,
    },
    Restaked {
        old_market_id: MarketId,
        new_market_id: MarketId,
        side: Side,
        amount: Balance,
        new_stake_index: StakeIndex,
    },
    Withdrawal {
        account: AccountId,
        amount: Balance,
    },
}

/// Notification sink. Implementations must not fail; emission is fire and
/// forget.
pub trait EventSink {
    fn emit(&mut self, event: &MarketEvent);
}

/// Discards every event. The default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: &MarketEvent) {}
}
