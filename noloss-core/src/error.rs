//! Error types for noloss-core

use crate::market::Side;
use crate::{AccountId, Balance, MarketId, StakeIndex};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for market, dispute and ledger operations.
///
/// Every failure is synchronous and atomic: a returned error means no
/// persisted state was touched by the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A lifecycle guard failed (market not ended / already ended, liveness
    /// not expired, challenge period not over, ...)
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    /// Outcome is not YES or NO
    #[error("invalid outcome: {0}")]
    InvalidOutcome(String),

    /// Stake, proposal bond or challenge bond below the required minimum
    #[error("insufficient value: {0}")]
    InsufficientValue(String),

    /// Market id is at or beyond the registry count
    #[error("market {market_id} not found")]
    MarketNotFound { market_id: MarketId },

    /// Stake index is at or beyond the side's sequence length
    #[error("stake {index} not found on {side} side of market {market_id}")]
    StakeNotFound {
        market_id: MarketId,
        side: Side,
        index: StakeIndex,
    },

    /// Double resolution or finalization
    #[error("market {market_id} already resolved")]
    AlreadyResolved { market_id: MarketId },

    /// A live proposal already exists for the market
    #[error("a proposal is already pending for market {market_id}")]
    ProposalPending { market_id: MarketId },

    /// Challenge/finalize/resolve with no proposal on record
    #[error("no active proposal for market {market_id}")]
    NoActiveProposal { market_id: MarketId },

    /// Second challenge, or finalization of a challenged proposal
    #[error("proposal for market {market_id} is already challenged")]
    AlreadyChallenged { market_id: MarketId },

    /// Privileged resolution of a proposal nobody challenged
    #[error("proposal for market {market_id} has not been challenged")]
    NotChallenged { market_id: MarketId },

    /// Caller is not the stake's recorded staker, or not the privileged resolver
    #[error("caller {caller} is not authorized")]
    NotOwner { caller: AccountId },

    /// Double claim or restake of the same stake
    #[error("stake {index} on {side} side of market {market_id} already claimed")]
    AlreadyClaimed {
        market_id: MarketId,
        side: Side,
        index: StakeIndex,
    },

    /// Withdrawal exceeds the credited balance
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        available: Balance,
        required: Balance,
    },

    /// Outbound value movement failed; the associated debit was rolled back
    #[error("transfer of {amount} to {account} failed")]
    TransferFailed { account: AccountId, amount: Balance },
}
