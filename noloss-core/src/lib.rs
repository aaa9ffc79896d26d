//! # Noloss Core
//!
//! Core ledger for no-loss prediction markets with bond-secured optimistic
//! resolution.
//!
//! Many independent binary markets run side by side. Participants stake on
//! YES or NO without risking their principal: a 1% fee on every stake funds
//! a per-market reward pool, and only that pool is at play. An automated
//! market maker prices each stake into probability-weighted units, so early
//! and contrarian stakers earn a larger share of the pool than late herd
//! followers. Outcomes are fixed not by a trusted oracle but by an
//! economically secured propose/challenge/finalize protocol under bonds,
//! judged by a privileged resolver only when an actual dispute arises.
//!
//! ## Features
//!
//! - **Market lifecycle**: create, seed and query binary markets with
//!   dense integer ids
//! - **AMM staking**: probability-priced units, fixed at purchase
//! - **Optimistic resolution**: bonded proposals, liveness windows,
//!   challenges and privileged dispute judgment
//! - **Pull payments**: claims and refunds credit an internal balance
//!   ledger; value leaves only through an explicit withdrawal
//! - **Restaking**: roll a winning principal into a fresh market without a
//!   withdraw/re-stake round trip
//!
//! ## Examples
//!
//! ```rust
//! use noloss_core::{Engine, Side, utils::tokens};
//!
//! let mut engine = Engine::new("protocol.owner");
//!
//! // Create a market closing far in the future, seeded with 2 tokens.
//! let end_time = 4_102_444_800; // 2100-01-01
//! let market_id = engine.create_market(
//!     "creator",
//!     "Will a million-block reorg happen before 2100?",
//!     "crypto",
//!     end_time,
//!     end_time,
//!     tokens(2),
//! )?;
//!
//! // Stake a token on YES and keep the index for the later claim.
//! let stake_index = engine.place_stake("alice", market_id, Side::Yes, tokens(1))?;
//! assert_eq!(stake_index, 1); // index 0 is the creator's seed
//! Ok::<(), noloss_core::Error>(())
//! ```

pub mod amm;
pub mod clock;
pub mod dispute;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod market;
pub mod rewards;
pub mod test_utils;
pub mod transfer;
pub mod utils;

pub use amm::{compute_units, Stake, StakeBook};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispute::{DisputeResolver, Proposal, Settlement};
pub use engine::Engine;
pub use error::{Error, Result};
pub use events::{EventSink, MarketEvent, NoopSink};
pub use ledger::BalanceLedger;
pub use market::{Market, MarketCore, MarketPhase, MarketRegistry, MarketState, Outcome, Side};
pub use transfer::{InMemoryTransfer, ValueTransfer};

/// Authenticated principal identifier attached to every call.
pub type AccountId = String;

/// Fixed-point token amount (1 token = [`PRECISION`] units).
pub type Balance = u128;

/// Unix timestamp in whole seconds.
pub type Timestamp = u64;

/// Dense market identifier, handed out in creation order.
pub type MarketId = u64;

/// Index of a stake within its (market, side) sequence.
pub type StakeIndex = u64;

/// Fixed-point scale for probabilities and token amounts (1e18).
pub const PRECISION: Balance = 1_000_000_000_000_000_000;

/// Flat platform fee on every gross stake, in percent. Accrues to the
/// market's reward pool.
pub const PLATFORM_FEE_PERCENT: Balance = 1;

/// Creator's share of the reward pool, in percent.
pub const CREATOR_SHARE_PERCENT: Balance = 10;

/// Protocol's share of the reward pool, in percent.
pub const PROTOCOL_SHARE_PERCENT: Balance = 10;

/// Winning stakers' share of the reward pool, in percent.
pub const STAKER_SHARE_PERCENT: Balance = 80;

/// Minimum bond for proposing an outcome (1 token).
pub const MIN_PROPOSAL_BOND: Balance = PRECISION;

/// Minimum bond for challenging a proposal (1 token).
pub const MIN_CHALLENGE_BOND: Balance = PRECISION;

/// Liveness window during which a pending proposal may be challenged
/// (1 day).
pub const LIVENESS_WINDOW: Timestamp = 86_400;

/// Buffer after a market's scheduled resolution time before payouts may
/// finalize (3 days).
pub const CHALLENGE_PERIOD: Timestamp = 259_200;
