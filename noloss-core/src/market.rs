//! # Market Registry
//!
//! Per-market state: the immutable [`MarketCore`] fixed at creation, the
//! mutable [`MarketState`] updated by stakes and resolution, and the
//! [`MarketRegistry`] arena that owns both, indexed by a dense,
//! monotonically increasing market id.

use crate::error::{Error, Result};
use crate::{AccountId, Balance, MarketId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A side of a binary market.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The opposing side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "YES" | "Y" => Ok(Side::Yes),
            "NO" | "N" => Ok(Side::No),
            other => Err(Error::InvalidOutcome(format!(
                "expected YES or NO, got {other:?}"
            ))),
        }
    }
}

/// Resolution outcome of a market.
///
/// `Unresolved` until the dispute protocol resolves the market; afterwards
/// fixed to the winning side and never changed again.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Unresolved,
    Yes,
    No,
}

impl Outcome {
    /// The winning side, if the market has one.
    pub fn winning_side(self) -> Option<Side> {
        match self {
            Outcome::Unresolved => None,
            Outcome::Yes => Some(Side::Yes),
            Outcome::No => Some(Side::No),
        }
    }
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Yes => Outcome::Yes,
            Side::No => Outcome::No,
        }
    }
}

/// Lifecycle phase of a market, derived lazily from the clock and the
/// presence of a proposal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketPhase {
    /// Accepting stakes (`now < end_time`).
    Open,
    /// Past `end_time`, awaiting an outcome proposal.
    Ended,
    /// A proposal is live and inside its liveness window.
    ProposalPending,
    /// The live proposal has been challenged.
    Challenged,
    /// Outcome fixed, rewards distributed, claims open.
    Resolved,
}

/// Immutable description of a market, fixed at creation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MarketCore {
    /// The binary question the market asks.
    pub question: String,

    /// Free-form category (e.g. "sports", "crypto").
    pub category: String,

    /// Staking closes at this timestamp.
    pub end_time: Timestamp,

    /// Account that created (and seeded) the market.
    pub creator: AccountId,

    /// Scheduled resolution timestamp; payouts are additionally buffered by
    /// the challenge period after this point.
    pub resolution_time: Timestamp,
}

/// Mutable per-market totals and resolution status.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MarketState {
    /// Sum of all net stakes on both sides.
    pub total_stake: Balance,
    /// Sum of net YES stakes.
    pub yes_stake: Balance,
    /// Sum of net NO stakes.
    pub no_stake: Balance,
    /// Fee-funded pool paid out at resolution.
    pub reward_pool: Balance,
    /// Whether the outcome is fixed and rewards are distributed.
    pub resolved: bool,
    /// Winning side once resolved.
    pub outcome: Outcome,
    /// Whether the live proposal has been challenged.
    pub challenged: bool,
    /// Bond posted by the challenger.
    pub challenge_stake: Balance,
    /// The challenger, once a challenge lands.
    pub challenger: Option<AccountId>,
    /// Sum of units over all YES stakes.
    pub total_yes_units: Balance,
    /// Sum of units over all NO stakes.
    pub total_no_units: Balance,
}

/// A market: immutable core plus mutable state.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Market {
    pub core: MarketCore,
    pub state: MarketState,
}

impl Market {
    /// Whether the market still accepts stakes.
    pub fn is_open(&self, now: Timestamp) -> bool {
        now < self.core.end_time
    }

    /// Net stake total on one side.
    pub fn side_stake(&self, side: Side) -> Balance {
        match side {
            Side::Yes => self.state.yes_stake,
            Side::No => self.state.no_stake,
        }
    }

    /// Unit total on one side.
    pub fn side_units(&self, side: Side) -> Balance {
        match side {
            Side::Yes => self.state.total_yes_units,
            Side::No => self.state.total_no_units,
        }
    }

    /// Record a net stake and its units into the side totals.
    pub fn add_stake_totals(&mut self, side: Side, amount: Balance, units: Balance) {
        self.state.total_stake += amount;
        match side {
            Side::Yes => {
                self.state.yes_stake += amount;
                self.state.total_yes_units += units;
            }
            Side::No => {
                self.state.no_stake += amount;
                self.state.total_no_units += units;
            }
        }
    }
}

/// Owns every market, indexed by a dense monotonically increasing id.
///
/// Ids are handed out in creation order and never reused; `id >= count`
/// means the market does not exist.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct MarketRegistry {
    markets: Vec<Market>,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created market and return its id.
    pub fn insert(&mut self, core: MarketCore) -> MarketId {
        let id = self.markets.len() as MarketId;
        self.markets.push(Market {
            core,
            state: MarketState::default(),
        });
        id
    }

    /// Number of markets ever created.
    pub fn count(&self) -> u64 {
        self.markets.len() as u64
    }

    pub fn get(&self, market_id: MarketId) -> Result<&Market> {
        self.markets
            .get(market_id as usize)
            .ok_or(Error::MarketNotFound { market_id })
    }

    pub fn get_mut(&mut self, market_id: MarketId) -> Result<&mut Market> {
        self.markets
            .get_mut(market_id as usize)
            .ok_or(Error::MarketNotFound { market_id })
    }

    /// Iterate all markets with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (MarketId, &Market)> {
        self.markets
            .iter()
            .enumerate()
            .map(|(id, market)| (id as MarketId, market))
    }
}
