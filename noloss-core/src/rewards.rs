//! # Reward distribution
//!
//! Splits a resolved market's fee-funded reward pool: 10% to the market
//! creator and 10% to the protocol account, credited immediately; the
//! remaining 80% belongs to the winning side and is computed lazily per
//! stake at claim time, so distribution never iterates the stake set.

use crate::error::{Error, Result};
use crate::ledger::BalanceLedger;
use crate::market::{Market, Side};
use crate::{
    Balance, MarketId, Timestamp, CHALLENGE_PERIOD, CREATOR_SHARE_PERCENT,
    PROTOCOL_SHARE_PERCENT, STAKER_SHARE_PERCENT,
};

/// Shares carved out of the reward pool at distribution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Distribution {
    pub creator_share: Balance,
    pub protocol_share: Balance,
    pub staker_pool: Balance,
}

/// Payouts may only finalize once the challenge period after the market's
/// scheduled resolution time has elapsed. This is a uniform buffer on top
/// of the liveness window already spent by the dispute protocol.
pub fn ensure_distribution_open(
    market_id: MarketId,
    market: &Market,
    now: Timestamp,
) -> Result<()> {
    if now < market.core.resolution_time + CHALLENGE_PERIOD {
        return Err(Error::InvalidTiming(format!(
            "challenge period for market {market_id} is not over"
        )));
    }
    Ok(())
}

/// Mark the market resolved with the winning side and credit the eager
/// shares of the reward pool.
///
/// The staker share is intentionally not pushed here; each winning stake
/// pulls its portion through `unstake`.
pub fn distribute(
    market: &mut Market,
    winning: Side,
    ledger: &mut BalanceLedger,
    protocol_account: &str,
) -> Distribution {
    let pool = market.state.reward_pool;
    let creator_share = pool * CREATOR_SHARE_PERCENT / 100;
    let protocol_share = pool * PROTOCOL_SHARE_PERCENT / 100;

    market.state.resolved = true;
    market.state.outcome = winning.into();
    ledger.credit(&market.core.creator, creator_share);
    ledger.credit(protocol_account, protocol_share);

    Distribution {
        creator_share,
        protocol_share,
        staker_pool: pool * STAKER_SHARE_PERCENT / 100,
    }
}

/// Reward owed to one winning stake, floor-divided so the aggregate over
/// all winning stakes never exceeds the 80% staker share.
pub fn stake_reward(
    units: Balance,
    reward_pool: Balance,
    total_winning_units: Balance,
) -> Balance {
    if total_winning_units == 0 {
        return 0;
    }
    units * (reward_pool * STAKER_SHARE_PERCENT / 100) / total_winning_units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketCore, MarketState, Outcome};

    fn market(reward_pool: Balance) -> Market {
        Market {
            core: MarketCore {
                question: "Will the vote pass?".to_string(),
                category: "politics".to_string(),
                end_time: 1_000,
                creator: "alice".to_string(),
                resolution_time: 1_000,
            },
            state: MarketState {
                reward_pool,
                ..MarketState::default()
            },
        }
    }

    #[test]
    fn distribution_gate_enforces_challenge_period() {
        let m = market(0);
        assert!(matches!(
            ensure_distribution_open(0, &m, 1_000 + CHALLENGE_PERIOD - 1),
            Err(Error::InvalidTiming(_))
        ));
        assert!(ensure_distribution_open(0, &m, 1_000 + CHALLENGE_PERIOD).is_ok());
    }

    #[test]
    fn distribute_credits_eager_shares_and_fixes_outcome() {
        let mut m = market(1_000);
        let mut ledger = BalanceLedger::new();
        let dist = distribute(&mut m, Side::Yes, &mut ledger, "protocol.owner");

        assert!(m.state.resolved);
        assert_eq!(m.state.outcome, Outcome::Yes);
        assert_eq!(dist.creator_share, 100);
        assert_eq!(dist.protocol_share, 100);
        assert_eq!(dist.staker_pool, 800);
        assert_eq!(ledger.balance_of("alice"), 100);
        assert_eq!(ledger.balance_of("protocol.owner"), 100);
    }

    #[test]
    fn stake_rewards_never_exceed_staker_share() {
        // Awkward unit totals force floor-division truncation.
        let pool = 1_003;
        let units = [7, 11, 13];
        let total: Balance = units.iter().sum();
        let paid: Balance = units
            .iter()
            .map(|&u| stake_reward(u, pool, total))
            .sum();
        assert!(paid <= pool * STAKER_SHARE_PERCENT / 100);
    }

    #[test]
    fn stake_reward_handles_empty_winning_side() {
        assert_eq!(stake_reward(0, 1_000, 0), 0);
    }
}
