//! # Engine
//!
//! Composes the market registry, stake book, dispute resolver and balance
//! ledger behind the public state-mutating entry points, together with the
//! external collaborators (clock, value transfer, event sink).
//!
//! Every entry point is checks-then-effects: all preconditions are
//! validated before the first mutation, so a returned error means nothing
//! changed. The only external interaction (the outbound transfer inside
//! [`Engine::withdraw`]) runs strictly after the ledger debit and is
//! rolled back if it fails. Exclusive `&mut self` access is the mutual
//! exclusion that makes each operation atomic; restake touches its two
//! markets inside one such call, so the source stake cannot be
//! double-claimed.

use crate::amm::{compute_units, Stake, StakeBook};
use crate::clock::{Clock, SystemClock};
use crate::dispute::{DisputeResolver, Proposal, Settlement};
use crate::error::{Error, Result};
use crate::events::{EventSink, MarketEvent, NoopSink};
use crate::ledger::BalanceLedger;
use crate::market::{Market, MarketCore, MarketPhase, MarketRegistry, Side};
use crate::rewards;
use crate::transfer::{InMemoryTransfer, ValueTransfer};
use crate::{AccountId, Balance, MarketId, StakeIndex, Timestamp, PLATFORM_FEE_PERCENT};
use tracing::info;

/// The prediction-market ledger.
///
/// The configured owner account doubles as the privileged dispute resolver
/// and the recipient of the protocol share of every reward pool.
pub struct Engine {
    owner: AccountId,
    registry: MarketRegistry,
    stakes: StakeBook,
    dispute: DisputeResolver,
    ledger: BalanceLedger,
    clock: Box<dyn Clock>,
    transfer: Box<dyn ValueTransfer>,
    sink: Box<dyn EventSink>,
}

impl Engine {
    /// Engine with wall-clock time, an in-memory transfer rail and no
    /// event sink.
    pub fn new(owner: impl Into<AccountId>) -> Self {
        Self::with_collaborators(
            owner,
            Box::new(SystemClock),
            Box::new(InMemoryTransfer::new()),
            Box::new(NoopSink),
        )
    }

    /// Engine with explicit collaborators.
    pub fn with_collaborators(
        owner: impl Into<AccountId>,
        clock: Box<dyn Clock>,
        transfer: Box<dyn ValueTransfer>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            owner: owner.into(),
            registry: MarketRegistry::new(),
            stakes: StakeBook::new(),
            dispute: DisputeResolver::new(),
            ledger: BalanceLedger::new(),
            clock,
            transfer,
            sink,
        }
    }

    // === Queries ===

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn market(&self, market_id: MarketId) -> Result<&Market> {
        self.registry.get(market_id)
    }

    pub fn markets(&self) -> impl Iterator<Item = (MarketId, &Market)> {
        self.registry.iter()
    }

    pub fn market_count(&self) -> u64 {
        self.registry.count()
    }

    pub fn proposal(&self, market_id: MarketId) -> Option<&Proposal> {
        self.dispute.proposal(market_id)
    }

    pub fn stake(&self, market_id: MarketId, side: Side, index: StakeIndex) -> Result<&Stake> {
        self.stakes.get(market_id, side, index)
    }

    pub fn stakes_on(&self, market_id: MarketId, side: Side) -> &[Stake] {
        self.stakes.stakes(market_id, side)
    }

    pub fn balance_of(&self, account: &str) -> Balance {
        self.ledger.balance_of(account)
    }

    /// Current lifecycle phase, derived from the clock and proposal state.
    pub fn market_phase(&self, market_id: MarketId) -> Result<MarketPhase> {
        let market = self.registry.get(market_id)?;
        if market.state.resolved {
            return Ok(MarketPhase::Resolved);
        }
        if market.is_open(self.clock.now()) {
            return Ok(MarketPhase::Open);
        }
        Ok(match self.dispute.proposal(market_id) {
            None => MarketPhase::Ended,
            Some(_) if market.state.challenged => MarketPhase::Challenged,
            Some(_) => MarketPhase::ProposalPending,
        })
    }

    // === Market creation & staking ===

    /// Create a market and seed both sides equally from the creator's
    /// deposit, establishing a 50/50 price before any public stakes.
    ///
    /// Each seed half goes through the normal stake path (fee included) and
    /// becomes a claimable creator-owned stake at index 0 of its side.
    pub fn create_market(
        &mut self,
        caller: &str,
        question: impl Into<String>,
        category: impl Into<String>,
        end_time: Timestamp,
        resolution_time: Timestamp,
        seed: Balance,
    ) -> Result<MarketId> {
        let now = self.clock.now();
        if end_time <= now {
            return Err(Error::InvalidTiming(format!(
                "end time {end_time} is not in the future"
            )));
        }
        if resolution_time < end_time {
            return Err(Error::InvalidTiming(format!(
                "resolution time {resolution_time} precedes end time {end_time}"
            )));
        }
        let yes_half = seed / 2;
        let no_half = seed - yes_half;
        if yes_half == 0 || no_half == 0 {
            return Err(Error::InsufficientValue(format!(
                "seed deposit {seed} cannot cover both sides"
            )));
        }

        let question = question.into();
        let market_id = self.registry.insert(MarketCore {
            question: question.clone(),
            category: category.into(),
            end_time,
            creator: caller.to_string(),
            resolution_time,
        });
        info!(market_id, creator = caller, seed = %seed, "market created");
        self.sink.emit(&MarketEvent::MarketCreated {
            market_id,
            creator: caller.to_string(),
            question,
            end_time,
        });
        // Seeding cannot fail past this point: both halves are positive.
        self.record_stake(market_id, Side::Yes, caller, yes_half)?;
        self.record_stake(market_id, Side::No, caller, no_half)?;
        Ok(market_id)
    }

    /// Stake value on one side of an open market.
    ///
    /// A 1% platform fee accrues to the market's reward pool; the net
    /// amount buys units at the current implied probability and is the
    /// principal returned at claim time. Returns the stake's permanent
    /// index, needed for later claim or restake.
    pub fn place_stake(
        &mut self,
        caller: &str,
        market_id: MarketId,
        side: Side,
        value: Balance,
    ) -> Result<StakeIndex> {
        let now = self.clock.now();
        let market = self.registry.get(market_id)?;
        if !market.is_open(now) {
            return Err(Error::InvalidTiming(format!(
                "market {market_id} is no longer open for staking"
            )));
        }
        self.record_stake(market_id, side, caller, value)
    }

    /// Shared stake-recording path for seeds, public stakes and restakes.
    fn record_stake(
        &mut self,
        market_id: MarketId,
        side: Side,
        staker: &str,
        gross: Balance,
    ) -> Result<StakeIndex> {
        if gross == 0 {
            return Err(Error::InsufficientValue(
                "stake value must be positive".to_string(),
            ));
        }
        let fee = gross * PLATFORM_FEE_PERCENT / 100;
        let net = gross - fee;

        let market = self.registry.get_mut(market_id)?;
        let units = compute_units(net, market.side_stake(side), market.side_stake(side.opposite()));
        market.state.reward_pool += fee;
        market.add_stake_totals(side, net, units);
        let index = self
            .stakes
            .append(market_id, side, net, units, staker.to_string());

        info!(market_id, staker, %side, gross = %gross, units = %units, "stake placed");
        self.sink.emit(&MarketEvent::StakePlaced {
            market_id,
            side,
            staker: staker.to_string(),
            gross,
            net,
            units,
            stake_index: index,
        });
        Ok(index)
    }

    // === Dispute protocol ===

    /// Propose the outcome of an ended market under bond.
    pub fn propose_outcome(
        &mut self,
        caller: &str,
        market_id: MarketId,
        outcome: Side,
        bond: Balance,
    ) -> Result<()> {
        let now = self.clock.now();
        let market = self.registry.get(market_id)?;
        let proposal =
            self.dispute
                .propose(market_id, market, caller.to_string(), outcome, bond, now)?;
        let liveness_deadline = proposal.liveness_deadline;

        info!(market_id, proposer = caller, %outcome, "outcome proposed");
        self.sink.emit(&MarketEvent::OutcomeProposed {
            market_id,
            proposer: caller.to_string(),
            outcome,
            bond,
            liveness_deadline,
        });
        Ok(())
    }

    /// Challenge the live proposal inside its liveness window.
    pub fn challenge_proposal(
        &mut self,
        caller: &str,
        market_id: MarketId,
        bond: Balance,
    ) -> Result<()> {
        let now = self.clock.now();
        let market = self.registry.get_mut(market_id)?;
        self.dispute
            .challenge(market_id, market, caller.to_string(), bond, now)?;

        info!(market_id, challenger = caller, "proposal challenged");
        self.sink.emit(&MarketEvent::ProposalChallenged {
            market_id,
            challenger: caller.to_string(),
            bond,
        });
        Ok(())
    }

    /// Settle an unchallenged proposal once its liveness window and the
    /// payout buffer have both elapsed, then distribute rewards.
    pub fn finalize_proposal(&mut self, market_id: MarketId) -> Result<()> {
        let now = self.clock.now();
        let market = self.registry.get(market_id)?;
        if self.dispute.proposal(market_id).is_none() {
            return Err(Error::NoActiveProposal { market_id });
        }
        rewards::ensure_distribution_open(market_id, market, now)?;
        let settlement = self.dispute.finalize(market_id, market, now)?;
        self.apply_settlement(market_id, settlement, false)
    }

    /// Judge a challenged proposal. Only the configured owner may call
    /// this; either verdict resolves the market and distributes rewards.
    pub fn resolve_proposal(
        &mut self,
        caller: &str,
        market_id: MarketId,
        is_proposal_correct: bool,
    ) -> Result<()> {
        if caller != self.owner {
            return Err(Error::NotOwner {
                caller: caller.to_string(),
            });
        }
        let now = self.clock.now();
        let market = self.registry.get(market_id)?;
        if self.dispute.proposal(market_id).is_none() {
            return Err(Error::NoActiveProposal { market_id });
        }
        rewards::ensure_distribution_open(market_id, market, now)?;
        let settlement = self.dispute.resolve(market_id, market, is_proposal_correct)?;
        self.apply_settlement(market_id, settlement, true)
    }

    /// Apply a dispute settlement: fold forfeited bonds into the reward
    /// pool, credit refunds, fix the outcome and distribute the eager
    /// reward shares.
    fn apply_settlement(
        &mut self,
        market_id: MarketId,
        settlement: Settlement,
        challenged: bool,
    ) -> Result<()> {
        let market = self.registry.get_mut(market_id)?;
        market.state.reward_pool += settlement.forfeited;
        for (account, amount) in &settlement.refunds {
            self.ledger.credit(account, *amount);
        }
        let dist = rewards::distribute(market, settlement.winning, &mut self.ledger, &self.owner);

        info!(market_id, outcome = %settlement.winning, challenged, "market resolved");
        self.sink.emit(&MarketEvent::ProposalResolved {
            market_id,
            outcome: settlement.winning,
            challenged,
        });
        self.sink.emit(&MarketEvent::RewardsDistributed {
            market_id,
            creator_share: dist.creator_share,
            protocol_share: dist.protocol_share,
            staker_pool: dist.staker_pool,
        });
        Ok(())
    }

    // === Claims & withdrawal ===

    /// Claim a stake on a resolved market.
    ///
    /// Principal is always credited regardless of outcome; a stake on the
    /// winning side additionally receives its unit-proportional share of
    /// the staker reward pool. Returns `(principal, reward)`.
    pub fn unstake(
        &mut self,
        caller: &str,
        market_id: MarketId,
        side: Side,
        index: StakeIndex,
    ) -> Result<(Balance, Balance)> {
        let market = self.registry.get(market_id)?;
        if !market.state.resolved {
            return Err(Error::InvalidTiming(format!(
                "market {market_id} is not resolved"
            )));
        }
        let stake = self.stakes.get(market_id, side, index)?;
        if stake.staker != caller {
            return Err(Error::NotOwner {
                caller: caller.to_string(),
            });
        }
        if stake.claimed {
            return Err(Error::AlreadyClaimed {
                market_id,
                side,
                index,
            });
        }
        let principal = stake.amount;
        let reward = if market.state.outcome.winning_side() == Some(side) {
            rewards::stake_reward(stake.units, market.state.reward_pool, market.side_units(side))
        } else {
            0
        };

        self.stakes.get_mut(market_id, side, index)?.claimed = true;
        self.ledger.credit(caller, principal + reward);

        info!(market_id, staker = caller, %side, principal = %principal, reward = %reward, "stake claimed");
        self.sink.emit(&MarketEvent::StakeClaimed {
            market_id,
            side,
            stake_index: index,
            staker: caller.to_string(),
            principal,
            reward,
        });
        Ok((principal, reward))
    }

    /// Roll an unclaimed winning position forward into a different, still
    /// open market.
    ///
    /// Only the principal moves; the reward share in the source market is
    /// forfeited (claim it with [`Engine::unstake`] instead if the reward
    /// matters more than the roll). Returns the fresh stake's index in the
    /// new market.
    pub fn restake(
        &mut self,
        caller: &str,
        old_market_id: MarketId,
        new_market_id: MarketId,
        side: Side,
        index: StakeIndex,
    ) -> Result<StakeIndex> {
        let now = self.clock.now();
        let old_market = self.registry.get(old_market_id)?;
        let Some(winning) = old_market.state.outcome.winning_side() else {
            return Err(Error::InvalidTiming(format!(
                "market {old_market_id} is not resolved"
            )));
        };
        let stake = self.stakes.get(old_market_id, winning, index)?;
        if stake.staker != caller {
            return Err(Error::NotOwner {
                caller: caller.to_string(),
            });
        }
        if stake.claimed {
            return Err(Error::AlreadyClaimed {
                market_id: old_market_id,
                side: winning,
                index,
            });
        }
        let amount = stake.amount;
        let new_market = self.registry.get(new_market_id)?;
        if !new_market.is_open(now) {
            return Err(Error::InvalidTiming(format!(
                "market {new_market_id} is no longer open for staking"
            )));
        }

        self.stakes.get_mut(old_market_id, winning, index)?.claimed = true;
        let new_index = self.record_stake(new_market_id, side, caller, amount)?;

        info!(old_market_id, new_market_id, staker = caller, amount = %amount, "stake rolled forward");
        self.sink.emit(&MarketEvent::Restaked {
            old_market_id,
            new_market_id,
            side,
            amount,
            new_stake_index: new_index,
        });
        Ok(new_index)
    }

    /// Withdraw credited balance through the external transfer rail.
    ///
    /// The ledger debit happens before the transfer; a failed transfer
    /// rolls the debit back and the operation fails as a whole.
    pub fn withdraw(&mut self, caller: &str, amount: Balance) -> Result<()> {
        if amount == 0 {
            return Err(Error::InsufficientValue(
                "withdrawal amount must be positive".to_string(),
            ));
        }
        self.ledger.debit(caller, amount)?;
        if !self.transfer.transfer(caller, amount) {
            self.ledger.credit(caller, amount);
            return Err(Error::TransferFailed {
                account: caller.to_string(),
                amount,
            });
        }

        info!(account = caller, amount = %amount, "withdrawal");
        self.sink.emit(&MarketEvent::Withdrawal {
            account: caller.to_string(),
            amount,
        });
        Ok(())
    }
}
