//! # Dispute resolution
//!
//! Turns a proposed outcome into a finalized one under adversarial
//! incentives. After a market ends, anyone may propose its outcome by
//! posting a bond; during the liveness window anyone may challenge by
//! posting a counter-bond. An unchallenged proposal finalizes as proposed;
//! a challenged one is judged by the privileged resolver, with the losing
//! bond forfeited.

use crate::error::{Error, Result};
use crate::market::{Market, Side};
use crate::{AccountId, Balance, MarketId, Timestamp, LIVENESS_WINDOW, MIN_CHALLENGE_BOND, MIN_PROPOSAL_BOND};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An outcome proposal under bond.
///
/// At most one proposal exists per market; a second proposal while one is
/// live is rejected rather than replacing it, so the recorded proposer and
/// bond stay meaningful for the whole liveness window.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Proposal {
    pub proposed_outcome: Side,
    pub proposer: AccountId,
    pub bond: Balance,
    pub liveness_deadline: Timestamp,
    pub resolved: bool,
}

/// The result of settling a proposal: the winning side, the bond refunds
/// owed through the balance ledger, and any bond value forfeited into the
/// market's reward pool.
#[derive(Clone, Debug)]
pub struct Settlement {
    pub winning: Side,
    pub refunds: Vec<(AccountId, Balance)>,
    pub forfeited: Balance,
}

/// Owns every proposal, keyed by market id.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DisputeResolver {
    proposals: HashMap<MarketId, Proposal>,
}

impl DisputeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposal(&self, market_id: MarketId) -> Option<&Proposal> {
        self.proposals.get(&market_id)
    }

    /// Record an outcome proposal for an ended, unresolved market.
    ///
    /// The liveness deadline is set one day out; until then the proposal
    /// may be challenged.
    pub fn propose(
        &mut self,
        market_id: MarketId,
        market: &Market,
        proposer: AccountId,
        outcome: Side,
        bond: Balance,
        now: Timestamp,
    ) -> Result<&Proposal> {
        if market.state.resolved {
            return Err(Error::AlreadyResolved { market_id });
        }
        if now < market.core.end_time {
            return Err(Error::InvalidTiming(format!(
                "market {market_id} has not ended yet"
            )));
        }
        if bond < MIN_PROPOSAL_BOND {
            return Err(Error::InsufficientValue(format!(
                "proposal bond {bond} below minimum {MIN_PROPOSAL_BOND}"
            )));
        }
        if self.proposals.contains_key(&market_id) {
            return Err(Error::ProposalPending { market_id });
        }

        let proposal = Proposal {
            proposed_outcome: outcome,
            proposer,
            bond,
            liveness_deadline: now + LIVENESS_WINDOW,
            resolved: false,
        };
        Ok(self.proposals.entry(market_id).or_insert(proposal))
    }

    /// Challenge the live proposal inside its liveness window.
    ///
    /// A proposal can be challenged exactly once; the challenger and their
    /// bond are recorded on the market state.
    pub fn challenge(
        &mut self,
        market_id: MarketId,
        market: &mut Market,
        challenger: AccountId,
        bond: Balance,
        now: Timestamp,
    ) -> Result<()> {
        let proposal = self
            .proposals
            .get(&market_id)
            .ok_or(Error::NoActiveProposal { market_id })?;
        if proposal.resolved {
            return Err(Error::AlreadyResolved { market_id });
        }
        if market.state.challenged {
            return Err(Error::AlreadyChallenged { market_id });
        }
        if now >= proposal.liveness_deadline {
            return Err(Error::InvalidTiming(format!(
                "liveness window for market {market_id} has expired"
            )));
        }
        if bond < MIN_CHALLENGE_BOND {
            return Err(Error::InsufficientValue(format!(
                "challenge bond {bond} below minimum {MIN_CHALLENGE_BOND}"
            )));
        }

        market.state.challenged = true;
        market.state.challenger = Some(challenger);
        market.state.challenge_stake += bond;
        Ok(())
    }

    /// Settle an unchallenged proposal after its liveness window.
    ///
    /// The outcome becomes the proposed outcome and the proposer's bond is
    /// refunded in full.
    pub fn finalize(
        &mut self,
        market_id: MarketId,
        market: &Market,
        now: Timestamp,
    ) -> Result<Settlement> {
        let proposal = self
            .proposals
            .get_mut(&market_id)
            .ok_or(Error::NoActiveProposal { market_id })?;
        if proposal.resolved {
            return Err(Error::AlreadyResolved { market_id });
        }
        if market.state.challenged {
            return Err(Error::AlreadyChallenged { market_id });
        }
        if now < proposal.liveness_deadline {
            return Err(Error::InvalidTiming(format!(
                "liveness window for market {market_id} is still open"
            )));
        }

        proposal.resolved = true;
        Ok(Settlement {
            winning: proposal.proposed_outcome,
            refunds: vec![(proposal.proposer.clone(), proposal.bond)],
            forfeited: 0,
        })
    }

    /// Judge a challenged proposal.
    ///
    /// Correct proposal: the proposer recovers their bond plus the
    /// challenger's forfeited bond. Incorrect proposal: the challenger is
    /// refunded, the proposer's bond is forfeited into the reward pool, and
    /// the outcome becomes the opposite side (the market is binary).
    pub fn resolve(
        &mut self,
        market_id: MarketId,
        market: &Market,
        is_proposal_correct: bool,
    ) -> Result<Settlement> {
        let proposal = self
            .proposals
            .get_mut(&market_id)
            .ok_or(Error::NoActiveProposal { market_id })?;
        if proposal.resolved {
            return Err(Error::AlreadyResolved { market_id });
        }
        if !market.state.challenged {
            return Err(Error::NotChallenged { market_id });
        }
        let Some(challenger) = market.state.challenger.clone() else {
            return Err(Error::NotChallenged { market_id });
        };

        proposal.resolved = true;
        let settlement = if is_proposal_correct {
            Settlement {
                winning: proposal.proposed_outcome,
                refunds: vec![(
                    proposal.proposer.clone(),
                    proposal.bond + market.state.challenge_stake,
                )],
                forfeited: 0,
            }
        } else {
            Settlement {
                winning: proposal.proposed_outcome.opposite(),
                refunds: vec![(challenger, market.state.challenge_stake)],
                forfeited: proposal.bond,
            }
        };
        Ok(settlement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketCore, MarketState};
    use crate::PRECISION;

    const END: Timestamp = 1_000;

    fn market() -> Market {
        Market {
            core: MarketCore {
                question: "Will the bridge reopen this year?".to_string(),
                category: "infrastructure".to_string(),
                end_time: END,
                creator: "alice".to_string(),
                resolution_time: END,
            },
            state: MarketState::default(),
        }
    }

    fn bond() -> Balance {
        MIN_PROPOSAL_BOND
    }

    #[test]
    fn propose_requires_ended_market() {
        let mut resolver = DisputeResolver::new();
        let err = resolver
            .propose(0, &market(), "peggy".into(), Side::Yes, bond(), END - 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTiming(_)));
    }

    #[test]
    fn propose_requires_minimum_bond() {
        let mut resolver = DisputeResolver::new();
        let err = resolver
            .propose(0, &market(), "peggy".into(), Side::Yes, bond() - 1, END)
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientValue(_)));
    }

    #[test]
    fn second_proposal_is_rejected_while_pending() {
        let mut resolver = DisputeResolver::new();
        resolver
            .propose(0, &market(), "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        let err = resolver
            .propose(0, &market(), "mallory".into(), Side::No, bond(), END)
            .unwrap_err();
        assert_eq!(err, Error::ProposalPending { market_id: 0 });
    }

    #[test]
    fn challenge_after_liveness_deadline_fails() {
        let mut resolver = DisputeResolver::new();
        let mut m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        let err = resolver
            .challenge(0, &mut m, "vic".into(), bond(), END + LIVENESS_WINDOW)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTiming(_)));
    }

    #[test]
    fn challenge_records_challenger_once() {
        let mut resolver = DisputeResolver::new();
        let mut m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        resolver
            .challenge(0, &mut m, "vic".into(), 2 * PRECISION, END + 10)
            .unwrap();
        assert!(m.state.challenged);
        assert_eq!(m.state.challenger.as_deref(), Some("vic"));
        assert_eq!(m.state.challenge_stake, 2 * PRECISION);

        let err = resolver
            .challenge(0, &mut m, "eve".into(), bond(), END + 20)
            .unwrap_err();
        assert_eq!(err, Error::AlreadyChallenged { market_id: 0 });
    }

    #[test]
    fn finalize_before_deadline_fails() {
        let mut resolver = DisputeResolver::new();
        let m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        let err = resolver
            .finalize(0, &m, END + LIVENESS_WINDOW - 1)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTiming(_)));
    }

    #[test]
    fn finalize_refunds_proposer_and_fixes_outcome() {
        let mut resolver = DisputeResolver::new();
        let m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::No, bond(), END)
            .unwrap();
        let settlement = resolver.finalize(0, &m, END + LIVENESS_WINDOW).unwrap();
        assert_eq!(settlement.winning, Side::No);
        assert_eq!(settlement.refunds, vec![("peggy".to_string(), bond())]);
        assert_eq!(settlement.forfeited, 0);

        // A second finalization is a double resolution.
        let err = resolver.finalize(0, &m, END + LIVENESS_WINDOW).unwrap_err();
        assert_eq!(err, Error::AlreadyResolved { market_id: 0 });
    }

    #[test]
    fn finalize_on_challenged_proposal_fails() {
        let mut resolver = DisputeResolver::new();
        let mut m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        resolver
            .challenge(0, &mut m, "vic".into(), bond(), END + 10)
            .unwrap();
        let err = resolver.finalize(0, &m, END + LIVENESS_WINDOW).unwrap_err();
        assert_eq!(err, Error::AlreadyChallenged { market_id: 0 });
    }

    #[test]
    fn resolve_correct_awards_challenge_stake_to_proposer() {
        let mut resolver = DisputeResolver::new();
        let mut m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, 3 * PRECISION, END)
            .unwrap();
        resolver
            .challenge(0, &mut m, "vic".into(), 2 * PRECISION, END + 10)
            .unwrap();
        let settlement = resolver.resolve(0, &m, true).unwrap();
        assert_eq!(settlement.winning, Side::Yes);
        assert_eq!(
            settlement.refunds,
            vec![("peggy".to_string(), 5 * PRECISION)]
        );
        assert_eq!(settlement.forfeited, 0);
    }

    #[test]
    fn resolve_incorrect_forfeits_proposer_bond_and_flips_outcome() {
        let mut resolver = DisputeResolver::new();
        let mut m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, 3 * PRECISION, END)
            .unwrap();
        resolver
            .challenge(0, &mut m, "vic".into(), 2 * PRECISION, END + 10)
            .unwrap();
        let settlement = resolver.resolve(0, &m, false).unwrap();
        assert_eq!(settlement.winning, Side::No);
        assert_eq!(settlement.refunds, vec![("vic".to_string(), 2 * PRECISION)]);
        assert_eq!(settlement.forfeited, 3 * PRECISION);
    }

    #[test]
    fn resolve_requires_a_challenge() {
        let mut resolver = DisputeResolver::new();
        let m = market();
        resolver
            .propose(0, &m, "peggy".into(), Side::Yes, bond(), END)
            .unwrap();
        let err = resolver.resolve(0, &m, true).unwrap_err();
        assert_eq!(err, Error::NotChallenged { market_id: 0 });
    }
}
