//! Common test utilities for noloss-core tests.
//!
//! Shared fixtures across all modules: a hand-driven engine with a manual
//! clock, deterministic account names, and collaborator doubles for
//! observing events and forcing transfer failures.

use crate::clock::{Clock, ManualClock};
use crate::engine::Engine;
use crate::events::{EventSink, MarketEvent, NoopSink};
use crate::market::Side;
use crate::transfer::{InMemoryTransfer, ValueTransfer};
use crate::{Balance, MarketId, CHALLENGE_PERIOD, MIN_PROPOSAL_BOND};
use std::sync::{Arc, Mutex};

pub use crate::utils::tokens;

/// Common test constants
pub mod constants {
    use crate::Timestamp;

    /// Privileged resolver and protocol fee account
    pub const OWNER: &str = "protocol.owner";
    /// Market creator in the standard fixture
    pub const CREATOR: &str = "creator";
    pub const ALICE: &str = "alice";
    pub const BOB: &str = "bob";
    pub const CAROL: &str = "carol";
    /// Proposer used by `resolve_uncontested`
    pub const DAVE: &str = "dave";

    /// Fixture epoch (Nov 14, 2023)
    pub const T0: Timestamp = 1_700_000_000;
    /// Standard market close, one hour after the epoch
    pub const END: Timestamp = T0 + 3_600;
    /// Standard scheduled resolution time
    pub const RESOLUTION: Timestamp = END;
}

/// Event sink that stores everything it sees; clones share the buffer, so
/// a copy kept by the test can read what the engine-owned copy recorded.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<MarketEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<MarketEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &MarketEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Transfer rail that rejects every outbound transfer.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingTransfer;

impl ValueTransfer for FailingTransfer {
    fn transfer(&mut self, _to: &str, _amount: Balance) -> bool {
        false
    }
}

/// Engine with a manual clock starting at [`constants::T0`]. The returned
/// clock handle drives the engine's sense of time.
pub fn test_engine() -> (Engine, ManualClock) {
    let clock = ManualClock::new(constants::T0);
    let engine = Engine::with_collaborators(
        constants::OWNER,
        Box::new(clock.clone()),
        Box::new(InMemoryTransfer::new()),
        Box::new(NoopSink),
    );
    (engine, clock)
}

/// Create the standard fixture market: two-token seed, closing at
/// [`constants::END`].
pub fn standard_market(engine: &mut Engine) -> MarketId {
    engine
        .create_market(
            constants::CREATOR,
            "Will the home team win the final?",
            "sports",
            constants::END,
            constants::RESOLUTION,
            tokens(2),
        )
        .unwrap()
}

/// Walk a market through an uncontested resolution: propose `outcome`
/// once the market has ended, wait out the liveness window and the payout
/// buffer, and finalize.
pub fn resolve_uncontested(
    engine: &mut Engine,
    clock: &ManualClock,
    market_id: MarketId,
    outcome: Side,
) {
    let end_time = engine.market(market_id).unwrap().core.end_time;
    if clock.now() < end_time {
        clock.set(end_time);
    }
    engine
        .propose_outcome(constants::DAVE, market_id, outcome, MIN_PROPOSAL_BOND)
        .unwrap();
    let deadline = engine.proposal(market_id).unwrap().liveness_deadline;
    let gate = engine.market(market_id).unwrap().core.resolution_time + CHALLENGE_PERIOD;
    clock.set(deadline.max(gate));
    engine.finalize_proposal(market_id).unwrap();
}
