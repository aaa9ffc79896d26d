//! # Balance ledger
//!
//! Per-account credit mapping. The only entity through which value ever
//! reaches an account: reward distribution and dispute refunds credit it,
//! and an explicit withdrawal is the only debit.

use crate::error::{Error, Result};
use crate::{AccountId, Balance};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account id -> owed amount.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct BalanceLedger {
    balances: HashMap<AccountId, Balance>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount currently owed to an account. Unknown accounts owe zero.
    pub fn balance_of(&self, account: &str) -> Balance {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Credit an account, creating its entry on first use.
    pub fn credit(&mut self, account: &str, amount: Balance) {
        if amount == 0 {
            return;
        }
        *self.balances.entry(account.to_string()).or_insert(0) += amount;
    }

    /// Debit an account, failing without side effects if the balance is
    /// short.
    pub fn debit(&mut self, account: &str, amount: Balance) -> Result<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(Error::InsufficientBalance {
                available,
                required: amount,
            });
        }
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
        }
        Ok(())
    }

    /// Sum of everything currently owed, across all accounts.
    pub fn total_owed(&self) -> Balance {
        self.balances.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_then_debit_round_trips() {
        let mut ledger = BalanceLedger::new();
        ledger.credit("alice", 500);
        ledger.credit("alice", 250);
        assert_eq!(ledger.balance_of("alice"), 750);

        ledger.debit("alice", 700).unwrap();
        assert_eq!(ledger.balance_of("alice"), 50);
        assert_eq!(ledger.total_owed(), 50);
    }

    #[test]
    fn debit_beyond_balance_fails_atomically() {
        let mut ledger = BalanceLedger::new();
        ledger.credit("bob", 100);
        let err = ledger.debit("bob", 101).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientBalance {
                available: 100,
                required: 101
            }
        );
        assert_eq!(ledger.balance_of("bob"), 100);
    }

    #[test]
    fn unknown_accounts_owe_zero() {
        let ledger = BalanceLedger::new();
        assert_eq!(ledger.balance_of("nobody"), 0);
    }

    #[test]
    fn zero_credit_creates_no_entry() {
        let mut ledger = BalanceLedger::new();
        ledger.credit("carol", 0);
        assert_eq!(ledger.total_owed(), 0);
    }
}
