//! Events emitted by the claim ledger.

use claim_types::{Address, IdentityToken, Nonce, TokenAmount};
use serde::Serialize;

/// Ledger-level events, appended to the audit log and fanned out via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A claim was accepted and the payout transferred.
    RewardClaimed {
        identity: IdentityToken,
        recipient: Address,
        amount: TokenAmount,
        nonce: Nonce,
    },
    /// The owner topped up the reward pool.
    PoolFunded { from: Address, amount: TokenAmount },
    /// The accepted signer changed.
    AuthorityRotated { previous: Address, current: Address },
    /// The owner withdrew unclaimed funds.
    Withdrawn { to: Address, amount: TokenAmount },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners run inline on the emitting thread after the ledger lock has been
/// released, so a listener may read the ledger but should stay fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
