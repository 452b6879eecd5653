//! The claim ledger state machine.
//!
//! Per identity token: `Unclaimed -> Claimed` (terminal). Per nonce:
//! `Unused -> Used` (terminal). Every check runs before any mutation, and
//! check plus mutation happen under one lock.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use claim_crypto::{encode_claim_message, recover_signer};
use claim_types::{Address, IdentityToken, Nonce, Signature, TokenAmount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::abi::{encode_amount, encode_bool, LedgerCall};
use crate::error::LedgerError;
use crate::event::{EventBus, LedgerEvent};

/// One USDC at 6 decimals.
pub const DEFAULT_PAYOUT_UNIT: TokenAmount = TokenAmount::new(1_000_000);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub owner: Address,
    pub authority: Address,
    #[serde(default = "default_payout_unit")]
    pub payout_unit: TokenAmount,
}

fn default_payout_unit() -> TokenAmount {
    DEFAULT_PAYOUT_UNIT
}

impl LedgerConfig {
    pub fn new(owner: Address, authority: Address) -> Self {
        Self {
            owner,
            authority,
            payout_unit: DEFAULT_PAYOUT_UNIT,
        }
    }
}

/// Result of an accepted claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub identity: IdentityToken,
    pub recipient: Address,
    pub nonce: Nonce,
    pub amount: TokenAmount,
    pub pool_after: TokenAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub owner: Address,
    pub authority: Address,
    pub pool: TokenAmount,
    pub payout_unit: TokenAmount,
    pub claims: usize,
    pub nonces_used: usize,
    pub total_paid: TokenAmount,
    /// How many more claims the pool can pay for.
    pub claims_remaining: u128,
}

struct LedgerState {
    authority: Address,
    pool: TokenAmount,
    total_paid: TokenAmount,
    claimed: HashSet<IdentityToken>,
    used_nonces: HashSet<Nonce>,
    balances: HashMap<Address, TokenAmount>,
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    fn credit(&mut self, to: Address, amount: TokenAmount) -> Result<(), LedgerError> {
        let current = self.balances.get(&to).copied().unwrap_or_default();
        let next = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.balances.insert(to, next);
        Ok(())
    }
}

/// In-process claim ledger.
pub struct ClaimLedger {
    owner: Address,
    payout_unit: TokenAmount,
    state: Mutex<LedgerState>,
    bus: EventBus,
}

impl ClaimLedger {
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        if config.owner.is_zero() || config.authority.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if config.payout_unit.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self {
            owner: config.owner,
            payout_unit: config.payout_unit,
            state: Mutex::new(LedgerState {
                authority: config.authority,
                pool: TokenAmount::ZERO,
                total_paid: TokenAmount::ZERO,
                claimed: HashSet::new(),
                used_nonces: HashSet::new(),
                balances: HashMap::new(),
                events: Vec::new(),
            }),
            bus: EventBus::new(),
        })
    }

    /// Register an event listener. Listeners must be added before the ledger
    /// is shared.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        // A panic while holding the lock cannot leave a half-applied claim:
        // mutation only starts after every check has passed.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Redeem an authorization, paying one unit to `recipient`.
    pub fn claim(
        &self,
        identity: &IdentityToken,
        recipient: &Address,
        nonce: &Nonce,
        signature: &Signature,
    ) -> Result<ClaimReceipt, LedgerError> {
        // Recovery is pure, so it runs outside the lock.
        let digest = encode_claim_message(identity, recipient, nonce);
        let signer = recover_signer(&digest, signature).ok();

        let (receipt, event) = {
            let mut state = self.lock();
            if let Err(err) = self.check_claim(&state, identity, nonce, signer, recipient) {
                debug!(identity = %identity, nonce = %nonce, error = %err, "claim rejected");
                return Err(err);
            }

            let pool_after = state
                .pool
                .checked_sub(self.payout_unit)
                .ok_or(LedgerError::InsufficientPool)?;
            let total_paid = state
                .total_paid
                .checked_add(self.payout_unit)
                .ok_or(LedgerError::Overflow)?;
            state.credit(*recipient, self.payout_unit)?;
            state.claimed.insert(*identity);
            state.used_nonces.insert(*nonce);
            state.pool = pool_after;
            state.total_paid = total_paid;

            let event = LedgerEvent::RewardClaimed {
                identity: *identity,
                recipient: *recipient,
                amount: self.payout_unit,
                nonce: *nonce,
            };
            state.events.push(event.clone());

            let receipt = ClaimReceipt {
                identity: *identity,
                recipient: *recipient,
                nonce: *nonce,
                amount: self.payout_unit,
                pool_after,
            };
            (receipt, event)
        };

        info!(
            identity = %identity,
            recipient = %recipient,
            nonce = %nonce,
            pool = %receipt.pool_after,
            "reward claimed"
        );
        self.bus.emit(&event);
        Ok(receipt)
    }

    fn check_claim(
        &self,
        state: &LedgerState,
        identity: &IdentityToken,
        nonce: &Nonce,
        signer: Option<Address>,
        recipient: &Address,
    ) -> Result<(), LedgerError> {
        if state.claimed.contains(identity) {
            return Err(LedgerError::AlreadyClaimed);
        }
        if state.used_nonces.contains(nonce) {
            return Err(LedgerError::NonceReused);
        }
        if signer != Some(state.authority) {
            return Err(LedgerError::InvalidSignature);
        }
        if state.pool < self.payout_unit {
            return Err(LedgerError::InsufficientPool);
        }
        if recipient.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(())
    }

    pub fn has_email_claimed(&self, identity: &IdentityToken) -> bool {
        self.lock().claimed.contains(identity)
    }

    pub fn is_nonce_used(&self, nonce: &Nonce) -> bool {
        self.lock().used_nonces.contains(nonce)
    }

    /// Current reward pool.
    pub fn get_balance(&self) -> TokenAmount {
        self.lock().pool
    }

    /// Payout tokens held by `account` outside the pool.
    pub fn balance_of(&self, account: &Address) -> TokenAmount {
        self.lock().balances.get(account).copied().unwrap_or_default()
    }

    /// Owner-only top-up of the reward pool.
    pub fn fund(&self, caller: &Address, amount: TokenAmount) -> Result<TokenAmount, LedgerError> {
        self.ensure_owner(caller)?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let event = LedgerEvent::PoolFunded {
            from: *caller,
            amount,
        };
        let pool = {
            let mut state = self.lock();
            state.pool = state.pool.checked_add(amount).ok_or(LedgerError::Overflow)?;
            state.events.push(event.clone());
            state.pool
        };
        info!(amount = %amount, pool = %pool, "pool funded");
        self.bus.emit(&event);
        Ok(pool)
    }

    /// Owner-only replacement of the accepted signer. Authorizations signed by
    /// the previous authority stop working immediately.
    pub fn rotate_authority(
        &self,
        caller: &Address,
        authority: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if authority.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        let event = {
            let mut state = self.lock();
            let previous = std::mem::replace(&mut state.authority, authority);
            let event = LedgerEvent::AuthorityRotated {
                previous,
                current: authority,
            };
            state.events.push(event.clone());
            event
        };
        info!(authority = %authority, "authority rotated");
        self.bus.emit(&event);
        Ok(())
    }

    /// Owner-only recovery of unclaimed funds from the pool.
    pub fn withdraw(
        &self,
        caller: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> Result<TokenAmount, LedgerError> {
        self.ensure_owner(caller)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let event = LedgerEvent::Withdrawn { to: *to, amount };
        let pool = {
            let mut state = self.lock();
            let remaining = state
                .pool
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientPool)?;
            state.credit(*to, amount)?;
            state.pool = remaining;
            state.events.push(event.clone());
            remaining
        };
        info!(to = %to, amount = %amount, pool = %pool, "funds withdrawn");
        self.bus.emit(&event);
        Ok(pool)
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), LedgerError> {
        if *caller != self.owner {
            debug!(caller = %caller, "owner-only call rejected");
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }

    pub fn authority(&self) -> Address {
        self.lock().authority
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn payout_unit(&self) -> TokenAmount {
        self.payout_unit
    }

    pub fn summary(&self) -> LedgerSummary {
        let state = self.lock();
        LedgerSummary {
            owner: self.owner,
            authority: state.authority,
            pool: state.pool,
            payout_unit: self.payout_unit,
            claims: state.claimed.len(),
            nonces_used: state.used_nonces.len(),
            total_paid: state.total_paid,
            claims_remaining: state.pool.raw() / self.payout_unit.raw(),
        }
    }

    /// Audit log of every accepted state change, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.lock().events.clone()
    }

    /// Dispatch ABI-encoded call data sent by `sender`, returning the encoded
    /// return value.
    pub fn execute(&self, sender: &Address, call_data: &[u8]) -> Result<Vec<u8>, LedgerError> {
        match LedgerCall::decode(call_data)? {
            LedgerCall::ClaimReward {
                identity,
                recipient,
                nonce,
                signature,
            } => {
                self.claim(&identity, &recipient, &nonce, &signature)?;
                Ok(Vec::new())
            }
            LedgerCall::HasEmailClaimed(identity) => {
                Ok(encode_bool(self.has_email_claimed(&identity)))
            }
            LedgerCall::IsNonceUsed(nonce) => Ok(encode_bool(self.is_nonce_used(&nonce))),
            LedgerCall::GetBalance => Ok(encode_amount(self.get_balance()).to_vec()),
            LedgerCall::FundContract(amount) => {
                self.fund(sender, amount)?;
                Ok(Vec::new())
            }
            LedgerCall::RotateAuthority(authority) => {
                self.rotate_authority(sender, authority)?;
                Ok(Vec::new())
            }
            LedgerCall::Withdraw { to, amount } => {
                self.withdraw(sender, &to, amount)?;
                Ok(Vec::new())
            }
        }
    }
}
