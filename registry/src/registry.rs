//! Winner registry capability and its in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use claim_crypto::{hash_email, normalize_email};
use claim_types::{Address, ClaimCode, IdentityToken, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::gift::GiftKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    #[default]
    None,
    Pending,
    Redeemed,
}

/// A waitlist member as the registry sees them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Normalized (trimmed, lower-cased) email.
    pub email: String,
    pub identity: IdentityToken,
    pub registered_at: Timestamp,
    pub gift: Option<GiftKind>,
    pub wallet: Option<Address>,
    pub claim_status: ClaimStatus,
}

/// A claim code handed out at the booth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    pub identity: IdentityToken,
    pub email: String,
    pub recipient: Address,
    pub code: ClaimCode,
    pub issued_at: Timestamp,
    pub used: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Eligibility {
    NotRegistered,
    /// Registered, but holds no gift or a gift that is not paid on the ledger.
    Ineligible { gift: Option<GiftKind> },
    /// A token winner, with the unused code already issued to them, if any.
    Eligible { pending: Option<IssuanceRecord> },
}

#[async_trait]
pub trait WinnerRegistry: Send + Sync {
    /// Add an email to the waitlist. Returns `false` if it was already there.
    async fn register(&self, email: &str, at: Timestamp) -> Result<bool, RegistryError>;

    async fn lookup_eligibility(&self, email: &str) -> Result<Eligibility, RegistryError>;

    async fn record_gift(&self, email: &str, gift: GiftKind) -> Result<(), RegistryError>;

    /// Store a freshly issued code. Replaces any earlier unused code.
    async fn record_issuance(&self, record: IssuanceRecord) -> Result<(), RegistryError>;

    /// Flag the identity's issued code as used. Returns `false` when there
    /// was no outstanding code.
    async fn mark_redeemed(&self, identity: &IdentityToken) -> Result<bool, RegistryError>;
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, WaitlistEntry>,
    issuances: HashMap<IdentityToken, IssuanceRecord>,
}

/// Registry held in process memory, keyed by normalized email.
#[derive(Default)]
pub struct MemoryRegistry {
    state: Mutex<RegistryState>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, email: &str) -> Option<WaitlistEntry> {
        self.lock().entries.get(&normalize_email(email)).cloned()
    }

    pub fn issuance(&self, identity: &IdentityToken) -> Option<IssuanceRecord> {
        self.lock().issuances.get(identity).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WinnerRegistry for MemoryRegistry {
    async fn register(&self, email: &str, at: Timestamp) -> Result<bool, RegistryError> {
        let identity = hash_email(email)?;
        let email = normalize_email(email);
        let mut state = self.lock();
        if state.entries.contains_key(&email) {
            return Ok(false);
        }
        debug!(identity = %identity, "waitlist entry added");
        state.entries.insert(
            email.clone(),
            WaitlistEntry {
                email,
                identity,
                registered_at: at,
                gift: None,
                wallet: None,
                claim_status: ClaimStatus::None,
            },
        );
        Ok(true)
    }

    async fn lookup_eligibility(&self, email: &str) -> Result<Eligibility, RegistryError> {
        let email = normalize_email(email);
        let state = self.lock();
        let Some(entry) = state.entries.get(&email) else {
            return Ok(Eligibility::NotRegistered);
        };
        match entry.gift {
            Some(gift) if gift.is_claimable() => {
                let pending = state
                    .issuances
                    .get(&entry.identity)
                    .filter(|record| !record.used)
                    .cloned();
                Ok(Eligibility::Eligible { pending })
            }
            gift => Ok(Eligibility::Ineligible { gift }),
        }
    }

    async fn record_gift(&self, email: &str, gift: GiftKind) -> Result<(), RegistryError> {
        let email = normalize_email(email);
        let mut state = self.lock();
        let entry = state
            .entries
            .get_mut(&email)
            .ok_or_else(|| RegistryError::NotRegistered(email.clone()))?;
        if entry.gift.is_some() {
            return Err(RegistryError::GiftAlreadyAssigned(email));
        }
        entry.gift = Some(gift);
        info!(identity = %entry.identity, gift = %gift, "gift recorded");
        Ok(())
    }

    async fn record_issuance(&self, record: IssuanceRecord) -> Result<(), RegistryError> {
        let email = normalize_email(&record.email);
        let mut state = self.lock();
        let entry = state
            .entries
            .get_mut(&email)
            .ok_or_else(|| RegistryError::NotRegistered(email.clone()))?;
        entry.wallet = Some(record.recipient);
        entry.claim_status = ClaimStatus::Pending;
        info!(identity = %record.identity, recipient = %record.recipient, "issuance recorded");
        state.issuances.insert(record.identity, record);
        Ok(())
    }

    async fn mark_redeemed(&self, identity: &IdentityToken) -> Result<bool, RegistryError> {
        let mut state = self.lock();
        let Some(record) = state.issuances.get_mut(identity).filter(|r| !r.used) else {
            return Ok(false);
        };
        record.used = true;
        let email = record.email.clone();
        if let Some(entry) = state.entries.get_mut(&normalize_email(&email)) {
            entry.claim_status = ClaimStatus::Redeemed;
        }
        info!(identity = %identity, "issuance redeemed");
        Ok(true)
    }
}
