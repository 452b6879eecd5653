//! Booth-staff issuance flow.
//!
//! Before anything is signed the desk confirms the email is a token winner on
//! the waitlist and that the ledger has not already paid it. A winner who
//! already holds an unused code gets that code back, so at most one live
//! authorization exists per identity.

use claim_crypto::{hash_email, normalize_email};
use claim_ledger::LedgerReader;
use claim_registry::{Eligibility, IssuanceRecord, WinnerRegistry};
use claim_types::{Address, ClaimCode, Clock, KeyPair, Nonce};
use rand::Rng;
use tracing::{info, warn};

use crate::error::IssuerError;
use crate::signer::{generate_nonce, issue, Authorization};

const DEFAULT_NONCE_DRAWS: u32 = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A new authorization was signed and recorded.
    Issued {
        authorization: Authorization,
        record: IssuanceRecord,
    },
    /// The winner already holds an unused code.
    Existing(IssuanceRecord),
}

impl IssueOutcome {
    pub fn code(&self) -> ClaimCode {
        match self {
            Self::Issued { record, .. } | Self::Existing(record) => record.code,
        }
    }

    pub fn record(&self) -> &IssuanceRecord {
        match self {
            Self::Issued { record, .. } | Self::Existing(record) => record,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Issued { .. })
    }
}

/// Accept only `local@domain.tld` without whitespace.
pub fn validate_email(email: &str) -> Result<(), IssuerError> {
    let email = email.trim();
    let invalid = || IssuerError::InvalidEmail(email.to_string());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

pub struct IssuanceDesk<G, L, C> {
    registry: G,
    ledger: L,
    clock: C,
    authority: KeyPair,
    nonce_draws: u32,
}

impl<G, L, C> IssuanceDesk<G, L, C>
where
    G: WinnerRegistry,
    L: LedgerReader,
    C: Clock,
{
    pub fn new(registry: G, ledger: L, clock: C, authority: KeyPair) -> Self {
        Self {
            registry,
            ledger,
            clock,
            authority,
            nonce_draws: DEFAULT_NONCE_DRAWS,
        }
    }

    pub fn with_nonce_draws(mut self, draws: u32) -> Self {
        self.nonce_draws = draws.max(1);
        self
    }

    pub fn authority(&self) -> Address {
        self.authority.address
    }

    pub fn registry(&self) -> &G {
        &self.registry
    }

    /// Hand out a claim code for `email`, payable to `recipient`.
    pub async fn issue<R: Rng>(
        &self,
        email: &str,
        recipient: &Address,
        rng: &mut R,
    ) -> Result<IssueOutcome, IssuerError> {
        validate_email(email)?;
        let identity = hash_email(email)?;

        let pending = match self.registry.lookup_eligibility(email).await? {
            Eligibility::NotRegistered => return Err(IssuerError::NotRegistered),
            Eligibility::Ineligible { gift } => return Err(IssuerError::NotEligible { gift }),
            Eligibility::Eligible { pending } => pending,
        };

        if self.ledger.has_email_claimed(&identity).await? {
            return Err(IssuerError::AlreadyClaimed);
        }

        if let Some(record) = pending {
            if record.recipient != *recipient {
                warn!(
                    identity = %identity,
                    issued_to = %record.recipient,
                    requested = %recipient,
                    "returning existing code bound to a different wallet"
                );
            }
            info!(identity = %identity, "existing claim code returned");
            return Ok(IssueOutcome::Existing(record));
        }

        let nonce = self.draw_unused_nonce(rng).await?;
        let authorization = issue(email, recipient, nonce, &self.authority.private)?;
        let record = IssuanceRecord {
            identity,
            email: normalize_email(email),
            recipient: *recipient,
            code: authorization.claim_code(),
            issued_at: self.clock.now(),
            used: false,
        };
        self.registry.record_issuance(record.clone()).await?;

        info!(identity = %identity, recipient = %recipient, nonce = %nonce, "claim code issued");
        Ok(IssueOutcome::Issued {
            authorization,
            record,
        })
    }

    /// Bring the registry in line with the ledger for one email. Returns
    /// `true` if the outstanding code was marked redeemed.
    pub async fn reconcile(&self, email: &str) -> Result<bool, IssuerError> {
        let identity = hash_email(email)?;
        if !self.ledger.has_email_claimed(&identity).await? {
            return Ok(false);
        }
        Ok(self.registry.mark_redeemed(&identity).await?)
    }

    async fn draw_unused_nonce<R: Rng>(&self, rng: &mut R) -> Result<Nonce, IssuerError> {
        for _ in 0..self.nonce_draws {
            let nonce = generate_nonce(rng);
            if !self.ledger.is_nonce_used(&nonce).await? {
                return Ok(nonce);
            }
        }
        Err(IssuerError::NonceExhausted {
            attempts: self.nonce_draws,
        })
    }
}
