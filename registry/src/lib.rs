//! Off-chain winner registry.
//!
//! The registry answers "is this email eligible, and has it already been
//! issued a code" and records issuance and redemption. It is eventually
//! consistent with the ledger; the ledger stays authoritative for whether an
//! identity has claimed.
//!
//! Gift assignment lives here too: a pure weighted selection over the catalog
//! plus an explicit optimistic-retry loop against a versioned counter store.

pub mod assignment;
pub mod error;
pub mod gift;
pub mod registry;

pub use assignment::{
    assign_gift, GiftCounterStore, MemoryGiftCounter, Versioned, DEFAULT_MAX_ATTEMPTS,
};
pub use error::RegistryError;
pub use gift::{select_gift, GiftCatalog, GiftCounts, GiftKind, GiftRule};
pub use registry::{
    ClaimStatus, Eligibility, IssuanceRecord, MemoryRegistry, WaitlistEntry, WinnerRegistry,
};
