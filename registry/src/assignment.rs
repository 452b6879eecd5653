//! Optimistic gift assignment.
//!
//! Read the counters with their version, choose a gift from that snapshot,
//! then write the increment only if nobody changed the counters in between.
//! On conflict, start over from a fresh read.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

use crate::error::RegistryError;
use crate::gift::{select_gift, GiftCatalog, GiftCounts, GiftKind};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A value paired with the version it was read at.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

#[async_trait]
pub trait GiftCounterStore: Send + Sync {
    async fn read_counts(&self) -> Result<Versioned<GiftCounts>, RegistryError>;

    /// Increment the counter for `kind` if the store is still at
    /// `expected_version`. Returns `false` when the version moved on.
    async fn try_increment(
        &self,
        expected_version: u64,
        kind: GiftKind,
    ) -> Result<bool, RegistryError>;
}

/// Draw a gift and commit it against the counter store.
pub async fn assign_gift<S, R>(
    store: &S,
    catalog: &GiftCatalog,
    rng: &mut R,
    max_attempts: u32,
) -> Result<GiftKind, RegistryError>
where
    S: GiftCounterStore + ?Sized,
    R: Rng,
{
    for attempt in 1..=max_attempts {
        let snapshot = store.read_counts().await?;
        let total = catalog.total_weight(&snapshot.value);
        if total == 0 {
            return Ok(GiftKind::BetterLuckNextTime);
        }

        let roll = rng.gen_range(0..total);
        let kind = select_gift(&snapshot.value, catalog, roll);
        if store.try_increment(snapshot.version, kind).await? {
            info!(gift = %kind, attempt, "gift assigned");
            return Ok(kind);
        }
        debug!(attempt, version = snapshot.version, "gift counters changed, retrying");
    }
    Err(RegistryError::Conflict {
        attempts: max_attempts,
    })
}

/// In-memory counter store.
#[derive(Default)]
pub struct MemoryGiftCounter {
    inner: Mutex<Versioned<GiftCounts>>,
}

impl MemoryGiftCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(counts: GiftCounts) -> Self {
        Self {
            inner: Mutex::new(Versioned {
                version: 0,
                value: counts,
            }),
        }
    }

    pub fn counts(&self) -> GiftCounts {
        self.lock().value.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Versioned<GiftCounts>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GiftCounterStore for MemoryGiftCounter {
    async fn read_counts(&self) -> Result<Versioned<GiftCounts>, RegistryError> {
        Ok(self.lock().clone())
    }

    async fn try_increment(
        &self,
        expected_version: u64,
        kind: GiftKind,
    ) -> Result<bool, RegistryError> {
        let mut inner = self.lock();
        if inner.version != expected_version {
            return Ok(false);
        }
        inner.value.increment(kind);
        inner.version += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Bumps the version behind the caller's back a fixed number of times.
    struct Contended {
        inner: MemoryGiftCounter,
        interference: AtomicU32,
    }

    #[async_trait]
    impl GiftCounterStore for Contended {
        async fn read_counts(&self) -> Result<Versioned<GiftCounts>, RegistryError> {
            self.inner.read_counts().await
        }

        async fn try_increment(
            &self,
            expected_version: u64,
            kind: GiftKind,
        ) -> Result<bool, RegistryError> {
            if self.interference.load(Ordering::SeqCst) > 0 {
                self.interference.fetch_sub(1, Ordering::SeqCst);
                // Another booth committed an energy drink first.
                self.inner
                    .try_increment(expected_version, GiftKind::EnergyDrink)
                    .await?;
                return Ok(false);
            }
            self.inner.try_increment(expected_version, kind).await
        }
    }

    #[tokio::test]
    async fn assigns_and_counts() {
        let store = MemoryGiftCounter::new();
        // StepRng(0, 0) always rolls zero, which lands on the first prize.
        let mut rng = StepRng::new(0, 0);
        let gift = assign_gift(&store, &GiftCatalog::default(), &mut rng, DEFAULT_MAX_ATTEMPTS)
            .await
            .unwrap();
        assert_eq!(gift, GiftKind::Usdc);
        assert_eq!(store.counts().get(GiftKind::Usdc), 1);
    }

    #[tokio::test]
    async fn exhausted_catalog_gives_consolation() {
        let store = MemoryGiftCounter::with_counts(
            GiftCounts::default()
                .with(GiftKind::Usdc, 10)
                .with(GiftKind::CardFeeDiscount, 5)
                .with(GiftKind::EnergyDrink, 50),
        );
        let mut rng = StepRng::new(0, 0);
        let gift = assign_gift(&store, &GiftCatalog::default(), &mut rng, 1)
            .await
            .unwrap();
        assert_eq!(gift, GiftKind::BetterLuckNextTime);
    }

    #[tokio::test]
    async fn retries_after_conflict() {
        let store = Contended {
            inner: MemoryGiftCounter::new(),
            interference: AtomicU32::new(2),
        };
        let mut rng = StepRng::new(0, 0);
        let gift = assign_gift(&store, &GiftCatalog::default(), &mut rng, 3)
            .await
            .unwrap();
        assert_eq!(gift, GiftKind::Usdc);
        assert_eq!(store.inner.counts().get(GiftKind::EnergyDrink), 2);
        assert_eq!(store.inner.counts().get(GiftKind::Usdc), 1);
    }

    #[tokio::test]
    async fn gives_up_when_contention_persists() {
        let store = Contended {
            inner: MemoryGiftCounter::new(),
            interference: AtomicU32::new(10),
        };
        let mut rng = StepRng::new(0, 0);
        let err = assign_gift(&store, &GiftCatalog::default(), &mut rng, 3)
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::Conflict { attempts: 3 });
        assert_eq!(store.inner.counts().get(GiftKind::Usdc), 0);
    }

    #[tokio::test]
    async fn caps_hold_under_many_assignments() {
        let store = MemoryGiftCounter::new();
        let catalog = GiftCatalog::default();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            assign_gift(&store, &catalog, &mut rng, DEFAULT_MAX_ATTEMPTS)
                .await
                .unwrap();
        }
        let counts = store.counts();
        assert!(counts.get(GiftKind::Usdc) <= 10);
        assert!(counts.get(GiftKind::CardFeeDiscount) <= 5);
        assert!(counts.get(GiftKind::EnergyDrink) <= 50);
    }
}
