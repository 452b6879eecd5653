//! Gift catalog and weighted selection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a waitlist member can win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GiftKind {
    #[serde(rename = "1 USDC")]
    Usdc,
    #[serde(rename = "20% Off Card Fees")]
    CardFeeDiscount,
    #[serde(rename = "Energy Drink")]
    EnergyDrink,
    #[serde(rename = "Better Luck Next Time")]
    BetterLuckNextTime,
}

impl GiftKind {
    pub const ALL: [GiftKind; 4] = [
        GiftKind::Usdc,
        GiftKind::CardFeeDiscount,
        GiftKind::EnergyDrink,
        GiftKind::BetterLuckNextTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Usdc => "1 USDC",
            Self::CardFeeDiscount => "20% Off Card Fees",
            Self::EnergyDrink => "Energy Drink",
            Self::BetterLuckNextTime => "Better Luck Next Time",
        }
    }

    /// Only the token prize is paid out through the claim ledger.
    pub fn is_claimable(&self) -> bool {
        matches!(self, Self::Usdc)
    }
}

impl fmt::Display for GiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GiftKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown gift: {s}"))
    }
}

/// Cap and selection weight of one prize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftRule {
    pub kind: GiftKind,
    pub cap: u32,
    pub weight: u32,
}

/// The prizes on offer, in selection order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCatalog {
    pub rules: Vec<GiftRule>,
}

impl Default for GiftCatalog {
    fn default() -> Self {
        Self {
            rules: vec![
                GiftRule {
                    kind: GiftKind::Usdc,
                    cap: 10,
                    weight: 15,
                },
                GiftRule {
                    kind: GiftKind::CardFeeDiscount,
                    cap: 5,
                    weight: 10,
                },
                GiftRule {
                    kind: GiftKind::EnergyDrink,
                    cap: 50,
                    weight: 75,
                },
            ],
        }
    }
}

impl GiftCatalog {
    /// Rules whose cap has not been reached yet.
    pub fn available<'a>(&'a self, counts: &'a GiftCounts) -> impl Iterator<Item = &'a GiftRule> {
        self.rules
            .iter()
            .filter(move |rule| counts.get(rule.kind) < rule.cap)
    }

    /// Sum of weights over the rules still available.
    pub fn total_weight(&self, counts: &GiftCounts) -> u64 {
        self.available(counts).map(|rule| u64::from(rule.weight)).sum()
    }
}

/// Number of members holding each gift.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCounts(BTreeMap<GiftKind, u32>);

impl GiftCounts {
    pub fn get(&self, kind: GiftKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, kind: GiftKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    pub fn with(mut self, kind: GiftKind, count: u32) -> Self {
        self.0.insert(kind, count);
        self
    }
}

/// Pick a gift for `roll` in `[0, total_weight)`.
///
/// Prizes at or over their cap are skipped. With nothing left to give, or a
/// roll past the cumulative total, the result falls back to
/// [`GiftKind::BetterLuckNextTime`] and the first available prize respectively.
pub fn select_gift(counts: &GiftCounts, catalog: &GiftCatalog, roll: u64) -> GiftKind {
    let mut first = None;
    let mut cumulative = 0u64;
    for rule in catalog.available(counts).filter(|rule| rule.weight > 0) {
        first.get_or_insert(rule.kind);
        cumulative += u64::from(rule.weight);
        if roll < cumulative {
            return rule.kind;
        }
    }
    first.unwrap_or(GiftKind::BetterLuckNextTime)
}
