//! Payout token amounts.
//!
//! Amounts are represented as fixed-point integers (u128) in the token's raw
//! units to avoid floating-point errors. The reward token uses 6 decimals,
//! so one whole token is 1 000 000 raw units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimals of the reward token (USDC).
pub const TOKEN_DECIMALS: u32 = 6;

/// An amount of the payout token, in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens at the reward token's precision.
    pub fn from_tokens(tokens: u128) -> Self {
        Self(tokens * 10u128.pow(TOKEN_DECIMALS))
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Render with a fixed number of decimals, e.g. `1.500000` for 1 500 000 raw at 6.
    pub fn format_units(&self, decimals: u32) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let scale = 10u128.pow(decimals);
        format!(
            "{}.{:0width$}",
            self.0 / scale,
            self.0 % scale,
            width = decimals as usize
        )
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} USDC", self.format_units(TOKEN_DECIMALS))
    }
}
