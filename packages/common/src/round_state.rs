#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a contest round.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Configured but not started yet.
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "scheduled"))]
    Scheduled,
    /// Counting down; submissions may be admitted.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "active"))]
    Active,
    /// Countdown frozen; consumed budget kept in `elapsed_ms`.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "paused"))]
    Paused,
    /// Terminal.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ended"))]
    Ended,
}

impl RoundState {
    /// Returns true once the round can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
