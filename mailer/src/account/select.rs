//! Module dedicated to account selection.
//!
//! Selection is a pure function of the accounts, the selection
//! logic and the current time.

use std::fmt;

use chrono::Timelike;
use tracing::warn;

use super::AccountDescriptor;

const HOURS_PER_DAY: usize = 24;

/// The logic used to select the account to try next.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum SelectionLogic {
    /// Always prefer the first account.
    #[default]
    Default,

    /// Split the day into equal buckets, one per account, and pick
    /// the account matching the current hour.
    TimeOfDay,
}

impl SelectionLogic {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for SelectionLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::TimeOfDay => write!(f, "time-of-day"),
        }
    }
}

impl From<&str> for SelectionLogic {
    fn from(logic: &str) -> Self {
        match logic.trim().to_lowercase().replace('_', "-").as_str() {
            "default" => Self::Default,
            "time-of-day" => Self::TimeOfDay,
            logic => {
                warn!(logic, "unknown selection logic, using default");
                Self::Default
            }
        }
    }
}

impl From<String> for SelectionLogic {
    fn from(logic: String) -> Self {
        Self::from(logic.as_str())
    }
}

impl From<SelectionLogic> for String {
    fn from(logic: SelectionLogic) -> Self {
        logic.to_string()
    }
}

/// Select the index of the account to try next.
///
/// The returned index is always lower than the number of accounts,
/// except when there is no account at all, in which case 0 is
/// returned.
pub fn select(accounts: &[AccountDescriptor], logic: SelectionLogic, now: &impl Timelike) -> usize {
    select_index(accounts.len(), logic, now.hour())
}

/// Select the index of the account to try next, out of `len`
/// accounts, at the given hour of the day.
pub fn select_index(len: usize, logic: SelectionLogic, hour: u32) -> usize {
    if len <= 1 {
        return 0;
    }

    match logic {
        SelectionLogic::Default => 0,
        SelectionLogic::TimeOfDay => {
            let hour = (hour as usize).min(HOURS_PER_DAY - 1);
            (hour * len / HOURS_PER_DAY).min(len - 1)
        }
    }
}
