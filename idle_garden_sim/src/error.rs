// Error types for the simulation's fallible entry points.
//
// Precondition failures during play (`PurchaseError`, `FertilizeError`) are
// ordinary outcomes: the sim reports them with an alert and a reject sound
// and carries on. `ConfigError`, `SaveError` and `LoadError` cover the data
// boundary. A failed load never touches the caller's live state because
// `save::from_json` builds a new `SimState` rather than patching one.
//
// See also: `plant.rs` for `PlacementOutcome`/`HarvestOutcome`, which are
// enum outcomes rather than errors.

use crate::types::AutomationKind;
use thiserror::Error;

/// Failure to parse or validate a `GameConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why an automation purchase was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("cannot afford a {kind}: costs {cost}, have {cash}")]
    InsufficientFunds {
        kind: AutomationKind,
        cost: i64,
        cash: i64,
    },
    #[error("no price configured for {0}")]
    NotForSale(AutomationKind),
}

/// Why a fertilizer application was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FertilizeError {
    #[error("no fertilizer in stock")]
    NoFertilizer,
    #[error("point is outside the soil grid")]
    OutsideGarden,
    #[error("garden is blocked by an open modal")]
    Blocked,
}

/// Failure to encode a save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure to load a save. The caller's state is left untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("save parse error at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("save validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl LoadError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoadError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_field() {
        let err = LoadError::invalid("$.plants[2].age", "expected stage seed, got withered");
        assert_eq!(
            err.to_string(),
            "save validation failed at $.plants[2].age: expected stage seed, got withered"
        );
    }

    #[test]
    fn purchase_error_reports_shortfall() {
        let err = PurchaseError::InsufficientFunds {
            kind: AutomationKind::Seller,
            cost: 350,
            cash: 5,
        };
        assert_eq!(err.to_string(), "cannot afford a seller: costs 350, have 5");
    }
}
