//! Top-level error type for routing runs.

use std::error::Error;
use std::fmt;

use carbontrace_core::Cell;
use carbontrace_ledger::LedgerError;

use crate::config::ConfigError;

/// Errors returned by [`FlowRoutingEngine`](crate::FlowRoutingEngine) and
/// [`RoutingPlan::compile`](crate::RoutingPlan::compile).
#[derive(Clone, Debug, PartialEq)]
pub enum RoutingError {
    /// The routing configuration failed validation.
    Config(ConfigError),
    /// Ledger or table storage could not be built.
    Ledger(LedgerError),
    /// The hydrology reported a NaN or infinite velocity for an existing
    /// patch.
    NonFiniteVelocity {
        /// The offending patch.
        cell: Cell,
        /// Reported x velocity.
        vx: f64,
        /// Reported y velocity.
        vy: f64,
    },
    /// The hydrology has zero width or height.
    EmptyDomain,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Ledger(e) => write!(f, "ledger: {e}"),
            Self::NonFiniteVelocity { cell, vx, vy } => {
                write!(f, "non-finite velocity ({vx}, {vy}) at patch {cell}")
            }
            Self::EmptyDomain => write!(f, "hydrology grid has no cells"),
        }
    }
}

impl Error for RoutingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Ledger(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RoutingError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<LedgerError> for RoutingError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}
