//! Routing configuration, validation, and error types.
//!
//! [`RoutingConfig`] carries the run parameters for a
//! [`FlowRoutingEngine`](crate::FlowRoutingEngine). Build one with
//! [`RoutingConfig::new`] for the default geometry or
//! [`RoutingConfig::builder`] to override them; both paths end in
//! [`validate()`](RoutingConfig::validate).

use std::error::Error;
use std::fmt;

/// Default cell side length in metres.
pub const DEFAULT_PATCH_LENGTH: f64 = 30.0;

/// Seconds of travel applied to a velocity per routing step.
pub const DEFAULT_STEP_SECONDS: f64 = 60.0;

/// Attributions at or below this amount are dropped when a run finishes.
pub const DEFAULT_TRIM_THRESHOLD: f64 = 0.0001;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`RoutingConfig::validate()`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The builder was finished without an iteration count.
    MissingIterations,
    /// A run must perform at least one routing step.
    ZeroIterations,
    /// `patch_length` must be finite and positive.
    InvalidPatchLength {
        /// The rejected value.
        value: f64,
    },
    /// `step_seconds` must be finite and non-negative.
    InvalidStepSeconds {
        /// The rejected value.
        value: f64,
    },
    /// `trim_threshold` must be finite and non-negative.
    InvalidTrimThreshold {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIterations => write!(f, "iterations is required"),
            Self::ZeroIterations => write!(f, "iterations must be at least 1"),
            Self::InvalidPatchLength { value } => {
                write!(f, "patch_length must be finite and > 0, got {value}")
            }
            Self::InvalidStepSeconds { value } => {
                write!(f, "step_seconds must be finite and >= 0, got {value}")
            }
            Self::InvalidTrimThreshold { value } => {
                write!(f, "trim_threshold must be finite and >= 0, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── RoutingConfig ──────────────────────────────────────────────────

/// Parameters of one provenance run.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingConfig {
    /// Number of routing steps. Must be at least 1.
    pub iterations: u32,
    /// Cell side length in metres. Default: 30.0.
    pub patch_length: f64,
    /// Seconds of travel per step. Default: 60.0.
    pub step_seconds: f64,
    /// Materiality threshold applied once after the last step. Default: 0.0001.
    pub trim_threshold: f64,
}

/// Builder for [`RoutingConfig`].
///
/// Required field: `iterations`.
#[derive(Clone, Debug)]
pub struct RoutingConfigBuilder {
    iterations: Option<u32>,
    patch_length: f64,
    step_seconds: f64,
    trim_threshold: f64,
}

impl RoutingConfig {
    /// A config with `iterations` steps and default geometry and threshold.
    ///
    /// Returns `Err(ConfigError::ZeroIterations)` when `iterations == 0`.
    pub fn new(iterations: u32) -> Result<Self, ConfigError> {
        Self::builder().iterations(iterations).build()
    }

    /// Create a new builder with the default geometry and threshold.
    pub fn builder() -> RoutingConfigBuilder {
        RoutingConfigBuilder {
            iterations: None,
            patch_length: DEFAULT_PATCH_LENGTH,
            step_seconds: DEFAULT_STEP_SECONDS,
            trim_threshold: DEFAULT_TRIM_THRESHOLD,
        }
    }

    /// Check every structural invariant. The builder and the engine
    /// constructor both call this.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. At least one step.
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        // 2. Cell side is a divisor.
        if !self.patch_length.is_finite() || self.patch_length <= 0.0 {
            return Err(ConfigError::InvalidPatchLength {
                value: self.patch_length,
            });
        }
        // 3. Time factor may be zero (nothing moves) but not negative or NaN.
        if !self.step_seconds.is_finite() || self.step_seconds < 0.0 {
            return Err(ConfigError::InvalidStepSeconds {
                value: self.step_seconds,
            });
        }
        // 4. Trim threshold.
        if !self.trim_threshold.is_finite() || self.trim_threshold < 0.0 {
            return Err(ConfigError::InvalidTrimThreshold {
                value: self.trim_threshold,
            });
        }
        Ok(())
    }

    /// Displacement, in cells, produced by one step at 1 m/s.
    pub fn cells_per_unit_velocity(&self) -> f64 {
        self.step_seconds / self.patch_length
    }
}

impl RoutingConfigBuilder {
    /// Set the number of routing steps.
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Set the cell side length in metres.
    pub fn patch_length(mut self, metres: f64) -> Self {
        self.patch_length = metres;
        self
    }

    /// Set the seconds of travel per step.
    pub fn step_seconds(mut self, seconds: f64) -> Self {
        self.step_seconds = seconds;
        self
    }

    /// Set the trim threshold.
    pub fn trim_threshold(mut self, threshold: f64) -> Self {
        self.trim_threshold = threshold;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<RoutingConfig, ConfigError> {
        let iterations = self.iterations.ok_or(ConfigError::MissingIterations)?;
        let config = RoutingConfig {
            iterations,
            patch_length: self.patch_length,
            step_seconds: self.step_seconds,
            trim_threshold: self.trim_threshold,
        };
        config.validate()?;
        Ok(config)
    }
}
