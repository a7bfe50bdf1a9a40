//! Error taxonomy for the decompression engine
//!
//! Three error families cover the ways a calculation can fail:
//! - [`ConfigurationError`] — invalid model settings or gas definitions
//! - [`PlanError`] — a dive plan that cannot be evaluated as described
//! - [`NumericError`] — a solver assumption violated during iteration
//!
//! All errors are reported synchronously by the call that produced them;
//! there are no partial results.

use std::fmt;

/// Invalid model settings or gas definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Depth unit string was neither "fsw" nor "msw"
    UnknownUnits(String),
    /// Critical nucleus radius outside the 0.2-1.35 micron validity range
    CriticalRadiusOutOfRange(f64),
    /// Nuclear regeneration time constant must be positive
    NonPositiveRegenerationTimeConstant(f64),
    /// Dive altitude exceeds the height of Mount Everest
    AltitudeAboveEverest(f64),
    /// Gas fractions do not sum to 1.0
    GasFractionsSum(f64),
    /// A single gas fraction outside [0, 1]
    GasFractionOutOfRange(f64),
    /// Non-acclimatized diver with no ascent-to-altitude time
    NoAscentTimeToAltitude,
    /// Starting acclimatized altitude at or above the dive altitude
    AcclimatizedAltitudeAboveDiveAltitude {
        /// Altitude the diver is acclimatized to
        starting: f64,
        /// Altitude of the planned dive
        dive: f64,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownUnits(units) => {
                write!(f, "unknown depth units {units:?}, expected \"fsw\" or \"msw\"")
            }
            ConfigurationError::CriticalRadiusOutOfRange(radius) => {
                write!(f, "critical radius {radius} microns outside 0.2-1.35 micron range")
            }
            ConfigurationError::NonPositiveRegenerationTimeConstant(tau) => {
                write!(f, "regeneration time constant {tau} must be positive")
            }
            ConfigurationError::AltitudeAboveEverest(altitude) => {
                write!(f, "altitude {altitude} is above Mount Everest")
            }
            ConfigurationError::GasFractionsSum(sum) => {
                write!(f, "gas fractions sum to {sum}, expected 1.0")
            }
            ConfigurationError::GasFractionOutOfRange(fraction) => {
                write!(f, "gas fraction {fraction} outside [0, 1]")
            }
            ConfigurationError::NoAscentTimeToAltitude => {
                write!(f, "non-acclimatized diver requires a positive ascent-to-altitude time")
            }
            ConfigurationError::AcclimatizedAltitudeAboveDiveAltitude { starting, dive } => {
                write!(
                    f,
                    "acclimatized altitude {starting} must be below dive altitude {dive}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A dive plan that cannot be evaluated as described.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Segment or NDL query referenced a gas label never declared
    UnknownGas(String),
    /// `calculate_decompression` called with neither segments nor a starting depth
    NothingToDecompressFrom,
    /// No declared deco gas is usable at the required depth
    NoUsableDecoGas {
        /// Depth at which a gas was needed
        depth: f64,
    },
    /// Profile code was not 1 (depth change), 2 (constant depth) or 99 (decompress)
    InvalidProfileCode(i32),
    /// Repetitive-dive flag was not 0 or 1
    InvalidRepetitiveCode(i32),
    /// Constant-depth profile entry ended before the current run time
    NonMonotonicRunTime {
        /// Run time at the start of the entry
        current: f64,
        /// Requested run time at the end of the entry
        requested: f64,
    },
    /// Operation is not implemented for this model
    Unsupported(&'static str),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::UnknownGas(label) => {
                write!(f, "gas {label:?} is not a registered bottom or deco gas")
            }
            PlanError::NothingToDecompressFrom => {
                write!(f, "no starting depth given and no dive segments registered")
            }
            PlanError::NoUsableDecoGas { depth } => {
                write!(f, "no deco gas is usable at {depth} m")
            }
            PlanError::InvalidProfileCode(code) => {
                write!(f, "invalid profile code {code}, expected 1, 2 or 99")
            }
            PlanError::InvalidRepetitiveCode(code) => {
                write!(f, "invalid repetitive dive code {code}, expected 0 or 1")
            }
            PlanError::NonMonotonicRunTime { current, requested } => {
                write!(
                    f,
                    "segment run time {requested} min is before current run time {current} min"
                )
            }
            PlanError::Unsupported(what) => write!(f, "unsupported operation: {what}"),
        }
    }
}

impl std::error::Error for PlanError {}

/// A solver assumption violated during iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericError {
    /// Root finder did not converge within the iteration cap
    RootFinderExceededIterations,
    /// Bracket endpoints evaluate to the same sign; no root between them
    BracketRootsShareSign,
    /// Deco stop step size pushes the first stop above the deco zone
    StepSizeTooLarge {
        /// Proposed first stop depth
        stop_depth: f64,
        /// Depth where the deco zone begins
        deco_zone: f64,
    },
    /// Off-gassing gradient cannot clear the current stop
    OffgassingGradientTooSmall {
        /// Stop depth that cannot be cleared
        stop_depth: f64,
    },
    /// A single deco stop exceeded the minute accumulation cap
    DecoStopLimitExceeded {
        /// Stop depth at which accumulation ran away
        depth: f64,
    },
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::RootFinderExceededIterations => {
                write!(f, "root finder exceeded 100 iterations without converging")
            }
            NumericError::BracketRootsShareSign => {
                write!(f, "root is not within brackets; endpoint signs agree")
            }
            NumericError::StepSizeTooLarge { stop_depth, deco_zone } => {
                write!(
                    f,
                    "step size too large: first stop {stop_depth} is above the deco zone at {deco_zone}"
                )
            }
            NumericError::OffgassingGradientTooSmall { stop_depth } => {
                write!(
                    f,
                    "off-gassing gradient is too small to decompress at the {stop_depth} stop"
                )
            }
            NumericError::DecoStopLimitExceeded { depth } => {
                write!(f, "deco stop at {depth} m exceeded the 10000 minute cap")
            }
        }
    }
}

impl std::error::Error for NumericError {}

/// Umbrella error for any engine failure.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoError {
    /// See [`ConfigurationError`]
    Configuration(ConfigurationError),
    /// See [`PlanError`]
    Plan(PlanError),
    /// See [`NumericError`]
    Numeric(NumericError),
}

impl fmt::Display for DecoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoError::Configuration(e) => write!(f, "{e}"),
            DecoError::Plan(e) => write!(f, "{e}"),
            DecoError::Numeric(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DecoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecoError::Configuration(e) => Some(e),
            DecoError::Plan(e) => Some(e),
            DecoError::Numeric(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for DecoError {
    fn from(e: ConfigurationError) -> Self {
        DecoError::Configuration(e)
    }
}

impl From<PlanError> for DecoError {
    fn from(e: PlanError) -> Self {
        DecoError::Plan(e)
    }
}

impl From<NumericError> for DecoError {
    fn from(e: NumericError) -> Self {
        DecoError::Numeric(e)
    }
}
