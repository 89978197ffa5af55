//! Error types for the link controller
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Validation and capability failures caught before
//!   touching the hardware
//! - [`SfpError`]: Pluggable module conditions that callers may recover
//!   from by inserting or replacing the module
//! - [`IoError`]: Bounded-poll exhaustion and device readiness failures
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most controller methods.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and validation errors
///
/// These errors are detected synchronously, before any hardware side
/// effect, and indicate a request the adapter cannot satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Requested speed set has no overlap with the link capabilities
    InvalidLinkSettings,
    /// Address is broadcast, multicast, or all-zero
    InvalidAddress,
    /// Receive address index exceeds the table capacity
    RarIndexOutOfRange,
    /// NVM carries no SAN address block for this adapter
    NoSanAddress,
    /// Operation not supported on this port or device
    NotSupported,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidLinkSettings => "requested link settings unsupported",
            ConfigError::InvalidAddress => "invalid MAC address",
            ConfigError::RarIndexOutOfRange => "receive address index out of range",
            ConfigError::NoSanAddress => "no SAN address pointer in NVM",
            ConfigError::NotSupported => "operation not supported",
        }
    }
}

// =============================================================================
// SFP Module Errors
// =============================================================================

/// Pluggable module errors
///
/// These conditions are surfaced as a distinct domain because bring-up
/// treats most of them as non-fatal: the adapter finishes initializing
/// and link setup is retried after a module insertion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SfpError {
    /// No module seated in the cage
    NotPresent,
    /// Module identified but not on the supported list
    NotSupported,
    /// Module provisioning sequence did not finish
    SetupIncomplete,
}

impl core::fmt::Display for SfpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SfpError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SfpError::NotPresent => "SFP module not present",
            SfpError::NotSupported => "SFP module not supported",
            SfpError::SetupIncomplete => "SFP setup not complete",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Bounded-poll and device readiness errors
///
/// Every polling loop in the controller carries a hard iteration cap;
/// these variants report which budget was exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Flash/firmware load did not signal completion after reset
    FlashLoadTimeout,
    /// Auto-negotiation did not converge within the poll budget
    AutonegIncomplete,
    /// Firmware semaphore could not be acquired in time
    SemaphoreTimeout,
    /// Management firmware did not accept the command
    NotReady,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::FlashLoadTimeout => "flash load timed out",
            IoError::AutonegIncomplete => "auto-negotiation not complete",
            IoError::SemaphoreTimeout => "firmware semaphore timed out",
            IoError::NotReady => "device not ready",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidLinkSettings)) => { /* ... */ }
///     Err(Error::Sfp(SfpError::NotPresent)) => { /* ... */ }
///     Err(Error::Io(IoError::FlashLoadTimeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Pluggable module error
    Sfp(SfpError),
    /// I/O error
    Io(IoError),
}

impl Error {
    /// Returns `true` when the error reports a missing or partially
    /// provisioned pluggable module rather than a hard failure.
    ///
    /// Reset sequencing continues past these conditions so the adapter
    /// is usable once a supported module is seated.
    #[must_use]
    pub const fn is_sfp_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Sfp(SfpError::NotPresent | SfpError::SetupIncomplete)
        )
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Sfp(e) => write!(f, "sfp: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<SfpError> for Error {
    fn from(e: SfpError) -> Self {
        Error::Sfp(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for controller operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for validation operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for module operations
pub type SfpResult<T> = core::result::Result<T, SfpError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
