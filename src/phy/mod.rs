//! PHY driver seam
//!
//! Media-specific behavior lives behind [`PhyDriver`]: module
//! identification, PHY-level reset and, for copper parts, speed setup on
//! the PHY side of the MAC/PHY boundary. The controller resolves its
//! link-setup strategy from the reported [`MediaType`] once, right after
//! identification, and never re-dispatches per call.
//!
//! Implementations talk to the hardware through the same
//! [`RegisterBus`](crate::hal::RegisterBus) the controller uses, passed
//! per call, so one bus instance serves both layers.

use crate::error::Result;
use crate::hal::RegisterBus;
use crate::speed::LinkSpeed;

// =============================================================================
// Media Type
// =============================================================================

/// Physical media attached to the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MediaType {
    /// Not yet identified
    #[default]
    Unknown,
    /// Twisted-pair copper
    Copper,
    /// SFP+ optical or direct-attach
    Fiber,
    /// QSFP optical
    FiberQsfp,
    /// KX/KX4/KR backplane lanes
    Backplane,
    /// Virtual function, no physical media
    Virtual,
}

impl MediaType {
    /// Returns `true` for the pluggable optical variants
    #[must_use]
    pub const fn is_fiber(self) -> bool {
        matches!(self, MediaType::Fiber | MediaType::FiberQsfp)
    }
}

// =============================================================================
// PHY Driver Trait
// =============================================================================

/// Trait for the media-specific side of link bring-up
///
/// The controller owns sequencing; implementations own module detection
/// and PHY register access. Flags with defaults only matter for
/// pluggable-module media; copper and backplane drivers can ignore them.
///
/// # Example Implementation
///
/// ```ignore
/// struct BackplanePhy;
///
/// impl PhyDriver for BackplanePhy {
///     fn identify<B: RegisterBus>(&mut self, _bus: &mut B) -> Result<()> {
///         Ok(())
///     }
///
///     fn reset<B: RegisterBus>(&mut self, bus: &mut B) -> Result<()> {
///         // chip-specific PHY reset sequence
///         Ok(())
///     }
///
///     fn setup_link_speed<B: RegisterBus>(
///         &mut self,
///         _bus: &mut B,
///         _speed: LinkSpeed,
///         _wait: bool,
///     ) -> Result<()> {
///         Ok(())
///     }
///
///     fn media_type(&self) -> MediaType {
///         MediaType::Backplane
///     }
/// }
/// ```
pub trait PhyDriver {
    /// Detects the PHY or pluggable module
    ///
    /// Module conditions surface as [`SfpError`](crate::error::SfpError)
    /// variants: `NotPresent` for an empty cage, `NotSupported` for a
    /// module off the supported list, `SetupIncomplete` when a detected
    /// module's provisioning did not finish. The first two are non-fatal
    /// to reset sequencing.
    fn identify<B: RegisterBus>(&mut self, bus: &mut B) -> Result<()>;

    /// Performs a PHY-level reset
    fn reset<B: RegisterBus>(&mut self, bus: &mut B) -> Result<()>;

    /// Programs the PHY side for the requested speed set
    ///
    /// Only meaningful for media where the PHY negotiates (copper); the
    /// MAC-side link setup is the controller's job.
    fn setup_link_speed<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        speed: LinkSpeed,
        wait: bool,
    ) -> Result<()>;

    /// Reports the identified media
    fn media_type(&self) -> MediaType;

    /// Module supports more than one optical rate
    fn multispeed_fiber(&self) -> bool {
        false
    }

    /// A 1 Gb/s-only module is seated; capability decode short-circuits
    fn one_g_module(&self) -> bool {
        false
    }

    /// Module setup is pending and must run during the next reset
    fn sfp_setup_needed(&self) -> bool {
        false
    }

    /// Acknowledges completed module setup
    fn clear_sfp_setup_needed(&mut self) {}
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiber_classification() {
        assert!(MediaType::Fiber.is_fiber());
        assert!(MediaType::FiberQsfp.is_fiber());

        assert!(!MediaType::Copper.is_fiber());
        assert!(!MediaType::Backplane.is_fiber());
        assert!(!MediaType::Virtual.is_fiber());
        assert!(!MediaType::Unknown.is_fiber());
    }

    #[test]
    fn default_media_is_unknown() {
        assert_eq!(MediaType::default(), MediaType::Unknown);
    }

    // Minimal driver exercising the trait defaults.
    struct BarePhy;

    impl PhyDriver for BarePhy {
        fn identify<B: RegisterBus>(&mut self, _bus: &mut B) -> Result<()> {
            Ok(())
        }

        fn reset<B: RegisterBus>(&mut self, _bus: &mut B) -> Result<()> {
            Ok(())
        }

        fn setup_link_speed<B: RegisterBus>(
            &mut self,
            _bus: &mut B,
            _speed: LinkSpeed,
            _wait: bool,
        ) -> Result<()> {
            Ok(())
        }

        fn media_type(&self) -> MediaType {
            MediaType::Backplane
        }
    }

    #[test]
    fn trait_defaults_are_inert() {
        let mut phy = BarePhy;

        assert!(!phy.multispeed_fiber());
        assert!(!phy.one_g_module());
        assert!(!phy.sfp_setup_needed());
        phy.clear_sfp_setup_needed();
        assert!(!phy.sfp_setup_needed());
    }
}
