//! Configuration types for the link controller

use crate::regs::{self, timing};

/// SmartSpeed policy for backplane auto-negotiation
///
/// SmartSpeed retries the full rate first, then withdraws the 10 Gb/s
/// KR ability so a marginal channel can still close at 1 Gb/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SmartSpeedMode {
    /// Enabled whenever the media supports it
    #[default]
    Auto,
    /// Always use the SmartSpeed retry ladder
    On,
    /// Plain auto-negotiation only
    Off,
}

/// Complete link controller configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Station address override; `None` keeps the NVM permanent address
    pub mac_address: Option<[u8; 6]>,
    /// Block until auto-negotiation resolves during link setup
    pub wait_for_autoneg: bool,
    /// Poll budget for blocking link checks, in 100 ms steps
    pub link_poll_budget: u32,
    /// SmartSpeed policy
    pub smart_speed: SmartSpeedMode,
    /// Skip the PHY-level reset during controller reset
    pub phy_reset_disable: bool,
    /// Multicast hash window select (0..=3)
    pub mc_filter_type: u8,
    /// Accept all frames regardless of destination address
    pub promiscuous: bool,
    /// Maximum frame size in bytes; above the standard 1522 enables
    /// jumbo reception
    pub max_frame_size: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: None,
            wait_for_autoneg: false,
            link_poll_budget: timing::LINK_UP_POLLS,
            smart_speed: SmartSpeedMode::Auto,
            phy_reset_disable: false,
            mc_filter_type: 0,
            promiscuous: false,
            max_frame_size: regs::FRAME_SIZE_DEFAULT,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the station address, overriding the NVM permanent address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = Some(addr);
        self
    }

    /// Block in link setup until auto-negotiation resolves
    #[must_use]
    pub const fn with_wait_for_autoneg(mut self, wait: bool) -> Self {
        self.wait_for_autoneg = wait;
        self
    }

    /// Set the poll budget for blocking link checks
    #[must_use]
    pub const fn with_link_poll_budget(mut self, polls: u32) -> Self {
        self.link_poll_budget = polls;
        self
    }

    /// Set the SmartSpeed policy
    #[must_use]
    pub const fn with_smart_speed(mut self, mode: SmartSpeedMode) -> Self {
        self.smart_speed = mode;
        self
    }

    /// Skip the PHY-level reset during controller reset
    #[must_use]
    pub const fn with_phy_reset_disable(mut self, disable: bool) -> Self {
        self.phy_reset_disable = disable;
        self
    }

    /// Select the multicast hash window (wraps into 0..=3)
    #[must_use]
    pub const fn with_mc_filter_type(mut self, filter_type: u8) -> Self {
        self.mc_filter_type = filter_type & 0x3;
        self
    }

    /// Enable or disable promiscuous reception
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Set the maximum frame size in bytes
    #[must_use]
    pub const fn with_max_frame_size(mut self, bytes: u32) -> Self {
        self.max_frame_size = bytes;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
