//! Autoneg control word
//!
//! [`AnCtl`] wraps the raw [`AN_CTL`](crate::regs::AN_CTL) register value
//! so negotiation code manipulates named fields instead of shifting masks
//! inline. The wrapper carries the full 32-bit word; reserved bits survive
//! a read-modify-write round trip untouched.

use crate::speed::LinkSpeed;

// =============================================================================
// Link Mode Select
// =============================================================================

/// Link mode select field of the autoneg control word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkMode {
    /// Fixed 1 Gb/s, no autoneg
    Fixed1G,
    /// Fixed 10 Gb/s, no autoneg
    Fixed10G,
    /// 1 Gb/s with clause 37 autoneg
    An1G,
    /// 10 Gb/s serial lane (SFI)
    Serial10G,
    /// Backplane autoneg over KX/KX4/KR
    BackplaneAn,
    /// Backplane autoneg plus 1 Gb/s clause 37
    BackplaneAn1G,
    /// Backplane autoneg plus SGMII sideband
    BackplaneAnSgmii,
    /// SGMII at 1 Gb/s or below
    Sgmii,
}

impl LinkMode {
    /// Decodes the 3-bit mode field
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw & 0x7 {
            0 => LinkMode::Fixed1G,
            1 => LinkMode::Fixed10G,
            2 => LinkMode::An1G,
            3 => LinkMode::Serial10G,
            4 => LinkMode::BackplaneAn,
            5 => LinkMode::BackplaneAn1G,
            6 => LinkMode::BackplaneAnSgmii,
            _ => LinkMode::Sgmii,
        }
    }

    /// Returns the 3-bit field encoding
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        match self {
            LinkMode::Fixed1G => 0,
            LinkMode::Fixed10G => 1,
            LinkMode::An1G => 2,
            LinkMode::Serial10G => 3,
            LinkMode::BackplaneAn => 4,
            LinkMode::BackplaneAn1G => 5,
            LinkMode::BackplaneAnSgmii => 6,
            LinkMode::Sgmii => 7,
        }
    }

    /// Returns `true` for the modes that negotiate over the backplane
    /// technology bits (KX/KX4/KR)
    #[must_use]
    pub const fn is_backplane_an(self) -> bool {
        matches!(
            self,
            LinkMode::BackplaneAn | LinkMode::BackplaneAn1G | LinkMode::BackplaneAnSgmii
        )
    }
}

// =============================================================================
// Autoneg Control Word
// =============================================================================

/// Typed view of the autoneg control register value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnCtl(u32);

impl AnCtl {
    /// Link mode select field
    pub const LMS_MASK: u32 = 0x7;
    /// 1000BASE-KX supported
    pub const KX_SUPPORT: u32 = 1 << 7;
    /// 10GBASE-KX4 supported
    pub const KX4_SUPPORT: u32 = 1 << 8;
    /// 10GBASE-KR supported
    pub const KR_SUPPORT: u32 = 1 << 9;
    /// Restart autoneg
    pub const AN_RESTART: u32 = 1 << 12;
    /// Link diagnostics override field
    pub const LINK_DIA_MASK: u32 = 0x3 << 13;
    /// Autoneg enable
    pub const AN_ENA: u32 = 1 << 15;
    /// Speed select field
    pub const SPEED_MASK: u32 = 0x7 << 16;
    const SPEED_SHIFT: u32 = 16;
    /// 10G lane type field
    pub const TENG_LANE_MASK: u32 = 0x3 << 20;
    /// 10G lane type: serial SFI
    pub const TENG_LANE_SFI: u32 = 0x2 << 20;
    /// 1G lane type field
    pub const ONEG_LANE_MASK: u32 = 0x3 << 22;
    /// 1G lane type: serial SFI
    pub const ONEG_LANE_SFI: u32 = 0x2 << 22;

    /// Wraps a raw register value
    #[must_use]
    #[inline(always)]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw register value, reserved bits included
    #[must_use]
    #[inline(always)]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Returns the link mode select field
    #[must_use]
    pub const fn link_mode(self) -> LinkMode {
        LinkMode::from_raw(self.0 & Self::LMS_MASK)
    }

    /// Replaces the link mode select field
    #[must_use]
    pub const fn with_link_mode(self, mode: LinkMode) -> Self {
        Self((self.0 & !Self::LMS_MASK) | mode.to_raw())
    }

    /// Flips the autoneg bit of the link mode field, hopping between the
    /// fixed and the autoneg mode families without touching anything else
    #[must_use]
    pub const fn with_an_mode_toggled(self) -> Self {
        Self(self.0 ^ 0x4)
    }

    /// KX support advertised
    #[must_use]
    #[inline(always)]
    pub const fn kx_support(self) -> bool {
        self.0 & Self::KX_SUPPORT != 0
    }

    /// Sets or clears KX support
    #[must_use]
    pub const fn with_kx_support(self, support: bool) -> Self {
        if support {
            Self(self.0 | Self::KX_SUPPORT)
        } else {
            Self(self.0 & !Self::KX_SUPPORT)
        }
    }

    /// KX4 support advertised
    #[must_use]
    #[inline(always)]
    pub const fn kx4_support(self) -> bool {
        self.0 & Self::KX4_SUPPORT != 0
    }

    /// Sets or clears KX4 support
    #[must_use]
    pub const fn with_kx4_support(self, support: bool) -> Self {
        if support {
            Self(self.0 | Self::KX4_SUPPORT)
        } else {
            Self(self.0 & !Self::KX4_SUPPORT)
        }
    }

    /// KR support advertised
    #[must_use]
    #[inline(always)]
    pub const fn kr_support(self) -> bool {
        self.0 & Self::KR_SUPPORT != 0
    }

    /// Sets or clears KR support
    #[must_use]
    pub const fn with_kr_support(self, support: bool) -> Self {
        if support {
            Self(self.0 | Self::KR_SUPPORT)
        } else {
            Self(self.0 & !Self::KR_SUPPORT)
        }
    }

    /// Autoneg restart requested
    #[must_use]
    #[inline(always)]
    pub const fn an_restart(self) -> bool {
        self.0 & Self::AN_RESTART != 0
    }

    /// Sets or clears the autoneg restart request
    #[must_use]
    pub const fn with_an_restart(self, restart: bool) -> Self {
        if restart {
            Self(self.0 | Self::AN_RESTART)
        } else {
            Self(self.0 & !Self::AN_RESTART)
        }
    }

    /// Raw link diagnostics override field, 0 when inactive
    #[must_use]
    #[inline(always)]
    pub const fn link_diagnostics(self) -> u32 {
        (self.0 & Self::LINK_DIA_MASK) >> 13
    }

    /// Replaces the link diagnostics override field
    #[must_use]
    pub const fn with_link_diagnostics(self, dia: u32) -> Self {
        Self((self.0 & !Self::LINK_DIA_MASK) | ((dia & 0x3) << 13))
    }

    /// Autoneg enabled
    #[must_use]
    #[inline(always)]
    pub const fn autoneg(self) -> bool {
        self.0 & Self::AN_ENA != 0
    }

    /// Sets or clears autoneg enable
    #[must_use]
    pub const fn with_autoneg(self, enable: bool) -> Self {
        if enable {
            Self(self.0 | Self::AN_ENA)
        } else {
            Self(self.0 & !Self::AN_ENA)
        }
    }

    /// Decodes the speed select field into a single-speed set
    #[must_use]
    pub const fn speed_sel(self) -> LinkSpeed {
        match (self.0 & Self::SPEED_MASK) >> Self::SPEED_SHIFT {
            3 => LinkSpeed::G10,
            2 => LinkSpeed::G1,
            1 => LinkSpeed::M100,
            _ => LinkSpeed::M10,
        }
    }

    /// Replaces the speed select field with the highest speed in `speed`;
    /// an empty set selects the lowest rate
    #[must_use]
    pub const fn with_speed_sel(self, speed: LinkSpeed) -> Self {
        let sel = match speed.highest().to_raw() {
            x if x == LinkSpeed::G10.to_raw() => 3,
            x if x == LinkSpeed::G1.to_raw() => 2,
            x if x == LinkSpeed::M100.to_raw() => 1,
            _ => 0,
        };
        Self((self.0 & !Self::SPEED_MASK) | (sel << Self::SPEED_SHIFT))
    }

    /// 10G lane is configured for serial SFI
    #[must_use]
    #[inline(always)]
    pub const fn ten_g_lane_sfi(self) -> bool {
        self.0 & Self::TENG_LANE_MASK == Self::TENG_LANE_SFI
    }

    /// 1G lane is configured for serial SFI
    #[must_use]
    #[inline(always)]
    pub const fn one_g_lane_sfi(self) -> bool {
        self.0 & Self::ONEG_LANE_MASK == Self::ONEG_LANE_SFI
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
