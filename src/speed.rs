//! Link speed sets and link status reports
//!
//! Speeds are a bitmask, not an enum: negotiation works on *sets* of
//! speeds (requested, capable, advertised) and intersects them. A single
//! established rate is just a set with one bit. [`LinkStatus`] pairs the
//! decoded rate with the up/down bit from the port status register.

// =============================================================================
// Link Speed Bitmask
// =============================================================================

/// Set of link speeds, one bit per rate.
///
/// The empty set doubles as "unknown" wherever a single rate is reported.
/// Combine with `|`, intersect with `&`:
///
/// ```
/// use xge_link::LinkSpeed;
///
/// let requested = LinkSpeed::G10 | LinkSpeed::G1;
/// let capable = LinkSpeed::G1 | LinkSpeed::M100;
/// let usable = requested & capable;
/// assert_eq!(usable, LinkSpeed::G1);
/// assert_eq!(usable.highest(), LinkSpeed::G1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkSpeed(u32);

impl LinkSpeed {
    /// No speed known / empty set
    pub const UNKNOWN: Self = Self(0);
    /// 10 Mb/s full duplex
    pub const M10: Self = Self(1 << 0);
    /// 100 Mb/s full duplex
    pub const M100: Self = Self(1 << 1);
    /// 1 Gb/s full duplex
    pub const G1: Self = Self(1 << 2);
    /// 10 Gb/s full duplex
    pub const G10: Self = Self(1 << 3);

    const ALL_BITS: u32 = Self::M10.0 | Self::M100.0 | Self::G1.0 | Self::G10.0;

    /// Builds a speed set from a raw mask, dropping undefined bits
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & Self::ALL_BITS)
    }

    /// Returns the raw bitmask
    #[must_use]
    #[inline(always)]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if no speed bit is set
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every speed in `other` is also in `self`
    #[must_use]
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns the single highest speed in the set, or [`Self::UNKNOWN`]
    #[must_use]
    pub const fn highest(self) -> Self {
        if self.0 & Self::G10.0 != 0 {
            Self::G10
        } else if self.0 & Self::G1.0 != 0 {
            Self::G1
        } else if self.0 & Self::M100.0 != 0 {
            Self::M100
        } else if self.0 & Self::M10.0 != 0 {
            Self::M10
        } else {
            Self::UNKNOWN
        }
    }

    /// Returns the highest speed in the set in Mb/s, 0 when empty
    #[must_use]
    pub const fn mbps(self) -> u32 {
        match self.highest().0 {
            x if x == Self::G10.0 => 10_000,
            x if x == Self::G1.0 => 1_000,
            x if x == Self::M100.0 => 100,
            x if x == Self::M10.0 => 10,
            _ => 0,
        }
    }
}

impl core::ops::BitOr for LinkSpeed {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for LinkSpeed {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for LinkSpeed {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl core::ops::BitAndAssign for LinkSpeed {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl core::fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("unknown");
        }
        let names = [
            (Self::G10, "10G"),
            (Self::G1, "1G"),
            (Self::M100, "100M"),
            (Self::M10, "10M"),
        ];
        let mut first = true;
        for (bit, name) in names {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Link Status Report
// =============================================================================

/// Decoded link state as reported by the port status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link is established
    pub up: bool,
    /// Established rate, [`LinkSpeed::UNKNOWN`] while down
    pub speed: LinkSpeed,
}

impl LinkStatus {
    /// Link down, speed unknown
    #[must_use]
    pub const fn down() -> Self {
        Self {
            up: false,
            speed: LinkSpeed::UNKNOWN,
        }
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::down()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
