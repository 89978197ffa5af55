//! Mutable controller state
//!
//! Everything the reset and negotiation paths carry between calls lives
//! here, separate from the user-facing
//! [`LinkConfig`](crate::controller::LinkConfig). Fields are plain; the
//! controller methods own the invariants.

use crate::an_ctl::AnCtl;
use crate::hal::eeprom::nvm;
use crate::phy::MediaType;
use crate::regs;
use crate::speed::{LinkSpeed, LinkStatus};

// =============================================================================
// Setup Strategy
// =============================================================================

/// Link setup strategy, resolved once from the identified media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupStrategy {
    /// Program the MAC link registers directly
    #[default]
    Direct,
    /// Walk the optical rates highest first with laser flaps
    MultispeedFiber,
    /// Backplane auto-negotiation with the SmartSpeed retry ladder
    SmartSpeed,
    /// The PHY negotiates; the MAC follows its resolution
    Copper,
}

// =============================================================================
// Adapter State
// =============================================================================

/// State the reset and negotiation paths persist between calls
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdapterState {
    /// Media reported by the PHY driver, cached at start
    pub media_type: MediaType,
    /// Module walks multiple optical rates, cached at start
    pub multispeed_fiber: bool,
    /// A 1 Gb/s-only module is seated, cached at start
    pub one_g_module: bool,
    /// Resolved setup strategy
    pub strategy: SetupStrategy,
    /// Port index from the port status register
    pub lan_id: u32,
    /// Data paths are masked off; set by stop, cleared by start
    pub adapter_stopped: bool,
    /// Untouched auto-negotiation control word from before the first
    /// link setup
    pub an_ctl_snapshot: AnCtl,
    /// The snapshot above has been captured
    pub snapshot_valid: bool,
    /// A failed fiber rate may be retried once at the next attempt
    pub autotry_restart: bool,
    /// SmartSpeed is in its degraded phase; KR stays withdrawn
    pub smart_speed_active: bool,
    /// MAC reset must run twice before the device is coherent
    pub double_reset_required: bool,
    /// Module-absent must gate link checks on this board
    pub need_crosstalk_fix: bool,
    /// Active station address
    pub addr: [u8; 6],
    /// Permanent station address from the receive address table
    pub perm_addr: [u8; 6],
    /// Storage-network address from the NVM, `0xFF`-filled when absent
    pub san_addr: [u8; 6],
    /// Usable receive address slots; the SAN reservation shrinks this
    pub num_rar_entries: u32,
    /// Receive address slot reserved for the SAN address
    pub san_addr_rar_index: Option<u32>,
    /// World-wide node name prefix
    pub wwnn_prefix: u16,
    /// World-wide port name prefix
    pub wwpn_prefix: u16,
    /// Speed set advertised by the last fiber rate walk
    pub autoneg_advertised: LinkSpeed,
    /// Last observed link state
    pub link: LinkStatus,
}

impl Default for AdapterState {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterState {
    /// Create the pre-reset state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            media_type: MediaType::Unknown,
            multispeed_fiber: false,
            one_g_module: false,
            strategy: SetupStrategy::Direct,
            lan_id: 0,
            adapter_stopped: true,
            an_ctl_snapshot: AnCtl::from_raw(0),
            snapshot_valid: false,
            autotry_restart: false,
            smart_speed_active: false,
            double_reset_required: false,
            need_crosstalk_fix: false,
            addr: [0; 6],
            perm_addr: [0; 6],
            san_addr: [0xFF; 6],
            num_rar_entries: regs::NUM_RAR_ENTRIES,
            san_addr_rar_index: None,
            wwnn_prefix: nvm::WWN_PREFIX_DEFAULT,
            wwpn_prefix: nvm::WWN_PREFIX_DEFAULT,
            autoneg_advertised: LinkSpeed::UNKNOWN,
            link: LinkStatus::down(),
        }
    }
}

// =============================================================================
// Address Filter State
// =============================================================================

/// Shadow of the multicast hash table
///
/// The hardware table is write-only in practice once hashing starts;
/// the shadow lets a full reprogram rebuild it without readback.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddrFilterState {
    /// One bit per hash bucket, mirrors the hardware words
    pub mc_shadow: [u32; regs::MC_TBL_WORDS],
    /// Addresses hashed into the table by the last rebuild
    pub mta_in_use: u32,
    /// Receive address slots currently programmed
    pub rar_used_count: u32,
}

impl Default for AddrFilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl AddrFilterState {
    /// Create an empty filter shadow
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mc_shadow: [0; regs::MC_TBL_WORDS],
            mta_in_use: 0,
            rar_used_count: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
