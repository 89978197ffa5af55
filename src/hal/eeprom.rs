//! NVM word access
//!
//! The controller only ever chases a few pointers through the adapter's
//! non-volatile configuration: the SAN address block, the alternate WWN
//! block, the device capabilities word and the firmware module that holds
//! the LESM parameter block. Checksumming and full parameter parsing
//! belong to the platform, not to link bring-up, so the seam is a single
//! word read.

use crate::error::Result;

/// Word access into the adapter's non-volatile configuration
pub trait EepromReader {
    /// Reads one 16-bit word at a word offset
    fn read_word(&mut self, offset: u16) -> Result<u16>;
}

/// Well-known NVM word offsets and block layouts
pub mod nvm {
    /// Pointer to the firmware module block
    pub const FW_PTR: u16 = 0x0F;

    /// Pointer to the alternate SAN/WWN address block
    pub const ALT_MAC_ADDR_BLK_PTR: u16 = 0x27;

    /// Pointer to the SAN MAC address block
    pub const SAN_MAC_ADDR_PTR: u16 = 0x28;

    /// Device capabilities word
    pub const DEVICE_CAPS: u16 = 0x2C;

    /// [`DEVICE_CAPS`]: part does not require the crosstalk workaround
    pub const DEVICE_CAPS_NO_CROSSTALK_WR: u16 = 1 << 7;

    /// SAN block: word offset of port 0's address
    pub const SAN_MAC_PORT0_OFFSET: u16 = 0x0;

    /// SAN block: word offset of port 1's address
    pub const SAN_MAC_PORT1_OFFSET: u16 = 0x3;

    /// Firmware block: relative offset of the LESM parameter pointer
    pub const FW_LESM_PARAMS_PTR: u16 = 0x2;

    /// LESM parameter block: relative offset of the first state word
    pub const FW_LESM_STATE_1: u16 = 0x1;

    /// LESM state word: feature enabled
    pub const FW_LESM_STATE_ENABLED: u16 = 0x8000;

    /// Alternate block: relative offset of the capabilities word
    pub const ALT_WWN_CAPS_OFFSET: u16 = 0x0;

    /// Alternate block capabilities: WWN prefixes present
    pub const ALT_WWN_CAPS_ALTWWN: u16 = 0x1;

    /// Alternate block: relative offset of the WWNN prefix
    pub const ALT_WWNN_OFFSET: u16 = 0x7;

    /// Alternate block: relative offset of the WWPN prefix
    pub const ALT_WWPN_OFFSET: u16 = 0x8;

    /// Prefix value reported when no alternate block is programmed
    pub const WWN_PREFIX_DEFAULT: u16 = 0xFFFF;

    /// Returns `true` when a pointer word is programmed; erased parts
    /// read 0xFFFF and blank images read 0
    #[must_use]
    pub const fn ptr_valid(word: u16) -> bool {
        word != 0 && word != 0xFFFF
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
