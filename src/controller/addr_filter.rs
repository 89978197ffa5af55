//! Receive address and multicast filter management
//!
//! This module extends [`LinkController`] with the station address table:
//!
//! - **Receive address slots** - 128 exact-match entries behind an
//!   indirect index/data window, with per-entry pool association
//! - **Multicast hashing** - a 4096-bit table addressed by a 12-bit
//!   window of the address, rebuilt from a software shadow
//! - **Storage addresses** - SAN station address and WWN prefixes read
//!   from their NVM pointer blocks
//!
//! The hardware table is programmed through one shared index register,
//! so every slot access is a select-then-data sequence. Readback goes
//! through the same window.

use super::LinkController;
use crate::error::{ConfigError, ConfigResult, Result};
use crate::hal::eeprom::nvm;
use crate::hal::{EepromReader, FwArbiter, RegisterBus};
use crate::regs::{self, eth_addr_h, rx_ctl};
use embedded_hal::delay::DelayNs;

// =============================================================================
// Address Validation
// =============================================================================

/// Check that an address can serve as a station address
///
/// Multicast, broadcast and all-zero addresses are rejected.
///
/// # Errors
/// Returns [`ConfigError::InvalidAddress`] for any of the three classes.
pub fn validate_mac_addr(addr: &[u8; 6]) -> ConfigResult<()> {
    if addr[0] & 0x01 != 0 {
        // Covers broadcast as well, the group bit is set there too.
        return Err(ConfigError::InvalidAddress);
    }
    if addr.iter().all(|&b| b == 0) {
        return Err(ConfigError::InvalidAddress);
    }
    Ok(())
}

/// 12-bit multicast hash vector for the selected window
///
/// The window slides across the top address bits: type 0 takes [47:36],
/// type 1 [46:35], type 2 [45:34] and type 3 [43:32].
fn mta_vector(filter_type: u8, addr: &[u8; 6]) -> u16 {
    let vector = match filter_type & 0x3 {
        0 => u16::from(addr[4] >> 4) | (u16::from(addr[5]) << 4),
        1 => u16::from(addr[4] >> 3) | (u16::from(addr[5]) << 5),
        2 => u16::from(addr[4] >> 2) | (u16::from(addr[5]) << 6),
        _ => u16::from(addr[4]) | (u16::from(addr[5]) << 8),
    };
    vector & 0xFFF
}

// =============================================================================
// Receive Address Slots
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Program a receive address slot
    ///
    /// The low data word carries address bytes 5..2 reversed into
    /// little-endian order; the high word carries bytes 1..0 plus the
    /// valid bit. Reserved high-word bits survive the write. The pool
    /// association words are written first.
    ///
    /// # Arguments
    /// * `index` - Slot to program
    /// * `addr` - Station address in network byte order
    /// * `pools` - Pool association bitmap for the slot
    /// * `valid` - Set the entry valid bit
    ///
    /// # Errors
    /// Returns [`ConfigError::RarIndexOutOfRange`] when `index` is past
    /// the usable slot count.
    pub fn set_rar(&mut self, index: u32, addr: &[u8; 6], pools: u64, valid: bool) -> Result<()> {
        if index >= self.state.num_rar_entries {
            return Err(ConfigError::RarIndexOutOfRange.into());
        }
        self.write_rar(index, addr, pools, valid);
        Ok(())
    }

    /// Clear a receive address slot, keeping reserved high-word bits
    ///
    /// # Errors
    /// Returns [`ConfigError::RarIndexOutOfRange`] when `index` is past
    /// the usable slot count.
    pub fn clear_rar(&mut self, index: u32) -> Result<()> {
        if index >= self.state.num_rar_entries {
            return Err(ConfigError::RarIndexOutOfRange.into());
        }

        self.bus.write32(regs::ETH_ADDR_IDX, index);
        self.bus.write32(regs::ETH_ADDR_VM_L, 0);
        self.bus.write32(regs::ETH_ADDR_VM_H, 0);
        self.bus.write32(regs::ETH_ADDR_L, 0);
        self.bus
            .write32_masked(regs::ETH_ADDR_H, eth_addr_h::ADDR_MASK | eth_addr_h::VALID, 0);
        Ok(())
    }

    /// Read the station address back from slot 0
    pub fn read_mac_addr(&mut self) -> [u8; 6] {
        self.bus.write32(regs::ETH_ADDR_IDX, 0);
        let rar_high = self.bus.read32(regs::ETH_ADDR_H);
        let rar_low = self.bus.read32(regs::ETH_ADDR_L);

        let mut addr = [0u8; 6];
        for (i, byte) in addr.iter_mut().take(2).enumerate() {
            *byte = (rar_high >> ((1 - i) * 8)) as u8;
        }
        for (i, byte) in addr.iter_mut().skip(2).enumerate() {
            *byte = (rar_low >> ((3 - i) * 8)) as u8;
        }
        addr
    }

    /// Bring the receive address table to its post-reset layout
    ///
    /// Slot 0 keeps a valid configured override, otherwise the current
    /// hardware address is read back and adopted. Every other slot, the
    /// pool words, the multicast table and the unicast hash bank are
    /// cleared, and the filter-type window is rewritten with hashing
    /// disabled.
    pub fn init_rx_addrs(&mut self) {
        match self.config.mac_address {
            Some(addr) if validate_mac_addr(&addr).is_ok() => {
                #[cfg(feature = "defmt")]
                defmt::debug!("overriding station address in slot 0");

                self.state.addr = addr;
                self.write_rar(0, &addr, 0, true);
            }
            _ => {
                self.state.addr = self.read_mac_addr();

                #[cfg(feature = "defmt")]
                defmt::debug!("keeping current slot 0 address");
            }
        }

        // Slot 0 carries no pool association after init.
        self.bus.write32(regs::ETH_ADDR_IDX, 0);
        self.bus.write32(regs::ETH_ADDR_VM_L, 0);
        self.bus.write32(regs::ETH_ADDR_VM_H, 0);

        self.filter.rar_used_count = 1;

        for index in 1..self.state.num_rar_entries {
            self.bus.write32(regs::ETH_ADDR_IDX, index);
            self.bus.write32(regs::ETH_ADDR_VM_L, 0);
            self.bus.write32(regs::ETH_ADDR_VM_H, 0);
            self.bus.write32(regs::ETH_ADDR_L, 0);
            self.bus.write32(regs::ETH_ADDR_H, 0);
        }

        self.filter.mta_in_use = 0;
        self.filter.mc_shadow = [0; regs::MC_TBL_WORDS];
        self.bus.write32_masked(
            regs::RX_CTL,
            rx_ctl::FILTER_TYPE_MASK | rx_ctl::MC_HASH_ENA,
            rx_ctl::filter_type(self.config.mc_filter_type),
        );
        for word in 0..regs::MC_TBL_WORDS as u32 {
            self.bus.write32(regs::mc_tbl(word), 0);
        }

        self.init_uta_tables();
    }

    /// Zero the unicast hash table bank
    fn init_uta_tables(&mut self) {
        for word in 0..regs::UC_TBL_WORDS as u32 {
            self.bus.write32(regs::uc_tbl(word), 0);
        }
    }

    fn write_rar(&mut self, index: u32, addr: &[u8; 6], pools: u64, valid: bool) {
        self.bus.write32(regs::ETH_ADDR_IDX, index);

        self.bus.write32(regs::ETH_ADDR_VM_L, pools as u32);
        self.bus.write32(regs::ETH_ADDR_VM_H, (pools >> 32) as u32);

        let rar_low = u32::from(addr[5])
            | (u32::from(addr[4]) << 8)
            | (u32::from(addr[3]) << 16)
            | (u32::from(addr[2]) << 24);
        let mut rar_high = u32::from(addr[1]) | (u32::from(addr[0]) << 8);
        if valid {
            rar_high |= eth_addr_h::VALID;
        }

        self.bus.write32(regs::ETH_ADDR_L, rar_low);
        self.bus.write32_masked(
            regs::ETH_ADDR_H,
            eth_addr_h::ADDR_MASK | eth_addr_h::VALID,
            rar_high,
        );
    }
}

// =============================================================================
// Multicast Hashing
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Rebuild the multicast hash table from an address list
    ///
    /// Each address sets one bit of the 4096-bit table; collisions are
    /// expected and resolved by software afterwards. With `clear` set
    /// the shadow starts empty, otherwise the new addresses accumulate
    /// onto the previous contents. Hash filtering is enabled only when
    /// the rebuild left at least one bit set.
    ///
    /// # Arguments
    /// * `addrs` - Multicast addresses to admit
    /// * `clear` - Drop the previous shadow before hashing
    pub fn update_multicast(&mut self, addrs: &[[u8; 6]], clear: bool) {
        self.filter.mta_in_use = 0;

        if clear {
            #[cfg(feature = "defmt")]
            defmt::debug!("clearing multicast shadow");

            self.filter.mc_shadow = [0; regs::MC_TBL_WORDS];
        }

        for addr in addrs {
            self.set_mta(addr);
        }

        for (word, &bits) in self.filter.mc_shadow.iter().enumerate() {
            self.bus.write32(regs::mc_tbl(word as u32), bits);
        }

        if self.filter.mta_in_use > 0 {
            self.bus.write32_masked(
                regs::RX_CTL,
                rx_ctl::FILTER_TYPE_MASK | rx_ctl::MC_HASH_ENA,
                rx_ctl::MC_HASH_ENA | rx_ctl::filter_type(self.config.mc_filter_type),
            );
        }
    }

    /// Hash one address into the shadow
    fn set_mta(&mut self, addr: &[u8; 6]) {
        self.filter.mta_in_use += 1;

        let vector = mta_vector(self.config.mc_filter_type, addr);
        let word = usize::from((vector >> 5) & 0x7F);
        let bit = vector & 0x1F;
        self.filter.mc_shadow[word] |= 1 << bit;
    }
}

// =============================================================================
// SAN Address and WWN Prefixes
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// NVM offset of this port's SAN address words, when present
    fn san_mac_addr_offset(&mut self) -> Option<u16> {
        let ptr = self.eeprom.read_word(nvm::SAN_MAC_ADDR_PTR).ok()?;
        if !nvm::ptr_valid(ptr) {
            return None;
        }

        let port_offset = if self.state.lan_id == 0 {
            nvm::SAN_MAC_PORT0_OFFSET
        } else {
            nvm::SAN_MAC_PORT1_OFFSET
        };
        Some(ptr + port_offset)
    }

    /// Fetch this port's SAN station address from the NVM
    ///
    /// A missing pointer block or a failed read is not an error; the
    /// result is `0xFF`-filled so downstream validation rejects it.
    pub fn fetch_san_mac_addr(&mut self) -> [u8; 6] {
        let Some(mut offset) = self.san_mac_addr_offset() else {
            return [0xFF; 6];
        };

        let mut addr = [0xFF; 6];
        for pair in 0..3 {
            let Ok(word) = self.eeprom.read_word(offset) else {
                return [0xFF; 6];
            };
            addr[pair * 2] = (word >> 8) as u8;
            addr[pair * 2 + 1] = word as u8;
            offset += 1;
        }
        addr
    }

    /// Adopt a new SAN station address
    ///
    /// Updates the stored address and reprograms the reserved slot when
    /// the reset sequence claimed one. The NVM stays untouched.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoSanAddress`] when the NVM carries no SAN
    /// pointer block, [`ConfigError::InvalidAddress`] for an unusable
    /// address.
    pub fn set_san_mac_addr(&mut self, addr: &[u8; 6]) -> Result<()> {
        if self.san_mac_addr_offset().is_none() {
            return Err(ConfigError::NoSanAddress.into());
        }
        validate_mac_addr(addr)?;

        self.state.san_addr = *addr;
        if let Some(index) = self.state.san_addr_rar_index {
            self.write_rar(index, addr, 0, true);
        }
        Ok(())
    }

    /// Fetch the alternate WWNN/WWPN prefixes from the NVM
    ///
    /// Returns `(0xFFFF, 0xFFFF)` when the alternate block is missing,
    /// unreadable or does not carry the alternate-WWN capability.
    pub fn fetch_wwn_prefix(&mut self) -> (u16, u16) {
        const INVALID: (u16, u16) = (nvm::WWN_PREFIX_DEFAULT, nvm::WWN_PREFIX_DEFAULT);

        let Ok(blk) = self.eeprom.read_word(nvm::ALT_MAC_ADDR_BLK_PTR) else {
            return INVALID;
        };
        if !nvm::ptr_valid(blk) {
            return INVALID;
        }

        let Ok(caps) = self.eeprom.read_word(blk + nvm::ALT_WWN_CAPS_OFFSET) else {
            return INVALID;
        };
        if caps & nvm::ALT_WWN_CAPS_ALTWWN == 0 {
            return INVALID;
        }

        let Ok(wwnn) = self.eeprom.read_word(blk + nvm::ALT_WWNN_OFFSET) else {
            return INVALID;
        };
        let Ok(wwpn) = self.eeprom.read_word(blk + nvm::ALT_WWPN_OFFSET) else {
            return INVALID;
        };
        (wwnn, wwpn)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::super::{LinkConfig, LinkController};
    use super::*;
    use crate::test_utils::{MockArbiter, MockBus, MockDelay, MockEeprom};

    type TestController = LinkController<MockBus, MockArbiter, MockEeprom, MockDelay>;

    fn controller() -> TestController {
        controller_with(LinkConfig::new())
    }

    fn controller_with(config: LinkConfig) -> TestController {
        LinkController::new(
            MockBus::new(),
            MockArbiter::new(),
            MockEeprom::new(),
            MockDelay::new(),
            config,
        )
    }

    // =========================================================================
    // Address Validation Tests
    // =========================================================================

    #[test]
    fn validate_rejects_broadcast() {
        assert_eq!(
            validate_mac_addr(&[0xFF; 6]),
            Err(ConfigError::InvalidAddress)
        );
    }

    #[test]
    fn validate_rejects_multicast() {
        let addr = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01];
        assert_eq!(validate_mac_addr(&addr), Err(ConfigError::InvalidAddress));
    }

    #[test]
    fn validate_rejects_zero() {
        assert_eq!(
            validate_mac_addr(&[0x00; 6]),
            Err(ConfigError::InvalidAddress)
        );
    }

    #[test]
    fn validate_accepts_unicast() {
        let addr = [0x02, 0x00, 0x00, 0x11, 0x22, 0x33];
        assert_eq!(validate_mac_addr(&addr), Ok(()));
    }

    // =========================================================================
    // Receive Address Slot Tests
    // =========================================================================

    #[test]
    fn set_rar_reverses_bytes_and_sets_valid() {
        let mut ctl = controller();
        let addr = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55];

        ctl.set_rar(7, &addr, 0, true).unwrap();

        assert_eq!(ctl.bus.get(regs::ETH_ADDR_IDX), 7);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_L), 0x2233_4455);
        assert_eq!(
            ctl.bus.get(regs::ETH_ADDR_H),
            0x0011 | eth_addr_h::VALID
        );
    }

    #[test]
    fn set_rar_writes_pool_words_first() {
        let mut ctl = controller();
        let addr = [0x02, 0, 0, 0, 0, 0x01];

        ctl.set_rar(3, &addr, 0x0000_0005_8000_0001, true).unwrap();

        assert_eq!(ctl.bus.get(regs::ETH_ADDR_VM_L), 0x8000_0001);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_VM_H), 0x0000_0005);
    }

    #[test]
    fn set_rar_preserves_reserved_high_bits() {
        let mut ctl = controller();
        ctl.bus.preload(regs::ETH_ADDR_H, 0x7FFF_0000);
        let addr = [0xAA, 0xBB, 0, 0, 0, 0];

        ctl.set_rar(0, &addr, 0, true).unwrap();

        assert_eq!(
            ctl.bus.get(regs::ETH_ADDR_H),
            0x7FFF_0000 | 0xAABB | eth_addr_h::VALID
        );
    }

    #[test]
    fn set_rar_without_valid_leaves_bit_clear() {
        let mut ctl = controller();
        let addr = [0x02, 0, 0, 0, 0, 0x01];

        ctl.set_rar(0, &addr, 0, false).unwrap();

        assert_eq!(ctl.bus.get(regs::ETH_ADDR_H) & eth_addr_h::VALID, 0);
    }

    #[test]
    fn set_rar_index_out_of_range() {
        let mut ctl = controller();
        let addr = [0x02, 0, 0, 0, 0, 0x01];

        let result = ctl.set_rar(regs::NUM_RAR_ENTRIES, &addr, 0, true);

        assert_eq!(result, Err(ConfigError::RarIndexOutOfRange.into()));
    }

    #[test]
    fn set_rar_respects_shrunken_capacity() {
        let mut ctl = controller();
        ctl.state.num_rar_entries = 4;
        let addr = [0x02, 0, 0, 0, 0, 0x01];

        assert!(ctl.set_rar(3, &addr, 0, true).is_ok());
        assert!(ctl.set_rar(4, &addr, 0, true).is_err());
    }

    #[test]
    fn clear_rar_zeroes_entry_but_keeps_reserved_bits() {
        let mut ctl = controller();
        ctl.bus.preload(regs::ETH_ADDR_H, 0x7FFF_ABCD | eth_addr_h::VALID);
        ctl.bus.preload(regs::ETH_ADDR_L, 0xDEAD_BEEF);
        ctl.bus.preload(regs::ETH_ADDR_VM_L, 0xFFFF_FFFF);

        ctl.clear_rar(2).unwrap();

        assert_eq!(ctl.bus.get(regs::ETH_ADDR_IDX), 2);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_L), 0);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_H), 0x7FFF_0000);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_VM_L), 0);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_VM_H), 0);
    }

    #[test]
    fn read_mac_addr_unpacks_window_words() {
        let mut ctl = controller();
        ctl.bus
            .preload(regs::ETH_ADDR_H, 0xABCD | eth_addr_h::VALID);
        ctl.bus.preload(regs::ETH_ADDR_L, 0x1122_3344);

        let addr = ctl.read_mac_addr();

        assert_eq!(addr, [0xAB, 0xCD, 0x11, 0x22, 0x33, 0x44]);
    }

    // =========================================================================
    // Table Initialization Tests
    // =========================================================================

    #[test]
    fn init_rx_addrs_applies_configured_override() {
        let mac = [0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let mut ctl = controller_with(LinkConfig::new().with_mac_address(mac));

        ctl.init_rx_addrs();

        assert_eq!(ctl.state.addr, mac);
        assert_eq!(ctl.filter.rar_used_count, 1);
        // Last select touched was the final cleared slot.
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_IDX), regs::NUM_RAR_ENTRIES - 1);
    }

    #[test]
    fn init_rx_addrs_adopts_hardware_address_without_override() {
        let mut ctl = controller();
        ctl.bus
            .preload(regs::ETH_ADDR_H, 0x0260 | eth_addr_h::VALID);
        ctl.bus.preload(regs::ETH_ADDR_L, 0x7B00_1122);

        ctl.init_rx_addrs();

        assert_eq!(ctl.state.addr, [0x02, 0x60, 0x7B, 0x00, 0x11, 0x22]);
    }

    #[test]
    fn init_rx_addrs_clears_multicast_and_unicast_tables() {
        let mut ctl = controller();
        ctl.bus.preload(regs::mc_tbl(5), 0xFFFF_FFFF);
        ctl.bus.preload(regs::uc_tbl(99), 0xFFFF_FFFF);
        ctl.filter.mc_shadow[5] = 0xFFFF_FFFF;
        ctl.filter.mta_in_use = 9;

        ctl.init_rx_addrs();

        assert_eq!(ctl.bus.get(regs::mc_tbl(5)), 0);
        assert_eq!(ctl.bus.get(regs::uc_tbl(99)), 0);
        assert_eq!(ctl.filter.mc_shadow[5], 0);
        assert_eq!(ctl.filter.mta_in_use, 0);
    }

    #[test]
    fn init_rx_addrs_programs_filter_type_with_hashing_off() {
        let mut ctl = controller_with(LinkConfig::new().with_mc_filter_type(2));
        ctl.bus
            .preload(regs::RX_CTL, rx_ctl::MC_HASH_ENA | rx_ctl::LOOPBACK);

        ctl.init_rx_addrs();

        let psr = ctl.bus.get(regs::RX_CTL);
        assert_eq!(psr & rx_ctl::MC_HASH_ENA, 0);
        assert_eq!(psr & rx_ctl::FILTER_TYPE_MASK, rx_ctl::filter_type(2));
        // Unrelated bits survive.
        assert_ne!(psr & rx_ctl::LOOPBACK, 0);
    }

    // =========================================================================
    // Multicast Hash Tests
    // =========================================================================

    #[test]
    fn multicast_hash_window_type0() {
        let mut ctl = controller();
        // vector = (0xAB >> 4) | (0xCD << 4) = 0xCDA -> word 102, bit 26
        let addr = [0x01, 0x00, 0x5E, 0x00, 0xAB, 0xCD];

        ctl.update_multicast(&[addr], true);

        assert_eq!(ctl.filter.mta_in_use, 1);
        assert_eq!(ctl.filter.mc_shadow[102], 1 << 26);
        assert_eq!(ctl.bus.get(regs::mc_tbl(102)), 1 << 26);
    }

    #[test]
    fn multicast_hash_window_type3() {
        let mut ctl = controller_with(LinkConfig::new().with_mc_filter_type(3));
        // vector = 0xAB | (0xCD << 8) & 0xFFF = 0xDAB -> word 109, bit 11
        let addr = [0x01, 0x00, 0x5E, 0x00, 0xAB, 0xCD];

        ctl.update_multicast(&[addr], true);

        assert_eq!(ctl.filter.mc_shadow[109], 1 << 11);
    }

    #[test]
    fn multicast_rebuild_enables_hashing() {
        let mut ctl = controller();
        let addr = [0x33, 0x33, 0x00, 0x00, 0x00, 0x01];

        ctl.update_multicast(&[addr], true);

        assert_ne!(ctl.bus.get(regs::RX_CTL) & rx_ctl::MC_HASH_ENA, 0);
    }

    #[test]
    fn empty_multicast_rebuild_leaves_hashing_off() {
        let mut ctl = controller();

        ctl.update_multicast(&[], true);

        assert_eq!(ctl.filter.mta_in_use, 0);
        assert_eq!(ctl.bus.get(regs::RX_CTL) & rx_ctl::MC_HASH_ENA, 0);
    }

    #[test]
    fn multicast_accumulates_without_clear() {
        let mut ctl = controller();
        let first = [0x01, 0x00, 0x5E, 0x00, 0xAB, 0xCD];
        let second = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x00];

        ctl.update_multicast(&[first], true);
        ctl.update_multicast(&[second], false);

        // Both bits present, counter reflects only the last rebuild.
        assert_eq!(ctl.filter.mc_shadow[102], 1 << 26);
        assert_eq!(ctl.filter.mc_shadow[0], 1);
        assert_eq!(ctl.filter.mta_in_use, 1);
    }

    #[test]
    fn multicast_clear_drops_previous_shadow() {
        let mut ctl = controller();
        let first = [0x01, 0x00, 0x5E, 0x00, 0xAB, 0xCD];
        let second = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x00];

        ctl.update_multicast(&[first], true);
        ctl.update_multicast(&[second], true);

        assert_eq!(ctl.filter.mc_shadow[102], 0);
        assert_eq!(ctl.bus.get(regs::mc_tbl(102)), 0);
        assert_eq!(ctl.filter.mc_shadow[0], 1);
    }

    // =========================================================================
    // SAN Address Tests
    // =========================================================================

    #[test]
    fn san_fetch_walks_pointer_for_port0() {
        let mut ctl = controller();
        ctl.eeprom.set_word(nvm::SAN_MAC_ADDR_PTR, 0x40);
        ctl.eeprom.set_word(0x40, 0x0011);
        ctl.eeprom.set_word(0x41, 0x2233);
        ctl.eeprom.set_word(0x42, 0x4455);

        let addr = ctl.fetch_san_mac_addr();

        assert_eq!(addr, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn san_fetch_applies_port1_offset() {
        let mut ctl = controller();
        ctl.state.lan_id = 1;
        ctl.eeprom.set_word(nvm::SAN_MAC_ADDR_PTR, 0x40);
        ctl.eeprom.set_word(0x43, 0x0260);
        ctl.eeprom.set_word(0x44, 0x7B99);
        ctl.eeprom.set_word(0x45, 0x1234);

        let addr = ctl.fetch_san_mac_addr();

        assert_eq!(addr, [0x02, 0x60, 0x7B, 0x99, 0x12, 0x34]);
    }

    #[test]
    fn san_fetch_without_pointer_fills_ff() {
        let mut ctl = controller();

        assert_eq!(ctl.fetch_san_mac_addr(), [0xFF; 6]);
    }

    #[test]
    fn set_san_without_pointer_errors() {
        let mut ctl = controller();
        let addr = [0x02, 0, 0, 0, 0, 0x01];

        let result = ctl.set_san_mac_addr(&addr);

        assert_eq!(result, Err(ConfigError::NoSanAddress.into()));
    }

    #[test]
    fn set_san_reprograms_reserved_slot() {
        let mut ctl = controller();
        ctl.eeprom.set_word(nvm::SAN_MAC_ADDR_PTR, 0x40);
        ctl.state.san_addr_rar_index = Some(regs::NUM_RAR_ENTRIES - 1);
        let addr = [0x02, 0x00, 0x00, 0x44, 0x55, 0x66];

        ctl.set_san_mac_addr(&addr).unwrap();

        assert_eq!(ctl.state.san_addr, addr);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_IDX), regs::NUM_RAR_ENTRIES - 1);
        assert_eq!(ctl.bus.get(regs::ETH_ADDR_L), 0x0044_5566);
    }

    // =========================================================================
    // WWN Prefix Tests
    // =========================================================================

    #[test]
    fn wwn_prefix_walk() {
        let mut ctl = controller();
        ctl.eeprom.set_word(nvm::ALT_MAC_ADDR_BLK_PTR, 0x60);
        ctl.eeprom
            .set_word(0x60 + nvm::ALT_WWN_CAPS_OFFSET, nvm::ALT_WWN_CAPS_ALTWWN);
        ctl.eeprom.set_word(0x60 + nvm::ALT_WWNN_OFFSET, 0x2000);
        ctl.eeprom.set_word(0x60 + nvm::ALT_WWPN_OFFSET, 0x2001);

        assert_eq!(ctl.fetch_wwn_prefix(), (0x2000, 0x2001));
    }

    #[test]
    fn wwn_prefix_without_capability_is_invalid() {
        let mut ctl = controller();
        ctl.eeprom.set_word(nvm::ALT_MAC_ADDR_BLK_PTR, 0x60);
        ctl.eeprom.set_word(0x60 + nvm::ALT_WWN_CAPS_OFFSET, 0);

        assert_eq!(
            ctl.fetch_wwn_prefix(),
            (nvm::WWN_PREFIX_DEFAULT, nvm::WWN_PREFIX_DEFAULT)
        );
    }

    #[test]
    fn wwn_prefix_without_block_is_invalid() {
        let mut ctl = controller();

        assert_eq!(
            ctl.fetch_wwn_prefix(),
            (nvm::WWN_PREFIX_DEFAULT, nvm::WWN_PREFIX_DEFAULT)
        );
    }
}
