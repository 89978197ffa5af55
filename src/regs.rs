//! Device register map
//!
//! Offsets and field masks for the adapter's memory-mapped control space,
//! plus the register numbers of the separate PCS/autoneg status space
//! reached through [`PhyStatusBus`](crate::hal::PhyStatusBus). Field masks
//! live in a small module named after their register.
//!
//! Indexed registers (queues, filter banks, tables) are exposed as
//! `const fn` accessors so callers never do stride math inline.

// =============================================================================
// Global Reset / Load Status
// =============================================================================

/// Device reset control, one request bit per LAN port
pub const RST: u32 = 0x0001_000C;

/// Reset status and recovery timer
pub const RST_STAT: u32 = 0x0001_0030;

/// Internal loader status, set while flash/firmware load is in flight
pub const ILDR_STAT: u32 = 0x0001_0120;

/// Serial flash status
pub const SPI_STAT: u32 = 0x0001_01B4;

/// Fields of [`RST`]
pub mod rst {
    /// Reset request bit for a LAN port (0 or 1)
    #[must_use]
    pub const fn lan(lan_id: u32) -> u32 {
        1 << (lan_id & 1)
    }
}

/// Fields of [`RST_STAT`]
pub mod rst_stat {
    /// Recovery timer field
    pub const TIMER_MASK: u32 = 0xFF << 8;

    /// Default recovery timer seed written after every reset
    pub const TIMER_SEED: u32 = 30;

    /// Encodes a timer seed into the timer field
    #[must_use]
    pub const fn timer_init(seed: u32) -> u32 {
        (seed & 0xFF) << 8
    }
}

/// Fields of [`ILDR_STAT`]
pub mod ildr_stat {
    /// Software-reset load pending bit for a LAN port; clears when the
    /// post-reset flash load has completed
    #[must_use]
    pub const fn sw_rst_lan(lan_id: u32) -> u32 {
        1 << (lan_id & 1)
    }
}

/// Fields of [`SPI_STAT`]
pub mod spi_stat {
    /// Strapped to run without a fitted flash part; load polling is moot
    pub const BYPASS: u32 = 1 << 31;
}

// =============================================================================
// Interrupt Control
// =============================================================================

/// Miscellaneous (non-queue) interrupt enable
pub const MISC_IEN: u32 = 0x0001_0200;

/// Miscellaneous interrupt cause, write-1-to-clear
pub const MISC_ICR: u32 = 0x0001_0208;

/// Queue interrupt mask-set register for bank 0 or 1; writing a bit masks
/// the matching vector
#[must_use]
pub const fn ims(bank: u32) -> u32 {
    0x0001_0220 + 4 * (bank & 1)
}

/// Queue interrupt cause register for bank 0 or 1, write-1-to-clear
#[must_use]
pub const fn icr(bank: u32) -> u32 {
    0x0001_0230 + 4 * (bank & 1)
}

/// Interrupt vector allocation register, 4 mapping words
#[must_use]
pub const fn ivar(index: u32) -> u32 {
    0x0001_0240 + 4 * (index & 3)
}

/// Shared interrupt field values
pub mod irq {
    /// Every cause/mask bit in a bank
    pub const MASK_ALL: u32 = 0xFFFF_FFFF;

    /// Valid bits of the four vector allocation words
    pub const IVAR_VALID_MASK: u32 = 0x8080_8080;

    /// Number of interrupt banks
    pub const BANKS: u32 = 2;

    /// Number of vector allocation words
    pub const IVAR_WORDS: u32 = 4;
}

// =============================================================================
// Thermal Sensor
// =============================================================================

/// Thermal sensor control
pub const TS_CTL: u32 = 0x0001_0300;

/// Thermal sensor interrupt enables
pub const TS_INT: u32 = 0x0001_0304;

/// Thermal sensor enable
pub const TS_EN: u32 = 0x0001_0308;

/// Thermal sensor raw reading
pub const TS_STAT: u32 = 0x0001_030C;

/// Thermal alarm threshold code
pub const TS_ALARM: u32 = 0x0001_0310;

/// Thermal power-down threshold code
pub const TS_PDOWN: u32 = 0x0001_0314;

/// Fields of the thermal sensor block
pub mod ts {
    /// [`TS_CTL`](super::TS_CTL): continuous evaluation mode
    pub const EVAL_MODE: u32 = 1 << 31;

    /// [`TS_INT`](super::TS_INT): alarm interrupt enable
    pub const ALARM_EN: u32 = 1 << 0;

    /// [`TS_INT`](super::TS_INT): power-down interrupt enable
    pub const PDOWN_EN: u32 = 1 << 1;

    /// [`TS_EN`](super::TS_EN): sensor enable
    pub const ENA: u32 = 1 << 0;

    /// [`TS_STAT`](super::TS_STAT): raw reading field
    pub const DATA_MASK: u32 = 0x3FF;

    /// Threshold code corresponding to the 100 C alarm point
    pub const ALARM_100C: u32 = 677;

    /// Threshold code corresponding to the 90 C power-down point
    pub const PDOWN_90C: u32 = 614;
}

// =============================================================================
// MAC Core
// =============================================================================

/// MAC receive path configuration
pub const MAC_RX_CFG: u32 = 0x0001_1000;

/// MAC transmit path configuration
pub const MAC_TX_CFG: u32 = 0x0001_1010;

/// Maximum accepted frame size
pub const MAC_FRAME_SZ: u32 = 0x0001_1020;

/// Statistics counter control
pub const MAC_CNT_CTL: u32 = 0x0001_1030;

/// Receive pause-frame processing
pub const RX_FC_CFG: u32 = 0x0001_1040;

/// Transmit pause-frame generation
pub const TX_FC_CFG: u32 = 0x0001_1050;

/// Pause destination address, low 4 bytes
pub const MAC_PAUSE_LO: u32 = 0x0001_1060;

/// Pause destination address, high 2 bytes
pub const MAC_PAUSE_HI: u32 = 0x0001_1064;

/// MAC-level receive filter
pub const MAC_RX_FLT: u32 = 0x0001_1070;

/// Fields of [`MAC_RX_CFG`]
pub mod mac_rx_cfg {
    /// Receive path enable
    pub const ENA: u32 = 1 << 0;

    /// Accept jumbo frames
    pub const JUMBO: u32 = 1 << 8;
}

/// Fields of [`MAC_TX_CFG`]
pub mod mac_tx_cfg {
    /// Transmit path enable
    pub const ENA: u32 = 1 << 0;
}

/// Fields of [`MAC_CNT_CTL`]
pub mod mac_cnt_ctl {
    /// Counters clear on read
    pub const READ_CLEAR: u32 = 1 << 2;
}

/// Fields shared by [`RX_FC_CFG`] and [`TX_FC_CFG`]
pub mod fc {
    /// Pause-frame processing enable
    pub const ENA: u32 = 1 << 0;
}

/// Fields of [`MAC_RX_FLT`]
pub mod mac_rx_flt {
    /// Pass all traffic up regardless of filters
    pub const PROMISC: u32 = 1 << 31;
}

/// IEEE pause destination address 01:80:C2:00:00:01, register byte order
pub mod pause_addr {
    /// Low word of the pause destination address
    pub const LO: u32 = 0xC200_0001;

    /// High word of the pause destination address
    pub const HI: u32 = 0x0000_0180;
}

/// Maximum frame size programmed after reset (1518 + VLAN tag)
pub const FRAME_SIZE_DEFAULT: u32 = 1522;

// =============================================================================
// Port Status / GPIO
// =============================================================================

/// Port status: link state, established bandwidth, LAN id strap
pub const PORT_STAT: u32 = 0x0001_4404;

/// Module control GPIO data
pub const GPIO_DATA: u32 = 0x0001_4800;

/// Fields of [`PORT_STAT`]
pub mod portstat {
    /// Link established
    pub const UP: u32 = 1 << 0;

    /// One-hot established bandwidth field
    pub const BW_MASK: u32 = 0x7 << 4;

    /// 10 Gb/s established
    pub const BW_10G: u32 = 1 << 4;

    /// 1 Gb/s established
    pub const BW_1G: u32 = 1 << 5;

    /// 100 Mb/s established
    pub const BW_100M: u32 = 1 << 6;

    /// LAN id strap bit
    pub const ID: u32 = 1 << 8;

    /// Extracts the LAN id of this function
    #[must_use]
    pub const fn lan_id(raw: u32) -> u32 {
        (raw & ID) >> 8
    }
}

/// Fields of [`GPIO_DATA`]
pub mod gpio {
    /// Transmit laser disable, lane 0
    pub const LASER_OFF_0: u32 = 1 << 0;

    /// Transmit laser disable, lane 1
    pub const LASER_OFF_1: u32 = 1 << 1;

    /// Both laser disable lines
    pub const LASER_OFF_MASK: u32 = LASER_OFF_0 | LASER_OFF_1;

    /// Module-absent presence pin; low means a module is seated
    pub const MOD_ABSENT: u32 = 1 << 2;

    /// Module rate select, line 0
    pub const RATE_SEL_0: u32 = 1 << 4;

    /// Module rate select, line 1
    pub const RATE_SEL_1: u32 = 1 << 5;

    /// Both rate select lines; high selects the 10G optics profile
    pub const RATE_SEL_MASK: u32 = RATE_SEL_0 | RATE_SEL_1;
}

// =============================================================================
// Receive Steering / Address Tables
// =============================================================================

/// Receive steering control: hash filters, filter-type window, MAC loopback
pub const RX_CTL: u32 = 0x0001_5000;

/// Receive address table index select
pub const ETH_ADDR_IDX: u32 = 0x0001_6200;

/// Receive address data, low 4 bytes, through the selected index
pub const ETH_ADDR_L: u32 = 0x0001_6204;

/// Receive address data, high 2 bytes plus valid bit
pub const ETH_ADDR_H: u32 = 0x0001_6208;

/// Pool association bitmap for the selected index, pools 0-31
pub const ETH_ADDR_VM_L: u32 = 0x0001_620C;

/// Pool association bitmap for the selected index, pools 32-63
pub const ETH_ADDR_VM_H: u32 = 0x0001_6210;

/// Multicast hash table word, 128 words of 32 bits
#[must_use]
pub const fn mc_tbl(index: u32) -> u32 {
    0x0001_6400 + 4 * (index & 0x7F)
}

/// Unicast hash table word, 128 words of 32 bits
#[must_use]
pub const fn uc_tbl(index: u32) -> u32 {
    0x0001_6800 + 4 * (index & 0x7F)
}

/// Fields of [`RX_CTL`]
pub mod rx_ctl {
    /// MAC loopback enable, used while draining stuck transmit work
    pub const LOOPBACK: u32 = 1 << 17;

    /// Multicast hash filter enable
    pub const MC_HASH_ENA: u32 = 1 << 7;

    /// Unicast hash filter enable
    pub const UC_HASH_ENA: u32 = 1 << 6;

    /// Multicast filter-type window select
    pub const FILTER_TYPE_MASK: u32 = 0x3 << 4;

    /// Encodes a filter-type selector into its field
    #[must_use]
    pub const fn filter_type(mc_filter_type: u8) -> u32 {
        ((mc_filter_type as u32) & 0x3) << 4
    }
}

/// Fields of [`ETH_ADDR_H`]
pub mod eth_addr_h {
    /// Entry holds a valid address
    pub const VALID: u32 = 1 << 31;

    /// Address bytes carried in the high word
    pub const ADDR_MASK: u32 = 0xFFFF;
}

// =============================================================================
// Flex Filter Banks
// =============================================================================

/// Wake-on-LAN flex filter select
pub const LAN_FLEX_SEL: u32 = 0x0001_9400;

/// Wake flex filter data, low word of entry `index`
#[must_use]
pub const fn lan_flex_dw_lo(index: u32) -> u32 {
    0x0001_9410 + 0x10 * (index & 0xF)
}

/// Wake flex filter data, high word of entry `index`
#[must_use]
pub const fn lan_flex_dw_hi(index: u32) -> u32 {
    lan_flex_dw_lo(index) + 4
}

/// Wake flex filter byte mask of entry `index`
#[must_use]
pub const fn lan_flex_msk(index: u32) -> u32 {
    lan_flex_dw_lo(index) + 8
}

// =============================================================================
// Management Firmware
// =============================================================================

/// Host-to-firmware command doorbell
pub const MNG_CMD: u32 = 0x0001_E100;

/// Management firmware status
pub const MNG_STAT: u32 = 0x0001_E104;

/// Software/firmware semaphore
pub const FW_SEM: u32 = 0x0001_E200;

/// Management flex filter select
pub const MNG_FLEX_SEL: u32 = 0x0001_E400;

/// Management flex filter data, low word of entry `index`
#[must_use]
pub const fn mng_flex_dw_lo(index: u32) -> u32 {
    0x0001_E410 + 0x10 * (index & 0xF)
}

/// Management flex filter data, high word of entry `index`
#[must_use]
pub const fn mng_flex_dw_hi(index: u32) -> u32 {
    mng_flex_dw_lo(index) + 4
}

/// Management flex filter byte mask of entry `index`
#[must_use]
pub const fn mng_flex_msk(index: u32) -> u32 {
    mng_flex_dw_lo(index) + 8
}

/// Fields of [`MNG_CMD`] and [`MNG_STAT`]
pub mod mng {
    /// [`MNG_CMD`](super::MNG_CMD): doorbell, cleared by firmware on accept
    pub const REQ: u32 = 1 << 31;

    /// [`MNG_CMD`](super::MNG_CMD): LAN reset request bit for a port
    #[must_use]
    pub const fn lan_reset(lan_id: u32) -> u32 {
        1 << (lan_id & 1)
    }

    /// [`MNG_STAT`](super::MNG_STAT): firmware initialized and present
    pub const INIT_DONE: u32 = 1 << 0;

    /// [`MNG_STAT`](super::MNG_STAT): module provisioning handshake complete
    pub const SFP_PROV_DONE: u32 = 1 << 3;

    /// [`MNG_STAT`](super::MNG_STAT): firmware holds the PHY, laser and
    /// PHY resets must be skipped while set
    pub const PHY_VETO: u32 = 1 << 8;
}

/// Fields of [`FW_SEM`]
pub mod fw_sem {
    /// Driver claim on the PHY register group
    pub const SW_PHY: u32 = 1 << 0;

    /// Driver claim on the shared CSR group
    pub const SW_MAC_CSR: u32 = 1 << 1;

    /// Driver claim on the flash interface
    pub const SW_FLASH: u32 = 1 << 2;

    /// Firmware claim on the PHY register group
    pub const FW_PHY: u32 = 1 << 16;

    /// Firmware claim on the shared CSR group
    pub const FW_MAC_CSR: u32 = 1 << 17;

    /// Firmware claim on the flash interface
    pub const FW_FLASH: u32 = 1 << 18;
}

// =============================================================================
// Queues / Transmit Arbiter
// =============================================================================

/// Receive queue configuration
#[must_use]
pub const fn rxq_cfg(queue: u32) -> u32 {
    0x0002_1000 + 0x40 * (queue & 0x7F)
}

/// Transmit queue configuration
#[must_use]
pub const fn txq_cfg(queue: u32) -> u32 {
    0x0003_1000 + 0x40 * (queue & 0x7F)
}

/// Transmit rate arbiter pool index select
pub const TX_ARB_IDX: u32 = 0x0003_0010;

/// Transmit rate arbiter rate value for the selected pool
pub const TX_ARB_RATE: u32 = 0x0003_0014;

/// Fields of [`rxq_cfg`]
pub mod rxq {
    /// Queue enable
    pub const ENA: u32 = 1 << 0;
}

/// Fields of [`txq_cfg`]
pub mod txq {
    /// Queue enable
    pub const ENA: u32 = 1 << 0;

    /// Flush the queue and drop in-flight descriptors
    pub const FLUSH: u32 = 1 << 26;
}

// =============================================================================
// Autoneg Control
// =============================================================================

/// Link-mode / autoneg control word; field layout in
/// [`AnCtl`](crate::an_ctl::AnCtl)
pub const AN_CTL: u32 = 0x0004_2000;

// =============================================================================
// PCS / Autoneg Status Space
// =============================================================================

/// Register numbers of the PCS-side status space, read through
/// [`PhyStatusBus`](crate::hal::PhyStatusBus)
pub mod epcs {
    /// PCS control 2: active PCS type select
    pub const PCS_CTL2: u32 = 0x0001_0007;

    /// Autoneg advertisement word 1: backplane technology abilities
    pub const AN_ADV1: u32 = 0x0007_0010;

    /// Fields of [`PCS_CTL2`]
    pub mod pcs_ctl2 {
        /// PCS type select field
        pub const TYPE_MASK: u32 = 0x3;

        /// Serial-lane (BASE-X family) PCS type expected on this device
        pub const TYPE_BASE_X: u32 = 0x1;
    }

    /// Fields of [`AN_ADV1`]
    pub mod an_adv1 {
        /// 1000BASE-KX ability advertised
        pub const KX: u32 = 1 << 5;

        /// 10GBASE-KX4 ability advertised
        pub const KX4: u32 = 1 << 6;

        /// 10GBASE-KR ability advertised
        pub const KR: u32 = 1 << 7;
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Transmit queues carried by the device
pub const NUM_TX_QUEUES: u32 = 128;

/// Receive queues carried by the device
pub const NUM_RX_QUEUES: u32 = 128;

/// Receive address table slots
pub const NUM_RAR_ENTRIES: u32 = 128;

/// Words in the multicast hash table
pub const MC_TBL_WORDS: usize = 128;

/// Words in the unicast hash table
pub const UC_TBL_WORDS: usize = 128;

/// Entries in each flex filter bank
pub const FLEX_FILTERS: u32 = 16;

// =============================================================================
// Timing
// =============================================================================

/// Poll budgets and settle delays used by the bring-up sequences.
///
/// Every loop in the crate is bounded by one of these counts; none of the
/// delays is load-bearing for correctness beyond the device's published
/// minimums.
pub mod timing {
    /// Settle after writing a MAC reset request, in microseconds
    pub const RESET_SETTLE_US: u32 = 10;

    /// Recovery wait after the flash-load check, in milliseconds
    pub const RESET_RECOVER_MS: u32 = 50;

    /// Flash-load completion polls
    pub const FLASH_LOAD_POLLS: u32 = 10;

    /// Delay per flash-load poll, in milliseconds
    pub const FLASH_LOAD_POLL_MS: u32 = 100;

    /// Settle after stopping the data path, in milliseconds
    pub const STOP_SETTLE_MS: u32 = 2;

    /// Wait for loopback to take effect before draining, in milliseconds
    pub const TX_DRAIN_SETUP_MS: u32 = 3;

    /// Fixed drain iterations while transmit work bleeds off
    pub const TX_DRAIN_ITERS: u32 = 880;

    /// Delay per drain iteration, in microseconds
    pub const TX_DRAIN_STEP_US: u32 = 100;

    /// Settle after the post-drain flush, in microseconds
    pub const TX_DRAIN_FLUSH_US: u32 = 20;

    /// Laser off dwell during a flap, in microseconds
    pub const LASER_OFF_US: u32 = 100;

    /// Laser on stabilization during a flap, in milliseconds
    pub const LASER_ON_MS: u32 = 100;

    /// Optics retuning wait after toggling rate select, in milliseconds
    pub const RATE_SELECT_SETTLE_MS: u32 = 40;

    /// Delay per link-up poll, in milliseconds
    pub const LINK_POLL_MS: u32 = 100;

    /// Link-up polls per 10G fiber attempt
    pub const FIBER_10G_POLLS: u32 = 5;

    /// Autoneg-complete polls for backplane link modes
    pub const AUTONEG_POLLS: u32 = 45;

    /// Delay per autoneg-complete poll, in milliseconds
    pub const AUTONEG_POLL_MS: u32 = 100;

    /// Settle after a link-mode change or pipeline reset, in milliseconds
    pub const PIPELINE_SETTLE_MS: u32 = 50;

    /// Full-advertisement setup attempts before degrading
    pub const SMARTSPEED_RETRIES: u32 = 3;

    /// Link-up polls per full-advertisement attempt
    pub const SMARTSPEED_STABLE_POLLS: u32 = 5;

    /// Link-up polls for the degraded attempt; longer to cover worst-case
    /// backplane autoneg convergence
    pub const SMARTSPEED_DEGRADED_POLLS: u32 = 6;

    /// Delay per SmartSpeed link poll, in milliseconds
    pub const SMARTSPEED_POLL_MS: u32 = 100;

    /// Default link-up polls for `check_link` with wait enabled
    pub const LINK_UP_POLLS: u32 = 90;

    /// Semaphore acquisition attempts
    pub const SEM_ACQUIRE_TRIES: u32 = 200;

    /// Backoff between semaphore attempts, in microseconds
    pub const SEM_RETRY_DELAY_US: u32 = 5000;

    /// Settle after releasing the semaphore around module setup, in
    /// milliseconds
    pub const SFP_SETUP_SETTLE_MS: u32 = 10;

    /// Module provisioning handshake polls
    pub const SFP_PROV_POLLS: u32 = 5;

    /// Delay per provisioning poll, in milliseconds
    pub const SFP_PROV_POLL_MS: u32 = 20;

    /// Firmware command acknowledge polls
    pub const MNG_ACK_POLLS: u32 = 10;

    /// Delay per acknowledge poll, in milliseconds
    pub const MNG_ACK_POLL_MS: u32 = 1;
}

// =============================================================================
// Unit Tests
// =============================================================================
