//! Reset and bring-up sequencing
//!
//! One controller reset takes the port from whatever state the last
//! owner left it in to a coherent, link-down baseline: data path
//! stopped, transmit drained, module identified and provisioned, PHY
//! and MAC cores reset, ability snapshot restored, receive address
//! table rebuilt. [`init`](super::LinkController::init) chains the
//! reset into [`start`](super::LinkController::start), which caches the
//! module facts the negotiation paths key off.
//!
//! Module trouble is split into two classes. An unsupported module
//! aborts the sequence immediately; a missing or half-provisioned one
//! lets the sequence finish and is reported afterwards, so the caller
//! can keep the port initialized while polling for insertion.

use super::LinkController;
use super::addr_filter::validate_mac_addr;
use crate::error::{IoError, Result, SfpError};
use crate::hal::eeprom::nvm;
use crate::hal::{EepromReader, FwArbiter, FwResource, PhyStatusBus, RegisterBus};
use crate::phy::PhyDriver;
use crate::regs::{
    self, epcs, fc, ildr_stat, irq, mac_cnt_ctl, mac_rx_cfg, mac_rx_flt, mac_tx_cfg, mng,
    pause_addr, portstat, rst, rst_stat, rx_ctl, rxq, spi_stat, timing, txq,
};
use crate::speed::LinkStatus;
use embedded_hal::delay::DelayNs;

// =============================================================================
// Bring-Up
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Reset then start, as one call
    ///
    /// A recoverable module error from [`reset`](Self::reset) does not
    /// block bring-up; the port comes up and reports link down until a
    /// module arrives.
    ///
    /// # Errors
    /// Everything [`reset`](Self::reset) and [`start`](Self::start) can
    /// return, except the recoverable module conditions.
    pub fn init<P: PhyDriver>(&mut self, phy: &mut P) -> Result<()> {
        if let Err(e) = self.reset(phy) {
            if !e.is_sfp_recoverable() {
                return Err(e);
            }
        }
        self.start(phy)
    }

    /// Full controller reset
    ///
    /// Stops the data path, drains transmit, identifies and provisions
    /// the module, resets the PHY and then the MAC core (twice when
    /// recovering from the states that need it), restores the ability
    /// snapshot and rebuilds the receive address table. The sequence
    /// leaves the port stopped; [`start`](Self::start) lifts that.
    ///
    /// # Errors
    /// [`SfpError::NotSupported`] aborts immediately. A missing or
    /// half-provisioned module is returned only after the rest of the
    /// sequence completed. MAC-level failures ([`IoError::NotReady`],
    /// [`IoError::FlashLoadTimeout`]) abort where they occur.
    pub fn reset<P: PhyDriver>(&mut self, phy: &mut P) -> Result<()> {
        // Every per-port register below keys off the port index.
        self.state.lan_id = portstat::lan_id(self.bus.read32(regs::PORT_STAT));

        self.stop()?;
        self.clear_tx_pending();

        let mut status = match phy.identify(&mut self.bus) {
            Err(e) if !e.is_sfp_recoverable() => return Err(e),
            other => other,
        };

        if phy.sfp_setup_needed() {
            status = self.setup_sfp_modules();
            phy.clear_sfp_setup_needed();
            if let Err(e) = status {
                if !e.is_sfp_recoverable() {
                    return Err(e);
                }
            }
        }

        if !self.config.phy_reset_disable && !self.reset_blocked() {
            // A failed PHY reset does not gate the MAC reset.
            let _ = phy.reset(&mut self.bus);
        }

        // The MAC reset reloads the ability word from the NVM. The first
        // reset captures what is live right now as the restore point;
        // later resets reuse the capture without re-reading.
        let snapshot = if self.state.snapshot_valid {
            self.state.an_ctl_snapshot
        } else {
            self.read_an_ctl()
        };

        for _ in 0..2 {
            self.mac_reset()?;
            self.reset_misc();
            self.check_flash_load()?;
            self.delay.delay_ms(timing::RESET_RECOVER_MS);

            // Some error states only clear on a second pass; pending
            // hardware events need the stall between the two.
            if self.state.double_reset_required {
                self.state.double_reset_required = false;
            } else {
                break;
            }
        }

        self.state.an_ctl_snapshot = snapshot;
        self.state.snapshot_valid = true;
        self.write_an_ctl(snapshot);

        // The permanent address is read before the table rebuild may
        // overwrite slot 0 with a configured override.
        self.state.num_rar_entries = regs::NUM_RAR_ENTRIES;
        self.state.san_addr_rar_index = None;
        self.state.perm_addr = self.read_mac_addr();
        self.init_rx_addrs();

        // A programmed storage-network address claims the last slot and
        // shrinks the usable table by one.
        let san = self.fetch_san_mac_addr();
        self.state.san_addr = san;
        if validate_mac_addr(&san).is_ok() {
            let index = self.state.num_rar_entries - 1;
            self.set_rar(index, &san, 0, true)?;
            self.state.san_addr_rar_index = Some(index);
            self.state.num_rar_entries -= 1;
        }

        let (wwnn, wwpn) = self.fetch_wwn_prefix();
        self.state.wwnn_prefix = wwnn;
        self.state.wwpn_prefix = wwpn;

        status
    }

    /// Post-reset start
    ///
    /// Caches the module facts the negotiation paths key off, applies
    /// the crosstalk workaround policy from the NVM capability word,
    /// clears the per-queue transmit rate limiters and resolves the
    /// link setup strategy. Clears the stopped flag last.
    ///
    /// # Errors
    /// Returns the NVM reader's error when the capability word cannot
    /// be read.
    pub fn start<P: PhyDriver>(&mut self, phy: &mut P) -> Result<()> {
        self.state.media_type = phy.media_type();
        self.state.multispeed_fiber = phy.multispeed_fiber();
        self.state.one_g_module = phy.one_g_module();

        // Boards opt out of the module-absent gate through the NVM
        // capability word; everyone else needs it.
        let device_caps = self.eeprom.read_word(nvm::DEVICE_CAPS)?;
        self.state.need_crosstalk_fix = device_caps & nvm::DEVICE_CAPS_NO_CROSSTALK_WR == 0;

        // Fiber rates get one automatic retry after bring-up.
        self.state.autotry_restart = true;

        for queue in 0..regs::NUM_TX_QUEUES {
            self.bus.write32(regs::TX_ARB_IDX, queue);
            self.bus.write32(regs::TX_ARB_RATE, 0);
        }
        self.bus.flush();

        self.state.strategy = self.resolve_strategy();
        self.state.adapter_stopped = false;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "port {} started, strategy {}",
            self.state.lan_id,
            self.state.strategy
        );

        Ok(())
    }
}

// =============================================================================
// Data Path Stop
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Stop the data path
    ///
    /// Disables receive, masks and acknowledges every interrupt source,
    /// flush-disables all transmit queues and stops all receive queues.
    /// Safe to call on an already stopped port.
    pub fn stop(&mut self) -> Result<()> {
        // Nothing below this flag may touch the data path any more.
        self.state.adapter_stopped = true;

        self.disable_rx();

        // Mask every interrupt source, then acknowledge anything that
        // was already pending.
        self.bus.write32(regs::MISC_IEN, 0);
        for bank in 0..irq::BANKS {
            self.bus.write32(regs::ims(bank), irq::MASK_ALL);
        }
        self.bus.write32(regs::MISC_ICR, irq::MASK_ALL);
        for bank in 0..irq::BANKS {
            self.bus.write32(regs::icr(bank), irq::MASK_ALL);
        }

        for queue in 0..regs::NUM_TX_QUEUES {
            self.bus.write32(regs::txq_cfg(queue), txq::FLUSH);
        }
        for queue in 0..regs::NUM_RX_QUEUES {
            self.bus.write32_masked(regs::rxq_cfg(queue), rxq::ENA, 0);
        }

        self.bus.flush();
        self.delay.delay_ms(timing::STOP_SETTLE_MS);
        Ok(())
    }

    /// Receive disable, clearing MAC loopback first when it is set
    fn disable_rx(&mut self) {
        let cfg = self.bus.read32(regs::MAC_RX_CFG);
        if cfg & mac_rx_cfg::ENA == 0 {
            return;
        }

        // Loopback must not stay enabled across a receive disable.
        let steering = self.bus.read32(regs::RX_CTL);
        if steering & rx_ctl::LOOPBACK != 0 {
            self.bus.write32(regs::RX_CTL, steering & !rx_ctl::LOOPBACK);
        }

        self.bus.write32(regs::MAC_RX_CFG, cfg & !mac_rx_cfg::ENA);
    }

    /// Drain in-flight transmit work through internal loopback
    ///
    /// Only needed when the previous reset left the core incoherent;
    /// without the double-reset flag there is nothing in flight and no
    /// register is touched.
    fn clear_tx_pending(&mut self) {
        if !self.state.double_reset_required {
            return;
        }

        // Completions loop back internally for the fixed drain window;
        // the link itself may be dead at this point.
        let saved = self.bus.read32(regs::RX_CTL);
        self.bus.write32(regs::RX_CTL, saved | rx_ctl::LOOPBACK);
        self.bus.flush();
        self.delay.delay_ms(timing::TX_DRAIN_SETUP_MS);

        for _ in 0..timing::TX_DRAIN_ITERS {
            self.delay.delay_us(timing::TX_DRAIN_STEP_US);
        }

        self.bus.flush();
        self.delay.delay_us(timing::TX_DRAIN_FLUSH_US);

        self.bus.write32(regs::RX_CTL, saved);
    }
}

// =============================================================================
// MAC Reset Internals
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// MAC core reset, through firmware when it is present
    fn mac_reset(&mut self) -> Result<()> {
        if self.bus.read32(regs::MNG_STAT) & mng::INIT_DONE != 0 {
            // Firmware owns the reset pin; request and wait for the ack.
            self.bus
                .write32(regs::MNG_CMD, mng::REQ | mng::lan_reset(self.state.lan_id));

            let mut acked = false;
            for _ in 0..timing::MNG_ACK_POLLS {
                if self.bus.read32(regs::MNG_CMD) & mng::REQ == 0 {
                    acked = true;
                    break;
                }
                self.delay.delay_ms(timing::MNG_ACK_POLL_MS);
            }
            if !acked {
                #[cfg(feature = "defmt")]
                defmt::warn!("firmware did not ack the reset request");
                return Err(IoError::NotReady.into());
            }
        } else {
            self.bus.write32(regs::RST, rst::lan(self.state.lan_id));
            self.bus.flush();
        }

        self.delay.delay_us(timing::RESET_SETTLE_US);
        Ok(())
    }

    /// Reinitialize the control registers a core reset wipes
    fn reset_misc(&mut self) {
        // The serial PCS comes out of reset in BASE-X mode; anything
        // else makes the cached link state meaningless.
        let pcs = self.bus.read_phy_status(epcs::PCS_CTL2);
        if pcs & epcs::pcs_ctl2::TYPE_MASK != epcs::pcs_ctl2::TYPE_BASE_X {
            self.state.link = LinkStatus::down();
        }

        // Both flex filter banks hold junk after power-up.
        self.bus.write32(regs::MNG_FLEX_SEL, 0);
        for entry in 0..regs::FLEX_FILTERS {
            self.bus.write32(regs::mng_flex_dw_lo(entry), 0);
            self.bus.write32(regs::mng_flex_dw_hi(entry), 0);
            self.bus.write32(regs::mng_flex_msk(entry), 0);
        }
        self.bus.write32(regs::LAN_FLEX_SEL, 0);
        for entry in 0..regs::FLEX_FILTERS {
            self.bus.write32(regs::lan_flex_dw_lo(entry), 0);
            self.bus.write32(regs::lan_flex_dw_hi(entry), 0);
            self.bus.write32(regs::lan_flex_msk(entry), 0);
        }

        // Frame acceptance follows the configured maximum.
        let jumbo = if self.config.max_frame_size > regs::FRAME_SIZE_DEFAULT {
            mac_rx_cfg::JUMBO
        } else {
            0
        };
        self.bus
            .write32_masked(regs::MAC_RX_CFG, mac_rx_cfg::JUMBO, jumbo);
        self.bus.write32(regs::MAC_FRAME_SZ, self.config.max_frame_size);

        // Counters clear on read; pause processing on in both directions.
        self.bus.write32_masked(
            regs::MAC_CNT_CTL,
            mac_cnt_ctl::READ_CLEAR,
            mac_cnt_ctl::READ_CLEAR,
        );
        self.bus.write32_masked(regs::RX_FC_CFG, fc::ENA, fc::ENA);
        self.bus.write32_masked(regs::TX_FC_CFG, fc::ENA, fc::ENA);

        // Pause frames carry the reserved multicast destination.
        self.bus.write32(regs::MAC_PAUSE_LO, pause_addr::LO);
        self.bus.write32(regs::MAC_PAUSE_HI, pause_addr::HI);

        let promisc = if self.config.promiscuous {
            mac_rx_flt::PROMISC
        } else {
            0
        };
        self.bus
            .write32_masked(regs::MAC_RX_FLT, mac_rx_flt::PROMISC, promisc);

        // Reseed the reset recovery timer.
        self.bus.write32_masked(
            regs::RST_STAT,
            rst_stat::TIMER_MASK,
            rst_stat::timer_init(rst_stat::TIMER_SEED),
        );

        // Thermal thresholds only exist on port 0.
        let _ = self.init_thermal_thresholds();

        self.bus
            .write32_masked(regs::MAC_TX_CFG, mac_tx_cfg::ENA, mac_tx_cfg::ENA);

        // Vector allocation entries come up with stale valid bits.
        for word in 0..irq::IVAR_WORDS {
            self.bus
                .write32_masked(regs::ivar(word), irq::IVAR_VALID_MASK, 0);
        }
    }

    /// Wait for the post-reset flash configuration load
    ///
    /// Boards strapped to bypass flash never raise load-done and skip
    /// the wait entirely.
    fn check_flash_load(&mut self) -> Result<()> {
        if self.bus.read32(regs::SPI_STAT) & spi_stat::BYPASS != 0 {
            return Ok(());
        }

        let pending = ildr_stat::sw_rst_lan(self.state.lan_id);
        for _ in 0..timing::FLASH_LOAD_POLLS {
            if self.bus.read32(regs::ILDR_STAT) & pending == 0 {
                return Ok(());
            }
            self.delay.delay_ms(timing::FLASH_LOAD_POLL_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("flash configuration load did not finish");
        Err(IoError::FlashLoadTimeout.into())
    }
}

// =============================================================================
// SFP Provisioning
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Wait out firmware provisioning of a freshly seated module
    ///
    /// The PHY claim is held for the whole wait so controller accesses
    /// cannot interleave with the firmware's module writes; it is
    /// released on the timeout path too.
    fn setup_sfp_modules(&mut self) -> Result<()> {
        self.arbiter.acquire(FwResource::Phy)?;

        let mut provisioned = false;
        for _ in 0..timing::SFP_PROV_POLLS {
            if self.bus.read32(regs::MNG_STAT) & mng::SFP_PROV_DONE != 0 {
                provisioned = true;
                break;
            }
            self.delay.delay_ms(timing::SFP_PROV_POLL_MS);
        }

        self.arbiter.release(FwResource::Phy);

        if !provisioned {
            #[cfg(feature = "defmt")]
            defmt::warn!("module provisioning did not finish");
            return Err(SfpError::SetupIncomplete.into());
        }

        self.delay.delay_ms(timing::SFP_SETUP_SETTLE_MS);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
