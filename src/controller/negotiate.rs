//! Link negotiation and MAC-side link setup
//!
//! This module extends [`LinkController`] with everything between "give
//! me these speeds" and a programmed autoneg control word:
//!
//! - **Capability decode** - what the stored link mode actually allows
//! - **Direct setup** - rewrite the control word for the requested set
//! - **Multispeed walk** - try each optical rate highest first, with
//!   module rate pins and laser flaps between attempts
//! - **Link start** - pipeline reset that restarts negotiation without
//!   touching the configured abilities
//!
//! The untouched pre-reset control word, captured by the reset sequence,
//! is the reference for which backplane abilities the board really has;
//! the live register only shows what the last setup left behind.

use super::state::SetupStrategy;
use super::{LinkController, SmartSpeedMode};
use crate::an_ctl::{AnCtl, LinkMode};
use crate::error::{ConfigError, IoError, Result};
use crate::hal::eeprom::nvm;
use crate::hal::{EepromReader, FwArbiter, FwResource, PhyStatusBus, RegisterBus};
use crate::phy::{MediaType, PhyDriver};
use crate::regs::{self, gpio, mng, portstat, timing};
use crate::speed::LinkSpeed;
use embedded_hal::delay::DelayNs;

// =============================================================================
// Setup Dispatch
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Bring the link up at the best of the requested speeds
    ///
    /// Dispatches on the strategy resolved at start: optical rate walk,
    /// SmartSpeed ladder, PHY-led copper setup or a direct control word
    /// rewrite. Whether the call blocks on negotiation follows the
    /// configured `wait_for_autoneg`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidLinkSettings`] when none of the requested
    /// speeds is supported, [`IoError::AutonegIncomplete`] when a
    /// blocking backplane negotiation does not resolve in time.
    pub fn setup_link<P: PhyDriver>(&mut self, phy: &mut P, speed: LinkSpeed) -> Result<()> {
        let wait = self.config.wait_for_autoneg;

        match self.state.strategy {
            SetupStrategy::MultispeedFiber => self.setup_mac_link_multispeed_fiber(speed, wait),
            SetupStrategy::SmartSpeed => self.setup_mac_link_smartspeed(speed, wait),
            SetupStrategy::Copper => {
                phy.setup_link_speed(&mut self.bus, speed, wait)?;
                self.start_mac_link(wait)
            }
            SetupStrategy::Direct => self.setup_mac_link(speed, wait),
        }
    }

    /// Pick the setup strategy for the identified media
    pub(super) fn resolve_strategy(&mut self) -> SetupStrategy {
        match self.state.media_type {
            MediaType::Copper => SetupStrategy::Copper,
            MediaType::Fiber | MediaType::FiberQsfp if self.state.multispeed_fiber => {
                SetupStrategy::MultispeedFiber
            }
            MediaType::Backplane => {
                let want_smartspeed =
                    matches!(self.config.smart_speed, SmartSpeedMode::Auto | SmartSpeedMode::On);
                if want_smartspeed && !self.lesm_fw_enabled() {
                    SetupStrategy::SmartSpeed
                } else {
                    SetupStrategy::Direct
                }
            }
            _ => SetupStrategy::Direct,
        }
    }
}

// =============================================================================
// Capability Decode
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Decode the supported speed set and whether it auto-negotiates
    ///
    /// Works from the captured pre-reset control word when one is
    /// stored, so a previous setup cannot narrow what the board
    /// advertises. A seated 1 Gb/s-only module short-circuits the whole
    /// decode; a multispeed module widens it to both optical rates.
    pub fn get_link_capabilities(&mut self) -> (LinkSpeed, bool) {
        if self.state.one_g_module {
            return (LinkSpeed::G1, true);
        }

        let an_ctl = if self.state.snapshot_valid {
            self.state.an_ctl_snapshot
        } else {
            self.read_an_ctl()
        };

        let (mut speed, mut autoneg) = match an_ctl.link_mode() {
            LinkMode::Fixed1G => (LinkSpeed::G1, false),
            LinkMode::Fixed10G | LinkMode::Serial10G => (LinkSpeed::G10, false),
            LinkMode::An1G => (LinkSpeed::G1, true),
            LinkMode::BackplaneAn | LinkMode::BackplaneAn1G => {
                (backplane_abilities(an_ctl, LinkSpeed::UNKNOWN), true)
            }
            LinkMode::BackplaneAnSgmii => (backplane_abilities(an_ctl, LinkSpeed::M100), true),
            LinkMode::Sgmii => (LinkSpeed::G1 | LinkSpeed::M100 | LinkSpeed::M10, false),
        };

        if self.state.multispeed_fiber {
            speed |= LinkSpeed::G10 | LinkSpeed::G1;

            // QSFP runs without full auto-negotiation; only the limited
            // 1G handshake applies there.
            autoneg = self.state.media_type != MediaType::FiberQsfp;
        }

        (speed, autoneg)
    }

    pub(super) fn read_an_ctl(&mut self) -> AnCtl {
        AnCtl::from_raw(self.bus.read32(regs::AN_CTL))
    }

    pub(super) fn write_an_ctl(&mut self, an_ctl: AnCtl) {
        self.bus.write32(regs::AN_CTL, an_ctl.to_raw());
    }
}

/// Speed set granted by the backplane ability bits
fn backplane_abilities(an_ctl: AnCtl, base: LinkSpeed) -> LinkSpeed {
    let mut speed = base;
    if an_ctl.kr_support() || an_ctl.kx4_support() {
        speed |= LinkSpeed::G10;
    }
    if an_ctl.kx_support() {
        speed |= LinkSpeed::G1;
    }
    speed
}

// =============================================================================
// Direct MAC Setup
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Rewrite the autoneg control word for the requested speed set
    ///
    /// For backplane modes the KX/KX4/KR ability bits are rebuilt from
    /// the captured pre-reset word; KR stays withdrawn while the
    /// SmartSpeed ladder is in its degraded phase. Serial-lane setups
    /// switch the link mode between the 1G and 10G lane when exactly
    /// the other rate is requested. A rewrite that changes nothing
    /// returns without touching the hardware.
    ///
    /// # Errors
    /// [`ConfigError::InvalidLinkSettings`] when the request and the
    /// decoded capabilities do not intersect, [`IoError::AutonegIncomplete`]
    /// when a blocking backplane negotiation times out.
    pub fn setup_mac_link(&mut self, speed: LinkSpeed, wait_to_complete: bool) -> Result<()> {
        let (capabilities, autoneg) = self.get_link_capabilities();

        let speed = speed & capabilities;
        if speed.is_empty() {
            return Err(ConfigError::InvalidLinkSettings.into());
        }

        let current = self.read_an_ctl();
        let orig = if self.state.snapshot_valid {
            self.state.an_ctl_snapshot
        } else {
            current
        };
        let link_mode = current.link_mode();
        let mut an_ctl = current;

        if link_mode.is_backplane_an() {
            // Rebuild the advertised abilities for the requested set.
            an_ctl = an_ctl
                .with_kx4_support(false)
                .with_kx_support(false)
                .with_kr_support(false);
            if speed.contains(LinkSpeed::G10) {
                if orig.kx4_support() {
                    an_ctl = an_ctl.with_kx4_support(true);
                }
                if orig.kr_support() && !self.state.smart_speed_active {
                    an_ctl = an_ctl.with_kr_support(true);
                }
            }
            if speed.contains(LinkSpeed::G1) {
                an_ctl = an_ctl.with_kx_support(true);
            }
        } else if an_ctl.one_g_lane_sfi()
            && matches!(link_mode, LinkMode::Fixed1G | LinkMode::An1G)
        {
            // Serial lane parked at 1G; move to the 10G lane on request.
            if speed == LinkSpeed::G10 && an_ctl.ten_g_lane_sfi() {
                an_ctl = an_ctl.with_link_mode(LinkMode::Serial10G);
            }
        } else if an_ctl.ten_g_lane_sfi() && link_mode == LinkMode::Serial10G {
            // Serial lane parked at 10G; move back down on request.
            if speed == LinkSpeed::G1 && an_ctl.one_g_lane_sfi() {
                let mode = if autoneg {
                    LinkMode::An1G
                } else {
                    LinkMode::Fixed1G
                };
                an_ctl = an_ctl.with_link_mode(mode);
            }
        }

        if an_ctl == current {
            return Ok(());
        }

        an_ctl = an_ctl.with_speed_sel(speed).with_autoneg(autoneg);
        self.write_an_ctl(an_ctl);

        let mut status = Ok(());
        if wait_to_complete && link_mode.is_backplane_an() {
            let mut links = 0;
            for _ in 0..timing::AUTONEG_POLLS {
                links = self.bus.read32(regs::PORT_STAT);
                if links & portstat::UP != 0 {
                    break;
                }
                self.delay.delay_ms(timing::AUTONEG_POLL_MS);
            }
            if links & portstat::UP == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("auto-negotiation did not complete");

                status = Err(IoError::AutonegIncomplete.into());
            }
        }

        // Early link flaps read as noise, settle before reporting.
        self.delay.delay_ms(timing::PIPELINE_SETTLE_MS);
        status
    }
}

// =============================================================================
// Multispeed Fiber Walk
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Walk the optical rates highest first until one links
    ///
    /// Each attempt drives the module rate pins, waits out the analog
    /// retune, programs the MAC and flaps the laser once per bring-up
    /// so the peer restarts its own detection. The 10 Gb/s attempt gets
    /// five 100 ms checks per clause 73 timing; the 1 Gb/s attempt one.
    /// If both rates fail the walk re-runs once with just the highest
    /// rate attempted, leaving the link in its most capable state for a
    /// late peer.
    ///
    /// # Errors
    /// Propagates MAC setup errors; not linking at any rate is reported
    /// through the link state, not as an error.
    pub fn setup_mac_link_multispeed_fiber(
        &mut self,
        speed: LinkSpeed,
        wait_to_complete: bool,
    ) -> Result<()> {
        let (capabilities, _) = self.get_link_capabilities();
        let speed = speed & capabilities;

        let mut speed_count = 0;
        let mut highest = LinkSpeed::UNKNOWN;
        let mut linked = false;

        if speed.contains(LinkSpeed::G10) {
            speed_count += 1;
            highest = LinkSpeed::G10;

            // QSFP follows the MAC rate on its own, no pins to drive.
            if self.state.media_type == MediaType::Fiber {
                self.set_rate_select_speed(LinkSpeed::G10);
            }
            self.delay.delay_ms(timing::RATE_SELECT_SETTLE_MS);

            self.setup_mac_link(LinkSpeed::G10, wait_to_complete)?;

            self.flap_tx_laser();

            for _ in 0..timing::FIBER_10G_POLLS {
                // Give the link partner time to set its own rate.
                self.delay.delay_ms(timing::LINK_POLL_MS);

                if self.check_link(false).up {
                    linked = true;
                    break;
                }
            }
        }

        if !linked && speed.contains(LinkSpeed::G1) {
            speed_count += 1;
            if highest.is_empty() {
                highest = LinkSpeed::G1;
            }

            if self.state.media_type == MediaType::Fiber {
                self.set_rate_select_speed(LinkSpeed::G1);
            }
            self.delay.delay_ms(timing::RATE_SELECT_SETTLE_MS);

            self.setup_mac_link(LinkSpeed::G1, wait_to_complete)?;

            self.flap_tx_laser();

            self.delay.delay_ms(timing::LINK_POLL_MS);
            linked = self.check_link(false).up;
        }

        let mut status = Ok(());
        if !linked && speed_count > 1 {
            status = self.setup_mac_link_multispeed_fiber(highest, wait_to_complete);
        }

        // Record what this walk ended up advertising.
        self.state.autoneg_advertised = LinkSpeed::UNKNOWN;
        if speed.contains(LinkSpeed::G10) {
            self.state.autoneg_advertised |= LinkSpeed::G10;
        }
        if speed.contains(LinkSpeed::G1) {
            self.state.autoneg_advertised |= LinkSpeed::G1;
        }

        status
    }

    /// Drive the module rate select pins
    fn set_rate_select_speed(&mut self, speed: LinkSpeed) {
        let gpio_data = self.bus.read32(regs::GPIO_DATA);

        let value = match speed {
            LinkSpeed::G10 => gpio_data | gpio::RATE_SEL_MASK,
            LinkSpeed::G1 => gpio_data & !gpio::RATE_SEL_MASK,
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("no module rate pins for {}", speed);

                return;
            }
        };

        self.bus.write32(regs::GPIO_DATA, value);
        self.bus.flush();
    }
}

// =============================================================================
// Laser Control
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Turn the transmit laser off
    ///
    /// No-op while the management firmware holds the PHY.
    pub fn disable_tx_laser(&mut self) {
        if self.reset_blocked() {
            return;
        }

        let gpio_data = self.bus.read32(regs::GPIO_DATA) | gpio::LASER_OFF_MASK;
        self.bus.write32(regs::GPIO_DATA, gpio_data);
        self.bus.flush();

        // 100 us to go dark.
        self.delay.delay_us(timing::LASER_OFF_US);
    }

    /// Turn the transmit laser on
    ///
    /// No-op while the management firmware holds the PHY.
    pub fn enable_tx_laser(&mut self) {
        if self.reset_blocked() {
            return;
        }

        let gpio_data = self.bus.read32(regs::GPIO_DATA) & !gpio::LASER_OFF_MASK;
        self.bus.write32(regs::GPIO_DATA, gpio_data);
        self.bus.flush();

        // Light-up can take 100 ms.
        self.delay.delay_ms(timing::LASER_ON_MS);
    }

    /// Flap the laser once, if a flap is still owed for this bring-up
    ///
    /// The flap makes the link partner restart its speed detection. It
    /// happens at most once per start-of-attempt, re-armed by the next
    /// controller start.
    pub fn flap_tx_laser(&mut self) {
        if self.reset_blocked() {
            return;
        }

        if self.state.autotry_restart {
            self.disable_tx_laser();
            self.enable_tx_laser();
            self.state.autotry_restart = false;
        }
    }

    /// Management firmware owns the PHY right now
    pub(super) fn reset_blocked(&mut self) -> bool {
        let blocked = self.bus.read32(regs::MNG_STAT) & mng::PHY_VETO != 0;

        #[cfg(feature = "defmt")]
        if blocked {
            defmt::debug!("management firmware holds the PHY, skipping laser control");
        }

        blocked
    }
}

// =============================================================================
// Link Start
// =============================================================================

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Restart negotiation with the currently configured abilities
    ///
    /// Runs the negotiation pipeline reset, optionally blocking on a
    /// backplane negotiation result. The PHY claim is held across the
    /// pipeline reset when firmware link management could race it.
    ///
    /// # Errors
    /// [`IoError::AutonegIncomplete`] when a blocking negotiation does
    /// not resolve in time; arbiter errors when the claim is needed and
    /// cannot be taken.
    pub fn start_mac_link(&mut self, wait_to_complete: bool) -> Result<()> {
        let claim_needed = self.lesm_fw_enabled();
        if claim_needed {
            self.arbiter.acquire(FwResource::Phy)?;
        }

        self.reset_pipeline();

        if claim_needed {
            self.arbiter.release(FwResource::Phy);
        }

        let mut status = Ok(());
        if wait_to_complete && self.read_an_ctl().link_mode().is_backplane_an() {
            let mut links = 0;
            for _ in 0..timing::AUTONEG_POLLS {
                links = self.bus.read32(regs::PORT_STAT);
                if links & portstat::UP != 0 {
                    break;
                }
                self.delay.delay_ms(timing::AUTONEG_POLL_MS);
            }
            if links & portstat::UP == 0 {
                #[cfg(feature = "defmt")]
                defmt::warn!("auto-negotiation did not complete");

                status = Err(IoError::AutonegIncomplete.into());
            }
        }

        self.delay.delay_ms(timing::PIPELINE_SETTLE_MS);
        status
    }

    /// Pulse the negotiation state machine through a mode edge
    fn reset_pipeline(&mut self) {
        let mut an_ctl = self.read_an_ctl();

        // Re-enable the link if diagnostics mode left it parked.
        if an_ctl.link_diagnostics() != 0 {
            an_ctl = an_ctl.with_link_diagnostics(0);
        }
        an_ctl = an_ctl.with_an_restart(true);

        // The state machine needs to observe a mode edge; write the
        // toggled word first, then the real one.
        self.write_an_ctl(an_ctl.with_an_mode_toggled());
        self.write_an_ctl(an_ctl);
        self.bus.flush();
    }

    /// Firmware-managed link establishment is configured and active
    ///
    /// The NVM walk matches the firmware layout, but the feature stays
    /// off on this hardware regardless of what the state word reports.
    fn lesm_fw_enabled(&mut self) -> bool {
        let _ = self.lesm_state_configured();
        false
    }

    fn lesm_state_configured(&mut self) -> bool {
        let Ok(fw_ptr) = self.eeprom.read_word(nvm::FW_PTR) else {
            return false;
        };
        if !nvm::ptr_valid(fw_ptr) {
            return false;
        }

        let Ok(params_ptr) = self.eeprom.read_word(fw_ptr + nvm::FW_LESM_PARAMS_PTR) else {
            return false;
        };
        if !nvm::ptr_valid(params_ptr) {
            return false;
        }

        let Ok(state) = self.eeprom.read_word(params_ptr + nvm::FW_LESM_STATE_1) else {
            return false;
        };
        state & nvm::FW_LESM_STATE_ENABLED != 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
