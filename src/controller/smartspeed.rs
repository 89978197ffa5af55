//! SmartSpeed backplane link ladder
//!
//! Some backplane peers never complete a KR negotiation even though both
//! ends advertise it. SmartSpeed works around that: try the full
//! advertisement a few times, and if nothing links, withdraw KR and try
//! once more at the KX/KX4 rates before restoring the full set.
//!
//! The withdrawal is expressed through `smart_speed_active`, which the
//! control word rewrite honors by leaving the KR ability bit clear. The
//! flag stays set while a degraded link stands, so later rewrites do not
//! silently re-advertise KR under the peer.

use super::LinkController;
use crate::error::Result;
use crate::hal::{EepromReader, FwArbiter, PhyStatusBus, RegisterBus};
use crate::regs::epcs::{self, an_adv1};
use crate::regs::timing;
use crate::speed::LinkSpeed;
use embedded_hal::delay::DelayNs;

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus + PhyStatusBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Bring up a backplane link, stepping down from KR if it stalls
    ///
    /// Clause 73 grants a KR attempt up to 500 ms to land, so the full
    /// advertisement gets several bounded waits before KR is withdrawn.
    /// The degraded attempt only runs when the advertisement carried KR
    /// plus at least one KX-family ability; withdrawing KR from a
    /// KR-only advertisement would leave nothing to negotiate.
    ///
    /// Not linking at any rung is reported through the link state, not
    /// as an error.
    ///
    /// # Errors
    /// Propagates control word rewrite errors from any rung.
    pub fn setup_mac_link_smartspeed(
        &mut self,
        speed: LinkSpeed,
        wait_to_complete: bool,
    ) -> Result<()> {
        // The advertisement as the board presents it, before any
        // withdrawal this ladder performs.
        let advertised = self.bus.read_phy_status(epcs::AN_ADV1);

        self.state.autoneg_advertised = LinkSpeed::UNKNOWN;
        if speed.contains(LinkSpeed::G10) {
            self.state.autoneg_advertised |= LinkSpeed::G10;
        }
        if speed.contains(LinkSpeed::G1) {
            self.state.autoneg_advertised |= LinkSpeed::G1;
        }

        let result = self.climb_smartspeed_ladder(advertised, speed, wait_to_complete);

        #[cfg(feature = "defmt")]
        if matches!(result, Ok(true)) && self.state.link.speed == LinkSpeed::G1 {
            defmt::warn!("SmartSpeed downgraded the link below the maximum advertised rate");
        }

        result.map(|_| ())
    }

    /// Runs the ladder itself; `Ok(true)` means the link came up
    fn climb_smartspeed_ladder(
        &mut self,
        advertised: u32,
        speed: LinkSpeed,
        wait_to_complete: bool,
    ) -> Result<bool> {
        self.state.smart_speed_active = false;
        for _ in 0..timing::SMARTSPEED_RETRIES {
            self.setup_mac_link(speed, wait_to_complete)?;

            for _ in 0..timing::SMARTSPEED_STABLE_POLLS {
                self.delay.delay_ms(timing::SMARTSPEED_POLL_MS);

                if self.check_link(false).up {
                    return Ok(true);
                }
            }
        }

        if advertised & an_adv1::KR == 0
            || advertised & (an_adv1::KX | an_adv1::KX4) == 0
        {
            return Ok(false);
        }

        // KR withdrawn; the rewrite drops the ability bit while the
        // flag is set. A link landed here keeps the flag.
        self.state.smart_speed_active = true;
        self.setup_mac_link(speed, wait_to_complete)?;

        for _ in 0..timing::SMARTSPEED_DEGRADED_POLLS {
            self.delay.delay_ms(timing::SMARTSPEED_POLL_MS);

            if self.check_link(false).up {
                return Ok(true);
            }
        }

        // Nothing linked at any rung; restore the full advertisement
        // so a late peer still sees everything the board can do.
        self.state.smart_speed_active = false;
        self.setup_mac_link(speed, wait_to_complete)?;

        Ok(false)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
