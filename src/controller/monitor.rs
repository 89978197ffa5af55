//! Link status monitoring and the on-die thermal sensor
//!
//! Link state comes from the port status register: an up bit and an
//! established-bandwidth field. On boards flagged for the crosstalk
//! erratum an empty module cage can read as a phantom link, so the cage
//! presence GPIO is checked first and an empty cage short-circuits the
//! whole readout.

use super::LinkController;
use crate::error::{ConfigError, Result};
use crate::hal::{EepromReader, FwArbiter, RegisterBus};
use crate::regs::{self, gpio, portstat, timing, ts};
use crate::speed::{LinkSpeed, LinkStatus};
use embedded_hal::delay::DelayNs;

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    // =========================================================================
    // Link Status
    // =========================================================================

    /// Read the current link state
    ///
    /// The port status register is read twice so a change between the
    /// two reads shows up in the logs. With `wait_to_complete` the read
    /// repeats in 100 ms steps up to the configured poll budget until
    /// the up bit is seen.
    ///
    /// On crosstalk-afflicted boards with optical media an empty cage
    /// reports down/unknown without touching the port status register.
    pub fn check_link(&mut self, wait_to_complete: bool) -> LinkStatus {
        if self.need_crosstalk_fix() {
            let cage_full = self.bus.read32(regs::GPIO_DATA) & gpio::MOD_ABSENT == 0;
            if !cage_full {
                #[cfg(feature = "defmt")]
                defmt::debug!("module cage empty, reporting link down");
                self.state.link = LinkStatus::down();
                return self.state.link;
            }
        }

        let links_orig = self.bus.read32(regs::PORT_STAT);
        let mut links = self.bus.read32(regs::PORT_STAT);

        if links_orig != links {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "port status changed from {:#010x} to {:#010x}",
                links_orig,
                links
            );
        }

        let mut up = false;
        if wait_to_complete {
            for _ in 0..self.config.link_poll_budget {
                if links & portstat::UP != 0 {
                    up = true;
                    break;
                }
                self.delay.delay_ms(timing::LINK_POLL_MS);
                links = self.bus.read32(regs::PORT_STAT);
            }
        } else {
            up = links & portstat::UP != 0;
        }

        let speed = match links & portstat::BW_MASK {
            portstat::BW_10G => LinkSpeed::G10,
            portstat::BW_1G => LinkSpeed::G1,
            portstat::BW_100M => LinkSpeed::M100,
            _ => LinkSpeed::UNKNOWN,
        };

        self.state.link = LinkStatus { up, speed };
        self.state.link
    }

    /// Crosstalk erratum gating applies to this port right now
    fn need_crosstalk_fix(&self) -> bool {
        self.state.need_crosstalk_fix && self.state.media_type.is_fiber()
    }

    // =========================================================================
    // Thermal Sensor
    // =========================================================================

    /// Read the die temperature in degrees Celsius
    ///
    /// The sensor is wired to physical port 0 only.
    ///
    /// # Errors
    /// Returns [`ConfigError::NotSupported`] on any other port.
    pub fn thermal_sensor_celsius(&mut self) -> Result<i16> {
        if self.state.lan_id != 0 {
            return Err(ConfigError::NotSupported.into());
        }

        let ts_stat = self.bus.read32(regs::TS_STAT);
        let mut tsv = i64::from(ts_stat & ts::DATA_MASK);
        tsv = tsv.min(1200);

        // Quartic calibration polynomial in 24.8 fixed point.
        tsv = -(48380 << 8) / 1000
            + tsv * (31020 << 8) / 100_000
            - tsv * tsv * (18201 << 8) / 100_000_000
            + tsv * tsv * tsv * (81542 << 8) / 1_000_000_000_000
            - tsv * tsv * tsv * tsv * (16743 << 8) / 1_000_000_000_000_000;
        tsv >>= 8;

        Ok(tsv as i16)
    }

    /// Arm the thermal alarm and power-down thresholds
    ///
    /// Selects evaluation mode, enables both thermal interrupts and the
    /// sensor itself, then programs the 100 °C alarm and 90 °C
    /// power-down threshold codes. Port 0 only.
    ///
    /// # Errors
    /// Returns [`ConfigError::NotSupported`] on any other port.
    pub fn init_thermal_thresholds(&mut self) -> Result<()> {
        if self.state.lan_id != 0 {
            return Err(ConfigError::NotSupported.into());
        }

        self.bus.write32(regs::TS_CTL, ts::EVAL_MODE);
        self.bus.write32(regs::TS_INT, ts::ALARM_EN | ts::PDOWN_EN);
        self.bus.write32(regs::TS_EN, ts::ENA);

        self.bus.write32(regs::TS_ALARM, ts::ALARM_100C);
        self.bus.write32(regs::TS_PDOWN, ts::PDOWN_90C);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
