//! Software/firmware register arbitration
//!
//! Management firmware and the driver share a handful of register groups
//! (PHY access, common CSRs, the flash interface). A semaphore register
//! with one claim bit per side and per group keeps them out of each
//! other's sequences. [`FwArbiter`] is the seam the controller calls;
//! [`SemArbiter`] is the hardware implementation over that register.
//!
//! The semaphore is process-wide per adapter, not per port: both LAN
//! ports of a two-port device share one claim domain, so holders must
//! release on every exit path.

use embedded_hal::delay::DelayNs;

use crate::error::{IoError, Result};
use crate::hal::bus::RegisterBus;
use crate::regs::{self, fw_sem, timing};

// =============================================================================
// Resource Identifiers
// =============================================================================

/// Register group protected by the software/firmware semaphore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FwResource {
    /// PHY register access
    Phy,
    /// Shared control/status registers
    MacCsr,
    /// Flash interface
    Flash,
}

impl FwResource {
    /// Driver-side claim bit in the semaphore register
    #[must_use]
    pub const fn sw_bit(self) -> u32 {
        match self {
            FwResource::Phy => fw_sem::SW_PHY,
            FwResource::MacCsr => fw_sem::SW_MAC_CSR,
            FwResource::Flash => fw_sem::SW_FLASH,
        }
    }

    /// Firmware-side claim bit in the semaphore register
    #[must_use]
    pub const fn fw_bit(self) -> u32 {
        self.sw_bit() << 16
    }
}

// =============================================================================
// Arbiter Trait
// =============================================================================

/// Mutual exclusion against management firmware
///
/// `acquire` is bounded by the implementation's own budget and never
/// blocks indefinitely. Callers pair every successful `acquire` with a
/// `release` on all exit paths, error paths included.
pub trait FwArbiter {
    /// Claims a register group, blocking up to the implementation budget
    fn acquire(&mut self, res: FwResource) -> Result<()>;

    /// Returns a previously claimed register group
    fn release(&mut self, res: FwResource);
}

// =============================================================================
// Semaphore Register Implementation
// =============================================================================

/// [`FwArbiter`] over the hardware semaphore register
///
/// Acquisition retries on a fixed backoff schedule. If the budget expires
/// with the firmware claim still set, the claim is assumed wedged (a
/// firmware crash mid-sequence leaves it stuck) and is forcibly cleared;
/// only a firmware that immediately re-claims produces an error.
#[derive(Debug)]
pub struct SemArbiter<B: RegisterBus, D: DelayNs> {
    bus: B,
    delay: D,
}

impl<B: RegisterBus, D: DelayNs> SemArbiter<B, D> {
    /// Creates an arbiter over the given register bus
    pub fn new(bus: B, delay: D) -> Self {
        Self { bus, delay }
    }
}

impl<B: RegisterBus, D: DelayNs> FwArbiter for SemArbiter<B, D> {
    fn acquire(&mut self, res: FwResource) -> Result<()> {
        let sw = res.sw_bit();
        let fw = res.fw_bit();

        for _ in 0..timing::SEM_ACQUIRE_TRIES {
            let sem = self.bus.read32(regs::FW_SEM);
            if sem & (sw | fw) == 0 {
                self.bus.write32(regs::FW_SEM, sem | sw);
                self.bus.flush();
                if self.bus.read32(regs::FW_SEM) & fw == 0 {
                    return Ok(());
                }
                // firmware claimed in the same window; withdraw and retry
                self.bus.write32_masked(regs::FW_SEM, sw, 0);
            }
            self.delay.delay_us(timing::SEM_RETRY_DELAY_US);
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("semaphore budget expired, taking over {}", res);

        self.bus.write32_masked(regs::FW_SEM, sw | fw, sw);
        self.bus.flush();
        if self.bus.read32(regs::FW_SEM) & fw == 0 {
            Ok(())
        } else {
            Err(IoError::SemaphoreTimeout.into())
        }
    }

    fn release(&mut self, res: FwResource) {
        self.bus.write32_masked(regs::FW_SEM, res.sw_bit(), 0);
        self.bus.flush();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::error::Error;
    use crate::test_utils::{MockBus, MockDelay};

    fn arbiter() -> SemArbiter<MockBus, MockDelay> {
        SemArbiter::new(MockBus::new(), MockDelay::new())
    }

    // =========================================================================
    // Resource Bit Mapping Tests
    // =========================================================================

    #[test]
    fn resource_bits() {
        assert_eq!(FwResource::Phy.sw_bit(), fw_sem::SW_PHY);
        assert_eq!(FwResource::MacCsr.sw_bit(), fw_sem::SW_MAC_CSR);
        assert_eq!(FwResource::Flash.sw_bit(), fw_sem::SW_FLASH);

        assert_eq!(FwResource::Phy.fw_bit(), fw_sem::FW_PHY);
        assert_eq!(FwResource::MacCsr.fw_bit(), fw_sem::FW_MAC_CSR);
        assert_eq!(FwResource::Flash.fw_bit(), fw_sem::FW_FLASH);
    }

    // =========================================================================
    // Acquisition Tests
    // =========================================================================

    #[test]
    fn acquire_free_semaphore_sets_claim() {
        let mut arb = arbiter();

        arb.acquire(FwResource::Phy).unwrap();

        assert_eq!(arb.bus.get(regs::FW_SEM), fw_sem::SW_PHY);
        assert_eq!(arb.delay.total_us(), 0);
    }

    #[test]
    fn release_clears_only_own_claim() {
        let mut arb = arbiter();
        arb.bus
            .preload(regs::FW_SEM, fw_sem::SW_PHY | fw_sem::SW_FLASH);

        arb.release(FwResource::Phy);

        assert_eq!(arb.bus.get(regs::FW_SEM), fw_sem::SW_FLASH);
    }

    #[test]
    fn acquire_waits_out_firmware_claim() {
        let mut arb = arbiter();
        // busy for three polls, free afterwards
        arb.bus.queue_reads(
            regs::FW_SEM,
            &[fw_sem::FW_PHY, fw_sem::FW_PHY, fw_sem::FW_PHY],
        );

        arb.acquire(FwResource::Phy).unwrap();

        assert_eq!(arb.bus.get(regs::FW_SEM), fw_sem::SW_PHY);
        assert_eq!(
            arb.delay.total_us(),
            3 * u64::from(timing::SEM_RETRY_DELAY_US)
        );
    }

    #[test]
    fn lost_claim_race_retries_and_wins() {
        let mut arb = arbiter();
        // free, then the verify read shows a simultaneous firmware claim,
        // the withdrawal read sees the same, and the next poll is free
        arb.bus.queue_reads(
            regs::FW_SEM,
            &[
                0,
                fw_sem::FW_PHY | fw_sem::SW_PHY,
                fw_sem::FW_PHY | fw_sem::SW_PHY,
                0,
            ],
        );

        arb.acquire(FwResource::Phy).unwrap();

        assert_eq!(arb.bus.get(regs::FW_SEM), fw_sem::SW_PHY);
        assert_eq!(arb.delay.total_us(), u64::from(timing::SEM_RETRY_DELAY_US));
    }

    #[test]
    fn wedged_firmware_claim_is_taken_over() {
        let mut arb = arbiter();
        arb.bus.preload(regs::FW_SEM, fw_sem::FW_PHY);

        arb.acquire(FwResource::Phy).unwrap();

        let sem = arb.bus.get(regs::FW_SEM);
        assert_eq!(sem & fw_sem::FW_PHY, 0);
        assert_eq!(sem & fw_sem::SW_PHY, fw_sem::SW_PHY);
        assert_eq!(
            arb.delay.total_us(),
            u64::from(timing::SEM_ACQUIRE_TRIES) * u64::from(timing::SEM_RETRY_DELAY_US)
        );
    }

    #[test]
    fn immediate_reclaim_after_takeover_errors() {
        let mut arb = arbiter();
        // every read, takeover verify included, shows the firmware claim
        let script = std::vec![fw_sem::FW_PHY; (timing::SEM_ACQUIRE_TRIES + 2) as usize];
        arb.bus.queue_reads(regs::FW_SEM, &script);

        let err = arb.acquire(FwResource::Phy).unwrap_err();
        assert_eq!(err, Error::Io(IoError::SemaphoreTimeout));
    }

    #[test]
    fn claims_for_different_resources_do_not_collide() {
        let mut arb = arbiter();
        arb.bus.preload(regs::FW_SEM, fw_sem::SW_FLASH);

        // flash claim belongs to another holder; PHY group is free
        arb.acquire(FwResource::Phy).unwrap();

        let sem = arb.bus.get(regs::FW_SEM);
        assert_eq!(sem, fw_sem::SW_FLASH | fw_sem::SW_PHY);
    }
}
