//! Link controller core
//!
//! This module contains the controller that sequences a port from reset
//! to negotiated operation:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`state`] - Persistent controller state and the setup strategy
//!
//! The controller methods themselves are grouped by concern: reset and
//! bring-up sequencing, link negotiation, the SmartSpeed retry ladder,
//! link monitoring, and receive address management. All of them hang off
//! [`LinkController`].
//!
//! # Example
//!
//! ```ignore
//! use xge_link::{LinkConfig, LinkController, LinkSpeed};
//!
//! let config = LinkConfig::new().with_wait_for_autoneg(true);
//! let mut ctl = LinkController::new(bus, arbiter, eeprom, delay, config);
//!
//! ctl.init(&mut phy)?;
//! ctl.setup_link(&mut phy, LinkSpeed::G10 | LinkSpeed::G1)?;
//! ```

// Submodules
pub mod config;
pub mod state;

mod addr_filter;
mod monitor;
mod negotiate;
mod reset;
mod smartspeed;

// Re-exports for convenience
pub use config::{LinkConfig, SmartSpeedMode};
pub use state::{AdapterState, AddrFilterState, SetupStrategy};

use crate::hal::{EepromReader, FwArbiter, RegisterBus};
use crate::speed::LinkStatus;
use embedded_hal::delay::DelayNs;

// =============================================================================
// Link Controller
// =============================================================================

/// Multi-rate link establishment and recovery controller
///
/// Owns the register bus, the firmware arbiter, the NVM reader and a
/// delay provider; the PHY driver is borrowed per call so several ports
/// can share one driver implementation.
///
/// # Type Parameters
/// * `B` - Register bus, usually memory-mapped I/O
/// * `A` - Software/firmware semaphore arbiter
/// * `E` - NVM word reader
/// * `D` - Delay provider implementing `embedded_hal::delay::DelayNs`
///
/// # Example
/// ```ignore
/// let mut ctl = LinkController::new(bus, arbiter, eeprom, delay, LinkConfig::new());
///
/// ctl.init(&mut phy)?;
/// let report = ctl.check_link(false);
/// ```
pub struct LinkController<B, A, E, D> {
    /// Register bus
    bus: B,
    /// Firmware semaphore arbiter
    arbiter: A,
    /// NVM word reader
    eeprom: E,
    /// Delay provider
    delay: D,
    /// User configuration, fixed at construction
    config: LinkConfig,
    /// Reset and negotiation state
    state: AdapterState,
    /// Receive address filter shadow
    filter: AddrFilterState,
}

impl<B, A, E, D> LinkController<B, A, E, D>
where
    B: RegisterBus,
    A: FwArbiter,
    E: EepromReader,
    D: DelayNs,
{
    /// Create a new controller over the given hardware seams
    ///
    /// The controller starts in the stopped state with nothing cached;
    /// call [`init`](Self::init) to bring the port up.
    pub const fn new(bus: B, arbiter: A, eeprom: E, delay: D, config: LinkConfig) -> Self {
        Self {
            bus,
            arbiter,
            eeprom,
            delay,
            config,
            state: AdapterState::new(),
            filter: AddrFilterState::new(),
        }
    }

    /// Get the active configuration
    #[inline(always)]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Get the persistent controller state
    #[inline(always)]
    pub fn adapter_state(&self) -> &AdapterState {
        &self.state
    }

    /// Get the last observed link state
    #[inline(always)]
    pub fn link(&self) -> LinkStatus {
        self.state.link
    }

    /// Get the port index
    #[inline(always)]
    pub fn lan_id(&self) -> u32 {
        self.state.lan_id
    }

    /// Get the active station address
    #[inline(always)]
    pub fn mac_address(&self) -> &[u8; 6] {
        &self.state.addr
    }

    /// Get the storage-network address, `0xFF`-filled when absent
    #[inline(always)]
    pub fn san_mac_address(&self) -> &[u8; 6] {
        &self.state.san_addr
    }

    /// Get the resolved link setup strategy
    #[inline(always)]
    pub fn strategy(&self) -> SetupStrategy {
        self.state.strategy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phy::MediaType;
    use crate::test_utils::{MockArbiter, MockBus, MockDelay, MockEeprom};

    fn controller() -> LinkController<MockBus, MockArbiter, MockEeprom, MockDelay> {
        LinkController::new(
            MockBus::new(),
            MockArbiter::new(),
            MockEeprom::new(),
            MockDelay::new(),
            LinkConfig::new(),
        )
    }

    #[test]
    fn new_controller_is_stopped_and_unresolved() {
        let ctl = controller();

        assert!(ctl.adapter_state().adapter_stopped);
        assert_eq!(ctl.adapter_state().media_type, MediaType::Unknown);
        assert_eq!(ctl.strategy(), SetupStrategy::Direct);
        assert!(!ctl.link().up);
        assert_eq!(ctl.lan_id(), 0);
        assert_eq!(ctl.mac_address(), &[0; 6]);
        assert_eq!(ctl.san_mac_address(), &[0xFF; 6]);
    }

    #[test]
    fn config_is_stored_verbatim() {
        let config = LinkConfig::new()
            .with_mc_filter_type(2)
            .with_promiscuous(true);
        let ctl = LinkController::new(
            MockBus::new(),
            MockArbiter::new(),
            MockEeprom::new(),
            MockDelay::new(),
            config,
        );

        assert_eq!(ctl.config().mc_filter_type, 2);
        assert!(ctl.config().promiscuous);
    }
}
