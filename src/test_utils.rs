//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the link
//! controller on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use crate::error::{IoError, Result};
use crate::hal::{EepromReader, FwArbiter, FwResource, PhyStatusBus, RegisterBus};
use crate::phy::{MediaType, PhyDriver};
use crate::speed::LinkSpeed;

// =============================================================================
// Mock Register Bus
// =============================================================================

/// Mock register bus for testing the controller without hardware
///
/// Reads come from a per-offset queue when one is armed, otherwise from
/// the backing map (default 0). Writes land in the map and in an ordered
/// log, so tests can assert both the final register value and the exact
/// write sequence. PHY status registers live in their own map.
///
/// # Example
///
/// ```ignore
/// let mut bus = MockBus::new();
/// bus.preload(regs::PORT_STAT, portstat::UP | portstat::BW_10G);
///
/// assert_eq!(bus.read32(regs::PORT_STAT), portstat::UP | portstat::BW_10G);
/// assert_eq!(bus.reads_of(regs::PORT_STAT), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    /// Register values: offset -> value
    regs: RefCell<HashMap<u32, u32>>,
    /// Armed read sequences: offset -> pending values
    read_queues: RefCell<HashMap<u32, VecDeque<u32>>>,
    /// Reads per offset
    read_counts: RefCell<HashMap<u32, usize>>,
    /// Record of writes: (offset, value)
    write_log: RefCell<Vec<(u32, u32)>>,
    /// PHY status register values: register -> value
    phy_regs: RefCell<HashMap<u32, u32>>,
}

impl MockBus {
    /// Create a new mock bus with every register reading 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a register with a starting value
    pub fn preload(&self, offset: u32, value: u32) {
        self.regs.borrow_mut().insert(offset, value);
    }

    /// Seed a PHY status register with a starting value
    pub fn preload_phy(&self, reg: u32, value: u32) {
        self.phy_regs.borrow_mut().insert(reg, value);
    }

    /// Arm a sequence of read results for one offset
    ///
    /// Queued values win over the map and are consumed in order; the map
    /// takes over once the queue runs dry. Read-modify-write accesses
    /// consume from the queue like any other read.
    pub fn queue_reads(&self, offset: u32, values: &[u32]) {
        self.read_queues
            .borrow_mut()
            .entry(offset)
            .or_default()
            .extend(values.iter().copied());
    }

    /// Get the current value of a register (for test verification)
    pub fn get(&self, offset: u32) -> u32 {
        self.regs.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// Number of reads of one offset so far
    pub fn reads_of(&self, offset: u32) -> usize {
        self.read_counts.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// Total number of writes to any offset
    pub fn write_count(&self) -> usize {
        self.write_log.borrow().len()
    }

    /// Every value written to one offset, in order
    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        self.write_log
            .borrow()
            .iter()
            .filter(|&&(o, _)| o == offset)
            .map(|&(_, value)| value)
            .collect()
    }
}

impl RegisterBus for MockBus {
    fn read32(&mut self, offset: u32) -> u32 {
        *self.read_counts.borrow_mut().entry(offset).or_insert(0) += 1;

        if let Some(queue) = self.read_queues.borrow_mut().get_mut(&offset) {
            if let Some(value) = queue.pop_front() {
                return value;
            }
        }
        self.get(offset)
    }

    fn write32(&mut self, offset: u32, value: u32) {
        self.write_log.borrow_mut().push((offset, value));
        self.regs.borrow_mut().insert(offset, value);
    }

    // The default flush reads the port status register; doing that here
    // would disturb queued link polls.
    fn flush(&mut self) {}
}

impl PhyStatusBus for MockBus {
    fn read_phy_status(&mut self, reg: u32) -> u32 {
        self.phy_regs.borrow().get(&reg).copied().unwrap_or(0)
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        *self.total_ns.borrow() / 1_000
    }

    /// Get total milliseconds that were "delayed"
    pub fn total_ms(&self) -> u64 {
        *self.total_ns.borrow() / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock Firmware Arbiter
// =============================================================================

/// One recorded arbiter interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterEvent {
    /// A claim was taken
    Acquire(FwResource),
    /// A claim was returned
    Release(FwResource),
}

/// Mock firmware arbiter recording claim traffic
///
/// Acquires succeed unless `deny` is armed; every interaction lands in
/// an ordered log so tests can assert claim/release pairing.
#[derive(Debug, Default)]
pub struct MockArbiter {
    /// Record of claims and releases, in order
    log: RefCell<Vec<ArbiterEvent>>,
    /// Error handed out on every acquire while set
    pub deny: Option<crate::error::Error>,
}

impl MockArbiter {
    /// Create a new mock arbiter with nothing claimed
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything acquired and released so far, in order
    pub fn events(&self) -> Vec<ArbiterEvent> {
        self.log.borrow().clone()
    }
}

impl FwArbiter for MockArbiter {
    fn acquire(&mut self, resource: FwResource) -> Result<()> {
        if let Some(err) = self.deny {
            return Err(err);
        }
        self.log.borrow_mut().push(ArbiterEvent::Acquire(resource));
        Ok(())
    }

    fn release(&mut self, resource: FwResource) {
        self.log.borrow_mut().push(ArbiterEvent::Release(resource));
    }
}

// =============================================================================
// Mock EEPROM
// =============================================================================

/// Mock NVM exposing a sparse word map
///
/// Missing words read back erased (`0xFFFF`) the way a blank part does;
/// `fail` turns every read into an error.
#[derive(Debug, Default)]
pub struct MockEeprom {
    /// Word values: offset -> value
    words: RefCell<HashMap<u16, u16>>,
    /// Total words read
    read_count: RefCell<usize>,
    /// Fail every read while set
    pub fail: bool,
}

impl MockEeprom {
    /// Create a new mock NVM with every word erased
    pub fn new() -> Self {
        Self::default()
    }

    /// Program one word
    pub fn set_word(&self, offset: u16, value: u16) {
        self.words.borrow_mut().insert(offset, value);
    }

    /// Number of words read so far
    pub fn read_count(&self) -> usize {
        *self.read_count.borrow()
    }
}

impl EepromReader for MockEeprom {
    fn read_word(&mut self, offset: u16) -> Result<u16> {
        *self.read_count.borrow_mut() += 1;
        if self.fail {
            return Err(IoError::NotReady.into());
        }
        Ok(self.words.borrow().get(&offset).copied().unwrap_or(0xFFFF))
    }
}

// =============================================================================
// Mock PHY Driver
// =============================================================================

/// Scriptable PHY driver double
///
/// Call outcomes are plain public fields; call records accumulate per
/// method so sequencing tests can assert what the controller asked for.
///
/// # Example
///
/// ```ignore
/// let mut phy = MockPhy::new(MediaType::Fiber);
/// phy.identify_result = Err(SfpError::NotPresent.into());
/// phy.multispeed = true;
/// ```
#[derive(Debug)]
pub struct MockPhy {
    /// Media reported to the controller
    pub media: MediaType,
    /// Module walks multiple optical rates
    pub multispeed: bool,
    /// A 1 Gb/s-only module is seated
    pub one_g: bool,
    /// Module setup must run during the next reset
    pub setup_needed: bool,
    /// Outcome of every identify call
    pub identify_result: Result<()>,
    /// Outcome of every PHY reset call
    pub reset_result: Result<()>,
    /// PHY reset calls so far
    reset_count: usize,
    /// Record of speed setups: (speed, wait)
    setup_speed_log: Vec<(LinkSpeed, bool)>,
}

impl MockPhy {
    /// Create a new mock PHY reporting the given media
    pub fn new(media: MediaType) -> Self {
        Self {
            media,
            multispeed: false,
            one_g: false,
            setup_needed: false,
            identify_result: Ok(()),
            reset_result: Ok(()),
            reset_count: 0,
            setup_speed_log: Vec::new(),
        }
    }

    /// Number of PHY reset calls so far
    pub fn reset_calls(&self) -> usize {
        self.reset_count
    }

    /// Every `(speed, wait)` pair handed to the PHY speed setup, in order
    pub fn setup_speed_calls(&self) -> &[(LinkSpeed, bool)] {
        &self.setup_speed_log
    }
}

impl PhyDriver for MockPhy {
    fn identify<B: RegisterBus>(&mut self, _bus: &mut B) -> Result<()> {
        self.identify_result
    }

    fn reset<B: RegisterBus>(&mut self, _bus: &mut B) -> Result<()> {
        self.reset_count += 1;
        self.reset_result
    }

    fn setup_link_speed<B: RegisterBus>(
        &mut self,
        _bus: &mut B,
        speed: LinkSpeed,
        wait: bool,
    ) -> Result<()> {
        self.setup_speed_log.push((speed, wait));
        Ok(())
    }

    fn media_type(&self) -> MediaType {
        self.media
    }

    fn multispeed_fiber(&self) -> bool {
        self.multispeed
    }

    fn one_g_module(&self) -> bool {
        self.one_g
    }

    fn sfp_setup_needed(&self) -> bool {
        self.setup_needed
    }

    fn clear_sfp_setup_needed(&mut self) {
        self.setup_needed = false;
    }
}

// =============================================================================
// Self Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_bus_queue_wins_over_map() {
        let mut bus = MockBus::new();
        bus.preload(regs::PORT_STAT, 0x11);
        bus.queue_reads(regs::PORT_STAT, &[0x22, 0x33]);

        assert_eq!(bus.read32(regs::PORT_STAT), 0x22);
        assert_eq!(bus.read32(regs::PORT_STAT), 0x33);
        // Queue dry: the map takes over.
        assert_eq!(bus.read32(regs::PORT_STAT), 0x11);
        assert_eq!(bus.reads_of(regs::PORT_STAT), 3);
    }

    #[test]
    fn mock_bus_masked_write_reads_then_merges() {
        let mut bus = MockBus::new();
        bus.preload(regs::RST_STAT, 0xF0F0);

        bus.write32_masked(regs::RST_STAT, 0x00FF, 0x000A);

        assert_eq!(bus.get(regs::RST_STAT), 0xF00A);
        assert_eq!(bus.reads_of(regs::RST_STAT), 1);
        assert_eq!(bus.write_count(), 1);
    }

    #[test]
    fn mock_delay_accumulates_every_granularity() {
        let mut delay = MockDelay::new();

        delay.delay_ms(2);
        delay.delay_us(500);

        assert_eq!(delay.total_us(), 2_500);
        assert_eq!(delay.total_ms(), 2);
    }

    #[test]
    fn mock_eeprom_reads_erased_words() {
        let mut eeprom = MockEeprom::new();
        eeprom.set_word(0x10, 0xABCD);

        assert_eq!(eeprom.read_word(0x10), Ok(0xABCD));
        assert_eq!(eeprom.read_word(0x11), Ok(0xFFFF));
        assert_eq!(eeprom.read_count(), 2);
    }

    #[test]
    fn mock_arbiter_logs_claim_traffic() {
        let mut arbiter = MockArbiter::new();

        assert!(arbiter.acquire(FwResource::Flash).is_ok());
        arbiter.release(FwResource::Flash);

        assert_eq!(
            arbiter.events(),
            &[
                ArbiterEvent::Acquire(FwResource::Flash),
                ArbiterEvent::Release(FwResource::Flash)
            ]
        );
    }
}
