//! Register access traits
//!
//! The controller never touches memory-mapped registers directly; it calls
//! through [`RegisterBus`] so the same sequencing code runs against real
//! hardware or a test backing store. [`PhyStatusBus`] is the second,
//! narrower window into the PCS/autoneg status space, which sits behind an
//! indirect access port on real silicon.
//!
//! Register transport is infallible: a mapped device either responds or
//! the platform has bigger problems than this driver can report.

/// Raw access to the adapter's control/status register space
pub trait RegisterBus {
    /// Reads a 32-bit register
    fn read32(&mut self, offset: u32) -> u32;

    /// Writes a 32-bit register
    fn write32(&mut self, offset: u32, value: u32);

    /// Read-modify-write of the bits selected by `mask`
    ///
    /// Implementations with a native masked-write port may override this.
    fn write32_masked(&mut self, offset: u32, mask: u32, value: u32) {
        let current = self.read32(offset);
        self.write32(offset, (current & !mask) | (value & mask));
    }

    /// Drains posted writes before a timing-sensitive step
    ///
    /// The default reads the port status register and discards the value,
    /// which is sufficient on PCIe-attached parts.
    fn flush(&mut self) {
        let _ = self.read32(crate::regs::PORT_STAT);
    }
}

/// Read access to the PCS/autoneg status register space
pub trait PhyStatusBus {
    /// Reads a status-space register by its register number
    fn read_phy_status(&mut self, reg: u32) -> u32;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Two-register store exercising the default methods.
    struct TinyBus {
        regs: [u32; 2],
        reads: u32,
    }

    impl RegisterBus for TinyBus {
        fn read32(&mut self, offset: u32) -> u32 {
            self.reads += 1;
            if offset == crate::regs::PORT_STAT {
                0
            } else {
                self.regs[(offset & 1) as usize]
            }
        }

        fn write32(&mut self, offset: u32, value: u32) {
            self.regs[(offset & 1) as usize] = value;
        }
    }

    #[test]
    fn masked_write_touches_only_selected_bits() {
        let mut bus = TinyBus {
            regs: [0xFFFF_0000, 0],
            reads: 0,
        };

        bus.write32_masked(0, 0x0000_00FF, 0x0000_00AB);
        assert_eq!(bus.regs[0], 0xFFFF_00AB);

        bus.write32_masked(0, 0xFF00_0000, 0);
        assert_eq!(bus.regs[0], 0x00FF_00AB);
    }

    #[test]
    fn masked_write_drops_value_bits_outside_mask() {
        let mut bus = TinyBus {
            regs: [0, 0],
            reads: 0,
        };

        bus.write32_masked(1, 0x0F, 0xFF);
        assert_eq!(bus.regs[1], 0x0F);
    }

    #[test]
    fn default_flush_reads_port_status() {
        let mut bus = TinyBus {
            regs: [0, 0],
            reads: 0,
        };

        bus.flush();
        assert_eq!(bus.reads, 1);
    }
}
