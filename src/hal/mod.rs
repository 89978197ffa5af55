//! Hardware Abstraction Layer
//!
//! The seams between the sequencing logic and the platform: register
//! access, firmware arbitration and NVM word reads. The controller is
//! generic over all three, so the same bring-up code drives real silicon
//! or the in-crate mocks.
//!
//! # Modules
//!
//! - [`bus`]: Register access traits for the control and PCS status spaces
//! - [`arbiter`]: Software/firmware semaphore trait and hardware impl
//! - [`eeprom`]: NVM word reader trait and the pointer map
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs`
//! directly. Pass any delay implementation from your HAL.

pub mod arbiter;
pub mod bus;
pub mod eeprom;

// Re-export commonly used types
pub use arbiter::{FwArbiter, FwResource, SemArbiter};
pub use bus::{PhyStatusBus, RegisterBus};
pub use eeprom::EepromReader;
