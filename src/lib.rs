//! Multi-Rate Ethernet Link Controller
//!
//! A `no_std`, `no_alloc` Rust implementation of link establishment and
//! recovery for 10G-class Ethernet MAC ports.
//!
//! This crate sequences a port from power-on reset to a negotiated link:
//! MAC and firmware-mediated resets, SFP/QSFP module provisioning,
//! receive address programming, backplane ability negotiation, and the
//! retry ladders (multispeed fiber walk-down, SmartSpeed) that recover a
//! link when the first attempt stalls.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **Controller Layer** ([`controller`]): [`LinkController`] owns the
//!    bring-up, reset, negotiation and monitoring sequences plus the
//!    adapter state they maintain
//! 2. **PHY Layer** ([`phy`]): the [`PhyDriver`] seam for
//!    transceiver-specific identify/reset/speed-select operations
//! 3. **HAL Layer** ([`hal`]): register access ([`RegisterBus`],
//!    [`PhyStatusBus`]), firmware arbitration ([`FwArbiter`]) and NVM
//!    word reads ([`EepromReader`])
//!
//! The [`an_ctl`] and [`speed`] modules hold the negotiation control
//! word and the speed/status vocabulary shared by every layer, and
//! [`regs`] holds register offsets, field masks and timing constants.
//!
//! All delays go through `embedded_hal::delay::DelayNs`, so any HAL's
//! delay implementation plugs in directly.
//!
//! # Features
//!
//! - `defmt`: derive `defmt::Format` on public types and emit trace
//!   points from the long-running sequences
//!
//! # Example
//!
//! ```ignore
//! use xge_link::{LinkConfig, LinkController, LinkSpeed};
//!
//! // bus, arbiter, eeprom, delay and phy come from your platform.
//! let mut ctl = LinkController::new(bus, arbiter, eeprom, delay, LinkConfig::new());
//!
//! // Reset the port and resolve the setup strategy from the module.
//! ctl.init(&mut phy)?;
//!
//! // Negotiate the best rate the module and partner both support.
//! ctl.setup_link(&mut phy, LinkSpeed::G10 | LinkSpeed::G1)?;
//!
//! let link = ctl.check_link(false);
//! if link.up {
//!     // pass frames
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod an_ctl;
pub mod controller;
pub mod error;
pub mod hal;
pub mod phy;
pub mod regs;
pub mod speed;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use an_ctl::{AnCtl, LinkMode};
pub use controller::{
    AdapterState, AddrFilterState, LinkConfig, LinkController, SetupStrategy, SmartSpeedMode,
};
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result, SfpError, SfpResult};
pub use hal::{EepromReader, FwArbiter, FwResource, PhyStatusBus, RegisterBus, SemArbiter};
pub use phy::{MediaType, PhyDriver};
pub use speed::{LinkSpeed, LinkStatus};
