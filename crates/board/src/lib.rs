//! Board support for the bring-up reference targets.
//!
//! Each board module bundles what its schematic fixes: clock plans, memory
//! descriptors, MPU maps and pin sets, plus a `bring_up` entry that
//! validates the descriptors and drives the matching controller trait. The
//! descriptors are plain data from the `clocks`, `extmem`, `norflash` and
//! `pinmux` crates, so everything a board ships is audited by host tests;
//! only the [`hardware`] module touches registers.
//!
//! # Boards
//!
//! - [`blackpill_f411ce`]: WeAct BlackPill, clock cascade with USB variants.
//! - [`disco_f429zi`]: 32F429IDISCOVERY, FMC SDRAM plus one MPU region.
//! - [`disco_f723ie`]: 32F723EDISCOVERY, FMC PSRAM behind a deny-by-default
//!   MPU map.
//! - [`b_u585i_iot02a`]: B-U585I-IOT02A, octal-SPI PSRAM with delay-block
//!   calibration.
//! - [`mimxrt1020_evk`]: MIMXRT1020-EVK, FlexSPI boot flash and the console
//!   pad routing.

#![cfg_attr(not(test), no_std)]
// ─── Lint policy ────────────────────────────────────────────────────────────
// Board init runs before anything that could report a panic, so the same
// rule as the library crates applies: no unwrap/expect/panic outside tests.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory

pub mod b_u585i_iot02a;
pub mod blackpill_f411ce;
pub mod disco_f429zi;
pub mod disco_f723ie;
pub mod error;
pub mod mimxrt1020_evk;
pub mod pins;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use error::BoardInitError;
pub use pins::{GpioPort, PinAf};
