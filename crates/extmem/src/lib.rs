//! External-memory bring-up for the STM32-based boards.
//!
//! Each board in the family hangs a different memory off its controller:
//! parallel SDRAM on the FMC, asynchronous PSRAM on a NOR/SRAM bank, or
//! octal-SPI PSRAM behind an OCTOSPI block. The board crate owns the
//! descriptors; this crate validates them, derives the command sequences
//! and MPU regions they imply, and drives the walk over small controller
//! traits the target implements.
//!
//! Keeping the sequences as data means the whole bring-up, ordering and
//! all, runs against recording mocks on a development host. Only the trait
//! implementations touch registers.
//!
//! # Architecture
//!
//! - [`sdram`]: FMC SDRAM descriptors and the JEDEC startup sequence.
//! - [`psram`]: FMC NOR/SRAM-bank descriptors for asynchronous PSRAM.
//! - [`ospi_ram`]: octal-SPI PSRAM bring-up with DQS-delay calibration.
//! - [`mpu`]: PMSAv7 region validation and RBAR/RASR encoding.

#![cfg_attr(not(test), no_std)]
// ─── Lint policy ────────────────────────────────────────────────────────────
// A wrong register word here corrupts memory silently, so this crate gets
// the strict treatment:
// - No silent panics: unwrap/expect/panic are denied outside tests.
// - Descriptors validate on construction; encoders only run on validated
//   values.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
// Encoders are const fns; u32::from and friends are not const.
#![allow(clippy::cast_lossless)]
// Struct-literal descriptors mirror vendor register tables field for
// field; builders would only obscure the audit trail.
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory

pub mod mpu;
pub mod ospi_ram;
pub mod psram;
pub mod sdram;

pub use mpu::{AccessPermission, MpuError, MpuRegion, RegionAttributes};
pub use ospi_ram::{OspiController, OspiRamConfig, OspiRamError, OspiRamState};
pub use psram::{NorSramControl, NorSramTiming, PsramConfig, PsramConfigError, SramController};
pub use sdram::{
    SdramCommand, SdramConfig, SdramConfigError, SdramController, SdramGeometry, SdramTiming,
    StartupSequence,
};
