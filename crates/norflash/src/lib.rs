//! Serial NOR flash primitives behind a memory-mapped quad-SPI controller.
//!
//! The flash that holds the firmware image is also the flash the firmware
//! wants to write settings into, so erase and program have to be careful
//! about caches, interrupts, and the window being unreadable mid-sequence.
//! This crate keeps that discipline in one place: the driver sequences
//! every operation over a small controller trait, and the geometry tables
//! describe the parts so host tests can audit addresses and alignment
//! without hardware.
//!
//! # Architecture
//!
//! - [`geometry`]: part descriptions, the address window, and the
//!   status-register layout.
//! - [`device`]: the driver proper with setup, erase, program and mapped
//!   reads, plus the [`embedded_storage`] NOR traits for storage
//!   consumers.

#![cfg_attr(not(test), no_std)]
// ─── Lint policy ────────────────────────────────────────────────────────────
// A stray panic during a flash sequence leaves the part half-programmed
// with interrupts masked, so this crate gets the strict treatment:
// - No silent panics: unwrap/expect/panic are denied outside tests.
// - Addresses and lengths are validated before any controller traffic.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory

pub mod device;
pub mod geometry;

pub use device::{FlashError, FlexspiNor, FlexspiOps, LutSequence};
pub use geometry::{FlashGeometry, StatusLayout, ERASE_VALUE};
