//! Pad routing for the RT1020-based boards.
//!
//! The IOMUXC routes every peripheral signal through per-pad mux registers
//! and, for signals with several candidate pads, per-signal daisy selects.
//! This crate carries the audited routing tables for the product and turns
//! a (signal, pad) pair into the exact register writes the pad needs.
//!
//! Everything here is plain data and pure functions, so the tables and the
//! planner are fully testable on a development host. Nothing in this crate
//! touches hardware; callers issue the planned writes through their own
//! register access layer.
//!
//! # Architecture
//!
//! - [`function`]: decoded routing settings and the packed `u32` interchange
//!   form used by older table dumps.
//! - [`pad`] / [`peripheral`]: the pads and peripheral signals the tables
//!   may reference.
//! - [`tables`]: one routing table per signal class, sentinel-terminated.
//! - [`resolver`]: first-match lookup and write planning.

#![cfg_attr(not(test), no_std)]
// ─── Lint policy ────────────────────────────────────────────────────────────
// Routing mistakes short peripherals onto the wrong pads, so this crate gets
// the same panic-free treatment as the firmware proper:
// - No silent panics: unwrap/expect/panic are denied outside tests.
// - Every fallible lookup returns Option or a typed error.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
// Table modules repeat the signal name in their statics on purpose; the
// names mirror the reference-manual signal classes.
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod function;
pub mod pad;
pub mod peripheral;
pub mod resolver;
pub mod tables;

pub use function::{Daisy, PinFunction};
pub use pad::Pad;
pub use peripheral::{Peripheral, PwmChannel, PwmOutput};
pub use resolver::{
    lookup, peripheral as peripheral_for, plan, DaisyWrite, MuxCtlWrite, PadWrite, PinmuxError,
    WritePlan,
};
pub use tables::{PinAssignment, NO_CONNECTION};
