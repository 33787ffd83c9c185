//! System-clock planning for the STM32-based boards.
//!
//! Clock bring-up is the one bit of board init that must not brick the
//! device when a component is missing or dead: a board with a cracked
//! crystal should still come up on the internal RC so it can report the
//! fault. This crate keeps that policy in pure code. Boards describe their
//! candidate sources as an ordered list of [`ClockPlan`]s, and
//! [`ClockCascade`] walks the list over a small register-level trait,
//! falling back source by source.
//!
//! Divisors, prescalers and derived frequencies are plain validated data,
//! so every plan a board ships can be audited by host tests.
//!
//! # Architecture
//!
//! - [`pll`]: validated main-PLL divisor sets and frequency math.
//! - [`cascade`]: clock plans, the [`ClockOps`] seam, and the ordered
//!   fallback walk with its exhaustion report.

#![cfg_attr(not(test), no_std)]
// ─── Lint policy ────────────────────────────────────────────────────────────
// Clock bring-up runs before anything that could report a panic, so this
// crate must not contain one:
// - No silent panics: unwrap/expect/panic are denied outside tests.
// - All divisor math is validated at construction; helpers divide only by
//   values their types guarantee nonzero.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
// Validation runs in const fns where RangeInclusive::contains and
// u64::from are not available.
#![allow(clippy::manual_range_contains)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::missing_errors_doc)] // error enums document their variants

pub mod cascade;
pub mod pll;

pub use cascade::{
    AhbPrescaler, ApbPrescaler, CascadeExhausted, CascadeState, ClockCascade, ClockError,
    ClockOps, ClockPlan, ClockSource, ClockSwitch, VoltageScale, MAX_CLOCK_PLANS,
};
pub use pll::{PllDivisorError, PllDivisors, PllPDiv};
