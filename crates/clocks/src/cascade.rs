//! Ordered clock-source fallback.
//!
//! Boards list their usable clock sources best-first. Bring-up walks the
//! list and keeps the first source whose oscillator locks and whose system
//! clock switch is accepted; any failure moves on to the next candidate.
//! Running out of candidates is fatal and reported to the caller exactly
//! once, with the attempted sources attached.
//!
//! One quirk is deliberately carried: a DFU-style bootloader may leave the
//! PLL running when it jumps to the application, and the PLL cannot be
//! reconfigured while it drives anything. Plans with
//! [`ClockPlan::reuse_running_pll`] skip oscillator configuration in that
//! case and go straight to the bus switch.

use heapless::Vec;
use thiserror_no_std::Error;

use crate::pll::PllDivisors;

/// Most candidates a board lists. Longer plan slices still run in full,
/// but the exhaustion report only records this many attempts.
pub const MAX_CLOCK_PLANS: usize = 4;

/// Candidate clock source, in the order boards usually prefer them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// External clock fed into OSC_IN with the oscillator bypassed.
    ExternalClock,
    /// External crystal driven by the on-chip oscillator.
    ExternalCrystal,
    /// Internal RC oscillator.
    InternalOscillator,
}

/// Regulator scale applied before raising the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageScale {
    /// Highest-frequency scale.
    Scale1,
    /// Mid scale; covers 100 MHz on the F411.
    Scale2,
    /// Power-saving scale.
    Scale3,
}

/// AHB prescaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AhbPrescaler {
    /// SYSCLK / 1.
    Div1,
    /// SYSCLK / 2.
    Div2,
    /// SYSCLK / 4.
    Div4,
    /// SYSCLK / 8.
    Div8,
    /// SYSCLK / 16.
    Div16,
}

impl AhbPrescaler {
    /// Numeric divisor.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
        }
    }
}

/// APB prescaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ApbPrescaler {
    /// HCLK / 1.
    Div1,
    /// HCLK / 2.
    Div2,
    /// HCLK / 4.
    Div4,
    /// HCLK / 8.
    Div8,
    /// HCLK / 16.
    Div16,
}

impl ApbPrescaler {
    /// Numeric divisor.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div1 => 1,
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div8 => 8,
            Self::Div16 => 16,
        }
    }
}

/// Bus dividers and flash wait states applied when switching to the PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockSwitch {
    /// AHB prescaler.
    pub ahb: AhbPrescaler,
    /// APB1 (low-speed bus) prescaler.
    pub apb1: ApbPrescaler,
    /// APB2 (high-speed bus) prescaler.
    pub apb2: ApbPrescaler,
    /// Flash wait states for the target frequency and supply voltage.
    pub flash_latency_ws: u8,
}

/// Everything needed to attempt one clock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Source this plan attempts.
    pub source: ClockSource,
    /// Oscillator frequency feeding the PLL.
    pub source_hz: u32,
    /// Bypass the oscillator amplifier (external clock on OSC_IN).
    pub bypass: bool,
    /// Keep a PLL a bootloader left running instead of reconfiguring it.
    pub reuse_running_pll: bool,
    /// Regulator scale to set before the switch.
    pub voltage_scale: VoltageScale,
    /// Main-PLL divisors.
    pub divisors: PllDivisors,
    /// Bus dividers and flash latency.
    pub switch: ClockSwitch,
}

impl ClockPlan {
    /// System-clock frequency this plan produces.
    #[must_use]
    pub const fn sysclk_hz(&self) -> u32 {
        self.divisors.sysclk_hz(self.source_hz)
    }

    /// AHB (core and bus matrix) frequency this plan produces.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // divisors are nonzero by type
    pub const fn ahb_hz(&self) -> u32 {
        self.sysclk_hz() / self.switch.ahb.divisor()
    }

    /// APB1 frequency this plan produces.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // divisors are nonzero by type
    pub const fn apb1_hz(&self) -> u32 {
        self.ahb_hz() / self.switch.apb1.divisor()
    }

    /// APB2 frequency this plan produces.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // divisors are nonzero by type
    pub const fn apb2_hz(&self) -> u32 {
        self.ahb_hz() / self.switch.apb2.divisor()
    }

    /// 48 MHz-domain frequency this plan produces.
    #[must_use]
    pub const fn usb_hz(&self) -> u32 {
        self.divisors.usb_hz(self.source_hz)
    }
}

/// Failure reported by a [`ClockOps`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The board cannot run this plan at all (e.g. bypass with no clock
    /// feed wired to OSC_IN).
    #[error("clock plan not supported on this board")]
    Unsupported,
    /// The oscillator or the PLL failed to report ready in time.
    #[error("oscillator or PLL failed to lock")]
    NoLock,
    /// The RCC rejected the system clock switch.
    #[error("system clock switch rejected")]
    SwitchRejected,
}

/// Register-level clock operations a target provides.
///
/// Implementations sequence the actual RCC and PWR writes; the cascade only
/// decides what to attempt and in which order.
pub trait ClockOps {
    /// Sets the regulator voltage scale. Safe to call repeatedly.
    fn set_voltage_scale(&mut self, scale: VoltageScale) -> Result<(), ClockError>;

    /// Whether the main PLL is currently locked and running.
    fn pll_is_running(&self) -> bool;

    /// Turns on the plan's oscillator and configures the PLL from it.
    fn configure_oscillator(&mut self, plan: &ClockPlan) -> Result<(), ClockError>;

    /// Switches SYSCLK to the PLL and applies bus dividers and flash
    /// latency.
    fn switch_system_clock(&mut self, plan: &ClockPlan) -> Result<(), ClockError>;
}

/// Where the cascade currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CascadeState {
    /// No attempt made yet.
    #[default]
    Unattempted,
    /// Currently attempting this source.
    Trying(ClockSource),
    /// This source is configured and drives SYSCLK.
    Configured(ClockSource),
    /// Every candidate failed; the system clock is whatever reset left.
    Fatal,
}

/// Every candidate failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all clock sources failed")]
pub struct CascadeExhausted {
    /// Sources attempted, in order.
    pub attempted: Vec<ClockSource, MAX_CLOCK_PLANS>,
}

/// Walks clock plans in order until one sticks.
#[derive(Debug, Default)]
pub struct ClockCascade {
    state: CascadeState,
}

impl ClockCascade {
    /// A cascade that has attempted nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CascadeState::Unattempted,
        }
    }

    /// Current state, for logging and tests.
    #[must_use]
    pub const fn state(&self) -> CascadeState {
        self.state
    }

    /// Attempts each plan in order and returns the first source that ends
    /// up driving SYSCLK. Calling again after success is a no-op returning
    /// the configured source.
    ///
    /// # Errors
    ///
    /// [`CascadeExhausted`] when every plan failed. The caller decides how
    /// fatal that is; the error is produced once per walk, not once per
    /// failed source.
    pub fn run<O: ClockOps>(
        &mut self,
        ops: &mut O,
        plans: &[ClockPlan],
    ) -> Result<ClockSource, CascadeExhausted> {
        if let CascadeState::Configured(source) = self.state {
            return Ok(source);
        }

        let mut attempted: Vec<ClockSource, MAX_CLOCK_PLANS> = Vec::new();
        for plan in plans {
            self.state = CascadeState::Trying(plan.source);
            // The report is bounded; attempts past MAX_CLOCK_PLANS still
            // run but are dropped from it.
            let _ = attempted.push(plan.source);

            if Self::attempt(ops, plan).is_ok() {
                self.state = CascadeState::Configured(plan.source);
                return Ok(plan.source);
            }
        }

        self.state = CascadeState::Fatal;
        Err(CascadeExhausted { attempted })
    }

    fn attempt<O: ClockOps>(ops: &mut O, plan: &ClockPlan) -> Result<(), ClockError> {
        ops.set_voltage_scale(plan.voltage_scale)?;
        // A bootloader may have locked the PLL already; it cannot be
        // reconfigured while in use, so keep it and only switch the buses.
        if !(plan.reuse_running_pll && ops.pll_is_running()) {
            ops.configure_oscillator(plan)?;
        }
        ops.switch_system_clock(plan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pll::PllPDiv;

    const SWITCH: ClockSwitch = ClockSwitch {
        ahb: AhbPrescaler::Div1,
        apb1: ApbPrescaler::Div2,
        apb2: ApbPrescaler::Div1,
        flash_latency_ws: 3,
    };

    fn plan(source: ClockSource, bypass: bool, reuse: bool) -> ClockPlan {
        ClockPlan {
            source,
            source_hz: 25_000_000,
            bypass,
            reuse_running_pll: reuse,
            voltage_scale: VoltageScale::Scale2,
            divisors: PllDivisors::new(12, 96, PllPDiv::Div2, 4).unwrap(),
            switch: SWITCH,
        }
    }

    fn default_plans() -> [ClockPlan; 3] {
        [
            plan(ClockSource::ExternalClock, true, false),
            plan(ClockSource::ExternalCrystal, false, true),
            plan(ClockSource::InternalOscillator, false, false),
        ]
    }

    /// Scripted [`ClockOps`] that records the call sequence.
    #[derive(Default)]
    struct MockClock {
        /// Sources whose oscillator configuration should succeed.
        lockable: std::vec::Vec<ClockSource>,
        pll_running: bool,
        scale_calls: std::vec::Vec<VoltageScale>,
        oscillator_calls: std::vec::Vec<ClockSource>,
        switch_calls: std::vec::Vec<ClockSource>,
    }

    impl ClockOps for MockClock {
        fn set_voltage_scale(&mut self, scale: VoltageScale) -> Result<(), ClockError> {
            self.scale_calls.push(scale);
            Ok(())
        }

        fn pll_is_running(&self) -> bool {
            self.pll_running
        }

        fn configure_oscillator(&mut self, plan: &ClockPlan) -> Result<(), ClockError> {
            self.oscillator_calls.push(plan.source);
            if plan.bypass {
                return Err(ClockError::Unsupported);
            }
            if self.lockable.contains(&plan.source) {
                Ok(())
            } else {
                Err(ClockError::NoLock)
            }
        }

        fn switch_system_clock(&mut self, plan: &ClockPlan) -> Result<(), ClockError> {
            self.switch_calls.push(plan.source);
            Ok(())
        }
    }

    // ── Selection order ─────────────────────────────────────────────────

    #[test]
    fn cascade_settles_on_the_first_source_that_locks() {
        let mut ops = MockClock {
            lockable: vec![ClockSource::ExternalCrystal, ClockSource::InternalOscillator],
            ..MockClock::default()
        };
        let mut cascade = ClockCascade::new();

        let source = cascade.run(&mut ops, &default_plans()).unwrap();
        assert_eq!(source, ClockSource::ExternalCrystal);
        assert_eq!(cascade.state(), CascadeState::Configured(source));

        // Bypass was attempted and rejected before the crystal stuck.
        assert_eq!(
            ops.oscillator_calls,
            [ClockSource::ExternalClock, ClockSource::ExternalCrystal]
        );
        // Only the surviving source reached the bus switch.
        assert_eq!(ops.switch_calls, [ClockSource::ExternalCrystal]);
    }

    #[test]
    fn cascade_falls_all_the_way_back_to_the_internal_oscillator() {
        let mut ops = MockClock {
            lockable: vec![ClockSource::InternalOscillator],
            ..MockClock::default()
        };
        let mut cascade = ClockCascade::new();

        let source = cascade.run(&mut ops, &default_plans()).unwrap();
        assert_eq!(source, ClockSource::InternalOscillator);
        assert_eq!(ops.oscillator_calls.len(), 3);
    }

    #[test]
    fn voltage_scale_is_set_for_every_attempt() {
        let mut ops = MockClock {
            lockable: vec![ClockSource::InternalOscillator],
            ..MockClock::default()
        };
        ClockCascade::new()
            .run(&mut ops, &default_plans())
            .unwrap();
        assert_eq!(ops.scale_calls.len(), 3);
        assert!(ops
            .scale_calls
            .iter()
            .all(|scale| *scale == VoltageScale::Scale2));
    }

    // ── Exhaustion ──────────────────────────────────────────────────────

    #[test]
    fn exhaustion_is_reported_once_with_the_attempt_list() {
        let mut ops = MockClock::default();
        let mut cascade = ClockCascade::new();

        let err = cascade.run(&mut ops, &default_plans()).unwrap_err();
        assert_eq!(
            err.attempted.as_slice(),
            [
                ClockSource::ExternalClock,
                ClockSource::ExternalCrystal,
                ClockSource::InternalOscillator,
            ]
        );
        assert_eq!(cascade.state(), CascadeState::Fatal);

        // One walk, one error: each source was attempted exactly once.
        assert_eq!(ops.oscillator_calls.len(), 3);
    }

    // ── Bootloader PLL reuse ────────────────────────────────────────────

    #[test]
    fn a_running_pll_skips_oscillator_configuration_for_the_crystal_plan() {
        let mut ops = MockClock {
            pll_running: true,
            ..MockClock::default()
        };
        let mut cascade = ClockCascade::new();

        let source = cascade.run(&mut ops, &default_plans()).unwrap();
        assert_eq!(source, ClockSource::ExternalCrystal);

        // The bypass plan does not reuse, so it still hit (and failed)
        // oscillator configuration; the crystal plan went straight to the
        // switch.
        assert_eq!(ops.oscillator_calls, [ClockSource::ExternalClock]);
        assert_eq!(ops.switch_calls, [ClockSource::ExternalCrystal]);
    }

    #[test]
    fn a_running_pll_changes_nothing_for_plans_that_do_not_reuse() {
        let mut ops = MockClock {
            pll_running: true,
            lockable: vec![ClockSource::InternalOscillator],
            ..MockClock::default()
        };
        let plans = [plan(ClockSource::InternalOscillator, false, false)];

        let source = ClockCascade::new().run(&mut ops, &plans).unwrap();
        assert_eq!(source, ClockSource::InternalOscillator);
        assert_eq!(ops.oscillator_calls, [ClockSource::InternalOscillator]);
    }

    // ── Re-running ──────────────────────────────────────────────────────

    #[test]
    fn rerunning_a_configured_cascade_touches_no_hardware() {
        let mut ops = MockClock {
            lockable: vec![ClockSource::ExternalCrystal],
            ..MockClock::default()
        };
        let mut cascade = ClockCascade::new();
        cascade.run(&mut ops, &default_plans()).unwrap();

        let calls_before = ops.oscillator_calls.len();
        let source = cascade.run(&mut ops, &default_plans()).unwrap();
        assert_eq!(source, ClockSource::ExternalCrystal);
        assert_eq!(ops.oscillator_calls.len(), calls_before);
    }
}
