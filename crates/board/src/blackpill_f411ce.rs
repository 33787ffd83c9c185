//! WeAct BlackPill (STM32F411CEU6) clock bring-up.
//!
//! The board carries a 25 MHz crystal and nothing on OSC_IN, so the
//! bypass candidate exists only to exercise the cascade's fallback on
//! boards that do feed an external clock; here it always fails and the
//! crystal is the expected winner. A board with a cracked or missing
//! crystal still boots on the internal RC at the same 100 MHz.
//!
//! USB builds swap the divisor sets: the crystal and RC plans then run
//! at 96 MHz so the PLL Q output lands on an exact 48 MHz.
//!
//! The DFU bootloader shipped on these boards leaves the PLL locked to
//! the crystal when it jumps to the application, so the crystal plan
//! reuses a running PLL instead of reconfiguring it.

use clocks::{
    AhbPrescaler, ApbPrescaler, ClockCascade, ClockOps, ClockPlan, ClockSource, ClockSwitch,
    PllDivisors, PllPDiv, VoltageScale,
};

use crate::error::BoardInitError;

/// External crystal frequency.
pub const HSE_HZ: u32 = 25_000_000;
/// Internal RC oscillator frequency.
pub const HSI_HZ: u32 = 16_000_000;

/// Bus dividers and wait states shared by every plan: the F411 at 3.3 V
/// needs 3 wait states up to 100 MHz, APB1 must stay at or below 50 MHz.
const SWITCH: ClockSwitch = ClockSwitch {
    ahb: AhbPrescaler::Div1,
    apb1: ApbPrescaler::Div2,
    apb2: ApbPrescaler::Div1,
    flash_latency_ws: 3,
};

/// Crystal divisors: 25 MHz / 12 × 96 / 2 = 100 MHz.
#[must_use]
#[allow(clippy::expect_used)] // values are statically valid
pub fn crystal_divisors() -> PllDivisors {
    PllDivisors::new(12, 96, PllPDiv::Div2, 4).expect("crystal divisors are statically valid")
}

/// Crystal divisors for USB: 25 MHz / 25 × 192 / 2 = 96 MHz, Q = 48 MHz.
#[must_use]
#[allow(clippy::expect_used)] // values are statically valid
pub fn crystal_usb_divisors() -> PllDivisors {
    PllDivisors::new(25, 192, PllPDiv::Div2, 4).expect("crystal USB divisors are statically valid")
}

/// RC divisors: 16 MHz / 8 × 200 / 4 = 100 MHz.
#[must_use]
#[allow(clippy::expect_used)] // values are statically valid
pub fn hsi_divisors() -> PllDivisors {
    PllDivisors::new(8, 200, PllPDiv::Div4, 8).expect("HSI divisors are statically valid")
}

/// RC divisors for USB: 16 MHz / 8 × 192 / 4 = 96 MHz, Q = 48 MHz.
#[must_use]
#[allow(clippy::expect_used)] // values are statically valid
pub fn hsi_usb_divisors() -> PllDivisors {
    PllDivisors::new(8, 192, PllPDiv::Div4, 8).expect("HSI USB divisors are statically valid")
}

fn bypass_plan(usb: bool) -> ClockPlan {
    ClockPlan {
        source: ClockSource::ExternalClock,
        source_hz: HSE_HZ,
        bypass: true,
        // A bootloader PLL proves nothing about an external feed, so this
        // plan always reconfigures (and, on this board, always fails).
        reuse_running_pll: false,
        voltage_scale: VoltageScale::Scale2,
        divisors: if usb {
            crystal_usb_divisors()
        } else {
            crystal_divisors()
        },
        switch: SWITCH,
    }
}

fn crystal_plan(usb: bool) -> ClockPlan {
    ClockPlan {
        source: ClockSource::ExternalCrystal,
        source_hz: HSE_HZ,
        bypass: false,
        reuse_running_pll: true,
        voltage_scale: VoltageScale::Scale2,
        divisors: if usb {
            crystal_usb_divisors()
        } else {
            crystal_divisors()
        },
        switch: SWITCH,
    }
}

fn hsi_plan(usb: bool) -> ClockPlan {
    ClockPlan {
        source: ClockSource::InternalOscillator,
        source_hz: HSI_HZ,
        bypass: false,
        reuse_running_pll: false,
        voltage_scale: VoltageScale::Scale2,
        divisors: if usb {
            hsi_usb_divisors()
        } else {
            hsi_divisors()
        },
        switch: SWITCH,
    }
}

/// The board's clock candidates, best first. `usb` selects the divisor
/// sets that park the PLL Q output on an exact 48 MHz.
#[must_use]
pub fn clock_plans(usb: bool) -> [ClockPlan; 3] {
    [bypass_plan(usb), crystal_plan(usb), hsi_plan(usb)]
}

/// The plan the hardware binary assumes when it hands RCC setup to
/// embassy: the crystal, which is the first candidate that can succeed
/// on this board.
#[must_use]
pub fn default_hardware_plan(usb: bool) -> ClockPlan {
    crystal_plan(usb)
}

/// Walks the clock candidates and returns the source that ends up
/// driving SYSCLK.
///
/// # Errors
///
/// [`BoardInitError::ClockCascade`] with the attempted sources when every
/// candidate failed; the caller treats that as fatal.
pub fn bring_up<C: ClockOps>(
    ops: &mut C,
    plans: &[ClockPlan],
) -> Result<ClockSource, BoardInitError> {
    let mut cascade = ClockCascade::new();
    Ok(cascade.run(ops, plans)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ── Frequency audit ──

    #[test]
    fn crystal_plan_runs_at_100_mhz() {
        let plan = default_hardware_plan(false);
        assert_eq!(plan.sysclk_hz(), 100_000_000);
        assert_eq!(plan.ahb_hz(), 100_000_000);
        assert_eq!(plan.apb1_hz(), 50_000_000);
        assert_eq!(plan.apb2_hz(), 100_000_000);
    }

    #[test]
    fn usb_plans_land_on_exactly_48_mhz() {
        let crystal = default_hardware_plan(true);
        assert_eq!(crystal.sysclk_hz(), 96_000_000);
        assert_eq!(crystal.usb_hz(), 48_000_000);

        let [_, _, hsi] = clock_plans(true);
        assert_eq!(hsi.sysclk_hz(), 96_000_000);
        assert_eq!(hsi.usb_hz(), 48_000_000);
    }

    #[test]
    fn fallback_plan_matches_the_crystal_frequency() {
        // Losing the crystal must not change timing-sensitive peripherals.
        let [_, crystal, hsi] = clock_plans(false);
        assert_eq!(crystal.sysclk_hz(), hsi.sysclk_hz());
        assert_eq!(hsi.sysclk_hz(), 100_000_000);
    }

    // ── Cascade ordering ──

    #[test]
    fn candidates_run_bypass_then_crystal_then_rc() {
        let [bypass, crystal, hsi] = clock_plans(false);
        assert_eq!(bypass.source, ClockSource::ExternalClock);
        assert_eq!(crystal.source, ClockSource::ExternalCrystal);
        assert_eq!(hsi.source, ClockSource::InternalOscillator);

        assert!(bypass.bypass);
        assert!(!crystal.bypass);
        assert!(!hsi.bypass);
    }

    #[test]
    fn only_the_crystal_plan_reuses_a_bootloader_pll() {
        let [bypass, crystal, hsi] = clock_plans(false);
        assert!(!bypass.reuse_running_pll);
        assert!(crystal.reuse_running_pll);
        assert!(!hsi.reuse_running_pll);
    }

    #[test]
    fn every_plan_shares_the_bus_and_regulator_settings() {
        for plan in clock_plans(true) {
            assert_eq!(plan.voltage_scale, VoltageScale::Scale2);
            assert_eq!(plan.switch, SWITCH);
        }
    }
}
