//! Register-level bring-up for real targets.
//!
//! Everything in this module touches hardware registers through `cortex_m`
//! and `embassy_stm32` types, so it only compiles with the `hardware`
//! feature. Host tests exercise the descriptor and sequencing layers
//! through mocks and never link this module.

use clocks::{AhbPrescaler, ApbPrescaler, ClockPlan, ClockSource, PllPDiv};
use extmem::mpu::MpuRegion;

/// Programs the given regions into the MPU and re-enables it.
///
/// The regions are written in slice order; each descriptor carries its own
/// hardware slot number, so order only matters for readability. The MPU is
/// re-enabled with `PRIVDEFENA` set, leaving unmapped addresses on the
/// default map for privileged code.
///
/// # Safety
///
/// - Must run from privileged mode before any data cache enable, because
///   regions changing cacheability take effect per access.
/// - Must run before any interrupt handler that touches the affected
///   windows can fire.
#[allow(unsafe_code)]
pub unsafe fn apply_mpu_regions(mpu: &mut cortex_m::peripheral::MPU, regions: &[MpuRegion]) {
    // SAFETY: the MPU must be off while regions change (ARMv7-M B3.5.1);
    // caller guarantees privileged boot context.
    unsafe {
        mpu.ctrl.write(0);
    }

    for region in regions {
        let (rbar, rasr) = region.register_pair();
        // SAFETY: RBAR carries VALID plus the slot number, so each pair
        // lands in the slot its descriptor names.
        unsafe {
            mpu.rbar.write(rbar);
            mpu.rasr.write(rasr);
        }
    }

    // SAFETY: ENABLE | PRIVDEFENA; the region writes above are complete.
    unsafe {
        mpu.ctrl.write(0b101);
    }

    // Writes must reach the MPU before the pipeline refills behind them.
    cortex_m::asm::dsb();
    cortex_m::asm::isb();
}

/// Zero-argument MPU entry point for `main`.
///
/// Steals the Cortex-M peripherals, programs the regions, and drops them
/// again before `embassy_stm32::init()` takes its own copy.
///
/// ```rust,ignore
/// #[embassy_executor::main]
/// async fn main(spawner: Spawner) {
///     let regions = board::disco_f429zi::mpu_regions().unwrap();
///     board::hardware::apply_mpu_regions_at_boot(&regions);
///     let p = embassy_stm32::init(...);
///     // ...
/// }
/// ```
#[allow(unsafe_code)]
pub fn apply_mpu_regions_at_boot(regions: &[MpuRegion]) {
    // SAFETY: runs once at boot; nothing else holds the Cortex-M
    // peripherals yet and the borrow ends before embassy takes them.
    let mut peripherals = unsafe { cortex_m::Peripherals::steal() };
    // SAFETY: boot context, privileged, caches still off.
    unsafe { apply_mpu_regions(&mut peripherals.MPU, regions) };
}

fn pll_input_divider(m: u8) -> embassy_stm32::rcc::PllPreDiv {
    use embassy_stm32::rcc::PllPreDiv;
    // Shipped plans use M in {8, 12, 25}.
    match m {
        8 => PllPreDiv::DIV8,
        25 => PllPreDiv::DIV25,
        _ => PllPreDiv::DIV12,
    }
}

fn pll_multiplier(n: u16) -> embassy_stm32::rcc::PllMul {
    use embassy_stm32::rcc::PllMul;
    // Shipped plans use N in {96, 192, 200}.
    match n {
        192 => PllMul::MUL192,
        200 => PllMul::MUL200,
        _ => PllMul::MUL96,
    }
}

fn pll_sys_divider(p: PllPDiv) -> embassy_stm32::rcc::PllPDiv {
    match p {
        PllPDiv::Div2 => embassy_stm32::rcc::PllPDiv::DIV2,
        PllPDiv::Div4 => embassy_stm32::rcc::PllPDiv::DIV4,
        PllPDiv::Div6 => embassy_stm32::rcc::PllPDiv::DIV6,
        PllPDiv::Div8 => embassy_stm32::rcc::PllPDiv::DIV8,
    }
}

fn pll_usb_divider(q: u8) -> embassy_stm32::rcc::PllQDiv {
    use embassy_stm32::rcc::PllQDiv;
    // Shipped plans use Q in {4, 8}.
    match q {
        8 => PllQDiv::DIV8,
        _ => PllQDiv::DIV4,
    }
}

fn ahb_prescaler(ahb: AhbPrescaler) -> embassy_stm32::rcc::AHBPrescaler {
    use embassy_stm32::rcc::AHBPrescaler;
    match ahb {
        AhbPrescaler::Div1 => AHBPrescaler::DIV1,
        AhbPrescaler::Div2 => AHBPrescaler::DIV2,
        AhbPrescaler::Div4 => AHBPrescaler::DIV4,
        AhbPrescaler::Div8 => AHBPrescaler::DIV8,
        AhbPrescaler::Div16 => AHBPrescaler::DIV16,
    }
}

fn apb_prescaler(apb: ApbPrescaler) -> embassy_stm32::rcc::APBPrescaler {
    use embassy_stm32::rcc::APBPrescaler;
    match apb {
        ApbPrescaler::Div1 => APBPrescaler::DIV1,
        ApbPrescaler::Div2 => APBPrescaler::DIV2,
        ApbPrescaler::Div4 => APBPrescaler::DIV4,
        ApbPrescaler::Div8 => APBPrescaler::DIV8,
        ApbPrescaler::Div16 => APBPrescaler::DIV16,
    }
}

/// Builds the `embassy_stm32::Config` realizing one clock plan.
///
/// The cascade decides which plan survives; this translates the surviving
/// plan into embassy's RCC configuration. Regulator scale and flash wait
/// states are not set here: embassy derives both from the target
/// frequencies, and the plan's values exist so hosts can audit them.
///
/// # Do not call `embassy_stm32::init(Default::default())`
///
/// The default config runs the core from the 16 MHz internal oscillator
/// with USB dead. Always pass a plan through this function.
#[must_use]
pub fn build_embassy_config(plan: &ClockPlan) -> embassy_stm32::Config {
    use embassy_stm32::rcc::{Hse, HseMode, Pll, PllSource, Sysclk};
    use embassy_stm32::time::Hertz;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillator ──────────────────────────────────────────────────────
    match plan.source {
        ClockSource::ExternalClock => {
            config.rcc.hsi = false;
            config.rcc.hse = Some(Hse {
                freq: Hertz(plan.source_hz),
                mode: HseMode::Bypass,
            });
            config.rcc.pll_src = PllSource::HSE;
        }
        ClockSource::ExternalCrystal => {
            config.rcc.hsi = false;
            config.rcc.hse = Some(Hse {
                freq: Hertz(plan.source_hz),
                mode: HseMode::Oscillator,
            });
            config.rcc.pll_src = PllSource::HSE;
        }
        ClockSource::InternalOscillator => {
            config.rcc.hsi = true;
            config.rcc.hse = None;
            config.rcc.pll_src = PllSource::HSI;
        }
    }

    // ── Main PLL ────────────────────────────────────────────────────────
    config.rcc.pll = Some(Pll {
        prediv: pll_input_divider(plan.divisors.m()),
        mul: pll_multiplier(plan.divisors.n()),
        divp: Some(pll_sys_divider(plan.divisors.p())), // system clock
        divq: Some(pll_usb_divider(plan.divisors.q())), // 48 MHz domain
        divr: None,
    });

    // ── System clock and buses ──────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = ahb_prescaler(plan.switch.ahb);
    config.rcc.apb1_pre = apb_prescaler(plan.switch.apb1);
    config.rcc.apb2_pre = apb_prescaler(plan.switch.apb2);

    config
}
