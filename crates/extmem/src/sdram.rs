//! FMC SDRAM descriptors and the JEDEC startup sequence.
//!
//! SDRAM bring-up has two halves: programming the memory controller
//! (geometry and timing registers) and walking the device itself through
//! its JEDEC power-up ritual (clock, precharge, refresh bursts, mode
//! register). Both halves are described here as validated data; the actual
//! register traffic goes through [`SdramController`], which the target
//! implements over its FMC and host tests implement as a recorder.
//!
//! # Hardware
//!
//! The reference design maps an IS42S16400J (64 Mbit, 1M x 16 x 4 banks)
//! on FMC bank 2 at `0xD000_0000`, clocked at HCLK/2 = 90 MHz.

// Research notes:
// - JEDEC JESD21-C: mode-register layout (burst length bits 2:0, burst
//   type bit 3, CAS latency bits 6:4, write burst bit 9) is common to all
//   SDR SDRAM, so the field constants below are device-independent.
// - IS42S16400J datasheet table 7: tMRD 2 tCK, tXSR 70 ns, tRAS 42 ns,
//   tRC 63 ns, tWR 2 tCK, tRP 20 ns, tRCD 20 ns. The shipped preset takes
//   the controller-vendor values, which round tRC up to 70 ns.
// - The 100 us pause after clock enable is the JEDEC power-up minimum;
//   the sequence waits a full millisecond because the delay source on
//   target has millisecond granularity.

use thiserror_no_std::Error;

/// SDRAM mode-register fields, loaded with [`SdramCommand::LoadMode`].
pub mod mode_register {
    /// Burst length 1.
    pub const BURST_LENGTH_1: u16 = 0x0000;
    /// Burst length 2.
    pub const BURST_LENGTH_2: u16 = 0x0001;
    /// Burst length 4.
    pub const BURST_LENGTH_4: u16 = 0x0002;
    /// Burst length 8.
    pub const BURST_LENGTH_8: u16 = 0x0004;
    /// Sequential burst ordering.
    pub const BURST_TYPE_SEQUENTIAL: u16 = 0x0000;
    /// Interleaved burst ordering.
    pub const BURST_TYPE_INTERLEAVED: u16 = 0x0008;
    /// CAS latency 2.
    pub const CAS_LATENCY_2: u16 = 0x0020;
    /// CAS latency 3.
    pub const CAS_LATENCY_3: u16 = 0x0030;
    /// Standard operating mode.
    pub const OPERATING_MODE_STANDARD: u16 = 0x0000;
    /// Write bursts follow the read burst length.
    pub const WRITEBURST_MODE_PROGRAMMED: u16 = 0x0000;
    /// Writes are single-location regardless of burst length.
    pub const WRITEBURST_MODE_SINGLE: u16 = 0x0200;

    /// Mask of the CAS latency field (bits 6:4).
    pub const CAS_LATENCY_MASK: u16 = 0x0070;
}

/// Rejected SDRAM descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdramConfigError {
    /// A timing field fell outside the controller's 1..=16 cycle range.
    #[error("SDRAM timing field out of range")]
    TimingOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// A geometry field fell outside what the controller can address.
    #[error("SDRAM geometry field out of range")]
    GeometryOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// The mode register's CAS field disagrees with the controller's.
    /// The device would answer earlier or later than the FMC samples.
    #[error("CAS latency differs between mode register and controller")]
    CasLatencyMismatch,
}

/// Rounds a datasheet nanosecond requirement up to clock cycles, never
/// below one cycle.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // u64 headroom; divisor is a constant
#[allow(clippy::cast_possible_truncation)] // realistic inputs yield tiny counts
pub const fn cycles_for_ns(nanoseconds: u32, clock_hz: u32) -> u32 {
    let cycles = (nanoseconds as u64 * clock_hz as u64 + 999_999_999) / 1_000_000_000;
    if cycles == 0 {
        1
    } else {
        cycles as u32
    }
}

/// SDRAM timing in SDCLK cycles. Every field spans 1..=16 cycles, the
/// range of the controller's 4-bit minus-one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdramTiming {
    /// tMRD: LOAD_MODE to ACTIVE.
    pub load_mode_to_active: u8,
    /// tXSR: self-refresh exit to next command.
    pub exit_self_refresh: u8,
    /// tRAS: ACTIVE to PRECHARGE, minimum.
    pub self_refresh: u8,
    /// tRC: REFRESH to REFRESH / ACTIVE.
    pub row_cycle: u8,
    /// tWR: last write data to PRECHARGE.
    pub write_recovery: u8,
    /// tRP: PRECHARGE period.
    pub row_precharge: u8,
    /// tRCD: ACTIVE to READ/WRITE.
    pub row_to_column: u8,
}

impl SdramTiming {
    /// Validates a timing set against the controller's field range.
    ///
    /// # Errors
    ///
    /// [`SdramConfigError::TimingOutOfRange`] naming the first bad field.
    pub fn new(
        load_mode_to_active: u8,
        exit_self_refresh: u8,
        self_refresh: u8,
        row_cycle: u8,
        write_recovery: u8,
        row_precharge: u8,
        row_to_column: u8,
    ) -> Result<Self, SdramConfigError> {
        let timing = Self {
            load_mode_to_active,
            exit_self_refresh,
            self_refresh,
            row_cycle,
            write_recovery,
            row_precharge,
            row_to_column,
        };
        for (field, cycles) in [
            ("load_mode_to_active", timing.load_mode_to_active),
            ("exit_self_refresh", timing.exit_self_refresh),
            ("self_refresh", timing.self_refresh),
            ("row_cycle", timing.row_cycle),
            ("write_recovery", timing.write_recovery),
            ("row_precharge", timing.row_precharge),
            ("row_to_column", timing.row_to_column),
        ] {
            if !(1..=16).contains(&cycles) {
                return Err(SdramConfigError::TimingOutOfRange { field });
            }
        }
        Ok(timing)
    }

    /// IS42S16400J timing at 90 MHz SDCLK (11.1 ns per cycle).
    #[must_use]
    #[allow(clippy::expect_used)] // values are statically valid
    pub fn is42s16400j_at_90mhz() -> Self {
        Self::new(
            2, // tMRD: 2 tCK
            7, // tXSR: 70 ns
            4, // tRAS: 42 ns
            7, // tRC: 70 ns
            2, // tWR: 2 tCK
            2, // tRP: 20 ns
            2, // tRCD: 20 ns
        )
        .expect("IS42S16400J timing values are statically valid at 90 MHz")
    }
}

/// FMC SDRAM bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdramBank {
    /// Bank 1, mapped at `0xC000_0000`.
    Bank1,
    /// Bank 2, mapped at `0xD000_0000`.
    Bank2,
}

/// Data-bus width of the SDRAM array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    /// 8-bit bus.
    Bits8,
    /// 16-bit bus.
    Bits16,
    /// 32-bit bus.
    Bits32,
}

/// CAS latency in cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CasLatency {
    /// One cycle.
    One,
    /// Two cycles.
    Two,
    /// Three cycles.
    Three,
}

impl CasLatency {
    /// The matching mode-register CAS field, where the device supports it.
    #[must_use]
    pub const fn mode_register_bits(self) -> u16 {
        match self {
            Self::One => 0x0010,
            Self::Two => mode_register::CAS_LATENCY_2,
            Self::Three => mode_register::CAS_LATENCY_3,
        }
    }
}

/// SDCLK as a divisor of HCLK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdClockPeriod {
    /// SDCLK = HCLK / 2.
    HclkDiv2,
    /// SDCLK = HCLK / 3.
    HclkDiv3,
}

/// Array geometry and controller behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdramGeometry {
    /// Column address bits, 8..=11.
    pub column_bits: u8,
    /// Row address bits, 11..=13.
    pub row_bits: u8,
    /// Data bus width.
    pub bus_width: BusWidth,
    /// Internal device banks, 2 or 4.
    pub internal_banks: u8,
    /// CAS latency the controller waits for.
    pub cas_latency: CasLatency,
    /// Refuse writes to the bank.
    pub write_protection: bool,
    /// SDCLK divisor.
    pub sd_clock: SdClockPeriod,
    /// Let the controller issue full read bursts.
    pub read_burst: bool,
    /// Extra read-pipe delay in HCLK cycles, 0..=2.
    pub read_pipe_delay: u8,
}

impl SdramGeometry {
    /// Validates the geometry against the controller's field ranges.
    ///
    /// # Errors
    ///
    /// [`SdramConfigError::GeometryOutOfRange`] naming the first bad field.
    pub fn validated(self) -> Result<Self, SdramConfigError> {
        if !(8..=11).contains(&self.column_bits) {
            return Err(SdramConfigError::GeometryOutOfRange {
                field: "column_bits",
            });
        }
        if !(11..=13).contains(&self.row_bits) {
            return Err(SdramConfigError::GeometryOutOfRange { field: "row_bits" });
        }
        if self.internal_banks != 2 && self.internal_banks != 4 {
            return Err(SdramConfigError::GeometryOutOfRange {
                field: "internal_banks",
            });
        }
        if self.read_pipe_delay > 2 {
            return Err(SdramConfigError::GeometryOutOfRange {
                field: "read_pipe_delay",
            });
        }
        Ok(self)
    }

    /// IS42S16400J geometry: 8 column bits, 12 row bits, 16-bit bus, four
    /// banks, CAS 3, read bursts on.
    #[must_use]
    #[allow(clippy::expect_used)] // values are statically valid
    pub fn is42s16400j() -> Self {
        Self {
            column_bits: 8,
            row_bits: 12,
            bus_width: BusWidth::Bits16,
            internal_banks: 4,
            cas_latency: CasLatency::Three,
            write_protection: false,
            sd_clock: SdClockPeriod::HclkDiv2,
            read_burst: true,
            read_pipe_delay: 1,
        }
        .validated()
        .expect("IS42S16400J geometry is statically valid")
    }
}

/// Refresh-timer count for the controller's refresh rate register.
///
/// `rows` refreshes must fit in `refresh_period_ms`, so one refresh is due
/// every `period / rows`; the count is that interval in SDCLK cycles, less
/// a 20-cycle safety margin so a refresh request pending behind a read
/// still meets the deadline.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // u64 headroom; margin subtracted after floor
#[allow(clippy::cast_possible_truncation)] // counts fit the 13-bit register field
pub const fn refresh_timer_count(sdclk_hz: u32, refresh_period_ms: u32, rows: u32) -> u16 {
    let interval_cycles = refresh_period_ms as u64 * sdclk_hz as u64 / (rows as u64 * 1000);
    if interval_cycles > 20 {
        (interval_cycles - 20) as u16
    } else {
        0
    }
}

/// Caller-owned description of one SDRAM bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SdramConfig {
    /// FMC bank the device sits on.
    pub bank: SdramBank,
    /// Array geometry and controller flags.
    pub geometry: SdramGeometry,
    /// Timing in SDCLK cycles.
    pub timing: SdramTiming,
    /// Mode-register word for the LOAD_MODE command.
    pub mode: u16,
    /// Refresh-timer count.
    pub refresh_count: u16,
    /// Address the bank is mapped at.
    pub base_address: u32,
    /// Usable size in bytes.
    pub size_bytes: u32,
}

impl SdramConfig {
    /// Cross-checks the descriptor.
    ///
    /// # Errors
    ///
    /// Propagates geometry range errors, and returns
    /// [`SdramConfigError::CasLatencyMismatch`] when the mode register and
    /// the controller disagree on CAS latency.
    pub fn validated(self) -> Result<Self, SdramConfigError> {
        self.geometry.validated()?;
        let device_cas = self.mode & mode_register::CAS_LATENCY_MASK;
        let controller_cas = self.geometry.cas_latency.mode_register_bits();
        if device_cas != controller_cas {
            return Err(SdramConfigError::CasLatencyMismatch);
        }
        Ok(self)
    }

    /// The startup sequence this descriptor requires.
    #[must_use]
    pub const fn startup_sequence(&self) -> StartupSequence {
        StartupSequence::for_mode(self.mode, self.refresh_count)
    }
}

/// Command kinds the controller can issue to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdramCommand {
    /// Start driving SDCLK to the device.
    ClockEnable,
    /// PRECHARGE ALL banks.
    PrechargeAll,
    /// A burst of consecutive AUTO REFRESH commands.
    AutoRefresh {
        /// Number of refreshes in the burst.
        count: u8,
    },
    /// LOAD MODE REGISTER.
    LoadMode {
        /// Mode-register word.
        value: u16,
    },
}

/// One startup step: a command, then an optional settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandStep {
    /// Command to issue.
    pub command: SdramCommand,
    /// Delay after the command completes, in microseconds.
    pub delay_after_us: u32,
}

/// The JEDEC startup walk, as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartupSequence {
    /// Commands in issue order.
    pub steps: [CommandStep; 4],
    /// Refresh-timer count programmed after the commands.
    pub refresh_count: u16,
}

impl StartupSequence {
    /// Builds the sequence for a mode word and refresh count. The same
    /// inputs always produce the same sequence; re-running it leaves the
    /// device in the same state, so a retried bring-up is harmless.
    #[must_use]
    pub const fn for_mode(mode: u16, refresh_count: u16) -> Self {
        Self {
            steps: [
                CommandStep {
                    command: SdramCommand::ClockEnable,
                    // JEDEC requires >= 100 us of stable clock before the
                    // first command; the delay source ticks in ms.
                    delay_after_us: 1_000,
                },
                CommandStep {
                    command: SdramCommand::PrechargeAll,
                    delay_after_us: 0,
                },
                CommandStep {
                    command: SdramCommand::AutoRefresh { count: 4 },
                    delay_after_us: 0,
                },
                CommandStep {
                    command: SdramCommand::LoadMode { value: mode },
                    delay_after_us: 0,
                },
            ],
            refresh_count,
        }
    }
}

/// Register-level SDRAM controller operations a target provides.
pub trait SdramController {
    /// Failure type for register traffic.
    type Error;

    /// Programs geometry and timing registers for the bank.
    fn configure(&mut self, config: &SdramConfig) -> Result<(), Self::Error>;

    /// Issues one device command.
    fn send_command(&mut self, command: SdramCommand) -> Result<(), Self::Error>;

    /// Programs the refresh-timer count.
    fn set_refresh_count(&mut self, count: u16) -> Result<(), Self::Error>;

    /// Blocks for at least the given number of microseconds.
    fn delay_us(&mut self, microseconds: u32);
}

/// Configures the controller and walks the startup sequence.
///
/// # Errors
///
/// Propagates the first controller failure; the device is left
/// unconfigured and the caller treats that as fatal for the board.
pub fn initialize<C: SdramController>(
    controller: &mut C,
    config: &SdramConfig,
) -> Result<(), C::Error> {
    controller.configure(config)?;
    let sequence = config.startup_sequence();
    for step in &sequence.steps {
        controller.send_command(step.command)?;
        if step.delay_after_us > 0 {
            controller.delay_us(step.delay_after_us);
        }
    }
    controller.set_refresh_count(sequence.refresh_count)
}
