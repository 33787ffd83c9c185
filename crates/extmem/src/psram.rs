//! FMC NOR/SRAM-bank descriptors for asynchronous PSRAM.
//!
//! PSRAM on the NOR/SRAM banks needs no JEDEC ritual: once the controller
//! knows the bank's behavior flags and bus timing, the memory simply
//! responds. Bring-up is therefore a single validated descriptor handed to
//! the target's [`SramController`].
//!
//! # Hardware
//!
//! The reference design maps an IS66WV51216 (8 Mbit, 512K x 16, 55 ns
//! asynchronous) on FMC bank 1 at `0x6000_0000`.

use thiserror_no_std::Error;

use crate::sdram::BusWidth;

/// Rejected PSRAM descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PsramConfigError {
    /// A timing field fell outside its BTR register range.
    #[error("NOR/SRAM timing field out of range")]
    TimingOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// A control field fell outside its BCR register range.
    #[error("NOR/SRAM control field out of range")]
    ControlOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// Extended mode and the presence of a write timing disagree. The
    /// controller only consumes a separate write timing in extended mode.
    #[error("write timing does not match the extended-mode flag")]
    WriteTimingMismatch,
}

/// FMC access mode (A..D) used in extended mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    /// Mode A: SRAM/PSRAM timings.
    A,
    /// Mode B: NOR flash timings.
    B,
    /// Mode C: NOR flash timings, OE toggling.
    C,
    /// Mode D: asynchronous with address hold.
    D,
}

/// Bus timing for one NOR/SRAM bank, in HCLK cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NorSramTiming {
    /// Address setup, 0..=15.
    pub address_setup: u8,
    /// Address hold, 1..=15.
    pub address_hold: u8,
    /// Data setup, 1..=255.
    pub data_setup: u8,
    /// Bus turnaround between transactions, 0..=15.
    pub bus_turnaround: u8,
    /// CLK divider for synchronous access, 2..=16.
    pub clk_division: u8,
    /// Data latency for synchronous bursts, 2..=17.
    pub data_latency: u8,
    /// Access mode selected in extended mode.
    pub access_mode: AccessMode,
}

impl NorSramTiming {
    /// Validates the timing against the BTR field ranges.
    ///
    /// # Errors
    ///
    /// [`PsramConfigError::TimingOutOfRange`] naming the first bad field.
    pub fn validated(self) -> Result<Self, PsramConfigError> {
        if self.address_setup > 15 {
            return Err(PsramConfigError::TimingOutOfRange {
                field: "address_setup",
            });
        }
        if !(1..=15).contains(&self.address_hold) {
            return Err(PsramConfigError::TimingOutOfRange {
                field: "address_hold",
            });
        }
        if self.data_setup < 1 {
            return Err(PsramConfigError::TimingOutOfRange { field: "data_setup" });
        }
        if self.bus_turnaround > 15 {
            return Err(PsramConfigError::TimingOutOfRange {
                field: "bus_turnaround",
            });
        }
        if !(2..=16).contains(&self.clk_division) {
            return Err(PsramConfigError::TimingOutOfRange {
                field: "clk_division",
            });
        }
        if !(2..=17).contains(&self.data_latency) {
            return Err(PsramConfigError::TimingOutOfRange {
                field: "data_latency",
            });
        }
        Ok(self)
    }

    /// IS66WV51216 timing with HCLK at 216 MHz (4.6 ns per cycle).
    ///
    /// The 55 ns part needs 9 cycles of address setup plus 6 of data setup
    /// for a read; the synchronous fields are don't-care for this fully
    /// asynchronous device but must still hold legal values.
    #[must_use]
    #[allow(clippy::expect_used)] // values are statically valid
    pub fn is66wv51216_at_216mhz() -> Self {
        Self {
            address_setup: 9,
            address_hold: 2,
            data_setup: 6,
            bus_turnaround: 1,
            clk_division: 2,
            data_latency: 2,
            access_mode: AccessMode::A,
        }
        .validated()
        .expect("IS66WV51216 timing is statically valid at 216 MHz")
    }
}

/// Memory type the bank is told to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryType {
    /// Asynchronous SRAM or PSRAM in SRAM mode.
    Sram,
    /// PSRAM/CellularRAM with synchronous capability.
    Psram,
    /// NOR flash.
    Nor,
}

/// NWAIT polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitPolarity {
    /// NWAIT is active low.
    Low,
    /// NWAIT is active high.
    High,
}

/// When NWAIT is sampled relative to the wait state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitTiming {
    /// One cycle before the wait state.
    BeforeWaitState,
    /// During the wait state.
    DuringWaitState,
}

/// Burst page size for CellularRAM-style devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageSize {
    /// No page mode.
    None,
    /// 128-byte pages.
    Bytes128,
    /// 256-byte pages.
    Bytes256,
    /// 512-byte pages.
    Bytes512,
    /// 1024-byte pages.
    Bytes1024,
}

/// Clock output behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContinuousClock {
    /// FMC_CLK only toggles during synchronous access.
    SyncOnly,
    /// FMC_CLK runs continuously.
    Always,
}

/// Behavior flags for one NOR/SRAM bank (the BCR register, as data).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NorSramControl {
    /// FMC bank, 1..=4.
    pub bank: u8,
    /// Address and data share the bus.
    pub data_address_mux: bool,
    /// Memory type.
    pub memory_type: MemoryType,
    /// Data bus width.
    pub bus_width: BusWidth,
    /// Synchronous burst access.
    pub burst_access: bool,
    /// NWAIT polarity.
    pub wait_polarity: WaitPolarity,
    /// NWAIT sample point.
    pub wait_timing: WaitTiming,
    /// Allow writes to the bank.
    pub write_enabled: bool,
    /// Honor NWAIT during synchronous access.
    pub wait_signal: bool,
    /// Separate read and write timings (extended mode).
    pub extended_mode: bool,
    /// Honor NWAIT during asynchronous access.
    pub asynchronous_wait: bool,
    /// Synchronous write bursts.
    pub write_burst: bool,
    /// Route writes through the controller FIFO.
    pub write_fifo: bool,
    /// Device page size, for page-mode devices.
    pub page_size: PageSize,
    /// Clock output behavior.
    pub continuous_clock: ContinuousClock,
}

impl NorSramControl {
    /// Validates the control flags.
    ///
    /// # Errors
    ///
    /// [`PsramConfigError::ControlOutOfRange`] for an impossible bank.
    pub fn validated(self) -> Result<Self, PsramConfigError> {
        if !(1..=4).contains(&self.bank) {
            return Err(PsramConfigError::ControlOutOfRange { field: "bank" });
        }
        Ok(self)
    }

    /// IS66WV51216 behavior: plain asynchronous 16-bit SRAM access with
    /// writes enabled and every synchronous feature off.
    #[must_use]
    #[allow(clippy::expect_used)] // values are statically valid
    pub fn is66wv51216() -> Self {
        Self {
            bank: 1,
            data_address_mux: false,
            memory_type: MemoryType::Sram,
            bus_width: BusWidth::Bits16,
            burst_access: false,
            wait_polarity: WaitPolarity::Low,
            wait_timing: WaitTiming::BeforeWaitState,
            write_enabled: true,
            wait_signal: false,
            extended_mode: false,
            asynchronous_wait: false,
            write_burst: false,
            write_fifo: false,
            page_size: PageSize::None,
            continuous_clock: ContinuousClock::SyncOnly,
        }
        .validated()
        .expect("IS66WV51216 control flags are statically valid")
    }
}

/// Caller-owned description of one PSRAM bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PsramConfig {
    /// Bank behavior flags.
    pub control: NorSramControl,
    /// Read timing (and write timing outside extended mode).
    pub read_timing: NorSramTiming,
    /// Separate write timing; present exactly when extended mode is on.
    pub write_timing: Option<NorSramTiming>,
    /// Address the bank is mapped at.
    pub base_address: u32,
    /// Usable size in bytes.
    pub size_bytes: u32,
}

impl PsramConfig {
    /// Cross-validates control, timings and the extended-mode pairing.
    ///
    /// # Errors
    ///
    /// Propagates field range errors and returns
    /// [`PsramConfigError::WriteTimingMismatch`] when `write_timing` and
    /// `control.extended_mode` disagree.
    pub fn validated(self) -> Result<Self, PsramConfigError> {
        self.control.validated()?;
        self.read_timing.validated()?;
        if self.control.extended_mode != self.write_timing.is_some() {
            return Err(PsramConfigError::WriteTimingMismatch);
        }
        if let Some(write_timing) = self.write_timing {
            write_timing.validated()?;
        }
        Ok(self)
    }
}

/// Register-level NOR/SRAM controller operations a target provides.
pub trait SramController {
    /// Failure type for register traffic.
    type Error;

    /// Programs the bank's control and timing registers and enables it.
    fn configure(&mut self, config: &PsramConfig) -> Result<(), Self::Error>;
}

/// Validates the descriptor's pairing and hands it to the controller.
///
/// # Errors
///
/// Propagates the controller failure; the caller treats it as fatal for
/// the board.
pub fn initialize<C: SramController>(
    controller: &mut C,
    config: &PsramConfig,
) -> Result<(), C::Error> {
    controller.configure(config)
}
