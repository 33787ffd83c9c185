//! Octal-SPI PSRAM bring-up.
//!
//! Octal PSRAM sits behind a serial controller, so bring-up has three
//! phases: configure the controller, program the device's mode registers
//! over indirect commands, and finally calibrate the DQS sampling delay and
//! switch the controller to memory-mapped mode. Until the switch, the RAM
//! is reachable only by register commands; after it, it reads and writes
//! like ordinary memory.
//!
//! The delay-block calibration is verified by read-back: a silently
//! rejected delay value would corrupt every later read, so a mismatch
//! fails bring-up instead.
//!
//! # Hardware
//!
//! The reference design runs an APS6408L-OBM (64 Mbit octal PSRAM with
//! DQS) on OCTOSPI1, memory-mapped at `0x9000_0000`.

use thiserror_no_std::Error;

/// APS6408 mode registers and the values bring-up programs.
pub mod aps6408 {
    /// Mode register 0: read latency and drive strength.
    pub const MR0: u8 = 0x00;
    /// MR0 value: fixed 6-cycle read latency, full drive strength.
    pub const MR0_INIT: u8 = 0x24;
    /// Mode register 8: bus mode and burst configuration.
    pub const MR8: u8 = 0x08;
    /// MR8 value: octal I/O, 1 KiB hybrid-burst wrap disabled.
    pub const MR8_INIT: u8 = 0x0B;

    /// Dummy cycles a fixed-latency read needs at full clock.
    pub const READ_DUMMY_CYCLES: u8 = 6;
    /// Dummy cycles a write needs at full clock.
    pub const WRITE_DUMMY_CYCLES: u8 = 6;

    /// Device size: 64 Mbit.
    pub const SIZE_BYTES: u32 = 8 * 1024 * 1024;
}

/// Rejected octal-SPI descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OspiConfigError {
    /// A field fell outside its register range.
    #[error("octal-SPI config field out of range")]
    FieldOutOfRange {
        /// Offending field.
        field: &'static str,
    },
}

/// Bring-up failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OspiRamError<E> {
    /// The controller rejected an operation.
    #[error("octal-SPI controller rejected the operation")]
    Controller(E),
    /// The delay block did not accept the calibrated value.
    #[error("delay-block read-back does not match the programmed value")]
    DelayBlockMismatch,
}

/// Command scheme the controller should use for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OspiMemoryKind {
    /// AP Memory command set (APS64xx PSRAM).
    ApMemory,
    /// Macronix command set.
    Macronix,
    /// Micron command set.
    Micron,
}

/// When the controller samples incoming data relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleShifting {
    /// Sample on the nominal edge; required when DQS provides the strobe.
    None,
    /// Sample half a cycle late, for slow round-trip paths without DQS.
    HalfCycle,
}

/// Idle clock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockMode {
    /// Clock idles low (mode 0).
    Low,
    /// Clock idles high (mode 3).
    High,
}

/// Caller-owned description of the octal-SPI RAM attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OspiRamConfig {
    /// Command scheme of the attached device.
    pub kind: OspiMemoryKind,
    /// FIFO threshold in bytes, 1..=32.
    pub fifo_threshold: u8,
    /// log2 of the device size in bytes, 1..=32.
    pub device_size_log2: u8,
    /// Chip-select high time between commands, in cycles, 1..=64.
    pub chip_select_high_time: u8,
    /// Idle clock level.
    pub clock_mode: ClockMode,
    /// Kernel-clock divider, 1..=256.
    pub clock_prescaler: u16,
    /// Data sampling shift.
    pub sample_shifting: SampleShifting,
    /// Hold data a quarter cycle for DQS-aligned writes.
    pub delay_hold_quarter_cycle: bool,
    /// log2 of the address boundary chip select must toggle on, so a burst
    /// never holds CS low past the device's refresh-starvation limit.
    pub chip_select_boundary_log2: u8,
    /// Keep the clock free-running between accesses.
    pub free_running_clock: bool,
    /// Bypass the DQS delay block entirely.
    pub delay_block_bypass: bool,
    /// Device supports wrapped reads.
    pub wrap_supported: bool,
    /// Maximum cycles chip select may stay low before the controller
    /// forces a refresh break. Zero disables the limit.
    pub refresh_max_cs_low_cycles: u32,
    /// Address the memory-mapped window starts at.
    pub base_address: u32,
}

impl OspiRamConfig {
    /// Validates the descriptor against the controller's field ranges.
    ///
    /// # Errors
    ///
    /// [`OspiConfigError::FieldOutOfRange`] naming the first bad field.
    pub fn validated(self) -> Result<Self, OspiConfigError> {
        if !(1..=32).contains(&self.fifo_threshold) {
            return Err(OspiConfigError::FieldOutOfRange {
                field: "fifo_threshold",
            });
        }
        if !(1..=32).contains(&self.device_size_log2) {
            return Err(OspiConfigError::FieldOutOfRange {
                field: "device_size_log2",
            });
        }
        if !(1..=64).contains(&self.chip_select_high_time) {
            return Err(OspiConfigError::FieldOutOfRange {
                field: "chip_select_high_time",
            });
        }
        if !(1..=256).contains(&self.clock_prescaler) {
            return Err(OspiConfigError::FieldOutOfRange {
                field: "clock_prescaler",
            });
        }
        if self.chip_select_boundary_log2 > 31 {
            return Err(OspiConfigError::FieldOutOfRange {
                field: "chip_select_boundary_log2",
            });
        }
        Ok(self)
    }

    /// Usable size of the attached device in bytes.
    #[must_use]
    pub fn capacity_bytes(&self) -> u64 {
        1_u64 << self.device_size_log2
    }

    /// APS6408 on OCTOSPI1: kernel clock halved, DQS sampling with a
    /// quarter-cycle hold, chip select released at 1 KiB boundaries, and
    /// the controller's refresh watchdog at 320 cycles.
    #[must_use]
    #[allow(clippy::expect_used)] // values are statically valid
    pub fn aps6408(base_address: u32) -> Self {
        Self {
            kind: OspiMemoryKind::ApMemory,
            fifo_threshold: 1,
            device_size_log2: 23,
            chip_select_high_time: 2,
            clock_mode: ClockMode::Low,
            clock_prescaler: 2,
            sample_shifting: SampleShifting::None,
            delay_hold_quarter_cycle: true,
            chip_select_boundary_log2: 10,
            free_running_clock: false,
            delay_block_bypass: false,
            wrap_supported: false,
            refresh_max_cs_low_cycles: 320,
            base_address,
        }
        .validated()
        .expect("APS6408 controller config is statically valid")
    }
}

/// Delay-block setting: delay-line length and selected output phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayBlockConfig {
    /// Number of delay units covering one clock period.
    pub units: u32,
    /// Selected phase tap.
    pub phase: u32,
}

/// How the controller currently exposes the RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessState {
    /// Register-command access only.
    Indirect,
    /// The RAM reads and writes as ordinary memory.
    MemoryMapped,
}

/// Device latency mode after bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LatencyMode {
    /// Fixed read latency; dummies are constant regardless of refresh.
    Fixed,
    /// Variable latency signaled by DQS.
    Variable,
}

/// Burst behavior after bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstType {
    /// Linear bursts across the whole array.
    Linear,
    /// Hybrid wrap bursts.
    Hybrid,
}

/// What bring-up has established so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OspiRamState {
    /// Current access path.
    pub access: AccessState,
    /// Device latency mode.
    pub latency: LatencyMode,
    /// Device burst behavior.
    pub burst: BurstType,
}

/// Register-level octal-SPI operations a target provides.
pub trait OspiController {
    /// Failure type for controller traffic.
    type Error;

    /// Programs the controller from the descriptor.
    fn configure(&mut self, config: &OspiRamConfig) -> Result<(), Self::Error>;

    /// Writes one device mode register over an indirect command.
    fn write_mode_register(&mut self, register: u8, value: u8) -> Result<(), Self::Error>;

    /// Measures the delay-line length of one clock period.
    fn delay_block_clock_period(&mut self) -> Result<DelayBlockConfig, Self::Error>;

    /// Programs the delay block.
    fn set_delay_block(&mut self, config: &DelayBlockConfig) -> Result<(), Self::Error>;

    /// Reads the delay block's current setting.
    fn delay_block_config(&mut self) -> Result<DelayBlockConfig, Self::Error>;

    /// Switches the controller to memory-mapped mode with the given dummy
    /// cycles.
    fn enable_memory_mapped(
        &mut self,
        read_dummy_cycles: u8,
        write_dummy_cycles: u8,
    ) -> Result<(), Self::Error>;
}

/// Configures the controller and programs the device mode registers.
///
/// Leaves the device in fixed-latency, linear-burst, indirect-access
/// state, ready for [`enable_memory_mapped`].
///
/// # Errors
///
/// Wraps the first controller failure in [`OspiRamError::Controller`].
pub fn initialize<C: OspiController>(
    controller: &mut C,
    config: &OspiRamConfig,
) -> Result<OspiRamState, OspiRamError<C::Error>> {
    controller
        .configure(config)
        .map_err(OspiRamError::Controller)?;
    controller
        .write_mode_register(aps6408::MR0, aps6408::MR0_INIT)
        .map_err(OspiRamError::Controller)?;
    controller
        .write_mode_register(aps6408::MR8, aps6408::MR8_INIT)
        .map_err(OspiRamError::Controller)?;
    Ok(OspiRamState {
        access: AccessState::Indirect,
        latency: LatencyMode::Fixed,
        burst: BurstType::Linear,
    })
}

/// Calibrates the DQS delay block to a quarter of the clock period and
/// verifies the setting by read-back.
///
/// # Errors
///
/// [`OspiRamError::DelayBlockMismatch`] when the read-back differs from
/// the programmed value; controller failures wrap as
/// [`OspiRamError::Controller`].
#[allow(clippy::arithmetic_side_effects)] // division by the constant 4
pub fn calibrate_delay_block<C: OspiController>(
    controller: &mut C,
) -> Result<DelayBlockConfig, OspiRamError<C::Error>> {
    let mut config = controller
        .delay_block_clock_period()
        .map_err(OspiRamError::Controller)?;
    // A quarter period centers the sampling edge within the DQS eye.
    config.phase /= 4;
    controller
        .set_delay_block(&config)
        .map_err(OspiRamError::Controller)?;
    let actual = controller
        .delay_block_config()
        .map_err(OspiRamError::Controller)?;
    if actual != config {
        return Err(OspiRamError::DelayBlockMismatch);
    }
    Ok(config)
}

/// Calibrates the delay block and switches to memory-mapped access.
///
/// # Errors
///
/// Propagates calibration failures; controller failures wrap as
/// [`OspiRamError::Controller`]. On error the access state is unchanged.
pub fn enable_memory_mapped<C: OspiController>(
    controller: &mut C,
    state: &mut OspiRamState,
) -> Result<DelayBlockConfig, OspiRamError<C::Error>> {
    let delay = calibrate_delay_block(controller)?;
    controller
        .enable_memory_mapped(aps6408::READ_DUMMY_CYCLES, aps6408::WRITE_DUMMY_CYCLES)
        .map_err(OspiRamError::Controller)?;
    state.access = AccessState::MemoryMapped;
    Ok(delay)
}
