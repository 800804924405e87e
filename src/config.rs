//! Bring-up configuration. Builder methods override the register values sent by `Display::init`;
//! anything left alone is sent with the value known to work on the 128x64 module.

use crate::command::*;
use crate::error::Error;
use crate::gamma::GrayscaleCurve;
use crate::interface::DisplayInterface;

/// Panel orientation. Read once by `Display::init`; changing it means initializing again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Rotate0,
    Rotate180,
}

impl Rotation {
    /// The remap command for this orientation and COM wiring. Nibbles run forward in both cases;
    /// the column remap and COM scan direction flip together.
    pub(crate) fn remapping(self, com_layout: ComLayout) -> Command {
        let (column_remap, com_scan_direction) = match self {
            Rotation::Rotate0 => (ColumnRemap::Reverse, ComScanDirection::RowZeroLast),
            Rotation::Rotate180 => (ColumnRemap::Forward, ComScanDirection::RowZeroFirst),
        };
        Command::SetRemapping(
            column_remap,
            NibbleRemap::Forward,
            com_scan_direction,
            com_layout,
        )
    }
}

/// How `Display::set_window` turns pixel columns into controller column addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColumnAddressing {
    /// Always address the full panel width, columns 28 to 91, whatever columns are requested.
    Fixed,
    /// Address only the requested columns.
    Partial,
}

/// A configuration for the display.
pub struct Config {
    pub(crate) rotation: Rotation,
    pub(crate) column_addressing: ColumnAddressing,
    pub(crate) gamma: Option<GrayscaleCurve>,
    pub(crate) com_layout: ComLayout,
    pub(crate) display_mode: DisplayMode,
    clock_fosc_divset_cmd: Command,
    vdd_regulator_cmd: Command,
    display_enhancements_cmd: Command,
    contrast_current_cmd: Command,
    master_contrast_cmd: Command,
    phase_lengths_cmd: Command,
    second_precharge_period_cmd: Option<Command>,
    precharge_voltage_cmd: Command,
    com_deselect_voltage_cmd: Command,
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Rotation::Rotate0)
    }
}

impl Config {
    /// Create a new configuration for the given orientation. The grayscale curve defaults to the
    /// panel's own.
    pub fn new(rotation: Rotation) -> Self {
        Config {
            rotation,
            column_addressing: ColumnAddressing::Fixed,
            gamma: None,
            com_layout: ComLayout::DualProgressive,
            display_mode: DisplayMode::Normal,
            clock_fosc_divset_cmd: Command::SetClockFoscDivset(9, 1),
            vdd_regulator_cmd: Command::SetVddRegulator(true),
            display_enhancements_cmd: Command::SetDisplayEnhancements(true, true),
            contrast_current_cmd: Command::SetContrastCurrent(0x7F),
            master_contrast_cmd: Command::SetMasterContrast(0x0F),
            phase_lengths_cmd: Command::SetPhaseLengths(5, 15),
            second_precharge_period_cmd: None,
            precharge_voltage_cmd: Command::SetPreChargeVoltage(0x1F),
            com_deselect_voltage_cmd: Command::SetComDeselectVoltage(4),
        }
    }

    /// Choose between fixed full-width and partial column addressing.
    pub fn column_addressing(self, column_addressing: ColumnAddressing) -> Self {
        Self {
            column_addressing,
            ..self
        }
    }

    /// Program this curve at init instead of the panel default.
    pub fn gamma(self, curve: GrayscaleCurve) -> Self {
        Self {
            gamma: Some(curve),
            ..self
        }
    }

    /// How the module wires COM lines to rows. The 128x64 module is dual progressive.
    pub fn com_layout(self, com_layout: ComLayout) -> Self {
        Self { com_layout, ..self }
    }

    /// The display mode switched to just before the panel is turned on.
    pub fn display_mode(self, display_mode: DisplayMode) -> Self {
        Self {
            display_mode,
            ..self
        }
    }

    /// See `Command::SetClockFoscDivset`.
    pub fn clock_fosc_divset(self, fosc: u8, divset: u8) -> Self {
        Self {
            clock_fosc_divset_cmd: Command::SetClockFoscDivset(fosc, divset),
            ..self
        }
    }

    /// See `Command::SetVddRegulator`.
    pub fn vdd_regulator(self, internal: bool) -> Self {
        Self {
            vdd_regulator_cmd: Command::SetVddRegulator(internal),
            ..self
        }
    }

    /// See `Command::SetDisplayEnhancements`.
    pub fn display_enhancements(self, external_vsl: bool, enhanced_low_gs_quality: bool) -> Self {
        Self {
            display_enhancements_cmd: Command::SetDisplayEnhancements(
                external_vsl,
                enhanced_low_gs_quality,
            ),
            ..self
        }
    }

    /// See `Command::SetContrastCurrent`.
    pub fn contrast_current(self, current: u8) -> Self {
        Self {
            contrast_current_cmd: Command::SetContrastCurrent(current),
            ..self
        }
    }

    /// See `Command::SetMasterContrast`.
    pub fn master_contrast(self, contrast: u8) -> Self {
        Self {
            master_contrast_cmd: Command::SetMasterContrast(contrast),
            ..self
        }
    }

    /// See `Command::SetPhaseLengths`.
    pub fn phase_lengths(self, reset: u8, first_precharge: u8) -> Self {
        Self {
            phase_lengths_cmd: Command::SetPhaseLengths(reset, first_precharge),
            ..self
        }
    }

    /// Send a second precharge period at init; left at the chip's POR default otherwise. See
    /// `Command::SetSecondPrechargePeriod`.
    pub fn second_precharge_period(self, period: u8) -> Self {
        Self {
            second_precharge_period_cmd: Some(Command::SetSecondPrechargePeriod(period)),
            ..self
        }
    }

    /// See `Command::SetPreChargeVoltage`.
    pub fn precharge_voltage(self, voltage: u8) -> Self {
        Self {
            precharge_voltage_cmd: Command::SetPreChargeVoltage(voltage),
            ..self
        }
    }

    /// See `Command::SetComDeselectVoltage`.
    pub fn com_deselect_voltage(self, voltage: u8) -> Self {
        Self {
            com_deselect_voltage_cmd: Command::SetComDeselectVoltage(voltage),
            ..self
        }
    }

    /// Send the display clock setting, which belongs early in the power-up sequence.
    pub(crate) fn send_clock<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        self.clock_fosc_divset_cmd.send(iface)
    }

    /// Send the supply, contrast and drive timing settings that follow the remap in the power-up
    /// sequence.
    pub(crate) fn send_drive<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        self.vdd_regulator_cmd.send(iface)?;
        self.display_enhancements_cmd.send(iface)?;
        self.contrast_current_cmd.send(iface)?;
        self.master_contrast_cmd.send(iface)?;
        self.phase_lengths_cmd.send(iface)?;
        self.second_precharge_period_cmd
            .map_or(Ok(()), |c| c.send(iface))?;
        self.precharge_voltage_cmd.send(iface)?;
        self.com_deselect_voltage_cmd.send(iface)
    }
}
