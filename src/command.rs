//! The command set for the SSD1322.
//!
//! Note 1: The display RAM of the SSD1322 is arranged in 128 rows and 120 columns, where each
//! column is 4 adjacent pixels (segments) in the row for a total max resolution of 128x480. Each
//! pixel is 4 bits/16 levels of intensity, so each column also refers to two adjacent bytes. Thus,
//! anywhere there is a "column" address, these refer to horizontal groups of 2 bytes driving 4
//! pixels.

use crate::error::Error;
use crate::interface::DisplayInterface;

pub mod consts {
    //! Limits of the controller's display RAM.

    pub const NUM_PIXEL_COLS: u16 = 480;
    pub const NUM_PIXEL_ROWS: u8 = 128;
    pub const NUM_BUF_COLS: u8 = (NUM_PIXEL_COLS / 4) as u8;
    pub const PIXEL_COL_MAX: u16 = NUM_PIXEL_COLS - 1;
    pub const PIXEL_ROW_MAX: u8 = NUM_PIXEL_ROWS - 1;
    pub const BUF_COL_MAX: u8 = NUM_BUF_COLS - 1;
    /// Largest value a gray scale table entry may take, in DCLKs.
    pub const GRAY_SCALE_MAX: u8 = 180;
    /// Number of programmable gray scale levels (GS1-GS15).
    pub const GRAY_SCALE_LEVELS: usize = 15;
}

use self::consts::*;

/// Setting of column address remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRemap {
    /// Column addresses 0->119 map to segments 0,1,2,3->476,477,478,479.
    Forward,
    /// Column addresses 0->119 map to segments 476,477,478,479->0,1,2,3. Note that the pixels
    /// within each column number in the same order; `NibbleRemap` controls the order of mapping
    /// pixels to nibbles within each column.
    Reverse,
}

/// Setting of data nibble remapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NibbleRemap {
    /// 2-byte sequence 0xABCD maps (in L->R order) to pixels 3,2,1,0.
    Reverse,
    /// 2-byte sequence 0xABCD maps (in L->R order) to pixels 0,1,2,3.
    Forward,
}

/// Setting of the COM line scanning of rows. Changing this setting will flip the image vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComScanDirection {
    /// COM lines scan row addresses top to bottom, so that row address 0 is the first row of the
    /// display.
    RowZeroFirst,
    /// COM lines scan row addresses bottom to top, so that row address 0 is the last row of the
    /// display.
    RowZeroLast,
}

/// Setting the layout of the COM lines to the display rows. This setting is dictated by how the
/// display module itself wires the OLED matrix to the driver chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComLayout {
    /// COM lines 0->127 map to display rows 0->127.
    Progressive,
    /// COM lines 0->63 map to *even* display rows 0->126, and COM lines 64->127 map to *odd*
    /// display rows 1->127.
    Interlaced,
    /// COM lines 0->63 map to display rows 0->63 for half of the columns, and COM lines 64->127
    /// map to display rows 0->63 for the other half.
    DualProgressive,
}

/// Setting of the display mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// The display is blanked with all pixels turned OFF (to grayscale level 0).
    BlankDark,
    /// The display is blanked with all pixels turned ON (to grayscale level 15).
    BlankBright,
    /// The display operates normally, showing the image in the display RAM.
    Normal,
    /// The display shows the image in the display RAM with the grayscale levels inverted.
    Inverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Enable the gray scale gamma table written by `BufCommand::SetGrayScaleTable`. This is the
    /// terminating command of a table write.
    EnableGrayScaleTable,
    /// Set the column start and end address range when writing to the display RAM. The column
    /// address pointer is reset to the start column address such that `WriteImageData` will begin
    /// writing there. Range is 0-119. (Note 1)
    SetColumnAddress(u8, u8),
    /// Set the row start and end address range when writing to the display RAM. Range is 0-127.
    SetRowAddress(u8, u8),
    /// Set column address remapping, data nibble remapping, COM scan direction, and COM line
    /// layout. The address always increments horizontally, the order image data is encoded in.
    SetRemapping(
        ColumnRemap,
        NibbleRemap,
        ComScanDirection,
        ComLayout,
    ),
    /// Set the display start line. Range is 0-127.
    SetStartLine(u8),
    /// Set the display COM line offset. Range is 0-127.
    SetDisplayOffset(u8),
    /// Set the display operating mode.
    SetDisplayMode(DisplayMode),
    /// Turn the VDD regulator on (`true`) or run from an external VDD (`false`).
    SetVddRegulator(bool),
    /// Control sleep mode. Sleep on is the display-off command, sleep off is display-on.
    SetSleepMode(bool),
    /// Set the refresh phase lengths. The first phase (reset) can be set from 5-31 DCLKs, and the
    /// second (first pre-charge) can be set from 3-15 DCLKs.
    SetPhaseLengths(u8, u8),
    /// Set the oscillator frequency Fosc (0-15) and the display clock divider DIVSET (0-10), where
    /// DCLK is Fosc divided by 2^DIVSET.
    SetClockFoscDivset(u8, u8),
    /// Enable or disable display enhancements "external VSL" and "Enhanced low GS display
    /// quality".
    SetDisplayEnhancements(bool, bool),
    /// Set the second pre-charge period. Range 0-15 DCLKs.
    SetSecondPrechargePeriod(u8),
    /// Select the factory default linear gray scale table.
    SetDefaultGrayScaleTable,
    /// Set the pre-charge voltage level, from 0.2*Vcc to 0.6*Vcc. Range 0-31.
    SetPreChargeVoltage(u8),
    /// Set the COM deselect voltage level (VCOMH), from 0.72*Vcc to 0.86*Vcc. Range 0-7.
    SetComDeselectVoltage(u8),
    /// Set the contrast current. Range 0-255.
    SetContrastCurrent(u8),
    /// Set the master contrast control, uniformly reducing all grayscale levels by 0-15
    /// sixteenths. Range 0 (maximum dimming) to 15 (normal contrast).
    SetMasterContrast(u8),
    /// Set the MUX ratio, the number of active COM lines. Range 16-128.
    SetMuxRatio(u8),
    /// Set whether the command lock is enabled or disabled. Enabling the command lock blocks all
    /// commands except `SetCommandLock`.
    SetCommandLock(bool),
}

pub enum BufCommand<'buf> {
    /// Set the gray scale gamma table. Each byte 0-14 can range from 0-180 and sets the pixel
    /// drive pulse width in DCLKs for grayscale levels 1->15; grayscale level 0 cannot be
    /// modified. The settings must monotonically increase.
    SetGrayScaleTable(&'buf [u8]),
    /// Write image data into display RAM, in the order set by the `SetRemapping` increment axis.
    WriteImageData(&'buf [u8]),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[]) => {
        Ok(($cmd, &$buf[..0]))
    };
    ($buf:ident, $cmd:expr,[$arg0:expr]) => {{
        $buf[0] = $arg0;
        Ok(($cmd, &$buf[..1]))
    }};
    ($buf:ident, $cmd:expr,[$arg0:expr, $arg1:expr]) => {{
        $buf[0] = $arg0;
        $buf[1] = $arg1;
        Ok(($cmd, &$buf[..2]))
    }};
}

/// Issue one register write: the command byte, then the parameters (if any) as a single data
/// burst.
fn transmit<DI>(iface: &mut DI, cmd: u8, data: &[u8]) -> Result<(), Error<DI::Error>>
where
    DI: DisplayInterface,
{
    iface.send_command(cmd).map_err(Error::BusTransferFailed)?;
    if data.is_empty() {
        Ok(())
    } else {
        iface.send_data(data).map_err(Error::BusTransferFailed)
    }
}

impl Command {
    /// Encode and send the command. Out of range parameters are rejected with
    /// `Error::InvalidParameter` before anything is sent.
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let mut arg_buf = [0u8; 2];
        let encoded: Result<(u8, &[u8]), Error<DI::Error>> = match self {
            Command::EnableGrayScaleTable => ok_command!(arg_buf, 0x00, []),
            Command::SetColumnAddress(start, end) => match (start, end) {
                (0..=BUF_COL_MAX, 0..=BUF_COL_MAX) => ok_command!(arg_buf, 0x15, [start, end]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetRowAddress(start, end) => match (start, end) {
                (0..=PIXEL_ROW_MAX, 0..=PIXEL_ROW_MAX) => {
                    ok_command!(arg_buf, 0x75, [start, end])
                }
                _ => Err(Error::InvalidParameter),
            },
            Command::SetRemapping(
                column_remap,
                nibble_remap,
                com_scan_direction,
                com_layout,
            ) => {
                let cr = match column_remap {
                    ColumnRemap::Forward => 0x00,
                    ColumnRemap::Reverse => 0x02,
                };
                let nr = match nibble_remap {
                    NibbleRemap::Reverse => 0x00,
                    NibbleRemap::Forward => 0x04,
                };
                let csd = match com_scan_direction {
                    ComScanDirection::RowZeroFirst => 0x00,
                    ComScanDirection::RowZeroLast => 0x10,
                };
                let (interlace, dual_com) = match com_layout {
                    ComLayout::Progressive => (0x00, 0x01),
                    ComLayout::Interlaced => (0x20, 0x01),
                    ComLayout::DualProgressive => (0x00, 0x11),
                };
                ok_command!(arg_buf, 0xA0, [cr | nr | csd | interlace, dual_com])
            }
            Command::SetStartLine(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(arg_buf, 0xA1, [line]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDisplayOffset(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(arg_buf, 0xA2, [line]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDisplayMode(mode) => ok_command!(
                arg_buf,
                match mode {
                    DisplayMode::BlankDark => 0xA4,
                    DisplayMode::BlankBright => 0xA5,
                    DisplayMode::Normal => 0xA6,
                    DisplayMode::Inverse => 0xA7,
                },
                []
            ),
            Command::SetVddRegulator(internal) => {
                ok_command!(arg_buf, 0xAB, [if internal { 0x01 } else { 0x00 }])
            }
            Command::SetSleepMode(ena) => ok_command!(
                arg_buf,
                match ena {
                    true => 0xAE,
                    false => 0xAF,
                },
                []
            ),
            Command::SetPhaseLengths(phase_1, phase_2) => match (phase_1, phase_2) {
                (5..=31, 3..=15) => {
                    let p1 = (phase_1 - 1) >> 1;
                    let p2 = 0xF0 & (phase_2 << 4);
                    ok_command!(arg_buf, 0xB1, [p1 | p2])
                }
                _ => Err(Error::InvalidParameter),
            },
            Command::SetClockFoscDivset(fosc, divset) => match (fosc, divset) {
                (0..=15, 0..=10) => ok_command!(arg_buf, 0xB3, [fosc << 4 | divset]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDisplayEnhancements(ena_external_vsl, ena_enhanced_low_gs_quality) => {
                let vsl = match ena_external_vsl {
                    true => 0xA0,
                    false => 0xA2,
                };
                let gs = match ena_enhanced_low_gs_quality {
                    true => 0xFD,
                    false => 0xB5,
                };
                ok_command!(arg_buf, 0xB4, [vsl, gs])
            }
            Command::SetSecondPrechargePeriod(period) => match period {
                0..=15 => ok_command!(arg_buf, 0xB6, [period]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDefaultGrayScaleTable => ok_command!(arg_buf, 0xB9, []),
            Command::SetPreChargeVoltage(voltage) => match voltage {
                0..=31 => ok_command!(arg_buf, 0xBB, [voltage]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetComDeselectVoltage(voltage) => match voltage {
                0..=7 => ok_command!(arg_buf, 0xBE, [voltage]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetContrastCurrent(current) => ok_command!(arg_buf, 0xC1, [current]),
            Command::SetMasterContrast(contrast) => match contrast {
                0..=15 => ok_command!(arg_buf, 0xC7, [contrast]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetMuxRatio(ratio) => match ratio {
                16..=NUM_PIXEL_ROWS => ok_command!(arg_buf, 0xCA, [ratio - 1]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetCommandLock(ena) => {
                let e = match ena {
                    true => 0x16,
                    false => 0x12,
                };
                ok_command!(arg_buf, 0xFD, [e])
            }
        };
        let (cmd, data) = encoded?;
        transmit(iface, cmd, data)
    }
}

impl<'a> BufCommand<'a> {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let encoded: Result<(u8, &[u8]), Error<DI::Error>> = match self {
            BufCommand::SetGrayScaleTable(table) => {
                // Each element must be greater than the previous one, and all must be
                // between 0 and 180.
                let ok = table.len() == GRAY_SCALE_LEVELS
                    && table[1..]
                        .iter()
                        .fold((table[0] <= GRAY_SCALE_MAX, table[0]), |(ok_so_far, prev), cur| {
                            (ok_so_far && prev < *cur && *cur <= GRAY_SCALE_MAX, *cur)
                        })
                        .0;
                if ok {
                    Ok((0xB8, table))
                } else {
                    Err(Error::InvalidParameter)
                }
            }
            BufCommand::WriteImageData(buf) => Ok((0x5C, buf)),
        };
        let (cmd, data) = encoded?;
        transmit(iface, cmd, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::TestSpyInterface;
    use std::vec::Vec;

    #[test]
    fn set_column_address() {
        let mut di = TestSpyInterface::new();
        Command::SetColumnAddress(28, 91).send(&mut di).unwrap();
        di.check(0x15, &[28, 91]);
        di.clear();
        assert_eq!(
            Command::SetColumnAddress(120, 42).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Command::SetColumnAddress(23, 255).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert!(di.is_idle());
    }

    #[test]
    fn set_row_address() {
        let mut di = TestSpyInterface::new();
        Command::SetRowAddress(23, 42).send(&mut di).unwrap();
        di.check(0x75, &[23, 42]);
        di.clear();
        assert_eq!(
            Command::SetRowAddress(128, 42).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert!(di.is_idle());
    }

    #[test]
    fn set_remapping() {
        let mut di = TestSpyInterface::new();
        Command::SetRemapping(
            ColumnRemap::Reverse,
            NibbleRemap::Forward,
            ComScanDirection::RowZeroLast,
            ComLayout::DualProgressive,
        )
        .send(&mut di)
        .unwrap();
        di.check(0xA0, &[0x16, 0x11]);

        di.clear();
        Command::SetRemapping(
            ColumnRemap::Forward,
            NibbleRemap::Forward,
            ComScanDirection::RowZeroFirst,
            ComLayout::DualProgressive,
        )
        .send(&mut di)
        .unwrap();
        di.check(0xA0, &[0x04, 0x11]);

        di.clear();
        Command::SetRemapping(
            ColumnRemap::Reverse,
            NibbleRemap::Forward,
            ComScanDirection::RowZeroLast,
            ComLayout::Interlaced,
        )
        .send(&mut di)
        .unwrap();
        di.check(0xA0, &[0x36, 0x01]);
    }

    #[test]
    fn write_image_data() {
        let mut di = TestSpyInterface::new();
        let image_buf = (0..24).collect::<Vec<u8>>();
        BufCommand::WriteImageData(&image_buf[..])
            .send(&mut di)
            .unwrap();
        di.check(0x5C, &(0..24u8).collect::<Vec<_>>()[..]);
        di.clear();
        BufCommand::WriteImageData(&[]).send(&mut di).unwrap();
        di.check(0x5C, &[]);
    }

    #[test]
    fn display_mode_and_sleep() {
        let mut di = TestSpyInterface::new();
        Command::SetDisplayMode(DisplayMode::Normal)
            .send(&mut di)
            .unwrap();
        di.check(0xA6, &[]);
        di.clear();
        Command::SetDisplayMode(DisplayMode::Inverse)
            .send(&mut di)
            .unwrap();
        di.check(0xA7, &[]);
        di.clear();
        Command::SetSleepMode(true).send(&mut di).unwrap();
        di.check(0xAE, &[]);
        di.clear();
        Command::SetSleepMode(false).send(&mut di).unwrap();
        di.check(0xAF, &[]);
    }

    #[test]
    fn vdd_regulator() {
        let mut di = TestSpyInterface::new();
        Command::SetVddRegulator(true).send(&mut di).unwrap();
        di.check(0xAB, &[0x01]);
        di.clear();
        Command::SetVddRegulator(false).send(&mut di).unwrap();
        di.check(0xAB, &[0x00]);
    }

    #[test]
    fn set_phase_lengths() {
        let mut di = TestSpyInterface::new();
        Command::SetPhaseLengths(5, 15).send(&mut di).unwrap();
        di.check(0xB1, &[0xF2]);
        di.clear();
        Command::SetPhaseLengths(7, 3).send(&mut di).unwrap();
        di.check(0xB1, &[0x33]);
        di.clear();
        assert_eq!(
            Command::SetPhaseLengths(4, 3).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Command::SetPhaseLengths(5, 16).send(&mut di),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn set_clock_fosc_divset() {
        let mut di = TestSpyInterface::new();
        Command::SetClockFoscDivset(9, 1).send(&mut di).unwrap();
        di.check(0xB3, &[0x91]);
        di.clear();
        assert_eq!(
            Command::SetClockFoscDivset(0, 11).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Command::SetClockFoscDivset(16, 0).send(&mut di),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn set_display_enhancements() {
        let mut di = TestSpyInterface::new();
        Command::SetDisplayEnhancements(true, true)
            .send(&mut di)
            .unwrap();
        di.check(0xB4, &[0xA0, 0xFD]);
        di.clear();
        Command::SetDisplayEnhancements(false, false)
            .send(&mut di)
            .unwrap();
        di.check(0xB4, &[0xA2, 0xB5]);
    }

    #[test]
    fn voltages() {
        let mut di = TestSpyInterface::new();
        Command::SetPreChargeVoltage(0x1F).send(&mut di).unwrap();
        di.check(0xBB, &[0x1F]);
        di.clear();
        assert_eq!(
            Command::SetPreChargeVoltage(0x20).send(&mut di),
            Err(Error::InvalidParameter)
        );
        Command::SetComDeselectVoltage(4).send(&mut di).unwrap();
        di.check(0xBE, &[4]);
        di.clear();
        assert_eq!(
            Command::SetComDeselectVoltage(8).send(&mut di),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn contrast() {
        let mut di = TestSpyInterface::new();
        Command::SetContrastCurrent(0x7F).send(&mut di).unwrap();
        di.check(0xC1, &[0x7F]);
        di.clear();
        Command::SetMasterContrast(0x0F).send(&mut di).unwrap();
        di.check(0xC7, &[0x0F]);
        di.clear();
        assert_eq!(
            Command::SetMasterContrast(16).send(&mut di),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn set_mux_ratio() {
        let mut di = TestSpyInterface::new();
        Command::SetMuxRatio(64).send(&mut di).unwrap();
        di.check(0xCA, &[63]);
        di.clear();
        assert_eq!(
            Command::SetMuxRatio(15).send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            Command::SetMuxRatio(129).send(&mut di),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn set_command_lock() {
        let mut di = TestSpyInterface::new();
        Command::SetCommandLock(false).send(&mut di).unwrap();
        di.check(0xFD, &[0x12]);
        di.clear();
        Command::SetCommandLock(true).send(&mut di).unwrap();
        di.check(0xFD, &[0x16]);
    }

    #[test]
    fn set_gray_scale_table() {
        let mut di = TestSpyInterface::new();
        BufCommand::SetGrayScaleTable(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14])
            .send(&mut di)
            .unwrap();
        di.check(0xB8, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]);
        di.clear();
        // Out of range
        assert_eq!(
            BufCommand::SetGrayScaleTable(&[
                166, 167, 168, 169, 170, 171, 172, 173, 174, 175, 176, 177, 178, 179, 181,
            ])
            .send(&mut di),
            Err(Error::InvalidParameter)
        );
        // Non-increasing
        assert_eq!(
            BufCommand::SetGrayScaleTable(&[0, 1, 2, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14])
                .send(&mut di),
            Err(Error::InvalidParameter)
        );
        // Too few values
        assert_eq!(
            BufCommand::SetGrayScaleTable(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13])
                .send(&mut di),
            Err(Error::InvalidParameter)
        );
        assert!(di.is_idle());
    }

    #[test]
    fn bus_failure_propagates() {
        use crate::interface::test_spy::BusFault;
        let mut di = TestSpyInterface::new();
        di.fail_after(1);
        assert_eq!(
            Command::SetColumnAddress(28, 91).send(&mut di),
            Err(Error::BusTransferFailed(BusFault))
        );
    }
}
