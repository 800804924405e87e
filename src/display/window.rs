//! The addressing window: which controller rows and columns the next pixel data lands in.
//!
//! Every framebuffer pixel goes out as one nibble-doubled byte, so it fills half of a 4-segment
//! column address. The 128 pixel wide panel therefore spans 64 column addresses, which on this
//! module are wired starting at column 28.

use crate::command::{BufCommand, Command};
use crate::config::ColumnAddressing;
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::panel::Panel;

/// First column address of the visible area.
pub const FIXED_COLUMN_START: u8 = 28;
/// Last column address of the visible area.
pub const FIXED_COLUMN_END: u8 = 91;

/// Framebuffer pixels per column address once nibble-doubled.
const PIXELS_PER_COLUMN: u16 = 2;

/// A rectangle in controller address space, all bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressWindow {
    pub col_start: u8,
    pub col_end: u8,
    pub row_start: u8,
    pub row_end: u8,
}

impl AddressWindow {
    /// Map an inclusive pixel rectangle onto controller addresses. Rows are taken verbatim.
    /// Under `ColumnAddressing::Fixed` the requested columns are ignored and the full width is
    /// addressed.
    pub(crate) fn resolve(
        panel: &Panel,
        addressing: ColumnAddressing,
        xs: u16,
        ys: u16,
        xe: u16,
        ye: u16,
    ) -> Option<Self> {
        if ys > ye || ye >= panel.height {
            return None;
        }
        let (col_start, col_end) = match addressing {
            ColumnAddressing::Fixed => (FIXED_COLUMN_START, FIXED_COLUMN_END),
            ColumnAddressing::Partial => {
                if xs > xe || xe >= panel.width {
                    return None;
                }
                (
                    FIXED_COLUMN_START + (xs / PIXELS_PER_COLUMN) as u8,
                    FIXED_COLUMN_START + (xe / PIXELS_PER_COLUMN) as u8,
                )
            }
        };
        Some(AddressWindow {
            col_start,
            col_end,
            row_start: ys as u8,
            row_end: ye as u8,
        })
    }

    /// First and last framebuffer pixel column covered by this window. Under partial addressing
    /// this widens an odd-aligned request to whole column addresses.
    pub(crate) fn pixel_cols(&self) -> (u16, u16) {
        let first = u16::from(self.col_start - FIXED_COLUMN_START) * PIXELS_PER_COLUMN;
        let last = u16::from(self.col_end - FIXED_COLUMN_START + 1) * PIXELS_PER_COLUMN - 1;
        (first, last)
    }

    /// Program the column and row ranges and leave the controller waiting for image data.
    pub(crate) fn send<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        Command::SetColumnAddress(self.col_start, self.col_end).send(iface)?;
        Command::SetRowAddress(self.row_start, self.row_end).send(iface)?;
        BufCommand::WriteImageData(&[]).send(iface)
    }
}
