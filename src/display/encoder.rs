//! Conversion of framebuffer pixels into the bytes sent to the controller.
//!
//! The controller packs two 4-bit pixels per byte, but the link to this panel carries a single
//! pixel per byte. Each pixel's nibble is therefore written into both halves of its own byte
//! ("nibble doubling"), so the scratch buffer holds one byte per pixel.

use core::ops::RangeInclusive;

use itertools::iproduct;

use crate::error::Error;
use crate::panel::{Endian, Panel, SourceFormat};

/// A borrowed view of the pixel plane, in its native format.
#[derive(Clone, Copy, Debug)]
pub struct FramebufferView<'fb> {
    bytes: &'fb [u8],
    format: SourceFormat,
    line_length: usize,
}

impl<'fb> FramebufferView<'fb> {
    /// View `bytes` as rows of `line_length` bytes in `format`.
    pub fn new(bytes: &'fb [u8], format: SourceFormat, line_length: usize) -> Self {
        Self {
            bytes,
            format,
            line_length,
        }
    }

    /// View `bytes` laid out exactly as `panel` expects, with no row padding.
    pub fn for_panel(bytes: &'fb [u8], panel: &Panel) -> Self {
        Self::new(bytes, panel.source_format, panel.line_length())
    }

    pub fn bytes(&self) -> &'fb [u8] {
        self.bytes
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The 4-bit intensity of the pixel at `row`, `col`, or `None` past the end of the buffer.
    fn intensity(&self, row: u16, col: u16) -> Option<u8> {
        let row_start = row as usize * self.line_length;
        match self.format {
            SourceFormat::Gray4 => {
                let byte = *self.bytes.get(row_start + col as usize / 2)?;
                Some(if col % 2 == 0 { byte & 0x0F } else { byte >> 4 })
            }
            SourceFormat::Rgb565(endian) => {
                let idx = row_start + col as usize * 2;
                let pair = [*self.bytes.get(idx)?, *self.bytes.get(idx + 1)?];
                let value = match endian {
                    Endian::Little => u16::from_le_bytes(pair),
                    Endian::Big => u16::from_be_bytes(pair),
                };
                // High byte as luma, top nibble of that as the gray level.
                Some((value >> 8) as u8 >> 4)
            }
        }
    }
}

/// Replicate the low nibble of `n` into both halves of a byte.
#[inline]
pub fn double_nibble(n: u8) -> u8 {
    let n = n & 0x0F;
    n | n << 4
}

/// Encode the framebuffer bytes `[offset, offset + len)` into `out`, returning how many output
/// bytes were produced.
///
/// Packed grayscale without row padding expands every source byte into two output bytes. Padded
/// grayscale rows and 16-bit sources are encoded a whole row at a time, covering every row the
/// span touches and skipping the padding.
pub(crate) fn encode_span<E>(
    view: &FramebufferView<'_>,
    panel: &Panel,
    offset: usize,
    len: usize,
    out: &mut [u8],
) -> Result<usize, Error<E>> {
    let end = offset.checked_add(len).ok_or(Error::InvalidParameter)?;
    if end > view.len() {
        return Err(Error::InvalidParameter);
    }
    if len == 0 {
        return Ok(0);
    }
    match view.format {
        SourceFormat::Gray4 if view.line_length <= panel.line_length() => {
            let produced = len * 2;
            if produced > out.len() {
                return Err(Error::InvalidParameter);
            }
            for (&byte, pair) in view.bytes[offset..end]
                .iter()
                .zip(out.chunks_exact_mut(2))
            {
                let left = byte & 0x0F;
                let right = byte & 0xF0;
                pair[0] = left | left << 4;
                pair[1] = right | right >> 4;
            }
            Ok(produced)
        }
        // Rows padded past the panel width, or 16-bit pixels: walk the visible pixels of every
        // row the span touches.
        _ => {
            let stride = view.line_length;
            if stride == 0 || panel.width == 0 || panel.height == 0 {
                return Err(Error::InvalidParameter);
            }
            let first_row = offset / stride;
            let last_row = ((end - 1) / stride).min(panel.height as usize - 1);
            if first_row > last_row {
                return Err(Error::InvalidParameter);
            }
            encode_rect(
                view,
                first_row as u16..=last_row as u16,
                0..=panel.width - 1,
                out,
            )
        }
    }
}

/// Encode the pixels of an inclusive rectangle into `out`, row by row, returning how many output
/// bytes were produced.
pub(crate) fn encode_rect<E>(
    view: &FramebufferView<'_>,
    rows: RangeInclusive<u16>,
    cols: RangeInclusive<u16>,
    out: &mut [u8],
) -> Result<usize, Error<E>> {
    let count = rows.clone().count() * cols.clone().count();
    if count > out.len() {
        return Err(Error::InvalidParameter);
    }
    for ((row, col), slot) in iproduct!(rows, cols).zip(out.iter_mut()) {
        let level = view.intensity(row, col).ok_or(Error::InvalidParameter)?;
        *slot = double_nibble(level);
    }
    Ok(count)
}
