//! Fixed descriptions of the supported panel variants.
//!
//! Both variants are the same 128x64 module; they differ only in what the framebuffer above the
//! driver holds and whether the precharge voltage may be tuned at runtime.

use crate::gamma::{GrayscaleCurve, DEFAULT_CURVE};

/// Byte order of 16-bit framebuffer pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endian {
    Little,
    Big,
}

/// Native pixel representation of the framebuffer handed to the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceFormat {
    /// 4-bit grayscale, two pixels per byte, left pixel in the low nibble.
    Gray4,
    /// 16-bit color; only the most significant byte is used, as a coarse luma.
    Rgb565(Endian),
}

impl SourceFormat {
    pub fn bits_per_pixel(&self) -> u8 {
        match self {
            SourceFormat::Gray4 => 4,
            SourceFormat::Rgb565(_) => 16,
        }
    }

    /// Bytes in one framebuffer row `width` pixels wide.
    pub fn line_length(&self, width: u16) -> usize {
        width as usize * self.bits_per_pixel() as usize / 8
    }
}

/// Geometry and capabilities of one display variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Panel {
    pub width: u16,
    pub height: u16,
    /// Width of a register address on the bus, in bits.
    pub register_width: u8,
    /// Grayscale depth of the controller.
    pub bits_per_pixel: u8,
    pub default_gamma: GrayscaleCurve,
    pub source_format: SourceFormat,
    /// Whether `Display::program_precharge` is offered.
    pub precharge_control: bool,
}

/// 128x64 module fed from a packed 4-bit grayscale framebuffer.
pub const SSD1322_128X64_GRAY4: Panel = Panel {
    width: 128,
    height: 64,
    register_width: 8,
    bits_per_pixel: 4,
    default_gamma: DEFAULT_CURVE,
    source_format: SourceFormat::Gray4,
    precharge_control: false,
};

/// 128x64 module fed from a little-endian RGB565 framebuffer, with runtime precharge control.
pub const SSD1322_128X64_RGB565: Panel = Panel {
    width: 128,
    height: 64,
    register_width: 8,
    bits_per_pixel: 4,
    default_gamma: DEFAULT_CURVE,
    source_format: SourceFormat::Rgb565(Endian::Little),
    precharge_control: true,
};

impl Panel {
    /// Bytes per framebuffer row.
    pub fn line_length(&self) -> usize {
        self.source_format.line_length(self.width)
    }

    /// Size of a whole framebuffer in the panel's source format.
    pub fn framebuffer_len(&self) -> usize {
        self.line_length() * self.height as usize
    }

    /// Size of the transmit scratch buffer: one byte on the wire for every pixel.
    pub fn scratch_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray4_sizes() {
        let p = SSD1322_128X64_GRAY4;
        assert_eq!(p.line_length(), 64);
        assert_eq!(p.framebuffer_len(), 4096);
        // Nibble doubling: twice the framebuffer.
        assert_eq!(p.scratch_len(), 2 * p.framebuffer_len());
    }

    #[test]
    fn rgb565_sizes() {
        let p = SSD1322_128X64_RGB565;
        assert_eq!(p.line_length(), 256);
        assert_eq!(p.framebuffer_len(), 16384);
        assert_eq!(p.scratch_len(), 8192);
    }
}
