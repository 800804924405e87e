//! Driver core for 128x64 panels built on the Solomon Systech SSD1322 grayscale OLED controller,
//! fed from an in-memory framebuffer.

#![cfg_attr(not(test), no_std)]

extern crate alloc;
extern crate embedded_hal as hal;

pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod gamma;
pub mod interface;
pub mod panel;

// Re-exports for primary API.
pub use command::{ComLayout, DisplayMode};
pub use config::{ColumnAddressing, Config, Rotation};
pub use display::encoder::FramebufferView;
pub use display::window::AddressWindow;
pub use display::{Display, PowerState};
pub use error::Error;
pub use gamma::{CurveError, CurveViolation, GrayscaleCurve, DEFAULT_CURVE};
pub use interface::spi::{SpiInterface, SpiInterfaceError};
pub use interface::{reset_panel, DisplayInterface};
pub use panel::{Endian, Panel, SourceFormat, SSD1322_128X64_GRAY4, SSD1322_128X64_RGB565};
