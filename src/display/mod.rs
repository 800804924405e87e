//! The main API to the display driver: power-up, blanking, grayscale and precharge programming,
//! and pushing framebuffer contents to the panel.

pub mod encoder;
pub mod window;

use alloc::boxed::Box;
use alloc::vec;

use crate::command::*;
use crate::config::{ColumnAddressing, Config};
use crate::display::encoder::FramebufferView;
use crate::display::window::AddressWindow;
use crate::error::Error;
use crate::gamma::GrayscaleCurve;
use crate::interface;
use crate::panel::Panel;

/// Where the display is in its lifecycle. There is no `Destroyed` state: `Display::release`
/// consumes the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// `init` has not been run, or the last attempt failed.
    Uninitialized,
    /// `init` is sending the power-up sequence.
    Initializing,
    /// Showing display RAM.
    On,
    /// Panel output switched off; display RAM is kept.
    Blanked,
}

/// A driver for one SSD1322 panel.
///
/// The driver owns its interface and transmit scratch buffer, and every operation blocks until its
/// bus transfers finish. Drive several panels from several `Display`s.
pub struct Display<DI>
where
    DI: interface::DisplayInterface,
{
    iface: DI,
    panel: Panel,
    state: PowerState,
    column_addressing: ColumnAddressing,
    gamma: GrayscaleCurve,
    scratch: Option<Box<[u8]>>,
}

impl<DI> Display<DI>
where
    DI: interface::DisplayInterface,
{
    /// Construct a new display driver for `panel`, connected to the interface `iface`. Nothing is
    /// sent until `init`.
    pub fn new(iface: DI, panel: Panel) -> Self {
        Display {
            iface,
            panel,
            state: PowerState::Uninitialized,
            column_addressing: ColumnAddressing::Fixed,
            gamma: panel.default_gamma,
            scratch: None,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// The curve most recently programmed into the controller, or the panel default before that.
    pub fn gamma(&self) -> &GrayscaleCurve {
        &self.gamma
    }

    /// Run the power-up sequence, program the grayscale curve and allocate the transmit scratch
    /// buffer. The panel should have been reset first (see `interface::reset_panel`).
    ///
    /// May be called again to re-apply a configuration, e.g. to change the rotation.
    pub fn init(&mut self, config: Config) -> Result<(), Error<DI::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1322: init, rotation {}", config.rotation);

        self.state = PowerState::Initializing;
        self.scratch = None;
        match self.power_up(&config) {
            Ok(()) => {
                self.column_addressing = config.column_addressing;
                self.scratch = Some(vec![0u8; self.panel.scratch_len()].into_boxed_slice());
                self.state = PowerState::On;
                Ok(())
            }
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("ssd1322: init failed");
                self.state = PowerState::Uninitialized;
                Err(err)
            }
        }
    }

    fn power_up(&mut self, config: &Config) -> Result<(), Error<DI::Error>> {
        let iface = &mut self.iface;
        Command::SetCommandLock(false).send(iface)?;
        Command::SetSleepMode(true).send(iface)?;
        Command::SetDefaultGrayScaleTable.send(iface)?;
        config.send_clock(iface)?;
        Command::SetMuxRatio(self.panel.height as u8).send(iface)?;
        Command::SetDisplayOffset(0).send(iface)?;
        Command::SetStartLine(0).send(iface)?;
        config.rotation.remapping(config.com_layout).send(iface)?;
        config.send_drive(iface)?;
        Command::SetDisplayMode(config.display_mode).send(iface)?;
        Command::SetSleepMode(false).send(iface)?;
        let curve = config.gamma.unwrap_or(self.panel.default_gamma);
        self.program_gamma(curve)
    }

    /// Validate `curve` and, only if every step passes, write it to the grayscale table. See
    /// `GrayscaleCurve::levels` for the rules.
    pub fn program_gamma<C>(&mut self, curve: C) -> Result<(), Error<DI::Error>>
    where
        C: Into<GrayscaleCurve>,
    {
        let curve = curve.into();
        curve.program(&mut self.iface)?;
        self.gamma = curve;
        Ok(())
    }

    /// Set the precharge voltage, 0x00 to 0x1F. Only panels with precharge control accept this.
    pub fn program_precharge(&mut self, level: u8) -> Result<(), Error<DI::Error>> {
        if !self.panel.precharge_control {
            return Err(Error::Unsupported);
        }
        Command::SetPreChargeVoltage(level).send(&mut self.iface)
    }

    /// Switch the panel output off (`true`) or back on (`false`). Display RAM is kept.
    pub fn blank(&mut self, on: bool) -> Result<(), Error<DI::Error>> {
        self.require_initialized()?;
        Command::SetSleepMode(on).send(&mut self.iface)?;
        self.state = if on {
            PowerState::Blanked
        } else {
            PowerState::On
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("ssd1322: {}", self.state);
        Ok(())
    }

    /// Show display RAM normally or inverted, or force every pixel fully off or on without
    /// touching display RAM.
    pub fn display_mode(&mut self, mode: DisplayMode) -> Result<(), Error<DI::Error>> {
        self.require_initialized()?;
        Command::SetDisplayMode(mode).send(&mut self.iface)
    }

    /// Control the master contrast, 0 (dimmest) to 15.
    pub fn contrast(&mut self, contrast: u8) -> Result<(), Error<DI::Error>> {
        Command::SetMasterContrast(contrast).send(&mut self.iface)
    }

    /// Point the controller at the inclusive pixel rectangle `xs,ys`-`xe,ye` for the next image
    /// data. Unless partial column addressing was configured, the full width is addressed
    /// whatever `xs` and `xe` are.
    pub fn set_window(
        &mut self,
        xs: u16,
        ys: u16,
        xe: u16,
        ye: u16,
    ) -> Result<AddressWindow, Error<DI::Error>> {
        self.require_initialized()?;
        let window =
            AddressWindow::resolve(&self.panel, self.column_addressing, xs, ys, xe, ye)
                .ok_or(Error::InvalidParameter)?;
        window.send(&mut self.iface)?;
        Ok(window)
    }

    /// Encode the framebuffer bytes `[offset, offset + len)` and send them as image data into the
    /// current window.
    ///
    /// The whole span is encoded into the scratch buffer before anything goes on the bus, so a
    /// span that cannot be encoded leaves the panel showing the previous frame.
    pub fn flush(
        &mut self,
        framebuffer: &FramebufferView<'_>,
        offset: usize,
        len: usize,
    ) -> Result<(), Error<DI::Error>> {
        let scratch = match self.scratch.as_mut() {
            Some(scratch) if !framebuffer.is_empty() => scratch,
            _ => return Err(Error::BufferUnavailable),
        };
        if framebuffer.format() != self.panel.source_format {
            return Err(Error::InvalidParameter);
        }
        let produced =
            encoder::encode_span::<DI::Error>(framebuffer, &self.panel, offset, len, scratch)?;
        if produced == 0 {
            return Ok(());
        }
        #[cfg(feature = "defmt")]
        defmt::trace!("ssd1322: flush {} bytes at {}", produced, offset);
        self.iface
            .send_data(&scratch[..produced])
            .map_err(Error::BusTransferFailed)
    }

    /// Redraw the whole panel.
    pub fn update(&mut self, framebuffer: &FramebufferView<'_>) -> Result<(), Error<DI::Error>> {
        self.update_rows(framebuffer, 0, self.panel.height - 1)
    }

    /// Redraw the full-width rows `first_row` to `last_row` inclusive.
    pub fn update_rows(
        &mut self,
        framebuffer: &FramebufferView<'_>,
        first_row: u16,
        last_row: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_initialized()?;
        if framebuffer.is_empty() {
            return Err(Error::BufferUnavailable);
        }
        let window = AddressWindow::resolve(
            &self.panel,
            ColumnAddressing::Fixed,
            0,
            first_row,
            self.panel.width - 1,
            last_row,
        )
        .ok_or(Error::InvalidParameter)?;
        let offset = first_row as usize * framebuffer.line_length();
        let len = (last_row - first_row + 1) as usize * framebuffer.line_length();
        window.send(&mut self.iface)?;
        self.flush(framebuffer, offset, len)
    }

    /// Redraw the inclusive pixel rectangle `xs,ys`-`xe,ye`. Needs partial column addressing;
    /// the rectangle is widened to whole column addresses.
    pub fn update_area(
        &mut self,
        framebuffer: &FramebufferView<'_>,
        xs: u16,
        ys: u16,
        xe: u16,
        ye: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_initialized()?;
        if self.column_addressing != ColumnAddressing::Partial {
            return Err(Error::Unsupported);
        }
        let scratch = match self.scratch.as_mut() {
            Some(scratch) if !framebuffer.is_empty() => scratch,
            _ => return Err(Error::BufferUnavailable),
        };
        if framebuffer.format() != self.panel.source_format {
            return Err(Error::InvalidParameter);
        }
        let window = AddressWindow::resolve(&self.panel, ColumnAddressing::Partial, xs, ys, xe, ye)
            .ok_or(Error::InvalidParameter)?;
        let (first_col, last_col) = window.pixel_cols();
        let produced = encoder::encode_rect::<DI::Error>(
            framebuffer,
            u16::from(window.row_start)..=u16::from(window.row_end),
            first_col..=last_col,
            scratch,
        )?;
        window.send(&mut self.iface)?;
        self.iface
            .send_data(&scratch[..produced])
            .map_err(Error::BusTransferFailed)
    }

    /// Tear the driver down, freeing the scratch buffer, and hand back the interface.
    pub fn release(self) -> DI {
        self.iface
    }

    fn require_initialized(&self) -> Result<(), Error<DI::Error>> {
        match self.state {
            PowerState::On | PowerState::Blanked => Ok(()),
            PowerState::Uninitialized | PowerState::Initializing => Err(Error::NotInitialized),
        }
    }
}
