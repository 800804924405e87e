//! The bus plumbing underneath the command layer: a trait for anything that can carry SSD1322
//! command bytes and data bursts, and its implementation for 4-wire SPI.

use hal::blocking::delay::DelayMs;
use hal::digital::v2::OutputPin;

pub trait DisplayInterface {
    type Error;

    /// Send one register address byte with the D/C line in the command state.
    fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error>;
    /// Send a contiguous burst of parameter or pixel bytes with the D/C line in the data state.
    fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;
}

/// Pulse the active-low /RESET line of the panel and wait for the controller to come back up.
///
/// The driver does not own the reset pin, so this is left to the caller to run before
/// `Display::init`.
pub fn reset_panel<RST, DLY>(rst: &mut RST, delay: &mut DLY) -> Result<(), RST::Error>
where
    RST: OutputPin,
    DLY: DelayMs<u8>,
{
    rst.set_low()?;
    delay.delay_ms(1);
    rst.set_high()?;
    delay.delay_ms(120);
    Ok(())
}

pub mod spi {
    //! The SPI interface supports the "4-wire" interface of the driver, such that each word on the
    //! SPI bus is 8 bits. The "3-wire" mode replaces the D/C GPIO with a 9th bit on each word,
    //! which seems really awkward to implement with embedded_hal SPI.

    use super::DisplayInterface;

    /// Failure of one of the two signals making up the interface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum SpiInterfaceError<SpiE, PinE> {
        /// The SPI write itself failed.
        Spi(SpiE),
        /// The D/C GPIO could not be driven.
        DataCommandPin(PinE),
    }

    pub struct SpiInterface<SPI, DC> {
        /// The SPI master device connected to the SSD1322.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the SSD1322 (the fourth
        /// "wire" of "4-wire" mode).
        dc: DC,
    }

    impl<SPI, DC> SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        /// Create a new SPI interface to communicate with the display driver. `spi` is the SPI
        /// master device, and `dc` is the GPIO output pin connected to the D/C pin of the SSD1322.
        pub fn new(spi: SPI, dc: DC) -> Self {
            Self { spi, dc }
        }

        /// Give back the SPI device and D/C pin.
        pub fn release(self) -> (SPI, DC) {
            (self.spi, self.dc)
        }
    }

    impl<SPI, DC> DisplayInterface for SpiInterface<SPI, DC>
    where
        SPI: hal::blocking::spi::Write<u8>,
        DC: hal::digital::v2::OutputPin,
    {
        type Error = SpiInterfaceError<SPI::Error, DC::Error>;

        fn send_command(&mut self, cmd: u8) -> Result<(), Self::Error> {
            self.dc.set_low().map_err(SpiInterfaceError::DataCommandPin)?;
            self.spi.write(&[cmd]).map_err(SpiInterfaceError::Spi)
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
            self.dc.set_high().map_err(SpiInterfaceError::DataCommandPin)?;
            self.spi.write(buf).map_err(SpiInterfaceError::Spi)
        }
    }
}

#[cfg(test)]
pub mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it.

    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec::Vec;

    use super::DisplayInterface;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Cmd(u8),
        Data(Vec<u8>),
    }

    /// Error produced by the spy when a fault has been injected.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BusFault;

    /// Records every transfer. Clones made with `split` share the same log, so a test can hand one
    /// to a `Display` and keep the other to inspect.
    pub struct TestSpyInterface {
        sent: Rc<RefCell<Vec<Sent>>>,
        fail_after: Rc<Cell<Option<usize>>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                sent: Rc::new(RefCell::new(Vec::new())),
                fail_after: Rc::new(Cell::new(None)),
            }
        }

        pub fn split(&self) -> Self {
            TestSpyInterface {
                sent: self.sent.clone(),
                fail_after: self.fail_after.clone(),
            }
        }

        /// Check that exactly one command, with `data` as its parameters, was sent.
        pub fn check(&self, cmd: u8, data: &[u8]) {
            let mut expect = vec![Sent::Cmd(cmd)];
            if !data.is_empty() {
                expect.push(Sent::Data(data.to_vec()));
            }
            assert_eq!(*self.sent.borrow(), expect);
        }

        pub fn check_multi(&self, expect: &[Sent]) {
            assert_eq!(&self.sent.borrow()[..], expect);
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.borrow().clone()
        }

        pub fn is_idle(&self) -> bool {
            self.sent.borrow().is_empty()
        }

        pub fn clear(&mut self) {
            self.sent.borrow_mut().clear()
        }

        /// Let `n` more transfers succeed, then fail every one after that.
        pub fn fail_after(&mut self, n: usize) {
            self.fail_after.set(Some(n));
        }

        fn transfer(&self, sent: Sent) -> Result<(), BusFault> {
            match self.fail_after.get() {
                Some(0) => return Err(BusFault),
                Some(n) => self.fail_after.set(Some(n - 1)),
                None => {}
            }
            self.sent.borrow_mut().push(sent);
            Ok(())
        }
    }

    impl DisplayInterface for TestSpyInterface {
        type Error = BusFault;

        fn send_command(&mut self, cmd: u8) -> Result<(), BusFault> {
            self.transfer(Sent::Cmd(cmd))
        }
        fn send_data(&mut self, data: &[u8]) -> Result<(), BusFault> {
            self.transfer(Sent::Data(data.to_vec()))
        }
    }
}
