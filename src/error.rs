//! The error type returned by every driver operation.

use crate::gamma::CurveError;

/// Errors from the driver, generic over the error type `BusE` of the underlying
/// `DisplayInterface`.
///
/// Nothing is retried at this layer. A failure in the middle of a multi-command operation leaves
/// the controller in whatever state the commands sent so far put it in; `Display::init` can be run
/// again to get back to a known configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<BusE> {
    /// The interface failed to transfer a command byte or a data burst. Carries the interface
    /// error unchanged.
    BusTransferFailed(BusE),
    /// A grayscale curve was rejected. No register write was made.
    InvalidCurve(CurveError),
    /// The transmit scratch buffer has not been allocated, or the framebuffer view is empty.
    BufferUnavailable,
    /// A command parameter, window coordinate or framebuffer span was out of range.
    InvalidParameter,
    /// The display has not completed `Display::init`.
    NotInitialized,
    /// The panel variant has no such control.
    Unsupported,
}

impl<BusE> From<CurveError> for Error<BusE> {
    fn from(err: CurveError) -> Self {
        Error::InvalidCurve(err)
    }
}
