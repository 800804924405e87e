//! The grayscale lookup table.
//!
//! A curve is given as 15 *relative* steps, one per grayscale level GS1-GS15. The controller wants
//! absolute pulse widths, so the steps are accumulated into a running total. The total drive may
//! never pass 180 DCLKs, and every level after GS1 must be strictly brighter than the one before,
//! i.e. every step from the second on is at least 1.

use core::fmt;
use core::str::FromStr;

use crate::command::consts::{GRAY_SCALE_LEVELS, GRAY_SCALE_MAX};
use crate::command::{BufCommand, Command};
use crate::error::Error;
use crate::interface::DisplayInterface;

/// The curve applied when the configuration does not supply one.
pub const DEFAULT_CURVE: GrayscaleCurve =
    GrayscaleCurve::new([1, 1, 1, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6]);

/// Which rule a curve broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CurveViolation {
    /// A step after the first was zero, so two levels would be equally bright.
    ZeroStep,
    /// The accumulated drive went past 180.
    ExceedsMaximum,
}

/// Where and why a curve was rejected. For `ZeroStep`, `value` is the step itself; for
/// `ExceedsMaximum` it is the accumulated total at `index`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurveError {
    pub index: usize,
    pub value: u32,
    pub violation: CurveViolation,
}

/// Fifteen relative brightness steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GrayscaleCurve {
    steps: [u32; GRAY_SCALE_LEVELS],
}

impl GrayscaleCurve {
    /// Wrap a set of steps. Nothing is checked until the curve is turned into levels.
    pub const fn new(steps: [u32; GRAY_SCALE_LEVELS]) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[u32; GRAY_SCALE_LEVELS] {
        &self.steps
    }

    /// Accumulate the steps into the absolute levels sent to the controller, stopping at the first
    /// step that breaks a rule.
    pub fn levels(&self) -> Result<[u8; GRAY_SCALE_LEVELS], CurveError> {
        let mut levels = [0u8; GRAY_SCALE_LEVELS];
        let mut acc: u32 = 0;
        for (index, (&step, level)) in self.steps.iter().zip(levels.iter_mut()).enumerate() {
            if index > 0 && step < 1 {
                return Err(CurveError {
                    index,
                    value: step,
                    violation: CurveViolation::ZeroStep,
                });
            }
            acc = acc.saturating_add(step);
            if acc > u32::from(GRAY_SCALE_MAX) {
                return Err(CurveError {
                    index,
                    value: acc,
                    violation: CurveViolation::ExceedsMaximum,
                });
            }
            *level = acc as u8;
        }
        Ok(levels)
    }

    /// Validate the whole curve, then write the table and enable it. Nothing is sent if the curve
    /// is invalid.
    pub(crate) fn program<DI>(&self, iface: &mut DI) -> Result<(), Error<DI::Error>>
    where
        DI: DisplayInterface,
    {
        let levels = self.levels().map_err(|err| {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "rejected grayscale curve at index {}: value {}",
                err.index,
                err.value
            );
            err
        })?;
        BufCommand::SetGrayScaleTable(&levels).send(iface)?;
        Command::EnableGrayScaleTable.send(iface)
    }
}

impl Default for GrayscaleCurve {
    fn default() -> Self {
        DEFAULT_CURVE
    }
}

impl From<[u32; GRAY_SCALE_LEVELS]> for GrayscaleCurve {
    fn from(steps: [u32; GRAY_SCALE_LEVELS]) -> Self {
        Self::new(steps)
    }
}

/// Failure to read a curve from text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseCurveError {
    /// The text did not hold exactly 15 values; carries how many were found (capped at 16).
    WrongCount(usize),
    /// The token at this position is not an unsigned decimal number.
    BadValue(usize),
}

impl fmt::Display for ParseCurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCurveError::WrongCount(n) => {
                write!(f, "expected {} curve values, found {}", GRAY_SCALE_LEVELS, n)
            }
            ParseCurveError::BadValue(i) => write!(f, "curve value {} is not a number", i),
        }
    }
}

/// Parses whitespace separated decimal steps, e.g. `"1 1 1 1 1 2 2 3 3 4 4 5 5 6 6"`.
impl FromStr for GrayscaleCurve {
    type Err = ParseCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps = [0u32; GRAY_SCALE_LEVELS];
        let mut count = 0;
        for (i, token) in s.split_whitespace().enumerate() {
            if i >= GRAY_SCALE_LEVELS {
                return Err(ParseCurveError::WrongCount(GRAY_SCALE_LEVELS + 1));
            }
            steps[i] = token.parse().map_err(|_| ParseCurveError::BadValue(i))?;
            count += 1;
        }
        if count != GRAY_SCALE_LEVELS {
            return Err(ParseCurveError::WrongCount(count));
        }
        Ok(Self::new(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};
    use proptest::prelude::*;

    #[test]
    fn default_curve_levels() {
        assert_eq!(
            DEFAULT_CURVE.levels(),
            Ok([1, 2, 3, 4, 5, 7, 9, 12, 15, 19, 23, 28, 33, 39, 45])
        );
    }

    #[test]
    fn first_step_may_be_zero() {
        let curve = GrayscaleCurve::new([0, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8]);
        assert_eq!(
            curve.levels(),
            Ok([0, 8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 96, 104, 112])
        );
    }

    #[test]
    fn zero_step_rejected_at_its_index() {
        let curve = GrayscaleCurve::new([1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(
            curve.levels(),
            Err(CurveError {
                index: 5,
                value: 0,
                violation: CurveViolation::ZeroStep,
            })
        );
    }

    #[test]
    fn overflow_rejected_with_total() {
        let curve = GrayscaleCurve::new([100, 50, 30, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        // 100 + 50 + 30 = 180 is still fine, the next step tips it over.
        assert_eq!(
            curve.levels(),
            Err(CurveError {
                index: 3,
                value: 181,
                violation: CurveViolation::ExceedsMaximum,
            })
        );
        let huge = GrayscaleCurve::new([u32::MAX, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(huge.levels().unwrap_err().index, 0);
    }

    #[test]
    fn exactly_180_accepted() {
        let curve = GrayscaleCurve::new([166, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(curve.levels().unwrap()[14], 180);
    }

    #[test]
    fn program_sends_table_then_enable() {
        let mut di = TestSpyInterface::new();
        DEFAULT_CURVE.program(&mut di).unwrap();
        di.check_multi(&[
            Sent::Cmd(0xB8),
            Sent::Data(vec![1, 2, 3, 4, 5, 7, 9, 12, 15, 19, 23, 28, 33, 39, 45]),
            Sent::Cmd(0x00),
        ]);
    }

    #[test]
    fn program_invalid_sends_nothing() {
        let mut di = TestSpyInterface::new();
        let curve = GrayscaleCurve::new([1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        match curve.program(&mut di) {
            Err(Error::InvalidCurve(err)) => assert_eq!(err.index, 5),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(di.is_idle());
    }

    #[test]
    fn parse_curve() {
        assert_eq!(
            "1 1 1 1 1 2 2 3 3 4 4 5 5 6 6".parse::<GrayscaleCurve>(),
            Ok(DEFAULT_CURVE)
        );
        assert_eq!(
            " 0\t8 8 8 8 8 8 8 8 8 8 8 8 8\n8 ".parse::<GrayscaleCurve>(),
            Ok(GrayscaleCurve::new([0, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8]))
        );
        assert_eq!(
            "1 1 1".parse::<GrayscaleCurve>(),
            Err(ParseCurveError::WrongCount(3))
        );
        assert_eq!(
            "1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1 1".parse::<GrayscaleCurve>(),
            Err(ParseCurveError::WrongCount(16))
        );
        assert_eq!(
            "1 1 x 1 1 1 1 1 1 1 1 1 1 1 1".parse::<GrayscaleCurve>(),
            Err(ParseCurveError::BadValue(2))
        );
        assert_eq!(
            "1 1 -1 1 1 1 1 1 1 1 1 1 1 1 1".parse::<GrayscaleCurve>(),
            Err(ParseCurveError::BadValue(2))
        );
    }

    /// Curves that satisfy the rules: a free first step, then steps of at least 1, scaled down so
    /// the total stays within 180.
    fn valid_curve() -> impl Strategy<Value = [u32; GRAY_SCALE_LEVELS]> {
        (0u32..=40, prop::array::uniform14(1u32..=10)).prop_map(|(first, rest)| {
            let mut steps = [first; GRAY_SCALE_LEVELS];
            steps[1..].copy_from_slice(&rest);
            steps
        })
    }

    proptest! {
        #[test]
        fn valid_curves_program_prefix_sums(steps in valid_curve()) {
            let levels = GrayscaleCurve::new(steps).levels().unwrap();
            let mut acc = 0;
            for (step, level) in steps.iter().zip(levels.iter()) {
                acc += step;
                prop_assert_eq!(u32::from(*level), acc);
            }
            prop_assert!(levels.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn zero_after_first_always_rejected(
            steps in valid_curve(),
            at in 1usize..GRAY_SCALE_LEVELS,
        ) {
            let mut steps = steps;
            steps[at] = 0;
            let mut di = TestSpyInterface::new();
            let err = GrayscaleCurve::new(steps).program(&mut di).unwrap_err();
            prop_assert_eq!(
                err,
                Error::InvalidCurve(CurveError { index: at, value: 0, violation: CurveViolation::ZeroStep })
            );
            prop_assert!(di.is_idle());
        }

        #[test]
        fn total_over_180_always_rejected(
            steps in prop::array::uniform15(1u32..=40),
        ) {
            let total: u32 = steps.iter().sum();
            let result = GrayscaleCurve::new(steps).levels();
            if total > 180 {
                let err = result.unwrap_err();
                prop_assert_eq!(err.violation, CurveViolation::ExceedsMaximum);
                prop_assert!(err.value > 180);
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
