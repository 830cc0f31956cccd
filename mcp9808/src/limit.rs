use core::convert::{From, TryFrom};
use core::fmt;

use crate::temp::Temperature;
use crate::Register;

/// One of the three alert limit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Threshold {
    /// `TUPPER`, pointer `0x02`.
    Upper,
    /// `TLOWER`, pointer `0x03`.
    Lower,
    /// `TCRIT`, pointer `0x04`.
    Critical,
}

impl From<Threshold> for Register {
    fn from(which: Threshold) -> Register {
        match which {
            Threshold::Upper => Register::UpperLimit,
            Threshold::Lower => Register::LowerLimit,
            Threshold::Critical => Register::CriticalLimit,
        }
    }
}

/// An alert window: Tlower strictly below Tupper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Limits(Temperature, Temperature);

impl Limits {
    pub fn lower(&self) -> Temperature {
        self.0
    }

    pub fn upper(&self) -> Temperature {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitError {
    LowerOutOfRange,
    UpperOutOfRange,
    LowerExceedsUpper,
}

impl fmt::Display for LimitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LimitError::LowerOutOfRange => write!(f, "lower limit out of range"),
            LimitError::UpperOutOfRange => write!(f, "upper limit out of range"),
            LimitError::LowerExceedsUpper => {
                write!(f, "lower limit must be below the upper limit")
            }
        }
    }
}

impl TryFrom<(Temperature, Temperature)> for Limits {
    type Error = LimitError;

    fn try_from(val: (Temperature, Temperature)) -> Result<Self, Self::Error> {
        if val.0 >= val.1 {
            Err(LimitError::LowerExceedsUpper)
        } else {
            Ok(Limits(val.0, val.1))
        }
    }
}

impl TryFrom<(f32, f32)> for Limits {
    type Error = LimitError;

    fn try_from(val: (f32, f32)) -> Result<Self, Self::Error> {
        let lower = Temperature::try_from(val.0).map_err(|_| LimitError::LowerOutOfRange)?;
        let upper = Temperature::try_from(val.1).map_err(|_| LimitError::UpperOutOfRange)?;

        Limits::try_from((lower, upper))
    }
}

impl From<Limits> for (Temperature, Temperature) {
    fn from(limits: Limits) -> (Temperature, Temperature) {
        (limits.0, limits.1)
    }
}
