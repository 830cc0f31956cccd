use core::convert::{From, TryFrom};
use core::fmt;

use fixed::types::I12F4;

/* Invariant: the wrapped value always fits the sensor's 13-bit two's-complement
format, i.e. -256.0 <= value <= 255.9375. Every constructor checks this. */

/** A temperature in degrees Celsius, with the MCP9808's native resolution of 1/16 °C.

Values are stored as [`I12F4`] fixed-point numbers. Construct one from an [`I12F4`] or an
[`f32`] with [`TryFrom`]. An [`f32`] is first truncated toward zero to a whole 1/16 °C step,
so 255.99 becomes 255.9375 and -256.05 becomes -256. The range check runs on the truncated
value: anything still outside -256 to 255.9375 °C is rejected with
[`ConversionError::OutOfRange`] rather than wrapped. */
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Default, Clone, Copy)]
pub struct Temperature(pub(crate) I12F4);

impl Temperature {
    /// The coldest representable temperature, -256 °C.
    pub const MIN: Temperature = Temperature(I12F4::from_bits(-4096));
    /// The warmest representable temperature, 255.9375 °C.
    pub const MAX: Temperature = Temperature(I12F4::from_bits(4095));

    /// Temperature as a float, in degrees Celsius.
    pub fn celsius(self) -> f32 {
        self.0.to_num::<f32>()
    }

    pub(crate) fn from_bits_unchecked(bits: i16) -> Self {
        Temperature(I12F4::from_bits(bits))
    }

    pub(crate) fn to_bits(self) -> i16 {
        self.0.to_bits()
    }

    fn from_bits(bits: i32) -> Result<Self, ConversionError> {
        if bits < i32::from(Self::MIN.to_bits()) || bits > i32::from(Self::MAX.to_bits()) {
            Err(ConversionError::OutOfRange)
        } else {
            Ok(Temperature::from_bits_unchecked(bits as i16))
        }
    }
}

impl From<Temperature> for I12F4 {
    fn from(temp: Temperature) -> Self {
        temp.0
    }
}

impl From<Temperature> for f32 {
    fn from(temp: Temperature) -> Self {
        temp.celsius()
    }
}

impl TryFrom<I12F4> for Temperature {
    type Error = ConversionError;

    fn try_from(val: I12F4) -> Result<Self, Self::Error> {
        Temperature::from_bits(i32::from(val.to_bits()))
    }
}

/// Truncates toward zero at the 1/16 °C step, then range-checks.
impl TryFrom<f32> for Temperature {
    type Error = ConversionError;

    fn try_from(val: f32) -> Result<Self, Self::Error> {
        if !val.is_finite() {
            return Err(ConversionError::OutOfRange);
        }

        // `as` saturates, so huge inputs still land outside the range check.
        Temperature::from_bits((val * 16.0) as i32)
    }
}

/// Prints every digit of the 1/16 °C step; each step is exact in an [`f32`].
impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.celsius())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Temperature {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=f32} C", self.celsius())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors converting plain numbers into the driver's typed register values.
pub enum ConversionError {
    /// The temperature lies outside -256 °C to 255.9375 °C, or is not a number.
    OutOfRange,
    /// The resolution is not one of 0.5, 0.25, 0.125 or 0.0625 °C.
    InvalidResolution,
    /// The hysteresis is not one of 0, 1.5, 3.0 or 6.0 °C.
    InvalidHysteresis,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConversionError::OutOfRange => {
                write!(f, "temperature outside of -256 C to 255.9375 C")
            }
            ConversionError::InvalidResolution => {
                write!(f, "resolution must be 0.5, 0.25, 0.125 or 0.0625 C")
            }
            ConversionError::InvalidHysteresis => {
                write!(f, "hysteresis must be 0, 1.5, 3.0 or 6.0 C")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;
    use fixed_macro::fixed;

    #[test]
    fn test_from_fixed() {
        let temp = Temperature::try_from(fixed!(25.5: I12F4)).unwrap();
        assert_eq!(temp.celsius(), 25.5);
        assert_eq!(I12F4::from(temp), fixed!(25.5: I12F4));
    }

    #[test]
    fn test_fixed_out_of_range() {
        assert_eq!(
            Temperature::try_from(fixed!(256: I12F4)),
            Err(ConversionError::OutOfRange)
        );
        assert_eq!(
            Temperature::try_from(fixed!(-256.0625: I12F4)),
            Err(ConversionError::OutOfRange)
        );
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Temperature::try_from(-256.0f32), Ok(Temperature::MIN));
        assert_eq!(Temperature::try_from(255.9375f32), Ok(Temperature::MAX));
        assert_eq!(Temperature::MIN.celsius(), -256.0);
        assert_eq!(Temperature::MAX.celsius(), 255.9375);
    }

    #[test]
    fn test_float_truncates_toward_zero() {
        assert_eq!(Temperature::try_from(21.03f32).unwrap().celsius(), 21.0);
        assert_eq!(Temperature::try_from(-9.29f32).unwrap().celsius(), -9.25);
        assert_eq!(Temperature::try_from(-0.01f32).unwrap().celsius(), 0.0);
    }

    #[test]
    fn test_float_truncates_before_range_check() {
        assert_eq!(Temperature::try_from(255.99f32), Ok(Temperature::MAX));
        assert_eq!(Temperature::try_from(-256.05f32), Ok(Temperature::MIN));
    }

    #[test]
    fn test_display_exact() {
        let t = |v: f32| Temperature::try_from(v).unwrap().to_string();

        assert_eq!(t(-9.25), "-9.25");
        assert_eq!(t(25.0625), "25.0625");
        assert_eq!(t(22.0625), "22.0625");
        assert_eq!(Temperature::MIN.to_string(), "-256");
        assert_eq!(Temperature::MAX.to_string(), "255.9375");
    }

    #[test]
    fn test_float_out_of_range() {
        assert_eq!(Temperature::try_from(256.0f32), Err(ConversionError::OutOfRange));
        assert_eq!(Temperature::try_from(-257.0f32), Err(ConversionError::OutOfRange));
        assert_eq!(Temperature::try_from(f32::NAN), Err(ConversionError::OutOfRange));
        assert_eq!(
            Temperature::try_from(f32::NEG_INFINITY),
            Err(ConversionError::OutOfRange)
        );
        assert_eq!(Temperature::try_from(1.0e9f32), Err(ConversionError::OutOfRange));
    }
}
