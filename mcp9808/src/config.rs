use core::convert::TryFrom;
use core::fmt;
use core::ops::BitOr;

use modular_bitfield::prelude::*;

use crate::codec::{pack_field, select_field};
use crate::temp::ConversionError;

pub(crate) const ALERT_STATUS_MASK: u16 = 1 << 4;
pub(crate) const ALERT_STATUS_SHIFT: u8 = 4;
pub(crate) const INT_CLEAR_MASK: u16 = 1 << 5;
pub(crate) const INT_CLEAR_SHIFT: u8 = 5;
pub(crate) const WIN_LOCK_MASK: u16 = 1 << 6;
pub(crate) const WIN_LOCK_SHIFT: u8 = 6;
pub(crate) const CRIT_LOCK_MASK: u16 = 1 << 7;
pub(crate) const CRIT_LOCK_SHIFT: u8 = 7;

pub(crate) const RESOLUTION_MASK: u8 = 0b11;

pub use self::reg::ConfigReg;

// `#[bitfield]` expands to parenthesized expressions that newer rustc flags.
#[allow(unused_parens)]
mod reg {
    use super::*;

    /** Decoded contents of the Sensor Configuration Register (`CONFIG`, pointer `0x01`).

    Bits 11 through 15 are reserved. The status, interrupt-clear and lock bits are read-only
    here: the lock bits can only be set through [`Mcp9808::set_window_lock`] and
    [`Mcp9808::set_critical_lock`], and the interrupt is cleared with
    [`Mcp9808::clear_interrupt`].

    [`Mcp9808::set_window_lock`]: crate::Mcp9808::set_window_lock
    [`Mcp9808::set_critical_lock`]: crate::Mcp9808::set_critical_lock
    [`Mcp9808::clear_interrupt`]: crate::Mcp9808::clear_interrupt */
    #[bitfield]
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConfigReg {
        pub alert_mode: AlertMode,
        pub alert_polarity: AlertPolarity,
        pub alert_select: AlertSelect,
        pub alert_control: AlertControl,
        /// Alert output is currently asserted.
        #[skip(setters)]
        pub alert_status: bool,
        /// Always reads back as zero.
        #[skip(setters)]
        pub int_clear: bool,
        /// Tupper and Tlower are locked until power-on reset.
        #[skip(setters)]
        pub window_lock: bool,
        /// Tcrit is locked until power-on reset.
        #[skip(setters)]
        pub critical_lock: bool,
        pub shutdown: Shutdown,
        pub hysteresis: Hysteresis,
        #[skip]
        __: B5,
    }
}

/** A write to a subset of the configuration register: the new bit values, plus a mask of the
bits being written.

Built from one or more [`ConfigRegField`]s combined with `|`:

```
use mcp9808::{AlertControl, AlertMode, ConfigRegProxy, Hysteresis};

let _fields: ConfigRegProxy = AlertMode::Interrupt | AlertControl::Enabled | Hysteresis::Three;
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRegProxy {
    val: u16,
    mask: u16,
}

impl ConfigRegProxy {
    /// Merge this partial write into the register contents `old`.
    pub(crate) fn modify(self, old: u16) -> u16 {
        pack_field(old, self.mask, 0, self.val)
    }
}

impl<T> BitOr<T> for ConfigRegProxy
where
    T: Into<ConfigRegProxy>,
{
    type Output = ConfigRegProxy;

    fn bitor(self, rhs: T) -> Self::Output {
        let rhs_proxy = rhs.into();

        ConfigRegProxy {
            val: (self.val & !rhs_proxy.mask) | rhs_proxy.val,
            mask: self.mask | rhs_proxy.mask,
        }
    }
}

impl<T> From<T> for ConfigRegProxy
where
    T: ConfigRegField,
{
    fn from(field: T) -> Self {
        ConfigRegProxy {
            val: field.val(),
            mask: T::mask(),
        }
    }
}

/// A writable sub-field of the configuration register.
pub trait ConfigRegField: private::Sealed + Into<u16> + Copy {
    const WIDTH: u8;
    const OFFSET: u8;

    fn val(self) -> u16 {
        let bits: u16 = self.into();
        bits << Self::OFFSET
    }

    fn mask() -> u16 {
        ((1u16 << Self::WIDTH) - 1) << Self::OFFSET
    }

    /// Read this field back out of a raw register word.
    fn extract(word: u16) -> u16 {
        select_field(word, Self::mask(), Self::OFFSET)
    }
}

macro_rules! impl_field {
    ( $(#[$meta:meta])* $type:ident, $width:literal, $offset:expr, $first:ident $(, $subseq:ident )* ) => {
        $(#[$meta])*
        #[derive(BitfieldSpecifier, Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[bits = $width]
        #[repr(u8)]
        pub enum $type {
            $first = 0,
            $(
                $subseq
            ),*
        }

        impl ConfigRegField for $type {
            const WIDTH: u8 = $width;
            const OFFSET: u8 = $offset;
        }

        impl From<$type> for u16
        {
            fn from(field: $type) -> u16 {
                field as u16
            }
        }

        impl<T> BitOr<T> for $type where T: ConfigRegField {
            type Output = ConfigRegProxy;

            fn bitor(self, rhs: T) -> Self::Output {
                ConfigRegProxy::from(self) | rhs
            }
        }
    }
}

impl_field!(
    /// Whether the alert output follows the comparison (comparator) or latches until cleared
    /// (interrupt).
    AlertMode, 1, 0, Comparator, Interrupt
);
impl_field!(AlertPolarity, 1, 1, ActiveLow, ActiveHigh);
impl_field!(
    /// Which limits drive the alert output: all three, or only Tcrit.
    AlertSelect, 1, 2, All, CriticalOnly
);
impl_field!(AlertControl, 1, 3, Disabled, Enabled);
impl_field!(
    /// `LowPower` stops conversions; register reads and writes keep working.
    Shutdown, 1, 8, Continuous, LowPower
);
impl_field!(
    /// Limit hysteresis in °C: 0, 1.5, 3.0 or 6.0.
    Hysteresis, 2, 9, Zero, OnePointFive, Three, Six
);

impl From<bool> for AlertControl {
    fn from(enabled: bool) -> Self {
        if enabled {
            AlertControl::Enabled
        } else {
            AlertControl::Disabled
        }
    }
}

impl From<bool> for Shutdown {
    fn from(shutdown: bool) -> Self {
        if shutdown {
            Shutdown::LowPower
        } else {
            Shutdown::Continuous
        }
    }
}

impl Hysteresis {
    pub fn celsius(self) -> f32 {
        match self {
            Hysteresis::Zero => 0.0,
            Hysteresis::OnePointFive => 1.5,
            Hysteresis::Three => 3.0,
            Hysteresis::Six => 6.0,
        }
    }
}

/// Only the four exact values the sensor supports are accepted.
impl TryFrom<f32> for Hysteresis {
    type Error = ConversionError;

    fn try_from(val: f32) -> Result<Self, Self::Error> {
        [
            Hysteresis::Zero,
            Hysteresis::OnePointFive,
            Hysteresis::Three,
            Hysteresis::Six,
        ]
        .iter()
        .copied()
        .find(|h| h.celsius() == val)
        .ok_or(ConversionError::InvalidHysteresis)
    }
}

/** Measurement resolution, held in its own register (`RESOLUTION`, pointer `0x08`) rather
than in the configuration register.

Finer resolutions take longer per conversion: roughly 30, 65, 130 and 250 ms from `Half` to
`Sixteenth`. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Resolution {
    /// 0.5 °C
    Half = 0b00,
    /// 0.25 °C
    Quarter = 0b01,
    /// 0.125 °C
    Eighth = 0b10,
    /// 0.0625 °C, the power-on default.
    Sixteenth = 0b11,
}

impl Resolution {
    pub(crate) fn to_register(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_register(reg: u8) -> Self {
        match reg & RESOLUTION_MASK {
            0b00 => Resolution::Half,
            0b01 => Resolution::Quarter,
            0b10 => Resolution::Eighth,
            _ => Resolution::Sixteenth,
        }
    }

    /// Size of one measurement step, in °C.
    pub fn celsius(self) -> f32 {
        match self {
            Resolution::Half => 0.5,
            Resolution::Quarter => 0.25,
            Resolution::Eighth => 0.125,
            Resolution::Sixteenth => 0.0625,
        }
    }
}

impl TryFrom<f32> for Resolution {
    type Error = ConversionError;

    fn try_from(val: f32) -> Result<Self, Self::Error> {
        [
            Resolution::Half,
            Resolution::Quarter,
            Resolution::Eighth,
            Resolution::Sixteenth,
        ]
        .iter()
        .copied()
        .find(|r| r.celsius() == val)
        .ok_or(ConversionError::InvalidResolution)
    }
}

/** Alert state, assembled from bits 13 through 15 of the ambient temperature register and
bit 4 of the configuration register. Never written back. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertStatus {
    /// Raw comparison flags: bit 2 is Ta >= Tcrit, bit 1 is Ta > Tupper, bit 0 is Ta < Tlower.
    pub comparison: u8,
    /// The alert output is asserted.
    pub active: bool,
}

impl AlertStatus {
    pub fn above_critical(&self) -> bool {
        self.comparison & 0b100 != 0
    }

    pub fn above_upper(&self) -> bool {
        self.comparison & 0b010 != 0
    }

    pub fn below_lower(&self) -> bool {
        self.comparison & 0b001 != 0
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "crit: {}, upper: {}, lower: {}, alert: {}",
            self.above_critical(),
            self.above_upper(),
            self.below_lower(),
            self.active
        )
    }
}

mod private {
    pub trait Sealed {}

    // No lock or interrupt-clear fields: those bits are only ever set.
    impl Sealed for super::AlertMode {}
    impl Sealed for super::AlertPolarity {}
    impl Sealed for super::AlertSelect {}
    impl Sealed for super::AlertControl {}
    impl Sealed for super::Shutdown {}
    impl Sealed for super::Hysteresis {}
}
