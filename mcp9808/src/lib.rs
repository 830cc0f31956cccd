/*! `mcp9808` is an [`embedded_hal`](https://github.com/rust-embedded/embedded-hal) crate for
accessing [Microchip MCP9808](https://www.microchip.com/en-us/product/MCP9808) temperature
sensors over an I2C bus.

The MCP9808 exposes its state through 16-bit registers selected by a register pointer:

* Sensor Configuration Register (various `enum`s, see [`ConfigReg`])
* Alert limits Tupper, Tlower and Tcrit ([`Temperature`], -256 to 255.9375 °C)
* Ambient temperature ([`Temperature`] plus three comparison flags, see [`AlertStatus`])
* Manufacturer and device ID
* Resolution (8 bits, see [`Resolution`])

Temperatures use a 13-bit two's-complement format with 1/16 °C steps; the conversions live in
[`codec`]. Unlike some register-pointer sensors, nothing is cached: every call reads the
registers it depends on afresh, and partial updates of the configuration register are done as
read-modify-write sequences that keep all bits they don't own. Those sequences are not atomic,
so a given sensor must only be driven by one [`Mcp9808`] at a time.

```
# use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
# let mut i2c = I2cMock::new(&[
#     I2cTransaction::write(0x18, vec![0x08, 0x03]),
#     I2cTransaction::write_read(0x18, vec![0x05], vec![0xC1, 0x94]),
# ]);
use mcp9808::{Mcp9808, Resolution};

let mut sensor = Mcp9808::new(i2c, mcp9808::DEFAULT_ADDRESS);
sensor.set_resolution(Resolution::Sixteenth).unwrap();

let temp = sensor.temperature().unwrap();
assert_eq!(temp.celsius(), 25.25);
# sensor.free().done();
```
*/
#![no_std]
#![deny(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/mcp9808/0.1.0")]

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod codec;
mod config;
mod limit;
mod temp;

pub use config::*;
pub use limit::*;
pub use temp::*;

use core::fmt as core_fmt;
use core::result::Result;
use embedded_hal::i2c::I2c;

use codec::{
    decode_temperature, encode_temperature, pack_field, select_field, ALERT_FLAGS_MASK,
    ALERT_FLAGS_SHIFT,
};

/// Address with A2, A1 and A0 all tied low. A2..A0 select 0x18 through 0x1F.
pub const DEFAULT_ADDRESS: u8 = 0x18;

/// Register pointer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    Config = 0x01,
    UpperLimit = 0x02,
    LowerLimit = 0x03,
    CriticalLimit = 0x04,
    AmbientTemperature = 0x05,
    ManufacturerId = 0x06,
    DeviceId = 0x07,
    Resolution = 0x08,
}

/** A struct for describing how to read and write an MCP9808 temperature sensor's registers via
an [`embedded_hal`] I2C implementation.

The struct holds nothing but the bus and the sensor's address; all sensor state lives in the
sensor's registers. */
pub struct Mcp9808<T>
where
    T: I2c,
{
    ctx: T,
    address: u8,
}

#[derive(Debug, PartialEq)]
/// Enum for describing possible error conditions when reading/writing an MCP9808.
pub enum Mcp9808Error<E> {
    /** Reading the desired register via `embedded_hal` failed. Contains the
    [`I2c::Error`](embedded_hal::i2c::ErrorType::Error) propagated from the [`embedded_hal`]
    implementation. */
    ReadError(E),
    /** Writing the desired register via `embedded_hal` failed. Contains the
    [`I2c::Error`](embedded_hal::i2c::ErrorType::Error) propagated from the [`embedded_hal`]
    implementation. A read-modify-write whose read failed reports a
    [`ReadError`](Mcp9808Error::ReadError) and never writes. */
    WriteError(E),
}

impl<E> core_fmt::Display for Mcp9808Error<E>
where
    E: core_fmt::Debug,
{
    fn fmt(&self, f: &mut core_fmt::Formatter) -> core_fmt::Result {
        match self {
            Mcp9808Error::ReadError(e) => write!(f, "failed to read register: {:?}", e),
            Mcp9808Error::WriteError(e) => write!(f, "failed to write register: {:?}", e),
        }
    }
}

impl<T> Mcp9808<T>
where
    T: I2c,
{
    pub fn new(ctx: T, address: u8) -> Self {
        Mcp9808 { ctx, address }
    }

    /// Read an 8-bit register.
    pub fn read_byte(&mut self, reg: Register) -> Result<u8, Mcp9808Error<T::Error>> {
        let mut data = [0u8; 1];

        self.ctx
            .write_read(self.address, &[reg as u8], &mut data)
            .map_err(Mcp9808Error::ReadError)?;

        trace!("read {:?} = {:#x}", reg, data[0]);
        Ok(data[0])
    }

    /** Read a 16-bit register. The sensor sends the most significant byte first, so the bytes
    are already in register order. */
    pub fn read_word(&mut self, reg: Register) -> Result<u16, Mcp9808Error<T::Error>> {
        let mut data = [0u8; 2];

        self.ctx
            .write_read(self.address, &[reg as u8], &mut data)
            .map_err(Mcp9808Error::ReadError)?;

        let word = u16::from_be_bytes(data);
        trace!("read {:?} = {:#x}", reg, word);
        Ok(word)
    }

    /// Write an 8-bit register.
    pub fn write_byte(&mut self, reg: Register, val: u8) -> Result<(), Mcp9808Error<T::Error>> {
        trace!("write {:?} = {:#x}", reg, val);

        self.ctx
            .write(self.address, &[reg as u8, val])
            .map_err(Mcp9808Error::WriteError)
    }

    /// Write a 16-bit register, most significant byte first.
    pub fn write_word(&mut self, reg: Register, val: u16) -> Result<(), Mcp9808Error<T::Error>> {
        let [msb, lsb] = val.to_be_bytes();
        trace!("write {:?} = {:#x}", reg, val);

        self.ctx
            .write(self.address, &[reg as u8, msb, lsb])
            .map_err(Mcp9808Error::WriteError)
    }

    /// Read the ambient temperature. The comparison flags sharing the register are discarded;
    /// see [`alert_status`](Mcp9808::alert_status) for those.
    pub fn temperature(&mut self) -> Result<Temperature, Mcp9808Error<T::Error>> {
        let raw = self.read_word(Register::AmbientTemperature)?;
        Ok(decode_temperature(raw & codec::TEMP_MASK))
    }

    /** Set one of the alert limits.

    The sensor only keeps Tupper, Tlower and Tcrit to 0.25 °C; the two least significant bits
    are ignored on write and read back as zero. Writes to a locked limit are ignored by the
    sensor. */
    pub fn set_threshold(
        &mut self,
        which: Threshold,
        temp: Temperature,
    ) -> Result<(), Mcp9808Error<T::Error>> {
        debug!("set {:?} limit to {:#x}", which, encode_temperature(temp));
        self.write_word(which.into(), encode_temperature(temp))
    }

    /// Read back one of the alert limits.
    pub fn threshold(&mut self, which: Threshold) -> Result<Temperature, Mcp9808Error<T::Error>> {
        let raw = self.read_word(which.into())?;
        Ok(decode_temperature(raw))
    }

    /// Set Tlower and Tupper, in that order.
    pub fn set_limits(&mut self, limits: Limits) -> Result<(), Mcp9808Error<T::Error>> {
        self.set_threshold(Threshold::Lower, limits.lower())?;
        self.set_threshold(Threshold::Upper, limits.upper())
    }

    /** Set the measurement resolution. The resolution register holds nothing else, so it is
    written outright rather than read-modify-written. */
    pub fn set_resolution(&mut self, res: Resolution) -> Result<(), Mcp9808Error<T::Error>> {
        debug!("set resolution to {:?}", res);
        self.write_byte(Register::Resolution, res.to_register())
    }

    pub fn resolution(&mut self) -> Result<Resolution, Mcp9808Error<T::Error>> {
        let reg = self.read_byte(Register::Resolution)?;
        Ok(Resolution::from_register(reg))
    }

    /// Read and decode the configuration register.
    pub fn config(&mut self) -> Result<ConfigReg, Mcp9808Error<T::Error>> {
        let raw = self.read_word(Register::Config)?;
        Ok(ConfigReg::from(raw))
    }

    /** Change any combination of the writable configuration fields in a single
    read-modify-write, leaving every other bit (locks and reserved bits included) as read.

    ```
    # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    # let mut i2c = I2cMock::new(&[
    #     I2cTransaction::write_read(0x18, vec![0x01], vec![0x00, 0x80]),
    #     I2cTransaction::write(0x18, vec![0x01, 0x05, 0x89]),
    # ]);
    use mcp9808::{AlertControl, AlertMode, Hysteresis, Mcp9808, Shutdown};

    let mut sensor = Mcp9808::new(i2c, 0x18);
    sensor
        .update_config(AlertMode::Interrupt | AlertControl::Enabled | Hysteresis::Three | Shutdown::LowPower)
        .unwrap();
    # sensor.free().done();
    ```
    */
    pub fn update_config<U>(&mut self, fields: U) -> Result<(), Mcp9808Error<T::Error>>
    where
        U: Into<ConfigRegProxy>,
    {
        let proxy = fields.into();
        self.modify_config(|old| proxy.modify(old))
    }

    pub fn set_hysteresis(&mut self, hyst: Hysteresis) -> Result<(), Mcp9808Error<T::Error>> {
        self.update_config(hyst)
    }

    /// `true` stops conversions until set back to `false`; the last reading stays available.
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Mcp9808Error<T::Error>> {
        self.update_config(Shutdown::from(shutdown))
    }

    /** Lock Tcrit and the critical alert settings.

    The lock cannot be undone by software; only a power-on reset clears it. The typed
    configuration methods carry the bit over as read, and the sensor ignores raw writes of a
    zero. */
    pub fn set_critical_lock(&mut self) -> Result<(), Mcp9808Error<T::Error>> {
        debug!("locking Tcrit");
        self.modify_config(|old| pack_field(old, CRIT_LOCK_MASK, CRIT_LOCK_SHIFT, 1))
    }

    /** Lock Tupper, Tlower and the window alert settings.

    Like [`set_critical_lock`](Mcp9808::set_critical_lock), this holds until power-on reset. */
    pub fn set_window_lock(&mut self) -> Result<(), Mcp9808Error<T::Error>> {
        debug!("locking Tupper/Tlower");
        self.modify_config(|old| pack_field(old, WIN_LOCK_MASK, WIN_LOCK_SHIFT, 1))
    }

    /// Configure the alert output (config bits 0 through 3) in one read-modify-write.
    pub fn set_alerts(
        &mut self,
        enabled: bool,
        select: AlertSelect,
        polarity: AlertPolarity,
        mode: AlertMode,
    ) -> Result<(), Mcp9808Error<T::Error>> {
        self.update_config(AlertControl::from(enabled) | select | polarity | mode)
    }

    /// Read the limit comparison flags and whether the alert output is asserted.
    pub fn alert_status(&mut self) -> Result<AlertStatus, Mcp9808Error<T::Error>> {
        let ambient = self.read_word(Register::AmbientTemperature)?;
        let config = self.read_word(Register::Config)?;

        Ok(AlertStatus {
            comparison: select_field(ambient, ALERT_FLAGS_MASK, ALERT_FLAGS_SHIFT) as u8,
            active: select_field(config, ALERT_STATUS_MASK, ALERT_STATUS_SHIFT) == 1,
        })
    }

    /// Release a latched alert in interrupt mode. The bit clears itself on the sensor.
    pub fn clear_interrupt(&mut self) -> Result<(), Mcp9808Error<T::Error>> {
        self.modify_config(|old| pack_field(old, INT_CLEAR_MASK, INT_CLEAR_SHIFT, 1))
    }

    /// Should read `0x0054` on a genuine part.
    pub fn manufacturer_id(&mut self) -> Result<u16, Mcp9808Error<T::Error>> {
        self.read_word(Register::ManufacturerId)
    }

    /// Returns the device ID (`0x04` for the MCP9808) and the silicon revision.
    pub fn device_id(&mut self) -> Result<(u8, u8), Mcp9808Error<T::Error>> {
        let [id, rev] = self.read_word(Register::DeviceId)?.to_be_bytes();
        Ok((id, rev))
    }

    pub fn free(self) -> T {
        self.ctx
    }

    fn modify_config<F>(&mut self, f: F) -> Result<(), Mcp9808Error<T::Error>>
    where
        F: FnOnce(u16) -> u16,
    {
        let old = self.read_word(Register::Config)?;
        let new = f(old);

        debug!("config {:#x} -> {:#x}", old, new);
        self.write_word(Register::Config, new)
    }
}
