/*! Pure conversions between raw register words and the driver's typed values.

Nothing in here touches the bus. The MCP9808 stores temperatures (ambient reading and the
three limits) as 13-bit two's-complement numbers in 1/16 °C units, in bits 0 through 12 of a
16-bit register. Configuration sub-fields are packed into 16-bit words and must be updated
without disturbing their neighbours. */

use crate::temp::Temperature;

/// Bits 0 through 12: the temperature payload, sign included.
pub const TEMP_MASK: u16 = 0x1FFF;
/// Bit 12: the sign of the temperature payload.
pub const SIGN_MASK: u16 = 0x1000;
/// Bits 0 through 11: the temperature payload, sign excluded.
pub const DATA_MASK: u16 = 0x0FFF;
/// Bits 13 through 15 of the ambient temperature register: Ta vs. Tlower/Tupper/Tcrit.
pub const ALERT_FLAGS_MASK: u16 = 0xE000;
pub const ALERT_FLAGS_SHIFT: u8 = 13;

/** Decode the low 13 bits of `raw` as a two's-complement temperature in 1/16 °C units.

Bits 13 through 15 are ignored, so the ambient temperature register can be passed in as read.

```
use mcp9808::codec::decode_temperature;

assert_eq!(decode_temperature(0x0190).celsius(), 25.0);
assert_eq!(decode_temperature(0x1F6C).celsius(), -9.25);
```
*/
pub fn decode_temperature(raw: u16) -> Temperature {
    let sign = select_field(raw, SIGN_MASK, 12);
    let data = (raw & DATA_MASK) as i16;

    let bits = if sign == 1 {
        -((data ^ DATA_MASK as i16) + 1)
    } else {
        data
    };

    Temperature::from_bits_unchecked(bits)
}

/** Encode a temperature as a 13-bit two's-complement payload. Bits 13 through 15 of the result
are always clear.

Reinterpreting the 16-bit two's complement and masking yields the same bits as complementing
the magnitude and adding one, but also holds at -256 °C, whose 12-bit magnitude would
otherwise carry out of the payload. */
pub fn encode_temperature(temp: Temperature) -> u16 {
    (temp.to_bits() as u16) & TEMP_MASK
}

/** Replace the bits of `current` selected by `mask` with `value << shift`.

Bits outside `mask` are returned untouched, even if `value << shift` spills past the field. */
pub fn pack_field(current: u16, mask: u16, shift: u8, value: u16) -> u16 {
    (current & !mask) | ((value << shift) & mask)
}

/// Extract the sub-field selected by `mask` and move it down to bit 0.
pub fn select_field(word: u16, mask: u16, shift: u8) -> u16 {
    (word & mask) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::TryFrom;

    fn temp(val: f32) -> Temperature {
        Temperature::try_from(val).unwrap()
    }

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode_temperature(0x0000).celsius(), 0.0);
        assert_eq!(decode_temperature(0x0190).celsius(), 25.0);
        assert_eq!(decode_temperature(0x0198).celsius(), 25.5);
        assert_eq!(decode_temperature(0x0FFF).celsius(), 255.9375);
        assert_eq!(decode_temperature(0x1000).celsius(), -256.0);
        assert_eq!(decode_temperature(0x1FFF).celsius(), -0.0625);
    }

    #[test]
    fn test_decode_ignores_alert_flags() {
        assert_eq!(decode_temperature(0xA190).celsius(), 25.0);
        assert_eq!(decode_temperature(0xFF6C).celsius(), -9.25);
    }

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode_temperature(temp(0.0)), 0x0000);
        assert_eq!(encode_temperature(temp(25.5)), 0x0198);
        assert_eq!(encode_temperature(temp(-9.25)), 0x1F6C);
        assert_eq!(encode_temperature(temp(-0.0625)), 0x1FFF);
        assert_eq!(encode_temperature(Temperature::MAX), 0x0FFF);
        assert_eq!(encode_temperature(Temperature::MIN), 0x1000);
    }

    #[test]
    fn test_round_trip_full_range() {
        for bits in Temperature::MIN.to_bits()..=Temperature::MAX.to_bits() {
            let t = Temperature::from_bits_unchecked(bits);
            let raw = encode_temperature(t);

            assert_eq!(raw & !TEMP_MASK, 0);
            assert_eq!(decode_temperature(raw), t);
        }
    }

    #[test]
    fn test_pack_field_isolation() {
        let words = [0x0000u16, 0xFFFF, 0xA5A5, 0x5A5A, 0x07F0];
        let fields = [(0x0600u16, 9u8), (0x0100, 8), (0x0001, 0), (0x000F, 0)];

        for &w in words.iter() {
            for &(mask, shift) in fields.iter() {
                for v in 0..4u16 {
                    let packed = pack_field(w, mask, shift, v);
                    assert_eq!(packed & !mask, w & !mask);
                }
            }
        }
    }

    #[test]
    fn test_pack_field_value() {
        assert_eq!(pack_field(0xF9FF, 0x0600, 9, 0b01), 0xFBFF);
        assert_eq!(pack_field(0x0600, 0x0600, 9, 0b00), 0x0000);
        // Too-wide value is clipped to the field.
        assert_eq!(pack_field(0x0000, 0x0100, 8, 0b11), 0x0100);
    }

    #[test]
    fn test_select_field() {
        assert_eq!(select_field(0xA190, ALERT_FLAGS_MASK, ALERT_FLAGS_SHIFT), 0b101);
        assert_eq!(select_field(0x0610, 0x0600, 9), 0b11);
        assert_eq!(select_field(0x0610, 0x0010, 4), 1);
    }
}
