//! Attribute frames as they arrive from the coordinator
//!
//! Only the ZCL payload is handled here; the frame control, sequence number
//! and command id have already been stripped by the radio stack.

use bytes::Buf;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DataType {
    Bool = 0x10,
    Uint8 = 0x20,
    Uint16 = 0x21,
    Int8 = 0x28,
    Int16 = 0x29,
    Single = 0x39,
}

impl DataType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0x10 => DataType::Bool,
            0x20 => DataType::Uint8,
            0x21 => DataType::Uint16,
            0x28 => DataType::Int8,
            0x29 => DataType::Int16,
            0x39 => DataType::Single,
            _ => return None,
        })
    }

    pub const fn size(self) -> usize {
        match self {
            DataType::Bool | DataType::Uint8 | DataType::Int8 => 1,
            DataType::Uint16 | DataType::Int16 => 2,
            DataType::Single => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Int8(i8),
    Int16(i16),
    Single(f32),
}

impl AttributeValue {
    pub fn as_f32(&self) -> f32 {
        match *self {
            AttributeValue::Bool(v) => v as u8 as f32,
            AttributeValue::Uint8(v) => v as f32,
            AttributeValue::Uint16(v) => v as f32,
            AttributeValue::Int8(v) => v as f32,
            AttributeValue::Int16(v) => v as f32,
            AttributeValue::Single(v) => v,
        }
    }

    fn read(ty: DataType, data: &mut impl Buf) -> Self {
        match ty {
            DataType::Bool => AttributeValue::Bool(data.get_u8() != 0),
            DataType::Uint8 => AttributeValue::Uint8(data.get_u8()),
            DataType::Uint16 => AttributeValue::Uint16(data.get_u16_le()),
            DataType::Int8 => AttributeValue::Int8(data.get_i8()),
            DataType::Int16 => AttributeValue::Int16(data.get_i16_le()),
            DataType::Single => AttributeValue::Single(data.get_f32_le()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attribute {
    pub id: u16,
    pub value: AttributeValue,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame truncated: needed {needed} more bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },
    #[error("unsupported data type {0:#04x}")]
    UnsupportedType(u8),
}

fn ensure(data: &impl Buf, needed: usize) -> Result<(), DecodeError> {
    if data.remaining() < needed {
        return Err(DecodeError::Truncated { needed, remaining: data.remaining() });
    }
    Ok(())
}

fn read_typed(data: &mut impl Buf) -> Result<AttributeValue, DecodeError> {
    ensure(&*data, 1)?;
    let raw = data.get_u8();
    let ty = DataType::from_u8(raw).ok_or(DecodeError::UnsupportedType(raw))?;
    ensure(&*data, ty.size())?;
    Ok(AttributeValue::read(ty, data))
}

/// Decodes a "report attributes" payload: `[id u16][type u8][value]...`
pub fn decode_report(mut data: impl Buf) -> Result<Vec<Attribute>, DecodeError> {
    let mut out = vec![];

    while data.has_remaining() {
        ensure(&data, 2)?;
        let id = data.get_u16_le();
        let value = read_typed(&mut data)?;
        tracing::trace!("attribute {id:#06x} = {value:?}");
        out.push(Attribute { id, value });
    }

    Ok(out)
}

/// Decodes a "read attributes response" payload: `[id u16][status u8]([type u8][value])...`
///
/// Attributes with a non-success status carry no value and are left out.
pub fn decode_read_response(mut data: impl Buf) -> Result<Vec<Attribute>, DecodeError> {
    let mut out = vec![];

    while data.has_remaining() {
        ensure(&data, 3)?;
        let id = data.get_u16_le();
        let status = data.get_u8();
        if status != 0x00 {
            tracing::debug!("attribute {id:#06x} read failed with status {status:#04x}");
            continue;
        }

        let value = read_typed(&mut data)?;
        out.push(Attribute { id, value });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_with_mixed_types() {
        // MeasuredValue int16 2345, Tolerance uint16 100
        let frame: &[u8] = &[0x00, 0x00, 0x29, 0x29, 0x09, 0x03, 0x00, 0x21, 0x64, 0x00];

        assert_eq!(decode_report(frame).unwrap(), vec![
            Attribute { id: 0x0000, value: AttributeValue::Int16(2345) },
            Attribute { id: 0x0003, value: AttributeValue::Uint16(100) },
        ]);
    }

    #[test]
    fn report_single_precision() {
        let mut frame = vec![0x00, 0x00, 0x39];
        frame.extend_from_slice(&0.0015f32.to_le_bytes());

        assert_eq!(decode_report(frame.as_slice()).unwrap(), vec![Attribute {
            id: 0x0000,
            value: AttributeValue::Single(0.0015)
        }]);
    }

    #[test]
    fn read_response_skips_failed_attributes() {
        // 0x0001 unsupported attribute (0x86), then MeasuredValue uint16 5120
        let frame: &[u8] = &[0x01, 0x00, 0x86, 0x00, 0x00, 0x00, 0x21, 0x00, 0x14];

        assert_eq!(decode_read_response(frame).unwrap(), vec![Attribute {
            id: 0x0000,
            value: AttributeValue::Uint16(5120)
        }]);
    }

    #[test]
    fn truncated_frames() {
        let short_value: &[u8] = &[0x00, 0x00, 0x29, 0x01];
        assert_eq!(
            decode_report(short_value),
            Err(DecodeError::Truncated { needed: 2, remaining: 1 })
        );

        let short_id: &[u8] = &[0x00];
        assert_eq!(
            decode_report(short_id),
            Err(DecodeError::Truncated { needed: 2, remaining: 1 })
        );
    }

    #[test]
    fn unsupported_type() {
        let char_string: &[u8] = &[0x00, 0x00, 0x42, 0x03, b'a', b'b', b'c'];
        assert_eq!(
            decode_report(char_string),
            Err(DecodeError::UnsupportedType(0x42))
        );
    }
}
