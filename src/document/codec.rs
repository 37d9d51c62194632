//! Binary element-record codec.
//!
//! The same encoding is used for the document's element section and for
//! component template blocks. All multi-byte values are little-endian.
//!
//! ```text
//! type u8 | name u8 | x u16 | y u16 | w u16 | h u16 | layout u8 | style u8
//! props u8 | children u8 | events u8 | customs u8
//! props:    id u8, value type u8, size u8, value[size]
//! customs:  key u8, value type u8, size u8, value[size]
//! events:   type u8, callback u8
//! children: relative offset u16
//! ```

use super::{
    CustomProperty, ElementHeader, ElementRecord, ElementType, EventRecord, PropValue, Property,
    PropertyId, ValueType,
};
use crate::error::DecodeError;
use crate::layout::LayoutFlags;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 16;

// =============================================================================
// Reader
// =============================================================================

/// Cursor over a byte slice.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn at(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }
}

// =============================================================================
// Decode
// =============================================================================

fn decode_value(reader: &mut ByteReader<'_>) -> Result<PropValue, DecodeError> {
    let value_type = ValueType::from(reader.u8()?);
    let size = reader.u8()? as usize;
    let payload = reader.take(size)?;
    Ok(PropValue::decode(value_type, payload))
}

/// Decode one record starting at the reader's position.
pub fn decode_record(reader: &mut ByteReader<'_>) -> Result<ElementRecord, DecodeError> {
    let header = ElementHeader {
        element_type: ElementType::from(reader.u8()?),
        name_index: reader.u8()?,
        x: reader.u16()?,
        y: reader.u16()?,
        width: reader.u16()?,
        height: reader.u16()?,
        layout: LayoutFlags::from_bits_retain(reader.u8()?),
        style_id: reader.u8()?,
    };
    let property_count = reader.u8()?;
    let child_count = reader.u8()?;
    let event_count = reader.u8()?;
    let custom_count = reader.u8()?;

    let mut record = ElementRecord::new(header);

    for _ in 0..property_count {
        let id = PropertyId::from(reader.u8()?);
        let value = decode_value(reader)?;
        record.properties.push(Property { id, value });
    }
    for _ in 0..custom_count {
        let key = reader.u8()?;
        let value = decode_value(reader)?;
        record.custom_properties.push(CustomProperty { key, value });
    }
    for _ in 0..event_count {
        record.events.push(EventRecord {
            event_type: reader.u8()?,
            callback: reader.u8()?,
        });
    }
    for _ in 0..child_count {
        record.child_refs.push(reader.u16()?);
    }

    Ok(record)
}

/// Decode every record in `bytes`, returning each record with its offset.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<(usize, ElementRecord)>, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let mut out = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position();
        out.push((offset, decode_record(&mut reader)?));
    }
    Ok(out)
}

// =============================================================================
// Encode
// =============================================================================

fn encode_value(out: &mut Vec<u8>, value: &PropValue) {
    let (value_type, payload) = value.encode();
    out.push(value_type.into());
    out.push(payload.len().min(u8::MAX as usize) as u8);
    out.extend_from_slice(&payload[..payload.len().min(u8::MAX as usize)]);
}

/// Append the encoding of `record` to `out`.
///
/// Table lengths are clamped to 255 entries, the width of the count fields.
pub fn encode_record(out: &mut Vec<u8>, record: &ElementRecord) {
    let h = &record.header;
    let props = &record.properties[..record.properties.len().min(255)];
    let customs = &record.custom_properties[..record.custom_properties.len().min(255)];
    let events = &record.events[..record.events.len().min(255)];
    let children = &record.child_refs[..record.child_refs.len().min(255)];

    out.push(h.element_type.into());
    out.push(h.name_index);
    out.extend_from_slice(&h.x.to_le_bytes());
    out.extend_from_slice(&h.y.to_le_bytes());
    out.extend_from_slice(&h.width.to_le_bytes());
    out.extend_from_slice(&h.height.to_le_bytes());
    out.push(h.layout.bits());
    out.push(h.style_id);
    out.push(props.len() as u8);
    out.push(children.len() as u8);
    out.push(events.len() as u8);
    out.push(customs.len() as u8);

    for p in props {
        out.push(p.id.into());
        encode_value(out, &p.value);
    }
    for c in customs {
        out.push(c.key);
        encode_value(out, &c.value);
    }
    for e in events {
        out.push(e.event_type);
        out.push(e.callback);
    }
    for r in children {
        out.extend_from_slice(&r.to_le_bytes());
    }
}

/// Encoded size of `record` in bytes.
pub fn encoded_len(record: &ElementRecord) -> usize {
    let value_len = |v: &PropValue| 2 + v.encode().1.len().min(255);
    HEADER_SIZE
        + record.properties.iter().take(255).map(|p| 1 + value_len(&p.value)).sum::<usize>()
        + record.custom_properties.iter().take(255).map(|c| 1 + value_len(&c.value)).sum::<usize>()
        + record.events.len().min(255) * 2
        + record.child_refs.len().min(255) * 2
}
