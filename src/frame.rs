//! Frame handling: validate a fixed-length frame and decode it field by field.
//!
//! Decoding is fail-fast. The first length, marker or field error aborts the frame and
//! no partial record is returned, since a misaligned frame shifts every later offset.
//! [`diagnose_frame`] collects every problem instead, for logging.

use crate::codec::{DecodeError, FieldDecoder};
use crate::schema::{FieldDescriptor, Schema};
use crate::value::DecodedValue;
use std::ops::Range;

/// Decoded frame: field name to value, in schema declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    schema: String,
    fields: Vec<(String, DecodedValue)>,
}

impl DecodedRecord {
    /// Name of the schema that produced this record.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One column of cells per field, ready for [`transpose`](crate::table::transpose).
    pub fn columns(&self) -> Vec<Vec<String>> {
        self.fields.iter().map(|(_, v)| v.cells()).collect()
    }
}

/// Field text as the analyzer sent it: one char per byte.
fn field_text(bytes: &[u8], range: Range<usize>) -> String {
    bytes[range].iter().map(|&b| char::from(b)).collect()
}

fn check_length(schema: &Schema, bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() != schema.frame_len() {
        return Err(DecodeError::LengthMismatch {
            expected: schema.frame_len(),
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn check_header(schema: &Schema, bytes: &[u8]) -> Result<(), DecodeError> {
    let header = schema.header();
    let found = field_text(bytes, header.range.clone());
    if header.decoder.decode(&found).is_err() {
        return Err(DecodeError::HeaderMismatch {
            expected: marker_literal(header),
            found,
        });
    }
    Ok(())
}

fn check_trailer(schema: &Schema, bytes: &[u8]) -> Result<(), DecodeError> {
    let trailer = schema.trailer();
    let found = field_text(bytes, trailer.range.clone());
    if trailer.decoder.decode(&found).is_err() {
        return Err(DecodeError::TrailerMismatch {
            offset: trailer.range.start,
            expected: marker_literal(trailer),
            found,
        });
    }
    Ok(())
}

fn marker_literal(field: &FieldDescriptor) -> String {
    match &field.decoder {
        FieldDecoder::Marker { literal } => literal.clone(),
        _ => String::new(),
    }
}

/// Structural check: exact length, header marker at the start, trailer marker at its
/// schema position (not necessarily the last byte).
pub fn validate_frame(schema: &Schema, bytes: &[u8]) -> Result<(), DecodeError> {
    check_length(schema, bytes)?;
    check_header(schema, bytes)?;
    check_trailer(schema, bytes)
}

/// Validate, then decode every field in schema order.
pub fn decode_frame(schema: &Schema, bytes: &[u8]) -> Result<DecodedRecord, DecodeError> {
    if let Err(e) = validate_frame(schema, bytes) {
        tracing::debug!(schema = schema.name(), error = %e, "frame rejected");
        return Err(e);
    }
    let mut fields = Vec::with_capacity(schema.fields().len());
    for f in schema.fields() {
        let raw = field_text(bytes, f.range.clone());
        let value = f.decoder.decode(&raw).map_err(|source| {
            tracing::debug!(schema = schema.name(), field = %f.name, error = %source, "field rejected");
            DecodeError::FieldFormat {
                field: f.name.clone(),
                source,
            }
        })?;
        tracing::trace!(field = %f.name, cells = value.len(), "decoded");
        fields.push((f.name.clone(), value));
    }
    Ok(DecodedRecord {
        schema: schema.name().to_string(),
        fields,
    })
}

/// Every problem found in the frame, in schema order. Empty means
/// [`decode_frame`] would succeed. A length mismatch is reported alone: offsets are
/// meaningless past it.
pub fn diagnose_frame(schema: &Schema, bytes: &[u8]) -> Vec<DecodeError> {
    if let Err(e) = check_length(schema, bytes) {
        return vec![e];
    }
    let mut out = Vec::new();
    if let Err(e) = check_header(schema, bytes) {
        out.push(e);
    }
    if let Err(e) = check_trailer(schema, bytes) {
        out.push(e);
    }
    let header = schema.header().name.as_str();
    let trailer = schema.trailer().name.as_str();
    for f in schema.fields() {
        if f.name == header || f.name == trailer {
            continue;
        }
        if let Err(source) = f.decoder.decode(&field_text(bytes, f.range.clone())) {
            out.push(DecodeError::FieldFormat {
                field: f.name.clone(),
                source,
            });
        }
    }
    out
}
