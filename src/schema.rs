//! Resolved frame schema: the immutable field table the decoder runs against.

use crate::ast::{DecoderSpec, SchemaSection};
use crate::codec::FieldDecoder;
use crate::lint::{lint, Severity};
use crate::parser::parse;
use std::collections::HashMap;
use std::ops::Range;

/// One named byte range of the frame and how to decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub range: Range<usize>,
    pub decoder: FieldDecoder,
}

/// A schema variant, ready for decoding. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    frame_len: usize,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    header: usize,
    trailer: usize,
    reference_ranges: HashMap<String, String>,
}

impl Schema {
    /// Lint the section and build the field table. Any error-level finding is fatal.
    pub fn resolve(section: &SchemaSection) -> Result<Self, String> {
        let errors: Vec<String> = lint(section)
            .into_iter()
            .filter(|m| m.severity == Severity::Error)
            .map(|m| match m.field {
                Some(f) => format!("{}: {} [{}]", f, m.message, m.rule.id()),
                None => format!("{} [{}]", m.message, m.rule.id()),
            })
            .collect();
        if !errors.is_empty() {
            return Err(format!("schema {}: {}", section.name, errors.join("; ")));
        }

        let mut fields = Vec::with_capacity(section.fields.len());
        let mut by_name = HashMap::new();
        let mut reference_ranges = HashMap::new();
        let mut header = None;
        let mut trailer = None;
        for (i, f) in section.fields.iter().enumerate() {
            let decoder = FieldDecoder::from_spec(&f.decoder)
                .map_err(|e| format!("schema {}: field {}: {}", section.name, f.name, e))?;
            match f.decoder {
                DecoderSpec::Header(_) => header = Some(i),
                DecoderSpec::Trailer(_) => trailer = Some(i),
                _ => {}
            }
            if let Some(ref r) = f.reference_range {
                reference_ranges.insert(f.name.clone(), r.clone());
            }
            by_name.insert(f.name.clone(), i);
            fields.push(FieldDescriptor {
                name: f.name.clone(),
                range: f.start..f.end,
                decoder,
            });
        }

        Ok(Schema {
            name: section.name.clone(),
            frame_len: section.span(),
            fields,
            by_name,
            header: header.ok_or_else(|| format!("schema {}: no header field", section.name))?,
            trailer: trailer.ok_or_else(|| format!("schema {}: no trailer field", section.name))?,
            reference_ranges,
        })
    }

    /// Parse schema source and resolve one section: the named one, or the only one.
    pub fn from_source(source: &str, name: Option<&str>) -> Result<Self, String> {
        let file = parse(source)?;
        let section = match name {
            Some(n) => file.get(n).ok_or_else(|| format!("no schema named {:?}", n))?,
            None => match file.schemas.as_slice() {
                [only] => only,
                [] => return Err("source defines no schema".to_string()),
                many => {
                    let names: Vec<&str> = many.iter().map(|s| s.name.as_str()).collect();
                    return Err(format!("several schemas defined ({}); pick one by name", names.join(", ")));
                }
            },
        };
        Schema::resolve(section)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact frame length this schema accepts.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Fields in declaration order (the output column order).
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn range_of(&self, name: &str) -> Option<Range<usize>> {
        self.field(name).map(|f| f.range.clone())
    }

    pub fn header(&self) -> &FieldDescriptor {
        &self.fields[self.header]
    }

    pub fn trailer(&self) -> &FieldDescriptor {
        &self.fields[self.trailer]
    }

    pub fn reference_range(&self, name: &str) -> Option<&str> {
        self.reference_ranges.get(name).map(String::as_str)
    }
}
